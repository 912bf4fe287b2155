use async_trait::async_trait;

use crate::communicator::Communicator;
use crate::output::OutputChannel;
use crate::registry::Plugin;

/// Boilerplate plugin: echoes every line back and onto the data channel.
pub struct TemplatePlugin;

#[async_trait]
impl Plugin for TemplatePlugin {
    fn description(&self) -> &str {
        "A basic boilerplate template for a plugin."
    }

    async fn execute(&self, comm: &mut dyn Communicator, output: &OutputChannel) {
        comm.say("[Plugin] This is a basic boilerplate template for a plugin. Type 'exit' to quit.")
            .await;

        loop {
            comm.say("> ").await;
            let Ok(input) = comm.receive().await else {
                break;
            };

            if input.trim() == "exit" {
                comm.say("[Plugin] Goodbye!").await;
                break;
            }

            let echoed = format!("[Plugin] {input}");
            output.emit(echoed.clone());
            comm.say(&echoed).await;
        }
    }
}
