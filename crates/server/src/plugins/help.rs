use async_trait::async_trait;

use crate::communicator::Communicator;
use crate::output::OutputChannel;
use crate::registry::Plugin;

/// Lists every registered command.
pub struct HelpPlugin {
    listing: Vec<(String, String)>,
}

impl HelpPlugin {
    pub const DESCRIPTION: &'static str = "Lists all available commands and their descriptions.";

    pub fn new(listing: Vec<(String, String)>) -> Self {
        Self { listing }
    }
}

#[async_trait]
impl Plugin for HelpPlugin {
    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    async fn execute(&self, comm: &mut dyn Communicator, _output: &OutputChannel) {
        let mut message = String::from("[Help] Available Commands:\n");
        for (name, description) in &self.listing {
            message.push_str(&format!("- {name}: {description}\n"));
        }
        comm.say(&message).await;
    }
}
