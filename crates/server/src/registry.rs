//! Command keyword → plugin lookup, built once at startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use uci_engine::UciLauncher;

use crate::communicator::Communicator;
use crate::config::Config;
use crate::error::ServerError;
use crate::output::OutputChannel;
use crate::plugins::{ChessPlugin, HelpPlugin, TemplatePlugin};
use crate::session::SessionSettings;

pub const HELP_KEYWORD: &str = "help";

/// A command a viewer can run.
///
/// One instance serves every connection, so per-run state belongs inside
/// `execute`, never in the plugin itself.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn description(&self) -> &str;

    /// Run until the plugin is done with this viewer.
    async fn execute(&self, comm: &mut dyn Communicator, output: &OutputChannel);
}

/// Immutable keyword table handed to the host.
pub struct Registry {
    plugins: BTreeMap<String, Box<dyn Plugin>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Keywords are matched case-insensitively.
    pub fn get(&self, keyword: &str) -> Option<&dyn Plugin> {
        self.plugins
            .get(&keyword.to_ascii_lowercase())
            .map(|plugin| plugin.as_ref())
    }

    /// Registered keywords in alphabetical order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    plugins: BTreeMap<String, Box<dyn Plugin>>,
}

impl RegistryBuilder {
    pub fn register(
        mut self,
        keyword: &str,
        plugin: impl Plugin + 'static,
    ) -> Result<Self, ServerError> {
        let keyword = keyword.trim().to_ascii_lowercase();
        if keyword == HELP_KEYWORD || self.plugins.contains_key(&keyword) {
            return Err(ServerError::DuplicatePlugin(keyword));
        }
        self.plugins.insert(keyword, Box::new(plugin));
        Ok(self)
    }

    /// Finish registration. A `help` plugin listing every command,
    /// itself included, is added automatically.
    pub fn build(mut self) -> Registry {
        let mut listing: Vec<(String, String)> = self
            .plugins
            .iter()
            .map(|(keyword, plugin)| (keyword.clone(), plugin.description().to_string()))
            .collect();
        listing.push((
            HELP_KEYWORD.to_string(),
            HelpPlugin::DESCRIPTION.to_string(),
        ));
        listing.sort();

        self.plugins
            .insert(HELP_KEYWORD.to_string(), Box::new(HelpPlugin::new(listing)));
        Registry {
            plugins: self.plugins,
        }
    }
}

/// Plugins served by the `server` binary.
pub fn default_registry(config: &Config) -> Result<Registry, ServerError> {
    let launcher = Arc::new(UciLauncher::new(config.engine.clone()));
    let settings = SessionSettings::from(config);
    Ok(Registry::builder()
        .register("chess", ChessPlugin::new(launcher, settings))?
        .register("template", TemplatePlugin)?
        .build())
}
