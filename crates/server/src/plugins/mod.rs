mod chess;
mod help;
mod template;

pub use chess::ChessPlugin;
pub use help::HelpPlugin;
pub use template::TemplatePlugin;
