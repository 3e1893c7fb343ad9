pub mod config;
pub mod error;
pub mod render;
pub mod templates;

pub use config::{Config, ConfigLayer};
pub use error::ConfigError;
pub use render::{RenderConfig, RenderLayer};
