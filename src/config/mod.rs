//! Configuration module

mod error;
mod site;

pub use error::ConfigError;
pub use site::HighlightConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
