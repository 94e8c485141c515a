pub mod config;
pub mod error;
pub mod platform;

pub use config::{AppConfig, LoadingConfig, LoadingMode, StoreConfig};
pub use error::ConfigError;
pub use platform::Platform;
