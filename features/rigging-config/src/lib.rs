//! Rigging Config provides a registry of configs that can be resolved from any
//! factory of a rigging container.
//!
//! Rigging Config is split into two major parts:
//! 1. ConfigProvider: Used to create the registry of all configs
//! 2. Config<T>: A wrapper type to be able to resolve and retrieve configs
//!
//! # Examples
//!
//! ```rust
//! use rigging_config::provider::ConfigProvider;
//!
//! #[derive(Clone)]
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! let app_config = AppConfig {
//!     host: "localhost".to_string(),
//!     port: 8080_u16,
//! };
//!
//! let mut config_provider = ConfigProvider::default();
//! config_provider.add_config(app_config.clone()).unwrap();
//!
//! let retrieved_config = config_provider.get_config::<AppConfig>().unwrap().unwrap();
//!
//! assert_eq!(app_config.host, retrieved_config.host);
//! assert_eq!(app_config.port, retrieved_config.port);
//! ```
//!
//! Rigging Config consists of the following components:
//!
//! 1. Config - for resolving configs and registering the provider as an assembly
//! 2. Provider - for creating a registry of configs, adding and retrieving configs
//! 3. Errors - for config errors

pub mod config;
pub mod errors;
pub mod provider;

pub use config::{Config, ConfigAssembly, CONFIG_PROVIDER_QUALIFIER};
pub use errors::ConfigError;
pub use provider::ConfigProvider;
