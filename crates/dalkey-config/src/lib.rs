#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Configuration resolution for the dalkey build tool and dev server.
//!
//! A project supplies a partial configuration, either built in code or
//! loaded from `dalkey.config.js` / `vite.config.js`. [`resolve`] merges it
//! over built-in defaults and validates its shape, producing the immutable
//! [`DalkeyConfig`] that the bundler (via [`BundlePlan`]) and the dev server
//! (via [`HostBinding`]) consume. Everything past that point, module graph,
//! transforms, plugin execution, the server itself, lives elsewhere.

pub mod config;
pub mod error;
pub mod host;
pub mod loader;
pub mod plan;

pub use config::{
    resolve, BuildOptions, DalkeyConfig, PartialBuildOptions, PartialConfig,
    PartialServerOptions, PluginSpec, ServerOptions, DEFAULT_ENTRY,
};
pub use error::ConfigError;
pub use host::HostBinding;
pub use loader::{find_config_file, load_config, parse_config_source, CONFIG_FILES};
pub use plan::BundlePlan;
