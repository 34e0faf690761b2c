//! Typed build/serve configuration and the defaults merge.
//!
//! [`resolve`] takes a [`PartialConfig`] (every field optional, as authored
//! in a config file) and produces a fully populated [`DalkeyConfig`] by a
//! right-biased shallow merge over built-in defaults. Sections merge
//! field-by-field; `entry_points`, when supplied, replaces the default set
//! wholesale. The merge is pure: no filesystem or network access, and the
//! result is read-only data handed to the build/serve engine.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::host::HostBinding;

/// Conventional entry document used when a project declares none.
pub const DEFAULT_ENTRY: &str = "index.html";

/// An opaque plugin descriptor.
///
/// Plugins execute in sequence, so order matters to the engine, but the
/// resolver never looks inside one. Whatever the config file declares is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginSpec(pub serde_json::Value);

/// Fully resolved configuration handed to the build/serve engine.
///
/// Every field has a concrete value. Produced once per invocation by
/// [`resolve`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DalkeyConfig {
    /// Plugin sequence, in execution order.
    pub plugins: Vec<PluginSpec>,
    /// Production bundling options.
    pub build: BuildOptions,
    /// Dev server options.
    pub server: ServerOptions,
}

/// Resolved production bundling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// HTML documents the bundler treats as dependency-graph roots.
    /// Never empty; unique; order preserved.
    pub entry_points: Vec<String>,
}

/// Resolved dev server options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerOptions {
    /// Network interface policy.
    pub host: HostBinding,
}

impl Default for DalkeyConfig {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            build: BuildOptions {
                entry_points: vec![DEFAULT_ENTRY.to_string()],
            },
            server: ServerOptions {
                host: HostBinding::default(),
            },
        }
    }
}

impl DalkeyConfig {
    /// Re-expose the resolved configuration as a fully specified partial.
    ///
    /// Resolving the result is a no-op merge: every field is present, so
    /// nothing falls back to a default.
    #[must_use]
    pub fn into_partial(self) -> PartialConfig {
        PartialConfig {
            plugins: Some(self.plugins),
            build: Some(PartialBuildOptions {
                entry_points: Some(self.build.entry_points),
            }),
            server: Some(PartialServerOptions {
                host: Some(self.server.host),
            }),
        }
    }
}

/// User-supplied configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<PluginSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<PartialBuildOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<PartialServerOptions>,
}

/// Bundling options as authored, before defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialBuildOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_points: Option<Vec<String>>,
}

/// Server options as authored, before defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialServerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<HostBinding>,
}

/// Merge a partial configuration over the built-in defaults.
///
/// User-supplied values win field-by-field. `entry_points`, if provided,
/// fully replaces the default set (deduplicated, first occurrence kept)
/// rather than merging element-wise.
///
/// Malformed explicit values fail with [`ConfigError::Shape`] naming the
/// offending field; they are never silently coerced to a default.
pub fn resolve(partial: PartialConfig) -> Result<DalkeyConfig, ConfigError> {
    let plugins = partial.plugins.unwrap_or_default();

    let entry_points = match partial.build.and_then(|b| b.entry_points) {
        None => vec![DEFAULT_ENTRY.to_string()],
        Some(entries) => {
            if entries.is_empty() {
                return Err(ConfigError::shape(
                    "build.entry_points",
                    "at least one entry point is required",
                ));
            }
            let mut unique = Vec::with_capacity(entries.len());
            for (idx, entry) in entries.into_iter().enumerate() {
                if entry.is_empty() {
                    return Err(ConfigError::shape(
                        format!("build.entry_points[{idx}]"),
                        "entry point must be a non-empty path",
                    ));
                }
                if !unique.contains(&entry) {
                    unique.push(entry);
                }
            }
            unique
        }
    };

    let host = match partial.server.and_then(|s| s.host) {
        None => HostBinding::default(),
        Some(HostBinding::Addr(h)) if h.is_empty() => {
            return Err(ConfigError::shape("server.host", "host must not be empty"));
        }
        Some(host) => host,
    };

    Ok(DalkeyConfig {
        plugins,
        build: BuildOptions { entry_points },
        server: ServerOptions { host },
    })
}
