//! Read-only projections consumed by the build/serve engine.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{DalkeyConfig, PluginSpec};

/// The inputs the production bundler starts from: the HTML roots of the
/// dependency graph and the plugin sequence, in execution order.
///
/// Pure data. Whether the entries exist on disk is checked by the bundler
/// when it opens them, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundlePlan {
    pub entries: Vec<PathBuf>,
    pub plugins: Vec<PluginSpec>,
}

impl BundlePlan {
    #[must_use]
    pub fn from_config(config: &DalkeyConfig) -> Self {
        Self {
            entries: config.build.entry_points.iter().map(PathBuf::from).collect(),
            plugins: config.plugins.clone(),
        }
    }

    /// The same plan with entries joined onto a project root.
    #[must_use]
    pub fn rooted(self, root: &Path) -> Self {
        Self {
            entries: self.entries.iter().map(|e| root.join(e)).collect(),
            plugins: self.plugins,
        }
    }
}
