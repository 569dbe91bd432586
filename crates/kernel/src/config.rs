//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::authority::Authority;
use crate::builder::{BuildOptions, DEFAULT_HOME_PATH, DEFAULT_MAX_DEPTH};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Route catalog file (WAYPOINT_CATALOG).
    pub catalog: Option<PathBuf>,

    /// Pinned home path (default: /home).
    pub home_path: String,

    /// Nesting depth supported by the router (default: 2).
    pub max_depth: usize,

    /// Authority used when none is given on the command line.
    pub authority: Option<Authority>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            home_path: DEFAULT_HOME_PATH.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            authority: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let catalog = lookup("WAYPOINT_CATALOG")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let home_path = lookup("WAYPOINT_HOME_PATH").unwrap_or_else(|| DEFAULT_HOME_PATH.to_string());
        if !home_path.starts_with('/') {
            bail!("WAYPOINT_HOME_PATH must be an absolute path, got '{home_path}'");
        }

        let max_depth = match lookup("WAYPOINT_MAX_DEPTH") {
            Some(v) => v
                .trim()
                .parse()
                .context("WAYPOINT_MAX_DEPTH must be a positive integer")?,
            None => DEFAULT_MAX_DEPTH,
        };
        if max_depth == 0 {
            bail!("WAYPOINT_MAX_DEPTH must be at least 1");
        }

        let authority = lookup("WAYPOINT_AUTHORITY")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse::<Authority>())
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("invalid WAYPOINT_AUTHORITY")?;

        Ok(Self {
            catalog,
            home_path,
            max_depth,
            authority,
        })
    }

    /// Route build options from this configuration.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            home_path: self.home_path.clone(),
            max_depth: self.max_depth,
        }
    }
}
