//! Loader for the IDE's `build.bff` handoff file.
//!
//! The IDE writes `build.bff` at the start of every YYC build. It is a JSON
//! document describing the project being compiled and where the compiler
//! caches its output. Only the four fields we consume are modeled; the rest
//! of the document is ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a `build.bff` file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path} as build.bff JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The `preferences` entry is a file path inside the cache directory;
    /// a bare filename gives us nothing to anchor on.
    #[error("preferences path {path} has no parent directory")]
    NoCacheDir { path: PathBuf },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildBffData {
    project_name: String,
    project_dir: PathBuf,
    config: String,
    preferences: PathBuf,
}

/// Resolved build session configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub project_name: String,
    /// Root of the GameMaker project, where `scripts/` and `objects/` live.
    pub project_dir: PathBuf,
    /// Active build configuration name, e.g. `Default`.
    pub config: String,
    cache_dir: PathBuf,
}

impl BuildConfig {
    pub fn new(
        project_name: impl Into<String>,
        project_dir: impl Into<PathBuf>,
        config: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            project_dir: project_dir.into(),
            config: config.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Load and validate a `build.bff` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let data: BuildBffData =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let cache_dir = data
            .preferences
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ConfigError::NoCacheDir {
                path: data.preferences.clone(),
            })?
            .to_path_buf();

        tracing::debug!(
            project = %data.project_name,
            config = %data.config,
            cache_dir = %cache_dir.display(),
            "loaded build.bff"
        );

        Ok(Self {
            project_name: data.project_name,
            project_dir: data.project_dir,
            config: data.config,
            cache_dir,
        })
    }

    /// The compiler's cache root, derived from the `preferences` entry.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory holding the generated `.gml.cpp` files for this session.
    pub fn output_dir(&self) -> PathBuf {
        self.cache_dir
            .join(&self.project_name)
            .join(&self.config)
            .join("Scripts")
            .join("llvm-win")
    }
}

/// Default `build.bff` location on Windows, if `LOCALAPPDATA` is set.
pub fn default_build_bff_path() -> Option<PathBuf> {
    std::env::var_os("LOCALAPPDATA").map(|base| {
        Path::new(&base)
            .join("GameMakerStudio2")
            .join("GMS2TEMP")
            .join("build.bff")
    })
}
