//! Settings of a reader, kept in `Curator.toml`.
//!
//! ```toml
//! api_base = "http://localhost:3001"
//! storage = ".curator/archive.redb"
//! share_base = "http://localhost:3000/"
//! breakpoint = 768
//! viewport_width = 1280
//!
//! [latency]
//! list_ms = 600
//! get_ms = 400
//! create_ms = 1000
//! ```
//! Every field is optional.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    gateway::{Gateway, Latency},
    store::{FailToAccessBackend, FallbackStore, RedbBackend},
    utils::{read_to_string, write},
    view::{DEFAULT_BREAKPOINT, ViewState},
};

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "Curator.toml";

const DEFAULT_API_BASE: &str = "http://localhost:3001";
const DEFAULT_SHARE_BASE: &str = "http://localhost:3000/";
const DEFAULT_STORAGE: &str = ".curator/archive.redb";
const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Errors that can occur when opening the configuration.
#[derive(Debug, thiserror::Error)]
pub enum FailToOpenConfig {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// The archive address cannot take a path
    #[error("`{0}` cannot serve as an archive address")]
    NotABase(Url),
}

/// Reader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    api_base: Url,
    storage: PathBuf,
    share_base: Url,
    breakpoint: u32,
    viewport_width: u32,
    latency: Latency,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            storage: PathBuf::from(DEFAULT_STORAGE),
            share_base: Url::parse(DEFAULT_SHARE_BASE).expect("default share base is a valid URL"),
            breakpoint: DEFAULT_BREAKPOINT,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            latency: Latency::default(),
        }
    }
}

impl CuratorConfig {
    /// Read the configuration at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, FailToOpenConfig> {
        let content = read_to_string(path).await?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the archive address can carry endpoint paths.
    ///
    /// # Errors
    /// Returns [`FailToOpenConfig::NotABase`] for addresses such as `mailto:` URLs.
    pub fn validate(&self) -> Result<(), FailToOpenConfig> {
        if self.api_base.cannot_be_a_base() {
            return Err(FailToOpenConfig::NotABase(self.api_base.clone()));
        }
        Ok(())
    }

    /// Read the configuration at `path`, or the defaults if there is no such file.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open_or_default(path: impl AsRef<Path>) -> Result<Self, FailToOpenConfig> {
        match Self::open(path).await {
            Err(FailToOpenConfig::Io(err)) if err.kind() == ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Export the configuration to a TOML string.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).expect("Failed to serialize config to TOML")
    }

    /// Save the configuration to a file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if the file cannot be written
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        write(path, self.to_toml()).await
    }

    /// Base URL of the remote archive.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Set the base URL of the remote archive.
    pub fn set_api_base(&mut self, api_base: Url) {
        self.api_base = api_base;
    }

    /// Location of the local snapshot database.
    #[must_use]
    pub fn storage(&self) -> &Path {
        &self.storage
    }

    /// Set the location of the local snapshot database.
    pub fn set_storage(&mut self, storage: impl Into<PathBuf>) {
        self.storage = storage.into();
    }

    /// Address share links point to.
    #[must_use]
    pub const fn share_base(&self) -> &Url {
        &self.share_base
    }

    /// Width below which the layout is narrow.
    #[must_use]
    pub const fn breakpoint(&self) -> u32 {
        self.breakpoint
    }

    /// Assumed viewport width.
    #[must_use]
    pub const fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// Set the assumed viewport width.
    pub const fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    /// Simulated latency of remote calls.
    #[must_use]
    pub const fn latency(&self) -> Latency {
        self.latency
    }

    /// Set the simulated latency of remote calls.
    pub const fn set_latency(&mut self, latency: Latency) {
        self.latency = latency;
    }

    /// Gateway to the configured archive, backed by the configured snapshot file.
    ///
    /// # Errors
    /// Returns an error if the snapshot database cannot be opened.
    pub fn open_gateway(&self) -> Result<Gateway, FailToAccessBackend> {
        let backend = RedbBackend::open(&self.storage)?;
        Ok(self.gateway_with(FallbackStore::new(backend)))
    }

    /// Gateway to the configured archive over the given snapshot store.
    #[must_use]
    pub fn gateway_with(&self, store: FallbackStore) -> Gateway {
        Gateway::new(self.api_base.clone(), store).with_latency(self.latency)
    }

    /// Fresh view state for the configured viewport.
    #[must_use]
    pub const fn view_state(&self) -> ViewState {
        ViewState::new(self.viewport_width, self.breakpoint)
    }
}
