//! Layered CLI configuration
use ampache_catalog::CatalogSettings;
use ampache_client::ClientConfig;
use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the CLI needs to connect, browse and play
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub client: ClientConfig,
    pub catalog: CatalogSettings,
    pub player: PlayerSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerSettings {
    /// Speed-up of the simulated playback (2.0 plays a 4 minute track in 2 minutes)
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

fn default_time_scale() -> f64 {
    1.0
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
        }
    }
}

/// Tuning sections; server settings live at the top level
#[derive(Debug, Default, Deserialize)]
struct Sections {
    #[serde(default)]
    catalog: CatalogSettings,

    #[serde(default)]
    player: PlayerSettings,
}

/// Command-line values that take precedence over every other layer
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub user: Option<String>,
}

impl AppSettings {
    /// Load configuration from files and environment
    ///
    /// Layers, lowest precedence first: the JSON credentials file (created
    /// with defaults when missing), the optional TOML settings file,
    /// `AMPACHE_`-prefixed environment variables (`__` separates sections,
    /// e.g. `AMPACHE_CATALOG__PAGE_SIZE`), then `overrides`.
    pub fn load(
        credentials_file: &Path,
        settings_file: Option<&Path>,
        overrides: Overrides,
    ) -> anyhow::Result<Self> {
        let environment = Environment::with_prefix("AMPACHE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);

        Self::load_with(credentials_file, settings_file, environment, overrides)
    }

    pub(crate) fn load_with(
        credentials_file: &Path,
        settings_file: Option<&Path>,
        environment: Environment,
        overrides: Overrides,
    ) -> anyhow::Result<Self> {
        // Writes the default file on first run
        ClientConfig::load(credentials_file).with_context(|| {
            format!("Failed to read configuration {}", credentials_file.display())
        })?;

        let mut builder = Config::builder()
            .add_source(File::from(credentials_file).format(FileFormat::Json));

        if let Some(path) = settings_file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let config = builder
            .add_source(environment)
            .set_override_option("server_url", overrides.server_url)?
            .set_override_option("user", overrides.user)?
            .build()
            .context("Failed to assemble configuration")?;

        let client: ClientConfig = config
            .clone()
            .try_deserialize()
            .context("Invalid server configuration")?;
        let sections: Sections = config
            .try_deserialize()
            .context("Invalid catalog or player settings")?;

        Ok(Self {
            client,
            catalog: sections.catalog,
            player: sections.player,
        })
    }
}
