//! Runtime configuration for avr-verify
//!
//! Merges command-line overrides, environment variables and the TOML file
//! into one settled configuration. Priority: CLI → ENV → TOML → default.

use avr_common::config::{
    self, GatewayConfig, SessionConfig, TomlConfig, ENV_API_TOKEN, ENV_GATEWAY_URL, ENV_PROFILE,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Values the caller may override on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gateway_url: Option<String>,
    pub token: Option<String>,
    pub profile: Option<String>,
    pub data_folder: Option<PathBuf>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyConfig {
    pub data_folder: PathBuf,
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
    pub log_level: String,
}

impl VerifyConfig {
    pub fn resolve(overrides: &Overrides, toml: &TomlConfig) -> Self {
        let base_url = config::resolve_setting(
            overrides.gateway_url.as_deref(),
            ENV_GATEWAY_URL,
            Some(toml.gateway.base_url.as_str()),
            &GatewayConfig::default().base_url,
        );

        let token = config::resolve_setting(
            overrides.token.as_deref(),
            ENV_API_TOKEN,
            toml.gateway.token.as_deref(),
            "",
        );

        let profile = config::resolve_setting(
            overrides.profile.as_deref(),
            ENV_PROFILE,
            Some(toml.session.profile.as_str()),
            &SessionConfig::default().profile,
        );

        let data_folder = config::resolve_data_folder(overrides.data_folder.as_deref(), toml);

        Self {
            data_folder,
            gateway: GatewayConfig {
                base_url,
                token: if token.is_empty() { None } else { Some(token) },
                timeout_secs: toml.gateway.timeout_secs,
            },
            session: SessionConfig {
                profile,
                max_lock_wait_ms: toml.session.max_lock_wait_ms,
            },
            log_level: toml.logging.level.clone(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        config::database_path(&self.data_folder)
    }

    /// Log the settled values (token redacted)
    pub fn log_summary(&self, config_path: Option<&Path>) {
        if let Some(path) = config_path {
            info!("Config file: {}", path.display());
        }
        info!("Data folder: {}", self.data_folder.display());
        info!(
            base_url = %self.gateway.base_url,
            authenticated = self.gateway.token.is_some(),
            timeout_secs = self.gateway.timeout_secs,
            "Gateway"
        );
        info!(profile = %self.session.profile, "Session profile");
    }
}
