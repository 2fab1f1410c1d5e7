// Configuration loader
// Builds a ClientConfig from ~/.tinyfaas/config.toml and TINYFAAS_* variables

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::settings::ClientConfig;

/// Location of the user's config file, if a home directory exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tinyfaas/config.toml"))
}

/// Load configuration from the default file and the process environment
///
/// Precedence: environment > config file > built-in defaults. A missing
/// default config file is not an error.
pub fn load_config() -> Result<ClientConfig> {
    let path = default_config_path();
    load_config_with(path.as_deref(), |key| std::env::var(key).ok())
}

/// Load configuration from a file the user named explicitly
///
/// Unlike the default location, the file must exist.
pub fn load_config_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }
    load_config_with(Some(path), env)
}

/// Load configuration from an optional file and a variable lookup
///
/// A `path` that does not exist falls back to defaults.
pub fn load_config_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig> {
    let mut config = ClientConfig::default();

    if let Some(path) = path.filter(|p| p.exists()) {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: TomlConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        file.apply(&mut config);
    }

    if let Some(host) = env("TINYFAAS_HOST").filter(|v| !v.is_empty()) {
        config.host = host;
    }
    if let Some(port) = env("TINYFAAS_PORT").filter(|v| !v.is_empty()) {
        config.port = port;
    }
    if let Some(port) = env("TINYFAAS_INVOKE_PORT").filter(|v| !v.is_empty()) {
        config.invoke_port = port
            .parse()
            .with_context(|| format!("TINYFAAS_INVOKE_PORT is not a port number: {}", port))?;
    }
    if let Some(base_path) = env("TINYFAAS_BASE_PATH").filter(|v| !v.is_empty()) {
        config.base_path = PathBuf::from(base_path);
    }

    Ok(config)
}

#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<PortValue>,
    #[serde(default)]
    invoke_port: Option<u16>,
    #[serde(default)]
    base_path: Option<PathBuf>,
    #[serde(default)]
    packaging_timeout_secs: Option<u64>,
}

/// Ports may be written as `8080` or `"8080"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

impl TomlConfig {
    fn apply(self, config: &mut ClientConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        match self.port {
            Some(PortValue::Number(port)) => config.port = port.to_string(),
            Some(PortValue::Text(port)) => config.port = port,
            None => {}
        }
        if let Some(port) = self.invoke_port {
            config.invoke_port = port;
        }
        if let Some(base_path) = self.base_path {
            config.base_path = base_path;
        }
        if let Some(secs) = self.packaging_timeout_secs {
            config.packaging_timeout = Duration::from_secs(secs);
        }
    }
}
