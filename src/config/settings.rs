// Client configuration

use std::path::PathBuf;
use std::time::Duration;

/// Port deployed functions are invoked on, separate from the management port
pub const DEFAULT_INVOKE_PORT: u16 = 8000;

/// Upper bound on zipping a function directory
pub const DEFAULT_PACKAGING_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the control plane lives and where local function sources are found
///
/// Immutable once handed to a `FaasClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Control-plane host (e.g., "localhost")
    pub host: String,

    /// Control-plane management port (e.g., "8080")
    pub port: String,

    /// Root directory for relative function paths
    pub base_path: PathBuf,

    /// Port for function invocations
    pub invoke_port: u16,

    /// Limit on the local packaging step
    pub packaging_timeout: Duration,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: impl Into<String>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            base_path: base_path.into(),
            invoke_port: DEFAULT_INVOKE_PORT,
            packaging_timeout: DEFAULT_PACKAGING_TIMEOUT,
        }
    }

    pub fn with_invoke_port(mut self, invoke_port: u16) -> Self {
        self.invoke_port = invoke_port;
        self
    }

    pub fn with_packaging_timeout(mut self, timeout: Duration) -> Self {
        self.packaging_timeout = timeout;
        self
    }

    /// `http://host:port/endpoint` on the management port
    pub fn control_plane_url(&self, endpoint: &str) -> String {
        format!("http://{}:{}/{}", self.host, self.port, endpoint.trim_start_matches('/'))
    }

    /// `http://host:invoke_port` prefix for function calls
    pub fn invocation_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.invoke_port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("localhost", "8080", ".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, "8080");
        assert_eq!(config.invoke_port, 8000);
        assert_eq!(config.packaging_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_urls() {
        let config = ClientConfig::new("10.0.0.5", "9090", "/fns").with_invoke_port(9000);
        assert_eq!(config.control_plane_url("uploadURL"), "http://10.0.0.5:9090/uploadURL");
        assert_eq!(config.control_plane_url("/list"), "http://10.0.0.5:9090/list");
        assert_eq!(config.invocation_base_url(), "http://10.0.0.5:9000");
    }
}
