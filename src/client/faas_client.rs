// tinyFaaS client implementation
//
// One method per control-plane operation. Each method sends exactly one HTTP
// request on a shared reqwest::Client and returns the response body or a
// FaasError; nothing is retried or cached between calls.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::response::{into_text, send_checked};
use crate::config::ClientConfig;
use crate::errors::{FaasError, Result};
use crate::packaging::{package_directory_within, resolve_source_dir};
use crate::protocol::{
    check_threads, ControlPlaneRequest, DeleteRequest, InvokeRequest, Operation, UploadLocalRequest,
    UploadUrlRequest,
};

/// HTTP client for a tinyFaaS control plane
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FaasClient {
    config: Arc<ClientConfig>,
    http: Client,
}

impl FaasClient {
    /// Create a client for the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().build().map_err(FaasError::Client)?;

        debug!(host = %config.host, port = %config.port, "Created tinyFaaS client");

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Package a local directory and deploy it as function `name`
    ///
    /// `path` is relative to the configured base path unless `is_full_path`
    /// is set. Returns the control plane's response body.
    pub async fn upload_local(
        &self,
        name: &str,
        path: &str,
        env: &str,
        threads: u32,
        is_full_path: bool,
        envs: &[String],
    ) -> Result<String> {
        let start = Instant::now();

        // arguments are checked before the tree is zipped
        check_threads(Operation::UploadLocal, threads)?;

        let dir = resolve_source_dir(&self.config.base_path, path, is_full_path);
        let artifact = package_directory_within(dir.clone(), self.config.packaging_timeout).await?;
        let request = UploadLocalRequest::new(name, env, threads, artifact, envs.to_vec())?;

        let body = self.send_json(&request).await?;

        info!(
            dir = %dir.display(),
            "({}) '{}' deployed successfully ({:?})",
            env,
            name,
            start.elapsed()
        );
        Ok(body)
    }

    /// Deploy function `name` from a zip archive the control plane downloads from `url`
    pub async fn upload_from_url(
        &self,
        name: &str,
        sub_path: &str,
        env: &str,
        threads: u32,
        url: &str,
        envs: &[String],
    ) -> Result<String> {
        let start = Instant::now();

        let request = UploadUrlRequest::new(name, env, threads, url, sub_path, envs.to_vec())?;
        let body = self.send_json(&request).await?;

        info!(url, "({}) '{}' deployed successfully ({:?})", env, name, start.elapsed());
        Ok(body)
    }

    /// Remove function `name`
    pub async fn delete(&self, name: &str) -> Result<()> {
        let start = Instant::now();

        self.send_json(&DeleteRequest::new(name)).await?;

        info!("deleted '{}' function ({:?})", name, start.elapsed());
        Ok(())
    }

    /// Deployed functions, as the control plane's raw response body
    pub async fn list_functions(&self) -> Result<String> {
        self.send_empty(Operation::List).await
    }

    /// Remove every deployed function
    pub async fn wipe_all(&self) -> Result<()> {
        let start = Instant::now();

        self.send_empty(Operation::Wipe).await?;

        info!("wiped functions ({:?})", start.elapsed());
        Ok(())
    }

    /// Execution logs, as the control plane's raw response body
    pub async fn fetch_logs(&self) -> Result<String> {
        self.send_empty(Operation::Logs).await
    }

    /// Call deployed function `name` with `payload` as the request body
    ///
    /// Function responses are arbitrary bytes and are returned exactly as received.
    pub async fn invoke(&self, name: &str, payload: impl Into<Vec<u8>>) -> Result<Vec<u8>> {
        let start = Instant::now();
        let request = InvokeRequest::new(name, payload);

        let url = format!("{}{}", self.config.invocation_base_url(), request.path());
        debug!(url = %url, bytes = request.payload.len(), "Invoking function");

        let builder = self.http.post(&url).body(request.payload);
        let body = send_checked(Operation::Invoke, Some(name), builder).await?;

        info!("resp ({:?}): {}", start.elapsed(), String::from_utf8_lossy(&body));
        Ok(body)
    }

    async fn send_json<R: ControlPlaneRequest>(&self, request: &R) -> Result<String> {
        let operation = R::OPERATION;
        let body = serde_json::to_vec(request)
            .map_err(|source| FaasError::Serialization { operation, source })?;

        let url = self.endpoint_url(operation);
        debug!(url = %url, target = request.target(), "Sending {} request", operation);

        let builder = self
            .http
            .request(operation.method(), &url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let body = send_checked(operation, Some(request.target()), builder).await?;
        into_text(operation, Some(request.target()), body)
    }

    async fn send_empty(&self, operation: Operation) -> Result<String> {
        let url = self.endpoint_url(operation);
        debug!(url = %url, "Sending {} request", operation);

        let builder = self.http.request(operation.method(), &url);
        let body = send_checked(operation, None, builder).await?;
        into_text(operation, None, body)
    }

    fn endpoint_url(&self, operation: Operation) -> String {
        // every operation routed here has a control-plane endpoint
        let endpoint = operation.endpoint().unwrap_or_default();
        self.config.control_plane_url(endpoint)
    }
}
