// Control-plane request types
//
// Each management operation maps to one endpoint and one JSON body. Field
// names here are the wire contract the tinyFaaS control plane expects.

use reqwest::Method;
use serde::Serialize;
use std::fmt;

use crate::errors::{FaasError, Result};

/// Every operation the client can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    UploadLocal,
    UploadUrl,
    Delete,
    List,
    Wipe,
    Logs,
    Invoke,
}

impl Operation {
    /// Short name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Operation::UploadLocal => "upload",
            Operation::UploadUrl => "upload-url",
            Operation::Delete => "delete",
            Operation::List => "list",
            Operation::Wipe => "wipe",
            Operation::Logs => "logs",
            Operation::Invoke => "invoke",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Operation::List | Operation::Logs => Method::GET,
            _ => Method::POST,
        }
    }

    /// Control-plane endpoint path
    ///
    /// Returns None for `Invoke`: invocations go to `/{name}` on the
    /// invocation port, not to a fixed management endpoint.
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            Operation::UploadLocal => Some("upload"),
            Operation::UploadUrl => Some("uploadURL"),
            Operation::Delete => Some("delete"),
            Operation::List => Some("list"),
            Operation::Wipe => Some("wipe"),
            Operation::Logs => Some("logs"),
            Operation::Invoke => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JSON request sent to a control-plane endpoint
pub trait ControlPlaneRequest: Serialize {
    const OPERATION: Operation;

    /// Name of the function the request acts on
    fn target(&self) -> &str;
}

/// Body of `POST /upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadLocalRequest {
    pub name: String,

    /// Runtime environment, e.g. "nodejs" or "python3"
    #[serde(rename = "env")]
    pub runtime_env: String,

    pub threads: u32,

    /// Base64-encoded zip of the function's source directory
    #[serde(rename = "zip")]
    pub artifact: String,

    /// "KEY=VALUE" entries, always serialized (empty list when none)
    pub envs: Vec<String>,
}

impl UploadLocalRequest {
    pub fn new(
        name: impl Into<String>,
        runtime_env: impl Into<String>,
        threads: u32,
        artifact: String,
        envs: Vec<String>,
    ) -> Result<Self> {
        check_threads(Operation::UploadLocal, threads)?;
        Ok(Self {
            name: name.into(),
            runtime_env: runtime_env.into(),
            threads,
            artifact,
            envs,
        })
    }
}

impl ControlPlaneRequest for UploadLocalRequest {
    const OPERATION: Operation = Operation::UploadLocal;

    fn target(&self) -> &str {
        &self.name
    }
}

/// Body of `POST /uploadURL`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadUrlRequest {
    pub name: String,

    #[serde(rename = "env")]
    pub runtime_env: String,

    pub threads: u32,

    /// URL of a zip archive the control plane downloads itself
    #[serde(rename = "url")]
    pub source_url: String,

    /// Folder inside the downloaded archive holding the function
    pub subfolder_path: String,

    pub envs: Vec<String>,
}

impl UploadUrlRequest {
    pub fn new(
        name: impl Into<String>,
        runtime_env: impl Into<String>,
        threads: u32,
        source_url: impl Into<String>,
        subfolder_path: impl Into<String>,
        envs: Vec<String>,
    ) -> Result<Self> {
        check_threads(Operation::UploadUrl, threads)?;
        Ok(Self {
            name: name.into(),
            runtime_env: runtime_env.into(),
            threads,
            source_url: source_url.into(),
            subfolder_path: subfolder_path.into(),
            envs,
        })
    }
}

impl ControlPlaneRequest for UploadUrlRequest {
    const OPERATION: Operation = Operation::UploadUrl;

    fn target(&self) -> &str {
        &self.name
    }
}

/// Body of `POST /delete`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteRequest {
    pub name: String,
}

impl DeleteRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ControlPlaneRequest for DeleteRequest {
    const OPERATION: Operation = Operation::Delete;

    fn target(&self) -> &str {
        &self.name
    }
}

/// A call to a deployed function
///
/// The payload is sent as the raw request body, not wrapped in JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub name: String,
    pub payload: Vec<u8>,
}

impl InvokeRequest {
    pub fn new(name: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// Request path on the invocation port
    pub fn path(&self) -> String {
        format!("/{}", self.name.trim_start_matches('/'))
    }
}

/// `threads` must be a positive integer
pub(crate) fn check_threads(operation: Operation, threads: u32) -> Result<()> {
    if threads == 0 {
        return Err(FaasError::InvalidArgument {
            operation,
            message: "threads must be a positive integer".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoints_match_control_plane_routes() {
        assert_eq!(Operation::UploadLocal.endpoint(), Some("upload"));
        assert_eq!(Operation::UploadUrl.endpoint(), Some("uploadURL"));
        assert_eq!(Operation::Delete.endpoint(), Some("delete"));
        assert_eq!(Operation::List.endpoint(), Some("list"));
        assert_eq!(Operation::Wipe.endpoint(), Some("wipe"));
        assert_eq!(Operation::Logs.endpoint(), Some("logs"));
        assert_eq!(Operation::Invoke.endpoint(), None);
    }

    #[test]
    fn test_only_list_and_logs_are_get() {
        assert_eq!(Operation::List.method(), Method::GET);
        assert_eq!(Operation::Logs.method(), Method::GET);
        assert_eq!(Operation::Wipe.method(), Method::POST);
        assert_eq!(Operation::Delete.method(), Method::POST);
        assert_eq!(Operation::Invoke.method(), Method::POST);
    }

    #[test]
    fn test_upload_local_uses_wire_field_names() {
        let request =
            UploadLocalRequest::new("sieve", "nodejs", 2, "UEsDBA==".to_string(), vec![]).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "sieve",
                "env": "nodejs",
                "threads": 2,
                "zip": "UEsDBA==",
                "envs": []
            })
        );
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = UploadUrlRequest::new("f", "python3", 0, "http://x/a.zip", "a", vec![])
            .unwrap_err();
        assert!(matches!(
            err,
            FaasError::InvalidArgument {
                operation: Operation::UploadUrl,
                ..
            }
        ));
    }

    #[test]
    fn test_invoke_path_has_single_leading_slash() {
        assert_eq!(InvokeRequest::new("sieve", "x").path(), "/sieve");
        assert_eq!(InvokeRequest::new("/sieve", "x").path(), "/sieve");
    }
}
