// Error types and user-friendly error messages
//
// FaasError is the single error type returned by the library. The hint
// helpers turn an error into an actionable message for the CLI; the library
// itself never prints or exits.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::protocol::Operation;

pub type Result<T> = std::result::Result<T, FaasError>;

#[derive(Debug, Error)]
pub enum FaasError {
    /// Local archival failed for a reason other than I/O (zip error, timeout, empty tree)
    #[error("failed to package '{}': {message}", .dir.display())]
    Packaging { dir: PathBuf, message: String },

    /// Local archival failed while reading the source tree
    #[error("failed to package '{}': {source}", .dir.display())]
    PackagingIo {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Request arguments rejected before anything was sent
    #[error("{operation}: {message}")]
    InvalidArgument {
        operation: Operation,
        message: String,
    },

    #[error("{operation}: failed to encode request body: {source}")]
    Serialization {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    /// The request never reached the server, or the response never came back
    #[error("{operation}{}: request failed after {elapsed:?}: {source}", target_suffix(.target))]
    Transport {
        operation: Operation,
        target: Option<String>,
        elapsed: Duration,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    ///
    /// `body` is the response body exactly as received.
    #[error("{operation}{}: ({status}) non-successful response after {elapsed:?}. body: {}", target_suffix(.target), String::from_utf8_lossy(.body))]
    Server {
        operation: Operation,
        target: Option<String>,
        status: u16,
        body: Vec<u8>,
        elapsed: Duration,
    },

    /// A 2xx control-plane response whose body is not UTF-8 text
    #[error("{operation}{}: response body is not valid UTF-8: {source}", target_suffix(.target))]
    Decode {
        operation: Operation,
        target: Option<String>,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

fn target_suffix(target: &Option<String>) -> String {
    match target {
        Some(name) => format!(" '{}'", name),
        None => String::new(),
    }
}

impl FaasError {
    /// Operation the error belongs to, if it came from one
    pub fn operation(&self) -> Option<Operation> {
        match self {
            FaasError::Packaging { .. } | FaasError::PackagingIo { .. } => {
                Some(Operation::UploadLocal)
            }
            FaasError::InvalidArgument { operation, .. }
            | FaasError::Serialization { operation, .. }
            | FaasError::Transport { operation, .. }
            | FaasError::Server { operation, .. }
            | FaasError::Decode { operation, .. } => Some(*operation),
            FaasError::Client(_) => None,
        }
    }

    /// HTTP status for server errors
    pub fn status(&self) -> Option<u16> {
        match self {
            FaasError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server error body, if it is valid UTF-8
    pub fn body_text(&self) -> Option<&str> {
        match self {
            FaasError::Server { body, .. } => std::str::from_utf8(body).ok(),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FaasError::Transport { .. })
    }
}

/// Suggest a fix for errors the user can act on
pub fn user_hint(error: &FaasError) -> Option<String> {
    match error {
        FaasError::Transport { source, .. } if source.is_connect() => {
            let address = source
                .url()
                .map(|url| {
                    format!(
                        "{}:{}",
                        url.host_str().unwrap_or("?"),
                        url.port_or_known_default().unwrap_or(80)
                    )
                })
                .unwrap_or_else(|| "the configured address".to_string());
            Some(connection_refused_error(&address))
        }
        FaasError::Transport { source, .. } if source.is_timeout() => Some(
            wrap_error_with_suggestion(
                "The control plane did not answer in time",
                "Check that the host is reachable and not overloaded",
            ),
        ),
        FaasError::PackagingIo { dir, source } if source.kind() == io::ErrorKind::NotFound => {
            Some(directory_not_found_error(&dir.display().to_string()))
        }
        FaasError::Server {
            operation: Operation::Invoke,
            target: Some(name),
            status: 404,
            ..
        } => Some(function_not_deployed_error(name)),
        _ => None,
    }
}

/// Format a connection refused error with helpful suggestions
pub fn connection_refused_error(address: &str) -> String {
    format!(
        "Could not connect to tinyFaaS at {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • The control plane is not running\n\
        • Wrong host or port\n\
        • The invocation port differs from the default 8000\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Pass the right address:\n\
           \x1b[36mtinyfaas --host <host> --port <port> list\x1b[0m\n\n\
        2. Check ~/.tinyfaas/config.toml or TINYFAAS_HOST / TINYFAAS_PORT",
        address
    )
}

/// Format a missing source directory error
pub fn directory_not_found_error(path: &str) -> String {
    format!(
        "Function directory not found: {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Path is relative to --base-path, not the current directory\n\
        • Directory was moved or deleted\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Pass an absolute path with \x1b[36m--full-path\x1b[0m\n\n\
        2. Check the directory:\n\
           \x1b[36mls -la {}\x1b[0m",
        path, path
    )
}

/// Format an invocation of an unknown function
pub fn function_not_deployed_error(name: &str) -> String {
    format!(
        "Function '{}' is not deployed\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. List deployed functions:\n\
           \x1b[36mtinyfaas list\x1b[0m\n\n\
        2. Upload it first:\n\
           \x1b[36mtinyfaas upload {} <path> <env>\x1b[0m",
        name, name
    )
}

/// Wrap a generic error with a suggestion
pub fn wrap_error_with_suggestion(error: impl fmt::Display, suggestion: &str) -> String {
    format!(
        "{}\n\n\
        \x1b[1;33mSuggestion:\x1b[0m {}",
        error, suggestion
    )
}
