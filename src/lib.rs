// tinyfaas-client - Client for the tinyFaaS control plane
// Library exports

pub mod client; // HTTP client, one request per operation
pub mod config;
pub mod errors;
pub mod packaging; // Directory → base64 zip artifact
pub mod protocol; // Request bodies and endpoints

pub use client::FaasClient;
pub use config::ClientConfig;
pub use errors::{FaasError, Result};
pub use packaging::package_directory;
pub use protocol::Operation;
