// HTTP client for the tinyFaaS control plane
//
// Provides FaasClient: upload, delete, list, wipe, logs and invoke, each as a
// single request validated into a body string or a FaasError.

mod faas_client;
mod response;

pub use faas_client::FaasClient;
