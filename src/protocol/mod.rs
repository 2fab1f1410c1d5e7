// Wire protocol for the tinyFaaS control plane
//
// Request bodies and the endpoint each operation targets.

mod types;

pub(crate) use types::check_threads;
pub use types::{
    ControlPlaneRequest, DeleteRequest, InvokeRequest, Operation, UploadLocalRequest,
    UploadUrlRequest,
};
