// Local source packaging
//
// Turns a function's source directory into the base64 zip artifact the
// upload endpoint expects. Pure library code: no shell, no subprocess.

mod archive;

pub use archive::{package_directory, package_directory_within, resolve_source_dir, zip_directory};
