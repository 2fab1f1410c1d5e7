// Zip + base64 packaging of a function's source directory

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{FaasError, Result};

/// Resolve the directory an upload should package
///
/// Without `is_full_path`, `path` is always taken below `base_path`: a
/// leading `/` (or drive prefix) is dropped instead of replacing the base.
pub fn resolve_source_dir(base_path: &Path, path: impl AsRef<Path>, is_full_path: bool) -> PathBuf {
    let path = path.as_ref();
    if is_full_path {
        return path.to_path_buf();
    }

    let relative: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    base_path.join(relative)
}

/// Zip `dir` recursively and return the archive base64-encoded, without newlines
pub fn package_directory(dir: &Path) -> Result<String> {
    let archive = zip_directory(dir)?;
    debug!(dir = %dir.display(), bytes = archive.len(), "Packaged function directory");
    Ok(BASE64.encode(archive))
}

/// `package_directory` on the blocking pool, bounded by `limit`
pub async fn package_directory_within(dir: PathBuf, limit: Duration) -> Result<String> {
    let task_dir = dir.clone();
    let task = tokio::task::spawn_blocking(move || package_directory(&task_dir));

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(FaasError::Packaging {
            dir,
            message: format!("packaging task failed: {}", join_error),
        }),
        Err(_) => Err(FaasError::Packaging {
            dir,
            message: format!("timed out after {:?}", limit),
        }),
    }
}

/// Build an in-memory zip of everything under `dir`
///
/// Entry names are relative to `dir` and `/`-separated. Symlinks are followed,
/// so linked files are stored with their target's contents; dangling links
/// are skipped with a warning, as `zip -r` does. Empty sub-directories are
/// kept as directory entries.
pub fn zip_directory(dir: &Path) -> Result<Vec<u8>> {
    let zip_err = |e: zip::result::ZipError| FaasError::Packaging {
        dir: dir.to_path_buf(),
        message: e.to_string(),
    };
    let entry_err = |path: &Path, e: io::Error| FaasError::Packaging {
        dir: dir.to_path_buf(),
        message: format!("{}: {}", path.display(), e),
    };

    let metadata = std::fs::metadata(dir).map_err(|source| FaasError::PackagingIo {
        dir: dir.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(FaasError::Packaging {
            dir: dir.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let base_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut entry_count = 0usize;

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_dangling_link(&e) => {
                warn!(path = ?e.path(), "Skipping broken symlink");
                continue;
            }
            Err(e) => {
                return Err(FaasError::Packaging {
                    dir: dir.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        let name = entry_name(dir, entry.path())?;
        let options = with_permissions(base_options, &entry)?;

        if entry.file_type().is_dir() {
            writer.add_directory(name, options).map_err(zip_err)?;
            entry_count += 1;
        } else if entry.file_type().is_file() {
            writer.start_file(name, options).map_err(zip_err)?;
            let mut file = File::open(entry.path()).map_err(|e| entry_err(entry.path(), e))?;
            io::copy(&mut file, &mut writer).map_err(|e| entry_err(entry.path(), e))?;
            entry_count += 1;
        }
        // sockets, fifos and device files are skipped
    }

    if entry_count == 0 {
        return Err(FaasError::Packaging {
            dir: dir.to_path_buf(),
            message: "directory is empty".to_string(),
        });
    }

    let cursor = writer.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}

fn is_dangling_link(e: &walkdir::Error) -> bool {
    let not_found = e
        .io_error()
        .map_or(false, |io| io.kind() == io::ErrorKind::NotFound);
    let is_link = e
        .path()
        .and_then(|p| std::fs::symlink_metadata(p).ok())
        .map_or(false, |m| m.file_type().is_symlink());
    not_found && is_link
}

/// Archive name of `path`; names must be valid UTF-8 so they survive unchanged
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| FaasError::Packaging {
        dir: root.to_path_buf(),
        message: format!("{} escapes the source directory", path.display()),
    })?;

    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str().to_str().ok_or_else(|| FaasError::Packaging {
                dir: root.to_path_buf(),
                message: format!("file name is not valid UTF-8: {}", path.display()),
            })
        })
        .collect::<Result<Vec<&str>>>()?;
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn with_permissions(
    options: SimpleFileOptions,
    entry: &walkdir::DirEntry,
) -> Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = entry.metadata().map_err(|e| FaasError::Packaging {
        dir: entry.path().to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(options.unix_permissions(metadata.permissions().mode() & 0o777))
}

#[cfg(not(unix))]
fn with_permissions(
    options: SimpleFileOptions,
    _entry: &walkdir::DirEntry,
) -> Result<SimpleFileOptions> {
    Ok(options)
}
