//! Archive detection and extraction

use flate2::read::GzDecoder;
use impack_errors::{Error, StageError};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive as TarArchive;
use tokio::task;

/// Archive formats accepted for component downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

/// Detect the archive format from the file's leading bytes
///
/// Download URLs rarely carry a reliable extension (`archive.zip?ref=v2`,
/// `/repository/archive/<ref>`), so the content decides.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn detect_format(path: &Path) -> Result<Option<ArchiveFormat>, Error> {
    let mut header = [0u8; 512];
    let mut file = File::open(path).map_err(|e| Error::io_with_path(&e, path))?;
    let mut filled = 0;
    while filled < header.len() {
        let read = file
            .read(&mut header[filled..])
            .map_err(|e| Error::io_with_path(&e, path))?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    let header = &header[..filled];

    Ok(if header.starts_with(b"PK\x03\x04") || header.starts_with(b"PK\x05\x06") {
        Some(ArchiveFormat::Zip)
    } else if header.starts_with(&[0x1f, 0x8b]) {
        Some(ArchiveFormat::TarGz)
    } else if header.len() >= 262 && &header[257..262] == b"ustar" {
        Some(ArchiveFormat::Tar)
    } else {
        None
    })
}

/// Extract an archive into `dest_dir`
///
/// # Errors
///
/// Returns `StageError::UnsupportedArchive` if the content is not a zip,
/// tar or tar.gz archive, or `StageError::ExtractionFailed` if unpacking
/// fails.
pub async fn extract(archive_path: &Path, dest_dir: &Path, url: &str) -> Result<(), Error> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| StageError::ExtractionFailed {
            message: format!("failed to create destination directory: {e}"),
        })?;

    let archive_path = archive_path.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();
    let url = url.to_string();

    task::spawn_blocking(move || {
        match detect_format(&archive_path)? {
            Some(ArchiveFormat::Zip) => extract_zip(&archive_path, &dest_dir),
            Some(ArchiveFormat::TarGz) => {
                let file = open(&archive_path)?;
                unpack_tar(TarArchive::new(GzDecoder::new(file)), &dest_dir, "tar.gz")
            }
            Some(ArchiveFormat::Tar) => {
                let file = open(&archive_path)?;
                unpack_tar(TarArchive::new(file), &dest_dir, "tar")
            }
            None => Err(StageError::UnsupportedArchive { url }.into()),
        }
    })
    .await
    .map_err(|e| StageError::ExtractionFailed {
        message: format!("task join error: {e}"),
    })?
}

fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|e| {
        StageError::ExtractionFailed {
            message: format!("failed to open archive: {e}"),
        }
        .into()
    })
}

fn unpack_tar<R: Read>(
    mut archive: TarArchive<R>,
    dest_dir: &Path,
    kind: &str,
) -> Result<(), Error> {
    archive.unpack(dest_dir).map_err(|e| {
        StageError::ExtractionFailed {
            message: format!("failed to extract {kind}: {e}"),
        }
        .into()
    })
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), Error> {
    let file = open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| StageError::ExtractionFailed {
        message: format!("failed to read zip archive: {e}"),
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| StageError::ExtractionFailed {
            message: format!("failed to read zip entry: {e}"),
        })?;

        let outpath: PathBuf = match entry.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| StageError::ExtractionFailed {
                message: format!("failed to create directory: {e}"),
            })?;
        } else {
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent).map_err(|e| StageError::ExtractionFailed {
                    message: format!("failed to create parent directory: {e}"),
                })?;
            }
            let mut outfile = File::create(&outpath).map_err(|e| StageError::ExtractionFailed {
                message: format!("failed to create file: {e}"),
            })?;
            std::io::copy(&mut entry, &mut outfile).map_err(|e| StageError::ExtractionFailed {
                message: format!("failed to extract file: {e}"),
            })?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
            }
        }
    }

    Ok(())
}
