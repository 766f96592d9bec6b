//! Filesystem helpers for staging directories

use impack_errors::Error;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Whether `dir` has no entries
pub(crate) async fn is_empty_dir(dir: &Path) -> Result<bool, Error> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?;
    Ok(entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?
        .is_none())
}

/// Find the content root of an unpacked archive
///
/// An archive holding a single top-level directory is unwrapped one level.
pub(crate) async fn find_source_root(dir: &Path) -> Result<PathBuf, Error> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?;
    let mut count = 0;
    let mut single_dir = None;

    while let Some(entry) = entries.next_entry().await? {
        count += 1;
        if count > 1 {
            return Ok(dir.to_path_buf());
        }
        if entry.file_type().await?.is_dir() {
            single_dir = Some(entry.path());
        }
    }

    Ok(match (count, single_dir) {
        (1, Some(inner)) => inner,
        _ => dir.to_path_buf(),
    })
}

/// Move every entry of `src` into `dest`
///
/// Entries are renamed; when that fails (e.g. across filesystems) they are
/// copied and the source removed.
pub(crate) async fn move_contents(src: &Path, dest: &Path) -> Result<(), Error> {
    let src = src.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || move_contents_blocking(&src, &dest))
        .await
        .map_err(|e| Error::internal(format!("task join error: {e}")))?
}

fn move_contents_blocking(src: &Path, dest: &Path) -> Result<(), Error> {
    std::fs::create_dir_all(dest).map_err(|e| Error::io_with_path(&e, dest))?;
    for entry in std::fs::read_dir(src).map_err(|e| Error::io_with_path(&e, src))? {
        let entry = entry?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        if std::fs::rename(&from, &to).is_err() {
            copy_recursive(&from, &to)?;
            if from.is_dir() {
                std::fs::remove_dir_all(&from).map_err(|e| Error::io_with_path(&e, &from))?;
            } else {
                std::fs::remove_file(&from).map_err(|e| Error::io_with_path(&e, &from))?;
            }
        }
    }
    Ok(())
}

fn copy_recursive(from: &Path, to: &Path) -> Result<(), Error> {
    let file_type = std::fs::symlink_metadata(from)
        .map_err(|e| Error::io_with_path(&e, from))?
        .file_type();

    if file_type.is_dir() {
        std::fs::create_dir_all(to).map_err(|e| Error::io_with_path(&e, to))?;
        for entry in std::fs::read_dir(from).map_err(|e| Error::io_with_path(&e, from))? {
            let entry = entry?;
            copy_recursive(&entry.path(), &to.join(entry.file_name()))?;
        }
    } else if file_type.is_symlink() {
        #[cfg(unix)]
        {
            let target = std::fs::read_link(from).map_err(|e| Error::io_with_path(&e, from))?;
            std::os::unix::fs::symlink(target, to).map_err(|e| Error::io_with_path(&e, to))?;
        }
    } else {
        std::fs::copy(from, to).map_err(|e| Error::io_with_path(&e, to))?;
    }
    Ok(())
}

/// Remove everything inside `dir`, keeping the directory itself
pub(crate) async fn clear_dir(dir: &Path) -> Result<(), Error> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            fs::remove_dir_all(&path)
                .await
                .map_err(|e| Error::io_with_path(&e, &path))?;
        } else {
            fs::remove_file(&path)
                .await
                .map_err(|e| Error::io_with_path(&e, &path))?;
        }
    }
    Ok(())
}
