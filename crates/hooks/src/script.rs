//! Appending to hook script files

use impack_errors::{Error, HookError};
use std::path::Path;
use tokio::fs;

/// First line of every generated hook file
pub const SHEBANG: &str = "#!/usr/bin/env bash";

/// Append rendered content to a hook file
///
/// A new file starts with the shebang and a blank line; an existing file
/// keeps its content and gets a blank line before the new content. The file
/// is made executable.
///
/// # Errors
///
/// Returns `HookError::WriteFailed` if the file cannot be read, written or
/// have its permissions changed.
pub async fn append_script(path: &Path, content: &str) -> Result<(), Error> {
    let existing = match fs::read_to_string(path).await {
        Ok(existing) => existing,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => format!("{SHEBANG}\n"),
        Err(e) => return Err(write_failed(path, &e)),
    };

    fs::write(path, format!("{existing}\n{content}"))
        .await
        .map_err(|e| write_failed(path, &e))?;

    make_executable(path).await
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| write_failed(path, &e))
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<(), Error> {
    Ok(())
}

fn write_failed(path: &Path, err: &std::io::Error) -> Error {
    HookError::WriteFailed {
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_file_starts_with_shebang() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("after-install");

        append_script(&path, "echo hi\n").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "#!/usr/bin/env bash\n\necho hi\n");
    }

    #[tokio::test]
    async fn second_append_preserves_first() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("before-remove");

        append_script(&path, "echo one\n").await.unwrap();
        append_script(&path, "echo two\n").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "#!/usr/bin/env bash\n\necho one\n\necho two\n");
        assert_eq!(content.matches(SHEBANG).count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn written_file_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("after-remove");
        append_script(&path, "true\n").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
