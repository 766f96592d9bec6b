//! Transfer primitives

use async_trait::async_trait;
use impack_errors::{Error, StageError};
use impack_events::{EventEmitter, EventSender};
use impack_net::NetClient;
use std::path::Path;
use tokio::process::Command;

/// Moves remote content onto the local filesystem
///
/// The materializer owns everything around a transfer (scratch space,
/// extraction, moving into place); implementations only fetch bytes.
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Download `url` into the file `dest`
    async fn download(&self, url: &str, dest: &Path) -> Result<(), Error>;

    /// Clone `url` into the directory `dest`, checking out `checkout` if given
    async fn clone_repo(&self, url: &str, checkout: Option<&str>, dest: &Path)
        -> Result<(), Error>;
}

/// Production transfer: HTTP via [`NetClient`], clones via the `git` binary
#[derive(Clone)]
pub struct Fetcher {
    client: NetClient,
    tx: EventSender,
}

impl Fetcher {
    #[must_use]
    pub fn new(client: NetClient, tx: EventSender) -> Self {
        Self { client, tx }
    }

    async fn git(&self, args: &[&str], cwd: Option<&Path>, url: &str) -> Result<(), Error> {
        let mut command = Command::new("git");
        command.args(args);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        let output = command.output().await.map_err(|e| StageError::CloneFailed {
            url: url.to_string(),
            message: format!("failed to run git: {e}"),
        })?;

        if !output.status.success() {
            return Err(StageError::CloneFailed {
                url: url.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl Transfer for Fetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), Error> {
        impack_net::download_file(&self.client, url, dest, &self.tx).await?;
        Ok(())
    }

    async fn clone_repo(
        &self,
        url: &str,
        checkout: Option<&str>,
        dest: &Path,
    ) -> Result<(), Error> {
        let target = dest.display().to_string();
        self.tx.emit_debug(format!("git clone {url} {target}"));

        // A shallow clone cannot check out arbitrary refs
        if checkout.is_some() {
            self.git(&["clone", "--quiet", url, &target], None, url).await?;
        } else {
            self.git(&["clone", "--quiet", "--depth", "1", url, &target], None, url)
                .await?;
        }

        if let Some(reference) = checkout {
            self.tx.emit_debug(format!("git checkout {reference}"));
            self.git(&["checkout", "--quiet", reference], Some(dest), url)
                .await?;
        }
        Ok(())
    }
}
