//! Concurrent staging of a component list

use crate::archive::extract;
use crate::fs::{clear_dir, find_source_root, is_empty_dir, move_contents};
use crate::transfer::Transfer;
use impack_config::constants::DEFAULT_JOBS;
use impack_config::resources_semaphore::{acquire_semaphore_permit, create_semaphore};
use impack_errors::{ComponentFailure, Error, StageError, UserFacingError};
use impack_events::{AppEvent, EventEmitter, EventSender, FailureContext, StageEvent};
use impack_source::SourceDescriptor;
use impack_types::{Component, StageOutcome, StagedComponent, TransferMethod};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinSet;

/// Fills staging directories for a list of components
pub struct Materializer<T: Transfer + 'static> {
    transfer: Arc<T>,
    jobs: usize,
    prefer_clone: bool,
    scratch_root: PathBuf,
    tx: EventSender,
}

struct PlannedTransfer {
    index: usize,
    component: String,
    locator: String,
    source: SourceDescriptor,
    stage_path: PathBuf,
}

impl<T: Transfer + 'static> Materializer<T> {
    #[must_use]
    pub fn new(transfer: T, tx: EventSender) -> Self {
        Self {
            transfer: Arc::new(transfer),
            jobs: DEFAULT_JOBS,
            prefer_clone: false,
            scratch_root: std::env::temp_dir(),
            tx,
        }
    }

    /// Maximum number of concurrent transfers (at least 1)
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Prefer cloning for providers that offer both transfer methods
    #[must_use]
    pub fn with_clone(mut self, prefer_clone: bool) -> Self {
        self.prefer_clone = prefer_clone;
        self
    }

    /// Directory that holds per-transfer scratch space
    ///
    /// Keeping it on the same filesystem as the staging tree lets content be
    /// renamed into place instead of copied.
    #[must_use]
    pub fn with_scratch_root(mut self, scratch_root: impl Into<PathBuf>) -> Self {
        self.scratch_root = scratch_root.into();
        self
    }

    /// Stage every component, in list order
    ///
    /// Components must have their paths assigned. All locators are validated
    /// before anything touches the filesystem. Once a transfer fails no new
    /// transfers start; transfers already running settle, content that
    /// arrived stays on disk, and the failed component's directory is left
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns a locator error before any I/O if a locator is invalid, and
    /// `StageError::CollectionFailed` listing every failed component if one
    /// or more transfers fail.
    pub async fn materialize(
        &self,
        components: &[Component],
    ) -> Result<Vec<StagedComponent>, Error> {
        let total = components.len();

        let mut sources = Vec::with_capacity(total);
        for component in components {
            let source = component
                .locator()
                .map(|locator| SourceDescriptor::parse(locator, self.prefer_clone))
                .transpose()?;
            sources.push(source);
        }

        self.emit(AppEvent::Stage(StageEvent::CollectionStarted {
            components: total,
            jobs: self.jobs,
        }));

        let mut outcomes: Vec<Option<StagedComponent>> = vec![None; total];
        let mut planned = Vec::new();
        let mut skipped = 0;

        for (index, (component, source)) in components.iter().zip(sources).enumerate() {
            let stage_path = component
                .stage_path()
                .ok_or_else(|| {
                    Error::internal(format!(
                        "component {} has no staging path",
                        component.relative_path
                    ))
                })?
                .to_path_buf();

            fs::create_dir_all(&stage_path)
                .await
                .map_err(|e| Error::io_with_path(&e, &stage_path))?;

            if !is_empty_dir(&stage_path).await? {
                skipped += 1;
                self.emit(AppEvent::Stage(StageEvent::Skipped {
                    component: component.relative_path.clone(),
                    path: stage_path.clone(),
                }));
                outcomes[index] =
                    Some(staged(component, stage_path, StageOutcome::AlreadyCollected));
                continue;
            }

            match (source, component.locator()) {
                (Some(source), Some(locator)) => planned.push(PlannedTransfer {
                    index,
                    component: component.relative_path.clone(),
                    locator: locator.to_string(),
                    source,
                    stage_path,
                }),
                _ => {
                    self.emit(AppEvent::Stage(StageEvent::Created {
                        component: component.relative_path.clone(),
                        path: stage_path.clone(),
                    }));
                    outcomes[index] = Some(staged(component, stage_path, StageOutcome::Created));
                }
            }
        }

        let failures = self.run_transfers(planned, &mut outcomes).await?;
        let transferred = outcomes
            .iter()
            .flatten()
            .filter(|o| matches!(o.outcome, StageOutcome::Transferred { .. }))
            .count();

        self.emit(AppEvent::Stage(StageEvent::CollectionCompleted {
            transferred,
            skipped,
            failed: failures.len(),
        }));

        if !failures.is_empty() {
            return Err(StageError::CollectionFailed { total, failures }.into());
        }

        Ok(outcomes.into_iter().flatten().collect())
    }

    async fn run_transfers(
        &self,
        planned: Vec<PlannedTransfer>,
        outcomes: &mut [Option<StagedComponent>],
    ) -> Result<Vec<ComponentFailure>, Error> {
        let semaphore = create_semaphore(self.jobs);
        let abort = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();

        let mut pending = planned.into_iter();
        while let Some(plan) = pending.next() {
            let permit = acquire_semaphore_permit(semaphore.clone(), "component transfer").await?;
            if abort.load(Ordering::SeqCst) {
                tracing::debug!(
                    not_started = 1 + pending.len(),
                    "transfer failed, not starting remaining components"
                );
                break;
            }

            self.emit_transfer_started(
                &plan.component,
                &plan.locator,
                plan.source.method,
                &plan.source.url,
            );

            let transfer = Arc::clone(&self.transfer);
            let scratch_root = self.scratch_root.clone();
            let abort = Arc::clone(&abort);
            tasks.spawn(async move {
                let result =
                    stage_one(transfer.as_ref(), &plan.source, &plan.stage_path, &scratch_root)
                        .await;
                if result.is_err() {
                    abort.store(true, Ordering::SeqCst);
                }
                drop(permit);
                (plan, result)
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (plan, result) = joined.map_err(|e| StageError::Concurrency {
                message: format!("transfer task failed: {e}"),
            })?;

            match result {
                Ok(()) => {
                    self.emit_transfer_completed(
                        &plan.component,
                        plan.source.method,
                        plan.stage_path.clone(),
                    );
                    outcomes[plan.index] = Some(StagedComponent {
                        relative_path: plan.component,
                        locator: Some(plan.locator),
                        stage_path: plan.stage_path,
                        outcome: StageOutcome::Transferred {
                            method: plan.source.method,
                            url: plan.source.url,
                        },
                    });
                }
                Err(err) => {
                    let wrapped = StageError::TransferFailed {
                        locator: plan.locator.clone(),
                        message: err.user_message().into_owned(),
                    };
                    self.emit(AppEvent::Stage(StageEvent::TransferFailed {
                        component: plan.component.clone(),
                        locator: plan.locator.clone(),
                        failure: FailureContext::from_error(&wrapped),
                    }));
                    failures.push((
                        plan.index,
                        ComponentFailure {
                            component: plan.component,
                            locator: plan.locator,
                            message: err.user_message().into_owned(),
                        },
                    ));
                }
            }
        }

        failures.sort_by_key(|(index, _)| *index);
        Ok(failures.into_iter().map(|(_, failure)| failure).collect())
    }
}

impl<T: Transfer + 'static> EventEmitter for Materializer<T> {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

fn staged(component: &Component, stage_path: PathBuf, outcome: StageOutcome) -> StagedComponent {
    StagedComponent {
        relative_path: component.relative_path.clone(),
        locator: component.locator.clone(),
        stage_path,
        outcome,
    }
}

/// Fetch one component through scratch space and move it into place
async fn stage_one<T: Transfer + ?Sized>(
    transfer: &T,
    source: &SourceDescriptor,
    stage_path: &Path,
    scratch_root: &Path,
) -> Result<(), Error> {
    let result = fetch_into(transfer, source, stage_path, scratch_root).await;
    if result.is_err() {
        if let Err(err) = clear_dir(stage_path).await {
            tracing::warn!(
                path = %stage_path.display(),
                error = %err,
                "failed to clear staging directory after failed transfer"
            );
        }
    }
    result
}

async fn fetch_into<T: Transfer + ?Sized>(
    transfer: &T,
    source: &SourceDescriptor,
    stage_path: &Path,
    scratch_root: &Path,
) -> Result<(), Error> {
    fs::create_dir_all(scratch_root)
        .await
        .map_err(|e| Error::io_with_path(&e, scratch_root))?;
    let scratch = tempfile::Builder::new()
        .prefix(".impack-")
        .tempdir_in(scratch_root)
        .map_err(|e| Error::io_with_path(&e, scratch_root))?;

    match source.method {
        TransferMethod::Archive => {
            let archive = scratch.path().join("download");
            transfer.download(&source.url, &archive).await?;

            let unpacked = scratch.path().join("content");
            extract(&archive, &unpacked, &source.url).await?;
            let root = find_source_root(&unpacked).await?;
            move_contents(&root, stage_path).await?;
        }
        TransferMethod::Clone => {
            let repo = scratch.path().join("repo");
            transfer
                .clone_repo(&source.url, source.checkout(), &repo)
                .await?;

            let git_dir = repo.join(".git");
            if fs::try_exists(&git_dir).await.unwrap_or(false) {
                fs::remove_dir_all(&git_dir)
                    .await
                    .map_err(|e| Error::io_with_path(&e, &git_dir))?;
            }
            move_contents(&repo, stage_path).await?;
        }
    }

    Ok(())
}
