//! The packaging pipeline over one manifest

use crate::args::{argumentize, Options};
use crate::command::{run_command, CommandSpec};
use crate::options::{CollectOptions, HookOptions, NpmOptions, PackOptions};
use impack_config::constants::{
    DEFAULT_OUTPUT_DIR, HOOKS_DIR, PACK_HOME_ROOT, SCRATCH_DIR, STAGE_DIR,
};
use impack_config::{Manifest, Settings};
use impack_errors::{ConfigError, Error, PackError};
use impack_events::{AppEvent, EventEmitter, EventSender, PackEvent};
use impack_net::{NetClient, NetConfig};
use impack_resolver::{flatten, parse_tree, resolve};
use impack_stage::{Fetcher, Materializer, Transfer};
use impack_types::{CollectReport, Component, HookReport, PackReport};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Packager options that must be present before spawning
const REQUIRED_PACK_OPTIONS: [&str; 5] = ["chdir", "name", "version", "architecture", "package"];

/// Loaded manifest plus the directories and component list derived from it
pub struct Packer {
    manifest: Manifest,
    settings: Settings,
    output: PathBuf,
    stage_dir: PathBuf,
    hooks_dir: PathBuf,
    pack_home: PathBuf,
    components: Vec<Component>,
    tx: EventSender,
}

impl std::fmt::Debug for Packer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packer")
            .field("manifest", &self.manifest.path())
            .field("output", &self.output)
            .field("pack_home", &self.pack_home)
            .field("components", &self.components.len())
            .finish_non_exhaustive()
    }
}

impl Packer {
    #[must_use]
    pub fn builder() -> PackerBuilder {
        PackerBuilder::new()
    }

    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    #[must_use]
    pub fn stage_dir(&self) -> &Path {
        &self.stage_dir
    }

    #[must_use]
    pub fn hooks_dir(&self) -> &Path {
        &self.hooks_dir
    }

    /// Install prefix on the target system
    #[must_use]
    pub fn pack_home(&self) -> &Path {
        &self.pack_home
    }

    /// Flattened components in declaration order
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Re-read staged state (package and service descriptors) from disk
    ///
    /// # Errors
    ///
    /// Returns an error if a staged `package.json` cannot be parsed.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        resolve(&mut self.components, &self.stage_dir, &self.pack_home).await
    }

    /// Fetch every component into the staging tree over the network
    ///
    /// # Errors
    ///
    /// See [`Packer::collect_with`].
    pub async fn collect(&mut self, options: CollectOptions) -> Result<CollectReport, Error> {
        let client = NetClient::new(NetConfig::from(&self.settings.network))?;
        let fetcher = Fetcher::new(client, self.tx.clone());
        self.collect_with(fetcher, options).await
    }

    /// Fetch every component using the given transfer primitive
    ///
    /// # Errors
    ///
    /// Returns a locator error before any I/O, `Error::Timeout` when the
    /// collection outlives `options.timeout`, the aggregate stage error when
    /// transfers fail, or a hook error from the optional generation step.
    pub async fn collect_with<T: Transfer + 'static>(
        &mut self,
        transfer: T,
        options: CollectOptions,
    ) -> Result<CollectReport, Error> {
        self.emit_operation_started("collect");

        let result = self.run_collect(transfer, &options).await;
        let scratch = self.output.join(SCRATCH_DIR);
        if let Err(err) = fs::remove_dir_all(&scratch).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                self.emit_warning_with_context(
                    format!("could not remove {}", scratch.display()),
                    err.to_string(),
                );
            }
        }

        let mut report = match result {
            Ok(report) => report,
            Err(err) => {
                self.emit_operation_failed("collect", err.to_string());
                return Err(err);
            }
        };

        if let Some(hook_options) = options.hooks {
            report.hooks = Some(self.genhooks(hook_options).await?);
        }

        self.emit_operation_completed("collect", true);
        Ok(report)
    }

    async fn run_collect<T: Transfer + 'static>(
        &mut self,
        transfer: T,
        options: &CollectOptions,
    ) -> Result<CollectReport, Error> {
        let materializer = Materializer::new(transfer, self.tx.clone())
            .with_jobs(options.jobs.unwrap_or(self.settings.stage.jobs))
            .with_clone(options.clone.unwrap_or(self.settings.stage.clone))
            .with_scratch_root(self.output.join(SCRATCH_DIR));

        let staged = match options.timeout {
            Some(limit) => tokio::time::timeout(limit, materializer.materialize(&self.components))
                .await
                .map_err(|_| Error::Timeout {
                    seconds: limit.as_secs(),
                })??,
            None => materializer.materialize(&self.components).await?,
        };

        self.refresh().await?;

        Ok(CollectReport {
            components: staged,
            hooks: None,
        })
    }

    /// Generate lifecycle hook files from the staged components
    ///
    /// # Errors
    ///
    /// Returns an error if staged descriptors cannot be read, a declaration
    /// is invalid, or a hook file cannot be written.
    pub async fn genhooks(&mut self, options: HookOptions) -> Result<HookReport, Error> {
        self.refresh().await?;
        self.emit_operation_started("hooks");

        let result = async {
            if options.clean {
                impack_hooks::clean(&self.hooks_dir, &self.tx).await?;
            }
            impack_hooks::generate(&self.components, &self.hooks_dir, options.rebuild, &self.tx)
                .await
        }
        .await;

        match &result {
            Ok(_) => self.emit_operation_completed("hooks", true),
            Err(err) => self.emit_operation_failed("hooks", err.to_string()),
        }
        result
    }

    /// Build the npm invocation for one staged component
    #[must_use]
    pub fn npm_command(&self, component: &Component, options: &NpmOptions) -> Option<CommandSpec> {
        let cwd = component.stage_path()?;
        let subcommand = options.command.as_deref().unwrap_or("install");

        let mut flags = Options::new();
        flags.set("unsafe-perm", self.settings.npm.unsafe_perm);
        flags.set(
            "production",
            self.settings.npm.production && subcommand == "install",
        );
        flags.set("ignore-scripts", options.ignore_scripts);

        let mut args = vec![subcommand.to_string()];
        args.extend(argumentize(&flags));
        args.extend(options.extra.iter().cloned());

        Some(CommandSpec::new(&self.settings.npm.command, args, cwd))
    }

    /// Run npm in every staged component that has a package descriptor,
    /// one at a time, in component order
    ///
    /// Returns the directories npm ran in.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first npm failure.
    pub async fn npm(&mut self, options: &NpmOptions) -> Result<Vec<PathBuf>, Error> {
        self.refresh().await?;
        self.emit_operation_started("npm");

        let mut ran = Vec::new();
        for component in self.components.iter().filter(|c| c.package.is_some()) {
            let Some(spec) = self.npm_command(component, options) else {
                continue;
            };
            if let Err(err) = run_command(&spec, &self.tx).await {
                self.emit_operation_failed("npm", err.to_string());
                return Err(err);
            }
            ran.push(spec.cwd);
        }

        self.emit_operation_completed("npm", true);
        Ok(ran)
    }

    /// Build and validate the packager invocation without running it
    ///
    /// # Errors
    ///
    /// Returns `PackError::MissingField` if a required option is missing and
    /// an I/O error if the hooks directory cannot be listed.
    pub async fn pack_command(&self, options: &PackOptions) -> Result<CommandSpec, Error> {
        let manifest = &self.manifest;
        let architecture = options
            .architecture
            .clone()
            .or_else(|| manifest.architecture.clone())
            .unwrap_or_else(|| self.settings.pack.architecture.clone());

        let mut opts = Options::new();
        opts.set("s", "dir");
        opts.set("t", "deb");
        opts.set("chdir", self.stage_dir.display().to_string());
        for (key, value) in [
            ("name", &manifest.name),
            ("version", &manifest.version),
            ("description", &manifest.description),
            ("maintainer", &manifest.maintainer),
            ("url", &manifest.url),
        ] {
            if let Some(value) = value {
                opts.set(key, value.as_str());
            }
        }
        opts.set("architecture", architecture.as_str());

        let package = options.package.clone().or_else(|| {
            let name = manifest.name.as_deref()?;
            let version = manifest.version.as_deref()?;
            Some(
                self.output
                    .join(format!("{name}_{version}_{architecture}.deb")),
            )
        });
        if let Some(package) = package {
            opts.set("package", package.display().to_string());
        }

        for (name, path) in self.hook_files().await? {
            opts.set(name, path.display().to_string());
        }

        for (key, value) in options.extra.pairs() {
            opts.set(key, value.clone());
        }

        if let Some(missing) = REQUIRED_PACK_OPTIONS.iter().find(|key| !opts.is_set(key)) {
            return Err(PackError::MissingField {
                field: (*missing).to_string(),
            }
            .into());
        }

        let mut args = argumentize(&opts);
        args.push(format!(".={}", self.pack_home.display()));

        Ok(CommandSpec::new(
            &self.settings.pack.packer,
            args,
            &self.output,
        ))
    }

    /// Hand the staging tree and hook files to the packager
    ///
    /// # Errors
    ///
    /// Returns the validation error from [`Packer::pack_command`] before
    /// spawning, or the packager's failure.
    pub async fn pack(&self, options: &PackOptions) -> Result<PackReport, Error> {
        let spec = self.pack_command(options).await?;
        let package = package_path(&spec.args)
            .ok_or_else(|| Error::internal("package path missing from packager arguments"))?;

        self.emit_operation_started("pack");
        fs::create_dir_all(&self.output)
            .await
            .map_err(|e| Error::io_with_path(&e, &self.output))?;

        if let Err(err) = run_command(&spec, &self.tx).await {
            self.emit_operation_failed("pack", err.to_string());
            return Err(err);
        }

        self.emit(AppEvent::Pack(PackEvent::PackageCreated {
            path: package.clone(),
        }));
        self.emit_operation_completed("pack", true);

        Ok(PackReport {
            package,
            program: spec.program,
            args: spec.args,
        })
    }

    /// Hook files present in the hooks directory, sorted by name
    async fn hook_files(&self) -> Result<Vec<(String, PathBuf)>, Error> {
        let mut entries = match fs::read_dir(&self.hooks_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io_with_path(&e, &self.hooks_dir)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io_with_path(&e, &self.hooks_dir))?
        {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                files.push((name.to_string(), entry.path()));
            }
        }
        files.sort();
        Ok(files)
    }
}

impl EventEmitter for Packer {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

fn package_path(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|arg| arg == "--package")
        .and_then(|index| args.get(index + 1))
        .map(PathBuf::from)
}

/// Builder for [`Packer`]
#[derive(Default)]
pub struct PackerBuilder {
    target: Option<PathBuf>,
    output: Option<PathBuf>,
    pack_home: Option<PathBuf>,
    settings: Option<Settings>,
    tx: Option<EventSender>,
}

impl PackerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest file, or a directory containing one
    #[must_use]
    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Output directory; relative paths are taken from the manifest directory
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    #[must_use]
    pub fn with_pack_home(mut self, pack_home: impl Into<PathBuf>) -> Self {
        self.pack_home = Some(pack_home.into());
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Load the manifest, flatten its component tree and resolve it
    ///
    /// Nothing is fetched; a missing or malformed component tree fails here.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the manifest cannot be found or
    /// parsed, has no component tree, or has neither a `name` nor an
    /// explicit pack home, or if the tree holds invalid values.
    pub async fn build(self) -> Result<Packer, Error> {
        let tx = self
            .tx
            .ok_or_else(|| Error::internal("event sender is required"))?;
        let settings = self.settings.unwrap_or_default();
        let target = self.target.unwrap_or_else(|| PathBuf::from("."));
        let target = std::path::absolute(&target).map_err(|e| Error::io_with_path(&e, &target))?;

        let manifest = Manifest::load(&target).await?;
        let home = manifest.dir().to_path_buf();

        let output = match self.output {
            Some(output) if output.is_absolute() => output,
            Some(output) => home.join(output),
            None => home.join(DEFAULT_OUTPUT_DIR),
        };
        let stage_dir = output.join(STAGE_DIR);
        let hooks_dir = output.join(HOOKS_DIR);

        let pack_home = match self.pack_home.or_else(|| settings.pack.pack_home.clone()) {
            Some(pack_home) => pack_home,
            None => {
                let name = manifest
                    .name
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingField {
                        field: "name".to_string(),
                    })?;
                Path::new(PACK_HOME_ROOT).join(name)
            }
        };

        let tree = parse_tree(&manifest.components)?;
        let mut components = flatten(&tree);
        resolve(&mut components, &stage_dir, &pack_home).await?;

        tracing::debug!(
            manifest = %manifest.path().display(),
            components = components.len(),
            output = %output.display(),
            "packer opened"
        );

        Ok(Packer {
            manifest,
            settings,
            output,
            stage_dir,
            hooks_dir,
            pack_home,
            components,
            tx,
        })
    }
}
