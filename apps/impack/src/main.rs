//! impack - assemble deployable packages from declarative component lists
//!
//! This is the CLI application; it loads settings, opens the manifest through
//! the ops crate and renders events and results.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, CollectArgs, Commands, PackArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use impack_config::constants::{DEFAULT_OUTPUT_DIR, LOGS_DIR};
use impack_config::Settings;
use impack_events::EventReceiver;
use impack_ops::{
    CollectOptions, HookOptions, NpmOptions, OperationResult, PackOptions, Packer,
};
use impack_types::ColorChoice;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug, &log_dir(&cli));

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting impack v{}", env!("CARGO_PKG_VERSION"));

    // Settings precedence: file (or defaults), then environment, then flags
    let mut settings = Settings::load_or_default(cli.global.config.as_deref()).await?;
    settings.merge_env()?;
    apply_cli_config(&mut settings, &cli.command)?;

    let colors_enabled = match cli.global.color.unwrap_or_default() {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    console::set_colors_enabled(colors_enabled);
    console::set_colors_enabled_stderr(colors_enabled);

    let (event_sender, event_receiver) = impack_events::channel();

    let mut builder = Packer::builder()
        .with_target(&cli.command.target().target)
        .with_settings(settings)
        .with_event_sender(event_sender);
    if let Some(output) = &cli.global.output {
        builder = builder.with_output(output);
    }
    if let Some(pack_home) = &cli.global.pack_home {
        builder = builder.with_pack_home(pack_home);
    }
    let packer = builder.build().await?;

    let renderer = OutputRenderer::new(cli.global.json, colors_enabled);
    let mut event_handler =
        EventHandler::new(!cli.global.json, cli.global.debug, cli.command.name());

    let result =
        execute_command_with_events(cli.command, packer, event_receiver, &mut event_handler)
            .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    packer: Packer,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, packer));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    mut packer: Packer,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Components { .. } => Ok(OperationResult::Components(
            packer.components().to_vec(),
        )),

        Commands::Collect {
            collect,
            skip_hooks,
            ..
        } => {
            let hooks = (!skip_hooks).then_some(HookOptions {
                rebuild: collect.rebuild,
                clean: false,
            });
            let report = packer.collect(collect_options(&collect, hooks)).await?;
            Ok(OperationResult::Collect(report))
        }

        Commands::Hooks { rebuild, clean, .. } => {
            let report = packer.genhooks(HookOptions { rebuild, clean }).await?;
            Ok(OperationResult::Hooks(report))
        }

        Commands::Npm {
            command,
            ignore_scripts,
            extra,
            ..
        } => {
            let dirs = packer
                .npm(&NpmOptions {
                    command: Some(command),
                    ignore_scripts,
                    extra,
                })
                .await?;
            Ok(OperationResult::Npm(dirs))
        }

        Commands::Pack { pack, .. } => {
            let report = packer.pack(&pack_options(pack)).await?;
            Ok(OperationResult::Pack(report))
        }

        Commands::Build {
            collect,
            pack,
            skip_npm,
            ignore_scripts,
            ..
        } => {
            // A build always starts from a fresh hook set
            let hooks = Some(HookOptions {
                rebuild: collect.rebuild,
                clean: true,
            });
            let collected = packer.collect(collect_options(&collect, hooks)).await?;

            let npm = if skip_npm {
                Vec::new()
            } else {
                packer
                    .npm(&NpmOptions {
                        command: None,
                        ignore_scripts,
                        extra: Vec::new(),
                    })
                    .await?
            };

            let packed = packer.pack(&pack_options(pack)).await?;
            Ok(OperationResult::Build {
                collect: collected,
                npm,
                pack: packed,
            })
        }
    }
}

fn collect_options(args: &CollectArgs, hooks: Option<HookOptions>) -> CollectOptions {
    CollectOptions {
        clone: None,
        jobs: None,
        timeout: args.timeout.map(Duration::from_secs),
        hooks,
    }
}

fn pack_options(args: PackArgs) -> PackOptions {
    PackOptions {
        architecture: args.arch,
        package: args.package,
        ..PackOptions::default()
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(settings: &mut Settings, command: &Commands) -> Result<(), CliError> {
    if let Commands::Collect { collect, .. } | Commands::Build { collect, .. } = command {
        if let Some(jobs) = collect.jobs {
            if jobs == 0 {
                return Err(CliError::InvalidArguments(
                    "--jobs must be at least 1".to_string(),
                ));
            }
            settings.stage.jobs = jobs;
        }
        if collect.clone {
            settings.stage.clone = true;
        }
    }

    if let Commands::Pack { pack, .. } | Commands::Build { pack, .. } = command {
        if let Some(arch) = &pack.arch {
            settings.pack.architecture.clone_from(arch);
        }
    }

    Ok(())
}

/// Where `--debug` logs go: `<output>/logs`
fn log_dir(cli: &Cli) -> PathBuf {
    let output = match &cli.global.output {
        Some(output) if output.is_absolute() => output.clone(),
        Some(output) => manifest_dir(&cli.command.target().target).join(output),
        None => manifest_dir(&cli.command.target().target).join(DEFAULT_OUTPUT_DIR),
    };
    output.join(LOGS_DIR)
}

fn manifest_dir(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.to_path_buf()
    } else {
        target
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

/// Default `--debug` filter: every impack crate logs under its own target
const DEBUG_FILTER: &str = "info,impack=debug,impack_config=debug,impack_events=debug,\
impack_hooks=debug,impack_net=debug,impack_ops=debug,impack_resolver=debug,\
impack_source=debug,impack_stage=debug";

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "impack-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new(DEBUG_FILTER),
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // Keep stdout clean for the JSON result
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_filter_covers_every_library_crate() {
        for target in [
            "impack_config",
            "impack_events",
            "impack_hooks",
            "impack_net",
            "impack_ops",
            "impack_resolver",
            "impack_source",
            "impack_stage",
        ] {
            assert!(
                DEBUG_FILTER.contains(&format!("{target}=debug")),
                "{target} missing from {DEBUG_FILTER}"
            );
        }
        assert!(!DEBUG_FILTER.contains(char::is_whitespace));
        assert!(tracing_subscriber::EnvFilter::try_new(DEBUG_FILTER).is_ok());
    }
}
