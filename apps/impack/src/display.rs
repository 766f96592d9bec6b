//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use impack_ops::OperationResult;
use impack_types::{CollectReport, Component, HookReport, PackReport, StageOutcome};
use std::io;
use std::path::PathBuf;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    colors: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool, colors: bool) -> Self {
        Self {
            json_output,
            colors,
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            OperationResult::Components(components) => self.render_components(components),
            OperationResult::Collect(report) => self.render_collect(report),
            OperationResult::Hooks(report) => self.render_hooks(report),
            OperationResult::Npm(dirs) => self.render_npm(dirs),
            OperationResult::Pack(report) => self.render_pack(report),
            OperationResult::Build {
                collect,
                npm,
                pack,
            } => {
                self.render_collect(collect)?;
                self.render_npm(npm)?;
                self.render_pack(pack)
            }
        }
    }

    fn render_components(&self, components: &[Component]) -> io::Result<()> {
        if components.is_empty() {
            println!("No components declared.");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Component").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Locator").add_attribute(Attribute::Bold),
            Cell::new("Staged").add_attribute(Attribute::Bold),
            Cell::new("Service").add_attribute(Attribute::Bold),
        ]);

        for component in components {
            table.add_row(vec![
                Cell::new(&component.relative_path),
                Cell::new(&component.name),
                Cell::new(component.locator().unwrap_or("-")),
                self.flag_cell(component.staged),
                self.flag_cell(component.has_service()),
            ]);
        }

        println!("{table}");
        Ok(())
    }

    fn render_collect(&self, report: &CollectReport) -> io::Result<()> {
        let skipped = report
            .components
            .iter()
            .filter(|c| c.outcome == StageOutcome::AlreadyCollected)
            .count();
        let created = report
            .components
            .iter()
            .filter(|c| c.outcome == StageOutcome::Created)
            .count();

        println!(
            "{} {} components ({} transferred, {skipped} already collected, {created} empty)",
            style("Collected").green().bold(),
            report.components.len(),
            report.transferred(),
        );

        if let Some(hooks) = &report.hooks {
            self.render_hooks(hooks)?;
        }
        Ok(())
    }

    fn render_hooks(&self, report: &HookReport) -> io::Result<()> {
        if report.files.is_empty() {
            println!("No hooks declared.");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Hook").add_attribute(Attribute::Bold),
            Cell::new("Scripts").add_attribute(Attribute::Bold),
            Cell::new("Blocks").add_attribute(Attribute::Bold),
            Cell::new("File").add_attribute(Attribute::Bold),
        ]);

        for file in &report.files {
            table.add_row(vec![
                Cell::new(file.event),
                Cell::new(file.entries),
                Cell::new(if file.blocks.is_empty() {
                    "-".to_string()
                } else {
                    file.blocks.join(", ")
                }),
                Cell::new(file.path.display()),
            ]);
        }

        println!("{table}");
        Ok(())
    }

    fn render_npm(&self, dirs: &[PathBuf]) -> io::Result<()> {
        println!(
            "{} npm in {} components",
            style("Ran").green().bold(),
            dirs.len()
        );
        Ok(())
    }

    fn render_pack(&self, report: &PackReport) -> io::Result<()> {
        println!(
            "{} {}",
            style("Package").green().bold(),
            report.package.display()
        );
        Ok(())
    }

    fn flag_cell(&self, value: bool) -> Cell {
        let (text, color) = if value {
            ("yes", Color::Green)
        } else {
            ("no", Color::DarkGrey)
        };
        let cell = Cell::new(text);
        if self.colors {
            cell.fg(color)
        } else {
            cell
        }
    }
}
