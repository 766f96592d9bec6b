//! Embedded hook templates

use impack_errors::{Error, HookError};
use serde::Serialize;
use tera::{Context, Tera};

/// The templates a hook generation pass renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Per-event group of component scripts
    Hook,
    /// `npm rebuild` in every component with a package descriptor
    Rebuild,
    /// Register services with pm2
    Startup,
    /// Deregister services from pm2
    Teardown,
}

impl Template {
    pub const ALL: [Self; 4] = [Self::Hook, Self::Rebuild, Self::Startup, Self::Teardown];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Hook => "hook",
            Self::Rebuild => "rebuild",
            Self::Startup => "startup",
            Self::Teardown => "teardown",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Self::Hook => include_str!("../templates/hook.sh.tera"),
            Self::Rebuild => include_str!("../templates/rebuild.sh.tera"),
            Self::Startup => include_str!("../templates/startup.sh.tera"),
            Self::Teardown => include_str!("../templates/teardown.sh.tera"),
        }
    }
}

/// Tera instance preloaded with the embedded templates
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// # Errors
    ///
    /// Returns `HookError::TemplateFailed` if an embedded template does not parse.
    pub fn new() -> Result<Self, Error> {
        let mut tera = Tera::default();
        for template in Template::ALL {
            tera.add_raw_template(template.name(), template.source())
                .map_err(|e| HookError::TemplateFailed {
                    template: template.name().to_string(),
                    message: format!("failed to load template: {e}"),
                })?;
        }
        Ok(Self { tera })
    }

    /// Render a template with a serializable context
    ///
    /// # Errors
    ///
    /// Returns `HookError::TemplateFailed` if the context cannot be
    /// serialized or rendering fails.
    pub fn render<C: Serialize>(&self, template: Template, data: &C) -> Result<String, Error> {
        let context = Context::from_serialize(data).map_err(|e| HookError::TemplateFailed {
            template: template.name().to_string(),
            message: format!("failed to serialize template context: {e}"),
        })?;

        self.tera.render(template.name(), &context).map_err(|e| {
            HookError::TemplateFailed {
                template: template.name().to_string(),
                message: format!("failed to render template: {e}"),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_templates_parse() {
        assert!(Renderer::new().is_ok());
    }

    #[test]
    fn hook_template_runs_each_entry_in_its_install_dir() {
        let renderer = Renderer::new().unwrap();
        let out = renderer
            .render(
                Template::Hook,
                &json!({
                    "event": "after-install",
                    "entries": [
                        {"script": "echo one", "component": "api", "relative_path": "svc/api", "pack_path": "/opt/app/svc/api"},
                        {"script": "echo two", "component": "web", "relative_path": "web", "pack_path": "/opt/app/web"},
                    ],
                }),
            )
            .unwrap();

        let one = out.find("echo one").unwrap();
        let two = out.find("echo two").unwrap();
        assert!(one < two);
        assert!(out.contains("cd \"/opt/app/svc/api\""));
        assert!(out.starts_with("# after-install"));
    }

    #[test]
    fn startup_only_lists_services() {
        let renderer = Renderer::new().unwrap();
        let out = renderer
            .render(
                Template::Startup,
                &json!({
                    "components": [
                        {"name": "api", "relative_path": "api", "pack_path": "/opt/app/api", "package": true, "service": "/opt/app/api/process.yml"},
                        {"name": "lib", "relative_path": "lib", "pack_path": "/opt/app/lib", "package": true, "service": null},
                    ],
                }),
            )
            .unwrap();

        assert!(out.contains("pm2 start \"/opt/app/api/process.yml\""));
        assert!(!out.contains("/opt/app/lib"));
        assert!(out.contains("pm2 save"));
    }
}
