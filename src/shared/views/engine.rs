//! minijinja template engine for the HTML views.
//!
//! Built-in templates are compiled into the binary. A template file with the
//! same relative name under the configured template directory replaces the
//! built-in one, so views can be tweaked without a rebuild.

use minijinja::{Environment, Value};
use std::path::Path;
use thiserror::Error;

use crate::shared::views::ViewRenderer;

/// Templates shipped with the binary: (name, source)
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "layout.html.jinja",
        include_str!("../../../templates/layout.html.jinja"),
    ),
    (
        "packages/index.html.jinja",
        include_str!("../../../templates/packages/index.html.jinja"),
    ),
    (
        "packages/create.html.jinja",
        include_str!("../../../templates/packages/create.html.jinja"),
    ),
    (
        "packages/edit.html.jinja",
        include_str!("../../../templates/packages/edit.html.jinja"),
    ),
    (
        "packages/show.html.jinja",
        include_str!("../../../templates/packages/show.html.jinja"),
    ),
    (
        "packages/fields.html.jinja",
        include_str!("../../../templates/packages/fields.html.jinja"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to load template: {0}")]
    LoadError(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Engine with only the built-in templates
    pub fn builtin() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        for &(name, source) in BUILTIN_TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| TemplateError::LoadError(format!("{}: {}", name, e)))?;
        }
        Ok(Self { env })
    }

    /// Built-in templates, overridden by any `.jinja` files found under `dir`
    pub fn with_overrides(dir: &Path) -> Result<Self, TemplateError> {
        let mut engine = Self::builtin()?;
        if dir.exists() {
            load_templates_recursive(&mut engine.env, dir, dir)?;
        } else {
            tracing::debug!(
                "Template directory {} not found, using built-in templates",
                dir.display()
            );
        }
        Ok(engine)
    }

    /// Names of every loaded template
    pub fn template_names(&self) -> Vec<String> {
        self.env
            .templates()
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

impl ViewRenderer for TemplateEngine {
    fn render(&self, template_name: &str, ctx: Value) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(template_name)
            .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

        template
            .render(ctx)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}

/// Recursively load all .jinja templates from a directory
fn load_templates_recursive(
    env: &mut Environment<'static>,
    base_path: &Path,
    current_path: &Path,
) -> Result<(), TemplateError> {
    let entries = std::fs::read_dir(current_path).map_err(|e| {
        TemplateError::LoadError(format!("{}: {}", current_path.display(), e))
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_templates_recursive(env, base_path, &path)?;
        } else if path.extension().is_some_and(|ext| ext == "jinja") {
            let Ok(relative) = path.strip_prefix(base_path) else {
                continue;
            };
            // Template names always use forward slashes
            let template_name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let content = std::fs::read_to_string(&path)
                .map_err(|e| TemplateError::LoadError(format!("{}: {}", path.display(), e)))?;

            // Leaked once at startup; the environment lives for the whole process
            let static_name: &'static str = Box::leak(template_name.into_boxed_str());
            let static_content: &'static str = Box::leak(content.into_boxed_str());
            env.add_template(static_name, static_content)
                .map_err(|e| TemplateError::LoadError(format!("{}: {}", static_name, e)))?;
            tracing::info!("Loaded template override: {}", static_name);
        }
    }

    Ok(())
}
