//! HTML view rendering.
//!
//! Handlers depend on [`ViewRenderer`]; the minijinja-backed
//! [`TemplateEngine`] is the implementation wired up in `main`.

mod engine;

pub use engine::{TemplateEngine, TemplateError};

use minijinja::Value;

/// Renders a named view with a data payload
pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: &str, ctx: Value) -> Result<String, TemplateError>;
}
