//! Error types shared by the core (made by FontLab https://www.fontlab.com/)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template {template}: unknown placeholder `{name}`")]
    UnknownPlaceholder { template: &'static str, name: String },
    #[error("reading font data: {0:#}")]
    FontData(#[from] anyhow::Error),
}
