//! `@font-face` stylesheet templates (made by FontLab https://www.fontlab.com/)
//!
//! One template per format, rendered once per font and concatenated. Templates
//! use `{{ name }}` placeholders:
//!
//! | placeholder   | value                               |
//! |---------------|-------------------------------------|
//! | `family`      | family name                         |
//! | `style`       | style, e.g. `italic`                |
//! | `weight`      | numeric weight                      |
//! | `format`      | `eot` or `woff`                     |
//! | `mime_type`   | MIME type of the font file          |
//! | `base64_data` | font bytes, standard base64, padded |

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::RenderError;
use crate::font::{FontRecord, Format};

/// Everything a template may interpolate for one font.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FontFace {
    pub base64_data: String,
    pub family: String,
    pub format: Format,
    pub mime_type: &'static str,
    pub style: String,
    pub weight: u32,
}

impl FontFace {
    /// Read the font file and encode it for embedding.
    pub fn from_record(record: &FontRecord) -> Result<Self> {
        let data = record.contents()?;
        Ok(Self {
            base64_data: STANDARD.encode(data),
            family: record.family.clone(),
            format: record.format,
            mime_type: record.format.mime_type(),
            style: record.style.clone(),
            weight: record.weight,
        })
    }

    fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "base64_data" => self.base64_data.clone(),
            "family" => self.family.clone(),
            "format" => self.format.to_string(),
            "mime_type" => self.mime_type.to_string(),
            "style" => self.style.clone(),
            "weight" => self.weight.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// The compiled EOT and WOFF templates.
#[derive(Clone, Debug)]
pub struct Templates {
    eot: String,
    woff: String,
}

impl Templates {
    pub fn from_sources(eot: impl Into<String>, woff: impl Into<String>) -> Self {
        Self {
            eot: eot.into(),
            woff: woff.into(),
        }
    }

    /// Load `eot.css` and `woff.css` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |format: Format| {
            let path = dir.join(template_name(format));
            fs::read_to_string(&path)
                .with_context(|| format!("reading template {}", path.display()))
        };
        Ok(Self::from_sources(read(Format::Eot)?, read(Format::Woff)?))
    }

    fn source(&self, format: Format) -> &str {
        match format {
            Format::Eot => &self.eot,
            Format::Woff => &self.woff,
        }
    }

    /// Render the `format` template for each face, in order.
    pub fn render(&self, format: Format, faces: &[FontFace]) -> Result<String, RenderError> {
        let source = self.source(format);
        let mut out = String::new();

        for face in faces {
            let mut unknown = None;
            let rendered = placeholder().replace_all(source, |caps: &Captures| {
                let name = &caps[1];
                face.field(name).unwrap_or_else(|| {
                    unknown.get_or_insert_with(|| name.to_string());
                    String::new()
                })
            });
            if let Some(name) = unknown {
                return Err(RenderError::UnknownPlaceholder {
                    template: template_name(format),
                    name,
                });
            }
            out.push_str(&rendered);
        }

        Ok(out)
    }

    /// Read and encode each record, then render them with the `format` template.
    pub fn render_records<'a, I>(&self, format: Format, records: I) -> Result<String, RenderError>
    where
        I: IntoIterator<Item = &'a FontRecord>,
    {
        let faces = records
            .into_iter()
            .map(FontFace::from_record)
            .collect::<Result<Vec<_>>>()?;
        self.render(format, &faces)
    }
}

/// File name a format's template is loaded from.
pub fn template_name(format: Format) -> &'static str {
    match format {
        Format::Eot => "eot.css",
        Format::Woff => "woff.css",
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid placeholder regex")
    })
}
