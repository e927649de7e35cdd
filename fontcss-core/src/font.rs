//! Font records and formats (made by FontLab https://www.fontlab.com/)

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Binary container a font file is shipped in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Eot,
    Woff,
}

impl Format {
    /// Lowercase name used in column keys, file extensions and template names.
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Eot => "eot",
            Format::Woff => "woff",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Eot => "application/vnd.ms-fontobject",
            Format::Woff => "application/x-font-woff",
        }
    }

    /// Case-insensitive lookup; `None` for anything we don't serve.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "eot" => Some(Format::Eot),
            "woff" => Some(Format::Woff),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One font file of one family, in one format, at one weight and style.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRecord {
    pub family: String,
    pub format: Format,
    pub style: String,
    pub weight: u32,
    pub path: PathBuf,
}

impl FontRecord {
    /// Secondary index key: format, weight and style glued together.
    pub fn column_key(&self) -> String {
        column_key(self.format, &self.weight.to_string(), &self.style)
    }

    /// Read the raw font bytes from disk.
    pub fn contents(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).with_context(|| format!("reading font {}", self.path.display()))
    }

    /// Modification time of the backing file.
    pub fn modified(&self) -> Result<SystemTime> {
        fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("reading modification time of {}", self.path.display()))
    }
}

pub(crate) fn column_key(format: Format, weight: &str, style: &str) -> String {
    format!("{}{weight}{style}", format.as_str())
}
