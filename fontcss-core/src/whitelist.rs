//! Referrer whitelist (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Referrer prefixes that may fetch stylesheets. An empty entry admits everyone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    #[serde(alias = "Domains", default)]
    domains: Vec<String>,
}

impl Whitelist {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    /// Whitelist that accepts any referrer, including none at all.
    pub fn allow_all() -> Self {
        Self::new([""])
    }

    /// Load a JSON whitelist of the form `{"domains": [...]}`.
    pub fn read(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(anyhow!("{}: is a directory", path.display()));
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading whitelist {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    pub fn contains(&self, referer: &str) -> bool {
        self.domains.iter().any(|prefix| referer.starts_with(prefix.as_str()))
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
