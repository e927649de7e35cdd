//! Font library discovery for fontcss-core (made by FontLab https://www.fontlab.com/)
//!
//! A font library is a directory with one subdirectory per family. Each family
//! directory carries a `metadata.json` describing its subfamilies:
//!
//! ```json
//! {
//!   "family": "Amaranth",
//!   "subfamilies": [
//!     {"basename": "amaranth-regular", "formats": ["eot", "woff"], "style": "normal", "weight": 400}
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::font::{FontRecord, Format};
use crate::index::FontIndex;

/// File name of the per-family descriptor.
pub const METADATA_FILE: &str = "metadata.json";

/// Trait for enumerating font records from some backing store.
pub trait FontDiscovery {
    fn discover(&self) -> Result<Vec<FontRecord>>;
}

/// Family descriptor as stored in `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMetadata {
    #[serde(alias = "Family")]
    pub family: String,
    #[serde(alias = "Subfamilies", default)]
    pub subfamilies: Vec<Subfamily>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subfamily {
    #[serde(alias = "Basename")]
    pub basename: String,
    #[serde(alias = "Formats", default)]
    pub formats: Vec<String>,
    #[serde(alias = "Style")]
    pub style: String,
    #[serde(alias = "Weight")]
    pub weight: u32,
}

impl FamilyMetadata {
    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading metadata {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    /// Expand every subfamily/format pair into a record living next to `metadata_path`.
    pub fn records(&self, metadata_path: &Path) -> Vec<FontRecord> {
        let dir = metadata_path.parent().unwrap_or_else(|| Path::new(""));
        let mut records = Vec::new();

        for sub in &self.subfamilies {
            for raw_format in &sub.formats {
                let Some(format) = Format::parse(raw_format) else {
                    tracing::warn!(
                        family = %self.family,
                        basename = %sub.basename,
                        format = %raw_format,
                        "skipping unsupported font format"
                    );
                    continue;
                };
                records.push(FontRecord {
                    family: self.family.clone(),
                    format,
                    style: sub.style.clone(),
                    weight: sub.weight,
                    path: dir.join(format!("{}.{raw_format}", sub.basename)),
                });
            }
        }

        records
    }
}

/// Reads the first-level family directories of a font library.
#[derive(Debug, Clone)]
pub struct LibraryDiscovery {
    root: PathBuf,
}

impl LibraryDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover and index in one go.
    pub fn index(&self) -> Result<FontIndex> {
        Ok(FontIndex::build(self.discover()?))
    }

    fn metadata_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            let candidate = entry.path().join(METADATA_FILE);
            if entry.file_type().is_dir() && candidate.is_file() {
                files.push(candidate);
            } else {
                tracing::debug!(path = %entry.path().display(), "no family metadata, skipping");
            }
        }

        Ok(files)
    }
}

impl FontDiscovery for LibraryDiscovery {
    fn discover(&self) -> Result<Vec<FontRecord>> {
        if !self.root.is_dir() {
            return Err(anyhow!("{}: not a directory", self.root.display()));
        }

        let files = self.metadata_files()?;

        // Parse in parallel, but keep directory order so duplicates resolve the same way every run.
        let per_family: Vec<Vec<FontRecord>> = files
            .par_iter()
            .map(|path| match FamilyMetadata::read(path) {
                Ok(meta) => meta.records(path),
                Err(err) => {
                    tracing::warn!(error = %format!("{err:#}"), "skipping invalid font family");
                    Vec::new()
                }
            })
            .collect();

        Ok(per_family.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const AMARANTH: &str = r#"{
        "Family": "Amaranth",
        "Subfamilies": [
            {"Basename": "amaranth-regular", "Formats": ["eot", "woff"], "Style": "normal", "Weight": 400},
            {"Basename": "amaranth-bolditalic", "Formats": ["woff", "svg"], "Style": "italic", "Weight": 700}
        ]
    }"#;

    #[test]
    fn expands_subfamilies_and_skips_unknown_formats() {
        let meta: FamilyMetadata = serde_json::from_str(AMARANTH).expect("parse");
        let records = meta.records(Path::new("/fonts/Amaranth/metadata.json"));

        let keys: Vec<String> = records.iter().map(FontRecord::column_key).collect();
        assert_eq!(keys, ["eot400normal", "woff400normal", "woff700italic"]);
        assert_eq!(
            records[1].path,
            PathBuf::from("/fonts/Amaranth/amaranth-regular.woff")
        );
    }

    #[test]
    fn skips_entries_without_valid_metadata() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path();

        fs::create_dir_all(root.join("Amaranth")).unwrap();
        fs::write(root.join("Amaranth").join(METADATA_FILE), AMARANTH).unwrap();
        fs::create_dir_all(root.join("Broken")).unwrap();
        fs::write(root.join("Broken").join(METADATA_FILE), "{").unwrap();
        fs::create_dir_all(root.join("Empty")).unwrap();
        fs::write(root.join("README"), "not a family").unwrap();

        let records = LibraryDiscovery::new(root).discover().expect("discover");
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.family == "Amaranth"));
    }

    #[test]
    fn root_must_be_a_directory() {
        let tmp = tempdir().expect("tempdir");
        let file = tmp.path().join("fonts");
        fs::write(&file, "").unwrap();

        assert!(LibraryDiscovery::new(&file).discover().is_err());
        assert!(LibraryDiscovery::new("/nonexistent/fontcss").discover().is_err());
    }
}
