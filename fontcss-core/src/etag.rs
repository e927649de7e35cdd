//! Entity tags for conditional revalidation (made by FontLab https://www.fontlab.com/)
//!
//! A stylesheet is as fresh as the font files it embeds, so its tag is a
//! digest over their modification times, taken in resolution order.

use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::font::FontRecord;
use crate::index::FontIndex;
use crate::query::LookupKey;

/// Suffix that keeps compressed and plain variants apart.
pub const GZIP_SUFFIX: &str = "+gzip";

/// Outcome of fingerprinting the fonts behind one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fingerprint {
    Token(String),
    /// A font was missing or its timestamp unreadable; revalidation is skipped.
    Unavailable,
}

impl Fingerprint {
    pub fn token(&self) -> Option<&str> {
        match self {
            Fingerprint::Token(token) => Some(token),
            Fingerprint::Unavailable => None,
        }
    }
}

/// What to do with the client's `If-None-Match` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub matched: bool,
    /// Value for the response `ETag` header, if any.
    pub etag: Option<String>,
}

/// True when the response will be gzip-compressed for this client.
pub fn gzip_negotiated(gzip_enabled: bool, accept_encoding: Option<&str>) -> bool {
    gzip_enabled && accept_encoding.is_some_and(|value| value.contains("gzip"))
}

/// Digest the modification times of `records`, in order.
pub fn fingerprint<'a, I>(records: I, gzip: bool) -> Fingerprint
where
    I: IntoIterator<Item = &'a FontRecord>,
{
    let mut hasher = Sha256::new();
    for record in records {
        match record.modified() {
            Ok(mtime) => hasher.update(timestamp(mtime).as_bytes()),
            Err(err) => {
                tracing::warn!(path = %record.path.display(), error = %err, "cannot fingerprint font");
                return Fingerprint::Unavailable;
            }
        }
    }

    let mut token = hex::encode(hasher.finalize());
    if gzip {
        token.push_str(GZIP_SUFFIX);
    }
    Fingerprint::Token(token)
}

/// Resolve `keys` against `index` and fingerprint the result.
///
/// Any miss makes the fingerprint unavailable rather than failing the request;
/// the miss is reported properly once the fonts are resolved for rendering.
pub fn fingerprint_keys(index: &FontIndex, keys: &[LookupKey], gzip: bool) -> Fingerprint {
    let mut records = Vec::with_capacity(keys.len());
    for key in keys {
        match index.lookup(key) {
            Some(record) => records.push(record.as_ref()),
            None => {
                tracing::debug!(family = %key.family, column = %key.column_key, "fingerprint lookup missed");
                return Fingerprint::Unavailable;
            }
        }
    }
    fingerprint(records, gzip)
}

/// Compare a fresh fingerprint with the token the client sent.
pub fn validate(fingerprint: &Fingerprint, client_token: Option<&str>) -> Validation {
    match fingerprint {
        Fingerprint::Token(token) => Validation {
            matched: client_token == Some(token.as_str()),
            etag: Some(token.clone()),
        },
        Fingerprint::Unavailable => Validation {
            matched: false,
            etag: client_token.filter(|t| !t.is_empty()).map(str::to_string),
        },
    }
}

fn timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Format;
    use std::fs::{self, File};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn font_at(path: &Path, mtime: SystemTime) -> FontRecord {
        fs::write(path, b"font").expect("write font");
        File::options()
            .write(true)
            .open(path)
            .and_then(|f| f.set_modified(mtime))
            .expect("set mtime");
        FontRecord {
            family: "Amaranth".to_string(),
            format: Format::Woff,
            style: "normal".to_string(),
            weight: 400,
            path: path.to_path_buf(),
        }
    }

    fn two_fonts(dir: &Path) -> (FontRecord, FontRecord) {
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_350_000_000);
        (
            font_at(&dir.join("a.woff"), base),
            font_at(&dir.join("b.woff"), base + Duration::from_secs(60)),
        )
    }

    #[test]
    fn deterministic_fixed_width_hex() {
        let tmp = tempdir().expect("tempdir");
        let (a, b) = two_fonts(tmp.path());

        let first = fingerprint([&a, &b], false);
        let second = fingerprint([&a, &b], false);
        assert_eq!(first, second);

        let token = first.token().expect("token");
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn order_matters() {
        let tmp = tempdir().expect("tempdir");
        let (a, b) = two_fonts(tmp.path());
        assert_ne!(fingerprint([&a, &b], false), fingerprint([&b, &a], false));
    }

    #[test]
    fn gzip_only_adds_suffix() {
        let tmp = tempdir().expect("tempdir");
        let (a, _) = two_fonts(tmp.path());

        let plain = fingerprint([&a], false);
        let gzip = fingerprint([&a], true);
        assert_eq!(
            gzip.token().unwrap(),
            format!("{}{GZIP_SUFFIX}", plain.token().unwrap())
        );
    }

    #[test]
    fn vanished_file_is_unavailable() {
        let tmp = tempdir().expect("tempdir");
        let (a, _) = two_fonts(tmp.path());
        fs::remove_file(&a.path).expect("remove");
        assert_eq!(fingerprint([&a], false), Fingerprint::Unavailable);
    }

    #[test]
    fn index_miss_is_unavailable() {
        let tmp = tempdir().expect("tempdir");
        let (a, _) = two_fonts(tmp.path());
        let index = FontIndex::build([a]);

        let hit = fingerprint_keys(&index, &[LookupKey::new("Amaranth", "woff400normal")], false);
        assert!(hit.token().is_some());

        let miss = fingerprint_keys(&index, &[LookupKey::new("Nonexistent", "woff400normal")], false);
        assert_eq!(miss, Fingerprint::Unavailable);
    }

    #[test]
    fn validation_requires_exact_match() {
        let fp = Fingerprint::Token("abc+gzip".to_string());

        let hit = validate(&fp, Some("abc+gzip"));
        assert!(hit.matched);
        assert_eq!(hit.etag.as_deref(), Some("abc+gzip"));

        assert!(!validate(&fp, Some("abc")).matched);
        assert!(!validate(&fp, None).matched);
    }

    #[test]
    fn unavailable_echoes_client_token() {
        let echoed = validate(&Fingerprint::Unavailable, Some("stale"));
        assert!(!echoed.matched);
        assert_eq!(echoed.etag.as_deref(), Some("stale"));

        let silent = validate(&Fingerprint::Unavailable, None);
        assert!(!silent.matched);
        assert_eq!(silent.etag, None);
    }

    #[test]
    fn gzip_negotiation_needs_both_sides() {
        assert!(gzip_negotiated(true, Some("gzip, deflate")));
        assert!(!gzip_negotiated(true, Some("deflate")));
        assert!(!gzip_negotiated(true, None));
        assert!(!gzip_negotiated(false, Some("gzip")));
    }
}
