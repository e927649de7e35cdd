//! Family query parsing (made by FontLab https://www.fontlab.com/)
//!
//! The `family` parameter packs several lookups into one string:
//!
//! ```text
//! Amaranth|Open Sans:300,600italic
//! ```
//!
//! Families are separated by `|`, an optional style list follows the first
//! `:`, and styles are separated by `,`. A bare number is a weight with the
//! `normal` style; anything else is used verbatim as `<weight><style>`.

use serde::{Deserialize, Serialize};

use crate::font::{column_key, Format};

const DEFAULT_WEIGHT: &str = "400";
const DEFAULT_STYLE: &str = "normal";

/// Two-level index key: the family row and the `format+weight+style` column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupKey {
    pub family: String,
    pub column_key: String,
}

impl LookupKey {
    pub fn new(family: impl Into<String>, column_key: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            column_key: column_key.into(),
        }
    }
}

/// Parse a family specification into ordered lookup keys for `format`.
///
/// Malformed input never errors; it simply produces fewer (or zero) keys.
pub fn parse_family_spec(spec: &str, format: Format) -> Vec<LookupKey> {
    let mut keys = Vec::new();

    if spec.starts_with(['|', ':', ',']) {
        return keys;
    }

    for segment in spec.split('|') {
        match segment.split_once(':') {
            None => push_key(&mut keys, segment, DEFAULT_WEIGHT, DEFAULT_STYLE, format),
            Some((family, styles)) => {
                for token in styles.split(',').filter(|t| !t.is_empty()) {
                    if token.parse::<i64>().is_ok() {
                        push_key(&mut keys, family, token, DEFAULT_STYLE, format);
                    } else {
                        push_key(&mut keys, family, "", token, format);
                    }
                }
            }
        }
    }

    keys
}

fn push_key(keys: &mut Vec<LookupKey>, family: &str, weight: &str, style: &str, format: Format) {
    if family.is_empty() || (weight.is_empty() && style.is_empty()) {
        return;
    }
    keys.push(LookupKey::new(family, column_key(format, weight, style)));
}
