//! fontcss-core: the quiet kitchen behind every `@font-face` stylesheet
//!
//! A browser asks for `family=Amaranth|Open Sans:300,600italic`; this crate
//! works out which font files that means, checks whether the browser's cached
//! copy is still good, and hands back the data needed to write the CSS.
//!
//! ## How an order moves through the kitchen
//!
//! **Discovery**: reading the pantry once at startup
//! - Walks the first-level family directories of a font library
//! - Reads each family's `metadata.json` in parallel
//! - Expands subfamilies into one [`font::FontRecord`] per format
//!
//! **Indexing**: a two-level card catalog
//! - Rows are family names, columns are `format+weight+style`
//! - Built once, shared read-only with every request
//!
//! **Query parsing**: reading the order ticket
//! - `|` separates families, `:` introduces styles, `,` separates styles
//! - Malformed tickets produce no lookups rather than errors
//!
//! **Entity tags**: is the customer's plate still warm?
//! - SHA-256 over modification times, in resolution order
//! - `+gzip` suffix keeps compressed and plain variants apart
//!
//! **Templates**: plating
//! - One template per format, one `@font-face` rule per font
//!
//! ## A Sample Conversation
//!
//! ```rust,no_run
//! use fontcss_core::discovery::LibraryDiscovery;
//! use fontcss_core::font::Format;
//! use fontcss_core::query::parse_family_spec;
//!
//! let index = LibraryDiscovery::new("fonts/").index()?;
//! for key in parse_family_spec("Amaranth:400,700italic", Format::Woff) {
//!     match index.lookup(&key) {
//!         Some(font) => println!("{} -> {}", key.column_key, font.path.display()),
//!         None => println!("{} {} is not in the library", key.family, key.column_key),
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod discovery;
pub mod error;
pub mod etag;
pub mod font;
pub mod index;
pub mod query;
pub mod template;
pub mod whitelist;
