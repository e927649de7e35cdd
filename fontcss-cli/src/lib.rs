//! fontcss CLI (made by FontLab https://www.fontlab.com/)

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::{ArgAction, Parser, ValueHint};
use tracing_subscriber::EnvFilter;

use fontcss_core::discovery::LibraryDiscovery;
use fontcss_core::template::Templates;
use fontcss_core::whitelist::Whitelist;

pub mod error;
pub mod server;

use crate::server::{AppState, ServerConfig};

pub const PROG_NAME: &str = "fontcss";

const DEFAULT_BIND: &str = "0.0.0.0:80";
const DEFAULT_LIBRARY: &str = "fonts/";
const DEFAULT_TEMPLATES: &str = "templates/";
const DEFAULT_WHITELIST: &str = "whitelist.json";
const DEFAULT_LOG_FILTER: &str = "fontcss_cli=info,fontcss_core=info,tower_http=info";

/// CLI entrypoint for fontcss.
#[derive(Debug, Parser)]
#[command(
    name = "fontcss",
    version,
    about = "Serve @font-face stylesheets with embedded fonts (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// TCP address to bind to
    #[arg(short = 'b', long = "bind", default_value = DEFAULT_BIND)]
    bind: String,

    /// Cache-Control max-age value
    #[arg(short = 'c', long = "max-age", default_value_t = 2_592_000)]
    max_age: u64,

    /// Toggle entity tags validation
    #[arg(short = 'e', long = "etag", action = ArgAction::SetTrue)]
    etag: bool,

    /// Toggle response gzip compression
    #[arg(short = 'g', long = "gzip", action = ArgAction::SetTrue)]
    gzip: bool,

    /// Path to font library
    #[arg(short = 'l', long = "library", default_value = DEFAULT_LIBRARY, value_parser = path_parser(), value_hint = ValueHint::DirPath)]
    library: PathBuf,

    /// Toggle cross-origin resource sharing
    #[arg(short = 'o', long = "cors", action = ArgAction::SetTrue)]
    cors: bool,

    /// Path to templates directory
    #[arg(short = 't', long = "templates", default_value = DEFAULT_TEMPLATES, value_parser = path_parser(), value_hint = ValueHint::DirPath)]
    templates: PathBuf,

    /// Path to whitelist file
    #[arg(short = 'w', long = "whitelist", default_value = DEFAULT_WHITELIST, value_parser = path_parser(), value_hint = ValueHint::FilePath)]
    whitelist: PathBuf,
}

impl Cli {
    /// Blank string flags mean "use the default".
    fn normalized(mut self) -> Self {
        if self.bind.trim().is_empty() {
            self.bind = DEFAULT_BIND.to_string();
        }
        blank_path_default(&mut self.library, DEFAULT_LIBRARY);
        blank_path_default(&mut self.templates, DEFAULT_TEMPLATES);
        blank_path_default(&mut self.whitelist, DEFAULT_WHITELIST);
        self
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            max_age: self.max_age,
            etag: self.etag,
            gzip: self.gzip,
            cors: self.cors,
            server_name: Some(format!("{PROG_NAME}/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// Like clap's `PathBuf` parser, but lets blank values through to be defaulted.
fn path_parser() -> impl TypedValueParser<Value = PathBuf> {
    OsStringValueParser::new().map(PathBuf::from)
}

fn blank_path_default(path: &mut PathBuf, default: &str) {
    if path.as_os_str().is_empty() {
        *path = PathBuf::from(default);
    }
}

/// Parse CLI args, load the library and serve until stopped.
pub fn run() -> Result<()> {
    let cli = Cli::parse().normalized();
    init_tracing();

    let state = build_state(&cli)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(server::serve(&cli.bind, state))
}

/// Install the global subscriber; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load everything a request handler needs, refusing to start half-equipped.
fn build_state(cli: &Cli) -> Result<AppState> {
    let index = LibraryDiscovery::new(&cli.library).index()?;
    if index.is_empty() {
        return Err(anyhow!("{}: empty font library", cli.library.display()));
    }
    tracing::info!(
        library = %cli.library.display(),
        fonts = index.len(),
        families = index.families().count(),
        "font library indexed"
    );

    let whitelist = Whitelist::read(&cli.whitelist)?;
    if whitelist.is_empty() {
        return Err(anyhow!("{}: empty whitelist", cli.whitelist.display()));
    }

    let templates = load_templates(&cli.templates)?;

    Ok(AppState {
        config: cli.server_config(),
        index,
        whitelist,
        templates,
    })
}

fn load_templates(dir: &Path) -> Result<Templates> {
    Templates::load(dir).with_context(|| format!("loading templates from {}", dir.display()))
}
