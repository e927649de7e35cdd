//! HTTP server for fontcss - the front counter of the stylesheet bakery (made by FontLab https://www.fontlab.com/)
//!
//! Browsers knock on `/css` with a family query, and leave with a freshly
//! baked `@font-face` stylesheet (or a polite "you already have this one").

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::http::header::{
    ACCEPT_ENCODING, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE, ETAG,
    IF_NONE_MATCH, REFERER, SERVER, VARY,
};
use axum::http::{Extensions, HeaderMap, HeaderValue, Method, StatusCode, Uri, Version};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use fontcss_core::etag::{fingerprint_keys, gzip_negotiated, validate};
use fontcss_core::font::{FontRecord, Format};
use fontcss_core::index::FontIndex;
use fontcss_core::query::parse_family_spec;
use fontcss_core::template::Templates;
use fontcss_core::whitelist::Whitelist;

use crate::error::CssError;

/// Response-shaping switches, fixed at startup.
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// `Cache-Control: max-age` value in seconds
    pub max_age: u64,
    /// Compute and validate entity tags
    pub etag: bool,
    /// Gzip responses and vary on `Accept-Encoding`
    pub gzip: bool,
    /// Send `Access-Control-Allow-Origin: *`
    pub cors: bool,
    /// `Server` header value, e.g. `fontcss/0.1.0`
    pub server_name: Option<String>,
}

/// Everything a request handler may read. Built once, never mutated.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub index: FontIndex,
    pub whitelist: Whitelist,
    pub templates: Templates,
}

/// Opens the shop and serves stylesheets until the process is stopped.
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding HTTP server to {bind}"))?;

    tracing::info!(
        %bind,
        fonts = state.index.len(),
        etag = state.config.etag,
        gzip = state.config.gzip,
        "serving font stylesheets"
    );

    axum::serve(listener, router(Arc::new(state)))
        .await
        .context("serving HTTP")?;
    Ok(())
}

/// Routes: `/css` (and anything below it) plus a `/health` check.
pub fn router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/css", any(css_handler))
        .route("/css/", any(css_handler))
        .route("/css/{*rest}", any(css_handler))
        .layer(middleware::from_fn_with_state(state.clone(), common_headers));

    let router = if state.config.gzip {
        router.layer(CompressionLayer::new().compress_when(compressible))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Every successful response is gzipped for clients that accept it, however
/// small, so a `+gzip` entity tag always labels a compressed body.
fn compressible(status: StatusCode, _: Version, _: &HeaderMap, _: &Extensions) -> bool {
    status == StatusCode::OK
}

/// Headers every response carries, whatever its status.
async fn common_headers(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    if state.config.cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
    if let Some(name) = &state.config.server_name {
        match HeaderValue::from_str(name) {
            Ok(value) => {
                headers.insert(SERVER, value);
            }
            Err(_) => tracing::warn!(server_name = %name, "server name is not a valid header value"),
        }
    }
    if state.config.gzip {
        headers.insert(VARY, HeaderValue::from_static("Accept-Encoding"));
    }

    response
}

/// A failed request, plus the entity tag to hand back if we have one.
struct Failure {
    error: CssError,
    etag: Option<HeaderValue>,
}

impl From<CssError> for Failure {
    fn from(error: CssError) -> Self {
        Self { error, etag: None }
    }
}

async fn css_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    match serve_css(state, &method, &headers, &uri).await {
        Ok(response) => response,
        Err(Failure { error, etag }) => {
            if error.status().is_server_error() {
                tracing::error!(%uri, %error, "stylesheet request failed");
            } else {
                tracing::info!(%uri, %method, %error, "stylesheet request rejected");
            }
            let mut response = error.into_response();
            if let Some(tag) = etag {
                response.headers_mut().insert(ETAG, tag);
            }
            response
        }
    }
}

async fn serve_css(
    state: Arc<AppState>,
    method: &Method,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<Response, Failure> {
    if method != Method::GET {
        return Err(CssError::MethodNotSupported(method.to_string()).into());
    }

    let referer = header_str(headers, REFERER).unwrap_or_default();
    if !state.whitelist.contains(referer) {
        return Err(CssError::RefererRejected(referer.to_string()).into());
    }

    let params = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map(|Query(params)| params)
        .unwrap_or_default();

    let family = form_value(&params, "family");
    if family.is_empty() {
        return Err(CssError::MissingFamily.into());
    }

    let raw_format = match form_value(&params, "format") {
        "" => "woff",
        raw => raw,
    };
    let format = Format::parse(raw_format)
        .ok_or_else(|| CssError::UnknownFormat(raw_format.to_string()))?;

    let keys = parse_family_spec(family, format);
    if keys.is_empty() {
        return Err(CssError::EmptyQuery(family.to_string()).into());
    }

    let mut etag = None;
    if state.config.etag {
        let gzip = gzip_negotiated(state.config.gzip, header_str(headers, ACCEPT_ENCODING));
        let fingerprint = {
            let state = state.clone();
            let keys = keys.clone();
            task::spawn_blocking(move || fingerprint_keys(&state.index, &keys, gzip))
                .await
                .map_err(|e| CssError::RenderFailure(format!("task join error: {e}")))?
        };

        let validation = validate(&fingerprint, header_str(headers, IF_NONE_MATCH));
        etag = validation
            .etag
            .and_then(|tag| HeaderValue::from_str(&tag).ok());

        if validation.matched {
            let mut response = StatusCode::NOT_MODIFIED.into_response();
            let response_headers = response.headers_mut();
            response_headers.insert(CACHE_CONTROL, cache_control(state.config.max_age));
            if let Some(tag) = etag {
                response_headers.insert(ETAG, tag);
            }
            return Ok(response);
        }
    }

    let mut records: Vec<Arc<FontRecord>> = Vec::with_capacity(keys.len());
    for key in &keys {
        match state.index.lookup(key) {
            Some(record) => records.push(record.clone()),
            None => {
                return Err(Failure {
                    error: CssError::FontNotFound {
                        family: key.family.clone(),
                        column_key: key.column_key.clone(),
                    },
                    etag,
                })
            }
        }
    }

    let rendered = {
        let state = state.clone();
        task::spawn_blocking(move || {
            state
                .templates
                .render_records(format, records.iter().map(|r| r.as_ref()))
        })
        .await
    };
    let css = match rendered {
        Ok(Ok(css)) => css,
        Ok(Err(err)) => {
            return Err(Failure {
                error: CssError::RenderFailure(err.to_string()),
                etag,
            })
        }
        Err(err) => {
            return Err(Failure {
                error: CssError::RenderFailure(format!("task join error: {err}")),
                etag,
            })
        }
    };

    let mut response = Response::new(Body::from(css));
    let response_headers = response.headers_mut();
    response_headers.insert(CACHE_CONTROL, cache_control(state.config.max_age));
    response_headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/css; charset=utf-8"),
    );
    if state.config.etag {
        if let Some(tag) = etag {
            response_headers.insert(ETAG, tag);
        }
    }
    Ok(response)
}

/// First value of a query parameter, or `""` when absent.
fn form_value<'a>(params: &'a [(String, String)], name: &str) -> &'a str {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .unwrap_or_default()
}

fn header_str(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn cache_control(max_age: u64) -> HeaderValue {
    HeaderValue::from_str(&format!("max-age={max_age}"))
        .unwrap_or_else(|_| HeaderValue::from_static("max-age=0"))
}
