//! Page-view analytics.
//!
//! Every successful HTML page leaving the server gets the Google tag loader and its init snippet
//! injected into `<head>`. The init snippet reports the page view for the request path
//! (including the query string), so every new path or query produces a new page view.

use axum::{
    body::{to_bytes, Body, Bytes, HttpBody},
    extract::{Request, State},
    http::{header, response::Parts, HeaderValue, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_regex::regex_is_match;
use tracing::{debug, error};

use crate::{templ_manager::TemplateManager, AppState};

pub const GTAG_LOADER_URL: &str = "https://www.googletagmanager.com/gtag/js";
/// `id` of the inline init script, used to detect pages that already carry the snippet.
pub const INIT_SCRIPT_ID: &str = "gtag-init";
/// Upper bound for HTML bodies buffered by the injection middleware.
const MAX_HTML_BODY_BYTES: usize = 8 * 1024 * 1024;

// ###################################
// ->   STRUCTS
// ###################################
/// Validated analytics property id, e.g. `G-XXXXXXXXXX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingId(String);

impl TrackingId {
    pub fn parse<S: AsRef<str>>(value: S) -> Result<Self, InvalidTrackingId> {
        let value = value.as_ref();
        if regex_is_match!(r"^(G|UA|GT|AW|DC)-[A-Z0-9-]+$", value) {
            Ok(Self(value.to_owned()))
        } else {
            Err(InvalidTrackingId(value.to_owned()))
        }
    }
}

impl AsRef<str> for TrackingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid tracking id: '{0}'")]
pub struct InvalidTrackingId(String);

#[derive(Debug, Clone)]
pub struct Analytics {
    tracking_id: TrackingId,
}

impl Analytics {
    pub fn new(tracking_id: TrackingId) -> Self {
        Self { tracking_id }
    }

    pub fn loader_src(&self) -> String {
        format!("{GTAG_LOADER_URL}?id={}", self.tracking_id.as_ref())
    }

    /// Renders the loader tag and the init snippet reporting a page view for `page_path`.
    pub fn render_snippet(
        &self,
        templ_mgr: &TemplateManager,
        page_path: &str,
    ) -> Result<String, tera::Error> {
        let mut ctx = tera::Context::new();
        ctx.insert("loader_src", &self.loader_src());
        ctx.insert("init_script_id", INIT_SCRIPT_ID);
        ctx.insert("tracking_id_js", &js_string(self.tracking_id.as_ref()));
        ctx.insert("page_path_js", &js_string(page_path));

        templ_mgr.render_html_to_string(&ctx, "analytics.html")
    }
}

// ###################################
// ->   MIDDLEWARE
// ###################################
/// Injects the analytics snippet into successful `text/html` responses.
/// Everything else (and everything when analytics is off) passes through untouched.
pub async fn inject_analytics(
    State(app_state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(analytics) = app_state.analytics.as_ref() else {
        return next.run(req).await;
    };

    let page_path = page_path(req.uri());
    let resp = next.run(req).await;

    if !resp.status().is_success() || !is_html(&resp) {
        return resp;
    }
    if exceeds_buffer_limit(&resp) {
        debug!("{:<12} - page too large, serving it as is", "ANALYTICS");
        return resp;
    }

    let (parts, body) = resp.into_parts();
    let bytes = match to_bytes(body, MAX_HTML_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(er) => {
            // Only a streamed body without a size can get here, and it is already consumed.
            error!("{:<12} - failed to buffer html body: {er}", "ANALYTICS");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let snippet = analytics.render_snippet(&app_state.templ_mgr, &page_path);
    rewrite_page(parts, bytes, snippet, &page_path)
}

/// Puts `snippet` into the buffered page. If rendering failed, the page isn't UTF-8 or it
/// already carries the tags, the original bytes go out unchanged.
fn rewrite_page(
    mut parts: Parts,
    bytes: Bytes,
    snippet: Result<String, tera::Error>,
    page_path: &str,
) -> Response {
    let snippet = match snippet {
        Ok(snippet) => snippet,
        Err(er) => {
            error!("{:<12} - failed to render snippet: {er}", "ANALYTICS");
            return Response::from_parts(parts, Body::from(bytes));
        }
    };

    let Ok(document) = std::str::from_utf8(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    match inject_snippet(document, &snippet) {
        Some(document) => {
            debug!("{:<12} - page view: {page_path}", "ANALYTICS");
            parts
                .headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from(document.len()));
            Response::from_parts(parts, Body::from(document))
        }
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}

// ###################################
// ->   HELPERS
// ###################################
/// The path reported for a page view: the path, plus `?query` when there is a non-empty query.
pub fn page_path(uri: &Uri) -> String {
    match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{query}", uri.path()),
        _ => uri.path().to_string(),
    }
}

/// Inserts `snippet` right before `</head>`, or at the very start if the document has no head.
/// Returns `None` if the document already carries the snippet.
pub fn inject_snippet(document: &str, snippet: &str) -> Option<String> {
    let marker = format!(r#"id="{INIT_SCRIPT_ID}""#);
    if document.contains(&marker) {
        return None;
    }

    // ASCII lowercasing keeps byte offsets intact.
    let insert_at = document
        .to_ascii_lowercase()
        .find("</head>")
        .unwrap_or(0);

    let mut out = String::with_capacity(document.len() + snippet.len());
    out.push_str(&document[..insert_at]);
    out.push_str(snippet);
    out.push_str(&document[insert_at..]);
    Some(out)
}

/// Checks both the declared `Content-Length` and the body's own size hint.
fn exceeds_buffer_limit(resp: &Response) -> bool {
    let declared = resp
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let hinted = resp.body().size_hint().lower();

    declared.max(hinted) > MAX_HTML_BODY_BYTES as u64
}

fn is_html(resp: &Response) -> bool {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

/// A JSON string literal that is also safe to place inside a `<script>` element.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace("</", r"<\/")
}
