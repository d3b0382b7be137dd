use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse},
    routing::{any, get},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use cocina::{sitemap, LocaleCode};
use serde::Serialize;

use crate::cache::PageKey;
use crate::errors::{WebError, WebResult};
use crate::pages::AppState;

/// The whole site. Locale prefixes other than `es` and `fr` are not found.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/recipes", get(recipes))
        .route("/recipes/:slug", get(recipe))
        .route("/:locale", get(localized_home))
        .route("/:locale/recipes", get(localized_recipes))
        .route("/:locale/recipes/:slug", get(localized_recipe))
        // `/api/health` answers every method
        .route("/api/health", any(health))
        .route("/health", get(health))
        .route("/sitemap.xml", get(sitemap_xml))
        .route("/static/*path", get(serve_static))
        .fallback(not_found)
        .layer(
            tower_http::compression::CompressionLayer::new()
                .quality(tower_http::CompressionLevel::Fastest),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Only non-fallback locales appear as a path prefix.
fn prefixed_locale(segment: &str) -> WebResult<LocaleCode> {
    LocaleCode::from_path_segment(segment)
        .filter(|locale| *locale != LocaleCode::FALLBACK)
        .ok_or(WebError::NotFound)
}

async fn render(state: &AppState, key: PageKey) -> WebResult<Html<String>> {
    Ok(Html(state.page(key).await?.to_string()))
}

async fn home(State(state): State<AppState>) -> WebResult<Html<String>> {
    render(&state, PageKey::Home(LocaleCode::FALLBACK)).await
}

async fn localized_home(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> WebResult<Html<String>> {
    render(&state, PageKey::Home(prefixed_locale(&locale)?)).await
}

async fn recipes(State(state): State<AppState>) -> WebResult<Html<String>> {
    render(&state, PageKey::List(LocaleCode::FALLBACK)).await
}

async fn localized_recipes(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> WebResult<Html<String>> {
    render(&state, PageKey::List(prefixed_locale(&locale)?)).await
}

async fn recipe(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<Html<String>> {
    let key = PageKey::Detail {
        slug,
        locale: LocaleCode::FALLBACK,
    };
    render(&state, key).await
}

async fn localized_recipe(
    State(state): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
) -> WebResult<Html<String>> {
    let key = PageKey::Detail {
        slug,
        locale: prefixed_locale(&locale)?,
    };
    render(&state, key).await
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
    /// Seconds since the server started.
    uptime: f64,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, proxy-revalidate",
            ),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        Json(Health {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            uptime: state.started.elapsed().as_secs_f64(),
        }),
    )
}

/// The sitemap for every recipe the CMS currently lists.
async fn sitemap_xml(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let slugs = state.source.list_slugs().await;
    let entries = sitemap::build(&state.site_url, &slugs, &LocaleCode::ALL, Utc::now());
    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        sitemap::to_xml(&entries)?,
    ))
}

async fn not_found() -> WebError {
    WebError::NotFound
}

/// Serve static files from in memory using `include_dir!`
async fn serve_static(Path(path): Path<String>) -> WebResult<impl IntoResponse> {
    let dir = include_dir::include_dir!("$CARGO_MANIFEST_DIR/static");
    let bytes = dir.get_file(&path).ok_or(WebError::NotFound)?.contents();
    let header = (
        header::CONTENT_TYPE,
        match path.rsplit('.').next() {
            Some("css") => "text/css",
            Some("js") => "text/javascript",
            Some("svg") => "image/svg+xml",
            Some("png") => "image/png",
            _ => "application/octet-stream",
        },
    );
    Ok(([header], bytes).into_response())
}
