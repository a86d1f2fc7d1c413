use axum::{
    Json, Router,
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use include_dir::{include_dir, Dir};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::StylistError,
    gemini::TextGenerator,
    models::{FormOptions, GenerationResponse, Preferences},
    pipeline::recommend,
    render::{render_error, render_outfits},
};

static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/assets/*path", get(asset))
        .route("/health", get(health))
        .route("/api/options", get(form_options))
        .route("/api/recommendations", post(generate_recommendations))
        .route("/api/recommendations/render", post(render_recommendations))
        .with_state(state)
}

async fn index() -> Response {
    asset(Path("index.html".to_string())).await
}

async fn asset(Path(path): Path<String>) -> Response {
    match STATIC_DIR.get_file(&path) {
        Some(file) => {
            let mime = match path.rsplit('.').next() {
                Some("html") => "text/html; charset=utf-8",
                Some("css") => "text/css; charset=utf-8",
                Some("js") => "text/javascript; charset=utf-8",
                _ => "application/octet-stream",
            };
            ([(header::CONTENT_TYPE, mime)], file.contents()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn health() -> &'static str { "ok" }

async fn form_options() -> Json<FormOptions> {
    Json(FormOptions::default())
}

pub async fn generate_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<Preferences>, JsonRejection>,
) -> Result<Json<GenerationResponse>, StylistError> {
    let Json(prefs) = payload?;
    let outfits = recommend(state.generator.as_ref(), &prefs).await?;
    Ok(Json(GenerationResponse { id: Uuid::new_v4(), generated_at: Utc::now(), outfits }))
}

// The page swaps this fragment into its results area, so failures render as a panel too.
pub async fn render_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<Preferences>, JsonRejection>,
) -> Html<String> {
    let result = match payload {
        Ok(Json(prefs)) => recommend(state.generator.as_ref(), &prefs).await,
        Err(rejection) => Err(StylistError::from(rejection)),
    };
    match result {
        Ok(outfits) => Html(render_outfits(&outfits)),
        Err(e) => {
            tracing::error!(code = e.code(), "❌ Generation failed: {}", e);
            Html(render_error(&e))
        }
    }
}
