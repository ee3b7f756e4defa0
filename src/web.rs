//! HTTP surface of the gate. One route does the work: `/download` takes the
//! query parameters the fastdl rewrite rule forwards (`file`, `steamid`,
//! optionally `secret`) and answers with a redirect into the download host,
//! a deny status, or a 500 when the preference store is unreachable.

use crate::gate::{self, Decision, DownloadRequest};
use crate::settings::{Download, Settings};
use crate::store::PreferenceStore;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use miette::IntoDiagnostic;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn PreferenceStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/download", get(download))
        .route("/healthz", get(health))
        .with_state(state)
}

pub async fn serve(settings: Settings, store: Arc<dyn PreferenceStore>) -> miette::Result<()> {
    let state = AppState {
        settings: Arc::new(settings),
        store,
    };

    let addr: SocketAddr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    )
    .parse()
    .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let router = router(state);

    tracing::info!(%addr, "Download gate listening");
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    axum::serve(listener, router).await.into_diagnostic()?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    file: Option<String>,
    steamid: Option<String>,
    secret: Option<String>,
}

async fn download(State(state): State<AppState>, Query(q): Query<DownloadQuery>) -> Response {
    let req = DownloadRequest {
        file: q.file,
        steamid: q.steamid,
        secret: q.secret,
    };

    let decision = match gate::decide(
        state.store.as_ref(),
        state.settings.download.secret.as_deref(),
        &req,
    )
    .await
    {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!(error = %e, "preference store failure");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "preference store unavailable" })),
            )
                .into_response();
        }
    };

    respond(&state.settings.download, &req, decision)
}

/// Map a decision to its HTTP shape. The allow redirect reuses the raw
/// request path, so a `.bz2` request lands on the `.bz2` object even though
/// the policy lookup ran against the stripped path.
fn respond(cfg: &Download, req: &DownloadRequest, decision: Decision) -> Response {
    match decision {
        Decision::Allow => {
            let file = req.file.as_deref().unwrap_or_default();
            tracing::debug!(%file, "allowed");
            Redirect::temporary(&cfg.target_for(file)).into_response()
        }
        Decision::OptInRequired => {
            tracing::info!(file = req.file.as_deref(), "denied: file is opt-in");
            deny(StatusCode::NOT_FOUND, cfg.error_pages.opt_in_required.as_deref())
        }
        Decision::NoAccount => {
            tracing::info!("denied: missing or malformed steamid");
            deny(
                StatusCode::UNAUTHORIZED,
                cfg.error_pages.unspecified_steamid.as_deref(),
            )
        }
        Decision::NoFile => {
            tracing::info!("denied: no file requested");
            deny(
                StatusCode::NOT_FOUND,
                cfg.error_pages.unspecified_file.as_deref(),
            )
        }
        Decision::SecretMismatch => {
            tracing::info!("denied: secret mismatch");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// Deny status plus an optional error-page redirect, matching the original
/// scheme of setting a Location header alongside the deny status.
fn deny(status: StatusCode, error_page: Option<&str>) -> Response {
    let mut response = status.into_response();
    if let Some(page) = error_page {
        match HeaderValue::from_str(page) {
            Ok(value) => {
                response.headers_mut().insert(header::LOCATION, value);
            }
            Err(_) => {
                tracing::warn!(%page, "configured error page is not a valid Location header");
            }
        }
    }
    response
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
