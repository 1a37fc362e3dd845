use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{RotaConfig, ServerSettings};
use crate::display::render_week_html;
use crate::error::{RotaError, RotaResult};
use crate::schedule::{schedule_from_workbook, WeekSchedule};

/// Shared, read-only state. Nothing from one upload survives into the next.
pub struct AppState {
    pub config: Arc<RotaConfig>,
}

impl AppState {
    pub fn new(config: RotaConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    ok: bool,
    endpoint: &'static str,
    runtime: &'static str,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        endpoint: "rota",
        runtime: "rust",
    })
}

/// Decodes and schedules on the blocking pool; workbook parsing is CPU bound.
async fn schedule_upload(body: web::Bytes, state: &AppState) -> RotaResult<WeekSchedule> {
    if body.is_empty() {
        return Err(RotaError::EmptyPayload);
    }
    info!(bytes = body.len(), "processing uploaded rota");

    let config = Arc::clone(&state.config);
    let schedule = web::block(move || schedule_from_workbook(&config, &body)).await??;
    Ok(schedule)
}

fn log_failure(err: &RotaError) {
    if err.is_client_error() {
        warn!(error = %err, "rejected rota upload");
    } else {
        tracing::error!(error = %err, "failed to process rota upload");
    }
}

// POST /api/rota: raw .xlsx bytes in, JSON week out
async fn upload_rota(
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, RotaError> {
    let schedule = schedule_upload(body, &state).await.inspect_err(log_failure)?;
    Ok(HttpResponse::Ok().json(schedule))
}

// POST /api/rota/html: same input, rendered cards out
async fn upload_rota_html(
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, RotaError> {
    let schedule = schedule_upload(body, &state).await.inspect_err(log_failure)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_week_html(&schedule)))
}

async fn index() -> HttpResponse {
    let html = include_str!("../templates/index.html");
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html)
}

/// Routes, shared by the server and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .service(
            web::resource("/api/rota")
                .route(web::get().to(health))
                .route(web::post().to(upload_rota)),
        )
        .route("/api/rota/html", web::post().to(upload_rota_html));
}

pub async fn start_server(settings: ServerSettings, config: RotaConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(config));
    let max_upload = settings.max_upload_bytes;

    info!(bind = %settings.bind, port = settings.port, "starting rota server");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(max_upload))
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((settings.bind.as_str(), settings.port))?
    .run()
    .await
}
