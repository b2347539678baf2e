use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use handlebars::Handlebars;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::analysis::analyze;
use crate::budget::{Budget, BudgetClass};
use crate::config::Config;
use crate::downloader::{XLSX_CONTENT_TYPE, XLSX_FILENAME};
use crate::error::Error;
use crate::loader::{self, Ingested};
use crate::slides::{PPTX_CONTENT_TYPE, PPTX_FILENAME};
use crate::table::{COST_COLUMN, Edit, NAME_COLUMN, SAVINGS_COLUMN, Table};

/// Immutable per-server state. Tables never live here: the browser sends the
/// whole table with every request.
pub struct AppState {
    templates: Handlebars<'static>,
    config: Config,
}

/// Body of `/api/analyze` and both export routes.
#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub table: Table,
    #[serde(default)]
    pub edits: Vec<Edit>,
    #[serde(default)]
    pub budget: Budget,
}

type Payload = Result<Json<AnalyzeRequest>, JsonRejection>;

#[derive(Serialize)]
struct AnalyzeResponse {
    status: String,
    table: Table,
    classes: Vec<BudgetClass>,
    title: String,
    /// Base64-encoded PNG
    chart_png: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

/// Handler error, rendered as `{"status":"error","message":...}`.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        match e {
            Error::Malformed(_)
            | Error::UnsupportedFile(_)
            | Error::NotNumeric { .. }
            | Error::Edit(_)
            | Error::Budget(_)
            | Error::XlsxRead(_) => AppError::BadRequest(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

// Extractor failures (bad JSON, invalid budget, unknown edit op, missing
// multipart boundary) are input errors like any other.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            AppError::Internal(m) => {
                error!("request failed: {}", m);
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (
            status,
            Json(StatusResponse {
                status: "error".to_string(),
                message: Some(message),
            }),
        )
            .into_response()
    }
}

/// Build the router for a configuration.
pub fn router(config: Config) -> Result<Router, Box<dyn std::error::Error>> {
    let mut templates = Handlebars::new();
    templates.set_strict_mode(true);
    templates.register_template_string("index", include_str!("./templates/index.hbs"))?;

    let static_dir = config.static_dir.clone();
    let body_limit = config.max_upload_bytes;
    let app_state = Arc::new(AppState { templates, config });

    Ok(Router::new()
        .route("/", get(serve_page))
        .route("/api/upload", post(upload))
        .route("/api/analyze", post(analyze_table))
        .route("/api/export/xlsx", post(export_xlsx))
        .route("/api/export/pptx", post(export_pptx))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state))
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.addr;
    let app = router(config)?;

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let page = state
        .templates
        .render(
            "index",
            &serde_json::json!({
                "title": "Creaming Curve Analyzer",
                "name_column": NAME_COLUMN,
                "cost_column": COST_COLUMN,
                "savings_column": SAVINGS_COLUMN,
                "budget_step": 100,
            }),
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Html(page))
}

async fn upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Ingested>, AppError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.xlsx").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        if data.is_empty() {
            return Err(AppError::BadRequest("No file data received".to_string()));
        }
        return Ok(Json(loader::ingest(&data, &filename)?));
    }

    Err(AppError::BadRequest("Missing 'file' field".to_string()))
}

async fn analyze_table(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Json(request) = payload?;
    let analysis = analyze(&request.table, &request.edits, request.budget)?;
    let png = analysis.chart_png(&state.config.graph)?;

    Ok(Json(AnalyzeResponse {
        status: "ok".to_string(),
        title: analysis.title(),
        table: analysis.curve.table,
        classes: analysis.classes,
        chart_png: STANDARD.encode(png),
    }))
}

async fn export_xlsx(payload: Payload) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let analysis = analyze(&request.table, &request.edits, request.budget)?;
    let xlsx = analysis.spreadsheet()?;
    Ok(attachment(xlsx, XLSX_CONTENT_TYPE, XLSX_FILENAME))
}

async fn export_pptx(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let analysis = analyze(&request.table, &request.edits, request.budget)?;
    let pptx = analysis.presentation(&state.config.graph)?;
    Ok(attachment(pptx, PPTX_CONTENT_TYPE, PPTX_FILENAME))
}

fn attachment(data: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Bytes::from(data),
    )
        .into_response()
}
