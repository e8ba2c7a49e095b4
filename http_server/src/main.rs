//! Main entry point for the demo upload/JSON server binary

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use web_toolkit::{
    create_dir_if_not_exist, download_static_file, process_single_upload, process_upload,
    read_json, slugify, write_json, JsonResponse, ToolkitError, UploadConfig,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerConfig {
    host: String,
    port: u16,
    upload_dir: PathBuf,
    max_upload_size: u64,
    max_json_size: usize,
    allowed_mime_types: Vec<String>,
    allow_unknown_json_fields: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            upload_dir: PathBuf::from("./uploads"),
            max_upload_size: 50 * 1024 * 1024,
            max_json_size: 1024 * 1024,
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "application/pdf".to_string(),
                "text/plain".to_string(),
            ],
            allow_unknown_json_fields: false,
        }
    }
}

impl ServerConfig {
    fn load() -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&ServerConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(Environment::with_prefix("APP").try_parsing(true));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("server port cannot be 0".to_string()));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "upload directory cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn upload_config(&self) -> UploadConfig {
        UploadConfig {
            max_upload_size: self.max_upload_size,
            allowed_mime_types: self
                .allowed_mime_types
                .iter()
                .cloned()
                .collect::<HashSet<_>>(),
            max_json_size: self.max_json_size,
            allow_unknown_json_fields: self.allow_unknown_json_fields,
        }
    }
}

#[derive(Clone)]
struct AppState {
    config: UploadConfig,
    upload_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServerConfig::load()
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?;

    info!("configuration loaded");
    info!("upload directory: {}", config.upload_dir.display());

    create_dir_if_not_exist(&config.upload_dir).await?;

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address: {}", e))?;

    let state = AppState {
        config: config.upload_config(),
        upload_dir: config.upload_dir.clone(),
    };

    let app = create_router(state);

    info!("starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/upload", post(handle_upload))
        .route("/api/upload/one", post(handle_upload_one))
        .route("/api/slugify", post(handle_slugify))
        .route("/api/static/:name", get(handle_download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_health() -> impl IntoResponse {
    Json(JsonResponse::success("ok"))
}

#[derive(Debug, Deserialize)]
struct UploadQuery {
    #[serde(default)]
    rename: bool,
}

async fn handle_upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    request: Request,
) -> Result<Response, ToolkitError> {
    let files = process_upload(request, &state.upload_dir, query.rename, &state.config).await?;
    let count = files.len();

    write_json(
        StatusCode::CREATED,
        &JsonResponse::with_data(
            format!("{} file(s) uploaded", count),
            serde_json::to_value(files)?,
        ),
        None,
    )
}

async fn handle_upload_one(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    request: Request,
) -> Result<Response, ToolkitError> {
    let file =
        process_single_upload(request, &state.upload_dir, query.rename, &state.config).await?;

    write_json(
        StatusCode::CREATED,
        &JsonResponse::with_data("file uploaded", serde_json::to_value(file)?),
        None,
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SlugRequest {
    text: String,
}

async fn handle_slugify(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ToolkitError> {
    let payload: SlugRequest = read_json(request, &state.config).await?;
    let slug = slugify(&payload.text)?;

    write_json(
        StatusCode::OK,
        &JsonResponse::with_data("slug generated", serde_json::json!({ "slug": slug })),
        None,
    )
}

async fn handle_download(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ToolkitError> {
    download_static_file(&state.upload_dir, &name, &name).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };

        format!(
            "{}={},tower_http=debug,axum=debug",
            env!("CARGO_CRATE_NAME").replace('-', "_"),
            default_level
        )
        .into()
    });

    let fmt_layer = fmt::layer().with_target(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("received SIGTERM, starting graceful shutdown");
        },
    }
}
