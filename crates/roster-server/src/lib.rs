//! HTTP server assembly for Roster.
//!
//! Wraps [`roster_api::api_router`] under `/api` with a health probe, a JSON
//! 404 fallback, CORS and request tracing.

pub mod error;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Json, Router,
  http::{HeaderValue, Method, StatusCode, header},
  response::IntoResponse,
  routing::get,
};
use roster_core::store::UserStore;
use serde::Deserialize;
use serde_json::json;
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Deployment mode. Development responses carry internal error detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  #[default]
  Development,
  Production,
}

impl Environment {
  pub fn is_development(self) -> bool { self == Self::Development }
}

/// Runtime server configuration, deserialised from `config.toml` layered
/// under `ROSTER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  /// SQLite file; `:memory:` keeps everything in process.
  pub store_path:      PathBuf,
  pub allowed_origins: Vec<String>,
  pub environment:     Environment,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "0.0.0.0".to_owned(),
      port:            5000,
      store_path:      PathBuf::from("roster.db"),
      allowed_origins: vec!["http://localhost:3000".to_owned()],
      environment:     Environment::Development,
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then apply `ROSTER_*` overrides.
  ///
  /// `ROSTER_ALLOWED_ORIGINS` is a comma-separated list.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::load_with_env(path, env_source())
  }

  fn load_with_env(
    path: &Path,
    env: config::Environment,
  ) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  /// Whether the store lives only in memory.
  pub fn in_memory(&self) -> bool { self.store_path == Path::new(":memory:") }
}

fn env_source() -> config::Environment {
  config::Environment::with_prefix("ROSTER")
    .try_parsing(true)
    .list_separator(",")
    .with_list_parse_key("allowed_origins")
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router for `store`.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Result<Router, Error>
where
  S: UserStore + 'static,
{
  let api = roster_api::api_router(store, config.environment.is_development())
    .route("/health", get(health));

  Ok(
    Router::new()
      .nest("/api", api)
      .fallback(not_found)
      .layer(cors_layer(&config.allowed_origins)?)
      .layer(TraceLayer::new_for_http()),
  )
}

/// Credentialed CORS for an explicit list of browser origins.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, Error> {
  let origins = origins
    .iter()
    .map(|origin| match origin.trim() {
      "*" => Err(Error::WildcardOrigin),
      o => HeaderValue::from_str(o).map_err(|_| Error::InvalidOrigin(o.to_owned())),
    })
    .collect::<Result<Vec<_>, _>>()?;

  Ok(
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(origins))
      .allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
      ])
      .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
      .allow_credentials(true),
  )
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
  Json(json!({ "message": "Server is running" }))
}

async fn not_found() -> impl IntoResponse {
  (
    StatusCode::NOT_FOUND,
    Json(json!({ "success": false, "message": "Route not found" })),
  )
}

// ─── Tests ────────────────────────────────────────────────────────────────────
