use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rota_assistant::store::{PgDirectoryStore, PgThreadStore};
use rota_assistant::query::PgQueryBackend;
use rota_assistant::{classifier_from_config, Assistant, AssistantConfig};

mod error;
mod middleware;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rota Assistant API",
        version = "0.1.0",
        description = "Chat query resolution for the Rota shift scheduler. One endpoint, \
                       one turn: a manager's question in, a data-backed answer or a \
                       clarification out."
    ),
    paths(routes::health::health_check, routes::assistant::run_query),
    components(schemas(
        HealthResponse,
        rota_core::error::ApiError,
        rota_core::query::QueryRequest,
        rota_core::query::QueryOverrides,
        rota_core::query::QueryReply,
        rota_core::query::ClarificationRequest,
        rota_core::query::ClarificationKind,
        rota_core::thread::ClarificationOption,
        rota_core::scope::ScopeMode,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rota_api=debug,rota_assistant=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Database connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Assemble the pipeline. A malformed metric template fails right here,
    // before the service takes traffic.
    let config = AssistantConfig::from_env();
    let classifier = classifier_from_config(&config).expect("Failed to build classifier");
    let assistant = Assistant::new(
        config,
        classifier,
        Arc::new(PgDirectoryStore::new(pool.clone())),
        Arc::new(PgThreadStore::new(pool.clone())),
        Arc::new(PgQueryBackend::new(pool.clone())),
    )
    .expect("Failed to assemble assistant pipeline");

    let app_state = state::AppState {
        db: pool,
        assistant: Arc::new(assistant),
    };

    // Router with per-IP rate limiting on the query route
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::assistant::router().layer(middleware::rate_limit::query_layer()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Rota Assistant API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
