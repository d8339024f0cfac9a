//! TeamDesk Backend
//!
//! REST backend for nonprofit team task management: founders assign weekly
//! tasks through a natural-language ask bar, members submit completion reports
//! and receive generated feedback.

mod api;
mod assistant;
mod auth;
mod config;
mod db;
mod errors;
mod generation;
mod intent;
mod models;
mod tasks;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assistant::Assistant;
use config::{Config, StoreBackend};
use db::{DocumentStore, MemoryStore, Repository, SqliteStore};
use generation::TextGenerator;
use tasks::TaskManager;

/// Founder auth id used by the demo seed when none is configured.
const DEMO_FOUNDER_ID: &str = "demo_founder";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub tasks: TaskManager,
    pub assistant: Arc<Assistant>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn TextGenerator>,
        config: Config,
    ) -> Self {
        let repo = Arc::new(Repository::new(store));
        let tasks = TaskManager::new(repo.clone(), generator.clone(), config.org_name.clone());
        let assistant = Arc::new(Assistant::new(
            repo.clone(),
            generator,
            tasks.clone(),
            config.org_name.clone(),
        ));

        Self {
            repo,
            tasks,
            assistant,
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TeamDesk Backend for {}", config.org_name);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (TEAMDESK_API_PSK). Authentication is disabled!");
    }
    if config.founder_user_id.is_none() {
        tracing::warn!("TEAMDESK_FOUNDER_ID not set; every first login becomes a member");
    }

    // Initialize persistence
    let store: Arc<dyn DocumentStore> = match config.store {
        StoreBackend::Sqlite => {
            tracing::info!("Database path: {:?}", config.db_path);
            let pool = db::init_database(&config.db_path).await?;
            Arc::new(SqliteStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let generator = generation::from_config(&config.generation);

    // Create application state
    let state = AppState::new(store, generator, config.clone());

    if config.seed_demo {
        let founder_id = config
            .founder_user_id
            .as_deref()
            .unwrap_or(DEMO_FOUNDER_ID);
        let seeded =
            db::seed_demo_data(&state.repo, founder_id, &config.org_name, chrono::Utc::now())
                .await?;
        if !seeded {
            tracing::info!("Store already has members; demo seed skipped");
        }
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Session and status
        .route("/session", post(api::create_session))
        .route("/status", get(api::status))
        // Ask bar
        .route("/ask", post(api::ask))
        .route("/interactions", get(api::list_interactions))
        // Members
        .route("/members", get(api::list_members).post(api::create_member))
        .route(
            "/members/{id}",
            patch(api::update_member).delete(api::remove_member),
        )
        // Tasks
        .route("/tasks/mine", get(api::my_tasks))
        .route("/tasks/completed", get(api::my_completed_tasks))
        .route("/tasks/weekly", get(api::weekly_tasks))
        .route(
            "/tasks/{id}",
            patch(api::update_task).delete(api::delete_task),
        )
        .route("/tasks/{id}/submit", post(api::submit_task))
        .route("/tasks/{id}/submissions", get(api::task_submissions))
        // Leave
        .route(
            "/leave",
            get(api::list_leave_requests).post(api::create_leave_request),
        )
        .route("/leave/mine", get(api::my_leave_requests))
        .route("/leave/{id}", patch(api::process_leave_request))
        // Notifications
        .route(
            "/notifications",
            get(api::list_notifications).post(api::send_notification),
        )
        .route(
            "/notifications/{id}/read",
            post(api::mark_notification_read),
        )
        // Performance
        .route("/performance", post(api::create_performance_log))
        .route("/performance/{member_id}", get(api::list_performance_logs))
        // Dashboards
        .route("/dashboard/member", get(api::member_dashboard))
        .route("/dashboard/founder", get(api::founder_dashboard))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
