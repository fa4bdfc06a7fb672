/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::store::Repositories;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(config, Repositories::postgres(pool));
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::auth::{require_auth, require_permission},
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskboard_shared::{
    auth::{SessionManager, UserAdmin},
    services::{ProjectService, TaskService},
    store::Repositories,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is an `Arc` or wraps one.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Storage backends
    pub repos: Repositories,

    pub projects: ProjectService,

    pub tasks: TaskService,

    pub sessions: SessionManager,

    pub admin: UserAdmin,
}

impl AppState {
    /// Wires services to the given repositories
    pub fn new(config: Config, repos: Repositories) -> Self {
        Self {
            projects: ProjectService::new(repos.projects.clone()),
            tasks: TaskService::new(repos.tasks.clone(), repos.projects.clone()),
            sessions: SessionManager::new(repos.auth.clone(), config.session.ttl()),
            admin: UserAdmin::new(repos.auth.clone()),
            config: Arc::new(config),
            repos,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                      # Health check (public)
/// └── /api/
///     ├── GET  /me                 # Current session or 401
///     ├── /auth/
///     │   ├── POST /sign-up/email
///     │   ├── POST /sign-in/email
///     │   ├── POST /sign-out
///     │   ├── GET  /get-session
///     │   └── /admin/              # Session + user permissions
///     │       ├── POST /set-role
///     │       ├── POST /ban-user
///     │       └── POST /unban-user
///     ├── /projects                # GET public, POST session
///     │   └── /:id                 # GET public, PUT/DELETE session
///     └── /tasks                   # GET public, POST session
///         └── /:id                 # GET public, PUT/DELETE session
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{auth, health, projects, tasks};

    let health_routes = Router::new().route("/health", get(health::health_check));

    let project_reads = Router::new()
        .route("/", get(projects::list_projects))
        .route("/:id", get(projects::get_project));

    let project_writes = Router::new()
        .route("/", post(projects::create_project))
        .route(
            "/:id",
            put(projects::update_project).delete(projects::delete_project),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let task_reads = Router::new()
        .route("/", get(tasks::list_tasks))
        .route("/:id", get(tasks::get_task));

    let task_writes = Router::new()
        .route("/", post(tasks::create_task))
        .route(
            "/:id",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route(
            "/set-role",
            post(auth::set_role).route_layer(from_fn(require_permission("user", ["set-role"]))),
        )
        .route(
            "/ban-user",
            post(auth::ban_user).route_layer(from_fn(require_permission("user", ["ban"]))),
        )
        .route(
            "/unban-user",
            post(auth::unban_user).route_layer(from_fn(require_permission("user", ["ban"]))),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let auth_routes = Router::new()
        .route("/sign-up/email", post(auth::sign_up))
        .route("/sign-in/email", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/get-session", get(auth::get_session))
        .nest("/admin", admin_routes);

    let api_routes = Router::new()
        .route("/me", get(auth::me))
        .nest("/auth", auth_routes)
        .nest("/projects", project_reads.merge(project_writes))
        .nest("/tasks", task_reads.merge(task_writes));

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
