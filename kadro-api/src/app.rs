/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with
/// all routes and middleware. Authenticated routes sit behind the
/// capability gate: a middleware layer that validates the bearer session
/// token, loads the subject user (role and company included), and injects
/// it into request extensions, so handlers never see an unauthenticated
/// request.
///
/// # Route map
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register           # Company + manager registration
///     │   ├── GET  /verify             # Email verification (token in query)
///     │   ├── POST /login
///     │   ├── POST /forgot-password
///     │   └── POST /reset-password
///     ├── /profile/                    # Authenticated
///     │   ├── GET /                    # Basic profile
///     │   ├── GET /personnel           # Profile + assigned assets
///     │   └── GET /manager             # Profile + employee roster
///     ├── /uploads/                    # Authenticated, manager only
///     │   ├── POST /company-logo
///     │   └── POST /avatar
///     └── /assets/                     # Authenticated
///         ├── POST /                   # Assign (manager)
///         ├── GET  /mine               # Caller's assignments
///         ├── GET  /company            # All assignments (manager)
///         ├── PUT  /:id/approve        # Assigned employee
///         └── PUT  /:id/reject         # Assigned employee
/// ```

use crate::{config::Config, error::ApiError, mailer::Mailer, media::MediaStore};
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use kadro_shared::{auth::jwt, models::user::User};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; Arc keeps it cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Mail sender collaborator
    pub mailer: Arc<dyn Mailer>,

    /// Media store collaborator
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        db: PgPool,
        config: Config,
        mailer: Arc<dyn Mailer>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
            media,
        }
    }

    /// Gets the token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// The authenticated subject, injected into request extensions
///
/// The capability gate resolves the session token to a full user row, so
/// handlers get role and company without another lookup.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public identity endpoints
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/verify", get(routes::auth::verify_account))
        .route("/login", post(routes::auth::login))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password", post(routes::auth::reset_password));

    // Everything below requires a valid session token
    let profile_routes = Router::new()
        .route("/", get(routes::profile::get_profile))
        .route("/personnel", get(routes::profile::get_personnel_profile))
        .route("/manager", get(routes::profile::get_manager_profile));

    let upload_routes = Router::new()
        .route("/company-logo", post(routes::uploads::add_logo_to_company))
        .route("/avatar", post(routes::uploads::add_avatar_to_user));

    let asset_routes = Router::new()
        .route("/", post(routes::assets::assign_new_asset))
        .route("/mine", get(routes::assets::get_personnel_assets))
        .route("/company", get(routes::assets::get_company_assets))
        .route("/:id/approve", put(routes::assets::approve_asset))
        .route("/:id/reject", put(routes::assets::reject_asset));

    let gated_routes = Router::new()
        .nest("/profile", profile_routes)
        .nest("/uploads", upload_routes)
        .nest("/assets", asset_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(gated_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Capability gate: session token middleware
///
/// Validates the bearer token as a session token, loads the subject user,
/// and injects [`CurrentUser`] into request extensions. Requests with a
/// missing, invalid, or dangling token never reach a handler.
async fn session_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::InvalidToken)?;

    let claims = jwt::validate_session_token(token, state.jwt_secret())
        .map_err(|_| ApiError::InvalidToken)?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
