/// Application state and router builder
///
/// # Request pipeline
///
/// Protected routes pass through, in order:
///
/// 1. Authentication (`middleware::auth::authenticate`): verifies the bearer
///    token and inserts the `AuthContext`; also reissues a fresh token on
///    the response.
/// 2. Activity audit (`middleware::audit::audit`): logs the request with
///    masked payload on the `audit` target, and its status on the way out.
///    The public `/v1/auth/*` routes carry this layer too.
/// 3. Permission gate (`require_permissions`, per route group): rejects
///    before the handler when the token's permission set does not satisfy
///    the route policy.
/// 4. The handler.
///
/// `/health` and `/v1/auth/*` are public.

use axum::{
    http::header,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use keygate_shared::auth::{
    middleware::require_permissions,
    permissions::names,
    policy::{self, RequiredPermissions},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, middleware, routes};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Route map
///
/// ```text
/// /
/// ├── /health                        # public
/// └── /v1/
///     ├── /auth/                     # public
///     │   ├── POST /signup
///     │   ├── POST /login
///     │   ├── POST /forgot-password
///     │   ├── POST /reset-password
///     │   └── POST /verify-email
///     ├── /users/                    # [ViewUsers / dynamic / UpdateUsers]
///     ├── /organizations/            # [UpdateOrganization for writes]
///     ├── /roles/                    # [ViewRoles / UpdateRoles]
///     ├── /permissions/              # [ViewRoles]
///     └── /applications/             # [ManageApplications]
/// ```
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public authentication endpoints. These carry credentials in their
    // bodies, so they get the audit layer (which masks them) even though
    // they skip authentication.
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password", post(routes::auth::reset_password))
        .route("/verify-email", post(routes::auth::verify_email))
        .layer(from_fn_with_state(state.clone(), middleware::audit::audit));

    // Users: listing needs ViewUsers; detail is self-service or ViewUsers;
    // deletion needs UpdateUsers.
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route_layer(from_fn(require_permissions(RequiredPermissions::of(&[
            names::VIEW_USERS,
        ]))))
        .merge(
            Router::new()
                .route("/:id", get(routes::users::get_user))
                .route_layer(from_fn(require_permissions(RequiredPermissions::Dynamic(
                    policy::self_service_or_view_users,
                )))),
        )
        .merge(
            Router::new()
                .route("/:id", delete(routes::users::delete_user))
                .route_layer(from_fn(require_permissions(RequiredPermissions::of(&[
                    names::UPDATE_USERS,
                ])))),
        );

    // Organizations: any authenticated user may list their own and create;
    // writes need UpdateOrganization.
    let organization_routes = Router::new()
        .route(
            "/",
            get(routes::organizations::list_organizations)
                .post(routes::organizations::create_organization),
        )
        .merge(
            Router::new()
                .route(
                    "/:id",
                    put(routes::organizations::update_organization)
                        .delete(routes::organizations::delete_organization),
                )
                .route_layer(from_fn(require_permissions(RequiredPermissions::of(&[
                    names::UPDATE_ORGANIZATION,
                ])))),
        );

    let role_routes = Router::new()
        .route("/", get(routes::roles::list_roles))
        .route_layer(from_fn(require_permissions(RequiredPermissions::of(&[
            names::VIEW_ROLES,
        ]))))
        .merge(
            Router::new()
                .route("/", post(routes::roles::create_role))
                .route(
                    "/:id",
                    put(routes::roles::update_role).delete(routes::roles::delete_role),
                )
                .route("/:id/assign", post(routes::roles::assign_role))
                .route_layer(from_fn(require_permissions(RequiredPermissions::of(&[
                    names::UPDATE_ROLES,
                ])))),
        );

    let permission_routes = Router::new()
        .route("/", get(routes::permissions::list_permissions))
        .route_layer(from_fn(require_permissions(RequiredPermissions::of(&[
            names::VIEW_ROLES,
        ]))));

    let application_routes = Router::new()
        .route(
            "/",
            get(routes::applications::list_applications)
                .post(routes::applications::create_application),
        )
        .route("/:id/enable", post(routes::applications::enable_application))
        .route(
            "/:id/disable",
            post(routes::applications::disable_application),
        )
        .route_layer(from_fn(require_permissions(RequiredPermissions::of(&[
            names::MANAGE_APPLICATIONS,
        ]))));

    // Authentication outermost, then audit, then the per-group gates.
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/organizations", organization_routes)
        .nest("/roles", role_routes)
        .nest("/permissions", permission_routes)
        .nest("/applications", application_routes)
        .layer(from_fn_with_state(state.clone(), middleware::audit::audit))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(protected_routes);

    // Clients read the reissued token from the response Authorization
    // header, so it must be exposed cross-origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::AUTHORIZATION]);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
