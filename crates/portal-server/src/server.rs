use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{get, post},
};
use portal_auth::{
    AuthState, User, UserStorage, admin_login_handler, logout_handler, portal_login_handler,
    route_gate, session_handler,
};
use portal_storage::DynPortalStorage;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    admin, bootstrap,
    cache::ResponseCache,
    config::AppConfig,
    error::ApiError,
    handlers,
    middleware as app_middleware,
    portal,
    services::{ActivityLogger, ClientDataService},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub storage: DynPortalStorage,
    pub users: Arc<dyn UserStorage>,
    pub client_data: ClientDataService,
    pub activity: ActivityLogger,
    pub config: Arc<AppConfig>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AppState {
    /// Wires services over the given stores.
    pub fn new(
        cfg: &AppConfig,
        storage: DynPortalStorage,
        users: Arc<dyn UserStorage>,
    ) -> anyhow::Result<Self> {
        let activity = ActivityLogger::new(storage.clone());

        let login_activity = activity.clone();
        let auth = AuthState::new(cfg.auth.clone(), users.clone())?.with_login_callback(Arc::new(
            move |user: &User| {
                login_activity.record_detached(
                    user.email.clone(),
                    "login",
                    "user",
                    Some(user.id.clone()),
                );
            },
        ));

        let client_data = ClientDataService::new(
            storage.clone(),
            Arc::new(ResponseCache::new()),
            cfg.cache.clone(),
        );

        Ok(Self {
            auth,
            storage,
            users,
            client_data,
            activity,
            config: Arc::new(cfg.clone()),
        })
    }
}

/// Creates the in-memory stores, runs bootstrap and builds the router.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let store = portal_db_memory::create_storage();
    bootstrap::bootstrap_admin_user(store.as_ref(), &cfg.bootstrap).await?;

    let state = AppState::new(cfg, store.clone(), store)?;
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let routes = state.auth.gate.routes().clone();

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Login, logout and the pages the gate redirects to
        .route(
            &routes.admin_login,
            get(handlers::admin_login_page).post(admin_login_handler),
        )
        .route(
            &routes.portal_login,
            get(handlers::portal_login_page).post(portal_login_handler),
        )
        .route(&routes.unauthorized, get(handlers::unauthorized_page))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/session", get(session_handler))
        // Protected areas
        .merge(admin::admin_routes(&routes.admin_prefix))
        .merge(portal::portal_routes(&routes.portal_prefix))
        .fallback(|| async { ApiError::not_found("No route for this path") })
        // Middleware stack (order: gate -> request id -> cors/compression/trace -> body limit)
        .layer(middleware::from_fn_with_state(state.auth.clone(), route_gate))
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .headers()
                        .get(app_middleware::REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub struct PortalServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<PortalServer> {
        let app = build_app(&self.config).await?;

        Ok(PortalServer {
            addr: self.addr,
            app,
        })
    }
}

impl PortalServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
