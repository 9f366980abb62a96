use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use printgate_auth::AuthState;
use printgate_queue::PrintQueueEngine;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{bootstrap, config::AppConfig, handlers};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub queue: Arc<PrintQueueEngine>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub struct PrintgateServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the shared state from `cfg` and returns the routed application.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = bootstrap::init_state(cfg).await?;
    Ok(router(state, cfg.server.body_limit_bytes))
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    let api = Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route(
            "/printers/{printer}/jobs",
            get(handlers::list_queue).post(handlers::submit),
        )
        .route(
            "/printers/{printer}/jobs/{job}/promote",
            post(handlers::promote),
        )
        .route("/printers/{printer}/status", get(handlers::status))
        .route("/service/start", post(handlers::start))
        .route("/service/stop", post(handlers::stop))
        .route("/service/restart", post(handlers::restart))
        .route(
            "/config/{key}",
            get(handlers::read_config).put(handlers::set_config),
        );

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .nest("/api", api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("http.status_code", tracing::field::display(res.status().as_u16()));
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
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

    pub async fn build(self) -> anyhow::Result<PrintgateServer> {
        let app = build_app(&self.config).await?;
        Ok(PrintgateServer {
            addr: self.addr,
            app,
        })
    }
}

impl PrintgateServer {
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use printgate_auth::config::UserConfig;
    use tower::ServiceExt;

    async fn app() -> Router {
        let mut cfg = AppConfig::default();
        cfg.auth.users.push(UserConfig {
            username: "bob".into(),
            password: "password123".into(),
            role: "Technician".into(),
        });
        build_app(&cfg).await.unwrap()
    }

    async fn login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::post("/api/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"bob","password":"password123"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_healthz_needs_no_session() {
        let response = app()
            .await
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let response = app()
            .await
            .oneshot(
                Request::get("/api/printers/p1/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_technician_status_and_forbidden_submit() {
        let app = app().await;
        let token = login(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/printers/p1/status")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::post("/api/printers/p1/jobs")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"filename":"a.pdf"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
