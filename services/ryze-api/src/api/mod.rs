//! HTTP 接入层

pub mod auth;
pub mod middleware;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
};
use ryze_config::CorsConfig;
use ryze_errors::AppError;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::warn;

pub use state::{AppState, Repositories};

/// 路由层选项
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    pub cors: CorsConfig,
    pub body_limit_bytes: usize,
    pub production: bool,
}

/// 组装全部路由与中间件
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let api = Router::new()
        .merge(routes::meta::routes())
        .merge(routes::accounts::routes())
        .merge(routes::profiles::routes())
        .merge(routes::projects::routes())
        .merge(routes::requests::routes())
        .merge(routes::comments::routes())
        .merge(routes::conversations::routes())
        .merge(routes::snags::routes())
        .merge(routes::ratings::routes())
        .merge(routes::feedback::routes())
        .merge(routes::runbooks::routes())
        .fallback(not_found);

    let mut router = api
        .layer(from_fn_with_state(state.clone(), auth::authenticate))
        .layer(from_fn(middleware::cache_control))
        .layer(from_fn(middleware::security_headers))
        .with_state(state);

    if options.body_limit_bytes > 0 {
        router = router.layer(RequestBodyLimitLayer::new(options.body_limit_bytes));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&options.cors, options.production))
}

async fn not_found() -> AppError {
    AppError::not_found("Resource not found")
}

/// 未配置来源时：开发环境放行全部，生产环境拒绝跨域
fn cors_layer(config: &CorsConfig, production: bool) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        if production {
            warn!("No CORS origins configured, cross-origin requests are rejected");
            return CorsLayer::new();
        }
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
