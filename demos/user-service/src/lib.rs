use axum::http::HeaderName;
use axum::Router;
use rpc_kit::{Rpc, RpcRouterBuilder, REQUEST_ID_HEADER};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod users;

use config::{Config, Environment};
use users::Users;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Builds the complete HTTP application: the `Users` RPC routes, the OpenAPI
/// document, and the request-id, trace, timeout and CORS middleware.
pub fn app(config: &Config, users: Users) -> rpc_kit::Result<Router> {
    let router = RpcRouterBuilder::new()
        .service(Rpc::new(users)?)
        .openapi("user-service", env!("CARGO_PKG_VERSION"), OPENAPI_PATH)
        .build()?;

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    Ok(router
        .layer(cors_layer(config.environment))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid)))
}

fn cors_layer(environment: Environment) -> CorsLayer {
    match environment {
        Environment::Dev => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        Environment::Prod => CorsLayer::new(),
    }
}
