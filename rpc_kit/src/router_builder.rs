use std::collections::HashSet;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::adapter::Rpc;
use crate::error::{Error, Result};
use crate::openapi;

#[derive(Debug, Clone)]
struct OpenApiRoute {
    title: String,
    version: String,
    path: String,
}

/// Mounts several [`Rpc`] adapters on one router, optionally with an
/// OpenAPI document describing all of them.
#[derive(Default, Clone)]
pub struct RpcRouterBuilder {
    services: Vec<Rpc>,
    openapi: Option<OpenApiRoute>,
}

impl RpcRouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(mut self, rpc: Rpc) -> Self {
        self.services.push(rpc);
        self
    }

    /// Serves the OpenAPI JSON of every mounted service at `path`.
    pub fn openapi(
        mut self,
        title: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.openapi = Some(OpenApiRoute {
            title: title.into(),
            version: version.into(),
            path: path.into(),
        });
        self
    }

    pub fn build(self) -> Result<Router> {
        let mut names = HashSet::new();
        for rpc in &self.services {
            if !names.insert(rpc.name()) {
                return Err(Error::DuplicateService(rpc.name().to_string()));
            }
        }

        let mut router = Router::new();
        for rpc in &self.services {
            router = rpc.mount(router);
            info!(service = rpc.name(), methods = rpc.len(), "mounted rpc service");
        }

        if let Some(route) = &self.openapi {
            let first_segment = route.path.trim_start_matches('/').split('/').next().unwrap_or("");
            if !route.path.starts_with('/') || names.contains(first_segment) {
                return Err(Error::InvalidName(route.path.clone()));
            }
            let document = openapi::document(&route.title, &route.version, &self.services);
            let body = Bytes::from(serde_json::to_vec(&document)?);
            router = router.route(
                &route.path,
                get(move || {
                    let body = body.clone();
                    async move {
                        (
                            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                            body,
                        )
                    }
                }),
            );
        }
        Ok(router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Methods, RpcService};

    struct Empty;

    impl RpcService for Empty {
        fn service_name() -> &'static str {
            "Empty"
        }

        fn methods(_methods: &mut Methods<Self>) {}
    }

    #[test]
    fn duplicate_services_are_rejected() {
        let rpc = Rpc::new(Empty).unwrap();
        let result = RpcRouterBuilder::new()
            .service(rpc.clone())
            .service(rpc)
            .build();
        assert!(matches!(result, Err(Error::DuplicateService(name)) if name == "Empty"));
    }

    #[test]
    fn openapi_path_must_not_shadow_a_service() {
        let result = RpcRouterBuilder::new()
            .service(Rpc::new(Empty).unwrap())
            .openapi("t", "1", "/Empty/openapi.json")
            .build();
        assert!(matches!(result, Err(Error::InvalidName(_))));

        let result = RpcRouterBuilder::new()
            .service(Rpc::new(Empty).unwrap())
            .openapi("t", "1", "/api-docs/openapi.json")
            .build();
        assert!(result.is_ok());
    }
}
