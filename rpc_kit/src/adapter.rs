use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, info_span, warn, Instrument};

use crate::codes::Code;
use crate::context::{request_id, Context};
use crate::docs::{MethodHelp, ServiceHelp};
use crate::error::{check_route_name, Result};
use crate::method::{MethodDescriptor, Reply};
use crate::service::{Methods, RpcService};
use crate::status::Status;

/// Exposes one service object over HTTP.
///
/// Built once at startup and read-only afterwards, so clones can be shared
/// by any number of concurrent requests.
///
/// | Method | Path | |
/// |---|---|---|
/// | `GET` | `/{service}/help` | method names |
/// | `GET` | `/{service}/{method}/help` | request/response field trees |
/// | `POST` | `/{service}/{method}` | invoke |
#[derive(Clone, Debug)]
pub struct Rpc {
    inner: Arc<Inner>,
}

#[derive(Clone, Debug)]
struct Inner {
    name: String,
    methods: BTreeMap<String, MethodDescriptor>,
}

impl Rpc {
    pub fn new<S: RpcService>(service: S) -> Result<Self> {
        Self::from_arc(Arc::new(service))
    }

    /// Like [`Rpc::new`] for a service that is also used outside the adapter.
    pub fn from_arc<S: RpcService>(service: Arc<S>) -> Result<Self> {
        let name = S::service_name();
        check_route_name(name)?;
        let mut methods = Methods::new(service);
        S::methods(&mut methods);
        Ok(Self::assemble(name.to_string(), methods.into_descriptors()))
    }

    /// Serves the same methods under a different service name.
    pub fn with_name(self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_route_name(&name)?;
        let inner = Arc::try_unwrap(self.inner).unwrap_or_else(|shared| (*shared).clone());
        Ok(Self::assemble(name, inner.methods))
    }

    fn assemble(name: String, methods: BTreeMap<String, MethodDescriptor>) -> Self {
        if methods.is_empty() {
            warn!(service = %name, "no method matches the rpc calling convention; only /help is served");
        } else {
            debug!(service = %name, methods = ?methods.keys().collect::<Vec<_>>(), "rpc service ready");
        }
        Self {
            inner: Arc::new(Inner { name, methods }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn len(&self) -> usize {
        self.inner.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.methods.is_empty()
    }

    /// Method names in a stable (sorted) order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.inner.methods.keys().map(String::as_str)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.inner.methods.get(name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.inner.methods.values()
    }

    pub fn help(&self) -> ServiceHelp {
        ServiceHelp {
            methods: self.method_names().map(str::to_string).collect(),
        }
    }

    pub fn method_help(&self, name: &str) -> Option<MethodHelp> {
        self.method(name).map(MethodDescriptor::help)
    }

    /// Invokes `method` with a raw JSON body, without going through HTTP.
    pub async fn call(&self, ctx: Context, method: &str, body: Bytes) -> Reply {
        match self.method(method) {
            Some(descriptor) => descriptor.invoke(ctx, body).await,
            None => Reply::error(unknown_method(method)),
        }
    }

    /// Builds the routes of this service, rooted at `/{name}`.
    pub fn router(&self) -> Router {
        let base = format!("/{}", self.name());

        let rpc = self.clone();
        let mut router = Router::new()
            .route(
                &format!("{base}/help"),
                get(move || {
                    let rpc = rpc.clone();
                    async move { Json(rpc.help()) }
                }),
            );

        let rpc = self.clone();
        router = router.route(
            &format!("{base}/{{method}}/help"),
            get(move |Path(method): Path<String>| {
                let rpc = rpc.clone();
                async move {
                    match rpc.method_help(&method) {
                        Some(help) => Json(help).into_response(),
                        None => (StatusCode::NOT_FOUND, unknown_method(&method).message).into_response(),
                    }
                }
            }),
        );

        for name in self.method_names() {
            let rpc = self.clone();
            let method = name.to_string();
            router = router.route(
                &format!("{base}/{name}"),
                post(move |headers: HeaderMap, body: Bytes| {
                    let rpc = rpc.clone();
                    let method = method.clone();
                    async move { rpc.serve(&method, &headers, body).await }
                }),
            );
        }
        router
    }

    /// Adds this service's routes to `app`.
    pub fn mount(&self, app: Router) -> Router {
        app.merge(self.router())
    }

    async fn serve(&self, method: &str, headers: &HeaderMap, body: Bytes) -> Response {
        // dropping the guard (request finished or abandoned) cancels `ctx`
        let (ctx, _guard) = Context::for_request(request_id(headers));
        let span = info_span!(
            "rpc",
            service = %self.name(),
            method = %method,
            request_id = %ctx.request_id(),
        );
        async move {
            let reply = self.call(ctx, method, body).await;
            debug!(code = %reply.status.code, "rpc call finished");
            reply.into_response()
        }
        .instrument(span)
        .await
    }
}

fn unknown_method(method: &str) -> Status {
    Status::new(Code::NotFound, format!("unknown method {method:?}"))
}
