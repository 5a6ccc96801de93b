use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};
use validator::Validate;

use crate::codes::Code;
use crate::context::Context;
use crate::docs::{Describe, MethodHelp, Property};
use crate::status::Status;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased invocation handle: raw request body in, [`Reply`] out.
///
/// Decoding, validation and encoding happen behind the handle, so the
/// adapter's routing table stays homogeneous.
pub type MethodHandle = Arc<dyn Fn(Context, Bytes) -> BoxFuture<'static, Reply> + Send + Sync>;

/// Transport-neutral outcome of one invocation.
///
/// `body` holds the JSON-encoded output and is only present for success
/// codes other than `NoContent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    pub body: Option<Bytes>,
}

impl Reply {
    pub fn error(status: Status) -> Self {
        Self { status, body: None }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let code = StatusCode::from(self.status.code);
        if !self.status.is_success() {
            let message = if self.status.message.is_empty() {
                self.status.code.reason().to_string()
            } else {
                self.status.message
            };
            return (code, message).into_response();
        }
        match self.body {
            Some(body) => (
                code,
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                body,
            )
                .into_response(),
            None => code.into_response(),
        }
    }
}

/// Decodes, validates, invokes and encodes one call.
pub(crate) async fn dispatch<In, Out, F, Fut>(ctx: Context, body: Bytes, call: F) -> Reply
where
    In: DeserializeOwned + Validate,
    Out: Serialize,
    F: FnOnce(Context, In) -> Fut,
    Fut: Future<Output = (Option<Out>, Status)>,
{
    let input: In = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(err) => {
            warn!(error = %err, "rejecting undecodable request body");
            return Reply::error(Status::invalid(format!(
                "failed to decode body as json: {err}"
            )));
        }
    };
    if let Err(err) = input.validate() {
        warn!(error = %err, "rejecting invalid request");
        return Reply::error(Status::invalid(format!("validation failed: {err}")));
    }

    let (output, status) = call(ctx, input).await;

    if status.code.is_informational() {
        error!(code = %status.code, "method returned an informational code");
        return Reply::error(Status::internal(format!(
            "method returned informational status {}",
            status.code
        )));
    }
    if !status.is_success() {
        debug!(code = %status.code, message = %status.message, "method reported failure");
        return Reply::error(status);
    }
    if status.code == Code::NoContent {
        return Reply { status, body: None };
    }
    match serde_json::to_vec(&output) {
        Ok(encoded) => Reply {
            status,
            body: Some(Bytes::from(encoded)),
        },
        Err(err) => {
            // The method already completed; the caller only learns it failed.
            error!(error = %err, code = %status.code, "failed to encode output of a completed call");
            Reply::error(Status::internal(format!(
                "failed to encode response: {err}"
            )))
        }
    }
}

/// One RPC-eligible method of a service object.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    input: &'static str,
    output: &'static str,
    request_doc: fn() -> Property,
    response_doc: fn() -> Property,
    handle: MethodHandle,
}

impl MethodDescriptor {
    pub(crate) fn new<S, In, Out, F, Fut>(name: String, service: Arc<S>, f: F) -> Self
    where
        S: Send + Sync + 'static,
        In: DeserializeOwned + Validate + Describe + Send + 'static,
        Out: Serialize + Describe + Send + 'static,
        F: Fn(Arc<S>, Context, In) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = (Option<Out>, Status)> + Send + 'static,
    {
        let f = Arc::new(f);
        let handle: MethodHandle = Arc::new(move |ctx: Context, body: Bytes| -> BoxFuture<'static, Reply> {
            let service = Arc::clone(&service);
            let f = Arc::clone(&f);
            Box::pin(async move {
                dispatch::<In, Out, _, _>(ctx, body, move |ctx, input| f(service, ctx, input)).await
            })
        });
        Self {
            name,
            input: std::any::type_name::<In>(),
            output: std::any::type_name::<Out>(),
            request_doc: <In as Describe>::describe,
            response_doc: <Out as Describe>::describe,
            handle,
        }
    }

    /// Route segment of this method.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_type(&self) -> &'static str {
        self.input
    }

    pub fn output_type(&self) -> &'static str {
        self.output
    }

    pub fn request_doc(&self) -> Property {
        (self.request_doc)()
    }

    pub fn response_doc(&self) -> Property {
        (self.response_doc)()
    }

    pub fn help(&self) -> MethodHelp {
        MethodHelp {
            request: self.request_doc(),
            response: self.response_doc(),
        }
    }

    pub fn invoke(&self, ctx: Context, body: Bytes) -> BoxFuture<'static, Reply> {
        (self.handle)(ctx, body)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}
