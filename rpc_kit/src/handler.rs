use std::future::Future;

use axum::body::Bytes;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{post, MethodRouter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::context::{request_id, Context};
use crate::method::dispatch;
use crate::status::Status;

/// Builds a `POST` route for a single typed function, without a service
/// object around it.
///
/// ```ignore
/// let app = Router::new().route("/users/create", rpc_handler(create_user));
/// ```
///
/// The body goes through the same decode, validate, invoke and encode steps
/// as a method mounted through [`Rpc`](crate::Rpc), but the route is not
/// listed by any `/help` endpoint.
pub fn rpc_handler<In, Out, F, Fut>(f: F) -> MethodRouter
where
    In: DeserializeOwned + Validate + Send + 'static,
    Out: Serialize + Send + 'static,
    F: Fn(Context, In) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (Option<Out>, Status)> + Send + 'static,
{
    post(move |headers: HeaderMap, body: Bytes| {
        let f = f.clone();
        async move {
            let (ctx, _guard) = Context::for_request(request_id(&headers));
            dispatch(ctx, body, f).await.into_response()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Add {
        a: i64,
        b: i64,
    }

    #[derive(Serialize)]
    struct Sum {
        sum: i64,
    }

    async fn add(_ctx: Context, input: Add) -> (Option<Sum>, Status) {
        (Some(Sum { sum: input.a + input.b }), Status::created())
    }

    #[tokio::test]
    async fn typed_function_becomes_a_route() {
        let app = Router::new().route("/calc/add", rpc_handler(add));
        let response = app
            .oneshot(
                Request::post("/calc/add")
                    .body(Body::from(r#"{"a":2,"b":3}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"sum":5}"#);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let app = Router::new().route("/calc/add", rpc_handler(add));
        let response = app
            .oneshot(Request::post("/calc/add").body(Body::from("[1,2]")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
