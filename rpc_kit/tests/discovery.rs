use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use rpc_kit::{rpc_service, Context, Describe, Methods, Rpc, RpcService, ServiceHelp, Status};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate, Describe)]
struct Note {
    text: String,
}

struct Notes;

#[rpc_service]
#[allow(dead_code)]
impl Notes {
    pub async fn add(&self, _ctx: Context, input: Note) -> (Option<Note>, Status) {
        (Some(input), Status::created())
    }

    pub async fn get_latest(&self, _ctx: Context, _input: Note) -> (Option<Note>, Status) {
        (None, Status::not_found())
    }

    #[rpc(name = "Purge")]
    pub async fn clear_all(&self, _ctx: Context, _input: Note) -> (Option<Note>, Status) {
        (None, Status::no_content())
    }

    #[rpc(skip)]
    pub async fn reindex(&self, _ctx: Context, input: Note) -> (Option<Note>, Status) {
        (Some(input), Status::ok())
    }

    async fn not_public(&self, _ctx: Context, input: Note) -> (Option<Note>, Status) {
        (Some(input), Status::ok())
    }

    pub fn not_async(&self, _ctx: Context, input: Note) -> (Option<Note>, Status) {
        (Some(input), Status::ok())
    }

    pub async fn borrowed_input(&self, _ctx: Context, _input: &Note) -> (Option<Note>, Status) {
        (None, Status::ok())
    }

    pub async fn missing_context(&self, input: Note) -> (Option<Note>, Status) {
        (Some(input), Status::ok())
    }

    pub async fn wrong_context(&self, _ctx: String, input: Note) -> (Option<Note>, Status) {
        (Some(input), Status::ok())
    }

    pub async fn no_status(&self, _ctx: Context, input: Note) -> Option<Note> {
        Some(input)
    }

    pub async fn bare_output(&self, _ctx: Context, input: Note) -> (Note, Status) {
        (input, Status::ok())
    }

    pub async fn tuple_output(&self, _ctx: Context, _input: Note) -> (Option<(u8, u8)>, Status) {
        (None, Status::ok())
    }

    pub async fn primitive_input(&self, _ctx: Context, _input: String) -> (Option<Note>, Status) {
        (None, Status::ok())
    }

    pub async fn container_output(&self, _ctx: Context, _input: Note) -> (Option<Vec<Note>>, Status) {
        (None, Status::ok())
    }

    pub fn helper(&self) -> usize {
        3
    }
}

#[test]
fn only_methods_of_the_calling_convention_are_routed() {
    let rpc = Rpc::new(Notes).unwrap();
    assert_eq!(rpc.name(), "Notes");
    assert_eq!(rpc.len(), 3);
    assert_eq!(rpc.method_names().collect::<Vec<_>>(), ["Add", "GetLatest", "Purge"]);
    // the impl block is still usable as plain Rust
    assert_eq!(Notes.helper(), 3);
}

struct Journal;

#[rpc_service(name = "Ledger")]
impl Journal {
    pub async fn append(&self, _ctx: Context, input: Note) -> (Option<Note>, Status) {
        (Some(input), Status::ok())
    }
}

#[test]
fn service_name_can_be_overridden() {
    let rpc = Rpc::new(Journal).unwrap();
    assert_eq!(rpc.name(), "Ledger");
    assert_eq!(rpc.help().methods, ["Append"]);
}

struct Helpers;

#[rpc_service]
#[allow(dead_code)]
impl Helpers {
    fn tidy(&self) {}
}

#[test]
fn a_service_without_rpc_methods_still_builds() {
    let rpc = Rpc::new(Helpers).unwrap();
    assert!(rpc.is_empty());
    assert!(rpc.help().methods.is_empty());
}

struct Counter {
    step: u32,
}

#[derive(Deserialize, Serialize, Validate, Describe)]
struct Count {
    value: u32,
}

impl RpcService for Counter {
    fn service_name() -> &'static str {
        "Counter"
    }

    fn methods(methods: &mut Methods<Self>) {
        methods
            .register("Increment", |svc: Arc<Self>, _ctx, input: Count| async move {
                (Some(Count { value: input.value + svc.step }), Status::ok())
            })
            .register("bad/name", |_svc, _ctx, input: Count| async move {
                (Some(input), Status::ok())
            })
            .register(":value", |_svc, _ctx, input: Count| async move {
                (Some(input), Status::ok())
            })
            .register("*rest", |_svc, _ctx, input: Count| async move {
                (Some(input), Status::ok())
            });
    }
}

#[tokio::test]
async fn hand_registered_methods_are_routed() {
    let rpc = Rpc::new(Counter { step: 5 }).unwrap();
    assert_eq!(rpc.method_names().collect::<Vec<_>>(), ["Increment"]);

    let response = rpc
        .router()
        .oneshot(
            Request::post("/Counter/Increment")
                .body(Body::from(r#"{"value":1}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], br#"{"value":6}"#);
}

#[tokio::test]
async fn help_is_idempotent() {
    let app = Rpc::new(Notes).unwrap().router();
    let mut seen = Vec::new();
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(Request::get("/Notes/help").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let help: ServiceHelp = serde_json::from_slice(&body).unwrap();
        seen.push(help.methods);
    }
    assert!(seen.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(seen[0], ["Add", "GetLatest", "Purge"]);
}
