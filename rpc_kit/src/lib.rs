//! # RPC Kit - Typed service objects over plain HTTP
//!
//! `rpc_kit` turns a service object whose methods follow one calling
//! convention into a set of JSON-over-HTTP routes on an `axum` router.
//!
//! ## Core Features:
//!
//! - **`#[rpc_service]`**: An attribute macro for an inherent `impl` block.
//!   Every `pub async fn name(&self, ctx: Context, input: In) -> (Option<Out>, Status)`
//!   becomes a `POST /{Service}/{Method}` route. Methods of any other shape are
//!   left alone.
//!
//! - **`#[derive(Describe)]`**: Builds the field tree served by
//!   `GET /{Service}/{Method}/help`, honouring `serde` renames and surfacing
//!   `validator` rules, examples and formats.
//!
//! - **`Rpc`**: The adapter itself. Decodes and validates the body, invokes the
//!   method and maps its [`Status`] to the HTTP response. Put
//!   `#[serde(default)]` on input records (and derive `Default`) so that
//!   absent fields decode to their zero value and validation decides.
//!
//! - **`RpcRouterBuilder`**: Mounts several adapters and can serve an OpenAPI
//!   document for all of them.
//!
//! ```ignore
//! use rpc_kit::{rpc_service, Context, Describe, Rpc, Status};
//!
//! #[derive(serde::Deserialize, serde::Serialize, validator::Validate, Describe)]
//! struct Greeting {
//!     #[validate(length(min = 1))]
//!     name: String,
//! }
//!
//! struct Greeter;
//!
//! #[rpc_service]
//! impl Greeter {
//!     pub async fn hello(&self, _ctx: Context, input: Greeting) -> (Option<Greeting>, Status) {
//!         (Some(input), Status::ok())
//!     }
//! }
//!
//! let app = Rpc::new(Greeter)?.router(); // POST /Greeter/Hello
//! ```

pub mod adapter;
pub mod codes;
pub mod context;
pub mod docs;
pub mod error;
pub mod handler;
pub mod method;
pub mod openapi;
pub mod router_builder;
pub mod service;
pub mod status;

pub use adapter::Rpc;
pub use codes::{Code, StoreErrorKind};
pub use context::{CancelGuard, Context, Interrupted, REQUEST_ID_HEADER};
pub use docs::{describe_record, Describe, FieldHints, Kind, MethodHelp, Property, ServiceHelp};
pub use error::{Error, Result};
pub use handler::rpc_handler;
pub use method::{MethodDescriptor, Reply};
pub use router_builder::RpcRouterBuilder;
pub use service::{Methods, RpcService};
pub use status::{Classify, Status};

#[cfg(feature = "macros")]
pub use rpc_kit_macros::{rpc_service, Describe};

// Re-exported so callers can name the OpenAPI document type.
pub use utoipa;
