//! The users domain: model, storage seam and RPC service.

pub mod model;
pub mod service;
pub mod store;

pub use model::User;
pub use service::Users;
pub use store::{MemoryStore, StoreError, UserStore};
