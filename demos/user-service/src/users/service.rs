use std::sync::Arc;

use rpc_kit::{rpc_service, Context, Interrupted, Status};
use tracing::info;

use super::model::{
    CreateRequest, DeleteByUuidRequest, Deleted, GetByEmailRequest, GetByUuidRequest,
    UpdateByUuidRequest, User,
};
use super::store::{StoreResult, UserStore};

/// The users RPC service. Every store call runs under the request context,
/// so an abandoned request stops waiting on the store.
#[derive(Clone)]
pub struct Users {
    store: Arc<dyn UserStore>,
}

impl Users {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

fn reply<T>(result: Result<StoreResult<T>, Interrupted>, success: Status) -> (Option<T>, Status) {
    match result {
        Ok(Ok(value)) => (Some(value), success),
        Ok(Err(err)) => (None, Status::from_store(&err)),
        Err(interrupted) => (None, Status::from(interrupted)),
    }
}

#[rpc_service]
impl Users {
    pub async fn create(&self, ctx: Context, input: CreateRequest) -> (Option<User>, Status) {
        let result = ctx.run(self.store.insert(&input.email)).await;
        if let Ok(Ok(user)) = &result {
            info!(uuid = %user.uuid, "user created");
        }
        reply(result, Status::created())
    }

    #[rpc(name = "GetByUUID")]
    pub async fn get_by_uuid(&self, ctx: Context, input: GetByUuidRequest) -> (Option<User>, Status) {
        reply(ctx.run(self.store.get_by_uuid(input.uuid)).await, Status::ok())
    }

    pub async fn get_by_email(&self, ctx: Context, input: GetByEmailRequest) -> (Option<User>, Status) {
        reply(ctx.run(self.store.get_by_email(&input.email)).await, Status::ok())
    }

    #[rpc(name = "UpdateByUUID")]
    pub async fn update_by_uuid(
        &self,
        ctx: Context,
        input: UpdateByUuidRequest,
    ) -> (Option<User>, Status) {
        let result = ctx
            .run(self.store.update_by_uuid(input.uuid, &input.user.email))
            .await;
        reply(result, Status::ok())
    }

    #[rpc(name = "DeleteByUUID")]
    pub async fn delete_by_uuid(
        &self,
        ctx: Context,
        input: DeleteByUuidRequest,
    ) -> (Option<Deleted>, Status) {
        let result = ctx.run(self.store.delete_by_uuid(input.uuid)).await;
        let (_, status) = reply(result, Status::no_content());
        if status.is_success() {
            info!(uuid = %input.uuid, "user deleted");
        }
        (None, status)
    }
}
