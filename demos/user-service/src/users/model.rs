use rpc_kit::Describe;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, Describe)]
pub struct User {
    pub uuid: Uuid,
    #[validate(email)]
    #[describe(example = "foo@example.com")]
    pub email: String,
}

// Request records default every field, so a body that leaves one out decodes
// to its zero value and validation decides whether that is acceptable.
#[derive(Debug, Default, Deserialize, Validate, Describe)]
#[serde(default)]
pub struct CreateRequest {
    #[validate(email)]
    #[describe(example = "foo@example.com")]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Validate, Describe)]
#[serde(default)]
pub struct GetByUuidRequest {
    pub uuid: Uuid,
}

#[derive(Debug, Default, Deserialize, Validate, Describe)]
#[serde(default)]
pub struct GetByEmailRequest {
    pub email: String,
}

/// Fields of a user that can be changed after creation.
#[derive(Debug, Default, Deserialize, Validate, Describe)]
#[serde(default)]
pub struct UserChanges {
    #[validate(email)]
    #[describe(example = "foo@example.com")]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Validate, Describe)]
#[serde(default)]
pub struct UpdateByUuidRequest {
    pub uuid: Uuid,
    #[validate(nested)]
    pub user: UserChanges,
}

#[derive(Debug, Default, Deserialize, Validate, Describe)]
#[serde(default)]
pub struct DeleteByUuidRequest {
    pub uuid: Uuid,
}

/// Deletion answers with `204 No Content`; this type only documents that
/// there is no body.
#[derive(Debug, Serialize, Describe)]
pub struct Deleted {}
