use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use rpc_kit::{Describe, Kind, Property};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Describe)]
#[serde(rename_all = "camelCase")]
struct Profile {
    user_id: Uuid,
    #[serde(rename = "mail")]
    email_address: String,
    #[describe(format = "date-time", example = "2024-01-01T00:00:00Z")]
    signed_up_at: DateTime<Utc>,
    #[serde(skip)]
    session_token: String,
    #[describe(skip)]
    internal_score: f64,
    nickname: Option<String>,
    tags: Vec<String>,
    labels: HashSet<String>,
    settings: BTreeMap<String, bool>,
    #[serde(flatten)]
    audit: Audit,
    address: Address,
    role: Role,
    handle: Handle,
    raw: serde_json::Value,
}

#[derive(Serialize, Deserialize, Describe)]
struct Audit {
    created_by: String,
    revision: u64,
}

#[derive(Serialize, Deserialize, Describe)]
struct Address {
    city: String,
    zip: Option<u32>,
}

#[derive(Serialize, Deserialize, Describe)]
#[serde(rename_all = "snake_case")]
enum Role {
    Admin,
    PowerUser,
    #[serde(rename = "guest")]
    Visitor,
}

#[derive(Serialize, Deserialize, Describe)]
struct Handle(#[describe(example = "@ferris")] String);

#[derive(Serialize, Deserialize, Describe)]
struct Tree {
    label: String,
    children: Vec<Tree>,
    parent: Option<Box<Tree>>,
}

#[derive(Serialize, Deserialize, Describe)]
struct Page<T> {
    items: Vec<T>,
    total: usize,
}

#[derive(Serialize, Deserialize, Describe)]
struct Session {
    #[serde(rename = "sid")]
    #[describe(example = "s-1")]
    id: String,
    #[serde(skip_serializing)]
    password: String,
    #[serde(skip_deserializing)]
    issued_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in: Option<u32>,
}

fn keys(property: &Property) -> Vec<&str> {
    property.properties.keys().map(String::as_str).collect()
}

#[test]
fn serde_names_decide_field_keys() {
    let profile = Profile::describe();
    assert_eq!(profile.kind, Kind::Object);
    assert_eq!(
        keys(&profile),
        [
            "address", "created_by", "handle", "labels", "mail", "nickname", "raw", "revision",
            "role", "settings", "signedUpAt", "tags", "userId",
        ]
    );
}

#[test]
fn flattened_fields_keep_their_own_names() {
    // rename_all of the outer record does not reach into the flattened one
    let profile = Profile::describe();
    assert!(profile.properties.contains_key("created_by"));
    assert!(!profile.properties.contains_key("createdBy"));
    let audit = Audit::describe();
    assert_eq!(keys(&audit), ["created_by", "revision"]);
}

#[test]
fn special_types_get_formats_and_examples() {
    let profile = Profile::describe();

    let id = &profile.properties["userId"];
    assert_eq!(id.kind, Kind::String);
    assert_eq!(id.format.as_deref(), Some("uuid"));
    assert!(Uuid::parse_str(id.example.as_deref().unwrap()).is_ok());

    // per-field hints win over the type's defaults
    let signed_up = &profile.properties["signedUpAt"];
    assert_eq!(signed_up.format.as_deref(), Some("date-time"));
    assert_eq!(signed_up.example.as_deref(), Some("2024-01-01T00:00:00Z"));
}

#[test]
fn collections_and_options() {
    let profile = Profile::describe();
    assert_eq!(profile.properties["nickname"].kind, Kind::String);

    let tags = &profile.properties["tags"];
    assert_eq!(tags.kind, Kind::Array);
    assert_eq!(tags.items.as_deref().map(|items| items.kind), Some(Kind::String));
    assert_eq!(profile.properties["labels"].kind, Kind::Array);
    assert_eq!(profile.properties["settings"].kind, Kind::Object);
    assert_eq!(profile.properties["raw"].kind, Kind::Object);
}

#[test]
fn nested_records_recurse() {
    let profile = Profile::describe();
    let address = &profile.properties["address"];
    assert_eq!(address.kind, Kind::Object);
    assert_eq!(keys(address), ["city", "zip"]);
    assert_eq!(address.properties["zip"].kind, Kind::Number);
}

#[test]
fn unit_enums_are_strings() {
    let role = Role::describe();
    assert_eq!(role.kind, Kind::String);
    assert_eq!(role.example.as_deref(), Some("admin"));
    assert_eq!(role.validate.as_deref(), Some("oneof=admin power_user guest"));
}

#[test]
fn newtypes_describe_their_inner_type() {
    let handle = Handle::describe();
    assert_eq!(handle.kind, Kind::String);
    assert_eq!(handle.example.as_deref(), Some("@ferris"));
}

#[test]
fn self_referential_records_terminate() {
    let tree = Tree::describe();
    let children = &tree.properties["children"];
    assert_eq!(children.kind, Kind::Array);
    let child = children.items.as_deref().unwrap();
    assert_eq!(child.kind, Kind::Object);
    assert!(child.properties.is_empty());
    assert!(tree.properties["parent"].properties.is_empty());

    // the guard is released, so describing again gives the same tree
    assert_eq!(Tree::describe(), tree);
}

#[test]
fn generic_records_describe_their_parameters() {
    let page = Page::<Address>::describe();
    let items = page.properties["items"].items.as_deref().unwrap();
    assert_eq!(keys(items), ["city", "zip"]);
    assert_eq!(page.properties["total"].kind, Kind::Number);
}

#[test]
fn help_trees_serialize_with_type_keys() {
    let json = serde_json::to_value(Address::describe()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": {"type": "string"},
                "zip": {"type": "number"}
            }
        })
    );
}

#[test]
fn renamed_fields_keep_their_hints() {
    let session = Session::describe();
    assert_eq!(session.properties["sid"].example.as_deref(), Some("s-1"));
}

#[test]
fn one_sided_fields_are_left_out() {
    let session = Session::describe();
    assert_eq!(keys(&session), ["expires_in", "sid"]);
    assert_eq!(session.properties["expires_in"].kind, Kind::Number);
}
