//! OpenAPI export of mounted services.

use utoipa::openapi::path::OperationBuilder;
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{ArrayBuilder, ObjectBuilder, SchemaFormat, Type};
use utoipa::openapi::{
    self, ContentBuilder, InfoBuilder, OpenApiBuilder, Paths, RefOr, Required, ResponseBuilder,
    ResponsesBuilder, Schema,
};

use crate::adapter::Rpc;
use crate::docs::{Kind, Property};

/// Builds an OpenAPI document with one `POST /{service}/{method}` operation
/// per mounted method.
pub fn document(title: &str, version: &str, services: &[Rpc]) -> openapi::OpenApi {
    let mut openapi = OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(title)
                .version(version)
                .description(Some(
                    "Every service also serves GET /{service}/help and GET /{service}/{method}/help.",
                ))
                .build(),
        )
        .paths(Paths::new())
        .build();

    for rpc in services {
        for method in rpc.methods() {
            let help = method.help();

            let request_body = RequestBodyBuilder::new()
                .required(Some(Required::True))
                .content(
                    "application/json",
                    ContentBuilder::new()
                        .schema(Some(RefOr::T(schema(&help.request))))
                        .build(),
                )
                .build();

            let responses = ResponsesBuilder::new()
                .response(
                    "2XX",
                    ResponseBuilder::new()
                        .description("The method succeeded; the exact code is chosen by the method")
                        .content(
                            "application/json",
                            ContentBuilder::new()
                                .schema(Some(RefOr::T(schema(&help.response))))
                                .build(),
                        )
                        .build(),
                )
                .response(
                    "400",
                    ResponseBuilder::new()
                        .description("The body could not be decoded or failed validation")
                        .build(),
                )
                .response(
                    "default",
                    ResponseBuilder::new()
                        .description("The method reported a failure; the body is the status message")
                        .build(),
                )
                .build();

            let operation = OperationBuilder::new()
                .operation_id(Some(format!("{}.{}", rpc.name(), method.name())))
                .summary(Some(format!("{} -> {}", method.input_type(), method.output_type())))
                .tag(rpc.name())
                .request_body(Some(request_body))
                .responses(responses)
                .build();

            openapi
                .paths
                .paths
                .entry(format!("/{}/{}", rpc.name(), method.name()))
                .or_default()
                .post = Some(operation);
        }
    }

    openapi
}

fn schema(property: &Property) -> Schema {
    if property.kind == Kind::Array {
        let items = property.items.as_deref().map(schema).unwrap_or_default();
        return Schema::Array(ArrayBuilder::new().items(RefOr::T(items)).build());
    }

    let schema_type = match property.kind {
        Kind::String => Type::String,
        Kind::Number => Type::Number,
        Kind::Boolean => Type::Boolean,
        Kind::Object | Kind::Array => Type::Object,
    };
    let mut object = ObjectBuilder::new().schema_type(schema_type);
    if let Some(format) = &property.format {
        object = object.format(Some(SchemaFormat::Custom(format.clone())));
    }
    if let Some(example) = &property.example {
        object = object.examples([example.clone()]);
    }
    if let Some(rule) = &property.validate {
        object = object.description(Some(format!("validate: {rule}")));
    }
    for (name, child) in &property.properties {
        object = object.property(name, RefOr::T(schema(child)));
    }
    Schema::Object(object.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::docs::{describe_record, Describe};
    use crate::service::{Methods, RpcService};
    use crate::status::Status;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use validator::Validate;

    #[derive(Deserialize, Serialize, Validate)]
    struct Tags {
        tags: Vec<String>,
    }

    impl Describe for Tags {
        fn describe() -> Property {
            describe_record::<Self>(|| BTreeMap::from([("tags".to_string(), Vec::<String>::describe())]))
        }
    }

    struct Tagger;

    impl RpcService for Tagger {
        fn service_name() -> &'static str {
            "Tagger"
        }

        fn methods(methods: &mut Methods<Self>) {
            methods.register("Normalize", |_svc, _ctx: Context, input: Tags| async move {
                (Some(input), Status::ok())
            });
        }
    }

    #[test]
    fn one_post_operation_per_method() {
        let rpc = Rpc::new(Tagger).unwrap();
        let doc = document("tags", "0.1.0", &[rpc]);
        let json = serde_json::to_value(&doc).unwrap();

        let operation = &json["paths"]["/Tagger/Normalize"]["post"];
        assert_eq!(operation["operationId"], "Tagger.Normalize");
        let request = &operation["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(request["properties"]["tags"]["type"], "array");
        assert_eq!(request["properties"]["tags"]["items"]["type"], "string");
        assert!(operation["responses"]["400"].is_object());
    }
}
