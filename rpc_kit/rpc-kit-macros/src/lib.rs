extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemImpl, LitStr};

mod describe;
mod service;

/// Exposes the methods of an inherent `impl` block as RPC endpoints by
/// implementing `rpc_kit::RpcService` for the type.
///
/// A method is exposed when it is shaped
///
/// ```text
/// pub async fn name(&self, ctx: Context, input: In) -> (Option<Out>, Status)
/// ```
///
/// Everything else in the block is left untouched. The route name is the
/// method name in `UpperCamelCase` unless overridden with
/// `#[rpc(name = "...")]`; `#[rpc(skip)]` keeps a matching method private.
///
/// The service name defaults to the type name and can be set with
/// `#[rpc_service(name = "...")]`.
#[proc_macro_attribute]
pub fn rpc_service(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut service_name: Option<LitStr> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            service_name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported rpc_service argument, expected `name = \"...\"`"))
        }
    });
    parse_macro_input!(args with parser);

    let mut item = parse_macro_input!(input as ItemImpl);
    match service::expand(service_name, &mut item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Implements `rpc_kit::Describe`.
///
/// Field names follow `#[serde(rename)]`, `#[serde(rename_all)]`,
/// `#[serde(skip)]` and `#[serde(flatten)]`. `#[validate(..)]` rules are
/// copied verbatim into the field's `validate` entry, and
/// `#[describe(example = "..", format = "..", skip)]` adds or hides
/// documentation.
#[proc_macro_derive(Describe, attributes(describe))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match describe::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
