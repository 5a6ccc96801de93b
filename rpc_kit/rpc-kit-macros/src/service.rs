use heck::ToUpperCamelCase;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Error, FnArg, GenericArgument, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr,
    PathArguments, Result, ReturnType, Type, Visibility,
};

struct RpcMethod {
    ident: Ident,
    route: LitStr,
    input: Type,
}

#[derive(Default)]
struct RpcAttr {
    name: Option<LitStr>,
    skip: bool,
    present: bool,
}

pub(crate) fn expand(service_name: Option<LitStr>, item: &mut ItemImpl) -> Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(Error::new_spanned(
            path,
            "#[rpc_service] goes on an inherent impl block, not a trait impl",
        ));
    }

    let service_name = match service_name {
        Some(name) => name,
        None => default_service_name(&item.self_ty)?,
    };
    check_route_name(&service_name)?;

    let mut methods = Vec::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let attr = take_rpc_attr(&mut method.attrs)?;
        if attr.skip {
            continue;
        }
        match rpc_input(method) {
            Some(input) => {
                let route = match attr.name {
                    Some(name) => name,
                    None => LitStr::new(
                        &method.sig.ident.to_string().to_upper_camel_case(),
                        method.sig.ident.span(),
                    ),
                };
                check_route_name(&route)?;
                methods.push(RpcMethod {
                    ident: method.sig.ident.clone(),
                    route,
                    input,
                });
            }
            None if attr.present => {
                return Err(Error::new_spanned(
                    &method.sig,
                    "#[rpc] method must be `pub async fn name(&self, ctx: Context, input: In) -> (Option<Out>, Status)`",
                ));
            }
            None => {}
        }
    }

    let registrations = methods.iter().map(|RpcMethod { ident, route, input }| {
        quote! {
            methods.register(
                #route,
                |service: ::std::sync::Arc<Self>, ctx: ::rpc_kit::Context, input: #input| async move {
                    service.#ident(ctx, input).await
                },
            );
        }
    });

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();

    Ok(quote! {
        #item

        impl #impl_generics ::rpc_kit::RpcService for #self_ty #where_clause {
            fn service_name() -> &'static str {
                #service_name
            }

            #[allow(unused_variables)]
            fn methods(methods: &mut ::rpc_kit::Methods<Self>) {
                #(#registrations)*
            }
        }
    })
}

fn default_service_name(self_ty: &Type) -> Result<LitStr> {
    if let Type::Path(type_path) = self_ty {
        if let Some(segment) = type_path.path.segments.last() {
            return Ok(LitStr::new(&segment.ident.to_string(), segment.ident.span()));
        }
    }
    Err(Error::new_spanned(
        self_ty,
        "cannot derive a service name from this type, use #[rpc_service(name = \"...\")]",
    ))
}

fn check_route_name(name: &LitStr) -> Result<()> {
    let value = name.value();
    if value.is_empty()
        || value == "help"
        || value.contains(['/', '{', '}'])
        || value.starts_with([':', '*'])
    {
        return Err(Error::new_spanned(
            name,
            format!("{value:?} cannot be used as a route segment"),
        ));
    }
    Ok(())
}

/// Removes every `#[rpc(..)]` attribute from the method and merges them.
fn take_rpc_attr(attrs: &mut Vec<Attribute>) -> Result<RpcAttr> {
    let mut parsed = RpcAttr::default();
    let mut error = None;
    attrs.retain(|attr| {
        if !attr.path().is_ident("rpc") {
            return true;
        }
        parsed.present = true;
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                parsed.name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("skip") {
                parsed.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported rpc argument, expected `name = \"...\"` or `skip`"))
            }
        });
        if let Err(err) = result {
            error.get_or_insert(err);
        }
        false
    });
    match error {
        Some(err) => Err(err),
        None => Ok(parsed),
    }
}

/// Returns the input type when `method` follows the calling convention.
fn rpc_input(method: &ImplItemFn) -> Option<Type> {
    let sig = &method.sig;
    if !matches!(method.vis, Visibility::Public(_))
        || sig.asyncness.is_none()
        || !sig.generics.params.is_empty()
        || sig.variadic.is_some()
        || sig.inputs.len() != 3
    {
        return None;
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next()? {
        FnArg::Receiver(receiver)
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => return None,
    }
    match inputs.next()? {
        FnArg::Typed(ctx) if last_segment_is(&ctx.ty, "Context") => {}
        _ => return None,
    }
    let input = match inputs.next()? {
        FnArg::Typed(input) if is_record_like(&input.ty) => (*input.ty).clone(),
        _ => return None,
    };

    let ReturnType::Type(_, output) = &sig.output else {
        return None;
    };
    let Type::Tuple(tuple) = &**output else {
        return None;
    };
    if tuple.elems.len() != 2 {
        return None;
    }
    let reply = option_inner(&tuple.elems[0])?;
    if !is_record_like(reply) || !last_segment_is(&tuple.elems[1], "Status") {
        return None;
    }
    Some(input)
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == name),
        _ => false,
    }
}

const NOT_RECORDS: &[&str] = &[
    "bool", "char", "str", "String", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64", "Option", "Vec", "VecDeque", "HashMap",
    "BTreeMap", "HashSet", "BTreeSet", "Box", "Rc", "Arc", "Cow",
];

/// Named, owned record types. References, tuples, slices, primitives and std
/// containers are not accepted as a method's input or output.
fn is_record_like(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| !NOT_RECORDS.iter().any(|name| segment.ident == name)),
        _ => false,
    }
}

/// Extracts `T` from `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
