use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use proc_macro2::{Delimiter, TokenStream as TokenStream2, TokenTree};
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    parse_quote, Attribute, Data, DeriveInput, Error, Fields, GenericParam, LitStr, Meta, Result,
    Token,
};

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
    flatten: bool,
    example: Option<LitStr>,
    format: Option<LitStr>,
    validate: Vec<String>,
}

pub(crate) fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let rename_all = container_rename_all(&input.attrs)?;

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let mut inserts = Vec::new();
                for field in &fields.named {
                    let attrs = field_attrs(&field.attrs)?;
                    if attrs.skip {
                        continue;
                    }
                    let ty = &field.ty;
                    if attrs.flatten {
                        inserts.push(quote! {
                            properties.extend(<#ty as ::rpc_kit::Describe>::describe().properties);
                        });
                        continue;
                    }
                    let Some(ident) = &field.ident else {
                        continue;
                    };
                    let hints = hints(&attrs);
                    let name = match attrs.rename {
                        Some(name) => name,
                        None => apply_rename_all(&ident.unraw().to_string(), rename_all.as_deref()),
                    };
                    inserts.push(quote! {
                        properties.insert(
                            ::std::string::String::from(#name),
                            <#ty as ::rpc_kit::Describe>::describe().with_hints(#hints),
                        );
                    });
                }
                quote! {
                    ::rpc_kit::describe_record::<Self>(|| {
                        let mut properties = ::std::collections::BTreeMap::new();
                        #(#inserts)*
                        properties
                    })
                }
            }
            // newtypes document as the type they wrap
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                let field = &fields.unnamed[0];
                let ty = &field.ty;
                let attrs = field_attrs(&field.attrs)?;
                let hints = hints(&attrs);
                quote! { <#ty as ::rpc_kit::Describe>::describe().with_hints(#hints) }
            }
            Fields::Unnamed(_) => quote! { ::rpc_kit::Property::new(::rpc_kit::Kind::Array) },
            Fields::Unit => quote! { ::rpc_kit::Property::new(::rpc_kit::Kind::Object) },
        },
        Data::Enum(data) => {
            let unit_only = data.variants.iter().all(|v| matches!(v.fields, Fields::Unit));
            if unit_only {
                let mut names = Vec::new();
                for variant in &data.variants {
                    let attrs = field_attrs(&variant.attrs)?;
                    if attrs.skip {
                        continue;
                    }
                    names.push(match attrs.rename {
                        Some(name) => name,
                        None => apply_rename_all(&variant.ident.unraw().to_string(), rename_all.as_deref()),
                    });
                }
                let example = names.first().map(|first| quote! { .example(#first) });
                let allowed = format!("oneof={}", names.join(" "));
                quote! {
                    {
                        let mut property = ::rpc_kit::Property::new(::rpc_kit::Kind::String) #example;
                        property.validate = ::std::option::Option::Some(::std::string::String::from(#allowed));
                        property
                    }
                }
            } else {
                quote! { ::rpc_kit::Property::new(::rpc_kit::Kind::Object) }
            }
        }
        Data::Union(data) => {
            return Err(Error::new_spanned(
                data.union_token,
                "Describe cannot be derived for unions",
            ))
        }
    };

    let mut generics = input.generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(::rpc_kit::Describe));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let ident = &input.ident;

    Ok(quote! {
        impl #impl_generics ::rpc_kit::Describe for #ident #ty_generics #where_clause {
            fn describe() -> ::rpc_kit::Property {
                #body
            }
        }
    })
}

fn hints(attrs: &FieldAttrs) -> TokenStream2 {
    let example = optional_str(attrs.example.as_ref().map(LitStr::value));
    let format = optional_str(attrs.format.as_ref().map(LitStr::value));
    let validate = optional_str((!attrs.validate.is_empty()).then(|| attrs.validate.join(",")));
    quote! {
        ::rpc_kit::FieldHints {
            example: #example,
            format: #format,
            validate: #validate,
        }
    }
}

fn optional_str(value: Option<String>) -> TokenStream2 {
    match value {
        Some(value) => quote! { ::std::option::Option::Some(#value) },
        None => quote! { ::std::option::Option::None },
    }
}

fn container_rename_all(attrs: &[Attribute]) -> Result<Option<String>> {
    let mut rename_all = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if meta.input.peek(Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    rename_all = Some(value.value());
                } else {
                    // rename_all(serialize = "..", deserialize = "..")
                    meta.parse_nested_meta(|inner| {
                        let value: LitStr = inner.value()?.parse()?;
                        if inner.path.is_ident("serialize") {
                            rename_all = Some(value.value());
                        }
                        Ok(())
                    })?;
                }
                Ok(())
            } else {
                skip_meta_value(&meta)
            }
        })?;
    }
    Ok(rename_all)
}

fn field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if meta.input.peek(Token![=]) {
                        let value: LitStr = meta.value()?.parse()?;
                        parsed.rename = Some(value.value());
                    } else {
                        meta.parse_nested_meta(|inner| {
                            let value: LitStr = inner.value()?.parse()?;
                            if inner.path.is_ident("serialize") {
                                parsed.rename = Some(value.value());
                            }
                            Ok(())
                        })?;
                    }
                    Ok(())
                } else if meta.path.is_ident("skip")
                    || meta.path.is_ident("skip_serializing")
                    || meta.path.is_ident("skip_deserializing")
                {
                    // one tree documents both directions, so a field missing
                    // from either side is left out
                    parsed.skip = true;
                    Ok(())
                } else if meta.path.is_ident("flatten") {
                    parsed.flatten = true;
                    Ok(())
                } else {
                    skip_meta_value(&meta)
                }
            })?;
        } else if attr.path().is_ident("describe") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("example") {
                    parsed.example = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("format") {
                    parsed.format = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported describe argument, expected `example`, `format` or `skip`"))
                }
            })?;
        } else if attr.path().is_ident("validate") {
            if let Meta::List(list) = &attr.meta {
                parsed.validate.push(compact(list.tokens.clone()));
            }
        }
    }
    Ok(parsed)
}

/// Consumes the value of a nested meta item this derive does not care about.
fn skip_meta_value(meta: &ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<TokenStream2>()?;
    }
    Ok(())
}

fn apply_rename_all(name: &str, rule: Option<&str>) -> String {
    match rule {
        Some("lowercase") => name.to_lowercase(),
        Some("UPPERCASE") => name.to_uppercase(),
        Some("PascalCase") => name.to_upper_camel_case(),
        Some("camelCase") => name.to_lower_camel_case(),
        Some("snake_case") => name.to_snake_case(),
        Some("SCREAMING_SNAKE_CASE") => name.to_shouty_snake_case(),
        Some("kebab-case") => name.to_kebab_case(),
        Some("SCREAMING-KEBAB-CASE") => name.to_shouty_kebab_case(),
        _ => name.to_string(),
    }
}

/// Renders tokens without the spaces `to_string` puts between them, so
/// `length(min = 1)` reads `length(min=1)`.
fn compact(tokens: TokenStream2) -> String {
    tokens
        .into_iter()
        .map(|tree| match tree {
            TokenTree::Group(group) => {
                let (open, close) = match group.delimiter() {
                    Delimiter::Parenthesis => ("(", ")"),
                    Delimiter::Bracket => ("[", "]"),
                    Delimiter::Brace => ("{", "}"),
                    Delimiter::None => ("", ""),
                };
                format!("{open}{}{close}", compact(group.stream()))
            }
            other => other.to_string(),
        })
        .collect()
}
