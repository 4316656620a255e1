use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::{Attribute, Error as SynError, Expr, LitStr, MetaNameValue, Path, Result as SynResult, Type};

const METHOD_ATTRIBUTES: [&str; 3] = ["disposer", "produces", "initializer"];
const PARAMETER_ATTRIBUTES: [&str; 5] = ["disposes", "observes", "named", "qualified", "assignable_to"];

#[derive(Debug)]
pub struct AttributeData {
    pub krate: Path,
}

pub fn parse_attributes(attr: TokenStream) -> SynResult<AttributeData> {
    if attr.is_empty() {
        return Ok(AttributeData {
            krate: syn::parse_quote!(::disposal),
        });
    }

    let meta = syn::parse::<MetaNameValue>(attr)?;
    if !meta.path.is_ident("crate") {
        return Err(SynError::new(
            meta.span(),
            "expects `#[disposers]` or `#[disposers(crate = path)]`",
        ));
    }
    match meta.value {
        Expr::Path(krate) => Ok(AttributeData { krate: krate.path }),
        value => Err(SynError::new(
            value.span(),
            "expects `crate = ...` to receive a path",
        )),
    }
}

#[derive(Debug, Default)]
pub struct MethodAttributes {
    pub disposer: bool,
    pub produces: bool,
    pub initializer: bool,
}

pub fn parse_method_attributes(attrs: &[Attribute]) -> SynResult<MethodAttributes> {
    let mut res = MethodAttributes::default();
    for attr in attrs {
        let Some(name) = attribute_name(attr) else {
            continue;
        };
        let flag = match name.as_str() {
            "disposer" => &mut res.disposer,
            "produces" => &mut res.produces,
            "initializer" => &mut res.initializer,
            _ => continue,
        };
        attr.meta.require_path_only()?;
        *flag = true;
    }
    Ok(res)
}

#[derive(Debug, Default)]
pub struct ParameterAttributes {
    pub disposes: bool,
    pub observes: bool,
    pub qualifiers: Vec<TokenStream2>,
    pub supertypes: Vec<Type>,
}

pub fn parse_parameter_attributes(attrs: &[Attribute]) -> SynResult<ParameterAttributes> {
    let mut res = ParameterAttributes::default();
    for attr in attrs {
        let Some(name) = attribute_name(attr) else {
            continue;
        };
        match name.as_str() {
            "disposes" => {
                attr.meta.require_path_only()?;
                res.disposes = true;
            }
            "observes" => {
                attr.meta.require_path_only()?;
                res.observes = true;
            }
            "named" => {
                let name = attr.parse_args::<LitStr>().map_err(|err| {
                    SynError::new(err.span(), "expects `#[named(...)]` to receive a `&'static str`")
                })?;
                res.qualifiers.push(name.into_token_stream());
            }
            "qualified" => {
                let qualifier = attr.parse_args::<Expr>().map_err(|err| {
                    SynError::new(
                        err.span(),
                        "expects `#[qualified(...)]` to receive a `TypedQualifier` value",
                    )
                })?;
                res.qualifiers.push(qualifier.into_token_stream());
            }
            "assignable_to" => {
                let types = attr
                    .parse_args_with(Punctuated::<Type, Comma>::parse_terminated)
                    .map_err(|err| {
                        SynError::new(
                            err.span(),
                            "expects `#[assignable_to(...)]` to receive a list of types",
                        )
                    })?;
                res.supertypes.extend(types);
            }
            _ => {}
        }
    }
    Ok(res)
}

pub fn is_custom_attribute(attr: &Attribute) -> bool {
    attribute_name(attr).is_some_and(|name| {
        METHOD_ATTRIBUTES.contains(&name.as_str()) || PARAMETER_ATTRIBUTES.contains(&name.as_str())
    })
}

fn attribute_name(attr: &Attribute) -> Option<String> {
    attr.path().get_ident().map(ToString::to_string)
}
