use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::visit_mut::{self, VisitMut};
use syn::{
    Attribute, Error as SynError, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, Path,
    Result as SynResult, ReturnType, Signature, Type, TypePath,
};

use crate::attrs::{
    self, is_custom_attribute, parse_method_attributes, parse_parameter_attributes,
    AttributeData, MethodAttributes, ParameterAttributes,
};

#[derive(Debug)]
struct DisposerData {
    identifier: Ident,
    has_receiver: bool,
    parameters: Vec<ParameterData>,
    markers: MethodAttributes,
    return_type: ReturnTypeData,
}

#[derive(Debug)]
struct ParameterData {
    span: Span,
    ty: Type,
    attributes: ParameterAttributes,
}

#[derive(Debug)]
enum ReturnTypeData {
    Unit,
    Result,
}

struct AttributeRemovalVisitor;

impl VisitMut for AttributeRemovalVisitor {
    fn visit_attributes_mut(&mut self, attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !is_custom_attribute(attr));
        attrs
            .iter_mut()
            .for_each(|attr| visit_mut::visit_attribute_mut(self, attr));
    }
}

pub fn expand_implementation(
    impls: TokenStream,
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[disposers]` should be annotated on the `impl` block",
            ))
        }
    };

    let self_type = get_self_type(&impls)?;
    let mut disposers = Vec::new();
    for item_fn in impls.items.iter().filter_map(filter_and_map_item_fn) {
        let markers = parse_method_attributes(&item_fn.attrs)?;
        if markers.disposer {
            disposers.push(parse_disposer(&item_fn.sig, markers)?);
        }
    }
    if disposers.is_empty() {
        return Err(SynError::new(
            impls.span(),
            "no method is annotated with `#[disposer]`",
        ));
    }

    let expanded = expand_disposers_implementation(&self_type, &disposers, &attr_data.krate);

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #expanded
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if !impls.generics.params.is_empty() {
        return Err(SynError::new(
            impls.generics.span(),
            "`#[disposers]` doesn't support generic `impl` blocks",
        ));
    }
    if let Some((_, trait_path, _)) = &impls.trait_ {
        return Err(SynError::new(
            trait_path.span(),
            "`#[disposers]` should be annotated on an inherent `impl` block",
        ));
    }
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn parse_disposer(signature: &Signature, markers: MethodAttributes) -> SynResult<DisposerData> {
    if let Some(asyncness) = signature.asyncness {
        return Err(SynError::new(
            asyncness.span(),
            "a disposer can't be an `async` function",
        ));
    }
    if !signature.generics.params.is_empty() {
        return Err(SynError::new(
            signature.generics.span(),
            "a disposer can't have generic parameters",
        ));
    }

    let mut has_receiver = false;
    let mut parameters = Vec::with_capacity(signature.inputs.len());
    for input in &signature.inputs {
        match input {
            FnArg::Receiver(rec) => {
                if rec.reference.is_none() || rec.mutability.is_some() || rec.colon_token.is_some()
                {
                    return Err(SynError::new(
                        rec.span(),
                        "a disposer should take `&self` or no receiver",
                    ));
                }
                has_receiver = true;
            }
            FnArg::Typed(arg) => {
                if let Type::Reference(reference) = arg.ty.as_ref() {
                    return Err(SynError::new(
                        reference.span(),
                        "disposer parameters should be passed by value",
                    ));
                }
                parameters.push(ParameterData {
                    span: arg.span(),
                    ty: arg.ty.as_ref().clone(),
                    attributes: parse_parameter_attributes(&arg.attrs)?,
                });
            }
        }
    }

    Ok(DisposerData {
        identifier: signature.ident.clone(),
        has_receiver,
        parameters,
        markers,
        return_type: parse_disposer_return_type(&signature.output)?,
    })
}

fn parse_disposer_return_type(output: &ReturnType) -> SynResult<ReturnTypeData> {
    let ReturnType::Type(_, return_type) = output else {
        return Ok(ReturnTypeData::Unit);
    };
    match return_type.as_ref() {
        Type::Tuple(tuple) if tuple.elems.is_empty() => Ok(ReturnTypeData::Unit),
        Type::Path(path)
            if path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Result") =>
        {
            Ok(ReturnTypeData::Result)
        }
        _ => Err(SynError::new(
            return_type.span(),
            "a disposer's return type should be `()` or `Result<(), E>`",
        )),
    }
}

fn expand_disposers_implementation(
    self_type: &TypePath,
    disposers: &[DisposerData],
    krate: &Path,
) -> TokenStream2 {
    let descriptors = disposers
        .iter()
        .map(|disposer| expand_descriptor(self_type, disposer, krate));

    quote! {
        impl #krate::method::Disposers for #self_type {
            fn disposal_methods() -> ::std::vec::Vec<#krate::method::MethodDescriptor> {
                ::std::vec![#(#descriptors),*]
            }
        }
    }
}

fn expand_descriptor(self_type: &TypePath, disposer: &DisposerData, krate: &Path) -> TokenStream2 {
    let identifier = &disposer.identifier;
    let name = identifier.to_string();

    let parameters = disposer.parameters.iter().map(|parameter| {
        let ty = &parameter.ty;
        let attributes = &parameter.attributes;
        let disposes = attributes.disposes.then(|| quote! { .disposes() });
        let observes = attributes.observes.then(|| quote! { .observes() });
        let qualifiers = &attributes.qualifiers;
        let supertypes = &attributes.supertypes;
        quote! {
            .parameter(
                #krate::method::param::<#ty>()
                    #disposes
                    #observes
                    #(.qualified_by(#qualifiers))*
                    #(.assignable_to::<#supertypes>())*
            )
        }
    });

    let produces = disposer
        .markers
        .produces
        .then(|| quote! { .marked(#krate::method::MethodMarker::Produces) });
    let initializer = disposer
        .markers
        .initializer
        .then(|| quote! { .marked(#krate::method::MethodMarker::Initializer) });

    let args: Vec<_> = disposer
        .parameters
        .iter()
        .enumerate()
        .map(|(i, parameter)| format_ident!("arg{}", i, span = parameter.span))
        .collect();
    let types = disposer.parameters.iter().map(|parameter| &parameter.ty);

    let call = if disposer.has_receiver {
        quote! { <#self_type>::#identifier(this, #(#args),*) }
    } else {
        quote! { <#self_type>::#identifier(#(#args),*) }
    };
    let body = match disposer.return_type {
        ReturnTypeData::Unit => quote! {
            #call;
            ::std::result::Result::Ok::<(), ::std::convert::Infallible>(())
        },
        ReturnTypeData::Result => call,
    };

    let handle = if disposer.has_receiver {
        quote! {
            #krate::method::InstanceMethod::new(
                |this: &#self_type, #(#args: #types),*| { #body }
            )
        }
    } else {
        quote! {
            #krate::method::StaticMethod::new(
                |#(#args: #types),*| { #body }
            )
        }
    };

    quote! {
        #krate::method::MethodBuilder::new(#name)
            #(#parameters)*
            #produces
            #initializer
            .build(#handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(tokens: &str) -> Signature {
        syn::parse_str::<ImplItemFn>(tokens).unwrap().sig
    }

    #[test]
    fn parse_disposer_accepts_shared_receiver() {
        let data = parse_disposer(
            &signature("fn dispose(&self, #[disposes] w: Widget, log: Log) {}"),
            MethodAttributes::default(),
        )
        .unwrap();
        assert!(data.has_receiver);
        assert_eq!(data.parameters.len(), 2);
        assert!(data.parameters[0].attributes.disposes);
        assert!(!data.parameters[1].attributes.disposes);
        assert!(matches!(data.return_type, ReturnTypeData::Unit));
    }

    #[test]
    fn parse_disposer_collects_qualifiers_and_supertypes() {
        let data = parse_disposer(
            &signature(
                r#"fn dispose(
                    #[disposes] #[named("audit")] #[qualified(Color::Blue)]
                    #[assignable_to(dyn Gadget, dyn Resource)] w: Widget,
                ) -> Result<(), Error> { Ok(()) }"#,
            ),
            MethodAttributes::default(),
        )
        .unwrap();
        assert!(!data.has_receiver);
        let attributes = &data.parameters[0].attributes;
        assert_eq!(attributes.qualifiers.len(), 2);
        assert_eq!(attributes.supertypes.len(), 2);
        assert!(matches!(data.return_type, ReturnTypeData::Result));
    }

    #[test]
    fn parse_disposer_rejects_bad_shapes() {
        for tokens in [
            "fn dispose(&mut self, #[disposes] w: Widget) {}",
            "fn dispose(self, #[disposes] w: Widget) {}",
            "fn dispose(#[disposes] w: &Widget) {}",
            "fn dispose<T>(#[disposes] w: T) {}",
            "async fn dispose(#[disposes] w: Widget) {}",
            "fn dispose(#[disposes] w: Widget) -> u32 { 0 }",
            "fn dispose(#[named] w: Widget) {}",
        ] {
            assert!(
                parse_disposer(&signature(tokens), MethodAttributes::default()).is_err(),
                "`{tokens}` should be rejected"
            );
        }
    }

    #[test]
    fn parse_method_attributes_reads_markers() {
        let item = syn::parse_str::<ImplItemFn>(
            "#[disposer] #[produces] #[inline] fn dispose(#[disposes] w: Widget) {}",
        )
        .unwrap();
        let markers = parse_method_attributes(&item.attrs).unwrap();
        assert!(markers.disposer);
        assert!(markers.produces);
        assert!(!markers.initializer);
    }

    #[test]
    fn attribute_removal_keeps_foreign_attributes() {
        let mut item = syn::parse_str::<ItemImpl>(
            "impl Factory { #[disposer] #[inline] fn dispose(&self, #[disposes] w: Widget) {} }",
        )
        .unwrap();
        AttributeRemovalVisitor.visit_item_impl_mut(&mut item);
        let ImplItem::Fn(item_fn) = &item.items[0] else {
            panic!("expected a method");
        };
        assert_eq!(item_fn.attrs.len(), 1);
        assert!(item_fn.attrs[0].path().is_ident("inline"));
        let FnArg::Typed(arg) = &item_fn.sig.inputs[1] else {
            panic!("expected a typed argument");
        };
        assert!(arg.attrs.is_empty());
        assert!(attrs::parse_parameter_attributes(&arg.attrs)
            .unwrap()
            .qualifiers
            .is_empty());
    }
}
