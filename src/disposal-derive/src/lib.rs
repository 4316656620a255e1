mod attrs;
mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::Result as SynResult;

/// Implements `disposal::method::Disposers` for the type of an inherent
/// `impl` block, describing every method annotated with `#[disposer]`.
///
/// Parameters take `#[disposes]`, `#[observes]`, `#[named("...")]`,
/// `#[qualified(expr)]` and `#[assignable_to(Type, ...)]`; methods take
/// `#[produces]` and `#[initializer]`. These markers are only recorded here;
/// whether they make a well-formed disposer is checked when the disposers are
/// registered.
#[proc_macro_attribute]
pub fn disposers(attr: TokenStream, item: TokenStream) -> TokenStream {
    match disposers_impl(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn disposers_impl(attr: TokenStream, item: TokenStream) -> SynResult<TokenStream2> {
    let attr_data = attrs::parse_attributes(attr)?;
    let expanded = impls::expand_implementation(item, attr_data)?;
    Ok(expanded)
}
