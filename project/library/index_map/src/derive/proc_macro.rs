use proc_macro::TokenStream as TokenStream1;
use proc_macro2::Span;
use quote::quote;
use syn::{parse::Error, spanned::Spanned};

// @Task support generic newtypes

/// Derive `index_map::Index` for a tuple struct wrapping a single unsigned integer.
#[proc_macro_derive(Index)]
pub fn derive_index(input: TokenStream1) -> TokenStream1 {
    let input = syn::parse_macro_input!(input as syn::ItemStruct);

    if !input.generics.params.is_empty() {
        return report(input.generics.params.span(), "parameters not supported");
    }

    let ident = input.ident;
    let span = input.fields.span();

    let ty = match input.fields {
        syn::Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            match fields.unnamed.into_iter().next() {
                Some(field) => field.ty,
                None => unreachable!(),
            }
        }
        _ => return report(span, "index types must have exactly one unnamed field"),
    };

    let stream = quote! {
        impl ::index_map::Index for #ident {
            #[allow(clippy::cast_possible_truncation)]
            fn new(index: usize) -> Self {
                Self(index as #ty)
            }

            fn value(self) -> usize {
                self.0 as usize
            }
        }
    };

    stream.into()
}

fn report(span: Span, message: impl std::fmt::Display) -> TokenStream1 {
    Error::new(span, message).into_compile_error().into()
}
