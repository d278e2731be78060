//! Procedural macros for the datalayer project.
//!
//! This crate provides derive macros for the record traits of `datalayer-core`, so
//! record types don't have to spell out their id accessors or field-by-name
//! assignment by hand:
//!
//! - `#[derive(Identifiable)]` - Uses the field marked `#[id]`, or the field named `id`
//! - `#[derive(PartialUpdate)]` - Assigns fields by case-insensitive name; `#[patch(skip)]` opts a field out
//!
//! The generated code refers to the `datalayer` facade crate.
//!
//! # Example
//!
//! ```ignore
//! use datalayer::prelude::*;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Identifiable, PartialUpdate)]
//! pub struct Note {
//!     #[patch(skip)]
//!     pub id: String,
//!     pub title: String,
//!     pub tags: Vec<String>,
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as datalayer_macros;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, FieldsNamed, ext::IdentExt, parse_macro_input, spanned::Spanned};

/// Derives `Identifiable` for a struct with named fields.
///
/// The id field is the one marked `#[id]`, or else the one named `id`. Its type
/// must implement `Default`; the default value is the "unset" id that gets
/// replaced by a generated one on create.
#[proc_macro_derive(Identifiable, attributes(id))]
pub fn derive_identifiable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_identifiable(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derives `PartialUpdate` for a struct with named fields.
///
/// Field names are matched ignoring ASCII case. Values are converted with serde,
/// so every assignable field type must implement `Deserialize`.
#[proc_macro_derive(PartialUpdate, attributes(patch))]
pub fn derive_partial_update(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_partial_update(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<&'a FieldsNamed> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields),
            _ => Err(syn::Error::new(
                input.ident.span(),
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new(
            input.ident.span(),
            format!("{derive} can only be derived for structs"),
        )),
    }
}

fn find_id_field(fields: &FieldsNamed) -> Option<&Field> {
    fields.named
        .iter()
        .find(|field| field.attrs.iter().any(|attr| attr.path().is_ident("id")))
        .or_else(|| {
            fields.named
                .iter()
                .find(|field| field.ident.as_ref().is_some_and(|ident| ident == "id"))
        })
}

fn expand_identifiable(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = named_fields(input, "Identifiable")?;
    let field = find_id_field(fields).ok_or_else(|| {
        syn::Error::new(
            input.ident.span(),
            "Identifiable needs a field named `id` or a field marked `#[id]`",
        )
    })?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let id_field = &field.ident;
    let id_type = &field.ty;

    Ok(quote! {
        impl #impl_generics ::datalayer::record::Identifiable for #name #ty_generics #where_clause {
            type Id = #id_type;

            fn id(&self) -> &Self::Id {
                &self.#id_field
            }

            fn is_zero_id(&self) -> bool {
                self.#id_field == <#id_type as ::core::default::Default>::default()
            }

            fn with_id(mut self, id: Self::Id) -> Self {
                self.#id_field = id;
                self
            }
        }
    })
}

fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skip = false;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("patch")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported patch attribute, expected `skip`"))
            }
        })?;
    }

    Ok(skip)
}

fn expand_partial_update(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = named_fields(input, "PartialUpdate")?;

    let mut arms = Vec::new();
    for field in &fields.named {
        if is_skipped(field)? {
            continue;
        }

        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;
        let key = ident.unraw().to_string();

        arms.push(quote! {
            if name.eq_ignore_ascii_case(#key) {
                self.#ident = ::datalayer::patch::decode_field(name, value)?;
                return ::core::result::Result::Ok(true);
            }
        });
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::datalayer::patch::PartialUpdate for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                name: &str,
                value: ::datalayer::serde_json::Value,
            ) -> ::datalayer::error::PersistenceResult<bool> {
                #(#arms)*

                ::core::result::Result::Ok(false)
            }
        }
    })
}
