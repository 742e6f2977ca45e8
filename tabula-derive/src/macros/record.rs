use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse2};

use super::field_utils::{field_key, field_options};

/// Derive macro for the Record trait.
///
/// Generates `tabula::Record::accessors()` with one getter/setter pair per
/// named field, in declaration order. Each pair is built from plain closures
/// that coerce to function pointers, and the field type's `FieldValue` impl
/// decides whether it is a text or a number field.
pub fn expand(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match parse2(input) {
        Ok(i) => i,
        Err(e) => return e.to_compile_error(),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "#[derive(Record)] only supports structs with named fields",
                )
                .to_compile_error();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "#[derive(Record)] only supports structs")
                .to_compile_error();
        }
    };

    let mut accessors = Vec::new();
    let mut keys: Vec<String> = Vec::new();
    for field in fields {
        let options = match field_options(&field.attrs) {
            Ok(options) => options,
            Err(e) => return e.to_compile_error(),
        };
        if options.skip {
            continue;
        }
        let (Some(ident), Some(key)) = (field.ident.as_ref(), field_key(field, &options)) else {
            continue;
        };
        if keys.contains(&key) {
            return syn::Error::new_spanned(field, format!("duplicate record key `{key}`"))
                .to_compile_error();
        }

        let ty = &field.ty;
        accessors.push(quote! {
            <#ty as ::tabula::FieldValue>::accessor(::tabula::Field::new(
                #key,
                |record: &Self| ::tabula::FieldValue::to_channel(&record.#ident),
                |record: &mut Self, value: <#ty as ::tabula::FieldValue>::Channel| {
                    <#ty as ::tabula::FieldValue>::from_channel(value).map(|v| record.#ident = v)
                },
            ))
        });
        keys.push(key);
    }

    quote! {
        impl #impl_generics ::tabula::Record for #name #ty_generics #where_clause {
            fn accessors() -> ::std::vec::Vec<::tabula::Accessor<Self>> {
                ::std::vec![#(#accessors),*]
            }
        }
    }
}
