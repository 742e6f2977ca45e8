mod macros;

use proc_macro::TokenStream;

/// Generate the typed accessor table for a record shape.
///
/// Every named field becomes a column key. `#[record(skip)]` leaves a field
/// out, `#[record(rename = "key")]` changes its key. Raw identifiers such as
/// `r#type` use their unraw name.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    macros::record::expand(input.into()).into()
}
