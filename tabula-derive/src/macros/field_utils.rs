//! Shared utilities for reading `#[record(...)]` field attributes.

use syn::ext::IdentExt;
use syn::{Attribute, Field, LitStr};

/// Options collected from the `#[record(...)]` attributes of one field.
#[derive(Default)]
pub struct FieldOptions {
    pub skip: bool,
    pub rename: Option<String>,
}

/// Parse `#[record(skip)]` and `#[record(rename = "...")]`.
pub fn field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename = \"...\"`"))
            }
        })?;
    }
    Ok(options)
}

/// The column key of a field: its rename, or its identifier without `r#`.
pub fn field_key(field: &Field, options: &FieldOptions) -> Option<String> {
    if let Some(rename) = &options.rename {
        return Some(rename.clone());
    }
    field.ident.as_ref().map(|ident| ident.unraw().to_string())
}
