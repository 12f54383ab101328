use crate::{decode_column::ReferenceShape, decode_table::TableMetadata};
use proc_macro2::TokenStream;
use quote::quote;

/// `ReferenceDef` values of the schema description.
pub(crate) fn reference_defs(table: &TableMetadata) -> Vec<TokenStream> {
    table
        .columns
        .iter()
        .filter_map(|c| {
            let reference = c.reference.as_ref()?;
            let field = &c.field;
            let target = &reference.target;
            let kind = match reference.shape {
                ReferenceShape::Many => quote!(::sluice::ReferenceKind::Many),
                ReferenceShape::Optional | ReferenceShape::Required => {
                    quote!(::sluice::ReferenceKind::One)
                }
            };
            Some(quote! {
                ::sluice::ReferenceDef::new(#field, #kind, <#target as ::sluice::Entity>::schema)
            })
        })
        .collect()
}

/// Body of `Entity::set_reference`.
pub(crate) fn set_reference(table: &TableMetadata) -> TokenStream {
    let struct_name = table.item.ident.to_string();
    let branches = table.columns.iter().filter_map(|c| {
        let reference = c.reference.as_ref()?;
        let ident = &c.ident;
        let name = &c.field;
        let target = &reference.target;
        let assign = match reference.shape {
            ReferenceShape::Many => quote! {
                self.#ident = rows
                    .into_iter()
                    .map(|row| <#target as ::sluice::Entity>::from_row(row, writer))
                    .collect::<::sluice::Result<Vec<_>>>()?;
            },
            ReferenceShape::Optional => quote! {
                self.#ident = rows
                    .into_iter()
                    .next()
                    .map(|row| <#target as ::sluice::Entity>::from_row(row, writer))
                    .transpose()?;
            },
            ReferenceShape::Required => quote! {
                if let Some(row) = rows.into_iter().next() {
                    self.#ident = <#target as ::sluice::Entity>::from_row(row, writer)?;
                }
            },
        };
        Some(quote! {
            if field == #name {
                #assign
                return Ok(());
            }
        })
    });
    quote! {
        #(#branches)*
        Err(::sluice::ErrorKind::mapping(format!(
            "`{}` is not a reference of `{}`",
            field, #struct_name
        )))
    }
}
