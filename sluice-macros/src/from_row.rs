use crate::decode_table::TableMetadata;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;

/// Body of `Entity::from_row`.
///
/// Types implementing `Default` start from the default value and overwrite the
/// columns present in the row, so that a partial projection leaves the other
/// fields untouched. The other types need every non nullable column in the row.
pub(crate) fn from_row(table: &TableMetadata) -> TokenStream {
    let struct_name = &table.item.ident;
    let column_indexes: Vec<_> = table
        .columns
        .iter()
        .filter(|c| c.is_column())
        .enumerate()
        .collect();
    let assignment = |assign: &dyn Fn(&syn::Ident, &syn::Type) -> TokenStream| {
        let branches = column_indexes.iter().map(|(i, c)| {
            let name = &c.name;
            let assign = assign(&c.ident, &c.ty);
            quote! {
                if __label__.eq_ignore_ascii_case(#name) {
                    let __v__ = writer.from_db_value(__v__, &__schema__.columns[#i]);
                    #assign
                    continue;
                }
            }
        });
        quote!(#(#branches)*)
    };
    let assign_default = assignment(&|field, ty| {
        quote! {
            if !__v__.is_null() || <#ty as ::sluice::AsValue>::nullable() {
                result.#field = <#ty as ::sluice::AsValue>::try_from_value(__v__)?;
            }
        }
    });
    let assign_holder = assignment(&|field, ty| {
        let holder = format_ident!("__{}", field.unraw());
        quote! {
            #holder = Some(<#ty as ::sluice::AsValue>::try_from_value(__v__)?);
        }
    });
    let holders = column_indexes.iter().map(|(_, c)| {
        let holder = format_ident!("__{}", c.ident.unraw());
        let ty = &c.ty;
        quote!(let mut #holder: Option<#ty> = None;)
    });
    let fields = table.columns.iter().map(|c| {
        let field = &c.ident;
        if !c.is_column() {
            return quote!(#field: ::std::default::Default::default());
        }
        let holder = format_ident!("__{}", c.ident.unraw());
        let ty = &c.ty;
        let name = &c.name;
        quote! {
            #field: match #holder {
                Some(v) => v,
                None => <#ty as ::sluice::AsValue>::try_from_value(
                    <#ty as ::sluice::AsValue>::as_empty_value(),
                )
                .map_err(|e| e.context(format!("Column `{}` does not exist in the row provided", #name)))?,
            }
        }
    });
    quote! {
        #[allow(dead_code)]
        struct Factory<T>(::std::marker::PhantomData<T>);
        #[allow(dead_code)]
        trait FromAllColumns {
            fn build(
                &self,
                row: ::sluice::RowLabeled,
                writer: &dyn ::sluice::SqlWriter,
            ) -> ::sluice::Result<#struct_name>;
        }
        #[allow(dead_code)]
        impl<T: ::std::default::Default + ::std::convert::Into<#struct_name>> Factory<T> {
            // Called when T implements Default
            fn build(
                &self,
                row: ::sluice::RowLabeled,
                writer: &dyn ::sluice::SqlWriter,
            ) -> ::sluice::Result<#struct_name> {
                let __schema__ = <#struct_name as ::sluice::Entity>::schema();
                let mut result: #struct_name = T::default().into();
                for (__label__, __v__) in ::std::iter::zip(row.labels.iter(), row.values.into_vec()) {
                    #assign_default
                }
                Ok(result)
            }
        }
        impl<T> FromAllColumns for Factory<T> {
            // Called when T does not implement Default
            fn build(
                &self,
                row: ::sluice::RowLabeled,
                writer: &dyn ::sluice::SqlWriter,
            ) -> ::sluice::Result<#struct_name> {
                let __schema__ = <#struct_name as ::sluice::Entity>::schema();
                #(#holders)*
                for (__label__, __v__) in ::std::iter::zip(row.labels.iter(), row.values.into_vec()) {
                    #assign_holder
                }
                Ok(#struct_name {
                    #(#fields,)*
                })
            }
        }
        Factory::<#struct_name>(::std::marker::PhantomData).build(row, writer)
    }
}
