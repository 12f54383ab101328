mod decode_column;
mod decode_table;
mod from_row;
mod references;

use decode_table::decode_table;
use from_row::from_row;
use proc_macro::TokenStream;
use quote::quote;
use references::{reference_defs, set_reference};
use syn::{ItemStruct, parse_macro_input};

/// Derive `sluice::Entity` for a struct with named fields.
///
/// Struct attributes: `#[sluice(table = "..", schema = "..")]`.
/// Field attributes: `name = ".."`, `primary_key`, `auto_increment`,
/// `row_version`, `ignore`, `reference`, `references = Type`,
/// `default = ".."`, `select = ".."`, `enum_as = "name" | "ordinal" | "char"`.
#[proc_macro_derive(Entity, attributes(sluice))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let table = decode_table(item);
    let name = &table.item.ident;
    let struct_name = name.to_string();
    let type_name = &table.type_name;
    let table_name = &table.name;
    let schema_name = &table.schema;
    let column_defs = table.mapped().map(|c| {
        let field = &c.field;
        let column = &c.name;
        let ty = &c.ty;
        let mut def = quote! {
            ::sluice::ColumnDef::new(#field, <#ty as ::sluice::AsValue>::as_empty_value())
                .column_name(#column)
                .nullable(<#ty as ::sluice::AsValue>::nullable())
        };
        if c.primary_key {
            def = quote!(#def.primary_key());
        }
        if c.auto_increment {
            def = quote!(#def.auto_increment());
        }
        if c.row_version {
            def = quote!(#def.row_version());
        }
        if let Some(default) = &c.default {
            def = quote!(#def.default_value(#default));
        }
        if let Some(select) = &c.select {
            def = quote!(#def.custom_select(#select));
        }
        if let Some(target) = &c.references {
            def = quote!(#def.references(<#target as ::sluice::Entity>::schema));
        }
        if let Some(repr) = &c.enum_as {
            def = quote!(#def.enum_repr(#repr));
        }
        def
    });
    let reference_defs = reference_defs(&table);
    let values = table.mapped().map(|c| {
        let field = &c.ident;
        quote!(::sluice::AsValue::as_value(::std::clone::Clone::clone(&self.#field)))
    });
    let setters = table.mapped().map(|c| {
        let field = &c.ident;
        let field_name = &c.field;
        let column = &c.name;
        let ty = &c.ty;
        quote! {
            if name.eq_ignore_ascii_case(#field_name) || name.eq_ignore_ascii_case(#column) {
                self.#field = <#ty as ::sluice::AsValue>::try_from_value(value)?;
                return Ok(());
            }
        }
    });
    let from_row = from_row(&table);
    let set_reference = set_reference(&table);
    quote! {
        impl ::sluice::Entity for #name {
            fn schema() -> &'static ::sluice::TableSchema {
                static SCHEMA: ::std::sync::OnceLock<::sluice::TableSchema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    ::sluice::TableSchema::builder(#type_name)
                        .table(#table_name)
                        .schema(#schema_name)
                        #(.column(#column_defs))*
                        #(.reference(#reference_defs))*
                        .build()
                })
            }

            fn from_row(
                row: ::sluice::RowLabeled,
                writer: &dyn ::sluice::SqlWriter,
            ) -> ::sluice::Result<Self> {
                #from_row
            }

            fn row(&self) -> ::std::vec::Vec<::sluice::Value> {
                vec![#(#values),*]
            }

            fn set_column(&mut self, name: &str, value: ::sluice::Value) -> ::sluice::Result<()> {
                #(#setters)*
                Err(::sluice::ErrorKind::mapping(format!(
                    "`{}` is not a column of `{}`",
                    name, #struct_name
                )))
            }

            #[allow(unused_variables)]
            fn set_reference(
                &mut self,
                field: &str,
                rows: ::std::vec::Vec<::sluice::RowLabeled>,
                writer: &dyn ::sluice::SqlWriter,
            ) -> ::sluice::Result<()> {
                #set_reference
            }
        }
    }
    .into()
}
