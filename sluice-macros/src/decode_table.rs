use crate::decode_column::{ColumnMetadata, decode_column};
use convert_case::{Case, Casing};
use quote::ToTokens;
use syn::{Fields, ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    /// Snake case name of the type, used by the naming conventions.
    pub(crate) type_name: String,
    pub(crate) name: String,
    pub(crate) schema: String,
    pub(crate) columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Fields mapped to columns, in declaration order.
    pub(crate) fn mapped(&self) -> impl Iterator<Item = &ColumnMetadata> + Clone {
        self.columns.iter().filter(|c| c.is_column())
    }
}

pub fn decode_table(item: ItemStruct) -> TableMetadata {
    if !matches!(item.fields, Fields::Named(..)) {
        panic!("Entity can only be derived on structs with named fields");
    }
    let columns: Vec<_> = item.fields.iter().map(decode_column).collect();
    let mut type_name = item.ident.to_string().to_case(Case::Snake);
    if type_name.starts_with('_') {
        type_name.remove(0);
    }
    let mut name = type_name.clone();
    let mut schema = String::new();
    for attr in &item.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("sluice") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `sluice`, use it like: `#[sluice(attribute = value, ..)]`");
        };
        let result = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("table") {
                let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `table`, use it like: `#[sluice(table = \"my_table\")]`");
                };
                name = value.value();
            } else if arg.path.is_ident("schema") {
                let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `schema`, use it like: `#[sluice(schema = \"my_schema\")]`");
                };
                schema = value.value();
            } else {
                panic!(
                    "Unknown attribute `{}` inside sluice macro",
                    arg.path.to_token_stream()
                );
            }
            Ok(())
        });
        if let Err(e) = result {
            panic!("Error while parsing `sluice`: {e}");
        }
    }
    if columns.iter().filter(|c| c.is_column() && c.row_version).count() > 1 {
        panic!("Entity `{}` declares more than one row version", item.ident);
    }
    TableMetadata {
        item,
        type_name,
        name,
        schema,
        columns,
    }
}
