use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{
    Field, GenericArgument, Ident, LitStr, Path, PathArguments, Type, ext::IdentExt,
    meta::ParseNestedMeta, parse::ParseBuffer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReferenceShape {
    /// `Vec<T>`
    Many,
    /// `Option<T>`
    Optional,
    /// `T`
    Required,
}

pub(crate) struct ReferenceMetadata {
    pub(crate) shape: ReferenceShape,
    pub(crate) target: Type,
}

pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    /// Field name, as written in the struct.
    pub(crate) field: String,
    /// Column name.
    pub(crate) name: String,
    pub(crate) primary_key: bool,
    pub(crate) auto_increment: bool,
    pub(crate) row_version: bool,
    pub(crate) default: Option<String>,
    pub(crate) select: Option<String>,
    pub(crate) references: Option<Path>,
    pub(crate) enum_as: Option<TokenStream>,
    pub(crate) ignore: bool,
    pub(crate) reference: Option<ReferenceMetadata>,
}

impl ColumnMetadata {
    /// Whether the field is mapped to a column.
    pub(crate) fn is_column(&self) -> bool {
        !self.ignore && self.reference.is_none()
    }
}

/// Inner type of `Wrapper<T>` when the last path segment is `wrapper`.
fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    arguments.args.iter().find_map(|v| match v {
        GenericArgument::Type(v) => Some(v),
        _ => None,
    })
}

fn decode_reference(ty: &Type) -> ReferenceMetadata {
    if let Some(target) = generic_argument(ty, "Vec") {
        ReferenceMetadata {
            shape: ReferenceShape::Many,
            target: target.clone(),
        }
    } else if let Some(target) = generic_argument(ty, "Option") {
        ReferenceMetadata {
            shape: ReferenceShape::Optional,
            target: target.clone(),
        }
    } else {
        ReferenceMetadata {
            shape: ReferenceShape::Required,
            target: ty.clone(),
        }
    }
}

fn require_flag(arg: &ParseNestedMeta, usage: &str) {
    // value() is Err for Meta::Path
    if arg.value().is_ok() {
        panic!("Error while parsing `{usage}`, use it like: `#[sluice({usage})]`");
    }
}

pub fn decode_column(field: &Field) -> ColumnMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Entity fields are expected to have a name");
    let mut name = ident.unraw().to_string();
    if name.starts_with('_') {
        name.remove(0);
    }
    let mut metadata = ColumnMetadata {
        ident,
        ty: field.ty.clone(),
        field: name.clone(),
        name,
        primary_key: false,
        auto_increment: false,
        row_version: false,
        default: None,
        select: None,
        references: None,
        enum_as: None,
        ignore: false,
        reference: None,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("sluice") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `sluice`, use it like: `#[sluice(attribute = value, ...)]`");
        };
        let result = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `name`, use it like: `#[sluice(name = \"my_column\")]`");
                };
                metadata.name = v.value();
            } else if arg.path.is_ident("primary_key") {
                require_flag(&arg, "primary_key");
                metadata.primary_key = true;
            } else if arg.path.is_ident("auto_increment") {
                require_flag(&arg, "auto_increment");
                metadata.auto_increment = true;
            } else if arg.path.is_ident("row_version") {
                require_flag(&arg, "row_version");
                metadata.row_version = true;
            } else if arg.path.is_ident("ignore") {
                require_flag(&arg, "ignore");
                metadata.ignore = true;
            } else if arg.path.is_ident("reference") {
                require_flag(&arg, "reference");
                metadata.reference = Some(decode_reference(&field.ty));
            } else if arg.path.is_ident("references") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<Path>) else {
                    panic!("Error while parsing `references`, use it like: `#[sluice(references = Department)]`");
                };
                metadata.references = Some(v);
            } else if arg.path.is_ident("default") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `default`, use it like: `#[sluice(default = \"CURRENT_TIMESTAMP\")]`");
                };
                metadata.default = Some(v.value());
            } else if arg.path.is_ident("select") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `select`, use it like: `#[sluice(select = \"price * quantity\")]`");
                };
                metadata.select = Some(v.value());
            } else if arg.path.is_ident("enum_as") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `enum_as`, use it like: `#[sluice(enum_as = \"ordinal\")]`");
                };
                metadata.enum_as = Some(match v.value().as_str() {
                    "name" => quote!(::sluice::EnumRepr::Name),
                    "ordinal" => quote!(::sluice::EnumRepr::Ordinal),
                    "char" => quote!(::sluice::EnumRepr::Char),
                    other => panic!(
                        "Unknown enum representation `{other}`, expected one of `name`, `ordinal`, `char`"
                    ),
                });
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
    if metadata.ignore && metadata.reference.is_some() {
        panic!(
            "Field `{}` cannot be both ignored and a reference",
            metadata.ident
        );
    }
    metadata
}
