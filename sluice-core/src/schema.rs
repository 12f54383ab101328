use crate::{Entity, ErrorKind, Result, Value};
use std::borrow::Cow;

/// Physical table, optionally inside a schema and optionally aliased.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: Cow<'static, str>,
    pub schema: Cow<'static, str>,
    pub alias: Cow<'static, str>,
}

impl TableRef {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn with_alias(&self, alias: impl Into<Cow<'static, str>>) -> Self {
        Self {
            alias: alias.into(),
            ..self.clone()
        }
    }
    /// Name used to qualify columns: the alias when present.
    pub fn qualifier(&self) -> &str {
        if self.alias.is_empty() {
            &self.name
        } else {
            &self.alias
        }
    }
}

/// Physical column reference, the table part is empty for unqualified columns.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub name: Cow<'static, str>,
    pub table: Cow<'static, str>,
    pub schema: Cow<'static, str>,
}

impl ColumnRef {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn table_ref(&self) -> TableRef {
        TableRef {
            name: self.table.clone(),
            schema: self.schema.clone(),
            alias: Cow::Borrowed(""),
        }
    }
}

/// How an enum column is stored.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRepr {
    /// Variant name, the default.
    #[default]
    Name,
    /// Variant discriminant as an integer.
    Ordinal,
    /// Variant discriminant as a single character code point.
    Char,
}

/// A field of an entity mapped to a column.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub column_ref: ColumnRef,
    /// Field name in the entity.
    pub field: Cow<'static, str>,
    /// Declared type prototype (the `None` variant of the field type).
    pub value: Value,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub row_version: bool,
    /// Default value expression, kept as SQL text.
    pub default: Option<Cow<'static, str>>,
    /// SQL expression selected in place of the physical column.
    pub custom_select: Option<Cow<'static, str>>,
    /// Explicit foreign key target.
    pub references: Option<fn() -> &'static TableSchema>,
    pub enum_repr: EnumRepr,
}

impl ColumnDef {
    pub fn new(field: impl Into<Cow<'static, str>>, value: Value) -> Self {
        let field = field.into();
        Self {
            column_ref: ColumnRef::new(field.clone()),
            field,
            value,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            row_version: false,
            default: None,
            custom_select: None,
            references: None,
            enum_repr: EnumRepr::Name,
        }
    }
    pub fn name(&self) -> &str {
        &self.column_ref.name
    }
    /// Physical column name when it differs from the field name.
    pub fn column_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.column_ref.name = name.into();
        self
    }
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
    pub fn row_version(mut self) -> Self {
        self.row_version = true;
        self
    }
    pub fn default_value(mut self, default: impl Into<Cow<'static, str>>) -> Self {
        self.default = Some(default.into());
        self
    }
    pub fn custom_select(mut self, expression: impl Into<Cow<'static, str>>) -> Self {
        self.custom_select = Some(expression.into());
        self
    }
    pub fn references(mut self, target: fn() -> &'static TableSchema) -> Self {
        self.references = Some(target);
        self
    }
    pub fn enum_repr(mut self, repr: EnumRepr) -> Self {
        self.enum_repr = repr;
        self
    }
    /// Matches either the field or the column name, ignoring ASCII case.
    pub fn is_named(&self, name: &str) -> bool {
        self.field.eq_ignore_ascii_case(name) || self.name().eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// At most one related entity (`Option<T>` or `T` field).
    One,
    /// Any number of related entities (`Vec<T>` field).
    Many,
}

/// A field holding related entities, loaded by the reference loader.
#[derive(Debug, Clone)]
pub struct ReferenceDef {
    pub field: Cow<'static, str>,
    pub kind: ReferenceKind,
    pub target: fn() -> &'static TableSchema,
}

impl ReferenceDef {
    pub fn new(
        field: impl Into<Cow<'static, str>>,
        kind: ReferenceKind,
        target: fn() -> &'static TableSchema,
    ) -> Self {
        Self {
            field: field.into(),
            kind,
            target,
        }
    }
}

/// Immutable description of an entity type.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Snake case name of the entity type, used by naming conventions.
    pub type_name: Cow<'static, str>,
    pub table: TableRef,
    pub columns: Vec<ColumnDef>,
    pub references: Vec<ReferenceDef>,
}

impl TableSchema {
    pub fn builder(type_name: impl Into<Cow<'static, str>>) -> TableSchemaBuilder {
        let type_name = type_name.into();
        TableSchemaBuilder {
            schema: TableSchema {
                table: TableRef::new(type_name.clone()),
                type_name,
                columns: Vec::new(),
                references: Vec::new(),
            },
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.field == name)
            .or_else(|| self.columns.iter().find(|c| c.is_named(name)))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.field == name)
            .or_else(|| self.columns.iter().position(|c| c.is_named(name)))
    }

    /// The single primary key column.
    pub fn primary_key(&self) -> Result<&ColumnDef> {
        let mut keys = self.columns.iter().filter(|c| c.primary_key);
        match (keys.next(), keys.next()) {
            (Some(key), None) => Ok(key),
            (None, _) => Err(ErrorKind::schema(
                self.table.name.clone(),
                "no primary key is defined, mark a field with #[sluice(primary_key)] or name it `id`",
            )),
            (Some(..), Some(..)) => Err(ErrorKind::schema(
                self.table.name.clone(),
                "more than one primary key column is defined",
            )),
        }
    }

    pub fn primary_key_index(&self) -> Result<usize> {
        let key = self.primary_key()?;
        Ok(self
            .columns
            .iter()
            .position(|c| std::ptr::eq(c, key))
            .unwrap_or_default())
    }

    /// The row version column, if the entity has one.
    pub fn row_version(&self) -> Result<Option<&ColumnDef>> {
        let mut versions = self.columns.iter().filter(|c| c.row_version);
        match (versions.next(), versions.next()) {
            (None, _) => Ok(None),
            (Some(v), None) => Ok(Some(v)),
            (Some(..), Some(..)) => Err(ErrorKind::schema(
                self.table.name.clone(),
                "more than one row version column is defined",
            )),
        }
    }

    pub fn auto_increment(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.auto_increment)
    }

    /// Column of this table pointing to `target`: an explicit reference first,
    /// then the `{target}_id` naming convention.
    pub fn foreign_key_to(&self, target: &TableSchema) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.references.is_some_and(|f| f().same_entity(target)))
            .or_else(|| {
                let name = format!("{}_id", target.type_name);
                self.columns.iter().find(|c| {
                    !(c.primary_key && self.same_entity(target))
                        && c.references.is_none()
                        && (c.field.eq_ignore_ascii_case(&name)
                            || c.name().eq_ignore_ascii_case(&name))
                })
            })
    }

    pub fn reference(&self, field: &str) -> Option<&ReferenceDef> {
        self.references.iter().find(|r| r.field == field)
    }

    pub fn same_entity(&self, other: &TableSchema) -> bool {
        std::ptr::eq(self, other)
            || (self.type_name == other.type_name && self.table == other.table)
    }
}

pub struct TableSchemaBuilder {
    schema: TableSchema,
}

impl TableSchemaBuilder {
    pub fn table(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.schema.table.name = name.into();
        self
    }
    pub fn schema(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.schema.table.schema = name.into();
        self
    }
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.schema.columns.push(column);
        self
    }
    pub fn reference(mut self, reference: ReferenceDef) -> Self {
        self.schema.references.push(reference);
        self
    }
    /// Finish the description, columns get their table and, when no field is
    /// marked as primary key, `id` or `{type}_id` becomes the primary key.
    pub fn build(mut self) -> TableSchema {
        let schema = &mut self.schema;
        for column in &mut schema.columns {
            column.column_ref.table = schema.table.name.clone();
            column.column_ref.schema = schema.table.schema.clone();
        }
        if !schema.columns.iter().any(|c| c.primary_key) {
            let conventional = format!("{}_id", schema.type_name);
            let position = schema
                .columns
                .iter()
                .position(|c| c.field.eq_ignore_ascii_case("id"))
                .or_else(|| {
                    schema
                        .columns
                        .iter()
                        .position(|c| c.field.eq_ignore_ascii_case(&conventional))
                });
            if let Some(position) = position {
                schema.columns[position].primary_key = true;
            }
        }
        self.schema
    }
}

/// The description of an entity type, computed once per process.
pub fn describe<E: Entity>() -> &'static TableSchema {
    E::schema()
}
