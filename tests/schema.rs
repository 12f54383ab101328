#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{
        ColumnDef, Entity, EnumRepr, ErrorKind, GenericSqlWriter, ReferenceKind, SqlEnum,
        SqlWriter, TableSchema, Value, impl_as_value_enum,
    };

    const WRITER: GenericSqlWriter = GenericSqlWriter {};

    #[derive(Default, Debug, Clone, Copy, PartialEq)]
    enum Status {
        #[default]
        Draft = 1,
        Published = 2,
    }
    impl SqlEnum for Status {
        const VARIANTS: &'static [Self] = &[Status::Draft, Status::Published];
        fn name(&self) -> &'static str {
            match self {
                Status::Draft => "Draft",
                Status::Published => "Published",
            }
        }
        fn ordinal(&self) -> i64 {
            *self as i64
        }
    }
    impl_as_value_enum!(Status);

    #[derive(Entity, Default, Debug, Clone)]
    #[sluice(table = "stock_items", schema = "inventory")]
    struct StockItem {
        #[sluice(primary_key, auto_increment)]
        item_id: i64,
        #[sluice(name = "label")]
        title: String,
        #[sluice(default = "0")]
        quantity: Option<i32>,
        #[sluice(select = "quantity * 2")]
        doubled: i32,
        #[sluice(row_version)]
        revision: u64,
        #[sluice(ignore)]
        cache: Vec<String>,
        #[sluice(enum_as = "ordinal")]
        status: Status,
        _kind: String,
    }

    #[derive(Entity, Default)]
    struct OrderLine {
        id: i64,
        description: String,
    }

    #[derive(Entity, Default)]
    struct Tag {
        label: String,
        tag_id: i64,
    }

    #[derive(Entity, Default)]
    struct Note {
        body: String,
    }

    #[derive(Entity, Default)]
    struct Shelf {
        id: i64,
        #[sluice(reference)]
        items: Vec<OrderLine>,
        #[sluice(reference)]
        tag: Option<Tag>,
    }

    #[test]
    fn attributes() {
        let schema = StockItem::schema();
        assert_eq!(schema.type_name, "stock_item");
        assert_eq!(schema.table.name, "stock_items");
        assert_eq!(schema.table.schema, "inventory");
        let names: Vec<_> = schema.columns.iter().map(ColumnDef::name).collect();
        assert_eq!(
            names,
            ["item_id", "label", "quantity", "doubled", "revision", "status", "kind"]
        );
        let key = schema.primary_key().unwrap();
        assert_eq!(key.field, "item_id");
        assert!(key.auto_increment);
        assert_eq!(schema.auto_increment().map(|c| c.name()), Some("item_id"));

        let title = schema.column("title").unwrap();
        assert_eq!(title.name(), "label");
        assert!(std::ptr::eq(title, schema.column("LABEL").unwrap()));
        assert_eq!(schema.column_index("label"), Some(1));
        assert!(!title.nullable);

        let quantity = schema.column("quantity").unwrap();
        assert!(quantity.nullable);
        assert_eq!(quantity.default.as_deref(), Some("0"));
        assert_eq!(quantity.value, Value::Int32(None));

        assert_eq!(
            schema.column("doubled").unwrap().custom_select.as_deref(),
            Some("quantity * 2")
        );
        assert_eq!(
            schema.row_version().unwrap().map(|c| c.name()),
            Some("revision")
        );
        assert_eq!(schema.column("status").unwrap().enum_repr, EnumRepr::Ordinal);
        assert!(schema.column("cache").is_none());
    }

    #[test]
    fn conventions() {
        let schema = OrderLine::schema();
        assert_eq!(schema.table.name, "order_line");
        assert_eq!(schema.table.schema, "");
        assert_eq!(schema.primary_key().unwrap().name(), "id");

        // `{type}_id` is the key when there is no `id`
        assert_eq!(Tag::schema().primary_key().unwrap().name(), "tag_id");
        assert_eq!(Tag::schema().primary_key_index().unwrap(), 1);

        let error = Note::schema()
            .primary_key()
            .expect_err("Note has no key");
        assert!(
            matches!(ErrorKind::of(&error), Some(ErrorKind::Schema { table, .. }) if table == "note"),
            "{error:#}"
        );
    }

    #[test]
    fn invalid_descriptions() {
        let schema = TableSchema::builder("twin")
            .column(ColumnDef::new("id", Value::Int64(None)))
            .column(ColumnDef::new("first", Value::UInt64(None)).row_version())
            .column(ColumnDef::new("second", Value::UInt64(None)).row_version())
            .build();
        assert!(schema.primary_key().is_ok());
        let error = schema.row_version().expect_err("Two row versions");
        assert!(format!("{error:#}").contains("more than one row version"));

        let schema = TableSchema::builder("pair")
            .column(ColumnDef::new("a", Value::Int64(None)).primary_key())
            .column(ColumnDef::new("b", Value::Int64(None)).primary_key())
            .build();
        let error = schema.primary_key().expect_err("Two keys");
        assert!(format!("{error:#}").contains("more than one primary key"));
    }

    #[test]
    fn references() {
        let schema = Shelf::schema();
        assert_eq!(schema.columns.len(), 1);
        assert_eq!(schema.references.len(), 2);
        let items = schema.reference("items").unwrap();
        assert_eq!(items.kind, ReferenceKind::Many);
        assert!((items.target)().same_entity(OrderLine::schema()));
        assert_eq!(schema.reference("tag").unwrap().kind, ReferenceKind::One);
    }

    #[test]
    fn computed_columns() {
        let statement = WRITER
            .select_statement(&StockItem::query())
            .unwrap();
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "item_id", "label", "quantity", (quantity * 2) AS "doubled", "revision", "status", "kind"
                FROM "inventory"."stock_items"
            "#}
            .trim()
        );
        let item = StockItem {
            title: "Bolt".into(),
            doubled: 8,
            status: Status::Published,
            ..Default::default()
        };
        let statement = WRITER
            .insert_statement(StockItem::schema(), &[item.row()], None)
            .unwrap();
        assert_eq!(
            statement.sql,
            r#"INSERT INTO "inventory"."stock_items" ("label", "quantity", "revision", "status", "kind") VALUES (@0, DEFAULT, @1, @2, @3)"#
        );
        assert_eq!(
            statement.params.into_values(),
            [
                Value::Varchar(Some("Bolt".into())),
                Value::UInt64(Some(1)),
                Value::Int64(Some(2)),
                Value::Varchar(Some("".into())),
            ]
        );
    }

    #[test]
    fn row_values() {
        let item = StockItem {
            item_id: 4,
            title: "Nut".into(),
            quantity: Some(3),
            cache: vec!["ignored".into()],
            ..Default::default()
        };
        let row = item.row();
        assert_eq!(row.len(), StockItem::schema().columns.len());
        assert_eq!(row[0], Value::Int64(Some(4)));
        assert_eq!(row[2], Value::Int32(Some(3)));
        assert_eq!(item.key().unwrap(), Value::Int64(Some(4)));

        let mut item = item;
        item.set_column("LABEL", Value::Varchar(Some("Washer".into())))
            .unwrap();
        assert_eq!(item.title, "Washer");
        item.set_column("status", Value::Int64(Some(2))).unwrap();
        assert_eq!(item.status, Status::Published);
        assert!(item.set_column("cache", Value::Null).is_err());
    }
}
