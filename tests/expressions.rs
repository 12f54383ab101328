#[cfg(test)]
mod tests {
    use sluice::{
        Entity, ErrorKind, Expr, GenericSqlWriter, SqlWriter, Value, col, count_all, eval, func,
        null, sql, val, when,
    };

    const WRITER: GenericSqlWriter = GenericSqlWriter {};

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    struct Item {
        id: i64,
        name: String,
        price: f64,
        quantity: i32,
        discontinued: bool,
        note: Option<String>,
    }

    /// The text after `WHERE` (empty when there is no condition) and the parameters.
    fn filter(condition: Expr) -> (String, Vec<Value>) {
        let statement = WRITER
            .select_statement(&Item::query().filter(condition))
            .expect("Failed to write the query");
        let sql = statement
            .sql
            .split_once("\nWHERE ")
            .map(|(_, v)| v.to_owned())
            .unwrap_or_default();
        (sql, statement.params.values().cloned().collect())
    }

    fn projection(expressions: impl IntoIterator<Item = sluice::Projected>) -> String {
        let statement = WRITER
            .select_statement(&Item::query().select(expressions))
            .expect("Failed to write the query");
        statement
            .sql
            .strip_prefix("SELECT ")
            .and_then(|v| v.split_once("\nFROM"))
            .map(|(v, _)| v.to_owned())
            .unwrap_or_default()
    }

    #[test]
    fn precedence() {
        let (sql, params) = filter(
            col("price")
                .mul(col("quantity"))
                .gt(100)
                .and(col("name").eq("a").or(col("name").eq("b"))),
        );
        assert_eq!(
            sql,
            r#""price" * "quantity" > @0 AND ("name" = @1 OR "name" = @2)"#
        );
        assert_eq!(
            params,
            [
                Value::Int32(Some(100)),
                Value::Varchar(Some("a".into())),
                Value::Varchar(Some("b".into())),
            ]
        );

        let (sql, _) = filter(col("price").sub(col("quantity").sub(1)).gt(0));
        assert_eq!(sql, r#""price" - ("quantity" - @0) > @1"#);
        let (sql, _) = filter(col("price").sub(col("quantity")).sub(1).gt(0));
        assert_eq!(sql, r#""price" - "quantity" - @0 > @1"#);
        let (sql, _) = filter(col("price").mul(col("quantity").add(1)).ge(10));
        assert_eq!(sql, r#""price" * ("quantity" + @0) >= @1"#);
        let (sql, _) = filter(col("name").eq("a").or(col("name").eq("b")).and(col("quantity").lt(3)));
        assert_eq!(sql, r#"("name" = @0 OR "name" = @1) AND "quantity" < @2"#);
    }

    #[test]
    fn constants_are_folded() {
        let (sql, params) = filter(val(2).mul(3).add(col("quantity")).lt(10));
        assert_eq!(sql, r#"@0 + "quantity" < @1"#);
        assert_eq!(params, [Value::Int64(Some(6)), Value::Int32(Some(10))]);

        let (sql, params) = filter(col("name").eq(val("abc").upper()));
        assert_eq!(sql, r#""name" = @0"#);
        assert_eq!(params, [Value::Varchar(Some("ABC".into()))]);

        let (sql, params) = filter(col("name").eq(val("sl").concat("uice")));
        assert_eq!(sql, r#""name" = @0"#);
        assert_eq!(params, [Value::Varchar(Some("sluice".into()))]);

        let limit = 5;
        let (sql, params) = filter(col("quantity").lt(eval(move || limit * 2)));
        assert_eq!(sql, r#""quantity" < @0"#);
        assert_eq!(params, [Value::Int32(Some(10))]);

        // Conditions known on the host disappear
        assert_eq!(filter(val(3).gt(2)).0, "");
        assert_eq!(filter(val(3).lt(2)).0, "(1=0)");
    }

    #[test]
    fn string_constants() {
        let (sql, params) = filter(val("Lamp").eq(col("name")));
        assert_eq!(sql, r#""name" = @0"#);
        assert_eq!(params, [Value::Varchar(Some("Lamp".into()))]);
        assert_eq!(
            filter(val("Lamp").eq(col("name"))),
            filter(val(String::from("Lamp")).eq(col("name")))
        );
        assert_eq!(filter(val("Lamp").eq("Lamp")).0, "");
    }

    #[test]
    fn comparisons_are_mirrored() {
        let (sql, params) = filter(val(5).lt(col("quantity")));
        assert_eq!(sql, r#""quantity" > @0"#);
        assert_eq!(params, [Value::Int32(Some(5))]);
        let (sql, _) = filter(val(5).ge(col("quantity")));
        assert_eq!(sql, r#""quantity" <= @0"#);
        let (sql, _) = filter(val("x").eq(col("name")));
        assert_eq!(sql, r#""name" = @0"#);
    }

    #[test]
    fn negation() {
        assert_eq!(filter(!col("name").eq("x")).0, r#"NOT ("name" = @0)"#);
        assert_eq!(filter(!col("note").is_null()).0, r#""note" IS NOT NULL"#);
        assert_eq!(
            filter(!col("quantity").in_list([1, 2])).0,
            r#""quantity" NOT IN (@0, @1)"#
        );
        let (sql, params) = filter(!col("name").starts_with("a"));
        assert_eq!(sql, r#""name" NOT LIKE @0"#);
        assert_eq!(params, [Value::Varchar(Some("a%".into()))]);
        assert_eq!(filter(!!col("discontinued")).0, r#""discontinued" = TRUE"#);
        assert_eq!(filter(!col("discontinued")).0, r#"NOT ("discontinued" = TRUE)"#);
    }

    #[test]
    fn nulls() {
        assert_eq!(filter(col("note").eq(null())).0, r#""note" IS NULL"#);
        assert_eq!(filter(null().eq(col("note"))).0, r#""note" IS NULL"#);
        assert_eq!(
            filter(col("note").ne(Option::<String>::None)).0,
            r#""note" IS NOT NULL"#
        );
        let (sql, params) = filter(col("note").eq(Some("kept".to_string())));
        assert_eq!(sql, r#""note" = @0"#);
        assert_eq!(params, [Value::Varchar(Some("kept".into()))]);
        assert_eq!(
            filter(val(Option::<String>::None).coalesce(col("note")).is_null()).0,
            r#""note" IS NULL"#
        );
    }

    #[test]
    fn booleans() {
        assert_eq!(filter(col("discontinued")).0, r#""discontinued" = TRUE"#);
        assert_eq!(filter(col("discontinued").eq(false)).0, r#""discontinued" = FALSE"#);
        let (sql, params) = filter(col("price").gt(1).eq(false));
        assert_eq!(sql, r#"NOT ("price" > @0)"#);
        assert_eq!(params, [Value::Int32(Some(1))]);
        assert_eq!(filter(col("price").gt(1).eq(true)).0, r#""price" > @0"#);
        let (sql, params) = filter(val(true).and(col("name").eq("kept")));
        assert!(sql.ends_with(r#""name" = @0"#), "{sql}");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn in_lists() {
        let (sql, params) = filter(col("quantity").in_list([1, 2, 3]));
        assert_eq!(sql, r#""quantity" IN (@0, @1, @2)"#);
        assert_eq!(params.len(), 3);
        assert_eq!(filter(col("quantity").in_list(Vec::<i32>::new())).0, "(1=0)");
        assert_eq!(filter(col("quantity").not_in_list(Vec::<i32>::new())).0, "");
        assert_eq!(filter(val(2).in_list([1, 2])).0, "");
        assert_eq!(filter(val(4).in_list([1, 2])).0, "(1=0)");
    }

    #[test]
    fn like() {
        let (sql, params) = filter(col("name").contains("50%_off"));
        assert_eq!(sql, r#""name" LIKE @0 ESCAPE '^'"#);
        assert_eq!(params, [Value::Varchar(Some("%50^%^_off%".into()))]);
        let (sql, params) = filter(col("name").ends_with("box"));
        assert_eq!(sql, r#""name" LIKE @0"#);
        assert_eq!(params, [Value::Varchar(Some("%box".into()))]);
        let (sql, params) = filter(col("name").starts_with(col("note")));
        assert_eq!(sql, r#""name" LIKE "note" || @0"#);
        assert_eq!(params, [Value::Varchar(Some("%".into()))]);
        assert_eq!(filter(col("name").like("a_c")).0, r#""name" LIKE @0"#);
        assert_eq!(filter(val("sluice").starts_with("slu")).0, "");
        assert_eq!(filter(col("name").contains(null())).0, "(1=0)");
    }

    #[test]
    fn arithmetic_and_functions() {
        let (sql, params) = filter((-col("price")).lt(-val(3)));
        assert_eq!(sql, r#"-"price" < @0"#);
        assert_eq!(params, [Value::Int64(Some(-3))]);
        assert_eq!(filter((-(col("price").add(1))).lt(0)).0, r#"-("price" + @0) < @1"#);
        assert_eq!(
            filter(col("note").coalesce("none").eq("x")).0,
            r#"COALESCE("note", @0) = @1"#
        );
        assert_eq!(
            filter(func("ROUND", [col("price"), val(2)]).gt(10)).0,
            r#"ROUND("price", @0) > @1"#
        );
        assert_eq!(
            filter(col("name").trim().length().ge(3)).0,
            r#"LENGTH(TRIM("name")) >= @0"#
        );
    }

    #[test]
    fn projections() {
        assert_eq!(
            projection([
                when(col("quantity").gt(0), col("price"), 0.0).alias("available_price"),
                col("name").count_distinct().into(),
                sql("CURRENT_TIMESTAMP").alias("now"),
            ]),
            r#"CASE WHEN "quantity" > @0 THEN "price" ELSE @1 END AS "available_price", COUNT(DISTINCT "name"), CURRENT_TIMESTAMP AS "now""#
        );
        // A condition known on the host selects the branch
        assert_eq!(
            projection([when(val(1).lt(2), col("price"), col("quantity")).into()]),
            r#""price""#
        );
        assert_eq!(
            projection([count_all().into(), col("price").avg().alias("average")]),
            r#"COUNT(*), AVG("price") AS "average""#
        );
        assert_eq!(
            projection([col("price").gt(10).alias("expensive")]),
            r#""price" > @0 AS "expensive""#
        );
    }

    #[test]
    fn members() {
        assert_eq!(filter(col("item.name").eq("a")).0, r#""name" = @0"#);
        let error = WRITER
            .select_statement(&Item::query().filter(col("missing").eq(1)))
            .expect_err("An unknown member must fail");
        assert!(
            matches!(ErrorKind::of(&error), Some(ErrorKind::Mapping(..))),
            "{error:#}"
        );
        assert!(format!("{error:#}").contains("missing"));
        let error = WRITER
            .select_statement(&Item::query().filter(col("other.name").eq(1)))
            .expect_err("An unknown table must fail");
        assert!(format!("{error:#}").contains("other"));
    }
}
