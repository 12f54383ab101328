#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{
        Entity, ErrorKind, GenericSqlWriter, SelectQuery, SqlWriter, Value, col, col_of, count_all,
    };

    const WRITER: GenericSqlWriter = GenericSqlWriter {};

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[sluice(table = "authors")]
    struct Author {
        id: i64,
        name: String,
        country: String,
    }

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[sluice(table = "books")]
    struct Book {
        id: i64,
        author_id: i64,
        title: String,
        pages: i32,
        price: f64,
    }

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[sluice(table = "reviews")]
    struct Review {
        id: i64,
        #[sluice(references = Book)]
        subject: i64,
        stars: i32,
    }

    #[test]
    fn join_from_foreign_keys() {
        let query = Book::query()
            .join::<Author>()
            .filter(col("author.country").eq("IT").and(col("pages").gt(100)));
        let statement = WRITER.select_statement(&query).unwrap();
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "books"."id", "books"."author_id", "books"."title", "books"."pages", "books"."price"
                FROM "books"
                INNER JOIN "authors" ON "books"."author_id" = "authors"."id"
                WHERE "authors"."country" = @0 AND "books"."pages" > @1
            "#}
            .trim()
        );

        // Unqualified members are searched in the joined tables too
        let query = Book::query()
            .left_join::<Author>()
            .select_columns(["title", "name"]);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT "books"."title", "authors"."name"
                FROM "books"
                LEFT JOIN "authors" ON "books"."author_id" = "authors"."id"
            "#}
            .trim()
        );

        // Explicit references work in both directions
        let query = Review::query().join::<Book>().filter(col("stars").ge(4));
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT "reviews"."id", "reviews"."subject", "reviews"."stars"
                FROM "reviews"
                INNER JOIN "books" ON "reviews"."subject" = "books"."id"
                WHERE "reviews"."stars" >= @0
            "#}
            .trim()
        );
        let query = Author::query().join::<Book>().join::<Review>();
        assert!(
            WRITER.select_statement(&query).unwrap().sql.ends_with(indoc! {r#"
                INNER JOIN "books" ON "books"."author_id" = "authors"."id"
                INNER JOIN "reviews" ON "reviews"."subject" = "books"."id""#}),
        );
    }

    #[test]
    fn join_with_aliases() {
        let query = Book::query()
            .alias("b")
            .join::<Author>()
            .join_alias("a")
            .select_columns(["b.title", "a.name"])
            .filter(col("a.name").eq("Le Guin"))
            .order_by(col("b.title"));
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT "b"."title", "a"."name"
                FROM "books" "b"
                INNER JOIN "authors" "a" ON "b"."author_id" = "a"."id"
                WHERE "a"."name" = @0
                ORDER BY "b"."title"
            "#}
            .trim()
        );

        let query = Review::query().join_on::<Book>(
            col_of("reviews", "subject")
                .eq(col_of("books", "id"))
                .and(col("books.pages").gt(10)),
        );
        assert!(
            WRITER
                .select_statement(&query)
                .unwrap()
                .sql
                .ends_with(r#"INNER JOIN "books" ON "reviews"."subject" = "books"."id" AND "books"."pages" > @0"#)
        );
    }

    #[test]
    fn join_without_relationship() {
        let error = WRITER
            .select_statement(&Author::query().join::<Review>())
            .expect_err("Authors and reviews are not related");
        assert!(matches!(
            ErrorKind::of(&error),
            Some(ErrorKind::Mapping(..))
        ));
        assert!(format!("{error:#}").contains("reviews"));
    }

    #[test]
    fn aggregates() {
        let query = Book::query()
            .select([
                col("author_id").into(),
                count_all().alias("books"),
                col("pages").sum().alias("total"),
            ])
            .group_by([col("author_id")])
            .having(count_all().gt(2))
            .order_by(col("author_id").desc());
        let statement = WRITER.select_statement(&query).unwrap();
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "author_id", COUNT(*) AS "books", SUM("pages") AS "total"
                FROM "books"
                GROUP BY "author_id"
                HAVING COUNT(*) > @0
                ORDER BY "author_id" DESC
            "#}
            .trim()
        );
        assert_eq!(
            statement.params.values().collect::<Vec<_>>(),
            [&Value::Int32(Some(2))]
        );
    }

    #[test]
    fn ordering() {
        let query = Book::query()
            .select_distinct(["title"])
            .order_by(col("pages"))
            .order_by(col("title"))
            .then_by_descending(col("pages"));
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT DISTINCT "title"
                FROM "books"
                ORDER BY "title", "pages" DESC
            "#}
            .trim()
        );
    }

    #[test]
    fn pagination() {
        let query = Book::query().order_by(col("title")).skip(20).take(10);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT "id", "author_id", "title", "pages", "price"
                FROM "books"
                ORDER BY "title"
                LIMIT 10
                OFFSET 20
            "#}
            .trim()
        );
        let query = query.skip(0).take(5);
        assert!(
            WRITER
                .select_statement(&query)
                .unwrap()
                .sql
                .ends_with("ORDER BY \"title\"\nLIMIT 5")
        );
        let query = query.clear_limits();
        assert!(!query.is_paginated());
        assert!(
            WRITER
                .select_statement(&query)
                .unwrap()
                .sql
                .ends_with("ORDER BY \"title\"")
        );
    }

    #[test]
    fn counts() {
        let query = Book::query()
            .filter(col("pages").gt(100))
            .order_by(col("title"));
        assert_eq!(
            query.to_count_statement(&WRITER).unwrap().sql,
            indoc! {r#"
                SELECT COUNT(*)
                FROM "books"
                WHERE "pages" > @0
            "#}
            .trim()
        );
        let query = Book::query().select_distinct(["author_id"]).order_by(col("author_id"));
        assert_eq!(
            query.to_count_statement(&WRITER).unwrap().sql,
            indoc! {r#"
                SELECT COUNT(*) FROM (
                SELECT DISTINCT "author_id"
                FROM "books"
                ) "_count"
            "#}
            .trim()
        );
    }

    #[test]
    fn subqueries_keep_parameter_order() {
        let query = Author::query()
            .filter(col("country").eq("IT"))
            .filter(
                col("id").in_query(
                    Book::query()
                        .select_columns(["author_id"])
                        .filter(col("pages").gt(300)),
                ),
            )
            .filter(col("name").ne("Anonymous"));
        let statement = WRITER.select_statement(&query).unwrap();
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "id", "name", "country"
                FROM "authors"
                WHERE "country" = @0 AND "id" IN (SELECT "author_id"
                FROM "books"
                WHERE "pages" > @1) AND "name" <> @2
            "#}
            .trim()
        );
        assert_eq!(
            statement.params.into_values(),
            [
                Value::Varchar(Some("IT".into())),
                Value::Int32(Some(300)),
                Value::Varchar(Some("Anonymous".into())),
            ]
        );
    }

    #[test]
    fn builder_is_reusable() {
        let query = SelectQuery::from::<Book>().filter(col("pages").gt(100));
        let first = query.to_statement(&WRITER).unwrap();
        let second = query.to_statement(&WRITER).unwrap();
        assert_eq!(first.sql, second.sql);
        assert_eq!(first.params, second.params);

        let narrowed = query.clone().and(col("price").lt(20.0));
        assert_eq!(narrowed.to_statement(&WRITER).unwrap().params.len(), 2);
        assert_eq!(query.to_statement(&WRITER).unwrap().params.len(), 1);

        let widened = query.or(col("title").eq("Dune"));
        assert!(
            widened
                .to_statement(&WRITER)
                .unwrap()
                .sql
                .ends_with(r#"WHERE "pages" > @0 OR "title" = @1"#)
        );
    }

    #[test]
    fn inline_values() {
        let query = Book::query()
            .filter(col("title").eq("O'Brien").and(col("pages").ge(10)))
            .inline_values(true);
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(
            statement
                .sql
                .ends_with(r#"WHERE "title" = 'O''Brien' AND "pages" >= 10"#),
            "{}",
            statement.sql
        );
        assert!(statement.params.is_empty());
    }
}
