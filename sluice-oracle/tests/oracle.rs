#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{Capture, Entity, SqlWriter, col};
    use sluice_oracle::{OracleDriver, OracleSqlWriter};
    use sluice_tests::{execute_tests, init_logs};
    use time::macros::{date, datetime};

    const WRITER: OracleSqlWriter = OracleSqlWriter {};

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[sluice(table = "books")]
    struct Book {
        #[sluice(primary_key, auto_increment)]
        id: i64,
        title: String,
        pages: i32,
        available: bool,
        cover: Option<Vec<u8>>,
    }

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[sluice(table = "shelves")]
    struct Shelf {
        id: i64,
        label: String,
    }

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[sluice(table = "volumes")]
    struct Volume {
        id: i64,
        shelf_id: i64,
        label: String,
    }

    #[tokio::test]
    async fn oracle() {
        init_logs();
        execute_tests(Capture::new(OracleDriver::new())).await;
    }

    #[test]
    fn select_page() {
        let query = Book::query()
            .filter(col("pages").gt(100).and(col("available")))
            .order_by(col("title"))
            .skip(10)
            .take(5);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT "_q2"."id", "_q2"."title", "_q2"."pages", "_q2"."available", "_q2"."cover" FROM (
                SELECT "_q1".*, ROWNUM "_rn" FROM (
                SELECT "id", "title", "pages", "available", "cover"
                FROM "books"
                WHERE "pages" > :1 AND "available" = 1
                ORDER BY "title"
                ) "_q1"
                WHERE ROWNUM <= 15
                ) "_q2"
                WHERE "_q2"."_rn" > 10
            "#}
            .trim()
        );
    }

    #[test]
    fn select_page_of_expressions() {
        let query = Book::query()
            .select([col("title").upper(), col("pages")])
            .take(2);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT "_q2"."_c0", "_q2"."pages" FROM (
                SELECT "_q1".*, ROWNUM "_rn" FROM (
                SELECT UPPER("title") AS "_c0", "pages"
                FROM "books"
                ) "_q1"
                WHERE ROWNUM <= 2
                ) "_q2"
            "#}
            .trim()
        );
    }

    #[test]
    fn select_page_of_joined_columns() {
        let query = Volume::query()
            .join::<Shelf>()
            .select_columns(["volume.label", "shelf.label"])
            .take(3);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT "_q2"."label", "_q2"."_c1" FROM (
                SELECT "_q1".*, ROWNUM "_rn" FROM (
                SELECT "volumes"."label", "shelves"."label" AS "_c1"
                FROM "volumes"
                INNER JOIN "shelves" ON "volumes"."shelf_id" = "shelves"."id"
                ) "_q1"
                WHERE ROWNUM <= 3
                ) "_q2"
            "#}
            .trim()
        );
        let query = Volume::query()
            .join::<Shelf>()
            .select([col("volume.id"), col("shelf.id"), col("shelf.label")])
            .take(1);
        assert!(
            WRITER
                .select_statement(&query)
                .unwrap()
                .sql
                .starts_with(r#"SELECT "_q2"."id", "_q2"."_c1", "_q2"."label" FROM ("#)
        );
    }

    #[test]
    fn literals() {
        let query = Book::query()
            .filter(
                col("cover")
                    .eq(vec![0xCAu8, 0xFE])
                    .and(col("title").ne(date!(2024 - 03 - 14)))
                    .and(col("title").ne(datetime!(2024-03-14 18:30:05.25))),
            )
            .inline_values(true);
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(
            statement.sql.ends_with(concat!(
                r#"WHERE "cover" = HEXTORAW('CAFE') AND "title" <> DATE '2024-03-14'"#,
                r#" AND "title" <> TIMESTAMP '2024-03-14 18:30:05.25'"#,
            )),
            "{}",
            statement.sql
        );
    }

    #[test]
    fn single_row_inserts() {
        let statement = WRITER
            .insert_statement(Book::schema(), &[Book::default().row()], None)
            .unwrap();
        assert_eq!(
            statement.sql,
            r#"INSERT INTO "books" ("title", "pages", "available", "cover") VALUES (:1, :2, 0, NULL)"#
        );
        assert!(!WRITER.supports_multi_row_insert());
    }
}
