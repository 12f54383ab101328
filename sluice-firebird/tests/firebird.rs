#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{Capture, Entity, SqlWriter, col, count_all};
    use sluice_firebird::{FirebirdDriver, FirebirdSqlWriter};
    use sluice_tests::{execute_tests, init_logs};

    const WRITER: FirebirdSqlWriter = FirebirdSqlWriter {};

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

    #[tokio::test]
    async fn firebird() {
        init_logs();
        execute_tests(Capture::new(FirebirdDriver::new())).await;
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
                SELECT FIRST 5 SKIP 10 "id", "title", "pages", "available", "cover"
                FROM "books"
                WHERE "pages" > ? AND "available" = 1
                ORDER BY "title"
            "#}
            .trim()
        );
        let query = Book::query().select_distinct(["title"]).skip(4);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT SKIP 4 DISTINCT "title"
                FROM "books"
            "#}
            .trim()
        );
    }

    #[test]
    fn count_of_page() {
        let query = Book::query().order_by(col("title")).take(5);
        assert_eq!(
            WRITER.count_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT COUNT(*) FROM (
                SELECT FIRST 5 "id", "title", "pages", "available", "cover"
                FROM "books"
                ORDER BY "title"
                ) "_count"
            "#}
            .trim()
        );
        let query = Book::query().select([count_all(), col("title").length().max()]);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT COUNT(*), MAX(CHAR_LENGTH("title"))
                FROM "books"
            "#}
            .trim()
        );
    }

    #[test]
    fn single_row_inserts() {
        let books = [
            Book {
                title: "Dune".into(),
                ..Default::default()
            },
            Book {
                title: "Emma".into(),
                ..Default::default()
            },
        ];
        let rows: Vec<_> = books.iter().map(Entity::row).collect();
        let statement = WRITER
            .insert_statement(Book::schema(), &rows, None)
            .unwrap();
        assert_eq!(statement.params.len(), 4);
        assert!(!WRITER.supports_multi_row_insert());
    }
}
