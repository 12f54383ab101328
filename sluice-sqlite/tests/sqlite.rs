#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{Capture, Entity, SqlWriter, col, param};
    use sluice_sqlite::{SqliteDriver, SqliteSqlWriter};
    use sluice_tests::{execute_tests, init_logs};

    const WRITER: SqliteSqlWriter = SqliteSqlWriter {};

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[sluice(table = "books")]
    struct Book {
        #[sluice(primary_key, auto_increment)]
        id: i64,
        title: String,
        #[sluice(default = "0")]
        pages: Option<i32>,
        available: bool,
        cover: Option<Vec<u8>>,
    }

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[sluice(table = "notes")]
    struct Note {
        id: i64,
        body: String,
        #[sluice(row_version)]
        version: u64,
    }

    #[tokio::test]
    async fn sqlite() {
        init_logs();
        execute_tests(Capture::new(SqliteDriver::new())).await;
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
                SELECT "id", "title", "pages", "available", "cover"
                FROM "books"
                WHERE "pages" > ?1 AND "available" = 1
                ORDER BY "title"
                LIMIT 5
                OFFSET 10
            "#}
            .trim()
        );
        let query = Book::query().skip(3);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {r#"
                SELECT "id", "title", "pages", "available", "cover"
                FROM "books"
                LIMIT -1
                OFFSET 3
            "#}
            .trim()
        );
    }

    #[test]
    fn literals() {
        let query = Book::query()
            .filter(
                col("title")
                    .eq("O'Hara")
                    .and(col("cover").eq(vec![0xCAu8, 0xFE])),
            )
            .inline_values(true);
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(
            statement
                .sql
                .ends_with(r#"WHERE "title" = 'O''Hara' AND "cover" = X'CAFE'"#),
            "{}",
            statement.sql
        );
    }

    #[test]
    fn insert_defaults() {
        let books = [
            Book {
                title: "Dune".into(),
                available: true,
                ..Default::default()
            },
            Book {
                title: "Emma".into(),
                pages: Some(474),
                ..Default::default()
            },
        ];
        let rows: Vec<_> = books.iter().map(Entity::row).collect();
        let statement = WRITER
            .insert_statement(Book::schema(), &rows, None)
            .unwrap();
        assert_eq!(
            statement.sql,
            indoc! {r#"
                INSERT INTO "books" ("title", "pages", "available", "cover") VALUES (?1, 0, 1, NULL),
                (?2, ?3, 0, NULL)
            "#}
            .trim()
        );
    }

    #[test]
    fn row_version() {
        let note = Note {
            id: 3,
            body: "Remember".into(),
            version: 7,
        };
        let (statement, versioned) = WRITER
            .update_statement(Note::schema(), &note.row(), None)
            .unwrap();
        assert!(versioned);
        assert_eq!(
            statement.sql,
            indoc! {r#"
                UPDATE "notes" SET "body" = ?1, "version" = "version" + 1
                WHERE "id" = ?2 AND "version" = ?3
            "#}
            .trim()
        );
        let statement = WRITER
            .insert_statement(Note::schema(), &[note.row()], None)
            .unwrap();
        assert_eq!(
            statement.sql,
            r#"INSERT INTO "notes" ("id", "body", "version") VALUES (?1, ?2, ?3)"#
        );
    }

    #[test]
    fn named_parameters() {
        let query = Book::query().filter(
            col("title")
                .eq(param("name", String::from("Dune")))
                .or(col("title").eq(param("name", String::from("Dune")))),
        );
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(
            statement
                .sql
                .ends_with(r#"WHERE "title" = :name OR "title" = :name"#),
            "{}",
            statement.sql
        );
        assert_eq!(statement.params.names().collect::<Vec<_>>(), [":name"]);
    }

    #[test]
    fn like_escape() {
        let query = Book::query().filter(col("title").contains("100%"));
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(
            statement.sql.ends_with(r#"WHERE "title" LIKE ?1 ESCAPE '^'"#),
            "{}",
            statement.sql
        );
        assert_eq!(
            statement.params.values().next(),
            Some(&sluice::Value::Varchar(Some("%100^%%".into())))
        );
    }
}
