#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{Capture, Entity, SqlWriter, Value, col};
    use sluice_postgres::{PostgresDriver, PostgresSqlWriter};
    use sluice_tests::{execute_tests, init_logs};

    const WRITER: PostgresSqlWriter = PostgresSqlWriter {};

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
    #[sluice(table = "notes")]
    struct Note {
        id: i64,
        body: String,
        #[sluice(row_version)]
        version: u64,
    }

    #[tokio::test]
    async fn postgres() {
        init_logs();
        execute_tests(Capture::new(PostgresDriver::new())).await;
    }

    #[test]
    fn select_page() {
        let query = Book::query()
            .filter(col("pages").gt(100).and(col("available")))
            .order_by(col("title"))
            .skip(10)
            .take(5);
        let statement = WRITER.select_statement(&query).unwrap();
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "id", "title", "pages", "available", "cover"
                FROM "books"
                WHERE "pages" > $1 AND "available" = TRUE
                ORDER BY "title"
                LIMIT 5
                OFFSET 10
            "#}
            .trim()
        );
        assert_eq!(statement.params.names().collect::<Vec<_>>(), ["$1"]);
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
                .ends_with(r#"WHERE "title" = 'O''Hara' AND "cover" = '\xcafe'::bytea"#),
            "{}",
            statement.sql
        );
        assert!(statement.params.is_empty());
    }

    #[test]
    fn insert() {
        let book = Book {
            id: 0,
            title: "Dune".into(),
            pages: 412,
            available: true,
            cover: Some(vec![1, 2]),
        };
        let statement = WRITER
            .insert_statement(Book::schema(), &[book.row()], None)
            .unwrap();
        assert_eq!(
            statement.sql,
            r#"INSERT INTO "books" ("title", "pages", "available", "cover") VALUES ($1, $2, TRUE, $3)"#
        );
        assert_eq!(
            statement.params.values().cloned().collect::<Vec<_>>(),
            [
                Value::Varchar(Some("Dune".into())),
                Value::Int32(Some(412)),
                Value::Blob(Some([1, 2].into())),
            ]
        );
    }

    #[test]
    fn row_version() {
        let note = Note {
            id: 3,
            body: "Remember".into(),
            version: 1234,
        };
        let (statement, versioned) = WRITER
            .update_statement(Note::schema(), &note.row(), None)
            .unwrap();
        assert!(versioned);
        assert_eq!(
            statement.sql,
            indoc! {r#"
                UPDATE "notes" SET "body" = $1
                WHERE "id" = $2 AND int8in(xidout(xmin)) = $3
            "#}
            .trim()
        );
        let statement = WRITER
            .insert_statement(Note::schema(), &[note.row()], None)
            .unwrap();
        assert_eq!(
            statement.sql,
            r#"INSERT INTO "notes" ("id", "body") VALUES ($1, $2)"#
        );
        let statement = WRITER
            .row_version_statement(Note::schema(), Value::Int64(Some(3)))
            .unwrap();
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT int8in(xidout(xmin)) AS "version"
                FROM "notes"
                WHERE "id" = $1
            "#}
            .trim()
        );
    }

    #[test]
    fn named_parameters_repeat() {
        let query = Book::query().filter(
            col("title")
                .eq(sluice::param("name", String::from("Dune")))
                .or(col("title").eq(sluice::param("name", String::from("Dune")))),
        );
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(
            statement.sql.ends_with(r#"WHERE "title" = $1 OR "title" = $2"#),
            "{}",
            statement.sql
        );
        assert_eq!(statement.params.len(), 2);
    }
}
