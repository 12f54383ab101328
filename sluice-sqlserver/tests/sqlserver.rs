#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{Capture, Entity, SqlWriter, Value, col, when};
    use sluice_sqlserver::{SqlServerDriver, SqlServerSqlWriter};
    use sluice_tests::{execute_tests, init_logs};

    const WRITER: SqlServerSqlWriter = SqlServerSqlWriter {};

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
    async fn sqlserver() {
        init_logs();
        execute_tests(Capture::new(SqlServerDriver::new())).await;
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
            indoc! {"
                SELECT [id], [title], [pages], [available], [cover]
                FROM [books]
                WHERE [pages] > @0 AND [available] = 1
                ORDER BY [title]
                OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY
            "}
            .trim()
        );
        let query = Book::query().take(5);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {"
                SELECT TOP (5) [id], [title], [pages], [available], [cover]
                FROM [books]
            "}
            .trim()
        );
        let query = Book::query().skip(5);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {"
                SELECT [id], [title], [pages], [available], [cover]
                FROM [books]
                ORDER BY [id]
                OFFSET 5 ROWS
            "}
            .trim()
        );
    }

    #[test]
    fn select_distinct_page() {
        let query = Book::query().select_distinct(["title"]).skip(1).take(2);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {"
                SELECT DISTINCT [title]
                FROM [books]
                ORDER BY 1
                OFFSET 1 ROWS FETCH NEXT 2 ROWS ONLY
            "}
            .trim()
        );
        // The key is a valid ordering when it is selected
        let query = Book::query().select_distinct(["id", "title"]).skip(1);
        assert_eq!(
            WRITER.select_statement(&query).unwrap().sql,
            indoc! {"
                SELECT DISTINCT [id], [title]
                FROM [books]
                ORDER BY [id]
                OFFSET 1 ROWS
            "}
            .trim()
        );
    }

    #[test]
    fn literals() {
        let query = Book::query()
            .filter(
                col("title")
                    .eq("Ærø")
                    .or(col("title").eq("O'Hara"))
                    .and(col("cover").eq(vec![0xCAu8, 0xFE])),
            )
            .inline_values(true);
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(
            statement.sql.ends_with(
                "WHERE ([title] = N'Ærø' OR [title] = 'O''Hara') AND [cover] = 0xCAFE"
            ),
            "{}",
            statement.sql
        );
    }

    #[test]
    fn expressions() {
        let query = Book::query().select([
            col("title").concat("!").alias("shout"),
            col("title").length().into(),
            when(col("pages").gt(300), val_text("long"), val_text("short")).alias("size"),
        ]);
        let statement = WRITER.select_statement(&query).unwrap();
        assert_eq!(
            statement.sql,
            indoc! {"
                SELECT [title] + @0 AS [shout], LEN([title]), CASE WHEN [pages] > @1 THEN @2 ELSE @3 END AS [size]
                FROM [books]
            "}
            .trim()
        );
        let query = Book::query().select([col("pages").gt(300).alias("long")]);
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(
            statement
                .sql
                .starts_with("SELECT CASE WHEN [pages] > @0 THEN 1 ELSE 0 END AS [long]"),
            "{}",
            statement.sql
        );
    }

    fn val_text(value: &str) -> sluice::Expr {
        sluice::val(value.to_string())
    }

    #[test]
    fn row_version() {
        let note = Note {
            id: 3,
            body: "Remember".into(),
            version: 0x0102,
        };
        let (statement, versioned) = WRITER
            .update_statement(Note::schema(), &note.row(), None)
            .unwrap();
        assert!(versioned);
        assert_eq!(
            statement.sql,
            indoc! {"
                UPDATE [notes] SET [body] = @0
                WHERE [id] = @1 AND CONVERT(BIGINT, [version]) = @2
            "}
            .trim()
        );
        let statement = WRITER
            .row_version_statement(Note::schema(), Value::Int64(Some(3)))
            .unwrap();
        assert_eq!(
            statement.sql,
            indoc! {"
                SELECT CONVERT(BIGINT, [version]) AS [version]
                FROM [notes]
                WHERE [id] = @0
            "}
            .trim()
        );
        let version = WRITER.from_db_value(
            Value::Blob(Some([0, 0, 0, 0, 0, 0, 1, 2].into())),
            &Note::schema().columns[2],
        );
        assert_eq!(version, Value::UInt64(Some(0x0102)));
    }

    #[test]
    fn like_brackets() {
        let query = Book::query().filter(col("title").starts_with("[draft]"));
        let statement = WRITER.select_statement(&query).unwrap();
        assert_eq!(
            statement.params.values().next(),
            Some(&Value::Varchar(Some("^[draft]%".into())))
        );
        assert!(statement.sql.ends_with("LIKE @0 ESCAPE '^'"));
    }
}
