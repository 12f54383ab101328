#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice::{Capture, Entity, SqlWriter, Value, col};
    use sluice_mysql::{MySqlDriver, MySqlSqlWriter};
    use sluice_tests::{execute_tests, init_logs};
    use time::macros::datetime;

    const WRITER: MySqlSqlWriter = MySqlSqlWriter {};

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
    async fn mysql() {
        init_logs();
        execute_tests(Capture::new(MySqlDriver::new())).await;
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
                SELECT `id`, `title`, `pages`, `available`, `cover`
                FROM `books`
                WHERE `pages` > ? AND `available` = 1
                ORDER BY `title`
                LIMIT 5
                OFFSET 10
            "}
            .trim()
        );
        let query = Book::query().skip(3);
        assert!(
            WRITER
                .select_statement(&query)
                .unwrap()
                .sql
                .ends_with("LIMIT 18446744073709551615\nOFFSET 3")
        );
    }

    #[test]
    fn literals() {
        let query = Book::query()
            .filter(col("title").eq(r"O'Hara\s"))
            .inline_values(true);
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(
            statement.sql.ends_with(r"WHERE `title` = 'O''Hara\\s'"),
            "{}",
            statement.sql
        );
    }

    #[test]
    fn expressions() {
        let query = Book::query().select([
            col("title").concat("!").alias("shout"),
            col("title").length().into(),
        ]);
        let statement = WRITER.select_statement(&query).unwrap();
        assert_eq!(
            statement.sql,
            indoc! {"
                SELECT CONCAT(`title`, ?) AS `shout`, CHAR_LENGTH(`title`)
                FROM `books`
            "}
            .trim()
        );
    }

    #[test]
    fn timestamps_are_stored_as_utc() {
        let value = WRITER.to_db_value(
            Value::TimestampWithTimezone(Some(datetime!(2024-03-14 18:30 +02:00))),
            None,
        );
        assert_eq!(
            value,
            Value::Timestamp(Some(datetime!(2024-03-14 16:30)))
        );
    }

    #[test]
    fn positional_parameters() {
        let query = Book::query().filter(
            col("title")
                .eq(sluice::param("name", String::from("Dune")))
                .or(col("title").eq(sluice::param("name", String::from("Dune")))),
        );
        let statement = WRITER.select_statement(&query).unwrap();
        assert!(statement.sql.ends_with("WHERE `title` = ? OR `title` = ?"));
        assert_eq!(statement.params.len(), 2);
    }
}
