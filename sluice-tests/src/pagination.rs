use futures::TryStreamExt;
use sluice::{
    Capture, Driver, Entity, Executor, Pagination, RowLabeled, SqlWriter, Value, col, count_all,
};

#[derive(Entity, Default, Debug, Clone, PartialEq)]
struct Score {
    #[sluice(primary_key)]
    id: i32,
    player: String,
    points: i64,
}

fn score_row(id: i32, player: &str, points: i64) -> RowLabeled {
    [
        ("id", Value::Int32(Some(id))),
        ("player", Value::Varchar(Some(player.into()))),
        ("points", Value::Int64(Some(points))),
    ]
    .into_iter()
    .collect()
}

pub async fn pagination<D: Driver>(executor: &mut Capture<D>) {
    let writer = executor.driver().sql_writer();

    // First page of one row
    let query = Score::query().order_by(col("points")).take(1);
    let statement = writer.select_statement(&query).unwrap();
    let sql = &statement.sql;
    match writer.pagination(&query) {
        Pagination::LimitOffset => {
            assert!(sql.contains("LIMIT 1"), "{sql}");
            assert!(!sql.contains("OFFSET"), "{sql}");
        }
        Pagination::Top => assert!(sql.contains("TOP (1)"), "{sql}"),
        Pagination::OffsetFetch => {
            assert!(sql.contains("OFFSET 0 ROWS FETCH NEXT 1 ROWS ONLY"), "{sql}")
        }
        Pagination::RowNum => {
            assert!(sql.contains("ROWNUM <= 1"), "{sql}");
            assert!(!sql.contains("SELECT *"), "{sql}");
        }
        Pagination::FirstSkip => assert!(sql.starts_with("SELECT FIRST 1 "), "{sql}"),
    }
    assert!(sql.contains("ORDER BY"), "{sql}");

    // Second page
    let query = Score::query().order_by(col("points")).skip(2).take(1);
    let statement = writer.select_statement(&query).unwrap();
    let sql = &statement.sql;
    match writer.pagination(&query) {
        Pagination::LimitOffset => {
            assert!(sql.contains("LIMIT 1"), "{sql}");
            assert!(sql.contains("OFFSET 2"), "{sql}");
        }
        Pagination::Top => panic!("TOP cannot skip rows"),
        Pagination::OffsetFetch => {
            assert!(sql.contains("OFFSET 2 ROWS FETCH NEXT 1 ROWS ONLY"), "{sql}")
        }
        Pagination::RowNum => {
            assert!(sql.contains("ROWNUM <= 3"), "{sql}");
            assert!(sql.contains(" > 2"), "{sql}");
        }
        Pagination::FirstSkip => assert!(sql.starts_with("SELECT FIRST 1 SKIP 2 "), "{sql}"),
    }

    // Skipping without an ordering, the dialects needing one order by key
    let query = Score::query().skip(5);
    let statement = writer.select_statement(&query).unwrap();
    if writer.pagination(&query) == Pagination::OffsetFetch {
        assert!(statement.sql.contains("ORDER BY"), "{}", statement.sql);
    }

    // Pagination of computed columns keeps the output columns only
    let query = Score::query()
        .select([col("player"), col("points").sum()])
        .group_by([col("player")])
        .order_by(col("player"))
        .take(3);
    let statement = writer
        .select_statement(&query)
        .expect("Failed to paginate a grouped query");
    assert!(statement.sql.contains("GROUP BY"));

    // The page is materialized from the returned rows
    executor.push_results([score_row(1, "ada", 10).into()]);
    let found = Score::find_one(executor, col("player").eq("ada"))
        .await
        .expect("Failed to find the first score")
        .expect("The first score was not returned");
    assert_eq!(
        found,
        Score {
            id: 1,
            player: "ada".into(),
            points: 10,
        }
    );
    let statement = executor.take_statements().pop().unwrap();
    assert_eq!(statement.params.len(), 1);

    executor.push_results([score_row(2, "bob", 7).into(), score_row(3, "eve", 3).into()]);
    let query = Score::query().order_by_descending(col("points")).skip(1).take(2);
    let scores: Vec<Score> = Score::select(executor, &query)
        .try_collect()
        .await
        .expect("Failed to select a page of scores");
    assert_eq!(
        scores.iter().map(|v| v.id).collect::<Vec<_>>(),
        [2, 3],
        "Rows must keep the order they were returned in"
    );
    executor.take_statements();

    // Counting a paginated query counts the page
    executor.push_results([[("count", Value::Int64(Some(2)))]
        .into_iter()
        .collect::<RowLabeled>()
        .into()]);
    let count = Score::count(executor, &query)
        .await
        .expect("Failed to count the scores");
    assert_eq!(count, 2);
    let statement = executor.take_statements().pop().unwrap();
    assert!(statement.sql.starts_with("SELECT COUNT(*) FROM ("));

    // Counting a plain query does not wrap it
    let query = Score::query()
        .filter(col("points").gt(5))
        .order_by(col("points"));
    let statement = writer.count_statement(&query).unwrap();
    assert!(statement.sql.starts_with("SELECT COUNT(*)\nFROM "));
    assert!(!statement.sql.contains("ORDER BY"));
    assert_eq!(statement.params.len(), 1);

    let query = Score::query().select([count_all()]);
    assert!(writer.select_statement(&query).unwrap().sql.contains("COUNT(*)"));
}
