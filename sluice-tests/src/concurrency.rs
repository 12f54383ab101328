use sluice::{
    Capture, Driver, Entity, ErrorKind, Executor, RowLabeled, RowVersionStrategy, SqlWriter,
    Value, col,
};

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[sluice(table = "documents")]
struct Document {
    id: i64,
    title: String,
    #[sluice(row_version)]
    version: u64,
}

fn version_row(version: i64) -> RowLabeled {
    [("version", Value::Int64(Some(version)))]
        .into_iter()
        .collect()
}

/// Prepare the answers of a successful write: one row affected and, when
/// the database maintains the version, the read of the new version.
fn prepare_write<D: Driver>(executor: &mut Capture<D>, server_version: i64) {
    executor.push_affected(1);
    if executor.driver().sql_writer().row_version_strategy() == RowVersionStrategy::ServerGenerated
    {
        executor.push_results([version_row(server_version).into()]);
    }
}

fn is_conflict(error: &sluice::Error) -> bool {
    matches!(
        ErrorKind::of(error),
        Some(ErrorKind::OptimisticConcurrency { .. })
    )
}

pub async fn concurrency<D: Driver>(executor: &mut Capture<D>) {
    let strategy = executor.driver().sql_writer().row_version_strategy();
    executor.take_statements();

    // A new row gets its first version
    let mut document = Document {
        id: 1,
        title: "Draft".into(),
        version: 0,
    };
    prepare_write(executor, 100);
    document
        .insert(executor)
        .await
        .expect("Failed to insert the document");
    let statements = executor.take_statements();
    match strategy {
        RowVersionStrategy::Increment => {
            assert_eq!(document.version, 1);
            assert_eq!(statements.len(), 1);
            assert_eq!(
                statements[0].params.values().last(),
                Some(&Value::UInt64(Some(1)))
            );
        }
        RowVersionStrategy::ServerGenerated => {
            assert_eq!(document.version, 100);
            assert_eq!(statements.len(), 2);
            assert_eq!(statements[0].params.len(), 2);
        }
    }

    // Two copies of the same row, the first write wins
    let mut first = document.clone();
    let mut second = document.clone();
    first.title = "First".into();
    prepare_write(executor, 101);
    first
        .update(executor)
        .await
        .expect("The first update must succeed");
    match strategy {
        RowVersionStrategy::Increment => assert_eq!(first.version, 2),
        RowVersionStrategy::ServerGenerated => assert_eq!(first.version, 101),
    }
    let statement = executor.take_statements().swap_remove(0);
    assert_eq!(
        statement.params.values().last(),
        Some(&Value::UInt64(Some(document.version))),
        "The stored version must be compared"
    );
    if strategy == RowVersionStrategy::Increment {
        assert!(statement.sql.contains(" + 1"), "{}", statement.sql);
    }

    second.title = "Second".into();
    executor.push_affected(0);
    let error = second
        .update(executor)
        .await
        .expect_err("A stale update must fail");
    assert!(is_conflict(&error), "Unexpected error: {error:#}");
    assert_eq!(second.version, document.version, "A failed update keeps the version");
    executor.take_statements();

    // After a conflict the row can be told modified from deleted
    let count: RowLabeled = [("count", Value::Int64(Some(1)))].into_iter().collect();
    executor.push_results([count.into()]);
    assert!(
        Document::exists_by_id(executor, second.id)
            .await
            .expect("Failed to check the document")
    );
    executor.take_statements();

    // The partial update compares the version as well
    executor.push_affected(0);
    let error = second
        .update_only(executor, &["title"])
        .await
        .expect_err("A stale partial update must fail");
    assert!(is_conflict(&error));

    // Delete compares the version
    executor.push_affected(0);
    let error = second
        .delete(executor)
        .await
        .expect_err("A stale delete must fail");
    assert!(is_conflict(&error));
    executor.push_affected(1);
    first
        .delete(executor)
        .await
        .expect("Deleting the current version must succeed");
    let statement = executor.take_statements().pop().unwrap();
    assert_eq!(statement.params.len(), 2);

    // A condition that does not mention the version is not checked
    executor.push_affected(0);
    let result = Document::update_where(executor, [("title", "Any".into())], col("id").eq(1))
        .await
        .expect("An update without version condition does not fail");
    assert_eq!(result.rows_affected, 0);
    executor.take_statements();
}
