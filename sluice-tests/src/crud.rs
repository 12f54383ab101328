use rust_decimal::Decimal;
use sluice::{
    Capture, Driver, Entity, ErrorKind, Executor, RowLabeled, RowsAffected, SqlEnum, SqlWriter,
    Value, col, impl_as_value_enum, val,
};

#[derive(Default, Debug, Clone, Copy, PartialEq)]
enum Category {
    #[default]
    Tools = 1,
    Garden = 2,
    Kitchen = 3,
}

impl SqlEnum for Category {
    const VARIANTS: &'static [Self] = &[Category::Tools, Category::Garden, Category::Kitchen];
    fn name(&self) -> &'static str {
        match self {
            Category::Tools => "Tools",
            Category::Garden => "Garden",
            Category::Kitchen => "Kitchen",
        }
    }
    fn ordinal(&self) -> i64 {
        *self as i64
    }
}
impl_as_value_enum!(Category);

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[sluice(table = "products")]
struct Product {
    #[sluice(primary_key, auto_increment)]
    id: i64,
    name: String,
    #[sluice(default = "0")]
    stock: Option<i32>,
    price: Decimal,
    category: Category,
    #[sluice(enum_as = "ordinal")]
    shelf: Category,
}

fn lamp() -> Product {
    Product {
        id: 0,
        name: "Lamp".into(),
        stock: None,
        price: Decimal::new(1990, 2),
        category: Category::Kitchen,
        shelf: Category::Garden,
    }
}

pub async fn crud<D: Driver>(executor: &mut Capture<D>) {
    let writer = executor.driver().sql_writer();
    executor.take_statements();

    // Insert reads back the generated key
    let mut product = lamp();
    executor.push_results([RowsAffected {
        rows_affected: 1,
        last_affected_id: Some(7),
    }
    .into()]);
    product
        .insert(executor)
        .await
        .expect("Failed to insert the product");
    assert_eq!(product.id, 7);
    let statement = executor.take_statements().pop().unwrap();
    assert!(statement.sql.starts_with("INSERT INTO "));
    assert_eq!(
        statement.params.values().cloned().collect::<Vec<_>>(),
        [
            Value::Varchar(Some("Lamp".into())),
            Value::Decimal(Some(Decimal::new(1990, 2)), 0, 0),
            Value::Varchar(Some("Kitchen".into())),
            Value::Int64(Some(2)),
        ]
    );

    // Insert of the chosen fields only
    let mut product = lamp();
    product
        .insert_only(executor, &["name"])
        .await
        .expect("Failed to insert the product name");
    let statement = executor.take_statements().pop().unwrap();
    assert_eq!(statement.params.len(), 1);

    // Many rows at once
    let products = [lamp(), lamp(), lamp()];
    Product::insert_many(executor, &products)
        .await
        .expect("Failed to insert many products");
    let statements = executor.take_statements();
    if writer.supports_multi_row_insert() {
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].params.len(), 12);
    } else {
        assert_eq!(statements.len(), 3);
    }

    // Update by key
    let mut product = Product {
        id: 7,
        stock: Some(3),
        ..lamp()
    };
    executor.push_affected(1);
    product
        .update(executor)
        .await
        .expect("Failed to update the product");
    let statement = executor.take_statements().pop().unwrap();
    assert!(statement.sql.starts_with("UPDATE "));
    assert!(statement.sql.contains("WHERE"));
    assert_eq!(statement.params.len(), 6);
    assert_eq!(
        statement.params.values().last(),
        Some(&Value::Int64(Some(7))),
        "The key is compared last"
    );

    // Without a row version a missing row is a plain error
    executor.push_affected(0);
    let error = product
        .update(executor)
        .await
        .expect_err("Updating a missing row must fail");
    assert_eq!(ErrorKind::of(&error), None);
    executor.take_statements();

    // Update of some fields
    executor.push_affected(1);
    product
        .update_only(executor, &["name"])
        .await
        .expect("Failed to update the name");
    let statement = executor.take_statements().pop().unwrap();
    assert_eq!(statement.params.len(), 2);

    // Assignments on a condition
    let result = Product::update_where(
        executor,
        [("name", "Bulb".into()), ("stock", val(0))],
        col("price").lt(Decimal::ONE),
    )
    .await
    .expect("Failed to update where");
    assert_eq!(result.rows_affected, 0);
    let statement = executor.take_statements().pop().unwrap();
    assert_eq!(statement.params.len(), 3);
    assert!(ErrorKind::of(
        &Product::update_where(executor, [("colour", val(1))], true)
            .await
            .unwrap_err()
    )
    .is_some());

    // Increment
    executor.push_affected(1);
    Product::update_add(executor, "stock", 5, col("id").eq(7))
        .await
        .expect("Failed to increment the stock");
    let statement = executor.take_statements().pop().unwrap();
    assert!(statement.sql.contains(" + "));
    assert_eq!(
        statement.params.values().cloned().collect::<Vec<_>>(),
        [Value::Int32(Some(5)), Value::Int32(Some(7))]
    );

    // Deletions
    executor.push_affected(1);
    product
        .delete(executor)
        .await
        .expect("Failed to delete the product");
    executor.push_affected(3);
    let deleted = Product::delete_by_ids(executor, [1i64, 2, 3])
        .await
        .expect("Failed to delete by ids");
    assert_eq!(deleted.rows_affected, 3);
    let statements = executor.take_statements();
    assert!(statements.iter().all(|s| s.sql.starts_with("DELETE FROM ")));
    assert_eq!(statements[1].params.len(), 3);
    executor.push_affected(1);
    Product::delete_by_id(executor, 9i64)
        .await
        .expect("Failed to delete by id");
    executor.take_statements();

    // Save inserts entities without a key
    let mut product = lamp();
    executor.push_results([RowsAffected {
        rows_affected: 1,
        last_affected_id: Some(11),
    }
    .into()]);
    let inserted = product.save(executor).await.expect("Failed to save");
    assert!(inserted);
    assert_eq!(product.id, 11);
    assert_eq!(executor.take_statements().len(), 1);

    // Save updates the existing rows
    let count: RowLabeled = [("count", Value::Int64(Some(1)))].into_iter().collect();
    executor.push_results([count.into()]).push_affected(1);
    let inserted = product.save(executor).await.expect("Failed to save again");
    assert!(!inserted);
    let statements = executor.take_statements();
    assert_eq!(statements.len(), 2);
    assert!(statements[1].sql.starts_with("UPDATE "));

    // Exists
    let count: RowLabeled = [("count", Value::Int64(Some(0)))].into_iter().collect();
    executor.push_results([count.into()]);
    let exists = Product::exists_by_id(executor, 11i64)
        .await
        .expect("Failed to check existence");
    assert!(!exists);
    executor.take_statements();
}
