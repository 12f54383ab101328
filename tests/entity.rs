#[cfg(test)]
mod tests {
    use sluice::{
        Blocking, BlockingExecutor, Capture, Entity, Filtered, GenericDriver, QueryResult,
        Result, RowLabeled, RowsAffected, Statement, Value, col,
        stream::TryStreamExt,
    };
    use sluice_tests::{execute_tests, init_logs};

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[sluice(table = "products")]
    struct Product {
        #[sluice(primary_key, auto_increment)]
        id: i64,
        name: String,
        stock: i32,
    }

    fn product_row(id: i64, name: &str, stock: i32) -> QueryResult {
        let row: RowLabeled = [
            ("id", Value::Int64(Some(id))),
            ("name", Value::Varchar(Some(name.into()))),
            ("stock", Value::Int32(Some(stock))),
        ]
        .into_iter()
        .collect();
        row.into()
    }

    #[tokio::test]
    async fn generic() {
        init_logs();
        execute_tests(Capture::new(GenericDriver::new())).await;
    }

    #[tokio::test]
    async fn filtered_statements() {
        let filter = |statement: &Statement| {
            if statement.is_query() && statement.sql.contains(r#"FROM "products""#) {
                Some(vec![product_row(1, "Lamp", 3), product_row(2, "Desk", 0)])
            } else {
                None
            }
        };
        let mut executor = Filtered::new(Capture::new(GenericDriver::new()), filter);

        let products: Vec<Product> = Product::select(&mut executor, &Product::query())
            .try_collect()
            .await
            .expect("Failed to select the products");
        assert_eq!(
            products.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            ["Lamp", "Desk"]
        );
        assert!(
            executor.executor.statements().is_empty(),
            "Intercepted statements do not reach the executor"
        );

        // Statements the filter ignores go through
        executor.executor.push_affected(2);
        let result = Product::delete_where(&mut executor, col("stock").eq(0))
            .await
            .expect("Failed to delete");
        assert_eq!(result.rows_affected, 2);
        let statement = executor.executor.last_statement().unwrap();
        assert_eq!(statement.sql, "DELETE FROM \"products\"\nWHERE \"stock\" = @0");
    }

    /// Answers every statement synchronously and keeps the text it received.
    struct Recorder {
        driver: GenericDriver,
        received: Vec<String>,
        next_id: i64,
    }

    impl BlockingExecutor for Recorder {
        type Driver = GenericDriver;

        fn driver(&self) -> &Self::Driver {
            &self.driver
        }

        fn run_blocking(&mut self, statement: Statement) -> Result<Vec<QueryResult>> {
            self.received.push(statement.sql.clone());
            if statement.sql.contains("broken") {
                return Err(sluice::Error::msg("The table is broken"));
            }
            if statement.is_query() {
                return Ok(vec![product_row(7, "Chair", 12)]);
            }
            self.next_id += 1;
            Ok(vec![
                RowsAffected {
                    rows_affected: 1,
                    last_affected_id: Some(self.next_id),
                }
                .into(),
            ])
        }
    }

    #[tokio::test]
    async fn blocking_executor() {
        let mut executor = Blocking(Recorder {
            driver: GenericDriver::new(),
            received: Vec::new(),
            next_id: 40,
        });

        let mut product = Product {
            name: "Stool".into(),
            stock: 4,
            ..Default::default()
        };
        product
            .insert(&mut executor)
            .await
            .expect("Failed to insert");
        assert_eq!(product.id, 41, "The generated key is read back");

        let found = Product::find_by_id(&mut executor, 7)
            .await
            .expect("Failed to find")
            .expect("The product must be found");
        assert_eq!(found.name, "Chair");

        product.stock = 5;
        product.update(&mut executor).await.expect("Failed to update");
        assert_eq!(
            executor.0.received,
            [
                "INSERT INTO \"products\" (\"name\", \"stock\") VALUES (@0, @1)",
                "SELECT \"id\", \"name\", \"stock\"\nFROM \"products\"\nWHERE \"id\" = @0\nLIMIT 1",
                "UPDATE \"products\" SET \"name\" = @0, \"stock\" = @1\nWHERE \"id\" = @2",
            ]
        );

        let bound = Product::find_many(&mut executor, col("name").eq("broken")).await;
        assert!(bound.is_ok(), "The value is bound, the text does not contain it");
        let error = Product::find_many(&mut executor, sluice::sql("broken"))
            .await
            .expect_err("Errors of the executor are propagated");
        assert!(format!("{error:#}").contains("broken"));
    }
}
