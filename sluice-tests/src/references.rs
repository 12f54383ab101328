use sluice::{
    Capture, Driver, Entity, ErrorKind, Include, QueryResult, RowLabeled, Value, col,
};

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[sluice(table = "customers")]
struct Customer {
    id: i64,
    name: String,
    address_id: Option<i64>,
    #[sluice(reference)]
    orders: Vec<Order>,
    #[sluice(reference)]
    address: Option<Address>,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[sluice(table = "customer_orders")]
struct Order {
    id: i64,
    customer_id: i64,
    total: i32,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[sluice(table = "addresses")]
struct Address {
    id: i64,
    city: String,
    #[sluice(reference)]
    residents: Vec<Order>,
}

fn customer(id: i64, name: &str, address: Option<i64>) -> QueryResult {
    [
        ("id", Value::Int64(Some(id))),
        ("name", Value::Varchar(Some(name.into()))),
        ("address_id", Value::Int64(address)),
    ]
    .into_iter()
    .collect::<RowLabeled>()
    .into()
}

fn order(id: i64, customer_id: i64, total: i32) -> QueryResult {
    [
        ("id", Value::Int64(Some(id))),
        ("customer_id", Value::Int64(Some(customer_id))),
        ("total", Value::Int32(Some(total))),
    ]
    .into_iter()
    .collect::<RowLabeled>()
    .into()
}

fn customers<D: Driver>(executor: &mut Capture<D>) {
    executor.push_results([
        customer(1, "Ada", Some(10)),
        customer(2, "Bob", Some(10)),
        customer(3, "Eve", None),
    ]);
}

fn ids(orders: &[Order]) -> Vec<i64> {
    orders.iter().map(|v| v.id).collect()
}

pub async fn references<D: Driver>(executor: &mut Capture<D>) {
    executor.take_statements();
    let query = Customer::query().order_by(col("id")).take(3);

    // One query per relationship, matched back on the keys
    customers(executor);
    executor.push_results([order(1, 1, 30), order(2, 1, 12), order(3, 3, 7)]);
    executor.push_results([[
        ("id", Value::Int64(Some(10))),
        ("city", Value::Varchar(Some("Turin".into()))),
    ]
    .into_iter()
    .collect::<RowLabeled>()
    .into()]);
    let loaded = Customer::select_with_references(executor, &query, &Include::All)
        .await
        .expect("Failed to load the customers");
    assert_eq!(loaded.len(), 3);
    assert_eq!(ids(&loaded[0].orders), [1, 2]);
    assert!(loaded[1].orders.is_empty());
    assert_eq!(ids(&loaded[2].orders), [3]);
    assert_eq!(loaded[0].orders[1].total, 12);
    let turin = Some(Address {
        id: 10,
        city: "Turin".into(),
        residents: Vec::new(),
    });
    assert_eq!(loaded[0].address, turin);
    assert_eq!(loaded[1].address, turin);
    assert_eq!(loaded[2].address, None);

    let statements = executor.take_statements();
    assert_eq!(statements.len(), 3);
    assert!(!statements[0].sql.contains("orders"), "{}", statements[0].sql);
    assert!(statements[1].sql.contains(" IN ("), "{}", statements[1].sql);
    assert_eq!(
        statements[1].params.values().cloned().collect::<Vec<_>>(),
        [
            Value::Int64(Some(1)),
            Value::Int64(Some(2)),
            Value::Int64(Some(3)),
        ],
        "The keys of the loaded owners only"
    );
    assert_eq!(
        statements[2].params.values().cloned().collect::<Vec<_>>(),
        [Value::Int64(Some(10))],
        "Keys are distinct and null keys are skipped"
    );

    // Nothing is loaded unless requested
    customers(executor);
    let loaded = Customer::select_with_references(executor, &query, &Include::None)
        .await
        .expect("Failed to load the customers");
    assert!(loaded.iter().all(|v| v.orders.is_empty() && v.address.is_none()));
    assert_eq!(executor.take_statements().len(), 1);

    // Or only what was requested
    customers(executor);
    executor.push_results([order(4, 2, 1)]);
    let mut loaded = Customer::select_with_references(executor, &query, &Include::only(["orders"]))
        .await
        .expect("Failed to load the customer orders");
    assert_eq!(ids(&loaded[1].orders), [4]);
    assert!(loaded.iter().all(|v| v.address.is_none()));
    assert_eq!(executor.take_statements().len(), 2);

    // References of entities already in memory, rows of unknown owners are dropped
    executor.push_results([order(5, 3, 2), order(6, 99, 2)]);
    Customer::load_references(executor, &mut loaded[2..], &Include::only(["orders"]))
        .await
        .expect("Failed to load the references");
    assert_eq!(ids(&loaded[2].orders), [5]);
    let statement = executor.take_statements().pop().unwrap();
    assert_eq!(statement.params.len(), 1);

    Customer::load_references(executor, &mut [], &Include::All)
        .await
        .expect("Loading nothing must succeed");
    assert!(executor.take_statements().is_empty());

    // A relationship without foreign key cannot be loaded
    let mut addresses = vec![Address {
        id: 10,
        ..Default::default()
    }];
    let error = Address::load_references(executor, &mut addresses, &Include::All)
        .await
        .expect_err("Residents have no key to the address");
    assert!(matches!(
        ErrorKind::of(&error),
        Some(ErrorKind::Mapping(..))
    ));
    assert!(executor.take_statements().is_empty());
}
