use sluice::{
    Capture, Driver, Entity, Executor, SqlWriter, Value, col, eval, null, param, val, when,
};

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[sluice(table = "customers")]
struct Customer {
    #[sluice(primary_key, auto_increment)]
    id: i64,
    name: String,
    email: Option<String>,
    age: i32,
    active: bool,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[sluice(table = "orders")]
struct Order {
    id: i64,
    customer_id: i64,
    description: String,
}

fn values(statement: &sluice::Statement) -> Vec<Value> {
    statement.params.values().cloned().collect()
}

pub async fn predicates<D: Driver>(executor: &mut Capture<D>) {
    let writer = executor.driver().sql_writer();

    // Conditions added with `and` keep the parameters of every part, in order
    let query = Customer::query()
        .filter(col("age").gt(18))
        .and(col("name").eq("Ada"))
        .and(col("email").ne("ada@example.com"));
    let statement = writer
        .select_statement(&query)
        .expect("Failed to write the and-combined query");
    assert_eq!(
        values(&statement),
        [
            Value::Int32(Some(18)),
            Value::Varchar(Some("Ada".into())),
            Value::Varchar(Some("ada@example.com".into())),
        ]
    );
    assert_eq!(statement.sql.matches(" AND ").count(), 2);
    let first = statement
        .sql
        .find(statement.params.names().next().unwrap())
        .unwrap();
    let last = statement
        .sql
        .rfind(statement.params.names().last().unwrap())
        .unwrap();
    assert!(first <= last, "Parameters are not in textual order");

    // `or` wraps what was accumulated before
    let query = Customer::query()
        .filter(col("age").gt(18))
        .and(col("active").eq(true))
        .or(col("name").eq("Root"));
    let statement = writer.select_statement(&query).unwrap();
    assert_eq!(statement.params.len(), 2);
    assert!(statement.sql.contains(" OR "));

    // A constant side of AND does not drop the parameters of the other side
    let flag = true;
    let query = Customer::query().filter(val(flag).and(col("name").eq("Ada")));
    let statement = writer.select_statement(&query).unwrap();
    assert_eq!(values(&statement), [Value::Varchar(Some("Ada".into()))]);
    let query = Customer::query().filter(col("name").eq("Ada").or(val(false)));
    let statement = writer.select_statement(&query).unwrap();
    assert_eq!(values(&statement), [Value::Varchar(Some("Ada".into()))]);

    // WHERE true disappears, WHERE false keeps the dialect false expression
    let statement = writer
        .select_statement(&Customer::query().filter(true))
        .unwrap();
    assert!(!statement.sql.contains("WHERE"));
    assert!(statement.params.is_empty());
    let statement = writer
        .select_statement(&Customer::query().filter(false))
        .unwrap();
    assert!(statement.sql.contains("WHERE"));
    assert!(statement.sql.contains(writer.false_expression()));

    // Comparisons with null are symmetric
    let lhs = writer
        .select_statement(&Customer::query().filter(col("email").eq(null())))
        .unwrap();
    let rhs = writer
        .select_statement(&Customer::query().filter(null().eq(col("email"))))
        .unwrap();
    assert_eq!(lhs.sql, rhs.sql);
    assert!(lhs.sql.ends_with(" IS NULL"));
    assert!(lhs.params.is_empty());
    let missing: Option<String> = None;
    let statement = writer
        .select_statement(&Customer::query().filter(col("email").ne(missing)))
        .unwrap();
    assert!(statement.sql.ends_with(" IS NOT NULL"));
    let statement = writer
        .select_statement(&Customer::query().filter(null().eq(true)))
        .unwrap();
    assert!(statement.sql.contains(writer.false_expression()));
    let statement = writer
        .select_statement(&Customer::query().filter(null().ne(true)))
        .unwrap();
    assert!(!statement.sql.contains("WHERE"));

    // IN over a list binds one parameter per element, in order
    let query = Customer::query().filter(col("id").in_list([3, 1, 2]));
    let statement = writer.select_statement(&query).unwrap();
    assert_eq!(
        values(&statement),
        [
            Value::Int32(Some(3)),
            Value::Int32(Some(1)),
            Value::Int32(Some(2)),
        ]
    );
    assert!(statement.sql.contains(" IN ("));
    let statement = writer
        .select_statement(&Customer::query().filter(col("id").in_list(Vec::<i64>::new())))
        .unwrap();
    assert!(statement.sql.contains(writer.false_expression()));
    let statement = writer
        .select_statement(&Customer::query().filter(col("id").not_in_list(Vec::<i64>::new())))
        .unwrap();
    assert!(!statement.sql.contains("WHERE"));

    // IN over a subquery merges its parameters at the point of use
    let query = Customer::query().filter(col("age").gt(30).and(
        col("id").in_query(
            Order::query()
                .select_columns(["customer_id"])
                .filter(col("description").contains("gift")),
        ),
    ));
    let statement = writer.select_statement(&query).unwrap();
    assert_eq!(
        values(&statement),
        [
            Value::Int32(Some(30)),
            Value::Varchar(Some("%gift%".into())),
        ]
    );
    assert_eq!(statement.sql.matches("SELECT").count(), 2);

    // String methods become LIKE with escaped wildcards
    let query = Customer::query().filter(col("name").starts_with("50%_off"));
    let statement = writer.select_statement(&query).unwrap();
    let escape = writer.like_escape_char();
    assert_eq!(
        values(&statement),
        [Value::Varchar(Some(format!("50{escape}%{escape}_off%")))]
    );
    assert!(statement.sql.contains(&format!("ESCAPE '{escape}'")));
    let query = Customer::query().filter(col("name").ends_with("son"));
    let statement = writer.select_statement(&query).unwrap();
    assert_eq!(values(&statement), [Value::Varchar(Some("%son".into()))]);
    assert!(!statement.sql.contains("ESCAPE"));

    // Columns are compared with the values they are given, delegates are
    // evaluated while writing
    let query = Customer::query().filter(col("age").ge(eval(|| 40 + 2)));
    let statement = writer.select_statement(&query).unwrap();
    assert_eq!(values(&statement), [Value::Int32(Some(42))]);

    // A constant comparison is folded on the host, a bare boolean column is
    // compared with the true literal
    let query = Customer::query().filter(val(1).lt(2).and(col("active")));
    let statement = writer.select_statement(&query).unwrap();
    assert!(statement.sql.contains(writer.true_expression()));
    assert!(statement.params.is_empty());

    // Named parameters are bound once
    let query = Customer::query().filter(
        col("name")
            .eq(param("who", String::from("Ada")))
            .or(col("email").eq(param("who", String::from("Ada")))),
    );
    let statement = writer.select_statement(&query).unwrap();
    if writer.named_param_marker("who").is_some() {
        assert_eq!(statement.params.len(), 1);
    } else {
        assert_eq!(statement.params.len(), 2);
    }

    // Conditionals with a folded test lose the dead branch
    let query = Customer::query().select([when(val(true), col("name"), col("email"))]);
    let statement = writer.select_statement(&query).unwrap();
    assert!(!statement.sql.contains("CASE"));

    // Unknown members are reported
    let error = writer
        .select_statement(&Customer::query().filter(col("nickname").eq("x")))
        .expect_err("An unknown column must not be written");
    assert!(matches!(
        sluice::ErrorKind::of(&error),
        Some(sluice::ErrorKind::Mapping(..))
    ));

    // Rendering twice gives the same statement
    let query = Customer::query()
        .filter(col("age").gt(18))
        .order_by(col("name"));
    assert_eq!(
        writer.select_statement(&query).unwrap(),
        writer.select_statement(&query).unwrap()
    );
}
