use crate::silent_logs;
use futures::TryStreamExt;
use rust_decimal::Decimal;
use sluice::{
    Capture, Driver, Entity, Executor, Json, QueryResult, RowLabeled, SqlWriter, Value, col,
};
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::Uuid;

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[sluice(table = "events")]
struct Event {
    #[sluice(primary_key)]
    id: Uuid,
    title: String,
    notes: Option<String>,
    attendees: u16,
    ratio: f64,
    budget: Decimal,
    public: bool,
    payload: Vec<u8>,
    day: Option<Date>,
    starts_at: Option<PrimitiveDateTime>,
    tags: Json<Vec<String>>,
}

#[derive(Entity, Debug, Clone, PartialEq)]
#[sluice(table = "holidays")]
struct Holiday {
    #[sluice(primary_key)]
    day: Date,
    name: String,
}

fn launch() -> Event {
    let day = Date::from_calendar_date(2024, Month::March, 14).unwrap();
    Event {
        id: Uuid::new_v4(),
        title: "Launch".into(),
        notes: None,
        attendees: 120,
        ratio: 0.25,
        budget: Decimal::new(150075, 2),
        public: true,
        payload: vec![0, 159, 146, 150],
        day: Some(day),
        starts_at: Some(PrimitiveDateTime::new(day, Time::from_hms(18, 30, 0).unwrap())),
        tags: Json(vec!["rust".into(), "sql".into()]),
    }
}

pub async fn materialize<D: Driver>(executor: &mut Capture<D>) {
    let writer = executor.driver().sql_writer();
    executor.take_statements();

    // Values converted for the database read back as the same entity
    let event = launch();
    let row: RowLabeled = Event::schema()
        .columns
        .iter()
        .zip(event.row())
        .map(|(c, v)| (c.name().to_string(), writer.to_db_value(v, Some(c))))
        .collect();
    assert_eq!(
        row.get_column("tags"),
        Some(&Value::Varchar(Some(r#"["rust","sql"]"#.into())))
    );
    executor.respond_with(move |statement| {
        statement
            .is_query()
            .then(|| vec![QueryResult::Row(row.clone())])
    });
    let found = Event::find_by_id(executor, event.id)
        .await
        .expect("Failed to find the event")
        .expect("The event was not returned");
    assert_eq!(found, event);
    executor.respond_with(|_| None);
    executor.take_statements();

    // Column labels are matched ignoring case
    let row: RowLabeled = [
        ("TITLE", Value::Varchar(Some("Shouting".into()))),
        ("Attendees", Value::Int64(Some(3))),
    ]
    .into_iter()
    .collect();
    let event = Event::from_row(row, writer.as_dyn()).expect("Failed to read the event");
    assert_eq!(event.title, "Shouting");
    assert_eq!(event.attendees, 3);

    // A partial projection leaves the other fields to their default
    executor.push_results([[
        ("title", Value::Varchar(Some("Partial".into()))),
        ("public", Value::Int32(Some(1))),
    ]
    .into_iter()
    .collect::<RowLabeled>()
    .into()]);
    let query = Event::query()
        .select_columns(["title", "public"])
        .filter(col("public").eq(true));
    let events: Vec<Event> = Event::select(executor, &query)
        .try_collect()
        .await
        .expect("Failed to select the partial events");
    assert_eq!(
        events,
        [Event {
            title: "Partial".into(),
            public: true,
            ..Default::default()
        }]
    );
    let statement = executor.take_statements().pop().unwrap();
    assert!(!statement.sql.contains("payload"), "{}", statement.sql);

    // Values the drivers return in other shapes are normalized
    let id = Uuid::new_v4();
    let row: RowLabeled = [
        ("id", Value::Varchar(Some(id.to_string()))),
        ("ratio", Value::Varchar(Some("0.5".into()))),
        ("budget", Value::Float64(Some(12.5))),
        ("day", Value::Varchar(Some("2024-03-14".into()))),
        ("tags", Value::Varchar(Some(r#"["a","b"]"#.into()))),
        ("notes", Value::Null),
    ]
    .into_iter()
    .collect();
    let event = Event::from_row(row, writer.as_dyn()).expect("Failed to normalize the row");
    assert_eq!(event.id, id);
    assert_eq!(event.ratio, 0.5);
    assert_eq!(event.budget, Decimal::new(125, 1));
    assert_eq!(event.day, Date::from_calendar_date(2024, Month::March, 14).ok());
    assert_eq!(*event.tags, ["a", "b"]);
    assert_eq!(event.notes, None);

    // A value that cannot be converted keeps the default
    silent_logs! {
        let row: RowLabeled = [
            ("attendees", Value::Varchar(Some("many".into()))),
            ("title", Value::Varchar(Some("Still read".into()))),
        ]
        .into_iter()
        .collect();
        let event = Event::from_row(row, writer.as_dyn()).expect("Conversions must not fail");
        assert_eq!(event.attendees, 0);
        assert_eq!(event.title, "Still read");
    }

    // Types without a default need their columns
    let day = Date::from_calendar_date(2024, Month::December, 25).unwrap();
    let row: RowLabeled = [
        ("day", Value::Date(Some(day))),
        ("name", Value::Varchar(Some("Christmas".into()))),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        Holiday::from_row(row, writer.as_dyn()).expect("Failed to read the holiday"),
        Holiday {
            day,
            name: "Christmas".into(),
        }
    );
    let row: RowLabeled = [("day", Value::Date(Some(day)))].into_iter().collect();
    let error = Holiday::from_row(row, writer.as_dyn()).expect_err("The name is missing");
    assert!(format!("{error:#}").contains("`name`"), "{error:#}");

    // Dynamic rows of an arbitrary projection
    executor.push_results([[("total", Value::Int64(Some(3)))]
        .into_iter()
        .collect::<RowLabeled>()
        .into()]);
    let query = Event::query().select([col("attendees").sum().alias("total")]);
    let statement = writer.select_statement(&query).unwrap();
    let rows: Vec<RowLabeled> = executor
        .fetch(statement)
        .try_collect()
        .await
        .expect("Failed to fetch the totals");
    assert_eq!(rows[0].get_column("TOTAL"), Some(&Value::Int64(Some(3))));
    executor.take_statements();
}
