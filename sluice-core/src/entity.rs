use crate::{
    AsValue, ColumnDef, Driver, Error, ErrorKind, Executor, Expr, FieldRef, Include, Result,
    RowLabeled, RowVersionStrategy, RowsAffected, SelectQuery, SqlWriter, Statement, TableSchema,
    Value, convert_value, load_references,
    stream::{self, Stream, StreamExt, TryStreamExt},
};
use log::Level;
use std::future::Future;

/// A Rust type mapped to a table, usually implemented by `#[derive(Entity)]`.
///
/// The required methods describe and (de)compose the entity, every operation
/// on the database is a provided method built on top of them and routed
/// through [`Executor::run`].
pub trait Entity: Send + Sync + Sized + 'static {
    /// The description of the entity, built once per process.
    fn schema() -> &'static TableSchema;

    /// Build an entity from a result row. Columns missing from the row keep
    /// their default value.
    fn from_row(row: RowLabeled, writer: &dyn SqlWriter) -> Result<Self>;

    /// One value per column of the schema, in order.
    fn row(&self) -> Vec<Value>;

    /// Assign a column, by field or column name.
    fn set_column(&mut self, name: &str, value: Value) -> Result<()>;

    /// Assign a reference field from the rows loaded for it.
    fn set_reference(
        &mut self,
        field: &str,
        rows: Vec<RowLabeled>,
        writer: &dyn SqlWriter,
    ) -> Result<()>;

    fn query() -> SelectQuery {
        SelectQuery::new(Self::schema())
    }

    /// Primary key value.
    fn key(&self) -> Result<Value> {
        let index = Self::schema().primary_key_index()?;
        Ok(self.row().swap_remove(index))
    }

    fn insert<Exec: Executor>(
        &mut self,
        executor: &mut Exec,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let writer = executor.driver().sql_writer();
            let statement = writer.insert_statement(Self::schema(), &[self.row()], None)?;
            let result = execute_logged(executor, statement).await?;
            refresh_after_insert(self, executor, &writer, result).await
        }
    }

    /// Insert writing only the given fields, the others take the column default.
    fn insert_only<Exec: Executor>(
        &mut self,
        executor: &mut Exec,
        fields: &[&str],
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let writer = executor.driver().sql_writer();
            let statement = writer.insert_statement(Self::schema(), &[self.row()], Some(fields))?;
            let result = execute_logged(executor, statement).await?;
            refresh_after_insert(self, executor, &writer, result).await
        }
    }

    /// Insert many entities, in a single statement when the dialect allows it.
    /// Generated values are not read back.
    fn insert_many<'a, Exec, It>(
        executor: &mut Exec,
        items: It,
    ) -> impl Future<Output = Result<RowsAffected>> + Send
    where
        Exec: Executor,
        It: IntoIterator<Item = &'a Self>,
    {
        let rows: Vec<Vec<Value>> = items.into_iter().map(Entity::row).collect();
        async move {
            let writer = executor.driver().sql_writer();
            let mut total = RowsAffected::default();
            if rows.is_empty() {
                return Ok(total);
            }
            if writer.supports_multi_row_insert() {
                let statement = writer.insert_statement(Self::schema(), &rows, None)?;
                total.extend([execute_logged(executor, statement).await?]);
            } else {
                for row in rows {
                    let statement = writer.insert_statement(Self::schema(), &[row], None)?;
                    total.extend([execute_logged(executor, statement).await?]);
                }
            }
            Ok(total)
        }
    }

    /// Stream the entities selected by a query.
    fn select<Exec: Executor>(
        executor: &mut Exec,
        query: &SelectQuery,
    ) -> impl Stream<Item = Result<Self>> + Send {
        let writer = executor.driver().sql_writer();
        match writer.select_statement(query) {
            Ok(statement) => {
                log::debug!("{}", statement);
                executor
                    .fetch(statement)
                    .map(move |row| row.and_then(|row| Self::from_row(row, &writer)))
                    .left_stream()
            }
            Err(e) => stream::once(async move { Err(e) }).right_stream(),
        }
    }

    fn find_many<Exec: Executor>(
        executor: &mut Exec,
        condition: impl Into<Expr>,
    ) -> impl Future<Output = Result<Vec<Self>>> + Send {
        let query = Self::query().filter(condition);
        async move { Self::select(executor, &query).try_collect().await }
    }

    fn find_one<Exec: Executor>(
        executor: &mut Exec,
        condition: impl Into<Expr>,
    ) -> impl Future<Output = Result<Option<Self>>> + Send {
        let query = Self::query().filter(condition).take(1);
        async move {
            let stream = Self::select(executor, &query);
            let mut stream = std::pin::pin!(stream);
            stream.try_next().await
        }
    }

    fn find_by_id<Exec: Executor>(
        executor: &mut Exec,
        id: impl AsValue,
    ) -> impl Future<Output = Result<Option<Self>>> + Send {
        let condition = key_field(Self::schema()).map(|key| key.eq(id.as_value()));
        async move { Self::find_one(executor, condition?).await }
    }

    fn find_by_ids<Exec, I>(
        executor: &mut Exec,
        ids: I,
    ) -> impl Future<Output = Result<Vec<Self>>> + Send
    where
        Exec: Executor,
        I: IntoIterator,
        I::Item: AsValue,
    {
        let ids: Vec<Expr> = ids.into_iter().map(|v| Expr::Constant(v.as_value())).collect();
        let condition = key_field(Self::schema()).map(|key| key.in_list(ids));
        async move { Self::find_many(executor, condition?).await }
    }

    /// Number of rows of the query.
    fn count<Exec: Executor>(
        executor: &mut Exec,
        query: &SelectQuery,
    ) -> impl Future<Output = Result<u64>> + Send {
        let statement = executor.driver().sql_writer().count_statement(query);
        async move {
            let statement = statement?;
            log::debug!("{}", statement);
            let value = executor.fetch_scalar(statement).await?;
            value
                .as_ref()
                .and_then(Value::as_i128)
                .and_then(|v| u64::try_from(v).ok())
                .ok_or_else(|| Error::msg(format!("Unexpected count result {:?}", value)))
        }
    }

    fn exists<Exec: Executor>(
        executor: &mut Exec,
        condition: impl Into<Expr>,
    ) -> impl Future<Output = Result<bool>> + Send {
        let query = Self::query().filter(condition);
        async move { Ok(Self::count(executor, &query).await? > 0) }
    }

    /// Whether a row with the given key exists. After an
    /// [`ErrorKind::OptimisticConcurrency`] it tells a deleted row from a
    /// modified one.
    fn exists_by_id<Exec: Executor>(
        executor: &mut Exec,
        id: impl AsValue,
    ) -> impl Future<Output = Result<bool>> + Send {
        let condition = key_field(Self::schema()).map(|key| key.eq(id.as_value()));
        async move { Self::exists(executor, condition?).await }
    }

    /// Update every column by primary key. Versioned entities fail with
    /// [`ErrorKind::OptimisticConcurrency`] when the stored version changed,
    /// on success their version is refreshed.
    fn update<Exec: Executor>(
        &mut self,
        executor: &mut Exec,
    ) -> impl Future<Output = Result<()>> + Send {
        update_fields(self, executor, None)
    }

    /// Same as [`Entity::update`] writing only the given fields.
    fn update_only<Exec: Executor>(
        &mut self,
        executor: &mut Exec,
        fields: &[&str],
    ) -> impl Future<Output = Result<()>> + Send {
        update_fields(self, executor, Some(fields))
    }

    /// Assign the given fields on the rows matching the condition. The row
    /// version is not compared, unless the condition does it.
    fn update_where<'a, Exec, I>(
        executor: &mut Exec,
        sets: I,
        condition: impl Into<Expr>,
    ) -> impl Future<Output = Result<RowsAffected>> + Send
    where
        Exec: Executor,
        I: IntoIterator<Item = (&'a str, Expr)>,
    {
        let schema = Self::schema();
        let sets = sets
            .into_iter()
            .map(|(name, value)| Ok((resolve_column(schema, name)?, value)))
            .collect::<Result<Vec<_>>>();
        let condition = condition.into();
        async move {
            let writer = executor.driver().sql_writer();
            let statement = writer.update_where_statement(schema, &sets?, Some(&condition))?;
            execute_logged(executor, statement).await
        }
    }

    /// `field = field + amount` on the rows matching the condition.
    fn update_add<Exec: Executor>(
        executor: &mut Exec,
        field: &str,
        amount: impl Into<Expr>,
        condition: impl Into<Expr>,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let schema = Self::schema();
        let amount = amount.into();
        let sets = resolve_column(schema, field).map(|column| {
            let current = Expr::Field(FieldRef {
                column,
                table: schema.table.clone(),
            });
            vec![(column, current.add(amount))]
        });
        let condition = condition.into();
        async move {
            let writer = executor.driver().sql_writer();
            let statement = writer.update_where_statement(schema, &sets?, Some(&condition))?;
            execute_logged(executor, statement).await
        }
    }

    /// Delete by primary key, comparing the row version when there is one.
    fn delete<Exec: Executor>(
        &self,
        executor: &mut Exec,
    ) -> impl Future<Output = Result<()>> + Send {
        let schema = Self::schema();
        let row = self.row();
        async move {
            let mut condition = key_field(schema)?.eq(Expr::Constant(
                row[schema.primary_key_index()?].clone(),
            ));
            let version = schema.row_version()?;
            if let Some(version) = version {
                let index = schema.column_index(&version.field).unwrap_or_default();
                condition = condition.and(
                    Expr::Field(FieldRef {
                        column: version,
                        table: schema.table.clone(),
                    })
                    .eq(Expr::Constant(row[index].clone())),
                );
            }
            let writer = executor.driver().sql_writer();
            let statement = writer.delete_statement(schema, Some(&condition))?;
            let result = execute_logged(executor, statement).await?;
            expect_single_row(schema, "deleted", result.rows_affected, version.is_some())
        }
    }

    fn delete_by_id<Exec: Executor>(
        executor: &mut Exec,
        id: impl AsValue,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let condition = key_field(Self::schema()).map(|key| key.eq(id.as_value()));
        async move { Self::delete_where(executor, condition?).await }
    }

    fn delete_by_ids<Exec, I>(
        executor: &mut Exec,
        ids: I,
    ) -> impl Future<Output = Result<RowsAffected>> + Send
    where
        Exec: Executor,
        I: IntoIterator,
        I::Item: AsValue,
    {
        let ids: Vec<Expr> = ids.into_iter().map(|v| Expr::Constant(v.as_value())).collect();
        let condition = key_field(Self::schema()).map(|key| key.in_list(ids));
        async move { Self::delete_where(executor, condition?).await }
    }

    fn delete_where<Exec: Executor>(
        executor: &mut Exec,
        condition: impl Into<Expr>,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let condition = condition.into();
        async move {
            let writer = executor.driver().sql_writer();
            let statement = writer.delete_statement(Self::schema(), Some(&condition))?;
            execute_logged(executor, statement).await
        }
    }

    /// Insert when the key is unset or no row has it, update otherwise.
    /// Returns whether the entity was inserted.
    fn save<Exec: Executor>(
        &mut self,
        executor: &mut Exec,
    ) -> impl Future<Output = Result<bool>> + Send {
        async move {
            let key = self.key()?;
            let exists = if is_unset_key(&key) {
                false
            } else {
                Self::exists(executor, key_field(Self::schema())?.eq(key)).await?
            };
            if !exists {
                self.insert(executor).await?;
                Ok(true)
            } else {
                self.update(executor).await?;
                Ok(false)
            }
        }
    }

    /// Load the requested references of already materialized entities.
    fn load_references<Exec: Executor>(
        executor: &mut Exec,
        entities: &mut [Self],
        include: &Include,
    ) -> impl Future<Output = Result<()>> + Send {
        load_references(executor, entities, include)
    }

    /// Select the entities of a query and load their references, the
    /// pagination of the query only applies to the entities themselves.
    fn select_with_references<Exec: Executor>(
        executor: &mut Exec,
        query: &SelectQuery,
        include: &Include,
    ) -> impl Future<Output = Result<Vec<Self>>> + Send {
        async move {
            let mut entities: Vec<Self> = Self::select(executor, query).try_collect().await?;
            load_references(executor, &mut entities, include).await?;
            Ok(entities)
        }
    }
}

fn key_field(schema: &'static TableSchema) -> Result<Expr> {
    Ok(Expr::Field(FieldRef {
        column: schema.primary_key()?,
        table: schema.table.clone(),
    }))
}

fn resolve_column(schema: &'static TableSchema, name: &str) -> Result<&'static ColumnDef> {
    schema.column(name).ok_or_else(|| {
        ErrorKind::mapping(format!(
            "`{}` is not a column of `{}`",
            name, schema.table.name
        ))
    })
}

fn is_unset_key(value: &Value) -> bool {
    match value {
        v if v.is_null() => true,
        Value::Varchar(Some(v)) => v.is_empty(),
        Value::Uuid(Some(v)) => v.is_nil(),
        v => v.as_i128() == Some(0),
    }
}

async fn execute_logged<Exec: Executor>(
    executor: &mut Exec,
    statement: Statement,
) -> Result<RowsAffected> {
    log::debug!("{}", statement);
    executor.execute(statement).await
}

fn expect_single_row(
    schema: &TableSchema,
    verb: &str,
    rows_affected: u64,
    versioned: bool,
) -> Result<()> {
    if rows_affected == 1 {
        return Ok(());
    }
    if rows_affected == 0 && versioned {
        let error = ErrorKind::optimistic_concurrency(schema.table.name.clone());
        log::info!("{}", error);
        return Err(error);
    }
    let error = Error::msg(format!(
        "The query {} {} rows of `{}` instead of the expected 1",
        verb, rows_affected, schema.table.name
    ));
    log::log!(
        if rows_affected == 0 {
            Level::Info
        } else {
            Level::Error
        },
        "{}",
        error
    );
    Err(error)
}

async fn update_fields<E: Entity, Exec: Executor>(
    entity: &mut E,
    executor: &mut Exec,
    fields: Option<&[&str]>,
) -> Result<()> {
    let schema = E::schema();
    let writer = executor.driver().sql_writer();
    let row = entity.row();
    let (statement, versioned) = writer.update_statement(schema, &row, fields)?;
    let result = execute_logged(executor, statement).await?;
    expect_single_row(schema, "updated", result.rows_affected, versioned)?;
    let Some(version) = schema.row_version()? else {
        return Ok(());
    };
    match writer.row_version_strategy() {
        RowVersionStrategy::Increment => {
            let index = schema.column_index(&version.field).unwrap_or_default();
            let next = row[index]
                .as_i128()
                .and_then(|v| u64::try_from(v + 1).ok())
                .unwrap_or(1);
            entity.set_column(
                &version.field,
                convert_value(Value::UInt64(Some(next)), &version.value),
            )
        }
        RowVersionStrategy::ServerGenerated => {
            refresh_row_version(entity, executor, &writer, version).await
        }
    }
}

async fn refresh_after_insert<E, Exec, W>(
    entity: &mut E,
    executor: &mut Exec,
    writer: &W,
    result: RowsAffected,
) -> Result<()>
where
    E: Entity,
    Exec: Executor,
    W: SqlWriter,
{
    let schema = E::schema();
    if let Some(column) = schema.auto_increment()
        && let Some(id) = result.last_affected_id
    {
        entity.set_column(&column.field, writer.from_db_value(Value::Int64(Some(id)), column))?;
    }
    let Some(version) = schema.row_version()? else {
        return Ok(());
    };
    match writer.row_version_strategy() {
        RowVersionStrategy::Increment => entity.set_column(
            &version.field,
            convert_value(writer.initial_row_version(), &version.value),
        ),
        RowVersionStrategy::ServerGenerated => {
            refresh_row_version(entity, executor, writer, version).await
        }
    }
}

/// Read back a version maintained by the database.
async fn refresh_row_version<E, Exec, W>(
    entity: &mut E,
    executor: &mut Exec,
    writer: &W,
    version: &'static ColumnDef,
) -> Result<()>
where
    E: Entity,
    Exec: Executor,
    W: SqlWriter,
{
    let schema = E::schema();
    let statement = writer.row_version_statement(schema, entity.key()?)?;
    log::debug!("{}", statement);
    match executor.fetch_scalar(statement).await? {
        Some(value) => entity.set_column(&version.field, writer.from_db_value(value, version)),
        None => Err(ErrorKind::optimistic_concurrency(schema.table.name.clone())),
    }
}
