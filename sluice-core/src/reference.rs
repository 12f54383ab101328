use crate::{
    ColumnDef, Driver, Entity, ErrorKind, Executor, Expr, FieldRef, ReferenceDef, ReferenceKind,
    Result, RowLabeled, SelectQuery, SqlWriter, TableSchema, Value, ValueKey,
    stream::TryStreamExt,
};
use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
};

/// Which declared references the loader populates.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub enum Include {
    All,
    Only(Vec<Cow<'static, str>>),
    #[default]
    None,
}

impl Include {
    pub fn only<I>(fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cow<'static, str>>,
    {
        Include::Only(fields.into_iter().map(Into::into).collect())
    }

    pub fn includes(&self, field: &str) -> bool {
        match self {
            Include::All => true,
            Include::Only(fields) => fields.iter().any(|v| v.eq_ignore_ascii_case(field)),
            Include::None => false,
        }
    }
}

/// How the rows of one relationship are matched back onto the owners.
struct Plan {
    /// Column of the owner holding the matching key.
    owner_key: &'static ColumnDef,
    /// Column of the target compared with the owner keys.
    target_key: &'static ColumnDef,
}

fn plan(schema: &'static TableSchema, reference: &ReferenceDef) -> Result<Plan> {
    let target = (reference.target)();
    let from_target = || -> Result<Option<Plan>> {
        Ok(match target.foreign_key_to(schema) {
            Some(key) => Some(Plan {
                owner_key: schema.primary_key()?,
                target_key: key,
            }),
            None => None,
        })
    };
    let plan = match reference.kind {
        ReferenceKind::Many => from_target()?,
        ReferenceKind::One => match schema.foreign_key_to(target) {
            Some(key) => Some(Plan {
                owner_key: key,
                target_key: target.primary_key()?,
            }),
            None => from_target()?,
        },
    };
    plan.ok_or_else(|| {
        ErrorKind::mapping(format!(
            "Cannot load `{}.{}`: no foreign key relates `{}` and `{}`",
            schema.type_name, reference.field, schema.table.name, target.table.name
        ))
    })
}

/// Populate the requested references of `entities` with one query per
/// relationship, filtered on the keys of the given entities only.
pub async fn load_references<E, Exec>(
    executor: &mut Exec,
    entities: &mut [E],
    include: &Include,
) -> Result<()>
where
    E: Entity,
    Exec: Executor,
{
    let schema = E::schema();
    if entities.is_empty() {
        return Ok(());
    }
    let writer = executor.driver().sql_writer();
    for reference in schema
        .references
        .iter()
        .filter(|r| include.includes(&r.field))
    {
        let plan = plan(schema, reference)?;
        let target = (reference.target)();
        let owner_index = schema.column_index(&plan.owner_key.field).unwrap_or_default();
        let owner_keys: Vec<Value> = entities
            .iter()
            .map(|e| e.row().swap_remove(owner_index))
            .collect();
        let mut seen = HashSet::new();
        let distinct: Vec<Value> = owner_keys
            .iter()
            .filter(|v| v.as_key().is_some_and(|k| seen.insert(k)))
            .cloned()
            .collect();
        let mut grouped: HashMap<ValueKey, Vec<RowLabeled>> = HashMap::new();
        if !distinct.is_empty() {
            let query = SelectQuery::new(target).filter(
                Expr::Field(FieldRef {
                    column: plan.target_key,
                    table: target.table.clone(),
                })
                .in_list(distinct),
            );
            let statement = writer.select_statement(&query)?;
            log::debug!("{}", statement);
            let rows: Vec<RowLabeled> = executor.fetch(statement).try_collect().await?;
            for row in rows {
                let key = row
                    .get_column(plan.target_key.name())
                    .cloned()
                    .map(|v| writer.from_db_value(v, plan.target_key))
                    .and_then(|v| v.as_key());
                match key {
                    Some(key) => grouped.entry(key).or_default().push(row),
                    None => log::warn!(
                        "Row of `{}` without `{}`, it cannot be matched to `{}`",
                        target.table.name,
                        plan.target_key.name(),
                        schema.table.name
                    ),
                }
            }
        }
        for (entity, key) in entities.iter_mut().zip(owner_keys) {
            let rows = key
                .as_key()
                .and_then(|k| grouped.get(&k))
                .cloned()
                .unwrap_or_default();
            entity.set_reference(&reference.field, rows, &writer)?;
        }
    }
    Ok(())
}
