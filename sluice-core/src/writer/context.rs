use crate::{ErrorKind, FieldRef, Member, Params, Result, TableRef, TableSchema};
use std::{
    borrow::Cow,
    ops::{Deref, DerefMut},
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlDeleteFrom,
    SqlDeleteFromWhere,
    SqlInsertInto,
    SqlInsertIntoValues,
    SqlJoin,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectGroupBy,
    SqlSelectHaving,
    SqlSelectOrderBy,
    SqlSelectWhere,
    SqlUpdate,
    SqlUpdateSet,
    SqlUpdateWhere,
}

/// A table visible to the expressions being written.
#[derive(Debug, Clone)]
pub struct Scope {
    pub schema: &'static TableSchema,
    pub table: TableRef,
}

impl Scope {
    pub fn new(schema: &'static TableSchema, alias: Option<&Cow<'static, str>>) -> Self {
        let table = match alias {
            Some(alias) => schema.table.with_alias(alias.clone()),
            None => schema.table.clone(),
        };
        Self { schema, table }
    }

    fn matches(&self, name: &str) -> bool {
        if !self.table.alias.is_empty() {
            return self.table.alias == name;
        }
        self.schema.type_name.eq_ignore_ascii_case(name)
            || self.table.name.eq_ignore_ascii_case(name)
    }
}

/// State carried while writing one statement: the fragment being written,
/// the tables in scope and the parameters collected so far.
#[derive(Debug, Clone)]
pub struct Context {
    pub fragment: Fragment,
    pub qualify_columns: bool,
    pub inline_values: bool,
    pub params: Params,
    pub scope: Vec<Scope>,
}

impl Context {
    pub fn new(fragment: Fragment, inline_values: bool) -> Self {
        Self {
            fragment,
            qualify_columns: false,
            inline_values,
            params: Params::new(),
            scope: Vec::new(),
        }
    }

    pub fn switch_fragment<'s>(&'s mut self, fragment: Fragment) -> ContextUpdater<'s> {
        let previous = self.fragment;
        self.fragment = fragment;
        ContextUpdater {
            current: self,
            previous,
        }
    }

    /// Replace the tables in scope, returning the previous ones.
    pub fn enter_scope(&mut self, scope: Vec<Scope>, qualify_columns: bool) -> (Vec<Scope>, bool) {
        let previous_qualify = self.qualify_columns;
        self.qualify_columns = qualify_columns;
        (std::mem::replace(&mut self.scope, scope), previous_qualify)
    }

    pub fn leave_scope(&mut self, previous: (Vec<Scope>, bool)) {
        self.scope = previous.0;
        self.qualify_columns = previous.1;
    }

    /// Run `f` with the given tables in scope, restoring the previous ones after.
    pub fn scoped<R>(
        &mut self,
        scope: Vec<Scope>,
        qualify_columns: bool,
        f: impl FnOnce(&mut Context) -> R,
    ) -> R {
        let previous = self.enter_scope(scope, qualify_columns);
        let result = f(self);
        self.leave_scope(previous);
        result
    }

    /// Find the column a member refers to. Unqualified members are searched in
    /// the root table first and then in the joined tables in order.
    pub fn resolve(&self, member: &Member) -> Result<FieldRef> {
        let candidates: Vec<&Scope> = match &member.table {
            Some(table) => {
                let found: Vec<_> = self.scope.iter().filter(|s| s.matches(table)).collect();
                if found.is_empty() {
                    return Err(ErrorKind::mapping(format!(
                        "`{table}` is not one of the tables of the query ({})",
                        self.scope_names()
                    )));
                }
                found
            }
            None => self.scope.iter().collect(),
        };
        candidates
            .into_iter()
            .find_map(|s| {
                s.schema.column(&member.name).map(|column| FieldRef {
                    column,
                    table: s.table.clone(),
                })
            })
            .ok_or_else(|| {
                ErrorKind::mapping(format!(
                    "Cannot resolve `{}{}{}`, it is not a column of {}",
                    member.table.as_deref().unwrap_or_default(),
                    if member.table.is_some() { "." } else { "" },
                    member.name,
                    self.scope_names()
                ))
            })
    }

    fn scope_names(&self) -> String {
        self.scope
            .iter()
            .map(|s| s.schema.table.name.as_ref())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Fragment::None, false)
    }
}

/// Restores the previous fragment when dropped.
pub struct ContextUpdater<'a> {
    current: &'a mut Context,
    previous: Fragment,
}

impl Deref for ContextUpdater<'_> {
    type Target = Context;
    fn deref(&self) -> &Self::Target {
        self.current
    }
}

impl DerefMut for ContextUpdater<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.current
    }
}

impl Drop for ContextUpdater<'_> {
    fn drop(&mut self) {
        self.current.fragment = self.previous;
    }
}
