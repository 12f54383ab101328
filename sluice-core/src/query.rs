use crate::{
    Entity, Expr, JoinType, Ordered, Projected, Result, SqlWriter, Statement, TableSchema,
};
use std::borrow::Cow;

/// Table joined to the root of a [`SelectQuery`].
#[derive(Debug, Clone)]
pub struct Join {
    pub join_type: JoinType,
    pub schema: &'static TableSchema,
    pub alias: Option<Cow<'static, str>>,
    /// Join condition, when missing it is derived from the foreign keys.
    pub on: Option<Expr>,
}

#[derive(Default, Debug, Clone)]
pub enum Projection {
    /// Every mapped column of the root entity.
    #[default]
    All,
    /// Named columns, other columns are left to their defaults when materializing.
    Columns(Vec<Cow<'static, str>>),
    /// Arbitrary expressions with optional output names.
    Expressions(Vec<Projected>),
}

/// Mutable accumulator of the clauses of one query.
///
/// Rendering does not consume nor modify the builder: it can be rendered any
/// number of times, also against different dialects, and modified in between.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub schema: &'static TableSchema,
    pub alias: Option<Cow<'static, str>>,
    pub joins: Vec<Join>,
    pub condition: Option<Expr>,
    pub projection: Projection,
    pub distinct: bool,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<Ordered>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// Render values as literals instead of parameters.
    pub inline_values: bool,
}

impl SelectQuery {
    pub fn new(schema: &'static TableSchema) -> Self {
        Self {
            schema,
            alias: None,
            joins: Vec::new(),
            condition: None,
            projection: Projection::All,
            distinct: false,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            offset: None,
            limit: None,
            inline_values: false,
        }
    }

    pub fn from<E: Entity>() -> Self {
        Self::new(E::schema())
    }

    pub fn alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add a filter, AND-combined with the filters already present.
    pub fn filter(mut self, condition: impl Into<Expr>) -> Self {
        let condition = condition.into();
        self.condition = Some(match self.condition.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
        self
    }

    /// Same as [`SelectQuery::filter`].
    pub fn and(self, condition: impl Into<Expr>) -> Self {
        self.filter(condition)
    }

    /// OR-combine with the filter accumulated so far.
    pub fn or(mut self, condition: impl Into<Expr>) -> Self {
        let condition = condition.into();
        self.condition = Some(match self.condition.take() {
            Some(current) => current.or(condition),
            None => condition,
        });
        self
    }

    /// Inner join `J`, the condition comes from the foreign keys between `J`
    /// and the tables already in the query.
    pub fn join<J: Entity>(self) -> Self {
        self.join_with(JoinType::Inner, J::schema(), None)
    }

    pub fn left_join<J: Entity>(self) -> Self {
        self.join_with(JoinType::Left, J::schema(), None)
    }

    pub fn join_on<J: Entity>(self, on: impl Into<Expr>) -> Self {
        self.join_with(JoinType::Inner, J::schema(), Some(on.into()))
    }

    pub fn left_join_on<J: Entity>(self, on: impl Into<Expr>) -> Self {
        self.join_with(JoinType::Left, J::schema(), Some(on.into()))
    }

    pub fn join_with(
        mut self,
        join_type: JoinType,
        schema: &'static TableSchema,
        on: Option<Expr>,
    ) -> Self {
        self.joins.push(Join {
            join_type,
            schema,
            alias: None,
            on,
        });
        self
    }

    /// Alias the last joined table.
    pub fn join_alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        if let Some(join) = self.joins.last_mut() {
            join.alias = Some(alias.into());
        }
        self
    }

    pub fn group_by<I>(mut self, expressions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        self.group_by
            .extend(expressions.into_iter().map(Into::into));
        self
    }

    pub fn having(mut self, condition: impl Into<Expr>) -> Self {
        let condition = condition.into();
        self.having = Some(match self.having.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
        self
    }

    /// Replace the ordering.
    pub fn order_by(mut self, ordered: impl Into<Ordered>) -> Self {
        self.order_by.clear();
        self.order_by.push(ordered.into());
        self
    }

    pub fn order_by_descending(self, expression: impl Into<Expr>) -> Self {
        self.order_by(expression.into().desc())
    }

    /// Append a secondary ordering.
    pub fn then_by(mut self, ordered: impl Into<Ordered>) -> Self {
        self.order_by.push(ordered.into());
        self
    }

    pub fn then_by_descending(self, expression: impl Into<Expr>) -> Self {
        self.then_by(expression.into().desc())
    }

    /// Project arbitrary expressions.
    pub fn select<I>(mut self, expressions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Projected>,
    {
        self.projection =
            Projection::Expressions(expressions.into_iter().map(Into::into).collect());
        self
    }

    /// Project a subset of the mapped columns, by field or column name.
    pub fn select_columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cow<'static, str>>,
    {
        self.projection = Projection::Columns(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn select_distinct<I>(self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cow<'static, str>>,
    {
        let mut result = self.select_columns(columns);
        result.distinct = true;
        result
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn take(mut self, rows: u64) -> Self {
        self.limit = Some(rows);
        self
    }

    pub fn skip(mut self, rows: u64) -> Self {
        self.offset = Some(rows);
        self
    }

    /// Set both the offset and the number of rows.
    pub fn limit(mut self, skip: Option<u64>, rows: Option<u64>) -> Self {
        self.offset = skip;
        self.limit = rows;
        self
    }

    pub fn clear_limits(mut self) -> Self {
        self.offset = None;
        self.limit = None;
        self
    }

    pub fn inline_values(mut self, inline: bool) -> Self {
        self.inline_values = inline;
        self
    }

    pub fn is_paginated(&self) -> bool {
        self.offset.is_some_and(|v| v > 0) || self.limit.is_some()
    }

    /// Compile against a dialect.
    pub fn to_statement(&self, writer: &dyn SqlWriter) -> Result<Statement> {
        writer.select_statement(self)
    }

    /// Compile the `COUNT(*)` of this query against a dialect.
    pub fn to_count_statement(&self, writer: &dyn SqlWriter) -> Result<Statement> {
        writer.count_statement(self)
    }
}
