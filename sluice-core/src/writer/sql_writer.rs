use crate::{
    BinaryOpType, ColumnDef, ColumnRef, EnumRepr, EnumValue, Error, ErrorKind, Expr, FieldRef,
    Function, InTarget, JoinType, Member, Order, Projection, Result, SelectQuery, Statement,
    StatementKind, TableRef, TableSchema, UnaryOpType, Value, convert_value,
    possibly_parenthesized, separated_by, try_separated_by,
    writer::{Context, Fragment, Scope, fold},
};
use std::{borrow::Cow, fmt::Write};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident, $out:ident, $value:expr) => {{
        if $value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        } else {
            log::error!("Cannot write the non finite float {} as a literal", $value);
            $this.write_value_none($context, $out);
        }
    }};
}

fn to_utc(value: &OffsetDateTime) -> PrimitiveDateTime {
    let value = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(value.date(), value.time())
}

/// How a dialect limits the number of rows of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `LIMIT n OFFSET m`
    LimitOffset,
    /// `SELECT TOP (n)`, cannot skip rows.
    Top,
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`, requires an `ORDER BY`.
    OffsetFetch,
    /// Nested queries filtering on `ROWNUM`.
    RowNum,
    /// `SELECT FIRST n SKIP m`
    FirstSkip,
}

/// How a row version column gets its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVersionStrategy {
    /// The statement itself writes `version = version + 1`.
    Increment,
    /// The database maintains the value, it is read back after each write.
    ServerGenerated,
}

/// The pieces of a select, written in the order the parameters are collected.
#[derive(Default, Debug, Clone)]
pub struct SelectParts {
    pub distinct: bool,
    pub columns: String,
    pub output_names: Vec<String>,
    /// `FROM` and everything up to `HAVING`.
    pub body: String,
    /// `ORDER BY` list without the keyword, possibly empty.
    pub order_by: String,
}

/// Dialect printer converting queries, expressions and values into SQL text.
///
/// Every method has an ANSI flavored default, dialects override what they do
/// differently. Writers are stateless, everything produced while writing a
/// statement lives in the [`Context`].
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Whether the current fragment context allows alias declaration.
    fn alias_declaration(&self, context: &mut Context) -> bool {
        matches!(context.fragment, Fragment::SqlSelectFrom | Fragment::SqlJoin)
    }

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// Render a table reference, declaring the alias in `FROM` and `JOIN`.
    fn write_table_ref(&self, context: &mut Context, out: &mut String, value: &TableRef) {
        let declaration = self.alias_declaration(context);
        if declaration || value.alias.is_empty() {
            if !value.schema.is_empty() {
                self.write_identifier_quoted(context, out, &value.schema);
                out.push('.');
            }
            self.write_identifier_quoted(context, out, &value.name);
        }
        if !value.alias.is_empty() {
            if declaration {
                out.push(' ');
            }
            self.write_identifier_quoted(context, out, &value.alias);
        }
    }

    /// Column of a table, qualified when the context requires it.
    fn write_qualified_column(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableRef,
        name: &str,
    ) {
        if context.qualify_columns && !table.name.is_empty() {
            let mut context = context.switch_fragment(Fragment::None);
            self.write_table_ref(&mut context, out, table);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, name);
    }

    fn write_column_ref(&self, context: &mut Context, out: &mut String, value: &ColumnRef) {
        self.write_qualified_column(context, out, &value.table_ref(), &value.name);
    }

    fn write_field_ref(&self, context: &mut Context, out: &mut String, value: &FieldRef) {
        if value.column.row_version {
            self.write_row_version_column(context, out, value);
        } else {
            self.write_qualified_column(context, out, &value.table, value.column.name());
        }
    }

    /// The row version as it must appear in projections and conditions.
    fn write_row_version_column(&self, context: &mut Context, out: &mut String, value: &FieldRef) {
        self.write_qualified_column(context, out, &value.table, value.column.name());
    }

    /// Whether the row version is an expression that needs an output alias.
    fn row_version_is_expression(&self) -> bool {
        false
    }

    fn row_version_strategy(&self) -> RowVersionStrategy {
        RowVersionStrategy::Increment
    }

    /// Value written in the row version column of new rows.
    fn initial_row_version(&self) -> Value {
        Value::UInt64(Some(1))
    }

    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, context, out, *v),
            Value::Float64(Some(v)) => write_float!(self, context, out, *v),
            Value::Decimal(Some(v), ..) => {
                let _ = write!(out, "{}", v);
            }
            Value::Char(Some(v)) => self.write_value_string(context, out, v.encode_utf8(&mut [0; 4])),
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v),
            Value::Date(Some(v)) => self.write_value_date(context, out, v),
            Value::Time(Some(v)) => self.write_value_time(context, out, v),
            Value::Timestamp(Some(v)) => self.write_value_timestamp(context, out, v),
            Value::TimestampWithTimezone(Some(v)) => {
                self.write_value_timestamptz(context, out, v)
            }
            Value::Uuid(Some(v)) => {
                let _ = write!(out, "'{}'", v);
            }
            Value::Enum(Some(EnumValue {
                name: Some(name), ..
            })) => self.write_value_string(context, out, name),
            Value::Enum(Some(EnumValue {
                ordinal: Some(ordinal),
                ..
            })) => write_integer!(out, *ordinal),
            Value::Json(Some(v)) => self.write_value_string(context, out, &v.to_string()),
            v => {
                log::error!("Unexpected value {:?}, writing NULL in its place", v);
                self.write_value_none(context, out)
            }
        }
    }

    fn write_value_none(&self, _context: &mut Context, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push_str(["FALSE", "TRUE"][value as usize]);
    }

    fn write_value_string(&self, _context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == '\'' {
                out.push_str(&value[position..i]);
                out.push_str("''");
                position = i + 1;
            }
        }
        out.push_str(&value[position..]);
        out.push('\'');
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    fn write_date(&self, _context: &mut Context, out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    fn write_time(&self, _context: &mut Context, out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second(),
        );
        let mut subsecond = value.nanosecond();
        if subsecond != 0 {
            let mut width = 9;
            while subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond);
        }
    }

    fn write_value_date(&self, context: &mut Context, out: &mut String, value: &Date) {
        out.push('\'');
        self.write_date(context, out, value);
        out.push('\'');
    }

    fn write_value_time(&self, context: &mut Context, out: &mut String, value: &Time) {
        out.push('\'');
        self.write_time(context, out, value);
        out.push('\'');
    }

    fn write_value_timestamp(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &PrimitiveDateTime,
    ) {
        out.push('\'');
        self.write_date(context, out, &value.date());
        out.push(' ');
        self.write_time(context, out, &value.time());
        out.push('\'');
    }

    fn write_value_timestamptz(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &OffsetDateTime,
    ) {
        if !self.supports_timestamp_offset() {
            return self.write_value_timestamp(context, out, &to_utc(value));
        }
        out.push('\'');
        self.write_date(context, out, &value.date());
        out.push(' ');
        self.write_time(context, out, &value.time());
        let offset = value.offset();
        let _ = write!(
            out,
            "{}{:02}:{:02}",
            if offset.is_negative() { '-' } else { '+' },
            offset.whole_hours().abs(),
            offset.minutes_past_hour().abs()
        );
        out.push('\'');
    }

    /// Whether timestamps can carry an offset, otherwise they are stored as UTC.
    fn supports_timestamp_offset(&self) -> bool {
        true
    }

    /// Convert a host value to what gets bound for `column`.
    fn to_db_value(&self, value: Value, column: Option<&ColumnDef>) -> Value {
        match value {
            Value::Enum(Some(v)) => {
                let repr = column.map(|c| c.enum_repr).unwrap_or_default();
                match (repr, v) {
                    (EnumRepr::Name, EnumValue { name: Some(v), .. }) => {
                        Value::Varchar(Some(v.into_owned()))
                    }
                    (EnumRepr::Char, EnumValue {
                        ordinal: Some(v), ..
                    }) => Value::Char(u32::try_from(v).ok().and_then(char::from_u32)),
                    (_, EnumValue {
                        ordinal: Some(v), ..
                    }) => Value::Int64(Some(v)),
                    (_, EnumValue { name: Some(v), .. }) => Value::Varchar(Some(v.into_owned())),
                    _ => Value::Null,
                }
            }
            Value::Enum(None) => match column.map(|c| c.enum_repr).unwrap_or_default() {
                EnumRepr::Name => Value::Varchar(None),
                EnumRepr::Ordinal => Value::Int64(None),
                EnumRepr::Char => Value::Char(None),
            },
            Value::Json(v) => Value::Varchar(v.map(|v| v.to_string())),
            Value::TimestampWithTimezone(v) if !self.supports_timestamp_offset() => {
                Value::Timestamp(v.as_ref().map(to_utc))
            }
            v => v,
        }
    }

    /// Normalize a value returned by the driver to the declared type of `column`.
    fn from_db_value(&self, value: Value, column: &ColumnDef) -> Value {
        let was_null = value.is_null();
        let result = convert_value(value, &column.value);
        if !was_null && result.is_null() {
            log::warn!(
                "Column `{}` could not be converted to {:?}, using NULL",
                column.name(),
                column.value
            );
        }
        result
    }

    /// Escape LIKE wildcards, returns whether any escaping happened.
    fn escape_wildcards(&self, value: &str) -> (String, bool) {
        let escape = self.like_escape_char();
        let mut escaped = false;
        let mut result = String::with_capacity(value.len());
        for c in value.chars() {
            if c == escape || self.like_wildcards().contains(&c) {
                result.push(escape);
                escaped = true;
            }
            result.push(c);
        }
        (result, escaped)
    }

    fn like_escape_char(&self) -> char {
        '^'
    }

    /// Characters with a special meaning inside a LIKE pattern.
    fn like_wildcards(&self) -> &'static [char] {
        &['%', '_', '\\']
    }

    /// Marker of the `index`-th positional parameter.
    fn param_marker(&self, index: usize) -> Cow<'static, str> {
        format!("@{index}").into()
    }

    /// Marker of a named parameter, `None` when the dialect only has positional ones.
    fn named_param_marker(&self, name: &str) -> Option<Cow<'static, str>> {
        Some(format!("@{name}").into())
    }

    /// Values rendered as literals even when parameters are used.
    fn inline_value(&self, value: &Value) -> bool {
        value.is_null() || matches!(value, Value::Boolean(..))
    }

    fn write_param(&self, context: &mut Context, out: &mut String, value: Value) {
        let marker = self.param_marker(context.params.len());
        out.push_str(&marker);
        context.params.push(marker, value);
    }

    fn write_named_param(&self, context: &mut Context, out: &mut String, name: &str, value: Value) {
        let value = self.to_db_value(value, None);
        if context.inline_values {
            return self.write_value(context, out, &value);
        }
        match self.named_param_marker(name) {
            Some(marker) => {
                out.push_str(&marker);
                if context.params.position(&marker).is_none() {
                    context.params.push(marker, value);
                }
            }
            None => self.write_param(context, out, value),
        }
    }

    /// A value, bound as a parameter or written as a literal.
    fn write_operand(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Value,
        column: Option<&ColumnDef>,
    ) {
        let value = self.to_db_value(value.clone(), column);
        if context.inline_values || self.inline_value(&value) {
            self.write_value(context, out, &value);
        } else {
            self.write_param(context, out, value);
        }
    }

    fn true_expression(&self) -> &'static str {
        "(1=1)"
    }

    fn false_expression(&self) -> &'static str {
        "(1=0)"
    }

    /// Whether predicates can be used where a value is expected, otherwise they
    /// are wrapped in `CASE WHEN .. THEN .. ELSE .. END`.
    fn supports_boolean_values(&self) -> bool {
        true
    }

    fn expression_unary_op_precedence(&self, value: &UnaryOpType) -> i32 {
        match value {
            UnaryOpType::Negative => 1250,
            UnaryOpType::Not => 250,
        }
    }

    fn expression_binary_op_precedence(&self, value: &BinaryOpType) -> i32 {
        match value {
            BinaryOpType::Or => 100,
            BinaryOpType::And => 200,
            BinaryOpType::Equal
            | BinaryOpType::NotEqual
            | BinaryOpType::Less
            | BinaryOpType::Greater
            | BinaryOpType::LessEqual
            | BinaryOpType::GreaterEqual => 300,
            BinaryOpType::Concat => 700,
            BinaryOpType::Subtraction | BinaryOpType::Addition => 800,
            BinaryOpType::Multiplication | BinaryOpType::Division | BinaryOpType::Remainder => 900,
        }
    }

    fn expression_precedence(&self, value: &Expr) -> i32 {
        match value {
            Expr::Binary(op, ..) => self.expression_binary_op_precedence(op),
            Expr::Unary(op, ..) => self.expression_unary_op_precedence(op),
            Expr::In { .. } | Expr::IsNull { .. } | Expr::Like { .. } => 400,
            Expr::Constant(v) if v.as_f64().is_some_and(|v| v < 0.0) => 1250,
            _ => 1_000_000,
        }
    }

    /// Precedence of an expression written in predicate position.
    fn predicate_precedence(&self, value: &Expr) -> i32 {
        match value {
            Expr::Null | Expr::Constant(..) => 1_000_000,
            v if v.is_predicate() => self.expression_precedence(v),
            // Written as `value = TRUE`
            _ => self.expression_binary_op_precedence(&BinaryOpType::Equal),
        }
    }

    fn fold_expression(&self, context: &Context, value: &Expr) -> Result<Expr> {
        fold::fold(self.as_dyn(), context, value)
    }

    fn function_name(&self, function: &Function) -> Cow<'static, str> {
        match function {
            Function::Count | Function::CountDistinct => "COUNT".into(),
            Function::Sum => "SUM".into(),
            Function::Avg => "AVG".into(),
            Function::Min => "MIN".into(),
            Function::Max => "MAX".into(),
            Function::Upper => "UPPER".into(),
            Function::Lower => "LOWER".into(),
            Function::Trim => "TRIM".into(),
            Function::Length => "LENGTH".into(),
            Function::Coalesce => "COALESCE".into(),
            Function::StartsWith | Function::EndsWith | Function::Contains => "LIKE".into(),
            Function::Custom(name) => name.clone(),
        }
    }

    /// An already folded expression in predicate position (`WHERE`, `ON`,
    /// `HAVING`, `CASE WHEN`).
    fn write_predicate(&self, context: &mut Context, out: &mut String, value: &Expr) -> Result<()> {
        match value {
            Expr::Null => out.push_str(self.false_expression()),
            Expr::Constant(v) if v.as_bool().is_some() || v.is_null() => {
                out.push_str(if v.as_bool() == Some(true) {
                    self.true_expression()
                } else {
                    self.false_expression()
                })
            }
            Expr::Binary(op @ (BinaryOpType::And | BinaryOpType::Or), lhs, rhs) => {
                self.write_expression_logical(context, out, op, lhs, rhs)?
            }
            Expr::Unary(UnaryOpType::Not, operand) => {
                out.push_str("NOT (");
                self.write_predicate(context, out, operand)?;
                out.push(')');
            }
            v if v.is_predicate() => self.write_expression_raw(context, out, v)?,
            v => {
                let precedence = self.expression_binary_op_precedence(&BinaryOpType::Equal);
                possibly_parenthesized!(
                    out,
                    self.expression_precedence(v) <= precedence,
                    self.write_expression(context, out, v)?
                );
                out.push_str(" = ");
                self.write_value_bool(context, out, true);
            }
        }
        Ok(())
    }

    /// An already folded expression in value position.
    fn write_expression(&self, context: &mut Context, out: &mut String, value: &Expr) -> Result<()> {
        if value.is_predicate() && !self.supports_boolean_values() {
            out.push_str("CASE WHEN ");
            self.write_predicate(context, out, value)?;
            out.push_str(" THEN ");
            self.write_value_bool(context, out, true);
            out.push_str(" ELSE ");
            self.write_value_bool(context, out, false);
            out.push_str(" END");
            return Ok(());
        }
        self.write_expression_raw(context, out, value)
    }

    fn write_expression_raw(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Expr,
    ) -> Result<()> {
        match value {
            Expr::Null => self.write_value_none(context, out),
            Expr::Constant(v) => self.write_operand(context, out, v, None),
            Expr::Column(v) => self.write_column_ref(context, out, v),
            Expr::Field(v) => self.write_field_ref(context, out, v),
            Expr::Member(v) => {
                let field = context.resolve(v)?;
                self.write_field_ref(context, out, &field)
            }
            Expr::Named(name, v) => self.write_named_param(context, out, name, v.clone()),
            Expr::Eval(v) => {
                let value = v.evaluate();
                self.write_operand(context, out, &value, None)
            }
            Expr::Sql(v) => out.push_str(v),
            Expr::Asterisk => out.push('*'),
            Expr::Binary(op, lhs, rhs) => {
                self.write_expression_binary_op(context, out, op, lhs, rhs)?
            }
            Expr::Unary(op, operand) => self.write_expression_unary_op(context, out, op, operand)?,
            Expr::Call(function, args) => {
                self.write_expression_call(context, out, function, args)?
            }
            Expr::Conditional(test, then, otherwise) => {
                out.push_str("CASE WHEN ");
                self.write_predicate(context, out, test)?;
                out.push_str(" THEN ");
                self.write_expression(context, out, then)?;
                out.push_str(" ELSE ");
                self.write_expression(context, out, otherwise)?;
                out.push_str(" END");
            }
            Expr::In {
                expr,
                target,
                negated,
            } => self.write_expression_in(context, out, expr, target, *negated)?,
            Expr::IsNull { expr, negated } => {
                possibly_parenthesized!(
                    out,
                    self.expression_precedence(expr) < 400,
                    self.write_expression(context, out, expr)?
                );
                out.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Expr::Like {
                expr,
                pattern,
                negated,
                escape,
            } => {
                possibly_parenthesized!(
                    out,
                    self.expression_precedence(expr) < 400,
                    self.write_expression(context, out, expr)?
                );
                out.push_str(if *negated { " NOT LIKE " } else { " LIKE " });
                possibly_parenthesized!(
                    out,
                    self.expression_precedence(pattern) <= 400,
                    self.write_expression(context, out, pattern)?
                );
                if *escape {
                    let _ = write!(out, " ESCAPE '{}'", self.like_escape_char());
                }
            }
        };
        Ok(())
    }

    fn write_expression_logical(
        &self,
        context: &mut Context,
        out: &mut String,
        op: &BinaryOpType,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<()> {
        let precedence = self.expression_binary_op_precedence(op);
        possibly_parenthesized!(
            out,
            self.predicate_precedence(lhs) < precedence,
            self.write_predicate(context, out, lhs)?
        );
        out.push_str(if *op == BinaryOpType::And {
            " AND "
        } else {
            " OR "
        });
        possibly_parenthesized!(
            out,
            self.predicate_precedence(rhs) <= precedence,
            self.write_predicate(context, out, rhs)?
        );
        Ok(())
    }

    /// Operand next to a column: constants are converted for that column.
    fn write_expression_operand(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Expr,
        other: &Expr,
    ) -> Result<()> {
        match (value, other) {
            (Expr::Constant(v), Expr::Field(field)) => {
                self.write_operand(context, out, v, Some(field.column));
                Ok(())
            }
            _ => self.write_expression(context, out, value),
        }
    }

    fn write_expression_binary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        op: &BinaryOpType,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<()> {
        let infix = match op {
            BinaryOpType::And | BinaryOpType::Or => {
                return self.write_expression_logical(context, out, op, lhs, rhs);
            }
            BinaryOpType::Concat => return self.write_expression_concat(context, out, lhs, rhs),
            BinaryOpType::Multiplication => " * ",
            BinaryOpType::Division => " / ",
            BinaryOpType::Remainder => " % ",
            BinaryOpType::Addition => " + ",
            BinaryOpType::Subtraction => " - ",
            BinaryOpType::Equal => " = ",
            BinaryOpType::NotEqual => " <> ",
            BinaryOpType::Less => " < ",
            BinaryOpType::Greater => " > ",
            BinaryOpType::LessEqual => " <= ",
            BinaryOpType::GreaterEqual => " >= ",
        };
        let precedence = self.expression_binary_op_precedence(op);
        possibly_parenthesized!(
            out,
            self.expression_precedence(lhs) < precedence,
            self.write_expression_operand(context, out, lhs, rhs)?
        );
        out.push_str(infix);
        possibly_parenthesized!(
            out,
            self.expression_precedence(rhs) <= precedence,
            self.write_expression_operand(context, out, rhs, lhs)?
        );
        Ok(())
    }

    /// String concatenation, `||` by default.
    fn write_expression_concat(
        &self,
        context: &mut Context,
        out: &mut String,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<()> {
        let precedence = self.expression_binary_op_precedence(&BinaryOpType::Concat);
        possibly_parenthesized!(
            out,
            self.expression_precedence(lhs) < precedence,
            self.write_expression(context, out, lhs)?
        );
        out.push_str(" || ");
        possibly_parenthesized!(
            out,
            self.expression_precedence(rhs) <= precedence,
            self.write_expression(context, out, rhs)?
        );
        Ok(())
    }

    fn write_expression_unary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        op: &UnaryOpType,
        operand: &Expr,
    ) -> Result<()> {
        match op {
            UnaryOpType::Negative => {
                out.push('-');
                possibly_parenthesized!(
                    out,
                    self.expression_precedence(operand) <= self.expression_unary_op_precedence(op),
                    self.write_expression(context, out, operand)?
                );
            }
            UnaryOpType::Not => {
                out.push_str("NOT (");
                self.write_predicate(context, out, operand)?;
                out.push(')');
            }
        }
        Ok(())
    }

    fn write_expression_call(
        &self,
        context: &mut Context,
        out: &mut String,
        function: &Function,
        args: &[Expr],
    ) -> Result<()> {
        if matches!(
            function,
            Function::StartsWith | Function::EndsWith | Function::Contains
        ) {
            return Err(Error::msg(format!(
                "{function:?} must be folded into LIKE before being written"
            )));
        }
        out.push_str(&self.function_name(function));
        out.push('(');
        if *function == Function::CountDistinct {
            out.push_str("DISTINCT ");
        }
        try_separated_by(
            out,
            args,
            |out, v| self.write_expression(context, out, v),
            ", ",
        )?;
        out.push(')');
        Ok(())
    }

    fn write_expression_in(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Expr,
        target: &InTarget,
        negated: bool,
    ) -> Result<()> {
        possibly_parenthesized!(
            out,
            self.expression_precedence(value) < 400,
            self.write_expression(context, out, value)?
        );
        out.push_str(if negated { " NOT IN (" } else { " IN (" });
        match target {
            InTarget::List(items) => try_separated_by(
                out,
                items,
                |out, v| self.write_expression_operand(context, out, v, value),
                ", ",
            )?,
            InTarget::Query(query) => {
                let mut context = context.switch_fragment(Fragment::SqlSelect);
                self.write_select(&mut context, out, query)?;
            }
        }
        out.push(')');
        Ok(())
    }

    fn write_join_type(&self, _context: &mut Context, out: &mut String, join_type: &JoinType) {
        out.push_str(match join_type {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Cross => "CROSS JOIN",
        });
    }

    /// Condition joining the `index`-th table of the scope to one of the tables
    /// before it, from the foreign keys.
    fn join_condition(&self, context: &Context, index: usize) -> Result<Expr> {
        let joined = &context.scope[index];
        for previous in context.scope[..index].iter() {
            if let Some(key) = joined.schema.foreign_key_to(previous.schema) {
                return Ok(Expr::Field(FieldRef {
                    column: key,
                    table: joined.table.clone(),
                })
                .eq(Expr::Field(FieldRef {
                    column: previous.schema.primary_key()?,
                    table: previous.table.clone(),
                })));
            }
            if let Some(key) = previous.schema.foreign_key_to(joined.schema) {
                return Ok(Expr::Field(FieldRef {
                    column: key,
                    table: previous.table.clone(),
                })
                .eq(Expr::Field(FieldRef {
                    column: joined.schema.primary_key()?,
                    table: joined.table.clone(),
                })));
            }
        }
        Err(ErrorKind::mapping(format!(
            "Cannot join `{}`: no foreign key relates it to the other tables of the query",
            joined.schema.table.name
        )))
    }

    /// Column of a select list, `alias` renames it in the output.
    fn write_projected_column(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &FieldRef,
        alias: Option<&str>,
    ) {
        let name = alias.unwrap_or(value.column.name());
        if let Some(select) = &value.column.custom_select {
            out.push('(');
            out.push_str(select);
            out.push_str(") AS ");
            self.write_identifier_quoted(context, out, name);
        } else if value.column.row_version && self.row_version_is_expression() {
            self.write_row_version_column(context, out, value);
            out.push_str(" AS ");
            self.write_identifier_quoted(context, out, name);
        } else {
            self.write_field_ref(context, out, value);
            if let Some(alias) = alias {
                out.push_str(" AS ");
                self.write_identifier_quoted(context, out, alias);
            }
        }
    }

    /// Write the projection, the tables and the clauses of a select, without
    /// pagination. The scope of the query must already be entered.
    fn write_select_parts(&self, context: &mut Context, query: &SelectQuery) -> Result<SelectParts> {
        let mut parts = SelectParts {
            distinct: query.distinct,
            ..Default::default()
        };
        // The row number rewrite selects the inner query by name, output names must be unique
        let row_num = query.is_paginated() && self.pagination(query) == Pagination::RowNum;
        {
            let mut context = context.switch_fragment(Fragment::SqlSelect);
            let out = &mut parts.columns;
            let root = context.scope[0].table.clone();
            match &query.projection {
                Projection::All => {
                    separated_by(
                        out,
                        &query.schema.columns,
                        |out, column| {
                            self.write_projected_column(
                                &mut context,
                                out,
                                &FieldRef {
                                    column,
                                    table: root.clone(),
                                },
                                None,
                            );
                            parts.output_names.push(column.name().to_owned());
                        },
                        ", ",
                    );
                }
                Projection::Columns(names) => {
                    try_separated_by(
                        out,
                        names,
                        |out, name| {
                            let field = context.resolve(&Member::parse(name.clone()))?;
                            let name = field.column.name();
                            if row_num && parts.output_names.iter().any(|v| v == name) {
                                let alias = format!("_c{}", parts.output_names.len());
                                self.write_projected_column(&mut context, out, &field, Some(&alias));
                                parts.output_names.push(alias);
                            } else {
                                self.write_projected_column(&mut context, out, &field, None);
                                parts.output_names.push(name.to_owned());
                            }
                            Result::<()>::Ok(())
                        },
                        ", ",
                    )?;
                }
                Projection::Expressions(expressions) => {
                    let needs_alias = row_num;
                    for (i, projected) in expressions.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        let expression = self.fold_expression(&context, &projected.expression)?;
                        match &expression {
                            Expr::Field(field) if projected.alias.is_none() => {
                                let name = field.column.name();
                                if row_num && parts.output_names.iter().any(|v| v == name) {
                                    let alias = format!("_c{i}");
                                    self.write_projected_column(
                                        &mut context,
                                        out,
                                        field,
                                        Some(&alias),
                                    );
                                    parts.output_names.push(alias);
                                    continue;
                                }
                                self.write_projected_column(&mut context, out, field, None)
                            }
                            v => self.write_expression(&mut context, out, v)?,
                        }
                        let name = match (&projected.alias, &expression) {
                            (Some(alias), _) => Some(alias.to_string()),
                            (None, Expr::Field(field)) => Some(field.column.name().to_owned()),
                            _ if needs_alias => Some(format!("_c{i}")),
                            _ => None,
                        };
                        if let Some(name) = name {
                            if projected.alias.is_some()
                                || (needs_alias && !matches!(expression, Expr::Field(..)))
                            {
                                out.push_str(" AS ");
                                self.write_identifier_quoted(&mut context, out, &name);
                            }
                            parts.output_names.push(name);
                        } else {
                            parts.output_names.push(String::new());
                        }
                    }
                }
            }
        }
        let out = &mut parts.body;
        {
            let mut context = context.switch_fragment(Fragment::SqlSelectFrom);
            out.push_str("\nFROM ");
            let root = context.scope[0].table.clone();
            self.write_table_ref(&mut context, out, &root);
        }
        for (i, join) in query.joins.iter().enumerate() {
            let mut context = context.switch_fragment(Fragment::SqlJoin);
            let table = context.scope[i + 1].table.clone();
            out.push('\n');
            self.write_join_type(&mut context, out, &join.join_type);
            out.push(' ');
            self.write_table_ref(&mut context, out, &table);
            if join.join_type != JoinType::Cross {
                let condition = match &join.on {
                    Some(on) => self.fold_expression(&context, on)?,
                    None => self.join_condition(&context, i + 1)?,
                };
                out.push_str(" ON ");
                self.write_predicate(&mut context, out, &condition)?;
            }
        }
        if let Some(condition) = &query.condition {
            let mut context = context.switch_fragment(Fragment::SqlSelectWhere);
            self.write_where(&mut context, out, condition)?;
        }
        if !query.group_by.is_empty() {
            let mut context = context.switch_fragment(Fragment::SqlSelectGroupBy);
            out.push_str("\nGROUP BY ");
            try_separated_by(
                out,
                &query.group_by,
                |out, v| {
                    let v = self.fold_expression(&context, v)?;
                    self.write_expression(&mut context, out, &v)
                },
                ", ",
            )?;
        }
        if let Some(having) = &query.having {
            let mut context = context.switch_fragment(Fragment::SqlSelectHaving);
            let having = self.fold_expression(&context, having)?;
            if having.constant().and_then(Value::as_bool) != Some(true) {
                out.push_str("\nHAVING ");
                self.write_predicate(&mut context, out, &having)?;
            }
        }
        if !query.order_by.is_empty() {
            let mut context = context.switch_fragment(Fragment::SqlSelectOrderBy);
            try_separated_by(
                &mut parts.order_by,
                &query.order_by,
                |out, v| {
                    let expression = self.fold_expression(&context, &v.expression)?;
                    self.write_expression(&mut context, out, &expression)?;
                    if v.order == Order::Desc {
                        out.push_str(" DESC");
                    }
                    Result::<()>::Ok(())
                },
                ", ",
            )?;
        }
        Ok(parts)
    }

    /// `WHERE` clause, omitted when the condition folds to true.
    fn write_where(&self, context: &mut Context, out: &mut String, condition: &Expr) -> Result<()> {
        let condition = self.fold_expression(context, condition)?;
        if condition.constant().and_then(Value::as_bool) == Some(true) {
            return Ok(());
        }
        out.push_str("\nWHERE ");
        self.write_predicate(context, out, &condition)
    }

    fn pagination(&self, _query: &SelectQuery) -> Pagination {
        Pagination::LimitOffset
    }

    fn write_limit_offset(
        &self,
        _context: &mut Context,
        out: &mut String,
        offset: Option<u64>,
        limit: Option<u64>,
    ) {
        if let Some(limit) = limit {
            out.push_str("\nLIMIT ");
            write_integer!(out, limit);
        }
        if let Some(offset) = offset.filter(|v| *v > 0) {
            out.push_str("\nOFFSET ");
            write_integer!(out, offset);
        }
    }

    /// Ordering used when the pagination requires one and the query has none.
    /// A distinct query can only be ordered by what it selects.
    fn write_implicit_order(&self, context: &mut Context, out: &mut String, parts: &SelectParts) {
        let root = &context.scope[0];
        let key = root.schema.primary_key().ok().filter(|column| {
            !parts.distinct || parts.output_names.iter().any(|v| v == column.name())
        });
        match key {
            Some(column) => {
                let field = FieldRef {
                    column,
                    table: root.table.clone(),
                };
                self.write_field_ref(context, out, &field);
            }
            None => out.push('1'),
        }
    }

    fn write_select_start(&self, _context: &mut Context, out: &mut String, parts: &SelectParts) {
        out.push_str("SELECT ");
        if parts.distinct {
            out.push_str("DISTINCT ");
        }
    }

    fn write_select(&self, context: &mut Context, out: &mut String, query: &SelectQuery) -> Result<()> {
        let mut scope = vec![Scope::new(query.schema, query.alias.as_ref())];
        scope.extend(
            query
                .joins
                .iter()
                .map(|j| Scope::new(j.schema, j.alias.as_ref())),
        );
        context.scoped(scope, !query.joins.is_empty(), |context| {
            let parts = self.write_select_parts(context, query)?;
            if !query.is_paginated() {
                self.write_select_start(context, out, &parts);
                out.push_str(&parts.columns);
                out.push_str(&parts.body);
                if !parts.order_by.is_empty() {
                    out.push_str("\nORDER BY ");
                    out.push_str(&parts.order_by);
                }
                return Ok(());
            }
            let offset = query.offset.unwrap_or_default();
            match self.pagination(query) {
                Pagination::LimitOffset => {
                    self.write_select_start(context, out, &parts);
                    out.push_str(&parts.columns);
                    out.push_str(&parts.body);
                    if !parts.order_by.is_empty() {
                        out.push_str("\nORDER BY ");
                        out.push_str(&parts.order_by);
                    }
                    self.write_limit_offset(context, out, query.offset, query.limit);
                }
                Pagination::Top => {
                    if offset > 0 {
                        return Err(Error::msg(
                            "TOP pagination cannot skip rows, use an offset based pagination",
                        ));
                    }
                    self.write_select_start(context, out, &parts);
                    if let Some(limit) = query.limit {
                        out.push_str("TOP (");
                        write_integer!(out, limit);
                        out.push_str(") ");
                    }
                    out.push_str(&parts.columns);
                    out.push_str(&parts.body);
                    if !parts.order_by.is_empty() {
                        out.push_str("\nORDER BY ");
                        out.push_str(&parts.order_by);
                    }
                }
                Pagination::OffsetFetch => {
                    self.write_select_start(context, out, &parts);
                    out.push_str(&parts.columns);
                    out.push_str(&parts.body);
                    out.push_str("\nORDER BY ");
                    if parts.order_by.is_empty() {
                        self.write_implicit_order(context, out, &parts);
                    } else {
                        out.push_str(&parts.order_by);
                    }
                    out.push_str("\nOFFSET ");
                    write_integer!(out, offset);
                    out.push_str(" ROWS");
                    if let Some(limit) = query.limit {
                        out.push_str(" FETCH NEXT ");
                        write_integer!(out, limit);
                        out.push_str(" ROWS ONLY");
                    }
                }
                Pagination::FirstSkip => {
                    out.push_str("SELECT ");
                    if let Some(limit) = query.limit {
                        out.push_str("FIRST ");
                        write_integer!(out, limit);
                        out.push(' ');
                    }
                    if offset > 0 {
                        out.push_str("SKIP ");
                        write_integer!(out, offset);
                        out.push(' ');
                    }
                    if parts.distinct {
                        out.push_str("DISTINCT ");
                    }
                    out.push_str(&parts.columns);
                    out.push_str(&parts.body);
                    if !parts.order_by.is_empty() {
                        out.push_str("\nORDER BY ");
                        out.push_str(&parts.order_by);
                    }
                }
                Pagination::RowNum => self.write_select_row_num(context, out, query, &parts)?,
            }
            Ok(())
        })
    }

    /// Pagination by nesting the query twice and filtering on `ROWNUM`. The
    /// outer query lists the original output columns so that the row number
    /// does not end up in the result.
    fn write_select_row_num(
        &self,
        context: &mut Context,
        out: &mut String,
        query: &SelectQuery,
        parts: &SelectParts,
    ) -> Result<()> {
        const INNER: &str = "_q1";
        const OUTER: &str = "_q2";
        const ROW_NUMBER: &str = "_rn";
        let offset = query.offset.unwrap_or_default();
        out.push_str("SELECT ");
        for (i, name) in parts.output_names.iter().enumerate() {
            if name.is_empty() {
                return Err(Error::msg(format!(
                    "Projected expression {i} needs an alias to be paginated"
                )));
            }
            if i > 0 {
                out.push_str(", ");
            }
            self.write_identifier_quoted(context, out, OUTER);
            out.push('.');
            self.write_identifier_quoted(context, out, name);
        }
        out.push_str(" FROM (\nSELECT ");
        self.write_identifier_quoted(context, out, INNER);
        out.push_str(".*, ROWNUM ");
        self.write_identifier_quoted(context, out, ROW_NUMBER);
        out.push_str(" FROM (\n");
        self.write_select_start(context, out, parts);
        out.push_str(&parts.columns);
        out.push_str(&parts.body);
        if !parts.order_by.is_empty() {
            out.push_str("\nORDER BY ");
            out.push_str(&parts.order_by);
        }
        out.push_str("\n) ");
        self.write_identifier_quoted(context, out, INNER);
        if let Some(limit) = query.limit {
            out.push_str("\nWHERE ROWNUM <= ");
            write_integer!(out, offset + limit);
        }
        out.push_str("\n) ");
        self.write_identifier_quoted(context, out, OUTER);
        if offset > 0 {
            out.push_str("\nWHERE ");
            self.write_identifier_quoted(context, out, OUTER);
            out.push('.');
            self.write_identifier_quoted(context, out, ROW_NUMBER);
            out.push_str(" > ");
            write_integer!(out, offset);
        }
        Ok(())
    }

    /// `SELECT COUNT(*)` of a query, the query is wrapped when it is distinct,
    /// grouped or paginated.
    fn write_count(&self, context: &mut Context, out: &mut String, query: &SelectQuery) -> Result<()> {
        let wrap = query.distinct || !query.group_by.is_empty() || query.is_paginated();
        if wrap {
            let mut inner = query.clone();
            if !inner.is_paginated() {
                inner.order_by.clear();
            }
            out.push_str("SELECT COUNT(*) FROM (\n");
            self.write_select(context, out, &inner)?;
            out.push_str("\n) ");
            self.write_identifier_quoted(context, out, "_count");
            return Ok(());
        }
        let mut scope = vec![Scope::new(query.schema, query.alias.as_ref())];
        scope.extend(
            query
                .joins
                .iter()
                .map(|j| Scope::new(j.schema, j.alias.as_ref())),
        );
        context.scoped(scope, !query.joins.is_empty(), |context| {
            let mut inner = query.clone();
            inner.projection = Projection::All;
            inner.order_by.clear();
            let parts = self.write_select_parts(context, &inner)?;
            out.push_str("SELECT COUNT(*)");
            out.push_str(&parts.body);
            Ok(())
        })
    }

    fn supports_multi_row_insert(&self) -> bool {
        true
    }

    /// Columns written by an `INSERT`, computed columns are only read.
    fn is_insertable(&self, column: &ColumnDef) -> bool {
        !column.auto_increment
            && column.custom_select.is_none()
            && !(column.row_version
                && self.row_version_strategy() == RowVersionStrategy::ServerGenerated)
    }

    /// Value of a column left to its declared default in an `INSERT`.
    fn write_column_default(&self, _context: &mut Context, out: &mut String, _column: &ColumnDef) {
        out.push_str("DEFAULT");
    }

    /// `INSERT` of one or more rows, each row holds a value per column of the
    /// schema. `fields` restricts the columns written.
    fn write_insert(
        &self,
        context: &mut Context,
        out: &mut String,
        schema: &'static TableSchema,
        rows: &[Vec<Value>],
        fields: Option<&[&str]>,
    ) -> Result<()> {
        if rows.is_empty() {
            return Err(Error::msg("Cannot write an INSERT without rows"));
        }
        let columns: Vec<(usize, &ColumnDef)> = schema
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                self.is_insertable(c)
                    && (c.row_version
                        || fields.is_none_or(|f| f.iter().any(|name| c.is_named(name))))
            })
            .collect();
        let mut context = context.switch_fragment(Fragment::SqlInsertInto);
        out.push_str("INSERT INTO ");
        self.write_table_ref(&mut context, out, &schema.table);
        if columns.is_empty() {
            out.push_str(" DEFAULT VALUES");
            return Ok(());
        }
        out.push_str(" (");
        separated_by(
            out,
            &columns,
            |out, (_, c)| self.write_identifier_quoted(&mut context, out, c.name()),
            ", ",
        );
        out.push_str(") VALUES ");
        let mut context = context.switch_fragment(Fragment::SqlInsertIntoValues);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != schema.columns.len() {
                return Err(Error::msg(format!(
                    "The row has {} values but `{}` has {} columns",
                    row.len(),
                    schema.table.name,
                    schema.columns.len()
                )));
            }
            if r > 0 {
                out.push_str(",\n");
            }
            out.push('(');
            separated_by(
                out,
                &columns,
                |out, (i, c)| {
                    let value = if c.row_version {
                        convert_value(self.initial_row_version(), &c.value)
                    } else {
                        row[*i].clone()
                    };
                    if value.is_null() && c.default.is_some() {
                        self.write_column_default(&mut context, out, c);
                    } else {
                        self.write_operand(&mut context, out, &value, Some(*c));
                    }
                },
                ", ",
            );
            out.push(')');
        }
        Ok(())
    }

    /// `UPDATE` of a whole entity by primary key. Versioned entities also
    /// compare the row version, the return value tells whether they did.
    fn write_update(
        &self,
        context: &mut Context,
        out: &mut String,
        schema: &'static TableSchema,
        row: &[Value],
        fields: Option<&[&str]>,
    ) -> Result<bool> {
        let key = schema.primary_key()?;
        let key_index = schema.primary_key_index()?;
        let version = schema.row_version()?;
        if row.len() != schema.columns.len() {
            return Err(Error::msg(format!(
                "The row has {} values but `{}` has {} columns",
                row.len(),
                schema.table.name,
                schema.columns.len()
            )));
        }
        let sets: Vec<(&'static ColumnDef, Expr)> = schema
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                !c.primary_key
                    && !c.row_version
                    && !c.auto_increment
                    && c.custom_select.is_none()
                    && fields.is_none_or(|f| f.iter().any(|name| c.is_named(name)))
            })
            .map(|(i, c)| (c, Expr::Constant(row[i].clone())))
            .collect();
        let mut condition = Expr::Field(FieldRef {
            column: key,
            table: schema.table.clone(),
        })
        .eq(Expr::Constant(row[key_index].clone()));
        if let Some(version) = version {
            let index = schema
                .column_index(&version.field)
                .unwrap_or_default();
            condition = condition.and(
                Expr::Field(FieldRef {
                    column: version,
                    table: schema.table.clone(),
                })
                .eq(Expr::Constant(row[index].clone())),
            );
        }
        self.write_update_where(context, out, schema, &sets, Some(&condition))?;
        Ok(version.is_some())
    }

    /// `UPDATE .. SET .. WHERE ..` with explicit assignments. Versioned rows get
    /// their version bumped when the dialect increments it.
    fn write_update_where(
        &self,
        context: &mut Context,
        out: &mut String,
        schema: &'static TableSchema,
        sets: &[(&'static ColumnDef, Expr)],
        condition: Option<&Expr>,
    ) -> Result<()> {
        let version = schema.row_version()?.filter(|v| {
            self.row_version_strategy() == RowVersionStrategy::Increment
                && !sets.iter().any(|(c, _)| std::ptr::eq(*c, *v))
        });
        if sets.is_empty() && version.is_none() {
            return Err(Error::msg(format!(
                "Nothing to update in `{}`",
                schema.table.name
            )));
        }
        context.scoped(vec![Scope::new(schema, None)], false, |context| {
            {
                let mut context = context.switch_fragment(Fragment::SqlUpdate);
                out.push_str("UPDATE ");
                self.write_table_ref(&mut context, out, &schema.table);
            }
            {
                let mut context = context.switch_fragment(Fragment::SqlUpdateSet);
                out.push_str(" SET ");
                try_separated_by(
                    out,
                    sets,
                    |out, (column, value)| {
                        self.write_identifier_quoted(&mut context, out, column.name());
                        out.push_str(" = ");
                        match value {
                            Expr::Constant(v) => {
                                self.write_operand(&mut context, out, v, Some(column))
                            }
                            v => {
                                let v = self.fold_expression(&context, v)?;
                                self.write_expression(&mut context, out, &v)?;
                            }
                        }
                        Result::<()>::Ok(())
                    },
                    ", ",
                )?;
                if let Some(version) = version {
                    if !sets.is_empty() {
                        out.push_str(", ");
                    }
                    self.write_identifier_quoted(&mut context, out, version.name());
                    out.push_str(" = ");
                    self.write_identifier_quoted(&mut context, out, version.name());
                    out.push_str(" + 1");
                }
            }
            if let Some(condition) = condition {
                let mut context = context.switch_fragment(Fragment::SqlUpdateWhere);
                self.write_where(&mut context, out, condition)?;
            }
            Ok(())
        })
    }

    fn write_delete(
        &self,
        context: &mut Context,
        out: &mut String,
        schema: &'static TableSchema,
        condition: Option<&Expr>,
    ) -> Result<()> {
        context.scoped(vec![Scope::new(schema, None)], false, |context| {
            let mut context = context.switch_fragment(Fragment::SqlDeleteFrom);
            out.push_str("DELETE FROM ");
            self.write_table_ref(&mut context, out, &schema.table);
            if let Some(condition) = condition {
                let mut context = context.switch_fragment(Fragment::SqlDeleteFromWhere);
                self.write_where(&mut context, out, condition)?;
            }
            Ok(())
        })
    }

    fn select_statement(&self, query: &SelectQuery) -> Result<Statement> {
        let mut context = Context::new(Fragment::SqlSelect, query.inline_values);
        let mut out = String::with_capacity(256);
        self.write_select(&mut context, &mut out, query)?;
        Ok(Statement::new(out, context.params, StatementKind::Select))
    }

    fn count_statement(&self, query: &SelectQuery) -> Result<Statement> {
        let mut context = Context::new(Fragment::SqlSelect, query.inline_values);
        let mut out = String::with_capacity(256);
        self.write_count(&mut context, &mut out, query)?;
        Ok(Statement::new(out, context.params, StatementKind::Scalar))
    }

    fn insert_statement(
        &self,
        schema: &'static TableSchema,
        rows: &[Vec<Value>],
        fields: Option<&[&str]>,
    ) -> Result<Statement> {
        let mut context = Context::new(Fragment::SqlInsertInto, false);
        let mut out = String::with_capacity(256);
        self.write_insert(&mut context, &mut out, schema, rows, fields)?;
        Ok(Statement::new(out, context.params, StatementKind::Insert))
    }

    /// Returns the statement and whether it compares a row version.
    fn update_statement(
        &self,
        schema: &'static TableSchema,
        row: &[Value],
        fields: Option<&[&str]>,
    ) -> Result<(Statement, bool)> {
        let mut context = Context::new(Fragment::SqlUpdate, false);
        let mut out = String::with_capacity(256);
        let versioned = self.write_update(&mut context, &mut out, schema, row, fields)?;
        Ok((
            Statement::new(out, context.params, StatementKind::Update),
            versioned,
        ))
    }

    fn update_where_statement(
        &self,
        schema: &'static TableSchema,
        sets: &[(&'static ColumnDef, Expr)],
        condition: Option<&Expr>,
    ) -> Result<Statement> {
        let mut context = Context::new(Fragment::SqlUpdate, false);
        let mut out = String::with_capacity(256);
        self.write_update_where(&mut context, &mut out, schema, sets, condition)?;
        Ok(Statement::new(out, context.params, StatementKind::Update))
    }

    fn delete_statement(
        &self,
        schema: &'static TableSchema,
        condition: Option<&Expr>,
    ) -> Result<Statement> {
        let mut context = Context::new(Fragment::SqlDeleteFrom, false);
        let mut out = String::with_capacity(128);
        self.write_delete(&mut context, &mut out, schema, condition)?;
        Ok(Statement::new(out, context.params, StatementKind::Delete))
    }

    /// Read back the row version of a single row.
    fn row_version_statement(&self, schema: &'static TableSchema, key: Value) -> Result<Statement> {
        let version = schema.row_version()?.ok_or_else(|| {
            ErrorKind::schema(schema.table.name.clone(), "there is no row version column")
        })?;
        let key_column = schema.primary_key()?;
        let query = SelectQuery::new(schema)
            .select_columns([version.field.clone()])
            .filter(
                Expr::Field(FieldRef {
                    column: key_column,
                    table: schema.table.clone(),
                })
                .eq(Expr::Constant(key)),
            );
        let mut statement = self.select_statement(&query)?;
        statement.kind = StatementKind::Scalar;
        Ok(statement)
    }
}

/// Writer with the default behavior of every method.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub fn new() -> Self {
        Self
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
