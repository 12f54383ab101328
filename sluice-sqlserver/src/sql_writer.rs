use sluice_core::{
    BinaryOpType, Context, Expr, FieldRef, Function, Pagination, Result, RowVersionStrategy,
    SelectQuery, SqlWriter, possibly_parenthesized,
};
use std::borrow::Cow;

pub struct SqlServerSqlWriter {}

impl SqlWriter for SqlServerSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('[');
        self.write_escaped(context, out, value, ']', "]]");
        out.push(']');
    }

    /// `rowversion` is an 8 bytes binary, compared as a big endian integer.
    fn write_row_version_column(&self, context: &mut Context, out: &mut String, value: &FieldRef) {
        out.push_str("CONVERT(BIGINT, ");
        self.write_qualified_column(context, out, &value.table, value.column.name());
        out.push(')');
    }

    fn row_version_is_expression(&self) -> bool {
        true
    }

    fn row_version_strategy(&self) -> RowVersionStrategy {
        RowVersionStrategy::ServerGenerated
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_value_string(&self, context: &mut Context, out: &mut String, value: &str) {
        if !value.is_ascii() {
            out.push('N');
        }
        out.push('\'');
        self.write_escaped(context, out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("0x");
        out.push_str(&hex::encode_upper(value));
    }

    fn like_wildcards(&self) -> &'static [char] {
        &['%', '_', '[']
    }

    fn supports_boolean_values(&self) -> bool {
        false
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
            Function::Length => "LEN".into(),
            Function::Coalesce => "COALESCE".into(),
            Function::StartsWith | Function::EndsWith | Function::Contains => "LIKE".into(),
            Function::Custom(name) => name.clone(),
        }
    }

    fn write_expression_concat(
        &self,
        context: &mut Context,
        out: &mut String,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<()> {
        let precedence = self.expression_binary_op_precedence(&BinaryOpType::Addition);
        possibly_parenthesized!(
            out,
            self.expression_precedence(lhs) < precedence,
            self.write_expression(context, out, lhs)?
        );
        out.push_str(" + ");
        possibly_parenthesized!(
            out,
            self.expression_precedence(rhs) <= precedence,
            self.write_expression(context, out, rhs)?
        );
        Ok(())
    }

    fn pagination(&self, query: &SelectQuery) -> Pagination {
        if query.offset.unwrap_or_default() == 0 {
            Pagination::Top
        } else {
            Pagination::OffsetFetch
        }
    }
}
