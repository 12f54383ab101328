use sluice_core::{Context, Expr, Function, Result, SqlWriter, try_separated_by};
use std::{borrow::Cow, fmt::Write};

pub struct MySqlSqlWriter {}

impl SqlWriter for MySqlSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(context, out, value, '`', "``");
        out.push('`');
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_value_string(&self, _context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        for c in value.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                '\0' => out.push_str("\\0"),
                c => out.push(c),
            }
        }
        out.push('\'');
    }

    fn supports_timestamp_offset(&self) -> bool {
        false
    }

    fn param_marker(&self, _index: usize) -> Cow<'static, str> {
        "?".into()
    }

    fn named_param_marker(&self, _name: &str) -> Option<Cow<'static, str>> {
        None
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
            Function::Length => "CHAR_LENGTH".into(),
            Function::Coalesce => "COALESCE".into(),
            Function::StartsWith | Function::EndsWith | Function::Contains => "LIKE".into(),
            Function::Custom(name) => name.clone(),
        }
    }

    /// `||` is a logical OR unless `PIPES_AS_CONCAT` is set.
    fn write_expression_concat(
        &self,
        context: &mut Context,
        out: &mut String,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<()> {
        out.push_str("CONCAT(");
        try_separated_by(
            out,
            [lhs, rhs],
            |out, v| self.write_expression(context, out, v),
            ", ",
        )?;
        out.push(')');
        Ok(())
    }

    fn write_limit_offset(
        &self,
        _context: &mut Context,
        out: &mut String,
        offset: Option<u64>,
        limit: Option<u64>,
    ) {
        let offset = offset.filter(|v| *v > 0);
        match (limit, offset) {
            (Some(limit), _) => {
                let _ = write!(out, "\nLIMIT {limit}");
            }
            // There is no OFFSET without LIMIT
            (None, Some(..)) => out.push_str("\nLIMIT 18446744073709551615"),
            (None, None) => {}
        }
        if let Some(offset) = offset {
            let _ = write!(out, "\nOFFSET {offset}");
        }
    }
}
