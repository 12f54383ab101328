use sluice_core::{ColumnDef, Context, SqlWriter};
use std::{borrow::Cow, fmt::Write};

pub struct SqliteSqlWriter {}

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn like_wildcards(&self) -> &'static [char] {
        &['%', '_']
    }

    /// `DEFAULT` is not accepted inside `VALUES`.
    fn write_column_default(&self, _context: &mut Context, out: &mut String, column: &ColumnDef) {
        match &column.default {
            Some(default) => out.push_str(default),
            None => out.push_str("NULL"),
        }
    }

    fn param_marker(&self, index: usize) -> Cow<'static, str> {
        format!("?{}", index + 1).into()
    }

    fn named_param_marker(&self, name: &str) -> Option<Cow<'static, str>> {
        Some(format!(":{name}").into())
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
            (None, Some(..)) => out.push_str("\nLIMIT -1"),
            (None, None) => {}
        }
        if let Some(offset) = offset {
            let _ = write!(out, "\nOFFSET {offset}");
        }
    }
}
