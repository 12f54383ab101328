use sluice_core::{Context, FieldRef, Fragment, RowVersionStrategy, SqlWriter};
use std::borrow::Cow;

pub struct PostgresSqlWriter {}

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    /// The row version is the `xmin` system column of the row, converted to a
    /// number so that it can be compared with a parameter.
    fn write_row_version_column(&self, context: &mut Context, out: &mut String, value: &FieldRef) {
        out.push_str("int8in(xidout(");
        if context.qualify_columns && !value.table.name.is_empty() {
            let mut context = context.switch_fragment(Fragment::None);
            self.write_table_ref(&mut context, out, &value.table);
            out.push('.');
        }
        out.push_str("xmin))");
    }

    fn row_version_is_expression(&self) -> bool {
        true
    }

    fn row_version_strategy(&self) -> RowVersionStrategy {
        RowVersionStrategy::ServerGenerated
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        out.push_str(&hex::encode(value));
        out.push_str("'::bytea");
    }

    fn param_marker(&self, index: usize) -> Cow<'static, str> {
        format!("${}", index + 1).into()
    }

    fn named_param_marker(&self, _name: &str) -> Option<Cow<'static, str>> {
        None
    }
}
