use sluice_core::{Context, Pagination, SelectQuery, SqlWriter};
use std::{borrow::Cow, fmt::Write};
use time::{Date, OffsetDateTime, PrimitiveDateTime};

pub struct OracleSqlWriter {}

impl SqlWriter for OracleSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("HEXTORAW('");
        out.push_str(&hex::encode_upper(value));
        out.push_str("')");
    }

    fn write_value_date(&self, context: &mut Context, out: &mut String, value: &Date) {
        out.push_str("DATE '");
        self.write_date(context, out, value);
        out.push('\'');
    }

    fn write_value_timestamp(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &PrimitiveDateTime,
    ) {
        out.push_str("TIMESTAMP '");
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
        out.push_str("TIMESTAMP '");
        self.write_date(context, out, &value.date());
        out.push(' ');
        self.write_time(context, out, &value.time());
        let offset = value.offset();
        let _ = write!(
            out,
            " {}{:02}:{:02}'",
            if offset.is_negative() { '-' } else { '+' },
            offset.whole_hours().abs(),
            offset.minutes_past_hour().abs()
        );
    }

    fn param_marker(&self, index: usize) -> Cow<'static, str> {
        format!(":{}", index + 1).into()
    }

    fn named_param_marker(&self, name: &str) -> Option<Cow<'static, str>> {
        Some(format!(":{name}").into())
    }

    fn supports_boolean_values(&self) -> bool {
        false
    }

    fn pagination(&self, _query: &SelectQuery) -> Pagination {
        Pagination::RowNum
    }

    fn supports_multi_row_insert(&self) -> bool {
        false
    }
}
