use sluice_core::{Context, Function, Pagination, SelectQuery, SqlWriter};
use std::borrow::Cow;

pub struct FirebirdSqlWriter {}

impl SqlWriter for FirebirdSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn like_wildcards(&self) -> &'static [char] {
        &['%', '_']
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

    fn pagination(&self, _query: &SelectQuery) -> Pagination {
        Pagination::FirstSkip
    }

    fn supports_multi_row_insert(&self) -> bool {
        false
    }
}
