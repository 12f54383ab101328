use crate::{
    AsValue, BinaryOpType, ColumnDef, ColumnRef, Function, Order, SelectQuery, TableRef,
    UnaryOpType, Value,
};
use std::{
    borrow::Cow,
    fmt::{self, Debug},
    ops::{Neg, Not},
    sync::Arc,
};

/// Host side delegate evaluated once while compiling.
#[derive(Clone)]
pub struct Evaluator(pub Arc<dyn Fn() -> Value + Send + Sync>);

impl Evaluator {
    pub fn evaluate(&self) -> Value {
        (self.0)()
    }
}

impl Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Evaluator(..)")
    }
}

/// Field reference by name, resolved against the tables of the query when
/// the expression is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Entity type name, table name or alias.
    pub table: Option<Cow<'static, str>>,
    pub name: Cow<'static, str>,
}

/// A member after resolution: the column definition and the table it belongs to.
#[derive(Debug, Clone)]
pub struct FieldRef {
    pub column: &'static ColumnDef,
    pub table: TableRef,
}

#[derive(Debug, Clone)]
pub enum InTarget {
    List(Vec<Expr>),
    Query(Box<SelectQuery>),
}

/// Expression tree used for predicates, projections, grouping and ordering.
#[derive(Debug, Clone)]
pub enum Expr {
    Null,
    Constant(Value),
    /// Physical column, written as is.
    Column(ColumnRef),
    Member(Member),
    Field(FieldRef),
    /// Explicitly named parameter.
    Named(Cow<'static, str>, Value),
    Binary(BinaryOpType, Box<Expr>, Box<Expr>),
    Unary(UnaryOpType, Box<Expr>),
    Call(Function, Vec<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    In {
        expr: Box<Expr>,
        target: InTarget,
        negated: bool,
    },
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
        escape: bool,
    },
    Eval(Evaluator),
    Sql(Cow<'static, str>),
    Asterisk,
}

impl Member {
    /// `"table.column"` is split into table and column.
    pub fn parse(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        if let Some((table, column)) = name.split_once('.') {
            return Member {
                table: Some(table.to_owned().into()),
                name: column.to_owned().into(),
            };
        }
        Member { table: None, name }
    }
}

/// Member expression, `"table.column"` is split into table and column.
pub fn col(name: impl Into<Cow<'static, str>>) -> Expr {
    Expr::Member(Member::parse(name))
}

/// Member expression qualified by entity type name, table name or alias.
pub fn col_of(table: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Expr {
    Expr::Member(Member {
        table: Some(table.into()),
        name: name.into(),
    })
}

/// Constant, string slices included.
pub fn val(value: impl Into<Expr>) -> Expr {
    value.into()
}

pub fn null() -> Expr {
    Expr::Null
}

pub fn param(name: impl Into<Cow<'static, str>>, value: impl AsValue) -> Expr {
    Expr::Named(name.into(), value.as_value())
}

/// Delegate evaluated on the host while compiling, the result is bound as a value.
pub fn eval<F, T>(f: F) -> Expr
where
    F: Fn() -> T + Send + Sync + 'static,
    T: AsValue,
{
    Expr::Eval(Evaluator(Arc::new(move || f().as_value())))
}

pub fn sql(raw: impl Into<Cow<'static, str>>) -> Expr {
    Expr::Sql(raw.into())
}

/// `CASE WHEN test THEN then ELSE otherwise END`
pub fn when(test: impl Into<Expr>, then: impl Into<Expr>, otherwise: impl Into<Expr>) -> Expr {
    Expr::Conditional(
        Box::new(test.into()),
        Box::new(then.into()),
        Box::new(otherwise.into()),
    )
}

/// `COUNT(*)`
pub fn count_all() -> Expr {
    Expr::Call(Function::Count, vec![Expr::Asterisk])
}

/// Custom function call, the name is written verbatim.
pub fn func(name: impl Into<Cow<'static, str>>, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Call(Function::Custom(name.into()), args.into_iter().collect())
}

macro_rules! binary_methods {
    ($($name:ident => $op:path),+ $(,)?) => {
        $(
            pub fn $name(self, rhs: impl Into<Expr>) -> Expr {
                Expr::Binary($op, Box::new(self), Box::new(rhs.into()))
            }
        )+
    };
}

macro_rules! call_methods {
    ($($name:ident => $function:path),+ $(,)?) => {
        $(
            pub fn $name(self) -> Expr {
                Expr::Call($function, vec![self])
            }
        )+
    };
}

impl Expr {
    binary_methods! {
        eq => BinaryOpType::Equal,
        ne => BinaryOpType::NotEqual,
        lt => BinaryOpType::Less,
        gt => BinaryOpType::Greater,
        le => BinaryOpType::LessEqual,
        ge => BinaryOpType::GreaterEqual,
        and => BinaryOpType::And,
        or => BinaryOpType::Or,
        add => BinaryOpType::Addition,
        sub => BinaryOpType::Subtraction,
        mul => BinaryOpType::Multiplication,
        div => BinaryOpType::Division,
        rem => BinaryOpType::Remainder,
        concat => BinaryOpType::Concat,
    }

    call_methods! {
        count => Function::Count,
        count_distinct => Function::CountDistinct,
        sum => Function::Sum,
        avg => Function::Avg,
        min => Function::Min,
        max => Function::Max,
        upper => Function::Upper,
        lower => Function::Lower,
        trim => Function::Trim,
        length => Function::Length,
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    pub fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    pub fn starts_with(self, prefix: impl Into<Expr>) -> Expr {
        Expr::Call(Function::StartsWith, vec![self, prefix.into()])
    }

    pub fn ends_with(self, suffix: impl Into<Expr>) -> Expr {
        Expr::Call(Function::EndsWith, vec![self, suffix.into()])
    }

    pub fn contains(self, needle: impl Into<Expr>) -> Expr {
        Expr::Call(Function::Contains, vec![self, needle.into()])
    }

    /// Raw `LIKE`, the pattern wildcards are not escaped.
    pub fn like(self, pattern: impl Into<Expr>) -> Expr {
        Expr::Like {
            expr: Box::new(self),
            pattern: Box::new(pattern.into()),
            negated: false,
            escape: false,
        }
    }

    pub fn not_like(self, pattern: impl Into<Expr>) -> Expr {
        Expr::Like {
            expr: Box::new(self),
            pattern: Box::new(pattern.into()),
            negated: true,
            escape: false,
        }
    }

    pub fn coalesce(self, fallback: impl Into<Expr>) -> Expr {
        Expr::Call(Function::Coalesce, vec![self, fallback.into()])
    }

    pub fn in_list<I>(self, values: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        Expr::In {
            expr: Box::new(self),
            target: InTarget::List(values.into_iter().map(Into::into).collect()),
            negated: false,
        }
    }

    pub fn not_in_list<I>(self, values: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        Expr::In {
            expr: Box::new(self),
            target: InTarget::List(values.into_iter().map(Into::into).collect()),
            negated: true,
        }
    }

    pub fn in_query(self, query: SelectQuery) -> Expr {
        Expr::In {
            expr: Box::new(self),
            target: InTarget::Query(Box::new(query)),
            negated: false,
        }
    }

    pub fn not_in_query(self, query: SelectQuery) -> Expr {
        Expr::In {
            expr: Box::new(self),
            target: InTarget::Query(Box::new(query)),
            negated: true,
        }
    }

    pub fn asc(self) -> Ordered {
        Ordered {
            expression: self,
            order: Order::Asc,
        }
    }

    pub fn desc(self) -> Ordered {
        Ordered {
            expression: self,
            order: Order::Desc,
        }
    }

    pub fn alias(self, alias: impl Into<Cow<'static, str>>) -> Projected {
        Projected {
            expression: self,
            alias: Some(alias.into()),
        }
    }

    /// Constant value of the expression, when it is one (`NULL` included).
    pub fn constant(&self) -> Option<&Value> {
        static NULL: Value = Value::Null;
        match self {
            Expr::Null => Some(&NULL),
            Expr::Constant(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.constant().is_some()
    }

    /// Whether the expression is known to produce a truth value.
    pub fn is_predicate(&self) -> bool {
        match self {
            Expr::Binary(op, ..) => op.is_comparison() || op.is_logical(),
            Expr::Unary(UnaryOpType::Not, ..)
            | Expr::In { .. }
            | Expr::IsNull { .. }
            | Expr::Like { .. } => true,
            Expr::Call(Function::StartsWith | Function::EndsWith | Function::Contains, ..) => true,
            _ => false,
        }
    }
}

impl Not for Expr {
    type Output = Expr;
    fn not(self) -> Self::Output {
        Expr::Unary(UnaryOpType::Not, Box::new(self))
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Self::Output {
        Expr::Unary(UnaryOpType::Negative, Box::new(self))
    }
}

impl<T: AsValue> From<T> for Expr {
    fn from(value: T) -> Self {
        Expr::Constant(value.as_value())
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Constant(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Constant(value.into())
    }
}

/// Expression with a direction, used by `ORDER BY`.
#[derive(Debug, Clone)]
pub struct Ordered {
    pub expression: Expr,
    pub order: Order,
}

impl From<Expr> for Ordered {
    fn from(value: Expr) -> Self {
        value.asc()
    }
}

/// Projected expression with an optional output name.
#[derive(Debug, Clone)]
pub struct Projected {
    pub expression: Expr,
    pub alias: Option<Cow<'static, str>>,
}

impl From<Expr> for Projected {
    fn from(value: Expr) -> Self {
        Projected {
            expression: value,
            alias: None,
        }
    }
}
