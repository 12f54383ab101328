use crate::{
    BinaryOpType, Context, Expr, Function, InTarget, Result, SqlWriter, UnaryOpType, Value,
};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Pre-evaluation pass: resolves members, evaluates delegates, folds the
/// column-free parts of the tree and normalizes null and boolean comparisons.
/// The result only contains nodes the writer can emit directly.
pub fn fold(writer: &dyn SqlWriter, context: &Context, expr: &Expr) -> Result<Expr> {
    Ok(match expr {
        Expr::Null => Expr::Null,
        Expr::Constant(v) if v.is_null() => Expr::Null,
        Expr::Constant(v) => Expr::Constant(v.clone()),
        Expr::Column(..) | Expr::Field(..) | Expr::Named(..) | Expr::Sql(..) | Expr::Asterisk => {
            expr.clone()
        }
        Expr::Member(member) => Expr::Field(context.resolve(member)?),
        Expr::Eval(evaluator) => constant(evaluator.evaluate()),
        Expr::Unary(op, operand) => {
            let operand = fold(writer, context, operand)?;
            match op {
                UnaryOpType::Not => negate(operand),
                UnaryOpType::Negative => match operand.constant() {
                    Some(v) => evaluate_negative(v).map_or_else(
                        || Expr::Unary(UnaryOpType::Negative, Box::new(operand.clone())),
                        constant,
                    ),
                    None => Expr::Unary(UnaryOpType::Negative, Box::new(operand)),
                },
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            fold_binary(*op, fold(writer, context, lhs)?, fold(writer, context, rhs)?)
        }
        Expr::Call(function, args) => {
            let args = args
                .iter()
                .map(|v| fold(writer, context, v))
                .collect::<Result<Vec<_>>>()?;
            fold_call(writer, function, args)
        }
        Expr::Conditional(test, then, otherwise) => {
            let test = fold(writer, context, test)?;
            match test.constant() {
                Some(v) if v.as_bool() == Some(true) => fold(writer, context, then)?,
                Some(..) => fold(writer, context, otherwise)?,
                None => Expr::Conditional(
                    Box::new(test),
                    Box::new(fold(writer, context, then)?),
                    Box::new(fold(writer, context, otherwise)?),
                ),
            }
        }
        Expr::In {
            expr,
            target,
            negated,
        } => {
            let expr = fold(writer, context, expr)?;
            match target {
                InTarget::List(items) => {
                    let items = items
                        .iter()
                        .map(|v| fold(writer, context, v))
                        .collect::<Result<Vec<_>>>()?;
                    if items.is_empty() {
                        return Ok(Expr::Constant(Value::Boolean(Some(*negated))));
                    }
                    if let Some(value) = expr.constant()
                        && items.iter().all(Expr::is_constant)
                    {
                        let found = items
                            .iter()
                            .filter_map(Expr::constant)
                            .any(|item| values_equal(value, item));
                        return Ok(Expr::Constant(Value::Boolean(Some(found != *negated))));
                    }
                    Expr::In {
                        expr: Box::new(expr),
                        target: InTarget::List(items),
                        negated: *negated,
                    }
                }
                InTarget::Query(query) => Expr::In {
                    expr: Box::new(expr),
                    target: InTarget::Query(query.clone()),
                    negated: *negated,
                },
            }
        }
        Expr::IsNull { expr, negated } => {
            let expr = fold(writer, context, expr)?;
            match expr.constant() {
                Some(v) => Expr::Constant(Value::Boolean(Some(v.is_null() != *negated))),
                None => Expr::IsNull {
                    expr: Box::new(expr),
                    negated: *negated,
                },
            }
        }
        Expr::Like {
            expr,
            pattern,
            negated,
            escape,
        } => Expr::Like {
            expr: Box::new(fold(writer, context, expr)?),
            pattern: Box::new(fold(writer, context, pattern)?),
            negated: *negated,
            escape: *escape,
        },
    })
}

fn constant(value: Value) -> Expr {
    if value.is_null() {
        Expr::Null
    } else {
        Expr::Constant(value)
    }
}

fn boolean(value: bool) -> Expr {
    Expr::Constant(Value::Boolean(Some(value)))
}

/// Logical negation of an already folded expression.
pub fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Null => Expr::Null,
        Expr::Constant(Value::Boolean(Some(v))) => boolean(!v),
        Expr::Unary(UnaryOpType::Not, inner) => *inner,
        Expr::IsNull { expr, negated } => Expr::IsNull {
            expr,
            negated: !negated,
        },
        Expr::In {
            expr,
            target,
            negated,
        } => Expr::In {
            expr,
            target,
            negated: !negated,
        },
        Expr::Like {
            expr,
            pattern,
            negated,
            escape,
        } => Expr::Like {
            expr,
            pattern,
            negated: !negated,
            escape,
        },
        expr => Expr::Unary(UnaryOpType::Not, Box::new(expr)),
    }
}

fn fold_binary(op: BinaryOpType, lhs: Expr, rhs: Expr) -> Expr {
    if let (Some(l), Some(r)) = (lhs.constant(), rhs.constant())
        && let Some(result) = evaluate_binary(op, l, r)
    {
        return constant(result);
    }
    match op {
        BinaryOpType::Equal | BinaryOpType::NotEqual => {
            let negated = op == BinaryOpType::NotEqual;
            if lhs.constant().is_some_and(Value::is_null) {
                return Expr::IsNull {
                    expr: Box::new(rhs),
                    negated,
                };
            }
            if rhs.constant().is_some_and(Value::is_null) {
                return Expr::IsNull {
                    expr: Box::new(lhs),
                    negated,
                };
            }
            let lhs_bool = lhs.constant().and_then(Value::as_bool);
            let rhs_bool = rhs.constant().and_then(Value::as_bool);
            match (lhs_bool, rhs_bool) {
                // `predicate == true` is the predicate itself, `predicate == false` its negation
                (Some(v), None) if rhs.is_predicate() => {
                    if v != negated { rhs } else { negate(rhs) }
                }
                (None, Some(v)) if lhs.is_predicate() => {
                    if v != negated { lhs } else { negate(lhs) }
                }
                (Some(..), None) => Expr::Binary(op, Box::new(rhs), Box::new(lhs)),
                _ => Expr::Binary(op, Box::new(lhs), Box::new(rhs)),
            }
        }
        BinaryOpType::Less
        | BinaryOpType::Greater
        | BinaryOpType::LessEqual
        | BinaryOpType::GreaterEqual
            if lhs.is_constant() && !rhs.is_constant() =>
        {
            Expr::Binary(op.mirrored(), Box::new(rhs), Box::new(lhs))
        }
        _ => Expr::Binary(op, Box::new(lhs), Box::new(rhs)),
    }
}

fn fold_call(writer: &dyn SqlWriter, function: &Function, mut args: Vec<Expr>) -> Expr {
    match function {
        Function::StartsWith | Function::EndsWith | Function::Contains if args.len() == 2 => {
            let (Some(needle), Some(target)) = (args.pop(), args.pop()) else {
                return Expr::Call(function.clone(), args);
            };
            fold_like(writer, function, target, needle)
        }
        Function::Upper | Function::Lower | Function::Trim | Function::Length
            if args.len() == 1 =>
        {
            let Some(text) = args[0].constant().and_then(Value::to_text) else {
                return Expr::Call(function.clone(), args);
            };
            constant(match function {
                Function::Upper => Value::Varchar(Some(text.to_uppercase())),
                Function::Lower => Value::Varchar(Some(text.to_lowercase())),
                Function::Trim => Value::Varchar(Some(text.trim().to_owned())),
                _ => Value::Int64(Some(text.chars().count() as i64)),
            })
        }
        Function::Coalesce => {
            args.retain(|v| !matches!(v, Expr::Null));
            if let Some(i) = args.iter().position(Expr::is_constant) {
                args.truncate(i + 1);
            }
            match args.len() {
                0 => Expr::Null,
                1 => args.swap_remove(0),
                _ => Expr::Call(function.clone(), args),
            }
        }
        _ => Expr::Call(function.clone(), args),
    }
}

fn fold_like(writer: &dyn SqlWriter, function: &Function, target: Expr, needle: Expr) -> Expr {
    match needle.constant() {
        Some(needle) if needle.is_null() => boolean(false),
        Some(needle) => {
            let Some(needle) = needle.to_text() else {
                return boolean(false);
            };
            if let Some(target) = target.constant() {
                let Some(target) = target.to_text() else {
                    return boolean(false);
                };
                return boolean(match function {
                    Function::StartsWith => target.starts_with(needle.as_ref()),
                    Function::EndsWith => target.ends_with(needle.as_ref()),
                    _ => target.contains(needle.as_ref()),
                });
            }
            let (escaped, escape) = writer.escape_wildcards(&needle);
            let pattern = match function {
                Function::StartsWith => format!("{escaped}%"),
                Function::EndsWith => format!("%{escaped}"),
                _ => format!("%{escaped}%"),
            };
            Expr::Like {
                expr: Box::new(target),
                pattern: Box::new(Expr::Constant(Value::Varchar(Some(pattern)))),
                negated: false,
                escape,
            }
        }
        None => {
            let wildcard = || Expr::Constant(Value::Varchar(Some("%".into())));
            let pattern = match function {
                Function::StartsWith => needle.concat(wildcard()),
                Function::EndsWith => wildcard().concat(needle),
                _ => wildcard().concat(needle).concat(wildcard()),
            };
            Expr::Like {
                expr: Box::new(target),
                pattern: Box::new(pattern),
                negated: false,
                escape: false,
            }
        }
    }
}

/// Equality as seen by the host: two nulls are equal, null differs from
/// anything else.
pub fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs.is_null(), rhs.is_null()) {
        (true, true) => true,
        (true, false) | (false, true) => false,
        _ => match lhs.compare(rhs) {
            Some(ordering) => ordering == Ordering::Equal,
            None => lhs == rhs,
        },
    }
}

/// Evaluate a binary operator over two constants, `None` when the result is
/// better left to the database.
pub fn evaluate_binary(op: BinaryOpType, lhs: &Value, rhs: &Value) -> Option<Value> {
    let boolean = |v: bool| Some(Value::Boolean(Some(v)));
    match op {
        BinaryOpType::Equal => boolean(values_equal(lhs, rhs)),
        BinaryOpType::NotEqual => boolean(!values_equal(lhs, rhs)),
        BinaryOpType::Less
        | BinaryOpType::Greater
        | BinaryOpType::LessEqual
        | BinaryOpType::GreaterEqual => {
            if lhs.is_null() || rhs.is_null() {
                return boolean(false);
            }
            let ordering = lhs.compare(rhs)?;
            boolean(match op {
                BinaryOpType::Less => ordering.is_lt(),
                BinaryOpType::Greater => ordering.is_gt(),
                BinaryOpType::LessEqual => ordering.is_le(),
                _ => ordering.is_ge(),
            })
        }
        BinaryOpType::And => match (lhs.as_bool(), rhs.as_bool()) {
            (Some(false), _) | (_, Some(false)) => boolean(false),
            (Some(true), Some(true)) => boolean(true),
            _ => None,
        },
        BinaryOpType::Or => match (lhs.as_bool(), rhs.as_bool()) {
            (Some(true), _) | (_, Some(true)) => boolean(true),
            (Some(false), Some(false)) => boolean(false),
            _ => None,
        },
        BinaryOpType::Concat => concat(lhs, rhs),
        BinaryOpType::Addition
            if matches!(lhs, Value::Varchar(..) | Value::Char(..))
                || matches!(rhs, Value::Varchar(..) | Value::Char(..)) =>
        {
            concat(lhs, rhs)
        }
        BinaryOpType::Addition
        | BinaryOpType::Subtraction
        | BinaryOpType::Multiplication
        | BinaryOpType::Division
        | BinaryOpType::Remainder => evaluate_arithmetic(op, lhs, rhs),
    }
}

fn concat(lhs: &Value, rhs: &Value) -> Option<Value> {
    let text = |v: &Value| {
        if v.is_null() {
            Some(String::new())
        } else {
            v.to_text().map(Into::into)
        }
    };
    Some(Value::Varchar(Some(text(lhs)? + &text(rhs)?)))
}

fn evaluate_arithmetic(op: BinaryOpType, lhs: &Value, rhs: &Value) -> Option<Value> {
    if lhs.is_null() || rhs.is_null() {
        return Some(Value::Null);
    }
    if lhs.is_integer() && rhs.is_integer() {
        let (l, r) = (lhs.as_i128()?, rhs.as_i128()?);
        let result = match op {
            BinaryOpType::Addition => l.checked_add(r),
            BinaryOpType::Subtraction => l.checked_sub(r),
            BinaryOpType::Multiplication => l.checked_mul(r),
            BinaryOpType::Division => l.checked_div(r),
            _ => l.checked_rem(r),
        }?;
        return i64::try_from(result).ok().map(|v| Value::Int64(Some(v)));
    }
    if matches!(lhs, Value::Decimal(..)) || matches!(rhs, Value::Decimal(..)) {
        let (l, r): (Decimal, Decimal) = (lhs.as_decimal()?, rhs.as_decimal()?);
        let result = match op {
            BinaryOpType::Addition => l.checked_add(r),
            BinaryOpType::Subtraction => l.checked_sub(r),
            BinaryOpType::Multiplication => l.checked_mul(r),
            BinaryOpType::Division => l.checked_div(r),
            _ => l.checked_rem(r),
        }?;
        return Some(Value::Decimal(Some(result), 0, 0));
    }
    let (l, r) = (lhs.as_f64()?, rhs.as_f64()?);
    let result = match op {
        BinaryOpType::Addition => l + r,
        BinaryOpType::Subtraction => l - r,
        BinaryOpType::Multiplication => l * r,
        BinaryOpType::Division => l / r,
        _ => l % r,
    };
    result.is_finite().then_some(Value::Float64(Some(result)))
}

fn evaluate_negative(value: &Value) -> Option<Value> {
    match value {
        Value::Float32(Some(v)) => Some(Value::Float32(Some(-v))),
        Value::Float64(Some(v)) => Some(Value::Float64(Some(-v))),
        Value::Decimal(Some(v), precision, scale) => Some(Value::Decimal(Some(-v), *precision, *scale)),
        v if v.is_integer() => i64::try_from(v.as_i128()?.checked_neg()?)
            .ok()
            .map(|v| Value::Int64(Some(v))),
        _ => None,
    }
}
