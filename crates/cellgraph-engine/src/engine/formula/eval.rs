//! Expression tree evaluation.

use std::cmp::Ordering;

use super::FormulaError;
use super::parser::{Expr, Op};
use crate::engine::value::{Value, format_number};

type EvalResult = Result<Value, FormulaError>;

pub(crate) fn eval(expr: &Expr) -> EvalResult {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),
        Expr::Error(kind) => Err(FormulaError::Propagated(*kind)),
        Expr::Name(name) => Err(FormulaError::UnknownName(name.clone())),
        Expr::Neg(inner) => finite(-to_number(&eval(inner)?)?),
        Expr::Percent(inner) => finite(to_number(&eval(inner)?)? / 100.0),
        Expr::Chain { first, rest } => {
            let mut acc = eval(first)?;
            for (op, operand) in rest {
                acc = binary(*op, acc, eval(operand)?)?;
            }
            Ok(acc)
        }
        Expr::Binary { op, lhs, rhs } => binary(*op, eval(lhs)?, eval(rhs)?),
        Expr::Call { name, args } => call(name, args),
    }
}

fn finite(n: f64) -> EvalResult {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(FormulaError::NonFinite)
    }
}

fn to_number(value: &Value) -> Result<f64, FormulaError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| FormulaError::InvalidOperand(format!("{s:?} is not a number"))),
        Value::Error(kind) => Err(FormulaError::Propagated(*kind)),
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        Value::Text(s) => s.clone(),
        Value::Error(kind) => kind.marker().to_string(),
    }
}

fn truthy(value: &Value) -> Result<bool, FormulaError> {
    Ok(to_number(value)? != 0.0)
}

fn binary(op: Op, lhs: Value, rhs: Value) -> EvalResult {
    match op {
        Op::Add => finite(to_number(&lhs)? + to_number(&rhs)?),
        Op::Sub => finite(to_number(&lhs)? - to_number(&rhs)?),
        Op::Mul => finite(to_number(&lhs)? * to_number(&rhs)?),
        Op::Div => {
            let (a, b) = (to_number(&lhs)?, to_number(&rhs)?);
            if b == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            finite(a / b)
        }
        Op::Pow => finite(to_number(&lhs)?.powf(to_number(&rhs)?)),
        Op::Concat => Ok(Value::Text(to_text(&lhs) + &to_text(&rhs))),
        Op::Eq | Op::NotEq | Op::Lt | Op::Gt | Op::LtEq | Op::GtEq => {
            let ordering = compare(&lhs, &rhs)?;
            let holds = match op {
                Op::Eq => ordering == Ordering::Equal,
                Op::NotEq => ordering != Ordering::Equal,
                Op::Lt => ordering == Ordering::Less,
                Op::Gt => ordering == Ordering::Greater,
                Op::LtEq => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Number(if holds { 1.0 } else { 0.0 }))
        }
    }
}

/// Numbers sort before text; text compares case-insensitively.
fn compare(lhs: &Value, rhs: &Value) -> Result<Ordering, FormulaError> {
    match (lhs, rhs) {
        (Value::Error(kind), _) | (_, Value::Error(kind)) => Err(FormulaError::Propagated(*kind)),
        (Value::Number(a), Value::Number(b)) => {
            Ok(a.partial_cmp(b).unwrap_or(Ordering::Equal))
        }
        (Value::Text(a), Value::Text(b)) => Ok(a.to_lowercase().cmp(&b.to_lowercase())),
        (Value::Number(_), Value::Text(_)) => Ok(Ordering::Less),
        (Value::Text(_), Value::Number(_)) => Ok(Ordering::Greater),
    }
}

fn call(name: &str, args: &[Expr]) -> EvalResult {
    let arity = |ok: bool| {
        if ok {
            Ok(())
        } else {
            Err(FormulaError::WrongArgumentCount(name.to_string()))
        }
    };

    match name {
        // IF only evaluates the branch it takes.
        "IF" => {
            arity(args.len() == 2 || args.len() == 3)?;
            if truthy(&eval(&args[0])?)? {
                eval(&args[1])
            } else if let Some(otherwise) = args.get(2) {
                eval(otherwise)
            } else {
                Ok(Value::Number(0.0))
            }
        }
        "SUM" => finite(numbers(args)?.iter().sum()),
        "MIN" => {
            let ns = numbers(args)?;
            Ok(Value::Number(ns.iter().copied().reduce(f64::min).unwrap_or(0.0)))
        }
        "MAX" => {
            let ns = numbers(args)?;
            Ok(Value::Number(ns.iter().copied().reduce(f64::max).unwrap_or(0.0)))
        }
        "AVERAGE" => {
            let ns = numbers(args)?;
            if ns.is_empty() {
                return Err(FormulaError::DivisionByZero);
            }
            finite(ns.iter().sum::<f64>() / ns.len() as f64)
        }
        "ABS" => {
            arity(args.len() == 1)?;
            Ok(Value::Number(to_number(&eval(&args[0])?)?.abs()))
        }
        "ROUND" => {
            arity(args.len() == 1 || args.len() == 2)?;
            let n = to_number(&eval(&args[0])?)?;
            let digits = match args.get(1) {
                Some(arg) => to_number(&eval(arg)?)?.trunc().clamp(-308.0, 308.0) as i32,
                None => 0,
            };
            finite(round_to(n, digits))
        }
        _ => Err(FormulaError::UnknownName(name.to_string())),
    }
}

fn numbers(args: &[Expr]) -> Result<Vec<f64>, FormulaError> {
    args.iter().map(|arg| to_number(&eval(arg)?)).collect()
}

/// Round half away from zero to `digits` decimal places (negative rounds left of the point).
fn round_to(n: f64, digits: i32) -> f64 {
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        (n * factor).round() / factor
    } else {
        let factor = 10f64.powi(-digits);
        (n / factor).round() * factor
    }
}
