//! Unary and binary operator evaluation.
//!
//! Boolean operators require boolean operands and everything else requires
//! numeric operands; mixed numeric operands are promoted through the number
//! lattice before operating. All input-driven failures are errors, never
//! panics.

use sluice_ast::{BinOp, UnaryOp};

use crate::error::Error;
use crate::kind::Kind;
use crate::number::{Number, NumberClass};
use crate::value::Value;

/// Performs a unary operation on a value.
pub fn unary(op: UnaryOp, value: &Value) -> Result<Value, Error> {
    match op {
        UnaryOp::Not => match value {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            _ => Err(Error::custom(
                "unary operation on non-boolean value".to_string(),
            )),
        },
        UnaryOp::Neg => match value {
            Value::Number(number) => Ok(match number.class() {
                NumberClass::Int => Value::int(-number.as_i64()),
                NumberClass::Uint => Value::int(-(number.as_u64() as i64)),
                NumberClass::Float => Value::float(-number.as_f64()),
            }),
            _ => Err(Error::custom(
                "unary operation on non-number value".to_string(),
            )),
        },
    }
}

/// Performs a binary operation on two values, promoting numeric operands to
/// a common type first.
pub fn binop(left: &Value, op: BinOp, right: &Value) -> Result<Value, Error> {
    match op {
        BinOp::And | BinOp::Or => logical_binop(left, op, right),
        _ => numerical_binop(left, op, right),
    }
}

fn logical_binop(left: &Value, op: BinOp, right: &Value) -> Result<Value, Error> {
    let (Value::Bool(lhs), Value::Bool(rhs)) = (left, right) else {
        return Err(Error::custom(
            "binary operation on non-boolean value".to_string(),
        ));
    };

    Ok(Value::Bool(match op {
        BinOp::Or => *lhs || *rhs,
        _ => *lhs && *rhs,
    }))
}

fn numerical_binop(left: &Value, op: BinOp, right: &Value) -> Result<Value, Error> {
    let (Value::Number(lhs), Value::Number(rhs)) = (left, right) else {
        // Report whichever operand has the wrong kind.
        let bad = if matches!(left, Value::Number(_)) {
            right
        } else {
            left
        };
        return Err(Error::type_error(bad, Kind::Number));
    };

    let ty = Number::fit(*lhs, *rhs);
    let (lhs, rhs) = (lhs.convert(ty), rhs.convert(ty));

    match ty.class() {
        NumberClass::Int => int_binop(lhs.as_i64(), op, rhs.as_i64()),
        NumberClass::Uint => uint_binop(lhs.as_u64(), op, rhs.as_u64()),
        NumberClass::Float => Ok(float_binop(lhs.as_f64(), op, rhs.as_f64())),
    }
}

fn int_binop(lhs: i64, op: BinOp, rhs: i64) -> Result<Value, Error> {
    Ok(match op {
        BinOp::Eq => Value::Bool(lhs == rhs),
        BinOp::Neq => Value::Bool(lhs != rhs),
        BinOp::Lt => Value::Bool(lhs < rhs),
        BinOp::Lte => Value::Bool(lhs <= rhs),
        BinOp::Gt => Value::Bool(lhs > rhs),
        BinOp::Gte => Value::Bool(lhs >= rhs),
        BinOp::Add => Value::int(lhs.wrapping_add(rhs)),
        BinOp::Sub => Value::int(lhs.wrapping_sub(rhs)),
        BinOp::Mul => Value::int(lhs.wrapping_mul(rhs)),
        BinOp::Div => {
            if rhs == 0 {
                return Err(Error::custom("division by zero".to_string()));
            }
            Value::int(lhs.wrapping_div(rhs))
        }
        BinOp::Mod => {
            if rhs == 0 {
                return Err(Error::custom("division by zero".to_string()));
            }
            Value::int(lhs.wrapping_rem(rhs))
        }
        BinOp::Pow => {
            if rhs < 0 {
                return Err(Error::custom(
                    "negative exponent in integer power".to_string(),
                ));
            }
            Value::int(int_pow(lhs, rhs as u64))
        }
        BinOp::And | BinOp::Or => unreachable!("logical operators handled separately"),
    })
}

fn uint_binop(lhs: u64, op: BinOp, rhs: u64) -> Result<Value, Error> {
    Ok(match op {
        BinOp::Eq => Value::Bool(lhs == rhs),
        BinOp::Neq => Value::Bool(lhs != rhs),
        BinOp::Lt => Value::Bool(lhs < rhs),
        BinOp::Lte => Value::Bool(lhs <= rhs),
        BinOp::Gt => Value::Bool(lhs > rhs),
        BinOp::Gte => Value::Bool(lhs >= rhs),
        BinOp::Add => Value::uint(lhs.wrapping_add(rhs)),
        BinOp::Sub => Value::uint(lhs.wrapping_sub(rhs)),
        BinOp::Mul => Value::uint(lhs.wrapping_mul(rhs)),
        BinOp::Div => {
            if rhs == 0 {
                return Err(Error::custom("division by zero".to_string()));
            }
            Value::uint(lhs / rhs)
        }
        BinOp::Mod => {
            if rhs == 0 {
                return Err(Error::custom("division by zero".to_string()));
            }
            Value::uint(lhs % rhs)
        }
        BinOp::Pow => Value::uint(int_pow(lhs, rhs)),
        BinOp::And | BinOp::Or => unreachable!("logical operators handled separately"),
    })
}

fn float_binop(lhs: f64, op: BinOp, rhs: f64) -> Value {
    match op {
        BinOp::Eq => Value::Bool(lhs == rhs),
        BinOp::Neq => Value::Bool(lhs != rhs),
        BinOp::Lt => Value::Bool(lhs < rhs),
        BinOp::Lte => Value::Bool(lhs <= rhs),
        BinOp::Gt => Value::Bool(lhs > rhs),
        BinOp::Gte => Value::Bool(lhs >= rhs),
        BinOp::Add => Value::float(lhs + rhs),
        BinOp::Sub => Value::float(lhs - rhs),
        BinOp::Mul => Value::float(lhs * rhs),
        BinOp::Div => Value::float(lhs / rhs),
        BinOp::Mod => Value::float(lhs % rhs),
        BinOp::Pow => Value::float(lhs.powf(rhs)),
        BinOp::And | BinOp::Or => unreachable!("logical operators handled separately"),
    }
}

/// Integer power by repeated multiplication. Overflow wraps like the other
/// integer operators.
fn int_pow<N: Copy + From<u8> + WrappingMul>(n: N, m: u64) -> N {
    if m == 0 {
        return N::from(1u8);
    }
    let mut result = n;
    for _ in 1..m {
        result = result.wrapping_mul(n);
    }
    result
}

trait WrappingMul {
    fn wrapping_mul(self, other: Self) -> Self;
}

impl WrappingMul for i64 {
    fn wrapping_mul(self, other: i64) -> i64 {
        i64::wrapping_mul(self, other)
    }
}

impl WrappingMul for u64 {
    fn wrapping_mul(self, other: u64) -> u64 {
        u64::wrapping_mul(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_on_ints() {
        assert_eq!(binop(&Value::int(3), BinOp::Add, &Value::int(5)).unwrap(), Value::int(8));
        assert_eq!(binop(&Value::int(3), BinOp::Sub, &Value::int(5)).unwrap(), Value::int(-2));
        assert_eq!(binop(&Value::int(3), BinOp::Mul, &Value::int(5)).unwrap(), Value::int(15));
        assert_eq!(binop(&Value::int(5), BinOp::Mod, &Value::int(3)).unwrap(), Value::int(2));
        assert_eq!(binop(&Value::int(7), BinOp::Div, &Value::int(2)).unwrap(), Value::int(3));
    }

    #[test]
    fn float_division() {
        assert_eq!(
            binop(&Value::float(3.0), BinOp::Div, &Value::float(5.0)).unwrap(),
            Value::float(0.6)
        );
    }

    #[test]
    fn mixed_operands_promote_to_float() {
        assert_eq!(
            binop(&Value::int(1), BinOp::Add, &Value::float(0.5)).unwrap(),
            Value::float(1.5)
        );
    }

    #[test]
    fn pow_uses_repeated_multiplication() {
        assert_eq!(
            binop(&Value::int(3), BinOp::Pow, &Value::int(5)).unwrap(),
            Value::int(243)
        );
        assert_eq!(
            binop(&Value::int(2), BinOp::Pow, &Value::int(0)).unwrap(),
            Value::int(1)
        );
        assert_eq!(
            binop(&Value::float(2.0), BinOp::Pow, &Value::float(-1.0)).unwrap(),
            Value::float(0.5)
        );
    }

    #[test]
    fn pow_negative_integer_exponent_errors() {
        let err = binop(&Value::int(2), BinOp::Pow, &Value::int(-3)).unwrap_err();
        assert_eq!(err.to_string(), "negative exponent in integer power");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let err = binop(&Value::int(1), BinOp::Div, &Value::int(0)).unwrap_err();
        assert_eq!(err.to_string(), "division by zero");
        let err = binop(&Value::uint(1), BinOp::Mod, &Value::uint(0)).unwrap_err();
        assert_eq!(err.to_string(), "division by zero");
        // Float division by zero follows IEEE semantics.
        let result = binop(&Value::float(1.0), BinOp::Div, &Value::float(0.0)).unwrap();
        assert_eq!(result, Value::float(f64::INFINITY));
    }

    #[test]
    fn comparisons_promote() {
        assert_eq!(
            binop(&Value::int(3), BinOp::Lt, &Value::float(3.5)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            binop(&Value::uint(3), BinOp::Eq, &Value::int(3)).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn logical_ops_require_bools() {
        assert_eq!(
            binop(&Value::Bool(true), BinOp::And, &Value::Bool(false)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            binop(&Value::Bool(false), BinOp::Or, &Value::Bool(true)).unwrap(),
            Value::Bool(true)
        );

        let err = binop(&Value::int(3), BinOp::Or, &Value::Bool(true)).unwrap_err();
        assert_eq!(err.to_string(), "binary operation on non-boolean value");
    }

    #[test]
    fn comparison_on_non_numbers_errors() {
        let err = binop(&Value::string("a"), BinOp::Eq, &Value::string("b")).unwrap_err();
        assert_eq!(err.to_string(), "expected number, got string");
    }

    #[test]
    fn unary_ops() {
        assert_eq!(unary(UnaryOp::Not, &Value::Bool(true)).unwrap(), Value::Bool(false));
        assert_eq!(unary(UnaryOp::Neg, &Value::int(15)).unwrap(), Value::int(-15));
        assert_eq!(unary(UnaryOp::Neg, &Value::uint(15)).unwrap(), Value::int(-15));
        assert_eq!(unary(UnaryOp::Neg, &Value::float(1.5)).unwrap(), Value::float(-1.5));

        assert!(unary(UnaryOp::Not, &Value::int(3)).is_err());
        assert!(unary(UnaryOp::Neg, &Value::Bool(true)).is_err());
    }
}
