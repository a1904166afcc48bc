use crate::errors::{MeasurementError, MeasurementResult};
use crate::value::MeasurementValue;
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Not, Sub};

/// A concrete scalar produced by evaluating a branch.
///
/// Arithmetic promotes `Bool` to `Int` (`false = 0`, `true = 1`) and anything combined with a
/// `Float` to `Float`. Division always produces a `Float` and follows IEEE semantics, so dividing
/// by zero gives an infinity or NaN. Integer arithmetic which overflows an `i64` falls back to
/// `Float`. Comparisons between `Int` and `Float` are exact rather than going through a cast.
#[derive(Clone, Copy, Debug)]
pub enum Outcome {
    /// A truth value.
    Bool(bool),
    /// An integer, measurement outcomes start as `Int(0)` or `Int(1)`.
    Int(i64),
    /// A floating point number.
    Float(f64),
}

enum Promoted {
    Int(i64, i64),
    Float(f64, f64),
}

impl Outcome {
    /// Truthiness: `false`, `0` and `0.0` are false, everything else is true. NaN is true.
    pub fn truthy(self) -> bool {
        match self {
            Outcome::Bool(b) => b,
            Outcome::Int(i) => i != 0,
            Outcome::Float(f) => f != 0.0,
        }
    }

    /// The outcome as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Outcome::Bool(b) => b as i64 as f64,
            Outcome::Int(i) => i as f64,
            Outcome::Float(f) => f,
        }
    }

    fn promote(self, other: Self) -> Promoted {
        match (self, other) {
            (Outcome::Float(_), _) | (_, Outcome::Float(_)) => {
                Promoted::Float(self.as_f64(), other.as_f64())
            }
            _ => Promoted::Int(self.as_int(), other.as_int()),
        }
    }

    fn as_int(self) -> i64 {
        match self {
            Outcome::Bool(b) => b as i64,
            Outcome::Int(i) => i,
            Outcome::Float(f) => f as i64,
        }
    }
}

/// Exact ordering of an integer against a float. `None` if the float is NaN.
fn cmp_int_float(i: i64, f: f64) -> Option<Ordering> {
    // 2^63, the first float above every i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        None
    } else if f >= LIMIT {
        Some(Ordering::Less)
    } else if f < -LIMIT {
        Some(Ordering::Greater)
    } else {
        let whole = f.trunc();
        match i.cmp(&(whole as i64)) {
            Ordering::Equal => 0.0f64.partial_cmp(&(f - whole)),
            o => Some(o),
        }
    }
}

impl PartialEq for Outcome {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Outcome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (*self, *other) {
            (Outcome::Float(a), Outcome::Float(b)) => a.partial_cmp(&b),
            (Outcome::Float(a), b) => cmp_int_float(b.as_int(), a).map(Ordering::reverse),
            (a, Outcome::Float(b)) => cmp_int_float(a.as_int(), b),
            (a, b) => a.as_int().partial_cmp(&b.as_int()),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Bool(b) => write!(f, "{}", b),
            Outcome::Int(i) => write!(f, "{}", i),
            // Debug keeps the trailing ".0" on whole floats.
            Outcome::Float(x) => write!(f, "{:?}", x),
        }
    }
}

macro_rules! outcome_arith {
    ($tr:ident, $method:ident, $int:expr, $float:expr) => {
        impl $tr for Outcome {
            type Output = Outcome;

            fn $method(self, rhs: Outcome) -> Outcome {
                match self.promote(rhs) {
                    Promoted::Int(a, b) => $int(a, b),
                    Promoted::Float(a, b) => Outcome::Float($float(a, b)),
                }
            }
        }
    };
}

outcome_arith!(
    Add,
    add,
    |a: i64, b: i64| a
        .checked_add(b)
        .map_or(Outcome::Float(a as f64 + b as f64), Outcome::Int),
    |a: f64, b: f64| a + b
);
outcome_arith!(
    Sub,
    sub,
    |a: i64, b: i64| a
        .checked_sub(b)
        .map_or(Outcome::Float(a as f64 - b as f64), Outcome::Int),
    |a: f64, b: f64| a - b
);
outcome_arith!(
    Mul,
    mul,
    |a: i64, b: i64| a
        .checked_mul(b)
        .map_or(Outcome::Float(a as f64 * b as f64), Outcome::Int),
    |a: f64, b: f64| a * b
);
outcome_arith!(
    Div,
    div,
    |a: i64, b: i64| Outcome::Float(a as f64 / b as f64),
    |a: f64, b: f64| a / b
);

impl Not for Outcome {
    type Output = Outcome;

    fn not(self) -> Outcome {
        Outcome::Bool(!self.truthy())
    }
}

impl From<bool> for Outcome {
    fn from(b: bool) -> Self {
        Outcome::Bool(b)
    }
}

impl From<u8> for Outcome {
    fn from(i: u8) -> Self {
        Outcome::Int(i as i64)
    }
}

impl From<i32> for Outcome {
    fn from(i: i32) -> Self {
        Outcome::Int(i as i64)
    }
}

impl From<i64> for Outcome {
    fn from(i: i64) -> Self {
        Outcome::Int(i)
    }
}

impl From<f64> for Outcome {
    fn from(f: f64) -> Self {
        Outcome::Float(f)
    }
}

impl From<Outcome> for f64 {
    fn from(o: Outcome) -> Self {
        o.as_f64()
    }
}

impl TryFrom<Outcome> for bool {
    type Error = MeasurementError;

    fn try_from(o: Outcome) -> MeasurementResult<Self> {
        match o {
            Outcome::Bool(b) => Ok(b),
            Outcome::Int(0) => Ok(false),
            Outcome::Int(1) => Ok(true),
            Outcome::Float(f) if f == 0.0 => Ok(false),
            Outcome::Float(f) if f == 1.0 => Ok(true),
            o => Err(MeasurementError::mismatch(format!(
                "{} is not a boolean outcome",
                o
            ))),
        }
    }
}

impl TryFrom<Outcome> for i64 {
    type Error = MeasurementError;

    fn try_from(o: Outcome) -> MeasurementResult<Self> {
        match o {
            Outcome::Float(f) if f.fract() != 0.0 => Err(MeasurementError::mismatch(format!(
                "{} is not an integer outcome",
                o
            ))),
            o => o.to_i64().ok_or_else(|| {
                MeasurementError::mismatch(format!("{} does not fit in an i64", o))
            }),
        }
    }
}

impl ToPrimitive for Outcome {
    fn to_i64(&self) -> Option<i64> {
        match *self {
            Outcome::Bool(b) => Some(b as i64),
            Outcome::Int(i) => Some(i),
            Outcome::Float(f) => f.to_i64(),
        }
    }

    fn to_u64(&self) -> Option<u64> {
        match *self {
            Outcome::Bool(b) => Some(b as u64),
            Outcome::Int(i) => i.to_u64(),
            Outcome::Float(f) => f.to_u64(),
        }
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.as_f64())
    }
}

/// Binary operators available on measurement values.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`, always a float.
    Div,
    /// `a == b`
    Eq,
    /// `a != b`
    Ne,
    /// `a < b`
    Lt,
    /// `a <= b`
    Le,
    /// `a > b`
    Gt,
    /// `a >= b`
    Ge,
    /// Both operands truthy.
    And,
    /// Either operand truthy.
    Or,
}

impl BinaryOp {
    /// Apply the operator to concrete outcomes.
    pub fn call(self, a: Outcome, b: Outcome) -> Outcome {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Eq => Outcome::Bool(a == b),
            BinaryOp::Ne => Outcome::Bool(a != b),
            BinaryOp::Lt => Outcome::Bool(a < b),
            BinaryOp::Le => Outcome::Bool(a <= b),
            BinaryOp::Gt => Outcome::Bool(a > b),
            BinaryOp::Ge => Outcome::Bool(a >= b),
            BinaryOp::And => Outcome::Bool(a.truthy() && b.truthy()),
            BinaryOp::Or => Outcome::Bool(a.truthy() || b.truthy()),
        }
    }

    /// Conventional symbol for the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }
}

/// Unary operators available on measurement values.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation of the truthiness.
    Not,
}

impl UnaryOp {
    /// Apply the operator to a concrete outcome.
    pub fn call(self, a: Outcome) -> Outcome {
        match self {
            UnaryOp::Not => !a,
        }
    }
}

/// Right hand side of a binary operator: another deferred value or a plain scalar.
#[derive(Clone, Debug)]
pub enum Operand {
    /// Merged with the left hand side before the operator is applied.
    Deferred(MeasurementValue<Outcome>),
    /// Applied to each branch of the left hand side directly.
    Scalar(Outcome),
}

impl From<MeasurementValue<Outcome>> for Operand {
    fn from(v: MeasurementValue<Outcome>) -> Self {
        Operand::Deferred(v)
    }
}

impl From<&MeasurementValue<Outcome>> for Operand {
    fn from(v: &MeasurementValue<Outcome>) -> Self {
        Operand::Deferred(v.clone())
    }
}

macro_rules! scalar_operand {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(s: $t) -> Self {
                    Operand::Scalar(Outcome::from(s))
                }
            }
        )*
    };
}

scalar_operand!(Outcome, bool, u8, i32, i64, f64);

impl MeasurementValue<Outcome> {
    /// Combine with `rhs` under `op`. Deferred operands are merged first; scalar operands leave
    /// the measurements unchanged.
    pub fn binary_op<R: Into<Operand>>(&self, op: BinaryOp, rhs: R) -> Self {
        match rhs.into() {
            Operand::Deferred(other) => self.merge(&other).apply(move |(a, b)| op.call(a, b)),
            Operand::Scalar(s) => self.apply(move |v| op.call(v, s)),
        }
    }

    /// Combine with a scalar on the left hand side, `lhs op self`.
    pub fn reflected_op<S: Into<Outcome>>(&self, op: BinaryOp, lhs: S) -> Self {
        let lhs = lhs.into();
        self.apply(move |v| op.call(lhs, v))
    }

    /// Apply a unary operator to each branch.
    pub fn unary_op(&self, op: UnaryOp) -> Self {
        self.apply(move |v| op.call(v))
    }

    /// Logical negation, same as `!value`.
    pub fn logical_not(&self) -> Self {
        self.unary_op(UnaryOp::Not)
    }

    /// Per-branch `self == rhs`.
    pub fn equals<R: Into<Operand>>(&self, rhs: R) -> Self {
        self.binary_op(BinaryOp::Eq, rhs)
    }

    /// Per-branch `self != rhs`.
    pub fn not_equals<R: Into<Operand>>(&self, rhs: R) -> Self {
        self.binary_op(BinaryOp::Ne, rhs)
    }

    /// Per-branch `self < rhs`.
    pub fn less_than<R: Into<Operand>>(&self, rhs: R) -> Self {
        self.binary_op(BinaryOp::Lt, rhs)
    }

    /// Per-branch `self <= rhs`.
    pub fn less_equal<R: Into<Operand>>(&self, rhs: R) -> Self {
        self.binary_op(BinaryOp::Le, rhs)
    }

    /// Per-branch `self > rhs`.
    pub fn greater_than<R: Into<Operand>>(&self, rhs: R) -> Self {
        self.binary_op(BinaryOp::Gt, rhs)
    }

    /// Per-branch `self >= rhs`.
    pub fn greater_equal<R: Into<Operand>>(&self, rhs: R) -> Self {
        self.binary_op(BinaryOp::Ge, rhs)
    }

    /// Per-branch logical and, same as `self & rhs`.
    pub fn and<R: Into<Operand>>(&self, rhs: R) -> Self {
        self.binary_op(BinaryOp::And, rhs)
    }

    /// Per-branch logical or, same as `self | rhs`.
    pub fn or<R: Into<Operand>>(&self, rhs: R) -> Self {
        self.binary_op(BinaryOp::Or, rhs)
    }
}

macro_rules! value_binary_trait {
    ($tr:ident, $method:ident, $op:expr) => {
        impl<R: Into<Operand>> $tr<R> for MeasurementValue<Outcome> {
            type Output = MeasurementValue<Outcome>;

            fn $method(self, rhs: R) -> Self::Output {
                self.binary_op($op, rhs)
            }
        }

        impl<R: Into<Operand>> $tr<R> for &MeasurementValue<Outcome> {
            type Output = MeasurementValue<Outcome>;

            fn $method(self, rhs: R) -> Self::Output {
                self.binary_op($op, rhs)
            }
        }
    };
}

value_binary_trait!(Add, add, BinaryOp::Add);
value_binary_trait!(Sub, sub, BinaryOp::Sub);
value_binary_trait!(Mul, mul, BinaryOp::Mul);
value_binary_trait!(Div, div, BinaryOp::Div);
value_binary_trait!(BitAnd, bitand, BinaryOp::And);
value_binary_trait!(BitOr, bitor, BinaryOp::Or);

impl Not for MeasurementValue<Outcome> {
    type Output = MeasurementValue<Outcome>;

    fn not(self) -> Self::Output {
        self.logical_not()
    }
}

impl Not for &MeasurementValue<Outcome> {
    type Output = MeasurementValue<Outcome>;

    fn not(self) -> Self::Output {
        self.logical_not()
    }
}

macro_rules! reflected_trait {
    ($t:ty; $(($tr:ident, $method:ident, $op:expr)),*) => {
        $(
            impl $tr<MeasurementValue<Outcome>> for $t {
                type Output = MeasurementValue<Outcome>;

                fn $method(self, rhs: MeasurementValue<Outcome>) -> Self::Output {
                    rhs.reflected_op($op, self)
                }
            }

            impl $tr<&MeasurementValue<Outcome>> for $t {
                type Output = MeasurementValue<Outcome>;

                fn $method(self, rhs: &MeasurementValue<Outcome>) -> Self::Output {
                    rhs.reflected_op($op, self)
                }
            }
        )*
    };
}

macro_rules! reflected_arith {
    ($($t:ty),*) => {
        $(
            reflected_trait!($t;
                (Add, add, BinaryOp::Add),
                (Sub, sub, BinaryOp::Sub),
                (Mul, mul, BinaryOp::Mul),
                (Div, div, BinaryOp::Div)
            );
        )*
    };
}

reflected_arith!(Outcome, bool, u8, i32, i64, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::measure;

    #[test]
    fn test_outcome_promotion() {
        assert_eq!(Outcome::Bool(true) + Outcome::Int(1), Outcome::Int(2));
        assert_eq!(Outcome::Int(1) + Outcome::Float(0.5), Outcome::Float(1.5));
        assert_eq!(Outcome::Int(1) / Outcome::Int(2), Outcome::Float(0.5));
        assert!(Outcome::Int(1) / Outcome::Int(0) == Outcome::Float(f64::INFINITY));
        assert_eq!(Outcome::Bool(true), Outcome::Int(1));
        assert!(Outcome::Int(0) < Outcome::Float(0.5));
    }

    #[test]
    fn test_overflow_falls_back_to_float() -> MeasurementResult<()> {
        assert_eq!(
            Outcome::Int(i64::MAX) + Outcome::Int(1),
            Outcome::Float(9_223_372_036_854_775_808.0)
        );
        assert!(matches!(
            Outcome::Int(i64::MIN) - Outcome::Int(1),
            Outcome::Float(f) if f < 0.0
        ));
        assert!(matches!(
            Outcome::Int(i64::MAX) * Outcome::Int(2),
            Outcome::Float(f) if f > 0.0
        ));
        assert_eq!(Outcome::Int(3) * Outcome::Int(4), Outcome::Int(12));

        let m = measure(0)?;
        let v = (&m + i64::MAX).greater_than(0);
        assert_eq!(v.branch(0)?, Outcome::Bool(true));
        assert_eq!(v.branch(1)?, Outcome::Bool(true));
        Ok(())
    }

    #[test]
    fn test_int_float_comparison_is_exact() {
        let big = 1i64 << 53;
        let f = Outcome::Float(9_007_199_254_740_992.0);
        assert_eq!(Outcome::Int(big), f);
        assert_ne!(Outcome::Int(big + 1), f);
        assert_ne!(f, Outcome::Int(big + 1));
        assert!(Outcome::Int(big + 1) > f);
        assert!(f < Outcome::Int(big + 1));
        assert!(Outcome::Int(i64::MAX) < Outcome::Float(9_223_372_036_854_775_808.0));
        assert!(Outcome::Int(i64::MIN) == Outcome::Float(-9_223_372_036_854_775_808.0));
        assert!(Outcome::Int(-1) > Outcome::Float(-1.5));
        assert!(Outcome::Int(1) < Outcome::Float(f64::INFINITY));
        assert!(Outcome::Bool(true) == Outcome::Float(1.0));
        assert_eq!(Outcome::Int(0).partial_cmp(&Outcome::Float(f64::NAN)), None);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Int(3).to_string(), "3");
        assert_eq!(Outcome::Float(1.0).to_string(), "1.0");
        assert_eq!(Outcome::Bool(false).to_string(), "false");
    }

    #[test]
    fn test_outcome_conversions() {
        assert_eq!(bool::try_from(Outcome::Int(1)), Ok(true));
        assert!(matches!(
            bool::try_from(Outcome::Int(2)),
            Err(MeasurementError::TypeMismatch(_))
        ));
        assert_eq!(i64::try_from(Outcome::Float(3.0)), Ok(3));
        assert!(matches!(
            i64::try_from(Outcome::Float(0.5)),
            Err(MeasurementError::TypeMismatch(_))
        ));
        assert_eq!(Outcome::Bool(true).to_u64(), Some(1));
        assert_eq!(f64::from(Outcome::Int(2)), 2.0);
    }

    #[test]
    fn test_table() {
        let (a, b) = (Outcome::Int(1), Outcome::Int(0));
        assert_eq!(BinaryOp::Sub.call(a, b), Outcome::Int(1));
        assert_eq!(BinaryOp::Ge.call(a, b), Outcome::Bool(true));
        assert_eq!(BinaryOp::And.call(a, b), Outcome::Bool(false));
        assert_eq!(BinaryOp::Or.call(a, b), Outcome::Bool(true));
        assert_eq!(UnaryOp::Not.call(b), Outcome::Bool(true));
        assert_eq!(BinaryOp::Le.symbol(), "<=");
    }

    #[test]
    fn test_scalar_keeps_measurements() -> MeasurementResult<()> {
        let m = measure(0)?;
        let values = [
            &m + 1,
            &m - 2.5,
            &m * true,
            &m / 2,
            m.less_than(1),
            m.or(false),
            3 - &m,
            1.0 / &m,
        ];
        values.iter().for_each(|v| assert_eq!(v.n(), 1));
        Ok(())
    }

    #[test]
    fn test_reflected_order() -> MeasurementResult<()> {
        let m = measure(0)?;
        let v: MeasurementValue<Outcome> = 1 - &m;
        assert_eq!(v.branch(0)?, Outcome::Int(1));
        assert_eq!(v.branch(1)?, Outcome::Int(0));
        let v = 2.0 / &m;
        assert_eq!(v.branch(1)?, Outcome::Float(2.0));
        let v = 1u8 + &m;
        assert_eq!(v.branch(1)?, Outcome::Int(2));
        let v = 2u8 - m.clone();
        assert_eq!(v.branch(1)?, Outcome::Int(1));
        Ok(())
    }

    #[test]
    fn test_owned_and_borrowed_agree() -> MeasurementResult<()> {
        let m0 = measure(0)?;
        let m1 = measure(1)?;
        let borrowed = &m0 - &m1;
        let owned = m0.clone() - m1.clone();
        assert_eq!(borrowed.branches()?, owned.branches()?);
        Ok(())
    }

    #[test]
    fn test_not() -> MeasurementResult<()> {
        let m = measure(0)?;
        let v = !&m;
        assert_eq!(v.branch(0)?, Outcome::Bool(true));
        assert_eq!(v.branch(1)?, Outcome::Bool(false));
        Ok(())
    }
}
