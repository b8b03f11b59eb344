use std::{cmp::Ordering, fmt};

use crate::RuntimeError;

/// A runtime scalar. Integers and decimals mix freely; strings concatenate under `ADD`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl Arith {
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        match s {
            "ADD" => Some(Arith::Add),
            "SUB" => Some(Arith::Sub),
            "MUL" => Some(Arith::Mul),
            "DIV" => Some(Arith::Div),
            "MOD" => Some(Arith::Mod),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Arith::Add => "ADD",
            Arith::Sub => "SUB",
            Arith::Mul => "MUL",
            Arith::Div => "DIV",
            Arith::Mod => "MOD",
        }
    }
}

enum Num {
    Int(i64),
    Float(f64),
}

impl Value {
    /// Parses an operand that is spelled as a literal. Returns `None` for names.
    pub fn literal(token: &str) -> Option<Value> {
        if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
            return Some(Value::Str(token[1..token.len() - 1].to_string()));
        }
        let digits = token.strip_prefix('-').unwrap_or(token);
        if is_digits(digits) {
            return Some(match token.parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => Value::Float(token.parse().unwrap_or(0.0)),
            });
        }
        if let Some((whole, frac)) = digits.split_once('.') {
            if is_digits(whole) && is_digits(frac) {
                return token.parse().ok().map(Value::Float);
            }
        }
        match token {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        }
    }

    /// Numeric view of a value. Booleans count as 0 and 1, a blank string as 0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) if s.trim().is_empty() => Some(0.0),
            Value::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Equality that agrees with [`Value::compare`], so `false`, `0` and `""`
    /// are all equal to `0`.
    pub fn loose_eq(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// Strings order lexicographically, everything else numerically.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }

    fn as_num(&self, op: Arith) -> Result<Num, RuntimeError> {
        match self {
            Value::Int(i) => Ok(Num::Int(*i)),
            Value::Float(x) => Ok(Num::Float(*x)),
            Value::Bool(b) => Ok(Num::Int(*b as i64)),
            Value::Str(s) => Err(RuntimeError::NonNumeric {
                op: op.mnemonic().to_string(),
                value: s.clone(),
            }),
        }
    }

    pub fn apply(&self, op: Arith, rhs: &Value) -> Result<Value, RuntimeError> {
        if op == Arith::Add && (matches!(self, Value::Str(_)) || matches!(rhs, Value::Str(_))) {
            return Ok(Value::Str(format!("{self}{rhs}")));
        }
        match (self.as_num(op)?, rhs.as_num(op)?) {
            (Num::Int(a), Num::Int(b)) => int_op(op, a, b),
            (a, b) => float_op(op, to_f64(a), to_f64(b)),
        }
    }
}

fn to_f64(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(x) => x,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn int_op(op: Arith, a: i64, b: i64) -> Result<Value, RuntimeError> {
    Ok(Value::Int(match op {
        Arith::Add => a.wrapping_add(b),
        Arith::Sub => a.wrapping_sub(b),
        Arith::Mul => a.wrapping_mul(b),
        Arith::Div => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            let q = a.wrapping_div(b);
            if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
                q - 1
            } else {
                q
            }
        }
        Arith::Mod => {
            if b == 0 {
                return Err(RuntimeError::ModuloByZero);
            }
            let r = a.wrapping_rem(b);
            if r != 0 && ((r < 0) != (b < 0)) {
                r + b
            } else {
                r
            }
        }
    }))
}

fn float_op(op: Arith, a: f64, b: f64) -> Result<Value, RuntimeError> {
    Ok(match op {
        Arith::Add => Value::Float(a + b),
        Arith::Sub => Value::Float(a - b),
        Arith::Mul => Value::Float(a * b),
        Arith::Div => {
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            let q = (a / b).floor();
            if q.is_finite() && q.abs() < i64::MAX as f64 {
                Value::Int(q as i64)
            } else {
                Value::Float(q)
            }
        }
        Arith::Mod => {
            if b == 0.0 {
                return Err(RuntimeError::ModuloByZero);
            }
            Value::Float(a - b * (a / b).floor())
        }
    })
}

/// Leading-prefix integer parse: `"12abc"` is 12, anything without leading digits is 0.
pub fn parse_int_prefix(input: &str) -> i64 {
    let s = input.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// Leading-prefix decimal parse, in the same manner as [`parse_int_prefix`].
pub fn parse_float_prefix(input: &str) -> f64 {
    let s = input.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '-' | '+' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            c if c.is_ascii_digit() => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    s[..end].parse().unwrap_or(0.0)
}
