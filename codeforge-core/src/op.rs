use codeforge_vm::{Arith, Relation};
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// A dot-suffixed operator, `+.` through `<.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl Operator {
    pub fn from_lexeme(s: &str) -> Option<Self> {
        Some(match s {
            "+." => Operator::Add,
            "-." => Operator::Sub,
            "*." => Operator::Mul,
            "/." => Operator::Div,
            "%." => Operator::Mod,
            "==." => Operator::Eq,
            "!=." => Operator::Ne,
            ">=." => Operator::Ge,
            "<=." => Operator::Le,
            ">." => Operator::Gt,
            "<." => Operator::Lt,
            _ => return None,
        })
    }

    pub fn lexeme(self) -> &'static str {
        match self {
            Operator::Add => "+.",
            Operator::Sub => "-.",
            Operator::Mul => "*.",
            Operator::Div => "/.",
            Operator::Mod => "%.",
            Operator::Eq => "==.",
            Operator::Ne => "!=.",
            Operator::Ge => ">=.",
            Operator::Le => "<=.",
            Operator::Gt => ">.",
            Operator::Lt => "<.",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod
        )
    }

    /// Accumulator instruction for this operator. Comparisons fall back to `ADD`.
    pub fn arith(self) -> Arith {
        match self {
            Operator::Sub => Arith::Sub,
            Operator::Mul => Arith::Mul,
            Operator::Div => Arith::Div,
            Operator::Mod => Arith::Mod,
            _ => Arith::Add,
        }
    }

    fn relation(self) -> Relation {
        match self {
            Operator::Ne => Relation::Ne,
            Operator::Gt => Relation::Gt,
            Operator::Lt => Relation::Lt,
            Operator::Ge => Relation::Ge,
            Operator::Le => Relation::Le,
            _ => Relation::Eq,
        }
    }

    /// Jump taken when the comparison does not hold. Non-comparison operators use the `==.` row.
    pub fn false_jump(self) -> Relation {
        self.relation().negate()
    }

    pub fn true_jump(self) -> Relation {
        self.relation()
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.lexeme())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
