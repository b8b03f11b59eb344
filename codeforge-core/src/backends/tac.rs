use std::fmt::{Display, Formatter};

use codeforge_vm::Relation;
use serde::{Serialize, Serializer};

use super::Backend;
use crate::{
    compiler::{Condition, Instruction},
    op::Operator,
    parser::{Arg, NodeChain},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacOp {
    Assign,
    Label,
    Goto,
    Ret,
    Call,
    Param,
    Cmp,
    Jump(Relation),
    Binary(Operator),
}

impl Display for TacOp {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            TacOp::Assign => write!(f, "assign"),
            TacOp::Label => write!(f, "label"),
            TacOp::Goto => write!(f, "goto"),
            TacOp::Ret => write!(f, "ret"),
            TacOp::Call => write!(f, "call"),
            TacOp::Param => write!(f, "param"),
            TacOp::Cmp => write!(f, "CMP"),
            TacOp::Jump(relation) => write!(f, "{relation}"),
            TacOp::Binary(op) => write!(f, "{op}"),
        }
    }
}

impl Serialize for TacOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One three-address instruction. Absent fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tac {
    pub op: TacOp,
    pub arg1: Option<String>,
    pub arg2: Option<String>,
    pub result: Option<String>,
}

impl Tac {
    fn new(op: TacOp, arg1: Option<&str>, arg2: Option<&str>, result: Option<&str>) -> Self {
        Self {
            op,
            arg1: arg1.map(str::to_string),
            arg2: arg2.map(str::to_string),
            result: result.map(str::to_string),
        }
    }
}

impl Display for Tac {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let arg1 = self.arg1.as_deref().unwrap_or_default();
        let arg2 = self.arg2.as_deref().unwrap_or_default();
        let result = self.result.as_deref().unwrap_or_default();
        match self.op {
            TacOp::Assign => write!(f, "{result} = {arg1}"),
            TacOp::Label => write!(f, "{result}:"),
            TacOp::Goto => write!(f, "goto {result}"),
            TacOp::Ret => write!(f, "ret"),
            TacOp::Call => write!(f, "call {arg1}, {arg2}"),
            TacOp::Param => write!(f, "param {arg1}"),
            TacOp::Cmp => write!(f, "CMP {arg1}, {arg2}"),
            TacOp::Jump(relation) => write!(f, "{relation} {result}"),
            TacOp::Binary(op) => write!(f, "{result} = {arg1} {op} {arg2}"),
        }
    }
}

/// Lowers to three-address code. Every binary operation gets a fresh temporary
/// and functions stay where they were written.
#[derive(Default)]
pub struct TacBackend {
    pub code: Vec<Tac>,
    temp_count: usize,
}

impl TacBackend {
    fn temp(&mut self) -> String {
        self.temp_count += 1;
        format!("t{}", self.temp_count)
    }

    fn push(&mut self, op: TacOp, arg1: Option<&str>, arg2: Option<&str>, result: Option<&str>) {
        self.code.push(Tac::new(op, arg1, arg2, result));
    }

    /// `t1 = a op b; t2 = t1 op c; ...`, returning the name that holds the value.
    fn reduce(&mut self, chain: &NodeChain) -> String {
        let mut left = chain.first.lexeme.clone();
        for (op, operand) in &chain.rest {
            let temp = self.temp();
            self.push(
                TacOp::Binary(*op),
                Some(&left),
                Some(&operand.lexeme),
                Some(&temp),
            );
            left = temp;
        }
        left
    }

    /// Arithmetic terms of a condition reuse a single temporary.
    fn reduce_condition(&mut self, cond: &Condition) -> String {
        if cond.lhs.is_simple() {
            return cond.lhs.first.lexeme.clone();
        }
        let temp = self.temp();
        self.push(TacOp::Assign, Some(&cond.lhs.first.lexeme), None, Some(&temp));
        for (op, operand) in &cond.lhs.rest {
            self.push(
                TacOp::Binary(*op),
                Some(&temp),
                Some(&operand.lexeme),
                Some(&temp),
            );
        }
        temp
    }
}

impl Backend for TacBackend {
    fn process(&mut self, insts: Vec<Instruction>) {
        for inst in insts {
            match inst {
                Instruction::Assign { target, value } => {
                    let addr = self.reduce(&value);
                    self.push(TacOp::Assign, Some(&addr), None, Some(&target));
                }
                Instruction::Step {
                    target,
                    op,
                    operand,
                } => {
                    let temp = self.temp();
                    self.push(TacOp::Assign, Some(&target), None, Some(&temp));
                    self.push(
                        TacOp::Binary(op),
                        Some(&temp),
                        Some(&operand.lexeme),
                        Some(&temp),
                    );
                    self.push(TacOp::Assign, Some(&temp), None, Some(&target));
                }
                Instruction::Compare { cond, jump, label } => {
                    let lhs = self.reduce_condition(&cond);
                    self.push(TacOp::Cmp, Some(&lhs), Some(&cond.rhs.lexeme), None);
                    self.push(TacOp::Jump(jump), None, None, Some(&label));
                }
                Instruction::Jump(label) => self.push(TacOp::Goto, None, None, Some(&label)),
                Instruction::Label(label) => self.push(TacOp::Label, None, None, Some(&label)),
                Instruction::Call { name, args, .. } => {
                    let values = args
                        .iter()
                        .filter_map(|arg| match arg {
                            Arg::Value(chain) => Some(chain),
                            Arg::Type(_) => None,
                        })
                        .map(|chain| self.reduce(chain))
                        .collect::<Vec<_>>();
                    for value in &values {
                        self.push(TacOp::Param, Some(value), None, None);
                    }
                    let count = values.len().to_string();
                    self.push(TacOp::Call, Some(&name), Some(&count), None);
                }
                Instruction::FunctionBegin(name) => self.push(TacOp::Label, None, None, Some(&name)),
                Instruction::FunctionEnd => self.push(TacOp::Ret, None, None, None),
            }
        }
    }
}
