use super::Backend;
use crate::{
    compiler::{Condition, Instruction},
    parser::{Arg, NodeChain},
};

/// Lowers to the VM's textual assembly. Expression chains accumulate into their
/// destination (`MOV d, a` then `ADD d, b`), and every function body, nested or
/// not, is moved after the main program.
#[derive(Default)]
pub struct AssemblyBackend {
    pub lines: Vec<String>,
    functions: Vec<String>,
    /// Bodies of the functions currently open, innermost last.
    open_functions: Vec<Vec<String>>,
    scratch_count: usize,
}

impl AssemblyBackend {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn emit(&mut self, line: String) {
        match self.open_functions.last_mut() {
            Some(body) => body.push(line),
            None => self.lines.push(line),
        }
    }

    /// Scratch names start with `$`, which no source identifier can.
    fn scratch(&mut self) -> String {
        self.scratch_count += 1;
        format!("$t{}", self.scratch_count)
    }

    fn lower_chain(&mut self, target: &str, chain: &NodeChain) {
        self.emit(format!("MOV {target}, {}", chain.first.lexeme));
        for (op, operand) in &chain.rest {
            self.emit(format!("{} {target}, {}", op.arith().mnemonic(), operand.lexeme));
        }
    }

    /// Single operands are used as they are; longer chains go through a scratch variable.
    fn operand_of(&mut self, chain: &NodeChain) -> String {
        if chain.is_simple() {
            return chain.first.lexeme.clone();
        }
        let scratch = self.scratch();
        self.lower_chain(&scratch, chain);
        scratch
    }

    fn lower_compare(&mut self, cond: &Condition) {
        let lhs = self.operand_of(&cond.lhs);
        self.emit(format!("CMP {lhs}, {}", cond.rhs.lexeme));
    }

    fn lower_call(&mut self, name: &str, args: &[Arg], params: &Option<Vec<String>>) {
        match params {
            None => {
                let mut operands = vec![name.to_string()];
                for arg in args {
                    operands.push(match arg {
                        Arg::Type(ty) => ty.clone(),
                        Arg::Value(chain) => self.operand_of(chain),
                    });
                }
                self.emit(format!("CALL {}", operands.join(", ")));
            }
            Some(params) => {
                // positional binding, missing arguments become 0
                for (i, param) in params.iter().enumerate() {
                    match args.get(i) {
                        Some(Arg::Value(chain)) => self.lower_chain(param, chain),
                        Some(Arg::Type(ty)) => self.emit(format!("MOV {param}, {ty}")),
                        None => self.emit(format!("MOV {param}, 0")),
                    }
                }
                self.emit(format!("CALL {name}"));
            }
        }
    }
}

impl Backend for AssemblyBackend {
    fn process(&mut self, insts: Vec<Instruction>) {
        for inst in insts {
            match inst {
                Instruction::Assign { target, value } => self.lower_chain(&target, &value),
                Instruction::Step {
                    target,
                    op,
                    operand,
                } => self.emit(format!(
                    "{} {target}, {}",
                    op.arith().mnemonic(),
                    operand.lexeme
                )),
                Instruction::Compare { cond, jump, label } => {
                    self.lower_compare(&cond);
                    self.emit(format!("{jump} {label}"));
                }
                Instruction::Jump(label) => self.emit(format!("JMP {label}")),
                Instruction::Label(label) => self.emit(format!("{label}:")),
                Instruction::Call { name, args, params } => self.lower_call(&name, &args, &params),
                Instruction::FunctionBegin(name) => {
                    self.open_functions.push(vec![format!("{name}:")]);
                }
                Instruction::FunctionEnd => {
                    self.emit("RET".to_string());
                    if let Some(body) = self.open_functions.pop() {
                        self.functions.extend(body);
                    }
                }
            }
        }

        if !self.functions.is_empty() {
            // halt before falling into the first hoisted body
            self.lines.push("RET".to_string());
            self.lines.append(&mut self.functions);
        }
    }
}
