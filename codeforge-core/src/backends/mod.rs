use crate::compiler;

mod assembly;
mod tac;

pub trait Backend {
    fn process(&mut self, insts: Vec<compiler::Instruction>);
}

pub use assembly::AssemblyBackend;
pub use tac::{Tac, TacBackend, TacOp};
