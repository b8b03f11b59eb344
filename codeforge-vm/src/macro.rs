macro_rules! operand {
    ($script: expr, $i: expr) => {
        match $script.operands.get($i) {
            Some(x) => x.clone(),
            None => return Err(RuntimeError::MissingOperand($script.opcode.clone())),
        }
    };
}
