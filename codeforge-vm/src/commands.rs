use super::{
    parse_float_prefix, parse_int_prefix, Arith, OpcodeResult, Relation, Result, RuntimeError,
    Script, Value, INPUT_BUILTIN, PRINT_BUILTINS, VM,
};

fn var_name(token: &str) -> String {
    token.strip_suffix(',').unwrap_or(token).to_string()
}

// MOV dest, src
pub fn mov(script: &mut Script, _vm: &mut VM) -> Result<OpcodeResult> {
    let dest = var_name(&operand!(script, 0));
    let value = script.resolve(&operand!(script, 1));
    script.variables.insert(dest, value);
    Ok(OpcodeResult::Continue)
}

// ADD/SUB/MUL/DIV/MOD dest, src
pub fn arith(script: &mut Script, _vm: &mut VM) -> Result<OpcodeResult> {
    let Some(op) = Arith::from_mnemonic(&script.opcode) else {
        return Err(RuntimeError::UnknownInstruction(script.opcode.clone()));
    };
    let dest = var_name(&operand!(script, 0));
    let rhs = script.resolve(&operand!(script, 1));
    let lhs = script.variables.get(&dest).cloned().unwrap_or_default();
    let result = lhs.apply(op, &rhs)?;
    script.variables.insert(dest, result);
    Ok(OpcodeResult::Continue)
}

pub fn cmp(script: &mut Script, _vm: &mut VM) -> Result<OpcodeResult> {
    let l = script.resolve(&operand!(script, 0));
    let r = script.resolve(&operand!(script, 1));
    script.cmp = Some((l, r));
    Ok(OpcodeResult::Continue)
}

pub fn jmp(script: &mut Script, _vm: &mut VM) -> Result<OpcodeResult> {
    let label = operand!(script, 0);
    script.jump_to(&label)?;
    Ok(OpcodeResult::Continue)
}

// JE/JNE/JL/JG/JGE/JLE consume the comparison register
pub fn jcc(script: &mut Script, _vm: &mut VM) -> Result<OpcodeResult> {
    let Some(relation) = Relation::from_mnemonic(&script.opcode) else {
        return Err(RuntimeError::UnknownInstruction(script.opcode.clone()));
    };
    let label = operand!(script, 0);
    let (l, r) = script.cmp.take().unwrap_or_default();
    if relation.holds(&l, &r) {
        script.jump_to(&label)?;
    }
    Ok(OpcodeResult::Continue)
}

pub fn call(script: &mut Script, vm: &mut VM) -> Result<OpcodeResult> {
    let name = var_name(&operand!(script, 0));
    let args = script.operands[1..].to_vec();

    if PRINT_BUILTINS.contains(&name.as_str()) {
        let line = args
            .iter()
            .map(|arg| script.resolve(arg).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        (vm.print)(line);
        return Ok(OpcodeResult::Continue);
    }

    if name == INPUT_BUILTIN {
        let message = args
            .first()
            .map(|arg| script.resolve(arg).to_string())
            .unwrap_or_default();
        // a cancelled prompt reads as empty input
        let input = (vm.prompt)(&message).unwrap_or_default();
        match args.as_slice() {
            [_, ty, var, ..] => {
                let value = match ty.as_str() {
                    "nmb" => Value::Int(parse_int_prefix(&input)),
                    "flat" => Value::Float(parse_float_prefix(&input)),
                    "buul" => {
                        let low = input.trim().to_lowercase();
                        Value::Bool(low == "true" || low == "1")
                    }
                    _ => Value::Str(input),
                };
                script.variables.insert(var_name(var), value);
            }
            [_, var] => {
                script.variables.insert(var_name(var), Value::Str(input));
            }
            _ => {}
        }
        return Ok(OpcodeResult::Continue);
    }

    script.call_stack.push(script.pc);
    script.jump_to(&name)?;
    Ok(OpcodeResult::Continue)
}

pub fn ret(script: &mut Script, _vm: &mut VM) -> Result<OpcodeResult> {
    match script.call_stack.pop() {
        Some(pc) => {
            script.pc = pc;
            Ok(OpcodeResult::Continue)
        }
        None => Ok(OpcodeResult::Stop),
    }
}
