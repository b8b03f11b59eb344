use std::{collections::HashMap, fmt};

#[macro_use]
mod r#macro;
mod commands;
mod error;
mod value;

pub use error::RuntimeError;
pub use value::{parse_float_prefix, parse_int_prefix, Arith, Value};

pub type Result<T> = std::result::Result<T, RuntimeError>;

pub enum OpcodeResult {
    Continue,
    Stop,
}

type OpcodeHandler = fn(script: &mut Script, vm: &mut VM) -> Result<OpcodeResult>;

/// Names that `CALL` dispatches to the host instead of a label.
pub const PRINT_BUILTINS: [&str; 3] = ["printO", "rat", "showout"];
pub const INPUT_BUILTIN: &str = "enter";

pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Relation tested by a conditional jump against the pair held in the comparison register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Ne,
    Lt,
    Gt,
    Ge,
    Le,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::Eq,
        Relation::Ne,
        Relation::Lt,
        Relation::Gt,
        Relation::Ge,
        Relation::Le,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Relation::Eq => "JE",
            Relation::Ne => "JNE",
            Relation::Lt => "JL",
            Relation::Gt => "JG",
            Relation::Ge => "JGE",
            Relation::Le => "JLE",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Relation::ALL.into_iter().find(|r| r.mnemonic() == s)
    }

    pub fn negate(self) -> Self {
        match self {
            Relation::Eq => Relation::Ne,
            Relation::Ne => Relation::Eq,
            Relation::Lt => Relation::Ge,
            Relation::Gt => Relation::Le,
            Relation::Ge => Relation::Lt,
            Relation::Le => Relation::Gt,
        }
    }

    pub fn holds(self, l: &Value, r: &Value) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Relation::Eq => l.loose_eq(r),
            Relation::Ne => !l.loose_eq(r),
            Relation::Lt => matches!(l.compare(r), Some(Less)),
            Relation::Gt => matches!(l.compare(r), Some(Greater)),
            Relation::Ge => matches!(l.compare(r), Some(Greater | Equal)),
            Relation::Le => matches!(l.compare(r), Some(Less | Equal)),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

pub struct VM<'a> {
    opcode_map: HashMap<&'static str, OpcodeHandler>,
    print: &'a mut dyn FnMut(String),
    prompt: &'a mut dyn FnMut(&str) -> Option<String>,
    max_steps: usize,
}

/// Per-run state. Built fresh by [`VM::eval`] and dropped when the run ends.
pub struct Script<'s> {
    lines: Vec<&'s str>,
    labels: HashMap<&'s str, usize>,
    pub variables: HashMap<String, Value>,
    pc: usize,
    cmp: Option<(Value, Value)>,
    call_stack: Vec<usize>,
    opcode: String,
    operands: Vec<String>,
}

impl<'s> Script<'s> {
    pub fn new(source: &'s str) -> Self {
        let lines: Vec<&str> = source.split('\n').collect();
        let labels = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| line.trim().strip_suffix(':').map(|name| (name, i)))
            .collect();
        Self {
            lines,
            labels,
            variables: HashMap::new(),
            pc: 0,
            cmp: None,
            call_stack: vec![],
            opcode: String::new(),
            operands: vec![],
        }
    }

    /// Every jump target and every non-builtin call target must name a label.
    fn check_targets(&self) -> Result<()> {
        for line in &self.lines {
            let (opcode, operands) = split_instruction(line.trim());
            let target = match opcode {
                "JMP" => operands.first(),
                "CALL" => operands
                    .first()
                    .filter(|name| !is_builtin(name)),
                op if Relation::from_mnemonic(op).is_some() => operands.first(),
                _ => None,
            };
            if let Some(target) = target {
                if !self.labels.contains_key(target.as_str()) {
                    return Err(RuntimeError::UnresolvedLabel(target.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn resolve(&self, token: &str) -> Value {
        let token = token.strip_suffix(',').unwrap_or(token);
        Value::literal(token)
            .or_else(|| self.variables.get(token).cloned())
            .unwrap_or_default()
    }

    pub fn jump_to(&mut self, label: &str) -> Result<()> {
        match self.labels.get(label) {
            Some(&index) => {
                self.pc = index;
                Ok(())
            }
            None => Err(RuntimeError::UnresolvedLabel(label.to_string())),
        }
    }
}

fn is_builtin(name: &str) -> bool {
    PRINT_BUILTINS.contains(&name) || name == INPUT_BUILTIN
}

/// Splits `OPCODE a, b, c` into the opcode and its operands. Commas inside
/// string literals do not separate operands.
pub fn split_instruction(line: &str) -> (&str, Vec<String>) {
    let (opcode, rest) = match line.split_once(char::is_whitespace) {
        Some((op, rest)) => (op, rest),
        None => (line, ""),
    };
    let mut operands = vec![];
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in rest.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                operands.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    operands.push(current.trim().to_string());
    operands.retain(|x| !x.is_empty());
    (opcode, operands)
}

impl<'a> VM<'a> {
    pub fn new(
        print: &'a mut dyn FnMut(String),
        prompt: &'a mut dyn FnMut(&str) -> Option<String>,
    ) -> Self {
        use commands::*;
        let map: HashMap<&'static str, OpcodeHandler> = HashMap::from_iter(
            vec![
                ("MOV", mov as _),
                ("ADD", arith as _),
                ("SUB", arith as _),
                ("MUL", arith as _),
                ("DIV", arith as _),
                ("MOD", arith as _),
                ("CMP", cmp as _),
                ("JMP", jmp as _),
                ("JE", jcc as _),
                ("JNE", jcc as _),
                ("JL", jcc as _),
                ("JG", jcc as _),
                ("JGE", jcc as _),
                ("JLE", jcc as _),
                ("CALL", call as _),
                ("RET", ret as _),
            ]
            .into_iter(),
        );
        Self {
            opcode_map: map,
            print,
            prompt,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    fn process(&mut self, script: &mut Script) -> Result<OpcodeResult> {
        let Some(line) = script.lines.get(script.pc).map(|l| l.trim()) else {
            return Ok(OpcodeResult::Stop);
        };
        script.pc += 1;
        if line.is_empty() || line.ends_with(':') {
            return Ok(OpcodeResult::Continue);
        }
        let (opcode, operands) = split_instruction(line);
        let Some(&handler) = self.opcode_map.get(opcode) else {
            return Err(RuntimeError::UnknownInstruction(line.to_string()));
        };
        script.opcode = opcode.to_string();
        script.operands = operands;
        handler(script, self)
    }

    /// Runs assembly text to completion. Output lines are delivered through the
    /// print callback as they are produced, so a failed run keeps what it printed.
    pub fn eval(&mut self, source: &str) -> Result<()> {
        let mut script = Script::new(source);
        script.check_targets()?;
        let mut steps = 0;
        while script.pc < script.lines.len() {
            steps += 1;
            if steps > self.max_steps {
                return Err(RuntimeError::StepBudgetExceeded(self.max_steps));
            }
            match self.process(&mut script)? {
                OpcodeResult::Continue => {}
                OpcodeResult::Stop => break,
            }
        }
        Ok(())
    }
}
