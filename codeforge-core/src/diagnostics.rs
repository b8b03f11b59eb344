use serde::Serialize;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Phase::Lexical => write!(f, "Lexical"),
            Phase::Syntax => write!(f, "Syntax"),
            Phase::Semantic => write!(f, "Semantic"),
            Phase::Runtime => write!(f, "Runtime"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub message: String,
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(phase: Phase, message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            phase,
            message: message.into(),
            line,
        }
    }

    pub fn at(phase: Phase, message: impl Into<String>, line: usize) -> Self {
        Self::new(phase, message, Some(line))
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} error: {}", self.phase, self.message)?;
        if let Some(line) = self.line {
            write!(f, " at line {line}")?;
        }
        Ok(())
    }
}
