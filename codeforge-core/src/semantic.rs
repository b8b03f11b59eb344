use std::fmt::{Display, Formatter};

use crate::{
    diagnostics::{Diagnostic, Phase},
    op::Operator,
    symbols::{Category, SymbolTable},
    tokens::{DataType, TokenKind, TokenSpan},
};

/// Type a single token resolves to during checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Data(DataType),
    Function,
    Unknown,
}

impl ValueType {
    fn is_numeric(self) -> bool {
        matches!(self, ValueType::Data(ty) if ty.is_numeric())
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ValueType::Data(ty) => write!(f, "{ty}"),
            ValueType::Function => write!(f, "function"),
            ValueType::Unknown => write!(f, "unknown"),
        }
    }
}

fn declared_type(name: &str, symbols: &SymbolTable) -> Option<ValueType> {
    symbols.get(name).map(|entry| match entry.category {
        Category::Function => ValueType::Function,
        Category::Variable => entry
            .declared_type
            .map(ValueType::Data)
            .unwrap_or(ValueType::Unknown),
    })
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn is_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && all_digits(digits)
}

/// `12.` counts as a decimal, `.5` does not.
fn is_decimal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    match digits.split_once('.') {
        Some((whole, frac)) => !whole.is_empty() && all_digits(whole) && all_digits(frac),
        None => false,
    }
}

/// Literal shape first, then whatever the symbol table says about the name.
pub fn value_type(lexeme: &str, symbols: &SymbolTable) -> ValueType {
    if is_int(lexeme) {
        ValueType::Data(DataType::Nmb)
    } else if is_decimal(lexeme) {
        ValueType::Data(DataType::Flat)
    } else if lexeme.len() >= 2 && lexeme.starts_with('"') && lexeme.ends_with('"') {
        ValueType::Data(DataType::Sring)
    } else if lexeme == "true" || lexeme == "false" {
        ValueType::Data(DataType::Buul)
    } else {
        declared_type(lexeme, symbols).unwrap_or(ValueType::Unknown)
    }
}

/// Runs every check and returns all findings; nothing stops at the first error.
pub fn analyze(symbols: &SymbolTable, tokens: &[TokenSpan]) -> Vec<Diagnostic> {
    let mut errors = vec![];
    check_declarations(symbols, tokens, &mut errors);
    check_assignments(symbols, tokens, &mut errors);
    check_operands(symbols, tokens, &mut errors);
    errors
}

fn check_declarations(symbols: &SymbolTable, tokens: &[TokenSpan], errors: &mut Vec<Diagnostic>) {
    for token in tokens {
        if token.is(TokenKind::Identifier) && !symbols.contains(&token.lexeme) {
            errors.push(Diagnostic::at(
                Phase::Semantic,
                format!("Variable '{}' used without declaration", token.lexeme),
                token.line,
            ));
        }
    }
}

/// Only the first token after `=.` is inspected.
fn check_assignments(symbols: &SymbolTable, tokens: &[TokenSpan], errors: &mut Vec<Diagnostic>) {
    for (i, token) in tokens.iter().enumerate() {
        if !token.is(TokenKind::Assign) || i == 0 {
            continue;
        }
        let Some(target) = declared_type(&tokens[i - 1].lexeme, symbols) else {
            continue;
        };
        let value = tokens
            .get(i + 1)
            .map(|t| value_type(&t.lexeme, symbols))
            .unwrap_or(ValueType::Unknown);
        if target != value {
            errors.push(Diagnostic::at(
                Phase::Semantic,
                format!("Type mismatch: {value} → {target}"),
                token.line,
            ));
        }
    }
}

fn check_operands(symbols: &SymbolTable, tokens: &[TokenSpan], errors: &mut Vec<Diagnostic>) {
    let neighbour = |i: Option<usize>| {
        i.and_then(|i| tokens.get(i))
            .map(|t| value_type(&t.lexeme, symbols))
            .unwrap_or(ValueType::Unknown)
    };
    for (i, token) in tokens.iter().enumerate() {
        let arithmetic = token.is(TokenKind::Operator)
            && Operator::from_lexeme(&token.lexeme).is_some_and(|op| op.is_arithmetic());
        if !arithmetic {
            continue;
        }
        let left = neighbour(i.checked_sub(1));
        let right = neighbour(Some(i + 1));
        let message = if !left.is_numeric() || !right.is_numeric() {
            format!("Non-numeric operands for {}", token.lexeme)
        } else if left != right {
            format!("Operand type mismatch for {}", token.lexeme)
        } else {
            continue;
        };
        errors.push(Diagnostic::at(Phase::Semantic, message, token.line));
    }
}
