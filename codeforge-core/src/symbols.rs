use serde::{Serialize, Serializer};
use indexmap::{map::Entry, IndexMap};

use crate::tokens::{data_type_lookup, DataType, Keyword, TokenKind, TokenSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Variable,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    pub name: String,
    pub category: Category,
    pub declared_type: Option<DataType>,
    pub line: Option<usize>,
    pub initializer: Option<String>,
    pub params: Vec<String>,
}

impl SymbolEntry {
    pub fn variable(name: &str, ty: Option<DataType>, line: usize) -> Self {
        Self {
            name: name.to_string(),
            category: Category::Variable,
            declared_type: ty,
            line: Some(line),
            initializer: None,
            params: vec![],
        }
    }

    pub fn function(name: &str, params: Vec<String>, line: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            category: Category::Function,
            declared_type: None,
            line,
            initializer: None,
            params,
        }
    }

    fn with_initializer(mut self, value: Option<&TokenSpan>) -> Self {
        self.initializer = value.map(|t| t.lexeme.clone());
        self
    }
}

/// Name to entry mapping that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable(IndexMap<String, SymbolEntry>);

impl SymbolTable {
    /// Registers `entry` unless its name is already taken. The first declaration wins.
    pub fn insert(&mut self, entry: SymbolEntry) -> bool {
        match self.0.entry(entry.name.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SymbolTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.values())
    }
}

/// Names registered as functions after the token pass.
pub fn builtin_names() -> Vec<String> {
    Keyword::BUILTINS.iter().map(|k| k.to_string()).collect()
}

fn kind_at(tokens: &[TokenSpan], i: usize) -> Option<TokenKind> {
    tokens.get(i).map(|t| t.kind)
}

fn is_literal(token: &TokenSpan) -> bool {
    matches!(
        token.kind,
        TokenKind::Number | TokenKind::String | TokenKind::Boolean
    )
}

pub fn build(tokens: &[TokenSpan], builtins: &[String]) -> SymbolTable {
    let mut table = SymbolTable::default();
    // carried from a data type to the next identifier
    let mut pending: Option<Option<DataType>> = None;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::DataType => {
                pending = Some(token.data_type());
                continue;
            }
            TokenKind::Identifier => {
                if let Some(ty) = pending.take() {
                    let initializer = match (kind_at(tokens, i + 1), tokens.get(i + 2)) {
                        (Some(TokenKind::Assign), Some(value)) if is_literal(value) => Some(value),
                        _ => None,
                    };
                    table.insert(
                        SymbolEntry::variable(&token.lexeme, ty, token.line)
                            .with_initializer(initializer),
                    );
                }
                continue;
            }
            _ => {}
        }

        match token.keyword() {
            Some(Keyword::First) => {
                if let [lparen, ty, name, assign, init, ..] = &tokens[(i + 1).min(tokens.len())..] {
                    if lparen.is(TokenKind::Lparen)
                        && ty.is(TokenKind::DataType)
                        && name.is(TokenKind::Identifier)
                        && assign.is(TokenKind::Assign)
                        && (init.is(TokenKind::Number) || init.is(TokenKind::Identifier))
                    {
                        table.insert(
                            SymbolEntry::variable(&name.lexeme, ty.data_type(), name.line)
                                .with_initializer(Some(init)),
                        );
                    }
                }
            }
            Some(Keyword::Ex) => {
                if let Some(name) = tokens.get(i + 1).filter(|t| t.is(TokenKind::Identifier)) {
                    table.insert(SymbolEntry::function(
                        &name.lexeme,
                        function_params(&tokens[i + 2..]),
                        Some(name.line),
                    ));
                }
            }
            Some(Keyword::Enter) => {
                if let [lparen, message, comma, ty, name, ..] = &tokens[(i + 1).min(tokens.len())..] {
                    if lparen.is(TokenKind::Lparen)
                        && message.is(TokenKind::String)
                        && comma.is(TokenKind::Comma)
                        && ty.is(TokenKind::DataType)
                        && name.is(TokenKind::Identifier)
                    {
                        table.insert(SymbolEntry::variable(
                            &name.lexeme,
                            data_type_lookup(&ty.lexeme),
                            name.line,
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    for name in builtins {
        table.insert(SymbolEntry::function(name, vec![], None));
    }

    table
}

/// `DATA_TYPE IDENTIFIER` pairs between the first `(` and the following `)`.
fn function_params(tokens: &[TokenSpan]) -> Vec<String> {
    let Some(open) = tokens.iter().position(|t| t.is(TokenKind::Lparen)) else {
        return vec![];
    };
    let list = &tokens[open + 1..];
    let close = list
        .iter()
        .position(|t| t.is(TokenKind::Rparen))
        .unwrap_or(list.len());
    list[..close]
        .windows(2)
        .filter(|w| w[0].is(TokenKind::DataType) && w[1].is(TokenKind::Identifier))
        .map(|w| w[1].lexeme.clone())
        .collect()
}
