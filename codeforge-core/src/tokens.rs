use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Phase};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    DataType,
    Keyword,
    Number,
    String,
    Boolean,
    Operator,
    Assign,
    Identifier,
    Lcurly,
    Rcurly,
    Lparen,
    Rparen,
    Semicolon,
    Comma,
    Unknown,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            TokenKind::DataType => write!(f, "DATA_TYPE"),
            TokenKind::Keyword => write!(f, "KEYWORD"),
            TokenKind::Number => write!(f, "NUMBER"),
            TokenKind::String => write!(f, "STRING"),
            TokenKind::Boolean => write!(f, "BOOLEAN"),
            TokenKind::Operator => write!(f, "OPERATOR"),
            TokenKind::Assign => write!(f, "ASSIGN"),
            TokenKind::Identifier => write!(f, "IDENTIFIER"),
            TokenKind::Lcurly => write!(f, "LCURLY"),
            TokenKind::Rcurly => write!(f, "RCURLY"),
            TokenKind::Lparen => write!(f, "LPAREN"),
            TokenKind::Rparen => write!(f, "RPAREN"),
            TokenKind::Semicolon => write!(f, "SEMICOLON"),
            TokenKind::Comma => write!(f, "COMMA"),
            TokenKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// `start` and `end` are 1-based character columns within `line`; `end` is exclusive.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct TokenSpan {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword => keyword_lookup(&self.lexeme),
            _ => None,
        }
    }

    pub fn data_type(&self) -> Option<DataType> {
        match self.kind {
            TokenKind::DataType => data_type_lookup(&self.lexeme),
            _ => None,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum DataType {
    #[serde(rename = "nmb")]
    Nmb,
    #[serde(rename = "flat")]
    Flat,
    #[serde(rename = "Sring")]
    Sring,
    #[serde(rename = "buul")]
    Buul,
    #[serde(rename = "cter")]
    Cter,
}

impl DataType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Nmb | DataType::Flat)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            DataType::Nmb => write!(f, "nmb"),
            DataType::Flat => write!(f, "flat"),
            DataType::Sring => write!(f, "Sring"),
            DataType::Buul => write!(f, "buul"),
            DataType::Cter => write!(f, "cter"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Keyword {
    First,
    Wish,
    Last,
    Brk,
    Ex,
    Rat,
    Enter,
    PrintO,
    Oye,
    Naioye,
    Chaloye,
    Resume,
    Stop,
}

impl Keyword {
    /// Keywords that introduce a call statement and are registered as builtin functions.
    pub const BUILTINS: [Keyword; 4] = [Keyword::Ex, Keyword::Rat, Keyword::Enter, Keyword::PrintO];
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Keyword::First => write!(f, "first"),
            Keyword::Wish => write!(f, "wish"),
            Keyword::Last => write!(f, "last"),
            Keyword::Brk => write!(f, "brk"),
            Keyword::Ex => write!(f, "Ex"),
            Keyword::Rat => write!(f, "rat"),
            Keyword::Enter => write!(f, "enter"),
            Keyword::PrintO => write!(f, "printO"),
            Keyword::Oye => write!(f, "oye"),
            Keyword::Naioye => write!(f, "naioye"),
            Keyword::Chaloye => write!(f, "chaloye"),
            Keyword::Resume => write!(f, "resume"),
            Keyword::Stop => write!(f, "stop"),
        }
    }
}

pub fn data_type_lookup(name: &str) -> Option<DataType> {
    match name {
        "nmb" => Some(DataType::Nmb),
        "flat" => Some(DataType::Flat),
        "Sring" => Some(DataType::Sring),
        "buul" => Some(DataType::Buul),
        "cter" => Some(DataType::Cter),
        _ => None,
    }
}

pub fn keyword_lookup(name: &str) -> Option<Keyword> {
    match name {
        "first" => Some(Keyword::First),
        "wish" => Some(Keyword::Wish),
        "last" => Some(Keyword::Last),
        "brk" => Some(Keyword::Brk),
        "Ex" => Some(Keyword::Ex),
        "rat" => Some(Keyword::Rat),
        "enter" => Some(Keyword::Enter),
        "printO" => Some(Keyword::PrintO),
        "oye" => Some(Keyword::Oye),
        "naioye" => Some(Keyword::Naioye),
        "chaloye" => Some(Keyword::Chaloye),
        "resume" => Some(Keyword::Resume),
        "stop" => Some(Keyword::Stop),
        _ => None,
    }
}

/// Longest first, so `==.` is never read as `=.` followed by garbage.
const OPERATORS: [&str; 11] = [
    "==.", "!=.", ">=.", "<=.", "+.", "-.", "*.", "/.", "%.", ">.", "<.",
];
const ASSIGN: &str = "=.";

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn tokenize(source: &str) -> (Vec<TokenSpan>, Vec<Diagnostic>) {
    let mut tokens = vec![];
    let mut errors = vec![];

    for (row, text) in source.split('\n').enumerate() {
        let line = row + 1;
        let input: Vec<char> = text.chars().collect();
        let mut index = 0;

        while index < input.len() {
            if input[index].is_whitespace() {
                index += 1;
                continue;
            }
            let token_start = index;
            match get_next_token(&input, &mut index) {
                Some(Scanned::Comment) => break,
                Some(Scanned::Token(kind)) => tokens.push(TokenSpan {
                    kind,
                    lexeme: input[token_start..index].iter().collect(),
                    line,
                    start: token_start + 1,
                    end: index + 1,
                }),
                None => {
                    let ch = input[index];
                    index += 1;
                    tokens.push(TokenSpan {
                        kind: TokenKind::Unknown,
                        lexeme: ch.to_string(),
                        line,
                        start: token_start + 1,
                        end: index + 1,
                    });
                    errors.push(Diagnostic::at(
                        Phase::Lexical,
                        format!("Unexpected '{ch}'"),
                        line,
                    ));
                }
            }
        }
    }

    (tokens, errors)
}

enum Scanned {
    Comment,
    Token(TokenKind),
}

/// Matches one token at `index` and advances past it. Returns `None` without
/// advancing when nothing matches.
fn get_next_token(input: &[char], index: &mut usize) -> Option<Scanned> {
    macro_rules! advance {
        () => {
            *index += 1
        };
        ($n: expr) => {
            *index += $n
        };
    }
    macro_rules! cur {
        () => {
            input.get(*index).copied()
        };
    }
    macro_rules! next {
        () => {
            input.get(*index + 1).copied()
        };
    }
    macro_rules! starts_with {
        ($s: expr) => {
            $s.chars()
                .enumerate()
                .all(|(i, c)| input.get(*index + i) == Some(&c))
        };
    }

    let c = cur!()?;

    if c == '/' && next!() == Some('/') {
        *index = input.len();
        return Some(Scanned::Comment);
    }

    if c.is_ascii_alphabetic() || c == '_' {
        let start = *index;
        while cur!().is_some_and(is_word) {
            advance!();
        }
        let word: String = input[start..*index].iter().collect();
        let kind = if data_type_lookup(&word).is_some() {
            TokenKind::DataType
        } else if keyword_lookup(&word).is_some() {
            TokenKind::Keyword
        } else if word == "true" || word == "false" {
            TokenKind::Boolean
        } else {
            TokenKind::Identifier
        };
        return Some(Scanned::Token(kind));
    }

    if c.is_ascii_digit() {
        return scan_number(input, index).map(Scanned::Token);
    }

    if c == '"' {
        let mut end = *index + 1;
        while let Some(&ch) = input.get(end) {
            match ch {
                '\\' if end + 1 < input.len() => end += 2,
                '"' => {
                    *index = end + 1;
                    return Some(Scanned::Token(TokenKind::String));
                }
                _ => end += 1,
            }
        }
        // unterminated
        return None;
    }

    for op in OPERATORS {
        if starts_with!(op) {
            advance!(op.len());
            return Some(Scanned::Token(TokenKind::Operator));
        }
    }
    if starts_with!(ASSIGN) {
        advance!(ASSIGN.len());
        return Some(Scanned::Token(TokenKind::Assign));
    }

    let kind = match c {
        '{' => TokenKind::Lcurly,
        '}' => TokenKind::Rcurly,
        '(' => TokenKind::Lparen,
        ')' => TokenKind::Rparen,
        ';' => TokenKind::Semicolon,
        ',' => TokenKind::Comma,
        _ => return None,
    };
    advance!();
    Some(Scanned::Token(kind))
}

/// Integer or decimal literal that must end on a word boundary: `12.5;` is one
/// number, `12.5x` falls back to `12`, and `12x` is no number at all.
fn scan_number(input: &[char], index: &mut usize) -> Option<TokenKind> {
    let digits_from = |mut i: usize| {
        while input.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
        i
    };
    let at_boundary = |i: usize| !input.get(i).copied().is_some_and(is_word);

    let int_end = digits_from(*index);
    if input.get(int_end) == Some(&'.') {
        let frac_end = digits_from(int_end + 1);
        if frac_end > int_end + 1 && at_boundary(frac_end) {
            *index = frac_end;
            return Some(TokenKind::Number);
        }
    }
    if at_boundary(int_end) {
        *index = int_end;
        return Some(TokenKind::Number);
    }
    None
}
