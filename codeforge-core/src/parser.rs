use crate::{
    diagnostics::{Diagnostic, Phase},
    op::Operator,
    tokens::{DataType, Keyword, TokenKind, TokenSpan},
};

#[derive(Debug, PartialEq, Clone)]
pub enum AstNode {
    Root(Vec<AstNodeSpan>),

    NodeBlock(Vec<AstNodeSpan>),
    NodeVarDecl(Box<NodeVarDecl>),
    NodeAssignment(Box<NodeAssignment>),
    NodeCall(Box<NodeCall>),
    NodeFuncDecl(Box<NodeFuncDecl>),

    NodeIfStatement(Box<NodeIfStatement>),
    NodeWhileStatement(Box<NodeWhileStatement>),
    NodeDoWhileStatement(Box<NodeDoWhileStatement>),
    NodeForStatement(Box<NodeForStatement>),
    NodeBreakStatement,
}

#[derive(Debug, PartialEq, Clone)]
pub struct AstNodeSpan {
    pub node: AstNode,
    pub line: usize,
    pub start: usize,
}

/// A literal or a name appearing in an expression chain.
#[derive(Debug, PartialEq, Clone)]
pub struct Operand {
    pub kind: TokenKind,
    pub lexeme: String,
}

/// `operand (OPERATOR operand)*`, kept flat and evaluated left to right.
#[derive(Debug, PartialEq, Clone)]
pub struct NodeChain {
    pub first: Operand,
    pub rest: Vec<(Operator, Operand)>,
}

impl NodeChain {
    pub fn single(first: Operand) -> Self {
        Self {
            first,
            rest: vec![],
        }
    }

    /// True when the chain is a single operand.
    pub fn is_simple(&self) -> bool {
        self.rest.is_empty()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeVarDecl {
    pub ty: Option<DataType>,
    pub name: String,
    pub value: Option<NodeChain>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeAssignment {
    pub name: String,
    pub value: Option<NodeChain>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Arg {
    Value(NodeChain),
    /// A data-type word passed to the input builtin, e.g. `enter("Age?", nmb, age)`.
    Type(String),
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeCall {
    pub name: String,
    pub args: Vec<Arg>,
    pub builtin: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeFuncDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<AstNodeSpan>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeIfStatement {
    /// `oye` followed by every `chaloye`, in source order.
    pub branches: Vec<(Option<NodeChain>, Vec<AstNodeSpan>)>,
    pub otherwise: Option<Vec<AstNodeSpan>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeWhileStatement {
    pub cond: Option<NodeChain>,
    pub body: Vec<AstNodeSpan>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeDoWhileStatement {
    pub body: Vec<AstNodeSpan>,
    pub cond: Option<NodeChain>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeForStatement {
    pub init: Option<NodeVarDecl>,
    pub cond: Option<NodeChain>,
    pub step: Option<NodeStep>,
    pub body: Vec<AstNodeSpan>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodeStep {
    pub target: String,
    pub kind: StepKind,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StepKind {
    /// `i =. i +. 1`
    Assign(Option<NodeChain>),
    /// `i +. 1`
    Compound(Operator, Operand),
}

pub struct Parsed {
    pub program: AstNodeSpan,
    pub errors: Vec<Diagnostic>,
}

pub fn node_span_with(node: AstNode, line: usize, start: usize) -> AstNodeSpan {
    AstNodeSpan { node, line, start }
}

/// Validates the token stream and builds the tree in the same walk.
///
/// Recovery never resynchronizes: a mismatched token is reported and skipped,
/// so one mistake can produce several follow-up errors.
pub fn parse(tokens: &[TokenSpan]) -> Parsed {
    let mut parser = Parser {
        tokens,
        index: 0,
        blocks: vec![],
        errors: vec![],
    };
    let statements = parser.program();
    Parsed {
        program: node_span_with(AstNode::Root(statements), 1, 1),
        errors: parser.errors,
    }
}

struct Parser<'t> {
    tokens: &'t [TokenSpan],
    index: usize,
    /// Opening line of every block not closed yet.
    blocks: Vec<usize>,
    errors: Vec<Diagnostic>,
}

pub fn is_operand(token: &TokenSpan) -> bool {
    matches!(
        token.kind,
        TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::Boolean
    )
}

fn operand(token: &TokenSpan) -> Operand {
    Operand {
        kind: token.kind,
        lexeme: token.lexeme.clone(),
    }
}

/// Reads `operand (OPERATOR operand)*` at `index`. A token that cannot start a
/// chain is skipped and yields `None`; a dangling operator ends the chain.
pub fn read_chain(tokens: &[TokenSpan], index: &mut usize) -> Option<NodeChain> {
    let first = tokens.get(*index)?;
    *index += 1;
    if !is_operand(first) {
        return None;
    }
    let mut chain = NodeChain::single(operand(first));
    while let Some(op) = tokens.get(*index).filter(|t| t.is(TokenKind::Operator)) {
        *index += 1;
        match tokens.get(*index).filter(|t| is_operand(t)) {
            Some(rhs) => {
                *index += 1;
                if let Some(op) = Operator::from_lexeme(&op.lexeme) {
                    chain.rest.push((op, operand(rhs)));
                }
            }
            None => break,
        }
    }
    Some(chain)
}

fn parse_step(tokens: &[TokenSpan]) -> Option<NodeStep> {
    match tokens {
        [target, assign, rest @ ..]
            if target.is(TokenKind::Identifier) && assign.is(TokenKind::Assign) =>
        {
            Some(NodeStep {
                target: target.lexeme.clone(),
                kind: StepKind::Assign(read_chain(rest, &mut 0)),
            })
        }
        [target, op, rest @ ..] if target.is(TokenKind::Identifier) => {
            let op = Operator::from_lexeme(&op.lexeme).filter(|op| op.is_arithmetic())?;
            let rhs = rest.first().filter(|t| is_operand(t))?;
            Some(NodeStep {
                target: target.lexeme.clone(),
                kind: StepKind::Compound(op, operand(rhs)),
            })
        }
        _ => None,
    }
}

impl<'t> Parser<'t> {
    fn cur(&self) -> Option<&'t TokenSpan> {
        self.tokens.get(self.index)
    }

    fn peek(&self) -> Option<&'t TokenSpan> {
        self.tokens.get(self.index + 1)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    /// Tokens consumed since `from`.
    fn consumed_since(&self, from: usize) -> &'t [TokenSpan] {
        let end = self.index.min(self.tokens.len());
        &self.tokens[from.min(end)..end]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur().is_some_and(|t| t.is(kind))
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.cur().and_then(|t| t.keyword()) == Some(keyword)
    }

    fn error(&mut self, message: String, line: Option<usize>) {
        self.errors.push(Diagnostic::new(Phase::Syntax, message, line));
    }

    /// Consumes the current token whatever it is. Returns it only if it had the
    /// expected kind; running out of tokens is not reported here.
    fn expect(&mut self, expected: TokenKind) -> Option<&'t TokenSpan> {
        let token = self.cur();
        self.advance();
        match token {
            Some(t) if t.is(expected) => Some(t),
            Some(t) => {
                self.error(format!("Expected {expected}, found {}", t.kind), Some(t.line));
                None
            }
            None => None,
        }
    }

    fn chain(&mut self) -> Option<NodeChain> {
        read_chain(self.tokens, &mut self.index)
    }

    fn program(&mut self) -> Vec<AstNodeSpan> {
        let mut statements = vec![];
        while let Some(token) = self.cur() {
            if token.is(TokenKind::Rcurly) {
                self.error("Unmatched '}'".to_string(), Some(token.line));
                self.advance();
                continue;
            }
            statements.extend(self.statement());
        }
        statements
    }

    fn statement_list(&mut self) -> Vec<AstNodeSpan> {
        let mut statements = vec![];
        while let Some(token) = self.cur() {
            if token.is(TokenKind::Rcurly) {
                break;
            }
            statements.extend(self.statement());
        }
        match self.cur() {
            None => {
                if let Some(line) = self.blocks.pop() {
                    self.error("Missing '}' for block started".to_string(), Some(line));
                }
            }
            Some(_) => {
                self.blocks.pop();
                self.advance();
            }
        }
        statements
    }

    fn block(&mut self) -> Vec<AstNodeSpan> {
        if let Some(token) = self.cur() {
            self.blocks.push(token.line);
        }
        self.expect(TokenKind::Lcurly);
        self.statement_list()
    }

    fn statement(&mut self) -> Option<AstNodeSpan> {
        let token = self.cur()?;
        let next = self.peek().map(|t| t.kind);
        let node = match token.kind {
            TokenKind::Lcurly => Some(AstNode::NodeBlock(self.block())),
            TokenKind::DataType => self
                .declaration()
                .map(|decl| AstNode::NodeVarDecl(Box::new(decl))),
            TokenKind::Identifier if next == Some(TokenKind::Assign) => self.assignment(),
            TokenKind::Identifier if next == Some(TokenKind::Lparen) => self.call(false),
            TokenKind::Keyword => self.keyword_statement(token),
            _ => {
                self.advance();
                None
            }
        };
        node.map(|node| node_span_with(node, token.line, token.start))
    }

    fn keyword_statement(&mut self, token: &TokenSpan) -> Option<AstNode> {
        match token.keyword() {
            Some(Keyword::Oye) => self.conditional(),
            Some(Keyword::Naioye) => {
                self.advance();
                Some(AstNode::NodeBlock(self.block()))
            }
            Some(Keyword::Brk) => {
                self.advance();
                self.expect(TokenKind::Semicolon);
                Some(AstNode::NodeBreakStatement)
            }
            Some(Keyword::Wish) => self.while_loop(),
            Some(Keyword::Last) => self.do_while_loop(),
            Some(Keyword::First) => self.for_loop(),
            Some(Keyword::Ex) => self.function(),
            Some(Keyword::PrintO | Keyword::Enter | Keyword::Rat) => self.call(true),
            // a stray `chaloye` only loses its keyword; the block that follows still parses
            _ => {
                self.advance();
                None
            }
        }
    }

    fn declaration(&mut self) -> Option<NodeVarDecl> {
        let ty = self.cur().and_then(|t| t.data_type());
        self.expect(TokenKind::DataType);
        let name = self.cur().filter(|t| t.is(TokenKind::Identifier))?;
        self.advance();
        let value = if self.at(TokenKind::Assign) {
            self.advance();
            self.chain()
        } else {
            None
        };
        self.expect(TokenKind::Semicolon);
        Some(NodeVarDecl {
            ty,
            name: name.lexeme.clone(),
            value,
        })
    }

    fn assignment(&mut self) -> Option<AstNode> {
        let name = self.expect(TokenKind::Identifier)?.lexeme.clone();
        self.expect(TokenKind::Assign);
        let value = self.chain();
        self.expect(TokenKind::Semicolon);
        Some(AstNode::NodeAssignment(Box::new(NodeAssignment { name, value })))
    }

    /// `(` chain `)`
    fn condition(&mut self) -> Option<NodeChain> {
        self.expect(TokenKind::Lparen);
        let cond = self.chain();
        self.expect(TokenKind::Rparen);
        cond
    }

    fn conditional(&mut self) -> Option<AstNode> {
        self.advance();
        let cond = self.condition();
        let body = self.block();
        let mut branches = vec![(cond, body)];

        while self.at_keyword(Keyword::Chaloye) {
            self.advance();
            let cond = self.condition();
            let body = self.block();
            branches.push((cond, body));
        }

        let otherwise = if self.at_keyword(Keyword::Naioye) {
            self.advance();
            Some(self.block())
        } else {
            None
        };

        Some(AstNode::NodeIfStatement(Box::new(NodeIfStatement {
            branches,
            otherwise,
        })))
    }

    fn while_loop(&mut self) -> Option<AstNode> {
        self.advance();
        let cond = self.condition();
        let body = self.block();
        Some(AstNode::NodeWhileStatement(Box::new(NodeWhileStatement {
            cond,
            body,
        })))
    }

    fn do_while_loop(&mut self) -> Option<AstNode> {
        self.advance();
        let body = self.block();
        let cond = if self.at_keyword(Keyword::Wish) {
            self.advance();
            let cond = self.condition();
            self.expect(TokenKind::Semicolon);
            cond
        } else {
            let line = self.cur().map(|t| t.line);
            self.error(
                "Expected 'wish(...)' after do-while block".to_string(),
                line,
            );
            None
        };
        Some(AstNode::NodeDoWhileStatement(Box::new(
            NodeDoWhileStatement { body, cond },
        )))
    }

    fn for_loop(&mut self) -> Option<AstNode> {
        self.advance();
        self.expect(TokenKind::Lparen);
        let init = self.declaration();
        let cond = self.chain();
        self.expect(TokenKind::Semicolon);

        let from = self.index;
        while let Some(token) = self.cur() {
            if token.is(TokenKind::Rparen) {
                break;
            }
            self.chain();
            if self.cur().is_some() && !self.at(TokenKind::Rparen) {
                self.advance();
            }
        }
        let step = parse_step(self.consumed_since(from));
        self.expect(TokenKind::Rparen);

        let body = self.block();
        Some(AstNode::NodeForStatement(Box::new(NodeForStatement {
            init,
            cond,
            step,
            body,
        })))
    }

    fn function(&mut self) -> Option<AstNode> {
        self.advance();
        let name = self
            .expect(TokenKind::Identifier)
            .map(|t| t.lexeme.clone())
            .unwrap_or_default();
        self.expect(TokenKind::Lparen);
        let from = self.index;
        while self.cur().is_some() && !self.at(TokenKind::Rparen) {
            self.advance();
        }
        let params = self
            .consumed_since(from)
            .windows(2)
            .filter(|w| w[0].is(TokenKind::DataType) && w[1].is(TokenKind::Identifier))
            .map(|w| w[1].lexeme.clone())
            .collect();
        self.expect(TokenKind::Rparen);
        let body = self.block();
        Some(AstNode::NodeFuncDecl(Box::new(NodeFuncDecl {
            name,
            params,
            body,
        })))
    }

    fn call(&mut self, builtin: bool) -> Option<AstNode> {
        let name = self.cur()?.lexeme.clone();
        self.advance();
        self.expect(TokenKind::Lparen);
        let mut args = vec![];
        while let Some(token) = self.cur() {
            if token.is(TokenKind::Rparen) {
                break;
            }
            if token.is(TokenKind::DataType) {
                args.push(Arg::Type(token.lexeme.clone()));
                self.advance();
            } else if let Some(chain) = self.chain() {
                args.push(Arg::Value(chain));
            }
            if self.at(TokenKind::Comma) {
                self.advance();
            }
        }
        self.expect(TokenKind::Rparen);
        self.expect(TokenKind::Semicolon);
        Some(AstNode::NodeCall(Box::new(NodeCall {
            name,
            args,
            builtin,
        })))
    }
}
