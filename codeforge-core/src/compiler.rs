use codeforge_vm::Relation;

use crate::{
    op::Operator,
    parser::{Arg, AstNode, AstNodeSpan, NodeChain, Operand, StepKind},
    symbols::{Category, SymbolTable},
    tokens::TokenKind,
};

/// Backend-neutral instruction stream shared by both code generators.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Assign {
        target: String,
        value: NodeChain,
    },
    /// `target op= operand`, the compound form of a counting-loop increment.
    Step {
        target: String,
        op: Operator,
        operand: Operand,
    },
    /// Compare, then jump to `label` when `jump` holds.
    Compare {
        cond: Condition,
        jump: Relation,
        label: String,
    },
    Jump(String),
    Label(String),
    /// `params` is the callee's parameter list for user functions, `None` for builtins.
    Call {
        name: String,
        args: Vec<Arg>,
        params: Option<Vec<String>>,
    },
    FunctionBegin(String),
    FunctionEnd,
}

/// `lhs op rhs` where `lhs` holds only arithmetic terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub lhs: NodeChain,
    pub op: Operator,
    pub rhs: Operand,
}

fn zero() -> Operand {
    Operand {
        kind: TokenKind::Number,
        lexeme: "0".to_string(),
    }
}

impl Condition {
    /// Splits a chain at its first comparison. Terms after the right operand
    /// are dropped, and a chain with no comparison tests `!=. 0`.
    pub fn from_chain(chain: &NodeChain) -> Self {
        let mut lhs = NodeChain::single(chain.first.clone());
        for (op, operand) in &chain.rest {
            if op.is_arithmetic() {
                lhs.rest.push((*op, operand.clone()));
            } else {
                return Condition {
                    lhs,
                    op: *op,
                    rhs: operand.clone(),
                };
            }
        }
        Condition {
            lhs,
            op: Operator::Ne,
            rhs: zero(),
        }
    }
}

struct Context<'s> {
    symbols: &'s SymbolTable,
    label_count: usize,
    loop_ends: Vec<String>,
}

impl Context<'_> {
    fn unique_label(&mut self) -> String {
        self.label_count += 1;
        format!("L{}", self.label_count)
    }
}

pub fn compile(program: &AstNodeSpan, symbols: &SymbolTable) -> Vec<Instruction> {
    let mut instructions = vec![];
    let mut ctx = Context {
        symbols,
        label_count: 0,
        loop_ends: vec![],
    };
    visit_stmt(
        program,
        &mut |inst| {
            instructions.push(inst);
        },
        &mut ctx,
    );
    instructions
}

fn visit_body<Emitter>(body: &[AstNodeSpan], emit: &mut Emitter, ctx: &mut Context)
where
    Emitter: FnMut(Instruction),
{
    for stmt in body {
        visit_stmt(stmt, emit, ctx);
    }
}

fn visit_loop_body<Emitter>(body: &[AstNodeSpan], end: &str, emit: &mut Emitter, ctx: &mut Context)
where
    Emitter: FnMut(Instruction),
{
    ctx.loop_ends.push(end.to_string());
    visit_body(body, emit, ctx);
    ctx.loop_ends.pop();
}

/// A missing condition leaves the construct unguarded.
fn guard(cond: &Option<NodeChain>, negate: bool, label: &str) -> Option<Instruction> {
    let cond = Condition::from_chain(cond.as_ref()?);
    let jump = if negate {
        cond.op.false_jump()
    } else {
        cond.op.true_jump()
    };
    Some(Instruction::Compare {
        cond,
        jump,
        label: label.to_string(),
    })
}

fn visit_stmt<Emitter>(this_node: &AstNodeSpan, emit: &mut Emitter, ctx: &mut Context)
where
    Emitter: FnMut(Instruction),
{
    match &this_node.node {
        AstNode::Root(statements) => {
            for stmt in statements {
                visit_stmt(stmt, emit, ctx);
            }
        }
        AstNode::NodeBlock(statements) => visit_body(statements, emit, ctx),
        AstNode::NodeVarDecl(decl) => {
            if let Some(value) = &decl.value {
                emit(Instruction::Assign {
                    target: decl.name.clone(),
                    value: value.clone(),
                });
            }
        }
        AstNode::NodeAssignment(node) => {
            if let Some(value) = &node.value {
                emit(Instruction::Assign {
                    target: node.name.clone(),
                    value: value.clone(),
                });
            }
        }
        AstNode::NodeCall(call) => {
            let params = (!call.builtin).then(|| {
                ctx.symbols
                    .get(&call.name)
                    .filter(|entry| entry.category == Category::Function)
                    .map(|entry| entry.params.clone())
                    .unwrap_or_default()
            });
            emit(Instruction::Call {
                name: call.name.clone(),
                args: call.args.clone(),
                params,
            });
        }
        AstNode::NodeFuncDecl(func) => {
            emit(Instruction::FunctionBegin(func.name.clone()));
            visit_body(&func.body, emit, ctx);
            emit(Instruction::FunctionEnd);
        }
        AstNode::NodeIfStatement(inner_node) => {
            let exit_label = ctx.unique_label();
            for (cond, body) in &inner_node.branches {
                let next_label = ctx.unique_label();
                if let Some(inst) = guard(cond, true, &next_label) {
                    emit(inst);
                }
                visit_body(body, emit, ctx);
                emit(Instruction::Jump(exit_label.clone()));
                emit(Instruction::Label(next_label));
            }
            if let Some(otherwise) = &inner_node.otherwise {
                visit_body(otherwise, emit, ctx);
            }
            emit(Instruction::Label(exit_label));
        }
        AstNode::NodeWhileStatement(inner_node) => {
            let start_label = ctx.unique_label();
            let exit_label = ctx.unique_label();

            emit(Instruction::Label(start_label.clone()));
            if let Some(inst) = guard(&inner_node.cond, true, &exit_label) {
                emit(inst);
            }
            visit_loop_body(&inner_node.body, &exit_label, emit, ctx);
            emit(Instruction::Jump(start_label));
            emit(Instruction::Label(exit_label));
        }
        AstNode::NodeDoWhileStatement(inner_node) => {
            let start_label = ctx.unique_label();
            let exit_label = ctx.unique_label();

            emit(Instruction::Label(start_label.clone()));
            visit_loop_body(&inner_node.body, &exit_label, emit, ctx);
            if let Some(inst) = guard(&inner_node.cond, false, &start_label) {
                emit(inst);
            }
            emit(Instruction::Label(exit_label));
        }
        AstNode::NodeForStatement(inner_node) => {
            if let Some(init) = &inner_node.init {
                if let Some(value) = &init.value {
                    emit(Instruction::Assign {
                        target: init.name.clone(),
                        value: value.clone(),
                    });
                }
            }
            let start_label = ctx.unique_label();
            let exit_label = ctx.unique_label();

            emit(Instruction::Label(start_label.clone()));
            if let Some(inst) = guard(&inner_node.cond, true, &exit_label) {
                emit(inst);
            }
            visit_loop_body(&inner_node.body, &exit_label, emit, ctx);

            if let Some(step) = &inner_node.step {
                match &step.kind {
                    StepKind::Assign(Some(value)) => emit(Instruction::Assign {
                        target: step.target.clone(),
                        value: value.clone(),
                    }),
                    StepKind::Assign(None) => {}
                    StepKind::Compound(op, operand) => emit(Instruction::Step {
                        target: step.target.clone(),
                        op: *op,
                        operand: operand.clone(),
                    }),
                }
            }
            emit(Instruction::Jump(start_label));
            emit(Instruction::Label(exit_label));
        }
        AstNode::NodeBreakStatement => {
            // outside any loop this lowers to nothing
            if let Some(exit_label) = ctx.loop_ends.last() {
                emit(Instruction::Jump(exit_label.clone()));
            }
        }
    }
}
