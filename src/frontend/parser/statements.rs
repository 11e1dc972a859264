//! Statement tasks

use super::expressions::ExprState;
use super::machine::{furthest, Child, FrameCtx, Outcome, Step, Task};
use super::tree::{BranchId, Label, ScopeId};
use super::types::TypeNameState;
use super::Parser;
use crate::frontend::lexer::tokens::ASSIGNMENT_OPERATORS;
use crate::frontend::symbols::scope::Block;
use crate::util::diagnostic::Diagnostic;

impl<'a> Parser<'a> {
    /// Open an anonymous scope under `parent`
    pub(super) fn fresh_scope(
        &mut self,
        parent: ScopeId,
    ) -> ScopeId {
        let counter = self.unnamed.entry(parent).or_insert(0);
        let generation = *counter;
        *counter += 1;
        let path = self.tree.scope(parent).child(Block::unnamed(generation));
        self.tree.intern(path)
    }

    /// Pass a child outcome straight through
    fn forward(incoming: Option<Outcome>) -> Step {
        match incoming {
            Some(outcome) => Step::Done(outcome),
            None => Step::Done(Outcome::Failure(Vec::new())),
        }
    }
}

/// `{ statement* }`
#[derive(Debug, Default)]
pub(super) struct BlockState {
    /// Function bodies share the function scope
    function_body: bool,
    inner: Option<ScopeId>,
    start: usize,
    items: Vec<BranchId>,
}

impl BlockState {
    pub fn function_body() -> Self {
        Self {
            function_body: true,
            ..Self::default()
        }
    }
}

impl<'a> Parser<'a> {
    pub(super) fn block(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut BlockState,
        incoming: Option<Outcome>,
    ) -> Step {
        let inner = match state.inner {
            Some(inner) => inner,
            None => {
                state.start = self.pos;
                if !self.eat_op(ctx, "{") {
                    return self.expected(ctx, "'{'");
                }
                let inner = if state.function_body {
                    ctx.scope
                } else {
                    self.fresh_scope(ctx.scope)
                };
                state.inner = Some(inner);
                inner
            }
        };

        match incoming {
            Some(Outcome::Success(id)) => state.items.push(id),
            Some(Outcome::Failure(reason)) => {
                ctx.diagnostics.extend(reason);
                self.synchronize(ctx);
            }
            None => {}
        }

        if self.eat_op(ctx, "}") {
            let span = self.span_from(state.start);
            let items = std::mem::take(&mut state.items);
            return Step::success(self.alloc(Label::Block, "", span, inner, items));
        }
        if self.at_end(ctx) {
            return self.expected(ctx, "'}'");
        }
        Step::Push(Child::new(Task::Statement(StatementState::default())).in_scope(inner))
    }
}

#[derive(Debug, Default)]
pub(super) enum StatementStage {
    #[default]
    Start,
    Forward,
    VarDecl,
    Action(Vec<Diagnostic>),
}

#[derive(Debug, Default)]
pub(super) struct StatementState {
    stage: StatementStage,
    /// Only the declaration or action alternatives (for-loop initialisers)
    simple: bool,
}

impl StatementState {
    pub fn simple() -> Self {
        Self {
            simple: true,
            ..Self::default()
        }
    }
}

impl<'a> Parser<'a> {
    pub(super) fn statement(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut StatementState,
        incoming: Option<Outcome>,
    ) -> Step {
        match std::mem::take(&mut state.stage) {
            StatementStage::Start => {}
            StatementStage::Forward => return Self::forward(incoming),
            StatementStage::VarDecl => match incoming {
                Some(Outcome::Success(id)) => return Step::success(id),
                Some(Outcome::Failure(reason)) => {
                    state.stage = StatementStage::Action(reason);
                    return Step::push(Task::Action(ActionState::default()));
                }
                None => return self.expected(ctx, "a statement"),
            },
            StatementStage::Action(first) => {
                return match incoming {
                    Some(Outcome::Success(id)) => {
                        if self.eat_op(ctx, ";") {
                            Step::success(id)
                        } else {
                            match self.expected(ctx, "';'") {
                                Step::Done(Outcome::Failure(reason)) => {
                                    Step::Done(Outcome::Failure(furthest(first, reason)))
                                }
                                step => step,
                            }
                        }
                    }
                    Some(Outcome::Failure(reason)) => Step::Done(Outcome::Failure(furthest(first, reason))),
                    None => self.expected(ctx, "a statement"),
                };
            }
        }

        let lexeme = match self.peek(ctx) {
            Some(lexeme) => lexeme,
            None => return self.expected(ctx, "a statement"),
        };
        if !state.simple {
            let task = if lexeme.is_op("{") {
                Some(Task::Block(BlockState::default()))
            } else if lexeme.is_keyword("if") {
                Some(Task::If(IfState::default()))
            } else if lexeme.is_keyword("while") {
                Some(Task::While(WhileState::default()))
            } else if lexeme.is_keyword("for") {
                Some(Task::For(ForState::default()))
            } else if lexeme.is_keyword("return") {
                Some(Task::Return(ReturnState::default()))
            } else {
                None
            };
            if let Some(task) = task {
                state.stage = StatementStage::Forward;
                return Step::push(task);
            }
            if lexeme.is_op(";") {
                let index = self.bump();
                return Step::success(self.alloc(Label::Empty, "", self.span_at(index), ctx.scope, []));
            }
            if lexeme.is_keyword("break") || lexeme.is_keyword("continue") {
                let label = if lexeme.is_keyword("break") {
                    Label::Break
                } else {
                    Label::Continue
                };
                let index = self.bump();
                if !self.eat_op(ctx, ";") {
                    return self.expected(ctx, "';'");
                }
                return Step::success(self.leaf(label, index, ctx.scope));
            }
        }
        state.stage = StatementStage::VarDecl;
        Step::push(Task::VarDecl(VarDeclState::default()))
    }
}

#[derive(Debug, Default)]
pub(super) enum VarDeclStage {
    #[default]
    Start,
    Type,
    Initializer,
}

/// `type name ['=' expr] ';'`
#[derive(Debug, Default)]
pub(super) struct VarDeclState {
    stage: VarDeclStage,
    start: usize,
    ty: Option<BranchId>,
    name: String,
}

impl<'a> Parser<'a> {
    pub(super) fn var_decl(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut VarDeclState,
        incoming: Option<Outcome>,
    ) -> Step {
        match state.stage {
            VarDeclStage::Start => {
                state.start = self.pos;
                state.stage = VarDeclStage::Type;
                Step::push(Task::TypeName(TypeNameState::default()))
            }
            VarDeclStage::Type => {
                match incoming {
                    Some(Outcome::Success(id)) => state.ty = Some(id),
                    Some(Outcome::Failure(reason)) => return Step::Done(Outcome::Failure(reason)),
                    None => return self.expected(ctx, "a type"),
                }
                match self.peek(ctx) {
                    Some(l) if l.is_identifier() => {
                        state.name = l.text.clone();
                        self.pos += 1;
                    }
                    _ => return self.expected(ctx, "a variable name"),
                }
                if self.eat_op(ctx, "=") {
                    state.stage = VarDeclStage::Initializer;
                    return Step::push(Task::Expression(ExprState::default()));
                }
                self.finish_var_decl(ctx, state, None)
            }
            VarDeclStage::Initializer => match incoming {
                Some(Outcome::Success(init)) => self.finish_var_decl(ctx, state, Some(init)),
                Some(Outcome::Failure(reason)) => Step::Done(Outcome::Failure(reason)),
                None => self.expected(ctx, "an expression"),
            },
        }
    }

    fn finish_var_decl(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut VarDeclState,
        init: Option<BranchId>,
    ) -> Step {
        if !self.eat_op(ctx, ";") {
            return self.expected(ctx, "';'");
        }
        let span = self.span_from(state.start);
        let children: Vec<BranchId> = state.ty.into_iter().chain(init).collect();
        Step::success(self.alloc(Label::VarDecl, state.name.clone(), span, ctx.scope, children))
    }
}

#[derive(Debug, Default)]
pub(super) enum ActionStage {
    #[default]
    Start,
    Target,
    Value(BranchId, String),
}

/// `expr [assignOp expr | '++' | '--']`, without the trailing `;`
#[derive(Debug, Default)]
pub(super) struct ActionState {
    stage: ActionStage,
    start: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn action(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ActionState,
        incoming: Option<Outcome>,
    ) -> Step {
        let outcome = match std::mem::take(&mut state.stage) {
            ActionStage::Start => {
                state.start = self.pos;
                state.stage = ActionStage::Target;
                return Step::push(Task::Expression(ExprState::default()));
            }
            ActionStage::Target => match incoming {
                Some(Outcome::Success(target)) => target,
                Some(failure) => return Step::Done(failure),
                None => return self.expected(ctx, "an expression"),
            },
            ActionStage::Value(target, op) => {
                return match incoming {
                    Some(Outcome::Success(value)) => {
                        let span = self.span_from(state.start);
                        Step::success(self.alloc(Label::Assignment, op, span, ctx.scope, [target, value]))
                    }
                    Some(failure) => Step::Done(failure),
                    None => self.expected(ctx, "an expression"),
                };
            }
        };

        let target = outcome;
        if let Some(op) = self.peek(ctx) {
            if op.kind == crate::frontend::lexer::LexemeKind::Operator
                && ASSIGNMENT_OPERATORS.contains(&op.text.as_str())
            {
                self.pos += 1;
                state.stage = ActionStage::Value(target, op.text.clone());
                return Step::push(Task::Expression(ExprState::default()));
            }
            if op.is_op("++") || op.is_op("--") {
                self.pos += 1;
                let span = self.span_from(state.start);
                return Step::success(self.alloc(Label::Step, op.text.clone(), span, ctx.scope, [target]));
            }
        }
        let span = self.span_from(state.start);
        Step::success(self.alloc(Label::Evaluate, "", span, ctx.scope, [target]))
    }
}

#[derive(Debug, Default)]
pub(super) enum IfStage {
    #[default]
    Start,
    Condition,
    Then,
    Else,
}

/// `if '(' expr ')' statement ['else' statement]`
#[derive(Debug, Default)]
pub(super) struct IfState {
    stage: IfStage,
    start: usize,
    parts: Vec<BranchId>,
}

impl<'a> Parser<'a> {
    /// `'(' expr ')'` after a keyword; pushes the condition expression
    fn open_condition(
        &mut self,
        ctx: &FrameCtx,
        keyword: &str,
    ) -> Option<Step> {
        self.pos += 1;
        if !self.eat_op(ctx, "(") {
            return Some(self.expected(ctx, &format!("'(' after '{}'", keyword)));
        }
        None
    }

    pub(super) fn if_statement(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut IfState,
        incoming: Option<Outcome>,
    ) -> Step {
        match state.stage {
            IfStage::Start => {
                state.start = self.pos;
                if let Some(failure) = self.open_condition(ctx, "if") {
                    return failure;
                }
                state.stage = IfStage::Condition;
                Step::push(Task::Expression(ExprState::default()))
            }
            IfStage::Condition => {
                match incoming {
                    Some(Outcome::Success(cond)) => state.parts.push(cond),
                    Some(failure) => return Step::Done(failure),
                    None => return self.expected(ctx, "a condition"),
                }
                if !self.eat_op(ctx, ")") {
                    return self.expected(ctx, "')'");
                }
                state.stage = IfStage::Then;
                Step::push(Task::Statement(StatementState::default()))
            }
            IfStage::Then | IfStage::Else => {
                match incoming {
                    Some(Outcome::Success(id)) => state.parts.push(id),
                    Some(failure) => return Step::Done(failure),
                    None => return self.expected(ctx, "a statement"),
                }
                if matches!(state.stage, IfStage::Then) && self.at_keyword(ctx, "else") {
                    self.pos += 1;
                    state.stage = IfStage::Else;
                    return Step::push(Task::Statement(StatementState::default()));
                }
                let span = self.span_from(state.start);
                let parts = std::mem::take(&mut state.parts);
                Step::success(self.alloc(Label::If, "", span, ctx.scope, parts))
            }
        }
    }
}

#[derive(Debug, Default)]
pub(super) enum LoopStage {
    #[default]
    Start,
    Condition,
    Body,
}

/// `while '(' expr ')' statement`
#[derive(Debug, Default)]
pub(super) struct WhileState {
    stage: LoopStage,
    start: usize,
    condition: Option<BranchId>,
}

impl<'a> Parser<'a> {
    pub(super) fn while_statement(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut WhileState,
        incoming: Option<Outcome>,
    ) -> Step {
        match state.stage {
            LoopStage::Start => {
                state.start = self.pos;
                if let Some(failure) = self.open_condition(ctx, "while") {
                    return failure;
                }
                state.stage = LoopStage::Condition;
                Step::push(Task::Expression(ExprState::default()))
            }
            LoopStage::Condition => {
                match incoming {
                    Some(Outcome::Success(cond)) => state.condition = Some(cond),
                    Some(failure) => return Step::Done(failure),
                    None => return self.expected(ctx, "a condition"),
                }
                if !self.eat_op(ctx, ")") {
                    return self.expected(ctx, "')'");
                }
                state.stage = LoopStage::Body;
                Step::push(Task::Statement(StatementState::default()))
            }
            LoopStage::Body => match (incoming, state.condition) {
                (Some(Outcome::Success(body)), Some(cond)) => {
                    let span = self.span_from(state.start);
                    Step::success(self.alloc(Label::While, "", span, ctx.scope, [cond, body]))
                }
                (Some(Outcome::Failure(reason)), _) => Step::Done(Outcome::Failure(reason)),
                _ => self.expected(ctx, "a loop body"),
            },
        }
    }
}

#[derive(Debug, Default)]
pub(super) enum ForStage {
    #[default]
    Start,
    Init,
    Condition,
    Update,
    Body,
}

/// `for '(' [init] ';' [cond] ';' [update] ')' statement` in its own scope
#[derive(Debug, Default)]
pub(super) struct ForState {
    stage: ForStage,
    start: usize,
    inner: Option<ScopeId>,
    parts: Vec<BranchId>,
}

impl<'a> Parser<'a> {
    pub(super) fn for_statement(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ForState,
        incoming: Option<Outcome>,
    ) -> Step {
        let inner = match state.inner {
            Some(inner) => inner,
            None => {
                state.start = self.pos;
                if let Some(failure) = self.open_condition(ctx, "for") {
                    return failure;
                }
                let inner = self.fresh_scope(ctx.scope);
                state.inner = Some(inner);
                inner
            }
        };
        let in_scope = |task: Task| Step::Push(Child::new(task).in_scope(inner));

        match state.stage {
            ForStage::Start => {
                state.stage = ForStage::Init;
                if self.at_op(ctx, ";") {
                    let index = self.bump();
                    let empty = self.alloc(Label::Empty, "", self.span_at(index), inner, []);
                    return self.for_statement(ctx, state, Some(Outcome::Success(empty)));
                }
                // the initialiser consumes its own ';'
                in_scope(Task::Statement(StatementState::simple()))
            }
            ForStage::Init => {
                match incoming {
                    Some(Outcome::Success(init)) => state.parts.push(init),
                    Some(failure) => return Step::Done(failure),
                    None => return self.expected(ctx, "a loop initialiser"),
                }
                state.stage = ForStage::Condition;
                if self.at_op(ctx, ";") {
                    let empty = self.alloc(Label::Empty, "", self.here(ctx.end), inner, []);
                    return self.for_statement(ctx, state, Some(Outcome::Success(empty)));
                }
                in_scope(Task::Expression(ExprState::default()))
            }
            ForStage::Condition => {
                match incoming {
                    Some(Outcome::Success(cond)) => state.parts.push(cond),
                    Some(failure) => return Step::Done(failure),
                    None => return self.expected(ctx, "a loop condition"),
                }
                if !self.eat_op(ctx, ";") {
                    return self.expected(ctx, "';'");
                }
                state.stage = ForStage::Update;
                if self.at_op(ctx, ")") {
                    let empty = self.alloc(Label::Empty, "", self.here(ctx.end), inner, []);
                    return self.for_statement(ctx, state, Some(Outcome::Success(empty)));
                }
                in_scope(Task::Action(ActionState::default()))
            }
            ForStage::Update => {
                match incoming {
                    Some(Outcome::Success(update)) => state.parts.push(update),
                    Some(failure) => return Step::Done(failure),
                    None => return self.expected(ctx, "a loop update"),
                }
                if !self.eat_op(ctx, ")") {
                    return self.expected(ctx, "')'");
                }
                state.stage = ForStage::Body;
                in_scope(Task::Statement(StatementState::default()))
            }
            ForStage::Body => {
                match incoming {
                    Some(Outcome::Success(body)) => state.parts.push(body),
                    Some(failure) => return Step::Done(failure),
                    None => return self.expected(ctx, "a loop body"),
                }
                let span = self.span_from(state.start);
                let parts = std::mem::take(&mut state.parts);
                Step::success(self.alloc(Label::For, "", span, inner, parts))
            }
        }
    }
}

/// `return [expr] ';'`
#[derive(Debug, Default)]
pub(super) struct ReturnState {
    start: Option<usize>,
}

impl<'a> Parser<'a> {
    pub(super) fn return_statement(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ReturnState,
        incoming: Option<Outcome>,
    ) -> Step {
        let start = match state.start {
            Some(start) => start,
            None => {
                let start = self.bump();
                state.start = Some(start);
                if !self.at_op(ctx, ";") {
                    return Step::push(Task::Expression(ExprState::default()));
                }
                start
            }
        };
        let value = match incoming {
            Some(Outcome::Success(value)) => Some(value),
            Some(failure) => return Step::Done(failure),
            None => None,
        };
        if !self.eat_op(ctx, ";") {
            return self.expected(ctx, "';'");
        }
        let span = self.span_from(start);
        Step::success(self.alloc(Label::Return, "", span, ctx.scope, value))
    }
}
