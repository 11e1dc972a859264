//! Frame machine
//!
//! The grammar runs as named tasks on an explicit frame stack instead of the
//! native call stack. A task step either finishes its frame or pushes a child
//! frame and resumes when the child reports back. A failed frame restores its
//! start position and drops every branch it allocated.

use tracing::trace;

use super::declarations::{CallableState, MembersState, ParameterState, ParametersState, PropertyState};
use super::expressions::{AccessState, ArgsState, ExprState, ListState, ParenState};
use super::extra::Extra;
use super::statements::{BlockState, ForState, IfState, ReturnState, StatementState, VarDeclState, ActionState, WhileState};
use super::tree::{Branch, BranchId, Label, ScopeId};
use super::types::TypeNameState;
use super::Parser;
use crate::util::diagnostic::{Diagnostic, Wreck};
use crate::util::span::Span;

/// Task of a frame, with its task-local state
#[derive(Debug)]
pub(super) enum Task {
    Members(MembersState),
    Callable(CallableState),
    Property(PropertyState),
    Parameters(ParametersState),
    Parameter(ParameterState),
    TypeName(TypeNameState),
    Block(BlockState),
    Statement(StatementState),
    VarDecl(VarDeclState),
    Action(ActionState),
    If(IfState),
    While(WhileState),
    For(ForState),
    Return(ReturnState),
    Expression(ExprState),
    Access(AccessState),
    Arguments(ArgsState),
    Paren(ParenState),
    List(ListState),
}

impl Task {
    fn name(&self) -> &'static str {
        match self {
            Task::Members(_) => "members",
            Task::Callable(_) => "callable",
            Task::Property(_) => "property",
            Task::Parameters(_) => "parameters",
            Task::Parameter(_) => "parameter",
            Task::TypeName(_) => "type-name",
            Task::Block(_) => "block",
            Task::Statement(_) => "statement",
            Task::VarDecl(_) => "var-decl",
            Task::Action(_) => "action",
            Task::If(_) => "if",
            Task::While(_) => "while",
            Task::For(_) => "for",
            Task::Return(_) => "return",
            Task::Expression(_) => "expression",
            Task::Access(_) => "access-chain",
            Task::Arguments(_) => "arguments",
            Task::Paren(_) => "parenthesized",
            Task::List(_) => "list",
        }
    }
}

/// Frame bookkeeping shared by every task
#[derive(Debug)]
pub(super) struct FrameCtx {
    /// Lexeme index the frame started at
    pub start: usize,
    /// Exclusive upper bound of the frame's lexeme range
    pub end: usize,
    pub scope: ScopeId,
    /// Diagnostics kept from recovered children
    pub diagnostics: Vec<Diagnostic>,
    pub extra: Option<Extra>,
    /// Arena length when the frame started
    pub tree_mark: usize,
}

#[derive(Debug)]
pub(super) struct Frame {
    pub task: Task,
    pub ctx: FrameCtx,
}

/// Result a finished frame reports to its parent
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(BranchId),
    Failure(Vec<Diagnostic>),
}

/// Child frame request
#[derive(Debug)]
pub(super) struct Child {
    pub task: Task,
    pub end: Option<usize>,
    pub scope: Option<ScopeId>,
    pub extra: Option<Extra>,
}

impl Child {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            end: None,
            scope: None,
            extra: None,
        }
    }

    pub fn bounded(
        mut self,
        end: usize,
    ) -> Self {
        self.end = Some(end);
        self
    }

    pub fn in_scope(
        mut self,
        scope: ScopeId,
    ) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_extra(
        mut self,
        extra: Option<Extra>,
    ) -> Self {
        self.extra = extra;
        self
    }
}

/// What a task step decided
#[derive(Debug)]
pub(super) enum Step {
    Push(Child),
    Done(Outcome),
}

impl Step {
    pub fn push(task: Task) -> Self {
        Step::Push(Child::new(task))
    }

    pub fn success(id: BranchId) -> Self {
        Step::Done(Outcome::Success(id))
    }
}

/// Keep whichever failure got further into the input
pub(super) fn furthest(
    a: Vec<Diagnostic>,
    b: Vec<Diagnostic>,
) -> Vec<Diagnostic> {
    let key = |d: &Vec<Diagnostic>| d.last().map(|x| (x.line, x.position)).unwrap_or((0, 0));
    if key(&b) > key(&a) {
        b
    } else {
        a
    }
}

impl<'a> Parser<'a> {
    /// Run a task to completion on a fresh frame stack.
    ///
    /// Returns the outcome plus the diagnostics kept by successful frames.
    pub(super) fn run(
        &mut self,
        task: Task,
        end: usize,
        scope: ScopeId,
    ) -> Result<(Outcome, Vec<Diagnostic>), Wreck> {
        let end = end.min(self.lexemes.len());
        let mut stack = vec![Frame {
            task,
            ctx: FrameCtx {
                start: self.pos,
                end,
                scope,
                diagnostics: Vec::new(),
                extra: None,
                tree_mark: self.tree.mark(),
            },
        }];
        let mut incoming: Option<Outcome> = None;

        loop {
            if stack.len() > self.max_depth {
                return Err(Wreck::at(self.here(end), "nesting is too deep"));
            }
            let frame = match stack.last_mut() {
                Some(frame) => frame,
                None => return Err(Wreck::internal("parser frame stack underflow")),
            };
            let step = self.step(frame, incoming.take())?;
            match step {
                Step::Push(child) => {
                    let parent = &frame.ctx;
                    let end = child.end.unwrap_or(parent.end).min(parent.end);
                    let scope = child.scope.unwrap_or(parent.scope);
                    trace!("push {} at {}", child.task.name(), self.pos);
                    stack.push(Frame {
                        task: child.task,
                        ctx: FrameCtx {
                            start: self.pos,
                            end,
                            scope,
                            diagnostics: Vec::new(),
                            extra: child.extra,
                            tree_mark: self.tree.mark(),
                        },
                    });
                }
                Step::Done(outcome) => {
                    let done = match stack.pop() {
                        Some(done) => done,
                        None => return Err(Wreck::internal("parser frame stack underflow")),
                    };
                    trace!("done {} at {}", done.task.name(), self.pos);
                    let outcome = match outcome {
                        Outcome::Success(id) => {
                            match stack.last_mut() {
                                Some(parent) => parent.ctx.diagnostics.extend(done.ctx.diagnostics),
                                None => return Ok((Outcome::Success(id), done.ctx.diagnostics)),
                            }
                            Outcome::Success(id)
                        }
                        Outcome::Failure(reason) => {
                            self.pos = done.ctx.start;
                            self.tree.truncate(done.ctx.tree_mark);
                            let mut all = done.ctx.diagnostics;
                            all.extend(reason);
                            if stack.is_empty() {
                                return Ok((Outcome::Failure(all), Vec::new()));
                            }
                            Outcome::Failure(all)
                        }
                    };
                    incoming = Some(outcome);
                }
            }
        }
    }

    fn step(
        &mut self,
        frame: &mut Frame,
        incoming: Option<Outcome>,
    ) -> Result<Step, Wreck> {
        let ctx = &mut frame.ctx;
        match &mut frame.task {
            Task::Members(s) => self.members(ctx, s, incoming),
            Task::Callable(s) => self.callable(ctx, s, incoming),
            Task::Property(s) => Ok(self.property(ctx, s, incoming)),
            Task::Parameters(s) => Ok(self.parameters(ctx, s, incoming)),
            Task::Parameter(s) => Ok(self.parameter(ctx, s, incoming)),
            Task::TypeName(s) => Ok(self.type_name(ctx, s, incoming)),
            Task::Block(s) => Ok(self.block(ctx, s, incoming)),
            Task::Statement(s) => Ok(self.statement(ctx, s, incoming)),
            Task::VarDecl(s) => Ok(self.var_decl(ctx, s, incoming)),
            Task::Action(s) => Ok(self.action(ctx, s, incoming)),
            Task::If(s) => Ok(self.if_statement(ctx, s, incoming)),
            Task::While(s) => Ok(self.while_statement(ctx, s, incoming)),
            Task::For(s) => Ok(self.for_statement(ctx, s, incoming)),
            Task::Return(s) => Ok(self.return_statement(ctx, s, incoming)),
            Task::Expression(s) => Ok(self.expression(ctx, s, incoming)),
            Task::Access(s) => Ok(self.access(ctx, s, incoming)),
            Task::Arguments(s) => Ok(self.arguments(ctx, s, incoming)),
            Task::Paren(s) => Ok(self.paren(ctx, s, incoming)),
            Task::List(s) => Ok(self.list(ctx, s, incoming)),
        }
    }

    // ---- cursor helpers ----

    pub(super) fn peek(
        &self,
        ctx: &FrameCtx,
    ) -> Option<&'a crate::frontend::lexer::Lexeme> {
        if self.pos < ctx.end {
            self.lexemes.get(self.pos)
        } else {
            None
        }
    }

    pub(super) fn peek_at(
        &self,
        ctx: &FrameCtx,
        offset: usize,
    ) -> Option<&'a crate::frontend::lexer::Lexeme> {
        let index = self.pos + offset;
        if index < ctx.end {
            self.lexemes.get(index)
        } else {
            None
        }
    }

    pub(super) fn at_op(
        &self,
        ctx: &FrameCtx,
        text: &str,
    ) -> bool {
        self.peek(ctx).map_or(false, |l| l.is_op(text))
    }

    pub(super) fn at_keyword(
        &self,
        ctx: &FrameCtx,
        text: &str,
    ) -> bool {
        self.peek(ctx).map_or(false, |l| l.is_keyword(text))
    }

    pub(super) fn at_end(
        &self,
        ctx: &FrameCtx,
    ) -> bool {
        self.pos >= ctx.end
    }

    /// Consume one lexeme, returning its index
    pub(super) fn bump(&mut self) -> usize {
        let index = self.pos;
        self.pos += 1;
        index
    }

    /// Consume `text` if it is next
    pub(super) fn eat_op(
        &mut self,
        ctx: &FrameCtx,
        text: &str,
    ) -> bool {
        if self.at_op(ctx, text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn span_at(
        &self,
        index: usize,
    ) -> Span {
        match self.lexemes.get(index) {
            Some(lexeme) => lexeme.span(index),
            None => match self.lexemes.last() {
                Some(last) => last.span(self.lexemes.len() - 1),
                None => Span::dummy(),
            },
        }
    }

    /// Span of the current lexeme within `end`
    pub(super) fn here(
        &self,
        end: usize,
    ) -> Span {
        if self.pos < end {
            self.span_at(self.pos)
        } else {
            self.span_at(end.saturating_sub(1))
        }
    }

    /// Span from lexeme `start` to the last consumed lexeme
    pub(super) fn span_from(
        &self,
        start: usize,
    ) -> Span {
        let last = self.pos.saturating_sub(1).max(start);
        self.span_at(start).merge(self.span_at(last))
    }

    /// Failure with "expected X" at the current lexeme
    pub(super) fn expected(
        &self,
        ctx: &FrameCtx,
        what: &str,
    ) -> Step {
        let message = match self.peek(ctx) {
            Some(found) => format!("expected {} but found '{}'", what, found.text),
            None => format!("expected {} at end of input", what),
        };
        Step::Done(Outcome::Failure(vec![Diagnostic::error(self.here(ctx.end), message)]))
    }

    pub(super) fn fail_at(
        &self,
        span: Span,
        message: impl Into<String>,
    ) -> Step {
        Step::Done(Outcome::Failure(vec![Diagnostic::error(span, message)]))
    }

    // ---- branch helpers ----

    pub(super) fn alloc(
        &mut self,
        label: Label,
        text: impl Into<String>,
        span: Span,
        scope: ScopeId,
        children: impl IntoIterator<Item = BranchId>,
    ) -> BranchId {
        self.tree
            .alloc(Branch::new(label, text, span, scope).with_children(children))
    }

    /// Leaf for the lexeme at `index`
    pub(super) fn leaf(
        &mut self,
        label: Label,
        index: usize,
        scope: ScopeId,
    ) -> BranchId {
        let text = self.lexemes[index].text.clone();
        let span = self.span_at(index);
        self.alloc(label, text, span, scope, [])
    }

    /// Skip to just past the next `;` or to the next `}` at depth zero
    pub(super) fn synchronize(
        &mut self,
        ctx: &FrameCtx,
    ) {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(lexeme) = self.peek(ctx) {
            if depth == 0 && lexeme.is_op(";") {
                self.pos += 1;
                break;
            }
            if depth == 0 && lexeme.is_op("}") {
                break;
            }
            if lexeme.is_op("(") || lexeme.is_op("[") || lexeme.is_op("{") {
                depth += 1;
            } else if lexeme.is_op(")") || lexeme.is_op("]") || lexeme.is_op("}") {
                depth = depth.saturating_sub(1);
            }
            self.pos += 1;
        }
        if self.pos == start && !self.at_end(ctx) {
            self.pos += 1;
        }
    }
}
