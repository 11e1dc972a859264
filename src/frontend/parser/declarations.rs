//! Declaration tasks: member lists, functions, properties, parameters

use super::expressions::ExprState;
use super::machine::{furthest, Child, FrameCtx, Outcome, Step, Task};
use super::statements::{BlockState, StatementState};
use super::tree::{Annotation, BranchId, Label};
use super::types::TypeNameState;
use super::Parser;
use crate::frontend::symbols::scope::BlockKind;
use crate::util::diagnostic::{Diagnostic, Wreck};

#[derive(Debug, Default)]
pub(super) enum MemberStage {
    #[default]
    Idle,
    Declaration(usize),
    Property,
    /// Property failure plus the arena mark before the statement attempt
    Statement(Vec<Diagnostic>, usize),
}

/// Member list of the program, a namespace or a type body
#[derive(Debug, Default)]
pub(super) struct MembersState {
    /// Block-table entry of the container; `None` for the program
    pub entry: Option<usize>,
    pub items: Vec<BranchId>,
    pub stage: MemberStage,
    started: bool,
}

impl MembersState {
    pub fn program() -> Self {
        Self::default()
    }

    pub fn container(entry: usize) -> Self {
        Self {
            entry: Some(entry),
            ..Self::default()
        }
    }
}

impl<'a> Parser<'a> {
    pub(super) fn members(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut MembersState,
        incoming: Option<Outcome>,
    ) -> Result<Step, Wreck> {
        let table = self.table;
        if !state.started {
            state.started = true;
            if let Some(entry) = state.entry {
                // skip the opening brace of the body
                self.pos = table.get(entry).body_start + 1;
            }
        }

        match (std::mem::take(&mut state.stage), incoming) {
            (MemberStage::Declaration(entry), Some(outcome)) => {
                match outcome {
                    Outcome::Success(id) => state.items.push(id),
                    Outcome::Failure(reason) => ctx.diagnostics.extend(reason),
                }
                self.pos = table.get(entry).next_index();
            }
            (MemberStage::Property, Some(Outcome::Success(id))) => state.items.push(id),
            (MemberStage::Property, Some(Outcome::Failure(reason))) => {
                state.stage = MemberStage::Statement(reason, self.tree.mark());
                let statement = StatementState::default();
                return Ok(Step::push(Task::Statement(statement)));
            }
            (MemberStage::Statement(_, mark), Some(Outcome::Success(id))) => {
                let span = self.tree.get(id).span;
                ctx.diagnostics.push(Diagnostic::error(
                    span,
                    "statements are not allowed outside of a function body",
                ));
                self.tree.truncate(mark);
            }
            (MemberStage::Statement(first, _), Some(Outcome::Failure(reason))) => {
                ctx.diagnostics.extend(furthest(first, reason));
                self.synchronize(ctx);
            }
            (_, _) => {}
        }

        loop {
            if self.at_end(ctx) {
                return Ok(Step::success(self.finish_container(ctx, state)));
            }
            if let Some(entry) = table.at_header(self.pos) {
                state.stage = MemberStage::Declaration(entry);
                let decl = table.get(entry);
                let scope = self.tree.intern(decl.scope.clone());
                // a member list stops before its closing brace, a callable owns it
                let (task, end) = if decl.kind.is_callable() {
                    (Task::Callable(CallableState::new(entry)), decl.next_index())
                } else {
                    (Task::Members(MembersState::container(entry)), decl.body_end)
                };
                return Ok(Step::Push(Child::new(task).bounded(end).in_scope(scope)));
            }
            if self.eat_op(ctx, ";") {
                continue;
            }
            state.stage = MemberStage::Property;
            return Ok(Step::push(Task::Property(PropertyState::default())));
        }
    }

    fn finish_container(
        &mut self,
        ctx: &FrameCtx,
        state: &mut MembersState,
    ) -> BranchId {
        let items = std::mem::take(&mut state.items);
        let table = self.table;
        let (index, entry) = match state.entry {
            Some(index) => (index, table.get(index)),
            None => {
                let span = self.span_at(0).merge(self.span_at(self.lexemes.len().saturating_sub(1)));
                return self.alloc(Label::Program, "", span, ctx.scope, items);
            }
        };
        let span = self.span_at(entry.header_start).merge(self.span_at(entry.body_end));
        let label = match entry.kind {
            BlockKind::Namespace => Label::Namespace,
            BlockKind::Struct => Label::Struct,
            BlockKind::Interface => Label::Interface,
            _ => Label::Class,
        };
        if label == Label::Namespace {
            return self.alloc(label, entry.name.clone(), span, ctx.scope, items);
        }
        let modifiers = self.modifiers_branch(entry.header_start, entry.keyword, ctx);
        let base = match self.headers.get(index).and_then(|h| h.annotation) {
            Some(base) => base,
            None => self.alloc(Label::Empty, "", span, ctx.scope, []),
        };
        let mut children = vec![modifiers, base];
        children.extend(items);
        self.alloc(label, entry.name.clone(), span, ctx.scope, children)
    }

    /// `Modifiers` branch for lexemes `[start, keyword)`
    fn modifiers_branch(
        &mut self,
        start: usize,
        keyword: usize,
        ctx: &FrameCtx,
    ) -> BranchId {
        let lexemes = self.lexemes;
        let words: Vec<&str> = lexemes[start..keyword]
            .iter()
            .map(|l| l.text.as_str())
            .collect();
        let span = self.span_at(start);
        self.alloc(Label::Modifiers, words.join(" "), span, ctx.scope, [])
    }
}

/// Function or constructor declaration
#[derive(Debug)]
pub(super) struct CallableState {
    entry: usize,
    started: bool,
}

impl CallableState {
    pub fn new(entry: usize) -> Self {
        Self {
            entry,
            started: false,
        }
    }
}

impl<'a> Parser<'a> {
    pub(super) fn callable(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut CallableState,
        incoming: Option<Outcome>,
    ) -> Result<Step, Wreck> {
        let table = self.table;
        let entry = table.get(state.entry);
        if !state.started {
            state.started = true;
            if entry.has_body() {
                self.pos = entry.body_start;
                let block = BlockState::function_body();
                return Ok(Step::Push(Child::new(Task::Block(block)).bounded(entry.body_end + 1)));
            }
        }

        let body = match incoming {
            Some(Outcome::Success(id)) => id,
            Some(Outcome::Failure(reason)) => {
                ctx.diagnostics.extend(reason);
                self.alloc(Label::Empty, "", self.span_at(entry.body_start), ctx.scope, [])
            }
            None => self.alloc(Label::Empty, "", self.span_at(entry.body_start), ctx.scope, []),
        };

        let span = self.span_at(entry.header_start).merge(self.span_at(entry.body_end));
        let modifiers = self.modifiers_branch(entry.header_start, entry.keyword, ctx);
        let header = self.headers.get(state.entry).copied().unwrap_or_default();
        let params = match header.params {
            Some(id) => id,
            None => self.alloc(Label::Parameters, "", span, ctx.scope, []),
        };
        let id = if entry.kind == BlockKind::Constructor {
            let base_call = match header.annotation {
                Some(id) => id,
                None => self.alloc(Label::Empty, "", span, ctx.scope, []),
            };
            self.alloc(
                Label::Constructor,
                entry.name.clone(),
                span,
                ctx.scope,
                [modifiers, params, base_call, body],
            )
        } else {
            let returns = match header.annotation {
                Some(id) => id,
                None => self.alloc(Label::TypeName, "void", span, ctx.scope, []),
            };
            self.alloc(
                Label::Function,
                entry.name.clone(),
                span,
                ctx.scope,
                [modifiers, params, returns, body],
            )
        };
        Ok(Step::success(id))
    }
}

#[derive(Debug, Default)]
pub(super) enum PropertyStage {
    #[default]
    Start,
    Type,
    Initializer,
}

/// `modifier* type name ['=' expr] ';'`
#[derive(Debug, Default)]
pub(super) struct PropertyState {
    stage: PropertyStage,
    modifiers: Option<BranchId>,
    ty: Option<BranchId>,
    name: String,
    start: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn property(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut PropertyState,
        incoming: Option<Outcome>,
    ) -> Step {
        match state.stage {
            PropertyStage::Start => {
                state.start = self.pos;
                let mut words = Vec::new();
                while let Some(lexeme) = self.peek(ctx) {
                    if !lexeme.is_modifier() {
                        break;
                    }
                    words.push(lexeme.text.as_str());
                    self.pos += 1;
                }
                let span = self.span_at(state.start);
                state.modifiers = Some(self.alloc(Label::Modifiers, words.join(" "), span, ctx.scope, []));
                state.stage = PropertyStage::Type;
                Step::push(Task::TypeName(TypeNameState::default()))
            }
            PropertyStage::Type => {
                let ty = match incoming {
                    Some(Outcome::Success(id)) => id,
                    Some(Outcome::Failure(reason)) => return Step::Done(Outcome::Failure(reason)),
                    None => return self.expected(ctx, "a type"),
                };
                state.ty = Some(ty);
                match self.peek(ctx) {
                    Some(l) if l.is_identifier() => {
                        state.name = l.text.clone();
                        self.pos += 1;
                    }
                    _ => return self.expected(ctx, "a property name"),
                }
                if self.eat_op(ctx, "=") {
                    state.stage = PropertyStage::Initializer;
                    return Step::push(Task::Expression(ExprState::default()));
                }
                self.finish_property(ctx, state, None)
            }
            PropertyStage::Initializer => match incoming {
                Some(Outcome::Success(init)) => self.finish_property(ctx, state, Some(init)),
                Some(Outcome::Failure(reason)) => Step::Done(Outcome::Failure(reason)),
                None => self.expected(ctx, "an expression"),
            },
        }
    }

    fn finish_property(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut PropertyState,
        init: Option<BranchId>,
    ) -> Step {
        if !self.eat_op(ctx, ";") {
            return self.expected(ctx, "';'");
        }
        let span = self.span_from(state.start);
        let mut children: Vec<BranchId> = state.modifiers.into_iter().chain(state.ty).collect();
        children.extend(init);
        let id = self.alloc(Label::Property, state.name.clone(), span, ctx.scope, children);
        Step::success(id)
    }
}

/// Comma-separated parameters up to the frame bound
#[derive(Debug, Default)]
pub(super) struct ParametersState {
    items: Vec<BranchId>,
    started: Option<usize>,
}

impl<'a> Parser<'a> {
    pub(super) fn parameters(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ParametersState,
        incoming: Option<Outcome>,
    ) -> Step {
        let start = *state.started.get_or_insert(self.pos);
        match incoming {
            Some(Outcome::Success(id)) => {
                state.items.push(id);
                if !self.at_end(ctx) {
                    if !self.eat_op(ctx, ",") {
                        return self.expected(ctx, "',' or ')'");
                    }
                    if self.at_end(ctx) {
                        return self.fail_at(self.here(ctx.end), "expected a parameter after ','");
                    }
                }
            }
            Some(Outcome::Failure(reason)) => return Step::Done(Outcome::Failure(reason)),
            None if self.at_end(ctx) => {
                let span = self.span_at(start.saturating_sub(1));
                let id = self.alloc(Label::Parameters, "", span, ctx.scope, []);
                return Step::success(id);
            }
            None => {}
        }
        if self.at_end(ctx) && !state.items.is_empty() {
            let span = self.span_at(start.saturating_sub(1)).merge(self.here(ctx.end));
            let items = std::mem::take(&mut state.items);
            let id = self.alloc(Label::Parameters, "", span, ctx.scope, items);
            return Step::success(id);
        }
        Step::push(Task::Parameter(ParameterState::default()))
    }
}

#[derive(Debug, Default)]
pub(super) enum ParameterStage {
    #[default]
    Start,
    Type,
    Default,
}

/// `['params'] type name ['=' expr]`
#[derive(Debug, Default)]
pub(super) struct ParameterState {
    stage: ParameterStage,
    variadic: bool,
    ty: Option<BranchId>,
    name: String,
    start: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn parameter(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ParameterState,
        incoming: Option<Outcome>,
    ) -> Step {
        match state.stage {
            ParameterStage::Start => {
                state.start = self.pos;
                if self.at_keyword(ctx, "params") {
                    state.variadic = true;
                    self.pos += 1;
                }
                state.stage = ParameterStage::Type;
                Step::push(Task::TypeName(TypeNameState::default()))
            }
            ParameterStage::Type => {
                match incoming {
                    Some(Outcome::Success(id)) => state.ty = Some(id),
                    Some(Outcome::Failure(reason)) => return Step::Done(Outcome::Failure(reason)),
                    None => return self.expected(ctx, "a parameter type"),
                }
                match self.peek(ctx) {
                    Some(l) if l.is_identifier() => {
                        state.name = l.text.clone();
                        self.pos += 1;
                    }
                    _ => return self.expected(ctx, "a parameter name"),
                }
                if self.eat_op(ctx, "=") {
                    state.stage = ParameterStage::Default;
                    return Step::push(Task::Expression(ExprState::default()));
                }
                self.finish_parameter(ctx, state, None)
            }
            ParameterStage::Default => match incoming {
                Some(Outcome::Success(id)) => self.finish_parameter(ctx, state, Some(id)),
                Some(Outcome::Failure(reason)) => Step::Done(Outcome::Failure(reason)),
                None => self.expected(ctx, "a default value"),
            },
        }
    }

    fn finish_parameter(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ParameterState,
        default: Option<BranchId>,
    ) -> Step {
        let span = self.span_from(state.start);
        let children: Vec<BranchId> = state.ty.into_iter().chain(default).collect();
        let flags = Annotation::ParameterFlags {
            optional: default.is_some(),
            variadic: state.variadic,
        };
        let id = self.alloc(Label::Parameter, state.name.clone(), span, ctx.scope, children);
        self.tree.get_mut(id).annotation = flags;
        Step::success(id)
    }
}
