//! Expressions
//!
//! 表达式用一个帧内的迭代优先级爬升（shunting-yard）解析：操作数来自
//! access-chain 子帧，运算符按 [`Level`] 归约。左结合层级生成扁平的
//! `Chain(level)` 分支，`**` 生成嵌套的 `Power` 分支，`?:` 右结合。

use std::collections::HashSet;

use super::extra::Extra;
use super::machine::{Child, FrameCtx, Outcome, Step, Task};
use super::tree::{Annotation, BranchId, Label, Level};
use super::types::TypeNameState;
use super::Parser;
use crate::frontend::const_eval::Value;
use crate::frontend::lexer::{Lexeme, LexemeKind};
use crate::frontend::symbols::scope::ScopePath;
use crate::util::diagnostic::Diagnostic;

#[derive(Debug)]
enum Pending {
    Unary { text: String, index: usize },
    Binary { level: Level, index: usize },
    /// `?` still waiting for its `:`
    Question,
    /// `?` whose `:` has been seen
    Colon,
}

#[derive(Debug, Default)]
pub(super) struct ExprState {
    started: bool,
    operands: Vec<BranchId>,
    pending: Vec<Pending>,
    /// Chains allocated by this frame; later operators of the same level extend them
    fresh_chains: HashSet<BranchId>,
}

const PREFIX_OPERATORS: [&str; 4] = ["-", "+", "!", "~"];

impl<'a> Parser<'a> {
    pub(super) fn expression(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ExprState,
        incoming: Option<Outcome>,
    ) -> Step {
        if !state.started {
            state.started = true;
            return self.expect_operand(ctx, state);
        }
        match incoming {
            Some(Outcome::Success(operand)) => state.operands.push(operand),
            Some(failure) => return Step::Done(failure),
            None => return self.expected(ctx, "an expression"),
        }

        loop {
            let lexeme = match self.peek(ctx) {
                Some(l) if l.kind == LexemeKind::Operator => l,
                _ => return self.finish_expression(ctx, state),
            };
            if let Some(level) = Level::of_operator(&lexeme.text) {
                self.reduce_above(ctx, state, level);
                let index = self.bump();
                state.pending.push(Pending::Binary { level, index });
                return self.expect_operand(ctx, state);
            }
            if lexeme.is_op("?") {
                self.reduce_above(ctx, state, Level::Ternary);
                self.pos += 1;
                state.pending.push(Pending::Question);
                return self.expect_operand(ctx, state);
            }
            if lexeme.is_op(":") && state.pending.iter().any(|p| matches!(p, Pending::Question)) {
                while !matches!(state.pending.last(), Some(Pending::Question)) {
                    self.reduce_top(ctx, state);
                }
                state.pending.pop();
                state.pending.push(Pending::Colon);
                self.pos += 1;
                return self.expect_operand(ctx, state);
            }
            return self.finish_expression(ctx, state);
        }
    }

    /// Collect prefix operators, then push an access chain for the operand
    fn expect_operand(
        &mut self,
        ctx: &FrameCtx,
        state: &mut ExprState,
    ) -> Step {
        while let Some(lexeme) = self.peek(ctx) {
            if lexeme.kind != LexemeKind::Operator || !PREFIX_OPERATORS.contains(&lexeme.text.as_str()) {
                break;
            }
            let index = self.bump();
            state.pending.push(Pending::Unary {
                text: lexeme.text.clone(),
                index,
            });
        }
        Step::push(Task::Access(AccessState::default()))
    }

    /// Reduce pending operators that bind at least as tightly as `level`
    fn reduce_above(
        &mut self,
        ctx: &FrameCtx,
        state: &mut ExprState,
        level: Level,
    ) {
        loop {
            let reduce = match state.pending.last() {
                Some(Pending::Unary { .. }) => true,
                Some(Pending::Binary { level: top, .. }) => {
                    *top > level || (*top == level && !level.is_right_associative())
                }
                _ => false,
            };
            if !reduce {
                return;
            }
            self.reduce_top(ctx, state);
        }
    }

    fn reduce_top(
        &mut self,
        ctx: &FrameCtx,
        state: &mut ExprState,
    ) {
        let top = match state.pending.pop() {
            Some(top) => top,
            None => return,
        };
        match top {
            Pending::Unary { text, index } => {
                if let Some(operand) = state.operands.pop() {
                    let span = self.span_at(index).merge(self.tree.get(operand).span);
                    let id = self.alloc(Label::Unary, text, span, ctx.scope, [operand]);
                    state.operands.push(id);
                }
            }
            Pending::Binary { level, index } => {
                let (right, left) = match (state.operands.pop(), state.operands.pop()) {
                    (Some(right), Some(left)) => (right, left),
                    _ => return,
                };
                let op = self.leaf(Label::Operator, index, ctx.scope);
                let span = self.tree.get(left).span.merge(self.tree.get(right).span);
                let id = if level == Level::Power {
                    self.alloc(Label::Power, "**", span, ctx.scope, [left, op, right])
                } else if state.fresh_chains.contains(&left) && self.tree.get(left).label == Label::Chain(level) {
                    self.tree.push_child(left, op);
                    self.tree.push_child(left, right);
                    self.tree.get_mut(left).span = span;
                    left
                } else {
                    let chain = self.alloc(Label::Chain(level), "", span, ctx.scope, [left, op, right]);
                    state.fresh_chains.insert(chain);
                    chain
                };
                state.operands.push(id);
            }
            Pending::Colon => {
                let parts = (state.operands.pop(), state.operands.pop(), state.operands.pop());
                if let (Some(otherwise), Some(then), Some(cond)) = parts {
                    let span = self.tree.get(cond).span.merge(self.tree.get(otherwise).span);
                    let id = self.alloc(Label::Ternary, "", span, ctx.scope, [cond, then, otherwise]);
                    state.operands.push(id);
                }
            }
            Pending::Question => state.pending.push(Pending::Question),
        }
    }

    fn finish_expression(
        &mut self,
        ctx: &FrameCtx,
        state: &mut ExprState,
    ) -> Step {
        while let Some(top) = state.pending.last() {
            if matches!(top, Pending::Question) {
                return self.expected(ctx, "':' in conditional expression");
            }
            self.reduce_top(ctx, state);
        }
        match (state.operands.pop(), state.operands.is_empty()) {
            (Some(id), true) => Step::success(id),
            _ => self.fail_at(self.here(ctx.end), "malformed expression"),
        }
    }
}

#[derive(Debug, Default)]
pub(super) enum AccessStage {
    #[default]
    Head,
    /// Waiting for a head produced by a child frame
    HeadChild,
    NewType,
    Call,
    Index,
}

/// Primary expression followed by `.name`, `(args)` and `[expr]` segments
#[derive(Debug, Default)]
pub(super) struct AccessState {
    stage: AccessStage,
    start: usize,
    head: Option<BranchId>,
    segments: Vec<BranchId>,
    /// Type or namespace the chain currently names
    static_path: Option<ScopePath>,
    /// Owner and name of a trailing `.name` on a static path
    member_of: Option<(ScopePath, String)>,
}

impl<'a> Parser<'a> {
    pub(super) fn access(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut AccessState,
        incoming: Option<Outcome>,
    ) -> Step {
        match std::mem::take(&mut state.stage) {
            AccessStage::Head => {
                state.start = self.pos;
                if let Some(step) = self.access_head(ctx, state) {
                    return step;
                }
            }
            AccessStage::HeadChild => match incoming {
                Some(Outcome::Success(head)) => state.head = Some(head),
                Some(failure) => return Step::Done(failure),
                None => return self.expected(ctx, "an expression"),
            },
            AccessStage::NewType => {
                let ty = match incoming {
                    Some(Outcome::Success(ty)) => ty,
                    Some(failure) => return Step::Done(failure),
                    None => return self.expected(ctx, "a type after 'new'"),
                };
                if !self.at_op(ctx, "(") {
                    return self.expected(ctx, "'(' after the constructed type");
                }
                let extra = self.constructor_candidates(ctx, ty);
                state.stage = AccessStage::HeadChild;
                let args = ArgsState::new(Label::New, "").leading([ty]);
                return Step::Push(Child::new(Task::Arguments(args)).with_extra(extra));
            }
            AccessStage::Call | AccessStage::Index => match incoming {
                Some(Outcome::Success(segment)) => state.segments.push(segment),
                Some(failure) => return Step::Done(failure),
                None => return self.expected(ctx, "an expression"),
            },
        }
        self.access_segments(ctx, state)
    }

    /// Parse the head; `Some` when a child frame is needed or parsing failed
    fn access_head(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut AccessState,
    ) -> Option<Step> {
        let lexeme = match self.peek(ctx) {
            Some(lexeme) => lexeme,
            None => return Some(self.expected(ctx, "an expression")),
        };
        if let Some(value) = self.literal_value(ctx, lexeme) {
            let index = self.bump();
            let id = self.leaf(Label::Literal, index, ctx.scope);
            self.tree.get_mut(id).annotation = Annotation::Literal(value);
            state.head = Some(id);
            return None;
        }
        if lexeme.is_keyword("this") || lexeme.is_keyword("base") {
            let label = if lexeme.is_keyword("this") {
                Label::This
            } else {
                Label::Base
            };
            let index = self.bump();
            state.head = Some(self.leaf(label, index, ctx.scope));
            return None;
        }
        if lexeme.is_primitive_type() {
            if !self.peek_at(ctx, 1).map_or(false, |l| l.is_op("(")) {
                return Some(self.expected(ctx, "an expression"));
            }
            self.pos += 1;
            state.stage = AccessStage::HeadChild;
            let args = ArgsState::new(Label::Conversion, lexeme.text.clone());
            return Some(Step::push(Task::Arguments(args)));
        }
        if lexeme.is_keyword("new") {
            self.pos += 1;
            state.stage = AccessStage::NewType;
            return Some(Step::push(Task::TypeName(TypeNameState::default())));
        }
        if lexeme.is_op("(") {
            state.stage = AccessStage::HeadChild;
            return Some(Step::push(Task::Paren(ParenState::default())));
        }
        if lexeme.is_op("[") {
            state.stage = AccessStage::HeadChild;
            return Some(Step::push(Task::List(ListState::default())));
        }
        if lexeme.is_identifier() {
            let index = self.bump();
            let id = self.leaf(Label::Name, index, ctx.scope);
            if self.at_op(ctx, ".") {
                if let Some(symbols) = self.symbols {
                    let scope = self.tree.scope(ctx.scope).clone();
                    if let Some(path) = symbols.find_named(&scope, &lexeme.text) {
                        self.tree.get_mut(id).annotation = Annotation::Narrowed(Extra::StaticMember(path.clone()));
                        state.static_path = Some(path);
                    }
                }
            }
            state.head = Some(id);
            return None;
        }
        Some(self.expected(ctx, "an expression"))
    }

    /// Literal value of a lexeme, if it is one
    fn literal_value(
        &self,
        ctx: &mut FrameCtx,
        lexeme: &Lexeme,
    ) -> Option<Value> {
        let value = match lexeme.kind {
            LexemeKind::Int | LexemeKind::LongInt => {
                let long = lexeme.kind == LexemeKind::LongInt;
                match Value::integer_literal(&lexeme.text, long) {
                    Some(value) => value,
                    None => {
                        ctx.diagnostics.push(Diagnostic::error(
                            self.here(ctx.end),
                            format!("integral constant '{}' is too large", lexeme.text),
                        ));
                        Value::int(0)
                    }
                }
            }
            LexemeKind::Real => match lexeme.text.parse::<f64>() {
                Ok(r) => Value::real(r),
                Err(_) => {
                    ctx.diagnostics.push(Diagnostic::error(
                        self.here(ctx.end),
                        format!("invalid real literal '{}'", lexeme.text),
                    ));
                    Value::real(0.0)
                }
            },
            LexemeKind::StringLiteral => Value::string(lexeme.text.clone()),
            LexemeKind::Other if lexeme.text.starts_with('\'') => {
                Value::char(lexeme.text.chars().nth(1).unwrap_or('\0'))
            }
            LexemeKind::Keyword => match lexeme.text.as_str() {
                "true" => Value::bool(true),
                "false" => Value::bool(false),
                "null" => Value::null(),
                _ => return None,
            },
            _ => return None,
        };
        Some(value)
    }

    fn access_segments(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut AccessState,
    ) -> Step {
        loop {
            if self.at_op(ctx, ".") {
                let name = match self.peek_at(ctx, 1) {
                    Some(l) if l.is_identifier() => l,
                    _ => {
                        self.pos += 1;
                        return self.expected(ctx, "a member name after '.'");
                    }
                };
                self.pos += 1;
                let index = self.bump();
                let member = self.leaf(Label::Member, index, ctx.scope);
                state.member_of = None;
                if let (Some(owner), Some(symbols)) = (state.static_path.take(), self.symbols) {
                    match symbols.child_named(&owner, &name.text) {
                        Some(path) => {
                            self.tree.get_mut(member).annotation =
                                Annotation::Narrowed(Extra::StaticMember(path.clone()));
                            state.static_path = Some(path.clone());
                        }
                        None => state.member_of = Some((owner, name.text.clone())),
                    }
                }
                state.segments.push(member);
                continue;
            }
            if self.at_op(ctx, "(") {
                let extra = self.call_candidates(ctx, state);
                state.static_path = None;
                state.member_of = None;
                state.stage = AccessStage::Call;
                let args = ArgsState::new(Label::Call, "");
                return Step::Push(Child::new(Task::Arguments(args)).with_extra(extra));
            }
            if self.at_op(ctx, "[") {
                state.static_path = None;
                state.member_of = None;
                state.stage = AccessStage::Index;
                return Step::push(Task::Paren(ParenState::index()));
            }
            break;
        }

        let head = match state.head {
            Some(head) => head,
            None => return self.expected(ctx, "an expression"),
        };
        if state.segments.is_empty() {
            return Step::success(head);
        }
        let span = self.span_from(state.start);
        let mut children = vec![head];
        children.append(&mut state.segments);
        Step::success(self.alloc(Label::AccessChain, "", span, ctx.scope, children))
    }

    /// Overload candidates for a call right after the head or a static member
    fn call_candidates(
        &self,
        ctx: &FrameCtx,
        state: &AccessState,
    ) -> Option<Extra> {
        let symbols = self.symbols?;
        if let Some((owner, name)) = &state.member_of {
            let found = if symbols.type_info(owner).is_some() {
                symbols.member_functions(owner, name)
            } else {
                symbols.overloads(owner, name)
            };
            return Some(Extra::FunctionOverloads {
                name: name.clone(),
                candidates: found.into_iter().map(|f| f.path.clone()).collect(),
            });
        }
        if !state.segments.is_empty() {
            return None;
        }
        let head = self.tree.get(state.head?);
        if head.label != Label::Name {
            return None;
        }
        let scope = self.tree.scope(ctx.scope);
        let found = symbols.visible_functions(scope, &head.text);
        if found.is_empty() {
            if let Some(owner) = symbols.find_named(scope, &head.text) {
                if symbols.type_info(&owner).is_some() {
                    let candidates = symbols.constructors(&owner).iter().map(|f| f.path.clone()).collect();
                    return Some(Extra::ConstructorOverloads { owner, candidates });
                }
            }
        }
        Some(Extra::FunctionOverloads {
            name: head.text.clone(),
            candidates: found.into_iter().map(|f| f.path.clone()).collect(),
        })
    }

    /// Constructor candidates for `new T(...)`
    fn constructor_candidates(
        &self,
        ctx: &FrameCtx,
        ty: BranchId,
    ) -> Option<Extra> {
        let symbols = self.symbols?;
        let branch = self.tree.get(ty);
        if branch.label != Label::TypeName || branch.text == "tuple" {
            return None;
        }
        let parts: Vec<&str> = branch.text.split('.').collect();
        let owner = symbols.resolve_dotted(self.tree.scope(ctx.scope), &parts)?;
        symbols.type_info(&owner)?;
        let candidates = symbols.constructors(&owner).iter().map(|f| f.path.clone()).collect();
        Some(Extra::ConstructorOverloads { owner, candidates })
    }
}

/// `'(' [expr (',' expr)*] ')'` producing `label` with optional leading children
#[derive(Debug)]
pub(super) struct ArgsState {
    label: Label,
    text: String,
    leading: Vec<BranchId>,
    items: Vec<BranchId>,
    start: Option<usize>,
}

impl ArgsState {
    pub fn new(
        label: Label,
        text: impl Into<String>,
    ) -> Self {
        Self {
            label,
            text: text.into(),
            leading: Vec::new(),
            items: Vec::new(),
            start: None,
        }
    }

    pub fn leading(
        mut self,
        children: impl IntoIterator<Item = BranchId>,
    ) -> Self {
        self.leading.extend(children);
        self
    }
}

impl<'a> Parser<'a> {
    pub(super) fn arguments(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ArgsState,
        incoming: Option<Outcome>,
    ) -> Step {
        if state.start.is_none() {
            state.start = Some(self.pos);
            if !self.eat_op(ctx, "(") {
                return self.expected(ctx, "'('");
            }
            if self.eat_op(ctx, ")") {
                return self.finish_arguments(ctx, state);
            }
            return Step::push(Task::Expression(ExprState::default()));
        }
        match incoming {
            Some(Outcome::Success(item)) => state.items.push(item),
            Some(failure) => return Step::Done(failure),
            None => return self.expected(ctx, "an argument"),
        }
        if self.eat_op(ctx, ",") {
            return Step::push(Task::Expression(ExprState::default()));
        }
        if !self.eat_op(ctx, ")") {
            return self.expected(ctx, "',' or ')' in argument list");
        }
        self.finish_arguments(ctx, state)
    }

    fn finish_arguments(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ArgsState,
    ) -> Step {
        let start = state.start.unwrap_or(self.pos);
        let span = match state.leading.first() {
            Some(first) => self.tree.get(*first).span.merge(self.span_from(start)),
            None => self.span_from(start),
        };
        let count = state.items.len();
        let mut children = std::mem::take(&mut state.leading);
        children.append(&mut state.items);
        let id = self.alloc(state.label, state.text.clone(), span, ctx.scope, children);
        if let Some(extra) = ctx.extra.take() {
            let narrowed = self.filter_by_arity(extra, count);
            self.tree.get_mut(id).annotation = Annotation::Narrowed(narrowed);
        }
        Step::success(id)
    }

    /// Keep only candidates that accept `count` arguments
    fn filter_by_arity(
        &self,
        extra: Extra,
        count: usize,
    ) -> Extra {
        let symbols = match self.symbols {
            Some(symbols) => symbols,
            None => return extra,
        };
        let accepts = |path: &ScopePath| {
            symbols
                .function(path)
                .map_or(false, |f| f.accepts_arity(count))
        };
        match extra {
            Extra::FunctionOverloads { name, candidates } => Extra::FunctionOverloads {
                name,
                candidates: candidates.into_iter().filter(|p| accepts(p)).collect(),
            },
            Extra::ConstructorOverloads { owner, candidates } => Extra::ConstructorOverloads {
                owner,
                candidates: candidates.into_iter().filter(|p| accepts(p)).collect(),
            },
            other => other,
        }
    }
}

/// `'(' expr ')'`, a tuple `'(' expr (',' expr)+ ')'`, or an index `'[' expr ']'`
#[derive(Debug)]
pub(super) struct ParenState {
    open: &'static str,
    close: &'static str,
    start: Option<usize>,
    items: Vec<BranchId>,
}

impl Default for ParenState {
    fn default() -> Self {
        Self {
            open: "(",
            close: ")",
            start: None,
            items: Vec::new(),
        }
    }
}

impl ParenState {
    pub fn index() -> Self {
        Self {
            open: "[",
            close: "]",
            ..Self::default()
        }
    }
}

impl<'a> Parser<'a> {
    pub(super) fn paren(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ParenState,
        incoming: Option<Outcome>,
    ) -> Step {
        let start = match state.start {
            Some(start) => start,
            None => {
                state.start = Some(self.pos);
                if !self.eat_op(ctx, state.open) {
                    return self.expected(ctx, &format!("'{}'", state.open));
                }
                return Step::push(Task::Expression(ExprState::default()));
            }
        };
        match incoming {
            Some(Outcome::Success(item)) => state.items.push(item),
            Some(failure) => return Step::Done(failure),
            None => return self.expected(ctx, "an expression"),
        }
        let is_index = state.open == "[";
        if !is_index && self.eat_op(ctx, ",") {
            return Step::push(Task::Expression(ExprState::default()));
        }
        if !self.eat_op(ctx, state.close) {
            let what = if is_index { "']'" } else { "',' or ')'" };
            return self.expected(ctx, what);
        }
        let span = self.span_from(start);
        let items = std::mem::take(&mut state.items);
        if is_index {
            return Step::success(self.alloc(Label::Index, "", span, ctx.scope, items));
        }
        if items.len() == 1 {
            return Step::success(items[0]);
        }
        Step::success(self.alloc(Label::Tuple, "", span, ctx.scope, items))
    }
}

/// `'[' [expr (',' expr)*] ']'`
#[derive(Debug, Default)]
pub(super) struct ListState {
    start: Option<usize>,
    items: Vec<BranchId>,
}

impl<'a> Parser<'a> {
    pub(super) fn list(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut ListState,
        incoming: Option<Outcome>,
    ) -> Step {
        let start = match state.start {
            Some(start) => start,
            None => {
                state.start = Some(self.pos);
                if !self.eat_op(ctx, "[") {
                    return self.expected(ctx, "'['");
                }
                if self.eat_op(ctx, "]") {
                    let span = self.span_from(self.pos - 2);
                    return Step::success(self.alloc(Label::List, "", span, ctx.scope, []));
                }
                return Step::push(Task::Expression(ExprState::default()));
            }
        };
        match incoming {
            Some(Outcome::Success(item)) => state.items.push(item),
            Some(failure) => return Step::Done(failure),
            None => return self.expected(ctx, "a list item"),
        }
        if self.eat_op(ctx, ",") {
            return Step::push(Task::Expression(ExprState::default()));
        }
        if !self.eat_op(ctx, "]") {
            return self.expected(ctx, "',' or ']' in list literal");
        }
        let span = self.span_from(start);
        let items = std::mem::take(&mut state.items);
        Step::success(self.alloc(Label::List, "", span, ctx.scope, items))
    }
}
