//! Type names
//!
//! `var`, a primitive keyword, a dotted name or a tuple `(T, U, ...)`, each
//! optionally followed by list suffixes `[]` / `[N]`.

use super::machine::{FrameCtx, Outcome, Step, Task};
use super::tree::{BranchId, Label};
use super::Parser;
use crate::frontend::lexer::LexemeKind;

#[derive(Debug, Default)]
pub(super) enum TypeStage {
    #[default]
    Start,
    Tuple(Vec<BranchId>),
}

#[derive(Debug, Default)]
pub(super) struct TypeNameState {
    stage: TypeStage,
    start: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn type_name(
        &mut self,
        ctx: &mut FrameCtx,
        state: &mut TypeNameState,
        incoming: Option<Outcome>,
    ) -> Step {
        let base = match (std::mem::take(&mut state.stage), incoming) {
            (TypeStage::Start, _) => {
                state.start = self.pos;
                let lexeme = match self.peek(ctx) {
                    Some(lexeme) => lexeme,
                    None => return self.expected(ctx, "a type"),
                };
                if lexeme.is_keyword("var") || lexeme.is_primitive_type() {
                    let index = self.bump();
                    self.leaf(Label::TypeName, index, ctx.scope)
                } else if lexeme.is_identifier() {
                    let mut name = lexeme.text.clone();
                    self.pos += 1;
                    while self.at_op(ctx, ".")
                        && self.peek_at(ctx, 1).map_or(false, |l| l.is_identifier())
                    {
                        name.push('.');
                        name.push_str(&self.lexemes[self.pos + 1].text);
                        self.pos += 2;
                    }
                    let span = self.span_from(state.start);
                    self.alloc(Label::TypeName, name, span, ctx.scope, [])
                } else if lexeme.is_op("(") {
                    self.pos += 1;
                    state.stage = TypeStage::Tuple(Vec::new());
                    return Step::push(Task::TypeName(TypeNameState::default()));
                } else {
                    return self.expected(ctx, "a type");
                }
            }
            (TypeStage::Tuple(mut items), Some(Outcome::Success(item))) => {
                items.push(item);
                if self.eat_op(ctx, ",") {
                    state.stage = TypeStage::Tuple(items);
                    return Step::push(Task::TypeName(TypeNameState::default()));
                }
                if !self.eat_op(ctx, ")") {
                    return self.expected(ctx, "',' or ')' in tuple type");
                }
                if items.len() < 2 {
                    return self.fail_at(
                        self.span_from(state.start),
                        "a tuple type needs at least two items",
                    );
                }
                let span = self.span_from(state.start);
                self.alloc(Label::TypeName, "tuple", span, ctx.scope, items)
            }
            (TypeStage::Tuple(_), Some(Outcome::Failure(reason))) => {
                return Step::Done(Outcome::Failure(reason));
            }
            (TypeStage::Tuple(_), None) => return self.expected(ctx, "a type"),
        };
        Step::success(self.list_suffixes(ctx, state.start, base))
    }

    /// Wrap `base` in one `ListOf` per `[]` / `[N]` suffix
    fn list_suffixes(
        &mut self,
        ctx: &FrameCtx,
        start: usize,
        mut base: BranchId,
    ) -> BranchId {
        loop {
            if !self.at_op(ctx, "[") {
                return base;
            }
            let length = match self.peek_at(ctx, 1) {
                Some(l) if l.is_op("]") => {
                    self.pos += 2;
                    String::new()
                }
                Some(l) if l.kind == LexemeKind::Int
                    && self.peek_at(ctx, 2).map_or(false, |c| c.is_op("]")) =>
                {
                    self.pos += 3;
                    l.text.clone()
                }
                _ => return base,
            };
            let span = self.span_from(start);
            base = self.alloc(Label::ListOf, length, span, ctx.scope, [base]);
        }
    }
}
