//! 语义解析与常量折叠
//!
//! Walks the syntax tree with an explicit enter/exit stack and records one
//! [`Resolution`] per branch in a side table: static type, folded value,
//! runtime host code and what a name resolved to. The tree is never
//! rewritten, so resolving the same context twice gives the same result.
//!
//! # 模块结构
//!
//! - [`declare`] - 声明登记（两个解析阶段之间运行）
//! - `lookup` - 名字查找、可见性、纯度与静态性检查
//! - `conversions` - 隐式转换分类与值转换
//! - `operators` - 运算符类型规则与折叠
//! - `overload` - 重载决议
//! - `access` - 访问链（成员、调用、索引、构造）
//! - `statements` - 语句检查
//! - `members` - 函数、构造函数、属性、参数
//! - `classes` - 继承与成员声明检查
//! - `emit` - 宿主文本生成

mod access;
mod classes;
mod conversions;
pub mod declare;
mod emit;
mod lookup;
mod members;
mod operators;
mod overload;
mod statements;

#[cfg(test)]
mod tests;

pub use emit::Helper;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::frontend::config::CompileConfig;
use crate::frontend::const_eval::Value;
use crate::frontend::context::{CompilationContext, TypeCache};
use crate::frontend::parser::{Annotation, BranchId, Extra, Label, SyntaxTree};
use crate::frontend::symbols::scope::ScopePath;
use crate::frontend::symbols::types::TypeDescriptor;
use crate::frontend::symbols::{FunctionInfo, SymbolTables};
use crate::util::diagnostic::{Diagnostic, Diagnostics, Wreck};
use crate::util::span::Span;

/// Resolution result of one branch
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub ty: TypeDescriptor,
    /// Folded value when the branch is a compile-time constant
    pub value: Option<Value>,
    /// Runtime host text; declarations carry their whole host text
    pub code: String,
    /// What a name or member resolved to
    pub target: Option<Extra>,
    /// Assignable: local, parameter, property or list element
    pub place: bool,
    /// Statement never completes normally
    pub ends: bool,
    /// Emitted code needs parentheses when nested in an operator
    pub compound: bool,
}

impl Resolution {
    pub fn new(
        ty: TypeDescriptor,
        code: impl Into<String>,
    ) -> Self {
        Self {
            ty,
            value: None,
            code: code.into(),
            target: None,
            place: false,
            ends: false,
            compound: false,
        }
    }

    pub fn void() -> Self {
        Self::new(TypeDescriptor::void(), String::new())
    }

    /// Placeholder of an expression that already produced an error
    pub fn unknown() -> Self {
        Self::new(TypeDescriptor::unknown(), "default")
    }

    /// Folded constant; its code is the literal itself
    pub fn constant(value: Value) -> Self {
        let mut resolution = Self::new(value.ty.clone(), value.to_host_literal());
        resolution.value = Some(value);
        resolution
    }

    pub fn statement(
        code: impl Into<String>,
        ends: bool,
    ) -> Self {
        let mut resolution = Self::new(TypeDescriptor::void(), code);
        resolution.ends = ends;
        resolution
    }

    fn with_target(
        mut self,
        target: Extra,
    ) -> Self {
        self.target = Some(target);
        self
    }

    fn placed(mut self) -> Self {
        self.place = true;
        self
    }

    fn compound(mut self) -> Self {
        self.compound = true;
        self
    }

    pub fn is_constant(&self) -> bool {
        self.value.is_some()
    }
}

/// Resolutions indexed by branch id
#[derive(Debug, Clone, Default)]
pub struct SideTable {
    entries: Vec<Option<Resolution>>,
}

impl SideTable {
    fn with_len(len: usize) -> Self {
        Self {
            entries: vec![None; len],
        }
    }

    pub fn get(
        &self,
        id: BranchId,
    ) -> Option<&Resolution> {
        self.entries.get(id.index()).and_then(Option::as_ref)
    }

    fn insert(
        &mut self,
        id: BranchId,
        resolution: Resolution,
    ) {
        if let Some(slot) = self.entries.get_mut(id.index()) {
            *slot = Some(resolution);
        }
    }

    /// Move a resolution out; its parent is the only reader
    fn take(
        &mut self,
        id: BranchId,
    ) -> Option<Resolution> {
        self.entries.get_mut(id.index()).and_then(Option::take)
    }

    /// Move the host text out of a resolution whose parent consumes it
    fn take_code(
        &mut self,
        id: BranchId,
    ) -> String {
        self.entries
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .map(|resolution| std::mem::take(&mut resolution.code))
            .unwrap_or_default()
    }

    /// Number of branches that received a resolution
    pub fn resolved(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

/// Everything resolution produces for one compilation
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub table: SideTable,
    pub emitted_text: String,
    pub auxiliary_declarations: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve the parsed program of `ctx`.
///
/// Locals recorded by a previous run are dropped first and the type cache is
/// copied, so repeated calls report the same diagnostics and emit the same text.
pub fn resolve(ctx: &mut CompilationContext) -> Result<Resolved, Wreck> {
    let program = ctx
        .program
        .ok_or_else(|| Wreck::internal("resolution requested before parsing"))?;
    ctx.symbols.clear_variables();

    let mut diagnostics = Diagnostics::new();
    classes::validate(&ctx.symbols, &mut diagnostics);

    let mut resolver = Resolver::new(&ctx.config, &ctx.tree, &mut ctx.symbols, ctx.types.clone());
    resolver.diagnostics = diagnostics;
    resolver.run(program)?;

    let emitted_text = emit::layout(&resolver.take_code(program), ctx.config.indent_width);
    let auxiliary_declarations = resolver.auxiliary_declarations();
    let mut diagnostics = resolver.diagnostics.into_vec();
    diagnostics.sort_by_key(|d| (d.line, d.position));
    debug!(
        "resolved {} branches, {} diagnostics, {} helpers",
        resolver.table.resolved(),
        diagnostics.len(),
        resolver.helpers.len()
    );
    Ok(Resolved {
        table: resolver.table,
        emitted_text,
        auxiliary_declarations,
        diagnostics,
    })
}

/// How a branch is used by its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Value,
    /// Head of an access chain or target of an assignment: method groups,
    /// types and namespaces are legal here
    Head,
}

#[derive(Debug, Clone, Copy)]
enum Visit {
    Enter(BranchId, Role),
    Exit(BranchId, Role),
}

/// Enclosing declaration state
#[derive(Debug, Clone, Default)]
struct Context {
    /// Innermost enclosing class, struct or interface
    owner_type: Option<ScopePath>,
    function: Option<FunctionInfo>,
    is_static: bool,
    multiconst: bool,
}

static ROOT_CONTEXT: Lazy<Context> = Lazy::new(Context::default);
static MISSING: Lazy<Resolution> = Lazy::new(Resolution::unknown);

pub(crate) struct Resolver<'c> {
    config: &'c CompileConfig,
    tree: &'c SyntaxTree,
    symbols: &'c mut SymbolTables,
    types: TypeCache,
    table: SideTable,
    diagnostics: Diagnostics,
    contexts: Vec<Context>,
    /// Local scopes of the current function, outermost (parameters) first
    frames: Vec<IndexMap<String, TypeDescriptor>>,
    /// Enclosing loops; the flag records a `break`
    loops: Vec<bool>,
    helpers: IndexSet<Helper>,
}

impl<'c> Resolver<'c> {
    fn new(
        config: &'c CompileConfig,
        tree: &'c SyntaxTree,
        symbols: &'c mut SymbolTables,
        types: TypeCache,
    ) -> Self {
        Self {
            config,
            tree,
            symbols,
            types,
            table: SideTable::with_len(tree.len()),
            diagnostics: Diagnostics::new(),
            contexts: Vec::new(),
            frames: Vec::new(),
            loops: Vec::new(),
            helpers: IndexSet::new(),
        }
    }

    fn run(
        &mut self,
        program: BranchId,
    ) -> Result<(), Wreck> {
        let mut stack = vec![Visit::Enter(program, Role::Value)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id, role) => {
                    self.enter(id);
                    stack.push(Visit::Exit(id, role));
                    let label = self.tree.get(id).label;
                    if is_opaque(label) {
                        continue;
                    }
                    for (position, child) in self.tree.children(id).iter().enumerate().rev() {
                        stack.push(Visit::Enter(*child, child_role(label, position)));
                    }
                }
                Visit::Exit(id, role) => {
                    let resolution = self.exit(id, role)?;
                    trace!("resolved {:?}: {}", self.tree.get(id).label, resolution.ty);
                    self.leave(id);
                    self.table.insert(id, resolution);
                }
            }
        }
        Ok(())
    }

    fn enter(
        &mut self,
        id: BranchId,
    ) {
        let branch = self.tree.get(id);
        match branch.label {
            Label::Class | Label::Struct | Label::Interface => {
                let path = self.tree.scope(branch.scope).clone();
                self.contexts.push(Context {
                    owner_type: Some(path),
                    ..Context::default()
                });
            }
            Label::Function | Label::Constructor => {
                let path = self.tree.scope(branch.scope).clone();
                let function = self.symbols.function(&path).cloned();
                let modifiers = function.as_ref().map(|f| f.modifiers);
                self.contexts.push(Context {
                    owner_type: path.enclosing_type(),
                    is_static: modifiers.map_or(false, |m| m.is_static),
                    multiconst: modifiers.map_or(false, |m| m.is_multiconst),
                    function,
                });
                self.frames = vec![IndexMap::new()];
                self.loops.clear();
            }
            Label::Property => {
                let owner = self.tree.scope(branch.scope).clone();
                // 初始化表达式不能引用实例成员
                self.contexts.push(Context {
                    owner_type: owner.enclosing_type(),
                    function: None,
                    is_static: true,
                    multiconst: false,
                });
                self.frames = vec![IndexMap::new()];
            }
            Label::Block => self.frames.push(IndexMap::new()),
            Label::For => {
                self.frames.push(IndexMap::new());
                self.loops.push(false);
            }
            Label::While => self.loops.push(false),
            _ => {}
        }
    }

    fn leave(
        &mut self,
        id: BranchId,
    ) {
        match self.tree.get(id).label {
            Label::Class | Label::Struct | Label::Interface | Label::Property => {
                self.contexts.pop();
            }
            Label::Function | Label::Constructor => {
                self.contexts.pop();
                self.frames.clear();
            }
            Label::Block => {
                self.frames.pop();
            }
            Label::For => {
                self.frames.pop();
                self.loops.pop();
            }
            Label::While => {
                self.loops.pop();
            }
            _ => {}
        }
    }

    fn exit(
        &mut self,
        id: BranchId,
        role: Role,
    ) -> Result<Resolution, Wreck> {
        let label = self.tree.get(id).label;
        let resolution = match label {
            Label::Program => self.program(id),
            Label::Namespace => self.namespace(id),
            Label::Class | Label::Struct | Label::Interface => self.type_declaration(id)?,
            Label::Function | Label::Constructor => self.callable(id)?,
            Label::Property => self.property(id)?,
            Label::Parameter => self.parameter(id)?,
            Label::BaseCall => self.base_call(id),
            Label::Modifiers | Label::Parameters | Label::Operator | Label::Member | Label::Call | Label::Index => {
                Resolution::void()
            }
            Label::Empty => Resolution::statement(String::new(), false),
            Label::TypeName | Label::ListOf => {
                let ty = self.declared_type(id).unwrap_or_else(TypeDescriptor::unknown);
                let code = ty.host_name();
                Resolution::new(ty, code)
            }
            Label::Block => self.block(id),
            Label::VarDecl => self.var_decl(id)?,
            Label::Assignment => self.assignment(id)?,
            Label::Step => self.step(id)?,
            Label::If => self.if_statement(id)?,
            Label::While => self.while_loop(id)?,
            Label::For => self.for_loop(id)?,
            Label::Return => self.return_statement(id),
            Label::Break | Label::Continue => self.jump(id),
            Label::Evaluate => self.evaluate(id)?,
            Label::Ternary => self.ternary(id)?,
            Label::Chain(_) | Label::Power => self.chain(id)?,
            Label::Unary => self.unary(id)?,
            Label::Literal => match &self.tree.get(id).annotation {
                Annotation::Literal(value) => Resolution::constant(value.clone()),
                _ => return Err(Wreck::internal("literal without a value")),
            },
            Label::Name => self.name(id, role),
            Label::This | Label::Base => self.this_or_base(id),
            Label::AccessChain => self.access_chain(id)?,
            Label::New => self.new_object(id)?,
            Label::Conversion => self.conversion(id),
            Label::List => self.list_literal(id),
            Label::Tuple => self.tuple_literal(id),
        };
        Ok(resolution)
    }

    fn context(&self) -> &Context {
        self.contexts.last().unwrap_or(&ROOT_CONTEXT)
    }

    /// Scope path a branch was parsed in
    fn scope_of(
        &self,
        id: BranchId,
    ) -> &'c ScopePath {
        self.tree.scope_of(id)
    }

    fn res(
        &self,
        id: BranchId,
    ) -> &Resolution {
        self.table.get(id).unwrap_or(&MISSING)
    }

    fn span(
        &self,
        id: BranchId,
    ) -> Span {
        self.tree.get(id).span
    }

    fn child(
        &self,
        id: BranchId,
        n: usize,
    ) -> Result<BranchId, Wreck> {
        self.tree
            .child(id, n)
            .ok_or_else(|| Wreck::internal(format!("malformed {:?} branch", self.tree.get(id).label)))
    }

    fn error(
        &mut self,
        span: Span,
        message: impl Into<String>,
    ) {
        self.diagnostics.error(span, message);
    }

    fn warning(
        &mut self,
        span: Span,
        message: impl Into<String>,
    ) {
        self.diagnostics.warning(span, message);
    }

    /// Type written by a `TypeName` / `ListOf` branch; `None` for `var`
    fn declared_type(
        &mut self,
        id: BranchId,
    ) -> Option<TypeDescriptor> {
        declare::resolve_type(self.tree, &*self.symbols, &mut self.types, id, &mut self.diagnostics)
    }

    /// Emitted text of a resolution: the literal when folding is on
    fn emit(
        &self,
        resolution: &Resolution,
    ) -> String {
        match &resolution.value {
            Some(value) if self.config.fold_constants => value.to_host_literal(),
            _ => resolution.code.clone(),
        }
    }

    /// Emitted text, parenthesised when nested inside an operator
    fn operand(
        &self,
        resolution: &Resolution,
    ) -> String {
        let folded = resolution.value.is_some() && self.config.fold_constants;
        if resolution.compound && !folded {
            format!("({})", resolution.code)
        } else {
            self.emit(resolution)
        }
    }

    fn text(
        &self,
        id: BranchId,
    ) -> String {
        self.emit(self.res(id))
    }

    /// Resolution of a literal item, moved out of the table
    fn take(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        self.table.take(id).unwrap_or_else(Resolution::unknown)
    }

    /// Host text of a statement or declaration child. Only the parent reads
    /// it, so it moves out of the table and each level copies text once.
    fn take_code(
        &mut self,
        id: BranchId,
    ) -> String {
        self.table.take_code(id)
    }
}

/// Branches whose children are interpreted by their parent
fn is_opaque(label: Label) -> bool {
    matches!(
        label,
        Label::TypeName | Label::ListOf | Label::Modifiers | Label::Operator | Label::Member
    )
}

fn child_role(
    parent: Label,
    position: usize,
) -> Role {
    match (parent, position) {
        (Label::AccessChain, 0) | (Label::Assignment, 0) | (Label::Step, 0) => Role::Head,
        _ => Role::Value,
    }
}
