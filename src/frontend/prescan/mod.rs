//! Declaration pre-scanner
//!
//! 单遍扫描：定位每个 namespace / class / function / constructor 的头部、
//! 参数列表与主体范围，生成 block-to-jump 表。解析器据此以任意顺序访问声明，
//! 从而支持前向引用。括号不匹配或头部畸形是致命错误。


use std::collections::HashMap;
use tracing::debug;

use crate::frontend::lexer::Lexeme;
use crate::frontend::symbols::scope::{Block, BlockKind, ScopePath};
use crate::util::diagnostic::Wreck;
use crate::util::span::Span;

/// One declaration located by the pre-scan
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEntry {
    /// Path of the scope this declaration opens
    pub scope: ScopePath,
    pub kind: BlockKind,
    pub name: String,
    /// Modifier words in source order
    pub modifiers: Vec<String>,
    /// Index of the first modifier (or the keyword)
    pub header_start: usize,
    pub keyword: usize,
    /// Indices of `(` and `)`
    pub params: Option<(usize, usize)>,
    /// Half-open lexeme range after `:` (base type, return type or base call)
    pub annotation: Option<(usize, usize)>,
    /// Index of `{`, or of `;` for a bodiless function
    pub body_start: usize,
    /// Index of the matching `}` (equal to `body_start` when bodiless)
    pub body_end: usize,
}

impl BlockEntry {
    pub fn has_body(&self) -> bool {
        self.body_end > self.body_start
    }

    /// First lexeme after the declaration
    pub fn next_index(&self) -> usize {
        self.body_end + 1
    }

    pub fn parent_scope(&self) -> ScopePath {
        self.scope.parent().unwrap_or_default()
    }

    pub fn contains(
        &self,
        other: &BlockEntry,
    ) -> bool {
        other.body_start > self.body_start && other.body_end < self.body_end
    }
}

/// Block-to-jump table, sorted by body start
#[derive(Debug, Clone, Default)]
pub struct BlockTable {
    pub entries: Vec<BlockEntry>,
    by_header: HashMap<usize, usize>,
}

impl BlockTable {
    fn new(mut entries: Vec<BlockEntry>) -> Self {
        entries.sort_by_key(|e| e.body_start);
        let by_header = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.header_start, i))
            .collect();
        Self { entries, by_header }
    }

    /// Entry whose header starts at lexeme `index`
    pub fn at_header(
        &self,
        index: usize,
    ) -> Option<usize> {
        self.by_header.get(&index).copied()
    }

    pub fn get(
        &self,
        entry: usize,
    ) -> &BlockEntry {
        &self.entries[entry]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockEntry> {
        self.entries.iter()
    }

    /// Entries must be disjoint or properly nested
    fn validate(&self) -> Result<(), Wreck> {
        let mut open: Vec<&BlockEntry> = Vec::new();
        for entry in &self.entries {
            while let Some(top) = open.last() {
                if entry.body_start > top.body_end {
                    open.pop();
                } else {
                    break;
                }
            }
            if let Some(top) = open.last() {
                if !top.contains(entry) {
                    return Err(Wreck::internal(format!(
                        "declaration blocks of '{}' and '{}' overlap",
                        top.name, entry.name
                    )));
                }
            }
            if entry.has_body() {
                open.push(entry);
            }
        }
        Ok(())
    }
}

struct Mirror {
    path: ScopePath,
    kind: BlockKind,
    entry: Option<usize>,
    open: usize,
    unnamed: u32,
}

/// Scan the lexemes and build the block table
pub fn prescan(lexemes: &[Lexeme]) -> Result<BlockTable, Wreck> {
    let mut scanner = PreScanner {
        lexemes,
        stack: vec![Mirror {
            path: ScopePath::root(),
            kind: BlockKind::Namespace,
            entry: None,
            open: 0,
            unnamed: 0,
        }],
        entries: Vec::new(),
        overloads: HashMap::new(),
    };
    scanner.run()?;
    let table = BlockTable::new(scanner.entries);
    table.validate()?;
    debug!("pre-scan found {} declaration blocks", table.len());
    Ok(table)
}

struct PreScanner<'a> {
    lexemes: &'a [Lexeme],
    stack: Vec<Mirror>,
    entries: Vec<BlockEntry>,
    overloads: HashMap<(ScopePath, BlockKind, String), u32>,
}

impl<'a> PreScanner<'a> {
    fn span(
        &self,
        index: usize,
    ) -> Span {
        match self.lexemes.get(index) {
            Some(lexeme) => lexeme.span(index),
            None => self
                .lexemes
                .last()
                .map(|l| l.span(self.lexemes.len() - 1))
                .unwrap_or_else(Span::dummy),
        }
    }

    fn top(&self) -> &Mirror {
        // the root mirror is never popped
        &self.stack[self.stack.len() - 1]
    }

    fn run(&mut self) -> Result<(), Wreck> {
        let mut i = 0;
        while i < self.lexemes.len() {
            let lexeme = &self.lexemes[i];
            if lexeme.is_declaration_keyword() {
                i = self.declaration(i)?;
            } else if lexeme.is_op("{") {
                let top = self.stack.len() - 1;
                let generation = self.stack[top].unnamed;
                self.stack[top].unnamed += 1;
                let path = self.stack[top].path.child(Block::unnamed(generation));
                self.stack.push(Mirror {
                    path,
                    kind: BlockKind::Unnamed,
                    entry: None,
                    open: i,
                    unnamed: 0,
                });
                i += 1;
            } else if lexeme.is_op("}") {
                if self.stack.len() == 1 {
                    return Err(Wreck::at(self.span(i), "unmatched '}'"));
                }
                if let Some(mirror) = self.stack.pop() {
                    if let Some(entry) = mirror.entry {
                        self.entries[entry].body_end = i;
                    }
                }
                i += 1;
            } else {
                i += 1;
            }
        }
        if self.stack.len() > 1 {
            let open = self.top().open;
            return Err(Wreck::at(self.span(open), "missing '}'"));
        }
        Ok(())
    }

    /// Handle the declaration keyword at `keyword`; returns the next index
    fn declaration(
        &mut self,
        keyword: usize,
    ) -> Result<usize, Wreck> {
        let lexemes = self.lexemes;
        let word = lexemes[keyword].text.as_str();
        let kind = match word {
            "namespace" => BlockKind::Namespace,
            "class" => BlockKind::Class,
            "struct" => BlockKind::Struct,
            "interface" => BlockKind::Interface,
            "function" => BlockKind::Function,
            _ => BlockKind::Constructor,
        };

        if self.stack.iter().any(|m| m.kind.is_callable()) {
            return Err(Wreck::at(
                self.span(keyword),
                format!("a {} cannot be declared inside a function body", kind),
            ));
        }
        let parent_kind = self.top().kind;
        if kind == BlockKind::Namespace && parent_kind != BlockKind::Namespace {
            return Err(Wreck::at(
                self.span(keyword),
                "a namespace can only be declared at namespace level",
            ));
        }

        let mut header_start = keyword;
        while header_start > 0 && lexemes[header_start - 1].is_modifier() {
            header_start -= 1;
        }
        if header_start > 0 {
            let before = &lexemes[header_start - 1];
            if !(before.is_op(";") || before.is_op("{") || before.is_op("}")) {
                return Err(Wreck::at(self.span(header_start), "malformed declaration header"));
            }
        }
        let modifiers = lexemes[header_start..keyword]
            .iter()
            .map(|l| l.text.clone())
            .collect();

        let mut j = keyword + 1;
        let name = if kind == BlockKind::Constructor {
            if !parent_kind.is_type() || parent_kind == BlockKind::Interface {
                return Err(Wreck::at(
                    self.span(keyword),
                    "a constructor can only be declared inside a class or struct",
                ));
            }
            self.top().path.last().map(|b| b.name.clone()).unwrap_or_default()
        } else {
            match lexemes.get(j) {
                Some(l) if l.is_identifier() => {
                    j += 1;
                    l.text.clone()
                }
                _ => {
                    return Err(Wreck::at(
                        self.span(j),
                        format!("missing name after '{}'", word),
                    ))
                }
            }
        };

        let mut params = None;
        if kind.is_callable() {
            if !lexemes.get(j).map_or(false, |l| l.is_op("(")) {
                return Err(Wreck::at(
                    self.span(j),
                    format!("expected '(' after '{}'", name),
                ));
            }
            let close = self.matching_paren(j)?;
            params = Some((j, close));
            j = close + 1;
        }

        let mut annotation = None;
        if lexemes.get(j).map_or(false, |l| l.is_op(":")) {
            let start = j + 1;
            let mut k = start;
            let mut depth = 0usize;
            while let Some(l) = lexemes.get(k) {
                if depth == 0 && (l.is_op("{") || l.is_op(";") || l.is_op("}")) {
                    break;
                }
                if l.is_op("(") || l.is_op("[") {
                    depth += 1;
                } else if l.is_op(")") || l.is_op("]") {
                    depth = depth.saturating_sub(1);
                }
                k += 1;
            }
            annotation = Some((start, k));
            j = k;
        }

        let parent = self.top().path.clone();
        let generation = if kind.is_callable() {
            let counter = self
                .overloads
                .entry((parent.clone(), kind, name.clone()))
                .or_insert(0);
            let generation = *counter;
            *counter += 1;
            generation
        } else {
            0
        };
        let scope = parent.child(Block::new(kind, name.clone(), generation));

        let mut entry = BlockEntry {
            scope: scope.clone(),
            kind,
            name,
            modifiers,
            header_start,
            keyword,
            params,
            annotation,
            body_start: j,
            body_end: j,
        };

        match lexemes.get(j) {
            Some(l) if l.is_op("{") => {
                // body_end is patched when the matching brace closes
                entry.body_end = usize::MAX;
                self.entries.push(entry);
                self.stack.push(Mirror {
                    path: scope,
                    kind,
                    entry: Some(self.entries.len() - 1),
                    open: j,
                    unnamed: 0,
                });
                Ok(j + 1)
            }
            Some(l) if l.is_op(";") && kind == BlockKind::Function => {
                self.entries.push(entry);
                Ok(j + 1)
            }
            _ => Err(Wreck::at(
                self.span(j),
                format!("missing body of {} '{}'", kind, entry.name),
            )),
        }
    }

    fn matching_paren(
        &self,
        open: usize,
    ) -> Result<usize, Wreck> {
        let mut depth = 0usize;
        for (k, l) in self.lexemes.iter().enumerate().skip(open) {
            if l.is_op("(") {
                depth += 1;
            } else if l.is_op(")") {
                depth -= 1;
                if depth == 0 {
                    return Ok(k);
                }
            } else if l.is_op("{") || l.is_op("}") || l.is_op(";") {
                break;
            }
        }
        Err(Wreck::at(self.span(open), "missing ')' in parameter list"))
    }
}
