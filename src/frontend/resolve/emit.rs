//! 宿主文本生成
//!
//! Containers assemble the host text of their members: types are emitted
//! as they are, free functions and namespace properties are gathered into a
//! `public static partial class` named by `host_module`.

use super::{Resolution, Resolver};
use crate::frontend::parser::{BranchId, Label};
use crate::frontend::symbols::scope::BlockKind;
use crate::frontend::symbols::{Modifiers, Visibility};
use crate::util::diagnostic::Wreck;

/// Runtime helper emitted into the auxiliary declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Helper {
    /// real `**`
    Pow,
    /// integer `**`
    IntPow,
    /// `string * int`
    Repeat,
    /// `list + list`
    Concat,
}

impl Helper {
    pub fn declaration(&self) -> &'static str {
        match self {
            Helper::Pow => "public static double Pow(double a, double b)\n{\n    return Math.Pow(a, b);\n}",
            Helper::IntPow => concat!(
                "public static long IntPow(long a, long b)\n{\n",
                "    long result = 1;\n",
                "    while (b > 0)\n    {\n",
                "        if ((b & 1) == 1) result *= a;\n",
                "        a *= a;\n",
                "        b >>= 1;\n",
                "    }\n",
                "    return result;\n}"
            ),
            Helper::Repeat => concat!(
                "public static string Repeat(string s, long n)\n{\n",
                "    var builder = new System.Text.StringBuilder();\n",
                "    for (long i = 0; i < n; i++) builder.Append(s);\n",
                "    return builder.ToString();\n}"
            ),
            Helper::Concat => concat!(
                "public static List<T> Concat<T>(List<T> a, List<T> b)\n{\n",
                "    var result = new List<T>(a);\n",
                "    result.AddRange(b);\n",
                "    return result;\n}"
            ),
        }
    }
}

/// Opens one indentation level in intermediate host text
const INDENT: char = '\u{1}';
/// Closes the level opened by `INDENT`
const DEDENT: char = '\u{2}';

/// Mark `text` one level deeper; `layout` turns the marks into spaces
pub(super) fn indent(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(INDENT);
    out.push_str(text);
    out.push(DEDENT);
    out
}

/// `header\n{\n    body\n}`
pub(super) fn braced(
    header: &str,
    body: &str,
) -> String {
    let mut out = String::with_capacity(header.len() + body.len() + 8);
    if !header.is_empty() {
        out.push_str(header);
        out.push('\n');
    }
    out.push('{');
    if !body.trim().is_empty() {
        out.push('\n');
        out.push_str(&indent(body));
    }
    out.push_str("\n}");
    out
}

/// Expand indentation marks: every non-empty line gets `width` spaces per
/// open level. Literal text never carries the marks (control characters are
/// escaped in host literals).
pub(super) fn layout(
    text: &str,
    width: usize,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut line_start = true;
    for c in text.chars() {
        match c {
            INDENT => depth += 1,
            DEDENT => depth = depth.saturating_sub(1),
            '\n' => {
                out.push('\n');
                line_start = true;
            }
            c => {
                if line_start {
                    out.extend(std::iter::repeat(' ').take(depth * width));
                    line_start = false;
                }
                out.push(c);
            }
        }
    }
    out
}

/// Host modifier words of a member
pub(super) fn host_modifiers(
    modifiers: &Modifiers,
    container: Option<BlockKind>,
) -> String {
    if container == Some(BlockKind::Interface) {
        return String::new();
    }
    let mut words = vec![match modifiers.visibility {
        Visibility::Public => "public",
        Visibility::Protected => "protected",
        Visibility::Private => "private",
    }];
    let free = !container.map_or(false, |k| k.is_type());
    if free || modifiers.is_static {
        words.push("static");
    }
    if modifiers.is_new {
        words.push("new");
    }
    if modifiers.is_abstract {
        words.push("abstract");
    }
    if modifiers.is_virtual {
        words.push("virtual");
    }
    if modifiers.is_sealed && modifiers.is_override {
        words.push("sealed");
    }
    if modifiers.is_override {
        words.push("override");
    }
    let mut text = words.join(" ");
    text.push(' ');
    text
}

impl<'c> Resolver<'c> {
    /// Declarations and module members of a container, each in source order
    fn members(
        &mut self,
        items: &[BranchId],
    ) -> (Vec<String>, Vec<String>) {
        let mut declarations = Vec::new();
        let mut module = Vec::new();
        for item in items {
            let label = self.tree.get(*item).label;
            let code = self.take_code(*item);
            if code.is_empty() {
                continue;
            }
            match label {
                Label::Namespace | Label::Class | Label::Struct | Label::Interface => declarations.push(code),
                Label::Function | Label::Constructor | Label::Property => module.push(code),
                _ => {}
            }
        }
        (declarations, module)
    }

    /// Types followed by the host module class
    fn container_text(
        &mut self,
        items: &[BranchId],
    ) -> String {
        let (mut parts, module) = self.members(items);
        if !module.is_empty() {
            let header = format!("public static partial class {}", self.config.host_module);
            parts.push(braced(&header, &module.join("\n\n")));
        }
        parts.join("\n\n")
    }

    pub(super) fn program(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        let tree = self.tree;
        let code = self.container_text(tree.children(id));
        Resolution::statement(code, false)
    }

    pub(super) fn namespace(
        &mut self,
        id: BranchId,
    ) -> Resolution {
        let tree = self.tree;
        let branch = tree.get(id);
        let body = self.container_text(&branch.children);
        let code = braced(&format!("namespace {}", branch.text), &body);
        Resolution::statement(code, false)
    }

    /// `Class`, `Struct` or `Interface`: `[Modifiers, base | Empty, members...]`
    pub(super) fn type_declaration(
        &mut self,
        id: BranchId,
    ) -> Result<Resolution, Wreck> {
        let tree = self.tree;
        let branch = tree.get(id);
        let path = tree.scope(branch.scope);
        let base = self.child(id, 1)?;
        let info = self
            .symbols
            .type_info(path)
            .ok_or_else(|| Wreck::internal(format!("type '{}' was never registered", path)))?;

        let mut header = String::new();
        if path.parent().map_or(false, |p| p.last().map_or(false, |b| b.kind.is_type())) {
            header.push_str(&host_modifiers(&info.modifiers, Some(BlockKind::Class)));
        } else {
            header.push_str("public ");
        }
        if branch.label == Label::Class {
            if info.modifiers.is_abstract {
                header.push_str("abstract ");
            }
            if info.modifiers.is_sealed {
                header.push_str("sealed ");
            }
        }
        header.push_str(match branch.label {
            Label::Struct => "struct ",
            Label::Interface => "interface ",
            _ => "class ",
        });
        header.push_str(&branch.text);
        if tree.get(base).label != Label::Empty {
            if let Some(base) = &info.base {
                header.push_str(" : ");
                header.push_str(&base.dotted());
            }
        }

        // 嵌套类型与成员保持源码顺序
        let mut members = Vec::new();
        for item in branch.children.get(2..).unwrap_or(&[]) {
            let code = self.take_code(*item);
            if !code.is_empty() {
                members.push(code);
            }
        }
        Ok(Resolution::statement(braced(&header, &members.join("\n\n")), false))
    }

    /// `public static class Runtime` holding the helpers the program used
    pub(super) fn auxiliary_declarations(&self) -> String {
        if self.helpers.is_empty() {
            return String::new();
        }
        let mut helpers: Vec<Helper> = self.helpers.iter().copied().collect();
        helpers.sort();
        let body = helpers
            .iter()
            .map(Helper::declaration)
            .collect::<Vec<_>>()
            .join("\n\n");
        layout(&braced("public static class Runtime", &body), self.config.indent_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(layout(&indent("a\n\nb"), 2), "  a\n\n  b");
    }

    #[test]
    fn test_braced_empty_body() {
        assert_eq!(layout(&braced("class A", ""), 4), "class A\n{\n}");
        assert_eq!(layout(&braced("", "x;"), 4), "{\n    x;\n}");
    }

    #[test]
    fn test_layout_nests_levels() {
        let inner = braced("while (true)", "x++;");
        let outer = braced("void f()", &inner);
        assert_eq!(
            layout(&outer, 2),
            "void f()\n{\n  while (true)\n  {\n    x++;\n  }\n}"
        );
    }

    #[test]
    fn test_free_members_are_static() {
        let modifiers = Modifiers::from_words(["private"], None);
        assert_eq!(host_modifiers(&modifiers, None), "private static ");
        let member = Modifiers::from_words(["public", "override"], Some(BlockKind::Class));
        assert_eq!(host_modifiers(&member, Some(BlockKind::Class)), "public override ");
        let interface = Modifiers::from_words([], Some(BlockKind::Interface));
        assert_eq!(host_modifiers(&interface, Some(BlockKind::Interface)), "");
    }
}
