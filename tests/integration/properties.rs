//! Property tests over the whole pipeline

use proptest::prelude::*;
use quickcheck_macros::quickcheck;
use sylva::frontend::symbols::types::{promote, Primitive};
use sylva::{compile, CompileConfig, Compiler};

const LATTICE: [Primitive; 11] = [
    Primitive::Bool,
    Primitive::SByte,
    Primitive::Byte,
    Primitive::Short,
    Primitive::UShort,
    Primitive::Int,
    Primitive::UInt,
    Primitive::Long,
    Primitive::ULong,
    Primitive::Char,
    Primitive::Real,
];

fn lattice() -> impl Strategy<Value = Primitive> {
    (0..LATTICE.len()).prop_map(|i| LATTICE[i])
}

fn folded(expression: &str) -> String {
    let output = compile(&format!("function f() : long {{ return {}; }}", expression));
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    let start = output
        .emitted_text
        .find("return ")
        .expect("emitted return statement")
        + "return ".len();
    let end = output.emitted_text[start..].find(';').expect("statement end") + start;
    output.emitted_text[start..end].to_string()
}

proptest! {
    #[test]
    fn prop_promotion_is_symmetric(a in lattice(), b in lattice()) {
        prop_assert_eq!(promote(a, b), promote(b, a));
    }

    #[test]
    fn prop_integer_folding_is_sound(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        let sum = folded(&format!("{}L + ({}L)", a, b));
        prop_assert_eq!(sum, format!("{}L", a + b));
        let product = folded(&format!("{}L * ({}L)", a, b));
        prop_assert_eq!(product, format!("{}L", a * b));
    }

    #[test]
    fn prop_compilation_is_deterministic(values in proptest::collection::vec(0i32..100, 1..8)) {
        let body: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("int v{} = {} * {};", i, v, i))
            .collect();
        let source = format!("function f() {{ {} }}", body.join(" "));
        let compiler = Compiler::with_config(CompileConfig::new());
        prop_assert_eq!(compiler.compile(&source), compiler.compile(&source));
    }

    #[test]
    fn prop_deep_nesting_folds(depth in 1usize..300) {
        let expression = format!("{}1{}", "(".repeat(depth), " + 1)".repeat(depth));
        let output = compile(&format!("function f() : int {{ return {}; }}", expression));
        prop_assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
        let expected = format!("return {};", depth + 1);
        prop_assert!(output.emitted_text.contains(&expected));
    }
}

#[quickcheck]
fn qc_int_literals_survive(n: i32) -> bool {
    if n == i32::MIN {
        return true;
    }
    let literal = if n < 0 {
        format!("({})", n)
    } else {
        n.to_string()
    };
    let output = compile(&format!("function f() : int {{ return {}; }}", literal));
    output.diagnostics.is_empty() && output.emitted_text.contains(&format!("return {};", n))
}

#[quickcheck]
fn qc_string_literals_survive(words: Vec<u8>) -> bool {
    let text: String = words.iter().map(|b| char::from(b'a' + b % 26)).collect();
    let output = compile(&format!("function f() : string {{ return \"{}\" + \"\"; }}", text));
    output.diagnostics.is_empty() && output.emitted_text.contains(&format!("return \"{}\";", text))
}
