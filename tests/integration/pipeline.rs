//! Pipeline entry points: configuration, files, lexeme streams, batches

use std::io::Write;
use std::time::{Duration, Instant};

use sylva::frontend::config::ConfigError;
use sylva::frontend::lexer::scan_stream;
use sylva::util::diagnostic::Level;
use sylva::{CompileConfig, Compiler};

const PROGRAM: &str = "namespace Shapes {
    abstract class Shape {
        public abstract function Area() : real;
    }
    class Square : Shape {
        public real side = 2.0;
        public override function Area() : real { return side * side; }
    }
    function Total(params real[] areas) : real {
        real sum = 0.0;
        for (int i = 0; i < areas.length; i++) { sum += areas[i]; }
        return sum;
    }
}";

#[test]
fn test_program_compiles_cleanly() {
    sylva::util::logger::init_debug();
    let output = Compiler::new().compile(PROGRAM);
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    assert!(output.emitted_text.contains("public abstract class Shape"));
    assert!(output.emitted_text.contains("public override double Area()"));
    assert!(output.emitted_text.contains("for (int i = 0; i < areas.Count; i++)"));
}

#[test]
fn test_compilation_is_deterministic() {
    let compiler = Compiler::new();
    let first = compiler.compile(PROGRAM);
    let second = compiler.compile(PROGRAM);
    assert_eq!(first, second);
}

#[test]
fn test_lexeme_stream_matches_source() {
    let compiler = Compiler::new();
    let stream = scan_stream(PROGRAM).unwrap();
    assert_eq!(compiler.compile_lexemes(&stream), compiler.compile(PROGRAM));
}

#[test]
fn test_wreck_empties_emitted_text() {
    let output = Compiler::new().compile("function f() { } }");
    assert!(output.is_wrecked());
    assert!(output.emitted_text.is_empty());
    assert_eq!(output.count(Level::Wreck), 1);
}

#[test]
fn test_nesting_bound_is_a_wreck() {
    let config = CompileConfig::new().with_max_nesting_depth(16);
    let nested = format!("function f() : int {{ return {}1{}; }}", "(".repeat(64), ")".repeat(64));
    let output = Compiler::with_config(config).compile(&nested);
    assert!(output.is_wrecked());
    assert!(output.emitted_text.is_empty());
}

#[test]
fn test_deeply_nested_blocks_stay_linear() {
    const DEPTH: usize = 2_000;
    let source = format!(
        "function f() {{ {}int x = 1;{} }}",
        "{ ".repeat(DEPTH),
        " }".repeat(DEPTH)
    );
    let started = Instant::now();
    let output = Compiler::new().compile(&source);
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    let innermost = format!("\n{}int x = 1;\n", " ".repeat(4 * (DEPTH + 2)));
    assert!(output.emitted_text.contains(&innermost));
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[test]
fn test_deeply_nested_list_literal() {
    const DEPTH: usize = 300;
    let source = format!(
        "function f() {{ var xs = {}1{}; }}",
        "[".repeat(DEPTH),
        "]".repeat(DEPTH)
    );
    let started = Instant::now();
    let output = Compiler::new().compile(&source);
    assert!(output.diagnostics.is_empty(), "{}", output.render_diagnostics());
    assert!(output.emitted_text.contains("new List<int> { 1 }"));
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[test]
fn test_compile_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PROGRAM.as_bytes()).unwrap();
    let output = Compiler::new().compile_file(file.path()).unwrap();
    assert_eq!(output, Compiler::new().compile(PROGRAM));
}

#[test]
fn test_compile_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.sy");
    let err = Compiler::new().compile_file(&missing).unwrap_err();
    assert!(err.to_string().starts_with("failed to read"));
}

#[test]
fn test_compile_many_matches_sequential() {
    let sources = vec![
        "function a() : int { return 1 + 1; }".to_string(),
        "function b() : int { return 1 / 0; }".to_string(),
        PROGRAM.to_string(),
    ];
    let compiler = Compiler::new();
    let batch = compiler.compile_many(&sources);
    let sequential: Vec<_> = sources.iter().map(|s| compiler.compile(s)).collect();
    assert_eq!(batch, sequential);
}

#[test]
fn test_config_from_toml() {
    let config = CompileConfig::from_toml_str(
        "fold_constants = false
         report_warnings = false
         host_module = \"App\"",
    )
    .unwrap();
    assert!(!config.fold_constants);
    assert_eq!(config.indent_width, 4);

    let output = Compiler::with_config(config).compile("function f() : int { return 1 + 2; return 3; }");
    assert_eq!(output.count(Level::Warning), 0);
    assert!(output.emitted_text.starts_with("public static partial class App"));
    assert!(output.emitted_text.contains("return 1 + 2;"));
}

#[test]
fn test_config_rejects_unknown_keys() {
    let result = CompileConfig::from_toml_str("fold = true");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"indent_width = 2\n").unwrap();
    let config = CompileConfig::load(file.path()).unwrap();
    assert_eq!(config.indent_width, 2);
    assert_eq!(config.host_module, "Module");
}

#[test]
fn test_output_json() {
    let output = Compiler::new().compile("function f() : int { return 1 / 0; }");
    let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();
    assert_eq!(json["diagnostics"][0]["level"], "Error");
    assert_eq!(json["diagnostics"][0]["message"], "division by integer zero is forbidden");
}
