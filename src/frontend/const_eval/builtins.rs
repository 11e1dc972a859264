//! 内置数学函数
//!
//! All built-ins are multiconst: they take and return `real`, fold on literal
//! arguments and emit `Math.*` calls otherwise.

use super::value::Value;
use super::FoldError;

/// Built-in function signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    /// Host call target
    pub host: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin { name: "sqrt", arity: 1, host: "Math.Sqrt" },
    Builtin { name: "sin", arity: 1, host: "Math.Sin" },
    Builtin { name: "cos", arity: 1, host: "Math.Cos" },
    Builtin { name: "tan", arity: 1, host: "Math.Tan" },
    Builtin { name: "asin", arity: 1, host: "Math.Asin" },
    Builtin { name: "acos", arity: 1, host: "Math.Acos" },
    Builtin { name: "atan", arity: 1, host: "Math.Atan" },
    Builtin { name: "exp", arity: 1, host: "Math.Exp" },
    Builtin { name: "log", arity: 1, host: "Math.Log" },
    Builtin { name: "log10", arity: 1, host: "Math.Log10" },
    Builtin { name: "abs", arity: 1, host: "Math.Abs" },
    Builtin { name: "floor", arity: 1, host: "Math.Floor" },
    Builtin { name: "ceil", arity: 1, host: "Math.Ceiling" },
    Builtin { name: "round", arity: 1, host: "Math.Round" },
    Builtin { name: "pow", arity: 2, host: "Math.Pow" },
    Builtin { name: "min", arity: 2, host: "Math.Min" },
    Builtin { name: "max", arity: 2, host: "Math.Max" },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// Evaluate a built-in on literal arguments
pub fn call(
    name: &str,
    args: &[Value],
) -> Result<Value, FoldError> {
    let builtin = lookup(name).ok_or_else(|| FoldError::Unsupported(format!("unknown built-in '{}'", name)))?;
    if args.len() != builtin.arity {
        return Err(FoldError::Unsupported(format!(
            "'{}' takes {} argument(s)",
            name, builtin.arity
        )));
    }
    for arg in args {
        if !arg.kind().is_numeric() {
            return Err(FoldError::InvalidOperands {
                op: name.to_string(),
                left: arg.ty.to_string(),
                right: String::new(),
            });
        }
    }
    let x = args[0].to_real();
    let domain = || FoldError::Domain(name.to_string());
    let result = match name {
        "sqrt" if x < 0.0 => return Err(domain()),
        "sqrt" => x.sqrt(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "asin" | "acos" if !(-1.0..=1.0).contains(&x) => return Err(domain()),
        "asin" => x.asin(),
        "acos" => x.acos(),
        "atan" => x.atan(),
        "exp" => x.exp(),
        "log" | "log10" if x <= 0.0 => return Err(domain()),
        "log" => x.ln(),
        "log10" => x.log10(),
        "abs" => x.abs(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "round" => round_half_even(x),
        "pow" => x.powf(args[1].to_real()),
        "min" => x.min(args[1].to_real()),
        _ => x.max(args[1].to_real()),
    };
    if result.is_nan() && args.iter().all(|a| !a.to_real().is_nan()) {
        return Err(domain());
    }
    Ok(Value::real(result))
}

/// Banker's rounding, matching the host's default `Math.Round`
fn round_half_even(x: f64) -> f64 {
    let r = x.round();
    if (x - x.trunc()).abs() == 0.5 && r % 2.0 != 0.0 {
        r - x.signum()
    } else {
        r
    }
}
