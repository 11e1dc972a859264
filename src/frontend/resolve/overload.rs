//! 重载决议
//!
//! Each candidate is ranked per argument (Exact < Widening < Narrowing).
//! A candidate wins when it is at least as good on every argument and
//! strictly better on one. Ties where exactly one candidate needs no
//! narrowing pick that one with a warning; other ties are errors.

use std::cmp::Ordering;
use std::fmt;

use super::conversions::classify;
use super::{Resolution, Resolver};
use crate::frontend::symbols::scope::ScopePath;
use crate::frontend::symbols::types::{Conversion, TypeDescriptor};
use crate::frontend::symbols::{FunctionInfo, SymbolTables};
use crate::util::span::Span;

/// How the arguments map onto a candidate's parameters
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Ranking {
    pub conversions: Vec<Conversion>,
    /// Parameter type per argument
    pub targets: Vec<TypeDescriptor>,
    /// Trailing arguments are packed into the `params` list
    pub expanded: bool,
}

impl Ranking {
    fn fully_compatible(&self) -> bool {
        self.conversions.iter().all(|c| *c <= Conversion::Widening)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum OverloadResolution {
    Best(ScopePath, Ranking),
    /// Tie broken in favour of the only candidate without narrowing
    Preferred {
        chosen: ScopePath,
        ranking: Ranking,
        rivals: Vec<ScopePath>,
    },
    Ambiguous(Vec<ScopePath>),
    NoMatch,
}

impl fmt::Display for OverloadResolution {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            OverloadResolution::Best(path, _) => write!(f, "best {}", path),
            OverloadResolution::Preferred { chosen, rivals, .. } => {
                write!(f, "preferred {} over {} rival(s)", chosen, rivals.len())
            }
            OverloadResolution::Ambiguous(paths) => write!(f, "ambiguous between {} candidates", paths.len()),
            OverloadResolution::NoMatch => f.write_str("no match"),
        }
    }
}

/// Rank `args` against one candidate; `None` when it cannot be called
pub(super) fn rank(
    symbols: &SymbolTables,
    info: &FunctionInfo,
    args: &[Resolution],
) -> Option<Ranking> {
    if !info.accepts_arity(args.len()) {
        return None;
    }
    let fixed = if info.is_variadic() {
        info.params.len() - 1
    } else {
        info.params.len()
    };

    let direct = direct_ranking(symbols, info, args);
    if let Some(direct) = &direct {
        if !info.is_variadic() || direct.conversions.iter().all(|c| *c != Conversion::Incompatible) {
            return compatible(direct.clone());
        }
    }
    if !info.is_variadic() {
        return None;
    }

    let rest = info.params.last()?;
    let element = rest.ty.element().cloned().unwrap_or_else(TypeDescriptor::unknown);
    let targets: Vec<TypeDescriptor> = (0..args.len())
        .map(|i| if i < fixed { info.params[i].ty.clone() } else { element.clone() })
        .collect();
    compatible(Ranking {
        conversions: convert_all(symbols, args, &targets),
        targets,
        expanded: true,
    })
}

/// Arguments matched one-to-one with the leading parameters
fn direct_ranking(
    symbols: &SymbolTables,
    info: &FunctionInfo,
    args: &[Resolution],
) -> Option<Ranking> {
    if args.len() > info.params.len() {
        return None;
    }
    if info.is_variadic() && args.len() < info.params.len() {
        return None;
    }
    let targets: Vec<TypeDescriptor> = info.params[..args.len()].iter().map(|p| p.ty.clone()).collect();
    Some(Ranking {
        conversions: convert_all(symbols, args, &targets),
        targets,
        expanded: false,
    })
}

fn convert_all(
    symbols: &SymbolTables,
    args: &[Resolution],
    targets: &[TypeDescriptor],
) -> Vec<Conversion> {
    args.iter()
        .zip(targets)
        .map(|(arg, target)| classify(symbols, &arg.ty, arg.value.as_ref(), target))
        .collect()
}

fn compatible(ranking: Ranking) -> Option<Ranking> {
    if ranking.conversions.iter().any(|c| *c == Conversion::Incompatible) {
        None
    } else {
        Some(ranking)
    }
}

/// Compare two conversions of the same argument; `Less` is better.
///
/// Two widening conversions are ordered by their targets: the target that
/// converts implicitly to the other one is the better one.
fn compare_argument(
    symbols: &SymbolTables,
    a: (Conversion, &TypeDescriptor),
    b: (Conversion, &TypeDescriptor),
) -> Ordering {
    match a.0.cmp(&b.0) {
        Ordering::Equal if a.0 == Conversion::Widening && a.1 != b.1 => {
            let forward = classify(symbols, a.1, None, b.1) <= Conversion::Widening;
            let backward = classify(symbols, b.1, None, a.1) <= Conversion::Widening;
            match (forward, backward) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        }
        other => other,
    }
}

/// `a` is at least as good on every argument and better on one
fn dominates(
    symbols: &SymbolTables,
    a: &Ranking,
    b: &Ranking,
) -> bool {
    let mut better = false;
    for i in 0..a.conversions.len() {
        match compare_argument(
            symbols,
            (a.conversions[i], &a.targets[i]),
            (b.conversions[i], &b.targets[i]),
        ) {
            Ordering::Greater => return false,
            Ordering::Less => better = true,
            Ordering::Equal => {}
        }
    }
    // 参数同样好时，不需要展开 params 的候选更优
    better || (!a.expanded && b.expanded)
}

/// Pick the best candidate for `args`
pub(super) fn select(
    symbols: &SymbolTables,
    candidates: &[&FunctionInfo],
    args: &[Resolution],
) -> OverloadResolution {
    let ranked: Vec<(&FunctionInfo, Ranking)> = candidates
        .iter()
        .filter_map(|info| rank(symbols, info, args).map(|r| (*info, r)))
        .collect();
    if ranked.is_empty() {
        return OverloadResolution::NoMatch;
    }
    let best: Vec<&(&FunctionInfo, Ranking)> = ranked
        .iter()
        .filter(|(info, ranking)| {
            !ranked
                .iter()
                .any(|(other, theirs)| other.path != info.path && dominates(symbols, theirs, ranking))
        })
        .collect();
    match best.as_slice() {
        [] => OverloadResolution::Ambiguous(ranked.iter().map(|(i, _)| i.path.clone()).collect()),
        [(info, ranking)] => OverloadResolution::Best(info.path.clone(), ranking.clone()),
        many => {
            let compatible: Vec<_> = many.iter().filter(|(_, r)| r.fully_compatible()).collect();
            match compatible.as_slice() {
                [(info, ranking)] => OverloadResolution::Preferred {
                    chosen: info.path.clone(),
                    ranking: ranking.clone(),
                    rivals: many
                        .iter()
                        .filter(|(other, _)| other.path != info.path)
                        .map(|(other, _)| other.path.clone())
                        .collect(),
                },
                _ => OverloadResolution::Ambiguous(many.iter().map(|(i, _)| i.path.clone()).collect()),
            }
        }
    }
}

impl<'c> Resolver<'c> {
    /// Resolve a call against `candidates`, reporting failures.
    ///
    /// `name` is the method name used in diagnostics.
    pub(super) fn choose_overload(
        &mut self,
        name: &str,
        candidates: &[ScopePath],
        args: &[Resolution],
        span: Span,
    ) -> Option<(FunctionInfo, Ranking)> {
        let infos: Vec<&FunctionInfo> = candidates.iter().filter_map(|p| self.symbols.function(p)).collect();
        let outcome = select(self.symbols, &infos, args);
        tracing::trace!("overload '{}' with {} argument(s): {}", name, args.len(), outcome);
        match outcome {
            OverloadResolution::Best(path, ranking) => {
                let info = self.symbols.function(&path)?.clone();
                Some((info, ranking))
            }
            OverloadResolution::Preferred {
                chosen,
                ranking,
                rivals,
            } => {
                let info = self.symbols.function(&chosen)?.clone();
                let rival = rivals
                    .first()
                    .and_then(|p| self.symbols.function(p))
                    .map(|f| f.display_signature())
                    .unwrap_or_default();
                let chosen_text = info.display_signature();
                self.warning(
                    span,
                    format!(
                        "the call is ambiguous between '{}' and '{}'; '{}' was chosen",
                        chosen_text, rival, chosen_text
                    ),
                );
                Some((info, ranking))
            }
            OverloadResolution::Ambiguous(paths) => {
                let names: Vec<String> = paths
                    .iter()
                    .take(2)
                    .filter_map(|p| self.symbols.function(p))
                    .map(|f| f.display_signature())
                    .collect();
                self.error(
                    span,
                    format!("the call is ambiguous between '{}'", names.join("' and '")),
                );
                None
            }
            OverloadResolution::NoMatch => {
                let message = self.no_match_message(name, &infos, args);
                self.error(span, message);
                None
            }
        }
    }

    fn no_match_message(
        &self,
        name: &str,
        infos: &[&FunctionInfo],
        args: &[Resolution],
    ) -> String {
        let by_arity: Vec<&&FunctionInfo> = infos.iter().filter(|f| f.accepts_arity(args.len())).collect();
        if by_arity.is_empty() {
            return format!("no overload for method '{}' takes {} arguments", name, args.len());
        }
        if let [only] = by_arity.as_slice() {
            let targets: Vec<&TypeDescriptor> = only
                .params
                .iter()
                .map(|p| match (p.variadic, p.ty.element()) {
                    (true, Some(element)) if args.len() != only.params.len() => element,
                    _ => &p.ty,
                })
                .collect();
            for (i, arg) in args.iter().enumerate() {
                let target = match targets.get(i).or_else(|| targets.last()) {
                    Some(target) => *target,
                    None => break,
                };
                if classify(self.symbols, &arg.ty, arg.value.as_ref(), target) == Conversion::Incompatible {
                    return format!("argument {}: cannot convert from '{}' to '{}'", i + 1, arg.ty, target);
                }
            }
        }
        let types: Vec<String> = args.iter().map(|a| a.ty.to_string()).collect();
        format!("no overload of '{}' matches the argument types ({})", name, types.join(", "))
    }
}
