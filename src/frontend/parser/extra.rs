//! Resolved-callee payloads
//!
//! Carried between parser tasks and into resolution. The set of shapes is
//! closed; every use site matches it exhaustively.

use crate::frontend::symbols::scope::ScopePath;
use crate::frontend::symbols::types::TypeDescriptor;

#[derive(Debug, Clone, PartialEq)]
pub enum Extra {
    /// Head names a type or namespace; members are accessed statically
    StaticMember(ScopePath),
    /// Local variable or parameter
    Variable {
        name: String,
        ty: TypeDescriptor,
    },
    /// Property of a container
    Property {
        owner: ScopePath,
        name: String,
    },
    /// Candidate functions, identified by their own scope paths
    FunctionOverloads {
        name: String,
        candidates: Vec<ScopePath>,
    },
    /// Candidate constructors of a type
    ConstructorOverloads {
        owner: ScopePath,
        candidates: Vec<ScopePath>,
    },
}
