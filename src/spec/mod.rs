//! Spec layer
//! - types.rs: Spec variants, operators and normalized names
//! - parser.rs: Command-line spec parser

pub mod parser;
pub mod types;

pub use parser::{parse, parse_name_spec};
pub use types::{Constraint, NameSpec, Operator, Spec, Term};
