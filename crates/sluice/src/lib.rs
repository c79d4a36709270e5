//! sluice is a small configuration language: block-structured source text
//! with attributes, nested blocks, and expression-valued fields, evaluated
//! against typed host records.
//!
//! The pipeline runs scanner → parser → AST, after which the AST can be
//! pretty-printed ([`fmt`]) or evaluated into host values ([`Evaluator`]):
//!
//! ```
//! use sluice::{parse_file, record, Evaluator, Scope};
//!
//! record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Config {
//!         pub listen: String => (attr "listen"),
//!         pub workers: Option<u32> => (attr optional "workers"),
//!     }
//! }
//!
//! let file = parse_file("example.slc", b"listen = \"0.0.0.0:80\"\n").unwrap();
//! let mut config = Config::default();
//! Evaluator::new(&file)
//!     .evaluate_into(&Scope::new(), &mut config)
//!     .unwrap();
//! assert_eq!(config.listen, "0.0.0.0:80");
//! ```

pub use sluice_ast as ast;
pub use sluice_diag::{Error, ErrorList};
pub use sluice_eval::{stdlib, Evaluator, Node, Scope};
pub use sluice_fmt as fmt;
pub use sluice_syntax::{parse_expression, parse_file};
pub use sluice_value as value;

// The record derivation macros are exported from `sluice-value`; re-export
// them so hosts can depend on this crate alone.
pub use sluice_value::{impl_capsule, impl_from_text, record};
pub use sluice_value::{
    BlockSlot, FromText, FromValue, FunctionValue, Kind, Record, ToValue, Value,
};
