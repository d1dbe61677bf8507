//! Records
//!
//!     A best-effort structural read of preprocessed WML: `[tag]...[/tag]` blocks
//!     become [RecordNode]s and `key=value` lines their attributes. It is enough to
//!     pull unit types and similar blocks out of a preprocessed tree and export them
//!     as a table; it is not a validating WML parser.

pub mod extract;
pub mod node;
pub mod tabular;
pub mod value;

pub use extract::extract_records;
pub use node::RecordNode;
pub use tabular::RecordTable;
pub use value::{AttributeValue, RecordError};
