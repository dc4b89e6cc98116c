//! Regular expression subsystem of the mjs engine: pattern compilation,
//! per-instance cursor state, and the RegExp built-in surface (literal
//! scanning, constructor, prototype methods and accessors).

pub mod error;
pub mod lexer;
pub mod number;
pub mod object;
pub mod regexp;
pub mod types;

pub use error::{VmError, VmResult};
pub use lexer::Lexer;
pub use object::RtObject;
pub use regexp::{Pattern, RegExp, RegExpFlags, Vm};
pub use types::{CharKind, RtString, Value};
