//! # errwrap
//!
//! Context wrapping and chain matching on top of `std::error::Error`.
//!
//! This library provides:
//! - An error container that adds context in front of a cause without nesting
//! - Joins of several causes, each of which stays matchable
//! - Printf-style templates, applied when an error is built or afterwards
//! - JSON encoding of error messages as an array of lines
//! - Detection of absent error handles, including typed null raw pointers
//!
//! ## Modules
//!
//! - [`errors`] - The error container and cause types
//! - [`formatted`] - Formatted views of an error
//! - [`chain`] - Chain traversal: unwrap, is, find
//! - [`template`] - Printf-style substitution
//! - [`absent`] - Absent error detection
//! - [`constants`] - Diagnostic markers and separators
//!
//! ## Example
//!
//! ```
//! use errwrap::{args, Error};
//!
//! let not_found = Error::new("user %s not found");
//! let err = Error::wrap(not_found.format(args!["ann"]), "loading session");
//!
//! assert_eq!(err.to_string(), "loading session\nuser ann not found");
//! assert_eq!(err.to_json().unwrap(), r#"["loading session","user ann not found"]"#);
//! assert!(errwrap::is(&err, &not_found));
//! ```

pub mod absent;
pub mod chain;
pub mod constants;
mod context;
pub mod errors;
pub mod formatted;
pub mod template;

pub use absent::is_absent;
pub use chain::{causes, find, is, unwrap};
pub use context::ResultExt;
pub use errors::{Cause, Error, IntoCause, Joined};
pub use formatted::{unformatted, Formatted};
pub use template::Arg;
