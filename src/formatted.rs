//! Formatted views of an error container.

use std::error::Error as StdError;

use serde::ser::{Serialize, Serializer};

use crate::errors::{self, Error};

/// An [`Error`] whose message was used as a template.
///
/// Created by [`Error::format`]. The rendered message never changes; the
/// origin is kept so that [`crate::is`] matches the unformatted error.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{msg}")]
pub struct Formatted {
    #[source]
    origin: Error,
    msg: String,
}

impl Formatted {
    pub(crate) fn new(origin: Error, msg: String) -> Self {
        Self { origin, msg }
    }

    /// The container this view was rendered from.
    pub fn origin(&self) -> &Error {
        &self.origin
    }

    pub(crate) fn origin_mut(&mut self) -> &mut Error {
        &mut self.origin
    }

    /// Encode the rendered message as a JSON array of its lines.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for Formatted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        errors::serialize_lines(&self.msg, serializer)
    }
}

/// Return the origin of `err` if it is a [`Formatted`] view.
pub fn unformatted<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    err.downcast_ref::<Formatted>().map(Formatted::origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn test_format_renders_template() {
        let err = Error::new("test %v");
        let formatted = err.format(args![2]);
        assert_eq!(formatted.to_string(), "test 2");
        assert_eq!(formatted.origin().to_string(), "test %v");
    }

    #[test]
    fn test_source_is_origin_container() {
        let err = Error::new("user %s not found");
        let formatted = err.format(args!["bob"]);
        let source = formatted.source().unwrap();
        assert!(source.downcast_ref::<Error>().is_some());
    }

    #[test]
    fn test_unformatted() {
        let err = Error::new("code %d");
        let formatted = err.format(args![7]);
        assert_eq!(unformatted(&formatted).unwrap().to_string(), "code %d");
        assert!(unformatted(&err).is_none());
    }

    #[test]
    fn test_formatted_to_json() {
        let formatted = Error::new("a %s\nb").format(args!["x"]);
        assert_eq!(formatted.to_json().unwrap(), r#"["a x","b"]"#);
    }
}
