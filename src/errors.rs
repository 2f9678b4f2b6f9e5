//! The error container and the causes it holds.
//!
//! [`Error`] wraps exactly one [`Cause`]. Wrapping adds a context message in
//! front of an existing cause; joining aggregates several causes into a single
//! [`Joined`] node. Every cause stays reachable through [`crate::chain`].

use std::error::Error as StdError;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::constants;
use crate::formatted::Formatted;
use crate::template::{self, Arg};

/// Shared handle to any error.
///
/// Two causes are the same error when they point at the same allocation.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Leaf cause created from a plain message.
#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub(crate) struct Message(pub(crate) String);

/// Error container.
///
/// Cloning is cheap and keeps the identity of the underlying cause, so a clone
/// still matches the original in [`crate::is`].
#[derive(Clone)]
pub struct Error {
    inner: Cause,
}

impl Error {
    /// Create an error holding `message` verbatim.
    ///
    /// No template substitution is applied, so `%` characters are kept as is.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_cause(Arc::new(Message(message.into())))
    }

    /// Create an error from a printf-style template.
    ///
    /// Substitution happens immediately; see [`crate::template::sprintf`] for
    /// the supported verbs and the diagnostics embedded for malformed input.
    pub fn newf(template: &str, args: &[Arg]) -> Self {
        Self::new(template::sprintf(template, args))
    }

    /// Add context to an error.
    ///
    /// If `err` is absent the result holds just `message`. Otherwise the result
    /// is a join of `message` and the cause, in that order. A container passed
    /// as `err` is unwrapped one level first so containers never nest.
    ///
    /// # Arguments
    ///
    /// * `err` - The cause, or an absent slot such as `None`
    /// * `message` - The context message placed in front of the cause
    ///
    /// # Example
    ///
    /// ```
    /// use errwrap::Error;
    ///
    /// let base = Error::new("connection refused");
    /// let err = Error::wrap(base.clone(), "loading profile");
    /// assert_eq!(err.to_string(), "loading profile\nconnection refused");
    /// assert!(errwrap::is(&err, &base));
    ///
    /// let bare = Error::wrap(None::<Error>, "loading profile");
    /// assert_eq!(bare.to_string(), "loading profile");
    /// ```
    pub fn wrap(err: impl IntoCause, message: impl Into<String>) -> Self {
        Self::wrap_message(err.into_cause(), message.into())
    }

    /// Same as [`Error::wrap`], with the message built from a template.
    pub fn wrapf(err: impl IntoCause, template: &str, args: &[Arg]) -> Self {
        Self::wrap_message(err.into_cause(), template::sprintf(template, args))
    }

    /// Join several errors into one container.
    ///
    /// Absent entries are skipped. Containers are kept as they are, so they can
    /// still be found with [`crate::find`].
    pub fn join<I>(errors: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoCause,
    {
        let errs = errors
            .into_iter()
            .filter_map(IntoCause::into_cause)
            .collect();
        Self::from_cause(Arc::new(Joined { errs }))
    }

    /// Apply printf-style substitution to this error's message.
    ///
    /// The result matches this error in [`crate::is`].
    pub fn format(&self, args: &[Arg]) -> Formatted {
        Formatted::new(self.clone(), template::sprintf(&self.to_string(), args))
    }

    /// The underlying cause.
    pub fn cause(&self) -> &(dyn StdError + 'static) {
        upcast(&self.inner)
    }

    /// Encode the message as a JSON array of its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if `serde_json` fails to write the array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Same as [`Error::to_json`], returning bytes.
    pub fn to_json_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn from_cause(inner: Cause) -> Self {
        Self { inner }
    }

    fn wrap_message(cause: Option<Cause>, message: String) -> Self {
        let context: Cause = Arc::new(Message(message));
        match cause {
            None => Self::from_cause(context),
            Some(cause) => Self::from_cause(Arc::new(Joined {
                errs: vec![context, strip_container(cause)],
            })),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

// Flat over the rendered message, whatever the chain depth.
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Error").field(&self.to_string()).finish()
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause())
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_lines(&self.to_string(), serializer)
    }
}

impl<'de> Deserialize<'de> for Error {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let lines = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::new(lines.join(constants::json::LINE_SEPARATOR_STR)))
    }
}

pub(crate) fn serialize_lines<S: Serializer>(
    message: &str,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(message.split(constants::json::LINE_SEPARATOR))
}

/// Several independent causes aggregated into one node.
///
/// The message is the message of every cause, one per line, in join order.
pub struct Joined {
    errs: Vec<Cause>,
}

impl Joined {
    /// The joined causes, in order.
    pub fn errors(&self) -> &[Cause] {
        &self.errs
    }
}

// Rendered with an explicit stack: wrapped chains nest one `Joined` per level.
impl fmt::Display for Joined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack: Vec<&(dyn StdError + 'static)> =
            self.errs.iter().rev().map(upcast).collect();
        let mut first = true;
        while let Some(node) = stack.pop() {
            if let Some(joined) = node.downcast_ref::<Joined>() {
                stack.extend(joined.errs.iter().rev().map(upcast));
                continue;
            }
            if let Some(container) = node.downcast_ref::<Error>() {
                stack.push(container.cause());
                continue;
            }
            if !first {
                f.write_char(constants::chain::JOIN_SEPARATOR)?;
            }
            first = false;
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Joined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errs.iter().map(ToString::to_string).collect();
        f.debug_tuple("Joined").field(&messages).finish()
    }
}

impl StdError for Joined {}

// Unlinks uniquely owned nested causes before they drop, so dropping a deep
// chain does not recurse once per level. Containers and formatted views hand
// over their cause in exchange for a shared empty leaf.
impl Drop for Joined {
    fn drop(&mut self) {
        if self.errs.is_empty() {
            return;
        }
        let vacant: Cause = Arc::new(Message(String::new()));
        let mut pending = std::mem::take(&mut self.errs);
        while let Some(mut cause) = pending.pop() {
            let Some(node) = Arc::get_mut(&mut cause) else {
                continue;
            };
            let container = if let Some(joined) = node.downcast_mut::<Joined>() {
                pending.append(&mut joined.errs);
                None
            } else if node.is::<Formatted>() {
                node.downcast_mut::<Formatted>().map(Formatted::origin_mut)
            } else {
                node.downcast_mut::<Error>()
            };
            if let Some(container) = container {
                pending.push(std::mem::replace(&mut container.inner, vacant.clone()));
            }
        }
    }
}

/// Conversion into an optional [`Cause`].
///
/// `None` means the error slot is absent.
pub trait IntoCause {
    fn into_cause(self) -> Option<Cause>;
}

impl IntoCause for Cause {
    fn into_cause(self) -> Option<Cause> {
        Some(self)
    }
}

impl IntoCause for Error {
    fn into_cause(self) -> Option<Cause> {
        Some(Arc::new(self))
    }
}

impl IntoCause for Formatted {
    fn into_cause(self) -> Option<Cause> {
        Some(Arc::new(self))
    }
}

impl<T: StdError + Send + Sync + 'static> IntoCause for Arc<T> {
    fn into_cause(self) -> Option<Cause> {
        Some(self)
    }
}

impl<T: StdError + Send + Sync + 'static> IntoCause for Box<T> {
    fn into_cause(self) -> Option<Cause> {
        Some(Arc::from(self as Box<dyn StdError + Send + Sync>))
    }
}

impl IntoCause for Box<dyn StdError + Send + Sync + 'static> {
    fn into_cause(self) -> Option<Cause> {
        Some(Arc::from(self))
    }
}

impl IntoCause for anyhow::Error {
    fn into_cause(self) -> Option<Cause> {
        Some(Arc::from(Box::<dyn StdError + Send + Sync>::from(self)))
    }
}

impl<T: IntoCause> IntoCause for Option<T> {
    fn into_cause(self) -> Option<Cause> {
        self.and_then(IntoCause::into_cause)
    }
}

pub(crate) fn upcast(cause: &Cause) -> &(dyn StdError + 'static) {
    &**cause
}

fn strip_container(cause: Cause) -> Cause {
    if let Some(container) = cause.downcast_ref::<Error>() {
        return container.inner.clone();
    }
    cause
}
