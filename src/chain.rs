//! Error chain traversal and matching.
//!
//! A chain is a tree: containers and formatted views have one cause, a
//! [`Joined`] node has several, and any other error continues through
//! [`std::error::Error::source`]. Every function here walks it depth-first
//! with an explicit stack, so very deep chains are safe.

use std::error::Error as StdError;
use std::ptr;

use crate::constants;
use crate::errors::{self, Error, Joined};
use crate::formatted::unformatted;

/// Return the next error in the chain.
///
/// A container yields its underlying cause. A [`Joined`] node has no single
/// cause and yields `None`; use [`causes`] to visit its members.
pub fn unwrap<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a (dyn StdError + 'static)> {
    match err.downcast_ref::<Error>() {
        Some(container) => Some(container.cause()),
        None => err.source(),
    }
}

/// Report whether `target` appears anywhere in the chain of `err`.
///
/// Errors are compared by identity. A [`crate::Formatted`] view is replaced by
/// its origin first, and containers on either side are replaced by their
/// underlying cause, so a formatted error always matches its template.
///
/// # Arguments
///
/// * `err` - The error whose chain is searched
/// * `target` - The error to look for
///
/// # Returns
///
/// `true` if some error in the chain is the same allocation as `target`.
pub fn is(err: &(dyn StdError + 'static), target: &(dyn StdError + 'static)) -> bool {
    let err = match unformatted(err) {
        Some(origin) => origin.cause(),
        None => strip(err),
    };
    let target = strip(target);
    causes(err).any(|node| same_error(node, target))
}

/// Find the first error of type `T` in the chain of `err`.
///
/// The walk visits `err` itself first, then its causes in depth-first order.
///
/// # Returns
///
/// A reference to the first matching error, or `None` if the chain holds no
/// error of type `T`.
pub fn find<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    causes(err).find_map(|node| node.downcast_ref::<T>())
}

/// Iterate over `err` and every error reachable from it, depth-first.
pub fn causes<'a>(err: &'a (dyn StdError + 'static)) -> Causes<'a> {
    Causes { stack: vec![err] }
}

/// Depth-first iterator over an error chain. Created by [`causes`].
pub struct Causes<'a> {
    stack: Vec<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Causes<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(joined) = node.downcast_ref::<Joined>() {
            self.stack
                .extend(joined.errors().iter().rev().map(errors::upcast));
        } else if let Some(next) = unwrap(node) {
            self.stack.push(next);
        }
        Some(node)
    }
}

/// Format an error chain into a single line.
///
/// Leaf messages are joined with " → " in walk order; containers and joins
/// contribute no text of their own.
///
/// # Arguments
///
/// * `err` - The error to format
///
/// # Returns
///
/// A string containing the formatted error chain
///
/// # Example
///
/// ```
/// use errwrap::chain::format_chain;
///
/// let err = anyhow::anyhow!("outer error")
///     .context("middle error")
///     .context("inner error");
/// assert_eq!(format_chain(&*err), "inner error → middle error → outer error");
/// ```
pub fn format_chain(err: &(dyn StdError + 'static)) -> String {
    let messages: Vec<String> = causes(err)
        .filter(|node| !node.is::<Error>() && !node.is::<Joined>())
        .map(|node| node.to_string())
        .collect();
    messages.join(constants::chain::DISPLAY_SEPARATOR)
}

fn strip<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    err.downcast_ref::<Error>().map_or(err, Error::cause)
}

fn same_error(a: &(dyn StdError + 'static), b: &(dyn StdError + 'static)) -> bool {
    ptr::addr_eq(a as *const dyn StdError, b as *const dyn StdError)
}
