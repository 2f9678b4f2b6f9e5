//! Detection of absent error slots.
//!
//! Safe Rust represents a missing error as `None`, and references are never
//! null. The exception is a raw error handle received across an unsafe
//! boundary: a `*const dyn Error` is a (data, vtable) pair, and a handle built
//! from a typed null pointer keeps a valid vtable while its data word is null.
//! Comparing such a handle against "no error" by its metadata gives the wrong
//! answer, so [`is_absent`] checks the data word only.

use std::error::Error as StdError;
use std::sync::Arc;

use crate::errors::Error;
use crate::formatted::Formatted;

/// Raw handle to an error, as received from foreign or unsafe code.
pub type RawError = *const (dyn StdError + 'static);

/// Something that may or may not hold an error.
pub trait ErrorSlot {
    /// Returns true if the slot holds no error.
    fn is_vacant(&self) -> bool;
}

/// Report whether `slot` holds no error.
///
/// # Example
///
/// ```
/// use errwrap::absent::{is_absent, RawError};
///
/// #[derive(Debug)]
/// struct DiskError;
///
/// impl std::fmt::Display for DiskError {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("disk error")
///     }
/// }
///
/// impl std::error::Error for DiskError {}
///
/// let handle: RawError = std::ptr::null::<DiskError>();
/// assert!(is_absent(&handle));
/// assert!(is_absent(&None::<errwrap::Error>));
/// ```
pub fn is_absent<S: ErrorSlot + ?Sized>(slot: &S) -> bool {
    slot.is_vacant()
}

impl<T: ?Sized> ErrorSlot for *const T {
    fn is_vacant(&self) -> bool {
        let vacant = self.is_null();
        if vacant {
            log::trace!(
                "raw {} handle has a null data pointer",
                std::any::type_name::<T>()
            );
        }
        vacant
    }
}

impl<T: ?Sized> ErrorSlot for *mut T {
    fn is_vacant(&self) -> bool {
        self.cast_const().is_vacant()
    }
}

impl<T: ErrorSlot> ErrorSlot for Option<T> {
    fn is_vacant(&self) -> bool {
        self.as_ref().is_none_or(ErrorSlot::is_vacant)
    }
}

impl<T: ?Sized> ErrorSlot for &T {
    fn is_vacant(&self) -> bool {
        false
    }
}

impl<T: ?Sized> ErrorSlot for Box<T> {
    fn is_vacant(&self) -> bool {
        false
    }
}

impl<T: ?Sized> ErrorSlot for Arc<T> {
    fn is_vacant(&self) -> bool {
        false
    }
}

impl ErrorSlot for Error {
    fn is_vacant(&self) -> bool {
        false
    }
}

impl ErrorSlot for Formatted {
    fn is_vacant(&self) -> bool {
        false
    }
}

impl ErrorSlot for dyn StdError + 'static {
    fn is_vacant(&self) -> bool {
        false
    }
}

impl ErrorSlot for dyn StdError + Send + Sync + 'static {
    fn is_vacant(&self) -> bool {
        false
    }
}
