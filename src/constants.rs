//! Fixed values for template rendering, chain display and JSON encoding.
//!
//! This module contains the diagnostic markers embedded by the template engine,
//! the separators used when rendering joined errors, and the limits applied
//! to template directives.

/// Template engine constants.
pub mod template {
    /// Directive grammar: flags, width, optional precision, verb.
    ///
    /// The verb group is optional so that a trailing `%` still matches and can
    /// be reported as [`NO_VERB`].
    pub const DIRECTIVE_PATTERN: &str = r"(?s)%([-+# 0]*)([0-9]*)(?:\.([0-9]*))?(.?)";

    /// Prefix of every in-band diagnostic.
    pub const BAD_PREFIX: &str = "%!";

    /// Suffix written after the verb when an argument is missing.
    pub const MISSING: &str = "(MISSING)";

    /// Written for a `%` at the end of the template, or for an oversized width
    /// or precision.
    pub const NO_VERB: &str = "%!(NOVERB)";

    /// Opens the list of arguments that no directive consumed.
    pub const EXTRA_OPEN: &str = "%!(EXTRA ";

    /// Once a width or precision exceeds this value, any further digit
    /// abandons the rest of the template.
    pub const MAX_WIDTH: usize = 1_000_000;

    /// Precision used by `%e` and `%f` when none is given.
    pub const DEFAULT_FLOAT_PRECISION: usize = 6;

    /// Exponent at which shortest `%v`/`%g` output switches to `e` notation.
    pub const SHORTEST_EXPONENT_LIMIT: i32 = 6;

    /// Smallest exponent rendered without `e` notation by `%g`.
    pub const MIN_FIXED_EXPONENT: i32 = -4;
}

/// Error chain constants.
pub mod chain {
    /// Separator between the messages of joined causes.
    pub const JOIN_SEPARATOR: char = '\n';

    /// Separator used by [`crate::chain::format_chain`].
    pub const DISPLAY_SEPARATOR: &str = " → ";
}

/// JSON encoding constants.
pub mod json {
    /// Messages are split on this character before encoding.
    pub const LINE_SEPARATOR: char = '\n';

    /// [`LINE_SEPARATOR`] as a string, used when lines are joined back.
    pub const LINE_SEPARATOR_STR: &str = "\n";
}
