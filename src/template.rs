//! Printf-style template substitution.
//!
//! [`sprintf`] interprets `%[flags][width][.precision]verb` directives against a
//! slice of [`Arg`] values. It never fails: a malformed template produces
//! in-band diagnostics instead.
//!
//! | Problem                         | Output                        |
//! |---------------------------------|-------------------------------|
//! | fewer arguments than verbs      | `%!d(MISSING)`                |
//! | more arguments than verbs       | `%!(EXTRA int=3, string=x)`   |
//! | `%` at the end of the template  | `%!(NOVERB)`                  |
//! | verb does not fit the argument  | `%!d(string=hi)`              |
//! | width or precision too long     | `%!(NOVERB)`, rest is dropped |
//!
//! `%q` escapes like Go's `strconv.Quote`, except that printable characters
//! are approximated as anything that is neither a control character nor
//! whitespace other than the plain space. An explicit precision turns off
//! zero padding for integer verbs.
//!
//! # Example
//!
//! ```
//! use errwrap::{args, template::sprintf};
//!
//! assert_eq!(sprintf("user %s has %d items", args!["ann", 3]), "user ann has 3 items");
//! assert_eq!(sprintf("%d and %d", args![1]), "1 and %!d(MISSING)");
//! ```

use std::fmt::{self, Write as _};
use std::iter;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::template::{
    BAD_PREFIX, DEFAULT_FLOAT_PRECISION, DIRECTIVE_PATTERN, EXTRA_OPEN, MAX_WIDTH,
    MIN_FIXED_EXPONENT, MISSING, NO_VERB, SHORTEST_EXPONENT_LIMIT,
};
use crate::errors::Error;
use crate::formatted::Formatted;

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DIRECTIVE_PATTERN).expect("directive pattern is valid"));

/// A value substituted into a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// Any other value, captured through its `Display` implementation.
    Display {
        type_name: &'static str,
        text: String,
    },
}

impl Arg {
    /// Capture a displayable value.
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        Arg::Display {
            type_name: std::any::type_name::<T>(),
            text: value.to_string(),
        }
    }

    /// Name of the argument's type, as shown in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Str(_) => "string",
            Arg::Int(_) => "int",
            Arg::Uint(_) => "uint",
            Arg::Float(_) => "float64",
            Arg::Bool(_) => "bool",
            Arg::Display { type_name, .. } => *type_name,
        }
    }
}

macro_rules! impl_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Arg {
                fn from(value: $source) -> Self {
                    Arg::$variant(value as $target)
                }
            }
        )*
    };
}

impl_from!(Int as i64: i8, i16, i32, i64, isize);
impl_from!(Uint as u64: u8, u16, u32, u64, usize);

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_owned())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Str(value.clone())
    }
}

impl From<&Error> for Arg {
    fn from(value: &Error) -> Self {
        Arg::display(value)
    }
}

impl From<&Formatted> for Arg {
    fn from(value: &Formatted) -> Self {
        Arg::display(value)
    }
}

/// Build a `&[Arg]` from plain values.
///
/// ```
/// use errwrap::{args, Arg};
///
/// let values: &[Arg] = args!["id", 42, true];
/// assert_eq!(values.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        &[$($crate::template::Arg::from($arg)),*]
    };
}

/// A parsed `%` directive.
#[derive(Debug, Default)]
struct Directive {
    minus: bool,
    plus: bool,
    sharp: bool,
    space: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    verb: char,
}

/// Rendered argument text and the offset where zero padding may be inserted.
struct Rendered {
    text: String,
    zero_at: Option<usize>,
}

impl Rendered {
    fn plain(text: String) -> Self {
        Self {
            text,
            zero_at: Some(0),
        }
    }

    fn signed(sign: &str, prefix: &str, digits: &str) -> Self {
        Self {
            zero_at: Some(sign.len() + prefix.len()),
            text: format!("{sign}{prefix}{digits}"),
        }
    }
}

/// Substitute `args` into `template`.
///
/// # Arguments
///
/// * `template` - Text with `%` directives
/// * `args` - Values consumed by the directives, in order
///
/// # Returns
///
/// The rendered text. Problems with the template or the arguments are written
/// into it as diagnostics (see the module docs); this function never fails.
pub fn sprintf(template: &str, args: &[Arg]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut remaining = args.iter();
    let mut last = 0;

    for caps in DIRECTIVE.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        let width = caps.get(2).map_or("", |m| m.as_str());
        let precision = caps.get(3).map(|m| m.as_str());
        let limits = parse_number(width).zip(match precision {
            Some(digits) => parse_number(digits).map(Some),
            None => Some(None),
        });
        let Some((width_value, precision_value)) = limits else {
            log::debug!("template {template:?} has an oversized width or precision");
            out.push_str(NO_VERB);
            last = template.len();
            break;
        };

        let Some(verb) = caps.get(4).and_then(|m| m.as_str().chars().next()) else {
            out.push_str(NO_VERB);
            continue;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        let mut dir = Directive {
            verb,
            width: (!width.is_empty()).then_some(width_value),
            precision: precision_value,
            ..Directive::default()
        };
        for flag in caps.get(1).map_or("", |m| m.as_str()).chars() {
            match flag {
                '-' => dir.minus = true,
                '+' => dir.plus = true,
                '#' => dir.sharp = true,
                ' ' => dir.space = true,
                _ => dir.zero = true,
            }
        }

        match remaining.next() {
            Some(arg) => render(&mut out, &dir, arg),
            None => {
                log::debug!("template {template:?} is missing an argument for %{verb}");
                out.push_str(BAD_PREFIX);
                out.push(verb);
                out.push_str(MISSING);
            }
        }
    }
    out.push_str(&template[last..]);

    let extra = remaining.as_slice();
    if !extra.is_empty() {
        log::debug!(
            "template {template:?} left {} argument(s) unused",
            extra.len()
        );
        out.push_str(EXTRA_OPEN);
        for (idx, arg) in extra.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            push_typed(&mut out, arg);
        }
        out.push(')');
    }
    out
}

/// Parses width or precision digits. An empty string is zero.
///
/// Returns `None` once another digit is read after the value has passed
/// [`MAX_WIDTH`]; the template is abandoned at that point.
fn parse_number(digits: &str) -> Option<usize> {
    let mut num = 0usize;
    for digit in digits.bytes() {
        if num > MAX_WIDTH {
            return None;
        }
        num = num * 10 + usize::from(digit - b'0');
    }
    Some(num)
}

fn render(out: &mut String, dir: &Directive, arg: &Arg) {
    let Some(rendered) = format_arg(dir, arg) else {
        out.push_str(BAD_PREFIX);
        out.push(dir.verb);
        out.push('(');
        push_typed(out, arg);
        out.push(')');
        return;
    };

    let len = rendered.text.chars().count();
    let Some(fill) = dir.width.filter(|w| *w > len).map(|w| w - len) else {
        out.push_str(&rendered.text);
        return;
    };
    match rendered.zero_at {
        _ if dir.minus => {
            out.push_str(&rendered.text);
            out.extend(iter::repeat_n(' ', fill));
        }
        Some(at) if dir.zero => {
            out.push_str(&rendered.text[..at]);
            out.extend(iter::repeat_n('0', fill));
            out.push_str(&rendered.text[at..]);
        }
        _ => {
            out.extend(iter::repeat_n(' ', fill));
            out.push_str(&rendered.text);
        }
    }
}

/// Writes `type=value`.
fn push_typed(out: &mut String, arg: &Arg) {
    out.push_str(arg.type_name());
    out.push('=');
    let plain = Directive {
        verb: 'v',
        ..Directive::default()
    };
    if let Some(rendered) = format_arg(&plain, arg) {
        out.push_str(&rendered.text);
    }
}

fn format_arg(dir: &Directive, arg: &Arg) -> Option<Rendered> {
    let rendered = match (dir.verb, arg) {
        ('v' | 's', Arg::Str(s)) | ('v' | 's' | 'w', Arg::Display { text: s, .. }) => {
            Rendered::plain(truncate(s, dir.precision))
        }
        ('q', Arg::Str(s)) | ('q', Arg::Display { text: s, .. }) => {
            Rendered::plain(quote(&truncate(s, dir.precision), '"'))
        }
        ('v' | 'd', Arg::Int(n)) => integer(dir, *n < 0, &n.unsigned_abs().to_string()),
        ('v' | 'd', Arg::Uint(n)) => integer(dir, false, &n.to_string()),
        ('b' | 'o' | 'x' | 'X', Arg::Int(n)) => radix(dir, *n < 0, n.unsigned_abs()),
        ('b' | 'o' | 'x' | 'X', Arg::Uint(n)) => radix(dir, false, *n),
        ('x' | 'X', Arg::Str(s)) => Rendered::plain(
            s.bytes()
                .map(|b| match dir.verb {
                    'x' => format!("{b:02x}"),
                    _ => format!("{b:02X}"),
                })
                .collect(),
        ),
        ('c' | 'q', Arg::Int(_) | Arg::Uint(_)) => {
            let code = match arg {
                Arg::Int(n) => u32::try_from(*n).ok(),
                Arg::Uint(n) => u32::try_from(*n).ok(),
                _ => None,
            };
            let ch = code
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            match dir.verb {
                'c' => Rendered::plain(ch.to_string()),
                _ => Rendered::plain(quote(ch.encode_utf8(&mut [0; 4]), '\'')),
            }
        }
        ('v' | 'e' | 'E' | 'f' | 'F' | 'g' | 'G', Arg::Float(x)) => float(dir, *x),
        ('v' | 't', Arg::Bool(b)) => Rendered::plain(b.to_string()),
        _ => return None,
    };
    Some(rendered)
}

fn truncate(s: &str, precision: Option<usize>) -> String {
    match precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_owned(),
    }
}

/// Quotes `s` with `delim`, escaping the way Go's `strconv.Quote` does.
///
/// Printable characters are approximated as anything that is neither a control
/// character nor whitespace other than the plain space.
fn quote(s: &str, delim: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for ch in s.chars() {
        let code = u32::from(ch);
        let _ = match ch {
            '\x07' => out.write_str("\\a"),
            '\x08' => out.write_str("\\b"),
            '\x0c' => out.write_str("\\f"),
            '\n' => out.write_str("\\n"),
            '\r' => out.write_str("\\r"),
            '\t' => out.write_str("\\t"),
            '\x0b' => out.write_str("\\v"),
            '\\' => out.write_str("\\\\"),
            c if c == delim => write!(out, "\\{c}"),
            c if c < ' ' || c == '\x7f' => write!(out, "\\x{code:02x}"),
            c if c == ' ' || !(c.is_control() || c.is_whitespace()) => out.write_char(c),
            _ if code < 0x10000 => write!(out, "\\u{code:04x}"),
            _ => write!(out, "\\U{code:08x}"),
        };
    }
    out.push(delim);
    out
}

fn sign(dir: &Directive, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if dir.plus {
        "+"
    } else if dir.space {
        " "
    } else {
        ""
    }
}

fn integer(dir: &Directive, negative: bool, digits: &str) -> Rendered {
    whole_number(dir, negative, "", digits)
}

fn radix(dir: &Directive, negative: bool, magnitude: u64) -> Rendered {
    let (digits, prefix) = match dir.verb {
        'b' => (format!("{magnitude:b}"), "0b"),
        'o' => (format!("{magnitude:o}"), "0"),
        'x' => (format!("{magnitude:x}"), "0x"),
        _ => (format!("{magnitude:X}"), "0X"),
    };
    let prefix = if dir.sharp { prefix } else { "" };
    whole_number(dir, negative, prefix, &digits)
}

/// An explicit precision replaces zero padding; `%.0d` of zero prints nothing.
fn whole_number(dir: &Directive, negative: bool, prefix: &str, digits: &str) -> Rendered {
    if dir.precision == Some(0) && digits == "0" {
        return Rendered {
            text: String::new(),
            zero_at: None,
        };
    }
    let digits = min_digits(digits, dir.precision);
    let mut rendered = Rendered::signed(sign(dir, negative), prefix, &digits);
    if dir.precision.is_some() {
        rendered.zero_at = None;
    }
    rendered
}

fn min_digits(digits: &str, precision: Option<usize>) -> String {
    match precision {
        Some(p) if p > digits.len() => {
            let mut padded = "0".repeat(p - digits.len());
            padded.push_str(digits);
            padded
        }
        _ => digits.to_owned(),
    }
}

fn float(dir: &Directive, x: f64) -> Rendered {
    let upper = matches!(dir.verb, 'E' | 'F' | 'G');
    if x.is_nan() {
        let sign = if dir.plus { "+" } else { "" };
        return Rendered {
            text: format!("{sign}NaN"),
            zero_at: None,
        };
    }
    if x.is_infinite() {
        let sign = if x < 0.0 { "-" } else { "+" };
        return Rendered {
            text: format!("{sign}Inf"),
            zero_at: None,
        };
    }

    let magnitude = x.abs();
    let body = match dir.verb {
        'f' | 'F' => format!(
            "{:.*}",
            dir.precision.unwrap_or(DEFAULT_FLOAT_PRECISION),
            magnitude
        ),
        'e' | 'E' => {
            let sci = format!(
                "{:.*e}",
                dir.precision.unwrap_or(DEFAULT_FLOAT_PRECISION),
                magnitude
            );
            let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
            format!("{mantissa}{}", exponent(exp.parse().unwrap_or(0), upper))
        }
        _ => general(magnitude, dir.precision, upper),
    };
    Rendered::signed(sign(dir, x.is_sign_negative()), "", &body)
}

/// `%g` rendering of a non-negative value, also used by `%v`.
fn general(x: f64, precision: Option<usize>, upper: bool) -> String {
    let shortest = precision.is_none();
    let (digits, dp) = decimal_digits(x, precision.map(|p| p.max(1)));
    let nd = digits.len() as i32;

    let mut prec = if shortest {
        nd
    } else {
        precision.map_or(nd, |p| p.max(1) as i32)
    };
    let mut eprec = prec;
    if eprec > nd && nd >= dp {
        eprec = nd;
    }
    if shortest {
        eprec = SHORTEST_EXPONENT_LIMIT;
    }

    let exp = dp - 1;
    if exp < MIN_FIXED_EXPONENT || exp >= eprec {
        let frac = prec.min(nd) - 1;
        let mut out = String::new();
        out.push_str(&digits[..1]);
        if frac > 0 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push_str(&exponent(exp, upper));
        return out;
    }

    if prec > dp {
        prec = nd;
    }
    fixed(&digits, dp, (prec - dp).max(0))
}

/// Significant decimal digits of `x` without trailing zeros, and the position
/// of the decimal point relative to the first digit.
fn decimal_digits(x: f64, significant: Option<usize>) -> (String, i32) {
    let sci = match significant {
        Some(n) => format!("{:.*e}", n - 1, x),
        None => format!("{x:e}"),
    };
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let mut digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    (digits, exp + 1)
}

fn fixed(digits: &str, dp: i32, frac: i32) -> String {
    let digit_at = |idx: i32| -> char {
        usize::try_from(idx)
            .ok()
            .and_then(|i| digits.as_bytes().get(i))
            .map_or('0', |b| char::from(*b))
    };
    let mut out = String::new();
    if dp > 0 {
        out.extend((0..dp).map(digit_at));
    } else {
        out.push('0');
    }
    if frac > 0 {
        out.push('.');
        out.extend((dp..dp + frac).map(digit_at));
    }
    out
}

fn exponent(exp: i32, upper: bool) -> String {
    let e = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{e}{sign}{:02}", exp.unsigned_abs())
}
