//! Flag value kinds and their textual forms.
//!
//! Five kinds are bindable: booleans, strings, signed and unsigned integers
//! and durations.
//! Textual forms follow the conventions command-line users already know from
//! Go-style flag parsers: `true`/`f`/`1` for booleans, `0x1f`-style prefixes for
//! integers and `1h2m3.5s` for durations.

use std::fmt;
use std::time::Duration;

/// The kind of value a flag accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `true` / `false`; the bare flag means `true`
    Bool,
    /// Free-form text
    String,
    /// Signed 64-bit integer
    Int,
    /// Unsigned 64-bit integer
    Uint,
    /// Duration written as a string, e.g. `3m2s`
    Duration,
}

impl ValueKind {
    /// The zero value used when no default is declared
    pub fn zero(self) -> Value {
        match self {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Int => Value::Int(0),
            ValueKind::Uint => Value::Uint(0),
            ValueKind::Duration => Value::Duration(Duration::ZERO),
        }
    }

    /// Short name used in usage output
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Uint => "uint",
            ValueKind::Duration => "duration",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete flag value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Unsigned integer value
    Uint(u64),
    /// Duration value
    Duration(Duration),
}

impl Value {
    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Uint(_) => ValueKind::Uint,
            Value::Duration(_) => ValueKind::Duration,
        }
    }

    /// Parse the textual form of a value of the given kind
    pub fn parse(kind: ValueKind, raw: &str) -> Result<Value, String> {
        match kind {
            ValueKind::Bool => parse_bool(raw).map(Value::Bool),
            ValueKind::String => Ok(Value::String(raw.to_string())),
            ValueKind::Int => parse_int(raw).map(Value::Int),
            ValueKind::Uint => parse_uint(raw).map(Value::Uint),
            ValueKind::Duration => parse_duration(raw).map(Value::Duration),
        }
    }

    /// Whether this is the zero value of its kind
    pub fn is_zero(&self) -> bool {
        *self == self.kind().zero()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Duration(d) => f.write_str(&format_duration(*d)),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        // usize is at most 64 bits on every supported target
        Value::Uint(value as u64)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

/// A Rust type that can be the target of a flag binding
pub trait FlagValue: Send + Sync + 'static {
    /// Kind of value the flag accepts
    const KIND: ValueKind;

    /// Convert a parsed value into the field type
    fn from_value(value: Value) -> Result<Self, String>
    where
        Self: Sized;
}

impl FlagValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(format!("expected bool, got {}", other.kind())),
        }
    }
}

impl FlagValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(format!("expected string, got {}", other.kind())),
        }
    }
}

impl FlagValue for Duration {
    const KIND: ValueKind = ValueKind::Duration;

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Duration(d) => Ok(d),
            other => Err(format!("expected duration, got {}", other.kind())),
        }
    }
}

impl FlagValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(format!("expected int, got {}", other.kind())),
        }
    }
}

macro_rules! int_flag_value {
    ($($ty:ty),*) => {
        $(
            impl FlagValue for $ty {
                const KIND: ValueKind = ValueKind::Int;

                fn from_value(value: Value) -> Result<Self, String> {
                    let i = i64::from_value(value)?;
                    <$ty>::try_from(i)
                        .map_err(|_| format!("value {} out of range for {}", i, stringify!($ty)))
                }
            }
        )*
    };
}

int_flag_value!(i32, u32);

impl FlagValue for u64 {
    const KIND: ValueKind = ValueKind::Uint;

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Uint(u) => Ok(u),
            other => Err(format!("expected uint, got {}", other.kind())),
        }
    }
}

impl FlagValue for usize {
    const KIND: ValueKind = ValueKind::Uint;

    fn from_value(value: Value) -> Result<Self, String> {
        let u = u64::from_value(value)?;
        usize::try_from(u).map_err(|_| format!("value {} out of range for usize", u))
    }
}

/// Parse a boolean the way Go's `strconv.ParseBool` does
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err("parse error".to_string()),
    }
}

/// Parse an integer with optional sign and `0x`, `0o`, `0b` or leading-zero
/// octal prefix
pub fn parse_int(raw: &str) -> Result<i64, String> {
    let signed = parse_integer(raw)?;
    i64::try_from(signed).map_err(|_| "value out of range".to_string())
}

/// Parse an unsigned integer; prefixes as for [`parse_int`], no sign
pub fn parse_uint(raw: &str) -> Result<u64, String> {
    if raw.starts_with('-') || raw.starts_with('+') {
        return Err("invalid syntax".to_string());
    }
    let value = parse_integer(raw)?;
    u64::try_from(value).map_err(|_| "value out of range".to_string())
}

fn parse_integer(raw: &str) -> Result<i128, String> {
    let (negative, body) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = body.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest.to_string())
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest.to_string())
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest.to_string())
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, lower[1..].to_string())
    } else {
        (10, lower)
    };

    let digits = digits.replace('_', "");
    if digits.is_empty() || digits.starts_with('+') || digits.starts_with('-') {
        return Err("invalid syntax".to_string());
    }

    let magnitude = i128::from_str_radix(&digits, radix).map_err(|_| "invalid syntax".to_string())?;
    Ok(if negative { -magnitude } else { magnitude })
}

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Parse a duration such as `300ms`, `1.5h` or `2h45m`
///
/// Negative durations are rejected since they cannot be represented.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid duration {:?}", raw);

    let mut s = raw;
    if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    } else if s.starts_with('-') {
        if s[1..].chars().all(|c| c == '0') && s.len() > 1 {
            return Ok(Duration::ZERO);
        }
        return Err(format!("negative duration {:?}", raw));
    }

    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !s.is_empty() {
        let int_len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let int_part = &s[..int_len];
        s = &s[int_len..];

        let mut frac_part = "";
        if let Some(rest) = s.strip_prefix('.') {
            let frac_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            frac_part = &rest[..frac_len];
            s = &rest[frac_len..];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        let unit = &s[..unit_len];
        s = &s[unit_len..];
        if unit.is_empty() {
            return Err(format!("missing unit in duration {:?}", raw));
        }
        let scale = unit_nanos(unit).ok_or_else(|| format!("unknown unit {:?} in duration {:?}", unit, raw))?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let mut component = whole.checked_mul(scale).ok_or_else(invalid)?;

        if !frac_part.is_empty() {
            // digits beyond nanosecond precision cannot contribute
            let frac_digits = &frac_part[..frac_part.len().min(18)];
            let numerator: u128 = frac_digits.parse().map_err(|_| invalid())?;
            let denominator = 10u128.checked_pow(frac_digits.len() as u32).ok_or_else(invalid)?;
            let frac = numerator.checked_mul(scale).ok_or_else(invalid)? / denominator;
            component = component.checked_add(frac).ok_or_else(invalid)?;
        }

        total = total.checked_add(component).ok_or_else(invalid)?;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    let nanos = (total % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, nanos))
}

fn with_fraction(value: u128, unit: u128, width: usize) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", rem, width = width);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Format a duration as `1h2m3.5s`, `1.5ms`, `0s` and so on
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{}ns", nanos);
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", with_fraction(nanos, NANOS_PER_MICRO, 3));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", with_fraction(nanos, NANOS_PER_MILLI, 6));
    }

    let total_secs = nanos / NANOS_PER_SEC;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = with_fraction(nanos % (60 * NANOS_PER_SEC), NANOS_PER_SEC, 9);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
