//! Runtime values.
//!
//! Vision has two kinds of value: numbers (`Data`) and text (`Content`).
//! Either converts to the other on demand.  Evaluation always yields a flat
//! [`List`] of values.

use std::fmt;

/// A single Vision value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Data(f64),
    Content(String),
}

impl Default for Value {
    fn default() -> Self {
        Value::Content(String::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Data(x) => f.write_str(&format_number(*x)),
            Value::Content(s) => f.write_str(s),
        }
    }
}

impl Value {
    pub fn content(text: impl Into<String>) -> Self {
        Value::Content(text.into())
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Numeric view.  Text that does not start with a number is `0`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Data(x) => *x,
            Value::Content(s) => parse_number_prefix(s),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Data(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Content(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Content(s.to_string())
    }
}

// ── List ──────────────────────────────────────────────────────────────────────

/// A flat, ordered sequence of values.  Lists never nest: appending a list
/// splices its elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    values: Vec<Value>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    /// Splice `other` onto the end of this list.
    pub fn append(&mut self, other: List) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Concatenated text of every element.
    pub fn to_text(&self) -> String {
        self.values.iter().map(Value::to_text).collect()
    }

    /// Number of the first element, `0` for an empty list.
    pub fn to_number(&self) -> f64 {
        self.values.first().map_or(0.0, Value::to_number)
    }
}

impl From<Value> for List {
    fn from(value: Value) -> Self {
        List { values: vec![value] }
    }
}

impl From<Vec<Value>> for List {
    fn from(values: Vec<Value>) -> Self {
        List { values }
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        List { values: iter.into_iter().collect() }
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

// ── Number conversions ────────────────────────────────────────────────────────

/// Significant digits used when numbers become text.
const PRECISION: i32 = 15;

/// Render `x` the way C's `%.15g` does.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return if x.is_sign_negative() { "-nan".into() } else { "nan".into() };
    }
    if x.is_infinite() {
        return if x < 0.0 { "-inf".into() } else { "inf".into() };
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0".into() } else { "0".into() };
    }

    // Scientific rendering tells us the decimal exponent after rounding.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= PRECISION {
        let mantissa = trim_fraction(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        trim_fraction(&format!("{x:.decimals$}")).to_string()
    }
}

/// Drop trailing zeros after a decimal point, and the point itself.
fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Parse the longest numeric prefix of `s` after leading whitespace.
/// Anything unparsable is `0`.
pub fn parse_number_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        i = j;
    }
    if digits == 0 {
        return 0.0;
    }
    // Exponent only counts when digits follow.
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    let mut literal = s[..i].replace("-.", "-0.").replace("+.", "0.");
    if literal.starts_with('.') {
        literal.insert(0, '0');
    }
    literal = literal.replace(".e", ".0e").replace(".E", ".0E");
    if literal.ends_with('.') {
        literal.push('0');
    }
    literal.parse().unwrap_or(0.0)
}
