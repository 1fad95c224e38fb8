//! Share Sets and the Share Normalizer
//!
//! Turns a JSON share-set document into a fixed `ShareSet` record:
//!
//! ```json
//! {
//!   "keys": { "n": 4, "k": 3 },
//!   "1": { "base": "10", "value": "4" },
//!   "2": { "base": "2",  "value": "111" }
//! }
//! ```
//!
//! Each non-`keys` entry is one share. Its key is the decimal x coordinate and
//! `value` is the y coordinate written in radix `base`. Input order is kept,
//! since reconstruction uses the first k shares.

use crate::error::{MalformedInput, RadixError};
use anyhow::{Context, Result};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::error::Category;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// One point (x, y) on the secret polynomial.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Share {
    pub x: BigInt,
    pub y: BigInt,
}

impl Share {
    pub fn new(x: impl Into<BigInt>, y: impl Into<BigInt>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Shares in input order plus the reconstruction threshold k.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSet {
    pub shares: Vec<Share>,
    pub k: usize,
    /// `keys.n` from the input document, if it had one. Informational only.
    pub declared_total: Option<usize>,
}

impl ShareSet {
    pub fn new(shares: Vec<Share>, k: usize) -> Self {
        Self {
            shares,
            k,
            declared_total: None,
        }
    }

    /// Build from (x, y) pairs. Handy for tests and callers with plain integers.
    pub fn from_pairs<X, Y>(pairs: impl IntoIterator<Item = (X, Y)>, k: usize) -> Self
    where
        X: Into<BigInt>,
        Y: Into<BigInt>,
    {
        Self::new(
            pairs.into_iter().map(|(x, y)| Share::new(x, y)).collect(),
            k,
        )
    }

    /// The first k shares in input order (fewer if the set is short).
    pub fn working_subset(&self) -> &[Share] {
        &self.shares[..self.k.min(self.shares.len())]
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

// ============================================================================
// Radix Conversion
// ============================================================================

/// Decode `text` as an integer in `base` (2..=36).
///
/// Digits are `0-9` then `a-z`, case-insensitive, each strictly below `base`.
/// A single leading `+` or `-` is allowed. No whitespace, separators or prefixes.
pub fn decode_radix(text: &str, base: u32) -> Result<BigInt, RadixError> {
    if !(2..=36).contains(&base) {
        return Err(RadixError::UnsupportedBase(base));
    }

    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return Err(RadixError::Empty);
    }

    let mut acc = BigInt::zero();
    for c in digits.chars() {
        let digit = c
            .to_digit(36)
            .filter(|&d| d < base)
            .ok_or(RadixError::InvalidDigit { digit: c, base })?;
        acc = acc * base + digit;
    }

    Ok(if negative { -acc } else { acc })
}

/// Encode `value` in `base` (2..=36), lowercase digits.
pub fn encode_radix(value: &BigInt, base: u32) -> Result<String, RadixError> {
    if !(2..=36).contains(&base) {
        return Err(RadixError::UnsupportedBase(base));
    }
    Ok(value.to_str_radix(base))
}

// ============================================================================
// Normalizer
// ============================================================================

/// Top-level members in document order, repeated keys included.
///
/// `serde_json::Map` keeps only the last value of a repeated key, which would
/// hide a conflicting share, so the top level is walked entry by entry.
struct DocumentEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for DocumentEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = DocumentEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(DocumentEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Parse a JSON share-set document.
///
/// Duplicate x values, including a share key written twice, are rejected
/// here rather than left for the interpolation to trip over.
pub fn parse_share_set(input: &str) -> Result<ShareSet, MalformedInput> {
    // Entry values are arbitrary JSON, so a data error can only mean the
    // top level itself is not an object.
    let DocumentEntries(root) = serde_json::from_str(input).map_err(|e| match e.classify() {
        Category::Data => MalformedInput::NotAnObject,
        _ => MalformedInput::Json(e),
    })?;

    let mut keys = None;
    for (key, value) in &root {
        if key == "keys" && keys.replace(value).is_some() {
            return Err(MalformedInput::DuplicateKey { key: key.clone() });
        }
    }

    let keys = keys
        .and_then(Value::as_object)
        .ok_or(MalformedInput::MissingKeys)?;
    let k = keys
        .get("k")
        .and_then(json_usize)
        .ok_or(MalformedInput::MissingThreshold)?;
    let declared_total = match keys.get("n") {
        Some(n) => Some(json_usize(n).ok_or(MalformedInput::InvalidTotal)?),
        None => None,
    };

    let mut shares = Vec::with_capacity(root.len().saturating_sub(1));
    let mut seen = HashSet::new();

    for (key, entry) in &root {
        if key == "keys" {
            continue;
        }

        let share = parse_share(key, entry)?;
        if !seen.insert(share.x.clone()) {
            return Err(MalformedInput::DuplicateIndex { x: share.x });
        }
        debug!(key = %key, share = %share, "decoded share");
        shares.push(share);
    }

    if let Some(n) = declared_total {
        if n != shares.len() {
            warn!(
                declared = n,
                found = shares.len(),
                "keys.n does not match the number of shares"
            );
        }
    }

    Ok(ShareSet {
        shares,
        k,
        declared_total,
    })
}

/// Read and parse a share-set file.
pub fn load_share_set(path: impl AsRef<Path>) -> Result<ShareSet> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read the file '{}'", path.display()))?;
    let share_set = parse_share_set(&input)
        .with_context(|| format!("Malformed share set in '{}'", path.display()))?;
    Ok(share_set)
}

fn parse_share(key: &str, entry: &Value) -> Result<Share, MalformedInput> {
    let fields = entry
        .as_object()
        .ok_or_else(|| MalformedInput::ShareNotAnObject {
            key: key.to_string(),
        })?;

    let x = decode_radix(key, 10).map_err(|_| MalformedInput::InvalidIndex {
        key: key.to_string(),
    })?;

    let base = parse_base(key, fields)?;
    let value = fields
        .get("value")
        .and_then(Value::as_str)
        .ok_or_else(|| MalformedInput::MissingField {
            key: key.to_string(),
            field: "value",
        })?;

    let y = decode_radix(value, base).map_err(|e| value_error(key, e))?;

    Ok(Share { x, y })
}

/// Attach the share key to a failure decoding its `value`.
fn value_error(key: &str, error: RadixError) -> MalformedInput {
    let key = key.to_string();
    match error {
        RadixError::InvalidDigit { digit, base } => MalformedInput::InvalidDigit { key, digit, base },
        RadixError::Empty => MalformedInput::EmptyValue { key },
        RadixError::UnsupportedBase(base) => MalformedInput::InvalidBase {
            key,
            base: base.to_string(),
        },
    }
}

/// `base` is normally a string ("16"); a bare JSON integer is accepted too.
fn parse_base(key: &str, fields: &Map<String, Value>) -> Result<u32, MalformedInput> {
    let raw = fields.get("base").ok_or_else(|| MalformedInput::MissingField {
        key: key.to_string(),
        field: "base",
    })?;

    let invalid = || MalformedInput::InvalidBase {
        key: key.to_string(),
        base: match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };

    let base = match raw {
        Value::String(s) => s.trim().parse::<u32>().map_err(|_| invalid())?,
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    if !(2..=36).contains(&base) {
        return Err(invalid());
    }
    Ok(base)
}

fn json_usize(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| integral_f64(n.as_f64()?))
            .and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `3.0` counts as the integer 3; `2.5`, negatives and huge values do not.
fn integral_f64(f: f64) -> Option<u64> {
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}
