//! Lenient deserializers for backend fields with unstable JSON types.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Int(u64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextLike {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Accept integers, floats and numeric strings; anything else becomes `0`.
pub(crate) fn lenient_u64<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberLike>::deserialize(d).unwrap_or(None);
    Ok(match value {
        Some(NumberLike::Int(v)) => v,
        Some(NumberLike::Float(v)) if v.is_finite() && v > 0.0 => v.round() as u64,
        Some(NumberLike::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v.round() as u64)
            .unwrap_or(0),
        _ => 0,
    })
}

/// Optional variant of [`lenient_u64`]; unparseable input maps to `None`.
pub(crate) fn lenient_opt_u64<'de, D>(d: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberLike>::deserialize(d).unwrap_or(None);
    Ok(match value {
        Some(NumberLike::Int(v)) => Some(v),
        Some(NumberLike::Float(v)) if v.is_finite() && v >= 0.0 => Some(v.round() as u64),
        Some(NumberLike::Text(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

/// Quality fields arrive as `"44.1 kHz"` from some plugins and as bare
/// numbers from others.
pub(crate) fn lenient_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<TextLike>::deserialize(d).unwrap_or(None);
    Ok(match value {
        Some(TextLike::Text(s)) => Some(s).filter(|s| !s.trim().is_empty()),
        Some(TextLike::Int(v)) => Some(v.to_string()),
        Some(TextLike::Float(v)) => Some(v.to_string()),
        None => None,
    })
}
