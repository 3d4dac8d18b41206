//! Deserialization helpers for backend identifiers.
//!
//! The backend is not consistent about identifier types: the same id may
//! arrive as a JSON string in one response and as a number in another.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

/// Accepts a string or a number and yields its string form.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

/// Like [`id_string`], but `null`, a missing field or an empty string become `None`.
pub fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(RawId::into_string).filter(|id| !id.is_empty()))
}
