//! Custom serde deserializers for flexible type handling
//!
//! Credential files come from many different account shops and tools, so the
//! same field is sometimes a JSON string and sometimes a number.

use serde::{Deserialize, Deserializer, de};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    UInt(u64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::String(s) => s,
            Self::Int(i) => i.to_string(),
            Self::UInt(u) => u.to_string(),
        }
    }
}

/// Deserialize a phone number that can be:
/// - String: `"15550001234"`
/// - Integer: `15550001234`
///
/// The value is kept verbatim (no `+` prefix is added or stripped). Empty
/// strings are rejected since a phone number is mandatory.
pub fn deserialize_phone<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let phone = StringOrNumber::deserialize(deserializer)?.into_string();
    if phone.trim().is_empty() {
        return Err(de::Error::custom("phone must not be empty"));
    }
    Ok(phone)
}

/// Deserialize an optional text field where `null`, a missing key, a string
/// or a number are all accepted. Numbers are rendered as decimal text, which
/// matters for numeric two-factor passwords.
pub fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(value.map(StringOrNumber::into_string))
}
