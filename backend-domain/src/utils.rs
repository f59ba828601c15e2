use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use time::OffsetDateTime;

/// Largest epoch second a stored `DateTime` column can hold.
pub const MAX_STORED_EPOCH_SECONDS: i64 = u32::MAX as i64;

/// Converts epoch seconds for storage; out-of-range values are rejected, never clamped.
pub fn seconds_to_utc(seconds: i64) -> anyhow::Result<OffsetDateTime> {
    if !(0..=MAX_STORED_EPOCH_SECONDS).contains(&seconds) {
        anyhow::bail!("timestamp {} is outside the storable range", seconds);
    }
    Ok(OffsetDateTime::from_unix_timestamp(seconds)?)
}

/// Census encodes every number as a string; accept both forms.
pub fn de_lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientI64)
}

/// Like [`de_lenient_i64`] but maps null, empty and malformed values to zero.
pub fn de_lenient_i64_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserializer.deserialize_any(LenientI64).unwrap_or(0))
}

/// Ids may arrive as numbers from hand-written payloads; keep them as strings.
pub fn de_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientString)
}

struct LenientI64;

impl<'de> Visitor<'de> for LenientI64 {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or a string containing an integer")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
        i64::try_from(value).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
        Ok(value as i64)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
        value.trim().parse::<i64>().map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
        Err(E::custom("null is not an integer"))
    }
}

struct LenientString;

impl<'de> Visitor<'de> for LenientString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or a number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
        Ok(value.trim().to_string())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
        Ok(value.trim().to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}

/// Optional id/number field; null and empty strings become `None`.
pub fn de_opt_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer.deserialize_any(LenientString)?;
    Ok(Some(value).filter(|value| !value.is_empty()))
}

/// Query strings (and flattened structs) carry numbers as text.
pub fn de_opt_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match de_opt_lenient_string(deserializer)? {
        Some(value) => value.parse::<i64>().map(Some).map_err(de::Error::custom),
        None => Ok(None),
    }
}

pub fn de_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer.deserialize_any(LenientString)?;
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(de::Error::custom(format!("'{}' is not a boolean", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_times_reject_out_of_range_seconds() {
        assert_eq!(seconds_to_utc(1_700_000_000).unwrap().unix_timestamp(), 1_700_000_000);
        assert!(seconds_to_utc(MAX_STORED_EPOCH_SECONDS).is_ok());
        for seconds in [-1, MAX_STORED_EPOCH_SECONDS + 1, i64::MAX, i64::MIN] {
            assert!(seconds_to_utc(seconds).is_err(), "{} accepted", seconds);
        }
    }
}
