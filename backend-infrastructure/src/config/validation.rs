use anyhow::{anyhow, Result};

/// Census ids (worlds, zones, experience types) are unsigned integers.
pub fn validate_numeric_ids(values: &[String], field: &str) -> Result<()> {
    for value in values {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow!("{} contains non-numeric id '{}'", field, value));
        }
    }
    Ok(())
}

pub fn validate_service_id(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("census_service_id must not be empty"));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(anyhow!("census_service_id contains invalid characters"));
    }
    Ok(())
}

pub fn validate_url(value: &str, field: &str, schemes: &[&str]) -> Result<()> {
    let trimmed = value.trim();
    if !schemes
        .iter()
        .any(|scheme| trimmed.starts_with(&format!("{}://", scheme)))
    {
        return Err(anyhow!("{} must start with one of {:?}", field, schemes));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_reject_words() {
        assert!(validate_numeric_ids(&["17".into(), "40".into()], "stream_worlds").is_ok());
        assert!(validate_numeric_ids(&["all".into()], "stream_worlds").is_err());
    }

    #[test]
    fn service_ids_and_urls() {
        assert!(validate_service_id("example").is_ok());
        assert!(validate_service_id("s:example").is_err());
        assert!(validate_url("wss://push.planetside2.com/streaming", "url", &["wss", "ws"]).is_ok());
        assert!(validate_url("push.planetside2.com", "url", &["wss"]).is_err());
    }
}
