use crate::utils::error::{PeriodError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PeriodError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PeriodError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PeriodError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 表格名稱只允許 PostgREST 可直接放進路徑的字元
pub fn validate_identifier(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(PeriodError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Only ASCII letters, digits and '_' are allowed".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| PeriodError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PeriodError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PeriodError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("store.endpoint", "https://school.supabase.co").is_ok());
        assert!(validate_url("store.endpoint", "http://localhost:54321").is_ok());
        assert!(validate_url("store.endpoint", "").is_err());
        assert!(validate_url("store.endpoint", "invalid-url").is_err());
        assert!(validate_url("store.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("store.table", "academic_periods").is_ok());
        assert!(validate_identifier("store.table", "").is_err());
        assert!(validate_identifier("store.table", "periods?select=*").is_err());
    }

    #[test]
    fn test_validate_range_and_required() {
        assert!(validate_range("store.timeout_seconds", 10u64, 1, 120).is_ok());
        assert!(validate_range("store.timeout_seconds", 0u64, 1, 120).is_err());

        let missing: Option<String> = None;
        let err = validate_required_field("store.endpoint", &missing).unwrap_err();
        assert!(matches!(err, PeriodError::MissingConfigError { .. }));
    }
}
