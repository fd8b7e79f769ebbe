use crate::domain::error::DomainError;

/// Fail fast on a missing or blank named input.
///
/// Returns the trimmed value so callers never carry surrounding whitespace
/// into resource names.
pub fn require_non_empty<'a>(value: Option<&'a str>, variable: &str) -> Result<&'a str, DomainError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::missing_input(variable)),
    }
}

/// Centralized domain validation.
///
/// Checks that span more than one field live here rather than on the
/// configuration structs themselves.
pub struct DomainValidator;

impl DomainValidator {
    /// `0 <= min_healthy <= 100 <= max_percent`.
    pub fn validate_rolling_bounds(min_healthy: u32, max_percent: u32) -> Result<(), DomainError> {
        if min_healthy > 100 || max_percent < 100 {
            return Err(DomainError::InvalidRollingBounds {
                min_healthy,
                max_percent,
            });
        }
        Ok(())
    }

    /// An IPv4 CIDR block such as `203.0.113.7/32`.
    pub fn validate_cidr(variable: &str, cidr: &str) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::invalid_input(variable, format!("{cidr}: {reason}"));

        let (address, bits) = cidr
            .split_once('/')
            .ok_or_else(|| invalid("expected <address>/<prefix-length>"))?;

        let octets: Vec<&str> = address.split('.').collect();
        if octets.len() != 4 || octets.iter().any(|o| o.parse::<u8>().is_err()) {
            return Err(invalid("address must be four octets 0-255"));
        }

        match bits.parse::<u8>() {
            Ok(b) if b <= 32 => Ok(()),
            _ => Err(invalid("prefix length must be 0-32")),
        }
    }

    /// A port number in the usable range.
    pub fn validate_port(variable: &str, port: u32) -> Result<(), DomainError> {
        if port == 0 || port > u32::from(u16::MAX) {
            return Err(DomainError::invalid_input(
                variable,
                format!("{port} is not a valid port"),
            ));
        }
        Ok(())
    }
}
