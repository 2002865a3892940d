use crate::error::{ReportError, Result};

/// Longest window any report will accept, in days (about 20 years)
pub const MAX_DAYS_BACK: u32 = 365 * 20;

/// Argument contract checks for report inputs.
///
/// Every failure is a [`ReportError::InvalidArgument`]; these are caller
/// mistakes and are never softened by the failure policy.
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

fn invalid(message: impl Into<String>) -> ReportError {
    ReportError::InvalidArgument(message.into())
}

impl InputValidator {
    /// Validate an agent or contact display name
    pub fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(invalid("Name cannot be empty"));
        }

        if name.chars().count() > 100 {
            return Err(invalid("Name too long (max 100 characters)"));
        }

        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(invalid("Name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate a phone number used as a lookup key.
    ///
    /// The value is matched verbatim against stored contacts, so any format
    /// is accepted as long as it is not blank and has no control characters.
    pub fn validate_phone(phone: &str) -> Result<()> {
        if phone.trim().is_empty() {
            return Err(invalid("Phone number cannot be empty"));
        }

        if phone.chars().any(char::is_control) {
            return Err(invalid("Phone number contains control characters"));
        }

        Ok(())
    }

    /// Validate an external (Cliniko) patient identifier
    pub fn validate_external_id(external_id: &str) -> Result<()> {
        if external_id.trim().is_empty() {
            return Err(invalid("External identifier cannot be empty"));
        }

        if external_id.len() > 64 {
            return Err(invalid("External identifier too long (max 64 characters)"));
        }

        if external_id.chars().any(char::is_control) {
            return Err(invalid("External identifier contains control characters"));
        }

        Ok(())
    }

    /// Validate a conversation status filter
    pub fn validate_status(status: &str) -> Result<()> {
        if status.is_empty() || status.len() > 32 {
            return Err(invalid("Status must be 1 to 32 characters"));
        }

        if !status.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(invalid(format!("Status contains invalid characters: {status:?}")));
        }

        Ok(())
    }

    /// Validate a recency window
    pub fn validate_days_back(days_back: u32) -> Result<()> {
        if days_back > MAX_DAYS_BACK {
            return Err(invalid(format!(
                "Window of {days_back} days is too large (max {MAX_DAYS_BACK})"
            )));
        }

        if days_back > 365 * 5 {
            tracing::warn!(days_back, "Large report window may be slow");
        }

        Ok(())
    }

    /// Validate a database URL
    pub fn validate_database_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ReportError::InvalidConfig("Database URL cannot be empty".to_string()));
        }

        if url.len() > 1000 {
            return Err(ReportError::InvalidConfig("Database URL too long".to_string()));
        }

        let scheme = url.split_once("://").map(|(scheme, _)| scheme);
        if let Some(scheme) = scheme {
            if scheme != "sqlite" && scheme != "file" {
                return Err(ReportError::InvalidConfig(format!(
                    "Unsupported database scheme: {scheme}"
                )));
            }
        }

        Ok(())
    }

    /// Sanitize free text before it is bound as a parameter
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control())
            .collect::<String>()
            .trim()
            .to_string()
    }
}
