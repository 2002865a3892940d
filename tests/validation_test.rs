//! Comprehensive unit tests for validation.rs module

use chatwoot_reporting::validation::{InputValidator, MAX_DAYS_BACK};
use chatwoot_reporting::ReportError;

#[test]
fn test_validate_name_valid() {
    assert!(InputValidator::validate_name("Sam Carter").is_ok());
}

#[test]
fn test_validate_name_empty() {
    assert!(InputValidator::validate_name("").is_err());
}

#[test]
fn test_validate_name_whitespace_only() {
    assert!(InputValidator::validate_name("   ").is_err());
}

#[test]
fn test_validate_name_too_long() {
    let long_name = "a".repeat(101);
    assert!(InputValidator::validate_name(&long_name).is_err());
}

#[test]
fn test_validate_name_exactly_100_chars() {
    let name = "a".repeat(100);
    assert!(InputValidator::validate_name(&name).is_ok());
}

#[test]
fn test_validate_name_with_control_chars() {
    assert!(InputValidator::validate_name("Sam\0Carter").is_err());
    assert!(InputValidator::validate_name("Sam\nCarter").is_err());
}

#[test]
fn test_validate_name_unicode() {
    assert!(InputValidator::validate_name("José García").is_ok());
}

#[test]
fn test_validate_phone_valid_international() {
    assert!(InputValidator::validate_phone("+61400000000").is_ok());
    assert!(InputValidator::validate_phone("+442012345678").is_ok());
}

#[test]
fn test_validate_phone_with_formatting() {
    assert!(InputValidator::validate_phone("+1 (555) 123-4567").is_ok());
}

#[test]
fn test_validate_phone_accepts_any_stored_format() {
    assert!(InputValidator::validate_phone("0400.000.001").is_ok());
    assert!(InputValidator::validate_phone("12345").is_ok());
    assert!(InputValidator::validate_phone("+61 400 000 003 ext 2").is_ok());
}

#[test]
fn test_validate_phone_empty() {
    assert!(InputValidator::validate_phone("").is_err());
    assert!(InputValidator::validate_phone("   ").is_err());
}

#[test]
fn test_validate_phone_with_control_chars() {
    assert!(InputValidator::validate_phone("0400\0001").is_err());
    assert!(InputValidator::validate_phone("0400\n001").is_err());
}

#[test]
fn test_validate_external_id() {
    assert!(InputValidator::validate_external_id("123456789").is_ok());
    assert!(InputValidator::validate_external_id("PT-0001").is_ok());
    assert!(InputValidator::validate_external_id("").is_err());
    assert!(InputValidator::validate_external_id(&"9".repeat(65)).is_err());
    assert!(InputValidator::validate_external_id("12\u{7}34").is_err());
}

#[test]
fn test_validate_status() {
    for status in ["open", "resolved", "pending", "snoozed", "on-hold", "needs_review"] {
        assert!(InputValidator::validate_status(status).is_ok(), "Failed for status: {}", status);
    }
    assert!(InputValidator::validate_status("").is_err());
    assert!(InputValidator::validate_status("open' OR '1'='1").is_err());
    assert!(InputValidator::validate_status(&"x".repeat(33)).is_err());
}

#[test]
fn test_validate_days_back_bounds() {
    assert!(InputValidator::validate_days_back(0).is_ok());
    assert!(InputValidator::validate_days_back(7).is_ok());
    assert!(InputValidator::validate_days_back(MAX_DAYS_BACK).is_ok());
    assert!(InputValidator::validate_days_back(MAX_DAYS_BACK + 1).is_err());
}

#[test]
fn test_validation_errors_are_invalid_arguments() {
    let err = InputValidator::validate_phone("").unwrap_err();
    assert!(matches!(err, ReportError::InvalidArgument(_)));
    assert!(!err.is_infrastructure());
}

#[test]
fn test_validate_database_url() {
    assert!(InputValidator::validate_database_url("sqlite:data/chatwoot.db").is_ok());
    assert!(InputValidator::validate_database_url("file:chatwoot.db?mode=ro").is_ok());
    assert!(matches!(
        InputValidator::validate_database_url(""),
        Err(ReportError::InvalidConfig(_))
    ));
    assert!(InputValidator::validate_database_url("postgresql://u:p@host/db").is_err());
    assert!(InputValidator::validate_database_url(&format!("sqlite:{}", "a".repeat(1001))).is_err());
}

#[test]
fn test_sanitize_text() {
    assert_eq!(InputValidator::sanitize_text("  open\u{0}  "), "open");
    assert_eq!(InputValidator::sanitize_text("Sam\r\n"), "Sam");
    assert_eq!(InputValidator::sanitize_text("   "), "");
}
