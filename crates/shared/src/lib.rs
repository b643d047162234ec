//! Prescription Reminder Shared Utilities
//!
//! This crate provides common functionality for every crate of the
//! prescription reminder client:
//! - Identity types (account addresses, roles, password hashes)
//! - Input validation with accumulated, field-level errors
//! - The client-wide error taxonomy
//! - Configuration loading
//! - Logging setup

use serde::{Deserialize, Serialize};

pub mod error;
pub mod logging;
pub mod settings;

// Re-export commonly used items
pub use error::*;
pub use settings::*;
pub use types::*;
pub use validation::*;

/// Common types used across crates
pub mod types {
    use super::*;
    use sha2::{Digest, Sha256};
    use std::hash::{Hash, Hasher};

    /// Identifier of the chain the wallet is connected to
    pub type NetworkId = u64;

    /// Account address as handed out by the wallet provider (`0x` + 40 hex digits).
    ///
    /// The original casing is kept for display; comparison ignores case.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    pub struct Address(String);

    impl Address {
        /// Parse and validate an address, trimming surrounding whitespace
        pub fn parse(raw: &str) -> Result<Self, ValidationFailure> {
            let trimmed = raw.trim();
            validation::validate_address(trimmed).into_result()?;
            Ok(Address(trimmed.to_string()))
        }

        /// The all-zero address, used by the contract for "nobody"
        pub fn zero() -> Self {
            Address(format!("0x{}", "0".repeat(40)))
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn is_zero(&self) -> bool {
            self.0[2..].chars().all(|c| c == '0')
        }
    }

    impl PartialEq for Address {
        fn eq(&self, other: &Self) -> bool {
            self.0.eq_ignore_ascii_case(&other.0)
        }
    }

    impl Eq for Address {}

    impl Hash for Address {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.0.to_ascii_lowercase().hash(state);
        }
    }

    impl std::fmt::Display for Address {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::str::FromStr for Address {
        type Err = ValidationFailure;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Address::parse(s)
        }
    }

    impl TryFrom<String> for Address {
        type Error = ValidationFailure;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            Address::parse(&value)
        }
    }

    impl From<Address> for String {
        fn from(address: Address) -> Self {
            address.0
        }
    }

    /// Role a user registered with. Encoded on the wire as `0` / `1`.
    #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
    pub enum Role {
        Patient,
        Doctor,
    }

    impl Role {
        pub fn as_wire(&self) -> u8 {
            match self {
                Role::Patient => 0,
                Role::Doctor => 1,
            }
        }

        pub fn from_wire(value: u64) -> Option<Self> {
            match value {
                0 => Some(Role::Patient),
                1 => Some(Role::Doctor),
                _ => None,
            }
        }

        pub fn from_is_doctor(is_doctor: bool) -> Self {
            if is_doctor {
                Role::Doctor
            } else {
                Role::Patient
            }
        }

        /// Key used when the role is persisted locally
        pub fn as_str(&self) -> &'static str {
            match self {
                Role::Patient => "patient",
                Role::Doctor => "doctor",
            }
        }
    }

    impl std::fmt::Display for Role {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.as_str())
        }
    }

    impl std::str::FromStr for Role {
        type Err = ValidationFailure;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim() {
                "patient" | "0" => Ok(Role::Patient),
                "doctor" | "1" => Ok(Role::Doctor),
                other => {
                    let mut result = ValidationResult::new();
                    result.add_error(
                        "role",
                        &format!("Unknown role '{}'", other),
                        ValidationErrorCode::InvalidFormat,
                    );
                    Err(ValidationFailure::from(result))
                }
            }
        }
    }

    /// Hex-encoded SHA-256 of a password, `0x`-prefixed.
    ///
    /// Only this value ever leaves the client; the comparison happens in the
    /// contract.
    #[derive(Clone, PartialEq, Eq, Serialize)]
    pub struct PasswordHash(String);

    impl PasswordHash {
        pub fn from_password(password: &str) -> Self {
            let mut hasher = Sha256::new();
            hasher.update(password.as_bytes());
            PasswordHash(format!("0x{}", hex::encode(hasher.finalize())))
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl std::fmt::Debug for PasswordHash {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "PasswordHash({}…)", &self.0[..10])
        }
    }
}

/// Input validation helpers
pub mod validation {
    use super::*;
    use once_cell::sync::Lazy;
    use regex::Regex;

    static ADDRESS_PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid address pattern"));

    // Shape only: "08:99" passes.
    static REMINDER_TIME_PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("valid reminder time pattern"));

    /// Validation error with detailed context
    #[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
    pub struct ValidationError {
        pub field: String,
        pub message: String,
        pub code: ValidationErrorCode,
    }

    /// Specific validation error codes for programmatic handling
    #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
    pub enum ValidationErrorCode {
        Required,
        InvalidFormat,
        OutOfRange,
        TooLong,
        InvalidCharacters,
    }

    impl std::fmt::Display for ValidationError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}: {} ({:?})", self.field, self.message, self.code)
        }
    }

    /// Validation result that can accumulate multiple errors
    #[derive(Clone, Debug, Default)]
    pub struct ValidationResult {
        pub errors: Vec<ValidationError>,
    }

    impl ValidationResult {
        pub fn new() -> Self {
            Self { errors: Vec::new() }
        }

        pub fn add_error(&mut self, field: &str, message: &str, code: ValidationErrorCode) {
            self.errors.push(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code,
            });
        }

        pub fn is_valid(&self) -> bool {
            self.errors.is_empty()
        }

        pub fn has_code(&self, code: ValidationErrorCode) -> bool {
            self.errors.iter().any(|e| e.code == code)
        }

        pub fn into_result(self) -> Result<(), ValidationFailure> {
            if self.is_valid() {
                Ok(())
            } else {
                Err(ValidationFailure::from(self))
            }
        }

        pub fn merge(&mut self, other: ValidationResult) {
            self.errors.extend(other.errors);
        }
    }

    /// A non-empty set of validation errors, returned before any external call
    #[derive(Clone, Debug, PartialEq)]
    pub struct ValidationFailure {
        pub errors: Vec<ValidationError>,
    }

    impl ValidationFailure {
        pub fn fields(&self) -> Vec<&str> {
            self.errors.iter().map(|e| e.field.as_str()).collect()
        }
    }

    impl From<ValidationResult> for ValidationFailure {
        fn from(result: ValidationResult) -> Self {
            ValidationFailure { errors: result.errors }
        }
    }

    impl std::fmt::Display for ValidationFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            write!(f, "Validation failed: {}", messages.join("; "))
        }
    }

    impl std::error::Error for ValidationFailure {}

    /// Validate an account address (`0x` followed by 40 hex digits)
    pub fn validate_address(address: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        if address.is_empty() {
            result.add_error("address", "Address is required", ValidationErrorCode::Required);
            return result;
        }

        if !ADDRESS_PATTERN.is_match(address) {
            result.add_error(
                "address",
                "Address must be 0x followed by 40 hexadecimal characters",
                ValidationErrorCode::InvalidFormat,
            );
        }

        result
    }

    /// Validate a reminder time.
    ///
    /// Only the `HH:mm` shape is checked, not whether the time exists.
    pub fn validate_reminder_time(time: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !REMINDER_TIME_PATTERN.is_match(time) {
            result.add_error(
                "reminder_time",
                "Invalid format, use HH:mm",
                ValidationErrorCode::InvalidFormat,
            );
        }

        result
    }

    /// Validate that a free-text field is present
    pub fn validate_required(value: &str, field_name: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        if value.trim().is_empty() {
            result.add_error(
                field_name,
                &format!("{} is required", field_name),
                ValidationErrorCode::Required,
            );
        }

        result
    }

    /// Validate a strictly positive whole number typed as text
    pub fn validate_positive_integer(value: &str, field_name: &str) -> ValidationResult {
        let mut result = validate_required(value, field_name);
        if !result.is_valid() {
            return result;
        }

        match value.trim().parse::<u64>() {
            Ok(0) => result.add_error(
                field_name,
                &format!("{} must be at least 1", field_name),
                ValidationErrorCode::OutOfRange,
            ),
            Ok(_) => {}
            Err(_) => result.add_error(
                field_name,
                &format!("{} must be a whole number", field_name),
                ValidationErrorCode::InvalidFormat,
            ),
        }

        result
    }

    /// Validate an email address well enough to decide whether to mail it
    pub fn validate_email(email: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        if email.trim().is_empty() {
            result.add_error("email", "Email is required", ValidationErrorCode::Required);
            return result;
        }

        if !email.contains('@') {
            result.add_error("email", "Email must contain '@'", ValidationErrorCode::InvalidFormat);
        }

        if email.len() > 254 {
            result.add_error(
                "email",
                "Email cannot exceed 254 characters",
                ValidationErrorCode::TooLong,
            );
        }

        if email.chars().any(char::is_whitespace) {
            result.add_error(
                "email",
                "Email cannot contain whitespace",
                ValidationErrorCode::InvalidCharacters,
            );
        }

        result
    }
}
