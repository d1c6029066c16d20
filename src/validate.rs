// Local, synchronous field validation. These checks run before any backend
// call and block submission on failure.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

pub const PHONE_DIGITS: usize = 10;
pub const OTP_DIGITS: usize = 4;

// Plate shape LL-DD-LL-DDDD, e.g. MH-12-AB-1234.
static REGISTRATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{2}-[0-9]{2}-[A-Z]{2}-[0-9]{4}$").unwrap()
});

/// Strips everything but digits from user phone input.
pub fn normalize_phone(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// A phone number is valid iff it reduces to exactly 10 digits. A country
/// prefix ("+91 ...") makes it 12 digits and is rejected; callers should ask
/// for the bare mobile number.
pub fn validate_phone(input: &str) -> Result<String, AppError> {
    let digits = normalize_phone(input);
    if digits.len() != PHONE_DIGITS {
        return Err(AppError::Validation(format!(
            "Enter a valid {}-digit mobile number",
            PHONE_DIGITS
        )));
    }
    Ok(digits)
}

pub fn validate_otp(input: &str) -> Result<String, AppError> {
    let trimmed = input.trim();
    if trimmed.len() != OTP_DIGITS || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(format!(
            "Enter the {}-digit OTP",
            OTP_DIGITS
        )));
    }
    Ok(trimmed.to_string())
}

/// Uppercases a plate and re-hyphenates it into the LL-DD-LL-DDDD shape.
/// Input with separators already in place passes through unchanged apart
/// from case.
pub fn normalize_registration(input: &str) -> String {
    let compact: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if compact.len() != 10 {
        // Not re-hyphenatable; return as-is so validation reports the shape
        return input.trim().to_ascii_uppercase();
    }
    format!(
        "{}-{}-{}-{}",
        &compact[0..2],
        &compact[2..4],
        &compact[4..6],
        &compact[6..10]
    )
}

/// Validates a registration number after normalization. The serial "0000"
/// is never issued and is rejected outright.
pub fn validate_registration(input: &str) -> Result<String, AppError> {
    let plate = normalize_registration(input);
    if !REGISTRATION_RE.is_match(&plate) {
        return Err(AppError::Validation(
            "Enter a valid registration number, e.g. MH-12-AB-1234".to_string(),
        ));
    }
    if plate.ends_with("0000") {
        return Err(AppError::Validation(
            "Registration number cannot end in 0000".to_string(),
        ));
    }
    Ok(plate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_requires_exactly_ten_digits() {
        assert_eq!(validate_phone("9876543210").unwrap(), "9876543210");
        assert!(validate_phone("987654321").is_err()); // 9 digits
        // "+91 98765-43210" strips to 12 digits and is rejected
        assert!(validate_phone("+91 98765-43210").is_err());
        assert_eq!(normalize_phone("+91 98765-43210"), "919876543210");
    }

    #[test]
    fn phone_normalization_drops_formatting() {
        assert_eq!(validate_phone("98765 43210").unwrap(), "9876543210");
        assert_eq!(validate_phone("(98765)-43210").unwrap(), "9876543210");
    }

    #[test]
    fn otp_is_fixed_length_digits() {
        assert!(validate_otp("1234").is_ok());
        assert!(validate_otp(" 1234 ").is_ok());
        assert!(validate_otp("123").is_err());
        assert!(validate_otp("12a4").is_err());
    }

    #[test]
    fn registration_accepts_canonical_plate() {
        assert_eq!(validate_registration("AB-12-CD-1234").unwrap(), "AB-12-CD-1234");
    }

    #[test]
    fn registration_rejects_all_zero_serial() {
        assert!(validate_registration("AB-12-CD-0000").is_err());
    }

    #[test]
    fn registration_normalizes_compact_lowercase_input() {
        assert_eq!(normalize_registration("ab12cd1234"), "AB-12-CD-1234");
        assert_eq!(validate_registration("ab12cd1234").unwrap(), "AB-12-CD-1234");
    }

    #[test]
    fn registration_rejects_wrong_shape() {
        assert!(validate_registration("A1-12-CD-1234").is_err());
        assert!(validate_registration("AB-12-CD-12").is_err());
        assert!(validate_registration("").is_err());
    }
}
