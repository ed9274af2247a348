//! # Validation Module
//!
//! Input validation, coercion and derived-field calculation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP body (serde)                                            │
//! │  ├── Shape only: fields are Option<_> / serde_json::Value              │
//! │  └── Missing JSON never fails deserialization                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Presence ("Dados incompletos")                                    │
//! │  ├── Coercion (price → Money, stock/tag id → integer)                  │
//! │  └── Business rules (stock > 0, price >= 0, birth date format)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (stock >= 0)                                     │
//! │  ├── UNIQUE (email, tag name)                                          │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{BIRTH_DATE_FORMAT, MAX_IMAGE_REF_LEN, MAX_NAME_LEN, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Presence
// =============================================================================

/// Unwraps an optional field or reports it as required.
pub fn require<T>(field: &str, value: Option<T>) -> ValidationResult<T> {
    value.ok_or_else(|| ValidationError::required(field))
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (user, tag, item).
///
/// ## Rules
/// - Trimmed, must not be empty
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use shelf_core::validation::validate_name;
///
/// assert_eq!(validate_name("nome", "  Ficção ").unwrap(), "Ficção");
/// assert!(validate_name("nome", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates an email address.
///
/// Only a structural check (`local@domain`); deliverability is not our
/// concern. Returns the trimmed address.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    if email.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(email.to_string())
        }
        _ => Err(ValidationError::invalid("email", "must look like name@domain")),
    }
}

/// Validates a raw password before hashing. Only emptiness is rejected.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("senha"));
    }
    Ok(())
}

/// Validates an image reference (URL or path). Must not be empty.
pub fn validate_image_ref(image: &str) -> ValidationResult<String> {
    let image = image.trim();

    if image.is_empty() {
        return Err(ValidationError::required("imagem_url"));
    }

    if image.len() > MAX_IMAGE_REF_LEN {
        return Err(ValidationError::TooLong {
            field: "imagem_url".to_string(),
            max: MAX_IMAGE_REF_LEN,
        });
    }

    Ok(image.to_string())
}

// =============================================================================
// Dates
// =============================================================================

/// Parses a birth date in `YYYY-MM-DD` form.
///
/// ## Example
/// ```rust
/// use shelf_core::validation::parse_birth_date;
///
/// assert!(parse_birth_date(Some("2000-03-01")).is_ok());
/// assert!(parse_birth_date(Some("01/03/2000")).is_err());
/// assert!(parse_birth_date(None).is_err());
/// ```
pub fn parse_birth_date(raw: Option<&str>) -> ValidationResult<NaiveDate> {
    let raw = require("data_nascimento", raw)?;

    NaiveDate::parse_from_str(raw.trim(), BIRTH_DATE_FORMAT)
        .map_err(|_| ValidationError::invalid("data_nascimento", "expected YYYY-MM-DD"))
}

/// Age in whole years on `today`.
///
/// Year difference, minus one when today's (month, day) comes before the
/// birthday's (month, day).
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use shelf_core::validation::age_on;
///
/// let birth = NaiveDate::from_ymd_opt(2000, 3, 1).unwrap();
/// assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()), 23);
/// assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()), 24);
/// ```
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i64 {
    let years = i64::from(today.year() - birth.year());
    let before_birthday = (today.month(), today.day()) < (birth.month(), birth.day());
    if before_birthday {
        years - 1
    } else {
        years
    }
}

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Coerces a JSON value to a price between zero and [`MAX_PRICE_CENTS`].
///
/// Accepts numbers (`29.9`, `1e3`) and numeric strings (`"29.90"`). Extra
/// decimals round to the nearest cent, so `29.999` becomes `30.00`.
pub fn coerce_price(value: &Value) -> ValidationResult<Money> {
    let price = match value {
        Value::Number(n) => n.as_f64().and_then(Money::from_decimal),
        Value::String(s) => Money::parse(s)
            .or_else(|| s.trim().parse::<f64>().ok().and_then(Money::from_decimal)),
        _ => return Err(ValidationError::invalid("preco", "must be a number")),
    }
    .ok_or_else(|| ValidationError::invalid("preco", "must be a finite amount"))?;

    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "preco".to_string(),
        });
    }
    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::invalid(
            "preco",
            format!("must be at most {}", Money::from_cents(MAX_PRICE_CENTS)),
        ));
    }

    Ok(price)
}

/// Coerces a JSON value to an integer.
///
/// Accepts integers, integral floats (`3.0`) and integer strings (`"3"`).
pub fn coerce_integer(field: &str, value: &Value) -> ValidationResult<i64> {
    let invalid = || ValidationError::invalid(field, "must be an integer");

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(invalid()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Validates an initial stock count. Must be strictly positive.
pub fn validate_initial_stock(stock: i64) -> ValidationResult<()> {
    if stock <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "estoque".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let birth = date(2000, 3, 1);
        assert_eq!(age_on(birth, date(2024, 2, 15)), 23);
        assert_eq!(age_on(birth, date(2024, 3, 2)), 24);
    }

    #[test]
    fn test_age_on_birthday() {
        assert_eq!(age_on(date(2000, 3, 1), date(2024, 3, 1)), 24);
    }

    #[test]
    fn test_age_leap_day_birth() {
        let birth = date(2000, 2, 29);
        assert_eq!(age_on(birth, date(2023, 2, 28)), 22);
        assert_eq!(age_on(birth, date(2023, 3, 1)), 23);
    }

    #[test]
    fn test_parse_birth_date() {
        assert_eq!(parse_birth_date(Some("2000-03-01")).unwrap(), date(2000, 3, 1));
        assert!(parse_birth_date(Some("2000-13-01")).is_err());
        assert!(parse_birth_date(Some("")).is_err());
        assert!(matches!(
            parse_birth_date(None),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("nome", "Romance").unwrap(), "Romance");
        assert!(validate_name("nome", "").is_err());
        assert!(validate_name("nome", &"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("x").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_coerce_price() {
        assert_eq!(coerce_price(&json!(29.9)).unwrap(), Money::from_cents(2990));
        assert_eq!(coerce_price(&json!(30)).unwrap(), Money::from_cents(3000));
        assert_eq!(coerce_price(&json!("12.50")).unwrap(), Money::from_cents(1250));
        assert_eq!(coerce_price(&json!(0)).unwrap(), Money::zero());

        assert!(coerce_price(&json!(-1)).is_err());
        assert!(coerce_price(&json!("abc")).is_err());
        assert!(coerce_price(&json!("inf")).is_err());
        assert!(coerce_price(&json!("NaN")).is_err());
        assert!(coerce_price(&json!(true)).is_err());
        assert!(coerce_price(&json!(null)).is_err());
    }

    #[test]
    fn test_coerce_price_rounds_to_cents() {
        assert_eq!(coerce_price(&json!(29.999)).unwrap(), Money::from_cents(3000));
        assert_eq!(coerce_price(&json!("29.999")).unwrap(), Money::from_cents(3000));
        assert_eq!(coerce_price(&json!(1e-7)).unwrap(), Money::zero());
        assert_eq!(coerce_price(&json!("1e3")).unwrap(), Money::from_cents(100_000));
    }

    #[test]
    fn test_coerce_price_upper_bound() {
        let max = Money::from_cents(MAX_PRICE_CENTS);
        assert_eq!(coerce_price(&json!("1000000")).unwrap(), max);
        assert!(matches!(
            coerce_price(&json!("1000000.01")),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(coerce_price(&json!(50_000_000_000_000_000_i64)).is_err());
        assert!(coerce_price(&json!("50000000000000000")).is_err());
        assert!(coerce_price(&json!(1e300)).is_err());
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce_integer("estoque", &json!(3)).unwrap(), 3);
        assert_eq!(coerce_integer("estoque", &json!(3.0)).unwrap(), 3);
        assert_eq!(coerce_integer("estoque", &json!(" 7 ")).unwrap(), 7);

        assert!(coerce_integer("estoque", &json!(3.5)).is_err());
        assert!(coerce_integer("estoque", &json!("3.5")).is_err());
        assert!(coerce_integer("estoque", &json!([])).is_err());
    }

    #[test]
    fn test_validate_initial_stock() {
        assert!(validate_initial_stock(1).is_ok());
        assert!(validate_initial_stock(0).is_err());
        assert!(validate_initial_stock(-4).is_err());
    }

    #[test]
    fn test_require() {
        assert_eq!(require("nome", Some(1)).unwrap(), 1);
        assert!(require::<i32>("nome", None).is_err());
    }
}
