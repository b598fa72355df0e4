//! Faker-backed anonymizer plugins
//!
//! These plugins ignore their input and return freshly generated fake
//! data, so none of them are deterministic across runs.

use super::{Anonymizer, FieldContext};
use crate::domain::Result;
use chrono::{Duration, Utc};
use fake::faker::internet::en::{FreeEmail, Username};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;

/// Replaces the value with a generated full name.
pub struct NameAnonymizer;

impl Anonymizer for NameAnonymizer {
    fn id(&self) -> &'static str {
        "name"
    }

    fn label(&self) -> &'static str {
        "Random name"
    }

    fn anonymize(&self, _input: &str, _context: &FieldContext<'_>) -> Result<String> {
        Ok(Name().fake())
    }
}

/// Replaces the value with a generated email address.
pub struct EmailAnonymizer;

impl Anonymizer for EmailAnonymizer {
    fn id(&self) -> &'static str {
        "email"
    }

    fn label(&self) -> &'static str {
        "Random email address"
    }

    fn anonymize(&self, _input: &str, _context: &FieldContext<'_>) -> Result<String> {
        Ok(FreeEmail().fake())
    }
}

/// Replaces the value with a generated username.
pub struct UsernameAnonymizer;

impl Anonymizer for UsernameAnonymizer {
    fn id(&self) -> &'static str {
        "username"
    }

    fn label(&self) -> &'static str {
        "Random username"
    }

    fn anonymize(&self, _input: &str, _context: &FieldContext<'_>) -> Result<String> {
        Ok(Username().fake())
    }
}

/// Replaces the value with a generated sentence.
pub struct TextAnonymizer;

impl Anonymizer for TextAnonymizer {
    fn id(&self) -> &'static str {
        "text"
    }

    fn label(&self) -> &'static str {
        "Random text"
    }

    fn anonymize(&self, _input: &str, _context: &FieldContext<'_>) -> Result<String> {
        Ok(Sentence(3..8).fake())
    }
}

/// Replaces the value with a random positive integer.
pub struct NumberAnonymizer;

impl Anonymizer for NumberAnonymizer {
    fn id(&self) -> &'static str {
        "number"
    }

    fn label(&self) -> &'static str {
        "Random number"
    }

    fn anonymize(&self, _input: &str, _context: &FieldContext<'_>) -> Result<String> {
        let value: u32 = rand::thread_rng().gen_range(1..1_000_000);
        Ok(value.to_string())
    }
}

/// Replaces the value with a random date in the past fifty years,
/// formatted as `YYYY-MM-DD`.
pub struct DateAnonymizer;

impl Anonymizer for DateAnonymizer {
    fn id(&self) -> &'static str {
        "date"
    }

    fn label(&self) -> &'static str {
        "Random past date"
    }

    fn anonymize(&self, _input: &str, _context: &FieldContext<'_>) -> Result<String> {
        let days = rand::thread_rng().gen_range(0..365 * 50);
        let date = Utc::now() - Duration::days(days);
        Ok(date.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymize::tests::context;

    #[test]
    fn test_email_shape() {
        let output = EmailAnonymizer.anonymize("a@b.com", &context()).unwrap();
        assert!(output.contains('@'));
        assert_ne!(output, "a@b.com");
    }

    #[test]
    fn test_number_is_numeric() {
        let output = NumberAnonymizer.anonymize("42", &context()).unwrap();
        assert!(output.parse::<u32>().is_ok());
    }

    #[test]
    fn test_date_format() {
        let output = DateAnonymizer.anonymize("1980-01-01", &context()).unwrap();
        assert!(chrono::NaiveDate::parse_from_str(&output, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_name_ignores_input() {
        let a = NameAnonymizer.anonymize("John Doe", &context()).unwrap();
        assert!(!a.is_empty());
    }
}
