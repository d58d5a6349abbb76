//! Partition name validation
//!
//! Partition names become SQLite table names, so they are restricted
//! to plain identifiers before any SQL is built from them.

use std::fmt;

/// Validation errors for partition identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name contains invalid characters (only alphanumeric and underscore allowed)
    InvalidCharacters(String),
    /// Name is too long
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
    /// Name starts with invalid character (must start with letter or underscore)
    InvalidStartCharacter(String),
    /// Name is reserved by SQLite or is an SQL keyword
    Reserved(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in name '{}': only alphanumeric characters and underscores are allowed", name)
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            ValidationError::Empty => {
                write!(f, "Name cannot be empty")
            }
            ValidationError::InvalidStartCharacter(name) => {
                write!(f, "Name '{}' must start with a letter or underscore", name)
            }
            ValidationError::Reserved(name) => {
                write!(f, "Name '{}' is reserved", name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated partition name that is safe to use as a table name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedPartitionName(String);

impl ValidatedPartitionName {
    const MAX_LENGTH: usize = 63;

    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Self::validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate_identifier(name: &str) -> Result<(), ValidationError> {
        let first_char = name.chars().next().ok_or(ValidationError::Empty)?;

        if name.len() > Self::MAX_LENGTH {
            return Err(ValidationError::TooLong {
                name: name.to_string(),
                length: name.len(),
                max_length: Self::MAX_LENGTH,
            });
        }

        if !first_char.is_ascii_alphabetic() && first_char != '_' {
            return Err(ValidationError::InvalidStartCharacter(name.to_string()));
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ValidationError::InvalidCharacters(name.to_string()));
        }

        if Self::is_reserved(name) {
            return Err(ValidationError::Reserved(name.to_string()));
        }

        Ok(())
    }

    fn is_reserved(name: &str) -> bool {
        const RESERVED_KEYWORDS: &[&str] = &[
            "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "TABLE", "INDEX", "CREATE",
            "DROP", "ALTER", "PRAGMA", "TRANSACTION", "ORDER", "GROUP", "KEY", "VALUES",
        ];

        let upper = name.to_ascii_uppercase();
        upper.starts_with("SQLITE_") || RESERVED_KEYWORDS.contains(&upper.as_str())
    }
}

impl fmt::Display for ValidatedPartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
