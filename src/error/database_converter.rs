use crate::error::AppError;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// PostgreSQL reports the offending key in the error detail
/// (`Key (token)=(abc) already exists.`), which is enough to build a
/// `Duplicate` error without a constraint-name lookup table.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let entity = info.table_name().unwrap_or("resource").to_string();

        match kind {
            DatabaseErrorKind::UniqueViolation => match info.details().and_then(parse_key_detail) {
                Some((field, value)) => AppError::Duplicate {
                    entity,
                    field,
                    value,
                },
                None => AppError::Database {
                    operation: operation.to_string(),
                    source: anyhow::Error::msg(format!(
                        "Unique constraint violation: {}",
                        info.message()
                    )),
                },
            },
            DatabaseErrorKind::NotNullViolation => AppError::Validation {
                field: info.column_name().unwrap_or("unknown").to_string(),
                reason: format!("Field is required for {}", entity),
            },
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(info.message().to_string()),
            },
        }
    }
}

/// Extracts `(field, value)` from a PostgreSQL key detail string.
fn parse_key_detail(detail: &str) -> Option<(String, String)> {
    let rest = detail.strip_prefix("Key (")?;
    let (field, rest) = rest.split_once(")=(")?;
    let (value, _) = rest.rsplit_once(')')?;
    Some((field.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_detail() {
        assert_eq!(
            parse_key_detail("Key (token)=(abc123) already exists."),
            Some(("token".to_string(), "abc123".to_string()))
        );
    }

    #[test]
    fn test_parse_key_detail_unrecognized() {
        assert_eq!(parse_key_detail("something else entirely"), None);
        assert_eq!(parse_key_detail("Key (token) missing value"), None);
    }

    #[test]
    fn test_not_found_conversion() {
        let err = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "select");
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn test_other_errors_become_database_errors() {
        let err = DatabaseErrorConverter::convert_diesel_error(
            DieselError::RollbackTransaction,
            "delete device",
        );
        match err {
            AppError::Database { operation, .. } => assert_eq!(operation, "delete device"),
            other => panic!("Expected Database error, got {:?}", other),
        }
    }
}
