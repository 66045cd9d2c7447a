//! Classification of PostgreSQL constraint violations.

/// Primary key of the `urls` table.
pub const SHORT_CODE_CONSTRAINT: &str = "urls_pkey";

/// Unique constraint on `urls.original_url`.
pub const ORIGINAL_URL_CONSTRAINT: &str = "urls_original_url_key";

/// Returns true if `e` is a unique violation on the given constraint.
pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err.constraint() == Some(constraint)
}
