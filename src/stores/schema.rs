//! Table definition shared by the service boot sequence and the migrator.

pub const USERS_TABLE: &str = "users";

/// Idempotent DDL for the `users` table
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id CHAR(36) NOT NULL PRIMARY KEY,
    fullname VARCHAR(255) NOT NULL,
    study_level VARCHAR(255) NOT NULL,
    age INT NOT NULL,
    created_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
    updated_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6) ON UPDATE CURRENT_TIMESTAMP(6),
    CONSTRAINT chk_users_age CHECK (age > 0 AND age <= 150),
    INDEX idx_users_created_at (created_at)
)
"#;

/// Number of tables named `?` in the current database
pub const TABLE_EXISTS: &str = "SELECT COUNT(*) FROM information_schema.tables \
     WHERE table_schema = DATABASE() AND table_name = ?";

pub const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";
