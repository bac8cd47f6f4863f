//! Primitive aliases shared by every crate.

/// Row id. Every table uses a `BIGSERIAL` key, and users, semesters and
/// everything below them are addressed by it.
pub type DbId = i64;

/// `TIMESTAMPTZ` columns (`created_at`, `updated_at`, `deleted_at`).
pub type Timestamp = chrono::DateTime<chrono::Utc>;
