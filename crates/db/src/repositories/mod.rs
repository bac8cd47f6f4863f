//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&PgPool` (or an open transaction) as the first argument. Lookups that
//! take a `user_id` are ownership-scoped: rows belonging to another user are
//! reported exactly like missing rows.

pub mod attendance_record_repo;
pub mod routine_entry_repo;
pub mod routine_repo;
pub mod semester_repo;
pub mod soft_delete;
pub mod subject_repo;
pub mod user_repo;

pub use attendance_record_repo::AttendanceRecordRepo;
pub use routine_entry_repo::RoutineEntryRepo;
pub use routine_repo::RoutineRepo;
pub use semester_repo::SemesterRepo;
pub use soft_delete::SoftDelete;
pub use subject_repo::SubjectRepo;
pub use user_repo::UserRepo;
