//! Row structs and DTOs.
//!
//! Each submodule has a `FromRow` + `Serialize` struct matching the table row,
//! a `Deserialize` create DTO and, where the entity is editable, an update DTO
//! whose fields are all optional.

pub mod attendance_record;
pub mod routine;
pub mod routine_entry;
pub mod semester;
pub mod subject;
pub mod user;
