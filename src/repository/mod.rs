//! Database repository layer

pub mod attendance_repo;
pub mod directory_repo;
pub mod leave_repo;
pub mod memory;

pub use attendance_repo::{AttendanceStore, PgAttendanceStore};
pub use directory_repo::{DirectoryStore, PgDirectoryStore};
pub use leave_repo::{LeaveStore, PgLeaveStore};
pub use memory::{InMemoryAttendanceStore, InMemoryDirectoryStore, InMemoryLeaveStore};
