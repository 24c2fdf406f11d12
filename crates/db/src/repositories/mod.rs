//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. All statements are
//! parameterized; no SQL is ever assembled from untrusted input.

pub mod note_repo;
pub mod session_repo;
pub mod user_repo;

pub use note_repo::NoteRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
