//! Store accessors. Each external collaborator is an async trait carried as
//! an `Arc<dyn ...>` in `AppState`, so tests substitute in-memory fakes and
//! the pipeline never touches a concrete database type.

pub mod candidates;
pub mod jobs;
pub mod resumes;

pub use candidates::{CandidateStore, PgCandidateStore};
pub use jobs::{JobStore, PgJobStore};
pub use resumes::{PgResumePool, ResumePool};
