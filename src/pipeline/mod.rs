//! Pipeline entry points for sync operations.
//!
//! - `Pretalx`: refresh sections and regenerate derived files
//! - `derive`: summaries and the question export
//! - `preprocess`: speaker names and slugs for submissions

pub mod derive;
pub mod preprocess;
pub mod sync;

pub use derive::Submissions;
pub use preprocess::{preprocess, speaker_map};
pub use sync::{Pretalx, ReadMode, SectionKind};
