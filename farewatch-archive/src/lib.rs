pub mod entry;
pub mod publisher;
pub mod slug;

pub use entry::ArchiveEntry;
pub use publisher::{ArchivePolicy, ArchivePublisher, ArchiveStore, ExpireSummary, PublishError, PublishSummary};
pub use slug::{archive_slug, slugify};
