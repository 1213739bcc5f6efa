//! Event records, their content blocks, and lookup by id.

mod block;
mod lookup;
mod record;

pub use block::{BlockKind, ContentBlock, ImageLayout, ImageRef};
pub use lookup::{EventRecordLookup, InMemoryEventLookup, JsonDirEventLookup};
pub use record::{or_not_specified, Coordinator, EventRecord, NOT_SPECIFIED};
