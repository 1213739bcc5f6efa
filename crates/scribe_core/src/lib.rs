pub mod error;
pub mod event;
pub mod session;
pub mod store;
pub mod turn;

pub use error::{Result, ScribeError, StoreError, ValidationError};
pub use event::{
    BlockKind, ContentBlock, Coordinator, EventRecord, EventRecordLookup, ImageLayout, ImageRef,
    InMemoryEventLookup, JsonDirEventLookup, NOT_SPECIFIED, or_not_specified,
};
pub use session::{SessionAggregate, SessionId, SessionSummary};
pub use store::{InMemoryMessageStore, MessageStore, SqliteMessageStore, StoreResult};
pub use turn::{ChatTurn, Role, TurnMetadata};
