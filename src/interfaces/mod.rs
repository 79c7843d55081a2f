//! Trait seams between the core and its collaborators: the persistent
//! store, the text generator, and the outbound message gateway.

pub mod outbound;
pub mod store;

pub use outbound::{ClientError, GenerationRequest, MessageSender, TextGenerator};
pub use store::{ActionRecord, ActionOutcome, GameStore, StoreError, TeamTotals};
