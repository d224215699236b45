//! Request extractors.

pub mod actor;

pub use actor::{ActorId, ACTOR_ID_HEADER};
