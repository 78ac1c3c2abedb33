//! Domain models handed to the UI layer.
//!
//! - `Event`: a happening with an optional recording
//! - `Schedule`: an entry of the published schedule
//! - `EntityKind`: selects one of the two cached lists
//!
//! None of these carry storage bookkeeping; see [`crate::store`] for the
//! row types that do.

pub mod event;
pub mod kind;
pub mod schedule;

pub use event::Event;
pub use kind::{EntityKind, ParseKindError};
pub use schedule::Schedule;
