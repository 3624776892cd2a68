//! Domain models for taskmaster
//!
//! The todo.txt codec, subtask trees and recurrence rules. Nothing in here
//! touches the filesystem or the system clock directly.

mod clock;
mod codec;
mod date;
mod error;
mod path;
mod recurrence;
mod store;
mod tags;
mod task;
mod tree;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{LineCodec, DEFAULT_MARKER};
pub use date::DateValue;
pub use error::FormatError;
pub use path::{PathError, TaskPath};
pub use recurrence::{ByDay, Frequency, RecurrenceRule, Rule};
pub use store::{StoreError, TaskRef, TaskRefMut, TaskStore};
pub use tags::TagDictionary;
pub use task::{Priority, Task};
pub use tree::{NodeIndex, TaskNode, TaskTree};
