//! Voice corpus access: datagrams, the timeline store, units and targets.
//!
//! The store and the unit database are consumed through traits; the concrete
//! in-memory implementations here back the command-line front end and the tests.

mod datagram;
pub mod phones;
mod target;
mod timeline;
mod unit;

pub use datagram::{BYTES_PER_SAMPLE, Datagram};
pub use target::{Request, RequestEntry, SelectedUnit, Target};
pub use timeline::{DatagramStore, MemoryTimeline};
pub use unit::{Unit, UnitDatabase, UnitIndex, UnitIndexFile, UnitRecord};
