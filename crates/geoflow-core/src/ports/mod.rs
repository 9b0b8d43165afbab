//! Ports: the seams to the outside world.
//!
//! Each trait hides an external concern (storage, time, id minting) so the
//! app layer can be exercised against in-memory implementations.

pub mod clock;
pub mod id_generator;
pub mod repository;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::repository::{Repository, TaskQuery};
