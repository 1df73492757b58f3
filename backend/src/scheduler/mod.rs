//! Tile selection engine.
//!
//! Picks the next tile to observe from the nightly plan:
//!
//! - [`overhead`]: focus and slew setup time between pointings
//! - [`window`]: LST window and Moon/object avoidance predicate
//! - [`ephemeris`]: the sky ephemeris provider interface
//! - [`ranking`]: the merit function and selection strategies
//! - [`selector`]: the single-pass engine tying them together

pub mod ephemeris;
pub mod overhead;
pub mod ranking;
pub mod selector;
pub mod window;

pub use ephemeris::{PrefetchedMoon, SkyEphemeris, SkyQuery};
pub use overhead::compute_overhead;
pub use ranking::{merit, SelectionStrategy};
pub use selector::{SelectionRequest, TileSelector};
pub use window::{is_observable, LstWindowPolicy, Observability, ObservingInstant, Rejection};
