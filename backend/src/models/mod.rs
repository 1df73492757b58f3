pub mod macros;
pub mod progress;
pub mod selection;
pub mod tile;
pub mod time;

pub use progress::*;
pub use selection::*;
pub use tile::*;
pub use time::*;
