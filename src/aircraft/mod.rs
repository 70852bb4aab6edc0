pub mod emergency;
pub mod lookup;
pub mod typeinfo;

pub use emergency::*;
pub use lookup::*;
pub use typeinfo::*;

/// Text used for any field the feed or the lookup service did not provide.
pub const NOT_AVAILABLE: &str = "N/A";
