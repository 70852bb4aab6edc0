pub mod connection;
pub mod feed;

pub use connection::*;
pub use feed::*;
