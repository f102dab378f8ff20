pub mod connector;
pub mod tables;

pub use connector::*;
pub use tables::*;
