//! On-disk store I/O.

pub mod segment;
