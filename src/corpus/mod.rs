//! Core `Corpus` type orchestrating store lifecycle and mutations.

pub mod lifecycle;
pub mod mutation;
pub mod search;

pub use lifecycle::Corpus;
pub use search::SearchHit;
