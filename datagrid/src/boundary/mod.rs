//! Async helpers at the edge of the engine.
//!
//! The engine itself is synchronous. These adapt it to event sources that
//! are not: a debouncer for filter text and a feed of versioned snapshots.

pub mod debounce;
pub mod feed;

pub use debounce::Debouncer;
pub use feed::SnapshotFeed;
pub use feed::SnapshotPublisher;
