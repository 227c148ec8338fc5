//! Domain types shared by every stage of a snapshot assertion:
//! - `SnapshotId`: validated snapshot name
//! - `Dimensions`: image size and congruence
//! - `SnapshotError`: failure taxonomy

pub mod dimensions;
pub mod error;
pub mod snapshot_id;

pub use dimensions::{congruent, Dimensions};
pub use error::{Result, SnapshotError, OUTPUT_WRITTEN_PREFIX};
pub use snapshot_id::SnapshotId;
