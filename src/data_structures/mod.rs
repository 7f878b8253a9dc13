//! Engine data structures: vertex layout and the cube grid built from it.
//!
//! - `vertex` holds the interleaved vertex format and the unit cube table
//! - `block` expands the unit cube into a size³ grid ready for upload

pub mod block;
pub mod vertex;
