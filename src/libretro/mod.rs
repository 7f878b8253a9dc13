//! Everything that speaks the libretro C ABI.
//!
//! - `sys`: raw structs, callback types and constants
//! - `frontend`: the [`Frontend`](frontend::Frontend) seam and its callback-backed implementation
//! - `exports`: the `retro_*` symbols the host resolves from the shared library

pub mod exports;
pub mod frontend;
pub mod sys;
