//! instancing-viewer
//!
//! A libretro core that renders a grid of textured, lit cubes through the
//! host's OpenGL context and lets the player walk around it first-person.
//! Walking into the grid's centre asks the host to launch another core with
//! the content of the currently selected category. The crate builds as a
//! `cdylib` for the host and as an `rlib` so the scene logic can be tested
//! without one.
//!
//! High-level modules
//! - `camera`: first-person camera, controller and the view/projection uniform
//! - `config`: core options, their allowed values and parsing
//! - `context`: GL resources that live as long as the host's context
//! - `data_structures`: vertex layout and the cube grid
//! - `launch`: launch categories, their targets and the collision trigger
//! - `libretro`: raw ABI, the host seam and the exported `retro_*` functions
//! - `pipelines`: the cube shader program
//! - `render`: per-frame drawing
//! - `resources`: texture decoding
//! - `viewer`: per-frame scene logic that ties input, options and launching together
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod launch;
pub mod libretro;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use libretro::frontend::Frontend;
pub use viewer::{FrameUpdate, LoadedContent, Viewer};
