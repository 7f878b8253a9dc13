//! Shader programs. The viewer needs exactly one: textured cubes lit by a
//! single point light.

pub mod cube;
