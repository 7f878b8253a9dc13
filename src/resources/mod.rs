/**
 * This module contains all logic for loading textures from external files or
 * from content handed over by the host.
 */
pub mod texture;
