//! GL resource ownership.
//!
//! A [`GlContext`] lives exactly as long as the host's GL context: it is built
//! in `context_reset` and torn down in `context_destroy`. It remembers what it
//! last uploaded so the per-frame sync calls only touch the GPU when the
//! scene actually changed.

use std::ffi::CString;

use anyhow::{Result, anyhow};
use glow::HasContext;

use crate::{
    data_structures::block::{BlockGrid, GridParams},
    libretro::sys::retro_hw_get_proc_address_t,
    pipelines::cube::mk_cube_program,
    resources::texture::{TextureData, TextureSource},
};

/// The texture the scene should currently show. `revision` is bumped every
/// time the source changes so identical sources are reloaded on purpose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneTexture {
    pub source: TextureSource,
    pub revision: u64,
}

/// What a context last uploaded. A fresh context starts with nothing, so
/// both the grid and the texture are pending after every `context_reset`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Uploads {
    grid: Option<GridParams>,
    texture_revision: Option<u64>,
}

impl Uploads {
    /// Whether the vertex buffer has to be rebuilt for `params`. Records
    /// `params` as uploaded when it does.
    pub fn claim_grid(&mut self, params: GridParams) -> bool {
        if self.grid == Some(params) {
            return false;
        }
        self.grid = Some(params);
        true
    }

    /// Whether `revision` still has to be loaded. Every revision is claimed
    /// once, whether or not the load then succeeds.
    pub fn claim_texture(&mut self, revision: u64) -> bool {
        if self.texture_revision == Some(revision) {
            return false;
        }
        self.texture_revision = Some(revision);
        true
    }
}

pub struct GlContext {
    pub(crate) gl: glow::Context,
    pub(crate) program: glow::NativeProgram,
    pub(crate) vbo: glow::NativeBuffer,
    pub(crate) texture: Option<glow::NativeTexture>,
    pub(crate) vertex_count: i32,
    uploads: Uploads,
}

impl std::fmt::Debug for GlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("program", &self.program)
            .field("vbo", &self.vbo)
            .field("texture", &self.texture)
            .field("vertex_count", &self.vertex_count)
            .field("uploads", &self.uploads)
            .finish_non_exhaustive()
    }
}

impl GlContext {
    /// Load GL entry points through the host's `get_proc_address`.
    ///
    /// # Safety
    ///
    /// The host's GL context must be current and `get_proc_address` must be
    /// the loader the host handed out for it.
    pub unsafe fn from_loader(get_proc_address: retro_hw_get_proc_address_t) -> Result<Self> {
        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                let Ok(name) = CString::new(name) else {
                    return std::ptr::null();
                };
                match get_proc_address(name.as_ptr()) {
                    Some(f) => f as *const std::os::raw::c_void,
                    None => std::ptr::null(),
                }
            })
        };
        unsafe { Self::new(gl) }
    }

    /// Compile the program and allocate the vertex buffer. Grid and texture
    /// are uploaded lazily by the sync calls.
    ///
    /// # Safety
    ///
    /// `gl` must belong to the context that is current on this thread.
    pub unsafe fn new(gl: glow::Context) -> Result<Self> {
        unsafe {
            let program = mk_cube_program(&gl)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_program(program);
                    return Err(anyhow!("Vertex buffer creation failed: {e}"));
                }
            };
            Ok(Self {
                gl,
                program,
                vbo,
                texture: None,
                vertex_count: 0,
                uploads: Uploads::default(),
            })
        }
    }

    /// Rebuild and upload the cube grid if `params` differ from what the
    /// buffer currently holds.
    ///
    /// # Safety
    ///
    /// The context must be current.
    pub unsafe fn sync_grid(&mut self, params: GridParams) {
        if !self.uploads.claim_grid(params) {
            return;
        }
        let grid = BlockGrid::new(params);
        log::info!(
            "Uploading {} cubes ({} vertices)",
            params.cube_count(),
            grid.vertices.len()
        );
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, grid.as_bytes(), glow::STATIC_DRAW);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        self.vertex_count = i32::try_from(grid.vertices.len()).unwrap_or(i32::MAX);
    }

    /// Reload the texture if the scene moved on to a new revision. A failed
    /// load is reported once and leaves the grid untextured until the next
    /// revision.
    ///
    /// # Safety
    ///
    /// The context must be current.
    pub unsafe fn sync_texture(&mut self, texture: &SceneTexture) {
        if !self.uploads.claim_texture(texture.revision) {
            return;
        }
        unsafe {
            if let Some(old) = self.texture.take() {
                self.gl.delete_texture(old);
            }
            match texture.source.load() {
                Ok(data) => match self.upload_texture(&data) {
                    Ok(tex) => {
                        log::info!(
                            "Loaded texture {} ({}x{})",
                            texture.source,
                            data.width,
                            data.height
                        );
                        self.texture = Some(tex);
                    }
                    Err(e) => log::error!("Couldn't upload texture {}: {e:#}", texture.source),
                },
                Err(e) => log::error!("{e:#}"),
            }
        }
    }

    unsafe fn upload_texture(&self, data: &TextureData) -> Result<glow::NativeTexture> {
        let width = i32::try_from(data.width)?;
        let height = i32::try_from(data.height)?;
        unsafe {
            let tex = self
                .gl
                .create_texture()
                .map_err(|e| anyhow!("Texture creation failed: {e}"))?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(&data.pixels),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(tex)
        }
    }

    /// Release every GL object. Only valid while the context is still alive;
    /// after a context loss the handles are simply dropped instead.
    ///
    /// # Safety
    ///
    /// The context must be current.
    pub unsafe fn destroy(self) {
        unsafe {
            if let Some(tex) = self.texture {
                self.gl.delete_texture(tex);
            }
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_program(self.program);
        }
    }
}
