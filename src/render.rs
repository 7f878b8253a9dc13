//! Per-frame drawing.
//!
//! [`Frame`] is everything the viewer decided for this frame; [`GlContext::draw`]
//! turns it into GL calls against the host's framebuffer and restores the
//! bindings it touched afterwards, since the host shares the context.

use std::num::NonZeroU32;

use glow::HasContext;

use crate::{
    camera::CameraUniform,
    config::Resolution,
    context::GlContext,
    data_structures::vertex::Vertex,
    pipelines::cube::{AMBIENT_LIGHT, LIGHT_POSITION, uniforms},
};

pub const CLEAR_COLOUR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

#[derive(Clone, Copy, Debug)]
pub struct Frame {
    /// Host framebuffer object, 0 for the default framebuffer.
    pub framebuffer: usize,
    pub resolution: Resolution,
    pub camera: CameraUniform,
}

fn framebuffer_handle(raw: usize) -> Option<glow::NativeFramebuffer> {
    u32::try_from(raw)
        .ok()
        .and_then(NonZeroU32::new)
        .map(glow::NativeFramebuffer)
}

impl GlContext {
    /// Draw the uploaded grid.
    ///
    /// # Safety
    ///
    /// The context must be current.
    pub unsafe fn draw(&self, frame: &Frame) {
        let gl = &self.gl;
        let [r, g, b, a] = CLEAR_COLOUR;
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer_handle(frame.framebuffer));
            gl.clear_color(r, g, b, a);
            gl.viewport(
                0,
                0,
                frame.resolution.width as i32,
                frame.resolution.height as i32,
            );
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.use_program(Some(self.program));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            let mut enabled = Vec::with_capacity(Vertex::ATTRIBUTES.len());
            for attribute in Vertex::ATTRIBUTES {
                let Some(location) = gl.get_attrib_location(self.program, attribute.name) else {
                    log::warn!("Attribute {} is not active in the program", attribute.name);
                    continue;
                };
                gl.vertex_attrib_pointer_f32(
                    location,
                    attribute.components,
                    glow::FLOAT,
                    false,
                    Vertex::STRIDE,
                    attribute.offset,
                );
                gl.enable_vertex_attrib_array(location);
                enabled.push(location);
            }

            gl.enable(glow::DEPTH_TEST);
            gl.enable(glow::CULL_FACE);

            let location = |name: &str| gl.get_uniform_location(self.program, name);
            gl.uniform_1_i32(location(uniforms::TEXTURE).as_ref(), 0);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, self.texture);

            let [x, y, z] = LIGHT_POSITION;
            gl.uniform_3_f32(location(uniforms::LIGHT_POSITION).as_ref(), x, y, z);
            let [r, g, b, a] = AMBIENT_LIGHT;
            gl.uniform_4_f32(location(uniforms::AMBIENT_LIGHT).as_ref(), r, g, b, a);
            gl.uniform_matrix_4_f32_slice(
                location(uniforms::VIEW_PROJECTION).as_ref(),
                false,
                frame.camera.as_slice(),
            );
            gl.uniform_matrix_4_f32_slice(location(uniforms::MODEL).as_ref(), false, &IDENTITY);

            if self.vertex_count > 0 {
                gl.draw_arrays(glow::TRIANGLES, 0, self.vertex_count);
            }

            gl.use_program(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            for location in enabled {
                gl.disable_vertex_attrib_array(location);
            }
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }
}
