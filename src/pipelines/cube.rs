use anyhow::{Result, anyhow, bail};
use glow::HasContext;

const VERTEX_SHADER: &str = include_str!("cube.vert");
const FRAGMENT_SHADER: &str = include_str!("cube.frag");

/// Uniform names shared by both stages.
pub mod uniforms {
    pub const VIEW_PROJECTION: &str = "uVP";
    pub const MODEL: &str = "uM";
    pub const TEXTURE: &str = "uTexture";
    pub const LIGHT_POSITION: &str = "light_pos";
    pub const AMBIENT_LIGHT: &str = "ambient_light";
}

pub const LIGHT_POSITION: [f32; 3] = [0.0, 150.0, 15.0];
pub const AMBIENT_LIGHT: [f32; 4] = [0.2, 0.2, 0.2, 1.0];

/// Fragment shader source for the context type in use. GLES needs a default
/// float precision in fragment shaders.
pub fn fragment_source() -> String {
    if cfg!(feature = "gles") {
        format!("precision mediump float;\n{FRAGMENT_SHADER}")
    } else {
        FRAGMENT_SHADER.to_string()
    }
}

pub fn vertex_source() -> &'static str {
    VERTEX_SHADER
}

unsafe fn compile_shader(
    gl: &glow::Context,
    kind: u32,
    source: &str,
) -> Result<glow::NativeShader> {
    let stage = if kind == glow::VERTEX_SHADER {
        "Vertex"
    } else {
        "Fragment"
    };
    unsafe {
        let shader = gl
            .create_shader(kind)
            .map_err(|e| anyhow!("{stage} shader creation failed: {e}"))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            bail!("{stage} shader failed to compile! Info Log: {log}");
        }
        Ok(shader)
    }
}

/// Compile and link the cube program.
///
/// # Safety
///
/// The GL context behind `gl` must be current on this thread.
pub unsafe fn mk_cube_program(gl: &glow::Context) -> Result<glow::NativeProgram> {
    unsafe {
        let vert = compile_shader(gl, glow::VERTEX_SHADER, vertex_source())?;
        let frag = match compile_shader(gl, glow::FRAGMENT_SHADER, &fragment_source()) {
            Ok(frag) => frag,
            Err(e) => {
                gl.delete_shader(vert);
                return Err(e);
            }
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(e) => {
                gl.delete_shader(vert);
                gl.delete_shader(frag);
                bail!("Program creation failed: {e}");
            }
        };
        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);

        gl.detach_shader(program, vert);
        gl.detach_shader(program, frag);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            bail!("Program failed to link! Info Log: {log}");
        }
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::vertex::Vertex;

    #[test]
    fn shaders_declare_every_vertex_attribute() {
        for attribute in Vertex::ATTRIBUTES {
            let (name, components) = (attribute.name, attribute.components);
            let declaration = format!("attribute vec{components} {name};");
            assert!(vertex_source().contains(&declaration), "missing {name}");
        }
    }

    #[test]
    fn shaders_declare_every_uniform() {
        let both = format!("{}{}", vertex_source(), fragment_source());
        for name in [
            uniforms::VIEW_PROJECTION,
            uniforms::MODEL,
            uniforms::TEXTURE,
            uniforms::LIGHT_POSITION,
            uniforms::AMBIENT_LIGHT,
        ] {
            assert!(both.contains(&format!(" {name};")), "missing uniform {name}");
        }
    }

    #[test]
    fn fragment_precision_matches_the_context() {
        assert_eq!(
            fragment_source().starts_with("precision mediump float;"),
            cfg!(feature = "gles")
        );
    }
}
