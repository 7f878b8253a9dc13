//! First-person camera, its input controller and the view/projection uniform.
//!
//! Angles are in degrees. Yaw turns around +Y, pitch around +X, and a camera
//! with both at zero looks down -Z.

use cgmath::{Deg, Matrix3, Matrix4, Point3, SquareMatrix, Vector3, perspective};

/// Pitch never leaves this range so the camera can't flip over.
pub const MAX_PITCH: f32 = 80.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0))
    }
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Deg<f32>>, P: Into<Deg<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    fn yaw_rotation(&self) -> Matrix3<f32> {
        Matrix3::from_angle_y(self.yaw)
    }

    /// Unit vector the camera looks along.
    pub fn look_direction(&self) -> Vector3<f32> {
        self.yaw_rotation() * Matrix3::from_angle_x(self.pitch) * -Vector3::unit_z()
    }

    /// Horizontal unit vector pointing to the camera's right.
    pub fn side_direction(&self) -> Vector3<f32> {
        self.yaw_rotation() * Vector3::unit_x()
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            self.position,
            self.position + self.look_direction(),
            Vector3::unit_y(),
        )
    }
}

pub struct Projection {
    aspect: f32,
    fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
}

impl Default for Projection {
    /// The projection keeps a fixed 4:3 aspect whatever the output resolution;
    /// the host scales the frame to the screen.
    fn default() -> Self {
        Self::new(640, 480, Deg(45.0), 5.0, 500.0)
    }
}

impl Projection {
    pub fn new<F: Into<Deg<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Perspective matrix with Y flipped, since the host reads the
    /// framebuffer with a top-left origin.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_nonuniform_scale(1.0, -1.0, 1.0)
            * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// One frame of camera-relevant input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CameraInput {
    pub mouse_dx: i32,
    pub mouse_dy: i32,
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug)]
pub struct CameraController {
    speed: f32,
    yaw_sensitivity: f32,
    pitch_sensitivity: f32,
    max_mouse_delta: i32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.25, 0.20, 0.10)
    }
}

impl CameraController {
    pub fn new(speed: f32, yaw_sensitivity: f32, pitch_sensitivity: f32) -> Self {
        Self {
            speed,
            yaw_sensitivity,
            pitch_sensitivity,
            max_mouse_delta: 20,
        }
    }

    /// Turn first, then move along the new heading.
    pub fn update_camera(&self, camera: &mut Camera, input: &CameraInput) {
        let dx = input.mouse_dx.clamp(-self.max_mouse_delta, self.max_mouse_delta) as f32;
        let dy = input.mouse_dy.clamp(-self.max_mouse_delta, self.max_mouse_delta) as f32;
        camera.yaw -= Deg(self.yaw_sensitivity * dx);
        camera.pitch -= Deg(self.pitch_sensitivity * dy);
        camera.pitch = Deg(camera.pitch.0.clamp(-MAX_PITCH, MAX_PITCH));

        let forward = camera.look_direction() * self.speed;
        let side = camera.side_direction() * self.speed;
        if input.forward {
            camera.position += forward;
        }
        if input.backward {
            camera.position -= forward;
        }
        if input.left {
            camera.position -= side;
        }
        if input.right {
            camera.position += side;
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }

    /// Column-major floats as `glUniformMatrix4fv` expects them.
    pub fn as_slice(&self) -> &[f32] {
        bytemuck::cast_slice(&self.view_proj)
    }
}
