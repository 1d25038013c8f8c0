use bytemuck::{Pod, Zeroable};

/// Perspective camera of a render graph.
///
/// Right-handed, looking down -Z, depth mapped to `[0, 1]` as wgpu expects.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y_degrees,
            aspect,
            near,
            far,
            position: [0.0, 0.0, 0.0],
        }
    }

    /// Camera every new beacon starts with: 75°, square, backed off to z = 3.
    pub fn beacon_default() -> Self {
        Self::new(75.0, 1.0, 0.1, 1000.0).with_position([0.0, 0.0, 3.0])
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    /// Updates the aspect ratio. Non-finite or non-positive values are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Column-major projection matrix.
    pub fn projection_matrix(&self) -> [[f32; 4]; 4] {
        let f = 1.0 / (self.fov_y_degrees.to_radians() * 0.5).tan();
        let range = self.near - self.far;
        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, self.far / range, -1.0],
            [0.0, 0.0, self.near * self.far / range, 0.0],
        ]
    }

    /// Column-major `projection * view`, where the view only translates by `-position`.
    pub fn view_projection(&self) -> [[f32; 4]; 4] {
        let mut m = self.projection_matrix();
        let [x, y, z] = self.position;
        for row in 0..4 {
            m[3][row] -= m[0][row] * x + m[1][row] * y + m[2][row] * z;
        }
        m
    }
}

/// GPU layout of the camera uniform written before every draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self { view_proj: camera.view_projection() }
    }
}
