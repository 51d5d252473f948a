use glam::{Mat3, Quat, Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::camera::core::{Camera, CameraUniform};
use crate::gpu::render_context::RenderContext;
use crate::options::CameraOptions;

/// Radians per pixel of drag at `rotate_speed = 1`.
const ROTATE_SCALE: f32 = 0.01;
/// Focus travel per pixel, as a fraction of the orbit distance.
const PAN_SCALE: f32 = 0.002;
const MIN_DISTANCE: f32 = 0.5;

/// Orbit state: an orientation and distance around a focus point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    /// Rotation taking +Z to the eye direction.
    pub orientation: Quat,
    /// Eye distance from the focus.
    pub distance: f32,
    /// Point the camera orbits.
    pub focus: Vec3,
}

impl Orbit {
    /// Orbit whose eye sits at `eye`, looking at `focus` with +Y up.
    #[must_use]
    pub fn looking_at(eye: Vec3, focus: Vec3) -> Self {
        let offset = eye - focus;
        let distance = offset.length().max(MIN_DISTANCE);
        let z = offset.normalize_or(Vec3::Z);
        let x = Vec3::Y.cross(z).normalize_or(Vec3::X);
        let y = z.cross(x);
        Self {
            orientation: Quat::from_mat3(&Mat3::from_cols(x, y, z)),
            distance,
            focus,
        }
    }

    /// Eye position.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.focus + self.orientation * Vec3::Z * self.distance
    }

    /// Camera up vector.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    fn rotate(&mut self, delta: Vec2, speed: f32) {
        let scale = speed * ROTATE_SCALE;
        let horizontal = Quat::from_axis_angle(self.up(), -delta.x * scale);
        self.orientation = horizontal * self.orientation;
        let right = self.orientation * Vec3::X;
        let vertical = Quat::from_axis_angle(right, -delta.y * scale);
        self.orientation = (vertical * self.orientation).normalize();
    }

    fn pan(&mut self, delta: Vec2, speed: f32) {
        let scale = speed * PAN_SCALE * self.distance;
        let right = self.orientation * Vec3::X;
        self.focus += right * (-delta.x * scale) + self.up() * (delta.y * scale);
    }

    fn zoom(&mut self, delta: f32, speed: f32, max_distance: f32) {
        self.distance *= 1.0 - delta * speed;
        self.distance = self.distance.clamp(MIN_DISTANCE, max_distance.max(MIN_DISTANCE));
    }
}

/// Orbit camera plus its uniform buffer and bind group (group 0).
pub struct CameraController {
    orbit: Orbit,
    home: Orbit,

    /// Projection and view derived from the orbit.
    pub camera: Camera,
    /// CPU copy of the uniform last uploaded.
    pub uniform: CameraUniform,
    /// GPU copy of `uniform`.
    pub buffer: wgpu::Buffer,
    /// Layout of group 0.
    pub layout: wgpu::BindGroupLayout,
    /// Group 0 bound by every draw.
    pub bind_group: wgpu::BindGroup,

    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
}

impl CameraController {
    /// Controller at the configured eye, looking at the origin.
    pub fn new(context: &RenderContext, options: &CameraOptions) -> Self {
        let camera = Camera::from_options(options, context.aspect());
        let orbit = Orbit::looking_at(camera.eye, camera.target);

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera);

        let buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let layout = context
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
                label: Some("Camera Bind Group"),
            });

        let mut controller = Self {
            orbit,
            home: orbit,
            camera,
            uniform,
            buffer,
            layout,
            bind_group,
            rotate_speed: 0.0,
            pan_speed: 0.0,
            zoom_speed: 0.0,
        };
        controller.apply_options(options);
        controller
    }

    /// Take projection and sensitivity from the options. The current
    /// view is kept; only the reset position moves.
    pub fn apply_options(&mut self, options: &CameraOptions) {
        self.camera.fovy = options.fovy;
        self.camera.znear = options.znear;
        self.camera.zfar = options.zfar;
        self.rotate_speed = options.rotate_speed;
        self.pan_speed = options.pan_speed;
        self.zoom_speed = options.zoom_speed;
        self.home = Orbit::looking_at(Vec3::from(options.eye), Vec3::ZERO);
    }

    /// Current orbit.
    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    fn update_camera_pos(&mut self) {
        self.camera.eye = self.orbit.eye();
        self.camera.target = self.orbit.focus;
        self.camera.up = self.orbit.up();
    }

    /// Recompute the uniform from the camera and upload it.
    pub fn update_gpu(&mut self, queue: &wgpu::Queue) {
        self.uniform.update_view_proj(&self.camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    /// Follow a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.camera.aspect = width as f32 / height as f32;
        }
    }

    /// Orbit around the focus by a drag of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.orbit.rotate(delta, self.rotate_speed);
        self.update_camera_pos();
    }

    /// Slide the focus in the view plane.
    pub fn pan(&mut self, delta: Vec2) {
        self.orbit.pan(delta, self.pan_speed);
        self.update_camera_pos();
    }

    /// Move toward (positive) or away from the focus.
    pub fn zoom(&mut self, delta: f32) {
        self.orbit.zoom(delta, self.zoom_speed, self.camera.zfar * 0.5);
        self.update_camera_pos();
    }

    /// Back to the configured eye, looking at the origin.
    pub fn reset(&mut self) {
        self.orbit = self.home;
        self.update_camera_pos();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn looking_at_reproduces_eye() {
        let eye = Vec3::new(0.0, 5.0, 5.0);
        let orbit = Orbit::looking_at(eye, Vec3::ZERO);
        assert!(close(orbit.eye(), eye));
        assert!(orbit.up().y > 0.0);
        assert!((orbit.distance - eye.length()).abs() < 1e-5);
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut orbit = Orbit::looking_at(Vec3::new(0.0, 5.0, 5.0), Vec3::ZERO);
        orbit.rotate(Vec2::new(40.0, -15.0), 0.5);
        assert!((orbit.eye().length() - 50.0_f32.sqrt()).abs() < 1e-4);
        assert!(!close(orbit.eye(), Vec3::new(0.0, 5.0, 5.0)));
    }

    #[test]
    fn pan_moves_focus_sideways() {
        let mut orbit = Orbit::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        orbit.pan(Vec2::new(-100.0, 0.0), 1.0);
        assert!(orbit.focus.x > 0.0);
        assert!(orbit.focus.y.abs() < 1e-5 && orbit.focus.z.abs() < 1e-5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut orbit = Orbit::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        orbit.zoom(1.0, 0.1, 100.0);
        assert!((orbit.distance - 9.0).abs() < 1e-5);
        for _ in 0..200 {
            orbit.zoom(5.0, 0.5, 100.0);
        }
        assert_eq!(orbit.distance, MIN_DISTANCE);
        for _ in 0..200 {
            orbit.zoom(-5.0, 0.5, 100.0);
        }
        assert_eq!(orbit.distance, 100.0);
    }
}
