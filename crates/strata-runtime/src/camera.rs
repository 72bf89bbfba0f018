//! Free-fly camera with mouse look
//!
//! World axes: X east, Y north, Z altitude. Yaw is measured from north
//! toward east, pitch from the horizon toward `+Z`.

use crate::input::{CameraEvent, MoveKeys};
use glam::{Mat4, Vec3};
use strata_core::CameraConfig;

/// Everything the renderer needs from the camera for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Right-handed look-at, column-major
    pub view: Mat4,
    /// Right-handed perspective with `[0, 1]` clip depth, column-major
    pub projection: Mat4,
}

impl CameraFrame {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// A camera driven directly by pointer deltas and movement keys
#[derive(Clone, Debug)]
pub struct FreeCamera {
    pub position: Vec3,
    /// Unit facing direction
    pub forward: Vec3,
    /// Recomputed from `forward` on every update
    pub right: Vec3,
    /// Recomputed from `forward` on every update
    pub up: Vec3,
    /// Field of view in degrees
    pub fov: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    /// Heading in radians
    yaw: f32,
    /// Radians, kept inside `±pitch_limit`
    pitch: f32,
    /// Whether pointer movement currently turns the camera
    controlled: bool,
    /// Next pointer sample only sets the baseline
    first_sample: bool,
    last_pointer: (f64, f64),

    start_direction: Vec3,
    sensitivity: f32,
    speed: f32,
    zoom_step: f32,
    min_fov: f32,
    max_fov: f32,
    pitch_limit: f32,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl FreeCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a camera from config values.
    ///
    /// Out-of-range values fall back to defaults instead of panicking: an
    /// inverted or NaN fov range uses the default range, and a pitch limit
    /// outside `(0, 90)` degrees uses the default limit.
    pub fn from_config(config: &CameraConfig) -> Self {
        let defaults = CameraConfig::default();
        let (min_fov, max_fov) = if config.min_fov <= config.max_fov {
            (config.min_fov, config.max_fov)
        } else {
            tracing::warn!(
                "Camera fov range [{}, {}] is invalid, using [{}, {}]",
                config.min_fov,
                config.max_fov,
                defaults.min_fov,
                defaults.max_fov
            );
            (defaults.min_fov, defaults.max_fov)
        };
        let pitch_limit_deg = if config.pitch_limit_deg > 0.0 && config.pitch_limit_deg < 90.0 {
            config.pitch_limit_deg
        } else {
            tracing::warn!(
                "Camera pitch limit {} is outside (0, 90), using {}",
                config.pitch_limit_deg,
                defaults.pitch_limit_deg
            );
            defaults.pitch_limit_deg
        };
        let fov = if config.fov.is_nan() { max_fov } else { config.fov };

        let start_direction = Vec3::from_array(config.direction)
            .try_normalize()
            .unwrap_or(Vec3::Y);

        let mut camera = Self {
            position: Vec3::from_array(config.position),
            forward: start_direction,
            right: Vec3::X,
            up: Vec3::Z,
            fov: fov.clamp(min_fov, max_fov),
            aspect: 4.0 / 3.0,
            near: config.near,
            far: config.far,
            yaw: 0.0,
            pitch: 0.0,
            controlled: false,
            first_sample: true,
            last_pointer: (0.0, 0.0),
            start_direction,
            sensitivity: config.sensitivity,
            speed: config.speed,
            zoom_step: config.zoom_step,
            min_fov,
            max_fov,
            pitch_limit: pitch_limit_deg.to_radians(),
        };
        camera.face_start_direction();
        camera.rebuild_basis(Vec3::Z);
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Symmetric pitch clamp in radians
    pub fn pitch_limit(&self) -> f32 {
        self.pitch_limit
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    pub fn awaiting_first_sample(&self) -> bool {
        self.first_sample
    }

    /// Last pointer position used as the delta baseline
    pub fn last_pointer(&self) -> (f64, f64) {
        self.last_pointer
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Apply one buffered input event
    pub fn apply(&mut self, event: CameraEvent) {
        match event {
            CameraEvent::PointerMoved { x, y } => self.on_pointer_move(x, y),
            CameraEvent::Scrolled { y } => self.on_scroll(y as f32),
            CameraEvent::Engaged => self.engage(),
            CameraEvent::Released => self.release(),
            CameraEvent::Snapped => self.snap(),
        }
    }

    /// Let pointer movement drive orientation
    pub fn engage(&mut self) {
        self.controlled = true;
        self.first_sample = true;
    }

    /// Stop pointer movement from driving orientation
    pub fn release(&mut self) {
        self.controlled = false;
    }

    /// Turn by the pointer delta since the previous sample
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        if !self.controlled {
            self.first_sample = true;
            return;
        }

        if self.first_sample {
            self.last_pointer = (x, y);
            self.first_sample = false;
            return;
        }

        let dx = (x - self.last_pointer.0) as f32 * self.sensitivity;
        let dy = (y - self.last_pointer.1) as f32 * self.sensitivity;
        self.last_pointer = (x, y);

        self.yaw += dx.to_radians();
        // screen y grows downward, so moving up looks up
        self.pitch -= dy.to_radians();
        self.pitch = self.pitch.clamp(-self.pitch_limit, self.pitch_limit);

        self.forward = direction_from_angles(self.yaw, self.pitch);
        tracing::trace!(
            "Pointer ({:.1}, {:.1}): yaw {:.3} pitch {:.3}",
            x,
            y,
            self.yaw,
            self.pitch
        );
    }

    /// Zoom by narrowing or widening the field of view
    pub fn on_scroll(&mut self, y_offset: f32) {
        self.fov = (self.fov - self.zoom_step * y_offset).clamp(self.min_fov, self.max_fov);
    }

    /// Face the start direction and re-derive yaw/pitch from it
    pub fn snap(&mut self) {
        self.face_start_direction();
        self.first_sample = true;
    }

    fn face_start_direction(&mut self) {
        let dir = self.start_direction;
        self.pitch = dir
            .z
            .clamp(-1.0, 1.0)
            .asin()
            .clamp(-self.pitch_limit, self.pitch_limit);
        self.yaw = dir.x.atan2(dir.y);
        self.forward = direction_from_angles(self.yaw, self.pitch);
    }

    fn rebuild_basis(&mut self, world_up: Vec3) {
        self.right = self.forward.cross(world_up).try_normalize().unwrap_or(self.right);
        self.up = self.right.cross(self.forward).normalize();
    }

    /// Advance one frame: rebuild the basis, move along it for each held
    /// key, and produce the view and projection matrices
    pub fn update(&mut self, delta_time: f32, keys: MoveKeys, world_up: Vec3) -> CameraFrame {
        self.rebuild_basis(world_up);

        let step = self.speed * delta_time;
        let moves = [
            (MoveKeys::FORWARD, self.forward),
            (MoveKeys::BACK, -self.forward),
            (MoveKeys::RIGHT, self.right),
            (MoveKeys::LEFT, -self.right),
            (MoveKeys::UP, self.up),
            (MoveKeys::DOWN, -self.up),
        ];
        for (key, dir) in moves {
            if keys.contains(key) {
                self.position += dir * step;
            }
        }

        CameraFrame {
            position: self.position,
            forward: self.forward,
            right: self.right,
            up: self.up,
            view: self.view_matrix(),
            projection: self.projection_matrix(),
        }
    }

    /// Get the view matrix (column-major)
    pub fn view_matrix(&self) -> Mat4 {
        let target = self.position + self.forward;
        Mat4::look_at_rh(self.position, target, self.up)
    }

    /// Get the projection matrix (column-major)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Spherical to Cartesian for the east/north/up axes
fn direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        yaw.sin() * pitch.cos(),
        yaw.cos() * pitch.cos(),
        pitch.sin(),
    )
    .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const EPS: f32 = 1e-5;

    fn engaged() -> FreeCamera {
        let mut camera = FreeCamera::new();
        camera.engage();
        camera.on_pointer_move(100.0, 100.0);
        camera
    }

    fn assert_orthonormal(frame: &CameraFrame) {
        assert!((frame.forward.length() - 1.0).abs() < EPS);
        assert!((frame.right.length() - 1.0).abs() < EPS);
        assert!((frame.up.length() - 1.0).abs() < EPS);
        assert!(frame.forward.dot(frame.right).abs() < EPS);
        assert!(frame.forward.dot(frame.up).abs() < EPS);
        assert!(frame.right.dot(frame.up).abs() < EPS);
        // right-handed: right x forward = up
        assert!((frame.right.cross(frame.forward) - frame.up).length() < 1e-4);
    }

    #[test]
    fn starts_facing_north_from_above() {
        let mut camera = FreeCamera::new();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert!((camera.forward - Vec3::Y).length() < EPS);
        assert_eq!(camera.fov, 60.0);
        assert!(!camera.is_controlled());

        let frame = camera.update(0.0, MoveKeys::NONE, Vec3::Z);
        assert!((frame.right - Vec3::X).length() < EPS);
        assert!((frame.up - Vec3::Z).length() < EPS);
    }

    #[test]
    fn basis_stays_orthonormal_for_any_input() {
        let mut camera = FreeCamera::new();
        camera.engage();
        let mut x = 0.0;
        let mut y = 0.0;
        for i in 0..200 {
            x += ((i * 37) % 91) as f64 - 45.0;
            y += ((i * 53) % 67) as f64 - 33.0;
            camera.on_pointer_move(x, y);
            if i % 7 == 0 {
                camera.on_scroll(if i % 2 == 0 { 1.0 } else { -3.0 });
            }
            let frame = camera.update(0.016, MoveKeys::FORWARD | MoveKeys::LEFT, Vec3::Z);
            assert_orthonormal(&frame);
        }
    }

    #[test]
    fn pitch_never_passes_limit() {
        let mut camera = engaged();
        let limit = camera.pitch_limit();
        assert!((limit - (89.0f32).to_radians()).abs() < EPS);

        let mut y = 100.0;
        for _ in 0..50 {
            y -= 5000.0;
            camera.on_pointer_move(100.0, y);
            assert!(camera.pitch().abs() <= limit);
        }
        assert!((camera.pitch() - limit).abs() < EPS);

        for _ in 0..50 {
            y += 9000.0;
            camera.on_pointer_move(100.0, y);
            assert!(camera.pitch().abs() <= limit);
        }
        assert!((camera.pitch() + limit).abs() < EPS);

        let frame = camera.update(0.016, MoveKeys::NONE, Vec3::Z);
        assert_orthonormal(&frame);
    }

    #[test]
    fn fov_saturates_at_bounds() {
        let mut camera = FreeCamera::new();
        for _ in 0..100 {
            camera.on_scroll(1.0);
            assert!(camera.fov >= 10.0);
        }
        assert_eq!(camera.fov, 10.0);

        for _ in 0..100 {
            camera.on_scroll(-1.0);
            assert!(camera.fov <= 60.0);
        }
        assert_eq!(camera.fov, 60.0);

        camera.on_scroll(2.0);
        assert_eq!(camera.fov, 55.0);
    }

    #[test]
    fn pointer_ignored_while_free() {
        let mut camera = FreeCamera::new();
        let forward = camera.forward;
        camera.on_pointer_move(10.0, 10.0);
        camera.on_pointer_move(500.0, -300.0);
        assert_eq!(camera.forward, forward);
        assert!(camera.awaiting_first_sample());
    }

    #[test]
    fn first_sample_after_engage_is_baseline_only() {
        let mut camera = FreeCamera::new();
        let forward = camera.forward;
        camera.engage();
        camera.on_pointer_move(320.0, 240.0);
        assert_eq!(camera.forward, forward);
        assert_eq!(camera.last_pointer(), (320.0, 240.0));
        assert!(!camera.awaiting_first_sample());

        camera.on_pointer_move(330.0, 240.0);
        assert_ne!(camera.forward, forward);
    }

    #[test]
    fn release_and_reengage_rebaselines() {
        let mut camera = engaged();
        camera.release();
        // a large jump while released must not be turned into a delta
        camera.on_pointer_move(5000.0, 5000.0);
        camera.engage();
        let forward = camera.forward;
        camera.on_pointer_move(6000.0, 6000.0);
        assert_eq!(camera.forward, forward);
        assert_eq!(camera.last_pointer(), (6000.0, 6000.0));
    }

    #[test]
    fn horizontal_motion_turns_east() {
        let mut camera = engaged();
        // 40 px * 0.25 = 10 degrees
        camera.on_pointer_move(140.0, 100.0);
        assert!((camera.yaw() - 10.0f32.to_radians()).abs() < EPS);
        assert!(camera.pitch().abs() < EPS);
        assert!(camera.forward.x > 0.0);
        assert!(camera.forward.y > 0.0);
    }

    #[test]
    fn upward_motion_looks_up() {
        let mut camera = engaged();
        camera.on_pointer_move(100.0, 60.0);
        assert!((camera.pitch() - 10.0f32.to_radians()).abs() < EPS);
        assert!(camera.forward.z > 0.0);
    }

    #[test]
    fn snap_restores_start_direction() {
        let mut camera = engaged();
        camera.on_pointer_move(400.0, 20.0);
        assert!((camera.forward - Vec3::Y).length() > 0.1);

        camera.snap();
        assert!((camera.forward - Vec3::Y).length() < EPS);
        assert!(camera.yaw().abs() < EPS);
        assert!(camera.pitch().abs() < EPS);
        assert!(camera.awaiting_first_sample());

        // deltas compose from the snapped orientation
        camera.on_pointer_move(0.0, 0.0);
        camera.on_pointer_move(40.0, 0.0);
        assert!((camera.yaw() - 10.0f32.to_radians()).abs() < EPS);
    }

    #[test]
    fn snap_derives_angles_from_configured_direction() {
        let config = CameraConfig {
            direction: [1.0, 0.0, 0.0],
            ..CameraConfig::default()
        };
        let mut camera = FreeCamera::from_config(&config);
        camera.snap();
        assert!((camera.yaw() - std::f32::consts::FRAC_PI_2).abs() < EPS);
        assert!((camera.forward - Vec3::X).length() < EPS);
    }

    #[test]
    fn inverted_fov_range_falls_back_to_defaults() {
        let config = CameraConfig {
            min_fov: 60.0,
            max_fov: 10.0,
            ..CameraConfig::default()
        };
        let mut camera = FreeCamera::from_config(&config);
        assert_eq!(camera.fov, 60.0);

        camera.on_scroll(100.0);
        assert_eq!(camera.fov, 10.0);
    }

    #[test]
    fn bad_pitch_limit_falls_back_to_default() {
        for limit in [-5.0, 0.0, 90.0, f32::NAN] {
            let config = CameraConfig {
                pitch_limit_deg: limit,
                ..CameraConfig::default()
            };
            let mut camera = FreeCamera::from_config(&config);
            assert!((camera.pitch_limit() - 89.0f32.to_radians()).abs() < EPS);

            camera.engage();
            camera.on_pointer_move(0.0, 0.0);
            camera.on_pointer_move(0.0, -100_000.0);
            assert!((camera.pitch() - camera.pitch_limit()).abs() < EPS);
        }
    }

    #[test]
    fn nan_fov_starts_at_widest() {
        let config = CameraConfig {
            fov: f32::NAN,
            ..CameraConfig::default()
        };
        assert_eq!(FreeCamera::from_config(&config).fov, 60.0);
    }

    #[test]
    fn keys_move_along_basis() {
        let mut camera = FreeCamera::new();
        let start = camera.position;

        camera.update(0.5, MoveKeys::FORWARD, Vec3::Z);
        assert!((camera.position - (start + Vec3::Y * 2.0)).length() < EPS);

        camera.update(0.25, MoveKeys::RIGHT | MoveKeys::UP, Vec3::Z);
        assert!((camera.position - (start + Vec3::new(1.0, 2.0, 1.0))).length() < EPS);

        camera.update(0.25, MoveKeys::BACK | MoveKeys::FORWARD, Vec3::Z);
        assert!((camera.position - (start + Vec3::new(1.0, 2.0, 1.0))).length() < EPS);

        camera.update(0.25, MoveKeys::LEFT | MoveKeys::DOWN, Vec3::Z);
        assert!((camera.position - (start + Vec3::Y * 2.0)).length() < EPS);
    }

    #[test]
    fn view_puts_target_on_negative_z() {
        let mut camera = engaged();
        camera.on_pointer_move(173.0, 71.0);
        camera.position = Vec3::new(1.0, -2.0, 0.5);
        let frame = camera.update(0.0, MoveKeys::NONE, Vec3::Z);

        let target = frame.position + frame.forward;
        let eye_space = frame.view * target.extend(1.0);
        assert!((eye_space - Vec4::new(0.0, 0.0, -1.0, 1.0)).length() < 1e-4);

        let origin = frame.view * frame.position.extend(1.0);
        assert!(origin.truncate().length() < 1e-4);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let mut camera = FreeCamera::new();
        camera.set_aspect(2.0);
        let frame = camera.update(0.0, MoveKeys::NONE, Vec3::Z);

        let near = frame.projection * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = frame.projection * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);

        // x scale is y scale divided by the aspect ratio
        let cols = frame.projection.to_cols_array_2d();
        assert!((cols[0][0] * 2.0 - cols[1][1]).abs() < EPS);
    }

    #[test]
    fn ignores_degenerate_aspect() {
        let mut camera = FreeCamera::new();
        camera.set_aspect(0.0);
        camera.set_aspect(f32::NAN);
        assert!((camera.aspect - 4.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn events_dispatch_to_handlers() {
        let mut camera = FreeCamera::new();
        camera.apply(CameraEvent::Engaged);
        assert!(camera.is_controlled());
        camera.apply(CameraEvent::PointerMoved { x: 0.0, y: 0.0 });
        camera.apply(CameraEvent::PointerMoved { x: 40.0, y: 0.0 });
        assert!(camera.yaw() > 0.0);
        camera.apply(CameraEvent::Scrolled { y: 4.0 });
        assert_eq!(camera.fov, 50.0);
        camera.apply(CameraEvent::Snapped);
        assert!(camera.yaw().abs() < EPS);
        camera.apply(CameraEvent::Released);
        assert!(!camera.is_controlled());
    }
}
