//! Orbit camera
//!
//! View state is a pivot target, a unit orientation quaternion, and a
//! distance; the eye position is always re-derived from those three, never
//! stored. Orbit/pan/zoom mutate the state from per-frame pointer deltas.
//!
//! The orientation is quaternion-based so repeated orbits never accumulate
//! Euler error, and a pole guard keeps the view from crossing the world
//! up/down axis where the orbit direction would become ambiguous.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Camera orbiting a pivot target.
///
/// Invariants: `orientation` stays unit-length and finite, `distance`
/// never drops below `distance_floor`. Every mutating call re-checks the
/// candidate state and rejects it (leaving the camera unchanged) if the
/// math produced a non-finite value.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub target: Vec3,
    orientation: Quat,
    distance: f32,
    pub world_up: Vec3,
    pub vertical_fov_deg: f32,

    // Sensitivity settings
    pub orbit_sensitivity: f32,
    pub pan_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub distance_floor: f32,
    /// Minimum angle, in degrees, the orbit axis keeps away from the poles.
    pub pole_guard_deg: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Build a camera at `position` looking at `target`, rolled so the view
    /// stays as upright as possible relative to world up (+Y).
    pub fn looking_from(position: Vec3, target: Vec3) -> Self {
        let world_up = Vec3::Y;
        let offset = position - target;
        let distance = offset.length().max(0.1);
        let back = if offset.length_squared() > 1e-12 {
            offset / offset.length()
        } else {
            Vec3::Z
        };
        // Re-derive a stable right axis when looking straight up or down.
        let reference_up = if back.dot(world_up).abs() > 0.999 {
            Vec3::new(0.0, 0.0, if back.y > 0.0 { -1.0 } else { 1.0 })
        } else {
            world_up
        };
        let right = reference_up.cross(back).normalize();
        let up = back.cross(right);
        let orientation = Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize();

        Self {
            target,
            orientation,
            distance,
            world_up,
            vertical_fov_deg: 45.0,
            orbit_sensitivity: 0.005,
            pan_sensitivity: 0.002,
            zoom_sensitivity: 0.1,
            distance_floor: 0.1,
            pole_guard_deg: 0.5,
        }
    }

    /// Eye position, derived from target/orientation/distance.
    pub fn position(&self) -> Vec3 {
        self.target + (self.orientation * Vec3::Z) * self.distance
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Camera basis in world space: local +X, +Y, and -Z rotated by the
    /// current orientation. Always unit-length.
    pub fn basis_vectors(&self) -> (Vec3, Vec3, Vec3) {
        let right = self.orientation * Vec3::X;
        let up = self.orientation * Vec3::Y;
        let forward = self.orientation * Vec3::NEG_Z;
        (right, up, forward)
    }

    pub fn view_matrix(&self) -> Mat4 {
        let (_, up, forward) = self.basis_vectors();
        Mat4::look_to_rh(self.position(), forward, up)
    }

    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.vertical_fov_deg.to_radians(), aspect, near, far)
    }

    /// Rotate around the target: yaw about world up, pitch about the
    /// camera's current local right axis. If the pitch would carry the
    /// orbit axis within `pole_guard_deg` of the world up/down pole, only
    /// the yaw is applied for this call.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if dx.abs() < 1e-6 && dy.abs() < 1e-6 {
            return;
        }

        let yaw = Quat::from_axis_angle(self.world_up, -dx * self.orbit_sensitivity);
        let right = self.orientation * Vec3::X;
        let pitch = Quat::from_axis_angle(right, -dy * self.orbit_sensitivity);

        let mut candidate = (yaw * pitch * self.orientation).normalize();

        // Pole guard: the offset axis (target -> eye) must keep its angle
        // to world up inside [guard, 180 - guard] degrees.
        let offset_axis = candidate * Vec3::Z;
        let angle_to_up = offset_axis
            .dot(self.world_up)
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees();
        if angle_to_up < self.pole_guard_deg || angle_to_up > 180.0 - self.pole_guard_deg {
            candidate = (yaw * self.orientation).normalize();
        }

        if !candidate.is_finite() {
            log::warn!("orbit rejected: non-finite orientation from ({dx}, {dy})");
            return;
        }
        self.orientation = candidate;
    }

    /// Slide the pivot target in the camera's screen plane. The translation
    /// scales with the current distance so on-screen drag speed feels the
    /// same at any zoom level.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if dx.abs() < 1e-6 && dy.abs() < 1e-6 {
            return;
        }

        let (right, up, _) = self.basis_vectors();
        let translation =
            (-right * dx + up * dy) * self.pan_sensitivity * self.distance;
        let candidate = self.target + translation;
        if !candidate.is_finite() {
            log::warn!("pan rejected: non-finite target from ({dx}, {dy})");
            return;
        }
        self.target = candidate;
    }

    /// Dolly toward/away from the target. The step scales with the current
    /// distance so zoom slows down near the pivot, and the distance never
    /// drops below `distance_floor`.
    pub fn zoom(&mut self, dy: f32) {
        if dy.abs() < 1e-6 {
            return;
        }

        let candidate = self.distance - dy * self.zoom_sensitivity * self.distance;
        if !candidate.is_finite() {
            log::warn!("zoom rejected: non-finite distance from {dy}");
            return;
        }
        self.distance = candidate.max(self.distance_floor);
    }

    /// Angle in degrees between the orbit offset axis (target -> eye) and
    /// world up. 0 means the eye sits at the north pole.
    pub fn offset_angle_to_up(&self) -> f32 {
        (self.orientation * Vec3::Z)
            .dot(self.world_up)
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::OrbitCamera;
    use glam::Vec3;

    fn test_camera() -> OrbitCamera {
        OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }

    #[test]
    fn position_is_derived_from_state() {
        let camera = test_camera();
        let position = camera.position();
        assert!((position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
        assert!((camera.distance() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn basis_vectors_are_unit_and_orthogonal() {
        let mut camera = test_camera();
        camera.orbit(123.0, -47.0);
        let (right, up, forward) = camera.basis_vectors();
        assert!((right.length() - 1.0).abs() < 1e-4);
        assert!((up.length() - 1.0).abs() < 1e-4);
        assert!((forward.length() - 1.0).abs() < 1e-4);
        assert!(right.dot(up).abs() < 1e-4);
        assert!(right.dot(forward).abs() < 1e-4);
    }

    #[test]
    fn horizontal_orbit_keeps_distance_and_pitch() {
        let mut camera = test_camera();
        let pitch_before = camera.offset_angle_to_up();
        camera.orbit(100.0, 0.0);
        assert!((camera.distance() - 5.0).abs() < 1e-4);
        assert!((camera.offset_angle_to_up() - pitch_before).abs() < 1e-3);
        // The eye actually moved around the target.
        assert!((camera.position() - Vec3::new(0.0, 0.0, 5.0)).length() > 0.1);
    }

    #[test]
    fn orientation_stays_unit_over_long_orbit_sequences() {
        let mut camera = test_camera();
        for i in 0..10_000 {
            let dx = ((i * 7) % 23) as f32 - 11.0;
            let dy = ((i * 13) % 17) as f32 - 8.0;
            camera.orbit(dx, dy);
        }
        let q = camera.orientation();
        assert!(q.is_finite());
        assert!((q.length() - 1.0).abs() < 1e-3);
        assert!(camera.position().is_finite());
    }

    #[test]
    fn pole_guard_blocks_pitch_but_not_yaw() {
        let mut camera = test_camera();
        // Step smaller than the guard band so the pitch cannot jump across
        // the pole between checks.
        for _ in 0..400 {
            camera.orbit(0.0, 1.0);
            let angle = camera.offset_angle_to_up();
            assert!(
                angle >= camera.pole_guard_deg - 1e-3
                    && angle <= 180.0 - camera.pole_guard_deg + 1e-3,
                "orbit axis crossed the pole: {angle} deg"
            );
        }
        // The pitch actually walked up to the pole before the guard pinned it.
        assert!(camera.offset_angle_to_up() < 10.0);
        // Yaw still applies once pitch is pinned at the guard.
        let before = camera.position();
        camera.orbit(200.0, 20.0);
        assert!((camera.position() - before).length() > 1e-3);
    }

    #[test]
    fn degenerate_orbit_is_a_no_op() {
        let mut camera = test_camera();
        let q = camera.orientation();
        camera.orbit(0.0, 0.0);
        assert_eq!(camera.orientation(), q);
    }

    #[test]
    fn non_finite_input_leaves_state_unchanged() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut camera = test_camera();
        let q = camera.orientation();
        let target = camera.target;
        let distance = camera.distance();
        camera.orbit(f32::NAN, 1.0);
        camera.pan(f32::INFINITY, 0.5);
        camera.zoom(f32::NAN);
        assert_eq!(camera.orientation(), q);
        assert_eq!(camera.target, target);
        assert_eq!(camera.distance(), distance);
    }

    #[test]
    fn pan_scales_with_distance() {
        let mut near = test_camera();
        near.zoom(5.0); // pull in
        let mut far = test_camera();

        let near_start = near.target;
        let far_start = far.target;
        near.pan(10.0, 0.0);
        far.pan(10.0, 0.0);
        let near_moved = (near.target - near_start).length();
        let far_moved = (far.target - far_start).length();
        assert!(near_moved < far_moved);
    }

    #[test]
    fn pan_moves_target_in_screen_plane() {
        let mut camera = test_camera();
        camera.pan(10.0, -4.0);
        // Facing -Z: screen right is world +X, screen up is world +Y.
        assert!(camera.target.x < 0.0);
        assert!(camera.target.y < 0.0);
        assert!(camera.target.z.abs() < 1e-5);
    }

    #[test]
    fn zoom_never_crosses_the_distance_floor() {
        let mut camera = test_camera();
        for _ in 0..1_000 {
            camera.zoom(50.0);
        }
        assert!(camera.distance() >= camera.distance_floor);
        camera.zoom(-3.0);
        assert!(camera.distance() > camera.distance_floor);
    }

    #[test]
    fn view_matrix_places_target_on_view_axis() {
        let mut camera = test_camera();
        camera.orbit(80.0, -30.0);
        let view = camera.view_matrix();
        let target_in_view = view.transform_point3(camera.target);
        // Target sits straight ahead, at -distance along the view Z axis.
        assert!(target_in_view.x.abs() < 1e-3);
        assert!(target_in_view.y.abs() < 1e-3);
        assert!((target_in_view.z + camera.distance()).abs() < 1e-3);
    }
}
