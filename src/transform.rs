//! Modal transform engine
//!
//! Blender-style interactive transforms: with an entity selected, G/R/S
//! opens a translate/rotate/scale session that continuously reinterprets
//! pointer movement until it is confirmed (primary release / Enter) or
//! cancelled (secondary click / Escape, which restores the entity exactly).
//!
//! Two rules keep sessions exact:
//! - Deltas are always measured from the session-start pointer position,
//!   never accumulated frame to frame, so there is no drift.
//! - Every recompute starts from the snapshot taken at session entry and
//!   applies the total delta under the current constraint/space. Toggling
//!   an axis mid-drag therefore lands on the same transform as if the
//!   constraint had been active from the start.
//!
//! Rotation math runs on quaternions and converts back to the entity's
//! Euler-degree storage once per recompute. That conversion is ambiguous
//! near gimbal configurations; the stored angles may be re-expressed
//! (e.g. 180/0/180 instead of 0/180/0) even though the orientation is the
//! same. The quaternion snapshot, not the stored Euler, is the source of
//! truth while a session is live.

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::camera::OrbitCamera;
use crate::input::{EditorKey, InputSnapshot, PointerButton};
use crate::scene::{SceneEntity, SceneState};

const TRANSLATE_SENSITIVITY: f32 = 0.0008;
const ROTATE_SENSITIVITY: f32 = 0.005;
const SCALE_SENSITIVITY: f32 = 0.005;
const SCALE_FACTOR_FLOOR: f32 = 0.01;
const SCALE_COMPONENT_FLOOR: f32 = 1e-4;
const POINTER_MOVE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    Translating,
    Rotating,
    Scaling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub fn unit(self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoSpace {
    World,
    Local,
}

/// What the engine consumed this frame, so the frame orchestrator does not
/// hand the same events to picking or camera movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputResult {
    pub consumed_keyboard: bool,
    pub consumed_pointer: bool,
}

/// Snapshot-anchored state of one in-flight transform.
#[derive(Debug, Clone, Copy)]
struct ModalSession {
    mode: TransformMode,
    target_id: u32,
    start_position: Vec3,
    start_rotation_deg: Vec3,
    start_scale: Vec3,
    /// Entity orientation at session start. Local-space constrained axes
    /// are frozen against this for the whole session.
    start_orientation: Quat,
    start_pointer: Vec2,
    last_pointer: Vec2,
    axis: Option<GizmoAxis>,
}

pub struct TransformManager {
    session: Option<ModalSession>,
    space: GizmoSpace,
}

impl Default for TransformManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformManager {
    pub fn new() -> Self {
        Self {
            session: None,
            space: GizmoSpace::World,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn mode(&self) -> Option<TransformMode> {
        self.session.as_ref().map(|session| session.mode)
    }

    pub fn constrained_axis(&self) -> Option<GizmoAxis> {
        self.session.as_ref().and_then(|session| session.axis)
    }

    pub fn space(&self) -> GizmoSpace {
        self.space
    }

    pub fn target_id(&self) -> Option<u32> {
        self.session.as_ref().map(|session| session.target_id)
    }

    /// Drop the session without touching the entity. Used when the target
    /// is deleted out from under a live session.
    pub fn abort(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!(
                "modal transform aborted (entity {} gone)",
                session.target_id
            );
        }
    }

    /// Per-frame update. While a session is active this consumes pointer
    /// and keyboard input exclusively; when idle it only watches for
    /// mode-entry, deselect, and space-toggle keys.
    pub fn update(
        &mut self,
        input: &InputSnapshot,
        camera: &OrbitCamera,
        scene: &mut SceneState,
        selected_id: &mut Option<u32>,
    ) -> InputResult {
        let mut result = InputResult::default();

        if let Some(mut session) = self.session.take() {
            if scene.get(session.target_id).is_none() {
                // Target deleted mid-session: abort without mutation.
                log::debug!(
                    "modal transform aborted (entity {} gone)",
                    session.target_id
                );
                return result;
            }

            result.consumed_keyboard = true;

            let confirm = (input.released(PointerButton::Primary) && !input.ui_wants_pointer)
                || (input.key_pressed(EditorKey::Confirm) && !input.ui_wants_keyboard);
            let cancel = (input.pressed(PointerButton::Secondary) && !input.ui_wants_pointer)
                || (input.key_pressed(EditorKey::Cancel) && !input.ui_wants_keyboard);

            if confirm {
                // Entity keeps whatever was last computed.
                result.consumed_pointer = true;
                return result;
            }
            if cancel {
                if let Some(entity) = scene.get_mut(session.target_id) {
                    entity.position = session.start_position.to_array();
                    entity.rotation_deg = session.start_rotation_deg.to_array();
                    entity.scale = session.start_scale.to_array();
                }
                result.consumed_pointer = true;
                return result;
            }

            let mut constraint_changed = false;
            if !input.ui_wants_keyboard {
                let newly_pressed = if input.key_pressed(EditorKey::AxisX) {
                    Some(GizmoAxis::X)
                } else if input.key_pressed(EditorKey::AxisY) {
                    Some(GizmoAxis::Y)
                } else if input.key_pressed(EditorKey::AxisZ) {
                    Some(GizmoAxis::Z)
                } else {
                    None
                };
                if let Some(axis) = newly_pressed {
                    // Same axis again clears the constraint.
                    session.axis = if session.axis == Some(axis) {
                        None
                    } else {
                        Some(axis)
                    };
                    constraint_changed = true;
                }
                if input.key_pressed(EditorKey::SpaceToggle) {
                    self.space = match self.space {
                        GizmoSpace::World => GizmoSpace::Local,
                        GizmoSpace::Local => GizmoSpace::World,
                    };
                    constraint_changed = true;
                }
            }

            let pointer = Vec2::new(input.pointer.0, input.pointer.1);
            let moved = (pointer - session.last_pointer).abs().max_element()
                > POINTER_MOVE_EPSILON;
            if moved || constraint_changed {
                let total_delta = pointer - session.start_pointer;
                if let Some(entity) = scene.get_mut(session.target_id) {
                    apply_session(&session, self.space, camera, entity, total_delta);
                }
                session.last_pointer = pointer;
            }

            self.session = Some(session);
            return result;
        }

        // Idle: watch for mode entry and the few non-modal keys.
        if input.ui_wants_keyboard {
            return result;
        }

        let selected = selected_id.and_then(|id| scene.get(id));
        if let Some(entity) = selected {
            let mode = if input.key_pressed(EditorKey::Grab) {
                Some(TransformMode::Translating)
            } else if input.key_pressed(EditorKey::Rotate) {
                Some(TransformMode::Rotating)
            } else if input.key_pressed(EditorKey::Scale) {
                Some(TransformMode::Scaling)
            } else {
                None
            };
            if let Some(mode) = mode {
                let pointer = Vec2::new(input.pointer.0, input.pointer.1);
                self.session = Some(ModalSession {
                    mode,
                    target_id: entity.id,
                    start_position: Vec3::from(entity.position),
                    start_rotation_deg: Vec3::from(entity.rotation_deg),
                    start_scale: Vec3::from(entity.scale),
                    start_orientation: entity.orientation(),
                    start_pointer: pointer,
                    last_pointer: pointer,
                    axis: None,
                });
                result.consumed_keyboard = true;
                return result;
            }
        }

        if input.key_pressed(EditorKey::Deselect) {
            if selected_id.take().is_some() {
                result.consumed_keyboard = true;
            }
        } else if input.key_pressed(EditorKey::SpaceToggle) {
            self.space = match self.space {
                GizmoSpace::World => GizmoSpace::Local,
                GizmoSpace::Local => GizmoSpace::World,
            };
            result.consumed_keyboard = true;
        }

        result
    }
}

/// Recompute the entity's transform from the session snapshot and the
/// total pointer delta, under the current constraint and space.
fn apply_session(
    session: &ModalSession,
    space: GizmoSpace,
    camera: &OrbitCamera,
    entity: &mut SceneEntity,
    total_delta: Vec2,
) {
    match session.mode {
        TransformMode::Translating => apply_translation(session, space, camera, entity, total_delta),
        TransformMode::Rotating => apply_rotation(session, space, entity, total_delta),
        TransformMode::Scaling => apply_scaling(session, entity, total_delta),
    }
}

fn constrained_axis_vector(session: &ModalSession, space: GizmoSpace) -> Option<Vec3> {
    session.axis.map(|axis| {
        let v = axis.unit();
        match space {
            GizmoSpace::World => v,
            GizmoSpace::Local => session.start_orientation * v,
        }
    })
}

fn apply_translation(
    session: &ModalSession,
    space: GizmoSpace,
    camera: &OrbitCamera,
    entity: &mut SceneEntity,
    total_delta: Vec2,
) {
    let (right, up, _forward) = camera.basis_vectors();

    // Depth-scaled sensitivity: the drag covers the same on-screen span
    // whether the entity is near or far.
    let depth = camera
        .position()
        .distance(session.start_position)
        .max(0.1);
    let k = TRANSLATE_SENSITIVITY * depth;
    let plane_delta = right * total_delta.x * k - up * total_delta.y * k;

    let final_delta = match constrained_axis_vector(session, space) {
        Some(axis) => axis * plane_delta.dot(axis) / axis.dot(axis),
        None => plane_delta,
    };

    entity.position = (session.start_position + final_delta).to_array();
}

fn apply_rotation(
    session: &ModalSession,
    space: GizmoSpace,
    entity: &mut SceneEntity,
    total_delta: Vec2,
) {
    let angle = total_delta.x * ROTATE_SENSITIVITY;
    // World Z when unconstrained.
    let axis = constrained_axis_vector(session, space).unwrap_or(Vec3::Z);

    if axis.length_squared() < 1e-12 {
        entity.rotation_deg = session.start_rotation_deg.to_array();
        return;
    }

    let delta = Quat::from_axis_angle(axis.normalize(), angle);
    let orientation = (delta * session.start_orientation).normalize();
    // Euler conversion boundary: see module docs.
    let (z, y, x) = orientation.to_euler(EulerRot::ZYX);
    entity.rotation_deg = [x.to_degrees(), y.to_degrees(), z.to_degrees()];
}

fn apply_scaling(session: &ModalSession, entity: &mut SceneEntity, total_delta: Vec2) {
    let factor = (1.0 + total_delta.x * SCALE_SENSITIVITY).max(SCALE_FACTOR_FLOOR);

    let scaled = match session.axis {
        // Only the constrained component scales; the others keep their
        // snapshot value. Scale masks are axis-aligned in the entity's own
        // parameter space, so gizmo space does not apply here.
        Some(axis) => {
            let mut mask = Vec3::ONE;
            mask[axis as usize] = factor;
            session.start_scale * mask
        }
        None => session.start_scale * factor,
    };

    entity.scale = scaled.max(Vec3::splat(SCALE_COMPONENT_FLOOR)).to_array();
}
