//! Per-frame editor orchestration
//!
//! Owns the camera, entity store, selection, transform engine, and pick
//! resolver as plain state (no globals), and runs them in the fixed frame
//! order the pieces rely on:
//!
//! 1. an active modal transform consumes input exclusively
//! 2. otherwise an unclaimed primary click becomes a pick request
//! 3. any pending pick resolves and updates selection
//! 4. camera orbit/pan/zoom interpret whatever pointer input is left
//!
//! Steps 1-3 are mutually exclusive consumers of the same click, so the
//! order is load-bearing; reordering them would double-handle events.
//! The host calls [`Editor::update_frame`] once per frame before its main
//! render pass, then reads the camera and store to draw.

use crate::camera::OrbitCamera;
use crate::input::{InputSnapshot, PointerButton};
use crate::pick::{IdBufferRenderer, PickOutcome, PickResolver};
use crate::scene::{SceneState, SdfShape};
use crate::transform::{GizmoAxis, GizmoSpace, TransformManager, TransformMode};
use glam::Vec3;

pub struct Editor {
    camera: OrbitCamera,
    scene: SceneState,
    selected_id: Option<u32>,
    transform: TransformManager,
    pick: PickResolver,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            camera: OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO),
            scene: SceneState::new(),
            selected_id: None,
            transform: TransformManager::new(),
            pick: PickResolver::new(),
        }
    }

    /// Run one frame of viewport interaction against the polled input.
    pub fn update_frame(
        &mut self,
        input: &InputSnapshot,
        renderer: &mut dyn IdBufferRenderer,
        viewport_width: u32,
        viewport_height: u32,
    ) {
        // 1. Modal transform first; while a session is active it owns both
        // the pointer and the keyboard for this frame.
        let was_active = self.transform.is_active();
        let consumed = self.transform.update(
            input,
            &self.camera,
            &mut self.scene,
            &mut self.selected_id,
        );

        // 2. A primary press that no session (old or new) and no UI panel
        // claimed becomes a pick request.
        if !was_active
            && !self.transform.is_active()
            && !consumed.consumed_pointer
            && input.pressed(PointerButton::Primary)
        {
            self.pick.request_pick(
                input.pointer.0,
                input.pointer.1,
                false,
                input.ui_wants_pointer,
            );
        }

        // 3. Resolve, mapping the buffer index to a stable id (or clearing
        // selection on a background hit).
        if let Some(outcome) = self.pick.resolve_pending(
            renderer,
            &self.camera,
            &self.scene,
            viewport_width,
            viewport_height,
        ) {
            self.selected_id = match outcome {
                PickOutcome::Entity(id) => Some(id),
                PickOutcome::Background => None,
            };
        }

        // 4. Camera movement from whatever pointer input is left over.
        if !self.transform.is_active() && !input.ui_wants_pointer {
            if input.is_down(PointerButton::Middle) {
                let (dx, dy) = input.pointer_delta;
                if input.shift_down {
                    self.camera.pan(dx, dy);
                } else {
                    self.camera.orbit(dx, dy);
                }
            }
            if input.scroll_delta != 0.0 {
                self.camera.zoom(input.scroll_delta);
            }
        }
    }

    /// Entry point for a raw click handler outside `update_frame`.
    /// Rejected while a modal session owns the pointer.
    pub fn request_pick(&mut self, x: f32, y: f32) {
        self.pick
            .request_pick(x, y, self.transform.is_active(), false);
    }

    pub fn spawn(&mut self, shape: SdfShape) -> u32 {
        self.scene.spawn(shape)
    }

    /// Delete an entity. Aborts a session targeting it and clears a
    /// selection pointing at it, so nothing dangles.
    pub fn remove_entity(&mut self, id: u32) -> bool {
        if self.transform.target_id() == Some(id) {
            self.transform.abort();
        }
        let removed = self.scene.remove(id);
        if removed && self.selected_id == Some(id) {
            self.selected_id = None;
        }
        removed
    }

    /// UI-driven selection; ids that are not in the store clear it.
    pub fn select(&mut self, id: Option<u32>) {
        self.selected_id = id.filter(|id| self.scene.get(*id).is_some());
    }

    pub fn selected_id(&self) -> Option<u32> {
        self.selected_id
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneState {
        &mut self.scene
    }

    // Modal state for the UI's mode/axis/space readout.
    pub fn transform_mode(&self) -> Option<TransformMode> {
        self.transform.mode()
    }

    pub fn constrained_axis(&self) -> Option<GizmoAxis> {
        self.transform.constrained_axis()
    }

    pub fn gizmo_space(&self) -> GizmoSpace {
        self.transform.space()
    }
}
