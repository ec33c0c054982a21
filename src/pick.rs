//! Id-buffer pick resolver
//!
//! Clicks are resolved against an offscreen integer render target: the
//! host renders every entity with its pixels carrying the entity's store
//! index, the background cleared to [`PICK_NONE`], then reads back the
//! single texel under the pointer. The GPU side lives behind
//! [`IdBufferRenderer`] so the resolver (request gating, coordinate flip,
//! index-to-id mapping) stays testable with a CPU fake.
//!
//! The readback is synchronous: the frame stalls until the auxiliary pass
//! completes. That cost is accepted here rather than hidden behind async
//! machinery.

use glam::Mat4;

use crate::camera::OrbitCamera;
use crate::scene::SceneState;

/// Identifier-buffer clear value meaning "no entity".
pub const PICK_NONE: i32 = -1;

/// One id pass: what to draw, how to project it, and which texel to read.
///
/// `pixel_y` is in the buffer's bottom-up row order; the resolver has
/// already flipped the top-down pointer coordinate.
pub struct IdPassRequest<'a> {
    pub scene: &'a SceneState,
    pub view: Mat4,
    pub projection: Mat4,
    pub width: u32,
    pub height: u32,
    pub pixel_x: u32,
    pub pixel_y: u32,
}

/// The host renderer's side of the pick pass.
///
/// Implementations must size (and on viewport change, regenerate) the
/// integer buffer to `width` x `height`, clear it to [`PICK_NONE`], render
/// each entity's dense store index into it, and return the texel at
/// (`pixel_x`, `pixel_y`). The call blocks until the readback completes.
pub trait IdBufferRenderer {
    fn render_and_read(&mut self, request: &IdPassRequest<'_>) -> i32;
}

/// Outcome of a resolved pick, already mapped to stable-id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Entity(u32),
    Background,
}

/// Holds at most one pending click and resolves it against the id buffer.
#[derive(Debug)]
pub struct PickResolver {
    pending: Option<(f32, f32)>,
    pub near: f32,
    pub far: f32,
}

impl Default for PickResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PickResolver {
    pub fn new() -> Self {
        Self {
            pending: None,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Queue a pick at top-down pointer coordinates. Ignored while a modal
    /// transform owns the pointer or the UI layer claims it; a later click
    /// simply retries.
    pub fn request_pick(&mut self, x: f32, y: f32, modal_active: bool, ui_claims_pointer: bool) {
        if modal_active || ui_claims_pointer {
            return;
        }
        self.pending = Some((x, y));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolve the pending pick, if any. Returns `None` when nothing was
    /// pending or the viewport is degenerate (the request is dropped and
    /// the next valid click retries implicitly).
    pub fn resolve_pending(
        &mut self,
        renderer: &mut dyn IdBufferRenderer,
        camera: &OrbitCamera,
        scene: &SceneState,
        width: u32,
        height: u32,
    ) -> Option<PickOutcome> {
        let (sx, sy) = self.pending.take()?;
        if width == 0 || height == 0 {
            log::debug!("pick dropped: degenerate viewport {width}x{height}");
            return None;
        }

        let pixel_x = (sx.max(0.0) as u32).min(width - 1);
        let top_down_y = (sy.max(0.0) as u32).min(height - 1);
        // Pointer coordinates are top-down, buffer rows are bottom-up.
        let pixel_y = height - 1 - top_down_y;

        let aspect = width as f32 / height as f32;
        let request = IdPassRequest {
            scene,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect, self.near, self.far),
            width,
            height,
            pixel_x,
            pixel_y,
        };
        let index = renderer.render_and_read(&request);

        if index < 0 {
            return Some(PickOutcome::Background);
        }
        match scene.id_at(index as usize) {
            Some(id) => Some(PickOutcome::Entity(id)),
            // Stale or corrupt buffer contents; treat as a miss.
            None => Some(PickOutcome::Background),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IdBufferRenderer, IdPassRequest, PickOutcome, PickResolver, PICK_NONE};
    use crate::camera::OrbitCamera;
    use crate::scene::{SceneState, SdfShape};
    use glam::Vec3;

    /// CPU stand-in for the GPU pass: a flat index buffer plus a record of
    /// the coordinates and sizes it was asked for.
    struct FakeIdRenderer {
        buffer: Vec<i32>,
        width: u32,
        height: u32,
        last_read: Option<(u32, u32)>,
        resizes: u32,
    }

    impl FakeIdRenderer {
        fn new() -> Self {
            Self {
                buffer: Vec::new(),
                width: 0,
                height: 0,
                last_read: None,
                resizes: 0,
            }
        }

        fn write_index(&mut self, x: u32, y: u32, index: i32) {
            let offset = (y * self.width + x) as usize;
            self.buffer[offset] = index;
        }
    }

    impl IdBufferRenderer for FakeIdRenderer {
        fn render_and_read(&mut self, request: &IdPassRequest<'_>) -> i32 {
            if self.width != request.width || self.height != request.height {
                self.width = request.width;
                self.height = request.height;
                self.buffer = vec![PICK_NONE; (self.width * self.height) as usize];
                self.resizes += 1;
            }
            self.last_read = Some((request.pixel_x, request.pixel_y));
            self.buffer[(request.pixel_y * self.width + request.pixel_x) as usize]
        }
    }

    fn camera() -> OrbitCamera {
        OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }

    fn scene_with_three() -> SceneState {
        let mut scene = SceneState::new();
        scene.spawn(SdfShape::Sphere);
        scene.spawn(SdfShape::Cuboid);
        scene.spawn(SdfShape::Sphere);
        scene
    }

    #[test]
    fn request_is_rejected_while_modal_or_ui_claims_pointer() {
        let mut resolver = PickResolver::new();
        resolver.request_pick(10.0, 10.0, true, false);
        assert!(!resolver.has_pending());
        resolver.request_pick(10.0, 10.0, false, true);
        assert!(!resolver.has_pending());
        resolver.request_pick(10.0, 10.0, false, false);
        assert!(resolver.has_pending());
    }

    #[test]
    fn pointer_coordinates_are_flipped_to_buffer_rows() {
        let mut resolver = PickResolver::new();
        let mut renderer = FakeIdRenderer::new();
        let scene = scene_with_three();

        // Click near the top of a 64x48 viewport.
        resolver.request_pick(10.0, 2.0, false, false);
        resolver.resolve_pending(&mut renderer, &camera(), &scene, 64, 48);
        assert_eq!(renderer.last_read, Some((10, 45)));
    }

    #[test]
    fn valid_index_maps_to_stable_id_not_index() {
        let mut resolver = PickResolver::new();
        let mut renderer = FakeIdRenderer::new();
        let mut scene = scene_with_three();
        // Delete the first entity: indices shift, ids do not.
        let first = scene.id_at(0).unwrap();
        scene.remove(first);

        resolver.request_pick(5.0, 5.0, false, false);
        // Prime the buffer sizing, then stamp index 1 under the click.
        renderer.render_and_read(&IdPassRequest {
            scene: &scene,
            view: camera().view_matrix(),
            projection: camera().projection_matrix(1.0, 0.1, 100.0),
            width: 32,
            height: 32,
            pixel_x: 0,
            pixel_y: 0,
        });
        renderer.write_index(5, 26, 1);

        let outcome = resolver.resolve_pending(&mut renderer, &camera(), &scene, 32, 32);
        // Index 1 is now the entity that started life at index 2 (id 2).
        assert_eq!(outcome, Some(PickOutcome::Entity(2)));
    }

    #[test]
    fn sentinel_resolves_to_background() {
        let mut resolver = PickResolver::new();
        let mut renderer = FakeIdRenderer::new();
        let scene = scene_with_three();

        resolver.request_pick(3.0, 3.0, false, false);
        let outcome = resolver.resolve_pending(&mut renderer, &camera(), &scene, 16, 16);
        assert_eq!(outcome, Some(PickOutcome::Background));
        assert!(!resolver.has_pending());
    }

    #[test]
    fn out_of_range_index_resolves_to_background() {
        let mut resolver = PickResolver::new();
        let mut renderer = FakeIdRenderer::new();
        let scene = scene_with_three();

        resolver.request_pick(0.0, 15.0, false, false);
        renderer.render_and_read(&IdPassRequest {
            scene: &scene,
            view: camera().view_matrix(),
            projection: camera().projection_matrix(1.0, 0.1, 100.0),
            width: 16,
            height: 16,
            pixel_x: 0,
            pixel_y: 0,
        });
        renderer.write_index(0, 0, 99);

        let outcome = resolver.resolve_pending(&mut renderer, &camera(), &scene, 16, 16);
        assert_eq!(outcome, Some(PickOutcome::Background));
    }

    #[test]
    fn degenerate_viewport_drops_the_request() {
        let mut resolver = PickResolver::new();
        let mut renderer = FakeIdRenderer::new();
        let scene = scene_with_three();

        resolver.request_pick(5.0, 5.0, false, false);
        let outcome = resolver.resolve_pending(&mut renderer, &camera(), &scene, 0, 480);
        assert_eq!(outcome, None);
        assert!(!resolver.has_pending(), "dropped request must not linger");
        assert_eq!(renderer.resizes, 0);
    }

    #[test]
    fn viewport_resize_regenerates_backing_storage() {
        let mut resolver = PickResolver::new();
        let mut renderer = FakeIdRenderer::new();
        let scene = scene_with_three();

        resolver.request_pick(1.0, 1.0, false, false);
        resolver.resolve_pending(&mut renderer, &camera(), &scene, 64, 64);
        assert_eq!(renderer.resizes, 1);

        resolver.request_pick(1.0, 1.0, false, false);
        resolver.resolve_pending(&mut renderer, &camera(), &scene, 128, 64);
        assert_eq!(renderer.resizes, 2);
        assert_eq!(renderer.buffer.len(), 128 * 64);
    }

    #[test]
    fn click_coordinates_clamp_to_the_viewport() {
        let mut resolver = PickResolver::new();
        let mut renderer = FakeIdRenderer::new();
        let scene = scene_with_three();

        resolver.request_pick(10_000.0, -50.0, false, false);
        resolver.resolve_pending(&mut renderer, &camera(), &scene, 32, 32);
        assert_eq!(renderer.last_read, Some((31, 31)));
    }
}
