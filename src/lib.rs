//! Astral viewport core
//!
//! The interactive heart of the Astral SDF editor:
//! - an orbit camera that pivots around a target without crossing the poles
//! - a modal translate/rotate/scale engine with axis constraints,
//!   world/local space toggling, and confirm/cancel semantics
//! - an id-buffer pick resolver that maps pointer clicks back to entities
//!
//! Rendering, windowing, and widget layout live in the host application.
//! This crate consumes a per-frame [`InputSnapshot`] and an
//! [`IdBufferRenderer`] implementation, and exposes camera matrices, the
//! entity store, and selection state for the host's render pass and UI.

pub mod camera;
pub mod editor;
pub mod input;
pub mod pick;
pub mod scene;
pub mod transform;

pub use camera::OrbitCamera;
pub use editor::Editor;
pub use input::{EditorKey, InputSnapshot, PointerButton};
pub use pick::{IdBufferRenderer, IdPassRequest, PickOutcome, PickResolver, PICK_NONE};
pub use scene::{EntityGpuData, SceneEntity, SceneState, SdfShape};
pub use transform::{GizmoAxis, GizmoSpace, InputResult, TransformManager, TransformMode};
