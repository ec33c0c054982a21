//! Scene entity store
//!
//! An ordered collection of SDF shape records. Each entity carries a
//! stable id handed out by a monotonically increasing allocator; the id
//! identifies the entity for its whole lifetime even as deletions shift
//! its index in the dense array. Picking works in indices (what the id
//! pass renders), selection and UI work in ids, and the store is the only
//! place the two are mapped onto each other.

pub mod serialization;

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Shape kinds the raymarcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SdfShape {
    Sphere,
    Cuboid,
}

impl SdfShape {
    fn default_name(self) -> &'static str {
        match self {
            SdfShape::Sphere => "sphere",
            SdfShape::Cuboid => "cuboid",
        }
    }

    /// Numeric tag packed into [`EntityGpuData`] for the shader.
    pub fn gpu_kind(self) -> f32 {
        match self {
            SdfShape::Sphere => 0.0,
            SdfShape::Cuboid => 1.0,
        }
    }
}

/// One editable shape in the scene. Rotation is stored as Euler degrees
/// for UI editability; interactive rotation converts to a quaternion at
/// the session boundary (see [`crate::transform`]).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneEntity {
    pub id: u32,
    pub name: String,
    pub shape: SdfShape,
    pub position: [f32; 3],
    pub rotation_deg: [f32; 3],
    /// Radius-like or half-extent parameters, one per axis.
    pub scale: [f32; 3],
    pub color: [f32; 3],
}

impl SceneEntity {
    /// World transform composed as T * Rz * Ry * Rx from the Euler storage.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from(self.position))
            * Mat4::from_rotation_z(self.rotation_deg[2].to_radians())
            * Mat4::from_rotation_y(self.rotation_deg[1].to_radians())
            * Mat4::from_rotation_x(self.rotation_deg[0].to_radians())
    }

    pub fn inverse_model_matrix(&self) -> Mat4 {
        self.model_matrix().inverse()
    }

    /// Quaternion form of the stored Euler rotation, matching the
    /// Z-Y-X composition of [`Self::model_matrix`].
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::ZYX,
            self.rotation_deg[2].to_radians(),
            self.rotation_deg[1].to_radians(),
            self.rotation_deg[0].to_radians(),
        )
    }

    /// Shader-facing record uploaded by the host's render pass.
    pub fn gpu_data(&self) -> EntityGpuData {
        EntityGpuData {
            inverse_model_matrix: self.inverse_model_matrix().to_cols_array_2d(),
            color: [self.color[0], self.color[1], self.color[2], 1.0],
            params_shape: [
                self.scale[0],
                self.scale[1],
                self.scale[2],
                self.shape.gpu_kind(),
            ],
        }
    }
}

/// std140-friendly per-entity block for the raymarch shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityGpuData {
    pub inverse_model_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// xyz = shape parameters, w = shape kind tag.
    pub params_shape: [f32; 4],
}

/// Dense entity array plus the id allocator.
#[derive(Default, serde::Serialize, serde::Deserialize)]
pub struct SceneState {
    entities: Vec<SceneEntity>,
    next_id: u32,
}

impl SceneState {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 0,
        }
    }

    /// Create an entity with defaults for its shape and return its id.
    pub fn spawn(&mut self, shape: SdfShape) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(SceneEntity {
            id,
            name: format!("{}_{}", shape.default_name(), id),
            shape,
            position: [0.0, 0.0, 0.0],
            rotation_deg: [0.0, 0.0, 0.0],
            scale: [0.5, 0.5, 0.5],
            color: [1.0, 1.0, 1.0],
        });
        id
    }

    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut SceneEntity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&SceneEntity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut SceneEntity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    /// Current dense index of an entity; shifts when earlier entities are
    /// removed, which is why only ids are held across frames.
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id == id)
    }

    pub fn entity_at(&self, index: usize) -> Option<&SceneEntity> {
        self.entities.get(index)
    }

    /// Map a pick-pass index back to a stable id.
    pub fn id_at(&self, index: usize) -> Option<u32> {
        self.entities.get(index).map(|entity| entity.id)
    }

    /// Remove by id. Indices of later entities shift down by one; the id
    /// is never handed out again.
    pub fn remove(&mut self, id: u32) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.entities.remove(index);
                true
            }
            None => false,
        }
    }

    /// Ids must stay unique after loading files written by older builds
    /// that did not persist the allocator cursor.
    pub(crate) fn reseed_allocator(&mut self) {
        let max_id = self.entities.iter().map(|entity| entity.id).max();
        if let Some(max_id) = max_id {
            self.next_id = self.next_id.max(max_id + 1);
        }
    }
}
