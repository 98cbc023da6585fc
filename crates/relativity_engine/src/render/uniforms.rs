//! Plain-old-data uniform blocks
//!
//! Back-ends that upload raw buffers instead of binding uniforms by name can
//! copy these blocks directly. Layouts are std140-compatible: every member is
//! a 16-byte vector or an array of them, scalars are packed together at the
//! end.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Vec3, Vec4, Mat4};
use crate::simulation::pipeline::{GroupParameters, ObjectParameters, SharedParameters};

fn vec4_array(v: &Vec4) -> [f32; 4] {
    [v.x, v.y, v.z, v.w]
}

fn point_array(v: &Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

fn mat4_columns(m: &Mat4) -> [[f32; 4]; 4] {
    let mut columns = [[0.0; 4]; 4];
    for (c, column) in columns.iter_mut().enumerate() {
        for (r, value) in column.iter_mut().enumerate() {
            *value = m[(r, c)];
        }
    }
    columns
}

/// Per-group block, written once per group per frame
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniformBlock {
    /// `P × X × V`, column-major
    pub view_projection: [[f32; 4]; 4],
    /// `(t, x, y, z)` of the observer event
    pub camera: [f32; 4],
    /// Group transform parameters
    pub transform_params: [[f32; 4]; 2],
    /// Propagation speed
    pub speed_of_light: f32,
    /// Non-zero when true positions are shown
    pub show_true_position: u32,
    /// Non-zero when Doppler recoloring is off
    pub turn_off_doppler: u32,
    /// Transform kind code
    pub transform_kind: i32,
}

impl FrameUniformBlock {
    /// Build the block of one group
    pub fn new(shared: &SharedParameters, group: &GroupParameters) -> Self {
        Self {
            view_projection: mat4_columns(&shared.view_projection),
            camera: vec4_array(&shared.camera),
            transform_params: [
                vec4_array(&group.transform.params[0]),
                vec4_array(&group.transform.params[1]),
            ],
            speed_of_light: shared.speed_of_light,
            show_true_position: u32::from(shared.show_true_position),
            turn_off_doppler: u32::from(shared.turn_off_doppler),
            transform_kind: group.transform.kind,
        }
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Per-object block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniformBlock {
    /// Custom pass-through parameters
    pub custom: [[f32; 4]; 4],
    /// Position at time zero, `w = 1`
    pub initial_position: [f32; 4],
    /// Velocity, `w = 0`
    pub velocity: [f32; 4],
    /// Emission position in `xyz`, emission time in `w`
    pub emission: [f32; 4],
}

impl From<&ObjectParameters> for ObjectUniformBlock {
    fn from(object: &ObjectParameters) -> Self {
        let custom = object.custom.as_array();
        Self {
            custom: [
                vec4_array(&custom[0]),
                vec4_array(&custom[1]),
                vec4_array(&custom[2]),
                vec4_array(&custom[3]),
            ],
            initial_position: point_array(&object.initial_position, 1.0),
            velocity: point_array(&object.velocity, 0.0),
            emission: point_array(&object.emission.position(), object.emission.time()),
        }
    }
}

impl ObjectUniformBlock {
    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{EmissionEvent, RetardedEvent};
    use crate::render::backend::{ModelHandle, ProgramHandle};
    use crate::render::transform::LocalTransform;
    use crate::scene::CustomParameters;

    #[test]
    fn test_block_sizes_are_std140_multiples() {
        assert_eq!(std::mem::size_of::<FrameUniformBlock>(), 128);
        assert_eq!(std::mem::size_of::<ObjectUniformBlock>(), 112);
        assert_eq!(std::mem::size_of::<FrameUniformBlock>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniformBlock>() % 16, 0);
    }

    #[test]
    fn test_frame_block_layout() {
        let mut view_projection = Mat4::identity();
        view_projection[(0, 3)] = 7.0;
        let shared = SharedParameters {
            view_projection,
            observer: Vec3::new(1.0, 2.0, 3.0),
            camera: Vec4::new(0.5, 1.0, 2.0, 3.0),
            speed_of_light: 1.0,
            show_true_position: true,
            turn_off_doppler: false,
        };
        let group = GroupParameters {
            name: "g".to_string(),
            program: ProgramHandle(1),
            transform: LocalTransform::Scaled { factor: 100.0 }.encode(),
            objects: Vec::new(),
        };

        let block = FrameUniformBlock::new(&shared, &group);
        assert_eq!(block.view_projection[3][0], 7.0);
        assert_eq!(block.camera, [0.5, 1.0, 2.0, 3.0]);
        assert_eq!(block.transform_params[0], [100.0, 0.0, 0.0, 0.0]);
        assert_eq!(block.show_true_position, 1);
        assert_eq!(block.turn_off_doppler, 0);
        assert_eq!(block.transform_kind, LocalTransform::KIND_SCALED);
        assert_eq!(block.as_bytes().len(), 128);
    }

    #[test]
    fn test_object_block_packs_emission() {
        let object = ObjectParameters {
            index: 0,
            model: ModelHandle(1),
            initial_position: Vec3::new(3.0, 0.0, 0.0),
            velocity: Vec3::new(0.99, 0.0, 0.0),
            custom: CustomParameters::from_first(Vec4::new(1.0, 2.0, 3.0, 4.0)),
            emission: EmissionEvent::Retarded(RetardedEvent { time: 1.0, position: Vec3::new(3.99, 0.0, 0.0) }),
        };

        let block = ObjectUniformBlock::from(&object);
        assert_eq!(block.custom[0], [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(block.initial_position, [3.0, 0.0, 0.0, 1.0]);
        assert_eq!(block.velocity, [0.99, 0.0, 0.0, 0.0]);
        assert_eq!(block.emission, [3.99, 0.0, 0.0, 1.0]);
        assert_eq!(block.as_bytes().len(), 112);
    }
}
