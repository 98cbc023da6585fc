//! # Scene Object Registry
//!
//! Setup-time registration of shader groups, models and objects, frozen into
//! an immutable [`SceneRegistry`] before the first frame.
//!
//! Objects are stored in one flat list in insertion order. Every shader group
//! keeps its own ordered list of object indices, so objects of different
//! groups may be added in any interleaving and still draw grouped.

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::{Vec3, utils};
use crate::physics::MIN_BETA2;
use crate::render::backend::{ModelHandle, ProgramHandle};
use crate::render::transform::LocalTransform;
use super::object::{CustomParameters, SceneObject};
use super::SceneError;

new_key_type! {
    /// Key of a registered model
    pub struct ModelId;

    /// Key of a registered shader group
    pub struct ShaderGroupId;
}

/// A compiled program together with its local-frame transform
#[derive(Debug, Clone)]
pub struct ShaderGroup {
    /// Group name, used in logs
    pub name: String,
    /// Backend program
    pub program: ProgramHandle,
    /// Local-frame transform the program applies
    pub transform: LocalTransform,
    objects: Vec<usize>,
}

impl ShaderGroup {
    /// Indices into [`SceneRegistry::objects`], in insertion order
    pub fn object_indices(&self) -> &[usize] {
        &self.objects
    }
}

/// A loaded model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    /// Path the model was loaded from
    pub path: String,
    /// Backend handle
    pub handle: ModelHandle,
}

/// Resources used by the debug marker pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerResources {
    /// Plain marker program
    pub program: ProgramHandle,
    /// Coordinate axes model drawn at true positions
    pub axes: ModelHandle,
    /// Arrow model drawn at apparent positions
    pub arrow: ModelHandle,
}

/// Mutable registration phase of a scene
#[derive(Debug)]
pub struct SceneBuilder {
    speed_of_light: f32,
    groups: SlotMap<ShaderGroupId, ShaderGroup>,
    group_order: Vec<ShaderGroupId>,
    models: SlotMap<ModelId, ModelEntry>,
    objects: Vec<SceneObject>,
    markers: Option<MarkerResources>,
}

impl SceneBuilder {
    /// Start a scene for the given propagation speed
    pub fn new(speed_of_light: f32) -> Result<Self, SceneError> {
        if !(speed_of_light.is_finite() && speed_of_light > 0.0) {
            return Err(SceneError::InvalidSpeedOfLight(speed_of_light));
        }

        Ok(Self {
            speed_of_light,
            groups: SlotMap::with_key(),
            group_order: Vec::new(),
            models: SlotMap::with_key(),
            objects: Vec::new(),
            markers: None,
        })
    }

    /// Register a shader group; groups draw in registration order
    pub fn add_shader_group(
        &mut self,
        name: impl Into<String>,
        program: ProgramHandle,
        transform: LocalTransform,
    ) -> ShaderGroupId {
        let id = self.groups.insert(ShaderGroup {
            name: name.into(),
            program,
            transform,
            objects: Vec::new(),
        });
        self.group_order.push(id);
        id
    }

    /// Register a loaded model
    pub fn add_model(&mut self, path: impl Into<String>, handle: ModelHandle) -> ModelId {
        self.models.insert(ModelEntry { path: path.into(), handle })
    }

    /// Set the resources of the debug marker pass
    pub fn set_markers(&mut self, markers: MarkerResources) {
        self.markers = Some(markers);
    }

    /// Register an object; returns its index in [`SceneRegistry::objects`]
    ///
    /// # Errors
    /// Rejects unknown keys, non-finite data and velocities that are not
    /// strictly below the propagation speed.
    pub fn add_object(
        &mut self,
        group: ShaderGroupId,
        model: ModelId,
        initial_position: Vec3,
        velocity: Vec3,
        custom: CustomParameters,
    ) -> Result<usize, SceneError> {
        if !self.models.contains_key(model) {
            return Err(SceneError::UnknownModel);
        }
        if !utils::is_finite_vec3(&initial_position) || !utils::is_finite_vec3(&velocity) {
            return Err(SceneError::NonFinite { index: self.objects.len() });
        }

        let beta = velocity / self.speed_of_light;
        if 1.0 - beta.dot(&beta) <= MIN_BETA2 {
            return Err(SceneError::SuperluminalVelocity {
                index: self.objects.len(),
                speed: velocity.norm(),
                speed_of_light: self.speed_of_light,
            });
        }

        let index = self.objects.len();
        let entry = self.groups.get_mut(group).ok_or(SceneError::UnknownGroup)?;
        entry.objects.push(index);

        self.objects.push(SceneObject {
            initial_position,
            velocity,
            custom,
            model,
            group,
        });

        Ok(index)
    }

    /// Freeze the registry
    pub fn build(self) -> SceneRegistry {
        log::debug!(
            "Scene registry built: {} groups, {} models, {} objects",
            self.group_order.len(),
            self.models.len(),
            self.objects.len()
        );

        SceneRegistry {
            speed_of_light: self.speed_of_light,
            groups: self.groups,
            group_order: self.group_order,
            models: self.models,
            objects: self.objects,
            markers: self.markers,
        }
    }
}

/// Immutable scene: groups, models and objects
#[derive(Debug)]
pub struct SceneRegistry {
    speed_of_light: f32,
    groups: SlotMap<ShaderGroupId, ShaderGroup>,
    group_order: Vec<ShaderGroupId>,
    models: SlotMap<ModelId, ModelEntry>,
    objects: Vec<SceneObject>,
    markers: Option<MarkerResources>,
}

impl SceneRegistry {
    /// Groups in registration order
    pub fn groups(&self) -> impl Iterator<Item = (ShaderGroupId, &ShaderGroup)> + '_ {
        self.group_order
            .iter()
            .filter_map(|&id| self.groups.get(id).map(|group| (id, group)))
    }

    /// Look up a group
    pub fn group(&self, id: ShaderGroupId) -> Option<&ShaderGroup> {
        self.groups.get(id)
    }

    /// Look up a model
    pub fn model(&self, id: ModelId) -> Option<&ModelEntry> {
        self.models.get(id)
    }

    /// All objects in insertion order
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Objects of one group, in insertion order
    pub fn group_objects<'a>(&'a self, group: &'a ShaderGroup) -> impl Iterator<Item = (usize, &'a SceneObject)> + 'a {
        group
            .object_indices()
            .iter()
            .filter_map(move |&index| self.objects.get(index).map(|object| (index, object)))
    }

    /// Debug marker resources, if registered
    pub fn markers(&self) -> Option<&MarkerResources> {
        self.markers.as_ref()
    }

    /// Propagation speed the velocities were validated against
    pub fn speed_of_light(&self) -> f32 {
        self.speed_of_light
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> SceneBuilder {
        SceneBuilder::new(1.0).expect("valid speed of light")
    }

    #[test]
    fn test_interleaved_objects_stay_grouped_in_insertion_order() {
        let mut scene = builder();
        let first = scene.add_shader_group("first", ProgramHandle(1), LocalTransform::Identity);
        let second = scene.add_shader_group("second", ProgramHandle(2), LocalTransform::Offset);
        let model = scene.add_model("box.obj", ModelHandle(10));

        let mut expected_first = Vec::new();
        let mut expected_second = Vec::new();
        for i in 0..6 {
            let group = if i % 3 == 0 { second } else { first };
            let index = scene
                .add_object(group, model, Vec3::new(i as f32, 0.0, 0.0), Vec3::zeros(), CustomParameters::default())
                .expect("valid object");
            if group == first { expected_first.push(index) } else { expected_second.push(index) }
        }

        let registry = scene.build();
        let groups: Vec<_> = registry.groups().collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, first);
        assert_eq!(groups[0].1.object_indices(), expected_first.as_slice());
        assert_eq!(groups[1].1.object_indices(), expected_second.as_slice());
        assert_eq!(expected_second, vec![0, 3]);

        let xs: Vec<f32> = registry.group_objects(groups[0].1).map(|(_, o)| o.initial_position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(registry.len(), 6);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_rejects_velocity_at_or_above_light_speed() {
        let mut scene = SceneBuilder::new(2.0).expect("valid speed of light");
        let group = scene.add_shader_group("g", ProgramHandle(1), LocalTransform::Identity);
        let model = scene.add_model("m.obj", ModelHandle(1));

        let ok = scene.add_object(group, model, Vec3::zeros(), Vec3::new(1.99, 0.0, 0.0), CustomParameters::default());
        assert_eq!(ok.expect("sub-luminal"), 0);

        let at_c = scene.add_object(group, model, Vec3::zeros(), Vec3::new(0.0, 2.0, 0.0), CustomParameters::default());
        assert!(matches!(at_c, Err(SceneError::SuperluminalVelocity { index: 1, .. })));

        let above = scene.add_object(group, model, Vec3::zeros(), Vec3::new(3.0, 3.0, 0.0), CustomParameters::default());
        assert!(above.is_err());
        assert_eq!(scene.build().len(), 1);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_inputs() {
        let mut scene = builder();
        let group = scene.add_shader_group("g", ProgramHandle(1), LocalTransform::Identity);
        let model = scene.add_model("m.obj", ModelHandle(2));
        let none = CustomParameters::default();

        assert!(matches!(
            scene.add_object(group, ModelId::default(), Vec3::zeros(), Vec3::zeros(), none),
            Err(SceneError::UnknownModel)
        ));
        assert!(matches!(
            scene.add_object(ShaderGroupId::default(), model, Vec3::zeros(), Vec3::zeros(), none),
            Err(SceneError::UnknownGroup)
        ));
        assert!(matches!(
            scene.add_object(group, model, Vec3::new(f32::NAN, 0.0, 0.0), Vec3::zeros(), none),
            Err(SceneError::NonFinite { .. })
        ));
        assert!(matches!(SceneBuilder::new(0.0), Err(SceneError::InvalidSpeedOfLight(_))));
        assert!(scene.build().is_empty());
    }

    #[test]
    fn test_markers_are_optional() {
        let mut scene = builder();
        assert!(builder().build().markers().is_none());

        let markers = MarkerResources { program: ProgramHandle(1), axes: ModelHandle(2), arrow: ModelHandle(3) };
        scene.set_markers(markers);
        assert_eq!(scene.build().markers(), Some(&markers));
    }
}
