//! Scene setup
//!
//! Scenes are described as data ([`SceneDescription`]), instantiated once
//! against a backend, and then read-only for the rest of the session.

pub mod description;
pub mod object;
pub mod registry;
pub mod scenarios;

use std::collections::HashMap;

pub use description::{GroupDescription, ObjectDescription, SceneDescription};
pub use object::{CustomParameters, SceneObject};
pub use registry::{MarkerResources, ModelEntry, ModelId, SceneBuilder, SceneRegistry, ShaderGroup, ShaderGroupId};

use crate::physics::lorentz_factor;
use crate::render::backend::{BackendError, ProgramSource, RenderBackend};

/// Errors produced while setting up a scene
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// An object moves at or above the propagation speed
    #[error("object {index} moves at {speed}, not below the propagation speed {speed_of_light}")]
    SuperluminalVelocity {
        /// Index the object would have had
        index: usize,
        /// Magnitude of its velocity
        speed: f32,
        /// Propagation speed of the scene
        speed_of_light: f32,
    },

    /// An object has a non-finite position or velocity
    #[error("object {index} has a non-finite position or velocity")]
    NonFinite {
        /// Index the object would have had
        index: usize,
    },

    /// The propagation speed is not positive and finite
    #[error("invalid propagation speed {0}")]
    InvalidSpeedOfLight(f32),

    /// A shader group key is not registered
    #[error("unknown shader group")]
    UnknownGroup,

    /// A model key is not registered
    #[error("unknown model")]
    UnknownModel,

    /// No built-in scenario has the requested name
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    /// Resource loading failed
    #[error("scene resource loading failed: {0}")]
    Backend(#[from] BackendError),
}

/// Load a scene's resources through `backend` and build its registry
///
/// Loads the marker program and models first, then one program per group
/// and each distinct model path once. Description velocities are fractions
/// of `speed_of_light` and are scaled to world units here.
///
/// # Errors
/// Any failed load aborts instantiation; invalid objects are rejected as in
/// [`SceneBuilder::add_object`].
pub fn instantiate(
    description: &SceneDescription,
    backend: &mut dyn RenderBackend,
    speed_of_light: f32,
) -> Result<SceneRegistry, SceneError> {
    log::info!(
        "Loading scenario '{}' ({} objects): {}",
        description.name,
        description.object_count(),
        description.summary
    );

    let mut builder = SceneBuilder::new(speed_of_light)?;

    let markers = MarkerResources {
        program: backend.compile_program(&ProgramSource::marker())?,
        axes: backend.load_model(scenarios::AXES_MODEL)?,
        arrow: backend.load_model(scenarios::ARROW_MODEL)?,
    };
    builder.set_markers(markers);

    let mut models: HashMap<&str, ModelId> = HashMap::new();

    for group in &description.groups {
        let source = ProgramSource::relativistic(&group.name)
            .with_custom_transform(group.transform.expression().map(str::to_string));
        let program = backend.compile_program(&source)?;
        let group_id = builder.add_shader_group(&group.name, program, group.transform.clone());

        let model_id = if let Some(&id) = models.get(group.model.as_str()) {
            id
        } else {
            let handle = backend.load_model(&group.model)?;
            let id = builder.add_model(&group.model, handle);
            models.insert(group.model.as_str(), id);
            id
        };

        for object in &group.objects {
            builder.add_object(
                group_id,
                model_id,
                object.position,
                object.velocity * speed_of_light,
                object.custom,
            )?;
        }

        let max_gamma = group
            .objects
            .iter()
            .filter_map(|object| lorentz_factor(&object.velocity).ok())
            .fold(1.0_f32, f32::max);
        log::debug!(
            "Group '{}': {} objects, transform {:?}, max γ {max_gamma:.3}",
            group.name,
            group.objects.len(),
            group.transform
        );
    }

    Ok(builder.build())
}

/// Instantiate a built-in scenario by name
pub fn instantiate_builtin(
    name: &str,
    backend: &mut dyn RenderBackend,
    speed_of_light: f32,
) -> Result<SceneRegistry, SceneError> {
    let description = scenarios::builtin(name).ok_or_else(|| SceneError::UnknownScenario(name.to_string()))?;
    instantiate(&description, backend, speed_of_light)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::recording::{BackendCall, RecordingBackend};

    #[test]
    fn test_instantiate_loads_markers_then_groups() {
        let mut backend = RecordingBackend::new();
        let registry = instantiate_builtin("clocks", &mut backend, 1.0).expect("clocks scenario");

        assert_eq!(registry.len(), 8);
        assert_eq!(registry.groups().count(), 2);
        assert!(registry.markers().is_some());

        let calls = backend.calls();
        assert!(matches!(&calls[0], BackendCall::CompileProgram(source) if source.name == "marker"));
        assert_eq!(calls[1], BackendCall::LoadModel(scenarios::AXES_MODEL.to_string()));
        assert_eq!(calls[2], BackendCall::LoadModel(scenarios::ARROW_MODEL.to_string()));
    }

    #[test]
    fn test_shared_model_paths_load_once() {
        let mut description = scenarios::spheres();
        let mut second = description.groups[0].clone();
        second.name = "more_spheres".to_string();
        description.groups.push(second);

        let mut backend = RecordingBackend::new();
        let registry = instantiate(&description, &mut backend, 1.0).expect("instantiate");

        let sphere_loads = backend
            .calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::LoadModel(path) if path == scenarios::SPHERE_MODEL))
            .count();
        assert_eq!(sphere_loads, 1);
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_custom_transform_source_reaches_program() {
        let mut description = scenarios::spheres();
        description.groups[0].transform =
            crate::render::transform::LocalTransform::Custom { expression: "return aPos*2.0;".to_string() };

        let mut backend = RecordingBackend::new();
        instantiate(&description, &mut backend, 1.0).expect("instantiate");

        let compiled = backend.calls().iter().find_map(|call| match call {
            BackendCall::CompileProgram(source) if source.name == "spheres" => Some(source.clone()),
            _ => None,
        });
        assert_eq!(compiled.and_then(|s| s.custom_transform).as_deref(), Some("return aPos*2.0;"));
    }

    #[test]
    fn test_velocities_scale_with_speed_of_light() {
        let mut backend = RecordingBackend::new();
        let registry = instantiate_builtin("aberration", &mut backend, 2.0).expect("aberration");
        assert_eq!(registry.objects()[0].velocity, Vec3::new(0.0, 0.0, 1.98));
    }

    #[test]
    fn test_failures_abort_instantiation() {
        let mut backend = RecordingBackend::new().with_failing_model(scenarios::BOX_MODEL);
        let result = instantiate_builtin("terrell_boxes", &mut backend, 1.0);
        assert!(matches!(result, Err(SceneError::Backend(BackendError::ModelLoad { .. }))));

        let mut backend = RecordingBackend::new();
        assert!(matches!(
            instantiate_builtin("nope", &mut backend, 1.0),
            Err(SceneError::UnknownScenario(_))
        ));

        let mut description = scenarios::spheres();
        description.groups[0].objects[0].velocity = Vec3::new(1.5, 0.0, 0.0);
        let mut backend = RecordingBackend::new();
        assert!(matches!(
            instantiate(&description, &mut backend, 1.0),
            Err(SceneError::SuperluminalVelocity { index: 0, .. })
        ));
    }
}
