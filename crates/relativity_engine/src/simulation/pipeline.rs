//! # Frame Pipeline
//!
//! One simulation tick, split in two halves:
//!
//! - [`FramePipeline::prepare`] is pure: from the simulation state, the
//!   observer pose and the registry it resolves every object's emission event
//!   and collects everything the shading stage needs into [`FrameParameters`].
//! - [`FramePipeline::submit`] writes those parameters to a backend in a
//!   fixed order.
//!
//! ## Uniform order
//! Per group: `show_true_position`, `turn_off_doppler`, `PV`, `camera`,
//! `speed_of_light`, `transform_kind`, `transform_params[0]`,
//! `transform_params[1]`, then the packed `FrameBlock`. Per object:
//! `initial_pos`, `velocity`, `custom[0]`..`custom[3]`, `emission_time`,
//! `emission_pos`, the packed `ObjectBlock`, then the draw.
//!
//! The marker pass follows the scene: ground plane, depth clear, then an axes
//! marker per object and, unless true positions are shown, a velocity arrow.

use crate::debug::{DebugMarker, MarkerKind};
use crate::foundation::math::{Vec3, Vec4, Mat4};
use crate::physics::{resolve_emission, EmissionEvent, SolverError};
use crate::render::backend::{BackendError, ModelHandle, ProgramHandle, RenderBackend, UniformValue};
use crate::render::camera::ObserverPose;
use crate::render::transform::EncodedTransform;
use crate::render::uniforms::{FrameUniformBlock, ObjectUniformBlock};
use crate::scene::{CustomParameters, MarkerResources, SceneRegistry};
use super::state::{DebugToggles, SimulationState};

/// Names of the four custom parameter uniforms
const CUSTOM_UNIFORMS: [&str; 4] = ["custom[0]", "custom[1]", "custom[2]", "custom[3]"];

/// Binding of the per-group [`FrameUniformBlock`]
pub const FRAME_BLOCK: &str = "FrameBlock";

/// Binding of the per-object [`ObjectUniformBlock`]
pub const OBJECT_BLOCK: &str = "ObjectBlock";

/// Errors that abort a frame
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    /// An emission event could not be resolved
    #[error("object {index}: {source}")]
    Solver {
        /// Object index in the registry
        index: usize,
        /// Solver failure
        source: SolverError,
    },

    /// The backend rejected a call
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Values shared by every group in a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedParameters {
    /// `P × X × V` of the observer
    pub view_projection: Mat4,
    /// Observer position, made relative before projecting
    pub observer: Vec3,
    /// `(t, x, y, z)` of the observer event
    pub camera: Vec4,
    /// Propagation speed
    pub speed_of_light: f32,
    /// Light delay bypassed
    pub show_true_position: bool,
    /// Doppler recoloring disabled
    pub turn_off_doppler: bool,
}

/// Per-object values of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectParameters {
    /// Index in the registry
    pub index: usize,
    /// Model to draw
    pub model: ModelHandle,
    /// Position at time zero
    pub initial_position: Vec3,
    /// Velocity
    pub velocity: Vec3,
    /// Custom pass-through parameters
    pub custom: CustomParameters,
    /// Resolved emission event
    pub emission: EmissionEvent,
}

/// One shader group's share of a frame
#[derive(Debug, Clone, PartialEq)]
pub struct GroupParameters {
    /// Group name
    pub name: String,
    /// Program to activate
    pub program: ProgramHandle,
    /// Encoded local-frame transform
    pub transform: EncodedTransform,
    /// Objects in insertion order
    pub objects: Vec<ObjectParameters>,
}

/// The debug marker pass of a frame
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPass {
    /// Marker program and models
    pub resources: MarkerResources,
    /// Markers in draw order
    pub markers: Vec<DebugMarker>,
}

/// Everything one frame hands to the shading stage
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParameters {
    /// Shared values
    pub shared: SharedParameters,
    /// Groups in registration order
    pub groups: Vec<GroupParameters>,
    /// Marker pass, absent when markers are hidden or not loaded
    pub markers: Option<MarkerPass>,
}

impl FrameParameters {
    /// Number of objects in the frame
    pub fn object_count(&self) -> usize {
        self.groups.iter().map(|group| group.objects.len()).sum()
    }
}

/// Per-frame driver of the solver and the shading hand-off
pub struct FramePipeline;

impl FramePipeline {
    /// Resolve every object and assemble the frame's parameters
    ///
    /// Pure: reads its inputs only. Fails on the first object whose emission
    /// event cannot be resolved.
    pub fn prepare(
        state: &SimulationState,
        pose: &ObserverPose,
        registry: &SceneRegistry,
    ) -> Result<FrameParameters, FrameError> {
        let time = state.time();
        let observer = pose.position();
        let speed_of_light = state.speed_of_light();
        let bypass = state.is_enabled(DebugToggles::POSITION_BYPASS);

        let shared = SharedParameters {
            view_projection: pose.view_projection(),
            observer,
            camera: Vec4::new(time, observer.x, observer.y, observer.z),
            speed_of_light,
            show_true_position: bypass,
            turn_off_doppler: state.is_enabled(DebugToggles::DOPPLER_OFF),
        };

        let mut groups = Vec::new();
        for (_, group) in registry.groups() {
            let mut objects = Vec::with_capacity(group.object_indices().len());

            for (index, object) in registry.group_objects(group) {
                let emission = resolve_emission(observer, time, &object.worldline(), speed_of_light, bypass)
                    .map_err(|source| FrameError::Solver { index, source })?;

                let Some(model) = registry.model(object.model) else {
                    log::warn!("Object {index} refers to a missing model, skipped");
                    continue;
                };

                objects.push(ObjectParameters {
                    index,
                    model: model.handle,
                    initial_position: object.initial_position,
                    velocity: object.velocity,
                    custom: object.custom,
                    emission,
                });
            }

            groups.push(GroupParameters {
                name: group.name.clone(),
                program: group.program,
                transform: group.transform.encode(),
                objects,
            });
        }

        let markers = match registry.markers() {
            Some(resources) if state.is_enabled(DebugToggles::SHOW_MARKERS) => Some(MarkerPass {
                resources: *resources,
                markers: Self::markers(&groups, time, observer, bypass),
            }),
            _ => None,
        };

        Ok(FrameParameters { shared, groups, markers })
    }

    fn markers(groups: &[GroupParameters], time: f32, observer: Vec3, bypass: bool) -> Vec<DebugMarker> {
        let mut objects: Vec<&ObjectParameters> = groups.iter().flat_map(|group| group.objects.iter()).collect();
        objects.sort_by_key(|object| object.index);

        let mut markers = Vec::with_capacity(objects.len() * 2);
        for object in objects {
            let true_position = object.initial_position + object.velocity * time;
            markers.push(DebugMarker::axes(object.index, true_position, observer));

            if !bypass {
                markers.push(DebugMarker::velocity_arrow(
                    object.index,
                    object.emission.position(),
                    &object.velocity,
                    observer,
                ));
            }
        }
        markers
    }

    /// Write a prepared frame to the backend
    pub fn submit(frame: &FrameParameters, backend: &mut dyn RenderBackend) -> Result<(), BackendError> {
        let shared = &frame.shared;

        for group in &frame.groups {
            let program = group.program;
            backend.use_program(program)?;

            backend.set_uniform(program, "show_true_position", UniformValue::Bool(shared.show_true_position))?;
            backend.set_uniform(program, "turn_off_doppler", UniformValue::Bool(shared.turn_off_doppler))?;
            backend.set_uniform(program, "PV", UniformValue::Mat4(shared.view_projection))?;
            backend.set_uniform(program, "camera", UniformValue::Vec4(shared.camera))?;
            backend.set_uniform(program, "speed_of_light", UniformValue::Float(shared.speed_of_light))?;
            backend.set_uniform(program, "transform_kind", UniformValue::Int(group.transform.kind))?;
            backend.set_uniform(program, "transform_params[0]", UniformValue::Vec4(group.transform.params[0]))?;
            backend.set_uniform(program, "transform_params[1]", UniformValue::Vec4(group.transform.params[1]))?;
            backend.set_uniform_block(program, FRAME_BLOCK, FrameUniformBlock::new(shared, group).as_bytes())?;

            for object in &group.objects {
                backend.set_uniform(program, "initial_pos", UniformValue::Vec3(object.initial_position))?;
                backend.set_uniform(program, "velocity", UniformValue::Vec3(object.velocity))?;
                for (name, value) in CUSTOM_UNIFORMS.iter().zip(object.custom.as_array()) {
                    backend.set_uniform(program, name, UniformValue::Vec4(*value))?;
                }
                backend.set_uniform(program, "emission_time", UniformValue::Float(object.emission.time()))?;
                backend.set_uniform(program, "emission_pos", UniformValue::Vec3(object.emission.position()))?;
                backend.set_uniform_block(program, OBJECT_BLOCK, ObjectUniformBlock::from(object).as_bytes())?;

                backend.draw_model(object.model, program)?;
            }
        }

        if let Some(pass) = &frame.markers {
            backend.draw_ground_plane(&shared.view_projection, shared.observer)?;
            backend.clear_depth()?;

            let program = pass.resources.program;
            backend.use_program(program)?;
            backend.set_uniform(program, "PV", UniformValue::Mat4(shared.view_projection))?;

            for marker in &pass.markers {
                let model = match marker.kind {
                    MarkerKind::Axes => pass.resources.axes,
                    MarkerKind::VelocityArrow => pass.resources.arrow,
                };
                backend.set_uniform(program, "model", UniformValue::Mat4(marker.model))?;
                backend.draw_model(model, program)?;
            }
        }

        Ok(())
    }

    /// Advance time, then prepare and submit one frame
    pub fn run(
        state: &mut SimulationState,
        delta_time: f32,
        pose: &ObserverPose,
        registry: &SceneRegistry,
        backend: &mut dyn RenderBackend,
    ) -> Result<FrameParameters, FrameError> {
        let step = state.advance(delta_time);
        log::trace!("Frame at t={:.4} (step {step:.4})", state.time());

        let frame = Self::prepare(state, pose, registry)?;
        Self::submit(&frame, backend)?;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::physics::solve_retarded_event;
    use crate::render::recording::{BackendCall, RecordingBackend};
    use crate::render::transform::LocalTransform;
    use crate::scene::{instantiate_builtin, SceneBuilder};

    fn two_group_scene() -> SceneRegistry {
        let mut scene = SceneBuilder::new(1.0).expect("valid speed of light");
        let a = scene.add_shader_group("a", ProgramHandle(100), LocalTransform::Offset);
        let b = scene.add_shader_group("b", ProgramHandle(200), LocalTransform::Scaled { factor: 2.0 });
        let model = scene.add_model("m.obj", ModelHandle(7));

        let custom = CustomParameters::from_first(Vec4::new(1.0, 2.0, 3.0, 4.0));
        scene.add_object(b, model, Vec3::new(0.0, 0.0, -5.0), Vec3::zeros(), custom).expect("object 0");
        scene.add_object(a, model, Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.99, 0.0, 0.0), custom).expect("object 1");
        scene.add_object(b, model, Vec3::new(0.0, 2.0, -5.0), Vec3::new(0.0, 0.5, 0.0), custom).expect("object 2");
        scene.set_markers(MarkerResources { program: ProgramHandle(1), axes: ModelHandle(2), arrow: ModelHandle(3) });
        scene.build()
    }

    fn running_state(time: f32) -> SimulationState {
        let mut state = SimulationState::new(1.0);
        state.advance(time);
        state
    }

    #[test]
    fn test_prepare_follows_group_order() {
        let registry = two_group_scene();
        let pose = ObserverPose::default().with_position(Vec3::zeros());
        let frame = FramePipeline::prepare(&running_state(5.0), &pose, &registry).expect("frame");

        assert_eq!(frame.groups.len(), 2);
        assert_eq!(frame.groups[0].program, ProgramHandle(100));
        let indices: Vec<Vec<usize>> =
            frame.groups.iter().map(|g| g.objects.iter().map(|o| o.index).collect()).collect();
        assert_eq!(indices, vec![vec![1], vec![0, 2]]);
        assert_eq!(frame.object_count(), 3);
        assert_eq!(frame.shared.camera, Vec4::new(5.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_prepare_uses_solver_for_each_object() {
        let registry = two_group_scene();
        let pose = ObserverPose::default().with_position(Vec3::zeros());
        let frame = FramePipeline::prepare(&running_state(5.0), &pose, &registry).expect("frame");

        let fast = &frame.groups[0].objects[0];
        let expected = solve_retarded_event(Vec3::zeros(), 5.0, &registry.objects()[1].worldline(), 1.0)
            .expect("solve");
        assert_eq!(fast.emission, EmissionEvent::Retarded(expected));
        assert_relative_eq!(fast.emission.time(), 16.0 / 15.92, epsilon = 1e-5);
    }

    #[test]
    fn test_bypass_reports_true_positions_and_drops_arrows() {
        let registry = two_group_scene();
        let pose = ObserverPose::default();
        let state = running_state(2.0).with_toggles(DebugToggles::POSITION_BYPASS | DebugToggles::SHOW_MARKERS);
        let frame = FramePipeline::prepare(&state, &pose, &registry).expect("frame");

        for object in frame.groups.iter().flat_map(|g| &g.objects) {
            assert!(object.emission.is_instantaneous());
            assert_eq!(object.emission.position(), object.initial_position + object.velocity * 2.0);
        }
        let pass = frame.markers.expect("markers shown");
        assert_eq!(pass.markers.len(), 3);
        assert!(pass.markers.iter().all(|m| m.kind == MarkerKind::Axes));
        assert!(frame.shared.show_true_position);
    }

    #[test]
    fn test_markers_are_observer_relative_and_ordered_by_object() {
        let registry = two_group_scene();
        let observer = Vec3::new(0.0, 1.0, 0.0);
        let pose = ObserverPose::default().with_position(observer);
        let frame = FramePipeline::prepare(&running_state(1.0), &pose, &registry).expect("frame");

        let pass = frame.markers.expect("markers shown");
        let objects: Vec<usize> = pass.markers.iter().map(|m| m.object).collect();
        assert_eq!(objects, vec![0, 0, 1, 1, 2, 2]);

        let axes = &pass.markers[2];
        assert_eq!(axes.kind, MarkerKind::Axes);
        assert_relative_eq!(axes.offset(), Vec3::new(3.99, -1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_hidden_markers_are_skipped() {
        let registry = two_group_scene();
        let state = running_state(1.0).with_toggles(DebugToggles::empty());
        let frame = FramePipeline::prepare(&state, &ObserverPose::default(), &registry).expect("frame");
        assert!(frame.markers.is_none());
    }

    #[test]
    fn test_submit_writes_uniforms_in_documented_order() {
        let registry = two_group_scene();
        let state = running_state(1.0).with_toggles(DebugToggles::empty());
        let frame = FramePipeline::prepare(&state, &ObserverPose::default(), &registry).expect("frame");

        let mut backend = RecordingBackend::new();
        FramePipeline::submit(&frame, &mut backend).expect("submit");

        let per_group = [
            "show_true_position",
            "turn_off_doppler",
            "PV",
            "camera",
            "speed_of_light",
            "transform_kind",
            "transform_params[0]",
            "transform_params[1]",
        ];
        let per_object = [
            "initial_pos",
            "velocity",
            "custom[0]",
            "custom[1]",
            "custom[2]",
            "custom[3]",
            "emission_time",
            "emission_pos",
        ];

        let mut expected: Vec<&str> = Vec::new();
        expected.extend(per_group);
        expected.extend(per_object);
        expected.extend(per_group);
        expected.extend(per_object);
        expected.extend(per_object);
        assert_eq!(backend.uniform_names(), expected);

        assert_eq!(backend.calls()[0], BackendCall::UseProgram(ProgramHandle(100)));
        assert_eq!(backend.draw_count(), 3);
        assert_eq!(backend.last_uniform("transform_kind"), Some(UniformValue::Int(LocalTransform::KIND_SCALED)));
        assert_eq!(
            backend.last_uniform("custom[0]"),
            Some(UniformValue::Vec4(Vec4::new(1.0, 2.0, 3.0, 4.0)))
        );
    }

    #[test]
    fn test_submit_uploads_packed_blocks() {
        let registry = two_group_scene();
        let state = running_state(5.0).with_toggles(DebugToggles::empty());
        let frame = FramePipeline::prepare(&state, &ObserverPose::default().with_position(Vec3::zeros()), &registry)
            .expect("frame");

        let mut backend = RecordingBackend::new();
        FramePipeline::submit(&frame, &mut backend).expect("submit");

        let frame_blocks = backend.uniform_blocks(FRAME_BLOCK);
        assert_eq!(frame_blocks.len(), 2);
        let second: FrameUniformBlock = bytemuck::pod_read_unaligned(frame_blocks[1]);
        assert_eq!(second.transform_kind, LocalTransform::KIND_SCALED);
        assert_eq!(second.camera, [5.0, 0.0, 0.0, 0.0]);

        let object_blocks = backend.uniform_blocks(OBJECT_BLOCK);
        assert_eq!(object_blocks.len(), 3);
        let fast: ObjectUniformBlock = bytemuck::pod_read_unaligned(object_blocks[0]);
        assert_eq!(fast.initial_position, [3.0, 0.0, 0.0, 1.0]);
        assert_relative_eq!(fast.emission[3], 16.0 / 15.92, epsilon = 1e-5);

        let calls = backend.calls();
        let first_draw = calls.iter().position(|c| matches!(c, BackendCall::DrawModel(..))).expect("draw");
        assert!(matches!(&calls[first_draw - 1], BackendCall::SetUniformBlock(_, binding, _) if binding == OBJECT_BLOCK));
    }

    #[test]
    fn test_submit_marker_pass_after_scene() {
        let registry = two_group_scene();
        let frame = FramePipeline::prepare(&running_state(1.0), &ObserverPose::default(), &registry).expect("frame");

        let mut backend = RecordingBackend::new();
        FramePipeline::submit(&frame, &mut backend).expect("submit");

        let calls = backend.calls();
        let plane = calls
            .iter()
            .position(|c| matches!(c, BackendCall::DrawGroundPlane(..)))
            .expect("ground plane drawn");
        assert_eq!(calls[plane + 1], BackendCall::ClearDepth);
        assert_eq!(calls[plane + 2], BackendCall::UseProgram(ProgramHandle(1)));

        let scene_draws = calls[..plane].iter().filter(|c| matches!(c, BackendCall::DrawModel(..))).count();
        assert_eq!(scene_draws, 3);
        let arrows = calls[plane..]
            .iter()
            .filter(|c| matches!(c, BackendCall::DrawModel(ModelHandle(3), _)))
            .count();
        assert_eq!(arrows, 3);
    }

    #[test]
    fn test_run_advances_time_before_solving() {
        let mut backend = RecordingBackend::new();
        let registry = instantiate_builtin("spheres", &mut backend, 1.0).expect("spheres");
        let mut state = SimulationState::new(1.0);
        let pose = ObserverPose::default();

        let frame = FramePipeline::run(&mut state, 0.5, &pose, &registry, &mut backend).expect("frame");
        assert_relative_eq!(frame.shared.camera.x, 0.5);

        state.toggle_pause();
        let frame = FramePipeline::run(&mut state, 0.5, &pose, &registry, &mut backend).expect("frame");
        assert_relative_eq!(frame.shared.camera.x, 0.5);
    }
}
