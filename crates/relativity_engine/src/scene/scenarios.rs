//! Built-in demonstration scenes
//!
//! Each scenario isolates one visual effect. Velocities are fractions of the
//! propagation speed.

use crate::foundation::math::{Vec3, Vec4};
use crate::render::transform::LocalTransform;
use super::description::{GroupDescription, ObjectDescription, SceneDescription};
use super::object::CustomParameters;

/// Model used by the box scenarios
pub const BOX_MODEL: &str = "assets/objects/die/die.obj";
/// Clock face model
pub const CLOCK_MODEL: &str = "assets/objects/clock/clock.obj";
/// Clock hand model
pub const CLOCK_HAND_MODEL: &str = "assets/objects/clock/clock_tick.obj";
/// Wheel model
pub const WHEEL_MODEL: &str = "assets/objects/wheel/wheel.obj";
/// Sphere model
pub const SPHERE_MODEL: &str = "assets/objects/sphere/sphere.obj";
/// Sky sphere model
pub const UNIVERSE_MODEL: &str = "assets/objects/universe/universe.obj";
/// Coordinate axes marker model
pub const AXES_MODEL: &str = "assets/objects/coords/coords2.obj";
/// Velocity arrow marker model
pub const ARROW_MODEL: &str = "assets/objects/coords/arrow.obj";

/// Name of the scenario loaded when none is configured
pub const DEFAULT_SCENARIO: &str = "terrell_boxes";

/// Names of all built-in scenarios
pub const SCENARIO_NAMES: [&str; 6] = ["terrell_boxes", "clocks", "box_wave", "wheels", "spheres", "aberration"];

/// Look up a built-in scenario by name
pub fn builtin(name: &str) -> Option<SceneDescription> {
    match name {
        "terrell_boxes" => Some(terrell_boxes()),
        "clocks" => Some(clocks()),
        "box_wave" => Some(box_wave()),
        "wheels" => Some(wheels()),
        "spheres" => Some(spheres()),
        "aberration" => Some(aberration()),
        _ => None,
    }
}

fn scene(name: &str, summary: &str, groups: Vec<GroupDescription>) -> SceneDescription {
    SceneDescription {
        name: name.to_string(),
        summary: summary.to_string(),
        groups,
    }
}

fn group(name: &str, model: &str, transform: LocalTransform, objects: Vec<ObjectDescription>) -> GroupDescription {
    GroupDescription {
        name: name.to_string(),
        transform,
        model: model.to_string(),
        objects,
    }
}

/// Terrell rotation and Lorentz contraction: a row of boxes at 0.99c above a
/// row at rest
pub fn terrell_boxes() -> SceneDescription {
    let mut objects = Vec::new();
    for i in -5..=5 {
        let custom = CustomParameters::from_first(Vec4::new(i as f32 * 3.0, 0.0, 0.0, 0.0));
        objects.push(ObjectDescription::new(Vec3::zeros(), Vec3::new(0.99, 0.0, 0.0)).with_custom(custom));
        objects.push(ObjectDescription::new(Vec3::new(0.0, 3.0, 0.0), Vec3::zeros()).with_custom(custom));
    }

    scene(
        "terrell_boxes",
        "Boxes at 0.99c above boxes at rest",
        vec![group("boxes", BOX_MODEL, LocalTransform::Offset, objects)],
    )
}

/// Time dilation: clocks at 0, 0.33c, 0.66c and 0.9c
pub fn clocks() -> SceneDescription {
    const CLOCK_SCALE: f32 = 0.575;
    const HAND_RATE: f32 = 0.5257;

    let speeds = [0.0, 0.33, 0.66, 0.9];
    let placed = |custom: CustomParameters| -> Vec<ObjectDescription> {
        speeds
            .iter()
            .enumerate()
            .map(|(i, &speed)| {
                ObjectDescription::new(Vec3::new(0.0, i as f32 * 2.0, -20.0), Vec3::new(speed, 0.0, 0.0))
                    .with_custom(custom)
            })
            .collect()
    };

    let hand = CustomParameters::from_first(Vec4::new(0.0, 0.0, 1.0, HAND_RATE));
    let transform = LocalTransform::AxisRotation { scale: CLOCK_SCALE };

    scene(
        "clocks",
        "Ticking clocks at increasing speeds",
        vec![
            group("clock_faces", CLOCK_MODEL, transform.clone(), placed(CustomParameters::default())),
            group("clock_hands", CLOCK_HAND_MODEL, transform, placed(hand)),
        ],
    )
}

/// Oscillating boxes: a hundred at rest above a hundred at 0.9c
pub fn box_wave() -> SceneDescription {
    let wave = |i: i32| {
        CustomParameters::from_pair(Vec4::new(0.0, 1.0, 0.0, 0.5), Vec4::new(i as f32 * 3.0, 0.0, 0.0, 0.0))
    };

    let mut objects = Vec::new();
    for i in -50..50 {
        objects.push(ObjectDescription::new(Vec3::new(0.0, 5.0, 0.0), Vec3::zeros()).with_custom(wave(i)));
    }
    for i in -50..50 {
        objects.push(ObjectDescription::new(Vec3::zeros(), Vec3::new(0.9, 0.0, 0.0)).with_custom(wave(i)));
    }

    scene(
        "box_wave",
        "Oscillating boxes at rest and at 0.9c",
        vec![group("boxes", BOX_MODEL, LocalTransform::Oscillation, objects)],
    )
}

/// Rolling wheels at rest and at 0.9c
pub fn wheels() -> SceneDescription {
    let spin = CustomParameters::from_first(Vec4::new(0.0, 0.0, 1.0, 0.9));

    let objects = vec![
        ObjectDescription::new(Vec3::new(-3.0, 1.0, -2.0), Vec3::zeros()),
        ObjectDescription::new(Vec3::new(3.0, 1.0, 0.0), Vec3::new(0.9, 0.0, 0.0)).with_custom(spin),
        ObjectDescription::new(Vec3::new(3.0, 1.0, -2.0), Vec3::zeros()).with_custom(spin),
    ];

    scene(
        "wheels",
        "Spinning wheels at rest and at 0.9c",
        vec![group("wheels", WHEEL_MODEL, LocalTransform::AxisRotation { scale: 1.0 }, objects)],
    )
}

/// Spheres at 0.999c, 0.9c and at rest
pub fn spheres() -> SceneDescription {
    let objects = vec![
        ObjectDescription::new(Vec3::new(0.0, 1.0, 4.0), Vec3::new(0.999, 0.0, 0.0)),
        ObjectDescription::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.9, 0.0, 0.0)),
        ObjectDescription::new(Vec3::new(0.0, 1.0, -4.0), Vec3::zeros()),
    ];

    scene(
        "spheres",
        "Spheres at 0.999c, 0.9c and at rest",
        vec![group("spheres", SPHERE_MODEL, LocalTransform::Identity, objects)],
    )
}

/// Relativistic aberration: a sky sphere around the observer moving at 0.99c
pub fn aberration() -> SceneDescription {
    let objects = vec![ObjectDescription::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 0.99))];

    scene(
        "aberration",
        "Sky sphere moving at 0.99c",
        vec![group("sky", UNIVERSE_MODEL, LocalTransform::Scaled { factor: 100.0 }, objects)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_resolves() {
        for name in SCENARIO_NAMES {
            let description = builtin(name).expect("built-in scenario");
            assert_eq!(description.name, name);
            assert!(description.object_count() > 0);
        }
        assert!(builtin("missing").is_none());
        assert!(SCENARIO_NAMES.contains(&DEFAULT_SCENARIO));
    }

    #[test]
    fn test_all_velocities_are_subluminal() {
        for name in SCENARIO_NAMES {
            let description = builtin(name).expect("built-in scenario");
            for group in &description.groups {
                for object in &group.objects {
                    assert!(object.velocity.norm() < 1.0, "{name}/{}", group.name);
                }
            }
        }
    }

    #[test]
    fn test_scenario_sizes() {
        assert_eq!(terrell_boxes().object_count(), 22);
        assert_eq!(clocks().object_count(), 8);
        assert_eq!(box_wave().object_count(), 200);
        assert_eq!(wheels().object_count(), 3);
        assert_eq!(spheres().object_count(), 3);
        assert_eq!(aberration().object_count(), 1);
    }
}
