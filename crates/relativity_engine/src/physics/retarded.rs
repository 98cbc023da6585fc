//! # Retarded Event Solver
//!
//! Finds where an object *appears* to be: the event on its worldline whose
//! light reaches the observer at the observer's current time.
//!
//! ## Light-cone intersection
//!
//! For an observer at `P` at time `t` and a worldline `P0 + V·τ`, the
//! emission time `t_e ≤ t` satisfies
//!
//! ```text
//! |P - (P0 + V·t_e)| = c·(t - t_e)
//! ```
//!
//! With `β = V/c`, `α = (P - P0)/c`, `β₂ = 1 - β·β` and `adb = t - α·β`
//! squaring gives a quadratic whose causal (earlier) root is
//!
//! ```text
//! t_e = (adb - √(adb² + β₂·(α·α - t²))) / β₂
//! ```
//!
//! The subtraction in the numerator cancels catastrophically for fast
//! objects, where `β₂` is small and `√D ≈ adb`. When `adb ≥ 0` the same root
//! is evaluated as `(t² - α·α) / (adb + √D)` instead, which only adds
//! quantities of equal sign.
//!
//! The discriminant equals `|α - β·t|² - |α × β|²`, which is non-negative for
//! every sub-luminal configuration, so a negative value is reported as a
//! defect rather than clamped.

use crate::foundation::math::{Vec3, utils};

/// Smallest accepted `1 - |V/c|²`; anything below is treated as moving at
/// or above the propagation speed
pub const MIN_BETA2: f32 = 1.0e-6;

/// Relative size of the floating-point noise band around a zero discriminant
const DISCRIMINANT_TOLERANCE: f32 = 1.0e-6;

/// Errors produced while resolving an emission event
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The object moves at or above the propagation speed
    #[error("velocity {speed} is not below the propagation speed {speed_of_light}")]
    SuperluminalVelocity {
        /// Magnitude of the object's velocity
        speed: f32,
        /// Propagation speed used for the solve
        speed_of_light: f32,
    },

    /// The light-cone quadratic had no real root
    #[error("negative discriminant {discriminant} in light-cone intersection")]
    NegativeDiscriminant {
        /// Value of the discriminant
        discriminant: f32,
    },

    /// Non-finite inputs or a non-positive propagation speed
    #[error("invalid solver input: {0}")]
    InvalidInput(&'static str),
}

/// Straight worldline of an object moving at constant velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Worldline {
    /// Position at simulation time zero
    pub origin: Vec3,
    /// Constant velocity in the observer's rest frame
    pub velocity: Vec3,
}

impl Worldline {
    /// Create a worldline from its position at time zero and its velocity
    pub fn new(origin: Vec3, velocity: Vec3) -> Self {
        Self { origin, velocity }
    }

    /// True position at simulation time `time`
    pub fn position_at(&self, time: f32) -> Vec3 {
        self.origin + self.velocity * time
    }
}

/// Emission event found on the observer's past light cone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetardedEvent {
    /// Emission time, never later than the observation time
    pub time: f32,
    /// Object position at the emission time
    pub position: Vec3,
}

/// Where an object is drawn from this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmissionEvent {
    /// Light-delayed event on the past light cone
    Retarded(RetardedEvent),
    /// Instantaneous true position, used when light speed is treated as infinite
    Instantaneous {
        /// Observation time
        time: f32,
        /// True position at the observation time
        position: Vec3,
    },
}

impl EmissionEvent {
    /// Position the object is seen at
    pub fn position(&self) -> Vec3 {
        match self {
            Self::Retarded(event) => event.position,
            Self::Instantaneous { position, .. } => *position,
        }
    }

    /// Time the observed light left the object
    pub fn time(&self) -> f32 {
        match self {
            Self::Retarded(event) => event.time,
            Self::Instantaneous { time, .. } => *time,
        }
    }

    /// Whether the light-delay solve was bypassed
    pub fn is_instantaneous(&self) -> bool {
        matches!(self, Self::Instantaneous { .. })
    }
}

/// Solve the light-cone intersection for one object
///
/// # Errors
/// - [`SolverError::InvalidInput`] for non-finite inputs or `speed_of_light <= 0`
/// - [`SolverError::SuperluminalVelocity`] when `1 - |V/c|² <= MIN_BETA2`
/// - [`SolverError::NegativeDiscriminant`] when no real root exists
pub fn solve_retarded_event(
    observer: Vec3,
    time: f32,
    worldline: &Worldline,
    speed_of_light: f32,
) -> Result<RetardedEvent, SolverError> {
    if !(speed_of_light.is_finite() && speed_of_light > 0.0) {
        return Err(SolverError::InvalidInput("propagation speed must be positive and finite"));
    }
    if !time.is_finite()
        || !utils::is_finite_vec3(&observer)
        || !utils::is_finite_vec3(&worldline.origin)
        || !utils::is_finite_vec3(&worldline.velocity)
    {
        return Err(SolverError::InvalidInput("non-finite observer or worldline"));
    }

    let beta = worldline.velocity / speed_of_light;
    let alpha = (observer - worldline.origin) / speed_of_light;

    let beta2 = 1.0 - beta.dot(&beta);
    if beta2 <= MIN_BETA2 {
        return Err(SolverError::SuperluminalVelocity {
            speed: worldline.velocity.norm(),
            speed_of_light,
        });
    }

    let alpha2 = alpha.dot(&alpha);
    let adb = time - alpha.dot(&beta);
    let constant = beta2 * (alpha2 - time * time);
    let discriminant = adb * adb + constant;

    let root = match clamp_discriminant(discriminant, adb * adb + constant.abs()) {
        Ok(clamped) => clamped.sqrt(),
        Err(e) => {
            log::error!("Light-cone solve failed: {e}, observer={observer:?}, t={time}, worldline={worldline:?}");
            return Err(e);
        }
    };

    let emission_time = if adb >= 0.0 {
        let denominator = adb + root;
        if denominator > 0.0 {
            (time * time - alpha2) / denominator
        } else {
            // adb == 0 and D == 0 only when the observer sits on the worldline at t = 0
            0.0
        }
    } else {
        (adb - root) / beta2
    };

    Ok(RetardedEvent {
        time: emission_time,
        position: worldline.position_at(emission_time),
    })
}

/// Resolve the event an object is drawn from, honoring the bypass toggle
///
/// With `bypass` set the solve is skipped and the instantaneous position
/// `P0 + V·t` is returned, independent of `speed_of_light`.
pub fn resolve_emission(
    observer: Vec3,
    time: f32,
    worldline: &Worldline,
    speed_of_light: f32,
    bypass: bool,
) -> Result<EmissionEvent, SolverError> {
    if bypass {
        return Ok(EmissionEvent::Instantaneous {
            time,
            position: worldline.position_at(time),
        });
    }

    solve_retarded_event(observer, time, worldline, speed_of_light).map(EmissionEvent::Retarded)
}

/// Round-off below zero, relative to `scale`, becomes zero; anything larger
/// has no real root
fn clamp_discriminant(discriminant: f32, scale: f32) -> Result<f32, SolverError> {
    if discriminant >= 0.0 {
        return Ok(discriminant);
    }
    if discriminant < -DISCRIMINANT_TOLERANCE * scale {
        return Err(SolverError::NegativeDiscriminant { discriminant });
    }

    log::trace!("Clamping round-off discriminant {discriminant:e} (scale {scale:e}) to zero");
    Ok(0.0)
}

/// Lorentz factor `γ = 1 / √(1 - β²)` for a velocity in units of `c`
pub fn lorentz_factor(beta: &Vec3) -> Result<f32, SolverError> {
    let beta2 = 1.0 - beta.dot(beta);
    if beta2 <= MIN_BETA2 {
        return Err(SolverError::SuperluminalVelocity { speed: beta.norm(), speed_of_light: 1.0 });
    }
    Ok(1.0 / beta2.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn light_cone_residual(observer: Vec3, time: f32, event: &RetardedEvent, c: f32) -> f32 {
        (observer - event.position).norm() - c * (time - event.time)
    }

    #[test]
    fn test_concrete_fast_object_scenario() {
        let worldline = Worldline::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.99, 0.0, 0.0));
        let event = solve_retarded_event(Vec3::zeros(), 5.0, &worldline, 1.0).expect("sub-luminal");

        assert!(event.time > 0.0 && event.time < 5.0);
        assert_relative_eq!(event.time, 16.0 / 15.92, epsilon = 1e-5);

        let distance = event.position.norm();
        assert!((distance - (5.0 - event.time)).abs() < 1e-4);
    }

    #[test]
    fn test_coincident_at_time_zero() {
        let origin = Vec3::new(1.5, -2.0, 4.0);
        let worldline = Worldline::new(origin, Vec3::new(0.5, 0.2, 0.0));
        let event = solve_retarded_event(origin, 0.0, &worldline, 1.0).expect("degenerate but valid");

        assert_eq!(event.time, 0.0);
        assert_relative_eq!(event.position, origin, epsilon = 1e-6);
    }

    #[test]
    fn test_object_at_rest_sees_classical_delay() {
        let worldline = Worldline::new(Vec3::new(0.0, 0.0, -20.0), Vec3::zeros());
        let event = solve_retarded_event(Vec3::zeros(), 30.0, &worldline, 2.0).expect("at rest");

        assert_relative_eq!(event.time, 20.0, epsilon = 1e-4);
        assert_relative_eq!(event.position, worldline.origin, epsilon = 1e-6);
    }

    #[test]
    fn test_slow_velocity_converges_to_classical_delay() {
        let observer = Vec3::new(0.0, 1.0, 0.0);
        let origin = Vec3::new(4.0, 3.0, -2.0);
        let time = 12.0;
        let c = 1.0;
        let classical = time - (observer - origin).norm() / c;

        let mut previous_error = f32::INFINITY;
        for speed in [1.0e-1_f32, 1.0e-2, 1.0e-3, 1.0e-4] {
            let worldline = Worldline::new(origin, Vec3::new(speed, 0.0, speed));
            let event = solve_retarded_event(observer, time, &worldline, c).expect("slow");
            let error = (event.time - classical).abs();
            assert!(error <= previous_error + 1e-5, "error grew: {error} > {previous_error}");
            previous_error = error;
        }
        assert!(previous_error < 1e-3);
    }

    #[test]
    fn test_light_cone_round_trip_for_random_subluminal_configurations() {
        let mut rng = StdRng::seed_from_u64(0x5eed_1905);

        for _ in 0..2000 {
            let c: f32 = rng.gen_range(0.5..4.0);
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if direction.norm() < 1e-3 {
                continue;
            }
            let speed = rng.gen_range(0.0..0.98) * c;
            let velocity = direction.normalize() * speed;
            let origin = Vec3::new(
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-30.0..30.0),
            );
            let observer = Vec3::new(
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-30.0..30.0),
            );
            let time = rng.gen_range(-20.0..60.0);

            let worldline = Worldline::new(origin, velocity);
            let event = solve_retarded_event(observer, time, &worldline, c).expect("sub-luminal");

            assert!(event.time <= time + 1e-4, "emission after observation: {} > {time}", event.time);

            let distance = (observer - event.position).norm();
            let residual = light_cone_residual(observer, time, &event, c);
            assert!(
                residual.abs() <= 1e-3 * (1.0 + distance),
                "residual {residual} for c={c} v={velocity:?} p0={origin:?} p={observer:?} t={time}"
            );
        }
    }

    #[test]
    fn test_rejects_superluminal_velocity() {
        let worldline = Worldline::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));
        let result = solve_retarded_event(Vec3::new(0.0, 0.0, 5.0), 1.0, &worldline, 1.0);
        assert!(matches!(result, Err(SolverError::SuperluminalVelocity { .. })));

        let worldline = Worldline::new(Vec3::zeros(), Vec3::new(0.0, 3.0, 0.0));
        let result = solve_retarded_event(Vec3::zeros(), 1.0, &worldline, 2.0);
        assert!(matches!(result, Err(SolverError::SuperluminalVelocity { .. })));
    }

    #[test]
    fn test_rejects_invalid_input() {
        let worldline = Worldline::new(Vec3::zeros(), Vec3::zeros());
        assert!(matches!(
            solve_retarded_event(Vec3::zeros(), 1.0, &worldline, 0.0),
            Err(SolverError::InvalidInput(_))
        ));
        assert!(matches!(
            solve_retarded_event(Vec3::new(f32::NAN, 0.0, 0.0), 1.0, &worldline, 1.0),
            Err(SolverError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_bypass_reports_true_position_for_any_light_speed() {
        let worldline = Worldline::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.9, 0.0, -0.3));
        let expected = worldline.position_at(7.5);

        for c in [0.5, 1.0, 1000.0, f32::INFINITY] {
            let event = resolve_emission(Vec3::zeros(), 7.5, &worldline, c, true).expect("bypass never fails");
            assert!(event.is_instantaneous());
            assert_eq!(event.position(), expected);
            assert_eq!(event.time(), 7.5);
        }
    }

    #[test]
    fn test_resolve_without_bypass_matches_solver() {
        let worldline = Worldline::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.6, 0.0, 0.0));
        let solved = solve_retarded_event(Vec3::zeros(), 3.0, &worldline, 1.0).expect("solve");
        let resolved = resolve_emission(Vec3::zeros(), 3.0, &worldline, 1.0, false).expect("resolve");

        assert_eq!(resolved, EmissionEvent::Retarded(solved));
        assert!(!resolved.is_instantaneous());
    }

    #[test]
    fn test_discriminant_clamp_bounds() {
        assert_eq!(clamp_discriminant(4.0, 1.0).expect("positive"), 4.0);
        assert_eq!(clamp_discriminant(0.0, 0.0).expect("zero"), 0.0);
        assert_eq!(clamp_discriminant(-1.0e-8, 1.0).expect("round-off"), 0.0);
        assert_eq!(clamp_discriminant(-1.0e-3, 1.0e4).expect("round-off at scale"), 0.0);

        assert!(matches!(
            clamp_discriminant(-1.0e-3, 1.0),
            Err(SolverError::NegativeDiscriminant { .. })
        ));
        assert!(clamp_discriminant(-1.0e-12, 0.0).is_err());
    }

    #[test]
    fn test_lorentz_factor() {
        assert_relative_eq!(lorentz_factor(&Vec3::new(0.6, 0.0, 0.0)).expect("sub-luminal"), 1.25, epsilon = 1e-6);
        assert_relative_eq!(lorentz_factor(&Vec3::zeros()).expect("at rest"), 1.0);
        assert!(lorentz_factor(&Vec3::new(0.0, 1.0, 0.0)).is_err());
    }
}
