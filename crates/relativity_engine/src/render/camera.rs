//! # Observer Pose
//!
//! The observer is the camera *and* the reference frame every retarded event
//! is solved in, so its position feeds the solver directly while its
//! orientation only feeds the view matrix.
//!
//! ## Coordinate conventions
//! - Right-handed, Y-up world space; angles are stored in degrees
//! - The view matrix is rotation-only (eye at the origin); callers make world
//!   positions observer-relative (`p - observer`) before projecting them
//! - Projection follows the engine's depth `[0, 1]` convention with the Y/Z
//!   flip applied separately: `P × X × V`
//!
//! ## Caching
//! Every mutator marks the pose dirty. The matrix getters recompute all three
//! matrices on the first read after a mutation and serve the cached values
//! until the next one, so a getter never returns a stale matrix.

use std::cell::Cell;

use crate::config::ObserverSettings;
use crate::foundation::math::{Vec3, Mat4, Mat4Ext, utils};

/// Pitch limit in degrees, short of the poles to keep the basis well defined
pub const PITCH_LIMIT: f32 = 89.0;

/// Field-of-view bounds in degrees
pub const FOV_MIN: f32 = 1.0;
/// Field-of-view bounds in degrees
pub const FOV_MAX: f32 = 90.0;

/// Field of view at which mouse sensitivity is unscaled
const REFERENCE_FOV: f32 = 45.0;

/// Wrap an angle in degrees into `[0, 360)`
fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Direction of a movement request relative to the current orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementDirection {
    /// Along the viewing direction
    Forward,
    /// Against the viewing direction
    Backward,
    /// Against the right vector
    Left,
    /// Along the right vector
    Right,
}

#[derive(Debug, Clone, Copy)]
struct CachedMatrices {
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
}

/// Observer position, orientation and projection parameters
#[derive(Debug, Clone)]
pub struct ObserverPose {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    walk_speed: f32,
    run_speed: f32,
    sensitivity: f32,
    running: bool,

    dirty: Cell<bool>,
    cache: Cell<CachedMatrices>,
}

impl ObserverPose {
    /// Create a pose from configuration
    pub fn from_settings(settings: &ObserverSettings, aspect: f32) -> Self {
        let identity = Mat4::identity();
        Self {
            position: settings.position,
            yaw: wrap_degrees(settings.yaw),
            pitch: settings.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov: settings.fov.clamp(FOV_MIN, FOV_MAX),
            aspect,
            near: settings.near,
            far: settings.far,
            walk_speed: settings.walk_speed,
            run_speed: settings.run_speed,
            sensitivity: settings.sensitivity,
            running: false,
            dirty: Cell::new(true),
            cache: Cell::new(CachedMatrices {
                view: identity,
                projection: identity,
                view_projection: identity,
            }),
        }
    }

    /// Builder-style start position
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self.mark_dirty();
        self
    }

    /// Observer position in the rest frame
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Yaw in degrees, within `[0, 360)`
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees, within `[-89, 89]`
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees, within `[1, 90]`
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Viewport aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Whether the running modifier is active
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Unit viewing direction `w`
    pub fn direction(&self) -> Vec3 {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    /// Unit right vector `u = normalize(w × up)`
    pub fn right(&self) -> Vec3 {
        self.direction().cross(&Vec3::y()).normalize()
    }

    /// Unit camera up vector `v = normalize(u × w)`
    pub fn up(&self) -> Vec3 {
        self.right().cross(&self.direction()).normalize()
    }

    /// Move along the current orientation by `speed × delta_time`
    pub fn move_in(&mut self, direction: MovementDirection, delta_time: f32) {
        let speed = if self.running { self.run_speed } else { self.walk_speed };
        let distance = speed * delta_time;

        let offset = match direction {
            MovementDirection::Forward => self.direction() * distance,
            MovementDirection::Backward => -self.direction() * distance,
            MovementDirection::Right => self.right() * distance,
            MovementDirection::Left => -self.right() * distance,
        };

        self.position += offset;
        self.mark_dirty();
        log::trace!("Observer moved {direction:?} to {:?}", self.position);
    }

    /// Rotate by a pointer offset, scaled so narrow fields of view turn slower
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let scale = self.sensitivity * self.fov / REFERENCE_FOV;

        self.yaw = wrap_degrees(self.yaw + delta_x * scale);
        self.pitch = (self.pitch + delta_y * scale).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.mark_dirty();
    }

    /// Narrow (positive scroll) or widen the field of view
    pub fn zoom(&mut self, scroll: f32) {
        self.fov = (self.fov - scroll).clamp(FOV_MIN, FOV_MAX);
        self.mark_dirty();
        log::trace!("Observer field of view now {:.1}°", self.fov);
    }

    /// Update the viewport aspect ratio
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Observer aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
        self.mark_dirty();
    }

    /// Select the running or walking movement speed
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
        self.mark_dirty();
    }

    /// Rotation-only world-to-view matrix
    pub fn view(&self) -> Mat4 {
        self.matrices().view
    }

    /// Perspective projection matrix
    pub fn projection(&self) -> Mat4 {
        self.matrices().projection
    }

    /// Combined `P × X × V`
    pub fn view_projection(&self) -> Mat4 {
        self.matrices().view_projection
    }

    /// Whether the next matrix read recomputes
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    fn matrices(&self) -> CachedMatrices {
        if self.dirty.get() {
            let view = Mat4::look_at(Vec3::zeros(), self.direction(), self.up());
            let projection = Mat4::perspective(utils::deg_to_rad(self.fov), self.aspect, self.near, self.far);
            let view_projection = projection * Mat4::clip_coordinate_transform() * view;

            self.cache.set(CachedMatrices { view, projection, view_projection });
            self.dirty.set(false);
        }
        self.cache.get()
    }
}

impl Default for ObserverPose {
    fn default() -> Self {
        Self::from_settings(&ObserverSettings::default(), 16.0 / 9.0)
    }
}
