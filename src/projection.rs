//! Fisheye reprojection of an equirectangular frame.
//!
//! An output pixel is lifted onto the unit sphere through the fisheye
//! model, rotated, and projected back into the source disk. Angles are
//! kept in `f32` so results line up with the texture-space renderer.

use std::f32::consts::PI;

use nalgebra::{vector, SVector};

pub type Vec2f = SVector<f32, 2>;
pub type Vec3f = SVector<f32, 3>;

const HALF_PI: f32 = PI / 2.0;
const TAU: f32 = 2.0 * PI;

/// Rotate `p` about the X axis.
pub fn rotate_x(p: Vec3f, theta: f32) -> Vec3f {
    let (sin, cos) = (theta.sin(), theta.cos());
    vector![p.x, p.y * cos + p.z * sin, -p.y * sin + p.z * cos]
}

/// Rotate `p` about the Y axis.
pub fn rotate_y(p: Vec3f, theta: f32) -> Vec3f {
    let (sin, cos) = (theta.sin(), theta.cos());
    vector![p.x * cos - p.z * sin, p.y, p.x * sin + p.z * cos]
}

/// Rotate `p` about the Z axis.
///
/// The renderer applies roll as a longitude offset instead; the two agree
/// in that `rotate_z(ray(lat, lon), -theta) == ray(lat, lon + theta)`.
pub fn rotate_z(p: Vec3f, theta: f32) -> Vec3f {
    let (sin, cos) = (theta.sin(), theta.cos());
    vector![p.x * cos + p.y * sin, -p.x * sin + p.y * cos, p.z]
}

/// Map a control value in `[0, 1]` onto `[-1, 1]`.
pub fn centered(value: f32) -> f32 {
    value * 2.0 - 1.0
}

/// Rotation angle in radians for a control value in `[0, 1]`.
///
/// The control is centered first and then scaled by a full turn, so the
/// whole control range spans `[-2π, 2π]`: two complete rotations.
pub fn control_to_angle(value: f32) -> f32 {
    centered(value) * TAU
}

/// Camera rotation as centered inputs in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationParameters {
    /// Rotation about Z, applied as a longitude offset.
    pub roll: f32,
    /// Rotation about X.
    pub pitch: f32,
    /// Rotation about Y.
    pub yaw: f32,
}

impl RotationParameters {
    pub fn from_controls(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            roll: centered(roll),
            pitch: centered(pitch),
            yaw: centered(yaw),
        }
    }

    pub fn roll_angle(&self) -> f32 {
        self.roll * TAU
    }

    pub fn pitch_angle(&self) -> f32 {
        self.pitch * TAU
    }

    pub fn yaw_angle(&self) -> f32 {
        self.yaw * TAU
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalAngles {
    pub latitude: f32,
    pub longitude: f32,
}

impl SphericalAngles {
    /// Lift a fisheye position in `[-1, 1]²` onto the sphere.
    ///
    /// Returns `None` outside the unit disk. On the `x == 0` seam the
    /// non-negative branch is taken, so `(0, y > 0)` lands on `π/2`.
    pub fn from_fisheye(pos: Vec2f) -> Option<Self> {
        let r = pos.norm();
        if 1.0 < r {
            return None;
        }
        let latitude = (1.0 - r) * HALF_PI;
        let longitude = if r == 0.0 {
            0.0
        } else if pos.x < 0.0 {
            PI - (pos.y / r).asin()
        } else {
            (pos.y / r).asin()
        };
        Some(Self {
            latitude,
            longitude,
        })
    }

    /// Angles of a (rotated) ray.
    ///
    /// Neither `asin` nor `acos` is clamped; near the poles the longitude
    /// comes out as NaN.
    pub fn from_ray(p: Vec3f) -> Self {
        let latitude = p.z.asin();
        let longitude = -(p.x / latitude.cos()).acos();
        Self {
            latitude,
            longitude,
        }
    }

    pub fn to_ray(self) -> Vec3f {
        let (lat, lon) = (self.latitude, self.longitude);
        vector![lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }
}

/// Intermediate values of one pixel mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trace {
    /// Viewing direction of the output pixel, after roll.
    pub view: SphericalAngles,
    /// Ray after pitch and yaw.
    pub ray: Vec3f,
    /// Angles of `ray` in the source frame.
    pub source: SphericalAngles,
    /// Sampling coordinate in `[0, 1]²`, `None` outside the source disk.
    pub coord: Option<Vec2f>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Projection {
    rotation: RotationParameters,
}

impl Projection {
    pub fn new(rotation: RotationParameters) -> Self {
        Projection { rotation }
    }

    pub fn rotation(&self) -> RotationParameters {
        self.rotation
    }

    /// Source coordinate for the output position `pos`, or `None` when the
    /// pixel is not covered.
    pub fn proj(&self, pos: Vec2f) -> Option<Vec2f> {
        self.trace(pos).and_then(|t| t.coord)
    }

    /// Like [`Projection::proj`] but keeps every intermediate step. `None`
    /// means `pos` is outside the output disk.
    pub fn trace(&self, pos: Vec2f) -> Option<Trace> {
        let view = self.image_to_sphere(pos)?;
        let ray = self.rotate(view.to_ray());
        let source = SphericalAngles::from_ray(ray);
        Some(Trace {
            view,
            ray,
            source,
            coord: sphere_to_image(ray, source.latitude),
        })
    }

    fn image_to_sphere(&self, pos: Vec2f) -> Option<SphericalAngles> {
        let mut angles = SphericalAngles::from_fisheye(pos)?;
        // Wrapped once only: anything below -2π stays negative.
        angles.longitude += self.rotation.roll_angle();
        if angles.longitude < 0.0 {
            angles.longitude += TAU;
        }
        Some(angles)
    }

    fn rotate(&self, p: Vec3f) -> Vec3f {
        let p = rotate_x(p, self.rotation.pitch_angle());
        rotate_y(p, self.rotation.yaw_angle())
    }
}

fn sphere_to_image(p: Vec3f, latitude: f32) -> Option<Vec2f> {
    let r = 1.0 - latitude / HALF_PI;
    if r > 1.0 {
        return None;
    }
    let mut phi = p.y.atan2(p.x);
    if phi < 0.0 {
        phi += TAU;
    }
    let u = r * phi.cos();
    let v = r * phi.sin();
    Some(vector![(u + 1.0) / 2.0, (v + 1.0) / 2.0])
}
