use std::fmt;
use std::str::FromStr;

use nalgebra::Matrix4;

use crate::transform::{rot_x, rot_z};
use crate::{Error, Result};

/// Kind of motion a joint allows
///
/// The joint type decides, once and for all, which DH parameter the joint
/// variable drives: `theta` for revolute joints and `d` for prismatic joints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum JointType {
    /// Rotation about the joint's z axis; the variable is an angle in radians
    Revolute,
    /// Translation along the joint's z axis; the variable is a length in meters
    Prismatic,
}

impl JointType {
    /// Lowercase name, as written in robot description files
    pub fn as_str(self) -> &'static str {
        match self {
            JointType::Revolute => "revolute",
            JointType::Prismatic => "prismatic",
        }
    }

    /// Numeric tag used by C callers and legacy robot tables
    pub fn code(self) -> u32 {
        match self {
            JointType::Revolute => 1,
            JointType::Prismatic => 2,
        }
    }
}

impl TryFrom<u32> for JointType {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            1 => Ok(JointType::Revolute),
            2 => Ok(JointType::Prismatic),
            other => Err(Error::InvalidJointType {
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for JointType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revolute" => Ok(JointType::Revolute),
            "prismatic" => Ok(JointType::Prismatic),
            _ => Err(Error::InvalidJointType {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JointType::Revolute => write!(f, "Revolute Joint"),
            JointType::Prismatic => write!(f, "Prismatic Joint"),
        }
    }
}

/// A joint in a serial chain described by Denavit-Hartenberg parameters
///
/// The DH transform of the joint is split in two:
///
/// - the *state transform* `S(q) = Rot_z(theta)·Trans_z(d)` with the joint
///   variable `q` added to `theta` (revolute) or `d` (prismatic)
/// - the *body transform* `B = Trans_x(a)·Rot_x(alpha)`, which only depends on
///   the fixed link geometry and is computed once at construction
///
/// The full joint transform is `S(q)·B`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkDh {
    /// Type of joint connecting the link
    joint_type: JointType,

    /// Distance from z(i) to z(i+1) measured along x(i) (meters)
    a: f64,

    /// Angle from z(i) to z(i+1) measured about x(i) (radians)
    alpha: f64,

    /// Distance from x(i-1) to x(i) measured along z(i) (meters)
    d: f64,

    /// Angle from x(i-1) to x(i) measured about z(i) (radians)
    theta: f64,

    /// Cached `Trans_x(a)·Rot_x(alpha)`
    body_transform: Matrix4<f64>,
}

impl LinkDh {
    /// Create a new DH joint
    ///
    /// # Arguments
    /// * `joint_type` - Revolute or prismatic
    /// * `a` - Link length (meters)
    /// * `alpha` - Link twist (radians)
    /// * `d` - Link offset (meters)
    /// * `theta` - Joint angle (radians)
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if any parameter is NaN or infinite.
    ///
    /// # Example
    /// ```rust
    /// use armech::{JointType, LinkDh};
    ///
    /// let elbow = LinkDh::new(JointType::Revolute, 0.4, 0.0, 0.04, 0.0)?;
    /// assert_eq!(elbow.a(), 0.4);
    /// # Ok::<(), armech::Error>(())
    /// ```
    pub fn new(joint_type: JointType, a: f64, alpha: f64, d: f64, theta: f64) -> Result<Self> {
        for (name, value) in [("a", a), ("alpha", alpha), ("d", d), ("theta", theta)] {
            if !value.is_finite() {
                return Err(Error::InvalidParameter { name, value });
            }
        }

        let mut body_transform = rot_x(alpha);
        body_transform[(0, 3)] = a;

        Ok(Self {
            joint_type,
            a,
            alpha,
            d,
            theta,
            body_transform,
        })
    }

    /// Create a revolute joint
    pub fn revolute(a: f64, alpha: f64, d: f64, theta: f64) -> Result<Self> {
        Self::new(JointType::Revolute, a, alpha, d, theta)
    }

    /// Create a prismatic joint
    pub fn prismatic(a: f64, alpha: f64, d: f64, theta: f64) -> Result<Self> {
        Self::new(JointType::Prismatic, a, alpha, d, theta)
    }

    /// Get the joint type
    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }

    /// Get the link length `a`
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Get the link twist `alpha`
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Get the link offset `d`
    pub fn d(&self) -> f64 {
        self.d
    }

    /// Get the joint angle `theta`
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Fixed part of the joint transform, `Trans_x(a)·Rot_x(alpha)`
    pub fn body_transform(&self) -> &Matrix4<f64> {
        &self.body_transform
    }

    /// Variable part of the joint transform for the joint variable `q`
    ///
    /// # Errors
    /// Returns [`Error::InvalidJointState`] if `q` is not finite. A joint does
    /// not know its position in a chain, so the reported `index` is always 0;
    /// [`SerialLink`](crate::SerialLink) reports the joint's chain position.
    ///
    /// # Example
    /// ```rust
    /// use armech::LinkDh;
    ///
    /// let slider = LinkDh::prismatic(0.0, 0.0, 0.1, 0.0)?;
    /// let s = slider.state_transform(0.25)?;
    /// assert!((s[(2, 3)] - 0.35).abs() < 1e-12);
    /// # Ok::<(), armech::Error>(())
    /// ```
    pub fn state_transform(&self, q: f64) -> Result<Matrix4<f64>> {
        if !q.is_finite() {
            return Err(Error::InvalidJointState { index: 0, value: q });
        }
        Ok(self.state_transform_unchecked(q))
    }

    /// Full joint transform `S(q)·B`
    pub fn transform(&self, q: f64) -> Result<Matrix4<f64>> {
        Ok(self.state_transform(q)? * self.body_transform)
    }

    /// State transform for a variable the caller has already validated
    pub(crate) fn state_transform_unchecked(&self, q: f64) -> Matrix4<f64> {
        let (angle, offset) = match self.joint_type {
            JointType::Revolute => (self.theta + q, self.d),
            JointType::Prismatic => (self.theta, self.d + q),
        };

        let mut state = rot_z(angle);
        state[(2, 3)] = offset;
        state
    }
}

impl fmt::Display for LinkDh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (a: {}, alpha: {}, d: {}, theta: {})",
            self.joint_type, self.a, self.alpha, self.d, self.theta
        )
    }
}
