//! # Armech
//!
//! A pure Rust library for modelling serial-link robot arms described by
//! Denavit-Hartenberg (DH) parameters.
//!
//! ## Features
//!
//! - DH joints ([`LinkDh`]) for revolute and prismatic joint types
//! - Serial kinematic chains ([`SerialLink`]) with cached per-link world poses
//! - Pure "what if" forward kinematics probes that never touch the live pose
//! - Robot descriptions loaded from YAML (behind the `serde` feature)
//!
//! All lengths are meters and all angles radians.
//!
//! ## Example
//!
//! ```rust
//! use armech::{Frame, LinkDh, SerialLink};
//! use std::f64::consts::FRAC_PI_2;
//!
//! let links = vec![
//!     LinkDh::revolute(0.0, FRAC_PI_2, 0.0, 0.0)?,
//!     LinkDh::revolute(0.4, 0.0, 0.04, 0.0)?,
//!     LinkDh::revolute(0.35, 0.0, -0.08, 0.0)?,
//! ];
//! let mut arm = SerialLink::new(links)?;
//! arm.move_joints(&[0.1, -0.2, 0.3])?;
//!
//! let probe = arm.tool_transform(&[0.0, 0.0, 0.0], Frame::Local)?;
//! assert!((probe[(0, 3)] - 0.75).abs() < 1e-12);
//! # Ok::<(), armech::Error>(())
//! ```

pub mod chain;
#[cfg(feature = "serde")]
pub mod description;
pub mod joint;
pub mod presets;
pub mod transform;

pub use chain::{Frame, RotationCheck, SerialLink, SerialLinkBuilder, WorldPose};
#[cfg(feature = "serde")]
pub use description::{AngleUnit, LengthUnit, RobotDescription};
pub use joint::{JointType, LinkDh};
pub use nalgebra::{Matrix3, Matrix4, Vector3};

/// Common result type for this library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for kinematic chain operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Joint type tag outside of {revolute, prismatic}
    #[error("Invalid joint type '{value}', expected revolute or prismatic")]
    InvalidJointType { value: String },

    /// Non-finite DH parameter
    #[error("DH parameter '{name}' must be finite, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// State vector length differs from the joint count
    #[error("Expected {expected} joint variables, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Non-finite joint variable
    ///
    /// `index` is the joint's position in the chain, or 0 when the variable
    /// was handed to a standalone [`LinkDh`].
    #[error("Joint variable {index} must be finite, got {value}")]
    InvalidJointState { index: usize, value: f64 },

    /// A chain needs at least one joint
    #[error("A serial link chain needs at least one joint")]
    EmptyChain,

    /// Global placement rejected
    #[error("Invalid global placement: {message}")]
    InvalidPlacement { message: String },

    /// Robot description could not be loaded
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Description(#[from] description::DescriptionError),
}
