//! Robot description files
//!
//! Parses and validates YAML (or JSON) documents describing a serial-link
//! robot as a DH table, and turns them into a [`SerialLink`]. Lengths and
//! angles are converted to meters and radians here so the kinematic engine
//! never deals with units.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use nalgebra::{Matrix3, Vector3};

use crate::chain::{RotationCheck, SerialLink};
use crate::joint::{JointType, LinkDh};
use crate::Result;

/// Description-specific errors
#[derive(thiserror::Error, Debug)]
pub enum DescriptionError {
    /// Description file could not be read
    #[error("Failed to read robot description from {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not a valid description
    #[error("Invalid YAML in robot description: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Name is empty or whitespace
    #[error("Robot name cannot be empty")]
    EmptyName,

    /// DH table has no rows
    #[error("Robot '{name}' has no joints")]
    NoJoints { name: String },

    /// Orthonormal tolerance is not a positive number
    #[error("Placement tolerance must be positive, got {tolerance}")]
    InvalidTolerance { tolerance: f64 },
}

/// Unit of every length in a description (`a`, `d`, placement translation)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    #[serde(alias = "m")]
    Meters,
    #[serde(alias = "mm")]
    Millimeters,
}

impl LengthUnit {
    /// Convert a length in this unit to meters
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            LengthUnit::Meters => value,
            LengthUnit::Millimeters => value / 1000.0,
        }
    }
}

/// Unit of every angle in a description (`alpha`, `theta`)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    #[serde(alias = "rad")]
    Radians,
    #[serde(alias = "deg")]
    Degrees,
}

impl AngleUnit {
    /// Convert an angle in this unit to radians
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleUnit::Radians => value,
            AngleUnit::Degrees => value.to_radians(),
        }
    }
}

/// Units used throughout a description
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Units {
    #[serde(default)]
    pub length: LengthUnit,
    #[serde(default)]
    pub angle: AngleUnit,
}

/// Global placement of the robot base in the world
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    /// Row-major 3x3 rotation, identity when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[[f64; 3]; 3]>,
    /// Translation in description length units, origin when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f64; 3]>,
    /// Reject rotations that are not orthonormal within this tolerance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orthonormal_tolerance: Option<f64>,
}

/// One row of the DH table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JointDescription {
    /// `revolute` or `prismatic`
    #[serde(rename = "type")]
    pub joint_type: String,
    #[serde(default)]
    pub a: f64,
    #[serde(default)]
    pub alpha: f64,
    #[serde(default)]
    pub d: f64,
    #[serde(default)]
    pub theta: f64,
}

impl JointDescription {
    /// Build the joint, converting to meters and radians
    pub fn to_link(&self, units: Units) -> Result<LinkDh> {
        let joint_type: JointType = self.joint_type.parse()?;
        LinkDh::new(
            joint_type,
            units.length.to_meters(self.a),
            units.angle.to_radians(self.alpha),
            units.length.to_meters(self.d),
            units.angle.to_radians(self.theta),
        )
    }
}

/// A serial-link robot described by its DH table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RobotDescription {
    /// Robot name
    pub name: String,
    /// Units of the DH table and placement
    #[serde(default)]
    pub units: Units,
    /// Label of the body the robot is mounted on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Placement of the robot base in the world
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    /// DH table, base to tool
    pub joints: Vec<JointDescription>,
}

impl RobotDescription {
    /// Parse a description from YAML (JSON is accepted as well)
    pub fn from_yaml(content: &str) -> Result<Self> {
        let description: RobotDescription =
            serde_yaml::from_str(content).map_err(DescriptionError::InvalidYaml)?;
        Ok(description)
    }

    /// Read and parse a description file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            DescriptionError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let description = Self::from_yaml(&content)?;
        tracing::debug!(
            path = %path.display(),
            name = %description.name,
            joints = description.joints.len(),
            "loaded robot description"
        );
        Ok(description)
    }

    /// Serialize the description back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self).map_err(DescriptionError::InvalidYaml)?)
    }

    /// Check the description without building a chain
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DescriptionError::EmptyName.into());
        }
        if self.joints.is_empty() {
            return Err(DescriptionError::NoJoints {
                name: self.name.clone(),
            }
            .into());
        }
        if let Some(tolerance) = self.placement.as_ref().and_then(|p| p.orthonormal_tolerance) {
            if tolerance.is_nan() || tolerance <= 0.0 {
                return Err(DescriptionError::InvalidTolerance { tolerance }.into());
            }
        }
        for joint in &self.joints {
            joint.to_link(self.units)?;
        }
        Ok(())
    }

    /// Build the chain, placed and posed at zero joint variables
    pub fn to_chain(&self) -> Result<SerialLink> {
        self.validate()?;

        let links = self
            .joints
            .iter()
            .map(|joint| joint.to_link(self.units))
            .collect::<Result<Vec<_>>>()?;

        let mut builder = SerialLink::builder(links);
        if let Some(base) = &self.base {
            builder = builder.base(base.clone());
        }
        if let Some(placement) = &self.placement {
            if let Some(tolerance) = placement.orthonormal_tolerance {
                builder = builder.rotation_check(RotationCheck::Orthonormal { tolerance });
            }
            if let Some(rows) = placement.rotation {
                builder = builder.global_rotation(Matrix3::from_fn(|r, c| rows[r][c]));
            }
            if let Some([x, y, z]) = placement.translation {
                let length = self.units.length;
                builder = builder.global_translation(Vector3::new(
                    length.to_meters(x),
                    length.to_meters(y),
                    length.to_meters(z),
                ));
            }
        }

        let chain = builder.build()?;
        tracing::debug!(name = %self.name, dof = chain.dof(), "built serial link chain");
        Ok(chain)
    }
}
