//! Demonstration robots

use std::f64::consts::FRAC_PI_2;

use crate::{LinkDh, Result, SerialLink};

/// A simple three degree of freedom arm for testing and demonstrations
///
/// DH table (meters, radians), all joints revolute:
///
/// | i | a    | alpha | d     | theta |
/// |---|------|-------|-------|-------|
/// | 0 | 0    | pi/2  | 0     | 0     |
/// | 1 | 0.4  | 0     | 0.04  | 0     |
/// | 2 | 0.35 | 0     | -0.08 | 0     |
pub fn simple_3dof() -> Result<SerialLink> {
    SerialLink::builder(vec![
        LinkDh::revolute(0.0, FRAC_PI_2, 0.0, 0.0)?,
        LinkDh::revolute(0.4, 0.0, 0.04, 0.0)?,
        LinkDh::revolute(0.35, 0.0, -0.08, 0.0)?,
    ])
    .base("simple-3dof-base")
    .build()
}

/// Robot description of [`simple_3dof`], in millimeters and degrees
#[cfg(feature = "serde")]
pub fn simple_3dof_description() -> crate::RobotDescription {
    use crate::description::{JointDescription, Units};
    use crate::{AngleUnit, JointType, LengthUnit};

    let joint = |a: f64, alpha: f64, d: f64| JointDescription {
        joint_type: JointType::Revolute.as_str().to_string(),
        a,
        alpha,
        d,
        theta: 0.0,
    };

    crate::RobotDescription {
        name: "simple-3dof".to_string(),
        units: Units {
            length: LengthUnit::Millimeters,
            angle: AngleUnit::Degrees,
        },
        base: Some("simple-3dof-base".to_string()),
        placement: None,
        joints: vec![
            joint(0.0, 90.0, 0.0),
            joint(400.0, 0.0, 40.0),
            joint(350.0, 0.0, -80.0),
        ],
    }
}
