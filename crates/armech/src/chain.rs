//! Serial kinematic chains
//!
//! A [`SerialLink`] is an ordered list of [`LinkDh`] joints from the base to
//! the tool, placed in the world by a global homogeneous transform `G`. The
//! chain owns its joint-state vector and a cache of world poses, one per
//! joint plus the tool pose, that is rebuilt wholesale every time the chain
//! is re-posed.
//!
//! Forward kinematics is a base-to-tip fold:
//!
//! ```text
//! T_0     = G
//! pose_k  = T_k · S_k(q_k)
//! T_k+1   = pose_k · B_k
//! tool    = T_n
//! ```

use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::joint::LinkDh;
use crate::transform::{homogeneous, is_orthonormal, rotation_part, translation_part};
use crate::{Error, Result};

/// Frame a forward kinematics probe is expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Frame {
    /// Relative to the chain's base frame (the fold starts from identity)
    #[default]
    Local,
    /// Relative to the world (the fold starts from the global transform)
    World,
}

/// Validation applied to the rotation block of the global placement
///
/// The check runs before any state is touched and never alters the
/// transform algebra; a rejected placement leaves the chain as it was.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RotationCheck {
    /// Accept any finite 3x3 block as given
    #[default]
    Unchecked,
    /// Require `RᵀR ≈ I` and a positive determinant
    Orthonormal { tolerance: f64 },
}

impl RotationCheck {
    fn validate(&self, rotation: &Matrix3<f64>) -> Result<()> {
        if rotation.iter().any(|value| !value.is_finite()) {
            return Err(Error::InvalidPlacement {
                message: "rotation contains non-finite values".to_string(),
            });
        }

        match *self {
            RotationCheck::Unchecked => Ok(()),
            RotationCheck::Orthonormal { tolerance } => {
                if is_orthonormal(rotation, tolerance) {
                    Ok(())
                } else {
                    Err(Error::InvalidPlacement {
                        message: format!("rotation is not orthonormal within {tolerance}"),
                    })
                }
            }
        }
    }
}

/// World placement of a single joint, split for renderers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldPose {
    /// Rotation from the joint frame to the world
    pub rotation: Matrix3<f64>,
    /// Origin of the joint frame in world coordinates
    pub translation: Vector3<f64>,
}

/// A serial-link robot: an ordered chain of DH joints placed in the world
#[derive(Clone, Debug)]
pub struct SerialLink {
    /// Joints from base to tool
    links: Vec<LinkDh>,

    /// Label of the body the chain is mounted on, owned by the renderer
    base: Option<String>,

    /// Rotation block of the global placement
    global_rotation: Matrix3<f64>,

    /// Translation of the global placement
    global_translation: Vector3<f64>,

    /// Homogeneous form of the global placement
    global_transform: Matrix4<f64>,

    /// Validation applied whenever the global rotation changes
    rotation_check: RotationCheck,

    /// Current joint variables, one per joint
    state: Vec<f64>,

    /// World pose of every joint for the current state
    link_poses: Vec<Matrix4<f64>>,

    /// World pose of the tool for the current state
    tool_pose: Matrix4<f64>,
}

/// Result of one forward kinematics fold
struct Fold {
    link_poses: Vec<Matrix4<f64>>,
    tool: Matrix4<f64>,
}

impl SerialLink {
    /// Create a chain placed at the world origin with all joint variables at zero
    ///
    /// # Errors
    /// Returns [`Error::EmptyChain`] if `links` is empty.
    pub fn new(links: Vec<LinkDh>) -> Result<Self> {
        Self::builder(links).build()
    }

    /// Start building a chain with an optional base and global placement
    ///
    /// # Example
    /// ```rust
    /// use armech::{LinkDh, SerialLink, Vector3};
    ///
    /// let arm = SerialLink::builder(vec![LinkDh::revolute(0.5, 0.0, 0.0, 0.0)?])
    ///     .base("pedestal")
    ///     .global_translation(Vector3::new(0.0, 0.0, 1.0))
    ///     .build()?;
    ///
    /// assert_eq!(arm.base(), Some("pedestal"));
    /// assert_eq!(arm.tool_pose()[(2, 3)], 1.0);
    /// # Ok::<(), armech::Error>(())
    /// ```
    pub fn builder(links: Vec<LinkDh>) -> SerialLinkBuilder {
        SerialLinkBuilder {
            links,
            base: None,
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
            rotation_check: RotationCheck::default(),
        }
    }

    /// Number of joints (degrees of freedom)
    pub fn dof(&self) -> usize {
        self.links.len()
    }

    /// Joints in base-to-tool order
    pub fn links(&self) -> &[LinkDh] {
        &self.links
    }

    /// Joint at position `index`
    pub fn link(&self, index: usize) -> Option<&LinkDh> {
        self.links.get(index)
    }

    /// Label of the body the chain is mounted on
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Current joint variables
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// Rotation check applied to global placements
    pub fn rotation_check(&self) -> RotationCheck {
        self.rotation_check
    }

    /// Homogeneous form of the global placement
    pub fn global_transform(&self) -> &Matrix4<f64> {
        &self.global_transform
    }

    /// Rotation block of the global placement
    pub fn global_rotation(&self) -> &Matrix3<f64> {
        &self.global_rotation
    }

    /// Translation of the global placement
    pub fn global_translation(&self) -> &Vector3<f64> {
        &self.global_translation
    }

    /// World pose of joint `index`
    pub fn link_pose(&self, index: usize) -> Option<&Matrix4<f64>> {
        self.link_poses.get(index)
    }

    /// World poses of all joints, indexed by joint position
    pub fn link_poses(&self) -> &[Matrix4<f64>] {
        &self.link_poses
    }

    /// World pose of the tool
    pub fn tool_pose(&self) -> &Matrix4<f64> {
        &self.tool_pose
    }

    /// World rotation and translation of joint `index`, read from the pose cache
    pub fn link_world_pose(&self, index: usize) -> Option<WorldPose> {
        self.link_poses.get(index).map(|pose| WorldPose {
            rotation: rotation_part(pose),
            translation: translation_part(pose),
        })
    }

    /// Replace the rotation and/or translation of the global placement
    ///
    /// Omitted parts keep their current value. The chain is re-posed with the
    /// current joint variables.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPlacement`] if the new placement is not finite
    /// or fails the configured [`RotationCheck`]. The chain is left unchanged.
    pub fn set_global_transform(
        &mut self,
        rotation: Option<Matrix3<f64>>,
        translation: Option<Vector3<f64>>,
    ) -> Result<()> {
        let rotation = rotation.unwrap_or(self.global_rotation);
        let translation = translation.unwrap_or(self.global_translation);

        self.rotation_check.validate(&rotation)?;
        check_translation(&translation)?;

        let global = homogeneous(&rotation, &translation);
        let fold = self.fold(global, &self.state);

        self.global_rotation = rotation;
        self.global_translation = translation;
        self.global_transform = global;
        self.commit(fold);
        Ok(())
    }

    /// Set the joint variables and re-pose the whole chain
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if `q.len() != self.dof()` and
    /// [`Error::InvalidJointState`] if any variable is not finite. Neither
    /// the state nor the cached poses change on error.
    ///
    /// # Example
    /// ```rust
    /// use armech::{Error, presets};
    ///
    /// let mut arm = presets::simple_3dof()?;
    /// arm.move_joints(&[0.5, 0.0, -0.5])?;
    /// assert_eq!(arm.state(), &[0.5, 0.0, -0.5]);
    ///
    /// let err = arm.move_joints(&[0.0, 0.0]).unwrap_err();
    /// assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2 }));
    /// assert_eq!(arm.state(), &[0.5, 0.0, -0.5]);
    /// # Ok::<(), armech::Error>(())
    /// ```
    pub fn move_joints(&mut self, q: &[f64]) -> Result<()> {
        self.check_state(q)?;

        let fold = self.fold(self.global_transform, q);
        self.state.clear();
        self.state.extend_from_slice(q);
        self.commit(fold);
        Ok(())
    }

    /// Tool pose for the joint variables `q`, without touching the chain
    ///
    /// # Errors
    /// Same conditions as [`SerialLink::move_joints`].
    pub fn tool_transform(&self, q: &[f64], frame: Frame) -> Result<Matrix4<f64>> {
        self.check_state(q)?;
        Ok(self.fold(self.start(frame), q).tool)
    }

    /// Per-joint poses for the joint variables `q`, without touching the chain
    ///
    /// # Errors
    /// Same conditions as [`SerialLink::move_joints`].
    pub fn link_transforms(&self, q: &[f64], frame: Frame) -> Result<Vec<Matrix4<f64>>> {
        self.check_state(q)?;
        Ok(self.fold(self.start(frame), q).link_poses)
    }

    fn start(&self, frame: Frame) -> Matrix4<f64> {
        match frame {
            Frame::Local => Matrix4::identity(),
            Frame::World => self.global_transform,
        }
    }

    fn check_state(&self, q: &[f64]) -> Result<()> {
        if q.len() != self.links.len() {
            return Err(Error::DimensionMismatch {
                expected: self.links.len(),
                actual: q.len(),
            });
        }

        if let Some((index, &value)) = q.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidJointState { index, value });
        }

        Ok(())
    }

    /// Base-to-tip fold over validated joint variables
    fn fold(&self, start: Matrix4<f64>, q: &[f64]) -> Fold {
        let mut accumulated = start;
        let mut link_poses = Vec::with_capacity(self.links.len());

        for (link, &variable) in self.links.iter().zip(q) {
            let pose = accumulated * link.state_transform_unchecked(variable);
            accumulated = pose * link.body_transform();
            link_poses.push(pose);
        }

        Fold {
            link_poses,
            tool: accumulated,
        }
    }

    fn commit(&mut self, fold: Fold) {
        self.link_poses = fold.link_poses;
        self.tool_pose = fold.tool;
    }
}

fn check_translation(translation: &Vector3<f64>) -> Result<()> {
    if translation.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(Error::InvalidPlacement {
            message: "translation contains non-finite values".to_string(),
        })
    }
}

/// Builder for [`SerialLink`]
#[derive(Clone, Debug)]
pub struct SerialLinkBuilder {
    links: Vec<LinkDh>,
    base: Option<String>,
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
    rotation_check: RotationCheck,
}

impl SerialLinkBuilder {
    /// Label of the body the chain is mounted on
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Rotation block of the global placement (defaults to identity)
    pub fn global_rotation(mut self, rotation: Matrix3<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Translation of the global placement (defaults to the origin)
    pub fn global_translation(mut self, translation: Vector3<f64>) -> Self {
        self.translation = translation;
        self
    }

    /// Validation applied to this and every later global rotation
    pub fn rotation_check(mut self, check: RotationCheck) -> Self {
        self.rotation_check = check;
        self
    }

    /// Build the chain and pose it with all joint variables at zero
    ///
    /// # Errors
    /// Returns [`Error::EmptyChain`] for an empty joint list and
    /// [`Error::InvalidPlacement`] for a rejected global placement.
    pub fn build(self) -> Result<SerialLink> {
        if self.links.is_empty() {
            return Err(Error::EmptyChain);
        }
        self.rotation_check.validate(&self.rotation)?;
        check_translation(&self.translation)?;

        let n = self.links.len();
        let global_transform = homogeneous(&self.rotation, &self.translation);
        let mut chain = SerialLink {
            links: self.links,
            base: self.base,
            global_rotation: self.rotation,
            global_translation: self.translation,
            global_transform,
            rotation_check: self.rotation_check,
            state: vec![0.0; n],
            link_poses: Vec::with_capacity(n),
            tool_pose: global_transform,
        };

        let fold = chain.fold(global_transform, &chain.state);
        chain.commit(fold);
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointType;
    use crate::transform::{rot_x, rot_z};
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};
    use test_log::test;

    fn simple_arm() -> Result<SerialLink> {
        SerialLink::new(vec![
            LinkDh::revolute(0.0, FRAC_PI_2, 0.0, 0.0)?,
            LinkDh::revolute(0.4, 0.0, 0.04, 0.0)?,
            LinkDh::revolute(0.35, 0.0, -0.08, 0.0)?,
        ])
    }

    #[test]
    fn test_empty_chain_rejected() {
        assert!(matches!(SerialLink::new(Vec::new()), Err(Error::EmptyChain)));
    }

    #[test]
    fn test_construction_poses_zero_state() -> Result<()> {
        let arm = simple_arm()?;
        assert_eq!(arm.dof(), 3);
        assert_eq!(arm.state(), &[0.0, 0.0, 0.0]);
        assert_eq!(arm.link_poses().len(), 3);
        assert_eq!(arm.link_pose(0), Some(&Matrix4::identity()));
        assert!(arm.link_pose(3).is_none());
        assert_eq!(arm.base(), None);
        Ok(())
    }

    #[test]
    fn test_canonical_tool_pose() -> Result<()> {
        let arm = simple_arm()?;
        let expected = Matrix4::new(
            1.0, 0.0, 0.0, 0.75, //
            0.0, 0.0, -1.0, 0.04, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        );
        assert_relative_eq!(*arm.tool_pose(), expected, epsilon = 1e-4);
        Ok(())
    }

    #[test]
    fn test_link_poses_follow_fold() -> Result<()> {
        let mut arm = simple_arm()?;
        let q = [0.3, -0.7, 1.1];
        arm.move_joints(&q)?;

        let mut accumulated: Matrix4<f64> = Matrix4::identity();
        for (k, link) in arm.links().iter().enumerate() {
            let pose = accumulated * link.state_transform(q[k])?;
            assert_relative_eq!(arm.link_pose(k).copied().unwrap(), pose, epsilon = 1e-12);
            accumulated = pose * link.body_transform();
        }
        assert_relative_eq!(*arm.tool_pose(), accumulated, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_single_joint_chain() -> Result<()> {
        let mut arm = SerialLink::new(vec![LinkDh::revolute(1.0, 0.0, 0.0, 0.0)?])?;
        arm.move_joints(&[FRAC_PI_2])?;

        assert_relative_eq!(arm.tool_pose()[(0, 3)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(arm.tool_pose()[(1, 3)], 1.0, epsilon = 1e-12);
        assert_eq!(arm.link_pose(0).copied(), Some(rot_z(FRAC_PI_2)));
        Ok(())
    }

    #[test]
    fn test_no_wrap_around() -> Result<()> {
        let mut arm = SerialLink::new(vec![LinkDh::revolute(1.0, 0.0, 0.0, 0.0)?])?;
        arm.move_joints(&[5.0 * PI])?;
        assert_eq!(arm.state(), &[5.0 * PI]);
        assert_relative_eq!(arm.tool_pose()[(0, 3)], -1.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_move_joints_dimension_mismatch_is_atomic() -> Result<()> {
        let mut arm = simple_arm()?;
        arm.move_joints(&[0.1, 0.2, 0.3])?;
        let poses = arm.link_poses().to_vec();
        let tool = *arm.tool_pose();

        let err = arm.move_joints(&[0.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 3,
                actual: 4
            }
        ));
        assert!(arm.move_joints(&[]).is_err());

        assert_eq!(arm.state(), &[0.1, 0.2, 0.3]);
        assert_eq!(arm.link_poses(), poses.as_slice());
        assert_eq!(*arm.tool_pose(), tool);
        Ok(())
    }

    #[test]
    fn test_move_joints_rejects_non_finite() -> Result<()> {
        let mut arm = simple_arm()?;
        let tool = *arm.tool_pose();

        let err = arm.move_joints(&[0.0, f64::NAN, 0.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidJointState { index: 1, .. }));
        assert_eq!(arm.state(), &[0.0, 0.0, 0.0]);
        assert_eq!(*arm.tool_pose(), tool);
        Ok(())
    }

    #[test]
    fn test_tool_transform_is_pure() -> Result<()> {
        let mut arm = simple_arm()?;
        arm.move_joints(&[0.2, 0.4, 0.6])?;
        let poses = arm.link_poses().to_vec();
        let tool = *arm.tool_pose();

        for _ in 0..3 {
            arm.tool_transform(&[1.0, -1.0, 0.5], Frame::Local)?;
            arm.tool_transform(&[1.0, -1.0, 0.5], Frame::World)?;
            arm.link_transforms(&[1.0, -1.0, 0.5], Frame::World)?;
        }

        assert_eq!(arm.state(), &[0.2, 0.4, 0.6]);
        assert_eq!(arm.link_poses(), poses.as_slice());
        assert_eq!(*arm.tool_pose(), tool);
        assert!(matches!(
            arm.tool_transform(&[0.0], Frame::Local),
            Err(Error::DimensionMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_tool_transform_matches_live_pose() -> Result<()> {
        let mut arm = simple_arm()?;
        arm.set_global_transform(None, Some(Vector3::new(1.0, 2.0, 3.0)))?;
        let q = [0.5, 0.25, -0.125];
        arm.move_joints(&q)?;

        assert_relative_eq!(
            arm.tool_transform(&q, Frame::World)?,
            *arm.tool_pose(),
            epsilon = 1e-12
        );
        let links = arm.link_transforms(&q, Frame::World)?;
        assert_eq!(links.as_slice(), arm.link_poses());
        Ok(())
    }

    #[test]
    fn test_set_global_transform_keeps_state() -> Result<()> {
        let mut arm = simple_arm()?;
        let q = [0.3, 0.2, 0.1];
        arm.move_joints(&q)?;

        let rotation = rotation_part(&rot_z(FRAC_PI_2));
        let translation = Vector3::new(0.5, 0.0, 1.0);
        arm.set_global_transform(Some(rotation), Some(translation))?;

        assert_eq!(arm.state(), &q);
        let global = homogeneous(&rotation, &translation);
        assert_eq!(*arm.global_transform(), global);
        assert_relative_eq!(
            *arm.tool_pose(),
            global * arm.tool_transform(&q, Frame::Local)?,
            epsilon = 1e-12
        );
        Ok(())
    }

    #[test]
    fn test_set_global_transform_partial_update() -> Result<()> {
        let mut arm = simple_arm()?;
        let rotation = rotation_part(&rot_x(0.4));
        arm.set_global_transform(Some(rotation), Some(Vector3::new(1.0, 1.0, 1.0)))?;

        arm.set_global_transform(None, Some(Vector3::new(2.0, 0.0, 0.0)))?;
        assert_eq!(*arm.global_rotation(), rotation);
        assert_eq!(*arm.global_translation(), Vector3::new(2.0, 0.0, 0.0));

        arm.set_global_transform(Some(Matrix3::identity()), None)?;
        assert_eq!(*arm.global_rotation(), Matrix3::identity());
        assert_eq!(*arm.global_translation(), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(
            arm.link_pose(0).copied(),
            Some(homogeneous(&Matrix3::identity(), &Vector3::new(2.0, 0.0, 0.0)))
        );
        Ok(())
    }

    #[test]
    fn test_unchecked_rotation_accepted() -> Result<()> {
        let mut arm = simple_arm()?;
        let skewed = Matrix3::new(2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        arm.set_global_transform(Some(skewed), None)?;
        assert_relative_eq!(arm.tool_pose()[(0, 3)], 1.5, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_orthonormal_check_rejects_without_mutation() -> Result<()> {
        let mut arm = SerialLink::builder(vec![LinkDh::revolute(1.0, 0.0, 0.0, 0.0)?])
            .rotation_check(RotationCheck::Orthonormal { tolerance: 1e-9 })
            .build()?;
        let before = *arm.global_transform();

        let skewed = Matrix3::new(2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        let err = arm
            .set_global_transform(Some(skewed), Some(Vector3::new(1.0, 0.0, 0.0)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPlacement { .. }));
        assert_eq!(*arm.global_transform(), before);
        assert_eq!(*arm.global_translation(), Vector3::zeros());

        let built = SerialLink::builder(vec![LinkDh::revolute(1.0, 0.0, 0.0, 0.0)?])
            .rotation_check(RotationCheck::Orthonormal { tolerance: 1e-9 })
            .global_rotation(skewed)
            .build();
        assert!(built.is_err());
        Ok(())
    }

    #[test]
    fn test_non_finite_translation_rejected() -> Result<()> {
        let mut arm = simple_arm()?;
        let err = arm
            .set_global_transform(None, Some(Vector3::new(f64::NAN, 0.0, 0.0)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPlacement { .. }));
        assert_eq!(*arm.global_transform(), Matrix4::identity());
        Ok(())
    }

    #[test]
    fn test_world_pose_projection() -> Result<()> {
        let mut arm = SerialLink::builder(vec![
            LinkDh::new(JointType::Prismatic, 0.0, 0.0, 0.1, 0.0)?,
            LinkDh::revolute(0.2, 0.0, 0.0, 0.0)?,
        ])
        .base("rail")
        .global_translation(Vector3::new(0.0, 0.0, 1.0))
        .build()?;
        arm.move_joints(&[0.4, FRAC_PI_2])?;

        let second = arm.link_world_pose(1).unwrap();
        assert_relative_eq!(second.translation, Vector3::new(0.0, 0.0, 1.5), epsilon = 1e-12);
        assert_relative_eq!(
            second.rotation,
            rotation_part(&rot_z(FRAC_PI_2)),
            epsilon = 1e-12
        );
        assert!(arm.link_world_pose(2).is_none());
        assert_eq!(arm.base(), Some("rail"));
        Ok(())
    }
}
