//! Manual FFI bindings for the armech library
//!
//! This module provides a C-compatible interface to the pure Rust armech
//! kinematic chain so a C or C++ renderer can pose an arm and read back the
//! world pose of every link.
//!
//! The approach uses:
//! - `#[unsafe(no_mangle)]` functions with C calling convention
//! - Opaque pointer types for safe memory management
//! - Status codes in place of Rust errors
//! - Box allocation/deallocation patterns

use armech::transform::to_column_major;
use armech::{Error, Frame, JointType, LinkDh, Matrix3, Matrix4, SerialLink, Vector3};
use std::ffi::{c_double, c_uint};
use std::ptr;

/// Opaque handle to a Rust SerialLink object
/// This allows C++ code to hold references to Rust objects safely
pub struct ArmechChainHandle {
    chain: SerialLink,
}

/// C-compatible representation of a 4x4 transformation matrix
/// Data is stored in column-major order (compatible with Eigen and OpenGL)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4d {
    pub data: [c_double; 16],
}

impl Mat4d {
    fn identity() -> Self {
        Self::from(&Matrix4::<f64>::identity())
    }
}

impl From<&Matrix4<f64>> for Mat4d {
    fn from(transform: &Matrix4<f64>) -> Self {
        Mat4d {
            data: to_column_major(transform),
        }
    }
}

/// Result of a fallible call
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmechStatus {
    Ok = 0,
    NullPointer = 1,
    InvalidJointType = 2,
    InvalidParameter = 3,
    DimensionMismatch = 4,
    InvalidJointState = 5,
    EmptyChain = 6,
    InvalidPlacement = 7,
    Other = 8,
}

impl From<&Error> for ArmechStatus {
    fn from(error: &Error) -> Self {
        match error {
            Error::InvalidJointType { .. } => ArmechStatus::InvalidJointType,
            Error::InvalidParameter { .. } => ArmechStatus::InvalidParameter,
            Error::DimensionMismatch { .. } => ArmechStatus::DimensionMismatch,
            Error::InvalidJointState { .. } => ArmechStatus::InvalidJointState,
            Error::EmptyChain => ArmechStatus::EmptyChain,
            Error::InvalidPlacement { .. } => ArmechStatus::InvalidPlacement,
            // Description loading is not reachable through this interface
            #[allow(unreachable_patterns)]
            _ => ArmechStatus::Other,
        }
    }
}

fn status_of(result: armech::Result<()>) -> ArmechStatus {
    match result {
        Ok(()) => ArmechStatus::Ok,
        Err(error) => ArmechStatus::from(&error),
    }
}

/// Create a new chain from a DH table
///
/// `joint_types` holds `n` joint type codes (1 = revolute, 2 = prismatic) and
/// `dh` holds `4 * n` parameters, `a, alpha, d, theta` for each joint.
///
/// # Safety
/// The returned pointer must be freed using `armech_chain_free`
/// `joint_types` must point to `n` values and `dh` to `4 * n` values
#[unsafe(no_mangle)]
pub extern "C" fn armech_chain_new(
    joint_types: *const c_uint,
    dh: *const c_double,
    n: c_uint,
) -> *mut ArmechChainHandle {
    if joint_types.is_null() || dh.is_null() || n == 0 {
        return ptr::null_mut();
    }

    let n = n as usize;
    let types = unsafe { std::slice::from_raw_parts(joint_types, n) };
    let params = unsafe { std::slice::from_raw_parts(dh, 4 * n) };

    let links = types
        .iter()
        .zip(params.chunks_exact(4))
        .map(|(&code, p)| LinkDh::new(JointType::try_from(code)?, p[0], p[1], p[2], p[3]))
        .collect::<armech::Result<Vec<_>>>();

    match links.and_then(SerialLink::new) {
        Ok(chain) => Box::into_raw(Box::new(ArmechChainHandle { chain })),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a chain handle
///
/// # Safety
/// The chain pointer must be a valid pointer returned from `armech_chain_new`
/// and must not be used after this call
#[unsafe(no_mangle)]
pub extern "C" fn armech_chain_free(chain: *mut ArmechChainHandle) {
    if !chain.is_null() {
        unsafe {
            drop(Box::from_raw(chain));
        }
    }
}

/// Get the number of joints in a chain
#[unsafe(no_mangle)]
pub extern "C" fn armech_chain_dof(chain: *const ArmechChainHandle) -> c_uint {
    if chain.is_null() {
        return 0;
    }

    let handle = unsafe { &*chain };
    handle.chain.dof() as c_uint
}

/// Set the joint variables and re-pose the chain
///
/// # Safety
/// - chain pointer must be valid
/// - q pointer must point to at least `size` elements
#[unsafe(no_mangle)]
pub extern "C" fn armech_chain_move_joints(
    chain: *mut ArmechChainHandle,
    q: *const c_double,
    size: c_uint,
) -> ArmechStatus {
    if chain.is_null() || (q.is_null() && size > 0) {
        return ArmechStatus::NullPointer;
    }

    let handle = unsafe { &mut *chain };
    let q = joint_slice(q, size);
    status_of(handle.chain.move_joints(q))
}

/// Replace the global placement of the chain
///
/// Either pointer may be null to keep the current value.
///
/// # Safety
/// - chain pointer must be valid
/// - rotation, when not null, must point to 9 values in column-major order
/// - translation, when not null, must point to 3 values
#[unsafe(no_mangle)]
pub extern "C" fn armech_chain_set_global_transform(
    chain: *mut ArmechChainHandle,
    rotation: *const c_double,
    translation: *const c_double,
) -> ArmechStatus {
    if chain.is_null() {
        return ArmechStatus::NullPointer;
    }

    let handle = unsafe { &mut *chain };
    let rotation = (!rotation.is_null()).then(|| {
        let data = unsafe { std::slice::from_raw_parts(rotation, 9) };
        Matrix3::from_column_slice(data)
    });
    let translation = (!translation.is_null()).then(|| {
        let data = unsafe { std::slice::from_raw_parts(translation, 3) };
        Vector3::from_column_slice(data)
    });

    status_of(handle.chain.set_global_transform(rotation, translation))
}

/// Compute the tool pose for `q` without changing the chain
///
/// # Safety
/// - chain and out pointers must be valid
/// - q pointer must point to at least `size` elements
#[unsafe(no_mangle)]
pub extern "C" fn armech_chain_tool_transform(
    chain: *const ArmechChainHandle,
    q: *const c_double,
    size: c_uint,
    local: bool,
    out: *mut Mat4d,
) -> ArmechStatus {
    if chain.is_null() || out.is_null() || (q.is_null() && size > 0) {
        return ArmechStatus::NullPointer;
    }

    let handle = unsafe { &*chain };
    let frame = if local { Frame::Local } else { Frame::World };
    match handle.chain.tool_transform(joint_slice(q, size), frame) {
        Ok(transform) => {
            unsafe {
                *out = Mat4d::from(&transform);
            }
            ArmechStatus::Ok
        }
        Err(error) => ArmechStatus::from(&error),
    }
}

/// Get the cached world pose of joint `index`
///
/// Returns identity for a null chain or an out-of-range index.
#[unsafe(no_mangle)]
pub extern "C" fn armech_chain_link_pose(chain: *const ArmechChainHandle, index: c_uint) -> Mat4d {
    if chain.is_null() {
        return Mat4d::identity();
    }

    let handle = unsafe { &*chain };
    handle
        .chain
        .link_pose(index as usize)
        .map(Mat4d::from)
        .unwrap_or_else(Mat4d::identity)
}

/// Get the cached world pose of the tool
#[unsafe(no_mangle)]
pub extern "C" fn armech_chain_tool_pose(chain: *const ArmechChainHandle) -> Mat4d {
    if chain.is_null() {
        return Mat4d::identity();
    }

    let handle = unsafe { &*chain };
    Mat4d::from(handle.chain.tool_pose())
}

fn joint_slice<'a>(q: *const c_double, size: c_uint) -> &'a [f64] {
    if size == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(q, size as usize) }
    }
}
