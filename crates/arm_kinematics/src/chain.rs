//! Kinematic chains and the reference arm.

use std::f64::consts::FRAC_PI_2;

use crate::expr::{Bindings, Symbol};
use crate::joint::Joint;
use crate::transform::{Axis, Transform};
use crate::{Error, Result};

/// Fixed link geometry of the reference arm
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ArmParameters {
    /// Length of the link carried by the wrist, in meters
    ///
    /// Coefficients smaller than [`ZERO_TOLERANCE`](crate::expr::ZERO_TOLERANCE)
    /// are folded to zero, so a non-zero length below it composes as zero.
    pub arm_length: f64,

    /// Twist between the elbow's rotation axis and the previous one, in radians
    pub elbow_twist: f64,
}

impl Default for ArmParameters {
    fn default() -> Self {
        Self {
            arm_length: 0.5,
            elbow_twist: FRAC_PI_2,
        }
    }
}

/// Ordered sequence of joints from the base to the end-effector
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chain {
    joints: Vec<Joint>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint at the end-effector side
    pub fn with_joint(mut self, joint: Joint) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Look up a joint by name
    pub fn joint(&self, name: &str) -> Result<&Joint> {
        self.joints
            .iter()
            .find(|joint| joint.name() == name)
            .ok_or_else(|| Error::UnknownJoint {
                name: name.to_string(),
            })
    }

    /// Joint variables in chain order
    pub fn variables(&self) -> Vec<Symbol> {
        self.joints.iter().map(|joint| joint.variable().clone()).collect()
    }

    /// Bindings that put every joint at position zero
    pub fn zero_bindings(&self) -> Bindings {
        self.variables().into_iter().map(|symbol| (symbol, 0.0)).collect()
    }

    /// Per-joint transforms in chain order
    pub fn transforms(&self) -> Vec<Transform> {
        self.joints.iter().map(Joint::transform).collect()
    }

    /// Base to end-effector transform
    pub fn end_effector(&self) -> Transform {
        compose(&self.transforms())
    }
}

/// Multiply transforms left to right, starting from the identity
///
/// The first transform is nearest the base. An empty sequence yields the
/// identity.
pub fn compose<'a, I>(transforms: I) -> Transform
where
    I: IntoIterator<Item = &'a Transform>,
{
    transforms
        .into_iter()
        .enumerate()
        .fold(Transform::identity(), |acc, (i, transform)| {
            let product = &acc * transform;
            let [x, y, z] = product.translation();
            log::debug!("Composed transform {}: translation [{}, {}, {}]", i, x, y, z);
            product
        })
}

/// Build the reference four-joint arm
///
/// | joint    | variable  | kind                                  |
/// |----------|-----------|---------------------------------------|
/// | turret   | `theta_1` | yaw about z                           |
/// | elevator | `d_1_2`   | travel along z                        |
/// | elbow    | `theta_3` | pitch, z rotation twisted about x     |
/// | wrist    | `theta_4` | pitch about z carrying the arm link   |
///
/// # Example
/// ```rust
/// use arm_kinematics::{ArmParameters, build_chain};
///
/// let chain = build_chain(&ArmParameters::default());
/// assert_eq!(chain.len(), 4);
/// assert_eq!(chain.joints()[1].name(), "elevator");
/// ```
pub fn build_chain(params: &ArmParameters) -> Chain {
    log::debug!(
        "Building arm chain: arm length {} m, elbow twist {:.4} rad",
        params.arm_length,
        params.elbow_twist
    );

    Chain::new()
        .with_joint(Joint::revolute("turret", Symbol::new("theta_1"), Axis::Z))
        .with_joint(Joint::prismatic("elevator", Symbol::new("d_1_2"), Axis::Z))
        .with_joint(
            Joint::revolute("elbow", Symbol::new("theta_3"), Axis::Z)
                .with_twist(params.elbow_twist),
        )
        .with_joint(
            Joint::revolute("wrist", Symbol::new("theta_4"), Axis::Z)
                .with_link_length(params.arm_length),
        )
}
