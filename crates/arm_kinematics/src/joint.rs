use std::f64::consts::PI;

use crate::expr::{Bindings, Expr, Symbol};
use crate::transform::{Axis, Transform, multiply_blocks, rotation_about};

/// Kinematic type of a joint
///
/// The joint's transform is derived mechanically from the variant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JointKind {
    /// Rotation by the joint variable about `axis`, followed by a fixed
    /// `twist` about x. A non-zero `link_length` displaces the child frame
    /// along the rotated x axis.
    ///
    /// About `Axis::Z` this is the Denavit-Hartenberg transform with zero
    /// displacement and offset `link_length`.
    Revolute {
        axis: Axis,
        twist: f64,
        link_length: f64,
    },

    /// Translation by the joint variable along `axis`
    Prismatic { axis: Axis },
}

/// Represents a robot joint with its kinematic properties
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    /// Name of the joint
    name: String,

    /// Symbolic joint variable (an angle or a travel distance)
    variable: Symbol,

    kind: JointKind,

    /// Lower and upper position limits
    limits: (f64, f64),
}

impl Joint {
    /// Create a revolute joint about `axis` with no twist and no link
    ///
    /// # Example
    /// ```rust
    /// use arm_kinematics::{Axis, Joint, Symbol};
    ///
    /// let joint = Joint::revolute("shoulder", Symbol::new("theta_1"), Axis::Z);
    /// assert_eq!(joint.name(), "shoulder");
    /// assert!(joint.is_within_limits(1.0));
    /// ```
    pub fn revolute(name: impl Into<String>, variable: Symbol, axis: Axis) -> Self {
        Self {
            name: name.into(),
            variable,
            kind: JointKind::Revolute {
                axis,
                twist: 0.0,
                link_length: 0.0,
            },
            limits: (-PI, PI),
        }
    }

    /// Create a prismatic joint travelling along `axis`
    pub fn prismatic(name: impl Into<String>, variable: Symbol, axis: Axis) -> Self {
        Self {
            name: name.into(),
            variable,
            kind: JointKind::Prismatic { axis },
            limits: (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    /// Set the fixed twist angle (radians). Ignored for prismatic joints.
    pub fn with_twist(mut self, angle: f64) -> Self {
        if let JointKind::Revolute { twist, .. } = &mut self.kind {
            *twist = angle;
        }
        self
    }

    /// Set the fixed link length. Ignored for prismatic joints.
    pub fn with_link_length(mut self, length: f64) -> Self {
        if let JointKind::Revolute { link_length, .. } = &mut self.kind {
            *link_length = length;
        }
        self
    }

    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        self.limits = (min, max);
        self
    }

    /// Get the joint name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the joint variable
    pub fn variable(&self) -> &Symbol {
        &self.variable
    }

    pub fn kind(&self) -> &JointKind {
        &self.kind
    }

    pub fn limits(&self) -> (f64, f64) {
        self.limits
    }

    /// Check if a joint position is within limits
    pub fn is_within_limits(&self, position: f64) -> bool {
        let (min, max) = self.limits;
        position >= min && position <= max
    }

    /// Symbolic homogeneous transform from the parent frame to this joint's
    /// child frame
    pub fn transform(&self) -> Transform {
        let q = Expr::from(&self.variable);
        match &self.kind {
            JointKind::Revolute {
                axis,
                twist,
                link_length,
            } => {
                let joint_rotation = rotation_about(*axis, &q);
                let rotation = if *twist == 0.0 {
                    joint_rotation.clone()
                } else {
                    multiply_blocks(&joint_rotation, &rotation_about(Axis::X, &Expr::num(*twist)))
                };
                // The link lies along the joint's own rotated x axis.
                let length = Expr::num(*link_length);
                let translation =
                    std::array::from_fn(|row| &length * &joint_rotation[row][0]);
                Transform::from_parts(rotation, translation)
            }
            JointKind::Prismatic { axis } => {
                let translation = axis.unit().map(|component| &Expr::num(component) * &q);
                Transform::from_translation(translation)
            }
        }
    }

    /// Transform with the joint variable substituted by `position`
    ///
    /// # Example
    /// ```rust
    /// use arm_kinematics::{Axis, Joint, Symbol};
    /// use std::f64::consts::PI;
    ///
    /// let joint = Joint::revolute("elbow", Symbol::new("theta_3"), Axis::Z);
    /// let transform = joint.calculate_transform(PI / 2.0);
    /// assert!(transform.is_numeric());
    /// ```
    pub fn calculate_transform(&self, position: f64) -> Transform {
        self.transform()
            .subs_all(&Bindings::from([(self.variable.clone(), position)]))
    }
}

impl Default for Joint {
    fn default() -> Self {
        Self::revolute("unnamed_joint", Symbol::new("theta"), Axis::Z)
    }
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            JointKind::Revolute { axis, .. } => write!(
                f,
                "Joint '{}' (revolute about {:?}, variable: {})",
                self.name, axis, self.variable
            ),
            JointKind::Prismatic { axis } => write!(
                f,
                "Joint '{}' (prismatic along {:?}, variable: {})",
                self.name, axis, self.variable
            ),
        }
    }
}
