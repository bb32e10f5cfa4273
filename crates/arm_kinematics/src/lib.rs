//! # Arm Kinematics Library
//!
//! Symbolic forward kinematics for a serial robot arm. Each joint yields a
//! 4x4 homogeneous transform whose entries are symbolic expressions in the
//! joint variables; composing them gives the base to end-effector transform.
//!
//! ## Features
//!
//! - A small symbolic algebra kernel with automatic expansion and folding
//! - Joint transforms derived from a tagged joint kind (revolute or prismatic)
//! - Chain composition and numeric evaluation through nalgebra
//! - LaTeX rendering of expressions and transforms
//! - Sampling of the planar end-effector path over one joint's range
//!
//! ## Example
//!
//! ```rust
//! use arm_kinematics::{ArmParameters, build_chain};
//!
//! let chain = build_chain(&ArmParameters::default());
//! let end_effector = chain.end_effector();
//!
//! let pose = end_effector.evaluate(&chain.zero_bindings()).unwrap();
//! assert!((pose[(0, 3)] - 0.5).abs() < 1e-12);
//! ```

pub mod chain;
pub mod expr;
pub mod joint;
pub mod latex;
pub mod path;
pub mod transform;

pub use chain::{ArmParameters, Chain, build_chain, compose};
pub use expr::{Bindings, Expr, Symbol};
pub use joint::{Joint, JointKind};
pub use latex::{ToLatex, render_chain};
pub use path::{Hold, PathSweep, PlanarPath, PlanarPoint, Plane, sample_path};
pub use transform::{Axis, Transform, dh_transform};

pub use nalgebra::{Isometry3, Matrix4};

/// Common result type for this library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for kinematic operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A symbol was still free when a numeric value was required
    #[error("Symbol '{name}' has no bound value")]
    UnboundSymbol { name: String },

    /// Lookup of a joint that is not part of the chain
    #[error("No joint named '{name}' in the chain")]
    UnknownJoint { name: String },

    /// Sweep domain or sample count that cannot be sampled
    #[error("Invalid path sweep: {message}")]
    InvalidSweep { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_default_chain_end_effector() {
        let chain = build_chain(&ArmParameters::default());
        let pose = chain
            .end_effector()
            .evaluate(&chain.zero_bindings())
            .unwrap();

        assert!((pose[(0, 3)] - 0.5).abs() < 1e-12);
        assert!(pose[(1, 3)].abs() < 1e-12);
        assert!(pose[(2, 3)].abs() < 1e-12);
    }

    #[test]
    fn test_error_display() {
        let error = Error::UnboundSymbol {
            name: "theta_1".to_string(),
        };
        assert_eq!(error.to_string(), "Symbol 'theta_1' has no bound value");

        let error = Error::UnknownJoint {
            name: "shoulder".to_string(),
        };
        assert!(error.to_string().contains("shoulder"));
    }
}
