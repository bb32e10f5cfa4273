//! Symbolic homogeneous transforms.
//!
//! A [`Transform`] stores only the rotation block and the translation
//! column; the bottom row is implicitly `[0, 0, 0, 1]`, so composition and
//! substitution can never break it.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Mul;

use nalgebra::{Isometry3, Matrix3, Matrix4, Rotation3, Translation3, UnitQuaternion};

use crate::Result;
use crate::expr::{Bindings, Expr, Symbol};

/// 3x3 block of symbolic entries, row-major
pub type RotationBlock = [[Expr; 3]; 3];

/// Principal axis of a joint frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along the axis
    pub fn unit(self) -> [f64; 3] {
        match self {
            Axis::X => [1.0, 0.0, 0.0],
            Axis::Y => [0.0, 1.0, 0.0],
            Axis::Z => [0.0, 0.0, 1.0],
        }
    }
}

/// 4x4 homogeneous transform with symbolic entries
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    rotation: RotationBlock,
    translation: [Expr; 3],
}

impl Transform {
    pub fn identity() -> Self {
        Self::from_parts(identity_rotation(), zero_vector())
    }

    /// Create a transform from a rotation block and a translation column
    pub fn from_parts(rotation: RotationBlock, translation: [Expr; 3]) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Pure rotation, zero translation
    pub fn from_rotation(rotation: RotationBlock) -> Self {
        Self::from_parts(rotation, zero_vector())
    }

    /// Pure translation, identity rotation
    pub fn from_translation(translation: [Expr; 3]) -> Self {
        Self::from_parts(identity_rotation(), translation)
    }

    /// Get the rotation block
    pub fn rotation(&self) -> &RotationBlock {
        &self.rotation
    }

    /// Get the translation column
    pub fn translation(&self) -> &[Expr; 3] {
        &self.translation
    }

    /// All four rows, including the fixed bottom row
    pub fn rows(&self) -> [[Expr; 4]; 4] {
        std::array::from_fn(|row| {
            std::array::from_fn(|col| match (row, col) {
                (3, 3) => Expr::one(),
                (3, _) => Expr::zero(),
                (_, 3) => self.translation[row].clone(),
                _ => self.rotation[row][col].clone(),
            })
        })
    }

    /// Matrix product `self * other`
    pub fn compose(&self, other: &Transform) -> Transform {
        let rotation = multiply_blocks(&self.rotation, &other.rotation);
        let translation = std::array::from_fn(|row| {
            Expr::sum(
                (0..3)
                    .map(|k| &self.rotation[row][k] * &other.translation[k])
                    .chain(std::iter::once(self.translation[row].clone())),
            )
        });
        Transform::from_parts(rotation, translation)
    }

    /// Multiply a homogeneous 4-vector
    ///
    /// A last component of `0` transforms a direction, `1` a point.
    pub fn apply(&self, vector: &[Expr; 4]) -> [Expr; 4] {
        std::array::from_fn(|row| {
            if row == 3 {
                return vector[3].clone();
            }
            Expr::sum(
                (0..3)
                    .map(|k| &self.rotation[row][k] * &vector[k])
                    .chain(std::iter::once(&self.translation[row] * &vector[3])),
            )
        })
    }

    /// Replace every occurrence of `symbol` with `value`
    pub fn subs(&self, symbol: &Symbol, value: &Expr) -> Transform {
        self.map(|entry| entry.subs(symbol, value))
    }

    /// Replace every bound symbol with its numeric value
    pub fn subs_all(&self, bindings: &Bindings) -> Transform {
        self.map(|entry| entry.subs_all(bindings))
    }

    /// Symbols the transform still depends on
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        self.entries().flat_map(Expr::free_symbols).collect()
    }

    /// True when every entry is a plain number
    pub fn is_numeric(&self) -> bool {
        self.entries().all(Expr::is_numeric)
    }

    /// Evaluate to a numeric matrix
    ///
    /// # Example
    /// ```rust
    /// use arm_kinematics::{Axis, Bindings, Expr, Symbol, Transform};
    /// use arm_kinematics::transform::rotation_about;
    ///
    /// let theta = Symbol::new("theta_1");
    /// let transform = Transform::from_rotation(rotation_about(Axis::Z, &Expr::from(&theta)));
    /// let matrix = transform
    ///     .evaluate(&Bindings::from([(theta, std::f64::consts::FRAC_PI_2)]))
    ///     .unwrap();
    /// assert!((matrix[(1, 0)] - 1.0).abs() < 1e-12);
    /// ```
    pub fn evaluate(&self, bindings: &Bindings) -> Result<Matrix4<f64>> {
        let mut matrix = Matrix4::identity();
        for row in 0..3 {
            for col in 0..3 {
                matrix[(row, col)] = self.rotation[row][col].eval(bindings)?;
            }
            matrix[(row, 3)] = self.translation[row].eval(bindings)?;
        }
        Ok(matrix)
    }

    /// Evaluate to a rigid-body pose
    ///
    /// The rotation block is projected onto the nearest rotation, so a
    /// block that is only approximately orthonormal still yields a pose.
    pub fn to_isometry(&self, bindings: &Bindings) -> Result<Isometry3<f64>> {
        let matrix = self.evaluate(bindings)?;
        let block: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let rotation = Rotation3::from_matrix(&block);
        let translation = Translation3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
        Ok(Isometry3::from_parts(
            translation,
            UnitQuaternion::from_rotation_matrix(&rotation),
        ))
    }

    fn entries(&self) -> impl Iterator<Item = &Expr> {
        self.rotation.iter().flatten().chain(self.translation.iter())
    }

    fn map(&self, f: impl Fn(&Expr) -> Expr) -> Transform {
        Transform::from_parts(
            std::array::from_fn(|row| std::array::from_fn(|col| f(&self.rotation[row][col]))),
            std::array::from_fn(|row| f(&self.translation[row])),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        self.compose(rhs)
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{}, {}, {}, {}]", row[0], row[1], row[2], row[3])?;
        }
        Ok(())
    }
}

/// Rotation block about a principal axis by a symbolic angle
pub fn rotation_about(axis: Axis, angle: &Expr) -> RotationBlock {
    let c = angle.clone().cos();
    let s = angle.clone().sin();
    let (zero, one) = (Expr::zero(), Expr::one());
    match axis {
        Axis::X => [
            [one, zero.clone(), zero.clone()],
            [zero.clone(), c.clone(), -s.clone()],
            [zero, s, c],
        ],
        Axis::Y => [
            [c.clone(), zero.clone(), s.clone()],
            [zero.clone(), one, zero.clone()],
            [-s, zero, c],
        ],
        Axis::Z => [
            [c.clone(), -s.clone(), zero.clone()],
            [s, c, zero.clone()],
            [zero.clone(), zero, one],
        ],
    }
}

/// Product of two rotation blocks
pub fn multiply_blocks(a: &RotationBlock, b: &RotationBlock) -> RotationBlock {
    std::array::from_fn(|row| {
        std::array::from_fn(|col| Expr::sum((0..3).map(|k| &a[row][k] * &b[k][col])))
    })
}

/// Classic Denavit-Hartenberg transform
///
/// `Rot_z(rotation) * Trans_z(displacement) * Trans_x(offset) * Rot_x(twist)`
/// written out entry by entry.
pub fn dh_transform(rotation: &Expr, twist: &Expr, displacement: &Expr, offset: &Expr) -> Transform {
    let (ct, st) = (rotation.clone().cos(), rotation.clone().sin());
    let (ca, sa) = (twist.clone().cos(), twist.clone().sin());

    Transform::from_parts(
        [
            [ct.clone(), -(&st * &ca), &st * &sa],
            [st.clone(), &ct * &ca, -(&ct * &sa)],
            [Expr::zero(), sa, ca],
        ],
        [offset * &ct, offset * &st, displacement.clone()],
    )
}

fn identity_rotation() -> RotationBlock {
    std::array::from_fn(|row| {
        std::array::from_fn(|col| if row == col { Expr::one() } else { Expr::zero() })
    })
}

fn zero_vector() -> [Expr; 3] {
    std::array::from_fn(|_| Expr::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, PI};
    use test_log::test;

    fn theta() -> Symbol {
        Symbol::new("theta")
    }

    fn bindings(value: f64) -> Bindings {
        Bindings::from([(theta(), value)])
    }

    #[test]
    fn test_identity() {
        let identity = Transform::identity();
        assert!(identity.is_numeric());
        assert_eq!(identity.evaluate(&Bindings::new()).unwrap(), Matrix4::identity());
    }

    #[test]
    fn test_bottom_row_is_fixed() {
        let transform = dh_transform(
            &Expr::from(theta()),
            &Expr::symbol("alpha"),
            &Expr::symbol("d"),
            &Expr::symbol("a"),
        );
        let bottom = &transform.rows()[3];
        assert_eq!(
            bottom,
            &[Expr::zero(), Expr::zero(), Expr::zero(), Expr::one()]
        );

        let composed = &transform * &transform;
        assert_eq!(
            &composed.rows()[3],
            &[Expr::zero(), Expr::zero(), Expr::zero(), Expr::one()]
        );
    }

    #[test]
    fn test_rotation_blocks_are_orthonormal() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let transform = Transform::from_rotation(rotation_about(axis, &Expr::from(theta())));
            for angle in [-PI, -FRAC_PI_2, 0.0, 0.4, FRAC_PI_3, 2.5] {
                let matrix = transform.evaluate(&bindings(angle)).unwrap();
                let block: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();

                let error = (block.transpose() * block - Matrix3::identity()).norm();
                assert!(error < 1e-12, "{:?} at {}: RᵀR error {}", axis, angle, error);
                assert!((block.determinant() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_rotation_about_z_90_degrees() {
        let transform = Transform::from_rotation(rotation_about(Axis::Z, &Expr::from(theta())));
        let x_axis = [Expr::one(), Expr::zero(), Expr::zero(), Expr::zero()];

        let rotated = transform.subs(&theta(), &Expr::num(FRAC_PI_2)).apply(&x_axis);
        assert_eq!(
            rotated,
            [Expr::zero(), Expr::one(), Expr::zero(), Expr::zero()]
        );
    }

    #[test]
    fn test_apply_point_includes_translation() {
        let transform = Transform::from_translation([Expr::num(1.0), Expr::num(2.0), Expr::symbol("d")]);
        let origin = [Expr::zero(), Expr::zero(), Expr::zero(), Expr::one()];

        let moved = transform.apply(&origin);
        assert_eq!(moved[0], Expr::Num(1.0));
        assert_eq!(moved[2], Expr::symbol("d"));
        assert_eq!(moved[3], Expr::one());
    }

    #[test]
    fn test_compose_translation() {
        let rotate = Transform::from_rotation(rotation_about(Axis::Z, &Expr::num(FRAC_PI_2)));
        let shift = Transform::from_translation([Expr::num(0.5), Expr::zero(), Expr::zero()]);

        // Rotating first moves the shifted point onto the y axis.
        let composed = &rotate * &shift;
        assert_eq!(
            composed.translation(),
            &[Expr::zero(), Expr::num(0.5), Expr::zero()]
        );

        let reversed = &shift * &rotate;
        assert_eq!(
            reversed.translation(),
            &[Expr::num(0.5), Expr::zero(), Expr::zero()]
        );
    }

    #[test]
    fn test_dh_transform_entries() {
        let transform = dh_transform(
            &Expr::from(theta()),
            &Expr::num(FRAC_PI_2),
            &Expr::zero(),
            &Expr::zero(),
        );
        let c = Expr::from(theta()).cos();
        let s = Expr::from(theta()).sin();

        assert_eq!(
            transform.rotation(),
            &[
                [c.clone(), Expr::zero(), s.clone()],
                [s, Expr::zero(), -c],
                [Expr::zero(), Expr::one(), Expr::zero()],
            ]
        );
    }

    #[test]
    fn test_free_symbols_and_substitution() {
        let transform = dh_transform(
            &Expr::from(theta()),
            &Expr::zero(),
            &Expr::symbol("d"),
            &Expr::num(0.5),
        );
        let symbols = transform.free_symbols();
        assert_eq!(symbols.len(), 2);

        let bound = transform.subs_all(&Bindings::from([(theta(), 0.3), (Symbol::new("d"), 1.0)]));
        assert!(bound.is_numeric());
        assert!(bound.free_symbols().is_empty());
    }

    #[test]
    fn test_evaluate_unbound_symbol() {
        let transform = Transform::from_translation([Expr::symbol("d"), Expr::zero(), Expr::zero()]);
        assert!(transform.evaluate(&Bindings::new()).is_err());
    }

    #[test]
    fn test_to_isometry() {
        let transform = dh_transform(
            &Expr::from(theta()),
            &Expr::zero(),
            &Expr::zero(),
            &Expr::num(2.0),
        );
        let pose = transform.to_isometry(&bindings(FRAC_PI_2)).unwrap();

        assert!((pose.translation.vector.x).abs() < 1e-12);
        assert!((pose.translation.vector.y - 2.0).abs() < 1e-12);
        assert!((pose.rotation.angle() - FRAC_PI_2).abs() < 1e-10);
    }

    #[test]
    fn test_display() {
        let transform = Transform::from_translation([Expr::symbol("d"), Expr::zero(), Expr::zero()]);
        let text = transform.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("[1, 0, 0, d]"));
        assert!(text.ends_with("[0, 0, 0, 1]"));
    }
}
