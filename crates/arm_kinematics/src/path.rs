//! Sampling of the end-effector path while one joint sweeps its range.

use std::f64::consts::FRAC_PI_2;
use std::str::FromStr;

use crate::expr::{Bindings, Symbol};
use crate::transform::Transform;
use crate::{Error, Result};

/// Default number of samples along a sweep
pub const DEFAULT_SAMPLES: usize = 100;

/// Coordinate plane the end-effector position is projected onto
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Plane {
    #[default]
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// Indices of the horizontal and vertical plot coordinates
    pub fn indices(self) -> (usize, usize) {
        match self {
            Plane::XY => (0, 1),
            Plane::XZ => (0, 2),
            Plane::YZ => (1, 2),
        }
    }

    /// Axis names of the horizontal and vertical plot coordinates
    pub fn axis_names(self) -> (&'static str, &'static str) {
        match self {
            Plane::XY => ("x", "y"),
            Plane::XZ => ("x", "z"),
            Plane::YZ => ("y", "z"),
        }
    }
}

impl FromStr for Plane {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xy" => Ok(Plane::XY),
            "xz" => Ok(Plane::XZ),
            "yz" => Ok(Plane::YZ),
            _ => Err(Error::InvalidSweep {
                message: format!("unknown plane '{}', expected xy, xz or yz", s),
            }),
        }
    }
}

/// Value given to the chain variables that are not swept
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Hold {
    /// Bind every other variable to zero
    #[default]
    Zero,
    /// Leave the other variables free; sampling fails if the projected
    /// position depends on them
    Symbolic,
}

impl FromStr for Hold {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(Hold::Zero),
            "symbolic" => Ok(Hold::Symbolic),
            _ => Err(Error::InvalidSweep {
                message: format!("unknown hold policy '{}', expected zero or symbolic", s),
            }),
        }
    }
}

/// Description of a one-joint sweep
#[derive(Clone, Debug, PartialEq)]
pub struct PathSweep {
    variable: Symbol,
    start: f64,
    end: f64,
    samples: usize,
    plane: Plane,
    held: Bindings,
}

impl PathSweep {
    /// Sweep `variable` from -90° to +90° with default sampling in the XY
    /// plane and nothing held
    pub fn new(variable: Symbol) -> Self {
        Self {
            variable,
            start: -FRAC_PI_2,
            end: FRAC_PI_2,
            samples: DEFAULT_SAMPLES,
            plane: Plane::default(),
            held: Bindings::new(),
        }
    }

    /// Domain in radians (or meters for a prismatic joint)
    pub fn with_domain(mut self, start: f64, end: f64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_domain_degrees(self, start: f64, end: f64) -> Self {
        self.with_domain(start.to_radians(), end.to_radians())
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_plane(mut self, plane: Plane) -> Self {
        self.plane = plane;
        self
    }

    /// Fix one other variable at `value` for the whole sweep
    ///
    /// Holding the swept variable itself makes sampling fail with
    /// [`Error::InvalidSweep`].
    pub fn hold(mut self, symbol: Symbol, value: f64) -> Self {
        self.held.insert(symbol, value);
        self
    }

    /// Apply a hold policy to every variable in `variables` except the swept
    /// one
    pub fn hold_others(mut self, variables: &[Symbol], hold: Hold) -> Self {
        if hold == Hold::Zero {
            for symbol in variables.iter().filter(|s| **s != self.variable) {
                self.held.entry(symbol.clone()).or_insert(0.0);
            }
        }
        self
    }

    pub fn variable(&self) -> &Symbol {
        &self.variable
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    pub fn held(&self) -> &Bindings {
        &self.held
    }

    fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(Error::InvalidSweep {
                message: format!("domain [{}, {}] is not finite", self.start, self.end),
            });
        }
        if self.start >= self.end {
            return Err(Error::InvalidSweep {
                message: format!("domain start {} is not below end {}", self.start, self.end),
            });
        }
        if self.held.contains_key(&self.variable) {
            return Err(Error::InvalidSweep {
                message: format!("swept variable {} is also held", self.variable),
            });
        }
        if self.samples < 2 {
            return Err(Error::InvalidSweep {
                message: format!("need at least 2 samples, got {}", self.samples),
            });
        }
        Ok(())
    }
}

/// One sample of the projected end-effector position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarPoint {
    /// Value of the swept variable
    pub parameter: f64,
    /// Horizontal plot coordinate
    pub x: f64,
    /// Vertical plot coordinate
    pub y: f64,
}

/// Axis-aligned extent of a path
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// End-effector positions along a sweep, in sweep order
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarPath {
    plane: Plane,
    points: Vec<PlanarPoint>,
}

impl PlanarPath {
    pub fn plane(&self) -> Plane {
        self.plane
    }

    pub fn points(&self) -> &[PlanarPoint] {
        &self.points
    }

    /// Extent of the sampled points, `None` for an empty path
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let initial = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(self.points.iter().fold(initial, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            max_x: b.max_x.max(p.x),
            min_y: b.min_y.min(p.y),
            max_y: b.max_y.max(p.y),
        }))
    }
}

/// Sample the translation of `transform` over the sweep domain
///
/// Held variables are substituted once up front; the swept variable is then
/// bound per sample. Any variable left unbound produces
/// [`Error::UnboundSymbol`].
///
/// # Example
/// ```rust
/// use arm_kinematics::{ArmParameters, Hold, PathSweep, Symbol, build_chain, sample_path};
///
/// let chain = build_chain(&ArmParameters::default());
/// let sweep = PathSweep::new(Symbol::new("theta_1"))
///     .with_samples(5)
///     .hold_others(&chain.variables(), Hold::Zero);
///
/// let path = sample_path(&chain.end_effector(), &sweep).unwrap();
/// assert_eq!(path.points().len(), 5);
/// ```
pub fn sample_path(transform: &Transform, sweep: &PathSweep) -> Result<PlanarPath> {
    sweep.validate()?;

    let (i, j) = sweep.plane.indices();
    let translation = transform.translation();
    let horizontal = translation[i].subs_all(&sweep.held);
    let vertical = translation[j].subs_all(&sweep.held);
    log::debug!(
        "Sampling {} over [{:.4}, {:.4}]: ({}, {})",
        sweep.variable,
        sweep.start,
        sweep.end,
        horizontal,
        vertical
    );

    let step = (sweep.end - sweep.start) / (sweep.samples - 1) as f64;
    let mut bindings = Bindings::new();
    let mut points = Vec::with_capacity(sweep.samples);
    for k in 0..sweep.samples {
        let parameter = if k + 1 == sweep.samples {
            sweep.end
        } else {
            sweep.start + step * k as f64
        };
        bindings.insert(sweep.variable.clone(), parameter);

        let point = PlanarPoint {
            parameter,
            x: horizontal.eval(&bindings)?,
            y: vertical.eval(&bindings)?,
        };
        log::trace!("{} = {:.4}: ({:.4}, {:.4})", sweep.variable, parameter, point.x, point.y);
        points.push(point);
    }

    Ok(PlanarPath {
        plane: sweep.plane,
        points,
    })
}
