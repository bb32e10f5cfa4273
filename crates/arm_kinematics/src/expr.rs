//! Symbolic scalar expressions.
//!
//! Expressions are assembled through normalizing constructors
//! ([`Expr::sum`], [`Expr::product`], [`Expr::sin`], [`Expr::cos`] and the
//! arithmetic operators). Products are expanded over sums, like terms are
//! merged and numeric sub-expressions are folded, which keeps the entries of
//! composed transforms in a flat sum-of-products form.
//!
//! Invariants of a normalized expression:
//!
//! - a `Mul` holds at least two factors, at most one `Num` (first, never
//!   `1`) and no `Mul` or `Add` factors; the remaining factors are sorted
//! - an `Add` holds at least two terms, none of them `Add`, and no two terms
//!   that differ only in their coefficient

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::{Error, Result};

/// Magnitude below which a coefficient or trigonometric value is treated as
/// an exact integer (usually zero).
pub const ZERO_TOLERANCE: f64 = 1e-12;

/// Numeric values bound to symbols for evaluation or substitution
pub type Bindings = HashMap<Symbol, f64>;

/// Named algebraic unknown, such as a joint angle or a joint displacement
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol with the given name
    ///
    /// Names follow the `base_sub1_sub2` pattern used for rendering, e.g.
    /// `theta_1` or `d_1_2`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the symbol name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Symbolic scalar expression
///
/// The variants are public for inspection. Build new expressions with the
/// constructors and operators so the invariants in the module docs hold.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum Expr {
    Num(f64),
    Sym(Symbol),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Mul(Vec<Expr>),
    Add(Vec<Expr>),
}

impl Expr {
    /// Numeric constant
    pub fn num(value: f64) -> Self {
        // Normalizes -0.0 so it never renders with a sign.
        Expr::Num(value + 0.0)
    }

    pub fn zero() -> Self {
        Expr::Num(0.0)
    }

    pub fn one() -> Self {
        Expr::Num(1.0)
    }

    /// Expression consisting of a single symbol
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Sym(Symbol::new(name))
    }

    /// The value of a numeric expression, or `None` if it is symbolic
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Expr::Num(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Expr::Num(_))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(value) if *value == 0.0)
    }

    /// Sum of the given terms, flattened and with like terms merged
    pub fn sum<I: IntoIterator<Item = Expr>>(terms: I) -> Expr {
        let mut flat = Vec::new();
        for term in terms {
            flatten_sum(term, &mut flat);
        }

        let mut merged: Vec<(Vec<Expr>, f64)> = Vec::new();
        for term in flat {
            let (coefficient, factors) = split_term(term);
            match merged.iter_mut().find(|(existing, _)| *existing == factors) {
                Some((_, total)) => *total += coefficient,
                None => merged.push((factors, coefficient)),
            }
        }

        let mut terms: Vec<Expr> = merged
            .into_iter()
            .filter(|(_, coefficient)| coefficient.abs() >= ZERO_TOLERANCE)
            .map(|(factors, coefficient)| make_term(coefficient, factors))
            .collect();

        match terms.len() {
            0 => Expr::zero(),
            1 => terms.swap_remove(0),
            _ => Expr::Add(terms),
        }
    }

    /// Product of the given factors, expanded over any sums
    pub fn product<I: IntoIterator<Item = Expr>>(factors: I) -> Expr {
        // Each entry is one expanded term: a coefficient and its factors.
        let mut terms: Vec<(f64, Vec<Expr>)> = vec![(1.0, Vec::new())];

        for factor in factors {
            match factor {
                Expr::Add(addends) => {
                    let parts: Vec<(f64, Vec<Expr>)> =
                        addends.into_iter().map(split_term).collect();
                    terms = terms
                        .iter()
                        .flat_map(|(coefficient, factors)| {
                            parts.iter().map(move |(part_coefficient, part_factors)| {
                                let mut combined = factors.clone();
                                combined.extend(part_factors.iter().cloned());
                                (coefficient * part_coefficient, combined)
                            })
                        })
                        .collect();
                }
                other => {
                    let (part_coefficient, part_factors) = split_term(other);
                    for (coefficient, factors) in &mut terms {
                        *coefficient *= part_coefficient;
                        factors.extend(part_factors.iter().cloned());
                    }
                }
            }
        }

        Expr::sum(
            terms
                .into_iter()
                .map(|(coefficient, factors)| make_term(coefficient, factors)),
        )
    }

    /// Sine, folded for numeric arguments
    pub fn sin(self) -> Expr {
        if let Expr::Num(value) = self {
            return Expr::num(snap(value.sin()));
        }
        if self.has_negative_coefficient() {
            return -(-self).sin();
        }
        Expr::Sin(Box::new(self))
    }

    /// Cosine, folded for numeric arguments
    pub fn cos(self) -> Expr {
        if let Expr::Num(value) = self {
            return Expr::num(snap(value.cos()));
        }
        if self.has_negative_coefficient() {
            return (-self).cos();
        }
        Expr::Cos(Box::new(self))
    }

    /// Replace every occurrence of `symbol` with `value`
    pub fn subs(&self, symbol: &Symbol, value: &Expr) -> Expr {
        match self {
            Expr::Sym(name) if name == symbol => value.clone(),
            Expr::Num(_) | Expr::Sym(_) => self.clone(),
            Expr::Sin(arg) => arg.subs(symbol, value).sin(),
            Expr::Cos(arg) => arg.subs(symbol, value).cos(),
            Expr::Mul(factors) => Expr::product(factors.iter().map(|f| f.subs(symbol, value))),
            Expr::Add(terms) => Expr::sum(terms.iter().map(|t| t.subs(symbol, value))),
        }
    }

    /// Replace every bound symbol with its numeric value
    ///
    /// Symbols without a binding are left in place.
    pub fn subs_all(&self, bindings: &Bindings) -> Expr {
        match self {
            Expr::Num(_) => self.clone(),
            Expr::Sym(symbol) => bindings
                .get(symbol)
                .map_or_else(|| self.clone(), |value| Expr::num(*value)),
            Expr::Sin(arg) => arg.subs_all(bindings).sin(),
            Expr::Cos(arg) => arg.subs_all(bindings).cos(),
            Expr::Mul(factors) => Expr::product(factors.iter().map(|f| f.subs_all(bindings))),
            Expr::Add(terms) => Expr::sum(terms.iter().map(|t| t.subs_all(bindings))),
        }
    }

    /// Evaluate numerically
    ///
    /// Returns [`Error::UnboundSymbol`] for the first symbol without a value.
    pub fn eval(&self, bindings: &Bindings) -> Result<f64> {
        match self {
            Expr::Num(value) => Ok(*value),
            Expr::Sym(symbol) => bindings
                .get(symbol)
                .copied()
                .ok_or_else(|| Error::UnboundSymbol {
                    name: symbol.name().to_string(),
                }),
            Expr::Sin(arg) => Ok(arg.eval(bindings)?.sin()),
            Expr::Cos(arg) => Ok(arg.eval(bindings)?.cos()),
            Expr::Mul(factors) => factors.iter().map(|f| f.eval(bindings)).product(),
            Expr::Add(terms) => terms.iter().map(|t| t.eval(bindings)).sum(),
        }
    }

    /// All symbols the expression still depends on
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Num(_) => {}
            Expr::Sym(symbol) => {
                symbols.insert(symbol.clone());
            }
            Expr::Sin(arg) | Expr::Cos(arg) => arg.collect_symbols(symbols),
            Expr::Mul(children) | Expr::Add(children) => {
                for child in children {
                    child.collect_symbols(symbols);
                }
            }
        }
    }

    fn has_negative_coefficient(&self) -> bool {
        match self {
            Expr::Num(value) => *value < 0.0,
            Expr::Mul(factors) => factors.first().is_some_and(|f| matches!(f, Expr::Num(v) if *v < 0.0)),
            _ => false,
        }
    }

    /// Split a leading minus sign off a term
    ///
    /// Returns `true` and the negated term when the coefficient is negative.
    pub(crate) fn split_sign(&self) -> (bool, Expr) {
        if self.has_negative_coefficient() {
            (true, -self.clone())
        } else {
            (false, self.clone())
        }
    }
}

/// Canonical factor order: numbers, symbols, sines, cosines, then compounds
fn canonical_order(a: &Expr, b: &Expr) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Round values that sit within tolerance of an integer
fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < ZERO_TOLERANCE {
        rounded + 0.0
    } else {
        value
    }
}

fn flatten_sum(term: Expr, out: &mut Vec<Expr>) {
    match term {
        Expr::Add(terms) => {
            for term in terms {
                flatten_sum(term, out);
            }
        }
        other => out.push(other),
    }
}

/// Decompose a term into its numeric coefficient and symbolic factors
fn split_term(term: Expr) -> (f64, Vec<Expr>) {
    match term {
        Expr::Num(value) => (value, Vec::new()),
        Expr::Mul(factors) => {
            let mut coefficient = 1.0;
            let mut rest = Vec::with_capacity(factors.len());
            for factor in factors {
                match factor {
                    Expr::Num(value) => coefficient *= value,
                    other => rest.push(other),
                }
            }
            (coefficient, rest)
        }
        other => (1.0, vec![other]),
    }
}

fn make_term(coefficient: f64, mut factors: Vec<Expr>) -> Expr {
    if factors.is_empty() {
        return Expr::num(coefficient);
    }
    factors.sort_by(canonical_order);
    if coefficient == 1.0 && factors.len() == 1 {
        return factors.swap_remove(0);
    }
    if coefficient != 1.0 {
        factors.insert(0, Expr::num(coefficient));
    }
    Expr::Mul(factors)
}

/// Format a number the way it reads in a formula: integers without a
/// fractional part, everything else in shortest round-trip form.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(value) => f.write_str(&format_number(*value)),
            Expr::Sym(symbol) => write!(f, "{}", symbol),
            Expr::Sin(arg) => write!(f, "sin({})", arg),
            Expr::Cos(arg) => write!(f, "cos({})", arg),
            Expr::Mul(_) => {
                let (negative, magnitude) = self.split_sign();
                if negative {
                    return write!(f, "-{}", magnitude);
                }
                let Expr::Mul(factors) = magnitude else {
                    return write!(f, "{}", magnitude);
                };
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("*")?;
                    }
                    match factor {
                        Expr::Add(_) => write!(f, "({})", factor)?,
                        _ => write!(f, "{}", factor)?,
                    }
                }
                Ok(())
            }
            Expr::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    let (negative, magnitude) = term.split_sign();
                    match (i, negative) {
                        (0, _) => write!(f, "{}", term)?,
                        (_, true) => write!(f, " - {}", magnitude)?,
                        (_, false) => write!(f, " + {}", term)?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::num(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Sym(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Sym(symbol.clone())
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::sum([self, rhs])
    }
}

impl Add<&Expr> for &Expr {
    type Output = Expr;

    fn add(self, rhs: &Expr) -> Expr {
        Expr::sum([self.clone(), rhs.clone()])
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::sum([self, -rhs])
    }
}

impl Sub<&Expr> for &Expr {
    type Output = Expr;

    fn sub(self, rhs: &Expr) -> Expr {
        Expr::sum([self.clone(), -rhs.clone()])
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::product([self, rhs])
    }
}

impl Mul<&Expr> for &Expr {
    type Output = Expr;

    fn mul(self, rhs: &Expr) -> Expr {
        Expr::product([self.clone(), rhs.clone()])
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::product([Expr::Num(-1.0), self])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};
    use test_log::test;

    fn theta() -> Expr {
        Expr::symbol("theta")
    }

    #[test]
    fn test_constant_folding() {
        let expr = Expr::num(2.0) * Expr::num(3.0) + Expr::num(1.0);
        assert_eq!(expr, Expr::Num(7.0));
    }

    #[test]
    fn test_multiplicative_identities() {
        assert_eq!(theta() * Expr::one(), theta());
        assert_eq!(Expr::one() * theta(), theta());
        assert!((theta() * Expr::zero()).is_zero());
        assert_eq!(theta() + Expr::zero(), theta());
    }

    #[test]
    fn test_like_terms_cancel() {
        let expr = theta().sin() * Expr::num(0.5) - Expr::num(0.5) * theta().sin();
        assert!(expr.is_zero());

        let doubled = theta().cos() + theta().cos();
        assert_eq!(doubled, Expr::Mul(vec![Expr::Num(2.0), theta().cos()]));
    }

    #[test]
    fn test_product_expands_over_sums() {
        let a = Expr::symbol("a");
        let b = Expr::symbol("b");
        let c = Expr::symbol("c");

        let expr = (a.clone() + b.clone()) * c.clone();
        assert_eq!(expr, Expr::Add(vec![a * c.clone(), b * c]));
    }

    #[test]
    fn test_factor_order_is_canonical() {
        let ab = Expr::symbol("a") * Expr::symbol("b");
        let ba = Expr::symbol("b") * Expr::symbol("a");
        assert_eq!(ab, ba);

        let mixed = theta().cos() * theta().sin() * Expr::symbol("d");
        let Expr::Mul(factors) = mixed else {
            panic!("expected a product");
        };
        assert!(matches!(factors[0], Expr::Sym(_)));
        assert!(matches!(factors[1], Expr::Sin(_)));
        assert!(matches!(factors[2], Expr::Cos(_)));
    }

    #[test]
    fn test_trig_snapping() {
        assert_eq!(Expr::num(FRAC_PI_2).sin(), Expr::Num(1.0));
        assert_eq!(Expr::num(FRAC_PI_2).cos(), Expr::Num(0.0));
        assert_eq!(Expr::num(PI).cos(), Expr::Num(-1.0));
        assert_eq!(Expr::zero().sin(), Expr::Num(0.0));

        let irrational = Expr::num(0.3).sin().as_f64().unwrap();
        assert!((irrational - 0.3_f64.sin()).abs() < 1e-15);
    }

    #[test]
    fn test_trig_parity() {
        assert_eq!((-theta()).sin(), -theta().sin());
        assert_eq!((-theta()).cos(), theta().cos());
    }

    #[test]
    fn test_subs() {
        let symbol = Symbol::new("theta");
        let expr = Expr::num(0.5) * theta().cos();

        assert_eq!(expr.subs(&symbol, &Expr::zero()), Expr::Num(0.5));

        let renamed = expr.subs(&symbol, &Expr::symbol("phi"));
        assert_eq!(renamed.free_symbols().len(), 1);
        assert!(renamed.free_symbols().contains(&Symbol::new("phi")));
    }

    #[test]
    fn test_subs_all_partial() {
        let expr = theta().sin() * Expr::symbol("d");
        let bindings = Bindings::from([(Symbol::new("theta"), FRAC_PI_2)]);

        assert_eq!(expr.subs_all(&bindings), Expr::symbol("d"));
    }

    #[test]
    fn test_eval() {
        let expr = Expr::num(0.5) * theta().cos() + Expr::symbol("d");
        let bindings = Bindings::from([(Symbol::new("theta"), PI), (Symbol::new("d"), 2.0)]);

        assert!((expr.eval(&bindings).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_eval_unbound_symbol() {
        let expr = theta().cos() * Expr::symbol("d");
        let bindings = Bindings::from([(Symbol::new("theta"), 0.0)]);

        assert_eq!(
            expr.eval(&bindings),
            Err(Error::UnboundSymbol {
                name: "d".to_string()
            })
        );
    }

    #[test]
    fn test_display() {
        let expr = Expr::num(0.5) * theta().cos() - theta().sin() * Expr::symbol("d");
        assert_eq!(expr.to_string(), "0.5*cos(theta) - d*sin(theta)");
        assert_eq!((-theta()).to_string(), "-theta");
        assert_eq!(Expr::num(-0.0).to_string(), "0");
    }
}
