//! LaTeX rendering of symbols, expressions and transforms.
//!
//! Formatting only: nothing here changes the value of what it renders.

use crate::chain::Chain;
use crate::expr::{Expr, Symbol, format_number};
use crate::transform::Transform;

const GREEK_LETTERS: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi", "psi",
    "omega",
];

/// Conversion to LaTeX source
pub trait ToLatex {
    fn to_latex(&self) -> String;
}

impl ToLatex for Symbol {
    /// `theta_1` renders as `\theta_{1}`, `d_1_2` as `d_{1 2}`
    fn to_latex(&self) -> String {
        let mut parts = self.name().split('_');
        let base = parts.next().unwrap_or_default();
        let base = if GREEK_LETTERS.contains(&base.to_lowercase().as_str()) {
            format!("\\{}", base)
        } else {
            base.to_string()
        };

        let subscripts: Vec<&str> = parts.filter(|part| !part.is_empty()).collect();
        if subscripts.is_empty() {
            base
        } else {
            format!("{}_{{{}}}", base, subscripts.join(" "))
        }
    }
}

impl ToLatex for Expr {
    fn to_latex(&self) -> String {
        match self {
            Expr::Num(value) => format_number(*value),
            Expr::Sym(symbol) => symbol.to_latex(),
            Expr::Sin(arg) => function_latex("sin", arg, 1),
            Expr::Cos(arg) => function_latex("cos", arg, 1),
            Expr::Mul(factors) => {
                let (negative, magnitude) = self.split_sign();
                if negative {
                    return format!("- {}", magnitude.to_latex());
                }
                product_latex(factors)
            }
            Expr::Add(terms) => {
                let mut out = String::new();
                for (i, term) in terms.iter().enumerate() {
                    let (negative, magnitude) = term.split_sign();
                    match (i, negative) {
                        (0, _) => out.push_str(&term.to_latex()),
                        (_, true) => {
                            out.push_str(" - ");
                            out.push_str(&magnitude.to_latex());
                        }
                        (_, false) => {
                            out.push_str(" + ");
                            out.push_str(&term.to_latex());
                        }
                    }
                }
                out
            }
        }
    }
}

impl ToLatex for Transform {
    /// Matrix environment with all four rows
    fn to_latex(&self) -> String {
        let rows: Vec<String> = self
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(ToLatex::to_latex)
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect();
        format!(
            "\\left[\\begin{{matrix}}{}\\end{{matrix}}\\right]",
            rows.join("\\\\")
        )
    }
}

/// Report of every joint transform followed by the composite transform
///
/// Each joint gets a `Name:` heading line; the composite comes last without
/// a heading.
pub fn render_chain(chain: &Chain) -> String {
    let mut out = String::new();
    for joint in chain.joints() {
        out.push_str(&format!(
            "{}:\n{}\n\n",
            capitalize(joint.name()),
            joint.transform().to_latex()
        ));
    }
    out.push_str(&chain.end_effector().to_latex());
    out.push('\n');
    out
}

fn function_latex(name: &str, arg: &Expr, power: usize) -> String {
    if power > 1 {
        format!("\\{}^{{{}}}{{\\left({} \\right)}}", name, power, arg.to_latex())
    } else {
        format!("\\{}{{\\left({} \\right)}}", name, arg.to_latex())
    }
}

fn product_latex(factors: &[Expr]) -> String {
    let mut parts = Vec::new();
    let mut i = 0;
    while i < factors.len() {
        // Sorted factors keep repeats adjacent.
        let factor = &factors[i];
        let power = factors[i..].iter().take_while(|f| *f == factor).count();
        parts.push(match factor {
            Expr::Sin(arg) => function_latex("sin", arg, power),
            Expr::Cos(arg) => function_latex("cos", arg, power),
            Expr::Add(_) => with_power(format!("\\left({}\\right)", factor.to_latex()), power),
            _ => with_power(factor.to_latex(), power),
        });
        i += power;
    }
    parts.join(" ")
}

fn with_power(base: String, power: usize) -> String {
    if power > 1 {
        format!("{}^{{{}}}", base, power)
    } else {
        base
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
