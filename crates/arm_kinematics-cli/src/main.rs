//! arm-fk - Symbolic forward kinematics for a four-joint arm
//!
//! Prints each joint's homogeneous transform and the base to end-effector
//! transform as LaTeX, then plots the end-effector path while one joint
//! sweeps its range.

mod config;
mod plot;

use std::path::PathBuf;

use arm_kinematics::{
    Chain, Hold, JointKind, PathSweep, Plane, build_chain, render_chain, sample_path,
};
use clap::Parser;
use color_eyre::{Result, eyre::WrapErr};

use config::Config;

#[derive(Parser)]
#[command(
    name = "arm-fk",
    version,
    about = "Symbolic forward kinematics for a robot arm",
    long_about = "Print the LaTeX form of every joint transform and of the base to end-effector transform, then plot the end-effector path as one joint sweeps its range"
)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Length of the wrist link in meters
    #[arg(long)]
    arm_length: Option<f64>,
    /// Joint to sweep (turret, elevator, elbow, wrist)
    #[arg(long, value_name = "JOINT")]
    sweep: Option<String>,
    /// Sweep start; degrees, or meters for the elevator
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    from: Option<f64>,
    /// Sweep end; degrees, or meters for the elevator
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    to: Option<f64>,
    /// Number of samples along the sweep
    #[arg(long)]
    samples: Option<usize>,
    /// Projection plane (xy, xz, yz)
    #[arg(long)]
    plane: Option<Plane>,
    /// Value of the joints that are not swept (zero, symbolic)
    #[arg(long)]
    hold: Option<Hold>,
    /// Output file for the path figure
    #[arg(short = 'o', long = "plot", value_name = "FILE")]
    plot: Option<PathBuf>,
    /// Skip the path figure
    #[arg(long)]
    no_plot: bool,
    /// Level of verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(arm_length) = self.arm_length {
            config.arm.arm_length = arm_length;
        }
        if let Some(joint) = &self.sweep {
            config.sweep.joint = joint.clone();
        }
        if let Some(from) = self.from {
            config.sweep.from = from;
        }
        if let Some(to) = self.to {
            config.sweep.to = to;
        }
        if let Some(samples) = self.samples {
            config.sweep.samples = samples;
        }
        if let Some(plane) = self.plane {
            config.sweep.plane = plane;
        }
        if let Some(hold) = self.hold {
            config.sweep.hold = hold;
        }
        if let Some(output) = &self.plot {
            config.plot.output = output.clone();
        }
        if self.no_plot {
            config.plot.enabled = false;
        }
    }
}

fn main() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .capture_span_trace_by_default(true)
        .display_location_section(true)
        .display_env_section(false)
        .install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    log::trace!("{:#?}", config);

    run(&config)
}

fn init_logging(verbose: u8) -> Result<()> {
    let mut log_config = simplelog::ConfigBuilder::new();
    log_config.set_time_level(log::LevelFilter::Off);
    log_config.set_thread_level(log::LevelFilter::Off);
    log_config.set_target_level(log::LevelFilter::Off);
    log_config.set_location_level(log::LevelFilter::Off);

    let log_level = match verbose {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // Stdout carries the LaTeX report, so log records go to stderr.
    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

fn run(config: &Config) -> Result<()> {
    let chain = build_chain(&config.arm);
    print!("{}", render_chain(&chain));

    if !config.plot.enabled {
        log::info!("Path plot disabled");
        return Ok(());
    }

    let sweep = build_sweep(&chain, config)?;
    let path = sample_path(&chain.end_effector(), &sweep)
        .wrap_err_with(|| format!("Failed to sample the {} sweep", config.sweep.joint))?;

    let caption = format!(
        "End-effector path: {} from {} to {}",
        config.sweep.joint, config.sweep.from, config.sweep.to
    );
    plot::draw_path(&path, &config.plot, &caption)
        .wrap_err_with(|| format!("Failed to write plot to {}", config.plot.output.display()))?;

    eprintln!("Plot saved to: {}", config.plot.output.display());
    Ok(())
}

fn build_sweep(chain: &Chain, config: &Config) -> Result<PathSweep> {
    let joint = chain
        .joint(&config.sweep.joint)
        .wrap_err("Cannot sweep the requested joint")?;
    let (from, to) = (config.sweep.from, config.sweep.to);

    let sweep = PathSweep::new(joint.variable().clone())
        .with_samples(config.sweep.samples)
        .with_plane(config.sweep.plane)
        .hold_others(&chain.variables(), config.sweep.hold);
    let sweep = match joint.kind() {
        JointKind::Prismatic { .. } => sweep.with_domain(from, to),
        JointKind::Revolute { .. } => sweep.with_domain_degrees(from, to),
    };

    let (start, end) = sweep.domain();
    if !joint.is_within_limits(start) || !joint.is_within_limits(end) {
        log::warn!(
            "Sweep [{:.4}, {:.4}] exceeds the limits of joint '{}'",
            start,
            end,
            joint.name()
        );
    }
    Ok(sweep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "arm-fk",
            "--arm-length",
            "0.8",
            "--sweep",
            "wrist",
            "--from",
            "-45",
            "--to",
            "30",
            "--plane",
            "xz",
            "--hold",
            "symbolic",
            "--no-plot",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.arm.arm_length, 0.8);
        assert_eq!(config.sweep.joint, "wrist");
        assert_eq!(config.sweep.from, -45.0);
        assert_eq!(config.sweep.to, 30.0);
        assert_eq!(config.sweep.plane, Plane::XZ);
        assert_eq!(config.sweep.hold, Hold::Symbolic);
        assert!(!config.plot.enabled);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["arm-fk"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_build_sweep_units() -> Result<()> {
        let chain = build_chain(&Default::default());
        let mut config = Config::default();

        let sweep = build_sweep(&chain, &config)?;
        assert_eq!(sweep.variable().name(), "theta_1");
        assert!((sweep.domain().1 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        config.sweep.joint = "elevator".to_string();
        config.sweep.from = 0.0;
        config.sweep.to = 0.3;
        let sweep = build_sweep(&chain, &config)?;
        assert_eq!(sweep.domain(), (0.0, 0.3));

        config.sweep.joint = "gripper".to_string();
        assert!(build_sweep(&chain, &config).is_err());

        Ok(())
    }
}
