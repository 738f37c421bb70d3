//! Armech CLI - forward kinematics for serial-link robot arms
//!
//! Loads a robot description (a DH table in YAML) or a built-in preset and
//! prints link and tool poses for a joint configuration.

mod report;

use armech::{Frame, RobotDescription, SerialLink, presets};
use clap::{Args, Parser, Subcommand};
use color_eyre::{Result, eyre::Context, eyre::eyre};
use report::{LinksReport, ReportFormat, ToolReport};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Parser)]
#[command(
    name = "armech",
    about = "Serial-link robot forward kinematics",
    long_about = "Compute link and tool poses of a Denavit-Hartenberg robot arm for a joint configuration"
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tool pose for a joint configuration
    Fk {
        #[command(flatten)]
        robot: RobotArgs,
        #[command(flatten)]
        pose: PoseArgs,
    },
    /// Print every link pose and the tool pose for a joint configuration
    Links {
        #[command(flatten)]
        robot: RobotArgs,
        #[command(flatten)]
        pose: PoseArgs,
    },
    /// Print the robot description
    Describe {
        #[command(flatten)]
        robot: RobotArgs,
        /// Output format (json, yaml)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },
}

#[derive(Args)]
struct RobotArgs {
    /// Path to a robot description file
    #[arg(required_unless_present = "preset")]
    path: Option<PathBuf>,
    /// Built-in robot instead of a description file (simple-3dof)
    #[arg(long, conflicts_with = "path")]
    preset: Option<String>,
}

#[derive(Args)]
struct PoseArgs {
    /// Comma separated joint variables (radians or meters), zeros when omitted
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    q: Vec<f64>,
    /// Express poses relative to the robot base instead of the world
    #[arg(long)]
    local: bool,
    /// Output format (json, yaml)
    #[arg(short, long, default_value = "json")]
    format: String,
}

fn main() {
    let cli = Cli::parse();

    install_tracing(cli.verbose);
    if let Err(error) = color_eyre::install() {
        eprintln!("Failed to install color-eyre: {error}");
    }

    let result = match cli.command {
        Commands::Fk { robot, pose } => print_tool_pose(robot, pose),
        Commands::Links { robot, pose } => print_link_poses(robot, pose),
        Commands::Describe { robot, format } => print_description(robot, format),
    };

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        std::process::exit(1);
    }
}

fn install_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_error::ErrorLayer::default())
        .init();
}

fn load_description(robot: &RobotArgs) -> Result<RobotDescription> {
    match (&robot.path, &robot.preset) {
        (Some(path), _) => RobotDescription::from_file(path)
            .wrap_err_with(|| format!("Failed to load robot description {}", path.display())),
        (None, Some(preset)) => preset_description(preset),
        (None, None) => Err(eyre!("Either a description path or --preset is required")),
    }
}

fn preset_description(name: &str) -> Result<RobotDescription> {
    match name {
        "simple-3dof" | "simple3dof" => Ok(presets::simple_3dof_description()),
        other => Err(eyre!(
            "Unknown preset '{}'. Available presets: simple-3dof",
            other
        )),
    }
}

fn load_chain(robot: &RobotArgs) -> Result<(RobotDescription, SerialLink)> {
    let description = load_description(robot)?;
    let chain = description
        .to_chain()
        .wrap_err_with(|| format!("Invalid robot description '{}'", description.name))?;
    tracing::info!(robot = %description.name, dof = chain.dof(), "robot loaded");
    Ok((description, chain))
}

fn joint_values(chain: &SerialLink, q: Vec<f64>) -> Vec<f64> {
    if q.is_empty() {
        vec![0.0; chain.dof()]
    } else {
        q
    }
}

fn frame(local: bool) -> Frame {
    if local { Frame::Local } else { Frame::World }
}

fn parse_format(format: &str) -> Result<ReportFormat> {
    ReportFormat::from_name(format).ok_or_else(|| {
        eyre!(
            "Unsupported format '{}'. Supported formats: json, yaml",
            format
        )
    })
}

fn print_tool_pose(robot: RobotArgs, pose: PoseArgs) -> Result<()> {
    let format = parse_format(&pose.format)?;
    let (description, chain) = load_chain(&robot)?;
    let q = joint_values(&chain, pose.q);

    let report = ToolReport::new(&description.name, &chain, &q, frame(pose.local))?;
    println!("{}", format.render(&report)?);
    Ok(())
}

fn print_link_poses(robot: RobotArgs, pose: PoseArgs) -> Result<()> {
    let format = parse_format(&pose.format)?;
    let (description, chain) = load_chain(&robot)?;
    let q = joint_values(&chain, pose.q);

    let report = LinksReport::new(&description.name, &chain, &q, frame(pose.local))?;
    println!("{}", format.render(&report)?);
    Ok(())
}

fn print_description(robot: RobotArgs, format: String) -> Result<()> {
    let format = parse_format(&format)?;
    let description = load_description(&robot)?;
    description.validate()?;

    println!("{}", format.render(&description)?);

    eprintln!();
    eprintln!("=== Robot Summary ===");
    eprintln!("Robot: {}", description.name);
    if let Some(base) = &description.base {
        eprintln!("Base: {}", base);
    }
    eprintln!("Joints: {}", description.joints.len());
    for (index, joint) in description.joints.iter().enumerate() {
        eprintln!(
            "  {}: {} (a: {}, alpha: {}, d: {}, theta: {})",
            index, joint.joint_type, joint.a, joint.alpha, joint.d, joint.theta
        );
    }
    eprintln!();
    Ok(())
}
