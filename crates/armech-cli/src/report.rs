//! Pose reports printed by the CLI

use armech::transform::to_rows;
use armech::{Frame, SerialLink};
use color_eyre::{Result, eyre::Context};
use serde::{Deserialize, Serialize};

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl ReportFormat {
    /// Parse a format name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "json" => Some(ReportFormat::Json),
            "yaml" | "yml" => Some(ReportFormat::Yaml),
            _ => None,
        }
    }

    /// Render any serializable report in this format
    pub fn render<T: Serialize>(self, report: &T) -> Result<String> {
        match self {
            ReportFormat::Json => {
                serde_json::to_string_pretty(report).wrap_err("Failed to serialize report to JSON")
            }
            ReportFormat::Yaml => {
                serde_yaml::to_string(report).wrap_err("Failed to serialize report to YAML")
            }
        }
    }
}

/// Frame name as written in reports
fn frame_name(frame: Frame) -> &'static str {
    match frame {
        Frame::Local => "local",
        Frame::World => "world",
    }
}

/// Tool pose for one joint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolReport {
    pub robot: String,
    pub frame: String,
    pub q: Vec<f64>,
    /// Row-major homogeneous transform
    pub tool: [[f64; 4]; 4],
}

impl ToolReport {
    pub fn new(robot: &str, chain: &SerialLink, q: &[f64], frame: Frame) -> Result<Self> {
        let tool = chain
            .tool_transform(q, frame)
            .wrap_err("Failed to compute tool pose")?;

        Ok(Self {
            robot: robot.to_string(),
            frame: frame_name(frame).to_string(),
            q: q.to_vec(),
            tool: to_rows(&tool),
        })
    }
}

/// Pose of one joint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkReport {
    pub index: usize,
    pub joint_type: String,
    pub pose: [[f64; 4]; 4],
}

/// Every joint pose and the tool pose for one joint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinksReport {
    pub robot: String,
    pub frame: String,
    pub q: Vec<f64>,
    pub links: Vec<LinkReport>,
    pub tool: [[f64; 4]; 4],
}

impl LinksReport {
    pub fn new(robot: &str, chain: &SerialLink, q: &[f64], frame: Frame) -> Result<Self> {
        let poses = chain
            .link_transforms(q, frame)
            .wrap_err("Failed to compute link poses")?;
        let tool = chain.tool_transform(q, frame)?;

        let links = chain
            .links()
            .iter()
            .zip(&poses)
            .enumerate()
            .map(|(index, (link, pose))| LinkReport {
                index,
                joint_type: link.joint_type().as_str().to_string(),
                pose: to_rows(pose),
            })
            .collect();

        Ok(Self {
            robot: robot.to_string(),
            frame: frame_name(frame).to_string(),
            q: q.to_vec(),
            links,
            tool: to_rows(&tool),
        })
    }
}
