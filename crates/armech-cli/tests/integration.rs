//! Integration tests for the armech binary

use color_eyre::Result;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use test_log::test;

/// Get the path to the armech binary
fn armech_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_armech"))
}

fn run(args: &[&str]) -> std::io::Result<Output> {
    Command::new(armech_binary()).args(args).output()
}

/// Write a robot description in millimeters and degrees, lifted 1 m off the floor
fn create_test_description(temp_dir: &TempDir) -> std::io::Result<PathBuf> {
    let path = temp_dir.path().join("simple.yaml");
    let description = r#"name: simple-3dof
units:
  length: mm
  angle: deg
base: pedestal
placement:
  translation: [0, 0, 1000]
joints:
  - { type: revolute, a: 0, alpha: 90, d: 0, theta: 0 }
  - { type: revolute, a: 400, alpha: 0, d: 40, theta: 0 }
  - { type: revolute, a: 350, alpha: 0, d: -80, theta: 0 }
"#;
    std::fs::write(&path, description)?;
    Ok(path)
}

fn tool_from_json(stdout: &[u8]) -> Result<Vec<Vec<f64>>> {
    let report: serde_json::Value = serde_json::from_slice(stdout)?;
    Ok(serde_json::from_value(report["tool"].clone())?)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are utf-8")
}

#[test]
fn test_fk_preset_home_pose() -> Result<()> {
    let output = run(&["fk", "--preset", "simple-3dof"])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let tool = tool_from_json(&output.stdout)?;
    assert!((tool[0][3] - 0.75).abs() < 1e-4);
    assert!((tool[1][3] - 0.04).abs() < 1e-4);
    assert!((tool[1][2] + 1.0).abs() < 1e-4);
    assert!((tool[2][1] - 1.0).abs() < 1e-4);
    Ok(())
}

#[test]
fn test_fk_description_world_and_local() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = create_test_description(&temp_dir)?;

    let world = run(&["fk", path_arg(&path), "--q=0,0,0"])?;
    assert!(world.status.success(), "{}", String::from_utf8_lossy(&world.stderr));
    let tool = tool_from_json(&world.stdout)?;
    assert!((tool[2][3] - 1.0).abs() < 1e-9);

    let local = run(&["fk", path_arg(&path), "--q=0,0,0", "--local"])?;
    assert!(local.status.success());
    let tool = tool_from_json(&local.stdout)?;
    assert!(tool[2][3].abs() < 1e-9);
    Ok(())
}

#[test]
fn test_links_yaml_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = create_test_description(&temp_dir)?;

    let output = run(&["links", path_arg(&path), "--q=0.5,-0.25,0.1", "--format", "yaml"])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_yaml::Value = serde_yaml::from_slice(&output.stdout)?;
    assert_eq!(report["robot"].as_str(), Some("simple-3dof"));
    assert_eq!(report["frame"].as_str(), Some("world"));
    assert_eq!(report["links"].as_sequence().map(|links| links.len()), Some(3));
    Ok(())
}

#[test]
fn test_dimension_mismatch_fails() -> Result<()> {
    let output = run(&["fk", "--preset", "simple-3dof", "--q=0.1,0.2"])?;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Expected 3 joint variables, got 2"), "{}", stderr);
    Ok(())
}

#[test]
fn test_invalid_joint_type_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("broken.yaml");
    std::fs::write(&path, "name: broken\njoints:\n  - { type: ball, a: 1 }\n")?;

    let output = run(&["fk", path_arg(&path)])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid joint type 'ball'"));
    Ok(())
}

#[test]
fn test_missing_description_fails() -> Result<()> {
    let output = run(&["fk", "/nonexistent/robot.yaml"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load robot description"));
    Ok(())
}

#[test]
fn test_describe_preset() -> Result<()> {
    let output = run(&["describe", "--preset", "simple-3dof", "--format", "json"])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let description: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(description["name"].as_str(), Some("simple-3dof"));
    assert_eq!(description["units"]["length"].as_str(), Some("millimeters"));
    assert_eq!(description["joints"].as_array().map(|j| j.len()), Some(3));
    Ok(())
}

#[test]
fn test_unsupported_format_fails() -> Result<()> {
    let output = run(&["fk", "--preset", "simple-3dof", "--format", "xml"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported format 'xml'"));
    Ok(())
}
