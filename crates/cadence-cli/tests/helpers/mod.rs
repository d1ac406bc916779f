use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("cadence").expect("Failed to find cadence binary");

        // Run inside the temp dir so no stray config.toml is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("CADENCE_DATABASE_PATH", &self.db_path);
        cmd.env("TZ", "UTC");
        cmd.env_remove("RUST_LOG");

        cmd
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert a client error (exit status 2)
    pub fn run_client_error(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure().code(2)
    }

    /// Run a command with `--json` and parse its stdout
    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .command()
            .args(args)
            .arg("--json")
            .output()
            .expect("Failed to run cadence");
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON")
    }

    /// Creates the fixture schedule and returns its id
    pub fn create_water_plants(&self) -> String {
        self.run_success(&TestFixtures::water_plants_args());
        let schedules = self.run_json(&["list"]);
        schedules[0]["id"].as_str().expect("schedule id").to_string()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Daily at 09:00 UTC from Jan 1 to Jan 5 2025
    pub fn water_plants_args() -> Vec<&'static str> {
        vec![
            "create", "Water plants",
            "--start", "2025-01-01",
            "--end", "2025-01-05",
            "--every", "daily",
            "--at", "09:00",
        ]
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use super::*;

    /// Predicate to check if output indicates successful schedule creation
    pub fn schedule_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("✓").and(predicate::str::contains("Created schedule"))
    }

    /// Predicate to check for error output
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
