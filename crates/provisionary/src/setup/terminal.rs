//! Terminal implementation of [`EnvironmentSetup`]

use super::EnvironmentSetup;
use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Input};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Prompts on the terminal and shells out to the `aws` CLI
#[derive(Debug, Clone, Default)]
pub struct TerminalSetup;

impl TerminalSetup {
    pub fn new() -> Self {
        Self
    }
}

impl EnvironmentSetup for TerminalSetup {
    fn ask_profile(&self, default: &str) -> Result<String> {
        let profile = Input::<String>::new()
            .with_prompt("Which AWS profile should we use?")
            .default(default.to_string())
            .interact_text()
            .context("Failed to read AWS profile")?;
        Ok(profile.trim().to_string())
    }

    fn ask_region(&self, default: &str) -> Result<String> {
        let region = Input::<String>::new()
            .with_prompt("Please enter the region of choice for the buckets")
            .default(default.to_string())
            .interact_text()
            .context("Failed to read region")?;
        Ok(region.trim().to_string())
    }

    fn ask_separate_environments(&self, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt("Do you want to create separate buckets for dev/acceptance/production?")
            .default(default)
            .interact()
            .context("Failed to read environment choice")
    }

    fn check_aws_cli(&self) -> Result<()> {
        let output = Command::new("aws")
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .context("The AWS CLI (`aws`) was not found on PATH; install it to configure credentials, or pass --skip-configure")?;

        if !output.status.success() {
            bail!("`aws --version` exited with {}", output.status);
        }

        debug!(
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "Found AWS CLI"
        );
        Ok(())
    }

    fn configure_profile(&self, profile: &str) -> Result<()> {
        info!(
            profile = %profile,
            "The AWS CLI will now ask for credentials. If you have already configured a profile with this name, just press enter a few times"
        );

        let status = Command::new("aws")
            .args(["configure", "--profile", profile])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .context("Failed to run `aws configure`")?;

        if !status.success() {
            bail!("`aws configure --profile {}` exited with {}", profile, status);
        }

        Ok(())
    }
}
