//! Environment setup: profile, region and layout selection
//!
//! Everything that talks to the terminal or shells out to the AWS CLI sits
//! behind [`EnvironmentSetup`], so settings resolution can be tested without
//! a terminal or an AWS account.

mod terminal;

pub use terminal::TerminalSetup;

use anyhow::Result;
use provisionary_common::EnvironmentLayout;
use provisionary_common::defaults::{DEFAULT_PROFILE, DEFAULT_REGION, DEFAULT_SEPARATE_ENVIRONMENTS};
use tracing::{debug, info};

/// Interactive collaborator for choosing AWS settings.
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentSetup {
    /// Ask which AWS profile to use
    fn ask_profile(&self, default: &str) -> Result<String>;

    /// Ask which region to create resources in
    fn ask_region(&self, default: &str) -> Result<String>;

    /// Ask whether dev/acceptance/production get separate resources
    fn ask_separate_environments(&self, default: bool) -> Result<bool>;

    /// Fail if the AWS CLI is not installed
    fn check_aws_cli(&self) -> Result<()>;

    /// Run `aws configure` for `profile`, attached to the terminal
    fn configure_profile(&self, profile: &str) -> Result<()>;
}

/// Answers given up front on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupOptions {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub layout: Option<EnvironmentLayout>,
    /// Do not run `aws configure`
    pub skip_configure: bool,
    /// Accept the default for every question not answered up front
    pub assume_defaults: bool,
}

/// Fully resolved AWS settings for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSetup {
    pub profile: String,
    pub region: String,
    pub layout: EnvironmentLayout,
}

/// Resolve profile, region and layout, prompting for whatever is missing.
///
/// Order matches the interactive flow: profile, credential configuration,
/// region, then layout. `aws configure` is interactive, so it is skipped
/// along with the prompts when defaults are assumed.
pub fn resolve_setup(setup: &impl EnvironmentSetup, options: &SetupOptions) -> Result<ResolvedSetup> {
    let profile = match &options.profile {
        Some(profile) => profile.clone(),
        None if options.assume_defaults => DEFAULT_PROFILE.to_string(),
        None => setup.ask_profile(DEFAULT_PROFILE)?,
    };

    if options.skip_configure || options.assume_defaults {
        debug!(profile = %profile, "Skipping aws configure");
    } else {
        setup.check_aws_cli()?;
        setup.configure_profile(&profile)?;
    }

    let region = match &options.region {
        Some(region) => region.clone(),
        None if options.assume_defaults => DEFAULT_REGION.to_string(),
        None => setup.ask_region(DEFAULT_REGION)?,
    };

    let layout = match options.layout {
        Some(layout) => layout,
        None if options.assume_defaults => EnvironmentLayout::from_separate(DEFAULT_SEPARATE_ENVIRONMENTS),
        None => EnvironmentLayout::from_separate(
            setup.ask_separate_environments(DEFAULT_SEPARATE_ENVIRONMENTS)?,
        ),
    };

    info!(profile = %profile, region = %region, layout = ?layout, "Resolved AWS settings");

    Ok(ResolvedSetup {
        profile,
        region,
        layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use mockall::predicate::eq;

    #[test]
    fn test_prompts_in_order() {
        let mut setup = MockEnvironmentSetup::new();
        let mut seq = Sequence::new();

        setup
            .expect_ask_profile()
            .with(eq("default"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("acme".to_string()));
        setup
            .expect_check_aws_cli()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        setup
            .expect_configure_profile()
            .with(eq("acme"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        setup
            .expect_ask_region()
            .with(eq("eu-west-1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("eu-central-1".to_string()));
        setup
            .expect_ask_separate_environments()
            .with(eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let resolved = resolve_setup(&setup, &SetupOptions::default()).unwrap();

        assert_eq!(
            resolved,
            ResolvedSetup {
                profile: "acme".to_string(),
                region: "eu-central-1".to_string(),
                layout: EnvironmentLayout::Shared,
            }
        );
    }

    #[test]
    fn test_flags_skip_prompts() {
        let mut setup = MockEnvironmentSetup::new();
        setup.expect_ask_profile().never();
        setup.expect_ask_region().never();
        setup.expect_ask_separate_environments().never();
        setup.expect_check_aws_cli().never();
        setup.expect_configure_profile().never();

        let options = SetupOptions {
            profile: Some("ci".to_string()),
            region: Some("us-east-1".to_string()),
            layout: Some(EnvironmentLayout::Separate),
            skip_configure: true,
            assume_defaults: false,
        };
        let resolved = resolve_setup(&setup, &options).unwrap();

        assert_eq!(resolved.profile, "ci");
        assert_eq!(resolved.region, "us-east-1");
        assert_eq!(resolved.layout, EnvironmentLayout::Separate);
    }

    #[test]
    fn test_assume_defaults() {
        let mut setup = MockEnvironmentSetup::new();
        setup.expect_ask_profile().never();
        setup.expect_ask_region().never();
        setup.expect_ask_separate_environments().never();
        // `aws configure` is interactive, so it goes with the prompts
        setup.expect_check_aws_cli().never();
        setup.expect_configure_profile().never();

        let options = SetupOptions {
            assume_defaults: true,
            ..Default::default()
        };
        let resolved = resolve_setup(&setup, &options).unwrap();

        assert_eq!(resolved.profile, "default");
        assert_eq!(resolved.region, "eu-west-1");
        assert_eq!(resolved.layout, EnvironmentLayout::Separate);
    }

    #[test]
    fn test_missing_aws_cli_aborts_before_configure() {
        let mut setup = MockEnvironmentSetup::new();
        setup
            .expect_check_aws_cli()
            .returning(|| Err(anyhow::anyhow!("aws not found")));
        setup.expect_configure_profile().never();
        setup.expect_ask_region().never();

        let options = SetupOptions {
            profile: Some("acme".to_string()),
            ..Default::default()
        };
        let err = resolve_setup(&setup, &options).unwrap_err();
        assert!(err.to_string().contains("aws not found"));
    }
}
