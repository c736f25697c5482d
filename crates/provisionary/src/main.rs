//! provisionary: S3 buckets and scoped IAM users per environment
//!
//! Creates a bucket, a policy granting access to it, and a user holding that
//! policy for each environment, removing everything again when a step fails
//! or `--cleanup` is passed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use provisionary::aws::{AwsContext, FromAwsContext, IamClient, S3Client};
use provisionary::config::{RunConfig, RuntimeFlags};
use provisionary::policy::PolicyTemplate;
use provisionary::provision::{self, CleanupReason, Provisioner, RunSummary};
use provisionary::setup::{SetupOptions, TerminalSetup, resolve_setup};
use provisionary_common::EnvironmentLayout;
use provisionary_common::defaults::DEFAULT_POLICY_TEMPLATE;
use provisionary_common::environment::validate_base_name;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "provisionary")]
#[command(about = "Provision S3 buckets with scoped IAM users per environment")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// Arguments for the s3 command
#[derive(clap::Args, Debug)]
struct S3Args {
    /// Base name; environments are suffixed with -dev, -acceptance and -production
    name: String,

    /// Also set up CloudFront (not supported, ignored)
    #[arg(long)]
    cloudfront: bool,

    /// Delete everything that was created once the run finishes
    #[arg(long)]
    cleanup: bool,

    /// AWS profile to use (prompted for if not given)
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// AWS region (prompted for if not given)
    #[arg(long)]
    region: Option<String>,

    /// Provision a single shared environment
    #[arg(long, conflicts_with = "separate")]
    shared: bool,

    /// Provision separate dev, acceptance and production environments
    #[arg(long)]
    separate: bool,

    /// IAM policy template; every {BUCKET_NAME} is replaced with the bucket name
    #[arg(long, default_value = DEFAULT_POLICY_TEMPLATE)]
    policy_template: PathBuf,

    /// Don't run `aws configure` for the profile
    #[arg(long)]
    skip_configure: bool,

    /// Accept defaults instead of prompting
    #[arg(short, long)]
    yes: bool,
}

impl S3Args {
    fn layout(&self) -> Option<EnvironmentLayout> {
        match (self.shared, self.separate) {
            (true, _) => Some(EnvironmentLayout::Shared),
            (_, true) => Some(EnvironmentLayout::Separate),
            _ => None,
        }
    }

    fn setup_options(&self) -> SetupOptions {
        SetupOptions {
            profile: self.profile.clone(),
            region: self.region.clone(),
            layout: self.layout(),
            skip_configure: self.skip_configure,
            assume_defaults: self.yes,
        }
    }

    fn flags(&self) -> RuntimeFlags {
        RuntimeFlags {
            cleanup: self.cleanup,
            cloudfront: self.cloudfront,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a bucket, policy and user for each environment
    S3(Box<S3Args>),
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env()
        .context("Invalid RUST_LOG filter")?
        // SDK credential and retry chatter
        .add_directive("aws_config=warn".parse()?)
        .add_directive("aws_smithy_runtime=warn".parse()?);

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Returns the process exit status of the run.
async fn run() -> Result<u8> {
    let args = Args::parse();
    init_tracing()?;

    match args.command {
        Command::S3(s3_args) => handle_s3(*s3_args).await,
    }
}

/// Handle the s3 command
async fn handle_s3(args: S3Args) -> Result<u8> {
    // Everything that can be rejected without AWS is checked before prompting
    validate_base_name(&args.name)?;
    let template = PolicyTemplate::load(&args.policy_template)?;

    let setup = resolve_setup(&TerminalSetup::new(), &args.setup_options())?;
    let flags = args.flags();
    let config = RunConfig::new(args.name, setup, flags);

    if config.flags.cloudfront {
        warn!("CloudFront is not supported, ignoring --cloudfront");
    }

    info!(
        base_name = %config.provision.base_name,
        profile = %config.profile(),
        region = %config.region(),
        layout = ?config.provision.layout,
        template = %template.path().display(),
        cleanup = config.flags.cleanup,
        "Starting provisioning run"
    );

    let aws = AwsContext::with_profile(config.region(), Some(config.profile())).await;
    debug!(
        profile = aws.profile().unwrap_or("default chain"),
        region = %aws.region(),
        "Loaded AWS configuration"
    );
    let s3 = S3Client::from_context(&aws);
    let iam = IamClient::from_context(&aws);
    let provisioner = Provisioner::new(&s3, &iam, &template);

    let summary = provision::run(&provisioner, &config.plan()).await;
    print_summary(&summary);

    Ok(summary.exit_code())
}

fn print_summary(summary: &RunSummary) {
    println!("\nProvisioned resources:");
    println!("{:<12} {:<40} {:<10}", "TYPE", "NAME", "ATTACHED");
    println!("{}", "-".repeat(64));
    for bucket in &summary.ledger.buckets {
        println!("{:<12} {:<40} {:<10}", "bucket", bucket, "-");
    }
    for policy in &summary.ledger.policies {
        println!("{:<12} {:<40} {:<10}", "policy", policy.arn, "-");
    }
    for user in &summary.ledger.users {
        let attached = if user.attached_policy_arn.is_some() {
            "yes"
        } else {
            "no"
        };
        println!("{:<12} {:<40} {:<10}", "user", user.name, attached);
    }

    if !summary.failures.is_empty() {
        println!("\nFailed calls:");
        for failure in &summary.failures {
            println!("  {failure}");
            if let Some(hint) = failure.kind.suggestion() {
                println!("    hint: {hint}");
            }
        }
    }

    if let Some((reason, report)) = &summary.cleanup {
        let reason = match reason {
            CleanupReason::Requested => "requested",
            CleanupReason::ProvisioningFailed => "provisioning failed",
        };
        println!("\nCleanup ({reason}):");
        println!("  Attachments: {}", report.attachments);
        println!("  Users:       {}", report.users);
        println!("  Policies:    {}", report.policies);
        println!("  Buckets:     {}", report.buckets);
        println!(
            "  Deleted: {}, already deleted: {}, skipped: {}, failed: {}",
            report.deleted, report.already_deleted, report.skipped, report.failed
        );
        if !report.is_clean() {
            println!("  Some resources could not be removed; check the log above.");
        }
    }
}
