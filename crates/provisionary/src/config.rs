//! Configuration types for a provisioning run

use crate::provision::ProvisionPlan;
use crate::setup::ResolvedSetup;
use provisionary_common::EnvironmentLayout;

/// AWS connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Named profile credentials are read from
    pub profile: String,
    /// Region buckets are created in
    pub region: String,
}

/// What to provision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// Base resource name; each environment appends its suffix
    pub base_name: String,
    pub layout: EnvironmentLayout,
}

/// Runtime behavior flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeFlags {
    /// Delete everything created once the run finishes
    pub cleanup: bool,
    /// Accepted for compatibility; CloudFront is not provisioned
    pub cloudfront: bool,
}

/// Configuration for a provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub aws: AwsConfig,
    pub provision: ProvisionConfig,
    pub flags: RuntimeFlags,
}

impl RunConfig {
    /// Combine command line values with the resolved AWS settings.
    pub fn new(base_name: String, setup: ResolvedSetup, flags: RuntimeFlags) -> Self {
        Self {
            aws: AwsConfig {
                profile: setup.profile,
                region: setup.region,
            },
            provision: ProvisionConfig {
                base_name,
                layout: setup.layout,
            },
            flags,
        }
    }

    pub fn plan(&self) -> ProvisionPlan {
        ProvisionPlan {
            base_name: self.provision.base_name.clone(),
            layout: self.provision.layout,
            cleanup_requested: self.flags.cleanup,
        }
    }

    pub fn region(&self) -> &str {
        &self.aws.region
    }

    pub fn profile(&self) -> &str {
        &self.aws.profile
    }
}
