//! Stable label keys and fixed identifiers.
//!
//! Label keys prefixed with `_` are informational and are not meant for grouping.

// Labels: resource identity
pub const LABEL_PROVIDER: &str = "provider";
pub const LABEL_TYPE: &str = "type";
pub const LABEL_GROUP_ID: &str = "group-id";
pub const LABEL_VPC_ID: &str = "_vpc-id";

// Labels: evaluation context
pub const LABEL_POLICY: &str = "_policy";
pub const LABEL_POLICY_PATH: &str = "_policy_path";
pub const LABEL_SERVICE: &str = "service";

/// Keys the pipeline derives from the resource and policy. Configured labels never replace
/// them, so artifact labels always agree with the stream they are published under.
pub const IDENTITY_LABELS: &[&str] = &[
    LABEL_PROVIDER,
    LABEL_TYPE,
    LABEL_GROUP_ID,
    LABEL_VPC_ID,
    LABEL_POLICY,
    LABEL_POLICY_PATH,
];

pub const PROVIDER_AWS: &str = "aws";
pub const RESOURCE_TYPE_SECURITY_GROUP: &str = "security-group";
pub const SERVICE_EC2: &str = "ec2";

// Evidence context
pub const COMPONENT_SECURITY_GROUP: &str = "common-components/amazon-security-group";
pub const INVENTORY_PREFIX_SECURITY_GROUP: &str = "aws-security-group";

pub const ACTOR_PLATFORM_TITLE: &str = "The Continuous Compliance Framework";
pub const ACTOR_PLATFORM_URL: &str = "https://compliance-framework.github.io/docs/";
pub const ACTOR_TOOL_TITLE: &str = "sgaudit - AWS Security Group Evidence";
pub const ACTOR_TOOL_URL: &str = "https://github.com/sgaudit/sgaudit";

/// Default title for an assessment result when the run config has none.
pub const DEFAULT_RESULT_TITLE: &str = "Automated security group assessment";
