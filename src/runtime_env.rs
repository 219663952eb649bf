use std::{borrow::Cow, env, fmt};

const ENVIRONMENT_NAME_ENV: &str = "ENVIRONMENT_NAME";
const DEFAULT_REMOTE_ENVIRONMENT: &str = "Prod";
const DEFAULT_LOCAL_ENVIRONMENT: &str = "Local";

/// URI options for an Amazon DocumentDB replica set.
const REMOTE_URI_OPTIONS: &str =
    "tls=true&replicaSet=rs0&readPreference=secondaryPreferred&retryWrites=false";
/// URI options for a standalone local MongoDB.
const LOCAL_URI_OPTIONS: &str = "directConnection=true&retryWrites=false";
/// CA bundle shipped alongside the function code for DocumentDB TLS.
const REMOTE_CA_BUNDLE: &str = "global-bundle.pem";

#[derive(Debug, Clone, Copy)]
pub enum ResolutionSource {
    ExplicitVar,
    LocalTooling,
    AwsRuntime,
    DefaultLocal,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionSource::ExplicitVar => write!(f, "explicit ENVIRONMENT_NAME"),
            ResolutionSource::LocalTooling => write!(f, "local tooling auto-detect"),
            ResolutionSource::AwsRuntime => write!(f, "AWS runtime auto-detect"),
            ResolutionSource::DefaultLocal => write!(f, "fallback to Local"),
        }
    }
}

/// Connection settings that vary with the deployment environment.
///
/// Deployed functions talk TLS to a DocumentDB replica set through the
/// bundled CA file and always embed credentials in the URI. Local runs talk
/// plain TCP to a standalone MongoDB and only embed credentials when the
/// secret actually carries them.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionProfile {
    uri_options: &'static str,
    ca_bundle: Option<&'static str>,
    require_credentials: bool,
}

impl ConnectionProfile {
    /// Profile for a deployed DocumentDB cluster.
    pub fn docdb() -> Self {
        Self {
            uri_options: REMOTE_URI_OPTIONS,
            ca_bundle: Some(REMOTE_CA_BUNDLE),
            require_credentials: true,
        }
    }

    /// Profile for a local standalone MongoDB.
    pub fn local() -> Self {
        Self {
            uri_options: LOCAL_URI_OPTIONS,
            ca_bundle: None,
            require_credentials: false,
        }
    }

    /// Query options appended to the connection URI.
    pub fn uri_options(&self) -> &'static str {
        self.uri_options
    }

    /// CA file to pin TLS against, when the environment needs one.
    pub fn ca_bundle(&self) -> Option<&'static str> {
        self.ca_bundle
    }

    /// Whether the URI must always carry a credentials segment.
    pub fn require_credentials(&self) -> bool {
        self.require_credentials
    }
}

/// Encapsulates the deployment environment (Prod, Staging, Local, ...).
///
/// The detection order is:
///  1. Explicit `ENVIRONMENT_NAME` (set via deployment config, CI, or CLI)
///  2. Local tooling hints (`cargo lambda watch`, SAM local, LocalStack)
///  3. AWS Lambda runtime heuristics
///  4. Default to `Local`
pub struct DeploymentEnv {
    name: Cow<'static, str>,
    source: ResolutionSource,
}

impl DeploymentEnv {
    pub fn detect() -> Self {
        if let Some(explicit) = Self::explicit_override() {
            return explicit;
        }
        if Self::running_locally() {
            return Self::local(ResolutionSource::LocalTooling);
        }
        if Self::running_on_aws() {
            return Self::remote(ResolutionSource::AwsRuntime);
        }
        Self::local(ResolutionSource::DefaultLocal)
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn source(&self) -> ResolutionSource {
        self.source
    }

    pub fn is_local(&self) -> bool {
        self.name.eq_ignore_ascii_case(DEFAULT_LOCAL_ENVIRONMENT)
    }

    /// Connection settings appropriate for this environment.
    pub fn connection_profile(&self) -> ConnectionProfile {
        if self.is_local() {
            ConnectionProfile::local()
        } else {
            ConnectionProfile::docdb()
        }
    }

    fn explicit_override() -> Option<Self> {
        env::var(ENVIRONMENT_NAME_ENV).ok().and_then(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Self {
                    name: Cow::Owned(trimmed.to_owned()),
                    source: ResolutionSource::ExplicitVar,
                })
            }
        })
    }

    fn running_locally() -> bool {
        env::var_os("AWS_SAM_LOCAL").is_some()
            || env::var_os("CARGO_LAMBDA_HTTP_PORT").is_some()
            || env::var_os("LOCALSTACK_HOSTNAME").is_some()
    }

    fn running_on_aws() -> bool {
        env::var_os("AWS_EXECUTION_ENV").is_some()
            || env::var_os("AWS_REGION").is_some()
            || env::var_os("AWS_LAMBDA_FUNCTION_NAME").is_some()
            || env::var_os("LAMBDA_TASK_ROOT").is_some()
    }

    fn remote(source: ResolutionSource) -> Self {
        Self {
            name: Cow::Borrowed(DEFAULT_REMOTE_ENVIRONMENT),
            source,
        }
    }

    fn local(source: ResolutionSource) -> Self {
        Self {
            name: Cow::Borrowed(DEFAULT_LOCAL_ENVIRONMENT),
            source,
        }
    }
}
