//! The provisioning session
//!
//! Everything an operation needs (where to install, what to install from,
//! whether to force, where diagnostics go) travels in one explicit value.

use pyembed_config::{constants, Config, RestrictionPolicy};
use pyembed_errors::Error;
use pyembed_events::{EventEmitter, EventSender};
use pyembed_net::{NetClient, NetConfig};
use pyembed_platform::{CommandOutcome, Platform};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::layout::RuntimeLayout;
use crate::source::{source_from_config, ArchiveSource, RetrieveContext};

/// Session object passed by reference into every provisioning operation
#[derive(Clone)]
pub struct ProvisionContext {
    install_root: PathBuf,
    directory_name: Option<String>,
    source: Arc<dyn ArchiveSource>,
    force: bool,
    restriction: RestrictionPolicy,
    layout: RuntimeLayout,
    bootstrap_url: String,
    client: NetClient,
    platform: Arc<Platform>,
    cancel: CancellationToken,
    event_sender: Option<EventSender>,
}

impl ProvisionContext {
    /// Create a context with default settings for everything but the
    /// install root and the archive source
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(install_root: impl Into<PathBuf>, source: Arc<dyn ArchiveSource>) -> Result<Self, Error> {
        Ok(Self {
            install_root: install_root.into(),
            directory_name: None,
            source,
            force: false,
            restriction: RestrictionPolicy::default(),
            layout: RuntimeLayout::default(),
            bootstrap_url: constants::DEFAULT_BOOTSTRAP_URL.to_string(),
            client: NetClient::with_defaults()?,
            platform: Arc::new(Platform::current()),
            cancel: CancellationToken::new(),
            event_sender: None,
        })
    }

    /// Build a context from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no install root can be determined, the source
    /// descriptor is invalid, or the HTTP client cannot be created.
    pub fn from_config(config: &Config, event_sender: Option<EventSender>) -> Result<Self, Error> {
        let source = source_from_config(&config.runtime.source)?;
        let mut ctx = Self::new(config.install_root()?, source)?
            .with_force(config.runtime.force)
            .with_restriction_policy(config.runtime.restriction_file)
            .with_layout(RuntimeLayout::from(&config.layout))
            .with_bootstrap_url(config.package_manager.bootstrap_url.clone())
            .with_client(NetClient::new(NetConfig::from(&config.network))?);
        ctx.directory_name.clone_from(&config.runtime.directory_name);
        ctx.event_sender = event_sender;
        Ok(ctx)
    }

    #[must_use]
    pub fn with_directory_name(mut self, name: impl Into<String>) -> Self {
        self.directory_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn with_restriction_policy(mut self, policy: RestrictionPolicy) -> Self {
        self.restriction = policy;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: RuntimeLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_bootstrap_url(mut self, url: impl Into<String>) -> Self {
        self.bootstrap_url = url.into();
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: NetClient) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Arc::new(platform);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Set the event sender for progress reporting
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// Directory name of the distribution home: the override if set,
    /// otherwise the source's archive name without extension
    #[must_use]
    pub fn directory_name(&self) -> String {
        self.directory_name
            .clone()
            .unwrap_or_else(|| self.source.distribution_name())
    }

    /// `install_root / directory_name`
    #[must_use]
    pub fn home(&self) -> PathBuf {
        self.install_root.join(self.directory_name())
    }

    #[must_use]
    pub fn executable(&self) -> PathBuf {
        self.layout.executable(&self.home())
    }

    #[must_use]
    pub fn source(&self) -> &Arc<dyn ArchiveSource> {
        &self.source
    }

    #[must_use]
    pub fn force(&self) -> bool {
        self.force
    }

    #[must_use]
    pub fn restriction_policy(&self) -> RestrictionPolicy {
        self.restriction
    }

    #[must_use]
    pub fn layout(&self) -> &RuntimeLayout {
        &self.layout
    }

    #[must_use]
    pub fn bootstrap_url(&self) -> &str {
        &self.bootstrap_url
    }

    #[must_use]
    pub fn client(&self) -> &NetClient {
        &self.client
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn retrieve_context(&self, force: bool) -> RetrieveContext<'_> {
        RetrieveContext {
            force,
            client: &self.client,
            cancel: &self.cancel,
            events: self.event_sender.as_ref(),
        }
    }

    /// Run a shell command with the distribution home as working directory.
    ///
    /// Output lines and a non-zero exit status are reported as events; this
    /// never fails.
    pub async fn run_command(&self, command_line: &str) -> CommandOutcome {
        let home = self.home();
        let cwd = home.is_dir().then_some(home.as_path());
        let platform_ctx = self.platform.create_context(self.event_sender.clone());
        self.platform
            .run_command(&platform_ctx, command_line, cwd, &self.cancel)
            .await
    }
}

impl EventEmitter for ProvisionContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl std::fmt::Debug for ProvisionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionContext")
            .field("install_root", &self.install_root)
            .field("directory_name", &self.directory_name)
            .field("source", &self.source.describe())
            .field("force", &self.force)
            .field("restriction", &self.restriction)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RemoteSource;

    fn remote() -> Arc<dyn ArchiveSource> {
        Arc::new(RemoteSource::python_org("3.7.3", "amd64").unwrap())
    }

    #[test]
    fn test_home_defaults_to_distribution_name() {
        let ctx = ProvisionContext::new("/opt/runtimes", remote()).unwrap();
        assert_eq!(
            ctx.home(),
            PathBuf::from("/opt/runtimes/python-3.7.3-embed-amd64")
        );
    }

    #[test]
    fn test_directory_override() {
        let ctx = ProvisionContext::new("/opt/runtimes", remote())
            .unwrap()
            .with_directory_name("py");
        assert_eq!(ctx.home(), PathBuf::from("/opt/runtimes/py"));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.paths.install_root = Some(PathBuf::from("/srv/py"));
        config.runtime.directory_name = Some("embedded".into());
        config.runtime.force = true;
        config.runtime.restriction_file = RestrictionPolicy::Keep;

        let ctx = ProvisionContext::from_config(&config, None).unwrap();
        assert_eq!(ctx.home(), PathBuf::from("/srv/py/embedded"));
        assert!(ctx.force());
        assert_eq!(ctx.restriction_policy(), RestrictionPolicy::Keep);
        assert_eq!(ctx.source().archive_file_name(), "python-3.7.3-embed-amd64.zip");
    }
}
