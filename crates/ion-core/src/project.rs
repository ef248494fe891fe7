//! Project resolution: entry point, workspace and evaluated configuration

use crate::config::{RemovalPolicy, ResolvedConfig};
use crate::error::ResolveError;
use crate::locator;
use crate::product::ProductConfig;
use crate::protocol::{self, EvaluationRequest};
use crate::runtime::{detect_runtime, EvalChannel, EvalError, ProcessChannel};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a project lives on disk
///
/// Produced by [`prepare`] once the entry point has been found and the
/// workspace directory exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    config: PathBuf,
    workspace_dir_name: String,
}

impl ProjectLayout {
    /// Path of the configuration script
    pub fn config(&self) -> &Path {
        &self.config
    }

    /// Directory containing the configuration script
    pub fn root(&self) -> &Path {
        // find_up always returns a file inside some directory
        self.config.parent().unwrap_or(&self.config)
    }

    /// Project-local directory for intermediate artifacts
    pub fn workspace(&self) -> PathBuf {
        self.root().join(&self.workspace_dir_name)
    }
}

/// Locate the entry point from `start_dir` and make sure the workspace exists
pub async fn prepare<C: ProductConfig>(
    config: &C,
    start_dir: &Path,
) -> Result<ProjectLayout, ResolveError> {
    let entry = locator::find_up(start_dir, config.config_file_name())?;
    debug!("found {}", entry.display());

    let layout = ProjectLayout {
        config: entry,
        workspace_dir_name: config.workspace_dir_name().to_string(),
    };
    ensure_dir(&layout.workspace()).await?;
    Ok(layout)
}

async fn ensure_dir(path: &Path) -> Result<(), ResolveError> {
    let io_err = |source| ResolveError::WorkspaceIo {
        path: path.to_path_buf(),
        source,
    };

    match tokio::fs::metadata(path).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            match tokio::fs::create_dir(path).await {
                Ok(()) => {
                    debug!("created {}", path.display());
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
                Err(e) => Err(io_err(e)),
            }
        }
        Err(e) => Err(io_err(e)),
    }
}

/// Evaluate the entry point through `channel` and build the project handle.
///
/// The channel is borrowed, not owned; closing it is up to the caller.
pub async fn resolve<'c, E>(
    layout: ProjectLayout,
    channel: &'c mut E,
    version: &str,
) -> Result<ProjectHandle<'c, E>, ResolveError>
where
    E: EvalChannel + ?Sized,
{
    let request = EvaluationRequest::new(layout.config());
    channel
        .submit(&layout.workspace(), &request.source())
        .await?;

    let config = protocol::read_config(&mut *channel).await?;
    info!(
        "resolved project {} ({}, removal policy {})",
        config.name(),
        config.region(),
        config.removal_policy()
    );

    Ok(ProjectHandle {
        version: version.to_string(),
        layout,
        config,
        channel,
    })
}

/// Resolve the project around `start_dir` in one call.
///
/// Finds the entry point, prepares the workspace, detects a runtime
/// (`runtime` forces one), evaluates the configuration and closes the
/// session again.
pub async fn resolve_project<C: ProductConfig>(
    config: &C,
    start_dir: &Path,
    runtime: Option<&str>,
    version: &str,
) -> Result<ResolvedProject, ResolveError> {
    resolve_with(config, start_dir, version, |layout| {
        let info = detect_runtime(config, runtime)?;
        ProcessChannel::start(layout.root(), info.runtime)
    })
    .await
}

/// Like [`resolve_project`], with the channel opened by `open` once the
/// layout is known. The channel is closed before returning; a resolution
/// error wins over a close error.
pub async fn resolve_with<C, E, F>(
    config: &C,
    start_dir: &Path,
    version: &str,
    open: F,
) -> Result<ResolvedProject, ResolveError>
where
    C: ProductConfig,
    E: EvalChannel,
    F: FnOnce(&ProjectLayout) -> Result<E, EvalError>,
{
    let layout = prepare(config, start_dir).await?;
    let mut channel = open(&layout)?;

    let resolved = resolve(layout, &mut channel, version)
        .await
        .map(ProjectHandle::detach);
    let closed = channel.close().await;

    let project = resolved?;
    closed?;
    Ok(project)
}

/// A resolved project whose evaluation session has ended
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    version: String,
    layout: ProjectLayout,
    config: ResolvedConfig,
}

impl ResolvedProject {
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn path_root(&self) -> &Path {
        self.layout.root()
    }

    pub fn path_config(&self) -> &Path {
        self.layout.config()
    }

    pub fn path_temp(&self) -> PathBuf {
        self.layout.workspace()
    }
}

/// A resolved project
pub struct ProjectHandle<'c, E: EvalChannel + ?Sized> {
    version: String,
    layout: ProjectLayout,
    config: ResolvedConfig,
    channel: &'c mut E,
}

impl<'c, E: EvalChannel + ?Sized> ProjectHandle<'c, E> {
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn region(&self) -> &str {
        self.config.region()
    }

    pub fn profile(&self) -> &str {
        self.config.profile()
    }

    pub fn stage(&self) -> &str {
        self.config.stage()
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.config.removal_policy()
    }

    /// CLI version the project was resolved with
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn path_root(&self) -> &Path {
        self.layout.root()
    }

    pub fn path_config(&self) -> &Path {
        self.layout.config()
    }

    pub fn path_temp(&self) -> PathBuf {
        self.layout.workspace()
    }

    /// Join `segments` under the workspace directory
    pub fn temp_path<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut path = self.path_temp();
        for segment in segments {
            path.push(segment);
        }
        path
    }

    /// The session the project was evaluated in, for later evaluations
    pub fn channel(&mut self) -> &mut E {
        &mut *self.channel
    }

    /// Release the channel, keeping the resolved data
    pub fn detach(self) -> ResolvedProject {
        ResolvedProject {
            version: self.version,
            layout: self.layout,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::product::test_support::TestProduct;
    use crate::protocol::FramedMessage;
    use crate::runtime::scripted::ScriptedChannel;
    use tempfile::TempDir;

    fn project_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("ion.config.ts"), "export default {}").unwrap();
        std::fs::create_dir_all(temp.path().join("src/handlers")).unwrap();
        temp
    }

    fn payload(json: &str) -> FramedMessage {
        FramedMessage::StructuredPayload(json.to_string())
    }

    #[tokio::test]
    async fn test_prepare_creates_workspace() {
        let temp = project_dir();

        let layout = prepare(&TestProduct, &temp.path().join("src/handlers"))
            .await
            .unwrap();

        assert_eq!(layout.root(), temp.path());
        assert_eq!(layout.config(), temp.path().join("ion.config.ts"));
        assert_eq!(layout.workspace(), temp.path().join(".ion"));
        assert!(layout.workspace().is_dir());
    }

    #[tokio::test]
    async fn test_prepare_keeps_existing_workspace() {
        let temp = project_dir();
        std::fs::create_dir(temp.path().join(".ion")).unwrap();
        std::fs::write(temp.path().join(".ion/keep"), "x").unwrap();

        let layout = prepare(&TestProduct, temp.path()).await.unwrap();

        assert!(layout.workspace().join("keep").is_file());
    }

    #[tokio::test]
    async fn test_prepare_without_entry_point() {
        let temp = TempDir::new().unwrap();

        let err = prepare(&TestProduct, temp.path()).await.unwrap_err();
        assert!(matches!(err, ResolveError::EntryPointNotFound { .. }));
        assert!(!temp.path().join(".ion").exists());
    }

    #[tokio::test]
    async fn test_prepare_workspace_failure() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("ion.config.ts"), "").unwrap();
        // A regular file where the parent of the workspace should be makes
        // stat fail with something other than "not found"
        let layout = ProjectLayout {
            config: temp.path().join("ion.config.ts"),
            workspace_dir_name: "ion.config.ts/.ion".to_string(),
        };

        let err = ensure_dir(&layout.workspace()).await.unwrap_err();
        assert!(matches!(err, ResolveError::WorkspaceIo { .. }));
    }

    #[tokio::test]
    async fn test_resolve_submits_request_in_workspace() {
        let temp = project_dir();
        let layout = prepare(&TestProduct, temp.path()).await.unwrap();
        let mut channel = ScriptedChannel::new(vec![
            FramedMessage::PlainOutput("hello from config".into()),
            payload(r#"{"name":"myapp","region":"us-east-1"}"#),
            FramedMessage::SessionDone,
        ]);

        let project = resolve(layout, &mut channel, "0.1.0").await.unwrap();

        assert_eq!(project.name(), "myapp");
        assert_eq!(project.region(), "us-east-1");
        assert_eq!(project.removal_policy(), RemovalPolicy::Retain);
        assert_eq!(project.profile(), "");
        assert_eq!(project.stage(), "");
        assert_eq!(project.version(), "0.1.0");
        assert_eq!(project.path_root(), temp.path());
        assert_eq!(
            project.temp_path(["src", "global.d.ts"]),
            temp.path().join(".ion/src/global.d.ts")
        );
        drop(project);

        let submissions = channel.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].dir, temp.path().join(".ion"));
        assert!(submissions[0].source.contains("ion.config.ts"));
        assert!(submissions[0].source.contains("mod.config()"));
    }

    #[tokio::test]
    async fn test_resolve_surfaces_submit_failure() {
        let temp = project_dir();
        let layout = prepare(&TestProduct, temp.path()).await.unwrap();
        let mut channel = ScriptedChannel::rejecting();

        let err = resolve(layout, &mut channel, "0.1.0").await.err().unwrap();
        assert!(matches!(err, ResolveError::EvalSubmit(EvalError::Spawn { .. })));
        assert_eq!(channel.reads(), 0);
    }

    #[tokio::test]
    async fn test_resolve_surfaces_validation_failure() {
        let temp = project_dir();
        let layout = prepare(&TestProduct, temp.path()).await.unwrap();
        let mut channel = ScriptedChannel::new(vec![
            payload(r#"{"name":"myapp","region":"us-east-1","removalPolicy":"purge"}"#),
            FramedMessage::SessionDone,
        ]);

        let err = resolve(layout, &mut channel, "0.1.0").await.err().unwrap();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::InvalidRemovalPolicy("purge".into()))
        );
    }

    #[tokio::test]
    async fn test_handle_lends_channel() {
        let temp = project_dir();
        let layout = prepare(&TestProduct, temp.path()).await.unwrap();
        let mut channel = ScriptedChannel::new(vec![
            payload(r#"{"name":"myapp","region":"us-east-1"}"#),
            FramedMessage::SessionDone,
        ]);

        let mut project = resolve(layout, &mut channel, "0.1.0").await.unwrap();
        project.channel().close().await.unwrap();
        drop(project);

        assert!(channel.is_closed());
    }

    #[tokio::test]
    async fn test_resolve_with_closes_channel() {
        let temp = project_dir();
        let mut channel = ScriptedChannel::new(vec![
            payload(r#"{"name":"myapp","region":"eu-west-1","stage":"dev"}"#),
            FramedMessage::SessionDone,
        ]);
        let root = temp.path().to_path_buf();
        let lent = &mut channel;

        let project = resolve_with(&TestProduct, &root.join("src"), "0.1.0", move |layout| {
            assert_eq!(layout.root(), root);
            Ok(lent)
        })
        .await
        .unwrap();

        assert_eq!(project.config().name(), "myapp");
        assert_eq!(project.config().stage(), "dev");
        assert_eq!(project.version(), "0.1.0");
        assert_eq!(project.path_config(), temp.path().join("ion.config.ts"));
        assert_eq!(project.path_temp(), temp.path().join(".ion"));
        assert!(channel.is_closed());
        assert_eq!(channel.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_with_closes_channel_on_failure() {
        let temp = project_dir();
        let mut channel = ScriptedChannel::new(vec![
            payload(r#"{"name":"myapp"}"#),
            FramedMessage::SessionDone,
        ]);
        let lent = &mut channel;

        let err = resolve_with(&TestProduct, temp.path(), "0.1.0", move |_| Ok(lent))
            .await
            .unwrap_err();

        assert_eq!(err.validation(), Some(&ValidationError::MissingRegion));
        assert!(channel.is_closed());
    }

    #[tokio::test]
    async fn test_resolve_with_reports_open_failure() {
        let temp = project_dir();

        let err = resolve_with(&TestProduct, temp.path(), "0.1.0", |_| {
            Err::<ScriptedChannel, _>(EvalError::NoRuntime {
                minimum: "22.6.0".into(),
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ResolveError::EvalSubmit(EvalError::NoRuntime { .. })));
        assert!(temp.path().join(".ion").is_dir());
    }

    #[tokio::test]
    async fn test_resolve_with_skips_open_without_entry_point() {
        let temp = TempDir::new().unwrap();
        let mut opened = false;

        let err = resolve_with(&TestProduct, temp.path(), "0.1.0", |_| {
            opened = true;
            Ok(ScriptedChannel::default())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ResolveError::EntryPointNotFound { .. }));
        assert!(!opened);
    }
}
