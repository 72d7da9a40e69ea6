//! Archive dispatcher
//!
//! Picks the backend strategy for a request, checks the target, and drives
//! one or more archiver invocations.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archiver::ArchiverFactory;
use crate::error::{ArchiveError, Result};
use crate::exec::CommandRunner;
use crate::tar_name::intermediate_tar_path;
use crate::tools::ToolResolver;
use crate::types::{
    ArchiveOperation, ArchiveRequest, ArchiveResult, ArchiveStep, ArchiveType, FileSet,
    HostPlatform, StrategyKind, TarCompression,
};

/// How a request is realized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyPlan {
    /// One invocation of a single strategy
    Single {
        strategy: StrategyKind,
        format: Option<&'static str>,
    },
    /// 7-Zip tar into an intermediate file, then 7-Zip compression of that file
    TarPipeline { compression_format: &'static str },
}

/// Choose the strategy for a platform, archive type and tar compression.
///
/// Windows only has the bundled 7-Zip. Elsewhere native `tar` and `zip` are
/// preferred and 7-Zip covers every other format.
pub fn select_strategy(
    platform: HostPlatform,
    archive_type: ArchiveType,
    compression: Option<TarCompression>,
) -> StrategyPlan {
    let compression = compression.unwrap_or(TarCompression::None);
    let seven_zip = |format: &'static str| StrategyPlan::Single {
        strategy: StrategyKind::SevenZip,
        format: Some(format),
    };

    match (platform, archive_type) {
        (HostPlatform::Windows, ArchiveType::Tar) => match compression.seven_zip_format() {
            None => seven_zip("tar"),
            Some(compression_format) => StrategyPlan::TarPipeline { compression_format },
        },
        (HostPlatform::Windows, other) => seven_zip(other.seven_zip_format()),
        (HostPlatform::Unix, ArchiveType::Tar) => StrategyPlan::Single {
            strategy: StrategyKind::Tar,
            format: compression.tar_flag(),
        },
        (HostPlatform::Unix, ArchiveType::Zip) => StrategyPlan::Single {
            strategy: StrategyKind::Zip,
            format: None,
        },
        (HostPlatform::Unix, other) => seven_zip(other.seven_zip_format()),
    }
}

/// Check the archive target before any archiver runs.
///
/// An existing non-file target is rejected. An existing file is deleted when
/// `replace_existing` is set and otherwise left for the archiver to update.
pub fn prepare_target(archive: &Path, replace_existing: bool) -> Result<()> {
    let access = |e: std::io::Error| ArchiveError::Access {
        path: archive.to_path_buf(),
        reason: e.to_string(),
    };

    let metadata = match std::fs::metadata(archive) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(access(e)),
    };

    if !metadata.is_file() {
        return Err(ArchiveError::InvalidTarget {
            path: archive.to_path_buf(),
        });
    }

    if replace_existing {
        info!("removing existing archive file before creation: {}", archive.display());
        std::fs::remove_file(archive).map_err(access)?;
    } else {
        warn!(
            "archive file {} already exists, the archiver will add to it",
            archive.display()
        );
    }
    Ok(())
}

/// Intermediate tar owned by a two-stage pipeline; removed when dropped.
struct IntermediateTar {
    path: PathBuf,
    armed: bool,
}

impl IntermediateTar {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Remove the file now, returning a warning when that fails
    fn remove(mut self) -> Option<String> {
        self.armed = false;
        remove_intermediate(&self.path)
    }
}

impl Drop for IntermediateTar {
    fn drop(&mut self) {
        if self.armed {
            remove_intermediate(&self.path);
        }
    }
}

/// Intermediate tar path for `archive`, refused when it would overwrite or
/// later delete a file the pipeline does not own.
fn check_intermediate(archive: &Path) -> Result<PathBuf> {
    let tar_path = intermediate_tar_path(archive);
    if tar_path == archive {
        return Err(ArchiveError::Configuration(format!(
            "Archive file {} can not be compressed: its intermediate tar would have the same name. \
             Use a compressed extension such as .tar.gz or .tgz.",
            archive.display()
        )));
    }
    if tar_path.symlink_metadata().is_ok() {
        return Err(ArchiveError::Configuration(format!(
            "Intermediate tar file {} already exists. Remove it or choose another archive file name.",
            tar_path.display()
        )));
    }
    Ok(tar_path)
}

fn remove_intermediate(path: &Path) -> Option<String> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("removed intermediate tar {}", path.display());
            None
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            let message = format!("Failed to delete intermediate tar {}: {}", path.display(), e);
            warn!("{}", message);
            Some(message)
        }
    }
}

/// Dispatcher that realizes archive requests through registered archivers
pub struct Dispatcher {
    factory: ArchiverFactory,
    tools: ToolResolver,
    runner: Box<dyn CommandRunner>,
}

impl Dispatcher {
    pub fn new(factory: ArchiverFactory, tools: ToolResolver, runner: Box<dyn CommandRunner>) -> Self {
        Self {
            factory,
            tools,
            runner,
        }
    }

    pub fn platform(&self) -> HostPlatform {
        self.tools.platform()
    }

    /// Create the archive described by `request` from `files`
    pub async fn create_archive(&self, request: &ArchiveRequest, files: &FileSet) -> Result<ArchiveResult> {
        let plan = select_strategy(self.platform(), request.archive_type, request.tar_compression);
        debug!("platform: {}, plan: {:?}", self.platform(), plan);

        let tar_path = match plan {
            StrategyPlan::TarPipeline { .. } => Some(check_intermediate(&request.archive_file)?),
            StrategyPlan::Single { .. } => None,
        };
        prepare_target(&request.archive_file, request.replace_existing)?;

        let working_dir = request.working_dir().to_path_buf();
        let inputs = files.relative_to(&working_dir);

        let mut result = ArchiveResult {
            archive: request.archive_file.clone(),
            operations: Vec::new(),
            warnings: Vec::new(),
        };

        match plan {
            StrategyPlan::Single { strategy, format } => {
                let step = ArchiveStep {
                    format,
                    archive: request.archive_file.clone(),
                    inputs,
                    working_dir,
                };
                result.operations.push(self.run_step(strategy, &step).await?);
            }
            StrategyPlan::TarPipeline { compression_format } => {
                let tar_path = tar_path.unwrap_or_else(|| intermediate_tar_path(&request.archive_file));
                let intermediate = IntermediateTar::new(tar_path.clone());

                let tar_step = ArchiveStep {
                    format: Some("tar"),
                    archive: tar_path.clone(),
                    inputs,
                    working_dir: working_dir.clone(),
                };
                result
                    .operations
                    .push(self.run_step(StrategyKind::SevenZip, &tar_step).await?);

                let compress_step = ArchiveStep {
                    format: Some(compression_format),
                    archive: request.archive_file.clone(),
                    inputs: vec![tar_path],
                    working_dir,
                };
                result
                    .operations
                    .push(self.run_step(StrategyKind::SevenZip, &compress_step).await?);

                result.warnings.extend(intermediate.remove());
            }
        }

        info!("{}", result.message());
        Ok(result)
    }

    async fn run_step(&self, strategy: StrategyKind, step: &ArchiveStep) -> Result<ArchiveOperation> {
        let archiver = self
            .factory
            .get(strategy)
            .ok_or_else(|| ArchiveError::StrategyNotRegistered(strategy.to_string()))?;
        archiver.archive(step, &self.tools, self.runner.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archiver::Archiver;
    use crate::exec::ExecOutcome;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use std::ffi::OsString;
    use std::sync::Mutex;

    /// Minimal 7-Zip shaped archiver, so dispatch can be tested without the adapters crate
    struct ShapeArchiver(StrategyKind, Tool);

    #[async_trait]
    impl Archiver for ShapeArchiver {
        fn kind(&self) -> StrategyKind {
            self.0
        }
        fn tool(&self) -> Tool {
            self.1
        }
        fn arguments(&self, step: &ArchiveStep) -> Vec<OsString> {
            let mut args: Vec<OsString> = step.format.map(OsString::from).into_iter().collect();
            args.push(step.archive.clone().into());
            args.extend(step.inputs.iter().map(|p| p.clone().into_os_string()));
            args
        }
    }

    /// Records operations and creates the archive file on success
    #[derive(Default)]
    struct RecordingRunner {
        operations: Mutex<Vec<ArchiveOperation>>,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, operation: &ArchiveOperation) -> Result<ExecOutcome> {
            let mut ops = self.operations.lock().unwrap();
            let index = ops.len();
            ops.push(operation.clone());
            if self.fail_at == Some(index) {
                return Ok(ExecOutcome::failure(2));
            }
            let target = operation.working_dir.join(&operation.archive);
            std::fs::write(target, b"archive")?;
            Ok(ExecOutcome::success())
        }
    }

    fn factory() -> ArchiverFactory {
        let mut factory = ArchiverFactory::new();
        factory.register(Box::new(ShapeArchiver(StrategyKind::SevenZip, Tool::SevenZip)));
        factory.register(Box::new(ShapeArchiver(StrategyKind::Tar, Tool::Tar)));
        factory.register(Box::new(ShapeArchiver(StrategyKind::Zip, Tool::Zip)));
        factory
    }

    fn tools(platform: HostPlatform) -> ToolResolver {
        ToolResolver::new(platform, Path::new("/task"))
            .with_override(Tool::SevenZip, "7z")
            .with_override(Tool::Tar, "tar")
            .with_override(Tool::Zip, "zip")
    }

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir_all(dir.path().join("src/app")).unwrap();
            std::fs::write(dir.path().join("src/app/main.txt"), "x").unwrap();
            std::fs::create_dir_all(dir.path().join("out")).unwrap();
            Self { dir }
        }

        fn request(&self, archive_type: ArchiveType, name: &str) -> ArchiveRequest {
            ArchiveRequest {
                root_folder: self.dir.path().join("src/app"),
                include_root_folder: true,
                archive_type,
                archive_file: self.dir.path().join("out").join(name),
                replace_existing: true,
                tar_compression: None,
            }
        }
    }

    async fn dispatch(
        platform: HostPlatform,
        request: &ArchiveRequest,
        runner: RecordingRunner,
    ) -> (Result<ArchiveResult>, Vec<ArchiveOperation>) {
        let runner = std::sync::Arc::new(runner);
        struct Shared(std::sync::Arc<RecordingRunner>);
        #[async_trait]
        impl CommandRunner for Shared {
            async fn run(&self, operation: &ArchiveOperation) -> Result<ExecOutcome> {
                self.0.run(operation).await
            }
        }

        let dispatcher = Dispatcher::new(factory(), tools(platform), Box::new(Shared(runner.clone())));
        let files = crate::files::select_files(&request.root_folder, request.include_root_folder).unwrap();
        let result = dispatcher.create_archive(request, &files).await;
        let ops = runner.operations.lock().unwrap().clone();
        (result, ops)
    }

    #[test]
    fn test_dispatch_table() {
        use ArchiveType::*;
        use HostPlatform::*;

        let single = |strategy, format| StrategyPlan::Single { strategy, format };

        assert_eq!(select_strategy(Windows, Default, None), single(StrategyKind::SevenZip, Some("zip")));
        assert_eq!(
            select_strategy(Windows, Tar, Some(TarCompression::None)),
            single(StrategyKind::SevenZip, Some("tar"))
        );
        assert_eq!(
            select_strategy(Windows, Tar, Some(TarCompression::Gz)),
            StrategyPlan::TarPipeline { compression_format: "gzip" }
        );
        assert_eq!(
            select_strategy(Windows, Tar, Some(TarCompression::Bz2)),
            StrategyPlan::TarPipeline { compression_format: "bzip2" }
        );
        assert_eq!(
            select_strategy(Windows, Tar, Some(TarCompression::Xz)),
            StrategyPlan::TarPipeline { compression_format: "xz" }
        );
        assert_eq!(select_strategy(Windows, Zip, None), single(StrategyKind::SevenZip, Some("zip")));
        assert_eq!(select_strategy(Windows, SevenZ, None), single(StrategyKind::SevenZip, Some("7z")));
        assert_eq!(select_strategy(Windows, Gzip, None), single(StrategyKind::SevenZip, Some("gzip")));
        assert_eq!(select_strategy(Windows, Bzip2, None), single(StrategyKind::SevenZip, Some("bzip2")));
        assert_eq!(select_strategy(Windows, Xz, None), single(StrategyKind::SevenZip, Some("xz")));
        assert_eq!(select_strategy(Windows, Wim, None), single(StrategyKind::SevenZip, Some("wim")));

        assert_eq!(select_strategy(Unix, Tar, Some(TarCompression::None)), single(StrategyKind::Tar, None));
        assert_eq!(
            select_strategy(Unix, Tar, Some(TarCompression::Gz)),
            single(StrategyKind::Tar, Some("gzip"))
        );
        assert_eq!(
            select_strategy(Unix, Tar, Some(TarCompression::Xz)),
            single(StrategyKind::Tar, Some("xz"))
        );
        assert_eq!(select_strategy(Unix, Zip, None), single(StrategyKind::Zip, None));
        assert_eq!(select_strategy(Unix, Gzip, None), single(StrategyKind::SevenZip, Some("gzip")));
        assert_eq!(select_strategy(Unix, Default, None), single(StrategyKind::SevenZip, Some("zip")));
    }

    #[test]
    fn test_prepare_target_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        for replace in [true, false] {
            assert!(matches!(
                prepare_target(dir.path(), replace),
                Err(ArchiveError::InvalidTarget { .. })
            ));
        }
    }

    #[test]
    fn test_prepare_target_replaces_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("a.zip");
        std::fs::write(&archive, "old")?;

        prepare_target(&archive, false)?;
        assert!(archive.exists());

        prepare_target(&archive, true)?;
        assert!(!archive.exists());

        prepare_target(&archive, true)?;
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_prepare_target_access_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x")?;

        let err = prepare_target(&file.join("out.zip"), true).unwrap_err();
        assert!(matches!(err, ArchiveError::Access { ref path, .. } if path.ends_with("file.txt/out.zip")));
        assert!(err.to_string().contains("can not be accessed"));
        assert!(file.is_file());
        Ok(())
    }

    #[tokio::test]
    async fn test_windows_tar_gz_pipeline() {
        let fixture = Fixture::new();
        let mut request = fixture.request(ArchiveType::Tar, "out.tar.gz");
        request.tar_compression = Some(TarCompression::Gz);

        let (result, ops) = dispatch(HostPlatform::Windows, &request, RecordingRunner::default()).await;
        let result = result.unwrap();

        let out = fixture.dir.path().join("out");
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].archive, out.join("out.tar"));
        assert_eq!(ops[0].args_lossy()[0], "tar");
        assert_eq!(ops[1].archive, out.join("out.tar.gz"));
        assert_eq!(ops[1].args_lossy()[0], "gzip");
        assert_eq!(ops[1].args_lossy()[2], out.join("out.tar").display().to_string());

        assert!(!out.join("out.tar").exists());
        assert!(out.join("out.tar.gz").exists());
        assert!(result.warnings.is_empty());
        assert!(result.message().ends_with("out.tar.gz"));
    }

    #[tokio::test]
    async fn test_pipeline_cleans_up_on_failure() {
        let fixture = Fixture::new();
        let mut request = fixture.request(ArchiveType::Tar, "out.tgz");
        request.tar_compression = Some(TarCompression::Gz);

        let runner = RecordingRunner {
            fail_at: Some(1),
            ..Default::default()
        };
        let (result, ops) = dispatch(HostPlatform::Windows, &request, runner).await;

        assert_eq!(ops.len(), 2);
        assert!(matches!(result, Err(ArchiveError::ArchiveCreation { ref path }) if path.ends_with("out.tgz")));
        assert!(!fixture.dir.path().join("out/out.tar").exists());
    }

    #[tokio::test]
    async fn test_pipeline_refuses_intermediate_equal_to_archive() {
        let fixture = Fixture::new();
        let mut request = fixture.request(ArchiveType::Tar, "out.tar");
        request.tar_compression = Some(TarCompression::Gz);
        std::fs::write(&request.archive_file, "previous").unwrap();

        let (result, ops) = dispatch(HostPlatform::Windows, &request, RecordingRunner::default()).await;
        let err = result.unwrap_err();
        assert!(matches!(err, ArchiveError::Configuration(_)));
        assert!(err.to_string().contains("same name"));
        assert!(ops.is_empty());
        assert_eq!(std::fs::read_to_string(&request.archive_file).unwrap(), "previous");
    }

    #[tokio::test]
    async fn test_pipeline_keeps_existing_intermediate() {
        let fixture = Fixture::new();
        let mut request = fixture.request(ArchiveType::Tar, "out.tar.gz");
        request.tar_compression = Some(TarCompression::Gz);
        let tar = fixture.dir.path().join("out/out.tar");
        std::fs::write(&tar, "user data").unwrap();

        let runner = RecordingRunner {
            fail_at: Some(0),
            ..Default::default()
        };
        let (result, ops) = dispatch(HostPlatform::Windows, &request, runner).await;
        assert!(matches!(result, Err(ArchiveError::Configuration(_))));
        assert!(ops.is_empty());
        assert_eq!(std::fs::read_to_string(&tar).unwrap(), "user data");
    }

    #[tokio::test]
    async fn test_working_dir_and_inputs() {
        let fixture = Fixture::new();
        let mut request = fixture.request(ArchiveType::Zip, "app.zip");

        let (result, ops) = dispatch(HostPlatform::Unix, &request, RecordingRunner::default()).await;
        result.unwrap();
        assert_eq!(ops[0].strategy, StrategyKind::Zip);
        assert_eq!(ops[0].working_dir, fixture.dir.path().join("src"));
        assert_eq!(ops[0].args_lossy().last().unwrap(), "./app");

        request.include_root_folder = false;
        let (result, ops) = dispatch(HostPlatform::Unix, &request, RecordingRunner::default()).await;
        result.unwrap();
        assert_eq!(ops[0].working_dir, fixture.dir.path().join("src/app"));
        assert_eq!(ops[0].args_lossy().last().unwrap(), "./main.txt");
    }

    #[tokio::test]
    async fn test_existing_directory_target_fails_before_archiving() {
        let fixture = Fixture::new();
        let request = fixture.request(ArchiveType::Zip, "app.zip");
        std::fs::create_dir_all(&request.archive_file).unwrap();

        let (result, ops) = dispatch(HostPlatform::Unix, &request, RecordingRunner::default()).await;
        let err = result.unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidTarget { .. }));
        assert!(err.to_string().contains("already exists and is not a file"));
        assert!(ops.is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_strategy() {
        let fixture = Fixture::new();
        let request = fixture.request(ArchiveType::Zip, "app.zip");
        let dispatcher = Dispatcher::new(
            ArchiverFactory::new(),
            tools(HostPlatform::Unix),
            Box::new(RecordingRunner::default()),
        );
        let files = FileSet::new(vec![request.root_folder.clone()]);

        let result = dispatcher.create_archive(&request, &files).await;
        assert!(matches!(result, Err(ArchiveError::StrategyNotRegistered(_))));
    }
}
