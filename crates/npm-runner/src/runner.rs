//! npm process runner.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Error types for the npm runner.
#[derive(Debug, Error)]
pub enum NpmError {
    /// Failed to spawn the npm process.
    #[error("failed to spawn npm: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// npm is not on the PATH.
    #[error("npm not found - install Node.js and make sure npm is on the PATH")]
    NotFound,

    /// The package directory does not exist.
    #[error("package directory not found: {0}")]
    PackageDirNotFound(Utf8PathBuf),

    /// An npm command exited with an error.
    #[error("npm {step} exited with code {code}: {stderr}")]
    StepFailed {
        /// The step that failed.
        step: NpmStep,
        /// The exit code, or -1 when terminated by a signal.
        code: i32,
        /// Captured standard error.
        stderr: String,
    },
}

/// The npm commands the runner issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpmStep {
    Version,
    Install,
    Build,
    WhoAmI,
    Login,
    Publish,
}

impl NpmStep {
    /// Returns the npm arguments for this step.
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            Self::Version => &["--version"],
            Self::Install => &["install"],
            Self::Build => &["run", "build"],
            Self::WhoAmI => &["whoami"],
            Self::Login => &["login"],
            Self::Publish => &["publish"],
        }
    }
}

impl fmt::Display for NpmStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args().join(" "))
    }
}

/// Normalizes an npm scope to its `@scope` form.
pub fn normalize_scope(scope: &str) -> String {
    format!("@{}", scope.trim().trim_start_matches('@'))
}

/// Options for [`NpmRunner::publish_package`].
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Run `npm login` when `npm whoami` reports no session.
    pub auto_login: bool,
    /// The package scope, with or without the leading `@`.
    pub scope: Option<String>,
}

/// What happened during a successful publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// The npm version reported by `npm --version`.
    pub npm_version: String,
    /// The registry user, when a login check was made.
    pub user: Option<String>,
    /// Whether `npm login` was run.
    pub logged_in: bool,
}

/// The npm runner.
#[derive(Debug, Clone)]
pub struct NpmRunner {
    /// Path to the npm binary.
    npm_path: Utf8PathBuf,
    /// The package directory every command runs in.
    package_dir: Utf8PathBuf,
}

impl NpmRunner {
    /// Creates a runner for an explicit npm binary.
    pub fn new(npm_path: Utf8PathBuf, package_dir: Utf8PathBuf) -> Self {
        Self {
            npm_path,
            package_dir,
        }
    }

    /// Creates a runner using the npm found on the PATH.
    pub fn locate(package_dir: Utf8PathBuf) -> Result<Self, NpmError> {
        let npm_path = Self::find_npm().ok_or(NpmError::NotFound)?;
        Ok(Self::new(npm_path, package_dir))
    }

    /// Attempts to find npm in PATH.
    pub fn find_npm() -> Option<Utf8PathBuf> {
        which::which("npm")
            .ok()
            .and_then(|path| Utf8PathBuf::try_from(path).ok())
    }

    /// Returns the package directory.
    pub fn package_dir(&self) -> &Utf8Path {
        &self.package_dir
    }

    /// Runs a step with captured output and returns its trimmed stdout.
    async fn run(&self, step: NpmStep, extra_args: &[&str]) -> Result<String, NpmError> {
        log::debug!("{} {} {}", self.npm_path, step, extra_args.join(" "));

        let output = Command::new(&self.npm_path)
            .args(step.args())
            .args(extra_args)
            .current_dir(&self.package_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(NpmError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NpmError::StepFailed {
                step,
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Gets the npm version.
    pub async fn version(&self) -> Result<String, NpmError> {
        self.run(NpmStep::Version, &[]).await
    }

    /// Runs `npm install`.
    pub async fn install(&self) -> Result<(), NpmError> {
        self.run(NpmStep::Install, &[]).await.map(drop)
    }

    /// Runs `npm run build`.
    pub async fn build(&self) -> Result<(), NpmError> {
        self.run(NpmStep::Build, &[]).await.map(drop)
    }

    /// Returns the logged-in registry user, or `None` when there is no session.
    pub async fn whoami(&self) -> Result<Option<String>, NpmError> {
        match self.run(NpmStep::WhoAmI, &[]).await {
            Ok(user) if !user.is_empty() => Ok(Some(user)),
            Ok(_) | Err(NpmError::StepFailed { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Runs `npm login` attached to the terminal so the user can authenticate.
    pub async fn login(&self, scope: Option<&str>) -> Result<(), NpmError> {
        let mut command = Command::new(&self.npm_path);
        command.args(NpmStep::Login.args());
        if let Some(scope) = scope {
            command.arg(format!("--scope={}", normalize_scope(scope)));
        }

        let status = command
            .current_dir(&self.package_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(NpmError::SpawnFailed)?;

        if !status.success() {
            return Err(NpmError::StepFailed {
                step: NpmStep::Login,
                code: status.code().unwrap_or(-1),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Runs `npm publish`, with `--access public` when `public` is set.
    pub async fn publish(&self, public: bool) -> Result<(), NpmError> {
        let extra: &[&str] = if public { &["--access", "public"] } else { &[] };
        self.run(NpmStep::Publish, extra).await.map(drop)
    }

    /// Installs, builds and publishes the package.
    ///
    /// Scoped packages are published with public access. With `auto_login`,
    /// a login is run first when `npm whoami` finds no session.
    pub async fn publish_package(&self, options: &PublishOptions) -> Result<PublishReport, NpmError> {
        if !self.package_dir.is_dir() {
            return Err(NpmError::PackageDirNotFound(self.package_dir.clone()));
        }

        let mut report = PublishReport {
            npm_version: self.version().await?,
            ..Default::default()
        };
        log::info!("using npm {}", report.npm_version);

        eprintln!("Installing dependencies in {}...", self.package_dir);
        self.install().await?;

        eprintln!("Building package...");
        self.build().await?;

        if options.auto_login {
            report.user = self.whoami().await?;
            if report.user.is_none() {
                eprintln!("Not logged in to npm, starting npm login...");
                self.login(options.scope.as_deref()).await?;
                report.logged_in = true;
                report.user = self.whoami().await?;
            }
        }

        eprintln!("Publishing package...");
        self.publish(options.scope.is_some()).await?;

        Ok(report)
    }
}
