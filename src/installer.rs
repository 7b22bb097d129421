use std::fmt;
use std::path::{Path, PathBuf};
use colored::Colorize;
use crate::config::Config;
use crate::error::KegError;
use crate::extract::extract;
use crate::fetch::fetch;
use crate::formula::FormulaSource;
use crate::lock::InstallLock;
use crate::resolver::Resolver;
use crate::util::{archive_file_name, is_non_empty_dir, CancelToken};
use crate::verify::{verify_if_expected, Verification};

/// Pipeline stages, in order. `Failed` is reachable from every
/// non-terminal stage and carries no data of its own; the failing stage
/// travels with the error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Pending,
    Resolving,
    Downloading,
    Verifying,
    Extracting,
    Installing,
    Installed,
    Failed,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallState::Pending => "pending",
            InstallState::Resolving => "resolving",
            InstallState::Downloading => "downloading",
            InstallState::Verifying => "verifying",
            InstallState::Extracting => "extracting",
            InstallState::Installing => "installing",
            InstallState::Installed => "installed",
            InstallState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What a successful install reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Fresh install; the absolute package directory.
    Installed { path: PathBuf },
    /// The package directory already existed and was non-empty; nothing
    /// was downloaded or written.
    AlreadyInstalled { path: PathBuf },
}

impl InstallOutcome {
    pub fn path(&self) -> &Path {
        match self {
            InstallOutcome::Installed { path } | InstallOutcome::AlreadyInstalled { path } => path,
        }
    }
}

/// A pipeline failure: exactly one [`KegError`], tagged with the stage
/// it occurred in. Callers never observe partial success.
#[derive(Debug)]
pub struct InstallError {
    pub stage: InstallState,
    pub error: KegError,
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "install failed while {}: {}", self.stage, self.error)
    }
}

impl std::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Drives one package through resolve, download, verify, extract and
/// install steps, with per-stage cleanup on failure.
#[derive(Debug)]
pub struct Installer {
    config: Config,
    resolver: Resolver,
}

impl Installer {
    pub fn new(config: Config, formulas: FormulaSource) -> Self {
        let resolver = Resolver::new(formulas, config.registry_path());
        Installer { config, resolver }
    }

    /// Installs `name`, returning the install path, or reporting that it
    /// was already installed. Side effects are append-only until a
    /// failure triggers that stage's cleanup.
    pub fn install(
        &self,
        name: &str,
        cancel: &CancelToken,
    ) -> std::result::Result<InstallOutcome, InstallError> {
        let fail = |stage: InstallState| move |error: KegError| InstallError { stage, error };

        // Held until return, success or not.
        let _lock = InstallLock::acquire(&self.config.cellar_dir(), name)
            .map_err(fail(InstallState::Resolving))?;

        let descriptor = self
            .resolver
            .resolve(name)
            .map_err(fail(InstallState::Resolving))?;

        let pkg_dir = self.config.package_dir(name);
        if is_non_empty_dir(&pkg_dir) {
            return Ok(InstallOutcome::AlreadyInstalled {
                path: absolute(pkg_dir),
            });
        }

        let archive_name =
            archive_file_name(&descriptor.source_url).map_err(fail(InstallState::Downloading))?;
        std::fs::create_dir_all(&pkg_dir)
            .map_err(|e| KegError::filesystem(&pkg_dir, e))
            .map_err(fail(InstallState::Downloading))?;
        let staging_path = pkg_dir.join(&archive_name);

        println!("Downloading {}...", descriptor.source_url.cyan());
        fetch(&descriptor.source_url, &staging_path, cancel)
            .map_err(|e| self.fail_clean(&pkg_dir, InstallState::Downloading, e))?;

        // The verifier deletes the archive on mismatch; the package dir
        // still has to go so a retry starts clean.
        match verify_if_expected(&staging_path, descriptor.sha256.as_deref())
            .map_err(|e| self.fail_clean(&pkg_dir, InstallState::Verifying, e))?
        {
            Verification::Verified => println!("{}", "sha256 checksum verified.".green()),
            Verification::Skipped => {
                println!("{}", "no sha256 published; skipping verification.".yellow())
            }
        }

        let src_dir = self.config.extract_dir(name);
        println!("Extracting {} to {}...", archive_name.cyan(), src_dir.display());
        extract(&staging_path, &src_dir, cancel)
            .map_err(|e| self.fail_clean(&pkg_dir, InstallState::Extracting, e))?;

        if let Some(procedure) = &descriptor.install {
            println!("Running install steps for {}...", name.cyan());
            // Deliberately no cleanup: a partial native build can be
            // expensive to redo.
            procedure
                .run(name, &src_dir)
                .map_err(fail(InstallState::Installing))?;
        }

        Ok(InstallOutcome::Installed {
            path: absolute(pkg_dir),
        })
    }

    /// Maps a stage failure and removes the partially created package
    /// directory so retries start clean. The original error stays
    /// primary; cleanup is best effort.
    fn fail_clean(&self, pkg_dir: &Path, stage: InstallState, error: KegError) -> InstallError {
        let _ = std::fs::remove_dir_all(pkg_dir);
        InstallError { stage, error }
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}
