use std::path::Path;
use std::process::Command;
use crate::error::{KegError, Result};

/// Everything needed to obtain and install one package.
///
/// A descriptor is produced by a metadata source (formula table or
/// registry) and stays read-only for the duration of one install.
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
    /// Unique package name, also the cellar directory name.
    pub name: String,
    /// Location of the source archive.
    pub source_url: String,
    /// Expected SHA-256 of the archive; `None` disables verification.
    pub sha256: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    /// Steps to run after extraction, if any.
    pub install: Option<InstallProcedure>,
}

impl PackageDescriptor {
    pub fn new(name: &str, source_url: &str) -> Self {
        PackageDescriptor {
            name: name.to_string(),
            source_url: source_url.to_string(),
            sha256: None,
            description: None,
            homepage: None,
            install: None,
        }
    }
}

/// Post-extraction install steps, run with the working directory set to
/// the extracted source tree.
#[derive(Debug, Clone)]
pub enum InstallProcedure {
    /// Argv command lines executed in order; a non-zero exit fails the
    /// install.
    Commands(Vec<Vec<String>>),
    /// A plain function called with the extraction directory. Used by
    /// formula definitions that need more than shell steps.
    Callable(fn(&Path) -> std::io::Result<()>),
}

impl InstallProcedure {
    pub fn run(&self, name: &str, work_dir: &Path) -> Result<()> {
        match self {
            InstallProcedure::Commands(commands) => {
                for argv in commands {
                    let program = argv.first().ok_or_else(|| KegError::InstallProcedure {
                        name: name.to_string(),
                        reason: "empty command line".to_string(),
                    })?;
                    let status = Command::new(program)
                        .args(&argv[1..])
                        .current_dir(work_dir)
                        .status()
                        .map_err(|e| KegError::InstallProcedure {
                            name: name.to_string(),
                            reason: format!("failed to spawn '{}': {}", program, e),
                        })?;
                    if !status.success() {
                        return Err(KegError::InstallProcedure {
                            name: name.to_string(),
                            reason: format!("'{}' exited with {}", argv.join(" "), status),
                        });
                    }
                }
                Ok(())
            }
            InstallProcedure::Callable(f) => f(work_dir).map_err(|e| KegError::InstallProcedure {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_commands_run_in_work_dir() {
        let dir = tempdir().unwrap();
        let proc = InstallProcedure::Commands(vec![vec![
            "touch".to_string(),
            "built.txt".to_string(),
        ]]);
        proc.run("demo", dir.path()).unwrap();
        assert!(dir.path().join("built.txt").exists());
    }

    #[test]
    fn test_failing_command_reports_install_procedure_error() {
        let dir = tempdir().unwrap();
        let proc = InstallProcedure::Commands(vec![vec!["false".to_string()]]);
        let err = proc.run("demo", dir.path()).unwrap_err();
        assert!(matches!(err, KegError::InstallProcedure { .. }));
    }

    #[test]
    fn test_callable_receives_work_dir() {
        fn write_marker(dir: &Path) -> std::io::Result<()> {
            std::fs::write(dir.join("marker"), b"ok")
        }
        let dir = tempdir().unwrap();
        let proc = InstallProcedure::Callable(write_marker);
        proc.run("demo", dir.path()).unwrap();
        assert!(dir.path().join("marker").exists());
    }
}
