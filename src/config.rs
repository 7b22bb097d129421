use std::path::{Path, PathBuf};
use anyhow::{anyhow, Result};
use directories::ProjectDirs;

/// Default remote registry document fetched by `keg update`.
pub const DEFAULT_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/keg-pm/keg-registry/main/registry.json";

const CELLAR_DIR: &str = "cellar";
const REGISTRY_FILE: &str = "registry.json";
const SRC_DIR: &str = "src";

/// Paths and endpoints for one `keg` instance.
///
/// All filesystem layout decisions live here; the installer and the CLI
/// are handed a `Config` instead of reading process-wide constants, so
/// tests can point everything at a temporary prefix.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the installation tree.
    pub prefix: PathBuf,
    /// Where `keg update` fetches the registry document from.
    pub registry_url: String,
}

impl Config {
    pub fn new<P: AsRef<Path>>(prefix: P) -> Self {
        Config {
            prefix: prefix.as_ref().to_path_buf(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
        }
    }

    /// Builds a config from the environment: `KEG_PREFIX` and
    /// `KEG_REGISTRY_URL` override the defaults.
    pub fn from_env() -> Result<Self> {
        let prefix = match std::env::var_os("KEG_PREFIX") {
            Some(prefix) => PathBuf::from(prefix),
            None => default_prefix()?,
        };
        let mut config = Config::new(prefix);
        if let Ok(url) = std::env::var("KEG_REGISTRY_URL") {
            config.registry_url = url;
        }
        Ok(config)
    }

    /// Directory holding one subdirectory per installed package.
    pub fn cellar_dir(&self) -> PathBuf {
        self.prefix.join(CELLAR_DIR)
    }

    /// Install directory for a single package.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.cellar_dir().join(name)
    }

    /// Where the extracted source tree of a package lands.
    pub fn extract_dir(&self, name: &str) -> PathBuf {
        self.package_dir(name).join(SRC_DIR)
    }

    /// Local copy of the package registry.
    pub fn registry_path(&self) -> PathBuf {
        self.prefix.join(REGISTRY_FILE)
    }
}

fn default_prefix() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "keg", "keg")
        .ok_or_else(|| anyhow!("Could not get project directories"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}
