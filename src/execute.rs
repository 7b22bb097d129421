use anyhow::{bail, Result};
use clap::CommandFactory;
use colored::Colorize;
use keg::config::Config;
use keg::formula::FormulaSource;
use keg::installer::{InstallOutcome, Installer};
use keg::registry::{update_registry, Registry};
use keg::util::CancelToken;
use crate::cli::{KegCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    let config = Config::from_env()?;
    if cli.prefix {
        println!("{}", config.prefix.display());
        return Ok(());
    }
    match cli.command {
        Some(KegCommand::Install { name }) => execute_install(config, &name),
        Some(KegCommand::Remove { name }) => execute_remove(&config, &name),
        Some(KegCommand::List) => execute_list(&config),
        Some(KegCommand::Info { name }) => execute_info(&config, &name),
        Some(KegCommand::Search { term }) => execute_search(&config, &term),
        Some(KegCommand::Update) => execute_update(&config),
        None => {
            CLI::command().print_help()?;
            Ok(())
        }
    }
}

pub fn execute_install(config: Config, name: &str) -> Result<()> {
    let installer = Installer::new(config, FormulaSource::new());
    match installer.install(name, &CancelToken::new())? {
        InstallOutcome::Installed { path } => {
            println!(
                "{} installed successfully to {}",
                name.green(),
                path.display()
            );
        }
        InstallOutcome::AlreadyInstalled { path } => {
            println!("{} already installed at {}", name, path.display());
        }
    }
    Ok(())
}

pub fn execute_remove(config: &Config, name: &str) -> Result<()> {
    let pkg_dir = config.package_dir(name);
    if pkg_dir.exists() {
        std::fs::remove_dir_all(&pkg_dir)?;
        let _ = std::fs::remove_file(keg::lock::lock_path(&config.cellar_dir(), name));
        println!("Removed {}.", name);
    } else {
        println!("Package not installed: {}", name);
    }
    Ok(())
}

pub fn execute_list(config: &Config) -> Result<()> {
    let mut names = Vec::new();
    if let Ok(entries) = std::fs::read_dir(config.cellar_dir()) {
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.path().is_dir() && !name.starts_with('.') {
                names.push(name);
            }
        }
    }
    if names.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }
    names.sort();
    println!("Installed packages:");
    for name in names {
        println!("- {}", name);
    }
    Ok(())
}

pub fn execute_info(config: &Config, name: &str) -> Result<()> {
    let registry = Registry::load(config.registry_path())?;
    let Some(entry) = registry.get(name) else {
        bail!("Package '{}' not found.", name);
    };
    println!("Name: {}", name);
    println!("Description: {}", entry.desc.as_deref().unwrap_or("-"));
    println!("Homepage: {}", entry.homepage.as_deref().unwrap_or("-"));
    println!("URL: {}", entry.url);
    println!("SHA256: {}", entry.sha256.as_deref().unwrap_or("-"));
    Ok(())
}

pub fn execute_search(config: &Config, term: &str) -> Result<()> {
    let registry = Registry::load(config.registry_path())?;
    let matches = registry.search(term);
    if matches.is_empty() {
        println!("No packages found for: {}", term);
        return Ok(());
    }
    println!("Matches:");
    for name in matches {
        println!("- {}", name);
    }
    Ok(())
}

pub fn execute_update(config: &Config) -> Result<()> {
    println!("Updating registry from {}...", config.registry_url.cyan());
    update_registry(&config.registry_url, &config.registry_path())?;
    let registry = Registry::load(config.registry_path())?;
    println!("Registry updated: {} packages.", registry.len());
    Ok(())
}
