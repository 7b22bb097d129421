//! # Keg Core Library
//!
//! This crate contains the core logic of the `keg` tool – a minimal
//! source package installer in the Homebrew tradition: resolve a
//! package's metadata, download its source archive, verify the sha256,
//! extract it into a per-package cellar directory, and optionally run
//! install steps.
//!
//! The pipeline is strictly linear and idempotent: a package whose
//! cellar directory already exists and is non-empty is reported as
//! already installed without any network access.
//!
//! This library is built for the `keg` CLI, but the installer can be
//! embedded in other tools by handing it a [`config::Config`].
//!
//! ## Modules Overview
//! - [`config`] – Installation prefix and derived filesystem layout
//! - [`descriptor`] – The package descriptor contract and install steps
//! - [`formula`] – Structured package definitions (source A)
//! - [`registry`] – The flat JSON registry file and its update (source B)
//! - [`resolver`] – Name-to-descriptor resolution across both sources
//! - [`fetch`] – Streaming archive download
//! - [`verify`] – sha256 integrity checking
//! - [`extract`] – Archive extraction (`.tar.gz`, `.tgz`, `.tar.xz`)
//! - [`installer`] – The install state machine and cleanup rules
//! - [`lock`] – Per-package advisory install locks
//! - [`error`] – The failure taxonomy surfaced to callers
//! - [`util`] – Shared helpers (cancellation, paths)

pub mod config;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formula;
pub mod installer;
pub mod lock;
pub mod registry;
pub mod resolver;
pub mod util;
pub mod verify;

pub use config::*;
pub use descriptor::*;
pub use error::*;
pub use installer::*;
pub use resolver::*;
