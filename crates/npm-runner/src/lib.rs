//! npm process runner for generated TypeScript packages.
//!
//! This crate drives the `npm` CLI inside a generated package directory:
//! installing dependencies, running the `build` script, checking and
//! establishing a registry login, and publishing.
//!
//! # Example
//!
//! ```ignore
//! use camino::Utf8PathBuf;
//! use npm_runner::{NpmRunner, PublishOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = NpmRunner::locate(Utf8PathBuf::from("interfaces")).unwrap();
//!     let report = runner
//!         .publish_package(&PublishOptions::default())
//!         .await
//!         .unwrap();
//!     println!("published with npm {}", report.npm_version);
//! }
//! ```

mod runner;

pub use runner::{normalize_scope, NpmError, NpmRunner, NpmStep, PublishOptions, PublishReport};
