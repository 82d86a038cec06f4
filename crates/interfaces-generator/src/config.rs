//! Configuration loading.
//!
//! Settings come from four layers, highest priority first: command-line
//! arguments, a JSON configuration file, the nearest `package.json`, and
//! built-in defaults.

use crate::cli::Args;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;
use walkdir::WalkDir;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "interfaces";
/// Default npm package name.
pub const DEFAULT_PACKAGE_NAME: &str = "interfaces";
/// Default npm package version.
pub const DEFAULT_VERSION: &str = "1.0.0";
/// Default npm package license.
pub const DEFAULT_LICENSE: &str = "ISC";

/// Directories never searched for projects or sources.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", "node_modules", ".git", ".vs"];

/// Configuration errors.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {0}")]
    #[diagnostic(code(config::not_found))]
    NotFound(Utf8PathBuf),

    /// The configuration file could not be read.
    #[error("failed to read {path}")]
    #[diagnostic(code(config::read))]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`GeneratorConfig`].
    #[error("invalid configuration in {path}")]
    #[diagnostic(code(config::parse))]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },

    /// The configuration could not be saved.
    #[error("failed to write configuration to {path}")]
    #[diagnostic(code(config::write))]
    Write {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// No project was given and none could be found.
    #[error("no C# project found under {0}")]
    #[diagnostic(
        code(config::no_project),
        help("pass the project directory with --project <DIR>")
    )]
    ProjectNotDetected(Utf8PathBuf),

    /// The given project path does not exist.
    #[error("project not found: {0}")]
    #[diagnostic(code(config::project_not_found))]
    ProjectNotFound(Utf8PathBuf),
}

/// The JSON configuration file.
///
/// Property names are camelCase; PascalCase names are accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    #[serde(alias = "ProjectPath", skip_serializing_if = "Option::is_none")]
    pub project_path: Option<Utf8PathBuf>,
    #[serde(alias = "OutputPath", skip_serializing_if = "Option::is_none")]
    pub output_path: Option<Utf8PathBuf>,
    #[serde(alias = "PackageName", skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(alias = "Version", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(alias = "Repository", skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(alias = "Author", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(alias = "License", skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(alias = "Publish")]
    pub publish: bool,
    #[serde(alias = "Watch")]
    pub watch: bool,
    #[serde(alias = "AutoLogin")]
    pub auto_login: bool,
    #[serde(alias = "NpmScope", skip_serializing_if = "Option::is_none")]
    pub npm_scope: Option<String>,
    #[serde(alias = "Ignore", skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
    #[serde(alias = "TypeMappings", skip_serializing_if = "IndexMap::is_empty")]
    pub type_mappings: IndexMap<String, String>,
}

impl GeneratorConfig {
    /// Collects the values given on the command line.
    pub fn from_args(args: &Args) -> Self {
        Self {
            project_path: args.project.clone(),
            output_path: args.output.clone(),
            package_name: args.package_name.clone(),
            version: args.package_version.clone(),
            repository: args.repository.clone(),
            author: args.author.clone(),
            license: args.license.clone(),
            publish: args.publish,
            watch: args.watch,
            auto_login: args.auto_login,
            npm_scope: args.npm_scope.clone(),
            ignore: args.ignore.clone(),
            type_mappings: args.type_mapping.iter().cloned().collect(),
        }
    }

    /// Loads a configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_owned()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Utf8Path) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_owned(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| write_err(e.into()))?;
        fs::write(path, json + "\n").map_err(write_err)
    }

    /// Layers `self` over `lower`: values set here win, flags are combined,
    /// ignore patterns are concatenated and type mappings here override.
    pub fn merged_over(self, lower: GeneratorConfig) -> GeneratorConfig {
        let mut ignore = lower.ignore;
        ignore.extend(self.ignore);
        let mut type_mappings = lower.type_mappings;
        type_mappings.extend(self.type_mappings);

        GeneratorConfig {
            project_path: self.project_path.or(lower.project_path),
            output_path: self.output_path.or(lower.output_path),
            package_name: self.package_name.or(lower.package_name),
            version: self.version.or(lower.version),
            repository: self.repository.or(lower.repository),
            author: self.author.or(lower.author),
            license: self.license.or(lower.license),
            publish: self.publish || lower.publish,
            watch: self.watch || lower.watch,
            auto_login: self.auto_login || lower.auto_login,
            npm_scope: self.npm_scope.or(lower.npm_scope),
            ignore,
            type_mappings,
        }
    }
}

/// Package metadata read from an existing `package.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDefaults {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub repository: Option<String>,
}

impl PackageDefaults {
    /// Extracts defaults from `package.json` content.
    ///
    /// `author` may be a string or an object with `name`; `repository` may be
    /// a string or an object with `url`.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let root: serde_json::Value = serde_json::from_str(content)?;
        let string = |key: &str| root.get(key).and_then(|v| v.as_str()).map(str::to_string);
        let string_or_field = |key: &str, field: &str| match root.get(key) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Object(obj)) => {
                obj.get(field).and_then(|v| v.as_str()).map(str::to_string)
            }
            _ => None,
        };

        Ok(Self {
            name: string("name"),
            version: string("version"),
            author: string_or_field("author", "name"),
            license: string("license"),
            repository: string_or_field("repository", "url"),
        })
    }

    /// Finds the `package.json` that supplies defaults for `project`.
    ///
    /// Looks in the project's ancestors first, then anywhere below the
    /// project, skipping `exclude` (the output directory).
    pub fn find(project: &Utf8Path, exclude: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = project.parent();
        while let Some(dir) = current {
            let candidate = dir.join("package.json");
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }

        WalkDir::new(project)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == "package.json")
            .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
            .find(|p| !p.starts_with(exclude))
    }

    /// Loads defaults for `project`. Unreadable files are reported and ignored.
    pub fn load(project: &Utf8Path, exclude: &Utf8Path) -> Self {
        let Some(path) = Self::find(project, exclude) else {
            return Self::default();
        };
        log::info!("using package defaults from {path}");

        match fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| Self::parse(&content).map_err(|e| e.to_string()))
        {
            Ok(defaults) => defaults,
            Err(e) => {
                log::warn!("ignoring {path}: {e}");
                Self::default()
            }
        }
    }
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Finds a C# project under `root`: the directory of the first `*.csproj`,
/// else the directory of the first `*.sln`.
pub fn detect_project(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let files: Vec<Utf8PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .collect();

    ["csproj", "sln"].iter().find_map(|ext| {
        files
            .iter()
            .find(|p| p.extension() == Some(*ext))
            .and_then(|p| p.parent())
            .map(Utf8Path::to_path_buf)
    })
}

/// Package metadata written to `package.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub author: String,
    pub license: String,
    pub repository: Option<String>,
    /// The npm scope, normalized to `@scope`.
    pub scope: Option<String>,
}

impl PackageInfo {
    /// Returns the full package name, `@scope/name` when scoped.
    pub fn full_name(&self) -> String {
        match &self.scope {
            Some(scope) if !self.name.starts_with('@') => format!("{scope}/{}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The C# project directory.
    pub project_root: Utf8PathBuf,
    /// The npm package directory.
    pub output_dir: Utf8PathBuf,
    pub package: PackageInfo,
    pub publish: bool,
    pub watch: bool,
    pub auto_login: bool,
    pub dry_run: bool,
    pub ignore: Vec<String>,
    pub type_mappings: IndexMap<String, String>,
}

impl Settings {
    /// Resolves settings from a merged configuration.
    ///
    /// Relative paths are taken from `cwd`. A project path naming a file
    /// (such as a `.csproj`) resolves to its directory.
    pub fn resolve(
        config: GeneratorConfig,
        cwd: &Utf8Path,
        dry_run: bool,
    ) -> Result<Self, ConfigError> {
        let project_root = match &config.project_path {
            Some(path) => {
                let path = cwd.join(path);
                if path.is_file() {
                    path.parent().map(Utf8Path::to_path_buf).unwrap_or(path)
                } else if path.is_dir() {
                    path
                } else {
                    return Err(ConfigError::ProjectNotFound(path));
                }
            }
            None => detect_project(cwd)
                .ok_or_else(|| ConfigError::ProjectNotDetected(cwd.to_owned()))?,
        };

        let output_dir = cwd.join(
            config
                .output_path
                .clone()
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT)),
        );

        let defaults = PackageDefaults::load(&project_root, &output_dir);
        let package = PackageInfo {
            name: config
                .package_name
                .or(defaults.name)
                .unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string()),
            version: config
                .version
                .or(defaults.version)
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            author: config.author.or(defaults.author).unwrap_or_default(),
            license: config
                .license
                .or(defaults.license)
                .unwrap_or_else(|| DEFAULT_LICENSE.to_string()),
            repository: config.repository.or(defaults.repository),
            scope: config
                .npm_scope
                .filter(|s| !s.trim().is_empty())
                .map(|s| npm_runner::normalize_scope(&s)),
        };

        Ok(Self {
            project_root,
            output_dir,
            package,
            publish: config.publish,
            watch: config.watch,
            auto_login: config.auto_login,
            dry_run,
            ignore: config.ignore,
            type_mappings: config.type_mappings,
        })
    }
}
