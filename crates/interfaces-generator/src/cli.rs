//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};

/// Generates TypeScript interfaces from C# records and classes and packages
/// them for npm.
#[derive(Debug, Parser)]
#[command(name = "interfaces-generator")]
#[command(version, about, long_about = None, disable_version_flag = true)]
pub struct Args {
    /// Path to the C# project (detected from *.csproj / *.sln when omitted)
    #[arg(short, long)]
    pub project: Option<Utf8PathBuf>,

    /// Output directory for the npm package
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// npm package name
    #[arg(short = 'n', long = "package-name")]
    pub package_name: Option<String>,

    /// npm package version
    #[arg(short = 'v', long = "version")]
    pub package_version: Option<String>,

    /// Git repository URL
    #[arg(short, long)]
    pub repository: Option<String>,

    /// Package author
    #[arg(short, long)]
    pub author: Option<String>,

    /// Package license
    #[arg(short, long)]
    pub license: Option<String>,

    /// Build and publish the package with npm after generating
    #[arg(long, visible_alias = "pub")]
    pub publish: bool,

    /// Regenerate whenever a .cs file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    /// Write the merged configuration to this path and exit
    #[arg(long = "save-config", value_name = "PATH")]
    pub save_config: Option<Utf8PathBuf>,

    /// Run `npm login` before publishing when not logged in
    #[arg(long = "auto-login")]
    pub auto_login: bool,

    /// npm scope for the package (e.g. `acme` → `@acme/<name>`)
    #[arg(long = "npm-scope")]
    pub npm_scope: Option<String>,

    /// Glob patterns to ignore, relative to the project
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Extra primitive mapping, e.g. `decimal=string`
    #[arg(long = "type-mapping", value_name = "CS=TS", value_parser = parse_type_mapping)]
    pub type_mapping: Vec<(String, String)>,

    /// Print the generated files instead of writing them
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the tool version
    #[arg(short = 'V', long = "tool-version", action = ArgAction::Version)]
    #[allow(dead_code)]
    pub tool_version: Option<bool>,
}

/// Parses a `CS=TS` type mapping.
pub fn parse_type_mapping(value: &str) -> Result<(String, String), String> {
    let (cs, ts) = value
        .split_once('=')
        .ok_or_else(|| format!("expected CS=TS, got `{value}`"))?;
    let (cs, ts) = (cs.trim(), ts.trim());
    if cs.is_empty() || ts.is_empty() {
        return Err(format!("expected CS=TS, got `{value}`"));
    }
    Ok((cs.to_string(), ts.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["interfaces-generator"]);
        assert!(args.project.is_none());
        assert!(args.output.is_none());
        assert!(!args.publish);
        assert!(!args.watch);
        assert!(!args.dry_run);
        assert!(args.ignore.is_empty());
    }

    #[test]
    fn test_short_flags() {
        let args = Args::parse_from([
            "interfaces-generator",
            "-p",
            "src/Mensajeria",
            "-o",
            "out",
            "-n",
            "mensajeria-types",
            "-v",
            "2.1.0",
            "-a",
            "Equipo",
            "-l",
            "MIT",
            "-w",
        ]);
        assert_eq!(args.project.as_deref().map(|p| p.as_str()), Some("src/Mensajeria"));
        assert_eq!(args.output.as_deref().map(|p| p.as_str()), Some("out"));
        assert_eq!(args.package_name.as_deref(), Some("mensajeria-types"));
        assert_eq!(args.package_version.as_deref(), Some("2.1.0"));
        assert_eq!(args.author.as_deref(), Some("Equipo"));
        assert_eq!(args.license.as_deref(), Some("MIT"));
        assert!(args.watch);
    }

    #[test]
    fn test_publish_alias() {
        let args = Args::parse_from(["interfaces-generator", "--pub", "--auto-login"]);
        assert!(args.publish);
        assert!(args.auto_login);
    }

    #[test]
    fn test_type_mappings() {
        let args = Args::parse_from([
            "interfaces-generator",
            "--type-mapping",
            "decimal=string",
            "--type-mapping",
            " Money = number ",
        ]);
        assert_eq!(
            args.type_mapping,
            vec![
                ("decimal".to_string(), "string".to_string()),
                ("Money".to_string(), "number".to_string())
            ]
        );
    }

    #[test]
    fn test_invalid_type_mapping() {
        assert!(Args::try_parse_from(["interfaces-generator", "--type-mapping", "decimal"]).is_err());
        assert!(Args::try_parse_from(["interfaces-generator", "--type-mapping", "=string"]).is_err());
    }

    #[test]
    fn test_tool_version_flag() {
        let err = Args::try_parse_from(["interfaces-generator", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_ignore_multiple() {
        let args = Args::parse_from([
            "interfaces-generator",
            "--ignore",
            "**/Tests/**",
            "--ignore",
            "Migrations/*.cs",
        ]);
        assert_eq!(args.ignore, vec!["**/Tests/**", "Migrations/*.cs"]);
    }
}
