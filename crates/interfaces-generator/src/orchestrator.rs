//! Main orchestration logic.

use crate::cli::Args;
use crate::config::{ConfigError, GeneratorConfig, Settings};
use crate::output::GenerationSummary;
use crate::package;
use camino::{Utf8Path, Utf8PathBuf};
use csharp_parser::CompilationUnit;
use globset::{Glob, GlobSet, GlobSetBuilder};
use interface_synth::{PrimitiveMapping, SourceFile, Translation, Translator};
use miette::Diagnostic;
use npm_runner::{NpmRunner, PublishOptions};
use rayon::prelude::*;
use std::fs;
use std::time::Duration;
use thiserror::Error;
use walkdir::WalkDir;

/// Quiet period after the last change before regenerating.
const WATCH_DEBOUNCE: Duration = Duration::from_secs(2);

/// Sources under these directories are never read.
const DEFAULT_IGNORES: &[&str] = &["**/bin/**", "**/obj/**", "**/node_modules/**"];

/// Orchestration errors.
#[derive(Debug, Error, Diagnostic)]
pub enum GeneratorError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// The working directory is missing or not UTF-8.
    #[error("cannot use the current working directory")]
    #[diagnostic(code(generator::cwd))]
    WorkingDirectory,

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(code(generator::glob))]
    InvalidGlob(String),

    /// An output file could not be written.
    #[error("failed to write {path}")]
    #[diagnostic(code(generator::write))]
    WriteFailed {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// Watch error.
    #[error("watch error: {0}")]
    #[diagnostic(code(generator::watch))]
    WatchFailed(String),
}

/// Runs the generator.
pub async fn run(args: Args) -> Result<(), GeneratorError> {
    let cwd = std::env::current_dir()
        .ok()
        .and_then(|p| Utf8PathBuf::try_from(p).ok())
        .ok_or(GeneratorError::WorkingDirectory)?;

    let file_config = match &args.config {
        Some(path) => GeneratorConfig::load(&cwd.join(path))?,
        None => GeneratorConfig::default(),
    };
    let config = GeneratorConfig::from_args(&args).merged_over(file_config);

    if let Some(path) = &args.save_config {
        let path = cwd.join(path);
        config.save(&path)?;
        println!("Saved configuration to {path}");
        return Ok(());
    }

    let settings = Settings::resolve(config, &cwd, args.dry_run)?;
    log::info!("project: {}", settings.project_root);
    log::info!("output: {}", settings.output_dir);

    if settings.watch {
        run_watch_mode(&settings).await
    } else {
        generate(&settings).await.map(drop)
    }
}

/// Runs one full generation: discover, parse, translate, write and
/// optionally publish.
pub async fn generate(settings: &Settings) -> Result<GenerationSummary, GeneratorError> {
    let files = discover_sources(settings)?;
    log::info!("found {} source files", files.len());

    let parsed: Vec<Option<ParsedFile>> = files
        .par_iter()
        .map(|path| parse_file(&settings.project_root, path))
        .collect();
    let skipped_count = parsed.iter().filter(|p| p.is_none()).count();
    let parsed: Vec<ParsedFile> = parsed.into_iter().flatten().collect();

    let sources: Vec<SourceFile<'_>> = parsed
        .iter()
        .map(|file| SourceFile {
            path: &file.relative,
            unit: &file.unit,
        })
        .collect();

    let translator = Translator::new(PrimitiveMapping::with_overrides(
        settings
            .type_mappings
            .iter()
            .map(|(cs, ts)| (cs.as_str(), ts.as_str())),
    ));
    let translation = translator.translate(&sources);
    if translation.is_empty() {
        log::warn!("no records or classes found under {}", settings.project_root);
    }

    let mut summary = GenerationSummary::new(files.len(), skipped_count, &translation);

    if settings.dry_run {
        print!("{}", render_dry_run(&translation));
        println!("{}", summary.format());
        return Ok(summary);
    }

    summary.unwritten_count =
        write_package(settings, &translation, translator.primitives()).await?;
    println!("{}", summary.format());

    if settings.publish {
        publish(settings).await;
    }

    Ok(summary)
}

/// A source file that parsed cleanly.
struct ParsedFile {
    /// Path relative to the project root.
    relative: String,
    unit: CompilationUnit,
}

/// Reads and parses one file. Failures are logged and yield `None`.
fn parse_file(root: &Utf8Path, path: &Utf8Path) -> Option<ParsedFile> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            log::warn!("{path}: {e}");
            return None;
        }
    };

    let result = csharp_parser::parse(&source);
    if !result.errors.is_empty() {
        for error in &result.errors {
            log::warn!("{path}:{}: {error}", error.line_col(&source));
        }
        log::warn!("{path}: skipped");
        return None;
    }

    let relative = path.strip_prefix(root).unwrap_or(path).as_str().to_string();
    Some(ParsedFile {
        relative,
        unit: result.unit,
    })
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, GeneratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_IGNORES.iter().copied().chain(patterns.iter().map(String::as_str)) {
        let glob = Glob::new(pattern).map_err(|e| GeneratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| GeneratorError::InvalidGlob(e.to_string()))
}

/// Lists the `.cs` files under the project root, sorted by path.
fn discover_sources(settings: &Settings) -> Result<Vec<Utf8PathBuf>, GeneratorError> {
    let ignore_set = build_ignore_set(&settings.ignore)?;
    let root = &settings.project_root;

    let files = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| p.extension() == Some("cs"))
        .filter(|p| !p.starts_with(&settings.output_dir))
        .filter(|p| {
            let relative = p.strip_prefix(root).unwrap_or(p);
            !ignore_set.is_match(relative.as_str())
        })
        .collect();
    Ok(files)
}

fn render_dry_run(translation: &Translation) -> String {
    let mut out = String::new();
    for group in translation.groups.values() {
        out.push_str(&format!("// {}\n{}", group.file_path(), group.render()));
    }
    out.push_str(&format!("// src/index.ts\n{}", translation.render_index()));
    out
}

async fn write_file(path: &Utf8Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    log::debug!("wrote {path}");
    Ok(())
}

/// Writes the group files, the index and the package scaffolding.
///
/// Only a failure to create the output directory is an error. A file that
/// cannot be written is logged and the rest are still written; the number of
/// such files is returned.
async fn write_package(
    settings: &Settings,
    translation: &Translation,
    primitives: &PrimitiveMapping,
) -> Result<usize, GeneratorError> {
    let out = &settings.output_dir;
    let src = out.join("src");
    tokio::fs::create_dir_all(&src)
        .await
        .map_err(|source| GeneratorError::WriteFailed {
            path: src.clone(),
            source,
        })?;

    let mut files: Vec<(Utf8PathBuf, String)> = translation
        .groups
        .values()
        .map(|group| (out.join(group.file_path()), group.render()))
        .collect();
    files.push((src.join("index.ts"), translation.render_index()));
    files.push((out.join("package.json"), package::package_json(&settings.package)));
    files.push((out.join("tsconfig.json"), package::TSCONFIG_JSON.to_string()));
    files.push((out.join("README.md"), package::readme(&settings.package)));
    files.push((out.join("docs/PROCESS.md"), package::process_doc(primitives)));
    files.push((out.join("docs/EXAMPLES.md"), package::examples_doc(&settings.package)));

    let mut unwritten = 0;
    for (path, contents) in &files {
        if let Err(e) = write_file(path, contents).await {
            log::warn!("{path}: {e}");
            unwritten += 1;
        }
    }

    println!("Wrote package to {out}");
    Ok(unwritten)
}

/// Builds and publishes the package. Failures are reported, not returned:
/// the generated files stay in place either way.
async fn publish(settings: &Settings) {
    let options = PublishOptions {
        auto_login: settings.auto_login,
        scope: settings.package.scope.clone(),
    };
    let result = match NpmRunner::locate(settings.output_dir.clone()) {
        Ok(runner) => runner.publish_package(&options).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            if let Some(user) = &report.user {
                log::info!("published as {user}");
            }
            println!(
                "Published {}@{}",
                settings.package.full_name(),
                settings.package.version
            );
        }
        Err(e) => eprintln!("Error: publish failed: {e}"),
    }
}

/// Returns true for events that should trigger a regeneration.
fn is_source_change(event: &notify::Event) -> bool {
    if matches!(event.kind, notify::EventKind::Access(_)) {
        return false;
    }
    event.paths.iter().any(|p| {
        p.extension().map(|ext| ext == "cs").unwrap_or(false)
            && !p
                .components()
                .any(|c| c.as_os_str() == "bin" || c.as_os_str() == "obj")
    })
}

/// Runs in watch mode until Ctrl+C.
async fn run_watch_mode(settings: &Settings) -> Result<(), GeneratorError> {
    use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};

    println!("Starting watch mode...\n");
    generate(settings).await?;

    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) if is_source_change(&event) => {
                let _ = tx.blocking_send(());
            }
            Ok(_) => {}
            Err(e) => log::warn!("watch error: {e}"),
        },
        Config::default(),
    )
    .map_err(|e| GeneratorError::WatchFailed(e.to_string()))?;

    watcher
        .watch(settings.project_root.as_std_path(), RecursiveMode::Recursive)
        .map_err(|e| GeneratorError::WatchFailed(e.to_string()))?;

    println!(
        "Watching {} for changes... (Ctrl+C to stop)\n",
        settings.project_root
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!("\nStopped watching.");
                return Ok(());
            }
            change = rx.recv() => {
                if change.is_none() {
                    return Err(GeneratorError::WatchFailed(
                        "watch channel closed unexpectedly".to_string(),
                    ));
                }
                // Wait until the burst of events settles.
                while let Ok(Some(())) = tokio::time::timeout(WATCH_DEBOUNCE, rx.recv()).await {}

                println!("Change detected, regenerating...\n");
                if let Err(e) = generate(settings).await {
                    eprintln!("Error: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use notify::{Event, EventKind};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn project() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        for (path, contents) in [
            ("Api/Ordenes/Orden.cs", "public record Orden(int Id);"),
            ("Api/Clientes/Cliente.cs", "public class Cliente { public string Nombre { get; set; } }"),
            ("Api/obj/Debug/AssemblyInfo.cs", "public class Generated { }"),
            ("Api/Tests/OrdenTests.cs", "public class OrdenTests { }"),
            ("Api/Notes.txt", "not C#"),
        ] {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        (dir, root)
    }

    fn settings(root: &Utf8Path, ignore: &[&str]) -> Settings {
        let config = GeneratorConfig {
            project_path: Some(Utf8PathBuf::from("Api")),
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        Settings::resolve(config, root, false).unwrap()
    }

    fn relative(root: &Utf8Path, files: &[Utf8PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().as_str().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_discover_sources() {
        let (_dir, root) = project();
        let settings = settings(&root, &[]);
        let files = discover_sources(&settings).unwrap();
        assert_eq!(
            relative(&settings.project_root, &files),
            vec!["Clientes/Cliente.cs", "Ordenes/Orden.cs", "Tests/OrdenTests.cs"]
        );
    }

    #[test]
    fn test_discover_sources_with_ignore() {
        let (_dir, root) = project();
        let settings = settings(&root, &["Tests/**"]);
        let files = discover_sources(&settings).unwrap();
        assert_eq!(
            relative(&settings.project_root, &files),
            vec!["Clientes/Cliente.cs", "Ordenes/Orden.cs"]
        );
    }

    #[test]
    fn test_invalid_glob() {
        let err = build_ignore_set(&["[".to_string()]).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidGlob(_)));
    }

    #[test]
    fn test_parse_file_skips_broken_source() {
        let (_dir, root) = project();
        let api = root.join("Api");
        let broken = api.join("Broken.cs");
        fs::write(&broken, "public class (int X);").unwrap();
        assert!(parse_file(&api, &broken).is_none());

        let parsed = parse_file(&api, &api.join("Ordenes/Orden.cs")).unwrap();
        assert_eq!(parsed.relative.replace('\\', "/"), "Ordenes/Orden.cs");
        assert_eq!(parsed.unit.declarations.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_writes_package() {
        let (_dir, root) = project();
        let settings = settings(&root, &["Tests/**"]);
        let summary = generate(&settings).await.unwrap();
        assert_eq!(
            summary,
            GenerationSummary {
                file_count: 2,
                skipped_count: 0,
                declaration_count: 2,
                group_count: 2,
                unwritten_count: 0,
            }
        );

        let out = &settings.output_dir;
        for file in [
            "src/clientes/clientes.ts",
            "src/ordenes/ordenes.ts",
            "src/index.ts",
            "package.json",
            "tsconfig.json",
            "README.md",
            "docs/PROCESS.md",
            "docs/EXAMPLES.md",
        ] {
            assert!(out.join(file).is_file(), "missing {file}");
        }
        assert_eq!(
            fs::read_to_string(out.join("src/index.ts")).unwrap(),
            "export * from './clientes/clientes';\nexport * from './ordenes/ordenes';\n"
        );
    }

    #[tokio::test]
    async fn test_unwritable_file_does_not_stop_the_rest() {
        let (_dir, root) = project();
        let settings = settings(&root, &["Tests/**"]);
        // A directory where the clientes module file should go.
        fs::create_dir_all(settings.output_dir.join("src/clientes/clientes.ts")).unwrap();

        let summary = generate(&settings).await.unwrap();
        assert_eq!(summary.unwritten_count, 1);
        assert!(summary.format().ends_with("(1 file not written)"));

        let out = &settings.output_dir;
        assert!(out.join("src/ordenes/ordenes.ts").is_file());
        assert!(out.join("src/index.ts").is_file());
        assert!(out.join("package.json").is_file());
    }

    #[tokio::test]
    async fn test_output_root_failure_is_fatal() {
        let (_dir, root) = project();
        let settings = settings(&root, &["Tests/**"]);
        fs::write(&settings.output_dir, "not a directory").unwrap();

        let err = generate(&settings).await.unwrap_err();
        assert!(matches!(err, GeneratorError::WriteFailed { .. }));
    }

    #[test]
    fn test_is_source_change() {
        let modify = |path: &str| {
            Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from(path))
        };
        assert!(is_source_change(&modify("/p/Ordenes/Orden.cs")));
        assert!(!is_source_change(&modify("/p/Ordenes/Orden.txt")));
        assert!(!is_source_change(&modify("/p/obj/Debug/AssemblyInfo.cs")));
        assert!(is_source_change(
            &Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/p/A.cs"))
        ));
        assert!(!is_source_change(
            &Event::new(EventKind::Access(AccessKind::Any)).add_path(PathBuf::from("/p/A.cs"))
        ));
    }

    #[test]
    fn test_render_dry_run() {
        let unit = csharp_parser::parse("public record Orden(int Id);").unit;
        let files = [SourceFile {
            path: "Ordenes/Orden.cs",
            unit: &unit,
        }];
        let translation = Translator::default().translate(&files);
        insta::assert_snapshot!(render_dry_run(&translation), @r"
        // src/ordenes/ordenes.ts
        export interface Orden {
          id: number;
        }

        // src/index.ts
        export * from './ordenes/ordenes';
        ");
    }
}
