//! The build pipeline.
//!
//! Control flow: single-threaded discovery, one task per unit for building,
//! channel-drained absorption into the aggregator behind an explicit join
//! barrier, a single-threaded date-parse-and-sort pass, one task per unit
//! for rendering against the frozen context, and a sequential writer. The
//! first error observed while draining either completion channel aborts the
//! whole build; files already written stay on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::report::Reporter;

use super::aggregate::{self, AggregateError, Aggregator};
use super::markdown;
use super::paths::{self, PathError, ROUTES_DIR, STATIC_DIR, TEMPLATES_DIR};
use super::render::{RenderError, Renderer};
use super::unit::{self, ContentUnit, UnitError};

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("project has no routes: {0}")]
    MissingRoutes(PathBuf),

    #[error("failed to resolve project root {path}: {source}")]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read directory {path}: {source}")]
    Walk {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("unable to create directory: {0}")]
    CreateDir(PathBuf),

    #[error("unable to read file: {0}")]
    Read(PathBuf),

    #[error("unable to write file: {0}")]
    Write(PathBuf),
}

/// What a finished build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub pages: usize,
    pub assets: usize,
}

/// Runs the build pipeline for one project.
pub struct Builder {
    root: PathBuf,
    config: Config,
    reporter: Arc<Reporter>,
}

impl Builder {
    pub fn new(root: PathBuf, config: Config) -> Self {
        let reporter = Arc::new(Reporter::new(config.verbose));
        Self {
            root,
            config,
            reporter,
        }
    }

    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        let root = normalize_root(&self.root)?;

        let routes = root.join(ROUTES_DIR);
        if !routes.is_dir() {
            return Err(BuildError::MissingRoutes(root));
        }

        let output = self.config.output_dir().to_string();
        let sources = discover_routes(&routes, &self.reporter)?;

        // Stage 1: one task per discovered file, results funneled through a
        // single completion channel.
        let (tx, mut rx) = mpsc::channel(sources.len().max(1));
        for source in &sources {
            let tx = tx.clone();
            let root = root.clone();
            let output = output.clone();
            let reporter = Arc::clone(&self.reporter);
            let source = source.clone();

            tokio::spawn(async move {
                let result = unit::build_unit(&root, &output, source, &reporter).await;
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        let aggregator = Arc::new(Aggregator::new());
        let mut absorptions = JoinSet::new();
        let mut units = Vec::with_capacity(sources.len());

        for _ in 0..sources.len() {
            let Some(result) = rx.recv().await else {
                unreachable!("unit completion channel closed before all units reported");
            };
            let built = result?;

            // Overlap absorption with channel draining.
            let aggregator = Arc::clone(&aggregator);
            let snapshot = built.clone();
            absorptions.spawn(async move { aggregator.absorb(&snapshot) });

            units.push(built);
        }

        // Barrier: every absorption acknowledged before the post-pass.
        while let Some(absorbed) = absorptions.join_next().await {
            absorbed.expect("absorption task panicked");
        }

        let groups = aggregator.finalize()?;
        let global = Arc::new(aggregate::context(&groups));

        // A project with nothing to render needs no template chain; a
        // static-only tree stays buildable without templates/base.tmpl.
        let total = units.len();
        if total > 0 {
            let renderer = Arc::new(Renderer::new(&root.join(TEMPLATES_DIR))?);

            // Surface dangling template overrides before anything is written.
            renderer.verify_overrides(&units)?;

            // Stage 2: one render task per unit against the frozen context.
            let (tx, mut rx) = mpsc::channel(total);
            for built in units {
                let tx = tx.clone();
                let renderer = Arc::clone(&renderer);
                let global = Arc::clone(&global);

                tokio::spawn(async move {
                    let result = match renderer.render(&built, &global) {
                        Ok(rendered) => Ok(ContentUnit { rendered, ..built }),
                        Err(e) => Err(e),
                    };
                    let _ = tx.send(result).await;
                });
            }
            drop(tx);

            for _ in 0..total {
                let Some(result) = rx.recv().await else {
                    unreachable!("render completion channel closed before all units reported");
                };
                let rendered = result?;
                write_bytes(&rendered.destination, rendered.rendered.as_bytes())?;
            }
        }

        // Pass-through assets, sequentially after all pages land.
        let statics = discover_static(&root.join(STATIC_DIR), &self.reporter)?;
        for source in &statics {
            let resolved = paths::resolve(&root, &output, source)?;
            let bytes = std::fs::read(source).map_err(|_| BuildError::Read(source.clone()))?;
            write_bytes(&resolved.destination, &bytes)?;
        }

        Ok(BuildReport {
            pages: total,
            assets: statics.len(),
        })
    }
}

fn normalize_root(root: &Path) -> Result<PathBuf, BuildError> {
    if root.is_absolute() {
        return Ok(root.to_path_buf());
    }

    std::path::absolute(root).map_err(|source| BuildError::Root {
        path: root.to_path_buf(),
        source,
    })
}

/// Walk the content root, emitting one path per processable file.
fn discover_routes(dir: &Path, reporter: &Reporter) -> Result<Vec<PathBuf>, BuildError> {
    let mut found = Vec::new();
    walk(dir, true, reporter, &mut found)?;
    Ok(found)
}

/// Walk the static root, emitting every regular non-hidden file.
fn discover_static(dir: &Path, reporter: &Reporter) -> Result<Vec<PathBuf>, BuildError> {
    if !dir.is_dir() {
        reporter.verbose(format!("project has no static directory: {}", dir.display()));
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    walk(dir, false, reporter, &mut found)?;
    Ok(found)
}

fn walk(
    dir: &Path,
    routes: bool,
    reporter: &Reporter,
    found: &mut Vec<PathBuf>,
) -> Result<(), BuildError> {
    let walk_err = |source| BuildError::Walk {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = std::fs::read_dir(dir)
        .map_err(walk_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(walk_err)?;

    // read_dir order is platform-defined; sort so discovery order is
    // deterministic.
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name();

        // Hidden entries are pruned before descending.
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        if path.is_dir() {
            walk(&path, routes, reporter, found)?;
        } else if path.is_file() {
            if !routes {
                found.push(path);
                continue;
            }

            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
            if markdown::recognized(extension) {
                found.push(path);
            } else {
                reporter.log(format!(
                    "skipped unrecognized file: {}",
                    name.to_string_lossy()
                ));
            }
        }
    }

    Ok(())
}

/// Persist bytes at a destination, creating parent directories as needed.
fn write_bytes(destination: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|_| BuildError::CreateDir(parent.to_path_buf()))?;
    }

    std::fs::write(destination, bytes).map_err(|_| BuildError::Write(destination.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn scaffold(root: &Path) {
        write(root, "templates/base.tmpl", "<main>{{ Content }}</main>");
        write(
            root,
            "routes/index.tmpl",
            "{% for post in Posts %}<a href=\"{{ post.Link }}\">{{ post.Title }}</a>{% endfor %}",
        );
        write(root, "routes/about.md", "# About\n");
        write(
            root,
            "routes/posts/first.md",
            "---\ndate: 2022-01-05\ntitle: First\n---\nfirst post\n",
        );
        write(
            root,
            "routes/posts/second.md",
            "---\ndate: 2022-11-20\ntitle: Second\n---\nsecond post\n",
        );
        write(root, "static/css/site.css", "body {}\n");
        write(root, "routes/.drafts/hidden.md", "never built\n");
        write(root, "routes/notes.txt", "unrecognized\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_build_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        scaffold(&root);

        let builder = Builder::new(root.clone(), Config::default());
        let report = builder.build().await.unwrap();

        assert_eq!(report.pages, 4);
        assert_eq!(report.assets, 1);

        // Pretty-URL convention.
        assert!(root.join("build/index.html").is_file());
        assert!(root.join("build/about/index.html").is_file());
        assert!(root.join("build/posts/first/index.html").is_file());
        assert!(root.join("build/posts/second/index.html").is_file());

        // Static mirror.
        assert_eq!(
            std::fs::read_to_string(root.join("build/css/site.css")).unwrap(),
            "body {}\n"
        );

        // Hidden and unrecognized files never produce output.
        assert!(!root.join("build/notes").exists());
        assert!(!root.join("build/.drafts").exists());

        // The index pre-render saw the posts group, newest first.
        let index = std::fs::read_to_string(root.join("build/index.html")).unwrap();
        let second = index.find("/posts/second/index.html").unwrap();
        let first = index.find("/posts/first/index.html").unwrap();
        assert!(second < first);
        assert!(index.starts_with("<main>"));

        // Layout wrapped page content.
        let about = std::fs::read_to_string(root.join("build/about/index.html")).unwrap();
        assert!(about.contains("<h1>About</h1>"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_build_missing_routes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();

        let builder = Builder::new(root, Config::default());
        assert!(matches!(
            builder.build().await,
            Err(BuildError::MissingRoutes(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_build_configured_output_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write(&root, "templates/base.tmpl", "{{ Content }}");
        write(&root, "routes/about.md", "hello\n");

        let config = Config {
            output: Some("public".to_string()),
            ..Config::default()
        };
        let builder = Builder::new(root.clone(), config);
        builder.build().await.unwrap();

        assert!(root.join("public/about/index.html").is_file());
        assert!(!root.join("build").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_build_static_only_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("routes")).unwrap();
        write(&root, "static/css/site.css", "body {}\n");

        // No templates directory at all; nothing renders, so none is needed.
        let builder = Builder::new(root.clone(), Config::default());
        let report = builder.build().await.unwrap();

        assert_eq!(report.pages, 0);
        assert_eq!(report.assets, 1);
        assert_eq!(
            std::fs::read_to_string(root.join("build/css/site.css")).unwrap(),
            "body {}\n"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_build_dangling_override_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write(&root, "templates/base.tmpl", "{{ Content }}");
        write(&root, "routes/about.md", "hello\n");
        write(
            &root,
            "routes/special.md",
            "---\ntemplate: absent.tmpl\n---\nbody\n",
        );

        let builder = Builder::new(root.clone(), Config::default());
        let err = builder.build().await.unwrap_err();

        assert!(matches!(
            err,
            BuildError::Render(RenderError::TemplateMissing { .. })
        ));
        assert!(!root.join("build").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_build_bad_date_fails() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write(&root, "templates/base.tmpl", "{{ Content }}");
        write(
            &root,
            "routes/posts/bad.md",
            "---\ndate: not-a-date\n---\nbody\n",
        );

        let builder = Builder::new(root.clone(), Config::default());
        assert!(matches!(
            builder.build().await,
            Err(BuildError::Aggregate(AggregateError::DateParse(_)))
        ));
    }
}
