//! Content units and the per-file build operation.
//!
//! A [`ContentUnit`] is one source file moving through the pipeline. The
//! unit builder composes reading, front matter extraction, transformation,
//! and output path resolution into a single operation, run once per
//! discovered file, concurrently.

use std::path::{Path, PathBuf};

use crate::report::Reporter;

use super::markdown;
use super::matter::{self, Fields};
use super::paths::{self, PathError};

#[derive(thiserror::Error, Debug)]
pub enum UnitError {
    #[error("unable to read file: {0}")]
    Read(PathBuf),

    #[error("unable to extract metadata from file: {0}")]
    Matter(PathBuf),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// One source file being processed as part of a project.
#[derive(Debug, Clone)]
pub struct ContentUnit {
    /// Absolute path to the source file. Unique across a build.
    pub source: PathBuf,
    /// Where the rendered output is written.
    pub destination: PathBuf,
    /// Public URL path, relative to the output root.
    pub link: String,
    /// Source extension, one of the recognized set.
    pub extension: String,
    /// The file contents as read from disk.
    pub raw: String,
    /// Render-ready markup produced by the transformer.
    pub transformed: String,
    /// Final bytes produced by the renderer. Empty until rendered.
    pub rendered: String,
    /// Front matter fields, minus the promoted `template`/`date` keys.
    pub fields: Fields,
    /// Collection this unit belongs to, from its parent directory.
    pub group: Option<String>,
    /// Per-unit template override, popped out of the front matter.
    pub template: Option<String>,
    /// Raw date string, popped out of the front matter.
    pub date: Option<String>,
}

/// Build a content unit from the file at `source`.
///
/// `root` must be absolute; the discoverer guarantees the file carries a
/// recognized extension.
pub async fn build_unit(
    root: &Path,
    output: &str,
    source: PathBuf,
    reporter: &Reporter,
) -> Result<ContentUnit, UnitError> {
    let raw = tokio::fs::read_to_string(&source)
        .await
        .map_err(|_| UnitError::Read(source.clone()))?;

    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();

    let resolved = paths::resolve(root, output, &source)?;

    // Units nested beneath a directory inside routes/ belong to a group
    // named after their parent directory.
    let group = source.strip_prefix(root).ok().and_then(|relative| {
        if relative.iter().count() > 2 {
            source
                .parent()
                .and_then(|parent| parent.file_name())
                .and_then(|name| name.to_str())
                .map(str::to_string)
        } else {
            None
        }
    });

    let mut fields = Fields::new();
    let mut body = raw.as_str();

    if matter::detect(&raw) {
        let (metadata, rest) = matter::split(&raw).map_err(|_| UnitError::Matter(source.clone()))?;
        body = rest;

        match matter::parse_fields(metadata) {
            Ok(parsed) => fields = parsed,
            Err(e) => reporter.log(format!(
                "ignoring malformed metadata in file {}: {e}",
                source.display()
            )),
        }
    } else {
        reporter.verbose(format!("found no metadata in file: {}", source.display()));
    }

    let template = take_string(&mut fields, "template", &source, reporter);
    let date = take_string(&mut fields, "date", &source, reporter);

    let transformed = markdown::transform(&extension, body);

    Ok(ContentUnit {
        source,
        destination: resolved.destination,
        link: resolved.link,
        extension,
        raw,
        transformed,
        rendered: String::new(),
        fields,
        group,
        template,
        date,
    })
}

/// Pop a reserved key out of the fields, accepting only string values.
fn take_string(
    fields: &mut Fields,
    key: &str,
    source: &Path,
    reporter: &Reporter,
) -> Option<String> {
    let value = fields.remove(key)?;

    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            reporter.log(format!(
                "ignoring non-string `{key}` in file: {}",
                source.display()
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::matter::FieldValue;

    fn write_route(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join("routes").join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_build_unit_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let source = write_route(
            &root,
            "posts/first.md",
            "---\ndate: 2022-12-15\ntemplate: post.tmpl\nauthor: someone\n---\n# First\n",
        );

        let reporter = Reporter::default();
        let unit = build_unit(&root, "build", source.clone(), &reporter)
            .await
            .unwrap();

        assert_eq!(unit.source, source);
        assert_eq!(unit.destination, root.join("build/posts/first/index.html"));
        assert_eq!(unit.link, "/posts/first/index.html");
        assert_eq!(unit.extension, "md");
        assert_eq!(unit.group.as_deref(), Some("posts"));
        assert_eq!(unit.template.as_deref(), Some("post.tmpl"));
        assert_eq!(unit.date.as_deref(), Some("2022-12-15"));
        assert!(unit.transformed.contains("<h1>First</h1>"));

        // Promoted keys must not remain under their original names.
        assert!(!unit.fields.contains_key("template"));
        assert!(!unit.fields.contains_key("date"));
        assert_eq!(
            unit.fields.get("author"),
            Some(&FieldValue::String("someone".to_string()))
        );
    }

    #[tokio::test]
    async fn test_build_unit_without_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let source = write_route(&root, "about.md", "plain body\n");

        let reporter = Reporter::default();
        let unit = build_unit(&root, "build", source, &reporter).await.unwrap();

        assert_eq!(unit.raw, "plain body\n");
        assert!(unit.fields.is_empty());
        assert!(unit.group.is_none());
        assert!(unit.template.is_none());
        assert!(unit.date.is_none());
        assert!(unit.transformed.contains("plain body"));
    }

    #[tokio::test]
    async fn test_build_unit_html_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let source = write_route(&root, "raw.html", "<p>kept</p>\n");

        let reporter = Reporter::default();
        let unit = build_unit(&root, "build", source, &reporter).await.unwrap();

        assert_eq!(unit.transformed, "<p>kept</p>\n");
    }

    #[tokio::test]
    async fn test_build_unit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let source = root.join("routes").join("gone.md");

        let reporter = Reporter::default();
        let result = build_unit(&root, "build", source, &reporter).await;

        assert!(matches!(result, Err(UnitError::Read(_))));
    }
}
