//! Output path resolution.
//!
//! Maps a source path to its destination in the output tree and its public
//! link path. Pages follow the pretty-URL convention: `about.md` becomes
//! `about/index.html` (served at `/about/`) while `index.md` becomes
//! `index.html` at the directory's own level. Static assets mirror their
//! path under the output root.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Page sources live here.
pub const ROUTES_DIR: &str = "routes";

/// Pass-through assets live here.
pub const STATIC_DIR: &str = "static";

/// Layouts and partials live here.
pub const TEMPLATES_DIR: &str = "templates";

#[derive(thiserror::Error, Debug)]
pub enum PathError {
    #[error("path is not inside of the project: {0}")]
    OutsideProject(PathBuf),

    #[error("resource is missing a valid extension: {0}")]
    MissingExtension(PathBuf),

    #[error("failed to resolve absolute path for {path}: {source}")]
    Normalize {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where a source file lands, and the URL path it is served at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub destination: PathBuf,
    pub link: String,
}

/// Determine the destination and link path for a source file.
///
/// Pure apart from working-directory lookup when given relative paths; the
/// destination is a deterministic function of the project root, the output
/// directory name, and the source path.
pub fn resolve(root: &Path, output: &str, source: &Path) -> Result<ResolvedOutput, PathError> {
    let root = normalize(root)?;
    let source = normalize(source)?;

    let relative = source
        .strip_prefix(&root)
        .map_err(|_| PathError::OutsideProject(source.clone()))?
        .to_path_buf();

    let mut segments = relative.iter();
    let section = segments.next().and_then(OsStr::to_str);
    let rest: Vec<&OsStr> = segments.collect();

    let relative_output = match section {
        Some(ROUTES_DIR) => {
            let Some((last, between)) = rest.split_last() else {
                unreachable!("route resolution received the routes directory itself");
            };

            let name = Path::new(last);
            let stem = name.file_stem().and_then(OsStr::to_str).unwrap_or_default();

            let mut out: PathBuf = between.iter().copied().collect();
            if stem == "index" {
                out.push("index.html");
            } else {
                if name.extension().is_none() {
                    return Err(PathError::MissingExtension(source.clone()));
                }

                out.push(stem);
                out.push("index.html");
            }

            out
        }
        Some(STATIC_DIR) => rest.iter().copied().collect(),
        other => unreachable!(
            "received call to determine output path for unexpected section in project: {other:?}"
        ),
    };

    let destination = root.join(output).join(&relative_output);
    let link = link_of(&relative_output);

    Ok(ResolvedOutput { destination, link })
}

/// Build a `/`-prefixed, `/`-separated link from an output-relative path.
fn link_of(relative: &Path) -> String {
    let joined = relative
        .iter()
        .map(|segment| segment.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    format!("/{joined}")
}

fn normalize(path: &Path) -> Result<PathBuf, PathError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    std::path::absolute(path).map_err(|source| PathError::Normalize {
        path: path.to_path_buf(),
        source,
    })
}
