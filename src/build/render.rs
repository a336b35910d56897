//! Template rendering.
//!
//! Each unit renders against a template chain: the shared `base.tmpl`
//! layout, any `base_`-prefixed partials sitting alongside it, and an
//! optional per-unit override appended last. The override is the entry
//! template when present (tera inheritance, `{% extends "base.tmpl" %}`),
//! otherwise the layout itself is rendered.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::util::title_case;

use super::markdown::TEMPLATE_EXT;
use super::matter::Fields;
use super::unit::ContentUnit;

/// The shared layout every page renders through.
pub const BASE_TEMPLATE: &str = "base.tmpl";

/// Templates with this prefix are partials included by the layout.
pub const PARTIAL_PREFIX: &str = "base_";

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("missing base template `base.tmpl` in {0}")]
    BaseMissing(PathBuf),

    #[error("failed to read templates directory {path}: {source}")]
    Templates {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to locate template `{template}` requested by: {unit}")]
    TemplateMissing { template: String, unit: PathBuf },

    #[error("failed to parse templates for resource {path}: {source}")]
    Parse { path: PathBuf, source: tera::Error },

    #[error("encountered a problem while executing template for {path}: {source}")]
    Exec { path: PathBuf, source: tera::Error },
}

/// Renders units against the project's template chain.
///
/// The layout and partial set are resolved once; rendering itself is
/// read-only and safe to run from many tasks at once.
pub struct Renderer {
    templates_dir: PathBuf,
    chain: Vec<(PathBuf, Option<String>)>,
}

impl Renderer {
    /// Resolve the shared template chain under `templates_dir`.
    pub fn new(templates_dir: &Path) -> Result<Self, RenderError> {
        let base = templates_dir.join(BASE_TEMPLATE);
        if !base.is_file() {
            return Err(RenderError::BaseMissing(templates_dir.to_path_buf()));
        }

        let mut chain = vec![(base, Some(BASE_TEMPLATE.to_string()))];

        let entries =
            std::fs::read_dir(templates_dir).map_err(|source| RenderError::Templates {
                path: templates_dir.to_path_buf(),
                source,
            })?;

        let mut partials = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            // Partials are keyed on the name prefix alone, whatever their
            // extension.
            if path.is_file() && name.starts_with(PARTIAL_PREFIX) {
                partials.push((path.clone(), Some(name.to_string())));
            }
        }

        // read_dir order is platform-defined; keep the chain deterministic.
        partials.sort();
        chain.extend(partials);

        Ok(Self {
            templates_dir: templates_dir.to_path_buf(),
            chain,
        })
    }

    /// Check that every declared template override exists.
    ///
    /// Run before the render stage spawns so a dangling reference aborts
    /// the build while the output tree is still untouched.
    pub fn verify_overrides<'a>(
        &self,
        units: impl IntoIterator<Item = &'a ContentUnit>,
    ) -> Result<(), RenderError> {
        for unit in units {
            if let Some(requested) = &unit.template
                && !self.templates_dir.join(requested).is_file()
            {
                return Err(RenderError::TemplateMissing {
                    template: requested.clone(),
                    unit: unit.source.clone(),
                });
            }
        }

        Ok(())
    }

    /// Render a unit against the frozen global context.
    pub fn render(
        &self,
        unit: &ContentUnit,
        global: &Map<String, Value>,
    ) -> Result<String, RenderError> {
        let exec = |source| RenderError::Exec {
            path: unit.source.clone(),
            source,
        };

        let mut chain = self.chain.clone();
        let mut entry = BASE_TEMPLATE.to_string();

        if let Some(requested) = &unit.template {
            let path = self.templates_dir.join(requested);
            if !path.is_file() {
                return Err(RenderError::TemplateMissing {
                    template: requested.clone(),
                    unit: unit.source.clone(),
                });
            }

            entry = requested.clone();
            chain.push((path, Some(requested.clone())));
        }

        // Literal template sources get a pre-render pass against the global
        // context alone, so a content file can itself list collection data
        // before becoming the `Content` value of the outer layout.
        let content = if unit.extension == TEMPLATE_EXT {
            let context = Context::from_value(Value::Object(global.clone())).map_err(exec)?;
            Tera::one_off(&unit.transformed, &context, false).map_err(exec)?
        } else {
            unit.transformed.clone()
        };

        let context = merge_context(global, &unit.fields, &content).map_err(exec)?;

        let mut tera = Tera::default();
        tera.add_template_files(chain)
            .map_err(|source| RenderError::Parse {
                path: unit.source.clone(),
                source,
            })?;

        tera.render(&entry, &context).map_err(exec)
    }
}

/// Build the final render context: global data, overlaid with the unit's
/// Title-cased fields (local wins on collision), plus `Content`.
fn merge_context(
    global: &Map<String, Value>,
    fields: &Fields,
    content: &str,
) -> tera::Result<Context> {
    let mut context = Context::from_value(Value::Object(global.clone()))?;

    for (key, value) in fields {
        context.insert(title_case(key), &value.to_json());
    }

    context.insert("Content", content);

    Ok(context)
}
