use crate::config::ConfigV1;
use crate::error::Result;
use crate::ext::PathExt;
use crate::renderer::TemplateRenderer;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Registers the files matched by `config.template_globs` as named templates.
///
/// Names are paths relative to `template_root` written with `/`, so rendered
/// content can `{% include %}` or `{% import %}` them.
pub fn add_templates_in_renderer(
    template_root: &Path,
    config: &ConfigV1,
    engine: &mut dyn TemplateRenderer,
) -> Result<usize> {
    let Some(globset) = build_templates_import_globset(&config.template_globs)? else {
        debug!("No template_globs configured; nothing to register for include/import.");
        return Ok(0);
    };

    debug!("Adding templates from glob patterns: {:?}", &config.template_globs);
    let mut added = 0;
    for entry in WalkDir::new(template_root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(template_root) else {
            continue;
        };
        let name = relative.to_slash_string();
        if !globset.is_match(&name) {
            continue;
        }
        let content = fs::read_to_string(entry.path())?;
        debug!("Adding template: {name}");
        engine.add_template(&name, &content)?;
        added += 1;
    }
    Ok(added)
}

/// Builds a `GlobSet` from patterns relative to the template root, or `None`
/// when there are no patterns.
pub fn build_templates_import_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(Some(builder.build()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MiniJinjaRenderer;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn registered_templates_can_be_included() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("partials/header.j2"), "# {{ project_slug }}").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a partial").unwrap();

        let config: ConfigV1 =
            serde_yaml::from_str("template_globs: ['partials/*.j2']\n").unwrap();
        let mut engine = MiniJinjaRenderer::new();
        let added = add_templates_in_renderer(dir.path(), &config, &mut engine).unwrap();
        assert_eq!(added, 1);

        let rendered = engine
            .render(
                "{% include 'partials/header.j2' %}",
                &json!({"project_slug": "demo"}),
                None,
            )
            .unwrap();
        assert_eq!(rendered, "# demo");
    }

    #[test]
    fn no_patterns_registers_nothing() {
        let dir = TempDir::new().unwrap();
        let config: ConfigV1 = serde_yaml::from_str("{}").unwrap();
        let mut engine = MiniJinjaRenderer::new();
        assert_eq!(add_templates_in_renderer(dir.path(), &config, &mut engine).unwrap(), 0);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(build_templates_import_globset(&["a[".to_string()]).is_err());
    }
}
