mod utils;

use std::fs;
use stencil::cli::{HooksArgs, Runner};
use stencil::error::Error;
use stencil::metadata::AnswersFile;
use stencil::template::ConflictPolicy;
use tempfile::TempDir;
use test_log::test;
use utils::*;

struct Workspace {
    _dir: TempDir,
    template: std::path::PathBuf,
    output: std::path::PathBuf,
}

fn generated(data: &[&str]) -> Workspace {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template");
    let output = dir.path().join("out");
    project_template(&template);
    generate(&template, &output, data);
    Workspace { _dir: dir, template, output }
}

fn update(ws: &Workspace, data: &[&str], conflict: ConflictPolicy) -> stencil::cli::RunSummary {
    Runner::new().update(&update_args(&ws.output, data, conflict)).unwrap()
}

#[test]
fn update_with_defaults_reproduces_answers() {
    let ws = generated(&["project_slug=my-app", "include_docs=true", "license=Apache-2.0"]);
    let before = AnswersFile::load(&ws.output).unwrap();

    let summary = update(&ws, &[], ConflictPolicy::Keep);

    let after = AnswersFile::load(&ws.output).unwrap();
    assert_eq!(before.answers, after.answers);
    assert_eq!(summary.answers.get("license").unwrap(), "Apache-2.0");
    assert_eq!(summary.report.written(), 0);
}

#[test]
fn unchanged_files_keep_their_mtime() {
    let ws = generated(&[]);
    let readme = ws.output.join("README.md");
    let before = fs::metadata(&readme).unwrap().modified().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));
    update(&ws, &[], ConflictPolicy::Overwrite);

    assert_eq!(fs::metadata(&readme).unwrap().modified().unwrap(), before);
}

#[test]
fn changed_answers_rewrite_untouched_files() {
    let ws = generated(&[]);

    let summary = update(&ws, &["license=GPL-3.0"], ConflictPolicy::Keep);

    assert!(summary.report.conflicts.is_empty());
    assert_eq!(
        fs::read_to_string(ws.output.join("README.md")).unwrap(),
        "# my-project\n\nLicensed under GPL-3.0.\n"
    );
}

#[test]
fn local_edits_are_kept_by_default() {
    let ws = generated(&[]);
    fs::write(ws.output.join("README.md"), "# my own readme\n").unwrap();

    let summary = update(&ws, &["license=GPL-3.0"], ConflictPolicy::Keep);

    assert_eq!(summary.report.conflicts, vec!["README.md"]);
    assert_eq!(fs::read_to_string(ws.output.join("README.md")).unwrap(), "# my own readme\n");
}

#[test]
fn kept_conflict_is_reported_again_on_next_update() {
    let ws = generated(&[]);
    fs::write(ws.output.join("README.md"), "# my own readme\n").unwrap();

    let first = update(&ws, &["license=GPL-3.0"], ConflictPolicy::Keep);
    assert_eq!(first.report.conflicts, vec!["README.md"]);

    let second = update(&ws, &[], ConflictPolicy::Keep);
    assert_eq!(second.report.conflicts, vec!["README.md"]);
    assert_eq!(fs::read_to_string(ws.output.join("README.md")).unwrap(), "# my own readme\n");
}

#[test]
fn local_edits_are_replaced_with_overwrite_policy() {
    let ws = generated(&[]);
    fs::write(ws.output.join("README.md"), "# my own readme\n").unwrap();

    let summary = update(&ws, &["license=GPL-3.0"], ConflictPolicy::Overwrite);

    assert_eq!(summary.report.conflicts, vec!["README.md"]);
    assert_eq!(
        fs::read_to_string(ws.output.join("README.md")).unwrap(),
        "# my-project\n\nLicensed under GPL-3.0.\n"
    );
}

#[test]
fn files_no_longer_generated_are_reported_not_deleted() {
    let ws = generated(&["include_docs=true"]);

    let summary = update(&ws, &["include_docs=false"], ConflictPolicy::Keep);

    assert_eq!(summary.report.stale, vec!["docs/assets/logo.txt", "docs/index.md"]);
    assert!(ws.output.join("docs/index.md").exists());
}

#[test]
fn new_question_in_template_gets_its_default() {
    let ws = generated(&["project_slug=my-app"]);
    let schema = format!(
        "{PROJECT_SCHEMA}  description:\n    type: str\n    help: Description\n    default: A {{{{ project_slug }}}} project\n"
    );
    write_tree(
        &ws.template,
        &[("stencil.yaml", &schema), ("DESCRIPTION.md.stencil.j2", "{{ description }}\n")],
    );

    let summary = update(&ws, &[], ConflictPolicy::Keep);

    assert_eq!(summary.answers.get("project_slug").unwrap(), "my-app");
    assert_eq!(
        fs::read_to_string(ws.output.join("DESCRIPTION.md")).unwrap(),
        "A my-app project\n"
    );
}

#[test]
fn update_without_answers_file_fails() {
    let dir = TempDir::new().unwrap();
    let err = Runner::new()
        .update(&update_args(dir.path(), &[], ConflictPolicy::Keep))
        .unwrap_err();
    assert!(matches!(err, Error::AnswersFileNotFound { .. }));
}

#[cfg(unix)]
#[test]
fn hooks_can_be_rerun_from_answers_file() {
    let ws = generated(&["project_slug=my-app"]);
    let schema = format!("{PROJECT_SCHEMA}post_hooks:\n  - \"touch {{{{ package_name }}}}.ready\"\n");
    write_tree(&ws.template, &[("stencil.yaml", &schema)]);

    let args = HooksArgs { output_dir: ws.output.clone(), template: None, trust: true };
    assert!(Runner::new().hooks(&args).unwrap());
    assert!(ws.output.join("my_app.ready").exists());
}
