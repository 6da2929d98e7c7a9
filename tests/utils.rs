#![allow(dead_code)]

use log::debug;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use stencil::cli::{AnswerArgs, CopyArgs, RunSummary, Runner, UpdateArgs};
use stencil::template::ConflictPolicy;
use walkdir::WalkDir;

/// Python-style project template used across the integration tests.
pub const PROJECT_SCHEMA: &str = r#"schemaVersion: v1
questions:
  project_slug:
    type: str
    help: Project slug
    default: my-project
    validation:
      rule: slug
  package_name:
    type: str
    help: Package name
    default: "{{ project_slug | snake_case }}"
    validation:
      rule: identifier
  license:
    type: str
    help: License
    choices: [MIT, Apache-2.0, GPL-3.0]
  include_docs:
    type: bool
    help: Include documentation?
    default: false
  docs_title:
    type: str
    help: Documentation title
    default: "{{ project_slug }} docs"
    ask_if: include_docs
"#;

/// Writes `files` (relative path, content) under `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// Builds the project template under `root`.
pub fn project_template(root: &Path) {
    write_tree(
        root,
        &[
            ("stencil.yaml", PROJECT_SCHEMA),
            ("README.md.stencil.j2", "# {{ project_slug }}\n\nLicensed under {{ license }}.\n"),
            ("LICENSE", "See README.\n"),
            ("src/{{ package_name }}/__init__.py.stencil.j2", "__all__ = [\"{{ package_name }}\"]\n"),
            ("{% if include_docs %}docs{% endif %}/index.md.stencil.j2", "# {{ docs_title }}\n"),
            ("{% if include_docs %}docs{% endif %}/assets/logo.txt", "logo\n"),
        ],
    );
}

/// Relative paths of every file below `root`, excluding stencil's state files.
pub fn list_files(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .filter(|p| !p.starts_with(".stencil-"))
        .collect()
}

pub fn answer_args(data: &[&str]) -> AnswerArgs {
    AnswerArgs {
        defaults: true,
        data: data.iter().map(|d| d.to_string()).collect(),
        ..Default::default()
    }
}

pub fn copy_args(template: &Path, output_dir: &Path, data: &[&str]) -> CopyArgs {
    CopyArgs {
        template: template.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        answers: answer_args(data),
    }
}

pub fn update_args(output_dir: &Path, data: &[&str], conflict: ConflictPolicy) -> UpdateArgs {
    UpdateArgs {
        output_dir: output_dir.to_path_buf(),
        template: None,
        conflict,
        answers: answer_args(data),
    }
}

/// Generates without prompting.
pub fn generate(template: &Path, output_dir: &Path, data: &[&str]) -> RunSummary {
    Runner::new().copy(&copy_args(template, output_dir, data)).unwrap()
}

/// Prints a diff of files and their contents between two directories.
/// Shows files only present in one directory and content differences for files present in both.
pub fn print_dir_diff(dir1: &Path, dir2: &Path) {
    let files1: BTreeSet<PathBuf> = relative_files(dir1);
    let files2: BTreeSet<PathBuf> = relative_files(dir2);

    println!("\n=== Directory Comparison ===");
    println!("Actual output:   {:?}", dir1);
    println!("Expected output: {:?}", dir2);

    for file in files1.difference(&files2) {
        println!("  + {:?}", file);
    }
    for file in files2.difference(&files1) {
        println!("  - {:?}", file);
    }
    for file in files1.intersection(&files2) {
        let content1 = fs::read(dir1.join(file)).unwrap();
        let content2 = fs::read(dir2.join(file)).unwrap();
        if content1 != content2 {
            println!("\n  File: {:?}", file);
            println!("  --- Actual content:\n{}", String::from_utf8_lossy(&content1));
            println!("  --- Expected content:\n{}", String::from_utf8_lossy(&content2));
        }
    }
    println!("=== End of Comparison ===\n");
}

fn relative_files(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

/// Asserts that two trees are identical, printing the differences otherwise.
pub fn assert_same_tree(actual: &Path, expected: &Path) {
    match dir_diff::is_different(actual, expected) {
        Ok(true) => {
            print_dir_diff(actual, expected);
            panic!("Directories differ. See above for details.");
        }
        Ok(false) => {}
        Err(e) => {
            debug!("Error comparing directories: {e:?}");
            panic!("Could not compare directories");
        }
    }
}
