use serde::Serialize;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::answers::AnswerSet;
use crate::config::HookCommand;
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::renderer::TemplateRenderer;

/// Structure representing data passed to hook commands.
///
/// This data is serialized to JSON and passed to hooks via stdin.
#[derive(Serialize)]
struct Output<'a> {
    /// Path to the template directory
    pub template_dir: &'a str,
    /// Path to the output directory
    pub output_dir: &'a str,
    /// Resolved answers of the run
    pub answers: &'a serde_json::Value,
}

/// Renders each hook against the answers and turns it into an argv.
///
/// Shell strings are passed to `hook_runner` as its last argument; argv lists
/// are rendered element by element and run directly.
pub fn render_hook_commands(
    hooks: &[HookCommand],
    hook_runner: &[String],
    answers: &AnswerSet,
    engine: &dyn TemplateRenderer,
) -> Result<Vec<Vec<String>>> {
    let context = answers.to_context();
    let render = |hook: &HookCommand, text: &str| {
        engine.render(text, &context, Some("post_hooks")).map_err(|e| Error::HookLaunchError {
            command: hook_text(hook),
            reason: e.to_string(),
        })
    };

    hooks
        .iter()
        .map(|hook| match hook {
            HookCommand::Shell(command) => {
                let mut argv = hook_runner.to_vec();
                argv.push(render(hook, command)?);
                Ok(argv)
            }
            HookCommand::Argv(parts) => parts.iter().map(|part| render(hook, part)).collect(),
        })
        .filter(|argv: &Result<Vec<String>>| argv.as_ref().map_or(true, |a| !a.is_empty()))
        .collect()
}

/// Executes one hook command with the run's context on stdin.
///
/// # Returns
/// * `Result<String>` - The hook's stdout
///
/// # Notes
/// - The working directory is the output directory
/// - Non-zero exit codes from hooks are treated as errors
pub fn run_hook(
    template_dir: &Path,
    output_dir: &Path,
    argv: &[String],
    answers: &serde_json::Value,
) -> Result<String> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(String::new());
    };
    let command_line = argv.join(" ");

    let output = Output {
        template_dir: template_dir.to_str_checked()?,
        output_dir: output_dir.to_str_checked()?,
        answers,
    };
    let output_data = serde_json::to_vec(&output).map_err(Error::JSONParseError)?;

    log::info!("Running hook `{command_line}`");
    let launch_error = |e: std::io::Error| Error::HookLaunchError {
        command: command_line.clone(),
        reason: e.to_string(),
    };
    let mut child = Command::new(program)
        .args(args)
        .current_dir(output_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(launch_error)?;

    // The context is fed from its own thread so a hook that prints before
    // reading stdin cannot block on a full pipe.
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stdout_output = std::thread::scope(|scope| {
        if let Some(mut stdin) = stdin {
            scope.spawn(move || {
                if let Err(e) = stdin.write_all(&output_data).and_then(|_| stdin.write_all(b"\n")) {
                    if e.kind() == std::io::ErrorKind::BrokenPipe {
                        log::debug!("Hook closed stdin before reading the context");
                    } else {
                        log::warn!("Failed to write context to hook stdin: {e}");
                    }
                }
            });
        }
        let mut text = String::new();
        if let Some(stdout) = stdout {
            BufReader::new(stdout).read_to_string(&mut text)?;
        }
        Ok::<_, std::io::Error>(text)
    })
    .map_err(launch_error)?;

    let status = child.wait().map_err(launch_error)?;
    if !status.success() {
        return Err(Error::HookExecutionError { command: command_line, status });
    }
    if !stdout_output.is_empty() {
        log::debug!("Hook `{command_line}` output:\n{stdout_output}");
    }
    Ok(stdout_output)
}

fn hook_text(hook: &HookCommand) -> String {
    match hook {
        HookCommand::Shell(command) => command.clone(),
        HookCommand::Argv(parts) => parts.join(" "),
    }
}

/// Runs every hook in declared order, stopping at the first failure.
pub fn run_post_hooks(
    template_dir: &Path,
    output_dir: &Path,
    commands: &[Vec<String>],
    answers: &AnswerSet,
) -> Result<()> {
    let context = answers.to_context();
    for argv in commands {
        run_hook(template_dir, output_dir, argv, &context)?;
    }
    Ok(())
}
