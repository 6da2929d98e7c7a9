use crate::{
    answers::{AnswerResolver, AnswerSet, Overrides},
    cli::{AnswerArgs, CopyArgs, HooksArgs, UpdateArgs},
    config::{Config, ConfigV1, Question},
    constants::STDIN_INDICATOR,
    error::{Error, Result},
    hooks::{render_hook_commands, run_post_hooks},
    ignore::parse_ignore_file,
    import::add_templates_in_renderer,
    ioutils::{parse_string_to_json, read_from, validate_output_dir},
    metadata::{AnswersFile, Manifest},
    prompt::Prompter,
    renderer::{get_template_engine, MiniJinjaRenderer},
    template::{
        scan_template_tree, Dispatcher, GenerationMode, PathResolver,
        RenderReport, SourceEntry,
    },
};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    ResolvingAnswers,
    ResolvingPaths,
    Rendering,
    Done,
    Failed,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub output_root: PathBuf,
    pub answers: AnswerSet,
    pub report: RenderReport,
    /// Whether the post-generation hooks ran.
    pub hooks_ran: bool,
}

/// Everything loaded from the template before answers are resolved.
struct LoadedTemplate {
    root: PathBuf,
    config: ConfigV1,
    engine: MiniJinjaRenderer,
    entries: Vec<SourceEntry>,
}

/// Drives one run through `Loading → ResolvingAnswers → ResolvingPaths →
/// Rendering → Done`. Any error moves it to `Failed`; nothing is retried.
pub struct Runner<'a> {
    stage: Stage,
    failed_in: Option<Stage>,
    prompter: Option<&'a dyn Prompter>,
}

impl Default for Runner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Runner<'a> {
    /// A runner that never prompts.
    pub fn new() -> Self {
        Self { stage: Stage::Loading, failed_in: None, prompter: None }
    }

    /// A runner that asks through `prompter` unless `--defaults` is given.
    pub fn with_prompter(prompter: &'a dyn Prompter) -> Self {
        Self { stage: Stage::Loading, failed_in: None, prompter: Some(prompter) }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The stage a failed run stopped in.
    pub fn failed_in(&self) -> Option<Stage> {
        self.failed_in
    }

    /// Generates a new project.
    pub fn copy(&mut self, args: &CopyArgs) -> Result<RunSummary> {
        let result = self.run_copy(args);
        self.finish(result)
    }

    /// Re-applies the template to a project generated before.
    pub fn update(&mut self, args: &UpdateArgs) -> Result<RunSummary> {
        let result = self.run_update(args);
        self.finish(result)
    }

    /// Re-runs the hooks of a generated project.
    pub fn hooks(&mut self, args: &HooksArgs) -> Result<bool> {
        let result = self.run_hooks(args);
        self.finish(result)
    }

    fn run_copy(&mut self, args: &CopyArgs) -> Result<RunSummary> {
        self.enter(Stage::Loading);
        let output_root = validate_output_dir(&args.output_dir)?;
        let template = self.load_template(&args.template)?;

        self.generate(template, output_root, &args.answers, None, GenerationMode::Generate)
    }

    fn run_update(&mut self, args: &UpdateArgs) -> Result<RunSummary> {
        self.enter(Stage::Loading);
        let output_root = validate_output_dir(&args.output_dir)?;
        let answers_file = AnswersFile::load(&output_root)?;
        let previous = Manifest::load(&output_root)?;
        let template_root =
            args.template.clone().unwrap_or_else(|| PathBuf::from(&answers_file.src_path));
        let template = self.load_template(&template_root)?;

        let prior = answers_file.to_answer_set();
        let mode = GenerationMode::Update { previous, conflict_policy: args.conflict };
        self.generate(template, output_root, &args.answers, Some(&prior), mode)
    }

    fn run_hooks(&mut self, args: &HooksArgs) -> Result<bool> {
        self.enter(Stage::Loading);
        let answers_file = AnswersFile::load(&args.output_dir)?;
        let template_root =
            args.template.clone().unwrap_or_else(|| PathBuf::from(&answers_file.src_path));
        let template = self.load_template(&template_root)?;
        self.enter(Stage::Done);

        let answers = answers_file.to_answer_set();
        self.execute_post_hooks(&template, &args.output_dir, &answers, args.trust, true)
    }

    fn generate(
        &mut self,
        template: LoadedTemplate,
        output_root: PathBuf,
        answer_args: &AnswerArgs,
        prior: Option<&AnswerSet>,
        mode: GenerationMode,
    ) -> Result<RunSummary> {
        self.enter(Stage::ResolvingAnswers);
        let overrides = collect_overrides(answer_args, &template.config.questions)?;
        let resolver = match self.prompter {
            Some(prompter) if !answer_args.defaults => {
                AnswerResolver::interactive(&template.engine, prompter)
            }
            _ => AnswerResolver::new(&template.engine),
        };
        let answers = resolver.resolve(&template.config.questions, prior, &overrides)?;
        log::debug!("Resolved answers: {:?}", answers);

        self.enter(Stage::ResolvingPaths);
        let resolved = PathResolver::new(&template.engine, &template.config.template_suffix)
            .resolve(&template.entries, &answers)?;

        self.enter(Stage::Rendering);
        let report = Dispatcher::new(&template.engine, &output_root, mode)
            .dry_run(answer_args.dry_run)
            .dispatch(&resolved, &answers)?;
        if !answer_args.dry_run {
            AnswersFile::new(&template.root, &answers, &template.config.questions)
                .save(&output_root)?;
            report.manifest.save(&output_root)?;
        }
        self.enter(Stage::Done);

        let hooks_ran = if answer_args.dry_run {
            if !template.config.post_hooks.is_empty() {
                log::info!("[DRY RUN] Skipping {} post-generation hook(s)", template.config.post_hooks.len());
            }
            false
        } else {
            let interactive = self.prompter.is_some() && !answer_args.defaults;
            self.execute_post_hooks(&template, &output_root, &answers, answer_args.trust, interactive)?
        };

        println!("Template generation completed successfully in {}.", output_root.display());
        if !report.conflicts.is_empty() {
            println!("Conflicts left for review: {}", report.conflicts.join(", "));
        }
        Ok(RunSummary { output_root, answers, report, hooks_ran })
    }

    /// Loads the schema, shared templates and source tree of a template.
    fn load_template(&self, template_root: &Path) -> Result<LoadedTemplate> {
        if !template_root.is_dir() {
            return Err(Error::TemplateDoesNotExistsError {
                template_dir: template_root.display().to_string(),
            });
        }
        let Config::V1(config) = Config::load_config(template_root)?;

        let mut engine = get_template_engine();
        add_templates_in_renderer(template_root, &config, &mut engine)?;

        let ignored = parse_ignore_file(template_root)?;
        let entries = scan_template_tree(template_root, &ignored)?;

        Ok(LoadedTemplate { root: template_root.to_path_buf(), config, engine, entries })
    }

    /// Runs the post-generation hooks when trusted. Returns whether they ran.
    fn execute_post_hooks(
        &self,
        template: &LoadedTemplate,
        output_root: &Path,
        answers: &AnswerSet,
        trust: bool,
        interactive: bool,
    ) -> Result<bool> {
        let hooks = &template.config.post_hooks;
        if hooks.is_empty() {
            return Ok(false);
        }

        let trusted = match self.prompter {
            _ if trust => true,
            Some(prompter) if interactive => prompter.confirm(
                &format!("The template declares {} post-generation hook(s). Run them?", hooks.len()),
                false,
            )?,
            _ => {
                log::warn!(
                    "Skipping {} post-generation hook(s); pass --trust to run them",
                    hooks.len()
                );
                false
            }
        };
        if !trusted {
            return Ok(false);
        }

        let commands =
            render_hook_commands(hooks, &template.config.hook_runner, answers, &template.engine)?;
        run_post_hooks(&template.root, output_root, &commands, answers)?;
        Ok(true)
    }

    fn enter(&mut self, stage: Stage) {
        log::debug!("Stage: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::error!("Run failed during {:?}: {err}", self.stage);
            self.failed_in = Some(self.stage);
            self.stage = Stage::Failed;
        }
        result
    }
}

/// Layers the answer sources: answers file, then `--answers`, then `--data`.
pub fn collect_overrides(
    args: &AnswerArgs,
    questions: &IndexMap<String, Question>,
) -> Result<Overrides> {
    let mut overrides = Overrides::new();

    if let Some(path) = &args.answers_file {
        let content = std::fs::read_to_string(path)?;
        let values: IndexMap<String, serde_json::Value> =
            match path.extension().and_then(|e| e.to_str()) {
                Some("json") => serde_json::from_str(&content)?,
                _ => serde_yaml::from_str(&content)?,
            };
        // `_`-prefixed keys are bookkeeping of a previous run's answers file.
        overrides.merge_values(values.into_iter().filter(|(k, _)| !k.starts_with('_')), questions)?;
    }

    if let Some(answers) = &args.answers {
        let buf = if answers == STDIN_INDICATOR {
            read_from(std::io::stdin())?
        } else {
            answers.clone()
        };
        overrides.merge_values(parse_string_to_json(&buf)?, questions)?;
    }

    overrides.merge_entries(&args.data, questions)?;
    Ok(overrides)
}
