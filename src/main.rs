use std::io::IsTerminal;

use stencil::{
    cli::{get_args, get_log_level_from_verbose, Commands, Runner},
    error::default_error_handler,
    prompt::{get_prompt_provider, Prompter},
};

fn main() {
    let cli = get_args();
    env_logger::Builder::new()
        .filter_level(get_log_level_from_verbose(cli.verbose))
        .init();

    let prompter = get_prompt_provider();
    let mut runner = if std::io::stdin().is_terminal() {
        Runner::with_prompter(&prompter as &dyn Prompter)
    } else {
        Runner::new()
    };

    let result = match &cli.command {
        Commands::Copy(args) => runner.copy(args).map(|_| ()),
        Commands::Update(args) => runner.update(args).map(|_| ()),
        Commands::Hooks(args) => runner.hooks(args).map(|_| ()),
    };

    if let Err(err) = result {
        default_error_handler(err);
    }
}
