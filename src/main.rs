use clap::Parser;
use miette::Result;
use mtbf::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let default_filter = if cli.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Init(args) => mtbf::cli::commands::init::run(args),
        Commands::Component(cmd) => mtbf::cli::commands::component::run(cmd, &cli.global),
        Commands::System(cmd) => mtbf::cli::commands::system::run(cmd, &cli.global),
        Commands::Markov(cmd) => mtbf::cli::commands::markov::run(cmd, &cli.global),
        Commands::Validate(args) => mtbf::cli::commands::validate::run(args),
        Commands::Completions(args) => mtbf::cli::commands::completions::run(args),
    }
}
