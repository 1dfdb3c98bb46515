use clap::Parser;
use log::debug;

use llml::{
    cli::{
        args::{Action, CliArgs},
        prompt::InteractiveSelector,
    },
    config::LlmlConfig,
    update::AllSelector,
    Llml,
};

fn run(cli_args: CliArgs) -> anyhow::Result<()> {
    let config = LlmlConfig::load()?;

    let mut builder = Llml::builder();
    if let Some(cache_directory) = cli_args.cache_directory.clone().or(config.cache_dir) {
        builder = builder.cache_directory(cache_directory);
    }
    let llml = builder.try_build()?;
    debug!("Using cache at {}", llml.cache_location().display());

    match cli_args.action() {
        Action::Add { repository } => llml.add(&repository),
        Action::Update { all: true } => llml.update(&AllSelector).map(|_| ()),
        Action::Update { all: false } => llml.update(&InteractiveSelector).map(|_| ()),
    }
}

fn main() {
    let cli_args = CliArgs::parse();

    let default_filter = if cli_args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
