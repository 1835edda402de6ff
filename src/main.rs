use anyhow::Result;
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::Path;
use tracing::error;
use tracing_subscriber::EnvFilter;
use trajectory::build::{build_index, build_pages};
use trajectory::config::Config;
use trajectory::pages::DEFAULT_CATEGORY_TEMPLATE;
use trajectory::util::read_to_string;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let matches = App::new("trajectory")
        .version(crate_version!())
        .about("Merges new items into the site catalogs and renders category pages")
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .takes_value(true)
                .value_name("FILE")
                .help("Project file (default: search for trajectory.yaml upward from the working directory)"),
        )
        .arg(
            Arg::with_name("docs")
                .long("docs")
                .short("d")
                .takes_value(true)
                .value_name("DIR")
                .help("Docs directory (overrides the project file)"),
        )
        .subcommand(
            SubCommand::with_name("index")
                .about("Merges new items into the global and per-category catalogs"),
        )
        .subcommand(
            SubCommand::with_name("pages").about("Renders a landing page for every category"),
        )
        .subcommand(
            SubCommand::with_name("build").about("Runs `index` then `pages` (the default)"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    match matches.subcommand_name() {
        Some("index") => index(&config),
        Some("pages") => pages(&config),
        _ => {
            index(&config)?;
            pages(&config)
        }
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let docs = matches.value_of("docs").map(Path::new);
    match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path), docs),
        None => Config::from_directory(&std::env::current_dir()?, docs),
    }
}

fn index(config: &Config) -> Result<()> {
    let summary = build_index(config)?;
    println!(
        "Imported new items: {}, skipped: {}, total records: {}",
        summary.imported, summary.skipped, summary.total
    );
    Ok(())
}

fn pages(config: &Config) -> Result<()> {
    let template = match &config.category_template {
        Some(path) => read_to_string(path, "category template")?,
        None => DEFAULT_CATEGORY_TEMPLATE.to_owned(),
    };
    let count = build_pages(config, &template)?;
    println!("Generated category pages: {}", count);
    Ok(())
}
