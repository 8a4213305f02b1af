use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::Path;
use std::sync::Arc;

// Use modules from the library
use gpu_tools::commands;
use gpu_tools::core::config::Config;
use gpu_tools::core::runner::SystemRunner;
use gpu_tools::core::telemetry::Registry;

fn main() -> Result<()> {
    gpu_tools::init_logging();

    let matches = Command::new("gpu-tools")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Read accelerator telemetry from vendor tools in one format")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Config file to use instead of the default location")
                .global(true),
        )
        .subcommand(Command::new("list").about("List GPU loaders and their availability"))
        .subcommand(
            Command::new("load")
                .about("Load telemetry from available GPU loaders")
                .arg(
                    Arg::new("vendor")
                        .long("vendor")
                        .value_name("NAME")
                        .help("Only load from this vendor"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print JSON instead of a table")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("driver")
                .about("Show driver information where a loader provides it")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print JSON instead of a table")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(Path::new(path))?,
        None => Config::load()?,
    };

    match matches.subcommand() {
        Some(("version", _)) => commands::version()?,
        Some((name, sub_matches)) => {
            let registry = Registry::with_defaults(Arc::new(SystemRunner::new()), &config);
            match name {
                "list" => commands::list(&registry)?,
                "load" => commands::load(
                    &registry,
                    sub_matches.get_one::<String>("vendor").map(String::as_str),
                    sub_matches.get_flag("json"),
                )?,
                "driver" => commands::driver(&registry, sub_matches.get_flag("json"))?,
                _ => println!("Use 'gpu-tools --help' for more information."),
            }
        }
        None => {
            let registry = Registry::with_defaults(Arc::new(SystemRunner::new()), &config);
            commands::list(&registry)?;
        }
    }

    Ok(())
}
