//! # Command Line Interface
//!
//! Dispatch subcommands to the `commands` module.

use wozardry_rs::cli;
use wozardry_rs::commands;
use wozardry_rs::commands::CommandError;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let main_cmd = cli::build_cli();
    let matches = main_cmd.get_matches();

    if let Some(_cmd) = matches.subcommand_matches("completions") {
        let mut cmd = cli::build_cli();
        let name = cmd.get_name().to_string();
        clap_complete::generate(clap_complete::Shell::Bash, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd) = matches.subcommand_matches("verify") {
        return commands::verify::verify(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("dump") {
        return commands::dump::dump(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("export") {
        return commands::export::export(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("import") {
        return commands::import::import(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("edit") {
        return commands::edit::edit(cmd);
    }

    if let Some(cmd) = matches.subcommand_matches("remove") {
        return commands::remove::remove(cmd);
    }

    log::error!("No subcommand was found, try `wozardry --help`");
    Err(Box::new(CommandError::InvalidCommand))
}
