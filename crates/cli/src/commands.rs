//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the `protean` command.
pub fn build_cli() -> Command {
    Command::new("protean")
        .about("Run agent replies through the Protean entity engine")
        .subcommand_required(false)
        .arg(
            Arg::new("reply")
                .help("A single agent reply; stdin is read line by line when omitted"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Engine configuration file (default: ./protean.toml if present)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode (default)")
                .action(ArgAction::SetTrue)
                .conflicts_with("human")
                .global(true),
        )
        .arg(
            Arg::new("human")
                .long("human")
                .help("Human-readable summaries")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("whole")
                .long("whole")
                .help("Treat all of stdin as one reply instead of one reply per line")
                .action(ArgAction::SetTrue)
                .conflicts_with("reply"),
        )
        .arg(
            Arg::new("describe")
                .long("describe")
                .help("Print the registered entity definitions when done")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("init")
                .about("Write a default configuration file")
                .arg(
                    Arg::new("path")
                        .help("Where to write it (default: ./protean.toml)"),
                ),
        )
}
