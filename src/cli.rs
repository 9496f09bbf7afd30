use clap::{arg, crate_version, ArgAction, Command, ValueHint};

pub fn build_cli() -> Command {
    let long_help = "wozardry-rs is always invoked with exactly one subcommand.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
Check a file is well-formed:  `wozardry verify -d myimg.woz`
Dump track metadata:          `wozardry dump -d myimg.woz -f trks`
Export metadata to JSON:      `wozardry export -d myimg.woz -j myimg.json`
Import metadata from JSON:    `wozardry import -d myimg.woz -j myimg.json -o out.woz`
Edit an INFO field:           `wozardry edit -d myimg.woz --info disk_sides:2 -o out.woz`
Delete a quarter-track:       `wozardry remove -d myimg.woz --track 17.25 -o out.woz`";

    let dump_fields = ["info", "tmap", "trks", "meta", "all"];

    let mut main_cmd = Command::new("wozardry")
        .about("Reads, verifies, and edits WOZ/MOOF floppy disk image containers.")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("verify")
            .arg(
                arg!(-d --dimg <PATH> "path to the WOZ/MOOF image")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .about("load an image and report whether it is well-formed"),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("dump")
            .arg(
                arg!(-d --dimg <PATH> "path to the WOZ/MOOF image")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(
                arg!(-f --field <FIELD> "which chunk to print")
                    .value_parser(dump_fields)
                    .default_value("all"),
            )
            .about("print a human-readable summary of an image's chunks"),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("export")
            .arg(
                arg!(-d --dimg <PATH> "path to the WOZ/MOOF image")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(
                arg!(-j --json <PATH> "path to write JSON to")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .about("export INFO and META as JSON"),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("import")
            .arg(
                arg!(-d --dimg <PATH> "path to the base WOZ/MOOF image")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(
                arg!(-j --json <PATH> "path to read JSON from")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(
                arg!(-o --out <PATH> "path to write the updated image to")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .about("apply META edits from a JSON document"),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("edit")
            .arg(
                arg!(-d --dimg <PATH> "path to the WOZ/MOOF image")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(
                arg!(--info <ASSIGNMENT> "set an INFO field, e.g. disk_sides:2")
                    .action(ArgAction::Append)
                    .required(false),
            )
            .arg(
                arg!(--meta <ASSIGNMENT> "set a META field, e.g. side:A")
                    .action(ArgAction::Append)
                    .required(false),
            )
            .arg(
                arg!(-o --out <PATH> "path to write the updated image to")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .about("edit INFO/META fields in place"),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("remove")
            .arg(
                arg!(-d --dimg <PATH> "path to the WOZ/MOOF image")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(
                arg!(--track <QUARTER_TRACK> "quarter-track number to remove, e.g. 17.25")
                    .action(ArgAction::Append)
                    .required(true),
            )
            .arg(
                arg!(-o --out <PATH> "path to write the updated image to")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .about("delete one or more tracks by quarter-track number"),
    );

    main_cmd = main_cmd.subcommand(Command::new("completions").about("generate shell completions"));

    main_cmd
}
