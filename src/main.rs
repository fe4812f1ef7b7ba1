use std::process;

use ucd_tablegen::args::ArgMatches;
use ucd_tablegen::error::{Error, Result};
use ucd_tablegen::{app, collation, tables};

fn main() {
    if let Err(err) = run() {
        if err.is_broken_pipe() {
            process::exit(0);
        }
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = app::app().get_matches();
    match matches.subcommand() {
        ("tables", Some(m)) => tables::command(ArgMatches::new(m)),
        ("collation", Some(m)) => collation::command(ArgMatches::new(m)),
        ("", _) => {
            app::app().print_help()?;
            println!();
            Ok(())
        }
        (unknown, _) => {
            Err(Error::Input(format!("unrecognized command: {}", unknown)))
        }
    }
}
