use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::ops;

use crate::error::{Error, Result};
use crate::writer::{Writer, WriterBuilder};

/// Wraps clap matches and provides convenient accessors to various
/// parameters shared by both subcommands.
pub struct ArgMatches<'a>(&'a clap::ArgMatches<'a>);

impl<'a> ops::Deref for ArgMatches<'a> {
    type Target = clap::ArgMatches<'a>;
    fn deref(&self) -> &clap::ArgMatches<'a> {
        &self.0
    }
}

impl<'a> ArgMatches<'a> {
    pub fn new(matches: &'a clap::ArgMatches<'a>) -> ArgMatches<'a> {
        ArgMatches(matches)
    }

    pub fn ucd_dir(&self) -> Result<&OsStr> {
        match self.value_of_os("ucd-dir") {
            Some(x) => Ok(x),
            None => Err(Error::Input("missing UCD directory".to_string())),
        }
    }

    pub fn name(&self) -> &str {
        self.value_of("name").expect("a default name is always set")
    }

    pub fn writer(&self) -> Result<Writer> {
        let builder = WriterBuilder::new(self.name());
        match self.value_of_os("out") {
            None => Ok(builder.from_stdout()),
            Some(path) => {
                let file = File::create(path)?;
                Ok(builder.from_writer(io::BufWriter::new(file)))
            }
        }
    }
}
