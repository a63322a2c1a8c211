#![allow(clippy::module_name_repetitions)]

use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use clap::{Arg, ArgMatches, Command};

/// Command line arguments for the CLI interface.
#[derive(Clone, Debug)]
pub struct Args {
    name: String,
    position: String,
    beverages: Vec<String>,
    additions: Vec<String>,
    data_dir: PathBuf,
    log_file: PathBuf,
    verbose: bool,
}

impl Args {
    /// Employee first name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position as typed; see `Role::classify`.
    pub fn position(&self) -> &str {
        &self.position
    }

    /// Beverages a salesperson may sell.
    pub fn beverages(&self) -> &[String] {
        self.beverages.as_slice()
    }

    /// Ingredients a salesperson may add.
    pub fn additions(&self) -> &[String] {
        self.additions.as_slice()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Clone, Debug)]
pub enum ArgsError {
    MissingArgument(&'static str),
    Invalid(String),
}

impl Display for ArgsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            ArgsError::MissingArgument(name) => format!("Missing argument {}", name),
            ArgsError::Invalid(message) => message.clone(),
        })
    }
}

fn command() -> Command<'static> {
    Command::new("coffee-counter")
        .about("Sell drinks and view sales records at the coffee counter")
        .after_help("Thank you for using the coffee counter!")
        .arg(
            Arg::new("name")
                .required(true)
                .value_name("employee_name")
                .help("Employee name"),
        )
        .arg(
            Arg::new("position")
                .required(true)
                .value_name("employee_position")
                .help("Employee position (Salesperson or Manager)"),
        )
        .arg(
            Arg::new("beverage")
                .short('b')
                .long("beverage")
                .takes_value(true)
                .multiple_occurrences(true)
                .help("Beverage a Salesperson can sell: tea, coffee, water, soda, etc. Repeatable"),
        )
        .arg(
            Arg::new("addition")
                .short('a')
                .long("addition")
                .takes_value(true)
                .multiple_occurrences(true)
                .help("Ingredient a Salesperson can add: sugar, milk, cinnamon, etc. Repeatable"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .takes_value(true)
                .default_value(".")
                .help("Folder holding the database and record folders"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .takes_value(true)
                .default_value("coffee_for_me.log")
                .help("File the application log is appended to"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug details"),
        )
}

/// Parses the process arguments, printing help and exiting on misuse.
pub fn parse_args() -> Result<Args, ArgsError> {
    args_from_matches(&command().get_matches())
}

/// Parses an explicit argument list.
pub fn parse_args_from<I, T>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command()
        .try_get_matches_from(args)
        .map_err(|err| ArgsError::Invalid(err.to_string()))?;
    args_from_matches(&matches)
}

fn args_from_matches(matches: &ArgMatches) -> Result<Args, ArgsError> {
    let values = |name: &str| -> Vec<String> {
        matches
            .values_of(name)
            .map(|values| values.map(str::to_string).collect())
            .unwrap_or_default()
    };

    Ok(Args {
        name: matches
            .value_of("name")
            .ok_or(ArgsError::MissingArgument("employee_name"))?
            .to_string(),
        position: matches
            .value_of("position")
            .ok_or(ArgsError::MissingArgument("employee_position"))?
            .to_string(),
        beverages: values("beverage"),
        additions: values("addition"),
        data_dir: PathBuf::from(
            matches
                .value_of("data-dir")
                .ok_or(ArgsError::MissingArgument("data-dir"))?,
        ),
        log_file: PathBuf::from(
            matches
                .value_of("log-file")
                .ok_or(ArgsError::MissingArgument("log-file"))?,
        ),
        verbose: matches.is_present("verbose"),
    })
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use crate::args::{parse_args_from, ArgsError};

    #[test]
    fn test_salesperson_args() {
        let args = parse_args_from([
            "coffee-counter",
            "Jake",
            "Salesperson",
            "-b",
            "tea",
            "--beverage",
            "coffee",
            "-a",
            "sugar",
        ])
        .unwrap();

        assert_eq!("Jake", args.name());
        assert_eq!("Salesperson", args.position());
        assert_eq!(["tea", "coffee"], args.beverages());
        assert_eq!(["sugar"], args.additions());
        assert_eq!(Path::new("."), args.data_dir());
        assert_eq!(Path::new("coffee_for_me.log"), args.log_file());
        assert!(!args.verbose());
    }

    #[test]
    fn test_manager_args() {
        let args = parse_args_from([
            "coffee-counter",
            "Ann",
            "manager",
            "--data-dir",
            "/tmp/till",
            "-v",
        ])
        .unwrap();

        assert!(args.beverages().is_empty());
        assert!(args.additions().is_empty());
        assert_eq!(Path::new("/tmp/till"), args.data_dir());
        assert!(args.verbose());
    }

    #[test]
    fn test_missing_position() {
        assert!(matches!(
            parse_args_from(["coffee-counter", "Jake"]),
            Err(ArgsError::Invalid(_))
        ));
    }
}
