//! Command line interface for the coffee counter.
//!
//! Makes use of the API in `lib.rs`.

#![deny(missing_docs)]

use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use coffee_counter::role::VALID_POSITIONS;
use coffee_counter::sales_log::SalesLogError;
use coffee_counter::{
    full_display_name, AggregateStore, Diagnostics, LogDiagnostics, ReportRenderer, Role,
    SalesLog, StorageLayout, StoreError,
};
use log::LevelFilter;

use crate::args::{parse_args, Args, ArgsError};
use crate::console::Console;
use crate::session::{run_session, ManagerSession, SalespersonSession};

mod args;
mod console;
mod session;

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", CoffeeCounterCLIError::from(err));
            std::process::exit(1);
        }
    };

    init_logger(&args);
    log::info!("User passed the following command line args: {:?}", args);

    let stdin = io::stdin();
    if let Err(err) = coffee_counter_cli(&args, stdin.lock(), io::stdout()) {
        log::error!("{}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

/// Sends the log to the configured file, or to stderr if it cannot be opened.
fn init_logger(args: &Args) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(if args.verbose() {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env();

    match OpenOptions::new()
        .create(true)
        .append(true)
        .open(args.log_file())
    {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(err) => eprintln!(
            "Failed to open log file '{}' ({}). Logging to stderr.",
            args.log_file().display(),
            err
        ),
    }

    if let Err(err) = builder.try_init() {
        eprintln!("Failed to create logger ({}). Continuing anyway.", err);
    }
}

/// Classifies the employee and runs the matching interactive session.
fn coffee_counter_cli(
    args: &Args,
    input: impl BufRead,
    output: impl Write,
) -> Result<(), CoffeeCounterCLIError> {
    let mut console = Console::new(input, output);
    let layout = StorageLayout::new(args.data_dir());
    let diagnostics: Rc<dyn Diagnostics> = Rc::new(LogDiagnostics::default());

    match Role::classify(args.position()) {
        Role::Manager => {
            let store = AggregateStore::open(&layout.database(), diagnostics.clone())?;
            let mut manager = ManagerSession::new(
                args.name(),
                &store,
                ReportRenderer::new(diagnostics),
                layout.manager_records(),
            );
            log::info!("Started manager session for {}", full_display_name(args.name()));
            run_session(&mut manager, &mut console)?;
        }
        Role::Salesperson => {
            if args.beverages().is_empty() || args.additions().is_empty() {
                log::error!("{} started without beverages or additions", args.name());
                console.say(
                    "Provide both beverage(s) and ingredient(s) as command line arguments! See --help.",
                )?;
                return Ok(());
            }

            let fullname = full_display_name(args.name());
            let store = AggregateStore::open(&layout.database(), diagnostics.clone())?;
            let log = SalesLog::for_employee(&layout.salesperson_records(), &fullname)?;
            let mut salesperson = SalespersonSession::new(
                args.name(),
                args.beverages(),
                args.additions(),
                log,
                &store,
                diagnostics,
            );
            log::info!(
                "Started salesperson session for {} (beverages: {:?}, additions: {:?})",
                fullname,
                args.beverages(),
                args.additions()
            );
            run_session(&mut salesperson, &mut console)?;
        }
        Role::Invalid(reason) => {
            log::error!("{} is not a valid employee: {}", args.name(), reason);
            console.say(&format!(
                "{} with {} position is not a valid employee.",
                args.name(),
                args.position()
            ))?;
            console.say(&format!("Available positions: {}", VALID_POSITIONS))?;
        }
    }

    Ok(())
}

/// Fatal error occurred when running the application.
#[derive(Debug)]
enum CoffeeCounterCLIError {
    /// There was a problem with the provided command line arguments.
    ArgsError(ArgsError),
    /// The shared sales table could not be opened.
    Store(StoreError),
    /// The salesperson's log folder could not be prepared.
    SalesLog(SalesLogError),
    /// Talking to the user failed, or they closed the input.
    Console(io::Error),
}

impl Display for CoffeeCounterCLIError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            CoffeeCounterCLIError::ArgsError(err) => format!("Invalid arguments: {}", err),
            CoffeeCounterCLIError::Store(err) => format!("Cannot open sales records: {}", err),
            CoffeeCounterCLIError::SalesLog(err) => format!("Cannot open sales log: {}", err),
            CoffeeCounterCLIError::Console(err) => format!("Console error: {}", err),
        })
    }
}

impl From<ArgsError> for CoffeeCounterCLIError {
    fn from(err: ArgsError) -> Self {
        Self::ArgsError(err)
    }
}

impl From<StoreError> for CoffeeCounterCLIError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<SalesLogError> for CoffeeCounterCLIError {
    fn from(err: SalesLogError) -> Self {
        Self::SalesLog(err)
    }
}

impl From<io::Error> for CoffeeCounterCLIError {
    fn from(err: io::Error) -> Self {
        Self::Console(err)
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use log::LevelFilter;

    use crate::args::parse_args_from;
    use crate::coffee_counter_cli;

    fn init_test_logger() {
        if let Err(err) = env_logger::Builder::new()
            .filter_level(LevelFilter::Info)
            .is_test(true)
            .try_init()
        {
            eprintln!("Failed to create logger ({}). Continuing anyway.", err);
        }
    }

    fn run(args: &[&str], input: &str) -> String {
        let args = parse_args_from(args.iter().copied()).unwrap();
        let mut output = Vec::new();
        coffee_counter_cli(&args, input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn run_salesperson_then_manager() {
        init_test_logger();
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let output = run(
            &[
                "coffee-counter", "Jake", "Salesperson", "-b", "Tea", "-b", "Coffee", "-a",
                "Sugar", "--data-dir", data_dir,
            ],
            // Sell tea, then tea with sugar (after two bad prices), then quit.
            "1\n2\nTea\n4\n1\n1\ntea\nabc\n-1\n2.5\nSugar\n1.5\n2\n",
        );

        assert!(output.starts_with("Hi Jake! You are a salesperson."));
        assert!(output.contains("You sold 1 beverages and 0 additions\nYour sales total amount: 4.0$"));
        assert!(output.contains("You sold 2 beverages and 1 additions\nYour sales total amount: 8.0$"));
        assert!(output.ends_with("Bye-Bye, Jake! See you next time\n"));
        assert_eq!(
            "Beverage: tea. Price: 4.0$\nBeverage: tea. Price: 2.5$\nAddition: sugar. Price: 1.5$\n",
            fs::read_to_string(dir.path().join("salesperson_records/Jake Ekaj_records.txt"))
                .unwrap()
        );

        let output = run(
            &["coffee-counter", "Ann", "Manager", "--data-dir", data_dir],
            // View, export as CSV, quit.
            "1\n3\n2\n",
        );

        assert!(output.contains(&format!(
            "{:<30}\t|\t{:<15}\t|\t{}\n",
            "Jake Ekaj", 3, "8.0"
        )));
        assert!(output.contains("Ann, your exported csv file is in \"manager_records\" folder"));
        assert_eq!(
            "ID,Name,Number of Sales,Total Amount ($)\r\n1,Jake Ekaj,3,8.0\r\n",
            fs::read_to_string(dir.path().join("manager_records/Ann Nna_records.csv")).unwrap()
        );
    }

    #[test]
    fn run_manager_without_records() {
        init_test_logger();
        let dir = tempfile::tempdir().unwrap();

        let output = run(
            &[
                "coffee-counter",
                "Ann",
                "manager",
                "--data-dir",
                dir.path().to_str().unwrap(),
            ],
            "1\n2\n",
        );

        assert!(output.contains("There are no sales records. Ask your salespeople to sell something..."));
        assert!(!dir.path().join("manager_records").exists());
    }

    #[test]
    fn run_invalid_role() {
        init_test_logger();
        let dir = tempfile::tempdir().unwrap();

        let output = run(
            &[
                "coffee-counter",
                "Jake",
                "Barista",
                "--data-dir",
                dir.path().to_str().unwrap(),
            ],
            "",
        );

        assert_eq!(
            "Jake with Barista position is not a valid employee.\nAvailable positions: Salesperson or Manager\n",
            output
        );
        assert!(!dir.path().join("employees.db").exists());
    }

    #[test]
    fn run_salesperson_without_menu_items() {
        init_test_logger();
        let dir = tempfile::tempdir().unwrap();

        let output = run(
            &[
                "coffee-counter",
                "Jake",
                "Salesperson",
                "-b",
                "Tea",
                "--data-dir",
                dir.path().to_str().unwrap(),
            ],
            "",
        );

        assert!(output.starts_with("Provide both beverage(s) and ingredient(s)"));
    }
}
