//! Interactive sessions for each role.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use coffee_counter::report::NO_RECORDS_MESSAGE;
use coffee_counter::{
    full_display_name, AggregateRecord, AggregateStore, Diagnostics, ReportFormat,
    ReportRenderer, SaleRequest, SalesLog, SalesRecorder,
};

use crate::console::Console;

const SALESPERSON_MENU: &str = "What would you like to do? Enter 1 or 2:
    1 - Sell a beverage
    2 - I am tired... No more sales...\n";

const MANAGER_MENU: &str = "What would you like to do? Enter 1 or 2:
    1 - View/export sales records
    2 - No reports today... Maybe later...\n";

const ADDITION_MENU: &str = "Would you like to add an ingredient to your beverage?
    1 - Add ingredient
    2 - Do not add ingredient\n";

const EXPORT_MENU: &str = "Would you like to export sales records? Enter 1, 2, 3 or 4:
    1 - Export as JSON
    2 - Export as XML
    3 - Export as CSV
    4 - Do not export\n";

/// What every role does once the session starts.
pub trait Employee {
    /// First name, used when talking to the employee.
    fn name(&self) -> &str;
    fn greeting(&self) -> String;
    fn menu(&self) -> &'static str;
    /// Performs the role's action after the employee picked option 1.
    fn act<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<()>;
}

/// Greets, then repeats the role's action until the employee quits.
pub fn run_session<E: Employee, R: BufRead, W: Write>(
    employee: &mut E,
    console: &mut Console<R, W>,
) -> io::Result<()> {
    console.say(&employee.greeting())?;
    while console.choose(employee.menu(), 2, employee.name())? == 1 {
        employee.act(console)?;
    }
    log::info!("{} decided to quit the app", employee.name());
    console.say(&format!("Bye-Bye, {}! See you next time", employee.name()))
}

pub struct SalespersonSession<'a> {
    name: String,
    fullname: String,
    beverages: Vec<String>,
    additions: Vec<String>,
    log: SalesLog,
    store: &'a AggregateStore,
    diagnostics: Rc<dyn Diagnostics>,
}

impl<'a> SalespersonSession<'a> {
    pub fn new(
        name: &str,
        beverages: &[String],
        additions: &[String],
        log: SalesLog,
        store: &'a AggregateStore,
        diagnostics: Rc<dyn Diagnostics>,
    ) -> Self {
        Self {
            name: name.to_string(),
            fullname: full_display_name(name),
            beverages: beverages.to_vec(),
            additions: additions.to_vec(),
            log,
            store,
            diagnostics,
        }
    }

    fn make_sale<R: BufRead, W: Write>(&self, console: &mut Console<R, W>) -> io::Result<()> {
        let with_addition = console.choose(ADDITION_MENU, 2, &self.name)? == 1;

        let beverage = console.pick("beverage", &self.beverages)?;
        let beverage_price = console.price("beverage")?;
        let ingredient = if with_addition {
            let label = console.pick("ingredient", &self.additions)?;
            let price = console.price("ingredient")?;
            Some((label, price))
        } else {
            None
        };

        let request = SaleRequest {
            available_beverages: self.beverages.clone(),
            available_ingredients: self.additions.clone(),
            beverage,
            beverage_price,
            ingredient,
        };
        let events = match request.into_events() {
            Ok(events) => events,
            Err(err) => {
                log::error!("{} entered an invalid sale: {}", self.fullname, err);
                return console.say(&format!("Sale not recorded: {}", err));
            }
        };

        if let Err(err) = self.store.ensure_schema() {
            log::error!("Could not prepare the sales table: {}", err);
        }

        let recorder = SalesRecorder::new(self.store, self.diagnostics.clone());
        match recorder.record_events(&self.fullname, &self.log, &events) {
            Ok(summary) => {
                log::info!("{} made a sale", self.fullname);
                console.say(&format!(
                    "You sold {} beverages and {} additions",
                    summary.beverages, summary.additions
                ))?;
                console.say(&format!(
                    "Your sales total amount: {}$",
                    summary.total_amount
                ))
            }
            Err(err) => {
                log::error!("Sale by {} could not be recorded: {}", self.fullname, err);
                console.say(&format!("Sale could not be recorded: {}", err))
            }
        }
    }

    fn view_records<R: BufRead, W: Write>(&self, console: &mut Console<R, W>) -> io::Result<()> {
        match self.log.read_all_lines() {
            Ok(lines) => {
                log::info!("Salesperson {} is viewing personal sales records", self.fullname);
                for line in lines {
                    console.say(&line)?;
                }
                console.say("")
            }
            Err(err) => {
                log::error!("Could not read sales records of {}: {}", self.fullname, err);
                console.say(&format!("Your sales records are unavailable: {}", err))
            }
        }
    }
}

impl Employee for SalespersonSession<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn greeting(&self) -> String {
        format!(
            "Hi {}! You are a salesperson.\nYou can sell beverages and ingredients\n",
            self.name
        )
    }

    fn menu(&self) -> &'static str {
        SALESPERSON_MENU
    }

    fn act<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<()> {
        self.make_sale(console)?;
        self.view_records(console)
    }
}

pub struct ManagerSession<'a> {
    name: String,
    fullname: String,
    store: &'a AggregateStore,
    renderer: ReportRenderer,
    export_dir: PathBuf,
}

impl<'a> ManagerSession<'a> {
    pub fn new(
        name: &str,
        store: &'a AggregateStore,
        renderer: ReportRenderer,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            name: name.to_string(),
            fullname: full_display_name(name),
            store,
            renderer,
            export_dir,
        }
    }

    fn export<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        snapshot: &[AggregateRecord],
    ) -> io::Result<()> {
        let format = match console.choose(EXPORT_MENU, 4, &self.name)? {
            1 => ReportFormat::Json,
            2 => ReportFormat::Xml,
            3 => ReportFormat::Csv,
            _ => {
                return console.say(&format!(
                    "{}, you can always export sales records later.\n",
                    self.name
                ))
            }
        };

        match self
            .renderer
            .export(format, snapshot, &self.export_dir, &self.fullname)
        {
            Ok(path) => {
                log::info!("{} exported {:?} records to {}", self.fullname, format, path.display());
                let folder = path
                    .parent()
                    .and_then(|parent| parent.file_name())
                    .map(|folder| folder.to_string_lossy().into_owned())
                    .unwrap_or_default();
                console.say(&format!(
                    "{}, your exported {} file is in \"{}\" folder\n",
                    self.name,
                    format.extension().unwrap_or_default(),
                    folder
                ))
            }
            Err(err) => {
                log::error!("{} could not export records: {}", self.fullname, err);
                console.say(&format!("Export failed: {}", err))
            }
        }
    }
}

impl Employee for ManagerSession<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn greeting(&self) -> String {
        format!(
            "Hi {}! You are a manager.\nYou can view and export sales records\n",
            self.name
        )
    }

    fn menu(&self) -> &'static str {
        MANAGER_MENU
    }

    fn act<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<()> {
        let snapshot = match self
            .store
            .ensure_schema()
            .and_then(|_| self.store.is_empty())
        {
            Ok(true) => return console.say(&format!("{}\n", NO_RECORDS_MESSAGE)),
            Ok(false) => self.store.all(),
            Err(err) => Err(err),
        };

        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::error!("Could not read sales records: {}", err);
                return console.say(&format!("Sales records are unavailable: {}", err));
            }
        };

        match self.renderer.render(ReportFormat::Table, &snapshot) {
            Ok(table) => {
                log::info!("{} viewed salespeople records", self.fullname);
                console.say(&table)?;
            }
            Err(err) => {
                log::error!("Could not render sales table: {}", err);
                console.say(&format!("Sales table is unavailable: {}", err))?;
            }
        }

        self.export(console, &snapshot)
    }
}
