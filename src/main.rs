mod commands;
mod config;
mod controller;
mod db;
mod error;
mod types;
mod views;
use crate::error::Result;
use crate::views::home::{render_home, AppState};
use crate::{config::Config, controller::Controller, db::Db};
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::debug;
use ratatui::prelude::{CrosstermBackend, Terminal};
use std::io::stdout;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::load()?;
    debug!("Initializing db...");
    let db = Db::new(&config)?;
    debug!("Initialized db at schema version {}.", db.schema_version()?);
    for (table, columns) in db.describe_schema()? {
        debug!("  {table}({})", columns.join(", "));
    }
    let mut controller = Controller::new(db)?;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = run(&mut controller, &config);

    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;

    result
}

fn run(controller: &mut Controller, config: &Config) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut next = AppState::Home;
    loop {
        match next {
            AppState::Home => next = render_home(&mut terminal, controller, config)?,
            AppState::Exit => break,
        }
    }
    Ok(())
}
