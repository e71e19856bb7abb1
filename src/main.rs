mod builtins;
mod completion;
mod config;
mod error;
mod history;
mod input;
mod launcher;
mod parser;
mod repl;
mod session;
mod signals;
mod util;

use anyhow::Context;
use log::debug;

use crate::config::Config;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env().context("reading HISTSH_* settings")?;
    debug!("starting with {config:?}");
    signals::install_interrupt_handler()?;

    repl::start_repl(&config)?;
    Ok(())
}
