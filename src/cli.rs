mod battery;
mod burrow;
mod clocks;
mod device;
mod forecast;
mod givenergy;
mod hunt;
mod octopus;
mod pounce;
mod trigger;

use clap::{Parser, Subcommand};

use crate::{
    cli::{burrow::BurrowArgs, hunt::HuntArgs, pounce::PounceArgs},
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub async fn run(self) -> Result {
        match self.command {
            Command::Hunt(args) => args.run().await,
            Command::Pounce(args) => args.run().await,
            Command::Burrow(args) => args.run().await,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: fetch the prices and the history, plan the charging, commit the first window,
    /// and schedule the rest.
    #[clap(name = "hunt")]
    Hunt(Box<HuntArgs>),

    /// Commit the next window from a payload scheduled by `hunt`, and schedule the rest.
    #[clap(name = "pounce")]
    Pounce(Box<PounceArgs>),

    /// Development tools.
    #[clap(name = "burrow")]
    Burrow(Box<BurrowArgs>),
}
