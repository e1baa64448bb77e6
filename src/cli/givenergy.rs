use clap::Parser;

use crate::{api::givenergy, prelude::*};

#[derive(Parser)]
pub struct GivEnergyApiArgs {
    #[clap(long = "givenergy-api-key", env = "GIVENERGY_API_KEY")]
    pub api_key: String,
}

impl GivEnergyApiArgs {
    pub fn new_client(&self) -> Result<givenergy::Api> {
        givenergy::Api::new(&self.api_key)
    }
}
