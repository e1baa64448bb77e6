use clap::Parser;

use crate::{api::octopus, prelude::*};

#[derive(Parser)]
pub struct OctopusArgs {
    /// Tariff product code.
    #[clap(long = "octopus-product", env = "OCTOPUS_PRODUCT", default_value = octopus::DEFAULT_PRODUCT)]
    pub product: String,

    /// Grid supply point region letter.
    #[clap(long = "octopus-region", env = "OCTOPUS_REGION", default_value = "G")]
    pub region: String,

    /// Maximum number of half-hour slots to plan.
    #[clap(long = "horizon", env = "HORIZON", default_value = "48")]
    pub horizon: usize,
}

impl OctopusArgs {
    pub fn new_client(&self) -> Result<octopus::Api> {
        octopus::Api::new(self.product.clone(), self.region.clone())
    }
}
