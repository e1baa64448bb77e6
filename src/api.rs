pub mod givenergy;
pub mod met_office;
pub mod octopus;
pub mod webhook;
