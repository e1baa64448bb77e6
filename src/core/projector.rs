use crate::quantity::energy::KilowattHours;

/// Combine the consumption and solar production forecasts into the net energy deficit per slot:
/// `consumption − production × bias`.
///
/// The series are zipped, so the result is as long as the shortest input.
/// Negative bias is treated as no solar contribution.
pub fn project_net_energy(
    consumption: &[KilowattHours],
    production: &[KilowattHours],
    solar_bias: &[f64],
) -> Vec<KilowattHours> {
    consumption
        .iter()
        .zip(production)
        .zip(solar_bias)
        .map(|((consumption, production), bias)| *consumption - *production * bias.max(0.0))
        .collect()
}
