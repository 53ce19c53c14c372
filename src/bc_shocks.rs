// Shock magnitude model
//
// Pure, stateless functions mapping an exposure and a transmission
// coefficient to a shock size. Funding and credit shocks are losses and
// strictly reduce the affected balance; a withdrawal is a zero-sum transfer
// between two still-solvent banks. Zero exposures and zero coefficients are
// valid inputs producing zero-magnitude shocks.

/// Loss a counterparty absorbs when the bank that funded it defaults
pub fn funding_shock_amount(exposure: f64, lambda_f: f64) -> f64 {
    exposure * lambda_f
}

/// Loss a bank absorbs on its exposure to a defaulted counterparty
pub fn credit_shock_amount(exposure: f64, lambda_c: f64) -> f64 {
    exposure * lambda_c
}

/// Deposit fraction a solvent bank pulls out of a distressed partner
pub fn withdrawal_amount(exposure: f64, panic_rate: f64) -> f64 {
    exposure * panic_rate
}
