pub mod analytics;
pub mod balance;
pub mod investment;
pub mod loans;
pub mod reconciliation;

use serde::de::DeserializeOwned;

/// Parse a screaming-case enum token (e.g. "mensual" -> Periodicity::Mensual)
/// through its serde representation, so CLI flags accept the same vocabulary
/// as input files.
pub fn parse_token<T: DeserializeOwned>(raw: &str) -> Result<T, Box<dyn std::error::Error>> {
    let token = raw.trim().to_uppercase();
    serde_json::from_value(serde_json::Value::String(token.clone()))
        .map_err(|_| format!("Unrecognised value: '{}'", raw).into())
}
