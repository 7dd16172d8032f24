use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref DESCRIPTIONS: HashMap<&'static str, &'static str> = HashMap::from([
        ("adm", "GCS Advantage Modifiers Library"),
        ("adq", "GCS Advantages Library"),
        ("eqm", "GCS Equipment Modifiers Library"),
        ("eqp", "GCS Equipment Library"),
        ("gcs", "GURPS Character Sheet"),
        ("gct", "GCS Character Template"),
        ("not", "GCS Notes Library"),
        ("skl", "GCS Skills Library"),
        ("spl", "GCS Spells Library"),
    ]);
}

/// Human-readable name for a document type code, or the code itself when
/// the catalog has no entry for it.
pub fn description(code: &str) -> &str {
    DESCRIPTIONS.get(code).copied().unwrap_or(code)
}
