use serde::{Deserialize, Serialize};

/// Portfolio strategies offered by the sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Strategy {
    AggressiveGrowth,
    Growth,
    Balanced,
    Conservative,
    VeryConservative,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::AggressiveGrowth => "aggressive_growth",
            Strategy::Growth => "growth",
            Strategy::Balanced => "balanced",
            Strategy::Conservative => "conservative",
            Strategy::VeryConservative => "very_conservative",
        }
    }
}

pub const MIN_SIMULATION_MONTHS: u32 = 1;
pub const MAX_SIMULATION_MONTHS: u32 = 12;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_serialize_as_snake_case() {
        assert_eq!(serde_json::to_value(Strategy::AggressiveGrowth).unwrap(), "aggressive_growth");
        assert_eq!(serde_json::to_value(Strategy::VeryConservative).unwrap(), "very_conservative");
        assert_eq!(Strategy::Balanced.as_str(), "balanced");
    }

    #[test]
    fn strategies_parse_from_their_wire_names() {
        use clap::ValueEnum;
        assert_eq!(Strategy::from_str("aggressive_growth", false), Ok(Strategy::AggressiveGrowth));
        assert_eq!(Strategy::from_str("very_conservative", false), Ok(Strategy::VeryConservative));
        assert!(Strategy::from_str("aggressive-growth", false).is_err());
    }
}
