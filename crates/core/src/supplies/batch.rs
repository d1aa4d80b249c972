use serde::Serialize;
use std::fmt;

/// Supply category: medication, equipment or personal protective equipment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SupplyType {
    Med,
    Eqp,
    Ppe,
    /// Any other value found on disk, kept verbatim.
    Unrecognised(String),
}

impl SupplyType {
    pub const ALL: [SupplyType; 3] = [SupplyType::Med, SupplyType::Eqp, SupplyType::Ppe];

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MED" => Self::Med,
            "EQP" => Self::Eqp,
            "PPE" => Self::Ppe,
            _ => Self::Unrecognised(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Med => "MED",
            Self::Eqp => "EQP",
            Self::Ppe => "PPE",
            Self::Unrecognised(raw) => raw,
        }
    }

    pub fn is_recognised(&self) -> bool {
        !matches!(self, Self::Unrecognised(_))
    }
}

impl fmt::Display for SupplyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SupplyType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// One received lot of a named supply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SupplyBatch {
    pub supply_batch_id: String,
    pub name: String,
    pub supply_type: SupplyType,
    pub quantity: u32,
    pub status: String,
    pub supplier_name: String,
    pub timestamp_added: String,
    pub expiry_date: String,
}

impl SupplyBatch {
    /// Quantity actually recorded when `requested` units are drawn from this
    /// batch: equipment is always one unit, everything else is capped at the
    /// recorded stock.
    pub fn clamp_usage(&self, requested: u32) -> u32 {
        match self.supply_type {
            SupplyType::Eqp => 1.min(self.quantity),
            _ => requested.min(self.quantity),
        }
    }
}

/// `<TYPE>-<first three letters of name, upper-cased>-<batch number>`.
pub fn batch_id(supply_type: &SupplyType, name: &str, batch_number: &str) -> String {
    let short: String = name
        .trim()
        .chars()
        .take(3)
        .flat_map(char::to_uppercase)
        .collect();
    format!("{}-{}-{}", supply_type.as_str(), short, batch_number)
}
