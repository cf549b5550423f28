//! Equipment under inspection

use serde::{Deserialize, Serialize};

/// Kind of equipment; selects the certificate scheme a record is numbered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    SpotWelder,
    LiftEquipment,
    #[default]
    Other,
}

impl EquipmentKind {
    /// Configuration key for this kind's certificate scheme
    pub fn as_key(&self) -> &'static str {
        match self {
            EquipmentKind::SpotWelder => "spot_welder",
            EquipmentKind::LiftEquipment => "lift_equipment",
            EquipmentKind::Other => "other",
        }
    }

    pub fn all() -> [EquipmentKind; 3] {
        [
            EquipmentKind::SpotWelder,
            EquipmentKind::LiftEquipment,
            EquipmentKind::Other,
        ]
    }
}

impl std::fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

impl std::str::FromStr for EquipmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "spot_welder" | "welder" | "sw" => Ok(EquipmentKind::SpotWelder),
            "lift_equipment" | "lift" | "lifting" => Ok(EquipmentKind::LiftEquipment),
            "other" => Ok(EquipmentKind::Other),
            other => Err(format!(
                "Invalid equipment kind: '{}'. Use spot_welder, lift_equipment or other",
                other
            )),
        }
    }
}

/// Identifying details of one piece of equipment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Equipment {
    /// Equipment kind
    #[serde(default)]
    pub kind: EquipmentKind,

    /// Manufacturer serial number
    pub serial_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Where the equipment is installed at the customer site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Equipment {
    pub fn new(kind: EquipmentKind, serial_number: impl Into<String>) -> Self {
        Self {
            kind,
            serial_number: serial_number.into(),
            ..Default::default()
        }
    }

    /// Short label for lists: description if present, else kind and serial
    pub fn label(&self) -> String {
        match &self.description {
            Some(d) if !d.is_empty() => format!("{} ({})", d, self.serial_number),
            _ => format!("{} {}", self.kind, self.serial_number),
        }
    }
}
