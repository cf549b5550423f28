//! Filter enums for list commands

use clap::ValueEnum;

use crate::core::entity::ServiceStatus;
use crate::entities::equipment::EquipmentKind;

/// Status filter for `svc list`
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// More than 30 days until retest
    Valid,
    /// Retest due within the upcoming window
    Upcoming,
    /// Retest date passed or missing
    #[value(alias = "invalid")]
    Expired,
    /// Upcoming and expired - everything needing a visit
    Attention,
    /// All records - default
    #[default]
    All,
}

impl StatusFilter {
    pub fn matches(&self, status: ServiceStatus) -> bool {
        match self {
            StatusFilter::Valid => status == ServiceStatus::Valid,
            StatusFilter::Upcoming => status == ServiceStatus::Upcoming,
            StatusFilter::Expired => status == ServiceStatus::Expired,
            StatusFilter::Attention => status != ServiceStatus::Valid,
            StatusFilter::All => true,
        }
    }
}

/// Equipment kind argument
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum KindArg {
    #[value(alias = "welder")]
    SpotWelder,
    #[value(alias = "lift")]
    LiftEquipment,
    Other,
}

impl From<KindArg> for EquipmentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::SpotWelder => EquipmentKind::SpotWelder,
            KindArg::LiftEquipment => EquipmentKind::LiftEquipment,
            KindArg::Other => EquipmentKind::Other,
        }
    }
}
