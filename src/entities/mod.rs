//! Entity type definitions

pub mod equipment;
pub mod service_record;

pub use equipment::{Equipment, EquipmentKind};
pub use service_record::ServiceRecord;
