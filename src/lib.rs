//! EquipTrak: service records, retest dates and certificate numbers
//!
//! Each service of a piece of lifting or welding equipment is kept as a
//! plain YAML file. Retest dates and statuses are derived from the service
//! date, and certificate numbers are issued per equipment kind.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
