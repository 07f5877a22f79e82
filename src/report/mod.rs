//! Report generation modules.

pub mod generator;
pub mod inventory;

pub use generator::*;
pub use inventory::{build_report, InventoryReport, ReportFilter, ReportKind};
