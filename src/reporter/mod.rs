pub mod json;
pub mod sarif;
pub mod terminal;

use crate::scan::types::ScanReport;

pub trait Reporter {
    fn report(&self, report: &ScanReport) -> String;
}
