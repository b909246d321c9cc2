pub mod diagnosis;
pub mod report;

pub use diagnosis::*;
pub use report::*;
