//! App Store Connect analytics model types.

mod category;
mod record;
mod report;
mod report_name;

pub use category::*;
pub use record::*;
pub use report::*;
pub use report_name::*;
