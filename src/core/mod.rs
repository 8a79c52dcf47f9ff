pub mod engine;
pub mod extract;
pub mod placement;
pub mod retry;
pub mod source;

pub use crate::domain::model::{
    ExtractedOrder, FormAction, InverseOrder, Order, OrderDay, PlacementOutcome, PriceTable,
    ReportedSums, RunMode, RunOutcome,
};
pub use crate::domain::ports::{FormDriver, FormLauncher, OrderSource};
pub use crate::utils::error::Result;
