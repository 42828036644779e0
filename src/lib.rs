pub mod command;
pub mod fileformat;
pub mod jump;
pub mod runtime;

pub use jump::evaluate;
pub use jump::EstimationStrategy;
pub use jump::SampleIndexTable;
