pub mod receiving;
pub mod report;
pub mod summary;

pub use receiving::ReceivingService;
pub use summary::summarize;
