pub mod receipt;
pub mod reference;
pub mod report;
pub mod summary;

pub use receipt::{
    CreateReceiptRequest, EditReceiptRequest, NewReceipt, NewReceiptEntry, ReceiptEdit,
    ReceiptEntry, ReceiptUpdate,
};
pub use reference::{ExpectedQtyRecord, ItemDetails, ItemLookup};
pub use report::{Report, ReportFormat};
pub use summary::SummaryRow;
