pub mod desk;
pub mod editor;
pub mod export;
pub mod numbering;
pub mod search;

pub use desk::BillDesk;
pub use editor::{BillEditor, SaveOutcome};
pub use export::{format_inr, render_printable, BillSummary};
pub use numbering::{fallback_bill_number, next_bill_number};
pub use search::filter_bills;
