pub mod bill;
pub mod draft;

pub use bill::{Bill, BillFields, BillItem, NewBillItem};
pub use draft::{BillDraft, ItemEdit, ItemPolicy, LineItem};
