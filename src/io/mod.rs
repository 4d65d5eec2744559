pub mod excel_write;
pub mod workbook;

pub use workbook::{Sheet, Workbook};
