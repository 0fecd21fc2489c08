pub mod excel_write;
pub mod locate;
pub mod sheet;
