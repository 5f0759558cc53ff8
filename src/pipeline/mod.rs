pub mod categories;
pub mod clean;
pub mod geocode;
pub mod output;
pub mod violations;
pub mod workbook;
