// Reports module - exports of saved reports

pub mod csv_export;

pub use csv_export::{export_file_name, export_to_csv};
