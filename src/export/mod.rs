pub mod pdf;

pub use pdf::{write_pdf, TableDocument};
