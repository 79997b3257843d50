pub mod csv_parser;
mod file_service;

pub use file_service::FileService;
