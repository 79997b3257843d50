mod file;

pub use file::{FileRecord, FileStatus, NewFileRecord, SampleRow};
