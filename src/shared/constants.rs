/// Number of parsed rows kept on a file record for prompt construction
pub const SAMPLE_ROW_LIMIT: usize = 100;

/// Maximum accepted upload size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Content type recorded when the client does not send one
pub const DEFAULT_CSV_MIME_TYPE: &str = "text/csv";

/// Filename offered for CSV exports
pub const EXPORT_FILENAME: &str = "query_results.csv";
