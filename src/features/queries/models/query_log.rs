use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Success,
    Error,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Success => "success",
            QueryStatus::Error => "error",
        }
    }
}

/// One row of the append-only `queries` log
#[derive(Debug, Clone)]
pub struct NewQueryLog {
    pub user_id: Uuid,
    pub file_id: Uuid,
    pub natural_language_query: String,
    pub status: QueryStatus,
    pub error_message: Option<String>,
    pub execution_time_ms: i64,
}
