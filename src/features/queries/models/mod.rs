mod query_log;

pub use query_log::{NewQueryLog, QueryStatus};
