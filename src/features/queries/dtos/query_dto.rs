use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::tabular::ResultTable;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryRequestDto {
    /// Question about the file, in plain language
    pub query: String,
    /// Id of an uploaded file owned by the caller
    #[serde(rename = "fileId")]
    pub file_id: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QueryParams {
    /// `table` adds a parsed table next to the answer
    pub format: Option<String>,
}

impl QueryParams {
    pub fn wants_table(&self) -> bool {
        self.format.as_deref() == Some("table")
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueryResponseDto {
    /// Raw model output
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<ResultTable>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueryErrorResponseDto {
    pub error: String,
}
