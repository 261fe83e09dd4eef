use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DraftPickRequest {
    pub general_id: i32,
}
