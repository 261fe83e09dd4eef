use serde::Deserialize;

use crate::entity::invite_codes::InviteKind;

#[derive(Debug, Deserialize)]
pub struct GenerateInviteCodesRequest {
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_kind")]
    pub kind: InviteKind,
    #[serde(default)]
    pub max_uses: Option<i32>,
    /// Days until the codes expire; omitted or zero means never
    #[serde(default)]
    pub expire_days: Option<i64>,
    #[serde(default)]
    pub remark: String,
}

fn default_count() -> u32 {
    1
}

fn default_kind() -> InviteKind {
    InviteKind::SingleUse
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}
