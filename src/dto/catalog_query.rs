use serde::Deserialize;

use crate::assets::catalog::ClubFilter;
use crate::entity::generals::PoolType;

#[derive(Debug, Default, Deserialize)]
pub struct GeneralQuery {
    pub pool: Option<PoolType>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClubQuery {
    pub league: Option<String>,
    pub tag: Option<String>,
}

impl From<ClubQuery> for ClubFilter {
    fn from(query: ClubQuery) -> Self {
        ClubFilter {
            league: query.league.filter(|l| !l.is_empty()),
            tag: query.tag.filter(|t| !t.is_empty()),
        }
    }
}
