use common_types::{Gender, SearchFilter};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One row per Telegram-identified operator. Created on first interaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Operator {
    pub tg_user_id: i64,
    pub access_token: Option<String>,
    pub remote_user_id: Option<i64>,
    pub filter_city_name: Option<String>,
    pub filter_city_id: Option<i64>,
    pub filter_gender: Option<Gender>,
    pub filter_age_from: Option<i64>,
    pub filter_age_to: Option<i64>,
    /// Number of history entries already consumed; the entry at position
    /// `history_cursor + 1` is the next one to replay.
    pub history_cursor: i64,
}

impl Operator {
    /// The active search filter, if the operator has set every field.
    #[must_use]
    pub fn filter(&self) -> Option<SearchFilter> {
        Some(SearchFilter {
            city_name: self.filter_city_name.clone()?,
            city_id: self.filter_city_id,
            gender: self.filter_gender?,
            age_from: self.filter_age_from?,
            age_to: self.filter_age_to?,
        })
    }
}
