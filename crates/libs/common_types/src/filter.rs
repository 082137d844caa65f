use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;

/// Gender filter value for candidate search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Numeric code used by the social-network search API.
    #[must_use]
    pub const fn remote_code(self) -> i64 {
        match self {
            Self::Female => 1,
            Self::Male => 2,
        }
    }
}

/// An operator's active search filter. `city_id` is resolved lazily by the
/// discovery collaborator and cached so it is not re-resolved on every run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    pub city_name: String,
    pub city_id: Option<i64>,
    pub gender: Gender,
    pub age_from: i64,
    pub age_to: i64,
}
