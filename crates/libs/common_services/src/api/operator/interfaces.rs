use common_types::Gender;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SetFilterParams {
    pub city_name: String,
    pub gender: Gender,
    pub age_from: i64,
    pub age_to: i64,
}

#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SetTokenParams {
    pub access_token: String,
    pub remote_user_id: i64,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub candidate_ids: Vec<i64>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DiscoverStatus {
    Ran,
    MissingToken,
    MissingFilter,
    CityNotFound,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverResponse {
    pub status: DiscoverStatus,
    pub discovered: usize,
    pub queued: usize,
}
