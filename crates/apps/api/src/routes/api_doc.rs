use crate::routes::{browse, operator, root};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        // Browse handlers
        browse::handlers::next_candidate_handler,
        browse::handlers::current_card_handler,
        browse::handlers::rewind_handler,
        browse::handlers::advance_handler,
        browse::handlers::favorite_handler,
        browse::handlers::unfavorite_handler,
        browse::handlers::blacklist_handler,
        // Operator handlers
        operator::handlers::set_filter_handler,
        operator::handlers::set_token_handler,
        operator::handlers::get_favorites_handler,
        operator::handlers::discover_handler,
    ),
    components(
        schemas(
            common_types::Gender,
            common_services::api::browse::interfaces::CandidateCard,
            common_services::api::browse::interfaces::NextCandidateResponse,
            common_services::api::browse::interfaces::CursorResponse,
            common_services::api::operator::interfaces::SetFilterParams,
            common_services::api::operator::interfaces::SetTokenParams,
            common_services::api::operator::interfaces::FavoritesResponse,
            common_services::api::operator::interfaces::DiscoverResponse,
        ),
    ),
    tags(
        (name = "Browse", description = "Deterministic candidate serving, history and per-operator lists"),
        (name = "Operator", description = "Operator filters, tokens and discovery runs"),
        (name = "System", description = "Health check"),
    )
)]
pub struct ApiDoc;
