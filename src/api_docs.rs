use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::books::list_books,
        api::books::create_book,
        api::stats::get_stats,
        // Add other endpoints here as we document them
    ),
    tags(
        (name = "bookcamp", description = "Bookcamp API")
    )
)]
pub struct ApiDoc;
