use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::gallery::dtos::{
    EventsQuery, GalleryItemDto, GalleryKind, Leaderboard, LeaderboardQuery,
};
use crate::features::gallery::services::GalleryService;
use crate::shared::cache_control::CachePolicy;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

const GALLERY_CACHE: CachePolicy = CachePolicy::Public {
    max_age: 60,
    shared_max_age: 300,
};

type GalleryList = (CachePolicy, Json<ApiResponse<Vec<GalleryItemDto>>>);
type GalleryDetail = (CachePolicy, Json<ApiResponse<GalleryItemDto>>);

async fn list(
    service: &GalleryService,
    kind: GalleryKind,
    pagination: &PaginationQuery,
    upcoming: Option<bool>,
) -> Result<GalleryList> {
    let (items, total) = service.list(kind, pagination, upcoming).await?;
    Ok((
        GALLERY_CACHE,
        Json(ApiResponse::success(Some(items), None, Some(Meta { total }))),
    ))
}

async fn detail(service: &GalleryService, kind: GalleryKind, id: Uuid) -> Result<GalleryDetail> {
    let item = service.detail(kind, id).await?;
    Ok((GALLERY_CACHE, Json(ApiResponse::success(Some(item), None, None))))
}

/// List clubs
#[utoipa::path(
    get,
    path = "/api/clubs",
    tag = "gallery",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Clubs page", body = ApiResponse<Vec<GalleryItemDto>>)
    )
)]
pub async fn list_clubs(
    State(service): State<Arc<GalleryService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<GalleryList> {
    list(&service, GalleryKind::Clubs, &pagination, None).await
}

/// Get a club with its members and upcoming events
#[utoipa::path(
    get,
    path = "/api/clubs/{id}",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Club detail", body = ApiResponse<GalleryItemDto>),
        (status = 404, description = "Club not found")
    )
)]
pub async fn get_club(
    State(service): State<Arc<GalleryService>>,
    Path(id): Path<Uuid>,
) -> Result<GalleryDetail> {
    detail(&service, GalleryKind::Clubs, id).await
}

/// List cars
#[utoipa::path(
    get,
    path = "/api/cars",
    tag = "gallery",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Cars page", body = ApiResponse<Vec<GalleryItemDto>>)
    )
)]
pub async fn list_cars(
    State(service): State<Arc<GalleryService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<GalleryList> {
    list(&service, GalleryKind::Cars, &pagination, None).await
}

/// Get a car with owner, club and photos
#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Car detail", body = ApiResponse<GalleryItemDto>),
        (status = 404, description = "Car not found")
    )
)]
pub async fn get_car(
    State(service): State<Arc<GalleryService>>,
    Path(id): Path<Uuid>,
) -> Result<GalleryDetail> {
    detail(&service, GalleryKind::Cars, id).await
}

/// List events
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "gallery",
    params(EventsQuery),
    responses(
        (status = 200, description = "Events page", body = ApiResponse<Vec<GalleryItemDto>>)
    )
)]
pub async fn list_events(
    State(service): State<Arc<GalleryService>>,
    Query(query): Query<EventsQuery>,
) -> Result<GalleryList> {
    list(
        &service,
        GalleryKind::Events,
        &query.pagination(),
        Some(query.upcoming),
    )
    .await
}

/// Get an event with its organizing club and attendee count
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event detail", body = ApiResponse<GalleryItemDto>),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    State(service): State<Arc<GalleryService>>,
    Path(id): Path<Uuid>,
) -> Result<GalleryDetail> {
    detail(&service, GalleryKind::Events, id).await
}

/// Ranked entries of a leaderboard
#[utoipa::path(
    get,
    path = "/api/leaderboards/{board}",
    tag = "gallery",
    params(
        ("board" = Leaderboard, Path, description = "Board name"),
        LeaderboardQuery
    ),
    responses(
        (status = 200, description = "Leaderboard", body = ApiResponse<Vec<GalleryItemDto>>),
        (status = 400, description = "Unknown board")
    )
)]
pub async fn get_leaderboard(
    State(service): State<Arc<GalleryService>>,
    Path(board): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<GalleryList> {
    let board: Leaderboard = board.parse()?;
    let entries = service.leaderboard(board, query.limit()).await?;
    let total = entries.len() as i64;

    Ok((
        GALLERY_CACHE,
        Json(ApiResponse::success(Some(entries), None, Some(Meta { total }))),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::gallery::routes::routes;
    use crate::features::gallery::services::stub::StubRpc;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server(rpc: StubRpc) -> TestServer {
        let service = Arc::new(GalleryService::new(Arc::new(rpc)));
        TestServer::new(routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_clubs_gallery_envelope_and_cache_headers() {
        let server = server(StubRpc::default().returning(
            "get_clubs_gallery",
            json!({
                "items": [{ "id": "k1", "name": "Flat Six Society", "owner": [{ "username": "apex" }] }],
                "total": 1
            }),
        ));

        let response = server.get("/api/clubs").await;
        response.assert_status_ok();
        assert_eq!(
            response.header("cache-control"),
            "public, max-age=60, s-maxage=300"
        );

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["owner"]["username"], "apex");
    }

    #[tokio::test]
    async fn test_missing_car_is_404() {
        let server = server(StubRpc::default());
        let response = server.get(&format!("/api/cars/{}", Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["message"], "Car not found");
    }

    #[tokio::test]
    async fn test_event_detail_found() {
        let server = server(StubRpc::default().returning(
            "get_event_detail",
            json!({ "id": "e1", "title": "Sunday Cars & Coffee", "club": [{ "name": "Rotary Club" }] }),
        ));
        let response = server.get(&format!("/api/events/{}", Uuid::new_v4())).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["club"]["name"], "Rotary Club");
    }

    #[tokio::test]
    async fn test_unknown_leaderboard_is_400() {
        let server = server(StubRpc::default());
        let response = server.get("/api/leaderboards/fastest_lap").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_leaderboard_ranks_entries() {
        let server = server(StubRpc::default().returning(
            "get_leaderboard",
            json!([{ "username": "apex" }, { "username": "rotor" }]),
        ));

        let response = server.get("/api/leaderboards/garage_size?limit=5").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"][0]["rank"], 1);
        assert_eq!(body["data"][1]["rank"], 2);
        assert_eq!(body["meta"]["total"], 2);
    }
}
