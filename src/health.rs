use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct ServerStatus {
    pub message: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

pub async fn health() -> Json<ServerStatus> {
    Json(ServerStatus {
        message: "Server is running smoothly",
        timestamp: OffsetDateTime::now_utc(),
    })
}
