use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String, // normalized: trimmed, lower-case
    pub password_hash: String, // Argon2 PHC string
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a user; id and timestamp come from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
