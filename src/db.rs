use anyhow::Context;
use axum::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User},
    storage::{Collection, Document, DocumentStore, InsertOneResult, StoreError, ID_FIELD},
};

/// PostgreSQL-backed document store. Each collection is a table of JSONB
/// documents keyed by UUID; users get a typed table with a unique email.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(u) => Ok(u),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Duplicate(user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let sql = format!(
            "SELECT doc || jsonb_build_object('{ID_FIELD}', id) FROM {} ORDER BY created_at, id",
            collection.table()
        );
        let rows = sqlx::query_scalar::<_, Json<Document>>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|Json(d)| d).collect())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        let sql = format!(
            "SELECT doc || jsonb_build_object('{ID_FIELD}', id) FROM {} WHERE id = $1",
            collection.table()
        );
        let row = sqlx::query_scalar::<_, Json<Document>>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(d)| d))
    }

    async fn find_by_field_ignore_case(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let sql = format!(
            "SELECT doc || jsonb_build_object('{ID_FIELD}', id) FROM {} \
             WHERE lower(doc ->> $1) = lower($2) \
             ORDER BY created_at, id",
            collection.table()
        );
        let rows = sqlx::query_scalar::<_, Json<Document>>(&sql)
            .bind(field)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|Json(d)| d).collect())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> Result<InsertOneResult, StoreError> {
        doc.remove(ID_FIELD);
        let id = Uuid::new_v4();
        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", collection.table());
        sqlx::query(&sql)
            .bind(id)
            .bind(Json(&doc))
            .execute(&self.pool)
            .await?;
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }
}
