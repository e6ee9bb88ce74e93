//! Folder repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_entity::folder::{CreateFolder, Folder, FolderFilter, UpdateFolder};

use super::{db_error, violated_constraint};

/// Repository for document folders.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a folder by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find folder"))
    }

    /// List folders in a team or an organization.
    pub async fn find_all(&self, filter: FolderFilter) -> AppResult<Vec<Folder>> {
        let (sql, id) = match filter {
            FolderFilter::Team(id) => ("SELECT * FROM folders WHERE team_id = $1 ORDER BY name", id),
            FolderFilter::Organization(id) => (
                "SELECT * FROM folders WHERE organization_id = $1 ORDER BY name",
                id,
            ),
        };
        sqlx::query_as::<_, Folder>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list folders"))
    }

    /// Create a folder.
    pub async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            r#"INSERT INTO folders (id, organization_id, team_id, name, description, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.organization_id)
        .bind(data.team_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("folders_team_id_fkey") => AppError::not_found("Team not found"),
            _ => db_error("Failed to create folder")(e),
        })
    }

    /// Update whitelisted folder fields.
    pub async fn update(&self, id: Uuid, data: &UpdateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            r#"UPDATE folders SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update folder"))?
        .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    /// Count documents referencing a folder.
    pub async fn count_documents(&self, id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE folder_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count folder documents"))
    }

    /// Delete an empty folder. A document inserted concurrently makes the
    /// foreign key reject the delete.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match violated_constraint(&e) {
                Some("documents_folder_id_fkey") => {
                    AppError::bad_request("Cannot delete folder that contains documents")
                }
                _ => db_error("Failed to delete folder")(e),
            })?;
        Ok(result.rows_affected() > 0)
    }
}
