//! Template repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_entity::template::{CreateTemplate, Template, UpdateTemplate};

use super::db_error;

/// Repository for document templates.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    /// Create a new template repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a template by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Template>> {
        sqlx::query_as::<_, Template>("SELECT * FROM templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find template"))
    }

    /// List every template, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<Template>> {
        sqlx::query_as::<_, Template>("SELECT * FROM templates ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list templates"))
    }

    /// List templates associated with at least one of `program_ids`.
    pub async fn find_for_programs(&self, program_ids: &[Uuid]) -> AppResult<Vec<Template>> {
        sqlx::query_as::<_, Template>(
            "SELECT * FROM templates WHERE associated_programs && $1 ORDER BY created_at DESC",
        )
        .bind(program_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list templates for programs"))
    }

    /// Create a template.
    pub async fn create(&self, data: &CreateTemplate) -> AppResult<Template> {
        sqlx::query_as::<_, Template>(
            r#"INSERT INTO templates
                (id, name, template_type, content, associated_programs, associated_standards, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.template_type)
        .bind(&data.content)
        .bind(&data.associated_programs)
        .bind(&data.associated_standards)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create template"))
    }

    /// Update whitelisted template fields.
    pub async fn update(&self, id: Uuid, data: &UpdateTemplate) -> AppResult<Template> {
        sqlx::query_as::<_, Template>(
            r#"UPDATE templates SET
                name = COALESCE($2, name),
                template_type = COALESCE($3, template_type),
                content = COALESCE($4, content),
                associated_programs = COALESCE($5, associated_programs),
                associated_standards = COALESCE($6, associated_standards),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.template_type)
        .bind(&data.content)
        .bind(&data.associated_programs)
        .bind(&data.associated_standards)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update template"))?
        .ok_or_else(|| AppError::not_found("Template not found"))
    }

    /// Delete a template.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete template"))?;
        Ok(result.rows_affected() > 0)
    }
}
