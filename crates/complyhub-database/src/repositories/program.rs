//! Compliance program repository.

use sqlx::PgPool;
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_entity::program::{CreateProgram, Program, ProgramCascade, UpdateProgram};

use super::{db_error, violated_constraint};

/// Repository for compliance programs.
#[derive(Debug, Clone)]
pub struct ProgramRepository {
    pool: PgPool,
}

impl ProgramRepository {
    /// Create a new program repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a program by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Program>> {
        sqlx::query_as::<_, Program>("SELECT * FROM compliance_programs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find compliance program"))
    }

    /// List programs, optionally filtered by their active flag.
    pub async fn find_all(&self, is_active: Option<bool>) -> AppResult<Vec<Program>> {
        sqlx::query_as::<_, Program>(
            r#"SELECT * FROM compliance_programs
            WHERE ($1::boolean IS NULL OR is_active = $1)
            ORDER BY name"#,
        )
        .bind(is_active)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list compliance programs"))
    }

    /// Return which of `ids` name existing programs.
    pub async fn existing_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar("SELECT id FROM compliance_programs WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to look up compliance programs"))
    }

    /// Create a program.
    pub async fn create(&self, data: &CreateProgram) -> AppResult<Program> {
        sqlx::query_as::<_, Program>(
            r#"INSERT INTO compliance_programs (id, name, description, industry, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.industry)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("compliance_programs_name_key") => {
                AppError::conflict("Compliance program name already exists")
            }
            _ => db_error("Failed to create compliance program")(e),
        })
    }

    /// Update whitelisted program fields.
    pub async fn update(&self, id: Uuid, data: &UpdateProgram) -> AppResult<Program> {
        sqlx::query_as::<_, Program>(
            r#"UPDATE compliance_programs SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                industry = COALESCE($4, industry),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.industry)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("compliance_programs_name_key") => {
                AppError::conflict("Compliance program name already exists")
            }
            _ => db_error("Failed to update compliance program")(e),
        })?
        .ok_or_else(|| AppError::not_found("Compliance program not found"))
    }

    /// Flip the active flag.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Program> {
        sqlx::query_as::<_, Program>(
            "UPDATE compliance_programs SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to change compliance program status"))?
        .ok_or_else(|| AppError::not_found("Compliance program not found"))
    }

    /// Delete a program with all its standards and rules in one
    /// transaction.
    pub async fn delete_cascade(&self, id: Uuid) -> AppResult<Option<ProgramCascade>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM compliance_programs WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock compliance program"))?;
        if locked.is_none() {
            return Ok(None);
        }

        let standards_deleted = sqlx::query("DELETE FROM program_standards WHERE program_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete program standards"))?
            .rows_affected();

        let rules_deleted = sqlx::query("DELETE FROM program_rules WHERE program_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete program rules"))?
            .rows_affected();

        sqlx::query("DELETE FROM compliance_programs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete compliance program"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit compliance program delete"))?;

        Ok(Some(ProgramCascade {
            rules_deleted,
            standards_deleted,
        }))
    }
}
