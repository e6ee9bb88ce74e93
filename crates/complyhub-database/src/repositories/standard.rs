//! Program standard repository.

use sqlx::PgPool;
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_entity::program::{CreateStandard, Standard, UpdateStandard};

use super::{db_error, violated_constraint};

fn map_write_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match violated_constraint(&e) {
        Some("program_standards_rule_same_program") => {
            AppError::validation("programRuleId must reference a rule of the same program")
        }
        Some("program_standards_program_id_fkey") => {
            AppError::not_found("Compliance program not found")
        }
        _ => db_error(context)(e),
    }
}

/// Repository for the standards of compliance programs.
#[derive(Debug, Clone)]
pub struct StandardRepository {
    pool: PgPool,
}

impl StandardRepository {
    /// Create a new standard repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a standard belonging to `program_id`.
    pub async fn find(&self, program_id: Uuid, standard_id: Uuid) -> AppResult<Option<Standard>> {
        sqlx::query_as::<_, Standard>(
            "SELECT * FROM program_standards WHERE id = $1 AND program_id = $2",
        )
        .bind(standard_id)
        .bind(program_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find program standard"))
    }

    /// List every standard of a program ordered by label.
    pub async fn find_by_program(&self, program_id: Uuid) -> AppResult<Vec<Standard>> {
        sqlx::query_as::<_, Standard>(
            "SELECT * FROM program_standards WHERE program_id = $1 ORDER BY label",
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list program standards"))
    }

    /// List the standards filed under one rule.
    pub async fn find_by_rule(&self, program_id: Uuid, rule_id: Uuid) -> AppResult<Vec<Standard>> {
        sqlx::query_as::<_, Standard>(
            r#"SELECT * FROM program_standards
            WHERE program_id = $1 AND program_rule_id = $2
            ORDER BY label"#,
        )
        .bind(program_id)
        .bind(rule_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list rule standards"))
    }

    /// Return which of `ids` name existing standards.
    pub async fn existing_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar("SELECT id FROM program_standards WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to look up program standards"))
    }

    /// Create a standard.
    pub async fn create(&self, data: &CreateStandard) -> AppResult<Standard> {
        sqlx::query_as::<_, Standard>(
            r#"INSERT INTO program_standards
                (id, program_id, program_rule_id, label, title, description, priority, standard_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.program_id)
        .bind(data.program_rule_id)
        .bind(&data.label)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority)
        .bind(data.standard_type)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error("Failed to create program standard"))
    }

    /// Update whitelisted standard fields.
    pub async fn update(
        &self,
        program_id: Uuid,
        standard_id: Uuid,
        data: &UpdateStandard,
    ) -> AppResult<Standard> {
        let (set_rule, rule) = match data.program_rule_id {
            Some(rule) => (true, rule),
            None => (false, None),
        };

        sqlx::query_as::<_, Standard>(
            r#"UPDATE program_standards SET
                program_rule_id = CASE WHEN $3 THEN $4 ELSE program_rule_id END,
                label = COALESCE($5, label),
                title = COALESCE($6, title),
                description = COALESCE($7, description),
                priority = COALESCE($8, priority),
                standard_type = COALESCE($9, standard_type),
                updated_at = NOW()
            WHERE id = $1 AND program_id = $2
            RETURNING *"#,
        )
        .bind(standard_id)
        .bind(program_id)
        .bind(set_rule)
        .bind(rule)
        .bind(&data.label)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority)
        .bind(data.standard_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error("Failed to update program standard"))?
        .ok_or_else(|| AppError::not_found("Program standard not found"))
    }

    /// Delete a standard.
    pub async fn delete(&self, program_id: Uuid, standard_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM program_standards WHERE id = $1 AND program_id = $2")
            .bind(standard_id)
            .bind(program_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete program standard"))?;
        Ok(result.rows_affected() > 0)
    }
}
