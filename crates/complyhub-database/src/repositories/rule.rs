//! Program rule repository.

use sqlx::PgPool;
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_entity::program::{CreateRule, Rule, UpdateRule};

use super::{db_error, violated_constraint};

const DUPLICATE_CODE: &str = "Rule code already exists for this program";

/// Repository for the rules of compliance programs.
#[derive(Debug, Clone)]
pub struct RuleRepository {
    pool: PgPool,
}

impl RuleRepository {
    /// Create a new rule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a rule belonging to `program_id`.
    pub async fn find(&self, program_id: Uuid, rule_id: Uuid) -> AppResult<Option<Rule>> {
        sqlx::query_as::<_, Rule>("SELECT * FROM program_rules WHERE id = $1 AND program_id = $2")
            .bind(rule_id)
            .bind(program_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find program rule"))
    }

    /// List a program's rules ordered by code.
    pub async fn find_by_program(&self, program_id: Uuid) -> AppResult<Vec<Rule>> {
        sqlx::query_as::<_, Rule>("SELECT * FROM program_rules WHERE program_id = $1 ORDER BY code")
            .bind(program_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list program rules"))
    }

    /// Create a rule.
    pub async fn create(&self, data: &CreateRule) -> AppResult<Rule> {
        sqlx::query_as::<_, Rule>(
            r#"INSERT INTO program_rules (id, program_id, name, code, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.program_id)
        .bind(&data.name)
        .bind(&data.code)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("program_rules_program_code_key") => AppError::conflict(DUPLICATE_CODE),
            Some("program_rules_program_id_fkey") => {
                AppError::not_found("Compliance program not found")
            }
            _ => db_error("Failed to create program rule")(e),
        })
    }

    /// Update whitelisted rule fields.
    pub async fn update(&self, program_id: Uuid, rule_id: Uuid, data: &UpdateRule) -> AppResult<Rule> {
        sqlx::query_as::<_, Rule>(
            r#"UPDATE program_rules SET
                name = COALESCE($3, name),
                code = COALESCE($4, code),
                description = COALESCE($5, description),
                updated_at = NOW()
            WHERE id = $1 AND program_id = $2
            RETURNING *"#,
        )
        .bind(rule_id)
        .bind(program_id)
        .bind(&data.name)
        .bind(&data.code)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("program_rules_program_code_key") => AppError::conflict(DUPLICATE_CODE),
            _ => db_error("Failed to update program rule")(e),
        })?
        .ok_or_else(|| AppError::not_found("Program rule not found"))
    }

    /// Delete a rule and every standard filed under it in one transaction.
    /// Returns the number of standards removed, or `None` if the rule does
    /// not exist in the program.
    pub async fn delete_cascade(&self, program_id: Uuid, rule_id: Uuid) -> AppResult<Option<u64>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let standards = sqlx::query(
            "DELETE FROM program_standards WHERE program_rule_id = $1 AND program_id = $2",
        )
        .bind(rule_id)
        .bind(program_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to delete rule standards"))?
        .rows_affected();

        let removed = sqlx::query("DELETE FROM program_rules WHERE id = $1 AND program_id = $2")
            .bind(rule_id)
            .bind(program_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete program rule"))?
            .rows_affected();

        if removed == 0 {
            // nothing to commit; dropping the transaction rolls back
            return Ok(None);
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit rule delete"))?;
        Ok(Some(standards))
    }
}
