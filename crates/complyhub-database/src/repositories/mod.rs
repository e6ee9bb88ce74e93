//! Repository implementations, one per aggregate.

pub mod document;
pub mod folder;
pub mod organization;
pub mod program;
pub mod rule;
pub mod standard;
pub mod team;
pub mod template;
pub mod user;

use complyhub_core::error::{AppError, ErrorKind};

/// Map an sqlx error to a database error with context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Name of the constraint an error violated, if it was a constraint violation.
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

/// Storage keys of every version belonging to documents matched by
/// `scope_sql`, which must select document ids using `$1`.
pub(crate) async fn version_keys_for(
    conn: &mut sqlx::PgConnection,
    scope_sql: &str,
    id: uuid::Uuid,
) -> Result<Vec<String>, AppError> {
    let sql = format!(
        "SELECT storage_key FROM document_versions WHERE document_id IN ({scope_sql})"
    );
    sqlx::query_scalar::<_, String>(&sql)
        .bind(id)
        .fetch_all(conn)
        .await
        .map_err(db_error("Failed to collect document storage keys"))
}
