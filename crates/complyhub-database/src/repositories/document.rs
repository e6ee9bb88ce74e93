//! Document and document-version repository.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_entity::document::version::version_label;
use complyhub_entity::document::{
    CreateDocument, Document, DocumentFilter, DocumentVersion, NewVersion, UpdateDocument,
};

use super::db_error;

/// Repository for documents and their versions.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a document by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find document"))
    }

    /// List documents in a folder, team or organization, newest first.
    pub async fn find_all(&self, filter: DocumentFilter) -> AppResult<Vec<Document>> {
        let (column, id) = match filter {
            DocumentFilter::Folder(id) => ("folder_id", id),
            DocumentFilter::Team(id) => ("team_id", id),
            DocumentFilter::Organization(id) => ("organization_id", id),
        };
        let sql = format!("SELECT * FROM documents WHERE {column} = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list documents"))
    }

    /// Create a document and its first version (`v1.0`, current) in one
    /// transaction.
    pub async fn create_with_version(
        &self,
        data: &CreateDocument,
    ) -> AppResult<(Document, DocumentVersion)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let document = sqlx::query_as::<_, Document>(
            r#"INSERT INTO documents
                (id, name, document_type, is_private, organization_id, team_id, folder_id,
                 associated_programs, associated_standards, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.document_type)
        .bind(data.is_private)
        .bind(data.organization_id)
        .bind(data.team_id)
        .bind(data.folder_id)
        .bind(&data.associated_programs)
        .bind(&data.associated_standards)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create document"))?;

        let version = insert_version(&mut tx, document.id, 1, &data.first_version).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit document"))?;
        Ok((document, version))
    }

    /// Update whitelisted document fields.
    pub async fn update(&self, id: Uuid, data: &UpdateDocument) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            r#"UPDATE documents SET
                name = COALESCE($2, name),
                is_private = COALESCE($3, is_private),
                associated_programs = COALESCE($4, associated_programs),
                associated_standards = COALESCE($5, associated_standards),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.is_private)
        .bind(&data.associated_programs)
        .bind(&data.associated_standards)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update document"))?
        .ok_or_else(|| AppError::not_found("Document not found"))
    }

    /// Append a version and make it the only current one.
    ///
    /// The document row is locked for the duration of the transaction so
    /// concurrent uploads are numbered one after another.
    pub async fn add_version(&self, document_id: Uuid, data: &NewVersion) -> AppResult<DocumentVersion> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM documents WHERE id = $1 FOR UPDATE")
                .bind(document_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock document"))?;
        if locked.is_none() {
            return Err(AppError::not_found("Document not found"));
        }

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_versions WHERE document_id = $1")
                .bind(document_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to count document versions"))?;

        sqlx::query(
            "UPDATE document_versions SET is_current = FALSE WHERE document_id = $1 AND is_current",
        )
        .bind(document_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to demote current version"))?;

        let version = insert_version(&mut tx, document_id, existing + 1, data).await?;

        sqlx::query("UPDATE documents SET updated_at = NOW() WHERE id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to touch document"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit document version"))?;
        Ok(version)
    }

    /// List a document's versions, newest first.
    pub async fn list_versions(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 ORDER BY created_at DESC, substring(version_number FROM 2)::numeric DESC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list document versions"))
    }

    /// The version currently flagged current.
    pub async fn current_version(&self, document_id: Uuid) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 AND is_current",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find current document version"))
    }

    /// Delete a document and its versions. Returns the storage keys of the
    /// removed versions, or `None` if the document did not exist.
    pub async fn delete(&self, id: Uuid) -> AppResult<Option<Vec<String>>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let keys: Vec<String> = sqlx::query_scalar(
            "DELETE FROM document_versions WHERE document_id = $1 RETURNING storage_key",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to delete document versions"))?;

        let removed = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete document"))?
            .rows_affected();
        if removed == 0 {
            return Ok(None);
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit document delete"))?;
        Ok(Some(keys))
    }
}

async fn insert_version(
    conn: &mut PgConnection,
    document_id: Uuid,
    number: i64,
    data: &NewVersion,
) -> AppResult<DocumentVersion> {
    sqlx::query_as::<_, DocumentVersion>(
        r#"INSERT INTO document_versions
            (id, document_id, version_number, storage_key, size_bytes, content_type, is_current, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(document_id)
    .bind(version_label(number))
    .bind(&data.storage_key)
    .bind(data.size_bytes)
    .bind(&data.content_type)
    .bind(data.created_by)
    .fetch_one(conn)
    .await
    .map_err(db_error("Failed to insert document version"))
}
