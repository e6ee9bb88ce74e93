//! Existence checks for catalogue references carried by organizations,
//! documents and templates.

use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_database::repositories::program::ProgramRepository;
use complyhub_database::repositories::standard::StandardRepository;

/// Fail with the first program id that does not exist.
pub async fn ensure_programs_exist(repo: &ProgramRepository, ids: &[Uuid]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = repo.existing_ids(ids).await?;
    match first_missing(ids, &found) {
        Some(missing) => Err(AppError::not_found(format!(
            "Compliance program not found: {missing}"
        ))),
        None => Ok(()),
    }
}

/// Fail with the first standard id that does not exist.
pub async fn ensure_standards_exist(repo: &StandardRepository, ids: &[Uuid]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = repo.existing_ids(ids).await?;
    match first_missing(ids, &found) {
        Some(missing) => Err(AppError::not_found(format!("Standard not found: {missing}"))),
        None => Ok(()),
    }
}

fn first_missing(requested: &[Uuid], found: &[Uuid]) -> Option<Uuid> {
    requested.iter().copied().find(|id| !found.contains(id))
}
