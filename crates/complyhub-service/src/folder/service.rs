//! Folder CRUD scoped to the caller's organization and teams.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use complyhub_auth::rbac::policies;
use complyhub_core::error::AppError;
use complyhub_database::repositories::folder::FolderRepository;
use complyhub_database::repositories::team::TeamRepository;
use complyhub_entity::folder::{CreateFolder, Folder, FolderFilter, UpdateFolder};

use crate::access::{AccessResolver, Scope};
use crate::context::RequestContext;

/// Request to create a folder inside a team of the active organization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateFolderRequest {
    pub name: String,
    pub description: Option<String>,
    pub team_id: Option<Uuid>,
}

/// Folder listing filters, narrowest wins.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderQuery {
    pub team_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
}

/// Manages folders.
#[derive(Debug, Clone)]
pub struct FolderService {
    folder_repo: Arc<FolderRepository>,
    team_repo: Arc<TeamRepository>,
    access: Arc<AccessResolver>,
}

impl FolderService {
    pub fn new(
        folder_repo: Arc<FolderRepository>,
        team_repo: Arc<TeamRepository>,
        access: Arc<AccessResolver>,
    ) -> Self {
        Self {
            folder_repo,
            team_repo,
            access,
        }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> Result<Folder, AppError> {
        let name = req.name.trim();
        let team_id = match req.team_id {
            Some(id) if !name.is_empty() => id,
            _ => return Err(AppError::bad_request("Folder name and teamId are required")),
        };
        let org_id = ctx.require_organization()?;
        self.access
            .require(
                ctx,
                &policies::FOLDER_CREATE,
                Scope::Team {
                    organization_id: org_id,
                    team_id,
                },
            )
            .await?;
        self.team_in_org(team_id, org_id).await?;

        let folder = self
            .folder_repo
            .create(&CreateFolder {
                organization_id: org_id,
                team_id,
                name: name.to_string(),
                description: req.description,
                created_by: ctx.user_id,
            })
            .await?;
        info!(
            folder_id = %folder.id,
            team_id = %team_id,
            organization_id = %org_id,
            user_id = %ctx.user_id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Folders of a team, else of an organization, else of the active
    /// organization.
    pub async fn list(&self, ctx: &RequestContext, query: FolderQuery) -> Result<Vec<Folder>, AppError> {
        let org_id = match query.organization_id {
            Some(id) => id,
            None => ctx.require_organization()?,
        };
        self.access
            .require(ctx, &policies::FOLDER_LIST, Scope::Organization(org_id))
            .await?;

        let filter = match query.team_id {
            Some(team_id) => {
                self.team_in_org(team_id, org_id).await?;
                FolderFilter::Team(team_id)
            }
            None => FolderFilter::Organization(org_id),
        };
        self.folder_repo.find_all(filter).await
    }

    /// A folder, for members of its organization and team.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Folder, AppError> {
        let folder = self.find(id).await?;
        self.access
            .require_team_member(ctx, folder.organization_id, folder.team_id)
            .await?;
        Ok(folder)
    }

    /// Rename or describe a folder. Allowed for its creator, org
    /// owners/admins and the team's leader.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdateFolder,
    ) -> Result<Folder, AppError> {
        let folder = self.find(id).await?;
        let scope = Scope::Team {
            organization_id: folder.organization_id,
            team_id: folder.team_id,
        };
        let requirement = if folder.created_by == ctx.user_id {
            &policies::FOLDER_LIST
        } else {
            &policies::FOLDER_UPDATE
        };
        self.access.require(ctx, requirement, scope).await?;

        if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Folder name cannot be empty"));
        }
        let folder = self.folder_repo.update(id, &data).await?;
        info!(folder_id = %id, user_id = %ctx.user_id, "Folder updated");
        Ok(folder)
    }

    /// Delete an empty folder.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let folder = self.find(id).await?;
        self.access
            .require(
                ctx,
                &policies::FOLDER_DELETE,
                Scope::Organization(folder.organization_id),
            )
            .await?;

        if self.folder_repo.count_documents(id).await? > 0 {
            return Err(AppError::bad_request(
                "Cannot delete folder that contains documents",
            ));
        }
        if !self.folder_repo.delete(id).await? {
            return Err(AppError::not_found("Folder not found"));
        }
        info!(folder_id = %id, user_id = %ctx.user_id, "Folder deleted");
        Ok(())
    }

    pub(crate) async fn find(&self, id: Uuid) -> Result<Folder, AppError> {
        self.folder_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    async fn team_in_org(&self, team_id: Uuid, org_id: Uuid) -> Result<(), AppError> {
        let team = self
            .team_repo
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        if team.organization_id != org_id {
            return Err(AppError::bad_request(
                "Team does not belong to the active organization",
            ));
        }
        Ok(())
    }
}
