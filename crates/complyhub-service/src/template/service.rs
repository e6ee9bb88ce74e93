//! Document templates linked to the compliance catalogue.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use complyhub_auth::rbac::policies;
use complyhub_core::error::AppError;
use complyhub_database::repositories::organization::OrganizationRepository;
use complyhub_database::repositories::program::ProgramRepository;
use complyhub_database::repositories::standard::StandardRepository;
use complyhub_database::repositories::template::TemplateRepository;
use complyhub_entity::template::{CreateTemplate, Template, TemplateType, UpdateTemplate};

use crate::access::{AccessResolver, Scope};
use crate::catalogue;
use crate::context::RequestContext;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: Option<TemplateType>,
    pub content: String,
    pub associated_programs: Vec<Uuid>,
    pub associated_standards: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct TemplateService {
    template_repo: Arc<TemplateRepository>,
    program_repo: Arc<ProgramRepository>,
    standard_repo: Arc<StandardRepository>,
    org_repo: Arc<OrganizationRepository>,
    access: Arc<AccessResolver>,
}

impl TemplateService {
    pub fn new(
        template_repo: Arc<TemplateRepository>,
        program_repo: Arc<ProgramRepository>,
        standard_repo: Arc<StandardRepository>,
        org_repo: Arc<OrganizationRepository>,
        access: Arc<AccessResolver>,
    ) -> Self {
        Self {
            template_repo,
            program_repo,
            standard_repo,
            org_repo,
            access,
        }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateTemplateRequest,
    ) -> Result<Template, AppError> {
        self.access
            .require(ctx, &policies::TEMPLATE_WRITE, Scope::Site)
            .await?;

        let name = req.name.trim();
        let content = req.content.trim();
        if name.is_empty() || content.is_empty() {
            return Err(AppError::bad_request("Name and content are required"));
        }
        catalogue::ensure_programs_exist(&self.program_repo, &req.associated_programs).await?;
        catalogue::ensure_standards_exist(&self.standard_repo, &req.associated_standards).await?;

        let template = self
            .template_repo
            .create(&CreateTemplate {
                name: name.to_string(),
                template_type: req.template_type.unwrap_or_default(),
                content: content.to_string(),
                associated_programs: req.associated_programs,
                associated_standards: req.associated_standards,
                created_by: ctx.user_id,
            })
            .await?;
        info!(template_id = %template.id, user_id = %ctx.user_id, "Template created");
        Ok(template)
    }

    /// Site staff see every template. Other callers see the templates tied
    /// to a program their active organization has enabled.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Template>, AppError> {
        if ctx.is_site_staff() {
            return self.template_repo.find_all().await;
        }
        let enabled = self.enabled_programs(ctx).await?;
        if enabled.is_empty() {
            return Ok(Vec::new());
        }
        self.template_repo.find_for_programs(&enabled).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Template, AppError> {
        let template = self.find(id).await?;
        if ctx.is_site_staff() {
            return Ok(template);
        }
        let enabled = self.enabled_programs(ctx).await?;
        if !template
            .associated_programs
            .iter()
            .any(|p| enabled.contains(p))
        {
            return Err(AppError::authorization(
                "You do not have access to this template",
            ));
        }
        Ok(template)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdateTemplate,
    ) -> Result<Template, AppError> {
        self.access
            .require(ctx, &policies::TEMPLATE_WRITE, Scope::Site)
            .await?;
        self.find(id).await?;

        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&data.name) || blank(&data.content) {
            return Err(AppError::validation("Name and content cannot be empty"));
        }
        catalogue::ensure_programs_exist(
            &self.program_repo,
            data.associated_programs.as_deref().unwrap_or_default(),
        )
        .await?;
        catalogue::ensure_standards_exist(
            &self.standard_repo,
            data.associated_standards.as_deref().unwrap_or_default(),
        )
        .await?;

        let template = self.template_repo.update(id, &data).await?;
        info!(template_id = %id, user_id = %ctx.user_id, "Template updated");
        Ok(template)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.access
            .require(ctx, &policies::TEMPLATE_WRITE, Scope::Site)
            .await?;
        if !self.template_repo.delete(id).await? {
            return Err(AppError::not_found("Template not found"));
        }
        info!(template_id = %id, user_id = %ctx.user_id, "Template deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Template, AppError> {
        self.template_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Template not found"))
    }

    /// Programs enabled for the caller's active organization, empty when
    /// no organization is selected or the caller is not a member.
    async fn enabled_programs(&self, ctx: &RequestContext) -> Result<Vec<Uuid>, AppError> {
        let Some(org_id) = ctx.organization_id else {
            return Ok(Vec::new());
        };
        let roles = self
            .access
            .caller_roles(ctx, Scope::Organization(org_id))
            .await?;
        if roles.org.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .org_repo
            .find_by_id(org_id)
            .await?
            .map(|org| org.settings.compliance_programs_enabled)
            .unwrap_or_default())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_is_optional_on_create() {
        let req: CreateTemplateRequest =
            serde_json::from_str(r#"{"name":"Access SOP","content":"..."}"#).expect("parse");
        assert!(req.template_type.is_none());
        assert_eq!(req.template_type.unwrap_or_default(), TemplateType::Other);

        let req: CreateTemplateRequest =
            serde_json::from_str(r#"{"name":"Access SOP","content":"...","type":"SOP"}"#)
                .expect("parse");
        assert_eq!(req.template_type, Some(TemplateType::Sop));
    }
}
