//! Compliance catalogue: programs, rules and standards.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use complyhub_auth::rbac::policies;
use complyhub_core::error::AppError;
use complyhub_database::repositories::program::ProgramRepository;
use complyhub_database::repositories::rule::RuleRepository;
use complyhub_database::repositories::standard::StandardRepository;
use complyhub_entity::program::{
    CreateProgram, CreateRule, CreateStandard, Program, ProgramCascade, ProgramOverview, Rule,
    RuleWithStandards, Standard, StandardPriority, StandardType, UpdateProgram, UpdateRule,
    UpdateStandard,
};

use crate::access::{AccessResolver, Scope};
use crate::context::RequestContext;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProgramRequest {
    pub name: String,
    pub description: Option<String>,
    pub industry: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRuleRequest {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStandardRequest {
    pub program_rule_id: Option<Uuid>,
    pub label: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: StandardPriority,
    #[serde(rename = "type")]
    pub standard_type: StandardType,
}

/// Manages the compliance catalogue. Reads need site staff; most writes
/// need a site admin.
#[derive(Debug, Clone)]
pub struct ProgramService {
    program_repo: Arc<ProgramRepository>,
    rule_repo: Arc<RuleRepository>,
    standard_repo: Arc<StandardRepository>,
    access: Arc<AccessResolver>,
}

fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ProgramService {
    pub fn new(
        program_repo: Arc<ProgramRepository>,
        rule_repo: Arc<RuleRepository>,
        standard_repo: Arc<StandardRepository>,
        access: Arc<AccessResolver>,
    ) -> Self {
        Self {
            program_repo,
            rule_repo,
            standard_repo,
            access,
        }
    }

    // ── Programs ────────────────────────────────────────────────

    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateProgramRequest,
    ) -> Result<Program, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_CREATE, Scope::Site)
            .await?;
        let (Some(name), Some(industry)) = (required(&req.name), required(&req.industry)) else {
            return Err(AppError::bad_request("Name and industry are required"));
        };

        let program = self
            .program_repo
            .create(&CreateProgram {
                name,
                description: req.description,
                industry,
                created_by: ctx.user_id,
            })
            .await?;
        info!(program_id = %program.id, user_id = %ctx.user_id, "Compliance program created");
        Ok(program)
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        is_active: Option<bool>,
    ) -> Result<Vec<Program>, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_READ, Scope::Site)
            .await?;
        self.program_repo.find_all(is_active).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Program, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_READ, Scope::Site)
            .await?;
        self.find(id).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdateProgram,
    ) -> Result<Program, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_WRITE, Scope::Site)
            .await?;
        if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Program name cannot be empty"));
        }
        let program = self.program_repo.update(id, &data).await?;
        info!(program_id = %id, user_id = %ctx.user_id, "Compliance program updated");
        Ok(program)
    }

    /// Remove the program with every rule and standard it owns.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<ProgramCascade, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_WRITE, Scope::Site)
            .await?;
        let cascade = self
            .program_repo
            .delete_cascade(id)
            .await?
            .ok_or_else(|| AppError::not_found("Compliance program not found"))?;
        info!(
            program_id = %id,
            user_id = %ctx.user_id,
            rules = cascade.rules_deleted,
            standards = cascade.standards_deleted,
            "Compliance program deleted"
        );
        Ok(cascade)
    }

    pub async fn set_active(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        is_active: bool,
    ) -> Result<Program, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_WRITE, Scope::Site)
            .await?;
        let program = self.program_repo.set_active(id, is_active).await?;
        info!(program_id = %id, is_active, user_id = %ctx.user_id, "Compliance program status changed");
        Ok(program)
    }

    /// The program with its rules, each rule's standards, and the
    /// standards not filed under any rule.
    pub async fn overview(&self, ctx: &RequestContext, id: Uuid) -> Result<ProgramOverview, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_READ, Scope::Site)
            .await?;
        let program = self.find(id).await?;
        let rules = self.rule_repo.find_by_program(id).await?;
        let standards = self.standard_repo.find_by_program(id).await?;
        Ok(build_overview(program, rules, standards))
    }

    // ── Rules ───────────────────────────────────────────────────

    pub async fn create_rule(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
        req: CreateRuleRequest,
    ) -> Result<Rule, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_WRITE, Scope::Site)
            .await?;
        let (Some(name), Some(code)) = (required(&req.name), required(&req.code)) else {
            return Err(AppError::bad_request("Rule name and code are required"));
        };
        self.find(program_id).await?;

        let rule = self
            .rule_repo
            .create(&CreateRule {
                program_id,
                name,
                code,
                description: req.description,
            })
            .await?;
        info!(program_id = %program_id, rule_id = %rule.id, code = %rule.code, "Program rule created");
        Ok(rule)
    }

    pub async fn list_rules(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
    ) -> Result<Vec<Rule>, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_READ, Scope::Site)
            .await?;
        self.find(program_id).await?;
        self.rule_repo.find_by_program(program_id).await
    }

    pub async fn get_rule(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
        rule_id: Uuid,
    ) -> Result<Rule, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_READ, Scope::Site)
            .await?;
        self.find_rule(program_id, rule_id).await
    }

    pub async fn update_rule(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
        rule_id: Uuid,
        data: UpdateRule,
    ) -> Result<Rule, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_WRITE, Scope::Site)
            .await?;
        if [&data.name, &data.code]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| s.trim().is_empty()))
        {
            return Err(AppError::validation("Rule name and code cannot be empty"));
        }
        let rule = self.rule_repo.update(program_id, rule_id, &data).await?;
        info!(program_id = %program_id, rule_id = %rule_id, "Program rule updated");
        Ok(rule)
    }

    /// Delete a rule with the standards filed under it.
    pub async fn delete_rule(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
        rule_id: Uuid,
    ) -> Result<u64, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_WRITE, Scope::Site)
            .await?;
        let standards = self
            .rule_repo
            .delete_cascade(program_id, rule_id)
            .await?
            .ok_or_else(|| AppError::not_found("Rule not found"))?;
        info!(program_id = %program_id, rule_id = %rule_id, standards, "Program rule deleted");
        Ok(standards)
    }

    pub async fn rule_standards(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
        rule_id: Uuid,
    ) -> Result<Vec<Standard>, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_READ, Scope::Site)
            .await?;
        self.find_rule(program_id, rule_id).await?;
        self.standard_repo.find_by_rule(program_id, rule_id).await
    }

    // ── Standards ───────────────────────────────────────────────

    pub async fn create_standard(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
        req: CreateStandardRequest,
    ) -> Result<Standard, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_WRITE, Scope::Site)
            .await?;
        let (Some(label), Some(title)) = (required(&req.label), required(&req.title)) else {
            return Err(AppError::bad_request("Label and title are required"));
        };
        self.find(program_id).await?;
        if let Some(rule_id) = req.program_rule_id {
            self.find_rule(program_id, rule_id).await?;
        }

        let standard = self
            .standard_repo
            .create(&CreateStandard {
                program_id,
                program_rule_id: req.program_rule_id,
                label,
                title,
                description: req.description,
                priority: req.priority,
                standard_type: req.standard_type,
            })
            .await?;
        info!(program_id = %program_id, standard_id = %standard.id, "Program standard created");
        Ok(standard)
    }

    pub async fn list_standards(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
    ) -> Result<Vec<Standard>, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_READ, Scope::Site)
            .await?;
        self.find(program_id).await?;
        self.standard_repo.find_by_program(program_id).await
    }

    pub async fn get_standard(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
        standard_id: Uuid,
    ) -> Result<Standard, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_READ, Scope::Site)
            .await?;
        self.standard_repo
            .find(program_id, standard_id)
            .await?
            .ok_or_else(|| AppError::not_found("Standard not found"))
    }

    pub async fn update_standard(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
        standard_id: Uuid,
        data: UpdateStandard,
    ) -> Result<Standard, AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_WRITE, Scope::Site)
            .await?;
        if let Some(Some(rule_id)) = data.program_rule_id {
            self.find_rule(program_id, rule_id).await?;
        }
        let standard = self
            .standard_repo
            .update(program_id, standard_id, &data)
            .await?;
        info!(program_id = %program_id, standard_id = %standard_id, "Program standard updated");
        Ok(standard)
    }

    pub async fn delete_standard(
        &self,
        ctx: &RequestContext,
        program_id: Uuid,
        standard_id: Uuid,
    ) -> Result<(), AppError> {
        self.access
            .require(ctx, &policies::PROGRAM_WRITE, Scope::Site)
            .await?;
        if !self.standard_repo.delete(program_id, standard_id).await? {
            return Err(AppError::not_found("Standard not found"));
        }
        info!(program_id = %program_id, standard_id = %standard_id, "Program standard deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Program, AppError> {
        self.program_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Compliance program not found"))
    }

    async fn find_rule(&self, program_id: Uuid, rule_id: Uuid) -> Result<Rule, AppError> {
        self.rule_repo
            .find(program_id, rule_id)
            .await?
            .ok_or_else(|| AppError::not_found("Rule not found"))
    }
}

/// Group a program's standards under their rules.
fn build_overview(program: Program, rules: Vec<Rule>, standards: Vec<Standard>) -> ProgramOverview {
    let mut by_rule: HashMap<Uuid, Vec<Standard>> = HashMap::new();
    let mut standalone = Vec::new();
    for standard in standards {
        match standard.program_rule_id {
            Some(rule_id) => by_rule.entry(rule_id).or_default().push(standard),
            None => standalone.push(standard),
        }
    }

    let rules = rules
        .into_iter()
        .map(|rule| RuleWithStandards {
            standards: by_rule.remove(&rule.id).unwrap_or_default(),
            rule,
        })
        .collect();

    ProgramOverview {
        program,
        rules,
        standalone_standards: standalone,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn program() -> Program {
        Program {
            id: Uuid::new_v4(),
            name: "ISO 27001".into(),
            description: None,
            industry: "Technology".into(),
            is_active: true,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rule(program_id: Uuid, code: &str) -> Rule {
        Rule {
            id: Uuid::new_v4(),
            program_id,
            name: format!("Rule {code}"),
            code: code.into(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn standard(program_id: Uuid, rule_id: Option<Uuid>, label: &str) -> Standard {
        Standard {
            id: Uuid::new_v4(),
            program_id,
            program_rule_id: rule_id,
            label: label.into(),
            title: label.into(),
            description: None,
            priority: StandardPriority::default(),
            standard_type: StandardType::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn overview_groups_standards_by_rule() {
        let p = program();
        let a5 = rule(p.id, "A.5");
        let a6 = rule(p.id, "A.6");
        let standards = vec![
            standard(p.id, Some(a5.id), "A.5.1"),
            standard(p.id, Some(a5.id), "A.5.2"),
            standard(p.id, None, "Scope"),
        ];

        let overview = build_overview(p, vec![a5, a6], standards);
        assert_eq!(overview.rules.len(), 2);
        assert_eq!(overview.rules[0].standards.len(), 2);
        assert!(overview.rules[1].standards.is_empty());
        assert_eq!(overview.standalone_standards.len(), 1);
        assert_eq!(overview.standalone_standards[0].label, "Scope");
    }

    #[test]
    fn required_trims() {
        assert_eq!(required("  A.5 "), Some("A.5".to_string()));
        assert_eq!(required("   "), None);
    }

    #[test]
    fn standard_request_defaults() {
        let req: CreateStandardRequest =
            serde_json::from_str(r#"{"label":"A.5.1","title":"Policies"}"#).expect("parse");
        assert_eq!(req.priority, StandardPriority::Medium);
        assert_eq!(req.standard_type, StandardType::General);
        assert!(req.program_rule_id.is_none());
    }
}
