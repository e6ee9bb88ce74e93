//! Organization and organization-membership repository.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_entity::organization::{
    CreateOrganization, Organization, OrganizationMember, OrganizationMemberView,
    UpdateOrganization,
};
use complyhub_entity::role::OrgRole;
use complyhub_entity::user::{CreateUser, User};

use super::user::insert_user;
use super::{db_error, version_keys_for, violated_constraint};

/// Repository for organizations and their member lists.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an organization by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find organization"))
    }

    /// Find an organization by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find organization by name"))
    }

    /// List every organization, alphabetically.
    pub async fn find_all(&self) -> AppResult<Vec<Organization>> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list organizations"))
    }

    /// List the organizations a user is a member of.
    pub async fn find_for_user(&self, user_id: Uuid) -> AppResult<Vec<Organization>> {
        sqlx::query_as::<_, Organization>(
            r#"SELECT o.* FROM organizations o
            JOIN organization_members m ON m.organization_id = o.id
            WHERE m.user_id = $1
            ORDER BY o.name"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list organizations for user"))
    }

    /// Create an organization and enroll its creator as owner, atomically.
    pub async fn create_with_owner(&self, data: &CreateOrganization) -> AppResult<Organization> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let org = sqlx::query_as::<_, Organization>(
            r#"INSERT INTO organizations
                (id, name, description, logo_url, billing_info,
                 compliance_programs_enabled, data_retention_period, ip_restrictions, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.logo_url)
        .bind(Json(&data.billing_info))
        .bind(&data.settings.compliance_programs_enabled)
        .bind(data.settings.data_retention_period)
        .bind(&data.settings.ip_restrictions)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("organizations_name_key") => {
                AppError::bad_request("Organization name already exists")
            }
            _ => db_error("Failed to create organization")(e),
        })?;

        insert_member(&mut tx, org.id, data.created_by, &[OrgRole::OrgOwner]).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit organization"))?;
        Ok(org)
    }

    /// Update whitelisted organization fields.
    pub async fn update(&self, id: Uuid, data: &UpdateOrganization) -> AppResult<Organization> {
        sqlx::query_as::<_, Organization>(
            r#"UPDATE organizations SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                logo_url = COALESCE($4, logo_url),
                billing_info = COALESCE($5, billing_info),
                compliance_programs_enabled = COALESCE($6, compliance_programs_enabled),
                data_retention_period = COALESCE($7, data_retention_period),
                ip_restrictions = COALESCE($8, ip_restrictions),
                status = COALESCE($9, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.logo_url)
        .bind(data.billing_info.as_ref().map(Json))
        .bind(&data.compliance_programs_enabled)
        .bind(data.data_retention_period)
        .bind(&data.ip_restrictions)
        .bind(data.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("organizations_name_key") => {
                AppError::bad_request("Organization name already exists")
            }
            Some("organizations_retention_positive") => {
                AppError::validation("dataRetentionPeriod must be positive")
            }
            _ => db_error("Failed to update organization")(e),
        })?
        .ok_or_else(|| AppError::not_found("Organization not found"))
    }

    /// Delete an organization with all of its teams, folders, documents and
    /// memberships in one transaction.
    ///
    /// Returns the storage keys of the removed document versions; the
    /// caller deletes those objects once the transaction has committed.
    pub async fn delete_cascade(&self, id: Uuid) -> AppResult<Option<Vec<String>>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM organizations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock organization"))?;
        if exists.is_none() {
            return Ok(None);
        }

        let keys = version_keys_for(
            &mut tx,
            "SELECT id FROM documents WHERE organization_id = $1",
            id,
        )
        .await?;

        let steps: [(&str, &'static str); 7] = [
            (
                "DELETE FROM documents WHERE organization_id = $1",
                "Failed to delete organization documents",
            ),
            (
                "DELETE FROM folders WHERE organization_id = $1",
                "Failed to delete organization folders",
            ),
            (
                "DELETE FROM team_members WHERE team_id IN (SELECT id FROM teams WHERE organization_id = $1)",
                "Failed to delete team memberships",
            ),
            (
                "UPDATE users SET active_team_id = NULL WHERE active_team_id IN (SELECT id FROM teams WHERE organization_id = $1)",
                "Failed to clear active teams",
            ),
            (
                "DELETE FROM teams WHERE organization_id = $1",
                "Failed to delete organization teams",
            ),
            (
                "DELETE FROM organization_members WHERE organization_id = $1",
                "Failed to delete organization members",
            ),
            (
                "UPDATE users SET active_organization_id = NULL WHERE active_organization_id = $1",
                "Failed to clear active organizations",
            ),
        ];
        for (sql, context) in steps {
            let result = sqlx::query(sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_error(context))?;
            debug!(organization_id = %id, rows = result.rows_affected(), "{context}");
        }

        sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete organization"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit organization delete"))?;
        Ok(Some(keys))
    }

    // ── Members ─────────────────────────────────────────────────

    /// Find one user's membership in an organization.
    pub async fn find_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<OrganizationMember>> {
        sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find organization member"))
    }

    /// List an organization's members with their identities.
    pub async fn list_members(&self, organization_id: Uuid) -> AppResult<Vec<OrganizationMemberView>> {
        sqlx::query_as::<_, OrganizationMemberView>(
            r#"SELECT u.id AS user_id, u.username, u.email, u.first_name, u.last_name,
                m.roles, m.joined_at
            FROM organization_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY m.joined_at"#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list organization members"))
    }

    /// Add an existing user to an organization.
    pub async fn add_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        roles: &[OrgRole],
    ) -> AppResult<OrganizationMember> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        insert_member(&mut conn, organization_id, user_id, roles).await
    }

    /// Register a new user and add them to an organization in one
    /// transaction.
    pub async fn create_user_as_member(
        &self,
        organization_id: Uuid,
        user: &CreateUser,
        roles: &[OrgRole],
    ) -> AppResult<(User, OrganizationMember)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let created = insert_user(&mut tx, user).await?;
        let member = insert_member(&mut tx, organization_id, created.id, roles).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit new member"))?;
        Ok((created, member))
    }

    /// Remove a user from an organization, together with their team
    /// memberships there and any active context pointing into it.
    ///
    /// The organization row is locked for the whole transaction, so
    /// concurrent removals are serialized and the owner count read here
    /// cannot go stale. Owners may only be removed when `owners_removable`
    /// is set, and never the last one.
    pub async fn remove_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        owners_removable: bool,
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM organizations WHERE id = $1 FOR NO KEY UPDATE",
        )
        .bind(organization_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock organization"))?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

        let member = sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to find organization member"))?
        .ok_or_else(|| AppError::not_found("User is not a member of this organization"))?;

        if member.roles.contains(&OrgRole::OrgOwner) {
            if !owners_removable {
                return Err(AppError::authorization(
                    "Only an organization owner can remove another owner",
                ));
            }
            let owners: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM organization_members WHERE organization_id = $1 AND 'orgOwner' = ANY(roles)",
            )
            .bind(organization_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count organization owners"))?;
            if owners <= 1 {
                return Err(AppError::bad_request(
                    "Cannot remove the last owner of the organization",
                ));
            }
        }

        sqlx::query(
            r#"DELETE FROM team_members
            WHERE user_id = $2 AND team_id IN (SELECT id FROM teams WHERE organization_id = $1)"#,
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to remove team memberships"))?;

        sqlx::query("DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2")
            .bind(organization_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to remove organization member"))?;

        sqlx::query(
            r#"UPDATE users SET active_organization_id = NULL, active_team_id = NULL
            WHERE id = $2 AND active_organization_id = $1"#,
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to clear active organization"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit member removal"))?;
        Ok(())
    }
}

/// Insert a membership row on an existing connection.
pub(crate) async fn insert_member(
    conn: &mut PgConnection,
    organization_id: Uuid,
    user_id: Uuid,
    roles: &[OrgRole],
) -> AppResult<OrganizationMember> {
    if roles.is_empty() {
        return Err(AppError::validation("At least one role is required"));
    }
    sqlx::query_as::<_, OrganizationMember>(
        r#"INSERT INTO organization_members (organization_id, user_id, roles)
        VALUES ($1, $2, $3)
        RETURNING *"#,
    )
    .bind(organization_id)
    .bind(user_id)
    .bind(roles)
    .fetch_one(conn)
    .await
    .map_err(|e| match violated_constraint(&e) {
        Some("organization_members_pkey") => {
            AppError::conflict("User is already a member of this organization")
        }
        Some("organization_members_user_id_fkey") => AppError::not_found("User not found"),
        Some("organization_members_organization_id_fkey") => {
            AppError::not_found("Organization not found")
        }
        _ => db_error("Failed to add organization member")(e),
    })
}

/// Make sure a user is an organization member holding `role`, creating the
/// membership or extending its role set as needed.
pub(crate) async fn grant_member_role(
    conn: &mut PgConnection,
    organization_id: Uuid,
    user_id: Uuid,
    role: OrgRole,
) -> AppResult<()> {
    sqlx::query(
        r#"INSERT INTO organization_members (organization_id, user_id, roles)
        VALUES ($1, $2, ARRAY[$3]::org_role[])
        ON CONFLICT (organization_id, user_id) DO UPDATE
            SET roles = array_append(organization_members.roles, $3)
            WHERE NOT ($3 = ANY(organization_members.roles))"#,
    )
    .bind(organization_id)
    .bind(user_id)
    .bind(role)
    .execute(conn)
    .await
    .map_err(|e| match violated_constraint(&e) {
        Some("organization_members_user_id_fkey") => AppError::not_found("User not found"),
        _ => db_error("Failed to grant organization role")(e),
    })?;
    Ok(())
}

/// Make sure a user is an organization member, adding them as an employee
/// when they are not.
pub(crate) async fn ensure_member(
    conn: &mut PgConnection,
    organization_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    sqlx::query(
        r#"INSERT INTO organization_members (organization_id, user_id, roles)
        VALUES ($1, $2, ARRAY['employee']::org_role[])
        ON CONFLICT (organization_id, user_id) DO NOTHING"#,
    )
    .bind(organization_id)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(|e| match violated_constraint(&e) {
        Some("organization_members_user_id_fkey") => AppError::not_found("User not found"),
        _ => db_error("Failed to add organization member")(e),
    })?;
    Ok(())
}

/// Drop the organization-level `teamLeader` role from a user who no longer
/// leads any team in the organization. A role set never becomes empty.
pub(crate) async fn revoke_unused_leader_role(
    conn: &mut PgConnection,
    organization_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    sqlx::query(
        r#"UPDATE organization_members SET roles = CASE
                WHEN cardinality(array_remove(roles, 'teamLeader'::org_role)) = 0
                    THEN ARRAY['employee']::org_role[]
                ELSE array_remove(roles, 'teamLeader'::org_role)
            END
        WHERE organization_id = $1 AND user_id = $2
            AND NOT EXISTS (
                SELECT 1 FROM team_members tm
                JOIN teams t ON t.id = tm.team_id
                WHERE t.organization_id = $1 AND tm.user_id = $2 AND tm.role = 'teamLeader'
            )"#,
    )
    .bind(organization_id)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(db_error("Failed to revoke team leader role"))?;
    Ok(())
}
