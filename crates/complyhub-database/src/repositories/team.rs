//! Team and team-membership repository.
//!
//! Team membership always implies organization membership. Every write
//! here that touches `team_members` also adjusts `organization_members`
//! in the same transaction.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_entity::role::{OrgRole, TeamRole};
use complyhub_entity::team::{CreateTeam, Team, TeamMember, TeamMemberView, TeamMembership, UpdateTeam};

use super::organization::{ensure_member, grant_member_role, revoke_unused_leader_role};
use super::{db_error, version_keys_for, violated_constraint};

/// Repository for teams and their member lists.
#[derive(Debug, Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Create a new team repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a team by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find team"))
    }

    /// List the teams of an organization.
    pub async fn find_by_organization(&self, organization_id: Uuid) -> AppResult<Vec<Team>> {
        sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE organization_id = $1 ORDER BY created_at",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list teams"))
    }

    /// List a user's team memberships, optionally restricted to one
    /// organization.
    pub async fn find_memberships(
        &self,
        user_id: Uuid,
        organization_id: Option<Uuid>,
    ) -> AppResult<Vec<TeamMembership>> {
        sqlx::query_as::<_, TeamMembership>(
            r#"SELECT t.id AS team_id, t.organization_id, t.name, tm.role
            FROM team_members tm
            JOIN teams t ON t.id = tm.team_id
            WHERE tm.user_id = $1 AND ($2::uuid IS NULL OR t.organization_id = $2)
            ORDER BY t.name"#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list team memberships"))
    }

    /// Create a team and enroll its initial members in one transaction.
    pub async fn create_with_members(&self, data: &CreateTeam) -> AppResult<Team> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let team = sqlx::query_as::<_, Team>(
            r#"INSERT INTO teams (id, organization_id, name, description, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.organization_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("teams_organization_name_key") => {
                AppError::conflict("A team with this name already exists in the organization")
            }
            Some("teams_organization_id_fkey") => AppError::not_found("Organization not found"),
            _ => db_error("Failed to create team")(e),
        })?;

        for (user_id, role) in &data.members {
            enroll(&mut tx, &team, *user_id, *role).await?;
        }

        tx.commit().await.map_err(db_error("Failed to commit team"))?;
        Ok(team)
    }

    /// Update whitelisted team fields.
    pub async fn update(&self, id: Uuid, data: &UpdateTeam) -> AppResult<Team> {
        sqlx::query_as::<_, Team>(
            r#"UPDATE teams SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("teams_organization_name_key") => {
                AppError::conflict("A team with this name already exists in the organization")
            }
            _ => db_error("Failed to update team")(e),
        })?
        .ok_or_else(|| AppError::not_found("Team not found"))
    }

    /// Delete a team with its folders, documents and memberships in one
    /// transaction. Returns the storage keys of removed document versions.
    pub async fn delete_cascade(&self, id: Uuid) -> AppResult<Option<Vec<String>>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let Some(team) =
            sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock team"))?
        else {
            return Ok(None);
        };

        let keys =
            version_keys_for(&mut tx, "SELECT id FROM documents WHERE team_id = $1", id).await?;

        let leaders: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM team_members WHERE team_id = $1 AND role = 'teamLeader'",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to list team leaders"))?;

        for (sql, context) in [
            ("DELETE FROM documents WHERE team_id = $1", "Failed to delete team documents"),
            ("DELETE FROM folders WHERE team_id = $1", "Failed to delete team folders"),
            ("DELETE FROM team_members WHERE team_id = $1", "Failed to delete team members"),
            (
                "UPDATE users SET active_team_id = NULL WHERE active_team_id = $1",
                "Failed to clear active team",
            ),
            ("DELETE FROM teams WHERE id = $1", "Failed to delete team"),
        ] {
            sqlx::query(sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_error(context))?;
        }

        for leader in leaders {
            revoke_unused_leader_role(&mut tx, team.organization_id, leader).await?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit team delete"))?;
        Ok(Some(keys))
    }

    // ── Members ─────────────────────────────────────────────────

    /// Find one user's membership in a team.
    pub async fn find_member(&self, team_id: Uuid, user_id: Uuid) -> AppResult<Option<TeamMember>> {
        sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM team_members WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find team member"))
    }

    /// List a team's members with their identities.
    pub async fn list_members(&self, team_id: Uuid) -> AppResult<Vec<TeamMemberView>> {
        sqlx::query_as::<_, TeamMemberView>(
            r#"SELECT u.id AS user_id, u.username, u.email, u.first_name, u.last_name,
                tm.role, tm.joined_at
            FROM team_members tm
            JOIN users u ON u.id = tm.user_id
            WHERE tm.team_id = $1
            ORDER BY tm.joined_at"#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list team members"))
    }

    /// Add users to a team. Each user is enrolled in the team's
    /// organization first, all in one transaction; a user who is already a
    /// member keeps their current role.
    pub async fn add_members(&self, team: &Team, members: &[(Uuid, TeamRole)]) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let mut added = 0;
        for (user_id, role) in members {
            if enroll(&mut tx, team, *user_id, *role).await? {
                added += 1;
            }
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit team members"))?;
        Ok(added)
    }

    /// Add a single user to a team. Fails without touching their
    /// organization roles when they already belong to the team.
    pub async fn add_member(&self, team: &Team, user_id: Uuid, role: TeamRole) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        if !enroll(&mut tx, team, user_id, role).await? {
            return Err(AppError::bad_request("User is already a member of the team"));
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit team member"))?;
        Ok(())
    }

    /// Remove users from a team in one transaction. Returns how many were
    /// members.
    pub async fn remove_members(&self, team: &Team, user_ids: &[Uuid]) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = ANY($2)")
            .bind(team.id)
            .bind(user_ids)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to remove team members"))?;

        sqlx::query(
            "UPDATE users SET active_team_id = NULL WHERE active_team_id = $1 AND id = ANY($2)",
        )
        .bind(team.id)
        .bind(user_ids)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to clear active team"))?;

        for user_id in user_ids {
            revoke_unused_leader_role(&mut tx, team.organization_id, *user_id).await?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit team member removal"))?;
        Ok(result.rows_affected())
    }

    /// Promote an existing member to team leader. Other leaders are left
    /// in place.
    pub async fn promote_leader(&self, team: &Team, user_id: Uuid) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let updated = set_role(&mut tx, team.id, user_id, TeamRole::TeamLeader).await?;
        if updated {
            grant_member_role(&mut tx, team.organization_id, user_id, OrgRole::TeamLeader).await?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit leader promotion"))?;
        Ok(updated)
    }

    /// Demote every current leader to employee and promote `user_id`, in
    /// one transaction. Returns the demoted users.
    pub async fn transfer_leadership(&self, team: &Team, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let demoted: Vec<Uuid> = sqlx::query_scalar(
            r#"UPDATE team_members SET role = 'employee'
            WHERE team_id = $1 AND role = 'teamLeader' AND user_id <> $2
            RETURNING user_id"#,
        )
        .bind(team.id)
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to demote team leaders"))?;

        if !set_role(&mut tx, team.id, user_id, TeamRole::TeamLeader).await? {
            // rolls back the demotion
            return Err(AppError::not_found("User is not a member of this team"));
        }
        grant_member_role(&mut tx, team.organization_id, user_id, OrgRole::TeamLeader).await?;
        for previous in &demoted {
            revoke_unused_leader_role(&mut tx, team.organization_id, *previous).await?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit leadership transfer"))?;
        Ok(demoted)
    }
}

/// Enroll a user in a team and its organization. Returns `false` when the
/// user was already a team member, in which case their organization roles
/// are left untouched.
async fn enroll(conn: &mut PgConnection, team: &Team, user_id: Uuid, role: TeamRole) -> AppResult<bool> {
    let result = sqlx::query(
        r#"INSERT INTO team_members (team_id, user_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (team_id, user_id) DO NOTHING"#,
    )
    .bind(team.id)
    .bind(user_id)
    .bind(role)
    .execute(&mut *conn)
    .await
    .map_err(|e| match violated_constraint(&e) {
        Some("team_members_user_id_fkey") => AppError::not_found("User not found"),
        _ => db_error("Failed to add team member")(e),
    })?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    match role {
        TeamRole::TeamLeader => {
            grant_member_role(conn, team.organization_id, user_id, OrgRole::TeamLeader).await?
        }
        TeamRole::Employee => ensure_member(conn, team.organization_id, user_id).await?,
    }
    Ok(true)
}

async fn set_role(conn: &mut PgConnection, team_id: Uuid, user_id: Uuid, role: TeamRole) -> AppResult<bool> {
    let result = sqlx::query("UPDATE team_members SET role = $3 WHERE team_id = $1 AND user_id = $2")
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .execute(conn)
        .await
        .map_err(db_error("Failed to change team role"))?;
    Ok(result.rows_affected() == 1)
}
