//! Integration tests for organizations, memberships and teams.

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::helpers::{TestApp, TestUser};

#[tokio::test]
async fn test_creator_becomes_owner() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let org_id = app.create_organization(&mut owner).await;

    let response = app
        .request(
            "GET",
            &format!("/api/v1/organizations/{org_id}/users"),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let members = response.data().as_array().expect("members array");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["userId"], owner.id.to_string());
    assert_eq!(members[0]["roles"], json!(["orgOwner"]));

    let response = app
        .request("GET", "/api/v1/organizations/mine", None, Some(&owner.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .data()
            .as_array()
            .is_some_and(|orgs| orgs.iter().any(|o| o["id"] == org_id.to_string()))
    );
}

#[tokio::test]
async fn test_outsider_cannot_read_organization() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let outsider = app.create_user("outsider").await;
    let org_id = app.create_organization(&mut owner).await;

    let response = app
        .request(
            "GET",
            &format!("/api/v1/organizations/{org_id}"),
            None,
            Some(&outsider.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_add_existing_member_and_roles() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let mut member = app.create_user("member").await;
    let org_id = app.create_organization(&mut owner).await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/organizations/{org_id}/users/add-existing"),
            Some(json!({ "username": member.username, "roles": ["employee"] })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

    app.switch_organization(&mut member, org_id, None).await;
    let response = app
        .request(
            "GET",
            &format!("/api/v1/organizations/{org_id}"),
            None,
            Some(&member.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // employees cannot manage members
    let response = app
        .request(
            "GET",
            &format!("/api/v1/organizations/{org_id}/users"),
            None,
            Some(&member.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/organizations/{org_id}/users/{}", member.id),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            &format!("/api/v1/organizations/{org_id}"),
            None,
            Some(&member.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_last_owner_cannot_be_removed() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let org_id = app.create_organization(&mut owner).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/organizations/{org_id}/users/{}", owner.id),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.message(),
        "Cannot remove the last owner of the organization"
    );
}

#[tokio::test]
async fn test_team_creator_leads_team() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let org_id = app.create_organization(&mut owner).await;
    let team_id = app.create_team(&owner, org_id, "Audit").await;

    let response = app
        .request(
            "GET",
            &format!("/api/v1/organizations/{org_id}/teams/{team_id}/members"),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let members = response.data().as_array().expect("members array");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["role"], "teamLeader");
}

#[tokio::test]
async fn test_team_add_enrolls_in_organization() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let mut newcomer = app.create_user("newcomer").await;
    let org_id = app.create_organization(&mut owner).await;
    let team_id = app.create_team(&owner, org_id, "Ops").await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/organizations/{org_id}/teams/{team_id}/users"),
            Some(json!({ "userId": newcomer.id })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    // the user can now switch into the org and the team
    app.switch_organization(&mut newcomer, org_id, Some(team_id))
        .await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/organizations/{org_id}/teams/{team_id}/users"),
            Some(json!({ "userId": newcomer.id })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "User is already a member of the team");
}

#[tokio::test]
async fn test_delete_organization_requires_owner() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let admin_user = app.create_user("orgadmin").await;
    let org_id = app.create_organization(&mut owner).await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/organizations/{org_id}/users"),
            Some(json!({ "userId": admin_user.id, "roles": ["orgAdmin"] })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/organizations/{org_id}"),
            None,
            Some(&admin_user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/organizations/{org_id}"),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            &format!("/api/v1/organizations/{org_id}"),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_team_lifecycle_scenario() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut a = app.create_user("acme_a").await;
    let mut b = app.create_user("acme_b").await;
    let org_id = app.create_organization(&mut a).await;
    let team_id = app.create_team(&a, org_id, "Compliance").await;
    let team_path = format!("/api/v1/organizations/{org_id}/teams/{team_id}");

    let response = app
        .request(
            "GET",
            &format!("/api/v1/organizations/{org_id}/teams"),
            None,
            Some(&a.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .data()
            .as_array()
            .is_some_and(|t| t.iter().any(|t| t["id"] == team_id.to_string()))
    );

    let response = app
        .request(
            "POST",
            &format!("{team_path}/users"),
            Some(json!({ "userId": b.id, "role": "employee" })),
            Some(&a.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    app.switch_organization(&mut b, org_id, Some(team_id)).await;

    let response = app.request("GET", &team_path, None, Some(&b.token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("DELETE", &team_path, None, Some(&b.token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("DELETE", &team_path, None, Some(&a.token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &team_path, None, Some(&a.token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

/// Roles of `user_id` as listed by the organization's member endpoint.
async fn org_roles(app: &TestApp, owner: &TestUser, org_id: Uuid, user_id: Uuid) -> Value {
    let response = app
        .request(
            "GET",
            &format!("/api/v1/organizations/{org_id}/users"),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response
        .data()
        .as_array()
        .and_then(|members| members.iter().find(|m| m["userId"] == user_id.to_string()))
        .map(|m| m["roles"].clone())
        .unwrap_or(Value::Null)
}

/// Team role of `user_id`, or null when they are not on the team.
async fn team_role(app: &TestApp, caller: &TestUser, team_path: &str, user_id: Uuid) -> Value {
    let response = app
        .request("GET", &format!("{team_path}/members"), None, Some(&caller.token))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response
        .data()
        .as_array()
        .and_then(|members| members.iter().find(|m| m["userId"] == user_id.to_string()))
        .map(|m| m["role"].clone())
        .unwrap_or(Value::Null)
}

async fn add_org_member(app: &TestApp, owner: &TestUser, org_id: Uuid, user: &TestUser, role: &str) {
    let response = app
        .request(
            "POST",
            &format!("/api/v1/organizations/{org_id}/users"),
            Some(json!({ "userId": user.id, "roles": [role] })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
}

#[tokio::test]
async fn test_repeated_team_add_keeps_organization_roles() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let member = app.create_user("member").await;
    let org_id = app.create_organization(&mut owner).await;
    let team_id = app.create_team(&owner, org_id, "Ops").await;
    let users_path = format!("/api/v1/organizations/{org_id}/teams/{team_id}/users");

    let response = app
        .request(
            "POST",
            &users_path,
            Some(json!({ "userId": member.id, "role": "employee" })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let response = app
        .request(
            "POST",
            &users_path,
            Some(json!({ "userId": member.id, "role": "teamLeader" })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "User is already a member of the team");

    assert_eq!(
        org_roles(&app, &owner, org_id, member.id).await,
        json!(["employee"])
    );
}

#[tokio::test]
async fn test_org_admin_cannot_remove_owner() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let co_owner = app.create_user("coowner").await;
    let admin_user = app.create_user("orgadmin").await;
    let org_id = app.create_organization(&mut owner).await;
    add_org_member(&app, &owner, org_id, &co_owner, "orgOwner").await;
    add_org_member(&app, &owner, org_id, &admin_user, "orgAdmin").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/organizations/{org_id}/users/{}", co_owner.id),
            None,
            Some(&admin_user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        org_roles(&app, &owner, org_id, co_owner.id).await,
        json!(["orgOwner"])
    );

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/organizations/{org_id}/users/{}", co_owner.id),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
}

#[tokio::test]
async fn test_concurrent_owner_removals_keep_one_owner() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };

    for _ in 0..5 {
        let mut a = app.create_user("owner_a").await;
        let b = app.create_user("owner_b").await;
        let org_id = app.create_organization(&mut a).await;
        add_org_member(&app, &a, org_id, &b, "orgOwner").await;

        let remove_b = format!("/api/v1/organizations/{org_id}/users/{}", b.id);
        let remove_a = format!("/api/v1/organizations/{org_id}/users/{}", a.id);
        let (first, second) = tokio::join!(
            app.request("DELETE", &remove_b, None, Some(&a.token)),
            app.request("DELETE", &remove_a, None, Some(&b.token)),
        );

        let succeeded = [first.status, second.status]
            .iter()
            .filter(|s| **s == StatusCode::OK)
            .count();
        assert_eq!(
            succeeded, 1,
            "statuses: {} {}",
            first.status, second.status
        );

        let owners: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM organization_members WHERE organization_id = $1 AND 'orgOwner' = ANY(roles)",
        )
        .bind(org_id)
        .fetch_one(&app.db_pool)
        .await
        .expect("count owners");
        assert_eq!(owners, 1);
    }
}

#[tokio::test]
async fn test_switch_organization_checks_membership() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let mut other_owner = app.create_user("other").await;
    let outsider = app.create_user("outsider").await;
    let org_id = app.create_organization(&mut owner).await;
    let other_org = app.create_organization(&mut other_owner).await;
    let foreign_team = app.create_team(&other_owner, other_org, "Elsewhere").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/switch-organization",
            Some(json!({ "organizationId": org_id })),
            Some(&outsider.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "You are not a member of this organization");

    let response = app
        .request(
            "POST",
            "/api/v1/auth/switch-organization",
            Some(json!({ "organizationId": org_id, "teamId": foreign_team })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "Team not found in this organization");

    let response = app
        .request(
            "POST",
            "/api/v1/auth/switch-organization",
            Some(json!({ "organizationId": Uuid::new_v4() })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_make_leader_and_transfer_leadership() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let mut owner = app.create_user("owner").await;
    let b = app.create_user("member_b").await;
    let c = app.create_user("member_c").await;
    let outsider = app.create_user("outsider").await;
    let org_id = app.create_organization(&mut owner).await;
    let team_id = app.create_team(&owner, org_id, "Compliance").await;
    let team_path = format!("/api/v1/organizations/{org_id}/teams/{team_id}");

    for user in [&b, &c] {
        let response = app
            .request(
                "POST",
                &format!("{team_path}/users"),
                Some(json!({ "userId": user.id, "role": "employee" })),
                Some(&owner.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    let response = app
        .request(
            "PATCH",
            &format!("{team_path}/users/{}/make-leader", b.id),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(team_role(&app, &owner, &team_path, b.id).await, "teamLeader");
    let roles = org_roles(&app, &owner, org_id, b.id).await;
    assert!(
        roles.as_array().is_some_and(|r| r.contains(&json!("teamLeader"))),
        "{roles:?}"
    );

    let response = app
        .request(
            "PATCH",
            &format!("{team_path}/users/{}/make-leader", outsider.id),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "User is not a member of this team");

    let response = app
        .request(
            "PATCH",
            &format!("{team_path}/transfer-leadership"),
            Some(json!({ "userId": c.id })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    assert_eq!(team_role(&app, &owner, &team_path, c.id).await, "teamLeader");
    assert_eq!(team_role(&app, &owner, &team_path, b.id).await, "employee");
    assert_eq!(team_role(&app, &owner, &team_path, owner.id).await, "employee");

    // demoted leaders lose the organization-level leader role
    assert_eq!(
        org_roles(&app, &owner, org_id, b.id).await,
        json!(["employee"])
    );
    let roles = org_roles(&app, &owner, org_id, owner.id).await;
    assert!(
        roles.as_array().is_some_and(|r| !r.contains(&json!("teamLeader"))
            && r.contains(&json!("orgOwner"))),
        "{roles:?}"
    );

    let response = app
        .request(
            "PATCH",
            &format!("{team_path}/transfer-leadership"),
            Some(json!({ "userId": outsider.id })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(team_role(&app, &owner, &team_path, c.id).await, "teamLeader");
}
