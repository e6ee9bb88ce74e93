//! Integration tests for document uploads, versions and downloads.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{TestApp, TestUser};

struct Workspace {
    owner: TestUser,
    org_id: Uuid,
    team_id: Uuid,
    folder_id: Uuid,
}

async fn workspace(app: &TestApp) -> Workspace {
    let mut owner = app.create_user("owner").await;
    let org_id = app.create_organization(&mut owner).await;
    let team_id = app.create_team(&owner, org_id, "Records").await;
    let response = app
        .request(
            "POST",
            "/api/v1/folders",
            Some(json!({ "name": "Evidence", "teamId": team_id })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    Workspace {
        owner,
        org_id,
        team_id,
        folder_id: response.id(),
    }
}

const PDF_BYTES: &[u8] = b"%PDF-1.4 test document";

#[tokio::test]
async fn test_upload_infers_type_and_downloads() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let ws = workspace(&app).await;

    let response = app
        .multipart(
            &format!("/api/v1/folders/{}/documents", ws.folder_id),
            &[
                ("name", None, b"Access policy".as_slice()),
                ("file", Some("policy.pdf"), PDF_BYTES),
            ],
            &ws.owner.token,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.str_field("type"), "pdf");
    assert_eq!(response.data()["isPrivate"], true);
    assert_eq!(response.data()["currentVersion"]["versionNumber"], "v1.0");
    let document_id = response.id();

    let response = app
        .request(
            "GET",
            &format!("/api/v1/documents/{document_id}/download"),
            None,
            Some(&ws.owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.raw, PDF_BYTES);
    let disposition = response
        .headers
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(disposition, "attachment; filename=\"Access policy.pdf\"");
}

#[tokio::test]
async fn test_upload_rejects_unknown_extension() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let ws = workspace(&app).await;

    let response = app
        .multipart(
            &format!("/api/v1/folders/{}/documents", ws.folder_id),
            &[("file", Some("notes.txt"), b"plain text".as_slice())],
            &ws.owner.token,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.message(),
        "Only docx, pdf and xlsx files are accepted"
    );

    let response = app
        .multipart(
            &format!("/api/v1/folders/{}/documents", ws.folder_id),
            &[("name", None, b"No file".as_slice())],
            &ws.owner.token,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let ws = workspace(&app).await;
    let big = vec![b'x'; app.config.storage.max_upload_size_bytes + 1];

    let response = app
        .multipart(
            &format!("/api/v1/folders/{}/documents", ws.folder_id),
            &[("file", Some("huge.pdf"), big.as_slice())],
            &ws.owner.token,
        )
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_versions_increment_and_match_type() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let ws = workspace(&app).await;

    let response = app
        .multipart(
            &format!("/api/v1/folders/{}/documents", ws.folder_id),
            &[("file", Some("risk.xlsx"), b"sheet one".as_slice())],
            &ws.owner.token,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let document_id = response.id();
    let versions_path = format!("/api/v1/documents/{document_id}/versions");

    let response = app
        .multipart(&versions_path, &[("file", Some("risk.pdf"), PDF_BYTES)], &ws.owner.token)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "New version must be a xlsx file");

    let response = app
        .multipart(&versions_path, &[("file", Some("risk-v2.xlsx"), b"sheet two".as_slice())], &ws.owner.token)
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.data()["currentVersion"]["versionNumber"], "v2.0");

    let response = app
        .request("GET", &versions_path, None, Some(&ws.owner.token))
        .await;
    let versions = response.data().as_array().expect("versions");
    assert_eq!(versions.len(), 2);
    assert_eq!(
        versions.iter().filter(|v| v["isCurrent"] == true).count(),
        1
    );

    let response = app
        .request(
            "GET",
            &format!("/api/v1/documents/{document_id}/download"),
            None,
            Some(&ws.owner.token),
        )
        .await;
    assert_eq!(response.raw, b"sheet two".as_slice());
}

#[tokio::test]
async fn test_private_documents_hidden_from_team_members() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let ws = workspace(&app).await;
    let mut member = app.create_user("member").await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/organizations/{}/teams/{}/users", ws.org_id, ws.team_id),
            Some(json!({ "userId": member.id, "role": "employee" })),
            Some(&ws.owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    app.switch_organization(&mut member, ws.org_id, Some(ws.team_id))
        .await;

    let upload_path = format!("/api/v1/folders/{}/documents", ws.folder_id);
    let private = app
        .multipart(&upload_path, &[("file", Some("secret.pdf"), PDF_BYTES)], &ws.owner.token)
        .await
        .id();
    let public = app
        .multipart(
            &upload_path,
            &[
                ("isPrivate", None, b"false".as_slice()),
                ("file", Some("handbook.docx"), b"docx bytes".as_slice()),
            ],
            &ws.owner.token,
        )
        .await
        .id();

    let response = app
        .request(
            "GET",
            &format!("/api/v1/documents/{private}"),
            None,
            Some(&member.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "You do not have access to this document");

    let response = app
        .request("GET", &upload_path, None, Some(&member.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<_> = response
        .data()
        .as_array()
        .expect("documents")
        .iter()
        .filter_map(|d| d["id"].as_str().map(String::from))
        .collect();
    assert_eq!(ids, vec![public.to_string()]);

    // employees may not delete someone else's document
    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/documents/{public}"),
            None,
            Some(&member.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/folders/{}", ws.folder_id),
            None,
            Some(&ws.owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.message(),
        "Cannot delete folder that contains documents"
    );
}
