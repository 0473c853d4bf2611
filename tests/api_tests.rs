//! Endpoint behavior against a mock GitLab server.

use gitlab_rest::{
    ClientConfig, GitlabApi,
    client::{IssueQuery, MilestoneFilter},
    domain::{AccessLevel, IssueState, LabelUpdate, MembershipScope, MergeRequestState},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

async fn setup() -> (MockServer, GitlabApi) {
    let server = MockServer::start().await;
    let api = GitlabApi::new(ClientConfig::new(server.uri(), "secret")).expect("client");
    (server, api)
}

fn ok(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

#[tokio::test]
async fn test_project_path_is_encoded_as_one_segment() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fproject"))
        .and(header("PRIVATE-TOKEN", "secret"))
        .respond_with(ok(json!({ "id": 7, "path_with_namespace": "group/project" })))
        .expect(1)
        .mount(&server)
        .await;

    let project = api.get_project("group/project").await.expect("project");

    assert_eq!(project.id, 7);
}

#[tokio::test]
async fn test_create_label_defaults_invalid_color() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/2/labels"))
        .and(body_string_contains("color=%23000000"))
        .and(body_string_contains("name=bug"))
        .respond_with(ok(json!({ "name": "bug", "color": "#000000" })))
        .expect(1)
        .mount(&server)
        .await;

    let label = api
        .create_label(2u64, "bug", None, Some("red"))
        .await
        .expect("label");

    assert_eq!(label.color, "#000000");
}

#[tokio::test]
async fn test_edit_label_leaves_out_invalid_color() {
    let (server, api) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/2/labels"))
        .and(body_string_contains("new_name=defect"))
        .respond_with(ok(json!({ "name": "defect" })))
        .expect(1)
        .mount(&server)
        .await;

    let update = LabelUpdate::default()
        .with_name("defect")
        .with_color("not-a-color");
    api.edit_label(2u64, "bug", &update).await.expect("label");

    let requests = server.received_requests().await.expect("recorded");
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(!body.contains("color="), "unexpected color in {body}");
}

#[tokio::test]
async fn test_delete_label_encodes_name() {
    let (server, api) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/2/labels"))
        .and(query_param("name", "needs review"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    api.delete_label(2u64, "needs review").await.expect("deleted");
}

#[tokio::test]
async fn test_add_member_sends_form() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/groups/9/members"))
        .and(body_string_contains("access_level=30"))
        .and(body_string_contains("user_id=42"))
        .respond_with(ok(json!({ "id": 42, "username": "jdoe", "access_level": 30 })))
        .expect(1)
        .mount(&server)
        .await;

    let member = api
        .add_member(MembershipScope::Groups, 9u64, 42, AccessLevel::Developer)
        .await
        .expect("member");

    assert_eq!(member.access_level, AccessLevel::Developer);
}

#[tokio::test]
async fn test_group_issues_with_filters() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/4/issues"))
        .and(query_param("milestone", "No Milestone"))
        .and(query_param("state", "opened"))
        .respond_with(ok(json!([{ "id": 1, "iid": 1, "project_id": 2 }])))
        .expect(1)
        .mount(&server)
        .await;

    let query = IssueQuery::new()
        .with_group(4u64)
        .with_milestone(MilestoneFilter::NoMilestone)
        .with_state(IssueState::Opened);
    let issues = api.get_issues(&query).await.expect("issues");

    assert_eq!(issues.len(), 1);
}

#[tokio::test]
async fn test_merge_request_states_are_joined() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/2/merge_requests"))
        .and(query_param("state", "opened,merged"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let merge_requests = api
        .get_merge_requests(
            MembershipScope::Projects,
            2u64,
            &[MergeRequestState::Opened, MergeRequestState::Merged],
        )
        .await
        .expect("merge requests");

    assert!(merge_requests.is_empty());
}

#[tokio::test]
async fn test_get_file_returns_raw_text() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/2/repository/files/src%2Fmain%2Ers/raw"))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fn main() {}\n"))
        .expect(1)
        .mount(&server)
        .await;

    let content = api
        .get_file(2u64, "src/main.rs", "main")
        .await
        .expect("file");

    assert_eq!(content, "fn main() {}\n");
}

#[tokio::test]
async fn test_protect_branch_encodes_branch_name() {
    let (server, api) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/2/repository/branches/feature%2Flogin/protect"))
        .and(query_param("developers_can_push", "false"))
        .and(query_param("developers_can_merge", "false"))
        .respond_with(ok(json!({ "name": "feature/login", "protected": true })))
        .expect(1)
        .mount(&server)
        .await;

    let branch = api
        .protect_branch(2u64, "feature/login")
        .await
        .expect("branch");

    assert!(branch.protected);
}

#[tokio::test]
async fn test_status_error_carries_body() {
    let (server, api) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"401 Unauthorized"}"#))
        .mount(&server)
        .await;

    let err = api.get_projects().await.expect_err("unauthorized");

    assert_eq!(err.status_code(), Some(401));
    assert!(err.to_string().contains("401"));
}
