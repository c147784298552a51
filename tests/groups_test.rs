mod common;

use anyhow::Result;
use common::{balance_json, group_json, mount_error, mount_get, posted_bodies, test_service, user_json};
use serde_json::json;
use splitclient::application::{AppError, ErrorCategory};
use splitclient::domain::{BalanceDirection, ValidationError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_create_user_validates_before_sending() -> Result<()> {
    let (service, server) = test_service().await?;

    let err = service.create_user("Alice", "not-an-email").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::InvalidEmail(_))
    ));

    let err = service.create_user("   ", "alice@example.com").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::EmptyName)));

    assert!(posted_bodies(&server).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_create_user() -> Result<()> {
    let (service, server) = test_service().await?;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(4, "Dana")))
        .mount(&server)
        .await;

    let user = service.create_user(" Dana ", "dana@example.com").await?;

    assert_eq!(user.id, 4);
    assert_eq!(
        posted_bodies(&server).await,
        vec![json!({"name": "Dana", "email": "dana@example.com"})]
    );
    Ok(())
}

#[tokio::test]
async fn test_create_group_refreshes_group_list() -> Result<()> {
    let (service, server) = test_service().await?;
    let created = group_json(2, "Trip", &[(1, "Alice"), (2, "Bob")]);
    Mock::given(method("POST"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(created.clone()))
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/groups",
        json!([group_json(1, "Flat", &[(1, "Alice")]), created]),
    )
    .await;

    let result = service.create_group("Trip", &[1, 2, 1]).await?;

    assert_eq!(result.group.id, 2);
    assert_eq!(result.groups.len(), 2);
    assert_eq!(
        posted_bodies(&server).await,
        vec![json!({"name": "Trip", "user_ids": [1, 2]})]
    );
    Ok(())
}

#[tokio::test]
async fn test_create_group_needs_members() -> Result<()> {
    let (service, _server) = test_service().await?;

    let err = service.create_group("Trip", &[]).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::NoMembers)));
    Ok(())
}

#[tokio::test]
async fn test_create_group_with_unknown_user() -> Result<()> {
    let (service, server) = test_service().await?;
    mount_error(&server, "POST", "/groups", 404, "One or more users not found").await;

    let err = service.create_group("Trip", &[1, 99]).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
    Ok(())
}

#[tokio::test]
async fn test_load_group_details() -> Result<()> {
    let (service, server) = test_service().await?;
    mount_get(&server, "/groups/1", group_json(1, "Trip", &[(1, "Alice"), (2, "Bob")])).await;
    mount_get(&server, "/expenses/groups/1/expenses", json!([])).await;
    mount_get(&server, "/users", json!([user_json(1, "Alice"), user_json(2, "Bob")])).await;
    mount_get(
        &server,
        "/balances/groups/1",
        balance_json(1, "Trip", &[(1, "Alice", -12.34), (2, "Bob", 12.34)]),
    )
    .await;

    let details = service.load_group_details(1).await?;

    assert_eq!(details.group.name, "Trip");
    assert_eq!(details.users.len(), 2);
    let lines = details.balance_lines();
    assert_eq!(lines[0].statement.to_string(), "Is Owed $12.34");
    assert_eq!(lines[1].statement.to_string(), "Owes $12.34");
    Ok(())
}

#[tokio::test]
async fn test_one_failing_request_fails_the_whole_load() -> Result<()> {
    let (service, server) = test_service().await?;
    mount_get(&server, "/groups/1", group_json(1, "Trip", &[(1, "Alice")])).await;
    mount_get(&server, "/expenses/groups/1/expenses", json!([])).await;
    mount_get(&server, "/users", json!([user_json(1, "Alice")])).await;
    mount_error(&server, "GET", "/balances/groups/1", 500, "aggregation failed").await;

    let err = service.load_group_details(1).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Request);
    Ok(())
}

#[tokio::test]
async fn test_unknown_group() -> Result<()> {
    let (service, server) = test_service().await?;
    mount_error(&server, "GET", "/groups/9", 404, "Group not found").await;

    let err = service.get_group(9).await.unwrap_err();
    assert!(matches!(err, AppError::GroupNotFound(9)));
    Ok(())
}

#[tokio::test]
async fn test_user_balances_across_groups() -> Result<()> {
    let (service, server) = test_service().await?;
    mount_get(
        &server,
        "/balances/users/1",
        json!({
            "user_id": 1,
            "user_name": "Alice",
            "group_balances": [
                balance_json(1, "Trip", &[(1, "Alice", -12.34)]),
                balance_json(2, "Flat", &[(1, "Alice", 20.0)]),
                balance_json(3, "Office", &[]),
            ],
        }),
    )
    .await;

    let view = service.user_balances(1).await?;

    assert_eq!(view.user_name, "Alice");
    assert_eq!(view.groups.len(), 3);
    assert_eq!(
        view.groups[0].statement().map(|s| s.to_string()),
        Some("Is Owed $12.34".to_string())
    );
    assert_eq!(
        view.groups[1].statement().map(|s| s.direction),
        Some(BalanceDirection::Owes)
    );
    assert!(view.groups[2].entry.is_none());
    assert!((view.net_total - 7.66).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_unknown_user_balances() -> Result<()> {
    let (service, server) = test_service().await?;
    mount_error(&server, "GET", "/balances/users/5", 404, "User not found").await;

    let err = service.user_balances(5).await.unwrap_err();
    assert!(matches!(err, AppError::UserNotFound(5)));
    Ok(())
}
