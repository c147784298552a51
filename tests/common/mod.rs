// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use serde_json::{Value, json};
use splitclient::ClientConfig;
use splitclient::application::SplitService;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Helper to create a service talking to a fresh mock backend
pub async fn test_service() -> Result<(SplitService, MockServer)> {
    let server = MockServer::start().await;
    let service = SplitService::connect(ClientConfig::new(server.uri()))?;
    Ok((service, server))
}

pub fn user_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
    })
}

pub fn group_json(id: i64, name: &str, members: &[(i64, &str)]) -> Value {
    json!({
        "id": id,
        "name": name,
        "members": members.iter().map(|&(id, name)| user_json(id, name)).collect::<Vec<_>>(),
        "total_expenses": 0.0,
    })
}

pub fn balance_json(group_id: i64, group_name: &str, entries: &[(i64, &str, f64)]) -> Value {
    json!({
        "group_id": group_id,
        "group_name": group_name,
        "balances": entries
            .iter()
            .map(|&(user_id, user_name, amount)| json!({
                "user_id": user_id,
                "user_name": user_name,
                "amount": amount,
            }))
            .collect::<Vec<_>>(),
    })
}

/// Answer `GET path` with the given JSON body
pub async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer `http_method path` with an error status and a `detail` message
pub async fn mount_error(server: &MockServer, http_method: &str, route: &str, status: u16, detail: &str) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "detail": detail })))
        .mount(server)
        .await;
}

/// Build the response the backend gives for a created expense
pub fn echo_expense(group_id: i64, expense_id: i64, req: &Request) -> ResponseTemplate {
    let body: Value = req.body_json().unwrap_or(Value::Null);
    let splits: Vec<Value> = body["splits"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, split)| {
            json!({
                "id": i as i64 + 1,
                "expense_id": expense_id,
                "user_id": split["user_id"],
                "amount": split["amount"],
                "percentage": split.get("percentage").cloned().unwrap_or(Value::Null),
            })
        })
        .collect();

    ResponseTemplate::new(200).set_body_json(json!({
        "id": expense_id,
        "group_id": group_id,
        "description": body["description"],
        "amount": body["amount"],
        "split_type": body["split_type"],
        "paid_by": body["paid_by"],
        "splits": splits,
    }))
}

/// Mount a group with its expense list, balances and expense creation
pub async fn mount_group_backend(server: &MockServer, group: Value, balances: Value) {
    let group_id = group["id"].as_i64().unwrap_or_default();
    mount_get(server, &format!("/groups/{}", group_id), group).await;
    mount_get(
        server,
        &format!("/expenses/groups/{}/expenses", group_id),
        json!([]),
    )
    .await;
    mount_get(server, &format!("/balances/groups/{}", group_id), balances).await;

    Mock::given(method("POST"))
        .and(path(format!("/expenses/groups/{}/expenses", group_id)))
        .respond_with(move |req: &Request| echo_expense(group_id, 1, req))
        .mount(server)
        .await;
}

/// Bodies of every POST the mock backend has received
pub async fn posted_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .filter_map(|r| r.body_json::<Value>().ok())
        .collect()
}
