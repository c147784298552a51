mod common;

use anyhow::Result;
use common::{balance_json, group_json, mount_get, test_service, user_json};
use serde_json::json;
use splitclient::io::{Exporter, GroupSnapshot};
use std::fs;
use tempfile::TempDir;

async fn mount_trip(server: &wiremock::MockServer) {
    mount_get(server, "/groups/1", group_json(1, "Trip", &[(1, "Alice"), (2, "Bob")])).await;
    mount_get(server, "/users", json!([user_json(1, "Alice"), user_json(2, "Bob")])).await;
    mount_get(
        server,
        "/expenses/groups/1/expenses",
        json!([{
            "id": 7, "group_id": 1, "description": "Hotel", "amount": 100.0,
            "split_type": "equal", "paid_by": 1,
            "splits": [
                {"id": 1, "user_id": 1, "amount": 50.0},
                {"id": 2, "user_id": 2, "amount": 50.0}
            ]
        }]),
    )
    .await;
    mount_get(
        server,
        "/balances/groups/1",
        balance_json(1, "Trip", &[(1, "Alice", -50.0), (2, "Bob", 50.0)]),
    )
    .await;
}

#[tokio::test]
async fn test_export_expenses_csv_to_file() -> Result<()> {
    let (service, server) = test_service().await?;
    mount_trip(&server).await;
    let temp = TempDir::new()?;
    let file_path = temp.path().join("expenses.csv");

    let exporter = Exporter::new(&service);
    let rows = exporter
        .export_expenses_csv(1, fs::File::create(&file_path)?)
        .await?;

    assert_eq!(rows, 2);
    let content = fs::read_to_string(&file_path)?;
    assert_eq!(
        content,
        "id,description,amount,paid_by,split_type,user_id,share,percentage\n\
         7,Hotel,100.00,1,equal,1,50.00,\n\
         7,Hotel,100.00,1,equal,2,50.00,\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_export_balances_csv() -> Result<()> {
    let (service, server) = test_service().await?;
    mount_trip(&server).await;

    let mut out = Vec::new();
    let count = Exporter::new(&service)
        .export_group_balances_csv(1, &mut out)
        .await?;

    assert_eq!(count, 2);
    assert_eq!(
        String::from_utf8(out)?,
        "user_id,user_name,amount,direction\n1,Alice,-50.00,is_owed\n2,Bob,50.00,owes\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_export_group_json_snapshot() -> Result<()> {
    let (service, server) = test_service().await?;
    mount_trip(&server).await;

    let mut out = Vec::new();
    let snapshot = Exporter::new(&service).export_group_json(1, &mut out).await?;

    assert_eq!(snapshot.group.name, "Trip");
    assert_eq!(snapshot.expenses.len(), 1);

    let parsed: GroupSnapshot = serde_json::from_slice(&out)?;
    assert_eq!(parsed.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(parsed.balances.balances.len(), 2);
    Ok(())
}
