mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use common::TestApp;

struct Ledger {
    app: TestApp,
    token: String,
    account: Uuid,
    category: Uuid,
}

async fn ledger() -> Result<Ledger> {
    let app = TestApp::new();
    let (_, token) = app.register("Ana", "ana@x.com").await?;
    let account = app
        .create_account(&token, json!({ "name": "Wallet", "type": "cash" }))
        .await?;
    let category = app.create_category(&token, "Food", "expense").await?;
    Ok(Ledger {
        app,
        token,
        account,
        category,
    })
}

impl Ledger {
    fn body(&self, date: &str, kind: &str) -> Value {
        json!({
            "description": "Lunch",
            "amount": 12.5,
            "date": date,
            "type": kind,
            "account_id": self.account,
            "category_id": self.category,
        })
    }

    async fn create(&self, date: &str, kind: &str) -> Result<Uuid> {
        let res = self
            .app
            .post("/api/v1/transactions", &self.token, self.body(date, kind))
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create: {}", res.status);
        res.created_id()
    }

    async fn list(&self, query: &str) -> Result<Vec<Value>> {
        let res = self
            .app
            .get(&format!("/api/v1/transactions{}", query), &self.token)
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "list: {}", res.status);
        Ok(res.json()?.as_array().cloned().unwrap_or_default())
    }
}

#[tokio::test]
async fn date_range_filter_includes_boundaries() -> Result<()> {
    let l = ledger().await?;
    l.create("2024-01-15", "expense").await?;

    let listed = l
        .list("?start_date=2024-01-15&end_date=2024-01-15")
        .await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["date"], "2024-01-15");

    assert!(l.list("?start_date=2024-01-16").await?.is_empty());
    assert!(l.list("?end_date=2024-01-14").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn filters_by_type_account_and_category() -> Result<()> {
    let l = ledger().await?;
    l.create("2024-01-10", "expense").await?;
    l.create("2024-01-11", "Income").await?;

    let income = l.list("?type=income").await?;
    assert_eq!(income.len(), 1);
    assert_eq!(income[0]["type"], "income");

    assert_eq!(l.list(&format!("?account_id={}", l.account)).await?.len(), 2);
    assert_eq!(
        l.list(&format!("?category_id={}&type=expense", l.category))
            .await?
            .len(),
        1
    );
    assert!(l
        .list(&format!("?account_id={}", Uuid::new_v4()))
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn malformed_filter_values_are_bad_requests() -> Result<()> {
    let l = ledger().await?;
    for query in [
        "?start_date=15-01-2024",
        "?start_date=24-01-15",
        "?end_date=2024-1-5",
        "?account_id=nope",
        "?type=transfer",
    ] {
        let res = l
            .app
            .get(&format!("/api/v1/transactions{}", query), &l.token)
            .await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "query {}", query);
    }
    Ok(())
}

#[tokio::test]
async fn create_validates_every_field() -> Result<()> {
    let l = ledger().await?;
    let res = l
        .app
        .post(
            "/api/v1/transactions",
            &l.token,
            json!({ "amount": 0, "type": "gift" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json()?;
    for field in ["description", "amount", "date", "type", "account_id", "category_id"] {
        assert!(body[field].is_string(), "missing {}", field);
    }

    let mut bad_date = l.body("2024-01-15", "expense");
    bad_date["date"] = json!("15/01/2024");
    let res = l.app.post("/api/v1/transactions", &l.token, bad_date).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn short_year_dates_are_not_stored() -> Result<()> {
    let l = ledger().await?;
    for date in ["24-01-15", "+2024-01-15"] {
        let mut body = l.body("2024-01-15", "expense");
        body["date"] = json!(date);
        let res = l.app.post("/api/v1/transactions", &l.token, body).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "date {}", date);
    }
    assert!(l.list("").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn other_users_accounts_cannot_be_referenced() -> Result<()> {
    let l = ledger().await?;
    let (_, bob) = l.app.register("Bob", "bob@x.com").await?;

    let res = l
        .app
        .post("/api/v1/transactions", &bob, l.body("2024-01-15", "expense"))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn sparse_update_keeps_other_fields() -> Result<()> {
    let l = ledger().await?;
    let id = l.create("2024-01-15", "expense").await?;
    let uri = format!("/api/v1/transactions/{}", id);

    let res = l
        .app
        .put(&uri, &l.token, json!({ "amount": 20, "description": "" }))
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let body = l.app.get(&uri, &l.token).await?.json()?;
    assert_eq!(body["amount"], json!(20.0));
    assert_eq!(body["description"], "Lunch");
    assert_eq!(body["date"], "2024-01-15");

    let res = l
        .app
        .put(&uri, &l.token, json!({ "date": "2024/02/01", "description": "Dinner" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let body = l.app.get(&uri, &l.token).await?.json()?;
    assert_eq!(body["description"], "Lunch");

    let res = l.app.put(&uri, &l.token, json!({ "amount": -3 })).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn deleting_account_removes_its_transactions() -> Result<()> {
    let l = ledger().await?;
    let id = l.create("2024-01-15", "expense").await?;

    let res = l
        .app
        .delete(&format!("/api/v1/accounts/{}", l.account), &l.token)
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = l
        .app
        .get(&format!("/api/v1/transactions/{}", id), &l.token)
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(l.list("").await?.is_empty());
    Ok(())
}
