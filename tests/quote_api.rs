//! End-to-end tests for the quoting API.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::http::StatusCode;
use serde_json::Value;
use tokio::sync::mpsc;

use freight_quoter::lifecycle::Shutdown;
use freight_quoter::tables::load_tables;

mod common;

/// Wire a fully loaded service on `port` and return its base URL.
async fn start_loaded(port: u16) -> (String, Shutdown) {
    let dir = common::fixture_dir(port);
    common::write_fixtures(&dir);
    let config = common::test_config(port, &dir);

    let tables = Arc::new(ArcSwapOption::empty());
    tables.store(Some(Arc::new(load_tables(&config.data).unwrap())));

    let shutdown = Shutdown::new();
    let (_updates_tx, updates) = mpsc::unbounded_channel();
    let addr = common::spawn_server(config, tables, updates, shutdown.subscribe()).await;

    (format!("http://{}", addr), shutdown)
}

#[tokio::test]
async fn test_single_quote_happy_path() {
    let (url, shutdown) = start_loaded(29101).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310-100"), ("weight", "3")])
        .send()
        .await
        .expect("Service unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    let quote: Value = res.json().await.unwrap();
    assert_eq!(quote["service"], "ecm");
    assert_eq!(quote["region"], "SP");
    assert_eq!(quote["locality"], "São Paulo");
    assert_eq!(quote["classification"], "Capital");
    assert_eq!(quote["lead_time_days"], 1);
    assert_eq!(quote["price"].as_f64(), Some(20.0));
    assert_eq!(quote["matched_break"]["kind"], "bracket");
    assert_eq!(quote["matched_break"]["weight"].as_f64(), Some(5.0));
    assert!(quote["id"].as_str().is_some());
    assert!(quote["expires_at"].as_u64().unwrap() > 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_quote_applies_declared_value_surcharge() {
    let (url, shutdown) = start_loaded(29102).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310100"), ("weight", "3"), ("value", "1000")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let quote: Value = res.json().await.unwrap();
    // 20.00 base + 1.3% of 1000.
    assert_eq!(quote["price"].as_f64(), Some(33.0));

    shutdown.trigger();
}

#[tokio::test]
async fn test_decimal_comma_weight_is_accepted() {
    let (url, shutdown) = start_loaded(29103).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310100"), ("weight", "3,5")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let quote: Value = res.json().await.unwrap();
    assert_eq!(quote["price"].as_f64(), Some(22.5));

    shutdown.trigger();
}

#[tokio::test]
async fn test_pinned_service_and_extrapolation() {
    let (url, shutdown) = start_loaded(29104).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310100"), ("weight", "3"), ("service", "exp")])
        .send()
        .await
        .unwrap();
    let quote: Value = res.json().await.unwrap();
    assert_eq!(quote["service"], "exp");
    assert_eq!(quote["price"].as_f64(), Some(40.0));

    // Above the 30 kg top break: 100.00 plus 5 kg at the 2.00 additional fee.
    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310100"), ("weight", "35")])
        .send()
        .await
        .unwrap();
    let quote: Value = res.json().await.unwrap();
    assert_eq!(quote["price"].as_f64(), Some(110.0));
    assert_eq!(quote["matched_break"]["kind"], "extrapolated");

    shutdown.trigger();
}

#[tokio::test]
async fn test_multi_service_quotes() {
    let (url, shutdown) = start_loaded(29105).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/quotes", url))
        .query(&[("cep", "01310-100"), ("weight", "3")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let set: Value = res.json().await.unwrap();
    assert_eq!(set["postal_code"], "01310100");

    let quotes = set["quotes"].as_array().unwrap();
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0]["service"], "ecm");
    assert_eq!(quotes[0]["quote"]["price"].as_f64(), Some(20.0));
    assert_eq!(quotes[1]["service"], "exp");
    assert_eq!(quotes[1]["quote"]["price"].as_f64(), Some(40.0));

    shutdown.trigger();
}

#[tokio::test]
async fn test_bad_inputs_return_400() {
    let (url, shutdown) = start_loaded(29106).await;
    let client = common::client();

    // Postal code too short.
    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "123"), ("weight", "3")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "invalid_postal_code");

    // Weight is not a number.
    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310100"), ("weight", "heavy")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "invalid_input");

    // Weight must be positive.
    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310100"), ("weight", "0")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "invalid_weight");

    shutdown.trigger();
}

#[tokio::test]
async fn test_lookup_misses_return_404() {
    let (url, shutdown) = start_loaded(29107).await;
    let client = common::client();

    // No range covers this code.
    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "99999-999"), ("weight", "3")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "postal_code_not_found");

    // Osasco resolves but no tariff row reaches it.
    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "06100-000"), ("weight", "3")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "tariff_not_found");

    shutdown.trigger();
}

#[tokio::test]
async fn test_service_starts_degraded_without_data() {
    let port = 29108;
    let dir = common::fixture_dir(port);
    let config = common::test_config(port, &dir);

    // No snapshot installed: quoting fails, the process still serves.
    let tables = Arc::new(ArcSwapOption::empty());
    let shutdown = Shutdown::new();
    let (_updates_tx, updates) = mpsc::unbounded_channel();
    let addr = common::spawn_server(config, tables, updates, shutdown.subscribe()).await;
    let url = format!("http://{}", addr);
    let client = common::client();

    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310100"), ("weight", "3")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "data_unavailable");

    let res = client.get(format!("{}/health", url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let health: Value = res.json().await.unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["data_loaded"], false);

    shutdown.trigger();
}

#[tokio::test]
async fn test_health_reports_loaded_tables() {
    let (url, shutdown) = start_loaded(29109).await;
    let client = common::client();

    let res = client.get(format!("{}/health", url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let health: Value = res.json().await.unwrap();
    assert_eq!(health["status"], "operational");
    assert_eq!(health["data_loaded"], true);
    assert_eq!(health["postal_ranges"], 4);
    assert_eq!(health["tariff_rows"], 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_quote_retrievable_by_id() {
    let (url, shutdown) = start_loaded(29110).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310100"), ("weight", "3")])
        .send()
        .await
        .unwrap();
    let quote: Value = res.json().await.unwrap();
    let id = quote["id"].as_str().unwrap();

    let res = client
        .get(format!("{}/api/quote/{}", url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let retrieved: Value = res.json().await.unwrap();
    assert_eq!(retrieved["id"], quote["id"]);
    assert_eq!(retrieved["price"], quote["price"]);

    // Unknown IDs are a plain 404.
    let res = client
        .get(format!(
            "{}/api/quote/00000000-0000-4000-8000-000000000000",
            url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_snapshot_reload_changes_prices() {
    let port = 29111;
    let dir = common::fixture_dir(port);
    common::write_fixtures(&dir);
    let config = common::test_config(port, &dir);

    let tables = Arc::new(ArcSwapOption::empty());
    tables.store(Some(Arc::new(load_tables(&config.data).unwrap())));

    let shutdown = Shutdown::new();
    let (updates_tx, updates) = mpsc::unbounded_channel();
    let addr =
        common::spawn_server(config.clone(), Arc::clone(&tables), updates, shutdown.subscribe())
            .await;
    let url = format!("http://{}", addr);
    let client = common::client();

    let res = client
        .get(format!("{}/api/quote", url))
        .query(&[("cep", "01310100"), ("weight", "3")])
        .send()
        .await
        .unwrap();
    let quote: Value = res.json().await.unwrap();
    assert_eq!(quote["price"].as_f64(), Some(20.0));

    // The sheet gets a price bump; a rebuilt snapshot goes live without a
    // restart.
    std::fs::write(
        dir.join("tariffs.csv"),
        "\
origem;destino;classificacao;servico;add;1,0;5,0
SP;SP;Capital;ecm;0;20,00;60,00
",
    )
    .unwrap();
    let reloaded = load_tables(&config.data).unwrap();
    updates_tx.send(Arc::new(reloaded)).unwrap();

    // The apply task installs the snapshot asynchronously.
    let mut price = None;
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let res = client
            .get(format!("{}/api/quote", url))
            .query(&[("cep", "01310100"), ("weight", "3")])
            .send()
            .await
            .unwrap();
        let quote: Value = res.json().await.unwrap();
        price = quote["price"].as_f64();
        if price == Some(40.0) {
            break;
        }
    }
    assert_eq!(price, Some(40.0), "new snapshot never went live");

    shutdown.trigger();
}
