use httpmock::prelude::*;
use serde_json::json;
use veye::prediction::Tier;
use veye::supabase::SupabaseClient;

fn prediction_json(id: i64, tier: &str, score: f64) -> serde_json::Value {
    json!({
        "id": id,
        "platform": "tiktok",
        "author": "someone",
        "title": format!("clip {id}"),
        "clip_url": "https://example.com/clip",
        "ai_score": score,
        "platform_score": score,
        "final_score": score,
        "tier": tier,
        "cross_platform": false,
        "scored_at": "2025-06-01T12:00:00Z"
    })
}

#[test]
fn snapshot_sends_postgrest_query_and_headers() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/predictions")
            .query_param("select", "*")
            .query_param("order", "final_score.desc,scored_at.desc")
            .query_param("limit", "100")
            .header("apikey", "anon-key")
            .header("authorization", "Bearer anon-key");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([prediction_json(1, "VIRAL", 88.0)]));
    });

    let client = SupabaseClient::new(&server.base_url(), "anon-key").unwrap();
    let rows = client.fetch_snapshot().unwrap();
    mock.assert();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].tier, Tier::Viral);
}

#[test]
fn malformed_rows_are_skipped_not_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/predictions");
        then.status(200).json_body(json!([
            prediction_json(1, "CRITICAL", 95.0),
            {"garbage": true},
            prediction_json(2, "SOMETHING_NEW", 10.0),
        ]));
    });

    let client = SupabaseClient::new(&server.base_url(), "anon-key").unwrap();
    let rows = client.fetch_snapshot().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].tier, Tier::Critical);
    // Unknown tier degrades instead of dropping the row.
    assert_eq!(rows[1].tier, Tier::Noise);
}

#[test]
fn http_error_status_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/predictions");
        then.status(500);
    });

    let client = SupabaseClient::new(&server.base_url(), "anon-key").unwrap();
    assert!(client.fetch_snapshot().is_err());
}

#[test]
fn partial_rows_decode_with_defaults() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/predictions");
        then.status(200).json_body(json!([{"id": 7}]));
    });

    let client = SupabaseClient::new(&server.base_url(), "anon-key").unwrap();
    let rows = client.fetch_snapshot().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tier, Tier::Noise);
    assert_eq!(rows[0].final_score, 0.0);
    assert!(rows[0].title.is_none());
}
