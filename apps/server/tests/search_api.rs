//! Search page, note detail and service endpoints, driven through the router.

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{assert_status, param, FakeBackend, TestApp};

fn search_fixture() -> serde_json::Value {
    json!({
        "response": {
            "numFound": 25,
            "start": 10,
            "docs": [
                {"id": "qp-1", "title_en_txt": "Budget 2021", "year_i": 2021},
                {"id": "qp-2", "title_en_txt": "Housing", "year_i": 2020}
            ]
        },
        "highlighting": {
            "qp-1": {"title_en_txt": ["<mark>Budget</mark> 2021"]}
        },
        "facet_counts": {
            "facet_fields": {
                "year_i": ["2019", 4, "2020", 9, "2021", 12],
                "owner_org_en_s": ["Finance Canada", 15, "Health Canada", 10]
            }
        }
    })
}

#[tokio::test]
async fn search_page_carries_results_facets_and_pagination() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(search_fixture()))?;

    let (status, body) = app
        .get_json("/en/qp/?search_text=budget&qp-search-year=2020%7C2021&page=2")
        .await?;
    assert_status(status, StatusCode::OK, "search page");

    assert_eq!(body["language"], "en");
    assert_eq!(body["search_text"], "budget");
    assert_eq!(body["total_hits"], 25);
    assert_eq!(body["pagination"], json!([1, 2, 3]));
    assert_eq!(body["current_page"], 2);
    assert_eq!(body["previous_page"], 1);
    assert_eq!(body["next_page"], 3);
    assert_eq!(body["last_page"], 3);
    assert_eq!(
        body["export_url"],
        "/en/qp/export/?search_text=budget&qp-search-year=2020%7C2021&page=2"
    );

    assert_eq!(body["docs"][0]["title_en_txt"], "<mark>Budget</mark> 2021");
    assert_eq!(body["docs"][1]["title_en_txt"], "Housing");

    let facets = body["facets"].as_array().expect("facet list");
    assert_eq!(facets.len(), 6);

    let year = facets
        .iter()
        .find(|group| group["facet"] == "year")
        .expect("year facet");
    assert_eq!(year["param"], "qp-search-year");
    assert_eq!(year["selected_raw"], "2020|2021");
    assert_eq!(year["selected"], json!(["2020", "2021"]));
    assert_eq!(year["counts"][0], json!({"value": "2019", "count": 4}));
    assert_eq!(year["counts"][2], json!({"value": "2021", "count": 12}));

    let orgs = facets
        .iter()
        .find(|group| group["facet"] == "organization")
        .expect("organization facet");
    assert_eq!(orgs["counts"][0]["value"], "Finance Canada");

    let calls = app.backend.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(param(call, "q"), vec!["budget"]);
    assert_eq!(param(call, "defType"), vec!["edismax"]);
    assert_eq!(param(call, "start"), vec!["10"]);
    assert_eq!(param(call, "rows"), vec!["10"]);
    assert_eq!(param(call, "sort"), vec!["score desc"]);
    assert_eq!(param(call, "hl"), vec!["on"]);
    assert_eq!(param(call, "facet.field").len(), 6);

    let filters = param(call, "fq");
    assert_eq!(filters.len(), 1);
    assert!(
        filters[0].ends_with(r#"year_i:("2020" OR "2021")"#),
        "unexpected filter: {}",
        filters[0]
    );

    Ok(())
}

#[tokio::test]
async fn empty_search_matches_everything_without_text_extras() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(search_fixture()))?;

    let (status, body) = app.get_json("/fr/qp").await?;
    assert_status(status, StatusCode::OK, "match-all search");
    assert_eq!(body["language"], "fr");
    assert_eq!(body["current_page"], 1);

    let call = &app.backend.calls()[0];
    assert_eq!(param(call, "q"), vec!["*"]);
    assert!(param(call, "hl").is_empty());
    assert!(param(call, "mm").is_empty());
    assert!(param(call, "bq").is_empty());
    assert!(param(call, "fq").is_empty());
    assert_eq!(param(call, "start"), vec!["0"]);

    Ok(())
}

#[tokio::test]
async fn bare_star_search_is_match_all() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(search_fixture()))?;

    let (status, _) = app.get_json("/en/qp/?search_text=*").await?;
    assert_status(status, StatusCode::OK, "star search");

    let call = &app.backend.calls()[0];
    assert_eq!(param(call, "q"), vec!["*"]);
    assert!(param(call, "hl").is_empty());
    assert!(param(call, "bq").is_empty());

    Ok(())
}

#[tokio::test]
async fn page_past_the_end_shows_the_last_page() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(search_fixture()))?;

    let (status, body) = app.get_json("/en/qp/?search_text=budget&page=99").await?;
    assert_status(status, StatusCode::OK, "out-of-range page");
    assert_eq!(body["current_page"], 3);
    assert_eq!(body["last_page"], 3);
    assert_eq!(body["next_page"], 3);
    assert_eq!(body["docs"].as_array().map(Vec::len), Some(2));

    let calls = app.backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(param(&calls[0], "start"), vec!["980"]);
    assert_eq!(param(&calls[1], "start"), vec!["20"]);

    Ok(())
}

#[tokio::test]
async fn page_within_range_is_queried_once() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(search_fixture()))?;

    let (_, body) = app.get_json("/en/qp/?search_text=budget&page=3").await?;
    assert_eq!(body["current_page"], 3);
    assert_eq!(app.backend.call_count(), 1);

    Ok(())
}

#[tokio::test]
async fn year_facet_can_list_newest_first() -> anyhow::Result<()> {
    let app = TestApp::new_with_config(FakeBackend::returning(search_fixture()), |config| {
        config.search.year_facet_descending = true;
    })?;

    let (_, body) = app.get_json("/en/qp/").await?;
    let facets = body["facets"].as_array().expect("facet list");
    let year = facets
        .iter()
        .find(|group| group["facet"] == "year")
        .expect("year facet");
    assert_eq!(year["counts"][0], json!({"value": "2021", "count": 12}));
    assert_eq!(year["counts"][2], json!({"value": "2019", "count": 4}));

    let orgs = facets
        .iter()
        .find(|group| group["facet"] == "organization")
        .expect("organization facet");
    assert_eq!(orgs["counts"][0]["value"], "Finance Canada");

    Ok(())
}

#[tokio::test]
async fn sort_outside_the_language_allow_list_falls_back_to_relevance() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(search_fixture()))?;

    let (status, body) = app.get_json("/en/qp/?sort=title_fr_s+asc").await?;
    assert_status(status, StatusCode::OK, "search with foreign sort");
    assert_eq!(body["sort"], "score desc");

    let (_, body) = app.get_json("/en/qp/?sort=title_en_s+asc").await?;
    assert_eq!(body["sort"], "title_en_s asc");

    let calls = app.backend.calls();
    assert_eq!(param(&calls[0], "sort"), vec!["score desc"]);
    assert_eq!(param(&calls[1], "sort"), vec!["title_en_s asc"]);

    Ok(())
}

#[tokio::test]
async fn unsupported_language_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(search_fixture()))?;

    let (status, body) = app.get_json("/de/qp/").await?;
    assert_status(status, StatusCode::NOT_FOUND, "unknown language");
    assert_eq!(body["error"]["status"], 404);
    assert_eq!(app.backend.call_count(), 0);

    let (status, _, _) = app.get("/en/nothing-here").await?;
    assert_status(status, StatusCode::NOT_FOUND, "unknown route");

    Ok(())
}

#[tokio::test]
async fn engine_failure_is_bad_gateway() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::failing(500))?;

    let (status, body) = app.get_json("/en/qp/?search_text=tax").await?;
    assert_status(status, StatusCode::BAD_GATEWAY, "engine failure");
    assert_eq!(body["error"]["status"], 502);
    assert_eq!(body["error"]["message"], "Search service unavailable");

    Ok(())
}

#[tokio::test]
async fn detail_returns_the_note_and_a_back_link() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(json!({
        "response": {
            "numFound": 1,
            "docs": [{"id": "qp-123", "title_en_txt": "Budget 2021"}]
        }
    })))?;

    let referer = "https://example.org/en/qp/?search_text=budget";
    let (status, _, body) = app
        .get_with_headers("/en/qp/id/qp-123", &[("referer", referer)])
        .await?;
    assert_status(status, StatusCode::OK, "note detail");

    let body: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(body["reference_number"], "qp-123");
    assert_eq!(body["document"]["title_en_txt"], "Budget 2021");
    assert_eq!(body["back_url"], referer);

    let call = &app.backend.calls()[0];
    assert_eq!(param(call, "q"), vec![r#"id:"qp-123""#]);
    assert_eq!(param(call, "rows"), vec!["1"]);
    assert!(param(call, "facet").is_empty());
    assert!(param(call, "hl").is_empty());

    let (_, body) = app.get_json("/en/qp/id/qp-123").await?;
    assert_eq!(body["back_url"], "/en/qp/");

    Ok(())
}

#[tokio::test]
async fn detail_of_unknown_note_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(json!({
        "response": {"numFound": 0, "docs": []}
    })))?;

    let (status, body) = app.get_json("/fr/qp/id/qp-missing").await?;
    assert_status(status, StatusCode::NOT_FOUND, "missing note");
    assert_eq!(body["error"]["status"], 404);

    Ok(())
}

#[tokio::test]
async fn health_and_metrics_endpoints_respond() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(search_fixture()))?;

    let (status, body) = app.get_json("/health").await?;
    assert_status(status, StatusCode::OK, "health");
    assert_eq!(body["status"], "ok");

    let (status, headers, body) = app.get("/metrics").await?;
    assert_status(status, StatusCode::OK, "metrics");
    assert!(headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/plain")));
    let text = String::from_utf8(body.to_vec())?;
    assert!(text.contains("qp_http_requests_total"), "metrics body: {text}");

    Ok(())
}

#[tokio::test]
async fn responses_carry_request_id_and_baseline_headers() -> anyhow::Result<()> {
    let app = TestApp::new(FakeBackend::returning(search_fixture()))?;

    let (_, headers, _) = app
        .get_with_headers("/health", &[("x-request-id", "client-abc")])
        .await?;

    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-request-id header");
    assert!(!request_id.is_empty());
    assert_ne!(request_id, "client-abc");
    assert_eq!(
        headers.get("x-correlation-id").and_then(|v| v.to_str().ok()),
        Some("client-abc")
    );
    assert_eq!(
        headers
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );

    Ok(())
}
