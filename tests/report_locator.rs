//! Walking the report hierarchy against a mock App Store Connect API.

mod common;

use asc_analytics::{
    get_data, AnalyticsError, Granularity, ReportLocator, ReportName, ReportSpec,
};
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client, collection, gzip};

const APP_ID: &str = "123";

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn spec() -> ReportSpec {
    ReportSpec::new(APP_ID, ReportName::AppSessionsStandard, Granularity::Daily)
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Two requests (the second without the report), one report, instances on
/// two dates plus a malformed one, one segment per instance.
async fn mount_hierarchy(server: &MockServer) {
    mount_json(
        server,
        "/v1/apps/123/analyticsReportRequests",
        collection(
            json!([
                {"id": "req-1", "type": "analyticsReportRequests"},
                {"id": "req-2", "type": "analyticsReportRequests"}
            ]),
            None,
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/v1/analyticsReportRequests/req-1/reports"))
        .and(query_param("filter[name]", "App Sessions Standard"))
        .and(query_param("filter[category]", "APP_USAGE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(
            json!([{
                "id": "rep-1",
                "type": "analyticsReports",
                "attributes": {"name": "App Sessions Standard", "category": "APP_USAGE"}
            }]),
            None,
        )))
        .mount(server)
        .await;

    mount_json(
        server,
        "/v1/analyticsReportRequests/req-2/reports",
        collection(json!([]), None),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/v1/analyticsReports/rep-1/instances"))
        .and(query_param("filter[granularity]", "DAILY"))
        .and(query_param_is_missing("filter[processingDate]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(
            json!([
                {"id": "inst-27", "attributes": {"processingDate": "2025-07-27"}},
                {"id": "inst-26", "attributes": {"processingDate": "2025-07-26"}},
                {"id": "inst-bad", "attributes": {"processingDate": "yesterday"}}
            ]),
            None,
        )))
        .mount(server)
        .await;

    for day in ["26", "27"] {
        Mock::given(method("GET"))
            .and(path("/v1/analyticsReports/rep-1/instances"))
            .and(query_param("filter[processingDate]", format!("2025-07-{day}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                json!([{"id": format!("inst-{day}")}]),
                None,
            )))
            .mount(server)
            .await;

        mount_json(
            server,
            &format!("/v1/analyticsReportInstances/inst-{day}/segments"),
            collection(
                json!([{
                    "id": format!("seg-{day}"),
                    "attributes": {
                        "url": format!("{}/files/2025-07-{day}/part-0.gz", server.uri()),
                        "checksum": "abc"
                    }
                }]),
                None,
            ),
        )
        .await;
    }
}

#[tokio::test]
async fn test_resolve_segment_urls() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;

    let client = client(&mock_server);
    let urls = ReportLocator::new(&client)
        .resolve_segment_urls(&spec())
        .await
        .unwrap();

    let base = mock_server.uri();
    assert_eq!(
        urls,
        [
            format!("{base}/files/2025-07-26/part-0.gz"),
            format!("{base}/files/2025-07-27/part-0.gz"),
        ]
    );
}

#[tokio::test]
async fn test_resolve_segments_carry_their_origin() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;

    let client = client(&mock_server);
    let segments = ReportLocator::new(&client)
        .resolve_segments(&spec())
        .await
        .unwrap();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].processing_date, Some(date("2025-07-26")));
    assert_eq!(segments[0].report_id, "rep-1");
    assert_eq!(segments[0].instance_id, "inst-26");
    assert_eq!(segments[1].processing_date, Some(date("2025-07-27")));
}

#[tokio::test]
async fn test_list_available_dates_skips_malformed() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;

    let client = client(&mock_server);
    let dates = ReportLocator::new(&client)
        .list_available_dates(&spec())
        .await
        .unwrap();

    assert_eq!(dates, [date("2025-07-26"), date("2025-07-27")]);
}

#[tokio::test]
async fn test_explicit_dates_skip_the_date_listing() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;

    let client = client(&mock_server);
    let spec = spec().with_dates([date("2025-07-27")]);
    let segments = ReportLocator::new(&client)
        .resolve_segments(&spec)
        .await
        .unwrap();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].instance_id, "inst-27");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| {
        r.url.path() != "/v1/analyticsReports/rep-1/instances"
            || r.url.query().is_some_and(|q| q.contains("processingDate"))
    }));
}

#[tokio::test]
async fn test_date_without_instances_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/analyticsReports/rep-1/instances"))
        .and(query_param("filter[processingDate]", "2025-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(json!([]), None)))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let spec = spec().with_dates([date("2025-01-01")]);
    let err = ReportLocator::new(&client)
        .resolve_segments(&spec)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyticsError::NoInstancesFound { .. }));
    assert!(err.is_empty_result());
}

#[tokio::test]
async fn test_app_without_requests() {
    let mock_server = MockServer::start().await;
    mount_json(
        &mock_server,
        "/v1/apps/123/analyticsReportRequests",
        collection(json!([]), None),
    )
    .await;

    let client = client(&mock_server);
    let err = ReportLocator::new(&client)
        .resolve_segment_urls(&spec())
        .await
        .unwrap_err();

    match err {
        AnalyticsError::NoReportRequests { app_id } => assert_eq!(app_id, APP_ID),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_report_missing_from_every_request() {
    let mock_server = MockServer::start().await;
    mount_json(
        &mock_server,
        "/v1/apps/123/analyticsReportRequests",
        collection(json!([{"id": "req-2"}]), None),
    )
    .await;
    mount_json(
        &mock_server,
        "/v1/analyticsReportRequests/req-2/reports",
        collection(json!([]), None),
    )
    .await;

    let client = client(&mock_server);
    let err = ReportLocator::new(&client)
        .report_ids(&spec())
        .await
        .unwrap_err();

    match err {
        AnalyticsError::NoReportsFound { app_id, name } => {
            assert_eq!(app_id, APP_ID);
            assert_eq!(name, "App Sessions Standard");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_list_reports_collects_attributes() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;

    let client = client(&mock_server);
    let reports = ReportLocator::new(&client).list_reports(APP_ID).await.unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["name"], "App Sessions Standard");
}

#[tokio::test]
async fn test_get_data_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/files/2025-07-26/part-0.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(
            "Date\tApp Name\tCounts\n2025-07-26\tDemo\t5\n",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Re-delivers 2025-07-26 with a corrected count
    Mock::given(method("GET"))
        .and(path("/files/2025-07-27/part-0.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(
            "Date\tApp Name\tCounts\n2025-07-26\tDemo\t6\n2025-07-27\tDemo\t7\n",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let dataset = get_data(&client, &spec()).await.unwrap();

    assert_eq!(dataset.columns(), ["date", "app_name", "counts"]);
    let rows: Vec<_> = dataset
        .rows()
        .iter()
        .map(|row| (row["date"].clone(), row["counts"].clone()))
        .collect();
    assert_eq!(
        rows,
        [
            (json!("2025-07-26"), json!(6)),
            (json!("2025-07-27"), json!(7)),
        ]
    );
}

async fn mount_empty_segments(server: &MockServer, instance_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/analyticsReportInstances/{instance_id}/segments")))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(json!([]), None)))
        .with_priority(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_instance_without_segments_is_skipped() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;
    mount_empty_segments(&mock_server, "inst-26").await;

    let client = client(&mock_server);
    let urls = ReportLocator::new(&client)
        .resolve_segment_urls(&spec())
        .await
        .unwrap();

    assert_eq!(urls, [format!("{}/files/2025-07-27/part-0.gz", mock_server.uri())]);
}

#[tokio::test]
async fn test_date_without_instances_is_skipped() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/analyticsReports/rep-1/instances"))
        .and(query_param("filter[processingDate]", "2025-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(json!([]), None)))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let spec = spec().with_dates([date("2025-01-01"), date("2025-07-27")]);
    let segments = ReportLocator::new(&client)
        .resolve_segments(&spec)
        .await
        .unwrap();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].processing_date, Some(date("2025-07-27")));
}

#[tokio::test]
async fn test_no_segments_anywhere_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_hierarchy(&mock_server).await;
    mount_empty_segments(&mock_server, "inst-26").await;

    let client = client(&mock_server);
    let spec = spec().with_dates([date("2025-07-26")]);
    let err = ReportLocator::new(&client)
        .resolve_segment_urls(&spec)
        .await
        .unwrap_err();

    match err {
        AnalyticsError::NoSegmentsFound { ref name } => {
            assert_eq!(name, "App Sessions Standard");
            assert!(err.is_empty_result());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
