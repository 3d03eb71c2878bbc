//! Downloading segments and merging them into a dataset.

mod common;

use asc_analytics::{DatasetAssembler, Segment, SegmentDownloader, SegmentFailure};
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client, gzip};

async fn mount_segment(server: &MockServer, route: &str, tsv: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(tsv)))
        .mount(server)
        .await;
}

fn counts_tsv(start: u32, days: std::ops::RangeInclusive<u32>) -> String {
    let mut tsv = String::from("Date\tEvent\tCounts\n");
    for (offset, day) in days.enumerate() {
        tsv.push_str(&format!("2025-07-{day:02}\tInstall\t{}\n", start + offset as u32));
    }
    tsv
}

#[tokio::test]
async fn test_download_parses_rows() {
    let mock_server = MockServer::start().await;
    mount_segment(
        &mock_server,
        "/files/a.gz",
        "Date\tApp Apple Identifier\tPage-Type\n2025-07-26\t123\tProduct\n\n2025-07-27\t123\n",
    )
    .await;

    let client = client(&mock_server);
    let rows = SegmentDownloader::new(&client)
        .download(&format!("{}/files/a.gz", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    let columns: Vec<_> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(columns, ["date", "app_apple_identifier", "page_type"]);
    assert_eq!(rows[1]["page_type"], "");
}

#[tokio::test]
async fn test_download_does_not_send_credentials() {
    let mock_server = MockServer::start().await;
    mount_segment(&mock_server, "/files/a.gz", "Date\n2025-07-26\n").await;

    let client = client(&mock_server);
    SegmentDownloader::new(&client)
        .download(&format!("{}/files/a.gz", mock_server.uri()))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_missing_segment_is_skipped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/gone.gz"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let downloader = SegmentDownloader::new(&client);
    let url = format!("{}/files/gone.gz", mock_server.uri());

    assert!(downloader.download(&url).await.is_none());
    let failure = downloader.try_download(&url).await.unwrap_err();
    assert!(matches!(failure, SegmentFailure::Http(ref e) if e.status_code() == Some(404)));
}

#[tokio::test]
async fn test_non_gzip_segment_is_skipped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/plain.tsv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Date\n2025-07-26\n"))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let downloader = SegmentDownloader::new(&client);
    let url = format!("{}/files/plain.tsv", mock_server.uri());

    assert!(downloader.download(&url).await.is_none());
    assert!(matches!(
        downloader.try_download(&url).await,
        Err(SegmentFailure::Archive(_))
    ));
}

#[tokio::test]
async fn test_later_segment_replaces_overlapping_dates() {
    let mock_server = MockServer::start().await;
    // Days 1..=10 then a re-delivery covering 1..=20 with different counts
    mount_segment(&mock_server, "/files/2025-07-10.gz", &counts_tsv(100, 1..=10)).await;
    mount_segment(&mock_server, "/files/2025-07-20.gz", &counts_tsv(500, 1..=20)).await;

    let client = client(&mock_server);
    let base = mock_server.uri();
    let urls = vec![
        format!("{base}/files/2025-07-20.gz"),
        format!("{base}/files/2025-07-10.gz"),
    ];
    let dataset = DatasetAssembler::new(&client).assemble(&urls).await;

    assert_eq!(dataset.len(), 20);
    assert_eq!(dataset.rows()[0]["date"], "2025-07-01");
    assert_eq!(dataset.rows()[0]["counts"], json!(500));
    assert_eq!(dataset.rows()[19]["date"], "2025-07-20");
    assert_eq!(dataset.rows()[19]["counts"], json!(519));
}

#[tokio::test]
async fn test_assembly_is_idempotent_over_repeated_urls() {
    let mock_server = MockServer::start().await;
    mount_segment(&mock_server, "/files/a.gz", &counts_tsv(1, 1..=3)).await;
    mount_segment(&mock_server, "/files/b.gz", &counts_tsv(7, 3..=5)).await;

    let client = client(&mock_server);
    let assembler = DatasetAssembler::new(&client);
    let base = mock_server.uri();
    let a = format!("{base}/files/a.gz");
    let b = format!("{base}/files/b.gz");

    let once = assembler.assemble(&[a.clone(), b.clone()]).await;
    let repeated = assembler.assemble(&[b.clone(), a.clone(), b, a]).await;

    assert_eq!(once, repeated);
    assert_eq!(once.len(), 5);
    assert_eq!(
        once.distinct_values("counts"),
        [&json!(1), &json!(2), &json!(7), &json!(8), &json!(9)]
    );
}

#[tokio::test]
async fn test_duplicate_rows_are_removed() {
    let mock_server = MockServer::start().await;
    mount_segment(
        &mock_server,
        "/files/dup.gz",
        "Date\tTerritory\tCounts\n2025-07-26\tUS\t3\n2025-07-26\tUS\t3\n2025-07-26\tFR\t\n",
    )
    .await;

    let client = client(&mock_server);
    let url = format!("{}/files/dup.gz", mock_server.uri());
    let dataset = DatasetAssembler::new(&client).assemble(&[url]).await;

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.rows()[0]["counts"], json!(3));
    assert!(dataset.rows()[1]["counts"].is_null());
}

#[tokio::test]
async fn test_failed_segments_do_not_abort_assembly() {
    let mock_server = MockServer::start().await;
    mount_segment(&mock_server, "/files/ok.gz", &counts_tsv(1, 1..=2)).await;
    Mock::given(method("GET"))
        .and(path("/files/broken.gz"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let base = mock_server.uri();
    let urls = vec![format!("{base}/files/broken.gz"), format!("{base}/files/ok.gz")];
    let dataset = DatasetAssembler::new(&client).assemble(&urls).await;

    assert_eq!(dataset.len(), 2);
}

#[tokio::test]
async fn test_no_segments_yield_empty_dataset() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server);
    let dataset = DatasetAssembler::new(&client).assemble(&[]).await;
    assert!(dataset.is_empty());
    assert!(dataset.columns().is_empty());
}

#[tokio::test]
async fn test_segment_listed_under_two_dates_is_fetched_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/shared.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(&counts_tsv(1, 1..=2))))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_segment(&mock_server, "/files/other.gz", &counts_tsv(9, 3..=3)).await;

    let base = mock_server.uri();
    let segment = |day: u32, file: &str| Segment {
        processing_date: NaiveDate::from_ymd_opt(2025, 7, day),
        url: format!("{base}/files/{file}"),
        report_id: "rep-1".to_string(),
        instance_id: format!("inst-{day}"),
    };
    // The shared file sorts first and last, with another segment between
    let segments = vec![
        segment(26, "shared.gz"),
        segment(27, "other.gz"),
        segment(28, "shared.gz"),
    ];

    let client = client(&mock_server);
    let dataset = DatasetAssembler::new(&client)
        .assemble_segments(&segments)
        .await;

    assert_eq!(dataset.len(), 3);
}
