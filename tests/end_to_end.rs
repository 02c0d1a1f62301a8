use chrono::NaiveDate;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use refugee_flows::cache::ResolutionCache;
use refugee_flows::candidates::CandidateGenerator;
use refugee_flows::config::HttpConfig;
use refugee_flows::driver::{run_range, DateRange};
use refugee_flows::fetcher::HttpFetcher;
use refugee_flows::models::Language;
use refugee_flows::resolver::{DocumentLayout, Resolver};
use refugee_flows::retry::RetryPolicy;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn publisher() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/prosfygiko/21.03.2016.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"greek report".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/prosfygiko/REFUGEE_FLOWS-22-03-2016.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"english report".to_vec()))
        .mount(&server)
        .await;
    // Everything else falls through to wiremock's 404
    server
}

fn build_resolver(
    server: &MockServer,
    workspace: &TempDir,
) -> Resolver<HttpFetcher, CandidateGenerator> {
    Resolver::new(
        HttpFetcher::new(&HttpConfig::default()).unwrap(),
        CandidateGenerator::new(format!("{}/images/prosfygiko/", server.uri())),
        ResolutionCache::open(workspace.path().join("metadata")),
        DocumentLayout::new(workspace.path().join("output")),
        RetryPolicy::immediate(),
    )
}

#[tokio::test]
async fn test_three_day_range_against_stub_publisher() {
    let server = publisher().await;
    let workspace = TempDir::new().unwrap();
    let documents = workspace.path().join("output").join("documents").join("2016").join("03");

    let mut resolver = build_resolver(&server, &workspace);
    let range = DateRange::new(date(2016, 3, 21), date(2016, 3, 23)).unwrap();
    let summary = run_range(&mut resolver, range).await;

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.from_cache, 0);
    assert_eq!(summary.unresolved, vec![date(2016, 3, 23)]);

    assert_eq!(
        std::fs::read(documents.join("greek").join("21.03.2016.pdf")).unwrap(),
        b"greek report"
    );
    assert_eq!(
        std::fs::read(documents.join("english").join("REFUGEE_FLOWS-22-03-2016.pdf")).unwrap(),
        b"english report"
    );
    let english_files = std::fs::read_dir(documents.join("english")).unwrap().count();
    let greek_files = std::fs::read_dir(documents.join("greek")).unwrap().count();
    assert_eq!(english_files + greek_files, 2);

    resolver.cache().flush().unwrap();

    let persisted = ResolutionCache::load(workspace.path().join("metadata")).unwrap();
    assert_eq!(persisted.len(), 2);
    let day1 = persisted.lookup(date(2016, 3, 21)).unwrap();
    assert_eq!(day1.language, Language::Greek);
    assert_eq!(day1.filename, "21.03.2016.pdf");
    let day2 = persisted.lookup(date(2016, 3, 22)).unwrap();
    assert_eq!(day2.language, Language::English);
    assert_eq!(day2.filename, "REFUGEE_FLOWS-22-03-2016.pdf");
    assert!(persisted.lookup(date(2016, 3, 23)).is_none());
}

#[tokio::test]
async fn test_second_run_uses_cached_filenames() {
    let server = publisher().await;
    let workspace = TempDir::new().unwrap();
    let range = DateRange::new(date(2016, 3, 21), date(2016, 3, 22)).unwrap();

    let mut first = build_resolver(&server, &workspace);
    run_range(&mut first, range).await;
    first.cache().flush().unwrap();

    let requests_before = server.received_requests().await.unwrap().len();

    let mut second = build_resolver(&server, &workspace);
    let summary = run_range(&mut second, range).await;

    assert_eq!(summary.from_cache, 2);
    assert_eq!(summary.attempts, 2);
    let requests_after = server.received_requests().await.unwrap().len();
    assert_eq!(requests_after - requests_before, 2);
}
