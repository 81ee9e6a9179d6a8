//! Integration tests for the discovery scan
//!
//! These tests use wiremock to stand in for the remote endpoint and run the
//! real HTTP fetcher, prober, extractor, and gzip sink against it.

use async_trait::async_trait;
use flate2::read::GzDecoder;
use giferator_disco::config::Config;
use giferator_disco::crawler::{
    run_scan, EndpointTemplate, HttpFetcher, Prober, Resolved, ScanOptions, Scanner, Sleeper,
    TransientCause,
};
use giferator_disco::output::OutputRecord;
use giferator_disco::range::ScanRange;
use giferator_disco::state::RetryPolicy;
use giferator_disco::{DiscoError, ScanMode};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GIF_PAGE: &str = r#"<meta itemprop="image" content="http://prod-mr-user.storage.googleapis.com/assets/x.gif?v=1" />"#;

/// Counts sleeps instead of waiting
#[derive(Clone, Default)]
struct CountingSleeper {
    sleeps: Arc<AtomicU32>,
}

impl CountingSleeper {
    fn count(&self) -> u32 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sleeper for CountingSleeper {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, max_retries: u32) -> Config {
    let mut config = Config::default();
    config.prober.endpoint = format!("{}/gif/{{id}}", base_url);
    config.prober.max_retries = max_retries;
    config.prober.backoff_ms = 1;
    config.prober.request_timeout_ms = 5_000;
    config
}

fn create_prober(
    config: &Config,
    sleeper: CountingSleeper,
) -> Prober<HttpFetcher, CountingSleeper> {
    Prober::with_sleeper(
        HttpFetcher::from_config(config).expect("Failed to build HTTP client"),
        sleeper,
        EndpointTemplate::parse(&config.prober.endpoint).expect("Invalid endpoint"),
        RetryPolicy::from_config(&config.prober),
    )
}

fn read_gzip_lines(path: &Path) -> String {
    let bytes = std::fs::read(path).expect("Failed to read output");
    let mut text = String::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_string(&mut text)
        .expect("Output is not valid gzip");
    text
}

fn lines(records: &[OutputRecord]) -> Vec<String> {
    records.iter().map(|r| r.to_string()).collect()
}

#[tokio::test]
async fn test_probe_found_sends_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gif/42"))
        .and(header("user-agent", "ArchiveTeam"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>live</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 3);
    let prober = create_prober(&config, CountingSleeper::default());

    match prober.probe(42).await.expect("Probe failed") {
        Resolved::Found(document) => {
            assert_eq!(document.id, 42);
            assert_eq!(document.body, "<html>live</html>");
            assert_eq!(document.url, format!("{}/gif/42", mock_server.uri()));
        }
        Resolved::NotFound => panic!("expected Found"),
    }
}

#[tokio::test]
async fn test_probe_not_found_is_terminal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gif/6"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 3);
    let sleeper = CountingSleeper::default();
    let prober = create_prober(&config, sleeper.clone());

    assert_eq!(prober.probe(6).await.unwrap(), Resolved::NotFound);
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_probe_recovers_after_transient_failures() {
    let mock_server = MockServer::start().await;

    // Three failures of different kinds, then success
    Mock::given(method("GET"))
        .and(path("/gif/9"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gif/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gif/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GIF_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 5);
    let sleeper = CountingSleeper::default();
    let prober = create_prober(&config, sleeper.clone());

    let resolved = prober.probe(9).await.expect("Probe should recover");

    assert!(matches!(resolved, Resolved::Found(_)));
    assert_eq!(sleeper.count(), 3);
    assert_eq!(prober.counters().attempts, 4);
    assert_eq!(prober.counters().transient_failures, 3);
}

#[tokio::test]
async fn test_probe_gives_up_without_extra_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gif/1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3) // max_retries + 1, then nothing more
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2);
    let sleeper = CountingSleeper::default();
    let prober = create_prober(&config, sleeper.clone());

    let err = prober.probe(1).await.unwrap_err();

    match err {
        DiscoError::GaveUp {
            id,
            attempts,
            cause,
        } => {
            assert_eq!(id, 1);
            assert_eq!(attempts, 3);
            assert_eq!(cause, TransientCause::UnexpectedStatus(500));
        }
        other => panic!("expected GaveUp, got {:?}", other),
    }
    assert_eq!(sleeper.count(), 2);
}

#[tokio::test]
async fn test_probe_connection_failure_is_transient() {
    // Reserve a free port, then release it so connections are refused
    let base_url = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        let port = listener.local_addr().expect("No local addr").port();
        format!("http://127.0.0.1:{}", port)
    };

    let config = create_test_config(&base_url, 1);
    let sleeper = CountingSleeper::default();
    let prober = create_prober(&config, sleeper.clone());

    let err = prober.probe(1).await.unwrap_err();

    match err {
        DiscoError::GaveUp {
            id,
            attempts,
            cause,
        } => {
            assert_eq!(id, 1);
            assert_eq!(attempts, 2);
            assert!(
                matches!(cause, TransientCause::Transport(_)),
                "expected transport cause, got {:?}",
                cause
            );
        }
        other => panic!("expected GaveUp, got {:?}", other),
    }
    assert_eq!(sleeper.count(), 1);
}

#[tokio::test]
async fn test_probe_request_timeout_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gif/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(GIF_PAGE)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 0);
    config.prober.request_timeout_ms = 100;
    let sleeper = CountingSleeper::default();
    let prober = create_prober(&config, sleeper.clone());

    let err = prober.probe(1).await.unwrap_err();

    assert!(
        matches!(
            err,
            DiscoError::GaveUp {
                attempts: 1,
                cause: TransientCause::Transport(_),
                ..
            }
        ),
        "expected transport give-up, got {:?}",
        err
    );
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_scan_found_missing_and_abandoned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gif/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GIF_PAGE))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gif/6"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gif/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1);
    let options = ScanOptions {
        mode: ScanMode::Full,
        emit_meta: false,
    };
    let scanner = Scanner::new(create_prober(&config, CountingSleeper::default()), options);
    let mut sink: Vec<OutputRecord> = Vec::new();

    let err = scanner
        .scan(ScanRange::new(5, 7).unwrap(), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DiscoError::GaveUp {
            id: 7,
            attempts: 2,
            cause: TransientCause::EmptyBody,
        }
    ));
    assert_eq!(lines(&sink), vec!["page:5", "gif:assets/x.gif"]);
}

#[tokio::test]
async fn test_run_scan_writes_gzip_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gif/10"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><head>{}<meta property="og:image" content="http://prod-mr-user.storage.googleapis.com/assets/x.jpg?v=1"></head></html>"#,
            GIF_PAGE
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gif/12"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no assets</html>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt.gz");
    let config = create_test_config(&mock_server.uri(), 1);

    let stats = run_scan(
        &config,
        ScanRange::new(10, 13).unwrap(),
        &output,
        Some("abc".to_string()),
    )
    .await
    .expect("Scan failed");

    assert_eq!(
        read_gzip_lines(&output),
        "page:10\nmeta:10\ngif:assets/x.gif\njpg:assets/x.jpg\npage:12\nmeta:12\n"
    );
    assert_eq!(stats.ids_probed, 4);
    assert_eq!(stats.found, 2);
    assert_eq!(stats.total_records(), 6);
    assert_eq!(stats.config_hash.as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let mock_server = MockServer::start().await;

    for id in [11, 14, 20] {
        Mock::given(method("GET"))
            .and(path(format!("/gif/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(GIF_PAGE))
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.txt.gz");
    let second = dir.path().join("second.txt.gz");
    let config = create_test_config(&mock_server.uri(), 1);
    let range = ScanRange::new(10, 20).unwrap();

    run_scan(&config, range, &first, None).await.unwrap();
    run_scan(&config, range, &second, None).await.unwrap();

    let first_bytes = std::fs::read(&first).unwrap();
    let second_bytes = std::fs::read(&second).unwrap();
    assert!(!first_bytes.is_empty());
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(read_gzip_lines(&first).lines().count(), 9);
}

#[tokio::test]
async fn test_run_scan_gave_up_leaves_readable_partial_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gif/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GIF_PAGE))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gif/2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gif/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GIF_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("partial.txt.gz");
    let mut config = create_test_config(&mock_server.uri(), 0);
    config.output.emit_meta = false;

    let err = run_scan(&config, ScanRange::new(1, 3).unwrap(), &output, None)
        .await
        .unwrap_err();

    assert!(err.is_gave_up());
    assert_eq!(read_gzip_lines(&output), "page:1\ngif:assets/x.gif\n");
}

#[tokio::test]
async fn test_existence_only_scan() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gif/123456"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GIF_PAGE))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("exists.txt.gz");
    let mut config = create_test_config(&mock_server.uri(), 0);
    config.output.mode = ScanMode::Existence;

    run_scan(
        &config,
        ScanRange::new(123455, 123457).unwrap(),
        &output,
        None,
    )
    .await
    .unwrap();

    assert_eq!(read_gzip_lines(&output), "gif:123456\n");
}
