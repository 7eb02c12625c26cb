use httpmock::prelude::*;
use reqpin::adapters::analytics::{ranking_query, AnalyticsProvider};
use reqpin::adapters::names_file::NamesFileProvider;
use reqpin::{
    BrokenModules, FetchPipeline, Generator, OnContractViolation, PinError, PipelineOptions,
    RegistryClient,
};
use std::collections::HashSet;
use std::time::Duration;
use tempfile::TempDir;

fn mock_found<'a>(server: &'a MockServer, name: &str, version: &str) -> httpmock::Mock<'a> {
    let path = format!("/pypi/{}/json", name);
    let version = version.to_string();
    server.mock(move |when, then| {
        when.method(GET).path(path);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "info": {"name": "ignored", "version": version},
                "urls": [{"filename": "pkg.tar.gz", "packagetype": "sdist"}]
            }));
    })
}

fn mock_scenario_registry(server: &MockServer) {
    mock_found(server, "alpha", "1.0");
    server.mock(|when, then| {
        when.method(GET).path("/pypi/beta/json");
        then.status(404);
    });
    mock_found(server, "gamma", "3.2");
    server.mock(|when, then| {
        when.method(GET).path("/pypi/delta/json");
        then.status(200)
            .json_body(serde_json::json!({"info": {"version": "0.0.0"}, "urls": []}));
    });
}

fn scenario_broken() -> BrokenModules {
    [("gamma".to_string(), "flaky build".to_string())]
        .into_iter()
        .collect()
}

fn line_set(content: &str) -> HashSet<String> {
    content.lines().map(str::to_string).collect()
}

fn expected(lines: &[&str]) -> HashSet<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

fn registry(server: &MockServer) -> RegistryClient {
    RegistryClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_concrete_scenario_from_names_file() {
    let server = MockServer::start();
    mock_scenario_registry(&server);

    let temp_dir = TempDir::new().unwrap();
    let names_path = temp_dir.path().join("names.txt");
    std::fs::write(&names_path, "alpha\nbeta\ngamma\ndelta\n").unwrap();
    let output = temp_dir.path().join("requirements.txt");

    let pipeline = FetchPipeline::new(
        registry(&server),
        scenario_broken(),
        PipelineOptions::new(2, &output),
    );
    let generator = Generator::new(Box::new(NamesFileProvider::new(&names_path)), pipeline, 100);

    let summary = generator.run().await.unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.annotated, 1);
    assert_eq!(summary.workers, 2);

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.ends_with('\n'));
    assert_eq!(
        line_set(&content),
        expected(&["alpha<=1.0", "# gamma<=3.2 # flaky build"])
    );
}

#[tokio::test]
async fn test_end_to_end_with_analytics_source() {
    let analytics = MockServer::start();
    let ranking = analytics.mock(|when, then| {
        when.method(GET)
            .path("/")
            .query_param("user", "play")
            .query_param("query", ranking_query(4 + 1));
        then.status(200)
            .header("Content-Type", "text/plain; charset=UTF-8")
            .body(r#"[["alpha","beta","gamma","delta"]]"#);
    });

    let registry_server = MockServer::start();
    mock_scenario_registry(&registry_server);

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("requirements.txt");

    let broken = scenario_broken();
    let provider = AnalyticsProvider::new(reqwest::Client::new(), analytics.url("/"))
        .with_headroom(broken.len());
    let pipeline = FetchPipeline::new(
        registry(&registry_server),
        broken,
        PipelineOptions::new(3, &output),
    );

    let summary = Generator::new(Box::new(provider), pipeline, 4)
        .run()
        .await
        .unwrap();

    ranking.assert();
    assert_eq!(summary.total, 4);
    assert_eq!(
        line_set(&std::fs::read_to_string(&output).unwrap()),
        expected(&["alpha<=1.0", "# gamma<=3.2 # flaky build"])
    );
}

#[tokio::test]
async fn test_discovery_failure_starts_no_workers() {
    let analytics = MockServer::start();
    analytics.mock(|when, then| {
        when.method(GET).path("/");
        then.status(503);
    });

    let registry_server = MockServer::start();
    let lookups = registry_server.mock(|when, then| {
        when.method(GET);
        then.status(200);
    });

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("requirements.txt");

    let provider = AnalyticsProvider::new(reqwest::Client::new(), analytics.url("/"));
    let pipeline = FetchPipeline::new(
        registry(&registry_server),
        BrokenModules::default(),
        PipelineOptions::new(2, &output),
    );

    let err = Generator::new(Box::new(provider), pipeline, 10)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PinError::DiscoveryFailed { status: 503, .. }));
    lookups.assert_hits(0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_every_package_is_requested_exactly_once() {
    let server = MockServer::start();
    let names: Vec<String> = (0..37).map(|i| format!("pkg-{}", i)).collect();
    let mocks: Vec<_> = names
        .iter()
        .map(|name| mock_found(&server, name, "1.0"))
        .collect();

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("requirements.txt");
    let pipeline = FetchPipeline::new(
        registry(&server),
        BrokenModules::default(),
        PipelineOptions::new(5, &output),
    );

    let report = pipeline.run(names.clone()).await.unwrap();

    for mock in &mocks {
        mock.assert_hits(1);
    }
    assert_eq!(report.accepted(), 37);

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 37);
    let unique: HashSet<&str> = lines.iter().copied().collect();
    assert_eq!(unique.len(), 37, "no package may appear twice");
}

#[tokio::test]
async fn test_repeated_runs_produce_the_same_line_set() {
    let server = MockServer::start();
    mock_scenario_registry(&server);
    let names: Vec<String> = ["alpha", "beta", "gamma", "delta"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let temp_dir = TempDir::new().unwrap();
    let mut runs = Vec::new();
    for (i, workers) in [1usize, 2, 4].into_iter().enumerate() {
        let output = temp_dir.path().join(format!("requirements-{}.txt", i));
        let pipeline = FetchPipeline::new(
            registry(&server),
            scenario_broken(),
            PipelineOptions::new(workers, &output),
        );
        pipeline.run(names.clone()).await.unwrap();
        runs.push(line_set(&std::fs::read_to_string(&output).unwrap()));
    }

    assert!(runs.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_skip_policy_tolerates_malformed_documents() {
    let server = MockServer::start();
    mock_found(&server, "alpha", "1.0");
    server.mock(|when, then| {
        when.method(GET).path("/pypi/odd/json");
        then.status(200).json_body(serde_json::json!({"urls": [{}]}));
    });

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("requirements.txt");
    let pipeline = FetchPipeline::new(
        registry(&server),
        BrokenModules::default(),
        PipelineOptions::new(1, &output).with_on_violation(OnContractViolation::Skip),
    );

    let report = pipeline
        .run(vec!["odd".to_string(), "alpha".to_string()])
        .await
        .unwrap();

    assert_eq!(report.accepted(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "alpha<=1.0\n");
}

#[tokio::test]
async fn test_slow_package_is_skipped_after_timeout() {
    let server = MockServer::start();
    mock_found(&server, "alpha", "1.0");
    server.mock(|when, then| {
        when.method(GET).path("/pypi/slow/json");
        then.status(200)
            .delay(Duration::from_millis(800))
            .json_body(serde_json::json!({"info": {"version": "9.9"}, "urls": [{}]}));
    });

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("requirements.txt");
    let client = RegistryClient::new(&server.base_url(), Duration::from_millis(100)).unwrap();
    let pipeline = FetchPipeline::new(
        client,
        BrokenModules::default(),
        PipelineOptions::new(1, &output),
    );

    let report = pipeline
        .run(vec!["slow".to_string(), "alpha".to_string()])
        .await
        .unwrap();

    assert_eq!(report.skipped(), 1);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "alpha<=1.0\n");
}
