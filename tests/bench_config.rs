use std::{fs, path::PathBuf};

use benchfire::{default_bench_spec, Bench, Benchmark, ConfigError, ResolutionMode};
use tempfile::{tempdir, TempDir};

const FIRST: &str = r#"
benchmarks:
  defaults:
    concurrency: 4
    requests: 400
  services:
    default/web:
      concurrency: 2
      requests: 20
      http:
        host: web.default
        path: /status
        headers:
          X-Trace: [one, two, three]
      serviceResolution:
        mode: ClusterIP
    default/api:
      requests: 5
  containers:
    default/web-0:nginx:
      concurrency: 1
      requests: 1
"#;

const SECOND: &str = r#"
benchmarks:
  services:
    kube-system/dns:
      concurrency: 8
      requests: 80
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn new_reads_file() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "bench.yaml", FIRST);

    let bench = Bench::new(&path).unwrap();
    let b = &bench.benchmarks;

    assert_eq!(b.defaults, Benchmark { concurrency: 4, requests: 400 });
    assert_eq!(b.services.len(), 2);
    assert_eq!(b.containers.len(), 1);

    let web = b.service("default/web").unwrap();
    assert_eq!(web.http.host, "web.default");
    assert_eq!(web.http.headers.get_all("x-trace"), ["one", "two", "three"]);
    assert_eq!(
        web.service_resolution.resolution_mode().unwrap(),
        ResolutionMode::ClusterIp
    );

    let api = b.service("default/api").unwrap();
    assert_eq!(api.concurrency, 0);
    assert_eq!(api.requests, 5);
    assert_eq!(api.service_resolution.mode, "");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Bench::new(dir.path().join("nope.yaml")).unwrap_err();

    assert!(err.is_io());
    assert!(matches!(
        &err,
        ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
    ));
    assert!(err.to_string().contains("nope.yaml"));
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "bad.yaml", "not: [valid, yaml:");

    let err = Bench::new(&path).unwrap_err();
    assert!(err.is_parse());
    assert!(!err.is_io());
}

#[test]
fn shape_mismatch_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "bad.yaml", "benchmarks:\n  services: [a, b]\n");

    assert!(Bench::new(&path).unwrap_err().is_parse());
}

#[test]
fn empty_benchmarks_section() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "bench.yaml", "benchmarks: {}\n");

    let bench = Bench::new(&path).unwrap();
    assert_eq!(bench.benchmarks.defaults, Benchmark::initial());
    assert!(bench.benchmarks.services.is_empty());
    assert!(bench.benchmarks.containers.is_empty());
}

#[test]
fn reload_replaces_everything() {
    let dir = tempdir().unwrap();
    let first = write(&dir, "first.yaml", FIRST);
    let second = write(&dir, "second.yaml", SECOND);

    let mut bench = Bench::new(&first).unwrap();
    bench.reload(&second).unwrap();
    let b = &bench.benchmarks;

    assert_eq!(b.services.len(), 1);
    assert!(b.service("default/web").is_none());
    assert!(b.containers.is_empty());
    assert_eq!(b.service("kube-system/dns").unwrap().concurrency, 8);
    assert_eq!(b.defaults, Benchmark::initial());
}

#[test]
fn reload_same_path_picks_up_edits() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "bench.yaml", FIRST);

    let mut bench = Bench::new(&path).unwrap();
    fs::write(&path, SECOND).unwrap();
    bench.reload(&path).unwrap();

    assert!(bench.benchmarks.service("kube-system/dns").is_some());
}

#[test]
fn failed_reload_keeps_previous_config() {
    let dir = tempdir().unwrap();
    let good = write(&dir, "good.yaml", FIRST);
    let bad = write(&dir, "bad.yaml", "benchmarks:\n  defaults:\n    requests: many\n");

    let mut bench = Bench::new(&good).unwrap();
    let before = bench.clone();

    assert!(bench.reload(&bad).unwrap_err().is_parse());
    assert_eq!(bench, before);

    assert!(bench.reload(dir.path().join("gone.yaml")).unwrap_err().is_io());
    assert_eq!(bench, before);
}

#[test]
fn defaults_survive_failed_initial_load() {
    let dir = tempdir().unwrap();
    let mut bench = Bench::default();

    assert!(bench.reload(dir.path().join("missing.yaml")).is_err());
    assert_eq!(bench.benchmarks.defaults, Benchmark::initial());
    assert!(bench.benchmarks.services.is_empty());
}

#[test]
fn default_spec_is_stable() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "bench.yaml", FIRST);
    let _bench = Bench::new(&path).unwrap();

    let spec = default_bench_spec();
    assert_eq!(spec.benchmark(), Benchmark::initial());
    assert_eq!(spec.http.method, "GET");
    assert_eq!(spec.http.path, "/");
    assert_eq!(default_bench_spec(), spec);
}

#[test]
fn container_spec_prepares_request() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "bench.yaml", FIRST);
    let bench = Bench::new(&path).unwrap();

    let web = bench.benchmarks.service_spec("default/web");
    let client = web.client().unwrap();
    let request = web.request(&client).unwrap().build().unwrap();
    assert_eq!(request.url().as_str(), "http://web.default/status");
    assert_eq!(request.headers().get_all("x-trace").iter().count(), 3);

    let fallback = bench.benchmarks.container_spec("default/other:app");
    assert_eq!(fallback.name, "default/other:app");
    assert_eq!(fallback.benchmark(), Benchmark { concurrency: 4, requests: 400 });
}
