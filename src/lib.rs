//! Benchmark configuration for HTTP load tests against Kubernetes services
//! and containers.

pub mod config;
pub mod error;
pub mod headers;
pub mod http;

pub use config::{
    default_bench_spec, Auth, Bench, BenchConfig, Benchmark, Benchmarks, Http, ResolutionMode,
    ServiceResolution, BENCH_CONFIG_NAME, DEFAULT_CONCURRENCY, DEFAULT_METHOD, DEFAULT_PATH,
    DEFAULT_REQUESTS,
};
pub use error::ConfigError;
pub use headers::Headers;
