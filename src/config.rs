use std::{collections::HashMap, fmt, path::Path, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{error::ConfigError, headers::Headers};

/// Base name of the benchmarks config file.
pub const BENCH_CONFIG_NAME: &str = "bench";

/// Default concurrency.
pub const DEFAULT_CONCURRENCY: i64 = 1;
/// Default number of requests.
pub const DEFAULT_REQUESTS: i64 = 200;
/// Default http verb.
pub const DEFAULT_METHOD: &str = "GET";
/// Default request path.
pub const DEFAULT_PATH: &str = "/";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Root of a benchmarks config file.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Bench {
    #[serde(default, deserialize_with = "null_as_default")]
    pub benchmarks: Benchmarks,
}

/// Set-level defaults plus per-service and per-container overrides.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Benchmarks {
    #[serde(default = "Benchmark::initial", deserialize_with = "partial_defaults")]
    pub defaults: Benchmark,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: HashMap<String, BenchConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub containers: HashMap<String, BenchConfig>,
}

impl Default for Benchmarks {
    fn default() -> Self {
        Self {
            defaults: Benchmark::initial(),
            services: HashMap::new(),
            containers: HashMap::new(),
        }
    }
}

/// A concurrency/request-count pair.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Benchmark {
    pub concurrency: i64,
    pub requests: i64,
}

impl Benchmark {
    /// The set-level defaults a fresh store starts with.
    pub fn initial() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            requests: DEFAULT_REQUESTS,
        }
    }

    /// True when neither field was set.
    pub fn is_empty(&self) -> bool {
        self.concurrency == 0 && self.requests == 0
    }
}

// `defaults` keys missing from the file keep the initial values; entries under
// services/containers do not get this treatment. An explicit null is zero.
fn partial_defaults<'de, D>(deserializer: D) -> Result<Benchmark, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Partial {
        concurrency: Option<i64>,
        requests: Option<i64>,
    }

    let Some(partial) = Option::<Partial>::deserialize(deserializer)? else {
        return Ok(Benchmark::default());
    };
    Ok(Benchmark {
        concurrency: partial.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
        requests: partial.requests.unwrap_or(DEFAULT_REQUESTS),
    })
}

/// Basic auth credentials.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Auth {
    pub user: String,
    pub password: String,
}

impl Auth {
    pub fn is_set(&self) -> bool {
        !self.user.is_empty()
    }

    /// Copy with the password masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            user: self.user.clone(),
            password: if self.password.is_empty() {
                String::new()
            } else {
                "****".to_string()
            },
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("user", &self.user)
            .field("password", &self.redacted().password)
            .finish()
    }
}

/// Shape of the request a benchmark sends.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Http {
    pub method: String,
    pub host: String,
    pub path: String,
    pub https: bool,
    pub http2: bool,
    pub body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: Headers,
}

/// How a Kubernetes service is turned into a reachable address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResolutionMode {
    /// Use `http.host` verbatim.
    #[default]
    ConfiguredHost,
    /// Use the service's cluster IP. Requires in-cluster or VPN access.
    ClusterIp,
    /// Use `status.loadBalancer.ingress`. Resolution fails for services
    /// without an ingress.
    LoadBalancerIngress,
}

impl ResolutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMode::ConfiguredHost => "ConfiguredHost",
            ResolutionMode::ClusterIp => "ClusterIP",
            ResolutionMode::LoadBalancerIngress => "LoadBalancerIngress",
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "ConfiguredHost" => Ok(ResolutionMode::ConfiguredHost),
            "ClusterIP" => Ok(ResolutionMode::ClusterIp),
            "LoadBalancerIngress" => Ok(ResolutionMode::LoadBalancerIngress),
            other => Err(ConfigError::UnknownResolutionMode(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceResolution {
    /// Raw mode string as written in the file; empty means `ConfiguredHost`.
    pub mode: String,
}

impl ServiceResolution {
    pub fn resolution_mode(&self) -> Result<ResolutionMode, ConfigError> {
        self.mode.parse()
    }
}

/// Benchmark settings for one service or container.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub concurrency: i64,
    pub requests: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub auth: Auth,
    #[serde(deserialize_with = "null_as_default")]
    pub http: Http,
    #[serde(rename = "serviceResolution", deserialize_with = "null_as_default")]
    pub service_resolution: ServiceResolution,
}

const SECRET_HEADERS: [&str; 2] = ["Authorization", "Proxy-Authorization"];

impl BenchConfig {
    pub fn benchmark(&self) -> Benchmark {
        Benchmark {
            concurrency: self.concurrency,
            requests: self.requests,
        }
    }

    /// Copy safe to print: password and credential headers are masked.
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        shown.auth = self.auth.redacted();
        for key in SECRET_HEADERS {
            let count = self.http.headers.get_all(key).len();
            if self.http.headers.contains_key(key) {
                shown.http.headers.insert(key, vec!["****".to_string(); count]);
            }
        }
        shown
    }
}

/// Spec used when nothing is configured for a target.
pub fn default_bench_spec() -> BenchConfig {
    BenchConfig {
        concurrency: DEFAULT_CONCURRENCY,
        requests: DEFAULT_REQUESTS,
        http: Http {
            method: DEFAULT_METHOD.to_string(),
            path: DEFAULT_PATH.to_string(),
            ..Http::default()
        },
        ..BenchConfig::default()
    }
}

impl Benchmarks {
    pub fn service(&self, name: &str) -> Option<&BenchConfig> {
        self.services.get(name)
    }

    pub fn container(&self, name: &str) -> Option<&BenchConfig> {
        self.containers.get(name)
    }

    /// Effective spec for a service: its override, or the fallback spec.
    pub fn service_spec(&self, name: &str) -> BenchConfig {
        self.spec_or_fallback(self.service(name), name)
    }

    /// Effective spec for a container: its override, or the fallback spec.
    pub fn container_spec(&self, name: &str) -> BenchConfig {
        self.spec_or_fallback(self.container(name), name)
    }

    fn spec_or_fallback(&self, found: Option<&BenchConfig>, name: &str) -> BenchConfig {
        let mut spec = match found {
            Some(cfg) => cfg.clone(),
            None => {
                let mut spec = default_bench_spec();
                if !self.defaults.is_empty() {
                    spec.concurrency = self.defaults.concurrency;
                    spec.requests = self.defaults.requests;
                }
                spec
            }
        };
        spec.name = name.to_string();
        spec
    }
}

impl Bench {
    /// Builds a store with the initial defaults and loads `path` into it.
    ///
    /// Callers that want to keep the defaults when the file is unusable can
    /// start from `Bench::default()` and call [`Bench::reload`] instead.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut bench = Bench::default();
        bench.reload(path)?;
        Ok(bench)
    }

    /// Re-reads `path` and replaces the whole configuration.
    ///
    /// The store is left untouched when reading or parsing fails.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bench = Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(
            path = %path.display(),
            services = bench.benchmarks.services.len(),
            containers = bench.benchmarks.containers.len(),
            "loaded bench config"
        );
        *self = bench;
        Ok(())
    }

    /// Parses a bench config document. A blank document yields the defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Bench::default());
        }
        let bench: Option<Bench> = serde_yaml::from_str(contents)?;
        Ok(bench.unwrap_or_default())
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
