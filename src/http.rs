use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method, RequestBuilder,
};

use crate::{
    config::{BenchConfig, Http, DEFAULT_METHOD, DEFAULT_PATH},
    error::ConfigError,
};

impl Http {
    /// Request method; an empty method means GET.
    pub fn method(&self) -> Result<Method, ConfigError> {
        let method = self.method.trim();
        let method = if method.is_empty() {
            DEFAULT_METHOD.to_string()
        } else {
            method.to_ascii_uppercase()
        };

        Method::from_bytes(method.as_bytes())
            .map_err(|_| ConfigError::InvalidMethod(self.method.clone()))
    }

    pub fn scheme(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }

    /// Target URL built from scheme, host and path. The host is not checked.
    pub fn url(&self) -> String {
        let path = if self.path.is_empty() {
            DEFAULT_PATH
        } else {
            self.path.as_str()
        };
        let sep = if path.starts_with('/') { "" } else { "/" };
        format!("{}://{}{}{}", self.scheme(), self.host, sep, path)
    }

    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut header_map = HeaderMap::new();
        for (key, values) in self.headers.iter() {
            let header_name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| ConfigError::InvalidHeader(format!("{key}: {e}")))?;
            for value in values {
                let header_value = HeaderValue::from_str(value)
                    .map_err(|e| ConfigError::InvalidHeader(format!("{key}: {e}")))?;
                header_map.append(header_name.clone(), header_value);
            }
        }
        Ok(header_map)
    }
}

impl BenchConfig {
    /// HTTP client for this benchmark, speaking HTTP/2 directly when asked to.
    pub fn client(&self) -> Result<Client, ConfigError> {
        let mut builder = Client::builder();
        if self.http.http2 {
            builder = builder.http2_prior_knowledge();
        }
        Ok(builder.build()?)
    }

    /// Prepares, but does not send, the request this benchmark issues.
    pub fn request(&self, client: &Client) -> Result<RequestBuilder, ConfigError> {
        let mut request_builder = client
            .request(self.http.method()?, self.http.url())
            .headers(self.http.header_map()?);

        if self.auth.is_set() {
            request_builder =
                request_builder.basic_auth(&self.auth.user, Some(&self.auth.password));
        }
        if !self.http.body.is_empty() {
            request_builder = request_builder.body(self.http.body.clone());
        }

        Ok(request_builder)
    }
}
