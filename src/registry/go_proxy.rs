//! Go Module Proxy adapter
//!
//! Fetches module version lists from a Go Module Proxy.
//! API endpoint: {proxy}/{escaped module}/@v/list

use crate::error::RegistryError;
use crate::registry::{HttpClient, ModuleRegistry, ModuleVersions};
use async_trait::async_trait;
use tracing::debug;

/// Go Module Proxy base URL
pub const GO_PROXY_URL: &str = "https://proxy.golang.org";

/// Header asking the proxy to answer from its cache only
const DISABLE_FETCH_HEADER: &str = "Disable-Module-Fetch";

/// Go Module Proxy adapter
pub struct GoProxyRegistry {
    client: HttpClient,
    base_url: String,
}

impl GoProxyRegistry {
    /// Create a new Go Proxy adapter for the given proxy URL
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for listing versions
    fn build_list_url(&self, module: &str) -> String {
        format!("{}/{}/@v/list", self.base_url, escape_module_path(module))
    }
}

/// Escapes a module path for proxy URLs
///
/// The proxy is case-insensitive, so uppercase letters become `!lowercase`.
fn escape_module_path(module: &str) -> String {
    let mut escaped = String::with_capacity(module.len());
    for ch in module.chars() {
        if ch.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(ch.to_ascii_lowercase());
        } else {
            escaped.push(ch);
        }
    }
    escaped
}

#[async_trait]
impl ModuleRegistry for GoProxyRegistry {
    fn registry_name(&self) -> &'static str {
        "Go Proxy"
    }

    async fn query(
        &self,
        module_path: &str,
        cached: bool,
    ) -> Result<Option<ModuleVersions>, RegistryError> {
        let url = self.build_list_url(module_path);
        let headers: &[(&str, &str)] = if cached {
            &[(DISABLE_FETCH_HEADER, "true")]
        } else {
            &[]
        };
        debug!(%url, cached, "querying module proxy");

        let body = match self
            .client
            .get_text(&url, headers, module_path, self.registry_name())
            .await
        {
            Ok(body) => body,
            Err(RegistryError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let versions = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Some(ModuleVersions::new(module_path, versions)))
    }
}
