//! Operation table sampled by the traffic generator

use reqwest::Method;

pub const ID_PLACEHOLDER: &str = "{id}";
pub const ITEM_PATH: &str = "/api/items/{id}";

/// Methods whose handlers honor the force-error header
pub const INJECTABLE_METHODS: [Method; 3] = [Method::PUT, Method::PATCH, Method::DELETE];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationSpec {
    /// Plain call; `path` may contain [`ID_PLACEHOLDER`]
    Call { method: Method, path: &'static str },
    /// Item mutation carrying the force-error header
    InjectError { status: u16 },
}

impl OperationSpec {
    pub const fn call(method: Method, path: &'static str) -> Self {
        OperationSpec::Call { method, path }
    }
}

/// Every route the service exposes (each direct error route included), plus one
/// header-injection entry per error status
pub fn default_operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::call(Method::GET, "/"),
        OperationSpec::call(Method::GET, "/api/tags"),
        OperationSpec::call(Method::GET, "/api/ps"),
        OperationSpec::call(Method::POST, "/api/pull"),
        OperationSpec::call(Method::PUT, ITEM_PATH),
        OperationSpec::call(Method::PATCH, ITEM_PATH),
        OperationSpec::call(Method::DELETE, ITEM_PATH),
        OperationSpec::call(Method::HEAD, "/api/status"),
        OperationSpec::call(Method::OPTIONS, "/api/options"),
        OperationSpec::call(Method::GET, "/api/redirect"),
        OperationSpec::call(Method::GET, "/api/error/400"),
        OperationSpec::call(Method::GET, "/api/error/404"),
        OperationSpec::call(Method::GET, "/api/error/500"),
        OperationSpec::call(Method::GET, "/api/error/503"),
        OperationSpec::InjectError { status: 400 },
        OperationSpec::InjectError { status: 404 },
        OperationSpec::InjectError { status: 500 },
        OperationSpec::InjectError { status: 503 },
    ]
}

/// A concrete request drawn from the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRequest {
    pub spec: OperationSpec,
    pub method: Method,
    pub path: String,
    pub force_error: Option<u16>,
}

pub fn resolve_path(template: &str, id: u32) -> String {
    template.replace(ID_PLACEHOLDER, &id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_method_and_error_bucket() {
        let operations = default_operations();
        for method in [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ] {
            assert!(operations
                .iter()
                .any(|op| matches!(op, OperationSpec::Call { method: m, .. } if *m == method)));
        }
        for status in [400, 404, 500, 503] {
            assert!(operations.contains(&OperationSpec::InjectError { status }));
            let path = format!("/api/error/{}", status);
            assert!(operations.iter().any(|op| matches!(
                op,
                OperationSpec::Call { method, path: p } if *method == Method::GET && *p == path
            )));
        }
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path(ITEM_PATH, 4321), "/api/items/4321");
        assert_eq!(resolve_path("/api/tags", 7), "/api/tags");
    }
}
