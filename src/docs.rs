//! Endpoint documentation registry.
//!
//! The registry is plain owned state: built once by [`register_all`] at
//! startup and carried in `AppState`. Nothing registers itself as a side
//! effect of being imported, so the rendered docs never depend on which
//! modules happen to have been touched first.

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::rate_limit::RateLimitPolicy;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDoc {
    pub status: u16,
    pub description: &'static str,
}

fn response(status: u16, description: &'static str) -> ResponseDoc {
    ResponseDoc {
        status,
        description,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
    pub auth_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_schema: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_schema: Option<&'static str>,
    pub responses: Vec<ResponseDoc>,
}

#[derive(Debug)]
pub struct DocsRegistry {
    title: &'static str,
    version: &'static str,
    description: &'static str,
    base_url: &'static str,
    endpoints: Vec<EndpointDoc>,
}

impl DocsRegistry {
    pub fn new() -> Self {
        Self {
            title: "Keel API",
            version: env!("CARGO_PKG_VERSION"),
            description: "API documentation for the Keel boilerplate service",
            base_url: "/api",
            endpoints: Vec::new(),
        }
    }

    pub fn add(&mut self, endpoint: EndpointDoc) {
        self.endpoints.push(endpoint);
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    fn sorted(&self) -> Vec<&EndpointDoc> {
        let mut entries: Vec<&EndpointDoc> = self.endpoints.iter().collect();
        entries.sort_by(|a, b| a.path.cmp(b.path).then(a.method.cmp(b.method)));
        entries
    }

    pub fn to_markdown(&self) -> String {
        let mut md = format!("# {}\n\n", self.title);
        md.push_str(&format!("**Version:** {}\n\n", self.version));
        md.push_str(&format!("{}\n\n", self.description));
        md.push_str(&format!("**Base URL:** `{}`\n\n", self.base_url));
        md.push_str("## Endpoint List\n\n");

        for endpoint in self.sorted() {
            md.push_str(&format!("### {} {}\n\n", endpoint.method, endpoint.path));
            md.push_str(&format!("{}\n\n", endpoint.summary));

            if endpoint.auth_required {
                md.push_str("**Authentication Required**\n\n");
            }

            if let Some(rate_limit) = &endpoint.rate_limit {
                md.push_str(&format!("**Rate Limit:** {}\n\n", rate_limit));
            }

            if let Some(schema) = endpoint.body_schema {
                md.push_str(&format!("**Request Body Schema:** `{}`\n\n", schema));
            }

            if let Some(schema) = endpoint.query_schema {
                md.push_str(&format!("**Query Parameters Schema:** `{}`\n\n", schema));
            }

            if !endpoint.responses.is_empty() {
                md.push_str("**Responses:**\n\n");
                for response in &endpoint.responses {
                    md.push_str(&format!(
                        "- **{}:** {}\n",
                        response.status, response.description
                    ));
                }
                md.push('\n');
            }

            md.push_str("---\n\n");
        }

        md
    }

    pub fn to_json(&self) -> Value {
        json!({
            "title": self.title,
            "version": self.version,
            "description": self.description,
            "baseUrl": self.base_url,
            "endpoints": self.sorted(),
        })
    }
}

impl Default for DocsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the registry for every route the service exposes. Rate-limit
/// descriptions are derived from the same configuration the router uses,
/// so the docs cannot drift from the live policies.
pub fn register_all(config: &AppConfig) -> DocsRegistry {
    let auth_limit = RateLimitPolicy::new(
        "auth",
        config.rate_limit.auth_limit,
        config.rate_limit.auth_window_secs,
    )
    .describe();
    let default_limit = RateLimitPolicy::new(
        "default",
        config.rate_limit.default_limit,
        config.rate_limit.default_window_secs,
    )
    .describe();

    let mut docs = DocsRegistry::new();

    docs.add(EndpointDoc {
        method: "POST",
        path: "/api/auth/signup",
        summary: "Register a new user account",
        auth_required: false,
        rate_limit: Some(auth_limit.clone()),
        body_schema: Some("SignupRequest"),
        query_schema: None,
        responses: vec![
            response(201, "Registration successful"),
            response(400, "Input validation failed"),
            response(409, "Email already exists"),
            response(429, "Too many requests"),
            response(500, "Server error"),
        ],
    });

    docs.add(EndpointDoc {
        method: "POST",
        path: "/api/auth/login",
        summary: "Login with email and password",
        auth_required: false,
        rate_limit: Some(auth_limit),
        body_schema: Some("LoginRequest"),
        query_schema: None,
        responses: vec![
            response(200, "Login successful"),
            response(400, "Input validation failed"),
            response(401, "Authentication failed"),
            response(429, "Too many requests"),
            response(500, "Server error"),
        ],
    });

    docs.add(EndpointDoc {
        method: "GET",
        path: "/api/user",
        summary: "List users with pagination",
        auth_required: true,
        rate_limit: Some(default_limit.clone()),
        body_schema: None,
        query_schema: Some("ListQuery"),
        responses: vec![
            response(200, "Page of users"),
            response(400, "Input validation failed"),
            response(401, "Authentication required"),
            response(429, "Too many requests"),
        ],
    });

    docs.add(EndpointDoc {
        method: "POST",
        path: "/api/user",
        summary: "Create a user",
        auth_required: true,
        rate_limit: Some(default_limit.clone()),
        body_schema: Some("SignupRequest"),
        query_schema: None,
        responses: vec![
            response(201, "User created"),
            response(400, "Input validation failed"),
            response(401, "Authentication required"),
            response(409, "Email already exists"),
            response(429, "Too many requests"),
        ],
    });

    docs.add(EndpointDoc {
        method: "GET",
        path: "/api/user/:userId",
        summary: "Fetch a user by id",
        auth_required: true,
        rate_limit: Some(default_limit.clone()),
        body_schema: None,
        query_schema: None,
        responses: vec![
            response(200, "User found"),
            response(401, "Authentication required"),
            response(404, "User not found"),
            response(429, "Too many requests"),
        ],
    });

    docs.add(EndpointDoc {
        method: "PUT",
        path: "/api/user/:userId",
        summary: "Update a user's password",
        auth_required: true,
        rate_limit: Some(default_limit.clone()),
        body_schema: Some("UpdateUserRequest"),
        query_schema: None,
        responses: vec![
            response(200, "User updated"),
            response(400, "Input validation failed"),
            response(401, "Authentication required"),
            response(404, "User not found"),
            response(429, "Too many requests"),
        ],
    });

    docs.add(EndpointDoc {
        method: "DELETE",
        path: "/api/user/:userId",
        summary: "Soft-delete a user",
        auth_required: true,
        rate_limit: Some(default_limit.clone()),
        body_schema: None,
        query_schema: None,
        responses: vec![
            response(200, "User deleted"),
            response(401, "Authentication required"),
            response(404, "User not found"),
            response(429, "Too many requests"),
        ],
    });

    docs.add(EndpointDoc {
        method: "GET",
        path: "/api/dog",
        summary: "Fetch a random dog image from the upstream API",
        auth_required: false,
        rate_limit: Some(default_limit),
        body_schema: None,
        query_schema: None,
        responses: vec![
            response(200, "Random dog image"),
            response(429, "Too many requests"),
            response(500, "Upstream failure"),
        ],
    });

    docs.add(EndpointDoc {
        method: "GET",
        path: "/api/health",
        summary: "System health report",
        auth_required: false,
        rate_limit: None,
        body_schema: None,
        query_schema: None,
        responses: vec![
            response(200, "System is healthy"),
            response(503, "System health check failed"),
        ],
    });

    docs.add(EndpointDoc {
        method: "GET",
        path: "/api/docs",
        summary: "This documentation, as markdown or JSON",
        auth_required: false,
        rate_limit: None,
        body_schema: None,
        query_schema: Some("format=markdown|json"),
        responses: vec![
            response(200, "Documentation"),
            response(400, "Unknown format"),
        ],
    });

    docs.add(EndpointDoc {
        method: "GET",
        path: "/",
        summary: "Service index",
        auth_required: false,
        rate_limit: None,
        body_schema: None,
        query_schema: None,
        responses: vec![response(200, "Service name, version and routes")],
    });

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_covers_every_route() {
        let docs = register_all(&AppConfig::development());
        assert_eq!(docs.len(), 11);
    }

    #[test]
    fn test_markdown_rendering() {
        let docs = register_all(&AppConfig::development());
        let md = docs.to_markdown();

        assert!(md.starts_with("# Keel API\n\n"));
        assert!(md.contains("**Base URL:** `/api`"));
        assert!(md.contains("### POST /api/auth/signup"));
        assert!(md.contains("**Rate Limit:** 5 requests per 15 minutes"));
        assert!(md.contains("**Request Body Schema:** `SignupRequest`"));
        assert!(md.contains("- **409:** Email already exists"));
        assert!(md.contains("**Authentication Required**"));
    }

    #[test]
    fn test_json_rendering_is_sorted_and_camel_case() {
        let docs = register_all(&AppConfig::development());
        let value = docs.to_json();

        let endpoints = value["endpoints"].as_array().unwrap();
        assert_eq!(endpoints.len(), 11);

        let paths: Vec<&str> = endpoints
            .iter()
            .map(|e| e["path"].as_str().unwrap())
            .collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);

        let signup = endpoints
            .iter()
            .find(|e| e["path"] == "/api/auth/signup")
            .unwrap();
        assert_eq!(signup["authRequired"], false);
        assert_eq!(signup["bodySchema"], "SignupRequest");
        assert!(signup["responses"].as_array().unwrap().len() >= 4);
    }

    #[test]
    fn test_custom_registry_stays_explicit() {
        let mut docs = DocsRegistry::new();
        assert!(docs.is_empty());

        docs.add(EndpointDoc {
            method: "GET",
            path: "/ping",
            summary: "Ping",
            ..EndpointDoc::default()
        });

        assert_eq!(docs.len(), 1);
        assert!(docs.to_markdown().contains("### GET /ping"));
    }
}
