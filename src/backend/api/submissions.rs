//! Interact with the `contact_submissions` table.

use log::debug;
use reqwest::Method;

use super::connection::BackendConnection;
use crate::backend::error::ApiError;
use crate::backend::models::Submission;

pub const TABLE: &str = "contact_submissions";

/// Insert rows without asking for them back (`Prefer: return=minimal`).
///
/// # Errors
///
/// Returns an error if the server is unreachable or answers with a non-2xx
/// status. The PostgREST error code and message are kept for translation.
pub async fn submissions_post(
    connection: &BackendConnection,
    rows: &[Submission],
) -> Result<(), ApiError> {
    debug!("building post request for {} row(s)", rows.len());
    let api_url = connection.rest_url(TABLE);
    let req_builder = connection.request(Method::POST, api_url).await?.json(rows);

    let response = req_builder.send().await?;
    let status = response.status();
    debug!("status: {}", status);
    if !status.is_success() {
        let content = response.text().await?;
        debug!("content: {}", content);
        return Err(ApiError::from_postgrest(status, &content));
    }
    Ok(())
}

/// Get every stored submission, most recent first.
///
/// A `null` or empty body is an empty list.
///
/// # Errors
///
/// Returns an error if the server is unreachable, answers with a non-2xx
/// status, or returns data that isn't a list of submissions.
pub async fn submissions_get(connection: &BackendConnection) -> Result<Vec<Submission>, ApiError> {
    debug!("building get request for {}", TABLE);
    let mut api_url = connection.rest_url(TABLE);
    api_url
        .query_pairs_mut()
        .append_pair("select", "*")
        .append_pair("order", "created_at.desc");
    let req_builder = connection.request(Method::GET, api_url).await?;

    let response = req_builder.send().await?;
    let status = response.status();
    debug!("status: {}", status);
    let content = response.text().await?;
    debug!("content: {}", content);
    if !status.is_success() {
        return Err(ApiError::from_postgrest(status, &content));
    }
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let submissions: Option<Vec<Submission>> =
        serde_json::from_str(&content).map_err(|source| ApiError::Malformed {
            content: content.clone(),
            source,
        })?;
    Ok(submissions.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use serde_json::json;

    use super::*;

    fn config(server: &MockServer) -> BackendConnection {
        BackendConnection::new(&server.base_url(), "TEST-KEY").unwrap()
    }

    fn row() -> Submission {
        Submission {
            name: "Ana".to_owned(),
            company: "Acme".to_owned(),
            email: "a@b.com".to_owned(),
            phone: None,
            project_type: "web".to_owned(),
            description: "desc".to_owned(),
            budget: None,
            timeline: None,
            source: None,
            created_at: Utc.ymd(2024, 5, 6).and_hms_milli(12, 30, 15, 250),
            extra: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn test_submissions_post_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .header("Authorization", "Bearer TEST-KEY")
                .header("Prefer", "return=minimal")
                .header("Content-Type", "application/json")
                .path("/rest/v1/contact_submissions")
                .json_body(json!([{
                    "name": "Ana",
                    "company": "Acme",
                    "email": "a@b.com",
                    "phone": null,
                    "project_type": "web",
                    "description": "desc",
                    "budget": null,
                    "timeline": null,
                    "source": null,
                    "created_at": "2024-05-06T12:30:15.250Z",
                }]));
            then.status(201);
        });

        submissions_post(&config(&server), &[row()]).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_submissions_post_conflict() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/rest/v1/contact_submissions");
            then.status(409)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "code": "23505",
                    "details": null,
                    "hint": null,
                    "message": "duplicate key value violates unique constraint",
                }));
        });

        let result = submissions_post(&config(&server), &[row()])
            .await
            .expect_err("Expected conflict");

        mock.assert();
        match result {
            ApiError::Response { status, code, .. } => {
                assert_eq!(status, reqwest::StatusCode::CONFLICT);
                assert_eq!(code.as_deref(), Some("23505"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submissions_get_query_params() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .query_param("select", "*")
                .query_param("order", "created_at.desc")
                .path("/rest/v1/contact_submissions");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([{
                    "id": 7,
                    "name": "Ana",
                    "company": "Acme",
                    "email": "a@b.com",
                    "phone": null,
                    "project_type": "web",
                    "description": "desc",
                    "budget": null,
                    "timeline": null,
                    "source": null,
                    "created_at": "2024-05-06T12:30:15.25+00:00",
                }]));
        });

        let result = submissions_get(&config(&server)).await.unwrap();

        mock.assert();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].extra.get("id"), Some(&json!(7)));
        assert_eq!(result[0].created_at, row().created_at);
    }

    #[tokio::test]
    async fn test_submissions_get_null_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/contact_submissions");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("null");
        });

        let result = submissions_get(&config(&server)).await.unwrap();

        mock.assert();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_submissions_get_malformed_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/contact_submissions");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("this isn't actually json");
        });

        let result = submissions_get(&config(&server))
            .await
            .expect_err("Expected json parsing error");

        mock.assert();
        match result {
            ApiError::Malformed { content, source } => {
                assert_eq!(content, "this isn't actually json");
                assert_eq!(source.classify(), serde_json::error::Category::Syntax);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submissions_get_wrong_structure_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/contact_submissions");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"name": "Ana"}));
        });

        let result = submissions_get(&config(&server))
            .await
            .expect_err("Expected json parsing error");

        mock.assert();
        // Expected json structure is a list of maps, not a single map
        assert!(result
            .to_string()
            .contains("JSON from Supabase was malformed: {"));
    }

    #[tokio::test]
    async fn test_submissions_get_401_response() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/contact_submissions");
            then.status(401)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "code": "42501",
                    "details": null,
                    "hint": null,
                    "message": "permission denied for table contact_submissions",
                }));
        });

        let result = submissions_get(&config(&server))
            .await
            .expect_err("Expected status code error");

        mock.assert();
        assert!(matches!(
            result,
            ApiError::Response {
                status: reqwest::StatusCode::UNAUTHORIZED,
                code: Some(ref code),
                ..
            } if code == "42501"
        ));
    }

    #[tokio::test]
    async fn test_submissions_get_slow_response_still_completes() {
        // No client-side timeout is configured
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/contact_submissions");
            then.status(200)
                .header("Content-Type", "application/json")
                .delay(Duration::from_millis(1200))
                .body("[]");
        });

        let result = submissions_get(&config(&server)).await.unwrap();

        mock.assert();
        assert!(result.is_empty());
    }
}
