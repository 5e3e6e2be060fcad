use loader_model::DatabasePath;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::{
    config::SpannerConfig,
    errors::SpannerError,
    wire::{
        BatchCreateSessionsRequest, BatchCreateSessionsResponse, ExecuteSqlRequest, ResultSet,
        decode_error,
    },
};

/// Thin typed wrapper over the REST resources the loader touches.
pub(crate) struct Api {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl Api {
    pub(crate) fn new(cfg: &SpannerConfig) -> Result<Self, SpannerError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(cfg.pool.max_opened)
            .build()?;

        Ok(Self {
            http,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            access_token: cfg.access_token.clone(),
        })
    }

    pub(crate) async fn batch_create_sessions(
        &self,
        database: &DatabasePath,
        count: usize,
    ) -> Result<Vec<String>, SpannerError> {
        let url = format!("{}/v1/{}/sessions:batchCreate", self.endpoint, database);
        trace!(target: "loader.spanner", %url, count, "batch create sessions");

        let req = self
            .http
            .post(url)
            .json(&BatchCreateSessionsRequest {
                session_count: count,
            });
        let resp: BatchCreateSessionsResponse = self.send_json(req).await?;

        Ok(resp.session.into_iter().map(|s| s.name).collect())
    }

    pub(crate) async fn execute_sql(
        &self,
        session: &str,
        body: &ExecuteSqlRequest<'_>,
    ) -> Result<ResultSet, SpannerError> {
        let url = format!("{}/v1/{}:executeSql", self.endpoint, session);
        let req = self.http.post(url).json(body);
        self.send_json(req).await
    }

    pub(crate) async fn delete_session(&self, session: &str) -> Result<(), SpannerError> {
        let url = format!("{}/v1/{}", self.endpoint, session);
        let req = self.http.delete(url);
        self.send(req).await.map(|_| ())
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, SpannerError> {
        let resp = self.send(req).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, SpannerError> {
        let req = match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };

        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await?;
        let (code, message) = decode_error(status, &body);
        Err(SpannerError::Status { code, message })
    }
}

#[cfg(test)]
mod tests {
    use loader_core::Code;
    use loader_model::{Priority, Statement};
    use reqwest::StatusCode;

    use super::*;
    use crate::testing::SpannerStub;

    fn config(endpoint: &str) -> SpannerConfig {
        let database = DatabasePath::new("p", "i", "d").unwrap();
        SpannerConfig::new(database, 1).with_endpoint(format!("{endpoint}/"))
    }

    #[tokio::test]
    async fn sends_bearer_token_when_configured() {
        let (stub, endpoint) = SpannerStub::new().serve().await;
        let api = Api::new(&config(&endpoint).with_access_token(Some("t0ken".into()))).unwrap();

        let names = api
            .batch_create_sessions(&DatabasePath::new("p", "i", "d").unwrap(), 2)
            .await
            .unwrap();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("projects/p/instances/i/databases/d/sessions/"));

        api.delete_session(&names[0]).await.unwrap();
        assert_eq!(stub.auth_headers(), vec!["Bearer t0ken", "Bearer t0ken"]);
        assert_eq!(stub.deleted(), vec![names[0].clone()]);
    }

    #[tokio::test]
    async fn emulator_requests_carry_no_credentials() {
        let (stub, endpoint) = SpannerStub::new().serve().await;
        let api = Api::new(&config(&endpoint)).unwrap();

        api.delete_session("projects/p/instances/i/databases/d/sessions/s0")
            .await
            .unwrap();
        assert_eq!(stub.auth_headers(), vec![String::new()]);
    }

    #[tokio::test]
    async fn error_envelope_becomes_status() {
        let body = r#"{"error":{"code":400,"message":"Table not found: Missing","status":"INVALID_ARGUMENT"}}"#;
        let (_stub, endpoint) = SpannerStub::new()
            .execute_responds(StatusCode::BAD_REQUEST, body)
            .serve()
            .await;
        let api = Api::new(&config(&endpoint)).unwrap();

        let stmt = Statement::new("SELECT * FROM Missing", Priority::High);
        let err = api
            .execute_sql("projects/p/instances/i/databases/d/sessions/s0", &ExecuteSqlRequest::single_use(&stmt))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SpannerError::Status { code: Code::InvalidArgument, ref message } if message == "Table not found: Missing"
        ));
    }

    #[tokio::test]
    async fn plain_text_gateway_timeout_is_a_deadline() {
        let (_stub, endpoint) = SpannerStub::new()
            .execute_responds(StatusCode::GATEWAY_TIMEOUT, "upstream request timeout")
            .serve()
            .await;
        let api = Api::new(&config(&endpoint)).unwrap();

        let stmt = Statement::new("SELECT 1", Priority::Low);
        let err = api
            .execute_sql("projects/p/instances/i/databases/d/sessions/s0", &ExecuteSqlRequest::single_use(&stmt))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::DeadlineExceeded);
    }

    #[tokio::test]
    async fn rows_are_decoded_from_the_result_set() {
        let (_stub, endpoint) = SpannerStub::new()
            .execute_responds(StatusCode::OK, r#"{"metadata":{},"rows":[["1","a"],["2","b"]]}"#)
            .serve()
            .await;
        let api = Api::new(&config(&endpoint)).unwrap();

        let stmt = Statement::new("SELECT id, name FROM T", Priority::Medium);
        let rs = api
            .execute_sql("projects/p/instances/i/databases/d/sessions/s0", &ExecuteSqlRequest::single_use(&stmt))
            .await
            .unwrap();
        assert_eq!(rs.rows.len(), 2);
    }
}
