//! Typed accessors for the backend endpoints.
//!
//! Each method is a thin call through the request client to a fixed path.
//! No retries, no caching, no pagination; failures propagate unchanged.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::*;

/// Entry point for all backend calls, grouped by endpoint family
#[derive(Clone, Debug)]
pub struct Api {
    client: ApiClient,
}

impl Api {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi {
            client: &self.client,
        }
    }

    pub fn entries(&self) -> EntriesApi<'_> {
        EntriesApi {
            client: &self.client,
        }
    }

    pub fn stats(&self) -> StatsApi<'_> {
        StatsApi {
            client: &self.client,
        }
    }

    pub fn ai(&self) -> AiApi<'_> {
        AiApi {
            client: &self.client,
        }
    }
}

/// Account and authentication endpoints
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl AuthApi<'_> {
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.client.post("/register/", request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.client.post("/login/", request).await
    }

    pub async fn logout(&self) -> Result<ApiMessage> {
        self.client.post_empty("/logout/").await
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.client.get("/profile/").await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<ApiMessage> {
        self.client.post("/change-password/", request).await
    }

    pub async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<ApiMessage> {
        self.client.post("/password-reset/", request).await
    }

    pub async fn confirm_password_reset(
        &self,
        request: &PasswordResetConfirmRequest,
    ) -> Result<ApiMessage> {
        self.client.post("/password-reset/confirm/", request).await
    }

    pub async fn send_email_verification(&self) -> Result<ApiMessage> {
        self.client.post_empty("/email-verification/").await
    }
}

/// Impact entry endpoints
pub struct EntriesApi<'a> {
    client: &'a ApiClient,
}

impl EntriesApi<'_> {
    /// List entries. A concrete metric filter becomes a `metric_type` query
    /// parameter; [`MetricFilter::All`] fetches unfiltered.
    pub async fn get_all(&self, filter: MetricFilter) -> Result<Vec<ImpactEntry>> {
        match filter {
            MetricFilter::All => self.client.get("/entries/").await,
            MetricFilter::Only(metric) => {
                self.client
                    .get_with_query("/entries/", &[("metric_type", metric.to_string())])
                    .await
            }
        }
    }

    pub async fn get(&self, id: i64) -> Result<ImpactEntry> {
        self.client.get(&format!("/entries/{}/", id)).await
    }

    pub async fn create(&self, entry: &NewEntry) -> Result<ImpactEntry> {
        self.client.post("/entries/", entry).await
    }

    pub async fn update(&self, id: i64, entry: &NewEntry) -> Result<ImpactEntry> {
        self.client.put(&format!("/entries/{}/", id), entry).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/entries/{}/", id)).await
    }
}

/// Aggregate statistics endpoint
pub struct StatsApi<'a> {
    client: &'a ApiClient,
}

impl StatsApi<'_> {
    pub async fn impact_stats(&self) -> Result<StatsSummary> {
        self.client.get("/stats/").await
    }
}

/// AI suggestion endpoint
pub struct AiApi<'a> {
    client: &'a ApiClient,
}

impl AiApi<'_> {
    pub async fn suggestions(&self) -> Result<SuggestionsResponse> {
        self.client.post_empty("/ai-suggestions/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> Api {
        Api::new(ApiClient::new(server.uri()).with_token(Some("tok".into())))
    }

    #[tokio::test]
    async fn test_get_all_unfiltered_and_all_sentinel_hit_same_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entries/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let api = api_for(&server);
        api.entries().get_all(MetricFilter::All).await.unwrap();
        api.entries()
            .get_all(MetricFilter::default())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.url.path(), "/entries/");
            assert_eq!(request.url.query(), None);
        }
    }

    #[tokio::test]
    async fn test_get_all_with_metric_filter_adds_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entries/"))
            .and(query_param("metric_type", "water"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server);
        api.entries()
            .get_all(MetricFilter::Only(MetricType::Water))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_posts_exact_body() {
        let server = MockServer::start().await;
        let expected_body = json!({
            "metric_type": "carbon",
            "value": 5.0,
            "description": "bike commute"
        });
        Mock::given(method("POST"))
            .and(path("/entries/"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 1,
                "metric_type": "carbon",
                "value": 5.0,
                "description": "bike commute",
                "created_at": "2024-06-01T10:30:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server);
        let created = api
            .entries()
            .create(&NewEntry {
                metric_type: MetricType::Carbon,
                value: 5.0,
                description: "bike commute".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.metric_type, MetricType::Carbon);
    }

    #[tokio::test]
    async fn test_get_single_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entries/42/"))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(json!({
                    "id": 42,
                    "metric_type": "digital",
                    "value": 3.5,
                    "description": "streaming",
                    "created_at": "2024-06-01T10:30:00Z"
                })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server);
        let entry = api.entries().get(42).await.unwrap();
        assert_eq!(entry.id, 42);
        assert_eq!(entry.metric_type, MetricType::Digital);
    }

    #[tokio::test]
    async fn test_update_puts_to_entry_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/entries/9/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 9,
                "metric_type": "energy",
                "value": 2.5,
                "description": "",
                "created_at": "2024-06-01T10:30:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server);
        let updated = api
            .entries()
            .update(
                9,
                &NewEntry {
                    metric_type: MetricType::Energy,
                    value: 2.5,
                    description: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.value, 2.5);
    }

    #[tokio::test]
    async fn test_delete_hits_entry_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/entries/3/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server);
        api.entries().delete(3).await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_entries": 2,
                "metric_breakdown": [
                    {"metric_type": "carbon", "total_value": 7.5, "avg_value": 3.75, "count": 2}
                ]
            })))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let stats = api.stats().impact_stats().await.unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_for(MetricType::Carbon), 7.5);
    }

    #[tokio::test]
    async fn test_suggestions_posted_and_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai-suggestions/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suggestions": [
                    {"title": "Bike more", "message": "Try cycling short trips.",
                     "impact": "High", "effort": "Low"}
                ],
                "data_points_analyzed": 12
            })))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let response = api.ai().suggestions().await.unwrap();
        assert_eq!(response.suggestions.len(), 1);
        assert_eq!(response.suggestions[0].title, "Bike more");
        assert_eq!(response.data_points_analyzed, 12);
    }

    #[tokio::test]
    async fn test_login_and_register_paths() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/"))
            .and(body_json(json!({"username": "ada", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "acc", "refresh": "ref",
                "user": {"username": "ada", "email": "a@b.c"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/register/"))
            .respond_with(ResponseTemplate::new(201)
                .set_body_json(json!({"user": {"username": "ada", "email": "a@b.c"}})))
            .expect(1)
            .mount(&server)
            .await;

        let api = Api::new(ApiClient::new(server.uri()));
        let login = api
            .auth()
            .login(&LoginRequest {
                username: "ada".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();
        assert_eq!(login.access.as_deref(), Some("acc"));

        let register = api
            .auth()
            .register(&RegisterRequest {
                username: "ada".into(),
                email: "a@b.c".into(),
                password: "pw".into(),
                password_confirm: "pw".into(),
            })
            .await
            .unwrap();
        assert!(register.access.is_none());
    }
}
