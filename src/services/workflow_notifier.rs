use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::utils::time::{now, to_rfc3339};

/// Hands a freshly submitted application to the external automation system.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    async fn submit_candidate(&self, candidate: &Candidate) -> Result<NotifierAck>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifierAck {
    pub http_status: u16,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSubmittedPayload<'a> {
    pub event_type: &'static str,
    pub candidate: &'a Candidate,
    pub submitted_at: String,
}

/// Posts submitted applications to an n8n webhook.
#[derive(Clone)]
pub struct N8nNotifier {
    client: Client,
    webhook_url: Option<String>,
    webhook_secret: Option<String>,
}

impl N8nNotifier {
    pub fn new(
        webhook_url: Option<String>,
        webhook_secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());

        if let Some(ref url) = webhook_url {
            info!("n8n integration enabled, webhook URL: {}", url);
        } else {
            info!("n8n integration disabled (N8N_WEBHOOK_URL not set or empty)");
        }

        Ok(Self {
            client,
            webhook_url,
            webhook_secret,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }
}

#[async_trait]
impl WorkflowNotifier for N8nNotifier {
    async fn submit_candidate(&self, candidate: &Candidate) -> Result<NotifierAck> {
        let Some(webhook_url) = self.webhook_url.as_deref() else {
            return Err(Error::Notifier("n8n webhook URL is not configured".into()));
        };

        let payload = ApplicationSubmittedPayload {
            event_type: "application_submitted",
            candidate,
            submitted_at: to_rfc3339(now()),
        };

        info!("Sending application to n8n for candidate {}", candidate.id);

        let mut request = self.client.post(webhook_url).json(&payload);
        if let Some(secret) = &self.webhook_secret {
            request = request.header("X-Webhook-Secret", secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Notifier(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(
                "n8n webhook for candidate {} failed with status {}: {}",
                candidate.id, status, text
            );
            return Err(Error::Notifier(format!("HTTP error {}: {}", status, text)));
        }

        Ok(NotifierAck {
            http_status: status.as_u16(),
            body: serde_json::from_str(&text).ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::CandidateStatus;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn candidate() -> Candidate {
        let ts = now();
        Candidate {
            id: uuid::Uuid::new_v4(),
            token: "tok-123".into(),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            position: None,
            status: CandidateStatus::Applied,
            phone: Some("555-0100".into()),
            experience: None,
            skills: vec!["rust".into()],
            resume_url: None,
            invited_by: None,
            ai_score: None,
            ai_summary: None,
            notes: None,
            applied_at: Some(ts),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn notifier(url: Option<String>) -> N8nNotifier {
        N8nNotifier::new(url, Some("whsec_test".into()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_candidate_with_secret_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/ats"))
            .and(header("X-Webhook-Secret", "whsec_test"))
            .and(body_partial_json(serde_json::json!({
                "event_type": "application_submitted",
                "candidate": { "status": "applied", "phone": "555-0100" }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "executionId": "42" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let ack = notifier(Some(format!("{}/webhook/ats", server.uri())))
            .submit_candidate(&candidate())
            .await
            .unwrap();

        assert_eq!(ack.http_status, 200);
        assert_eq!(ack.body, Some(serde_json::json!({ "executionId": "42" })));
    }

    #[tokio::test]
    async fn non_success_status_is_a_notifier_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("workflow crashed"))
            .mount(&server)
            .await;

        let err = notifier(Some(server.uri()))
            .submit_candidate(&candidate())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Notifier(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn unconfigured_webhook_fails_without_a_request() {
        let n = notifier(None);
        assert!(!n.is_enabled());
        let err = n.submit_candidate(&candidate()).await.unwrap_err();
        assert!(matches!(err, Error::Notifier(_)));
    }
}
