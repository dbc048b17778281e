use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::models::{ContactAdminRequest, MailReceipt, SendInviteRequest};

const RESEND_API_URL: &str = "https://api.resend.com";

/// MailMessage
///
/// One outbound email. `to` is a list because the provider accepts several
/// recipients; every message built here has exactly one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Why a send failed.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The provider answered with a non-success status; `payload` is its JSON body.
    #[error("mail provider rejected the message with status {status}")]
    Rejected {
        status: u16,
        payload: serde_json::Value,
    },
    #[error("mail provider unreachable: {0}")]
    Transport(String),
}

// 1. Mailer Contract
/// Mailer
///
/// Abstract send-mail endpoint. Handlers only see `Arc<dyn Mailer>`, so tests swap in
/// `MockMailer` without touching the network.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<MailReceipt, MailError>;
}

/// MailerState
///
/// Shared mail client. Wrapped in `Option` in `AppState`: `None` means no credential
/// was configured and the client was never built.
pub type MailerState = Arc<dyn Mailer>;

// 2. The Real Implementation (Resend)
/// ResendMailer
///
/// Sends through the Resend REST API (`POST /emails`, bearer API key).
#[derive(Clone)]
pub struct ResendMailer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ResendResponse {
    id: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, RESEND_API_URL)
    }

    /// Points the client at another host (self-hosted relay, test server).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: MailMessage) -> Result<MailReceipt, MailError> {
        let url = format!("{}/emails", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Keep whatever the provider said; a non-JSON body is wrapped as a string.
            let body = response.text().await.unwrap_or_default();
            let payload = serde_json::from_str(&body)
                .unwrap_or_else(|_| serde_json::Value::String(body));
            return Err(MailError::Rejected {
                status: status.as_u16(),
                payload,
            });
        }

        let accepted = response
            .json::<ResendResponse>()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(MailReceipt { id: accepted.id })
    }
}

// 3. The Mock Implementation (For Tests)
/// MockMailer
///
/// Records every message it is given. `reject_with` makes each send fail as a
/// provider rejection with that payload.
#[derive(Default)]
pub struct MockMailer {
    pub reject_with: Option<serde_json::Value>,
    sent: Mutex<Vec<MailMessage>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(payload: serde_json::Value) -> Self {
        Self {
            reject_with: Some(payload),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Messages handed to `send`, including rejected ones.
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, message: MailMessage) -> Result<MailReceipt, MailError> {
        let count = {
            let mut sent = self
                .sent
                .lock()
                .map_err(|e| MailError::Transport(e.to_string()))?;
            sent.push(message);
            sent.len()
        };

        match &self.reject_with {
            Some(payload) => Err(MailError::Rejected {
                status: 422,
                payload: payload.clone(),
            }),
            None => Ok(MailReceipt {
                id: format!("mock-{count}"),
            }),
        }
    }
}

// --- Message builders ---

/// Invitation to join a club with a given role.
pub fn invitation_message(request: &SendInviteRequest, from: &str) -> MailMessage {
    let club = request
        .club_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("le club");

    MailMessage {
        from: from.to_string(),
        to: vec![request.email.clone()],
        subject: format!("Invitation à rejoindre {club}"),
        html: format!(
            "<p>Invitation pour {} : <a href=\"{}\">Cliquez ici</a></p>",
            escape_html(&request.role),
            escape_html(&request.link)
        ),
        text: format!("Invitation pour {} : {}", request.role, request.link),
    }
}

/// Notice to a club administrator that `requester_email` asks to join their club.
pub fn admin_contact_message(
    request: &ContactAdminRequest,
    requester_email: &str,
    from: &str,
) -> MailMessage {
    MailMessage {
        from: from.to_string(),
        to: vec![request.admin_email.clone()],
        subject: format!("Demande d'accès au club {}", request.club_name),
        html: format!(
            "<p><strong>{}</strong> demande à rejoindre le club <strong>{}</strong>.</p>",
            escape_html(requester_email),
            escape_html(&request.club_name)
        ),
        text: format!(
            "{} demande à rejoindre le club {}.",
            requester_email, request.club_name
        ),
    }
}

// Request fields end up inside HTML bodies and attributes.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
