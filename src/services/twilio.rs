//! Twilio WhatsApp channel for approved content templates.
//!
//! Messages go through the Programmable Messaging REST API with a
//! `ContentSid` plus JSON `ContentVariables`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::notify::report::TemplateVariables;
use crate::services::{GatewayResponse, NotificationGateway};

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender identity, e.g. `whatsapp:+14155238886`.
    pub whatsapp_from: String,
    pub api_base: String,
}

pub struct TwilioGateway {
    config: TwilioConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    code: Option<u64>,
}

impl TwilioGateway {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

/// `whatsapp:` channel address for a plain E.164 number.
pub fn whatsapp_address(to: &str) -> String {
    let clean = to.replace("whatsapp:", "");
    format!("whatsapp:{}", clean.trim())
}

/// Maps an HTTP reply from the Messages endpoint onto a [`GatewayResponse`].
///
/// `body` is `None` when the reply body could not be read.
pub fn interpret_response(success: bool, status_code: u16, body: Option<&str>) -> GatewayResponse {
    if success {
        let Some(body) = body else {
            // accepted, sid unknown
            return GatewayResponse::Delivered {
                message_id: String::new(),
                status: status_code.to_string(),
            };
        };
        return match serde_json::from_str::<MessageResource>(body) {
            Ok(msg) => GatewayResponse::Delivered {
                message_id: msg.sid,
                status: msg.status,
            },
            Err(e) => GatewayResponse::Rejected {
                error: format!("Invalid Twilio response: {e}"),
            },
        };
    }

    let body = body.unwrap_or_default().trim();
    let error = match serde_json::from_str::<ApiError>(body) {
        Ok(ApiError { message, code }) => {
            if let Some(code) = code {
                debug!(code, status_code, "Twilio error code");
            }
            message
        }
        Err(_) if body.is_empty() => format!("Twilio API error {status_code}"),
        Err(_) => format!("Twilio API error {status_code}: {body}"),
    };
    GatewayResponse::Rejected { error }
}

#[async_trait]
impl NotificationGateway for TwilioGateway {
    async fn send_templated(
        &self,
        address: &str,
        template_id: &str,
        variables: &TemplateVariables,
    ) -> GatewayResponse {
        let content_variables = match variables.to_json() {
            Ok(json) => json,
            Err(e) => {
                return GatewayResponse::Rejected {
                    error: format!("Failed to encode content variables: {e}"),
                };
            }
        };
        let to = whatsapp_address(address);

        let form = [
            ("ContentSid", template_id),
            ("ContentVariables", content_variables.as_str()),
            ("From", self.config.whatsapp_from.as_str()),
            ("To", to.as_str()),
        ];

        let response = match self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, to = %to, "Twilio request failed");
                return GatewayResponse::Rejected {
                    error: format!("Twilio API request failed: {e}"),
                };
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(error = %e, status = %status, to = %to, "Failed to read Twilio response body");
                None
            }
        };
        let result = interpret_response(status.is_success(), status.as_u16(), body.as_deref());

        match &result {
            GatewayResponse::Delivered { message_id, status } => {
                debug!(message_id = %message_id, status = %status, to = %to, "Twilio message accepted");
            }
            GatewayResponse::Rejected { error } => {
                warn!(error = %error, to = %to, "Twilio message rejected");
            }
        }
        result
    }
}
