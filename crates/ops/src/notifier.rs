// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Welcome emails.
//!
//! A `WelcomeNotifier` receives the credentials of every created or rotated
//! registration. Delivery failures never undo the registration; the batch
//! only logs them.

use contestreg_domain::{Contest, IssuedCredentials};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::SendwithusSettings;

/// Sendwithus send endpoint.
pub const SENDWITHUS_SEND_URL: &str = "https://api.sendwithus.com/api/v1/send";

/// Timeout for one outbound email request.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Email request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Email service rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers credentials to a registrant.
pub trait WelcomeNotifier {
    /// Sends the welcome email for `credentials` in `contest`.
    ///
    /// # Errors
    ///
    /// Returns a `NotifyError` if delivery fails.
    fn send_welcome(
        &self,
        credentials: &IssuedCredentials,
        contest: &Contest,
    ) -> Result<(), NotifyError>;
}

/// Notifier used when no email service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

impl WelcomeNotifier for DisabledNotifier {
    fn send_welcome(
        &self,
        credentials: &IssuedCredentials,
        _contest: &Contest,
    ) -> Result<(), NotifyError> {
        debug!(username = %credentials.username, "Email delivery disabled, skipping");
        Ok(())
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TemplateData {
    pub contest_url: String,
    pub deadline: String,
    pub first_name: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub contest_short_name: String,
    pub from_name: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Recipient {
    pub address: String,
    pub name: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CopyAddress {
    pub address: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Sender {
    pub address: String,
    pub name: String,
    pub reply_to: String,
}

/// Body of a Sendwithus send request.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SendPayload {
    pub template: String,
    pub template_data: TemplateData,
    pub recipient: Recipient,
    pub sender: Sender,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<CopyAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<CopyAddress>,
}

fn address_list(addresses: &[String]) -> Vec<CopyAddress> {
    addresses
        .iter()
        .map(|address| CopyAddress {
            address: address.clone(),
        })
        .collect()
}

/// Builds the send request for one registrant.
///
/// The deadline is the contest end time string and the title is the contest
/// name.
#[must_use]
pub fn build_payload(
    settings: &SendwithusSettings,
    credentials: &IssuedCredentials,
    contest: &Contest,
) -> SendPayload {
    SendPayload {
        template: settings.template_id.clone(),
        template_data: TemplateData {
            contest_url: settings.contest_url.clone(),
            deadline: contest.end_time_string.clone(),
            first_name: credentials.display_name.clone(),
            title: contest.name.clone(),
            username: credentials.username.clone(),
            password: credentials.secret.expose().to_string(),
            contest_short_name: contest.short_name.clone(),
            from_name: settings.from_name.clone(),
        },
        recipient: Recipient {
            address: credentials.email.as_str().to_string(),
            name: credentials.display_name.clone(),
        },
        sender: Sender {
            address: settings.from.clone(),
            name: settings.from_name.clone(),
            reply_to: settings.reply_to.clone(),
        },
        cc: address_list(&settings.cc),
        bcc: address_list(&settings.bcc),
    }
}

/// Sends welcome emails through the Sendwithus HTTP API.
pub struct SendwithusNotifier {
    client: reqwest::blocking::Client,
    settings: SendwithusSettings,
    endpoint: String,
}

impl SendwithusNotifier {
    /// Creates a notifier posting to the public Sendwithus endpoint.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Client` if the HTTP client cannot be built.
    pub fn new(settings: SendwithusSettings) -> Result<Self, NotifyError> {
        Self::with_endpoint(settings, SENDWITHUS_SEND_URL)
    }

    /// Creates a notifier posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Client` if the HTTP client cannot be built.
    pub fn with_endpoint(
        settings: SendwithusSettings,
        endpoint: &str,
    ) -> Result<Self, NotifyError> {
        let client: reqwest::blocking::Client = reqwest::blocking::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(NotifyError::Client)?;
        Ok(Self {
            client,
            settings,
            endpoint: endpoint.to_string(),
        })
    }
}

impl WelcomeNotifier for SendwithusNotifier {
    fn send_welcome(
        &self,
        credentials: &IssuedCredentials,
        contest: &Contest,
    ) -> Result<(), NotifyError> {
        let payload: SendPayload = build_payload(&self.settings, credentials, contest);
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.settings.api_key, None::<&str>)
            .json(&payload)
            .send()
            .map_err(NotifyError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response.text().unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            username = %credentials.username,
            status = status.as_u16(),
            "Welcome email accepted"
        );
        Ok(())
    }
}
