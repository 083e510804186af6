use std::fmt;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::ACCEPT;
use serde::Deserialize;

/// Characters left alone by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const SENDING: &str = "Sending...";
const SENT: &str = "Message sent successfully!";
const SENT_DEMO: &str = "Thanks! Your message was sent (demo). I will get back to you soon.";
const MISSING_FIELDS: &str = "Please fill in all fields.";
const GENERIC_REJECTION: &str = "Oops! There was a problem.";
const NETWORK_ERROR: &str = "Oops! Network error. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Trimmed copy of the form, or an error when any field is empty.
    pub fn validate(&self) -> Result<ContactForm, ContactError> {
        let trimmed = ContactForm::new(self.name.trim(), self.email.trim(), self.message.trim());
        if trimmed.name.is_empty() || trimmed.email.is_empty() || trimmed.message.is_empty() {
            return Err(ContactError::MissingFields);
        }
        Ok(trimmed)
    }

    pub fn reset(&mut self) {
        *self = ContactForm::default();
    }

    fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("message", self.message.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    MissingFields,
    /// The relay answered with a non-success status.
    Rejected(String),
    /// The request never completed.
    Network(String),
}

impl fmt::Display for ContactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactError::MissingFields => f.write_str(MISSING_FIELDS),
            ContactError::Rejected(msg) => f.write_str(msg),
            ContactError::Network(_) => f.write_str(NETWORK_ERROR),
        }
    }
}

impl std::error::Error for ContactError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Muted,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub tone: Tone,
}

impl Status {
    fn new(message: impl Into<String>, tone: Tone) -> Self {
        Self { message: message.into(), tone }
    }
}

/// Delivers a contact message somewhere.
pub trait Relay {
    fn submit(&self, form: &ContactForm) -> Result<(), ContactError>;

    fn success_message(&self) -> &str {
        SENT
    }
}

/// Posts the form to a form-relay endpoint.
pub struct HttpRelay {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpRelay {
    pub fn new(endpoint: impl Into<String>) -> eyre::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { endpoint: endpoint.into(), client })
    }
}

impl Relay for HttpRelay {
    fn submit(&self, form: &ContactForm) -> Result<(), ContactError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .form(&form.fields())
            .send()
            .map_err(|e| {
                warn!("Contact request to {} failed: {}", self.endpoint, e);
                ContactError::Network(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            info!("Contact relay accepted message ({})", status);
            return Ok(());
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                debug!("Failed to read contact relay response body: {}", e);
                String::new()
            }
        };
        debug!("Contact relay returned {}: {}", status, body);
        Err(ContactError::Rejected(rejection_message(&body)))
    }
}

#[derive(Deserialize)]
struct RelayErrors {
    errors: Vec<RelayError>,
}

#[derive(Deserialize)]
struct RelayError {
    message: String,
}

/// Messages from an `{"errors": [{"message": ...}]}` body, joined by `", "`.
pub fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<RelayErrors>(body) {
        Ok(parsed) => parsed
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join(", "),
        Err(_) => GENERIC_REJECTION.to_string(),
    }
}

/// Stands in for a relay when no endpoint is configured.
pub struct SimulatedRelay {
    latency: Duration,
}

impl SimulatedRelay {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Relay for SimulatedRelay {
    fn submit(&self, _form: &ContactForm) -> Result<(), ContactError> {
        thread::sleep(self.latency);
        Ok(())
    }

    fn success_message(&self) -> &str {
        SENT_DEMO
    }
}

/// Validate and submit, reporting each status change. The form is cleared
/// on success and left as typed otherwise.
pub fn send(
    relay: &dyn Relay,
    form: &mut ContactForm,
    mut on_status: impl FnMut(&Status),
) -> Result<(), ContactError> {
    let clean = match form.validate() {
        Ok(clean) => clean,
        Err(e) => {
            on_status(&Status::new(e.to_string(), Tone::Error));
            return Err(e);
        }
    };

    on_status(&Status::new(SENDING, Tone::Muted));

    match relay.submit(&clean) {
        Ok(()) => {
            on_status(&Status::new(relay.success_message(), Tone::Success));
            form.reset();
            Ok(())
        }
        Err(e) => {
            on_status(&Status::new(e.to_string(), Tone::Error));
            Err(e)
        }
    }
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Prefilled `mailto:` link for the user's mail client.
pub fn mailto_url(recipient: &str, subject: &str, form: &ContactForm) -> String {
    let body = format!("From: {}\nEmail: {}\n\n{}", form.name, form.email, form.message);
    format!("mailto:{}?subject={}&body={}", recipient, encode(subject), encode(&body))
}
