//! Contact form validation and simulated delivery.
//!
//! Nothing is sent anywhere; a successful submission waits for the
//! configured delay and reports success.
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const MIN_NAME_LEN: usize = 2;
const MIN_MESSAGE_LEN: usize = 10;

pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Per-field messages; `None` means the field is fine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub subject: Option<&'static str>,
    pub message: Option<&'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.subject.is_none()
            && self.message.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Sent,
    Rejected(FormErrors),
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.name.trim().is_empty() {
            errors.name = Some("Name is required");
        } else if text_len(&self.name) < MIN_NAME_LEN {
            errors.name = Some("Name must be at least 2 characters");
        }

        if self.email.trim().is_empty() {
            errors.email = Some("Email is required");
        } else if !EMAIL.is_match(&self.email) {
            errors.email = Some("Please enter a valid email address");
        }

        if self.subject.trim().is_empty() {
            errors.subject = Some("Subject is required");
        }

        if self.message.trim().is_empty() {
            errors.message = Some("Message is required");
        } else if text_len(&self.message) < MIN_MESSAGE_LEN {
            errors.message = Some("Message must be at least 10 characters");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and pretend to deliver the message. The form is cleared
    /// only when it was accepted.
    pub async fn submit(&mut self, delay: Duration) -> Submission {
        if let Err(errors) = self.validate() {
            log::debug!("contact form rejected: {:?}", errors);
            return Submission::Rejected(errors);
        }

        tokio::time::sleep(delay).await;
        log::info!("contact message from {} accepted", self.email);
        *self = ContactForm::default();
        Submission::Sent
    }
}

/// Length in UTF-16 code units, the way the browser counts input length.
fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}
