//! Outbound email model.
//!
//! An [`Email`] can only be obtained through [`EmailBuilder::build`], which
//! validates it, so anything handed to the client is already well formed.

use crate::error::ClientError;
use crate::payload::{is_email_shaped, is_lane_id};
use serde::Serialize;
use std::collections::BTreeMap;

type Result<T> = std::result::Result<T, ClientError>;

/// A validated send request. Serializes to the body the API expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    from: String,
    to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lane_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &[String] {
        &self.to
    }

    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn lane_id(&self) -> Option<&str> {
        self.lane_id.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// All recipients across to, cc, and bcc.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmailBuilder {
    from: Option<String>,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    html: Option<String>,
    text: Option<String>,
    tag: Option<String>,
    lane_id: Option<String>,
    metadata: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
}

impl EmailBuilder {
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    pub fn to_many<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to.extend(recipients.into_iter().map(Into::into));
        self
    }

    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Tag echoed back on every webhook event for this message.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn lane_id(mut self, lane_id: impl Into<String>) -> Self {
        self.lane_id = Some(lane_id.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Email> {
        let from = self
            .from
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| invalid("sender is required"))?;
        check_address("sender", &from)?;

        if self.to.is_empty() {
            return Err(invalid("at least one recipient is required"));
        }
        for address in self.to.iter().chain(&self.cc).chain(&self.bcc) {
            check_address("recipient", address)?;
        }
        if let Some(reply_to) = &self.reply_to {
            check_address("reply-to", reply_to)?;
        }

        let subject = self
            .subject
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| invalid("subject cannot be empty"))?;

        let html = self.html.filter(|b| !b.trim().is_empty());
        let text = self.text.filter(|b| !b.trim().is_empty());
        if html.is_none() && text.is_none() {
            return Err(invalid("an html or text body is required"));
        }

        if let Some(lane_id) = &self.lane_id {
            if !is_lane_id(lane_id) {
                return Err(invalid(format!("invalid lane_id: {lane_id}")));
            }
        }

        Ok(Email {
            from,
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            reply_to: self.reply_to,
            subject,
            html,
            text,
            tag: self.tag,
            lane_id: self.lane_id,
            metadata: self.metadata,
            headers: self.headers,
        })
    }
}

fn invalid(message: impl Into<String>) -> ClientError {
    ClientError::Validation(message.into())
}

/// Accepts a bare address or `Display Name <address>`.
fn check_address(role: &str, value: &str) -> Result<()> {
    let address = match (value.rfind('<'), value.rfind('>')) {
        (Some(open), Some(close)) if open < close => &value[open + 1..close],
        _ => value,
    };
    if is_email_shaped(address.trim()) {
        Ok(())
    } else {
        Err(invalid(format!("invalid {role} address: {value}")))
    }
}
