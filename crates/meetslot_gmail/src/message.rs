// --- File: crates/meetslot_gmail/src/message.rs ---
//! RFC 2822 encoding for plain-text mail sent through the Gmail API.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use chrono::{DateTime, Utc};
use meetslot_common::services::EmailMessage;

use crate::service::GmailError;

const BODY_LINE_LENGTH: usize = 76;

/// Renders `message` as an RFC 2822 document with a base64 UTF-8 body.
pub fn build_rfc2822(message: &EmailMessage, date: DateTime<Utc>) -> Result<String, GmailError> {
    for (name, value) in [
        ("From", &message.from),
        ("To", &message.to),
        ("Subject", &message.subject),
    ] {
        if value.contains(['\r', '\n']) {
            return Err(GmailError::InvalidMessage(format!(
                "{} header contains a line break",
                name
            )));
        }
    }

    let mut out = String::new();
    out.push_str(&format!("From: {}\r\n", message.from));
    out.push_str(&format!("To: {}\r\n", message.to));
    out.push_str(&format!("Subject: {}\r\n", encode_header(&message.subject)));
    out.push_str(&format!("Date: {}\r\n", date.to_rfc2822()));
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n");
    out.push_str("Content-Transfer-Encoding: base64\r\n");
    out.push_str("\r\n");

    let body = normalize_line_endings(&message.body);
    let encoded = STANDARD.encode(body.as_bytes());
    // base64 output is ASCII, so byte chunks are valid str slices
    for chunk in encoded.as_bytes().chunks(BODY_LINE_LENGTH) {
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
    Ok(out)
}

/// The `raw` field of a Gmail send request.
pub fn encode_raw(message: &EmailMessage, date: DateTime<Utc>) -> Result<String, GmailError> {
    Ok(URL_SAFE.encode(build_rfc2822(message, date)?.as_bytes()))
}

/// RFC 2047 encoded-word for non-ASCII header values.
pub fn encode_header(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn normalize_line_endings(body: &str) -> String {
    body.replace("\r\n", "\n").replace('\n', "\r\n")
}
