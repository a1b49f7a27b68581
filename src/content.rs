//! Shared, institution-agnostic helpers for picking apart a fetched mail
//! message: body part selection, transfer/charset decoding, subject
//! decoding and timestamp resolution.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDateTime};
use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ExtractError, ExtractResult};
use crate::source::{MessagePart, RawMessage};

/// RFC 2047 encoded word: `=?charset?B|Q?payload?=`
static ENCODED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"=\?([^?]+)\?([bBqQ])\?([^?]*)\?=").unwrap());

/// Selects the `text/plain` part of a message, or its sole part when the
/// message is not multipart.
pub fn text_part<M: RawMessage>(message: &M) -> Option<&MessagePart> {
    part_of_kind(message, "text/plain")
}

/// Selects the first part of the given content kind, or the sole part of a
/// single-part message regardless of kind.
pub fn part_of_kind<'m, M: RawMessage>(message: &'m M, kind: &str) -> Option<&'m MessagePart> {
    if message.is_multipart() {
        message
            .parts()
            .iter()
            .find(|part| part.content_type.starts_with(kind))
    } else {
        message.parts().first()
    }
}

/// Fully decodes a message part: undoes the base64 transfer encoding when
/// present, then decodes the declared character set (UTF-8 when none is
/// declared).
pub fn decode_part(part: &MessagePart) -> ExtractResult<String> {
    let bytes = if part.transfer_base64 {
        // transfer-encoded bodies are line-wrapped
        let compact: Vec<u8> = part
            .body
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        BASE64.decode(compact)?
    } else {
        part.body.clone()
    };

    let label = part.charset.as_deref().unwrap_or("utf-8");
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| ExtractError::UnknownCharset(label.to_string()))?;
    let (text, _, _) = encoding.decode(&bytes);
    Ok(text.into_owned())
}

/// Decodes the `Subject` header, resolving RFC 2047 encoded words. A
/// missing header decodes to an empty string so subject matching simply
/// fails to match.
pub fn decode_subject<M: RawMessage>(message: &M) -> ExtractResult<String> {
    match message.subject() {
        Some(raw) => decode_encoded_words(raw),
        None => Ok(String::new()),
    }
}

/// Resolves the message's own send timestamp from the `Date` header.
pub fn message_date<M: RawMessage>(message: &M) -> Option<NaiveDateTime> {
    let raw = message.date()?;
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|date| date.naive_local())
}

/// Replaces every RFC 2047 encoded word in `raw` with its decoded text.
/// Whitespace between two adjacent encoded words is transparent, per the
/// RFC.
pub(crate) fn decode_encoded_words(raw: &str) -> ExtractResult<String> {
    let mut out = String::new();
    let mut last = 0usize;
    let mut previous_was_word = false;

    for caps in ENCODED_WORD.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };

        let gap = &raw[last..whole.start()];
        if !(previous_was_word && gap.chars().all(char::is_whitespace)) {
            out.push_str(gap);
        }

        let charset = &caps[1];
        let payload = &caps[3];
        let bytes = match &caps[2] {
            "B" | "b" => BASE64.decode(payload)?,
            _ => q_decode(payload),
        };

        let encoding = Encoding::for_label(charset.as_bytes())
            .ok_or_else(|| ExtractError::UnknownCharset(charset.to_string()))?;
        let (text, _, _) = encoding.decode(&bytes);
        out.push_str(&text);

        last = whole.end();
        previous_was_word = true;
    }

    out.push_str(&raw[last..]);
    Ok(out)
}

/// Q-encoding (RFC 2047 variant of quoted-printable): `_` is a space,
/// `=XX` is a hex-escaped byte.
fn q_decode(payload: &str) -> Vec<u8> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                out.push(b' ');
                i += 1;
            }
            b'=' if i + 2 < bytes.len() => {
                match std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'=');
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FetchedMail;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[test]
    fn test_text_part_prefers_plain_in_multipart() {
        let mail = FetchedMail::new(1)
            .with_part(MessagePart::text_html("<p>html</p>"))
            .with_part(MessagePart::text_plain("plain"));
        let part = text_part(&mail).unwrap();
        assert_eq!(part.body, b"plain");
    }

    #[test]
    fn test_text_part_falls_back_to_sole_part() {
        let mail = FetchedMail::new(1).with_part(MessagePart::text_html("<p>only</p>"));
        // single-part message is taken as-is, whatever its kind
        assert!(text_part(&mail).is_some());
    }

    #[test]
    fn test_decode_part_plain_utf8() {
        let part = MessagePart::text_plain("částka 100,00 CZK");
        assert_eq!(decode_part(&part).unwrap(), "částka 100,00 CZK");
    }

    #[test]
    fn test_decode_part_base64_with_charset() {
        // "částka" in windows-1250, base64 with a line wrap in the middle
        let part = MessagePart::new("text/plain", b"6OFz\r\ndGth".to_vec())
            .with_charset("windows-1250")
            .base64_encoded();
        assert_eq!(decode_part(&part).unwrap(), "částka");
    }

    #[test]
    fn test_decode_part_broken_base64() {
        let part = MessagePart::new("text/plain", b"@@@@".to_vec()).base64_encoded();
        assert!(matches!(
            decode_part(&part),
            Err(ExtractError::TransferEncoding(_))
        ));
    }

    #[test]
    fn test_decode_part_unknown_charset() {
        let part = MessagePart::text_plain("text").with_charset("x-nonsense");
        assert!(matches!(
            decode_part(&part),
            Err(ExtractError::UnknownCharset(_))
        ));
    }

    #[rstest]
    #[case("plain subject", "plain subject")]
    #[case("=?UTF-8?B?QXbDrXpv?=", "Avízo")]
    #[case("=?utf-8?q?Av=C3=ADzo_o_platb=C4=9B?=", "Avízo o platbě")]
    #[case("Info 24 - =?UTF-8?B?QXbDrXpv?=", "Info 24 - Avízo")]
    // whitespace between two encoded words is transparent
    #[case("=?UTF-8?B?QXbDrXpv?= =?UTF-8?B?QXbDrXpv?=", "AvízoAvízo")]
    fn test_decode_encoded_words(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(decode_encoded_words(raw).unwrap(), expected);
    }

    #[test]
    fn test_decode_subject_of_message() {
        let mail = FetchedMail::new(1).with_subject("=?UTF-8?B?QXbDrXpv?=");
        assert_eq!(decode_subject(&mail).unwrap(), "Avízo");

        let bare = FetchedMail::new(2);
        assert_eq!(decode_subject(&bare).unwrap(), "");
    }

    #[test]
    fn test_message_date() {
        let mail = FetchedMail::new(1).with_date("Fri, 15 Mar 2024 12:30:00 +0100");
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(message_date(&mail), Some(expected));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("not a date at all"))]
    fn test_message_date_unparsable(#[case] raw: Option<&str>) {
        let mut mail = FetchedMail::new(1);
        if let Some(raw) = raw {
            mail = mail.with_date(raw);
        }
        assert_eq!(message_date(&mail), None);
    }
}
