//! Socket.IO text packets over an Engine.IO v4 websocket.
//!
//! Only the subset the backend uses is modelled: the open handshake,
//! heartbeats, default-namespace connect/disconnect and plain events.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

/// Engine.IO open handshake payload.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
}

impl Handshake {
    /// Longest silence tolerated before the session counts as dead.
    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval + self.ping_timeout)
    }
}

fn default_ping_interval() -> u64 {
    25_000
}

fn default_ping_timeout() -> u64 {
    20_000
}

#[derive(Clone, Debug, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,
    /// Namespace connect acknowledged.
    Connect,
    Disconnect,
    ConnectError(String),
    Event { name: String, payload: Value },
    /// Acks and binary packets; the backend never sends them to this client.
    Unsupported(String),
}

/// Decode one websocket text frame.
pub fn decode(text: &str) -> Result<Packet> {
    let mut chars = text.chars();
    let engine = chars.next().ok_or_else(|| anyhow!("empty frame"))?;
    let rest = chars.as_str();
    match engine {
        '0' => {
            let handshake: Handshake =
                serde_json::from_str(rest).context("decode open handshake")?;
            Ok(Packet::Open(handshake))
        }
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket(rest),
        '6' => Ok(Packet::Noop),
        other => Ok(Packet::Unsupported(format!("engine packet {other}"))),
    }
}

fn decode_socket(text: &str) -> Result<Packet> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or_else(|| anyhow!("empty socket packet"))?;
    let rest = strip_namespace(chars.as_str());
    match kind {
        '0' => Ok(Packet::Connect),
        '1' => Ok(Packet::Disconnect),
        '2' => decode_event(rest),
        '4' => {
            let message = serde_json::from_str::<Value>(rest)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| rest.to_string());
            Ok(Packet::ConnectError(message))
        }
        other => Ok(Packet::Unsupported(format!("socket packet {other}"))),
    }
}

/// Skip an optional `/nsp,` prefix and a numeric ack id.
fn strip_namespace(text: &str) -> &str {
    let text = if text.starts_with('/') {
        match text.find(',') {
            Some(idx) => &text[idx + 1..],
            None => "",
        }
    } else {
        text
    };
    text.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn decode_event(text: &str) -> Result<Packet> {
    let value: Value = serde_json::from_str(text).context("decode event body")?;
    let Value::Array(mut parts) = value else {
        return Err(anyhow!("event body is not an array"));
    };
    if parts.is_empty() {
        return Err(anyhow!("event body is empty"));
    }
    let name = match parts.remove(0) {
        Value::String(name) => name,
        other => return Err(anyhow!("event name is not a string: {other}")),
    };
    let payload = if parts.is_empty() {
        Value::Null
    } else {
        parts.remove(0)
    };
    Ok(Packet::Event { name, payload })
}

/// Encode an outbound event; a `null` payload sends the bare verb.
pub fn encode_event(name: &str, payload: &Value) -> String {
    let body = if payload.is_null() {
        Value::Array(vec![Value::String(name.to_string())])
    } else {
        Value::Array(vec![Value::String(name.to_string()), payload.clone()])
    };
    format!("42{body}")
}

pub const CONNECT: &str = "40";
pub const PONG: &str = "3";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_open_handshake() {
        let packet = decode(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":5000}"#)
            .unwrap();
        match packet {
            Packet::Open(hs) => {
                assert_eq!(hs.sid, "abc");
                assert_eq!(hs.liveness_window(), Duration::from_millis(30_000));
            }
            other => panic!("unexpected packet {other:?}"),
        }
    }

    #[test]
    fn decodes_event_with_payload() {
        let packet = decode(r#"42["pushQueue",[{"uri":"a"}]]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "pushQueue".into(),
                payload: json!([{ "uri": "a" }]),
            }
        );
    }

    #[test]
    fn decodes_event_without_payload_as_null() {
        let packet = decode(r#"42["pushVersion"]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event { name: "pushVersion".into(), payload: Value::Null }
        );
    }

    #[test]
    fn decodes_namespaced_event_with_ack_id() {
        let packet = decode(r#"42/kiosk,7["pushState",{"status":"play"}]"#).unwrap();
        match packet {
            Packet::Event { name, payload } => {
                assert_eq!(name, "pushState");
                assert_eq!(payload["status"], "play");
            }
            other => panic!("unexpected packet {other:?}"),
        }
    }

    #[test]
    fn decodes_heartbeats_and_connect() {
        assert_eq!(decode("2").unwrap(), Packet::Ping);
        assert_eq!(decode("40").unwrap(), Packet::Connect);
        assert_eq!(decode(r#"40{"sid":"x"}"#).unwrap(), Packet::Connect);
        assert_eq!(decode("41").unwrap(), Packet::Disconnect);
    }

    #[test]
    fn connect_error_carries_message() {
        let packet = decode(r#"44{"message":"not authorized"}"#).unwrap();
        assert_eq!(packet, Packet::ConnectError("not authorized".into()));
    }

    #[test]
    fn rejects_malformed_event_bodies() {
        assert!(decode("42{}").is_err());
        assert!(decode("42[]").is_err());
        assert!(decode("42[1,2]").is_err());
        assert!(decode("").is_err());
    }

    #[test]
    fn encodes_events() {
        assert_eq!(encode_event("clearQueue", &Value::Null), r#"42["clearQueue"]"#);
        assert_eq!(
            encode_event("play", &json!({ "value": 3 })),
            r#"42["play",{"value":3}]"#
        );
    }
}
