//! Interaction fingerprinting for stable record ids

use sha2::{Digest, Sha256};

use crate::interaction::{HttpExchange, Interaction, MessageEnvelope, MessageKind};
use crate::options::ResolvedOptions;

/// Compute the SHA-256 fingerprint of a documented interaction
///
/// The fingerprint includes:
/// 1. Interaction content (method, path, query, headers, bodies / kind,
///    topic, event, ref, join ref, payload)
/// 2. Originating module, file and line
///
/// Query parameters and headers are order independent; header names are
/// case-insensitive.
#[must_use]
pub fn fingerprint(interaction: &Interaction, options: &ResolvedOptions) -> [u8; 32] {
    let mut hasher = Sha256::new();

    match interaction {
        Interaction::Http(exchange) => hash_exchange(&mut hasher, exchange),
        Interaction::Message(envelope) => hash_envelope(&mut hasher, envelope),
    }

    update_field(&mut hasher, options.module.as_bytes());
    update_field(&mut hasher, options.file.as_bytes());
    hasher.update(options.line.to_le_bytes());

    hasher.finalize().into()
}

/// Short hex form of a fingerprint, for logs and anchors
#[must_use]
pub fn short_id(id: &[u8; 32]) -> String {
    hex::encode(&id[..8])
}

fn hash_exchange(hasher: &mut Sha256, exchange: &HttpExchange) {
    let request = &exchange.request;
    hasher.update(b"http");

    // Method (uppercase normalized)
    update_field(hasher, request.method.to_uppercase().as_bytes());
    update_field(hasher, normalize_path(&request.path).as_bytes());

    // Query parameters (sorted)
    let mut query = request.query.clone();
    query.sort();
    for (key, value) in &query {
        update_field(hasher, key.as_bytes());
        update_field(hasher, value.as_bytes());
    }

    update_headers(hasher, &request.headers);
    update_field(hasher, &request.body);

    let response = &exchange.response;
    hasher.update(response.status.to_le_bytes());
    update_headers(hasher, &response.headers);
    update_field(hasher, &response.body);
}

fn hash_envelope(hasher: &mut Sha256, envelope: &MessageEnvelope) {
    hasher.update(b"message");
    hasher.update([kind_tag(envelope.kind)]);
    update_field(hasher, envelope.topic.as_bytes());
    update_field(hasher, envelope.event.as_bytes());
    update_optional(hasher, envelope.reference.as_deref());
    update_optional(hasher, envelope.join_ref.as_deref());
    update_field(hasher, envelope.payload.to_string().as_bytes());
}

fn kind_tag(kind: MessageKind) -> u8 {
    match kind {
        MessageKind::Push => 0,
        MessageKind::Broadcast => 1,
        MessageKind::BroadcastFrom => 2,
        MessageKind::Reply => 3,
    }
}

/// Absent and empty values hash differently
fn update_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update([1u8]);
            update_field(hasher, value.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

/// Headers sorted and normalized
fn update_headers(hasher: &mut Sha256, headers: &[(String, String)]) {
    let mut headers: Vec<(String, &str)> = headers
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value.trim()))
        .collect();
    headers.sort();
    for (name, value) in &headers {
        update_field(hasher, name.as_bytes());
        update_field(hasher, value.as_bytes());
    }
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u32).to_le_bytes());
    hasher.update(bytes);
}

/// Normalize a URL path
fn normalize_path(path: &str) -> String {
    // Remove leading/trailing whitespace
    let trimmed = path.trim();

    // Ensure leading slash
    if trimmed.is_empty() || !trimmed.starts_with('/') {
        format!("/{trimmed}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{HttpRequest, HttpResponse};
    use crate::options::Description;
    use serde_json::json;

    fn test_exchange() -> HttpExchange {
        HttpExchange::new(
            HttpRequest {
                method: "GET".to_string(),
                path: "/api/test".to_string(),
                query: vec![],
                headers: vec![],
                body: vec![],
            },
            HttpResponse {
                status: 200,
                headers: vec![],
                body: vec![],
            },
        )
    }

    fn test_options() -> ResolvedOptions {
        ResolvedOptions {
            description: Description::Text("lists widgets".to_string()),
            group_title: None,
            module: "WidgetTest".to_string(),
            file: "tests/widget.rs".to_string(),
            line: 10,
        }
    }

    fn id_of(exchange: HttpExchange) -> [u8; 32] {
        fingerprint(&Interaction::Http(exchange), &test_options())
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(id_of(test_exchange()), id_of(test_exchange()));
    }

    #[test]
    fn test_fingerprint_different_paths() {
        let mut other = test_exchange();
        other.request.path = "/api/v2".to_string();

        assert_ne!(id_of(test_exchange()), id_of(other));
    }

    #[test]
    fn test_header_order_and_case_independence() {
        let mut ex1 = test_exchange();
        ex1.request.headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];

        let mut ex2 = test_exchange();
        ex2.request.headers = vec![
            ("accept".to_string(), " application/json".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ];

        assert_eq!(id_of(ex1), id_of(ex2));
    }

    #[test]
    fn test_query_order_independence() {
        let mut ex1 = test_exchange();
        ex1.request.query = vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ];

        let mut ex2 = test_exchange();
        ex2.request.query = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ];

        assert_eq!(id_of(ex1), id_of(ex2));
    }

    #[test]
    fn test_call_site_changes_fingerprint() {
        let interaction = Interaction::Http(test_exchange());
        let mut moved = test_options();
        moved.line = 11;

        assert_ne!(
            fingerprint(&interaction, &test_options()),
            fingerprint(&interaction, &moved)
        );
    }

    #[test]
    fn test_message_fingerprint() {
        let push = MessageEnvelope::push("room:1", "new_msg", json!({"body": "hi"}), "1");
        let other = MessageEnvelope::push("room:1", "new_msg", json!({"body": "yo"}), "1");

        assert_ne!(
            fingerprint(&push.into(), &test_options()),
            fingerprint(&other.into(), &test_options())
        );
    }

    #[test]
    fn test_message_kind_changes_fingerprint() {
        let broadcast = MessageEnvelope::broadcast("room:1", "typing", json!({}));
        let broadcast_from = MessageEnvelope::broadcast_from("room:1", "typing", json!({}));

        assert_ne!(
            fingerprint(&broadcast.into(), &test_options()),
            fingerprint(&broadcast_from.into(), &test_options())
        );
    }

    #[test]
    fn test_join_ref_changes_fingerprint() {
        let push = MessageEnvelope::push("room:1", "new_msg", json!({}), "2");
        let joined = push.clone().with_join_ref(Some("1".to_string()));
        let empty = push.clone().with_join_ref(Some(String::new()));

        let ids: Vec<[u8; 32]> = [push, joined, empty]
            .into_iter()
            .map(|envelope| fingerprint(&envelope.into(), &test_options()))
            .collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[0], ids[2]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn test_short_id() {
        let id = id_of(test_exchange());
        assert_eq!(short_id(&id).len(), 16);
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(normalize_path("/api/test"), "/api/test");
        assert_eq!(normalize_path("api/test"), "/api/test");
        assert_eq!(normalize_path("  /api/test  "), "/api/test");
        assert_eq!(normalize_path(""), "/");
    }
}
