use chrono::DateTime;
use serde::Deserialize;

use crate::app::{ClonerError, Result};
use crate::domain::{Item, ItemId, ItemKind, Updates};

/// Wire shape of `item/{id}.json`. Every field is optional upstream.
#[derive(Debug, Deserialize)]
struct RawItem {
    id: ItemId,
    #[serde(rename = "type")]
    kind: Option<String>,
    by: Option<String>,
    time: Option<i64>,
    text: Option<String>,
    url: Option<String>,
    score: Option<i64>,
    title: Option<String>,
    descendants: Option<u64>,
    kids: Option<Vec<ItemId>>,
    parts: Option<Vec<ItemId>>,
    parent: Option<ItemId>,
    poll: Option<ItemId>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    dead: bool,
}

/// Decodes upstream JSON bodies into domain types.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Decode an item body. Upstream answers `null` for ids it doesn't know.
    pub fn item(&self, id: ItemId, body: &[u8]) -> Result<Item> {
        let raw: Option<RawItem> = serde_json::from_slice(body)?;
        let raw = raw.ok_or_else(|| ClonerError::NotFound(format!("item {}", id)))?;

        if raw.id != id {
            return Err(ClonerError::MalformedResponse(format!(
                "requested item {} but got {}",
                id, raw.id
            )));
        }

        let kind = match raw.kind.as_deref() {
            Some("story") => ItemKind::Story {
                title: raw.title,
                url: raw.url,
                descendants: raw.descendants,
            },
            Some("job") => ItemKind::Job {
                title: raw.title,
                url: raw.url,
            },
            Some("poll") => ItemKind::Poll {
                title: raw.title,
                parts: raw.parts.unwrap_or_default(),
                descendants: raw.descendants,
            },
            Some("pollopt") => ItemKind::PollOpt { poll: raw.poll },
            Some("comment") => ItemKind::Comment { parent: raw.parent },
            Some(other) => {
                return Err(ClonerError::MalformedResponse(format!(
                    "item {} has unknown type '{}'",
                    id, other
                )))
            }
            None => {
                return Err(ClonerError::MalformedResponse(format!(
                    "item {} has no type",
                    id
                )))
            }
        };

        Ok(Item {
            id: raw.id,
            by: raw.by,
            time: raw.time.and_then(|t| DateTime::from_timestamp(t, 0)),
            text: raw.text,
            score: raw.score,
            kids: raw.kids.unwrap_or_default(),
            deleted: raw.deleted,
            dead: raw.dead,
            kind,
        })
    }

    /// Decode a feed body: an ordered list of item ids.
    pub fn ids(&self, feed: &str, body: &[u8]) -> Result<Vec<ItemId>> {
        let ids: Option<Vec<ItemId>> = serde_json::from_slice(body)?;
        ids.ok_or_else(|| ClonerError::NotFound(format!("feed {}", feed)))
    }

    pub fn updates(&self, body: &[u8]) -> Result<Updates> {
        let updates: Option<Updates> = serde_json::from_slice(body)?;
        Ok(updates.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story() {
        let body = br#"{
            "by": "dhouston", "descendants": 71, "id": 8863,
            "kids": [9224, 8917, 8884], "score": 104, "time": 1175714200,
            "title": "My YC app: Dropbox", "type": "story",
            "url": "http://www.getdropbox.com/u/2/screencast.html"
        }"#;
        let item = Normalizer::new().item(8863, body).unwrap();

        assert_eq!(item.by.as_deref(), Some("dhouston"));
        assert_eq!(item.kids, vec![9224, 8917, 8884]);
        assert_eq!(item.score, Some(104));
        assert_eq!(item.time.unwrap().timestamp(), 1175714200);
        assert_eq!(
            item.kind,
            ItemKind::Story {
                title: Some("My YC app: Dropbox".into()),
                url: Some("http://www.getdropbox.com/u/2/screencast.html".into()),
                descendants: Some(71),
            }
        );
    }

    #[test]
    fn test_poll_keeps_parts_order() {
        let body = br#"{"id": 126809, "type": "poll", "parts": [126812, 126810, 126811], "title": "Poll"}"#;
        let item = Normalizer::new().item(126809, body).unwrap();
        match item.kind {
            ItemKind::Poll { parts, .. } => assert_eq!(parts, vec![126812, 126810, 126811]),
            other => panic!("expected poll, got {:?}", other),
        }
    }

    #[test]
    fn test_deleted_comment() {
        let body = br#"{"id": 5, "type": "comment", "deleted": true, "time": 1}"#;
        let item = Normalizer::new().item(5, body).unwrap();
        assert!(item.deleted);
        assert!(item.is_hidden());
        assert!(item.kids.is_empty());
    }

    #[test]
    fn test_null_is_not_found() {
        let err = Normalizer::new().item(42, b"null").unwrap_err();
        assert!(matches!(err, ClonerError::NotFound(_)));
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let body = br#"{"id": 1, "type": "ad"}"#;
        let err = Normalizer::new().item(1, body).unwrap_err();
        assert!(matches!(err, ClonerError::MalformedResponse(_)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = Normalizer::new().item(1, b"<html>").unwrap_err();
        assert!(matches!(err, ClonerError::MalformedResponse(_)));

        let err = Normalizer::new().ids("topstories", br#"{"a":1}"#).unwrap_err();
        assert!(matches!(err, ClonerError::MalformedResponse(_)));
    }

    #[test]
    fn test_mismatched_id_is_malformed() {
        let body = br#"{"id": 2, "type": "story"}"#;
        let err = Normalizer::new().item(1, body).unwrap_err();
        assert!(matches!(err, ClonerError::MalformedResponse(_)));
    }

    #[test]
    fn test_ids_and_updates() {
        let n = Normalizer::new();
        assert_eq!(n.ids("topstories", b"[3, 1, 2]").unwrap(), vec![3, 1, 2]);

        let updates = n
            .updates(br#"{"items": [101, 99], "profiles": ["pg"]}"#)
            .unwrap();
        assert_eq!(updates.head(), Some(101));
        assert_eq!(updates.profiles, vec!["pg".to_string()]);

        assert_eq!(n.updates(b"null").unwrap().head(), None);
    }
}
