//! Candidate-key rule tables for loosely structured records.
//!
//! Upstream chat records do not agree on field names: the prompt may live
//! under `prompt`, `message`, `user_message` or `content`, the creation time
//! under `createdAt` or `sentAt`, and so on. Rather than branching code, each
//! logical field is described by a [`FieldRule`]: an ordered list of key paths
//! tried in priority order. Supporting a new API shape means adding a path to
//! a table.
//!
//! A value counts as "present" only when it is truthy: non-null, non-empty
//! string, non-empty container, non-zero number or `true`.

use serde_json::Value;

/// A path of object keys, walked from the root of a record.
pub type KeyPath = &'static [&'static str];

/// An ordered list of candidate key paths for one logical field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Logical field name, used in log output.
    pub field: &'static str,
    /// Candidate paths, highest priority first.
    pub paths: &'static [KeyPath],
}

impl FieldRule {
    /// Returns the first present value along the candidate paths.
    pub fn first_value<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.paths
            .iter()
            .filter_map(|path| lookup(record, path))
            .find(|v| is_present(v))
    }

    /// Returns the first present scalar, rendered as a string.
    ///
    /// Containers are skipped so that a nested object under a candidate key
    /// never masquerades as text.
    pub fn first_string(&self, record: &Value) -> Option<String> {
        self.paths
            .iter()
            .filter_map(|path| lookup(record, path))
            .find_map(scalar_to_string)
    }
}

/// Walks `path` from `record`, returning the value at the end if every step exists.
pub fn lookup<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(record, |current, key| current.get(*key))
}

/// Truthiness of a JSON value.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Renders a present scalar as a string. Returns `None` for absent values and containers.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    if !is_present(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ============================================================================
// Raw export records (group metadata + chat record)
// ============================================================================

/// Raw group identifier on the group metadata.
pub const GROUP_ID: FieldRule = FieldRule {
    field: "group_id",
    paths: &[&["uuid"], &["id"], &["embed_uuid"], &["embedId"]],
};

/// Human-readable group name embedded in the group metadata.
pub const GROUP_NAME: FieldRule = FieldRule {
    field: "group_name",
    paths: &[&["workspace", "name"], &["workspace_name"], &["name"]],
};

/// Explicit identity on a raw chat record.
pub const RAW_ID: FieldRule = FieldRule {
    field: "raw_id",
    paths: &[&["id"], &["session_id"], &["uuid"], &["chat_id"]],
};

/// User-facing input text.
pub const PROMPT: FieldRule = FieldRule {
    field: "prompt",
    paths: &[&["prompt"], &["message"], &["user_message"], &["content"]],
};

/// Assistant output text.
pub const RESPONSE: FieldRule = FieldRule {
    field: "response",
    paths: &[&["response"], &["textResponse"], &["answer"], &["assistant"]],
};

/// Creation time of a raw chat record.
pub const CREATED: FieldRule = FieldRule {
    field: "created",
    paths: &[&["createdAt"], &["created_at"], &["sentAt"], &["timestamp"]],
};

/// Session identifier, top-level case variants.
pub const SESSION: FieldRule = FieldRule {
    field: "session_id",
    paths: &[
        &["session_id"],
        &["sessionId"],
        &["sessionuuid"],
        &["session_uuid"],
        &["sessionUuid"],
        &["session"],
        &["sessionid"],
    ],
};

/// Session identifier inside a nested object value.
pub const NESTED_SESSION: FieldRule = FieldRule {
    field: "session_id",
    paths: &[&["session_id"], &["sessionId"], &["sessionUuid"]],
};

/// Retrieval sources attached to a chat record.
pub const SOURCES: FieldRule = FieldRule {
    field: "sources",
    paths: &[&["sources"], &["source"]],
};

/// Page URL on the first retrieval source.
pub const PAGE_URL: FieldRule = FieldRule {
    field: "page_url",
    paths: &[&["url"], &["sourceDocument"]],
};

/// Textual keys of a raw chat record that contribute to its searchable text, in order.
pub const RAW_TEXT_KEYS: &[&str] = &[
    "message",
    "response",
    "content",
    "user_message",
    "assistant",
    "answer",
];

/// Collects the non-blank [`RAW_TEXT_KEYS`] strings of a raw record, trimmed.
pub fn raw_text_parts(raw: &Value) -> impl Iterator<Item = &str> {
    RAW_TEXT_KEYS
        .iter()
        .filter_map(move |key| raw.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ============================================================================
// Ingested JSONL records (search side)
// ============================================================================

/// Explicit identity on an ingested record.
pub const RECORD_ID: FieldRule = FieldRule {
    field: "record_id",
    paths: &[&["chat_id"], &["id"], &["session_id"], &["sessionId"]],
};

/// Chat id reported in detail rows. Never falls back to a session.
pub const RECORD_CHAT_ID: FieldRule = FieldRule {
    field: "chat_id",
    paths: &[&["chat_id"], &["id"]],
};

/// Group key on an ingested record.
pub const RECORD_GROUP: FieldRule = FieldRule {
    field: "group_key",
    paths: &[
        &["source", "embed_name"],
        &["source", "embedName"],
        &["source", "name"],
        &["groupKey"],
        &["group_key"],
        &["source", "embed_uuid"],
        &["source", "embedId"],
        &["connection", "name"],
        &["connection", "id"],
        &["connection", "uuid"],
        &["connection", "workspace", "name"],
    ],
};

/// Raw group identifier on an ingested record, used for composite ids.
pub const RECORD_GROUP_ID: FieldRule = FieldRule {
    field: "group_id",
    paths: &[
        &["source", "embed_uuid"],
        &["source", "embedId"],
        &["connection", "uuid"],
        &["connection", "id"],
    ],
};

/// Prompt on an ingested record, falling back into the embedded raw chat.
pub const RECORD_PROMPT: FieldRule = FieldRule {
    field: "prompt",
    paths: &[
        &["prompt"],
        &["message"],
        &["user_message"],
        &["content"],
        &["raw_chat", "prompt"],
        &["raw_chat", "message"],
        &["raw_chat", "user_message"],
        &["raw_chat", "content"],
        &["chat", "prompt"],
        &["chat", "message"],
        &["chat", "user_message"],
        &["chat", "content"],
    ],
};

/// Response on an ingested record.
pub const RECORD_RESPONSE: FieldRule = FieldRule {
    field: "response",
    paths: &[
        &["response"],
        &["text"],
        &["raw_chat", "response"],
        &["raw_chat", "textResponse"],
        &["chat", "response"],
    ],
};

/// Session id on an ingested record.
pub const RECORD_SESSION: FieldRule = FieldRule {
    field: "session_id",
    paths: &[
        &["session_id"],
        &["sessionId"],
        &["raw_chat", "session_id"],
        &["raw_chat", "sessionId"],
    ],
};

/// Creation time on an ingested record.
pub const RECORD_CREATED: FieldRule = FieldRule {
    field: "created_at",
    paths: &[
        &["created_at"],
        &["createdAt"],
        &["prompt_date"],
        &["timestamp"],
    ],
};

/// Translated text on an ingested record.
pub const RECORD_TRANSLATED: FieldRule = FieldRule {
    field: "translated",
    paths: &[
        &["translation", "translatedPrompt"],
        &["translated_prompt"],
        &["translated_text"],
    ],
};

/// Detected source language of a translation.
pub const RECORD_TRANSLATED_FROM: FieldRule = FieldRule {
    field: "translated_from",
    paths: &[
        &["translation", "fromLang"],
        &["translated_from"],
        &["language"],
    ],
};

/// Target language of a translation.
pub const RECORD_TRANSLATED_TO: FieldRule = FieldRule {
    field: "translated_to",
    paths: &[&["translation", "toLang"], &["translated_to"]],
};
