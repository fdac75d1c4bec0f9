//! Wire protocol: a closed set of tagged JSON messages.
//!
//! Every frame is one JSON object with a `type` tag. Edits travel as bare
//! values keyed by room; only the late-join `sync` ever carries a full
//! state copy.

use serde::{Deserialize, Serialize};

use codepair_judge::{LanguageInfo, RunOutcome};

use crate::room::{Role, RoomSnapshot};

/// Messages received from clients.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join")]
    Join { room_id: String, role: Role },

    #[serde(rename = "code_edit")]
    CodeEdit { room_id: String, value: String },

    #[serde(rename = "language_edit")]
    LanguageEdit { room_id: String, value: String },

    #[serde(rename = "input_edit")]
    InputEdit { room_id: String, value: String },

    #[serde(rename = "run_submit")]
    RunSubmit {
        source: String,
        language_id: u32,
        #[serde(default)]
        stdin: String,
    },

    #[serde(rename = "run_status")]
    RunStatus { token: String },

    #[serde(rename = "language_list")]
    LanguageList,

    #[serde(rename = "completion")]
    Completion { code: String, language: String },

    #[serde(rename = "ping")]
    Ping,
}

/// Messages sent to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "joined")]
    Joined { room_id: String, role: Role },

    #[serde(rename = "sync")]
    Sync {
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        input: Option<String>,
    },

    #[serde(rename = "code_edit")]
    CodeEdit { value: String },

    #[serde(rename = "language_edit")]
    LanguageEdit { value: String },

    #[serde(rename = "input_edit")]
    InputEdit { value: String },

    #[serde(rename = "run_submitted")]
    RunSubmitted { token: String },

    #[serde(rename = "run_result")]
    RunResult {
        token: String,
        status_id: u32,
        status: String,
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        memory: Option<u64>,
    },

    #[serde(rename = "languages")]
    Languages { languages: Vec<LanguageInfo> },

    #[serde(rename = "completion")]
    Completion { suggestion: String },

    #[serde(rename = "pong")]
    Pong,

    #[serde(rename = "error")]
    Error { message: String },
}

impl From<RoomSnapshot> for ServerMessage {
    fn from(snapshot: RoomSnapshot) -> Self {
        ServerMessage::Sync {
            code: snapshot.code,
            language: snapshot.language,
            input: snapshot.input,
        }
    }
}

impl From<RunOutcome> for ServerMessage {
    fn from(outcome: RunOutcome) -> Self {
        ServerMessage::RunResult {
            token: outcome.token,
            status_id: outcome.status_id,
            status: outcome.status,
            output: outcome.output,
            time: outcome.time,
            memory: outcome.memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_parses_role() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"join","room_id":"r1","role":"viewer"}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Join { ref room_id, role: Role::Viewer } if room_id == "r1"
        ));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(
            r#"{"type":"join","room_id":"r1","role":"admin"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn edit_channels_share_shape() {
        for kind in ["code_edit", "language_edit", "input_edit"] {
            let json = format!(r#"{{"type":"{kind}","room_id":"r1","value":"x"}}"#);
            assert!(serde_json::from_str::<ClientMessage>(&json).is_ok(), "{kind}");
        }
    }

    #[test]
    fn run_submit_defaults_stdin() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"run_submit","source":"print(1)","language_id":71}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::RunSubmit {
                source,
                language_id,
                stdin,
            } => {
                assert_eq!(source, "print(1)");
                assert_eq!(language_id, 71);
                assert!(stdin.is_empty());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"shutdown"}"#).is_err());
    }

    #[test]
    fn sync_omits_absent_fields() {
        let msg = ServerMessage::from(RoomSnapshot {
            code: Some("x = 1".into()),
            language: None,
            input: None,
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"sync","code":"x = 1"}"#);
    }

    #[test]
    fn run_result_from_outcome() {
        let msg = ServerMessage::from(RunOutcome {
            token: "tok".into(),
            status_id: 3,
            status: "Accepted".into(),
            output: "1\n".into(),
            time: Some("0.002".into()),
            memory: Some(3164),
        });
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "run_result");
        assert_eq!(json["status_id"], 3);
        assert_eq!(json["output"], "1\n");
        assert_eq!(json["memory"], 3164);
    }

    #[test]
    fn run_result_omits_missing_metrics() {
        let msg = ServerMessage::RunResult {
            token: "tok".into(),
            status_id: 2,
            status: "Processing".into(),
            output: String::new(),
            time: None,
            memory: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("time"));
        assert!(!json.contains("memory"));
    }

    #[test]
    fn server_tags_are_stable() {
        let joined = ServerMessage::Joined {
            room_id: "r1".into(),
            role: Role::Editor,
        };
        let json: serde_json::Value = serde_json::to_value(&joined).unwrap();
        assert_eq!(json["type"], "joined");
        assert_eq!(json["role"], "editor");

        let json: serde_json::Value = serde_json::to_value(&ServerMessage::Pong).unwrap();
        assert_eq!(json["type"], "pong");
    }
}
