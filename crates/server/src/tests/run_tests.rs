use super::*;
use crate::transport::TransportError;
use async_trait::async_trait;
use environment::SandboxFactory;
use serde_json::{json, Value};
use session::FaultKind;
use shared::protocol::Response;
use std::collections::VecDeque;

#[derive(Default)]
struct ScriptedTransport {
    inbox: VecDeque<Result<Value, TransportError>>,
    sent: Vec<Value>,
}

impl ScriptedTransport {
    fn with_messages(messages: impl IntoIterator<Item = Value>) -> Self {
        Self {
            inbox: messages.into_iter().map(Ok).collect(),
            sent: Vec::new(),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn receive(&mut self) -> Result<Value, TransportError> {
        self.inbox
            .pop_front()
            .unwrap_or(Err(TransportError::PeerClosed))
    }

    async fn send(&mut self, response: &Response) -> Result<(), TransportError> {
        self.sent
            .push(response.to_value().map_err(TransportError::Encode)?);
        Ok(())
    }
}

#[tokio::test]
async fn full_session_ends_after_close_reply() {
    let mut transport = ScriptedTransport::with_messages([
        json!({ "command": "new_environment", "level_name": "L1", "seed": 42 }),
        json!({ "command": "reset" }),
        json!({ "command": "step", "action": "1.0" }),
        json!({ "command": "close" }),
        json!({ "command": "reset" }),
    ]);
    let mut session = Session::new(SandboxFactory);

    let summary = serve(&mut transport, &mut session).await.expect("serve");
    assert_eq!(summary.exchanges, 4);
    assert_eq!(transport.sent.len(), 4);
    assert_eq!(transport.sent[0], json!({ "info": "Environment created." }));
    assert_eq!(transport.sent[1]["info"], Value::Null);
    assert!(transport.sent[1]["observation"].is_array());
    assert_eq!(transport.sent[2]["terminated"], json!(false));
    assert_eq!(transport.sent[2]["truncated"], json!(false));
    assert!(transport.sent[2]["reward"].is_number());
    assert_eq!(transport.sent[3], json!({ "status": "closed" }));
    assert_eq!(transport.inbox.len(), 1, "nothing is read after close");
}

#[tokio::test]
async fn step_before_new_environment_halts_without_reply() {
    let mut transport = ScriptedTransport::with_messages([
        json!({ "command": "step", "action": 1 }),
        json!({ "command": "new_environment", "level_name": "L1", "seed": 1 }),
    ]);
    let mut session = Session::new(SandboxFactory);

    let err = serve(&mut transport, &mut session)
        .await
        .expect_err("sequence fault");
    assert!(matches!(err, ServerError::Session(ref fault) if fault.kind() == FaultKind::Sequence));
    assert!(transport.sent.is_empty());
    assert_eq!(transport.inbox.len(), 1);
}

#[tokio::test]
async fn unknown_command_halts_after_earlier_replies() {
    let mut transport = ScriptedTransport::with_messages([
        json!({ "command": "new_environment", "level_name": "L1", "seed": 1 }),
        json!({ "command": "render" }),
    ]);
    let mut session = Session::new(SandboxFactory);

    let err = serve(&mut transport, &mut session)
        .await
        .expect_err("protocol fault");
    assert!(matches!(err, ServerError::Session(ref fault) if fault.kind() == FaultKind::Protocol));
    assert_eq!(transport.sent.len(), 1);
}

#[tokio::test]
async fn transport_faults_stop_the_loop() {
    let mut transport = ScriptedTransport {
        inbox: VecDeque::from([Err(TransportError::NotAMapping)]),
        sent: Vec::new(),
    };
    let mut session = Session::new(SandboxFactory);

    let err = serve(&mut transport, &mut session)
        .await
        .expect_err("transport fault");
    assert!(matches!(err, ServerError::Transport(TransportError::NotAMapping)));
}

#[tokio::test]
async fn coerced_actions_keep_the_session_running() {
    let mut transport = ScriptedTransport::with_messages([
        json!({ "command": "new_environment", "level_name": "L1", "seed": 3 }),
        json!({ "command": "reset" }),
        json!({ "command": "step", "action": "abc" }),
        json!({ "command": "step", "action": 2.7 }),
        json!({ "command": "close" }),
    ]);
    let mut session = Session::new(SandboxFactory);

    let summary = serve(&mut transport, &mut session).await.expect("serve");
    assert_eq!(summary.exchanges, 5);
    assert_eq!(transport.sent[2]["reward"], json!(0.0));
}
