use super::*;
use serde_json::json;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
    task::JoinHandle,
};

async fn bound() -> (TcpReplyTransport, SocketAddr) {
    let transport = TcpReplyTransport::bind("127.0.0.1:0").await.expect("bind");
    let addr = transport.local_addr().expect("addr");
    (transport, addr)
}

async fn client_sending(addr: SocketAddr, payload: &[u8]) -> TcpStream {
    let mut client = TcpStream::connect(addr).await.expect("connect");
    client.write_all(payload).await.expect("write");
    client
}

// Large payloads outgrow the socket buffers, so the writer must run alongside `receive`.
fn spawn_client(addr: SocketAddr, payload: Vec<u8>) -> JoinHandle<TcpStream> {
    tokio::spawn(async move {
        let mut client = TcpStream::connect(addr).await.expect("connect");
        let _ = client.write_all(&payload).await;
        client
    })
}

#[tokio::test]
async fn request_and_reply_round_trip_as_json_lines() {
    let (mut transport, addr) = bound().await;
    let client = client_sending(addr, b"{\"command\":\"reset\"}\n").await;

    let message = transport.receive().await.expect("receive");
    assert_eq!(message, json!({ "command": "reset" }));

    transport
        .send(&Response::closed())
        .await
        .expect("send");

    let mut reader = BufReader::new(client);
    let mut line = String::new();
    reader.read_line(&mut line).await.expect("read reply");
    let reply: Value = serde_json::from_str(&line).expect("json");
    assert_eq!(reply, json!({ "status": "closed" }));
}

#[tokio::test]
async fn send_without_request_is_rejected() {
    let (mut transport, _) = bound().await;
    let err = transport
        .send(&Response::environment_created())
        .await
        .expect_err("no pending request");
    assert!(matches!(err, TransportError::NoPendingRequest));
}

#[tokio::test]
async fn second_receive_before_reply_is_rejected() {
    let (mut transport, addr) = bound().await;
    let _client = client_sending(addr, b"{\"command\":\"reset\"}\n{\"command\":\"close\"}\n").await;

    transport.receive().await.expect("first receive");
    let err = transport.receive().await.expect_err("reply pending");
    assert!(matches!(err, TransportError::ReplyPending));
}

#[tokio::test]
async fn malformed_json_is_a_decode_fault() {
    let (mut transport, addr) = bound().await;
    let _client = client_sending(addr, b"{\"command\": \n").await;

    let err = transport.receive().await.expect_err("decode");
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn non_mapping_documents_are_rejected() {
    let (mut transport, addr) = bound().await;
    let _client = client_sending(addr, b"[\"reset\"]\n").await;

    let err = transport.receive().await.expect_err("not a mapping");
    assert!(matches!(err, TransportError::NotAMapping));
}

#[tokio::test]
async fn closed_peer_is_reported() {
    let (mut transport, addr) = bound().await;
    let client = TcpStream::connect(addr).await.expect("connect");
    drop(client);

    let err = transport.receive().await.expect_err("peer closed");
    assert!(matches!(err, TransportError::PeerClosed));
}

#[tokio::test]
async fn invalid_utf8_is_a_decode_fault() {
    let (mut transport, addr) = bound().await;
    let _client = client_sending(addr, b"{\"command\":\"\xff\"}\n").await;

    let err = transport.receive().await.expect_err("decode");
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn oversized_line_is_rejected_even_when_cut_mid_character() {
    let (mut transport, addr) = bound().await;
    let mut payload = vec![b'a'; MAX_MESSAGE_BYTES];
    payload.extend_from_slice("é".as_bytes());
    payload.extend_from_slice(b"aaaaaaaa");
    assert_eq!(payload.len(), MAX_MESSAGE_BYTES + 10);
    let _client = spawn_client(addr, payload);

    let err = transport.receive().await.expect_err("too large");
    assert!(matches!(
        err,
        TransportError::MessageTooLarge { limit } if limit == MAX_MESSAGE_BYTES
    ));
}

#[tokio::test]
async fn line_of_exactly_the_limit_is_accepted() {
    let (mut transport, addr) = bound().await;
    let head = b"{\"command\":\"reset\",\"pad\":\"";
    let tail = b"\"}";
    let mut payload = head.to_vec();
    payload.resize(MAX_MESSAGE_BYTES - tail.len(), b'x');
    payload.extend_from_slice(tail);
    assert_eq!(payload.len(), MAX_MESSAGE_BYTES);
    payload.push(b'\n');
    let client = spawn_client(addr, payload);

    let message = transport.receive().await.expect("receive at limit");
    assert_eq!(message["command"], json!("reset"));
    client.await.expect("client");
}
