// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Frame codec tests over a real TCP connection.

use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};

use algohost_protocol::{InboundMessage, OutboundMessage, read_frame, write_frame};

#[tokio::test]
async fn test_messages_survive_tcp_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        // Orchestrator sends a command, then reads the runner's events.
        let command = serde_json::to_vec(&json!({"command": "start", "data": null})).unwrap();
        write_frame(&mut stream, &command).await.unwrap();

        let started = read_frame(&mut stream).await.unwrap();
        let done = read_frame(&mut stream).await.unwrap();
        (started, done)
    });

    let mut client = TcpStream::connect(addr).await.unwrap();

    let payload = read_frame(&mut client).await.unwrap();
    let inbound = InboundMessage::decode(&payload).unwrap();
    assert_eq!(inbound.command.to_string(), "start");

    write_frame(&mut client, &OutboundMessage::started().encode().unwrap())
        .await
        .unwrap();
    write_frame(
        &mut client,
        &OutboundMessage::done(json!({"sum": 3})).encode().unwrap(),
    )
    .await
    .unwrap();

    let (started, done) = server.await.unwrap();
    let started: Value = serde_json::from_slice(&started).unwrap();
    let done: Value = serde_json::from_slice(&done).unwrap();
    assert_eq!(started, json!({"command": "started"}));
    assert_eq!(done, json!({"command": "done", "data": {"sum": 3}}));
}

#[tokio::test]
async fn test_large_payload_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // 1 MB of opaque algorithm payload
    let blob: String = "x".repeat(1024 * 1024);
    let expected = blob.clone();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_frame(&mut stream).await.unwrap()
    });

    let mut client = TcpStream::connect(addr).await.unwrap();
    let message = OutboundMessage::done(json!({"blob": blob})).encode().unwrap();
    write_frame(&mut client, &message).await.unwrap();

    let payload = server.await.unwrap();
    let value: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(value["data"]["blob"].as_str().unwrap(), expected);
}
