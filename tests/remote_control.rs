//! Remote control over a real UDP socket on the loopback interface

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use deckscope::remote::message::MAX_DATAGRAM;
use deckscope::remote::{Arg, Message, Namespace, RemoteServer};
use deckscope::rig::{Rig, SharedRig};

fn start(ndeck: usize) -> (SharedRig, RemoteServer, UdpSocket) {
    let rig = Rig::new(ndeck).unwrap().into_shared();
    let loopback = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));

    let server = RemoteServer::start(loopback, rig.clone(), Namespace::new(ndeck)).unwrap();

    let client = UdpSocket::bind(loopback).unwrap();
    client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

    (rig, server, client)
}

fn send(client: &UdpSocket, server: &RemoteServer, path: &str, args: Vec<Arg>) {
    Message::new(path, args)
        .send_to(client, server.local_addr())
        .unwrap();
}

fn receive(client: &UdpSocket) -> Message {
    let mut buf = [0u8; MAX_DATAGRAM];
    let (len, _) = client.recv_from(&mut buf).unwrap();
    Message::decode(&buf[..len]).unwrap()
}

/// Ask for the position; messages are handled in order, so the reply
/// also means everything sent before it has been applied
fn position(client: &UdpSocket, server: &RemoteServer, deck: usize) -> f64 {
    send(
        client,
        server,
        &format!("/deck{}/position/get", deck),
        vec![Arg::Str("/position".into())],
    );
    let reply = receive(client);
    assert_eq!(reply.path, "/position");
    reply.args[0].as_f64().unwrap()
}

#[test]
fn test_cue_set_then_go() {
    let (rig, server, client) = start(2);
    rig.lock().deck_mut(0).unwrap().seek_to(3.25);

    send(&client, &server, "/deck1/cue/set", vec![Arg::Int(1)]);
    assert_eq!(position(&client, &server, 1), 3.25);

    rig.lock().deck_mut(0).unwrap().seek_to(60.0);
    send(&client, &server, "/deck1/cue/go", vec![Arg::Int(1)]);

    assert_eq!(position(&client, &server, 1), 3.25);
    assert_eq!(position(&client, &server, 2), 0.0);
}

#[test]
fn test_cue_unset_then_go_does_not_seek() {
    let (rig, server, client) = start(1);

    send(&client, &server, "/deck1/cue/set", vec![Arg::Int(4), Arg::Double(12.0)]);
    send(&client, &server, "/deck1/cue/unset", vec![Arg::Int(4)]);
    rig.lock().deck_mut(0).unwrap().seek_to(30.0);
    send(&client, &server, "/deck1/cue/go", vec![Arg::Int(4)]);

    assert_eq!(position(&client, &server, 1), 30.0);
}

#[test]
fn test_bpm_round_trip() {
    let (_rig, server, client) = start(1);

    // No beat interval yet: no reply, but the next query still answers
    send(&client, &server, "/deck1/bpm/get", vec![Arg::Str("/bpm".into())]);
    assert_eq!(position(&client, &server, 1), 0.0);

    send(&client, &server, "/deck1/bpm/set", vec![Arg::Float(123.5)]);
    send(&client, &server, "/deck1/bpm/get", vec![Arg::Str("/bpm".into())]);

    let reply = receive(&client);
    assert_eq!(reply.path, "/bpm");
    assert!((reply.args[0].as_f64().unwrap() - 123.5).abs() < 1e-9);
}

#[test]
fn test_mistyped_and_unknown_messages_are_ignored() {
    let (rig, server, client) = start(1);
    rig.lock().deck_mut(0).unwrap().seek_to(5.0);

    send(&client, &server, "/deck1/seek", vec![Arg::Str("half".into())]);
    send(&client, &server, "/deck1/pitch", vec![]);
    send(&client, &server, "/deck9/recue", vec![]);
    client.send_to(b"not a message", server.local_addr()).unwrap();

    assert_eq!(position(&client, &server, 1), 5.0);
    assert!(server.is_running());
}

#[test]
fn test_addressed_position_reply() {
    let (rig, server, client) = start(1);
    rig.lock().deck_mut(0).unwrap().seek_to(7.5);

    let listener = UdpSocket::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
    listener.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let port = listener.local_addr().unwrap().port();

    send(
        &client,
        &server,
        "/deck1/position/get",
        vec![
            Arg::Str("127.0.0.1".into()),
            Arg::Int(port as i32),
            Arg::Str("/at".into()),
            Arg::Str("tag".into()),
        ],
    );

    let reply = receive(&listener);
    assert_eq!(reply.path, "/at");
    assert_eq!(reply.args, vec![Arg::Double(7.5), Arg::Str("tag".into())]);
}
