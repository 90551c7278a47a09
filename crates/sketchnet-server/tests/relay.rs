//! End-to-end tests over real sockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sketchnet_core::{Mirror, ShapeId, ShapeKind};
use sketchnet_server::{RelayState, serve};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn start() -> (SocketAddr, Arc<RelayState>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(RelayState::new());
    tokio::spawn(serve(listener, Arc::clone(&state)));
    (addr, state)
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    mirror: Mirror,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
            mirror: Mirror::new(),
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }

    /// Next line from the server, applied to the mirror.
    async fn recv(&mut self) -> String {
        let line = timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("server closed the connection");
        self.mirror.handle_line(&line).unwrap();
        line
    }

    /// Whether the server closed this connection.
    async fn closed(&mut self) -> bool {
        match timeout(WAIT, self.lines.next_line()).await {
            Ok(Ok(None)) | Ok(Err(_)) => true,
            Ok(Ok(Some(_))) | Err(_) => false,
        }
    }
}

/// Wait until the relay has registered `count` connections.
async fn wait_for_peers(state: &RelayState, count: usize) {
    timeout(WAIT, async {
        while state.peer_count() != count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("peers did not register");
}

#[tokio::test]
async fn test_new_shape_is_broadcast_with_assigned_id() {
    let (addr, state) = start().await;
    let mut a = Client::connect(addr).await;
    let mut b = Client::connect(addr).await;
    wait_for_peers(&state, 2).await;

    a.send("ellipse 10 10 50 50 -16777216 -1").await;
    assert_eq!(a.recv().await, "ellipse 10 10 50 50 -16777216 0");
    assert_eq!(b.recv().await, "ellipse 10 10 50 50 -16777216 0");

    let shape = b.mirror.sketch().get(ShapeId::new(0)).unwrap();
    assert_eq!(shape.kind(), ShapeKind::Ellipse);
    assert_eq!(shape.color().to_wire(), -16777216);
    assert_eq!(a.mirror.sketch(), b.mirror.sketch());
}

#[tokio::test]
async fn test_delete_then_id_is_not_reused() {
    let (addr, state) = start().await;
    let mut a = Client::connect(addr).await;
    let mut b = Client::connect(addr).await;
    wait_for_peers(&state, 2).await;

    a.send("ellipse 10 10 50 50 -16777216 -1").await;
    a.recv().await;
    b.recv().await;

    b.send("DELETE 0").await;
    assert_eq!(a.recv().await, "DELETE 0");
    assert_eq!(b.recv().await, "DELETE 0");
    assert!(a.mirror.sketch().is_empty());
    assert!(b.mirror.sketch().is_empty());

    a.send("rectangle 1 1 2 2 -16777216 -1").await;
    assert_eq!(a.recv().await, "rectangle 1 1 2 2 -16777216 1");
    assert_eq!(b.recv().await, "rectangle 1 1 2 2 -16777216 1");
}

#[tokio::test]
async fn test_concurrent_new_polylines_get_distinct_ids() {
    let (addr, state) = start().await;
    let mut a = Client::connect(addr).await;
    let mut b = Client::connect(addr).await;
    wait_for_peers(&state, 2).await;

    tokio::join!(
        a.send("polyline 0 0 5 5 9 9 -16777216 -1"),
        b.send("polyline 1 1 2 2 -16777216 -1"),
    );

    let first = a.recv().await;
    let second = a.recv().await;
    // Every client sees the same order
    assert_eq!(b.recv().await, first);
    assert_eq!(b.recv().await, second);

    let mut ids: Vec<u64> = a.mirror.sketch().ids().map(ShapeId::value).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1]);
    assert_eq!(a.mirror.sketch(), b.mirror.sketch());
}

#[tokio::test]
async fn test_late_joiner_receives_snapshot() {
    let (addr, state) = start().await;
    let mut a = Client::connect(addr).await;
    wait_for_peers(&state, 1).await;

    a.send("segment 0 0 10 10 -16777216 -1").await;
    a.send("rectangle 5 5 9 9 -16777216 -1").await;
    a.send("ellipse 1 1 4 4 -16777216 -1").await;
    a.send("DELETE 1").await;
    for _ in 0..4 {
        a.recv().await;
    }

    let mut late = Client::connect(addr).await;
    assert_eq!(late.recv().await, "segment 0 0 10 10 -16777216 0");
    assert_eq!(late.recv().await, "ellipse 1 1 4 4 -16777216 2");
    assert_eq!(late.mirror.sketch(), a.mirror.sketch());
}

#[tokio::test]
async fn test_malformed_line_drops_only_that_connection() {
    let (addr, state) = start().await;
    let mut good = Client::connect(addr).await;
    let mut bad = Client::connect(addr).await;
    wait_for_peers(&state, 2).await;

    bad.send("ellipse 1 2 three 4 -16777216 -1").await;
    assert!(bad.closed().await);
    wait_for_peers(&state, 1).await;

    good.send("segment 0 0 1 1 -16777216 -1").await;
    assert_eq!(good.recv().await, "segment 0 0 1 1 -16777216 0");
    assert_eq!(state.snapshot().unwrap().len(), 1);
}

#[tokio::test]
async fn test_disconnect_deregisters() {
    let (addr, state) = start().await;
    let a = Client::connect(addr).await;
    let mut b = Client::connect(addr).await;
    wait_for_peers(&state, 2).await;

    drop(a);
    wait_for_peers(&state, 1).await;

    b.send("DELETE 7").await;
    assert_eq!(b.recv().await, "DELETE 7");
}

#[tokio::test]
async fn test_half_closed_peer_still_gets_its_echo() {
    let (addr, state) = start().await;
    let mut a = Client::connect(addr).await;
    wait_for_peers(&state, 1).await;

    a.send("segment 0 0 10 10 -16777216 -1").await;
    a.writer.shutdown().await.unwrap();

    assert_eq!(a.recv().await, "segment 0 0 10 10 -16777216 0");
    assert!(a.closed().await);
    wait_for_peers(&state, 0).await;
}
