//! Integration tests exercising the bridge pipeline end-to-end against
//! a fake in-process consensus engine: real Unix sockets for the send
//! pool, a real TCP stream for block delivery, and a recording ledger
//! behind the support trait.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream, UnixListener, UnixStream};

use pontoon_bridge::{
    BridgeChain, BridgeConfig, BridgeContext, BridgeError, ChannelRole, Consenter,
    ConsenterSupport, Endpoints, SendPool,
};
use pontoon_messages::frame;
use pontoon_types::{
    Block, BlockData, BlockHeader, BlockMetadata, ChannelHeader, ConfigEnvelope, Envelope, Header,
    HeaderType, Payload,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_block(number: u64) -> Block {
    Block {
        header: BlockHeader {
            number,
            previous_hash: [number as u8; 32],
            data_hash: [0x22; 32],
        },
        data: BlockData {
            data: vec![vec![number as u8]],
        },
        metadata: BlockMetadata::default(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum LedgerEvent {
    Append(u64),
    ProcessConfig(u64),
}

/// Support implementation that records every ledger call.
struct RecordingSupport {
    channel_id: String,
    events: Arc<StdMutex<Vec<LedgerEvent>>>,
}

impl RecordingSupport {
    fn new(channel_id: &str) -> (Arc<Self>, Arc<StdMutex<Vec<LedgerEvent>>>) {
        let events = Arc::new(StdMutex::new(Vec::new()));
        let support = Arc::new(Self {
            channel_id: channel_id.to_string(),
            events: Arc::clone(&events),
        });
        (support, events)
    }
}

#[async_trait]
impl ConsenterSupport for RecordingSupport {
    fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn batch_timeout(&self) -> Duration {
        Duration::from_secs(2)
    }

    async fn append_block(&self, block: Block) -> Result<(), BridgeError> {
        self.events
            .lock()
            .unwrap()
            .push(LedgerEvent::Append(block.header.number));
        Ok(())
    }

    async fn process_config_block(&self, block: &Block) -> Result<(), BridgeError> {
        self.events
            .lock()
            .unwrap()
            .push(LedgerEvent::ProcessConfig(block.header.number));
        Ok(())
    }
}

/// Poll `events` until it matches `expected` or the timeout expires.
async fn wait_for_events(events: &StdMutex<Vec<LedgerEvent>>, expected: &[LedgerEvent]) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        {
            let seen = events.lock().unwrap();
            if seen.as_slice() == expected {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for ledger events; saw {:?}, wanted {:?}",
                *seen,
                expected
            );
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Fake engine endpoints: a Unix listener for control/pool connections
/// (counting accepts) and a TCP listener for the block stream.
struct FakeEngine {
    unix_listener: Arc<UnixListener>,
    accepted: Arc<AtomicUsize>,
    unix_conns: Arc<tokio::sync::Mutex<Vec<UnixStream>>>,
    tcp_listener: TcpListener,
}

impl FakeEngine {
    async fn bind(state_dir: &Path, pool_size: usize) -> (BridgeConfig, Self) {
        let tcp_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let recv_port = tcp_listener.local_addr().unwrap().port();
        let config = BridgeConfig {
            pool_size,
            recv_port,
            state_dir: state_dir.to_path_buf(),
            ..BridgeConfig::default()
        };
        let endpoints = Endpoints::derive(state_dir, recv_port);
        let unix_listener = Arc::new(UnixListener::bind(&endpoints.socket_path).unwrap());
        (
            config,
            Self {
                unix_listener,
                accepted: Arc::new(AtomicUsize::new(0)),
                unix_conns: Arc::new(tokio::sync::Mutex::new(Vec::new())),
                tcp_listener,
            },
        )
    }

    /// Accept Unix connections in the background, recording each one.
    /// The first accepted connection is the control connection, then the
    /// pool slots in dial order.
    fn spawn_unix_acceptor(&self) {
        let listener = Arc::clone(&self.unix_listener);
        let accepted = Arc::clone(&self.accepted);
        let conns = Arc::clone(&self.unix_conns);
        tokio::spawn(async move {
            while let Ok((conn, _)) = listener.accept().await {
                accepted.fetch_add(1, Ordering::SeqCst);
                conns.lock().await.push(conn);
            }
        });
    }

    async fn accept_recv_stream(&self) -> TcpStream {
        let (conn, _) = self.tcp_listener.accept().await.unwrap();
        conn
    }

    /// Wait until the acceptor has registered `count` Unix connections.
    async fn wait_for_unix_conns(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.unix_conns.lock().await.len() < count {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {count} engine connections"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn ready_marker(&self, config: &BridgeConfig) -> std::path::PathBuf {
        Endpoints::derive(&config.state_dir, config.recv_port).ready_marker
    }
}

fn write_marker(path: &Path) {
    std::fs::write(path, b"").unwrap();
}

async fn start_system_chain(
    config: BridgeConfig,
    support: Arc<dyn ConsenterSupport>,
) -> Arc<BridgeChain> {
    let ctx = BridgeContext::new(config);
    let consenter = Consenter::new(ctx);
    let chain = consenter.handle_chain(support, ChannelRole::System);
    chain.start().await.expect("system chain should start");
    chain
}

// ---------------------------------------------------------------------------
// 1. Pool framing (two concurrent submitters, per-slot contiguity)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submission_frames_stay_contiguous_per_slot() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("engine.sock");
    let listener = UnixListener::bind(&socket_path).unwrap();

    let control = UnixStream::connect(&socket_path).await.unwrap();
    let slot_a = UnixStream::connect(&socket_path).await.unwrap();
    let slot_b = UnixStream::connect(&socket_path).await.unwrap();
    let (_server_control, _) = listener.accept().await.unwrap();
    let (mut server_a, _) = listener.accept().await.unwrap();
    let (mut server_b, _) = listener.accept().await.unwrap();

    let pool = Arc::new(SendPool::new(control, vec![slot_a, slot_b]));
    assert_eq!(pool.size(), 2);

    // Eight concurrent submissions; round-robin puts four on each slot.
    let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 10]).collect();
    let mut tasks = Vec::new();
    for payload in payloads.clone() {
        let pool = Arc::clone(&pool);
        tasks.push(tokio::spawn(async move {
            pool.submit("c", false, &payload).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // Each slot's byte stream must parse into whole, uninterleaved
    // (channel, is_config, payload) triples.
    let mut seen = Vec::new();
    for server in [&mut server_a, &mut server_b] {
        for _ in 0..4 {
            let channel = frame::read_str(server).await.unwrap();
            let is_config = frame::read_bool(server).await.unwrap();
            let payload = frame::read_bytes(server).await.unwrap();
            assert_eq!(channel, "c");
            assert!(!is_config);
            assert_eq!(payload.len(), 10);
            seen.push(payload);
        }
    }
    seen.sort();
    let mut expected = payloads;
    expected.sort();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn submission_wire_layout_is_exact() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("engine.sock");
    let listener = UnixListener::bind(&socket_path).unwrap();

    let control = UnixStream::connect(&socket_path).await.unwrap();
    let slot = UnixStream::connect(&socket_path).await.unwrap();
    let (_server_control, _) = listener.accept().await.unwrap();
    let (mut server_slot, _) = listener.accept().await.unwrap();

    let pool = SendPool::new(control, vec![slot]);
    let payload = [0xABu8; 10];
    pool.submit("c", false, &payload).await.unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(&1u64.to_be_bytes());
    expected.push(b'c');
    expected.extend_from_slice(&1u64.to_be_bytes());
    expected.push(0x00);
    expected.extend_from_slice(&10u64.to_be_bytes());
    expected.extend_from_slice(&payload);

    let mut wire = vec![0u8; expected.len()];
    tokio::io::AsyncReadExt::read_exact(&mut server_slot, &mut wire)
        .await
        .unwrap();
    assert_eq!(wire, expected);
}

// ---------------------------------------------------------------------------
// 2. Channel registration on the control connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registration_sends_channel_id_and_timeout_nanos() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("engine.sock");
    let listener = UnixListener::bind(&socket_path).unwrap();

    let control = UnixStream::connect(&socket_path).await.unwrap();
    let slot = UnixStream::connect(&socket_path).await.unwrap();
    let (mut server_control, _) = listener.accept().await.unwrap();
    let (_server_slot, _) = listener.accept().await.unwrap();

    let pool = SendPool::new(control, vec![slot]);
    pool.register_channel("testchannel", Duration::from_millis(1500))
        .await
        .unwrap();

    assert_eq!(
        frame::read_str(&mut server_control).await.unwrap(),
        "testchannel"
    );
    assert_eq!(
        frame::read_u64(&mut server_control).await.unwrap(),
        1_500_000_000
    );
}

// ---------------------------------------------------------------------------
// 3. Receive dispatch (regular vs config blocks)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blocks_dispatch_by_type_tag() {
    let dir = tempfile::tempdir().unwrap();
    let (config, engine) = FakeEngine::bind(dir.path(), 2).await;
    engine.spawn_unix_acceptor();
    write_marker(&engine.ready_marker(&config));

    let (support, events) = RecordingSupport::new("testchannel");
    let _chain = start_system_chain(config, support).await;

    let mut stream = engine.accept_recv_stream().await;

    // Regular block, then — after it lands — a config block.
    frame::write_bytes(&mut stream, &make_block(1).to_bytes())
        .await
        .unwrap();
    frame::write_bytes(&mut stream, &[0x00]).await.unwrap();
    wait_for_events(&events, &[LedgerEvent::Append(1)]).await;

    frame::write_bytes(&mut stream, &make_block(2).to_bytes())
        .await
        .unwrap();
    frame::write_bytes(&mut stream, &[0x01]).await.unwrap();
    wait_for_events(
        &events,
        &[
            LedgerEvent::Append(1),
            LedgerEvent::ProcessConfig(2),
            LedgerEvent::Append(2),
        ],
    )
    .await;
}

#[tokio::test]
async fn malformed_block_is_skipped_and_stream_continues() {
    let dir = tempfile::tempdir().unwrap();
    let (config, engine) = FakeEngine::bind(dir.path(), 1).await;
    engine.spawn_unix_acceptor();
    write_marker(&engine.ready_marker(&config));

    let (support, events) = RecordingSupport::new("testchannel");
    let _chain = start_system_chain(config, support).await;

    let mut stream = engine.accept_recv_stream().await;

    // Garbage that is framed correctly but does not decode as a block.
    frame::write_bytes(&mut stream, &[0xDE, 0xAD, 0xBE, 0xEF])
        .await
        .unwrap();
    frame::write_bytes(&mut stream, &[0x00]).await.unwrap();

    // A valid block afterwards still gets through.
    frame::write_bytes(&mut stream, &make_block(3).to_bytes())
        .await
        .unwrap();
    frame::write_bytes(&mut stream, &[0x00]).await.unwrap();

    wait_for_events(&events, &[LedgerEvent::Append(3)]).await;
}

// ---------------------------------------------------------------------------
// 4. Bootstrap wait (no dials before the ready marker exists)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bootstrap_waits_for_ready_marker_before_dialing() {
    let dir = tempfile::tempdir().unwrap();
    let (config, engine) = FakeEngine::bind(dir.path(), 2).await;
    engine.spawn_unix_acceptor();

    let marker = engine.ready_marker(&config);
    let pool_size = config.pool_size;
    let (support, _events) = RecordingSupport::new("testchannel");

    let accepted = Arc::clone(&engine.accepted);
    let starter = tokio::spawn(async move { start_system_chain(config, support).await });

    // With no marker on disk, no connection may be attempted.
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(accepted.load(Ordering::SeqCst), 0);
    assert!(!starter.is_finished());

    // Create the marker ~1.2s in; bootstrap proceeds.
    tokio::time::sleep(Duration::from_millis(400)).await;
    write_marker(&marker);

    let chain = tokio::time::timeout(Duration::from_secs(5), starter)
        .await
        .expect("chain should start once the marker exists")
        .unwrap();

    // Control connection plus one per pool slot, and the marker is gone.
    assert_eq!(accepted.load(Ordering::SeqCst), 1 + pool_size);
    assert!(!marker.exists());
    chain.halt();
}

// ---------------------------------------------------------------------------
// 5. Submit paths through a started chain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn order_reaches_the_engine_pool() {
    let dir = tempfile::tempdir().unwrap();
    let (config, engine) = FakeEngine::bind(dir.path(), 1).await;
    engine.spawn_unix_acceptor();
    write_marker(&engine.ready_marker(&config));

    let (support, _events) = RecordingSupport::new("testchannel");
    let chain = start_system_chain(config, support).await;
    let _stream = engine.accept_recv_stream().await;

    let envelope = Envelope {
        payload: vec![1, 2, 3, 4],
        signature: vec![9],
    };
    chain.order(envelope.clone(), 0).await.unwrap();

    // Connection 0 is control, connection 1 the single pool slot.
    engine.wait_for_unix_conns(2).await;
    let mut conns = engine.unix_conns.lock().await;
    let slot = &mut conns[1];
    assert_eq!(frame::read_str(slot).await.unwrap(), "testchannel");
    assert!(!frame::read_bool(slot).await.unwrap());
    let wire = frame::read_bytes(slot).await.unwrap();
    assert_eq!(wire, envelope.to_bytes());
}

#[tokio::test]
async fn configure_forwards_the_inner_update_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let (config, engine) = FakeEngine::bind(dir.path(), 1).await;
    engine.spawn_unix_acceptor();
    write_marker(&engine.ready_marker(&config));

    let (support, _events) = RecordingSupport::new("testchannel");
    let chain = start_system_chain(config, support).await;
    let _stream = engine.accept_recv_stream().await;

    // A config message wrapping an update envelope with payload 0xCAFE.
    let update = Envelope {
        payload: vec![0xCA, 0xFE],
        signature: Vec::new(),
    };
    let config_envelope = ConfigEnvelope {
        config: Vec::new(),
        last_update: Some(update.clone()),
    };
    let channel_header = ChannelHeader {
        header_type: HeaderType::Config,
        channel_id: "testchannel".into(),
        tx_id: String::new(),
        epoch: 0,
    };
    let payload = Payload {
        header: Some(Header {
            channel_header: channel_header.to_bytes(),
            signature_header: Vec::new(),
        }),
        data: config_envelope.to_bytes(),
    };
    let outer = Envelope {
        payload: payload.to_bytes(),
        signature: Vec::new(),
    };

    chain.configure(outer, 0).await.unwrap();

    // The wire carries the inner update envelope, tagged as config —
    // not the outer envelope.
    engine.wait_for_unix_conns(2).await;
    let mut conns = engine.unix_conns.lock().await;
    let slot = &mut conns[1];
    assert_eq!(frame::read_str(slot).await.unwrap(), "testchannel");
    assert!(frame::read_bool(slot).await.unwrap());
    let wire = frame::read_bytes(slot).await.unwrap();
    assert_eq!(wire, update.to_bytes());
}

#[tokio::test]
async fn order_after_halt_reports_exiting() {
    let dir = tempfile::tempdir().unwrap();
    let (config, engine) = FakeEngine::bind(dir.path(), 1).await;
    engine.spawn_unix_acceptor();
    write_marker(&engine.ready_marker(&config));

    let (support, _events) = RecordingSupport::new("testchannel");
    let chain = start_system_chain(config, support).await;
    let _stream = engine.accept_recv_stream().await;

    chain.halt();
    let err = chain.order(Envelope::default(), 0).await.unwrap_err();
    assert!(matches!(err, BridgeError::Halted));
}

// ---------------------------------------------------------------------------
// 6. Non-system chains depend on the system channel's bootstrap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn application_chain_cannot_start_before_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = BridgeContext::new(BridgeConfig {
        state_dir: dir.path().to_path_buf(),
        ..BridgeConfig::default()
    });
    let consenter = Consenter::new(ctx);
    let (support, _events) = RecordingSupport::new("appchannel");
    let chain = consenter.handle_chain(support, ChannelRole::Application);

    let err = chain.start().await.unwrap_err();
    assert!(matches!(err, BridgeError::PoolNotReady));
}

#[tokio::test]
async fn application_chain_reuses_the_system_pool() {
    let dir = tempfile::tempdir().unwrap();
    let (config, engine) = FakeEngine::bind(dir.path(), 1).await;
    engine.spawn_unix_acceptor();
    write_marker(&engine.ready_marker(&config));

    let ctx = BridgeContext::new(config);
    let consenter = Consenter::new(Arc::clone(&ctx));

    let (sys_support, _) = RecordingSupport::new("syschannel");
    let system = consenter.handle_chain(sys_support, ChannelRole::System);
    system.start().await.unwrap();
    let _sys_stream = engine.accept_recv_stream().await;
    engine.wait_for_unix_conns(2).await;
    let dials_after_bootstrap = engine.accepted.load(Ordering::SeqCst);

    let (app_support, _) = RecordingSupport::new("appchannel");
    let app = consenter.handle_chain(app_support, ChannelRole::Application);
    app.start().await.unwrap();
    let _app_stream = engine.accept_recv_stream().await;

    // The application chain registered over the existing control
    // connection instead of dialing new IPC connections.
    assert_eq!(engine.accepted.load(Ordering::SeqCst), dials_after_bootstrap);

    engine.wait_for_unix_conns(2).await;
    let mut conns = engine.unix_conns.lock().await;
    let control = &mut conns[0];
    assert_eq!(frame::read_str(control).await.unwrap(), "syschannel");
    let _sys_timeout = frame::read_u64(control).await.unwrap();
    assert_eq!(frame::read_str(control).await.unwrap(), "appchannel");
    let _app_timeout = frame::read_u64(control).await.unwrap();
}
