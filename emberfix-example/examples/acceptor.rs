//! FIX counterparty example.
//!
//! A small tokio server that plays the acceptor side for the `initiator`
//! example: it answers Logon and TestRequest, sends its own heartbeats and
//! logs everything else.
use bytes::BytesMut;
use emberfix_core::tags;
use emberfix_core::{MsgType, SeqNum, Timestamp};
use emberfix_tagvalue::{Message, MessageWriter};
use emberfix_transport::FixCodec;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Decoder;
use tracing::{debug, error, info, warn};
mod common;
use common::{ExampleConfig, FIX_VERSION, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::server();
    info!("Starting {} counterparty on {}", FIX_VERSION, cfg.addr());
    let listener = TcpListener::bind(&cfg.addr()).await?;
    loop {
        let (socket, addr) = listener.accept().await?;
        info!("Connection from {}", addr);
        let cfg = cfg.clone();
        tokio::spawn(async move {
            if let Err(e) = handle(socket, cfg).await {
                error!("Error: {}", e);
            }
        });
    }
}

/// Per-connection counterparty state.
struct Counterparty {
    cfg: ExampleConfig,
    writer: MessageWriter,
    outbound_seq: SeqNum,
    heartbeat_interval: Option<Duration>,
}

impl Counterparty {
    fn new(cfg: ExampleConfig) -> Self {
        Self {
            cfg,
            writer: MessageWriter::new(FIX_VERSION, 1024),
            outbound_seq: SeqNum::new(1),
            heartbeat_interval: None,
        }
    }

    /// Starts the next outbound message and returns the writer.
    fn start(&mut self, msg_type: MsgType) -> &mut MessageWriter {
        let seq = self.outbound_seq;
        self.outbound_seq = seq.checked_next().unwrap_or(seq);
        self.writer
            .prepare(msg_type.as_str())
            .set(tags::MSG_SEQ_NUM, seq)
            .set(tags::SENDING_TIME, Timestamp::now())
            .set(tags::SENDER_COMP_ID, self.cfg.sender_comp_id.as_str())
            .set(tags::TARGET_COMP_ID, self.cfg.target_comp_id.as_str())
    }

    /// Builds the reply to `msg`, if it needs one.
    fn on_message(&mut self, msg: &Message) -> Option<&[u8]> {
        match msg.msg_type() {
            Some(MsgType::Logon) => {
                let interval = msg.field(tags::HEART_BT_INT).as_u64().unwrap_or(30);
                info!(interval, "Logon");
                self.heartbeat_interval = Some(Duration::from_secs(interval)).filter(|d| !d.is_zero());
                self.start(MsgType::Logon)
                    .set(tags::HEART_BT_INT, interval)
                    .set(tags::ENCRYPT_METHOD, 0)
                    .set(tags::RESET_SEQ_NUM_FLAG, true)
                    .build();
            }
            Some(MsgType::TestRequest) => {
                let test_req_id = msg.field(tags::TEST_REQ_ID).as_str().unwrap_or_default().to_string();
                debug!(%test_req_id, "TestRequest");
                self.start(MsgType::Heartbeat)
                    .set(tags::TEST_REQ_ID, test_req_id.as_str())
                    .build();
            }
            Some(MsgType::Heartbeat) => {
                debug!("Heartbeat");
                return None;
            }
            other => {
                warn!(msg_type = ?other, %msg, "Unhandled");
                return None;
            }
        }
        Some(self.writer.as_bytes())
    }

    fn heartbeat(&mut self) -> &[u8] {
        self.start(MsgType::Heartbeat).build();
        self.writer.as_bytes()
    }
}

async fn handle(mut sock: TcpStream, cfg: ExampleConfig) -> anyhow::Result<()> {
    let mut codec = FixCodec::new();
    let mut buf = BytesMut::with_capacity(4096);
    let mut msg = Message::new();
    let mut party = Counterparty::new(cfg);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut last_sent = tokio::time::Instant::now();

    loop {
        while let Some(frame) = codec.decode(&mut buf)? {
            if !msg.parse(frame.freeze()) {
                warn!("Dropping malformed message");
                continue;
            }
            if let Some(reply) = party.on_message(&msg) {
                sock.write_all(reply).await?;
                last_sent = tokio::time::Instant::now();
            }
        }

        tokio::select! {
            read = sock.read_buf(&mut buf) => {
                if read? == 0 {
                    info!("Connection closed");
                    return Ok(());
                }
            }
            _ = ticker.tick() => {
                if let Some(interval) = party.heartbeat_interval
                    && last_sent.elapsed() > interval
                {
                    sock.write_all(party.heartbeat()).await?;
                    last_sent = tokio::time::Instant::now();
                }
            }
        }
    }
}
