//! FIX initiator example.
//!
//! Connects to `FIX_HOST:FIX_PORT`, logs on and prints every business message
//! until the session ends. Run the `acceptor` example first.
use emberfix_core::FixError;
use emberfix_engine::{Application, EngineBuilder};
use emberfix_session::{Role, SessionId};
use emberfix_tagvalue::Message;
use std::time::Duration;
use tracing::{error, info};
mod common;
use common::{ExampleConfig, init_logging};

struct Printer;

impl Application for Printer {
    fn on_logon(&self, session_id: &SessionId) {
        info!(session = %session_id, "logged on");
    }

    fn from_app(&self, message: &Message, session_id: &SessionId) {
        info!(session = %session_id, msg_type = ?message.msg_type(), %message, "received");
    }

    fn on_terminate(&self, error: &FixError, session_id: &SessionId) {
        error!(session = %session_id, %error, "session ended");
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::client();
    let config = cfg.session_config(Role::Initiator)?;
    info!("Connecting to {}", cfg.addr());

    let engine = EngineBuilder::new(config)
        .with_application(Printer)
        .with_connect_timeout(Duration::from_secs(5))
        .build();

    Err(engine.run().into())
}
