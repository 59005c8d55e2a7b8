/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX session state machine.
//!
//! A [`Session`] drives the logon handshake, checks every inbound message
//! against the configured identities and the expected sequence number,
//! answers the administrative messages and runs the liveness timers.
//!
//! It is driven in one of two ways:
//! - [`Session::logon`] once, then [`Session::receive`] repeatedly, each call
//!   being one read/validate/dispatch/timers cycle
//! - [`Session::run`] or [`Session::run_events`], which do the same until a
//!   fatal error
//!
//! Any error ends the session. Later calls fail with
//! `SessionError::InvalidState`.

use crate::clock::Clock;
use crate::config::{Role, SessionConfig, SessionId};
use crate::heartbeat::{HeartbeatTimer, Liveness};
use crate::sequence::{Advance, SequenceCheck};
use crate::state::{Phase, State};
use emberfix_core::error::{FixError, Result, SessionError};
use emberfix_core::message::MsgType;
use emberfix_core::tags;
use emberfix_core::types::{SeqNum, Timestamp};
use emberfix_tagvalue::{Message, MessageWriter};
use emberfix_transport::{Channel, Transport};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What [`Session::run_events`] reports to its handler.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// The logon handshake completed. Reported once per session.
    Established,
    /// An in-sequence message the session does not answer itself.
    Message(&'a Message),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    LoggingOn { started: Timestamp },
    Active,
    Terminated,
}

/// A FIX session over a transport, timed by a clock.
#[derive(Debug)]
pub struct Session<T, C> {
    config: SessionConfig,
    id: SessionId,
    clock: C,
    channel: Channel<T>,
    timer: HeartbeatTimer,
    state: State,
    stage: Stage,
    inbound: Message,
    outbound: MessageWriter,
}

impl<T: Transport, C: Clock> Session<T, C> {
    /// Creates an idle session.
    ///
    /// # Arguments
    /// * `config` - Session configuration
    /// * `transport` - Connected byte stream to the counterparty
    /// * `clock` - Time source for every timestamp and timer
    #[must_use]
    pub fn new(config: SessionConfig, transport: T, clock: C) -> Self {
        let now = clock.now();
        Self {
            id: config.session_id(),
            channel: Channel::new(transport, config.inbound_buffer_size),
            timer: HeartbeatTimer::new(config.heartbeat_interval),
            state: State::new(config.inbound_seq_num, config.outbound_seq_num, now),
            stage: Stage::Idle,
            inbound: Message::new(),
            outbound: MessageWriter::new(config.begin_string.clone(), config.outbound_buffer_size),
            clock,
            config,
        }
    }

    /// Starts the logon handshake.
    ///
    /// An initiator sends its Logon now. An acceptor sends nothing and waits
    /// for the counterparty's Logon. Either way the handshake completes in a
    /// later [`receive`](Self::receive) call, or fails once the logon timeout
    /// has elapsed.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidState` unless the session is idle, or the
    /// transport error if the Logon cannot be sent.
    pub fn logon(&mut self) -> Result<()> {
        if self.stage != Stage::Idle {
            return Err(self.invalid_state("idle"));
        }

        let now = self.clock.now();
        self.state.restart_timers(now);
        self.stage = Stage::LoggingOn { started: now };

        match self.config.role {
            Role::Initiator => {
                let sent = self.send_logon();
                self.guard(sent)?;
                info!(session = %self.id, "logon sent");
            }
            Role::Acceptor => info!(session = %self.id, "awaiting logon"),
        }
        Ok(())
    }

    /// Runs one receive cycle: read at most one message, validate and
    /// dispatch it, then evaluate the heartbeat timers.
    ///
    /// # Returns
    /// `true` if an in-sequence message was accepted that the session leaves
    /// to its caller: any type other than Heartbeat, TestRequest,
    /// ResendRequest, SequenceReset and Logon, so Logout and Reject included.
    /// It is available through [`inbound`](Self::inbound) until the next call.
    ///
    /// # Errors
    /// Returns the fatal protocol violation or transport error that ended the
    /// session, or `SessionError::InvalidState` if the session is idle or
    /// already terminated.
    pub fn receive(&mut self) -> Result<bool> {
        match self.stage {
            Stage::Idle | Stage::Terminated => Err(self.invalid_state("logged on")),
            Stage::LoggingOn { started } => {
                let result = self.pump_logon(started).map(|()| false);
                self.guard(result)
            }
            Stage::Active => {
                let result = self.pump();
                self.guard(result)
            }
        }
    }

    /// Logs on if idle, then runs receive cycles until a fatal error, handing
    /// every message [`receive`](Self::receive) accepts to `on_message`.
    ///
    /// # Returns
    /// The error that ended the session.
    pub fn run<F>(&mut self, mut on_message: F) -> FixError
    where
        F: FnMut(&Message),
    {
        self.run_events(|event| {
            if let Event::Message(msg) = event {
                on_message(msg);
            }
        })
    }

    /// Like [`run`](Self::run), but also reports [`Event::Established`] once,
    /// ahead of any message, when the logon handshake completes.
    ///
    /// # Returns
    /// The error that ended the session.
    pub fn run_events<F>(&mut self, mut on_event: F) -> FixError
    where
        F: FnMut(Event<'_>),
    {
        if self.stage == Stage::Idle
            && let Err(err) = self.logon()
        {
            return err;
        }

        let mut established = self.phase().is_established();
        loop {
            match self.receive() {
                Ok(accepted) => {
                    if !established && self.phase().is_established() {
                        established = true;
                        on_event(Event::Established);
                    }
                    if accepted {
                        on_event(Event::Message(&self.inbound));
                    }
                }
                Err(err) => return err,
            }
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::LoggingOn { .. } => Phase::LoggingOn,
            Stage::Active if self.state.synchronizing() => Phase::Synchronizing,
            Stage::Active => Phase::Synchronized,
            Stage::Terminated => Phase::Terminated,
        }
    }

    /// Returns the session state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Returns the configuration the session was created with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the session identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the last message read. Only meaningful after
    /// [`receive`](Self::receive) returned `true`.
    #[inline]
    #[must_use]
    pub const fn inbound(&self) -> &Message {
        &self.inbound
    }

    /// Nothing is read once the logon window has closed.
    fn pump_logon(&mut self, started: Timestamp) -> Result<()> {
        let elapsed = self.clock.now().duration_since(started);
        if elapsed >= self.config.logon_timeout {
            return Err(SessionError::LogonTimeout {
                elapsed_ms: millis(elapsed),
            }
            .into());
        }

        if self.channel.read(&mut self.inbound)? {
            self.validate_header()?;
            return self.accept_logon();
        }
        Ok(())
    }

    fn accept_logon(&mut self) -> Result<()> {
        let msg = &self.inbound;
        let reason = if !msg.field(tags::MSG_TYPE).is("A") {
            Some("unexpected first message received (expected a logon)")
        } else if !msg
            .field(tags::HEART_BT_INT)
            .is(self.config.heartbeat_interval_secs())
        {
            Some("unexpected heartbeat interval received")
        } else if !msg.field(tags::ENCRYPT_METHOD).is(0) {
            Some("unexpected encryption method received")
        } else if !msg.field(tags::RESET_SEQ_NUM_FLAG).is(true) {
            Some("unexpected reset on logon received")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(SessionError::LogonRejected { reason }.into());
        }

        let received = msg.field(tags::MSG_SEQ_NUM).as_seq_num()?;
        let check = SequenceCheck::classify(self.state.inbound_seq_num(), received);
        if let SequenceCheck::TooLow { expected, received } = check {
            return Err(too_low(expected, received));
        }

        if self.config.role == Role::Acceptor {
            self.send_logon()?;
        }
        self.stage = Stage::Active;

        if check.is_in_order() {
            self.state.advance_inbound(Advance::Next, self.clock.now())?;
        } else {
            warn!(session = %self.id, expected = %self.state.inbound_seq_num(), received = %received, "sequence gap on logon");
            self.send_resend_request()?;
        }

        info!(
            session = %self.id,
            heartbeat_interval = self.config.heartbeat_interval_secs(),
            "logon established"
        );
        Ok(())
    }

    fn pump(&mut self) -> Result<bool> {
        let accepted = if self.channel.read(&mut self.inbound)? {
            self.process_inbound()?
        } else {
            false
        };
        self.check_timers()?;
        Ok(accepted)
    }

    fn process_inbound(&mut self) -> Result<bool> {
        self.validate_header()?;

        let received = self.inbound.field(tags::MSG_SEQ_NUM).as_seq_num()?;
        match SequenceCheck::classify(self.state.inbound_seq_num(), received) {
            SequenceCheck::InOrder => {
                self.state.clear_recovery();

                let msg_type = self.inbound.msg_type();
                debug!(session = %self.id, seq = %received, msg_type = ?msg_type, "accepted");

                let (advance, surfaced) = match msg_type {
                    Some(MsgType::TestRequest) => (self.on_test_request()?, false),
                    Some(MsgType::ResendRequest) => (self.on_resend_request()?, false),
                    Some(MsgType::SequenceReset) => (self.on_sequence_reset()?, false),
                    Some(MsgType::Heartbeat | MsgType::Logon) | None => (Advance::Next, false),
                    Some(MsgType::Reject | MsgType::Logout | MsgType::Other(_)) => {
                        (Advance::Next, true)
                    }
                };
                self.state.advance_inbound(advance, self.clock.now())?;

                Ok(surfaced)
            }
            SequenceCheck::TooLow { expected, received } => Err(too_low(expected, received)),
            SequenceCheck::Gap { expected, received } => {
                warn!(session = %self.id, expected = %expected, received = %received, "sequence gap");
                self.send_resend_request()?;
                Ok(false)
            }
        }
    }

    fn check_timers(&mut self) -> Result<()> {
        let now = self.clock.now();

        if self.timer.heartbeat_due(self.state.outbound_timestamp(), now) {
            self.send_heartbeat()?;
        }

        match self.timer.check_inbound(self.state.inbound_timestamp(), now) {
            Liveness::Fresh => Ok(()),
            Liveness::Overdue => {
                if !self.state.test_request_pending() {
                    self.send_test_request()?;
                    self.state.begin_test_request();
                }
                Ok(())
            }
            Liveness::TimedOut { elapsed } => Err(SessionError::HeartbeatTimeout {
                elapsed_ms: millis(elapsed),
            }
            .into()),
        }
    }

    fn validate_header(&self) -> std::result::Result<(), SessionError> {
        let msg = &self.inbound;
        if !msg
            .field(tags::BEGIN_STRING)
            .is(self.config.begin_string.as_str())
        {
            return Err(SessionError::UnexpectedBeginString);
        }
        if !msg.field(tags::SENDER_COMP_ID).is(&self.config.target_comp_id) {
            return Err(SessionError::UnexpectedCompId {
                tag: tags::SENDER_COMP_ID,
            });
        }
        if !msg.field(tags::TARGET_COMP_ID).is(&self.config.sender_comp_id) {
            return Err(SessionError::UnexpectedCompId {
                tag: tags::TARGET_COMP_ID,
            });
        }
        Ok(())
    }

    fn on_test_request(&mut self) -> Result<Advance> {
        let now = self.clock.now();
        let writer = header(
            &mut self.outbound,
            &self.config,
            MsgType::Heartbeat,
            self.state.outbound_seq_num(),
            now,
        );
        if let Some(test_req_id) = self.inbound.field(tags::TEST_REQ_ID).as_bytes() {
            writer.set(tags::TEST_REQ_ID, test_req_id);
        }
        writer.build();
        self.send()?;
        Ok(Advance::Next)
    }

    fn on_resend_request(&mut self) -> Result<Advance> {
        let end_seq_no = self.inbound.field(tags::END_SEQ_NO).as_u64()?;
        if end_seq_no != 0 {
            return Err(SessionError::UnsupportedResendRequest { end_seq_no }.into());
        }
        let begin_seq_no = self.inbound.field(tags::BEGIN_SEQ_NO).as_seq_num()?;

        let now = self.clock.now();
        let new_seq_no = self.state.outbound_seq_num();
        header(
            &mut self.outbound,
            &self.config,
            MsgType::SequenceReset,
            begin_seq_no,
            now,
        )
        .set(tags::GAP_FILL_FLAG, true)
        .set(tags::NEW_SEQ_NO, new_seq_no)
        .build();
        self.send()?;
        self.state.release_outbound_seq_num();

        info!(session = %self.id, begin = %begin_seq_no, new_seq_no = %new_seq_no, "answered resend request with gap fill");
        Ok(Advance::Next)
    }

    fn on_sequence_reset(&mut self) -> Result<Advance> {
        if !self.inbound.field(tags::GAP_FILL_FLAG).is(true) {
            return Err(SessionError::UnsupportedSequenceReset.into());
        }

        let new_seq_no = self.inbound.field(tags::NEW_SEQ_NO).as_seq_num()?;
        let expected = self.state.inbound_seq_num();
        if new_seq_no <= expected {
            return Err(SessionError::InvalidSequenceReset {
                expected: expected.value(),
                new_seq_no: new_seq_no.value(),
            }
            .into());
        }

        info!(session = %self.id, from = %expected, to = %new_seq_no, "sequence reset");
        Ok(Advance::To(new_seq_no))
    }

    fn send_logon(&mut self) -> Result<()> {
        let now = self.clock.now();
        header(
            &mut self.outbound,
            &self.config,
            MsgType::Logon,
            self.state.outbound_seq_num(),
            now,
        )
        .set(tags::HEART_BT_INT, self.config.heartbeat_interval_secs())
        .set(tags::ENCRYPT_METHOD, 0)
        .set(tags::RESET_SEQ_NUM_FLAG, true)
        .build();
        self.send()
    }

    fn send_heartbeat(&mut self) -> Result<()> {
        let now = self.clock.now();
        header(
            &mut self.outbound,
            &self.config,
            MsgType::Heartbeat,
            self.state.outbound_seq_num(),
            now,
        )
        .build();
        self.send()
    }

    fn send_test_request(&mut self) -> Result<()> {
        let now = self.clock.now();
        header(
            &mut self.outbound,
            &self.config,
            MsgType::TestRequest,
            self.state.outbound_seq_num(),
            now,
        )
        .set(tags::TEST_REQ_ID, now.as_nanos())
        .build();
        self.send()?;
        warn!(session = %self.id, silent_for = ?now.duration_since(self.state.inbound_timestamp()), "test request sent");
        Ok(())
    }

    fn send_resend_request(&mut self) -> Result<()> {
        if self.state.synchronizing() {
            return Ok(());
        }

        let now = self.clock.now();
        header(
            &mut self.outbound,
            &self.config,
            MsgType::ResendRequest,
            self.state.outbound_seq_num(),
            now,
        )
        .set(tags::BEGIN_SEQ_NO, self.state.inbound_seq_num())
        .set(tags::END_SEQ_NO, 0)
        .build();
        self.send()?;
        self.state.begin_synchronizing();

        warn!(session = %self.id, from = %self.state.inbound_seq_num(), "resend request sent");
        Ok(())
    }

    /// The only outbound path: write, then count the message and restart the
    /// heartbeat timer.
    fn send(&mut self) -> Result<()> {
        self.channel.write(&self.outbound)?;
        self.state.record_outbound(self.clock.now())?;
        Ok(())
    }

    fn guard<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(err) = &result {
            self.stage = Stage::Terminated;
            error!(session = %self.id, error = %err, "session terminated");
        }
        result
    }

    fn invalid_state(&self, expected: &'static str) -> FixError {
        SessionError::InvalidState {
            expected,
            current: self.phase().as_str(),
        }
        .into()
    }
}

/// Starts a message with the standard header fields.
fn header<'w>(
    writer: &'w mut MessageWriter,
    config: &SessionConfig,
    msg_type: MsgType,
    seq_num: SeqNum,
    now: Timestamp,
) -> &'w mut MessageWriter {
    writer
        .prepare(msg_type.as_str())
        .set(tags::MSG_SEQ_NUM, seq_num)
        .set(tags::SENDING_TIME, now)
        .set(tags::SENDER_COMP_ID, &config.sender_comp_id)
        .set(tags::TARGET_COMP_ID, &config.target_comp_id)
}

fn too_low(expected: SeqNum, received: SeqNum) -> FixError {
    SessionError::SequenceTooLow {
        expected: expected.value(),
        received: received.value(),
    }
    .into()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
