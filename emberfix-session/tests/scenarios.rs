/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session behaviour driven through scripted steps.
//!
//! Step syntax (`|` stands for SOH):
//! - `! <timestamp>`: set the clock, then pump once (the first one logs on)
//! - `< <message>`: queue an inbound frame, then pump once
//! - `> <message>`: the next outbound frame must equal `<message>`

use emberfix_core::error::{FixError, Result, SessionError};
use emberfix_core::types::{SeqNum, Timestamp};
use emberfix_session::{Event, ManualClock, Phase, Role, Session, SessionConfigBuilder};
use emberfix_tagvalue::calculate_checksum;
use emberfix_transport::{MemoryHandle, MemoryTransport};
use std::time::Duration;

struct Harness {
    session: Session<MemoryTransport, ManualClock>,
    peer: MemoryHandle,
    clock: ManualClock,
    started: bool,
}

impl Harness {
    fn new(builder: SessionConfigBuilder) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("trace")
            .try_init();

        let config = builder.build().unwrap();
        let (transport, peer) = MemoryTransport::pair();
        let clock = ManualClock::default();
        let session = Session::new(config, transport, clock.clone());
        Self {
            session,
            peer,
            clock,
            started: false,
        }
    }

    fn step(&mut self, step: &str) -> Result<()> {
        let (kind, arg) = step.split_at(1);
        let arg = arg.trim();
        match kind {
            "!" => {
                self.clock.set(arg.parse::<Timestamp>().unwrap());
                if self.started {
                    self.session.receive().map(drop)
                } else {
                    self.started = true;
                    self.session.logon()
                }
            }
            "<" => {
                self.peer.push_inbound(arg.replace('|', "\x01"));
                self.session.receive().map(drop)
            }
            ">" => {
                let frame = self
                    .peer
                    .pop_outbound()
                    .unwrap_or_else(|| panic!("expected outbound {arg}"));
                assert_eq!(printable(&frame), arg);
                Ok(())
            }
            other => panic!("unknown step kind {other:?}"),
        }
    }

    fn steps(&mut self, steps: &[&str]) {
        for step in steps {
            if let Err(err) = self.step(step) {
                panic!("step {step:?} failed: {err}");
            }
        }
    }

    fn assert_no_outbound(&self) {
        let leftover: Vec<String> = std::iter::from_fn(|| self.peer.pop_outbound())
            .map(|frame| printable(&frame))
            .collect();
        assert!(leftover.is_empty(), "unexpected outbound: {leftover:?}");
    }

    fn seq_nums(&self) -> (u64, u64) {
        let state = self.session.state();
        (
            state.inbound_seq_num().value(),
            state.outbound_seq_num().value(),
        )
    }

    fn session_error(&mut self, step: &str) -> SessionError {
        match self.step(step) {
            Err(FixError::Session(err)) => err,
            other => panic!("expected a session error from {step:?}, got {other:?}"),
        }
    }
}

fn printable(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\x01', "|")
}

fn seal(unsealed: &str) -> String {
    let checksum = calculate_checksum(unsealed.as_bytes());
    format!("{unsealed}10={checksum:03}\x01").replace('\x01', "|")
}

/// Frames `body` as a counterparty would, with an unpadded BodyLength.
fn inbound(body: &str) -> String {
    let body = body.replace('|', "\x01");
    seal(&format!("8=FIX.4.2\x019={}\x01{body}", body.len()))
}

/// Frames `body` as the session does, with BodyLength padded to 5 digits.
fn outbound(body: &str) -> String {
    let body = body.replace('|', "\x01");
    seal(&format!("8=FIX.4.2\x019={:05}\x01{body}", body.len()))
}

fn client(interval: u64) -> SessionConfigBuilder {
    SessionConfigBuilder::new()
        .begin_string("FIX.4.2")
        .sender_comp_id("Client")
        .target_comp_id("Server")
        .heartbeat_interval(Duration::from_secs(interval))
}

/// Logon at 14:51:45.012, response at 14:51:45.051, interval 5.
fn logged_on() -> Harness {
    let mut h = Harness::new(client(5));
    h.steps(&[
        "! 20170623-14:51:45.012",
        &format!(
            "> {}",
            outbound("35=A|34=1|52=20170623-14:51:45.012|49=Client|56=Server|108=5|98=0|141=Y|")
        ),
        "! 20170623-14:51:45.051",
        &format!(
            "< {}",
            inbound("35=A|34=1|49=Server|52=20170623-14:51:45.051|56=Client|108=5|98=0|141=Y|")
        ),
    ]);
    assert_eq!(h.session.phase(), Phase::Synchronized);
    assert_eq!(h.seq_nums(), (2, 2));
    h
}

#[test]
fn heartbeat_is_sent_when_nothing_was_sent_for_longer_than_the_interval() {
    let mut h = Harness::new(client(5));
    h.steps(&[
        "! 20170623-14:51:45.012",
        "> 8=FIX.4.2|9=00072|35=A|34=1|52=20170623-14:51:45.012|49=Client|56=Server|108=5|98=0|141=Y|10=094|",
        "! 20170623-14:51:45.051",
        "< 8=FIX.4.2|9=72|35=A|34=1|49=Server|52=20170623-14:51:45.051|56=Client|108=5|98=0|141=Y|10=209|",
        "! 20170623-14:51:46.000",
        "! 20170623-14:51:47.000",
        "! 20170623-14:51:48.000",
        "! 20170623-14:51:49.000",
        "! 20170623-14:51:50.100",
        "> 8=FIX.4.2|9=00055|35=0|34=2|52=20170623-14:51:50.100|49=Client|56=Server|10=049|",
        "! 20170623-14:51:50.056",
        "< 8=FIX.4.2|9=55|35=0|34=2|49=Server|52=20170623-14:51:50.056|56=Client|10=171|",
        "! 20170623-14:51:51.000",
    ]);
    h.assert_no_outbound();
    assert_eq!(h.seq_nums(), (3, 3));
}

#[test]
fn heartbeat_is_not_sent_when_the_interval_is_zero() {
    let mut h = Harness::new(client(0));
    h.steps(&[
        "! 20170623-14:51:45.012",
        "> 8=FIX.4.2|9=00072|35=A|34=1|52=20170623-14:51:45.012|49=Client|56=Server|108=0|98=0|141=Y|10=089|",
        "! 20170623-14:51:45.051",
        "< 8=FIX.4.2|9=72|35=A|34=1|49=Server|52=20170623-14:51:45.051|56=Client|108=0|98=0|141=Y|10=204|",
        "! 20170623-14:51:46.000",
        "! 20170623-14:51:47.000",
        "! 20170623-14:51:48.000",
        "! 20170623-14:51:49.000",
        "! 20170623-14:51:50.000",
        "! 20170623-14:51:55.000",
        "! 20170623-14:52:00.000",
        "! 20170623-14:52:30.000",
        "! 20170623-14:53:00.000",
        "! 20170623-14:54:00.000",
        "! 20170623-14:55:00.000",
        "! 20170623-15:00:00.000",
    ]);
    h.assert_no_outbound();
    assert_eq!(h.seq_nums(), (2, 2));
    assert_eq!(h.session.phase(), Phase::Synchronized);
}

#[test]
fn application_message_is_handed_out() {
    let mut h = logged_on();
    h.peer.push_inbound(
        inbound("35=D|34=2|49=Server|52=20170623-14:51:46.000|56=Client|11=ORDER1|")
            .replace('|', "\x01"),
    );
    assert!(h.session.receive().unwrap());
    assert!(h.session.inbound().field(11).is("ORDER1"));
    assert_eq!(h.seq_nums(), (3, 2));

    // nothing new: no message, administrative or otherwise
    assert!(!h.session.receive().unwrap());
}

#[test]
fn logout_and_reject_are_handed_out() {
    let mut h = logged_on();
    h.peer.push_inbound(
        inbound("35=3|34=2|49=Server|52=20170623-14:51:46.000|56=Client|45=1|58=bad field|")
            .replace('|', "\x01"),
    );
    assert!(h.session.receive().unwrap());
    assert!(h.session.inbound().field(58).is("bad field"));

    h.peer.push_inbound(
        inbound("35=5|34=3|49=Server|52=20170623-14:51:46.000|56=Client|58=bye|")
            .replace('|', "\x01"),
    );
    assert!(h.session.receive().unwrap());
    assert!(h.session.inbound().field(58).is("bye"));
    assert_eq!(h.seq_nums(), (4, 2));
    h.assert_no_outbound();
}

#[test]
fn administrative_messages_are_not_handed_out() {
    let mut h = logged_on();
    h.peer.push_inbound(
        inbound("35=0|34=2|49=Server|52=20170623-14:51:46.000|56=Client|").replace('|', "\x01"),
    );
    assert!(!h.session.receive().unwrap());
    h.peer.push_inbound(
        inbound("35=4|34=3|49=Server|52=20170623-14:51:46.000|56=Client|123=Y|36=7|")
            .replace('|', "\x01"),
    );
    assert!(!h.session.receive().unwrap());
    assert_eq!(h.seq_nums(), (7, 2));
}

#[test]
fn gap_triggers_exactly_one_resend_request() {
    let mut h = logged_on();
    h.steps(&[
        "! 20170623-14:51:46.000",
        &format!(
            "< {}",
            inbound("35=0|34=5|49=Server|52=20170623-14:51:46.000|56=Client|")
        ),
        &format!(
            "> {}",
            outbound("35=2|34=2|52=20170623-14:51:46.000|49=Client|56=Server|7=2|16=0|")
        ),
    ]);
    assert_eq!(h.session.phase(), Phase::Synchronizing);
    assert_eq!(h.seq_nums(), (2, 3));

    // a second out-of-order message while the request is outstanding
    h.steps(&[&format!(
        "< {}",
        inbound("35=0|34=6|49=Server|52=20170623-14:51:46.000|56=Client|")
    )]);
    h.assert_no_outbound();
    assert_eq!(h.seq_nums(), (2, 3));

    // the gap is filled
    h.steps(&[&format!(
        "< {}",
        inbound("35=0|34=2|49=Server|52=20170623-14:51:46.000|56=Client|")
    )]);
    assert_eq!(h.session.phase(), Phase::Synchronized);
    assert_eq!(h.seq_nums(), (3, 3));
}

#[test]
fn sequence_number_too_low_is_fatal() {
    let mut h = logged_on();
    let err = h.session_error(&format!(
        "< {}",
        inbound("35=0|34=1|49=Server|52=20170623-14:51:46.000|56=Client|")
    ));
    assert_eq!(
        err,
        SessionError::SequenceTooLow {
            expected: 2,
            received: 1
        }
    );
    assert_eq!(h.session.phase(), Phase::Terminated);

    let err = h.session_error("! 20170623-14:51:47.000");
    assert!(matches!(
        err,
        SessionError::InvalidState {
            current: "terminated",
            ..
        }
    ));
}

#[test]
fn test_request_is_answered_with_its_id() {
    let mut h = logged_on();
    h.steps(&[
        "! 20170623-14:51:46.000",
        &format!(
            "< {}",
            inbound("35=1|34=2|49=Server|52=20170623-14:51:46.000|56=Client|112=PING-1|")
        ),
        &format!(
            "> {}",
            outbound("35=0|34=2|52=20170623-14:51:46.000|49=Client|56=Server|112=PING-1|")
        ),
    ]);
    h.assert_no_outbound();
    assert_eq!(h.seq_nums(), (3, 3));
}

#[test]
fn resend_request_is_answered_with_a_gap_fill() {
    let mut h = logged_on();
    h.steps(&[
        "! 20170623-14:51:46.000",
        &format!(
            "< {}",
            inbound("35=2|34=2|49=Server|52=20170623-14:51:46.000|56=Client|7=1|16=0|")
        ),
        &format!(
            "> {}",
            outbound("35=4|34=1|52=20170623-14:51:46.000|49=Client|56=Server|123=Y|36=2|")
        ),
    ]);
    h.assert_no_outbound();
    // the gap fill does not consume an outbound sequence number
    assert_eq!(h.seq_nums(), (3, 2));
    assert_eq!(
        h.session.state().outbound_timestamp(),
        "20170623-14:51:46.000".parse::<Timestamp>().unwrap()
    );
}

#[test]
fn partial_resend_request_is_fatal() {
    let mut h = logged_on();
    let err = h.session_error(&format!(
        "< {}",
        inbound("35=2|34=2|49=Server|52=20170623-14:51:46.000|56=Client|7=1|16=5|")
    ));
    assert_eq!(err, SessionError::UnsupportedResendRequest { end_seq_no: 5 });
}

#[test]
fn sequence_reset_moves_the_inbound_sequence_once() {
    let mut h = logged_on();
    h.steps(&[
        "! 20170623-14:51:46.000",
        &format!(
            "< {}",
            inbound("35=4|34=2|49=Server|52=20170623-14:51:46.000|56=Client|123=Y|36=10|")
        ),
    ]);
    assert_eq!(h.session.state().inbound_seq_num(), SeqNum::new(10));

    h.steps(&[&format!(
        "< {}",
        inbound("35=0|34=10|49=Server|52=20170623-14:51:46.000|56=Client|")
    )]);
    h.assert_no_outbound();
    assert_eq!(h.seq_nums(), (11, 2));
}

#[test]
fn sequence_reset_to_the_last_number_cannot_wrap() {
    let mut h = logged_on();
    h.steps(&[&format!(
        "< {}",
        inbound(
            "35=4|34=2|49=Server|52=20170623-14:51:46.000|56=Client|123=Y|36=18446744073709551615|"
        )
    )]);
    assert_eq!(h.session.state().inbound_seq_num(), SeqNum::new(u64::MAX));

    let err = h.session_error(&format!(
        "< {}",
        inbound("35=0|34=18446744073709551615|49=Server|52=20170623-14:51:46.000|56=Client|")
    ));
    assert_eq!(
        err,
        SessionError::SequenceExhausted {
            direction: "inbound"
        }
    );
    assert_eq!(h.session.phase(), Phase::Terminated);
    assert_eq!(h.session.state().inbound_seq_num(), SeqNum::new(u64::MAX));
}

#[test]
fn hard_sequence_reset_is_fatal() {
    let mut h = logged_on();
    let err = h.session_error(&format!(
        "< {}",
        inbound("35=4|34=2|49=Server|52=20170623-14:51:46.000|56=Client|36=10|")
    ));
    assert_eq!(err, SessionError::UnsupportedSequenceReset);
}

#[test]
fn sequence_reset_must_move_forward() {
    let mut h = logged_on();
    let err = h.session_error(&format!(
        "< {}",
        inbound("35=4|34=2|49=Server|52=20170623-14:51:46.000|56=Client|123=Y|36=2|")
    ));
    assert_eq!(
        err,
        SessionError::InvalidSequenceReset {
            expected: 2,
            new_seq_no: 2
        }
    );
}

#[test]
fn silent_counterparty_is_pinged_then_dropped() {
    let mut h = logged_on();
    h.steps(&[
        // 6.088s since the last send, 6.049s since the last receive
        "! 20170623-14:51:51.100",
        &format!(
            "> {}",
            outbound("35=0|34=2|52=20170623-14:51:51.100|49=Client|56=Server|")
        ),
        &format!(
            "> {}",
            outbound(
                "35=1|34=3|52=20170623-14:51:51.100|49=Client|56=Server|112=1498229511100000000|"
            )
        ),
        "! 20170623-14:51:52.000",
    ]);
    h.assert_no_outbound();
    assert!(h.session.state().test_request_pending());

    let err = h.session_error("! 20170623-14:51:55.052");
    assert!(matches!(err, SessionError::HeartbeatTimeout { elapsed_ms: 10_001 }));
    assert_eq!(h.session.phase(), Phase::Terminated);
}

#[test]
fn answered_test_request_clears_the_pending_test_request() {
    let mut h = logged_on();
    h.steps(&["! 20170623-14:51:51.100"]);
    while h.peer.pop_outbound().is_some() {}
    assert!(h.session.state().test_request_pending());

    h.steps(&[&format!(
        "< {}",
        inbound("35=0|34=2|49=Server|52=20170623-14:51:51.100|56=Client|112=1498229511100000000|")
    )]);
    assert!(!h.session.state().test_request_pending());
    assert_eq!(h.session.phase(), Phase::Synchronized);
}

#[test]
fn logon_response_must_arrive_in_time() {
    let mut h = Harness::new(client(5));
    h.steps(&["! 20170623-14:51:45.000", "! 20170623-14:51:54.999"]);
    assert_eq!(h.session.phase(), Phase::LoggingOn);

    let err = h.session_error("! 20170623-14:51:55.000");
    assert_eq!(err, SessionError::LogonTimeout { elapsed_ms: 10_000 });
}

#[test]
fn logon_response_after_the_window_is_not_accepted() {
    let mut h = Harness::new(client(5));
    h.steps(&["! 20170623-14:51:45.000"]);
    assert!(h.peer.pop_outbound().is_some());

    h.clock.set("20170623-14:51:55.000".parse().unwrap());
    h.peer.push_inbound(
        inbound("35=A|34=1|49=Server|52=20170623-14:51:54.900|56=Client|108=5|98=0|141=Y|")
            .replace('|', "\x01"),
    );
    assert!(matches!(
        h.session.receive(),
        Err(FixError::Session(SessionError::LogonTimeout { elapsed_ms: 10_000 }))
    ));
    assert_eq!(h.session.phase(), Phase::Terminated);
    assert_eq!(h.seq_nums(), (1, 2));
}

#[test]
fn logon_response_with_other_interval_is_rejected() {
    let mut h = Harness::new(client(5));
    h.steps(&["! 20170623-14:51:45.012"]);
    let err = h.session_error(&format!(
        "< {}",
        inbound("35=A|34=1|49=Server|52=20170623-14:51:45.051|56=Client|108=30|98=0|141=Y|")
    ));
    assert!(matches!(err, SessionError::LogonRejected { .. }));
}

#[test]
fn first_message_must_be_a_logon() {
    let mut h = Harness::new(client(5));
    h.steps(&["! 20170623-14:51:45.012"]);
    let err = h.session_error(&format!(
        "< {}",
        inbound("35=0|34=1|49=Server|52=20170623-14:51:45.051|56=Client|")
    ));
    assert!(matches!(err, SessionError::LogonRejected { .. }));
}

#[test]
fn unexpected_comp_id_is_fatal() {
    let mut h = logged_on();
    let err = h.session_error(&format!(
        "< {}",
        inbound("35=0|34=2|49=Intruder|52=20170623-14:51:46.000|56=Client|")
    ));
    assert_eq!(err, SessionError::UnexpectedCompId { tag: 49 });
}

#[test]
fn malformed_frame_is_ignored() {
    let mut h = logged_on();
    let corrupted = inbound("35=0|34=2|49=Server|52=20170623-14:51:46.000|56=Client|")
        .replace("35=0", "35=1");
    h.steps(&[&format!("< {corrupted}")]);
    h.assert_no_outbound();
    assert_eq!(h.seq_nums(), (2, 2));
    assert_eq!(h.session.phase(), Phase::Synchronized);
}

#[test]
fn logon_gap_requests_resend_without_advancing() {
    let mut h = Harness::new(client(5));
    h.steps(&[
        "! 20170623-14:51:45.012",
        "! 20170623-14:51:45.051",
        &format!(
            "< {}",
            inbound("35=A|34=4|49=Server|52=20170623-14:51:45.051|56=Client|108=5|98=0|141=Y|")
        ),
    ]);
    assert!(h.peer.pop_outbound().is_some());
    h.steps(&[&format!(
        "> {}",
        outbound("35=2|34=2|52=20170623-14:51:45.051|49=Client|56=Server|7=1|16=0|")
    )]);
    assert_eq!(h.session.phase(), Phase::Synchronizing);
    assert_eq!(h.seq_nums(), (1, 3));
}

#[test]
fn acceptor_answers_the_initiator_logon() {
    let mut h = Harness::new(
        SessionConfigBuilder::new()
            .sender_comp_id("Server")
            .target_comp_id("Client")
            .role(Role::Acceptor)
            .heartbeat_interval(Duration::from_secs(5)),
    );
    h.steps(&["! 20170623-14:51:45.000"]);
    h.assert_no_outbound();
    assert_eq!(h.session.phase(), Phase::LoggingOn);

    h.steps(&[
        "! 20170623-14:51:45.051",
        &format!(
            "< {}",
            inbound("35=A|34=1|49=Client|52=20170623-14:51:45.012|56=Server|108=5|98=0|141=Y|")
        ),
        &format!(
            "> {}",
            outbound("35=A|34=1|52=20170623-14:51:45.051|49=Server|56=Client|108=5|98=0|141=Y|")
        ),
    ]);
    h.assert_no_outbound();
    assert_eq!(h.session.phase(), Phase::Synchronized);
    assert_eq!(h.seq_nums(), (2, 2));
}

#[test]
fn operations_out_of_order_are_rejected() {
    let mut h = Harness::new(client(5));
    assert!(matches!(
        h.session.receive(),
        Err(FixError::Session(SessionError::InvalidState { current: "idle", .. }))
    ));
    // an invalid call does not end an idle session
    assert_eq!(h.session.phase(), Phase::Idle);

    h.steps(&["! 20170623-14:51:45.012"]);
    assert!(matches!(
        h.session.logon(),
        Err(FixError::Session(SessionError::InvalidState { .. }))
    ));
}

#[test]
fn run_hands_application_messages_to_the_handler() {
    let mut h = Harness::new(client(5));
    h.clock.set("20170623-14:51:45.012".parse().unwrap());
    for body in [
        "35=A|34=1|49=Server|52=20170623-14:51:45.051|56=Client|108=5|98=0|141=Y|",
        "35=0|34=2|49=Server|52=20170623-14:51:45.100|56=Client|",
        "35=8|34=3|49=Server|52=20170623-14:51:45.200|56=Client|17=EXEC1|",
    ] {
        h.peer.push_inbound(inbound(body).replace('|', "\x01"));
    }

    let peer = h.peer.clone();
    let mut received = Vec::new();
    let err = h.session.run(|msg| {
        received.push(msg.field(17).as_str().unwrap_or_default().to_string());
        peer.close();
    });

    assert!(matches!(err, FixError::Io(_)));
    assert_eq!(received, vec!["EXEC1".to_string()]);
    assert_eq!(h.seq_nums(), (4, 2));
    assert_eq!(h.session.phase(), Phase::Terminated);
}

#[test]
fn run_events_reports_logon_before_messages() {
    let mut h = Harness::new(client(5));
    h.clock.set("20170623-14:51:45.012".parse().unwrap());
    for body in [
        "35=A|34=1|49=Server|52=20170623-14:51:45.051|56=Client|108=5|98=0|141=Y|",
        "35=0|34=2|49=Server|52=20170623-14:51:45.100|56=Client|",
        "35=8|34=3|49=Server|52=20170623-14:51:45.200|56=Client|17=EXEC1|",
        "35=5|34=4|49=Server|52=20170623-14:51:45.300|56=Client|58=bye|",
    ] {
        h.peer.push_inbound(inbound(body).replace('|', "\x01"));
    }

    let peer = h.peer.clone();
    let mut events = Vec::new();
    let err = h.session.run_events(|event| match event {
        Event::Established => events.push("established".to_string()),
        Event::Message(msg) => {
            let text = msg.field(58).as_str().or(msg.field(17).as_str());
            events.push(text.unwrap_or_default().to_string());
            if msg.field(35).is("5") {
                peer.close();
            }
        }
    });

    assert!(matches!(err, FixError::Io(_)));
    assert_eq!(events, vec!["established", "EXEC1", "bye"]);
    assert_eq!(h.seq_nums(), (5, 2));
}
