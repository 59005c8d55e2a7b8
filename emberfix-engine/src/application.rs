/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callback interface.
//!
//! The session layer answers Heartbeat, TestRequest, ResendRequest,
//! SequenceReset and Logon itself. An [`Application`] hears about the session
//! becoming established, every other message that passes sequence checks
//! (Logout and Reject included), and the error that ended the session.

use emberfix_core::error::FixError;
use emberfix_session::SessionId;
use emberfix_tagvalue::Message;

/// Application callback interface for a FIX session.
///
/// Every method has an empty default, so implementations override only the
/// events they care about. Callbacks run on the session's thread between
/// receive cycles and must not block for long: the heartbeat timers do not
/// run while a callback is executing.
pub trait Application {
    /// Called once the logon handshake has completed.
    ///
    /// # Arguments
    /// * `session_id` - The session identifier
    fn on_logon(&self, session_id: &SessionId) {
        let _ = session_id;
    }

    /// Called for every in-sequence message the session does not answer
    /// itself, including Logout and Reject.
    ///
    /// # Arguments
    /// * `message` - The received message, valid for the duration of the call
    /// * `session_id` - The session identifier
    #[allow(clippy::wrong_self_convention)]
    fn from_app(&self, message: &Message, session_id: &SessionId) {
        let _ = (message, session_id);
    }

    /// Called once when the session ends.
    ///
    /// # Arguments
    /// * `error` - The error that ended the session
    /// * `session_id` - The session identifier
    fn on_terminate(&self, error: &FixError, session_id: &SessionId) {
        let _ = (error, session_id);
    }
}

/// Default no-op application implementation.
#[derive(Debug, Default)]
pub struct NoOpApplication;

impl Application for NoOpApplication {}

impl<A: Application + ?Sized> Application for std::sync::Arc<A> {
    fn on_logon(&self, session_id: &SessionId) {
        (**self).on_logon(session_id);
    }

    fn from_app(&self, message: &Message, session_id: &SessionId) {
        (**self).from_app(message, session_id);
    }

    fn on_terminate(&self, error: &FixError, session_id: &SessionId) {
        (**self).on_terminate(error, session_id);
    }
}
