/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX tag number constants used by the session layer.

/// BeginString: protocol version, always the first field.
pub const BEGIN_STRING: u32 = 8;
/// BodyLength: byte count from after this field up to the CheckSum field.
pub const BODY_LENGTH: u32 = 9;
/// CheckSum: modulo-256 byte sum, always the last field.
pub const CHECKSUM: u32 = 10;

/// BeginSeqNo of a ResendRequest.
pub const BEGIN_SEQ_NO: u32 = 7;
/// EndSeqNo of a ResendRequest; 0 means "everything from BeginSeqNo on".
pub const END_SEQ_NO: u32 = 16;
/// MsgSeqNum: per-direction message counter.
pub const MSG_SEQ_NUM: u32 = 34;
/// MsgType.
pub const MSG_TYPE: u32 = 35;
/// NewSeqNo of a SequenceReset.
pub const NEW_SEQ_NO: u32 = 36;
/// SenderCompID.
pub const SENDER_COMP_ID: u32 = 49;
/// SendingTime.
pub const SENDING_TIME: u32 = 52;
/// TargetCompID.
pub const TARGET_COMP_ID: u32 = 56;

/// EncryptMethod of a Logon; only 0 (none) is supported.
pub const ENCRYPT_METHOD: u32 = 98;
/// HeartBtInt of a Logon, in seconds.
pub const HEART_BT_INT: u32 = 108;
/// TestReqID, echoed by the Heartbeat answering a TestRequest.
pub const TEST_REQ_ID: u32 = 112;
/// GapFillFlag of a SequenceReset.
pub const GAP_FILL_FLAG: u32 = 123;
/// ResetSeqNumFlag of a Logon.
pub const RESET_SEQ_NUM_FLAG: u32 = 141;
