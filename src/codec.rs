//! Wire codec: lexical validation, the request/response value types, and
//! their encode/decode routines.
//!
//! The wire format is line-oriented ASCII: space-separated tokens, newline
//! terminated, opcode-tagged. `MessageSource` is the capability a decoder
//! needs from its transport (`get`/`unget`/`good`); both UDP (a whole
//! datagram already in memory) and TCP (read until the peer half-closes)
//! deliver a complete message buffer before decoding starts, so one cursor
//! implementation, [`BufferSource`], serves both — the transport differs
//! only in how it fills the buffer.

use crate::error::{AuctionError, Result};
use crate::model::{self, Aid, AuctionState, BidRecord, StartRecord, Uid};

pub const UID_LEN: usize = 6;
pub const PASSWORD_LEN: usize = 8;
pub const AID_LEN: usize = 3;
pub const MAX_AUCTION_NAME_LEN: usize = 10;
pub const MAX_FILENAME_LEN: usize = 24;
pub const MAX_FILE_SIZE: u64 = 10_000_000;

/// A source of bytes a decoder can read one at a time, with one-byte
/// pushback. Satisfied by a whole in-memory message buffer.
pub trait MessageSource {
    fn get(&mut self) -> Option<u8>;
    fn unget(&mut self, byte: u8);
    fn good(&self) -> bool;
}

/// Cursor over a fully-buffered message (a UDP datagram, or a TCP request
/// read to completion).
pub struct BufferSource<'a> {
    buf: &'a [u8],
    pos: usize,
    pushed_back: Option<u8>,
}

impl<'a> BufferSource<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            pushed_back: None,
        }
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}

impl<'a> MessageSource for BufferSource<'a> {
    fn get(&mut self) -> Option<u8> {
        if let Some(b) = self.pushed_back.take() {
            return Some(b);
        }
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn unget(&mut self, byte: u8) {
        self.pushed_back = Some(byte);
    }

    fn good(&self) -> bool {
        self.pos < self.buf.len() || self.pushed_back.is_some()
    }
}

/// Reads exactly one token, stopping at (and pushing back) the space or
/// newline that follows it. Fails rather than silently truncating past
/// `max`.
fn read_field(src: &mut dyn MessageSource, max: usize) -> Result<String> {
    let mut out = Vec::new();
    loop {
        match src.get() {
            Some(b @ (b' ' | b'\n')) => {
                src.unget(b);
                break;
            }
            None => break,
            Some(b) => {
                out.push(b);
                if out.len() > max {
                    return Err(AuctionError::ProtocolViolation);
                }
            }
        }
    }
    String::from_utf8(out).map_err(|_| AuctionError::ProtocolViolation)
}

fn expect_char(src: &mut dyn MessageSource, expected: u8) -> Result<()> {
    match src.get() {
        Some(b) if b == expected => Ok(()),
        _ => Err(AuctionError::ProtocolViolation),
    }
}

fn expect_space(src: &mut dyn MessageSource) -> Result<()> {
    expect_char(src, b' ')
}

fn is_digits(s: &str, len: Option<usize>) -> bool {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    len.is_none_or(|l| s.len() == l)
}

fn is_alphanumeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn is_filename_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_'
}

pub fn read_uid(src: &mut dyn MessageSource) -> Result<Uid> {
    let s = read_field(src, UID_LEN)?;
    if is_digits(&s, Some(UID_LEN)) {
        Ok(s)
    } else {
        Err(AuctionError::ProtocolViolation)
    }
}

pub fn read_password(src: &mut dyn MessageSource) -> Result<String> {
    let s = read_field(src, PASSWORD_LEN)?;
    if s.len() == PASSWORD_LEN && is_alphanumeric(&s) {
        Ok(s)
    } else {
        Err(AuctionError::ProtocolViolation)
    }
}

pub fn read_aid(src: &mut dyn MessageSource) -> Result<Aid> {
    let s = read_field(src, AID_LEN)?;
    if is_digits(&s, Some(AID_LEN)) {
        Ok(s)
    } else {
        Err(AuctionError::ProtocolViolation)
    }
}

pub fn read_auction_name(src: &mut dyn MessageSource) -> Result<String> {
    let s = read_field(src, MAX_AUCTION_NAME_LEN)?;
    if is_alphanumeric(&s) {
        Ok(s)
    } else {
        Err(AuctionError::ProtocolViolation)
    }
}

pub fn read_file_name(src: &mut dyn MessageSource) -> Result<String> {
    let s = read_field(src, MAX_FILENAME_LEN)?;
    if !s.is_empty() && s.bytes().all(is_filename_char) {
        Ok(s)
    } else {
        Err(AuctionError::ProtocolViolation)
    }
}

pub fn read_number(src: &mut dyn MessageSource, max_digits: usize) -> Result<u64> {
    let s = read_field(src, max_digits)?;
    if is_digits(&s, None) {
        s.parse().map_err(|_| AuctionError::ProtocolViolation)
    } else {
        Err(AuctionError::ProtocolViolation)
    }
}

fn validate_uid(s: &str) -> Result<()> {
    if is_digits(s, Some(UID_LEN)) {
        Ok(())
    } else {
        Err(AuctionError::ArgumentError(format!(
            "uid must be exactly {UID_LEN} digits"
        )))
    }
}

fn validate_password(s: &str) -> Result<()> {
    if s.len() == PASSWORD_LEN && is_alphanumeric(s) {
        Ok(())
    } else {
        Err(AuctionError::ArgumentError(format!(
            "password must be exactly {PASSWORD_LEN} alphanumeric characters"
        )))
    }
}

fn validate_aid(s: &str) -> Result<()> {
    if is_digits(s, Some(AID_LEN)) {
        Ok(())
    } else {
        Err(AuctionError::ArgumentError(format!(
            "aid must be exactly {AID_LEN} digits"
        )))
    }
}

fn validate_auction_name(s: &str) -> Result<()> {
    if s.len() <= MAX_AUCTION_NAME_LEN && is_alphanumeric(s) {
        Ok(())
    } else {
        Err(AuctionError::ArgumentError(format!(
            "auction name must be 1-{MAX_AUCTION_NAME_LEN} alphanumeric characters"
        )))
    }
}

fn validate_file_name(s: &str) -> Result<()> {
    if !s.is_empty() && s.len() <= MAX_FILENAME_LEN && s.bytes().all(is_filename_char) {
        Ok(())
    } else {
        Err(AuctionError::ArgumentError(format!(
            "file name must be 1-{MAX_FILENAME_LEN} characters of [A-Za-z0-9._-]"
        )))
    }
}

fn validate_file_size(len: usize) -> Result<()> {
    if len as u64 <= MAX_FILE_SIZE {
        Ok(())
    } else {
        Err(AuctionError::ArgumentError(format!(
            "file size exceeds the maximum of {MAX_FILE_SIZE} bytes"
        )))
    }
}

fn validate_digits(s: &str, max_digits: usize, label: &str) -> Result<()> {
    if is_digits(s, None) && s.len() <= max_digits {
        Ok(())
    } else {
        Err(AuctionError::ArgumentError(format!(
            "{label} must be at most {max_digits} digits"
        )))
    }
}

pub fn read_opcode(src: &mut dyn MessageSource) -> Result<String> {
    let mut code = String::new();
    for _ in 0..3 {
        match src.get() {
            Some(b) => code.push(b as char),
            None => return Err(AuctionError::ProtocolViolation),
        }
    }
    Ok(code)
}

/// Reads exactly `n` raw bytes (the embedded file blob), bypassing token
/// splitting.
fn read_exact_bytes(src: &mut dyn MessageSource, n: u64) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(n as usize);
    for _ in 0..n {
        match src.get() {
            Some(b) => out.push(b),
            None => return Err(AuctionError::ProtocolViolation),
        }
    }
    Ok(out)
}

fn expect_newline(src: &mut dyn MessageSource) -> Result<()> {
    match src.get() {
        Some(b'\n') => Ok(()),
        _ => Err(AuctionError::ProtocolViolation),
    }
}

// ---------------------------------------------------------------------
// Request / response value types
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub uid: Uid,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Login(Credentials),
    Logout(Credentials),
    Unregister(Credentials),
    ListUserAuctions { uid: Uid },
    ListUserBids { uid: Uid },
    ListAllAuctions,
    ShowRecord { aid: Aid },
    OpenAuction {
        credentials: Credentials,
        name: String,
        start_value: u32,
        duration_secs: u32,
        file_name: String,
        file_data: Vec<u8>,
    },
    CloseAuction { credentials: Credentials, aid: Aid },
    ShowAsset { aid: Aid },
    Bid { credentials: Credentials, aid: Aid, value: u32 },
}

impl Request {
    pub fn opcode(&self) -> &'static str {
        match self {
            Request::Login(_) => "LIN",
            Request::Logout(_) => "LOU",
            Request::Unregister(_) => "UNR",
            Request::ListUserAuctions { .. } => "LMA",
            Request::ListUserBids { .. } => "LMB",
            Request::ListAllAuctions => "LST",
            Request::ShowRecord { .. } => "SRC",
            Request::OpenAuction { .. } => "OPA",
            Request::CloseAuction { .. } => "CLS",
            Request::ShowAsset { .. } => "SAS",
            Request::Bid { .. } => "BID",
        }
    }

    /// True for requests that must go over TCP (anything touching a file
    /// blob or that otherwise changes durable state in a way the protocol
    /// reserves for the bulk transport).
    pub fn is_tcp(&self) -> bool {
        matches!(
            self,
            Request::OpenAuction { .. }
                | Request::CloseAuction { .. }
                | Request::ShowAsset { .. }
                | Request::Bid { .. }
        )
    }

    /// Validates every field against the same lexical classes the decoder
    /// enforces, then builds the wire bytes. Rejects invalid input locally
    /// instead of letting the server's decoder be the only thing that
    /// catches it.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Request::Login(c) | Request::Logout(c) | Request::Unregister(c) => {
                validate_uid(&c.uid)?;
                validate_password(&c.password)?;
            }
            Request::ListUserAuctions { uid } | Request::ListUserBids { uid } => {
                validate_uid(uid)?;
            }
            Request::ListAllAuctions => {}
            Request::ShowRecord { aid } | Request::ShowAsset { aid } => {
                validate_aid(aid)?;
            }
            Request::OpenAuction {
                credentials,
                name,
                start_value,
                duration_secs,
                file_name,
                file_data,
            } => {
                validate_uid(&credentials.uid)?;
                validate_password(&credentials.password)?;
                validate_auction_name(name)?;
                validate_digits(&start_value.to_string(), 6, "start value")?;
                validate_digits(&duration_secs.to_string(), 5, "duration")?;
                validate_file_name(file_name)?;
                validate_file_size(file_data.len())?;
            }
            Request::CloseAuction { credentials, aid } => {
                validate_uid(&credentials.uid)?;
                validate_password(&credentials.password)?;
                validate_aid(aid)?;
            }
            Request::Bid {
                credentials,
                aid,
                value,
            } => {
                validate_uid(&credentials.uid)?;
                validate_password(&credentials.password)?;
                validate_aid(aid)?;
                validate_digits(&value.to_string(), 6, "bid value")?;
            }
        }

        let mut out = Vec::new();
        out.extend_from_slice(self.opcode().as_bytes());
        match self {
            Request::Login(c) | Request::Logout(c) | Request::Unregister(c) => {
                out.push(b' ');
                out.extend_from_slice(c.uid.as_bytes());
                out.push(b' ');
                out.extend_from_slice(c.password.as_bytes());
            }
            Request::ListUserAuctions { uid } | Request::ListUserBids { uid } => {
                out.push(b' ');
                out.extend_from_slice(uid.as_bytes());
            }
            Request::ListAllAuctions => {}
            Request::ShowRecord { aid } | Request::ShowAsset { aid } => {
                out.push(b' ');
                out.extend_from_slice(aid.as_bytes());
            }
            Request::OpenAuction {
                credentials,
                name,
                start_value,
                duration_secs,
                file_name,
                file_data,
            } => {
                out.push(b' ');
                out.extend_from_slice(credentials.uid.as_bytes());
                out.push(b' ');
                out.extend_from_slice(credentials.password.as_bytes());
                out.push(b' ');
                out.extend_from_slice(name.as_bytes());
                out.push(b' ');
                out.extend_from_slice(start_value.to_string().as_bytes());
                out.push(b' ');
                out.extend_from_slice(duration_secs.to_string().as_bytes());
                out.push(b' ');
                out.extend_from_slice(file_name.as_bytes());
                out.push(b' ');
                out.extend_from_slice(file_data.len().to_string().as_bytes());
                out.push(b' ');
                out.extend_from_slice(file_data);
            }
            Request::CloseAuction { credentials, aid } => {
                out.push(b' ');
                out.extend_from_slice(credentials.uid.as_bytes());
                out.push(b' ');
                out.extend_from_slice(credentials.password.as_bytes());
                out.push(b' ');
                out.extend_from_slice(aid.as_bytes());
            }
            Request::Bid {
                credentials,
                aid,
                value,
            } => {
                out.push(b' ');
                out.extend_from_slice(credentials.uid.as_bytes());
                out.push(b' ');
                out.extend_from_slice(credentials.password.as_bytes());
                out.push(b' ');
                out.extend_from_slice(aid.as_bytes());
                out.push(b' ');
                out.extend_from_slice(value.to_string().as_bytes());
            }
        }
        out.push(b'\n');
        Ok(out)
    }

    pub fn decode(src: &mut dyn MessageSource) -> Result<Self> {
        let opcode = read_opcode(src)?;
        let req = match opcode.as_str() {
            "LIN" => {
                expect_space(src)?;
                let uid = read_uid(src)?;
                expect_space(src)?;
                let password = read_password(src)?;
                Request::Login(Credentials { uid, password })
            }
            "LOU" => {
                expect_space(src)?;
                let uid = read_uid(src)?;
                expect_space(src)?;
                let password = read_password(src)?;
                Request::Logout(Credentials { uid, password })
            }
            "UNR" => {
                expect_space(src)?;
                let uid = read_uid(src)?;
                expect_space(src)?;
                let password = read_password(src)?;
                Request::Unregister(Credentials { uid, password })
            }
            "LMA" => {
                expect_space(src)?;
                let uid = read_uid(src)?;
                Request::ListUserAuctions { uid }
            }
            "LMB" => {
                expect_space(src)?;
                let uid = read_uid(src)?;
                Request::ListUserBids { uid }
            }
            "LST" => Request::ListAllAuctions,
            "SRC" => {
                expect_space(src)?;
                let aid = read_aid(src)?;
                Request::ShowRecord { aid }
            }
            "SAS" => {
                expect_space(src)?;
                let aid = read_aid(src)?;
                Request::ShowAsset { aid }
            }
            "OPA" => {
                expect_space(src)?;
                let uid = read_uid(src)?;
                expect_space(src)?;
                let password = read_password(src)?;
                expect_space(src)?;
                let name = read_auction_name(src)?;
                expect_space(src)?;
                let start_value = read_number(src, 6)? as u32;
                expect_space(src)?;
                let duration_secs = read_number(src, 5)? as u32;
                expect_space(src)?;
                let file_name = read_file_name(src)?;
                expect_space(src)?;
                let file_size = read_number(src, 8)?;
                if file_size > MAX_FILE_SIZE {
                    return Err(AuctionError::ProtocolViolation);
                }
                expect_space(src)?;
                let file_data = read_exact_bytes(src, file_size)?;
                Request::OpenAuction {
                    credentials: Credentials { uid, password },
                    name,
                    start_value,
                    duration_secs,
                    file_name,
                    file_data,
                }
            }
            "CLS" => {
                expect_space(src)?;
                let uid = read_uid(src)?;
                expect_space(src)?;
                let password = read_password(src)?;
                expect_space(src)?;
                let aid = read_aid(src)?;
                Request::CloseAuction {
                    credentials: Credentials { uid, password },
                    aid,
                }
            }
            "BID" => {
                expect_space(src)?;
                let uid = read_uid(src)?;
                expect_space(src)?;
                let password = read_password(src)?;
                expect_space(src)?;
                let aid = read_aid(src)?;
                expect_space(src)?;
                let value = read_number(src, 6)? as u32;
                Request::Bid {
                    credentials: Credentials { uid, password },
                    aid,
                    value,
                }
            }
            _ => return Err(AuctionError::ProtocolViolation),
        };
        expect_newline(src)?;
        Ok(req)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleStatus {
    Ok,
    Nok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    Ok,
    Nok,
    Reg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutStatus {
    Ok,
    Nok,
    Unr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Ok,
    Nok,
    Nlg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStatus {
    Nlg,
    Nok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseStatus {
    Ok,
    Nlg,
    Eau,
    Eow,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidStatus {
    Nlg,
    Nok,
    Acc,
    Ilg,
    Ref,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionListing {
    pub aid: Aid,
    pub state: AuctionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Login(LoginStatus),
    Logout(LogoutStatus),
    Unregister(LogoutStatus),
    ListUserAuctions(ListStatus, Vec<AuctionListing>),
    ListUserBids(ListStatus, Vec<AuctionListing>),
    ListAllAuctions(SimpleStatus, Vec<AuctionListing>),
    ShowRecord(SimpleStatus, Option<(StartRecord, Vec<BidRecord>, Option<model::EndRecord>)>),
    OpenAuction(Result_<Aid, OpenStatus>),
    CloseAuction(CloseStatus),
    ShowAsset(Result_<(String, Vec<u8>), SimpleStatus>),
    Bid(BidStatus),
    /// The protocol-level `ERR\n` sentinel, a peer-reported violation.
    Err,
}

/// Either a success payload or a failure status, used where the reply's OK
/// variant carries data the failure variants don't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Result_<T, E> {
    Ok(T),
    Fail(E),
}

fn encode_listing(out: &mut Vec<u8>, listing: &[AuctionListing]) {
    for item in listing {
        out.push(b' ');
        out.extend_from_slice(item.aid.as_bytes());
        out.push(b' ');
        out.push(item.state.as_digit() as u8);
    }
}

impl Response {
    pub fn opcode(&self) -> &'static str {
        match self {
            Response::Login(_) => "RLI",
            Response::Logout(_) => "RLO",
            Response::Unregister(_) => "RUR",
            Response::ListUserAuctions(..) => "RMA",
            Response::ListUserBids(..) => "RMB",
            Response::ListAllAuctions(..) => "RLS",
            Response::ShowRecord(..) => "RRC",
            Response::OpenAuction(_) => "ROA",
            Response::CloseAuction(_) => "RCL",
            Response::ShowAsset(_) => "RSA",
            Response::Bid(_) => "RBD",
            Response::Err => "ERR",
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.opcode().as_bytes());
        match self {
            Response::Login(s) => {
                out.push(b' ');
                out.extend_from_slice(match s {
                    LoginStatus::Ok => b"OK",
                    LoginStatus::Nok => b"NOK",
                    LoginStatus::Reg => b"REG",
                });
            }
            Response::Logout(s) | Response::Unregister(s) => {
                out.push(b' ');
                out.extend_from_slice(match s {
                    LogoutStatus::Ok => b"OK",
                    LogoutStatus::Nok => b"NOK",
                    LogoutStatus::Unr => b"UNR",
                });
            }
            Response::ListUserAuctions(status, listing) | Response::ListUserBids(status, listing) => {
                out.push(b' ');
                out.extend_from_slice(match status {
                    ListStatus::Ok => b"OK",
                    ListStatus::Nok => b"NOK",
                    ListStatus::Nlg => b"NLG",
                });
                if *status == ListStatus::Ok {
                    encode_listing(&mut out, listing);
                }
            }
            Response::ListAllAuctions(status, listing) => {
                out.push(b' ');
                out.extend_from_slice(match status {
                    SimpleStatus::Ok => b"OK",
                    SimpleStatus::Nok => b"NOK",
                });
                if *status == SimpleStatus::Ok {
                    encode_listing(&mut out, listing);
                }
            }
            Response::ShowRecord(status, record) => {
                out.push(b' ');
                out.extend_from_slice(match status {
                    SimpleStatus::Ok => b"OK",
                    SimpleStatus::Nok => b"NOK",
                });
                if let (SimpleStatus::Ok, Some((start, bids, end))) = (status, record) {
                    out.push(b' ');
                    out.extend_from_slice(start.host_uid.as_bytes());
                    out.push(b' ');
                    out.extend_from_slice(start.name.as_bytes());
                    out.push(b' ');
                    out.extend_from_slice(start.asset_filename.as_bytes());
                    out.push(b' ');
                    out.extend_from_slice(start.start_value.to_string().as_bytes());
                    out.push(b' ');
                    out.extend_from_slice(model::format_datetime(start.start_time).as_bytes());
                    out.push(b' ');
                    out.extend_from_slice(start.duration_secs.to_string().as_bytes());
                    for bid in bids {
                        out.extend_from_slice(b" B ");
                        out.extend_from_slice(bid.bidder_uid.as_bytes());
                        out.push(b' ');
                        out.extend_from_slice(bid.value.to_string().as_bytes());
                        out.push(b' ');
                        out.extend_from_slice(model::format_datetime(bid.time).as_bytes());
                        out.push(b' ');
                        out.extend_from_slice(bid.elapsed_secs.to_string().as_bytes());
                    }
                    if let Some(end) = end {
                        out.extend_from_slice(b" E ");
                        out.extend_from_slice(model::format_datetime(end.end_time).as_bytes());
                        out.push(b' ');
                        out.extend_from_slice(end.elapsed_secs.to_string().as_bytes());
                    }
                }
            }
            Response::OpenAuction(result) => {
                out.push(b' ');
                match result {
                    Result_::Ok(aid) => {
                        out.extend_from_slice(b"OK");
                        out.push(b' ');
                        out.extend_from_slice(aid.as_bytes());
                    }
                    Result_::Fail(OpenStatus::Nlg) => out.extend_from_slice(b"NLG"),
                    Result_::Fail(OpenStatus::Nok) => out.extend_from_slice(b"NOK"),
                }
            }
            Response::CloseAuction(status) => {
                out.push(b' ');
                out.extend_from_slice(match status {
                    CloseStatus::Ok => b"OK",
                    CloseStatus::Nlg => b"NLG",
                    CloseStatus::Eau => b"EAU",
                    CloseStatus::Eow => b"EOW",
                    CloseStatus::End => b"END",
                });
            }
            Response::ShowAsset(result) => {
                out.push(b' ');
                match result {
                    Result_::Ok((name, data)) => {
                        out.extend_from_slice(b"OK");
                        out.push(b' ');
                        out.extend_from_slice(name.as_bytes());
                        out.push(b' ');
                        out.extend_from_slice(data.len().to_string().as_bytes());
                        out.push(b' ');
                        out.extend_from_slice(data);
                    }
                    Result_::Fail(SimpleStatus::Nok) => out.extend_from_slice(b"NOK"),
                    Result_::Fail(SimpleStatus::Ok) => unreachable!("Ok is not a failure state"),
                }
            }
            Response::Bid(status) => {
                out.push(b' ');
                out.extend_from_slice(match status {
                    BidStatus::Nlg => b"NLG",
                    BidStatus::Nok => b"NOK",
                    BidStatus::Acc => b"ACC",
                    BidStatus::Ilg => b"ILG",
                    BidStatus::Ref => b"REF",
                });
            }
            Response::Err => {}
        }
        out.push(b'\n');
        out
    }

    pub fn decode(src: &mut dyn MessageSource, request_opcode: &str) -> Result<Self> {
        let opcode = read_opcode(src)?;
        if opcode == "ERR" {
            // ERR carries no body but still ends in a newline.
            expect_newline(src)?;
            return Ok(Response::Err);
        }
        let resp = match (request_opcode, opcode.as_str()) {
            ("LIN", "RLI") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                Response::Login(match status.as_str() {
                    "OK" => LoginStatus::Ok,
                    "NOK" => LoginStatus::Nok,
                    "REG" => LoginStatus::Reg,
                    _ => return Err(AuctionError::ProtocolViolation),
                })
            }
            ("LOU", "RLO") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                Response::Logout(parse_logout_status(&status)?)
            }
            ("UNR", "RUR") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                Response::Unregister(parse_logout_status(&status)?)
            }
            ("LMA", "RMA") | ("LMB", "RMB") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                let status = match status.as_str() {
                    "OK" => ListStatus::Ok,
                    "NOK" => ListStatus::Nok,
                    "NLG" => ListStatus::Nlg,
                    _ => return Err(AuctionError::ProtocolViolation),
                };
                let listing = if status == ListStatus::Ok {
                    decode_listing(src)?
                } else {
                    Vec::new()
                };
                if request_opcode == "LMA" {
                    Response::ListUserAuctions(status, listing)
                } else {
                    Response::ListUserBids(status, listing)
                }
            }
            ("LST", "RLS") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                let status = match status.as_str() {
                    "OK" => SimpleStatus::Ok,
                    "NOK" => SimpleStatus::Nok,
                    _ => return Err(AuctionError::ProtocolViolation),
                };
                let listing = if status == SimpleStatus::Ok {
                    decode_listing(src)?
                } else {
                    Vec::new()
                };
                Response::ListAllAuctions(status, listing)
            }
            ("SRC", "RRC") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                let status = match status.as_str() {
                    "OK" => SimpleStatus::Ok,
                    "NOK" => SimpleStatus::Nok,
                    _ => return Err(AuctionError::ProtocolViolation),
                };
                let record = if status == SimpleStatus::Ok {
                    Some(decode_record_body(src)?)
                } else {
                    None
                };
                Response::ShowRecord(status, record)
            }
            ("OPA", "ROA") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                Response::OpenAuction(match status.as_str() {
                    "OK" => {
                        expect_space(src)?;
                        Result_::Ok(read_aid(src)?)
                    }
                    "NLG" => Result_::Fail(OpenStatus::Nlg),
                    "NOK" => Result_::Fail(OpenStatus::Nok),
                    _ => return Err(AuctionError::ProtocolViolation),
                })
            }
            ("CLS", "RCL") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                Response::CloseAuction(match status.as_str() {
                    "OK" => CloseStatus::Ok,
                    "NLG" => CloseStatus::Nlg,
                    "EAU" => CloseStatus::Eau,
                    "EOW" => CloseStatus::Eow,
                    "END" => CloseStatus::End,
                    _ => return Err(AuctionError::ProtocolViolation),
                })
            }
            ("SAS", "RSA") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                Response::ShowAsset(match status.as_str() {
                    "OK" => {
                        expect_space(src)?;
                        let name = read_file_name(src)?;
                        expect_space(src)?;
                        let size = read_number(src, 8)?;
                        expect_space(src)?;
                        let data = read_exact_bytes(src, size)?;
                        Result_::Ok((name, data))
                    }
                    "NOK" => Result_::Fail(SimpleStatus::Nok),
                    _ => return Err(AuctionError::ProtocolViolation),
                })
            }
            ("BID", "RBD") => {
                expect_space(src)?;
                let status = read_field(src, 3)?;
                Response::Bid(match status.as_str() {
                    "NLG" => BidStatus::Nlg,
                    "NOK" => BidStatus::Nok,
                    "ACC" => BidStatus::Acc,
                    "ILG" => BidStatus::Ilg,
                    "REF" => BidStatus::Ref,
                    _ => return Err(AuctionError::ProtocolViolation),
                })
            }
            _ => return Err(AuctionError::ProtocolViolation),
        };
        expect_newline(src)?;
        Ok(resp)
    }
}

fn parse_logout_status(s: &str) -> Result<LogoutStatus> {
    match s {
        "OK" => Ok(LogoutStatus::Ok),
        "NOK" => Ok(LogoutStatus::Nok),
        "UNR" => Ok(LogoutStatus::Unr),
        _ => Err(AuctionError::ProtocolViolation),
    }
}

fn decode_listing(src: &mut dyn MessageSource) -> Result<Vec<AuctionListing>> {
    let mut out = Vec::new();
    loop {
        match src.get() {
            Some(b'\n') => {
                src.unget(b'\n');
                break;
            }
            Some(b' ') => {
                let aid = read_aid(src)?;
                expect_space(src)?;
                let digit = read_field(src, 1)?;
                let state = match digit.as_str() {
                    "1" => AuctionState::Active,
                    "0" => AuctionState::Ended,
                    _ => return Err(AuctionError::ProtocolViolation),
                };
                out.push(AuctionListing { aid, state });
            }
            None => break,
            _ => return Err(AuctionError::ProtocolViolation),
        }
    }
    Ok(out)
}

fn decode_record_body(
    src: &mut dyn MessageSource,
) -> Result<(StartRecord, Vec<BidRecord>, Option<model::EndRecord>)> {
    expect_space(src)?;
    let host_uid = read_uid(src)?;
    expect_space(src)?;
    let name = read_auction_name(src)?;
    expect_space(src)?;
    let asset_filename = read_file_name(src)?;
    expect_space(src)?;
    let start_value = read_number(src, 6)? as u32;
    expect_space(src)?;
    let date = read_field(src, 10)?;
    expect_space(src)?;
    let time = read_field(src, 8)?;
    let start_time =
        model::parse_datetime(&format!("{date} {time}")).ok_or(AuctionError::ProtocolViolation)?;
    expect_space(src)?;
    let duration_secs = read_number(src, 5)? as u32;

    let start = StartRecord {
        host_uid,
        name,
        asset_filename,
        start_value,
        duration_secs,
        start_time,
    };

    let mut bids = Vec::new();
    let mut end = None;
    loop {
        match src.get() {
            Some(b'\n') => {
                src.unget(b'\n');
                break;
            }
            Some(b' ') => {
                let tag = read_field(src, 1)?;
                match tag.as_str() {
                    "B" => {
                        expect_space(src)?;
                        let bidder_uid = read_uid(src)?;
                        expect_space(src)?;
                        let value = read_number(src, 6)? as u32;
                        expect_space(src)?;
                        let date = read_field(src, 10)?;
                        expect_space(src)?;
                        let time = read_field(src, 8)?;
                        let bid_time = model::parse_datetime(&format!("{date} {time}"))
                            .ok_or(AuctionError::ProtocolViolation)?;
                        expect_space(src)?;
                        let elapsed_secs = read_number(src, 6)? as u32;
                        bids.push(BidRecord {
                            bidder_uid,
                            value,
                            time: bid_time,
                            elapsed_secs,
                        });
                    }
                    "E" => {
                        expect_space(src)?;
                        let date = read_field(src, 10)?;
                        expect_space(src)?;
                        let time = read_field(src, 8)?;
                        let end_time = model::parse_datetime(&format!("{date} {time}"))
                            .ok_or(AuctionError::ProtocolViolation)?;
                        expect_space(src)?;
                        let elapsed_secs = read_number(src, 6)? as u32;
                        end = Some(model::EndRecord {
                            end_time,
                            elapsed_secs,
                        });
                    }
                    _ => return Err(AuctionError::ProtocolViolation),
                }
            }
            None => break,
            _ => return Err(AuctionError::ProtocolViolation),
        }
    }
    Ok((start, bids, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn login_request_round_trips() {
        let req = Request::Login(Credentials {
            uid: "123456".into(),
            password: "abcd1234".into(),
        });
        let bytes = req.encode().unwrap();
        let mut src = BufferSource::new(&bytes);
        let decoded = Request::decode(&mut src).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn bid_request_round_trips() {
        let req = Request::Bid {
            credentials: Credentials {
                uid: "123456".into(),
                password: "abcd1234".into(),
            },
            aid: "007".into(),
            value: 250,
        };
        let bytes = req.encode().unwrap();
        let mut src = BufferSource::new(&bytes);
        assert_eq!(Request::decode(&mut src).unwrap(), req);
    }

    #[test]
    fn open_auction_request_round_trips_with_blob_containing_newlines() {
        let req = Request::OpenAuction {
            credentials: Credentials {
                uid: "123456".into(),
                password: "abcd1234".into(),
            },
            name: "lamp".into(),
            start_value: 10,
            duration_secs: 3600,
            file_name: "lamp.jpg".into(),
            file_data: vec![0xff, b'\n', 0x00, b' ', 0x10],
        };
        let bytes = req.encode().unwrap();
        let mut src = BufferSource::new(&bytes);
        assert_eq!(Request::decode(&mut src).unwrap(), req);
    }

    #[test]
    fn encode_rejects_uid_with_wrong_length() {
        let req = Request::Login(Credentials {
            uid: "12345".into(),
            password: "abcd1234".into(),
        });
        assert!(matches!(req.encode(), Err(AuctionError::ArgumentError(_))));
    }

    #[test]
    fn encode_rejects_auction_name_containing_a_space() {
        let req = Request::OpenAuction {
            credentials: Credentials {
                uid: "123456".into(),
                password: "abcd1234".into(),
            },
            name: "desk lamp".into(),
            start_value: 10,
            duration_secs: 3600,
            file_name: "lamp.jpg".into(),
            file_data: vec![1, 2, 3],
        };
        assert!(matches!(req.encode(), Err(AuctionError::ArgumentError(_))));
    }

    #[test]
    fn encode_rejects_file_name_over_the_length_limit() {
        let req = Request::OpenAuction {
            credentials: Credentials {
                uid: "123456".into(),
                password: "abcd1234".into(),
            },
            name: "lamp".into(),
            start_value: 10,
            duration_secs: 3600,
            file_name: "a".repeat(MAX_FILENAME_LEN + 1),
            file_data: vec![1, 2, 3],
        };
        assert!(matches!(req.encode(), Err(AuctionError::ArgumentError(_))));
    }

    #[test]
    fn rejects_uid_with_wrong_length() {
        let bytes = b"LIN 12345 abcd1234\n".to_vec();
        let mut src = BufferSource::new(&bytes);
        assert!(matches!(
            Request::decode(&mut src),
            Err(AuctionError::ProtocolViolation)
        ));
    }

    #[test]
    fn rejects_non_alphanumeric_password() {
        let bytes = b"LIN 123456 ab cd123\n".to_vec();
        let mut src = BufferSource::new(&bytes);
        assert!(Request::decode(&mut src).is_err());
    }

    #[test]
    fn err_response_decodes_regardless_of_request_kind() {
        let bytes = b"ERR\n".to_vec();
        let mut src = BufferSource::new(&bytes);
        assert_eq!(Response::decode(&mut src, "LIN").unwrap(), Response::Err);
    }

    #[test]
    fn show_record_response_round_trips_with_bids_and_end() {
        let start = StartRecord {
            host_uid: "123456".into(),
            name: "lamp".into(),
            asset_filename: "lamp.jpg".into(),
            start_value: 10,
            duration_secs: 3600,
            start_time: chrono::Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        };
        let bids = vec![BidRecord {
            bidder_uid: "654321".into(),
            value: 20,
            time: chrono::Local.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap(),
            elapsed_secs: 300,
        }];
        let end = Some(model::EndRecord {
            end_time: chrono::Local.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap(),
            elapsed_secs: 3600,
        });
        let resp = Response::ShowRecord(SimpleStatus::Ok, Some((start, bids, end)));
        let bytes = resp.encode();
        let mut src = BufferSource::new(&bytes);
        let decoded = Response::decode(&mut src, "SRC").unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn show_asset_response_round_trips_binary_blob() {
        let resp = Response::ShowAsset(Result_::Ok(("lamp.jpg".into(), vec![1, 2, 3, 0, 255])));
        let bytes = resp.encode();
        let mut src = BufferSource::new(&bytes);
        assert_eq!(Response::decode(&mut src, "SAS").unwrap(), resp);
    }
}
