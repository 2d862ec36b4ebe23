//! Value types for the data model: users, auctions, bids, and the two
//! on-disk record shapes the store reads and writes.

use chrono::{DateTime, Local, TimeZone};

/// The wire/store date-time format, e.g. `2024-05-01 13:45:00`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_datetime(dt: DateTime<Local>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub fn parse_datetime(s: &str) -> Option<DateTime<Local>> {
    let naive = chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok()?;
    Local.from_local_datetime(&naive).single()
}

/// A 6-digit user identifier, kept as its zero-padded string form since the
/// wire format never treats it arithmetically.
pub type Uid = String;

/// A 3-digit auction identifier, zero-padded.
pub type Aid = String;

/// An auction's persisted opening record: everything fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRecord {
    pub host_uid: Uid,
    pub name: String,
    pub asset_filename: String,
    pub start_value: u32,
    pub duration_secs: u32,
    pub start_time: DateTime<Local>,
}

impl StartRecord {
    /// `host-uid name asset-filename start-value duration start-date-time start-epoch`
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            self.host_uid,
            self.name,
            self.asset_filename,
            self.start_value,
            self.duration_secs,
            format_datetime(self.start_time),
            self.start_time.timestamp()
        )
    }

    pub fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(7, ' ');
        let host_uid = parts.next()?.to_string();
        let name = parts.next()?.to_string();
        let asset_filename = parts.next()?.to_string();
        let start_value = parts.next()?.parse().ok()?;
        let duration_secs = parts.next()?.parse().ok()?;
        let date = parts.next()?;
        let time = parts.next()?;
        let start_time = parse_datetime(&format!("{date} {time}"))?;
        Some(Self {
            host_uid,
            name,
            asset_filename,
            start_value,
            duration_secs,
            start_time,
        })
    }

    pub fn end_time(&self) -> DateTime<Local> {
        self.start_time + chrono::Duration::seconds(self.duration_secs as i64)
    }

    pub fn is_active(&self, now: DateTime<Local>, ended: bool) -> bool {
        !ended && now < self.end_time()
    }
}

/// An auction's persisted closing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndRecord {
    pub end_time: DateTime<Local>,
    pub elapsed_secs: u32,
}

impl EndRecord {
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {}",
            format_datetime(self.end_time),
            self.end_time.timestamp(),
            self.elapsed_secs
        )
    }

    pub fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, ' ');
        let date = parts.next()?;
        let time = parts.next()?;
        let _epoch = parts.next()?;
        let elapsed_secs = parts.next()?.parse().ok()?;
        let end_time = parse_datetime(&format!("{date} {time}"))?;
        Some(Self {
            end_time,
            elapsed_secs,
        })
    }
}

/// A single placed bid, as read back from `BIDS/<value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidRecord {
    pub bidder_uid: Uid,
    pub value: u32,
    pub time: DateTime<Local>,
    pub elapsed_secs: u32,
}

impl BidRecord {
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {}",
            self.bidder_uid,
            self.value,
            format_datetime(self.time),
            self.elapsed_secs
        )
    }

    pub fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(5, ' ');
        let bidder_uid = parts.next()?.to_string();
        let value = parts.next()?.parse().ok()?;
        let date = parts.next()?;
        let time = parts.next()?;
        let elapsed_secs = parts.next()?.parse().ok()?;
        let parsed_time = parse_datetime(&format!("{date} {time}"))?;
        Some(Self {
            bidder_uid,
            value,
            time: parsed_time,
            elapsed_secs,
        })
    }
}

/// Whether a listed auction is still active, for LMA/LMB/LST replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionState {
    Active,
    Ended,
}

impl AuctionState {
    pub fn as_digit(self) -> char {
        match self {
            AuctionState::Active => '1',
            AuctionState::Ended => '0',
        }
    }
}

/// The full record a `SRC` reply assembles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionRecord {
    pub start: StartRecord,
    pub bids: Vec<BidRecord>,
    pub end: Option<EndRecord>,
}
