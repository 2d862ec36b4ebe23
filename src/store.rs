//! Filesystem-backed persistent state: users, auctions, bids, and asset
//! blobs.
//!
//! A single Tokio task (spawned by [`Store::spawn`]) owns the tree and
//! drains a command channel strictly in order, so every mutation it
//! performs is totally ordered against every other caller's — the
//! in-process substitute for the original server's named semaphore (see
//! `DESIGN.md`). [`Store`] itself is a cheap-to-clone handle around the
//! channel's sending half.

use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::sync::{mpsc, oneshot};

use crate::codec::{AuctionListing, BidStatus, CloseStatus, ListStatus, LoginStatus, LogoutStatus, OpenStatus, SimpleStatus};
use crate::error::{AuctionError, Result};
use crate::model::{Aid, AuctionState, BidRecord, EndRecord, StartRecord, Uid};

type Responder<T> = oneshot::Sender<Result<T>>;

pub struct OpenAuctionArgs {
    pub uid: Uid,
    pub password: String,
    pub name: String,
    pub start_value: u32,
    pub duration_secs: u32,
    pub file_name: String,
    pub file_data: Vec<u8>,
}

enum Command {
    Login {
        uid: Uid,
        password: String,
        resp: Responder<LoginStatus>,
    },
    Logout {
        uid: Uid,
        password: String,
        resp: Responder<LogoutStatus>,
    },
    Unregister {
        uid: Uid,
        password: String,
        resp: Responder<LogoutStatus>,
    },
    ListUserAuctions {
        uid: Uid,
        resp: Responder<(ListStatus, Vec<AuctionListing>)>,
    },
    ListUserBids {
        uid: Uid,
        resp: Responder<(ListStatus, Vec<AuctionListing>)>,
    },
    ListAllAuctions {
        resp: Responder<(SimpleStatus, Vec<AuctionListing>)>,
    },
    ShowRecord {
        aid: Aid,
        resp: Responder<(SimpleStatus, Option<(StartRecord, Vec<BidRecord>, Option<EndRecord>)>)>,
    },
    OpenAuction {
        args: OpenAuctionArgs,
        resp: Responder<std::result::Result<Aid, OpenStatus>>,
    },
    CloseAuction {
        uid: Uid,
        password: String,
        aid: Aid,
        resp: Responder<CloseStatus>,
    },
    ShowAsset {
        aid: Aid,
        resp: Responder<std::result::Result<(String, Vec<u8>), SimpleStatus>>,
    },
    Bid {
        uid: Uid,
        password: String,
        aid: Aid,
        value: u32,
        resp: Responder<BidStatus>,
    },
}

/// A cheap-to-clone handle to the store actor.
#[derive(Clone)]
pub struct Store {
    tx: mpsc::Sender<Command>,
}

impl Store {
    /// Spawns the owning task and returns a handle to it.
    pub fn spawn(root: PathBuf) -> Store {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(run(root, rx));
        Store { tx }
    }

    async fn call<T>(&self, make: impl FnOnce(Responder<T>) -> Command) -> Result<T> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx.send(make(resp_tx)).await?;
        resp_rx.await?
    }

    pub async fn login(&self, uid: Uid, password: String) -> Result<LoginStatus> {
        self.call(|resp| Command::Login { uid, password, resp }).await
    }

    pub async fn logout(&self, uid: Uid, password: String) -> Result<LogoutStatus> {
        self.call(|resp| Command::Logout { uid, password, resp }).await
    }

    pub async fn unregister(&self, uid: Uid, password: String) -> Result<LogoutStatus> {
        self.call(|resp| Command::Unregister { uid, password, resp }).await
    }

    pub async fn list_user_auctions(&self, uid: Uid) -> Result<(ListStatus, Vec<AuctionListing>)> {
        self.call(|resp| Command::ListUserAuctions { uid, resp }).await
    }

    pub async fn list_user_bids(&self, uid: Uid) -> Result<(ListStatus, Vec<AuctionListing>)> {
        self.call(|resp| Command::ListUserBids { uid, resp }).await
    }

    pub async fn list_all_auctions(&self) -> Result<(SimpleStatus, Vec<AuctionListing>)> {
        self.call(|resp| Command::ListAllAuctions { resp }).await
    }

    pub async fn show_record(
        &self,
        aid: Aid,
    ) -> Result<(SimpleStatus, Option<(StartRecord, Vec<BidRecord>, Option<EndRecord>)>)> {
        self.call(|resp| Command::ShowRecord { aid, resp }).await
    }

    pub async fn open_auction(
        &self,
        args: OpenAuctionArgs,
    ) -> Result<std::result::Result<Aid, OpenStatus>> {
        self.call(|resp| Command::OpenAuction { args, resp }).await
    }

    pub async fn close_auction(&self, uid: Uid, password: String, aid: Aid) -> Result<CloseStatus> {
        self.call(|resp| Command::CloseAuction {
            uid,
            password,
            aid,
            resp,
        })
        .await
    }

    pub async fn show_asset(
        &self,
        aid: Aid,
    ) -> Result<std::result::Result<(String, Vec<u8>), SimpleStatus>> {
        self.call(|resp| Command::ShowAsset { aid, resp }).await
    }

    pub async fn bid(&self, uid: Uid, password: String, aid: Aid, value: u32) -> Result<BidStatus> {
        self.call(|resp| Command::Bid {
            uid,
            password,
            aid,
            value,
            resp,
        })
        .await
    }
}

async fn run(root: PathBuf, mut rx: mpsc::Receiver<Command>) {
    let fs = Fs::new(root);
    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Login { uid, password, resp } => {
                let _ = resp.send(fs.login(&uid, &password));
            }
            Command::Logout { uid, password, resp } => {
                let _ = resp.send(fs.logout(&uid, &password));
            }
            Command::Unregister { uid, password, resp } => {
                let _ = resp.send(fs.unregister(&uid, &password));
            }
            Command::ListUserAuctions { uid, resp } => {
                let _ = resp.send(fs.list_user_auctions(&uid));
            }
            Command::ListUserBids { uid, resp } => {
                let _ = resp.send(fs.list_user_bids(&uid));
            }
            Command::ListAllAuctions { resp } => {
                let _ = resp.send(fs.list_all_auctions());
            }
            Command::ShowRecord { aid, resp } => {
                let _ = resp.send(fs.show_record(&aid));
            }
            Command::OpenAuction { args, resp } => {
                let _ = resp.send(fs.open_auction(args));
            }
            Command::CloseAuction { uid, password, aid, resp } => {
                let _ = resp.send(fs.close_auction(&uid, &password, &aid));
            }
            Command::ShowAsset { aid, resp } => {
                let _ = resp.send(fs.show_asset(&aid));
            }
            Command::Bid { uid, password, aid, value, resp } => {
                let _ = resp.send(fs.bid(&uid, &password, &aid, value));
            }
        }
    }
}

/// The actual directory-tree logic. Every method here runs to completion
/// inside the single owning task, with no `.await` in between reads and
/// writes, which is what makes the whole tree race-free.
struct Fs {
    root: PathBuf,
}

impl Fs {
    fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn users_dir(&self) -> PathBuf {
        self.root.join("USERS")
    }

    fn user_dir(&self, uid: &str) -> PathBuf {
        self.users_dir().join(uid)
    }

    fn auctions_dir(&self) -> PathBuf {
        self.root.join("AUCTIONS")
    }

    fn auction_dir(&self, aid: &str) -> PathBuf {
        self.auctions_dir().join(aid)
    }

    fn guarantee_base(&self) -> Result<()> {
        fs::create_dir_all(self.users_dir()).map_err(db_err)?;
        fs::create_dir_all(self.auctions_dir()).map_err(db_err)?;
        Ok(())
    }

    fn guarantee_user(&self, uid: &str) -> Result<()> {
        self.guarantee_base()?;
        let dir = self.user_dir(uid);
        fs::create_dir_all(dir.join("HOSTED")).map_err(db_err)?;
        fs::create_dir_all(dir.join("BIDDED")).map_err(db_err)?;
        Ok(())
    }

    fn guarantee_auction(&self, aid: &str) -> Result<()> {
        self.guarantee_base()?;
        let dir = self.auction_dir(aid);
        fs::create_dir_all(dir.join("BIDS")).map_err(db_err)?;
        fs::create_dir_all(dir.join("FILE")).map_err(db_err)?;
        Ok(())
    }

    fn pass_path(&self, uid: &str) -> PathBuf {
        self.user_dir(uid).join(format!("{uid}_pass"))
    }

    fn login_marker_path(&self, uid: &str) -> PathBuf {
        self.user_dir(uid).join(format!("{uid}_login"))
    }

    fn user_exists(&self, uid: &str) -> bool {
        self.user_dir(uid).is_dir()
    }

    fn is_registered(&self, uid: &str) -> bool {
        self.pass_path(uid).is_file()
    }

    fn is_logged_in(&self, uid: &str) -> bool {
        self.login_marker_path(uid).is_file()
    }

    fn stored_password(&self, uid: &str) -> Option<String> {
        fs::read_to_string(self.pass_path(uid)).ok()
    }

    fn start_path(&self, aid: &str) -> PathBuf {
        self.auction_dir(aid).join(format!("START_{aid}"))
    }

    fn end_path(&self, aid: &str) -> PathBuf {
        self.auction_dir(aid).join(format!("END_{aid}"))
    }

    fn auction_exists(&self, aid: &str) -> bool {
        self.auction_dir(aid).is_dir()
    }

    fn read_start(&self, aid: &str) -> Result<StartRecord> {
        let line = fs::read_to_string(self.start_path(aid)).map_err(db_err)?;
        StartRecord::from_line(line.trim()).ok_or_else(|| {
            AuctionError::Database(format!("corrupt start record for auction {aid}"))
        })
    }

    fn read_end(&self, aid: &str) -> Result<Option<EndRecord>> {
        let path = self.end_path(aid);
        if !path.is_file() {
            return Ok(None);
        }
        let line = fs::read_to_string(path).map_err(db_err)?;
        EndRecord::from_line(line.trim())
            .map(Some)
            .ok_or_else(|| AuctionError::Database(format!("corrupt end record for auction {aid}")))
    }

    fn read_bids(&self, aid: &str) -> Result<Vec<BidRecord>> {
        let dir = self.auction_dir(aid).join("BIDS");
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut bids = Vec::new();
        for entry in fs::read_dir(&dir).map_err(db_err)? {
            let entry = entry.map_err(db_err)?;
            let line = fs::read_to_string(entry.path()).map_err(db_err)?;
            if let Some(bid) = BidRecord::from_line(line.trim()) {
                bids.push(bid);
            }
        }
        bids.sort_by_key(|b| b.value);
        Ok(bids)
    }

    fn highest_bid_value(&self, aid: &str) -> Result<Option<u32>> {
        Ok(self.read_bids(aid)?.into_iter().map(|b| b.value).max())
    }

    /// Writes an END record dated at `start + duration` if the auction's
    /// duration has elapsed and no END exists yet. Returns whether the
    /// auction is ended after this call.
    fn lazy_end(&self, aid: &str, start: &StartRecord) -> Result<bool> {
        if self.end_path(aid).is_file() {
            return Ok(true);
        }
        let now = Local::now();
        if now < start.end_time() {
            return Ok(false);
        }
        let end = EndRecord {
            end_time: start.end_time(),
            elapsed_secs: start.duration_secs,
        };
        fs::write(self.end_path(aid), end.to_line()).map_err(db_err)?;
        Ok(true)
    }

    fn sorted_dir_entries(&self, dir: &Path) -> Result<Vec<String>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(dir)
            .map_err(db_err)?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        Ok(names)
    }

    fn auction_state(&self, aid: &str, start: &StartRecord) -> Result<AuctionState> {
        let ended = self.lazy_end(aid, start)?;
        Ok(if start.is_active(Local::now(), ended) {
            AuctionState::Active
        } else {
            AuctionState::Ended
        })
    }

    fn listing_for(&self, aids: &[String]) -> Result<Vec<AuctionListing>> {
        let mut out = Vec::with_capacity(aids.len());
        for aid in aids {
            let start = self.read_start(aid)?;
            let state = self.auction_state(aid, &start)?;
            out.push(AuctionListing {
                aid: aid.clone(),
                state,
            });
        }
        Ok(out)
    }

    // -- public operations -------------------------------------------------

    fn login(&self, uid: &str, password: &str) -> Result<LoginStatus> {
        self.guarantee_user(uid)?;
        if self.is_registered(uid) {
            if self.stored_password(uid).as_deref() == Some(password) {
                fs::write(self.login_marker_path(uid), "1").map_err(db_err)?;
                Ok(LoginStatus::Ok)
            } else {
                Ok(LoginStatus::Nok)
            }
        } else {
            fs::write(self.pass_path(uid), password).map_err(db_err)?;
            fs::write(self.login_marker_path(uid), "1").map_err(db_err)?;
            Ok(LoginStatus::Reg)
        }
    }

    fn logout(&self, uid: &str, password: &str) -> Result<LogoutStatus> {
        if !self.is_logged_in(uid) {
            return Ok(LogoutStatus::Nok);
        }
        if !self.is_registered(uid) {
            return Ok(LogoutStatus::Unr);
        }
        if self.stored_password(uid).as_deref() != Some(password) {
            return Ok(LogoutStatus::Nok);
        }
        let _ = fs::remove_file(self.login_marker_path(uid));
        Ok(LogoutStatus::Ok)
    }

    fn unregister(&self, uid: &str, password: &str) -> Result<LogoutStatus> {
        if !self.is_logged_in(uid) {
            return Ok(LogoutStatus::Nok);
        }
        if !self.is_registered(uid) {
            return Ok(LogoutStatus::Unr);
        }
        if self.stored_password(uid).as_deref() != Some(password) {
            return Ok(LogoutStatus::Nok);
        }
        let _ = fs::remove_file(self.login_marker_path(uid));
        let _ = fs::remove_file(self.pass_path(uid));
        Ok(LogoutStatus::Ok)
    }

    fn list_user_auctions(&self, uid: &str) -> Result<(ListStatus, Vec<AuctionListing>)> {
        if !self.is_logged_in(uid) {
            return Ok((ListStatus::Nlg, Vec::new()));
        }
        let hosted = self.sorted_dir_entries(&self.user_dir(uid).join("HOSTED"))?;
        if hosted.is_empty() {
            return Ok((ListStatus::Nok, Vec::new()));
        }
        Ok((ListStatus::Ok, self.listing_for(&hosted)?))
    }

    fn list_user_bids(&self, uid: &str) -> Result<(ListStatus, Vec<AuctionListing>)> {
        if !self.is_logged_in(uid) {
            return Ok((ListStatus::Nlg, Vec::new()));
        }
        let bidded = self.sorted_dir_entries(&self.user_dir(uid).join("BIDDED"))?;
        if bidded.is_empty() {
            return Ok((ListStatus::Nok, Vec::new()));
        }
        Ok((ListStatus::Ok, self.listing_for(&bidded)?))
    }

    fn list_all_auctions(&self) -> Result<(SimpleStatus, Vec<AuctionListing>)> {
        let all = self.sorted_dir_entries(&self.auctions_dir())?;
        if all.is_empty() {
            return Ok((SimpleStatus::Nok, Vec::new()));
        }
        Ok((SimpleStatus::Ok, self.listing_for(&all)?))
    }

    fn show_record(
        &self,
        aid: &str,
    ) -> Result<(SimpleStatus, Option<(StartRecord, Vec<BidRecord>, Option<EndRecord>)>)> {
        if !self.auction_exists(aid) {
            return Ok((SimpleStatus::Nok, None));
        }
        let start = self.read_start(aid)?;
        self.lazy_end(aid, &start)?;
        let bids = self.read_bids(aid)?;
        let end = self.read_end(aid)?;
        Ok((SimpleStatus::Ok, Some((start, bids, end))))
    }

    fn next_aid(&self) -> Result<Aid> {
        let existing = self.sorted_dir_entries(&self.auctions_dir())?;
        let next = existing
            .iter()
            .filter_map(|s| s.parse::<u32>().ok())
            .max()
            .map(|m| m + 1)
            .unwrap_or(1);
        Ok(format!("{next:03}"))
    }

    fn open_auction(&self, args: OpenAuctionArgs) -> Result<std::result::Result<Aid, OpenStatus>> {
        self.guarantee_user(&args.uid)?;
        if !self.is_logged_in(&args.uid) {
            return Ok(Err(OpenStatus::Nlg));
        }
        if self.stored_password(&args.uid).as_deref() != Some(args.password.as_str()) {
            return Ok(Err(OpenStatus::Nlg));
        }

        let aid = self.next_aid()?;
        self.guarantee_auction(&aid)?;

        let start = StartRecord {
            host_uid: args.uid.clone(),
            name: args.name,
            asset_filename: args.file_name.clone(),
            start_value: args.start_value,
            duration_secs: args.duration_secs,
            start_time: Local::now(),
        };
        fs::write(self.start_path(&aid), start.to_line()).map_err(db_err)?;
        fs::write(
            self.auction_dir(&aid).join("FILE").join(&args.file_name),
            &args.file_data,
        )
        .map_err(db_err)?;

        let hosted_link = self.user_dir(&args.uid).join("HOSTED").join(&aid);
        if !hosted_link.exists() {
            symlink(self.auction_dir(&aid), &hosted_link).map_err(db_err)?;
        }

        Ok(Ok(aid))
    }

    fn close_auction(&self, uid: &str, password: &str, aid: &str) -> Result<CloseStatus> {
        if !self.is_logged_in(uid) || self.stored_password(uid).as_deref() != Some(password) {
            return Ok(CloseStatus::Nlg);
        }
        if !self.auction_exists(aid) {
            return Ok(CloseStatus::Eau);
        }
        let start = self.read_start(aid)?;
        if start.host_uid != uid {
            return Ok(CloseStatus::Eow);
        }
        if self.lazy_end(aid, &start)? {
            return Ok(CloseStatus::End);
        }
        let end = EndRecord {
            end_time: Local::now(),
            elapsed_secs: (Local::now() - start.start_time).num_seconds().max(0) as u32,
        };
        fs::write(self.end_path(aid), end.to_line()).map_err(db_err)?;
        Ok(CloseStatus::Ok)
    }

    fn show_asset(&self, aid: &str) -> Result<std::result::Result<(String, Vec<u8>), SimpleStatus>> {
        if !self.auction_exists(aid) {
            return Ok(Err(SimpleStatus::Nok));
        }
        let start = self.read_start(aid)?;
        let file_dir = self.auction_dir(aid).join("FILE");
        let path = file_dir.join(&start.asset_filename);
        let data = match fs::read(&path) {
            Ok(d) => d,
            Err(_) => return Ok(Err(SimpleStatus::Nok)),
        };
        Ok(Ok((start.asset_filename, data)))
    }

    fn bid(&self, uid: &str, password: &str, aid: &str, value: u32) -> Result<BidStatus> {
        if !self.is_logged_in(uid) || self.stored_password(uid).as_deref() != Some(password) {
            return Ok(BidStatus::Nlg);
        }
        if !self.auction_exists(aid) {
            return Ok(BidStatus::Nok);
        }
        let start = self.read_start(aid)?;
        if self.lazy_end(aid, &start)? {
            return Ok(BidStatus::Nok);
        }
        if start.host_uid == uid {
            return Ok(BidStatus::Ilg);
        }
        let floor = self.highest_bid_value(aid)?.unwrap_or(start.start_value);
        if value <= floor {
            return Ok(BidStatus::Ref);
        }

        self.guarantee_user(uid)?;
        let elapsed = (Local::now() - start.start_time).num_seconds().max(0) as u32;
        let bid = BidRecord {
            bidder_uid: uid.to_string(),
            value,
            time: Local::now(),
            elapsed_secs: elapsed,
        };
        fs::write(self.auction_dir(aid).join("BIDS").join(value.to_string()), bid.to_line())
            .map_err(db_err)?;

        let bidded_link = self.user_dir(uid).join("BIDDED").join(aid);
        if !bidded_link.exists() {
            symlink(self.auction_dir(aid), &bidded_link).map_err(db_err)?;
        }
        Ok(BidStatus::Acc)
    }
}

fn db_err(e: std::io::Error) -> AuctionError {
    AuctionError::Database(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_fs(root: &Path) -> Fs {
        Fs::new(root.to_path_buf())
    }

    #[test]
    fn login_registers_unknown_uid_then_accepts_known_password() {
        let dir = tempdir().unwrap();
        let fs = store_fs(dir.path());
        assert_eq!(fs.login("123456", "abcd1234").unwrap(), LoginStatus::Reg);
        assert_eq!(fs.login("123456", "abcd1234").unwrap(), LoginStatus::Ok);
        assert_eq!(fs.login("123456", "wrongpwd").unwrap(), LoginStatus::Nok);
    }

    #[test]
    fn logout_requires_login_and_matching_password() {
        let dir = tempdir().unwrap();
        let fs = store_fs(dir.path());
        assert_eq!(fs.logout("123456", "abcd1234").unwrap(), LogoutStatus::Nok);
        fs.login("123456", "abcd1234").unwrap();
        assert_eq!(fs.logout("123456", "abcd1234").unwrap(), LogoutStatus::Ok);
    }

    #[test]
    fn unregister_keeps_hosted_links_but_clears_credentials() {
        let dir = tempdir().unwrap();
        let fs = store_fs(dir.path());
        fs.login("123456", "abcd1234").unwrap();
        assert_eq!(
            fs.unregister("123456", "abcd1234").unwrap(),
            LogoutStatus::Ok
        );
        assert!(!fs.is_registered("123456"));
        assert!(fs.user_exists("123456"));
    }

    #[test]
    fn open_auction_allocates_monotonic_aids() {
        let dir = tempdir().unwrap();
        let fs = store_fs(dir.path());
        fs.login("123456", "abcd1234").unwrap();
        let args = |name: &str| OpenAuctionArgs {
            uid: "123456".into(),
            password: "abcd1234".into(),
            name: name.into(),
            start_value: 10,
            duration_secs: 3600,
            file_name: "a.jpg".into(),
            file_data: vec![1, 2, 3],
        };
        let aid1 = fs.open_auction(args("first")).unwrap().unwrap();
        let aid2 = fs.open_auction(args("second")).unwrap().unwrap();
        assert_eq!(aid1, "001");
        assert_eq!(aid2, "002");
    }

    #[test]
    fn host_cannot_bid_on_their_own_auction() {
        let dir = tempdir().unwrap();
        let fs = store_fs(dir.path());
        fs.login("123456", "abcd1234").unwrap();
        let aid = fs
            .open_auction(OpenAuctionArgs {
                uid: "123456".into(),
                password: "abcd1234".into(),
                name: "lamp".into(),
                start_value: 10,
                duration_secs: 3600,
                file_name: "a.jpg".into(),
                file_data: vec![],
            })
            .unwrap()
            .unwrap();
        assert_eq!(
            fs.bid("123456", "abcd1234", &aid, 20).unwrap(),
            BidStatus::Ilg
        );
    }

    #[test]
    fn bid_must_strictly_exceed_the_current_high_bid() {
        let dir = tempdir().unwrap();
        let fs = store_fs(dir.path());
        fs.login("111111", "abcd1234").unwrap();
        fs.login("222222", "zzzz9999").unwrap();
        let aid = fs
            .open_auction(OpenAuctionArgs {
                uid: "111111".into(),
                password: "abcd1234".into(),
                name: "lamp".into(),
                start_value: 10,
                duration_secs: 3600,
                file_name: "a.jpg".into(),
                file_data: vec![],
            })
            .unwrap()
            .unwrap();
        assert_eq!(
            fs.bid("222222", "zzzz9999", &aid, 5).unwrap(),
            BidStatus::Ref
        );
        assert_eq!(
            fs.bid("222222", "zzzz9999", &aid, 15).unwrap(),
            BidStatus::Acc
        );
        assert_eq!(
            fs.bid("222222", "zzzz9999", &aid, 15).unwrap(),
            BidStatus::Ref
        );
    }

    #[test]
    fn close_auction_requires_the_host() {
        let dir = tempdir().unwrap();
        let fs = store_fs(dir.path());
        fs.login("111111", "abcd1234").unwrap();
        fs.login("222222", "zzzz9999").unwrap();
        let aid = fs
            .open_auction(OpenAuctionArgs {
                uid: "111111".into(),
                password: "abcd1234".into(),
                name: "lamp".into(),
                start_value: 10,
                duration_secs: 3600,
                file_name: "a.jpg".into(),
                file_data: vec![],
            })
            .unwrap()
            .unwrap();
        assert_eq!(
            fs.close_auction("222222", "zzzz9999", &aid).unwrap(),
            CloseStatus::Eow
        );
        assert_eq!(
            fs.close_auction("111111", "abcd1234", &aid).unwrap(),
            CloseStatus::Ok
        );
        assert_eq!(
            fs.close_auction("111111", "abcd1234", &aid).unwrap(),
            CloseStatus::End
        );
    }

    #[test]
    fn close_auction_unknown_aid_is_eau() {
        let dir = tempdir().unwrap();
        let fs = store_fs(dir.path());
        fs.login("111111", "abcd1234").unwrap();
        assert_eq!(
            fs.close_auction("111111", "abcd1234", "999").unwrap(),
            CloseStatus::Eau
        );
    }
}
