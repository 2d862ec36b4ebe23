//! Request handling: translates a decoded [`Request`] into a [`Store`]
//! command and the command's outcome into a wire [`Response`].
//!
//! Mirrors `get_result` in the teacher's server loop — decode, build a
//! command, await the store's reply, map the result to a reply opcode —
//! with one function per request kind so each can be
//! `#[tracing::instrument]`ed independently.

use tracing::instrument;

use crate::codec::{Request, Response, Result_};
use crate::store::{OpenAuctionArgs, Store};

/// Handles one already-decoded request and produces the matching response.
#[instrument(skip(store))]
pub async fn dispatch(request: Request, store: &Store) -> Response {
    match request {
        Request::Login(creds) => {
            let status = store
                .login(creds.uid.clone(), creds.password)
                .await
                .unwrap_or(crate::codec::LoginStatus::Nok);
            log_result(&creds.uid, "LIN", &format!("{status:?}"));
            Response::Login(status)
        }
        Request::Logout(creds) => {
            let status = store
                .logout(creds.uid.clone(), creds.password)
                .await
                .unwrap_or(crate::codec::LogoutStatus::Nok);
            log_result(&creds.uid, "LOU", &format!("{status:?}"));
            Response::Logout(status)
        }
        Request::Unregister(creds) => {
            let status = store
                .unregister(creds.uid.clone(), creds.password)
                .await
                .unwrap_or(crate::codec::LogoutStatus::Nok);
            log_result(&creds.uid, "UNR", &format!("{status:?}"));
            Response::Unregister(status)
        }
        Request::ListUserAuctions { uid } => {
            let (status, listing) = store
                .list_user_auctions(uid.clone())
                .await
                .unwrap_or((crate::codec::ListStatus::Nok, Vec::new()));
            log_result(&uid, "LMA", &format!("{status:?}"));
            Response::ListUserAuctions(status, listing)
        }
        Request::ListUserBids { uid } => {
            let (status, listing) = store
                .list_user_bids(uid.clone())
                .await
                .unwrap_or((crate::codec::ListStatus::Nok, Vec::new()));
            log_result(&uid, "LMB", &format!("{status:?}"));
            Response::ListUserBids(status, listing)
        }
        Request::ListAllAuctions => {
            let (status, listing) = store
                .list_all_auctions()
                .await
                .unwrap_or((crate::codec::SimpleStatus::Nok, Vec::new()));
            log_result("-", "LST", &format!("{status:?}"));
            Response::ListAllAuctions(status, listing)
        }
        Request::ShowRecord { aid } => {
            let (status, record) = store
                .show_record(aid.clone())
                .await
                .unwrap_or((crate::codec::SimpleStatus::Nok, None));
            log_result(&aid, "SRC", &format!("{status:?}"));
            Response::ShowRecord(status, record)
        }
        Request::OpenAuction {
            credentials,
            name,
            start_value,
            duration_secs,
            file_name,
            file_data,
        } => {
            let args = OpenAuctionArgs {
                uid: credentials.uid.clone(),
                password: credentials.password,
                name,
                start_value,
                duration_secs,
                file_name,
                file_data,
            };
            let outcome = store
                .open_auction(args)
                .await
                .unwrap_or(Err(crate::codec::OpenStatus::Nok));
            log_result(&credentials.uid, "OPA", &format!("{outcome:?}"));
            Response::OpenAuction(match outcome {
                Ok(aid) => Result_::Ok(aid),
                Err(status) => Result_::Fail(status),
            })
        }
        Request::CloseAuction { credentials, aid } => {
            let status = store
                .close_auction(credentials.uid.clone(), credentials.password, aid.clone())
                .await
                .unwrap_or(crate::codec::CloseStatus::Nlg);
            log_result(&credentials.uid, "CLS", &format!("{status:?}"));
            Response::CloseAuction(status)
        }
        Request::ShowAsset { aid } => {
            let outcome = store
                .show_asset(aid.clone())
                .await
                .unwrap_or(Err(crate::codec::SimpleStatus::Nok));
            log_result(&aid, "SAS", outcome_tag(&outcome));
            Response::ShowAsset(match outcome {
                Ok((name, data)) => Result_::Ok((name, data)),
                Err(status) => Result_::Fail(status),
            })
        }
        Request::Bid { credentials, aid, value } => {
            let status = store
                .bid(credentials.uid.clone(), credentials.password, aid, value)
                .await
                .unwrap_or(crate::codec::BidStatus::Nok);
            log_result(&credentials.uid, "BID", &format!("{status:?}"));
            Response::Bid(status)
        }
    }
}

fn outcome_tag(outcome: &std::result::Result<(String, Vec<u8>), crate::codec::SimpleStatus>) -> &'static str {
    match outcome {
        Ok(_) => "Ok",
        Err(_) => "Nok",
    }
}

fn log_result(uid: &str, request: &str, result: &str) {
    tracing::info!("[LOG] From: {uid} Request: {request} Result: {result}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Credentials;
    use tempfile::tempdir;

    #[tokio::test]
    async fn login_then_open_then_bid_happy_path() {
        let dir = tempdir().unwrap();
        let store = Store::spawn(dir.path().to_path_buf());

        let resp = dispatch(
            Request::Login(Credentials {
                uid: "111111".into(),
                password: "abcd1234".into(),
            }),
            &store,
        )
        .await;
        assert_eq!(resp, Response::Login(crate::codec::LoginStatus::Reg));

        let resp = dispatch(
            Request::OpenAuction {
                credentials: Credentials {
                    uid: "111111".into(),
                    password: "abcd1234".into(),
                },
                name: "lamp".into(),
                start_value: 10,
                duration_secs: 3600,
                file_name: "lamp.jpg".into(),
                file_data: vec![1, 2, 3],
            },
            &store,
        )
        .await;
        let aid = match resp {
            Response::OpenAuction(Result_::Ok(aid)) => aid,
            other => panic!("unexpected response: {other:?}"),
        };

        dispatch(
            Request::Login(Credentials {
                uid: "222222".into(),
                password: "zzzz9999".into(),
            }),
            &store,
        )
        .await;

        let resp = dispatch(
            Request::Bid {
                credentials: Credentials {
                    uid: "222222".into(),
                    password: "zzzz9999".into(),
                },
                aid,
                value: 20,
            },
            &store,
        )
        .await;
        assert_eq!(resp, Response::Bid(crate::codec::BidStatus::Acc));
    }
}
