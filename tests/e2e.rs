//! End-to-end scenarios: a real store actor plus real UDP/TCP listeners,
//! driven over real sockets, against an ephemeral store root.
//!
//! Grounded on the teacher's `test_full_run` (`src/tests/e2e_test.rs`):
//! spawn the real server tasks in-process against an ephemeral port, then
//! exercise them exactly the way a client would.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, UdpSocket};

use auctionhouse::codec::{Credentials, Request, Response, Result_};
use auctionhouse::store::Store;
use auctionhouse::transport::{run_tcp_server, run_udp_server, send_request};

async fn spawn_server() -> (SocketAddr, tempfile::TempDir) {
    let data_dir = tempfile::tempdir().unwrap();
    let store = Store::spawn(data_dir.path().to_path_buf());

    let udp_socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = udp_socket.local_addr().unwrap();
    let tcp_listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(run_udp_server(udp_socket, store.clone()));
    tokio::spawn(run_tcp_server(tcp_listener, store));

    // give the listeners a moment to start accepting.
    tokio::time::sleep(Duration::from_millis(20)).await;
    (addr, data_dir)
}

#[tokio::test]
async fn fresh_login_registers_then_second_login_succeeds() {
    let (addr, _dir) = spawn_server().await;
    let creds = Credentials {
        uid: "111111".into(),
        password: "abcd1234".into(),
    };

    let resp = send_request(addr, &Request::Login(creds.clone()))
        .await
        .unwrap();
    assert_eq!(resp, Response::Login(auctionhouse::codec::LoginStatus::Reg));

    let resp = send_request(addr, &Request::Login(creds))
        .await
        .unwrap();
    assert_eq!(resp, Response::Login(auctionhouse::codec::LoginStatus::Ok));
}

#[tokio::test]
async fn logout_then_list_user_auctions_is_not_logged_in() {
    let (addr, _dir) = spawn_server().await;
    let creds = Credentials {
        uid: "222222".into(),
        password: "zzzz9999".into(),
    };
    send_request(addr, &Request::Login(creds.clone())).await.unwrap();
    let resp = send_request(addr, &Request::Logout(creds.clone())).await.unwrap();
    assert_eq!(resp, Response::Logout(auctionhouse::codec::LogoutStatus::Ok));

    let resp = send_request(addr, &Request::ListUserAuctions { uid: creds.uid })
        .await
        .unwrap();
    assert_eq!(
        resp,
        Response::ListUserAuctions(auctionhouse::codec::ListStatus::Nlg, Vec::new())
    );
}

#[tokio::test]
async fn open_list_bid_and_show_record_round_trip() {
    let (addr, _dir) = spawn_server().await;
    let host = Credentials {
        uid: "333333".into(),
        password: "hostpass".into(),
    };
    let bidder = Credentials {
        uid: "444444".into(),
        password: "bidpass1".into(),
    };
    send_request(addr, &Request::Login(host.clone())).await.unwrap();
    send_request(addr, &Request::Login(bidder.clone())).await.unwrap();

    let resp = send_request(
        addr,
        &Request::OpenAuction {
            credentials: host.clone(),
            name: "lamp".into(),
            start_value: 10,
            duration_secs: 3600,
            file_name: "lamp.jpg".into(),
            file_data: vec![0xde, 0xad, 0xbe, 0xef],
        },
    )
    .await
    .unwrap();
    let aid = match resp {
        Response::OpenAuction(Result_::Ok(aid)) => aid,
        other => panic!("unexpected open response: {other:?}"),
    };

    // host cannot bid on their own auction.
    let resp = send_request(
        addr,
        &Request::Bid {
            credentials: host.clone(),
            aid: aid.clone(),
            value: 20,
        },
    )
    .await
    .unwrap();
    assert_eq!(resp, Response::Bid(auctionhouse::codec::BidStatus::Ilg));

    let resp = send_request(
        addr,
        &Request::Bid {
            credentials: bidder.clone(),
            aid: aid.clone(),
            value: 20,
        },
    )
    .await
    .unwrap();
    assert_eq!(resp, Response::Bid(auctionhouse::codec::BidStatus::Acc));

    // a second, lower bid is refused.
    let resp = send_request(
        addr,
        &Request::Bid {
            credentials: bidder.clone(),
            aid: aid.clone(),
            value: 15,
        },
    )
    .await
    .unwrap();
    assert_eq!(resp, Response::Bid(auctionhouse::codec::BidStatus::Ref));

    let resp = send_request(addr, &Request::ListAllAuctions).await.unwrap();
    match resp {
        Response::ListAllAuctions(auctionhouse::codec::SimpleStatus::Ok, listing) => {
            assert_eq!(listing.len(), 1);
            assert_eq!(listing[0].aid, aid);
        }
        other => panic!("unexpected list response: {other:?}"),
    }

    let resp = send_request(addr, &Request::ShowRecord { aid: aid.clone() })
        .await
        .unwrap();
    match resp {
        Response::ShowRecord(auctionhouse::codec::SimpleStatus::Ok, Some((start, bids, end))) => {
            assert_eq!(start.host_uid, host.uid);
            assert_eq!(bids.len(), 1);
            assert_eq!(bids[0].bidder_uid, bidder.uid);
            assert!(end.is_none());
        }
        other => panic!("unexpected record response: {other:?}"),
    }

    let resp = send_request(addr, &Request::ShowAsset { aid: aid.clone() })
        .await
        .unwrap();
    match resp {
        Response::ShowAsset(Result_::Ok((name, data))) => {
            assert_eq!(name, "lamp.jpg");
            assert_eq!(data, vec![0xde, 0xad, 0xbe, 0xef]);
        }
        other => panic!("unexpected asset response: {other:?}"),
    }
}

#[tokio::test]
async fn close_auction_requires_the_host_and_is_idempotent_after() {
    let (addr, _dir) = spawn_server().await;
    let host = Credentials {
        uid: "555555".into(),
        password: "hostpass".into(),
    };
    let other = Credentials {
        uid: "666666".into(),
        password: "otherpas".into(),
    };
    send_request(addr, &Request::Login(host.clone())).await.unwrap();
    send_request(addr, &Request::Login(other.clone())).await.unwrap();

    let resp = send_request(
        addr,
        &Request::OpenAuction {
            credentials: host.clone(),
            name: "widget".into(),
            start_value: 5,
            duration_secs: 3600,
            file_name: "widget.bin".into(),
            file_data: vec![1, 2, 3],
        },
    )
    .await
    .unwrap();
    let aid = match resp {
        Response::OpenAuction(Result_::Ok(aid)) => aid,
        other => panic!("unexpected open response: {other:?}"),
    };

    let resp = send_request(
        addr,
        &Request::CloseAuction {
            credentials: other,
            aid: aid.clone(),
        },
    )
    .await
    .unwrap();
    assert_eq!(resp, Response::CloseAuction(auctionhouse::codec::CloseStatus::Eow));

    let resp = send_request(
        addr,
        &Request::CloseAuction {
            credentials: host.clone(),
            aid: aid.clone(),
        },
    )
    .await
    .unwrap();
    assert_eq!(resp, Response::CloseAuction(auctionhouse::codec::CloseStatus::Ok));

    let resp = send_request(
        addr,
        &Request::CloseAuction {
            credentials: host,
            aid,
        },
    )
    .await
    .unwrap();
    assert_eq!(resp, Response::CloseAuction(auctionhouse::codec::CloseStatus::End));
}

#[tokio::test]
async fn auction_ends_lazily_once_its_duration_has_elapsed() {
    let (addr, _dir) = spawn_server().await;
    let host = Credentials {
        uid: "777777".into(),
        password: "hostpass".into(),
    };
    let bidder = Credentials {
        uid: "888888".into(),
        password: "bidpass1".into(),
    };
    send_request(addr, &Request::Login(host.clone())).await.unwrap();
    send_request(addr, &Request::Login(bidder.clone())).await.unwrap();

    let resp = send_request(
        addr,
        &Request::OpenAuction {
            credentials: host.clone(),
            name: "stamp".into(),
            start_value: 5,
            duration_secs: 1,
            file_name: "stamp.bin".into(),
            file_data: vec![9, 9],
        },
    )
    .await
    .unwrap();
    let aid = match resp {
        Response::OpenAuction(Result_::Ok(aid)) => aid,
        other => panic!("unexpected open response: {other:?}"),
    };

    tokio::time::sleep(Duration::from_millis(1200)).await;

    // a bid against an auction whose duration has elapsed is refused.
    let resp = send_request(
        addr,
        &Request::Bid {
            credentials: bidder,
            aid: aid.clone(),
            value: 50,
        },
    )
    .await
    .unwrap();
    assert_eq!(resp, Response::Bid(auctionhouse::codec::BidStatus::Nok));

    // ShowRecord reports the auction as ended even though nobody closed it.
    let resp = send_request(addr, &Request::ShowRecord { aid: aid.clone() })
        .await
        .unwrap();
    match resp {
        Response::ShowRecord(auctionhouse::codec::SimpleStatus::Ok, Some((_, _, end))) => {
            assert!(end.is_some());
        }
        other => panic!("unexpected record response: {other:?}"),
    }

    // the host's own close now observes the lazily-ended state, not a fresh close.
    let resp = send_request(addr, &Request::CloseAuction { credentials: host, aid })
        .await
        .unwrap();
    assert_eq!(resp, Response::CloseAuction(auctionhouse::codec::CloseStatus::End));
}

#[tokio::test]
async fn malformed_request_yields_err_sentinel() {
    let (addr, _dir) = spawn_server().await;
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.connect(addr).await.unwrap();
    socket.send(b"XYZ not a real request\n").await.unwrap();

    let mut buf = [0u8; 1024];
    let len = tokio::time::timeout(Duration::from_secs(5), socket.recv(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&buf[..len], b"ERR\n");
}
