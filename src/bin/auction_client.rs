//! The auction client binary: a plain line-oriented command loop driving
//! the wire protocol. The interactive line-editor (history, completion) is
//! out of scope; this is a `BufRead`-based loop with no history, the thin
//! command-dispatch glue the protocol's client side needs.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::Parser;

use auctionhouse::codec::{Credentials, Request, Response, Result_};
use auctionhouse::config::ClientConfig;
use auctionhouse::transport::send_request;

#[derive(Parser, Debug)]
#[command(name = "auction_client", about = "Networked auction client")]
struct Args {
    /// Server hostname.
    #[arg(short = 'n', long)]
    hostname: Option<String>,

    /// Server port.
    #[arg(short = 'p', long)]
    port: Option<u16>,
}

struct Session {
    uid: Option<String>,
    password: Option<String>,
}

impl Session {
    fn prompt(&self) -> String {
        match &self.uid {
            Some(uid) => format!("[{uid}] > "),
            None => "> ".to_string(),
        }
    }

    fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            uid: self.uid.clone()?,
            password: self.password.clone()?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = ClientConfig::default();
    if let Some(hostname) = args.hostname {
        config.hostname = hostname;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let addr = config.server_addr();

    let mut session = Session {
        uid: None,
        password: None,
    };

    let stdin = io::stdin();
    print!("{}", session.prompt());
    io::stdout().flush().ok();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            print!("{}", session.prompt());
            io::stdout().flush().ok();
            continue;
        }
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("");
        let rest: Vec<&str> = words.collect();

        if command == "exit" {
            break;
        }

        if let Err(e) = run_command(command, &rest, &mut session, &addr).await {
            println!("{e}");
        }

        print!("{}", session.prompt());
        io::stdout().flush().ok();
    }

    Ok(())
}

async fn run_command(
    command: &str,
    args: &[&str],
    session: &mut Session,
    addr: &str,
) -> Result<(), String> {
    match command {
        "login" => {
            let [uid, password] = take2(args)?;
            let resp = send_request(
                addr,
                &Request::Login(Credentials {
                    uid: uid.clone(),
                    password: password.clone(),
                }),
            )
            .await
            .map_err(|e| e.to_string())?;
            match resp {
                Response::Login(status) => {
                    println!("{status:?}");
                    session.uid = Some(uid);
                    session.password = Some(password);
                }
                other => return Err(format!("unexpected reply: {other:?}")),
            }
        }
        "logout" => {
            let creds = session.credentials().ok_or("not logged in")?;
            let resp = send_request(addr, &Request::Logout(creds))
                .await
                .map_err(|e| e.to_string())?;
            println!("{resp:?}");
            session.uid = None;
            session.password = None;
        }
        "unregister" => {
            let creds = session.credentials().ok_or("not logged in")?;
            let resp = send_request(addr, &Request::Unregister(creds))
                .await
                .map_err(|e| e.to_string())?;
            println!("{resp:?}");
            session.uid = None;
            session.password = None;
        }
        "myauctions" | "ma" => {
            let uid = session.uid.clone().ok_or("not logged in")?;
            let resp = send_request(addr, &Request::ListUserAuctions { uid })
                .await
                .map_err(|e| e.to_string())?;
            println!("{resp:?}");
        }
        "mybids" | "mb" => {
            let uid = session.uid.clone().ok_or("not logged in")?;
            let resp = send_request(addr, &Request::ListUserBids { uid })
                .await
                .map_err(|e| e.to_string())?;
            println!("{resp:?}");
        }
        "list" | "l" => {
            let resp = send_request(addr, &Request::ListAllAuctions)
                .await
                .map_err(|e| e.to_string())?;
            println!("{resp:?}");
        }
        "show_record" | "sr" => {
            let [aid] = take1(args)?;
            let resp = send_request(addr, &Request::ShowRecord { aid })
                .await
                .map_err(|e| e.to_string())?;
            println!("{resp:?}");
        }
        "open" => {
            if args.len() != 4 {
                return Err("usage: open name asset_fname start_value timeactive".into());
            }
            let credentials = session.credentials().ok_or("not logged in")?;
            let name = args[0].to_string();
            let file_name_arg = args[1].to_string();
            let start_value: u32 = args[2].parse().map_err(|_| "invalid start_value")?;
            let duration_secs: u32 = args[3].parse().map_err(|_| "invalid timeactive")?;
            let file_data = fs::read(&file_name_arg).map_err(|e| format!("{e}"))?;
            let file_name = Path::new(&file_name_arg)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(&file_name_arg)
                .to_string();
            let resp = send_request(
                addr,
                &Request::OpenAuction {
                    credentials,
                    name,
                    start_value,
                    duration_secs,
                    file_name,
                    file_data,
                },
            )
            .await
            .map_err(|e| e.to_string())?;
            println!("{resp:?}");
        }
        "close" => {
            let [aid] = take1(args)?;
            let credentials = session.credentials().ok_or("not logged in")?;
            let resp = send_request(addr, &Request::CloseAuction { credentials, aid })
                .await
                .map_err(|e| e.to_string())?;
            println!("{resp:?}");
        }
        "show_asset" | "sa" => {
            let [aid] = take1(args)?;
            let resp = send_request(addr, &Request::ShowAsset { aid })
                .await
                .map_err(|e| e.to_string())?;
            match resp {
                Response::ShowAsset(Result_::Ok((name, data))) => {
                    fs::create_dir_all("./auction_files").map_err(|e| e.to_string())?;
                    let path = Path::new("./auction_files").join(&name);
                    fs::write(&path, &data).map_err(|e| e.to_string())?;
                    println!("saved {} ({} bytes)", path.display(), data.len());
                }
                other => println!("{other:?}"),
            }
        }
        "bid" | "b" => {
            if args.len() != 2 {
                return Err("usage: bid AID value".into());
            }
            let credentials = session.credentials().ok_or("not logged in")?;
            let aid = args[0].to_string();
            let value: u32 = args[1].parse().map_err(|_| "invalid value")?;
            let resp = send_request(
                addr,
                &Request::Bid {
                    credentials,
                    aid,
                    value,
                },
            )
            .await
            .map_err(|e| e.to_string())?;
            println!("{resp:?}");
        }
        _ => return Err(format!("unknown command: {command}")),
    }
    Ok(())
}

fn take1(args: &[&str]) -> Result<[String; 1], String> {
    match args {
        [a] => Ok([a.to_string()]),
        _ => Err("expected exactly one argument".into()),
    }
}

fn take2(args: &[&str]) -> Result<[String; 2], String> {
    match args {
        [a, b] => Ok([a.to_string(), b.to_string()]),
        _ => Err("expected exactly two arguments".into()),
    }
}
