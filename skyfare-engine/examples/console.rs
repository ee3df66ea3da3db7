//! Interactive console for the reservation engine.
//!
//! ```text
//! cargo run --example console
//! ```
//!
//! Quote multi-word cities: search "Seattle WA" "Boston MA" 0 14 5

use std::io::Write;

use skyfare_core::Session;
use skyfare_engine::ReservationEngine;
use skyfare_store::{Config, DbClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
Commands:
  create <username> <password> <balance>
  login <username> <password>
  search <origin> <dest> <direct: 0|1> <day> <count>
  book <itinerary>
  pay <reservation>
  cancel <reservation>
  reservations
  logout
  quit
";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfare_engine=debug,skyfare_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");

    let db = DbClient::connect(&config.database)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let engine = ReservationEngine::new(db, config.retry.clone());
    let mut session = Session::new();

    print!("{}", USAGE);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().expect("Failed to flush stdout");

        let Some(line) = lines.next_line().await.expect("Failed to read stdin") else {
            break;
        };
        let tokens = tokenize(&line);
        let args: Vec<&str> = tokens.iter().map(String::as_str).collect();

        let reply = match args.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["create", username, password, balance] => match balance.parse() {
                Ok(balance) => engine.create_user(username, password, balance).await,
                Err(_) => USAGE.to_string(),
            },
            ["login", username, password] => engine.login(&mut session, username, password).await,
            ["search", origin, dest, direct, day, count] => {
                match (direct.parse::<u8>(), day.parse(), count.parse()) {
                    (Ok(direct), Ok(day), Ok(count)) => {
                        engine
                            .search(&mut session, origin, dest, direct != 0, day, count)
                            .await
                    }
                    _ => USAGE.to_string(),
                }
            }
            ["book", index] => match index.parse() {
                Ok(index) => engine.book(&session, index).await,
                Err(_) => USAGE.to_string(),
            },
            ["pay", id] => match id.parse() {
                Ok(id) => engine.pay(&session, id).await,
                Err(_) => USAGE.to_string(),
            },
            ["cancel", id] => match id.parse() {
                Ok(id) => engine.cancel(&session, id).await,
                Err(_) => USAGE.to_string(),
            },
            ["reservations"] => engine.reservations(&session).await,
            ["logout"] => {
                session.log_out();
                "Logged out\n".to_string()
            }
            _ => USAGE.to_string(),
        };
        print!("{}", reply);
    }

    println!("Goodbye");
}

fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for ch in line.chars() {
        match ch {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
