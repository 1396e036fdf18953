//! Drive the page against a running site and print the resulting DOM.
//!
//! Usage: naturepage [--vote N]... [query words...]
//! The query, when given, is typed into the query input before submitting.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use naturehealth::dom::MemoryDom;
use naturehealth::logging::{log, obj, v_str, Domain, Level};
use naturehealth::page::QUERY_INPUT;
use naturehealth::transport::ReqwestTransport;
use naturehealth::{Config, Page};
use serde_json::json;

/// Community insights rendered with vote buttons.
const VOTE_ITEMS: u32 = 8;

struct Args {
    votes: Vec<u32>,
    query: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut votes = Vec::new();
    let mut words = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--vote" {
            let raw = args.next().ok_or_else(|| anyhow!("--vote needs an index"))?;
            votes.push(raw.parse().map_err(|e| anyhow!("bad vote index {}: {}", raw, e))?);
        } else {
            words.push(arg);
        }
    }
    let query = (!words.is_empty()).then(|| words.join(" "));
    Ok(Args { votes, query })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let cfg = Config::from_env();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("base_url", v_str(&cfg.base_url)),
            ("pulse_ms", json!(cfg.pulse.as_millis() as u64)),
            ("reveal_threshold", json!(cfg.reveal_threshold)),
        ]),
    );

    let transport = Arc::new(ReqwestTransport::new(&cfg)?);
    let dom = Arc::new(Mutex::new(MemoryDom::page_layout(VOTE_ITEMS)));
    let mut page = Page::new(&cfg, transport, dom.clone());

    page.load().await?;

    if let Some(query) = &args.query {
        dom.lock()
            .map_err(|_| anyhow!("dom lock poisoned"))?
            .add(QUERY_INPUT, None)
            .with_value(query);
        page.submit_from_input().await?;
    }
    for index in args.votes {
        page.vote(index).await?;
    }

    let snapshot = dom.lock().map_err(|_| anyhow!("dom lock poisoned"))?.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
