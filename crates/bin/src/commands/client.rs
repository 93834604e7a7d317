//! Client commands - put, get, del and list against a running server.

use std::time::Duration;

use channeldb::remote::RemoteClient;
use channeldb::{GetQuery, ListQuery, Listing};
use serde_json::{Map, Value};

use crate::cli::{ClientArgs, DelArgs, GetArgs, ListArgs, PutArgs};
use crate::output::{OutputFormat, cell, print_table, print_value};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn connect(args: &ClientArgs) -> Result<RemoteClient, channeldb::Error> {
    let base = args.url.trim_end_matches('/');
    let endpoint = if base.ends_with("/api/v0") {
        base.to_string()
    } else {
        format!("{base}/api/v0")
    };

    let client = RemoteClient::with_timeout(&endpoint, Duration::from_secs(args.timeout))?;
    if let Some(token) = &args.token {
        client.set_token(token.as_str());
    }
    Ok(client)
}

fn parse_json(raw: &str, what: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("{what} is not valid JSON: {e}"))
}

fn parse_object(raw: &str, what: &str) -> Result<Map<String, Value>, String> {
    match parse_json(raw, what)? {
        Value::Object(map) => Ok(map),
        _ => Err(format!("{what} must be a JSON object")),
    }
}

/// Write a record
pub async fn put(args: &PutArgs, format: OutputFormat) -> CommandResult {
    let data = parse_json(&args.data, "data")?;
    let event = connect(&args.client)?.put(&args.path, data).await?;

    match format {
        OutputFormat::Human => println!("put {} ({})", event.path, event.event),
        OutputFormat::Json => print_value(&serde_json::to_value(&event)?, format)?,
    }
    Ok(())
}

/// Read a record
pub async fn get(args: &GetArgs, format: OutputFormat) -> CommandResult {
    let query = GetQuery {
        projection: args
            .projection
            .as_deref()
            .map(|raw| parse_object(raw, "projection"))
            .transpose()?,
        children: args.children.then(ListQuery::new),
    };
    let entry = connect(&args.client)?.get_with(&args.path, &query).await?;

    match format {
        OutputFormat::Human => {
            print_value(entry.data().unwrap_or(&Value::Null), format)?;
            if let Some(children) = &entry.children {
                println!();
                print_listing(children, false);
            }
        }
        OutputFormat::Json => print_value(&serde_json::to_value(&entry)?, format)?,
    }
    Ok(())
}

/// Delete a subtree
pub async fn del(args: &DelArgs, format: OutputFormat) -> CommandResult {
    let event = connect(&args.client)?.del(&args.path).await?;

    match format {
        OutputFormat::Human => {
            println!("deleted {} path(s)", event.paths.len());
            for path in &event.paths {
                println!("  {path}");
            }
        }
        OutputFormat::Json => print_value(&serde_json::to_value(&event)?, format)?,
    }
    Ok(())
}

/// List a channel
pub async fn list(args: &ListArgs, format: OutputFormat) -> CommandResult {
    let query = ListQuery {
        gt: args.gt.clone(),
        lt: args.lt.clone(),
        deep: args.deep,
        reverse: args.reverse,
        values: args.values,
        limit: args.limit,
        // Bare words are text filters
        filter: args
            .filter
            .as_deref()
            .map(|raw| serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))),
        projection: args
            .projection
            .as_deref()
            .map(|raw| parse_object(raw, "projection"))
            .transpose()?,
    };
    let listing = connect(&args.client)?.list(&args.path, &query).await?;

    match format {
        OutputFormat::Human => {
            print_listing(&listing, args.values);
            if let Some(cursor) = &listing.cursor {
                println!();
                println!("more results: {}", serde_json::to_string(cursor)?);
            }
        }
        OutputFormat::Json => print_value(&serde_json::to_value(&listing)?, format)?,
    }
    Ok(())
}

fn print_listing(listing: &Listing, values: bool) {
    if listing.data.is_empty() {
        println!("(empty)");
        return;
    }
    let rows: Vec<Vec<String>> = listing
        .data
        .iter()
        .map(|entry| {
            let mut row = vec![entry.path().unwrap_or("").to_string()];
            if values {
                row.push(cell(entry.data()));
            }
            row
        })
        .collect();
    let headers: &[&str] = if values { &["PATH", "DATA"] } else { &["PATH"] };
    print_table(headers, &rows);
}
