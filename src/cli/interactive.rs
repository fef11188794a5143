//! Line-driven calculator. Every input change re-renders the breakdown;
//! category fees load in the background so typing is never blocked.

use super::{calculate, categories, ui};
use crate::core::FeeSession;
use anyhow::{Context, Result};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, PartialEq)]
enum Input<'a> {
    Price(&'a str),
    Category(&'a str),
    Show,
    Categories,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Option<Input<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(c, r)| (c, r.trim()));

    Some(match command.to_ascii_lowercase().as_str() {
        "price" | "p" => Input::Price(rest),
        "category" | "c" => Input::Category(rest),
        "show" | "s" => Input::Show,
        "categories" | "list" => Input::Categories,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Unknown(line),
    })
}

fn print_help() {
    println!(
        "{}",
        ui::style_text(
            "Commands: price <amount> | category <id|label|none> | show | categories | help | quit",
            ui::StyleType::Subtle
        )
    );
}

fn show(session: &FeeSession, currency: &str) {
    println!(
        "{}",
        calculate::render_breakdown(
            &session.breakdown(),
            session.selected_category().as_ref(),
            currency
        )
    );
}

pub async fn run(session: Arc<FeeSession>, currency: &str) -> Result<()> {
    print_help();
    show(&session, currency);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = FuturesUnordered::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_input(&line) {
                    None => continue,
                    Some(Input::Price(text)) => {
                        session.set_base_price(text);
                        show(&session, currency);
                    }
                    Some(Input::Category(query)) => {
                        let session = Arc::clone(&session);
                        let query = query.to_string();
                        pending.push(async move {
                            calculate::select_by_query(&session, &query).await
                        });
                    }
                    Some(Input::Show) => show(&session, currency),
                    Some(Input::Categories) => categories::run(&session)?,
                    Some(Input::Help) => print_help(),
                    Some(Input::Quit) => break,
                    Some(Input::Unknown(text)) => {
                        println!(
                            "{}",
                            ui::style_text(&format!("Unknown command: {text}"), ui::StyleType::Error)
                        );
                        print_help();
                    }
                }
            }
            Some(applied) = pending.next(), if !pending.is_empty() => {
                if applied {
                    show(&session, currency);
                }
            }
        }
    }

    Ok(())
}
