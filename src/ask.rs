//! `mqa classify`, `mqa ask` and `mqa chat`.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use manual_qa_core::assistant::{Answer, Assistant};
use manual_qa_core::intent::{classify_question, Intent};

use crate::app::open_assistant;
use crate::config::Config;

/// Print the question type the keyword classifier picks.
pub fn run_classify(question: &str) {
    println!("{}", classify_question(question));
}

pub async fn run_ask(
    config: &Config,
    question: &str,
    session: Option<String>,
    intent: Option<Intent>,
) -> Result<()> {
    let assistant = open_assistant(config).await?;
    let session = session.unwrap_or_else(new_session_id);
    let answer = assistant.ask(&session, question, intent).await?;
    print_answer(&answer);
    Ok(())
}

/// Interactive loop over one session. `/clear` drops history, `/quit` exits.
pub async fn run_chat(config: &Config, session: Option<String>) -> Result<()> {
    let assistant = open_assistant(config).await?;
    let session = session.unwrap_or_else(new_session_id);

    println!("Session {}. Type /clear to reset history, /quit to exit.", session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                clear(&assistant, &session);
                continue;
            }
            _ => {}
        }

        match assistant.ask(&session, line, None).await {
            Ok(answer) => print_answer(&answer),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    Ok(())
}

fn clear(assistant: &Assistant, session: &str) {
    if assistant.clear_history(session) {
        println!("History cleared for session {}", session);
    } else {
        println!("No history found for session {}", session);
    }
}

fn print_answer(answer: &Answer) {
    println!();
    println!("{}", answer.text.trim());
    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &answer.sources {
            println!("  - {}", source);
        }
    }
    eprintln!(
        "[{} | {} chunks | query: {}]",
        answer.intent, answer.context_used, answer.search_query
    );
    println!();
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
