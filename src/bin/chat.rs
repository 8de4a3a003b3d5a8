use clap::Parser;
use dotenv::dotenv;
use saga_relay::cli::ChatArgs;
use saga_relay::client::dispatch::{ DispatchController, DispatchOutcome, Intent };
use saga_relay::client::store::ConversationStore;
use saga_relay::client::HttpRelayGateway;
use saga_relay::models::chat::{ Role, Tone, Turn };
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };

const SUGGESTIONS: &[&str] = &[
    "Explain recursion like I'm 12",
    "Give me a real-world analogy for binary search",
    "Summarize Big-O in 3 bullet points",
    "Break down inflation step-by-step",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = ChatArgs::parse();

    let store = ConversationStore::load(&args.history_path);
    let gateway = Arc::new(HttpRelayGateway::new(args.server_url.clone())?);
    let controller = DispatchController::new(store, gateway, Tone::from_param(&args.tone));

    for turn in &controller.conversation().await.turns {
        print_turn(turn);
    }
    println!();
    println!("Try: {}", SUGGESTIONS.join(" | "));
    println!("Commands: /simpler /example /deeper /summarize /tone <value> /reset /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let intent = match line.as_str() {
            "/quit" | "/exit" => {
                break;
            }
            "/reset" => {
                controller.reset().await;
                println!("(conversation reset)");
                continue;
            }
            "/simpler" => Intent::ExplainSimpler,
            "/example" => Intent::GiveAnExample,
            "/deeper" => Intent::GoDeeper,
            "/summarize" => Intent::Summarize,
            _ => {
                if let Some(value) = line.strip_prefix("/tone") {
                    let tone = Tone::from_param(value.trim());
                    controller.set_tone(tone).await;
                    println!("(tone set to {})", tone.as_str());
                    continue;
                }
                if line.starts_with('/') {
                    println!("(unknown command: {})", line);
                    continue;
                }
                Intent::Send(line.clone())
            }
        };

        match controller.dispatch(intent).await {
            DispatchOutcome::Completed(reply) => println!("SAGA: {}", reply),
            DispatchOutcome::Busy => println!("(still waiting on the last reply)"),
            DispatchOutcome::Skipped => println!("(nothing to refine yet, ask SAGA something first)"),
        }
    }

    Ok(())
}

fn print_turn(turn: &Turn) {
    match turn.role {
        Role::User => println!("You: {}", turn.content),
        Role::Assistant => println!("SAGA: {}", turn.content),
    }
}
