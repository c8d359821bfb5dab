//! CLI interactivo: una sesión de conversación por proceso.
//!
//! Comandos:
//! - `/export`: imprime la sesión en JSON.
//! - `/new`: descarta la sesión y empieza otra.
//! - `/quit`: termina.
use std::io::{self, BufRead, Write};

use crisprflow::config::CONFIG;
use crisprflow::{ConversationManager, CoreError, Reply};
use log::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<(), CoreError> {
    tracing_subscriber::registry().with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&CONFIG.log_filter)))
                                  .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                                  .init();

    let mut manager = ConversationManager::from_config(&CONFIG);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print_reply(&manager.greeting()?);
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        match message {
            "/quit" | "/exit" => break,
            "/export" => println!("{}", manager.export_json()?),
            "/new" => {
                manager.reset();
                print_reply(&manager.greeting()?);
            }
            _ => match manager.handle_message(message) {
                Ok(reply) => print_reply(&reply),
                Err(err) => {
                    error!("workflow error: {err}");
                    println!("An error occurred: {err}\n");
                }
            },
        }
    }
    Ok(())
}

fn print_reply(reply: &Reply) {
    println!("{}\n", reply.text);
    if CONFIG.trace_events {
        for event in &reply.events {
            println!("  [{}] #{} {:?}", event.kind.code(), event.seq, event.kind);
        }
        println!();
    }
}
