//! concierge CLI — console voice concierge.
//!
//! ```text
//! concierge chat [--locale en-US] [--theme dark] [--config FILE] [--rules FILE] [--mute]
//! concierge ask "what's the wifi password?" [--rules FILE]
//! concierge rules [--rules FILE]
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use concierge_lib::concierge::Concierge;
use concierge_lib::concierge_core::error::{ConciergeError, Result};
use concierge_lib::concierge_core::responder::RuleTable;
use concierge_lib::concierge_core::types::{ConciergeConfig, Locale, Theme};
use concierge_lib::console::{ConsoleCapture, ConsoleSynthesizer};
use concierge_lib::mic::{CaptureEvent, StartOutcome};
use concierge_lib::speech::SpeechEvent;
use concierge_lib::view::ConversationView;

/// concierge — keyword voice concierge for hotel guests
#[derive(Parser)]
#[command(name = "concierge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Talk to the concierge; each typed line is treated as one spoken request
    Chat {
        /// Recognition locale (en-US, hi-IN, kn-IN)
        #[arg(long)]
        locale: Option<String>,
        /// Colour theme (light, dark)
        #[arg(long)]
        theme: Option<String>,
        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// JSON rule table replacing the built-in rules
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Do not speak replies
        #[arg(long)]
        mute: bool,
        /// Behave as a host without speech recognition
        #[arg(long)]
        no_mic: bool,
        /// Conversation width in columns
        #[arg(long, default_value = "64")]
        width: usize,
    },
    /// Print the reply for one request
    Ask {
        /// Request text
        text: String,
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Print the rule table as JSON
    Rules {
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

type ConsoleConcierge = Concierge<ConsoleCapture, ConsoleSynthesizer>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concierge_lib=warn,concierge_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat {
            locale,
            theme,
            config,
            rules,
            mute,
            no_mic,
            width,
        } => {
            let settings = ChatSettings {
                locale,
                theme,
                config,
                rules,
                mute,
                no_mic,
                width,
            };
            chat(settings).await
        }

        Command::Ask { text, rules } => {
            load_rules(rules.as_deref()).map(|table| println!("{}", table.respond(&text)))
        }

        Command::Rules { rules } => load_rules(rules.as_deref()).and_then(|table| {
            println!("{}", serde_json::to_string_pretty(&table)?);
            Ok(())
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

struct ChatSettings {
    locale: Option<String>,
    theme: Option<String>,
    config: Option<PathBuf>,
    rules: Option<PathBuf>,
    mute: bool,
    no_mic: bool,
    width: usize,
}

fn load_rules(path: Option<&Path>) -> Result<RuleTable> {
    match path {
        Some(path) => RuleTable::from_json(&std::fs::read_to_string(path)?),
        None => Ok(RuleTable::builtin()),
    }
}

fn load_config(settings: &ChatSettings) -> Result<ConciergeConfig> {
    let mut config = match &settings.config {
        Some(path) => ConciergeConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ConciergeConfig::default(),
    };
    if let Some(locale) = &settings.locale {
        config.locale = locale.parse()?;
    }
    if let Some(theme) = &settings.theme {
        config.theme = theme.parse()?;
    }
    if settings.mute {
        config.speak_replies = false;
    }
    Ok(config)
}

async fn chat(settings: ChatSettings) -> Result<()> {
    let config = load_config(&settings)?;
    let rules = load_rules(settings.rules.as_deref())?;
    tracing::info!("chat: {} rules, locale {}", rules.rules().len(), config.locale);

    let (capture, mut capture_rx) = ConsoleCapture::new(!settings.no_mic);
    let (synth, mut speech_rx) = ConsoleSynthesizer::new(config.speak_replies);
    let mut concierge = Concierge::new(config, rules, capture, synth);

    println!("Voice Concierge — type a request, /help for commands");
    let mut shown = print_new(&concierge, 0, settings.width);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !run_command(&mut concierge, command, settings.width) {
                break;
            }
            continue;
        }

        match concierge.start_listening() {
            Ok(StartOutcome::Started(_)) | Ok(StartOutcome::AlreadyListening(_)) => {
                concierge.mic_mut().capture_mut().hear(line);
            }
            Err(ConciergeError::CapabilityUnavailable) => {
                eprintln!("Speech recognition is not supported on this host.");
                continue;
            }
            Err(e) => return Err(e),
        }

        drain_events(&mut concierge, &mut capture_rx, &mut speech_rx);
        shown = print_new(&concierge, shown, settings.width);
    }

    concierge.stop_listening();
    Ok(())
}

/// Feed every queued host event to the concierge, in delivery order.
fn drain_events(
    concierge: &mut ConsoleConcierge,
    capture_rx: &mut mpsc::UnboundedReceiver<CaptureEvent>,
    speech_rx: &mut mpsc::UnboundedReceiver<SpeechEvent>,
) {
    loop {
        if let Ok(event) = capture_rx.try_recv() {
            concierge.on_capture_event(event);
        } else if let Ok(event) = speech_rx.try_recv() {
            concierge.on_speech_event(event);
        } else {
            break;
        }
    }
}

/// Print messages from index `shown` onward; returns the new count.
fn print_new(concierge: &ConsoleConcierge, shown: usize, width: usize) -> usize {
    let messages = concierge.messages();
    if shown < messages.len() {
        let view = ConversationView::new(width, concierge.theme());
        for line in view.render(&messages[shown..]) {
            println!("{line}");
        }
        println!();
    }
    messages.len()
}

/// Handle a `/command`. Returns `false` to quit.
fn run_command(concierge: &mut ConsoleConcierge, command: &str, width: usize) -> bool {
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "exit"), _) => return false,

        (Some("lang"), Some(code)) => match code.parse::<Locale>() {
            Ok(locale) => {
                concierge.set_locale(locale);
                println!("Language: {} ({})", locale.label(), locale);
            }
            Err(e) => eprintln!("{e}"),
        },

        (Some("lang"), None) => {
            for locale in Locale::ALL {
                let mark = if locale == concierge.locale() { "*" } else { " " };
                println!("{mark} {locale}  {}", locale.label());
            }
        }

        (Some("theme"), _) => {
            let theme = concierge.toggle_theme();
            println!(
                "{}",
                match theme {
                    Theme::Dark => "🌙 Dark",
                    Theme::Light => "🌞 Light",
                }
            );
            print_new(concierge, 0, width);
        }

        (Some("history"), _) => {
            print_new(concierge, 0, width);
        }

        (Some("stop"), _) => concierge.stop_listening(),

        (Some("status"), _) => {
            match serde_json::to_string_pretty(&concierge.status()) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("{e}"),
            }
            if let Some(reply) = concierge.last_reply() {
                println!("Last reply: {reply}");
            }
        }

        _ => {
            println!("/lang [CODE]  show or switch language (en-US, hi-IN, kn-IN)");
            println!("/theme        toggle light/dark");
            println!("/history      show the whole conversation");
            println!("/status       print mic/speech status as JSON and the last reply");
            println!("/stop         cancel an open capture");
            println!("/quit         leave");
        }
    }
    true
}
