use std::path::{Path, PathBuf};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::interview::{Difficulty, Role};
use crate::session::SessionController;
use crate::speech::VoiceInput;

pub const HELP: &str = "\
Commands:
  /start <role> <difficulty>   begin a session
                               roles: backend, frontend, fullstack, data-science, devops, mobile
                               difficulty: easy, medium, hard
  /next                        ask for the next question
  /end                         end the session and get feedback
  /voice                       capture an answer by voice
  /send                        submit the last voice capture
  /save [path]                 write the transcript to a file
  /status                      show the session state
  /reset                       forget the session and transcript
  /help                        show this help
  /quit                        exit
Anything else is submitted as your answer.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start(Role, Difficulty),
    Next,
    End,
    Voice,
    Send,
    Save(Option<PathBuf>),
    Status,
    Reset,
    Help,
    Quit,
    Answer(String),
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Answer(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    match (name.as_str(), args.as_slice()) {
        ("start", [role, difficulty]) => {
            match (role.parse::<Role>(), difficulty.parse::<Difficulty>()) {
                (Ok(role), Ok(difficulty)) => Command::Start(role, difficulty),
                (Err(e), _) | (_, Err(e)) => Command::Invalid(e),
            }
        }
        ("start", _) => Command::Invalid("Usage: /start <role> <difficulty>".to_string()),
        ("next", []) => Command::Next,
        ("end", []) => Command::End,
        ("voice", []) => Command::Voice,
        ("send", []) => Command::Send,
        ("save", []) => Command::Save(None),
        ("save", [path]) => Command::Save(Some(PathBuf::from(path))),
        ("status", []) => Command::Status,
        ("reset", []) => Command::Reset,
        ("help", _) => Command::Help,
        ("quit", _) | ("exit", _) => Command::Quit,
        _ => Command::Invalid(format!("Unknown command: {}", line)),
    }
}

/// Line-oriented front end standing in for the chat page.
pub struct Repl {
    controller: SessionController,
    voice: VoiceInput,
    transcript_path: PathBuf,
    pending_voice: Option<String>,
}

impl Repl {
    pub fn new(
        controller: SessionController,
        voice: VoiceInput,
        transcript_path: PathBuf,
    ) -> Self {
        Self {
            controller,
            voice,
            transcript_path,
            pending_voice: None,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("{}", HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            if !self.handle(parse_command(&line)).await {
                break;
            }
        }

        self.controller.speech().cancel();
        Ok(())
    }

    /// Apply one command and print whatever it added to the transcript.
    /// Returns `false` when the user asked to quit.
    pub async fn handle(&mut self, command: Command) -> bool {
        let before = self.controller.transcript().len();

        // Failures are already in the transcript; nothing more to do with them here
        match command {
            Command::Start(role, difficulty) => {
                let _ = self.controller.start(role, difficulty).await;
            }
            Command::Next => {
                let _ = self.controller.request_next_question().await;
            }
            Command::End => {
                let _ = self.controller.end_session().await;
            }
            Command::Answer(text) => {
                self.pending_voice = None;
                let _ = self.controller.submit_answer(&text).await;
            }
            Command::Voice => {
                if !self.voice.is_available() {
                    println!("Voice not supported: set voice.command in mockprep.toml");
                } else if let Some(text) = self.voice.capture().await {
                    self.controller.note_voice_capture(&text);
                    self.pending_voice = Some(text);
                    println!("(type /send to submit it, or type a different answer)");
                }
            }
            Command::Send => match self.pending_voice.take() {
                Some(text) => {
                    let _ = self.controller.submit_answer(&text).await;
                }
                None => println!("Nothing captured yet. Use /voice first."),
            },
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.transcript_path.clone());
                match self.save_transcript(&path).await {
                    Ok(()) => println!("Transcript saved to {}", path.display()),
                    Err(e) => println!("Could not save transcript: {}", e),
                }
            }
            Command::Status => {
                let state = self.controller.state();
                match self.controller.session_id() {
                    Some(id) => println!("Session {}: {}", id, state.label()),
                    None => println!("{}", state.label()),
                }
            }
            Command::Reset => {
                self.pending_voice = None;
                self.controller.reset();
                println!("Session cleared.");
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
            Command::Invalid(message) => println!("{}", message),
        }

        for entry in self.controller.transcript().since(before) {
            println!("{}", entry.render());
        }
        true
    }

    async fn save_transcript(&self, path: &Path) -> std::io::Result<()> {
        let mut text = self.controller.transcript().to_plain_text();
        text.push('\n');
        match tokio::fs::write(path, text).await {
            Ok(()) => {
                info!("💾 Transcript written to {}", path.display());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to write transcript to {}: {}", path.display(), e);
                Err(e)
            }
        }
    }
}
