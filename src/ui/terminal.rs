// Terminal front end
//
// A line-oriented stand-in for the browser form. A dedicated input thread reads
// commands, types values into the MemoryFieldSource and forwards FormEvents to the
// event loop. Every forwarded cancel is followed by exactly one confirmation, so the
// line after `cancel` is always routed to the TerminalPrompt, even if the event loop
// has not reached the prompt yet.

use crate::ui::events::FormEvent;
use crate::ui::field_source::MemoryFieldSource;
use crate::ui::prompt::ConfirmationPrompt;
use std::io::{self, BufRead};
use std::sync::{Arc, Mutex, PoisonError, mpsc as std_mpsc};
use std::thread::JoinHandle;
use thiserror::Error;
use tokio::sync::mpsc;

pub const HELP: &str = "\
Commands:
  set <field> <value>   type a value into a field
  blur <field>          leave a field (validates it)
  submit                submit the form
  cancel                discard the input (asks first)
  show                  print the form
  help                  print this help
  quit                  exit";

/// A parsed terminal command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { field: String, value: String },
    Blur(String),
    Submit,
    Cancel,
    Show,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),
}

/// Parse one input line into a [`Command`].
///
/// Everything after `set <field> ` is the value, inner whitespace included.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() {
        return Err(CommandError::Empty);
    }

    let (verb, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    let rest = rest.trim_start();

    match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if field.is_empty() {
                return Err(CommandError::MissingArgument("field name"));
            }
            Ok(Command::Set {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
        "blur" => {
            let field = rest.trim();
            if field.is_empty() {
                return Err(CommandError::MissingArgument("field name"));
            }
            Ok(Command::Blur(field.to_string()))
        }
        "submit" => Ok(Command::Submit),
        "cancel" => Ok(Command::Cancel),
        "show" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Render the form's fields, errors and submit control
pub fn render_form(source: &MemoryFieldSource) -> String {
    let mut lines: Vec<String> = source
        .fields()
        .into_iter()
        .map(|(name, view)| match view.error {
            Some(error) => format!("  {:<10} {:?}  ! {}", name, view.value, error),
            None => format!("  {:<10} {:?}", name, view.value),
        })
        .collect();

    let control = source.submit_control();
    lines.push(format!(
        "  [{}]{}",
        control.label,
        if control.disabled { " (disabled)" } else { "" }
    ));
    lines.join("\n")
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Input-thread side of a [`TerminalPrompt`]
#[derive(Debug, Clone)]
pub struct PromptLink {
    answers: std_mpsc::Sender<String>,
}

impl PromptLink {
    /// Returns false if the prompt has gone away
    fn answer(&self, line: String) -> bool {
        self.answers.send(line).is_ok()
    }
}

/// Confirmation prompt answered on the terminal.
///
/// `confirm` blocks the calling thread until the input thread delivers the line typed
/// after `cancel`. An answer typed before the question is printed is buffered.
#[derive(Debug)]
pub struct TerminalPrompt {
    answers: Mutex<std_mpsc::Receiver<String>>,
}

/// Create a prompt and the link the input thread uses to answer it
pub fn terminal_prompt() -> (TerminalPrompt, PromptLink) {
    let (tx, rx) = std_mpsc::channel();

    (
        TerminalPrompt {
            answers: Mutex::new(rx),
        },
        PromptLink { answers: tx },
    )
}

impl ConfirmationPrompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        let answers = self.answers.lock().unwrap_or_else(PoisonError::into_inner);

        println!("{} [y/N]", message);

        match answers.recv() {
            Ok(line) => is_affirmative(&line),
            Err(_) => {
                tracing::warn!("Input closed while waiting for confirmation");
                false
            }
        }
    }
}

/// Read commands from `input` until `quit`, end of input, or the event loop goes away.
///
/// The line following a forwarded `cancel` is the answer to its confirmation and is
/// never parsed as a command. Always finishes by sending [`FormEvent::Shutdown`] (if
/// the loop is still listening).
pub fn run_input<R: BufRead>(
    input: R,
    source: &MemoryFieldSource,
    events: &mpsc::Sender<FormEvent>,
    prompt: &PromptLink,
) {
    let mut awaiting_answer = false;

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        };

        if awaiting_answer {
            awaiting_answer = false;
            if !prompt.answer(line) {
                break;
            }
            continue;
        }

        let event = match parse_command(&line) {
            Ok(Command::Set { field, value }) => {
                if source.type_value(&field, &value) {
                    Some(FormEvent::Input(field))
                } else {
                    println!("No field named {:?}", field);
                    None
                }
            }
            Ok(Command::Blur(field)) => Some(FormEvent::Blur(field)),
            Ok(Command::Submit) => Some(FormEvent::Submit),
            Ok(Command::Cancel) => {
                awaiting_answer = true;
                Some(FormEvent::Cancel)
            }
            Ok(Command::Show) => {
                println!("{}", render_form(source));
                None
            }
            Ok(Command::Help) => {
                println!("{}", HELP);
                None
            }
            Ok(Command::Quit) => break,
            Err(CommandError::Empty) => None,
            Err(e) => {
                println!("{}", e);
                None
            }
        };

        if let Some(event) = event {
            if events.blocking_send(event).is_err() {
                tracing::debug!("Event loop stopped, input thread exiting");
                return;
            }
        }
    }

    let _ = events.blocking_send(FormEvent::Shutdown);
}

/// Spawn the stdin reader thread
pub fn spawn_input_thread(
    source: Arc<MemoryFieldSource>,
    events: mpsc::Sender<FormEvent>,
    prompt: PromptLink,
) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("contact-form-input".to_string())
        .spawn(move || {
            tracing::debug!("Input thread started");
            run_input(io::stdin().lock(), &source, &events, &prompt);
            tracing::debug!("Input thread terminated");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_set_keeps_inner_whitespace() {
        assert_eq!(
            parse_command("set message Hello   there world"),
            Ok(Command::Set {
                field: "message".to_string(),
                value: "Hello   there world".to_string()
            })
        );
    }

    #[test]
    fn test_parse_set_without_value_clears() {
        assert_eq!(
            parse_command("set name"),
            Ok(Command::Set {
                field: "name".to_string(),
                value: String::new()
            })
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("  SUBMIT "), Ok(Command::Submit));
        assert_eq!(parse_command("cancel"), Ok(Command::Cancel));
        assert_eq!(parse_command("blur email"), Ok(Command::Blur("email".to_string())));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
        assert_eq!(parse_command("?"), Ok(Command::Help));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("blur"),
            Err(CommandError::MissingArgument("field name"))
        );
        assert_eq!(
            parse_command("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_affirmative_answers() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES \n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
    }

    #[test]
    fn test_run_input_types_values_and_forwards_events() {
        let source = MemoryFieldSource::new(["name", "email"]);
        let (tx, mut rx) = mpsc::channel(16);
        let (_prompt, link) = terminal_prompt();

        let script = "set name Alice\nset phone 123\nblur name\nshow\nsubmit\nquit\nsubmit\n";
        run_input(Cursor::new(script), &source, &tx, &link);

        assert_eq!(source.view("name").unwrap().value, "Alice");
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                FormEvent::Input("name".to_string()),
                FormEvent::Blur("name".to_string()),
                FormEvent::Submit,
                FormEvent::Shutdown,
            ]
        );
    }

    #[test]
    fn test_line_after_cancel_answers_prompt() {
        let source = MemoryFieldSource::new(["name"]);
        let (tx, mut rx) = mpsc::channel(16);
        let (prompt, link) = terminal_prompt();

        // The answer is read before the event loop gets to the prompt
        run_input(Cursor::new("cancel\nyes\n"), &source, &tx, &link);

        assert_eq!(rx.try_recv(), Ok(FormEvent::Cancel));
        assert!(prompt.confirm("Discard?"));
        assert_eq!(rx.try_recv(), Ok(FormEvent::Shutdown));
    }

    #[test]
    fn test_concurrent_confirm_gets_answer_after_cancel() {
        let source = MemoryFieldSource::new(["name"]);
        let (tx, mut rx) = mpsc::channel(16);
        let (prompt, link) = terminal_prompt();

        let answer = std::thread::scope(|scope| {
            let event_loop = scope.spawn(|| match rx.blocking_recv() {
                Some(FormEvent::Cancel) => Some(prompt.confirm("Discard?")),
                _ => None,
            });
            run_input(Cursor::new("cancel\nyes\n"), &source, &tx, &link);
            event_loop.join().unwrap()
        });

        assert_eq!(answer, Some(true));
        assert_eq!(rx.try_recv(), Ok(FormEvent::Shutdown));
    }

    #[test]
    fn test_commands_resume_after_answer() {
        let source = MemoryFieldSource::new(["name"]);
        let (tx, mut rx) = mpsc::channel(16);
        let (prompt, link) = terminal_prompt();

        run_input(Cursor::new("cancel\nsubmit\nsubmit\n"), &source, &tx, &link);

        // "submit" right after cancel is an answer, and not a yes
        assert!(!prompt.confirm("Discard?"));
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![FormEvent::Cancel, FormEvent::Submit, FormEvent::Shutdown]
        );
    }

    #[test]
    fn test_confirm_is_no_when_input_closes() {
        let source = MemoryFieldSource::new(["name"]);
        let (tx, _rx) = mpsc::channel(16);
        let (prompt, link) = terminal_prompt();

        run_input(Cursor::new("cancel\n"), &source, &tx, &link);
        drop(link);

        assert!(!prompt.confirm("Discard?"));
    }

    #[test]
    fn test_render_form() {
        let source = MemoryFieldSource::new(["name"]);
        source.type_value("name", "A");
        crate::ui::FieldSource::show_error(&source, "name", "too short");

        let rendered = render_form(&source);
        assert!(rendered.contains("\"A\""));
        assert!(rendered.contains("! too short"));
        assert!(rendered.contains("[Submit]"));
    }
}
