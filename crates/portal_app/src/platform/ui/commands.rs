//! Shell command line: tokenising, parsing with clap, and turning commands into messages.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use portal_core::{
    parse_loose_date, validate_csv_file, CsvAttachment, DateInputMode, DatePreset, DateSelection,
    DocumentFilter, DownloadMethod, Msg, Tab, UploadFormat,
};

#[derive(Debug, Parser)]
#[command(
    name = "portal",
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "Commands:\n{subcommands}"
)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Set the report location
    Location {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Set the address the report is sent to
    Email { address: String },
    /// Switch the date input between single, range and preset
    Mode { mode: ModeArg },
    /// Pick one date, e.g. 2025-03-23 or "March 23rd, 2025"
    Date {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Pick a date range
    Range { from: String, to: String },
    /// Pick a canned option: today, next-7-days, next-14-days, next-30-days
    Preset {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Forget the picked date
    ClearDate,
    /// Attach a CSV file to the report request
    Attach { path: PathBuf },
    /// Remove the attached CSV file
    Detach,
    /// Send the report request
    Submit,
    /// Show another tab
    Tab { tab: TabArg },
    /// Download a generated report by its list number
    Download {
        number: usize,
        /// Only print the resolved link
        #[arg(long)]
        link: bool,
    },
    /// Load the latest documents
    Docs,
    /// Filter loaded documents; omitted options are cleared
    Filter {
        #[arg(long)]
        location: Option<String>,
        #[arg(long = "type")]
        doc_type: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Earliest content date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest content date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show all loaded documents again
    ClearFilter,
    /// Save the visible documents as CSV
    Export,
    /// Send a CSV file to the upload webhook
    Upload {
        /// File to select before sending
        path: Option<PathBuf>,
        /// Webhook to use instead of the configured one
        #[arg(long, conflicts_with = "default_url")]
        url: Option<String>,
        /// Go back to the configured webhook
        #[arg(long)]
        default_url: bool,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Only change the selection and settings
        #[arg(long)]
        no_send: bool,
    },
    /// Clear the status line
    Dismiss,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Single,
    Range,
    Preset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TabArg {
    Request,
    Reports,
    Documents,
    Upload,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Multipart,
    Json,
}

/// What the dispatcher should do with one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    Dispatch(Vec<Msg>),
    /// Needs the report list to map the number to an id.
    Download { number: usize, method: DownloadMethod },
    Quit,
}

/// Parses one input line. `Ok(None)` for blank lines; `Err` carries text to print,
/// including clap's help output.
pub fn interpret(line: &str, now: DateTime<Local>) -> Result<Option<ShellAction>, String> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    let parsed = ShellLine::try_parse_from(tokens).map_err(|err| err.render().to_string())?;
    into_action(parsed.command, now).map(Some)
}

fn into_action(command: ShellCommand, now: DateTime<Local>) -> Result<ShellAction, String> {
    let at: DateTime<Utc> = now.with_timezone(&Utc);
    let msgs = match command {
        ShellCommand::Location { words } => vec![Msg::LocationChanged(words.join(" "))],
        ShellCommand::Email { address } => vec![Msg::EmailChanged(address)],
        ShellCommand::Mode { mode } => vec![Msg::DateModeChanged(match mode {
            ModeArg::Single => DateInputMode::Single,
            ModeArg::Range => DateInputMode::Range,
            ModeArg::Preset => DateInputMode::Preset,
        })],
        ShellCommand::Date { words } => {
            vec![Msg::DateSelected(DateSelection::Single(parse_day(&words.join(" "))?))]
        }
        ShellCommand::Range { from, to } => vec![Msg::DateSelected(DateSelection::Range {
            from: parse_day(&from)?,
            to: parse_day(&to)?,
        })],
        ShellCommand::Preset { words } => {
            let text = words.join(" ");
            let preset = DatePreset::parse(&text).ok_or_else(|| {
                let names: Vec<&str> = DatePreset::ALL.iter().map(|p| p.label()).collect();
                format!("unknown preset {text:?}; choose one of: {}", names.join(", "))
            })?;
            vec![Msg::DateSelected(DateSelection::Preset(preset))]
        }
        ShellCommand::ClearDate => vec![Msg::DateCleared],
        ShellCommand::Attach { path } => vec![Msg::CsvAttached(read_csv(&path)?)],
        ShellCommand::Detach => vec![Msg::CsvDetached],
        ShellCommand::Submit => vec![Msg::SubmitClicked { at }],
        ShellCommand::Tab { tab } => vec![Msg::TabSelected(match tab {
            TabArg::Request => Tab::Request,
            TabArg::Reports => Tab::Reports,
            TabArg::Documents => Tab::Documents,
            TabArg::Upload => Tab::Upload,
        })],
        ShellCommand::Download { number, link } => {
            if number == 0 {
                return Err("report numbers start at 1".to_string());
            }
            let method = if link {
                DownloadMethod::Link
            } else {
                DownloadMethod::Fetch
            };
            return Ok(ShellAction::Download { number, method });
        }
        ShellCommand::Docs => vec![Msg::TabSelected(Tab::Documents), Msg::DocumentsRequested],
        ShellCommand::Filter {
            location,
            doc_type,
            source,
            content,
            from,
            to,
        } => vec![Msg::FilterChanged(DocumentFilter {
            location,
            doc_type,
            source,
            content,
            date_from: from,
            date_to: to,
        })],
        ShellCommand::ClearFilter => vec![Msg::FilterChanged(DocumentFilter::default())],
        ShellCommand::Export => vec![Msg::ExportClicked {
            today: now.date_naive(),
        }],
        ShellCommand::Upload {
            path,
            url,
            default_url,
            format,
            no_send,
        } => {
            let mut msgs = vec![Msg::TabSelected(Tab::Upload)];
            if let Some(path) = path {
                let file = read_csv(&path)?;
                validate_csv_file(&file).map_err(|err| err.to_string())?;
                msgs.push(Msg::UploadFileSelected(file));
            }
            if url.is_some() || default_url {
                msgs.push(Msg::UploadWebhookChanged(url));
            }
            if let Some(format) = format {
                msgs.push(Msg::UploadFormatChanged(match format {
                    FormatArg::Multipart => UploadFormat::Multipart,
                    FormatArg::Json => UploadFormat::Json,
                }));
            }
            if !no_send {
                msgs.push(Msg::UploadClicked { at });
            }
            msgs
        }
        ShellCommand::Dismiss => vec![Msg::NoticeDismissed],
        ShellCommand::Quit => return Ok(ShellAction::Quit),
    };
    Ok(ShellAction::Dispatch(msgs))
}

fn parse_day(text: &str) -> Result<NaiveDate, String> {
    parse_loose_date(text).ok_or_else(|| format!("not a date: {text:?}"))
}

fn read_csv(path: &Path) -> Result<CsvAttachment, String> {
    let content =
        fs::read_to_string(path).map_err(|err| format!("cannot read {}: {err}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(CsvAttachment { filename, content })
}

/// Splits on whitespace, keeping single- or double-quoted runs together.
pub(crate) fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
