//! Upload/process state machine.
//!
//! The controller owns the selected file, the last applied filter and the
//! request phase. UI code feeds it [`Event`]s and carries out the returned
//! [`Command`]s; it never touches the controller's state directly. Only the
//! non-processing arms of [`Controller::handle`] can produce a
//! [`Command::Submit`], so a second request can never be issued while one is
//! in flight.

use crate::catalog::FilterId;
use crate::notify::Level;
use crate::service::{FilteredResult, SubmitError, SubmitRequest};
use crate::upload::{Candidate, SelectedFile};
use crate::validate;

pub const UPLOAD_FIRST: &str = "Please upload an image first";
pub const UPLOADED: &str = "Image uploaded! Pick a filter to start the journey back to 2000s";
pub const GENERATE_LABEL: &str = "Generate";
pub const GENERATING_LABEL: &str = "Generating...";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// Identifies one dispatched request so late answers can be recognized.
pub struct Ticket(u64);

impl Ticket {
    pub fn next(self) -> Self {
        Ticket(self.0.wrapping_add(1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No file selected.
    Idle,
    /// A validated file is present, no result is shown.
    FileSelected,
    /// One request is in flight.
    Processing { ticket: Ticket, filter: FilterId },
    /// The server returned a filtered image.
    ResultReady(FilteredResult),
}

#[derive(Debug)]
pub enum Event {
    /// A file was picked or dropped.
    FileChosen(Candidate),
    /// A filter button was clicked.
    FilterClicked(FilterId),
    /// The generate button was pressed. `None` means no filter is highlighted.
    Generate(Option<FilterId>),
    /// A dispatched request came back.
    Finished {
        ticket: Ticket,
        outcome: Result<FilteredResult, SubmitError>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Notify { text: String, level: Level },
    /// Forget the file name shown in the upload box.
    ClearInput,
    /// Replace the original pane with its placeholder.
    ShowOriginalPlaceholder,
    /// Decode and show the newly selected file.
    RenderPreview(SelectedFile),
    /// Bring the filter buttons into view.
    ScrollToFilters,
    /// Send one request to the filter service.
    Submit { ticket: Ticket, request: SubmitRequest },
    /// The result for the live request is ready to be painted.
    ShowResult,
}

impl Command {
    fn notify(text: impl Into<String>, level: Level) -> Self {
        Command::Notify {
            text: text.into(),
            level,
        }
    }
}

/// What the filtered pane should display.
#[derive(Debug, PartialEq, Eq)]
pub enum ResultPane<'a> {
    Placeholder,
    Generating,
    Ready(&'a FilteredResult),
}

#[derive(Debug)]
pub struct Controller {
    phase: Phase,
    current_file: Option<SelectedFile>,
    /// Last filter the server applied successfully to `current_file`.
    current_filter: Option<FilterId>,
    default_filter: FilterId,
    last_ticket: Ticket,
}

impl Controller {
    pub fn new(default_filter: FilterId) -> Self {
        Self {
            phase: Phase::Idle,
            current_file: None,
            current_filter: None,
            default_filter,
            last_ticket: Ticket::default(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.phase, Phase::Processing { .. })
    }

    pub fn current_file(&self) -> Option<&SelectedFile> {
        self.current_file.as_ref()
    }

    pub fn current_filter(&self) -> Option<FilterId> {
        self.current_filter
    }

    pub fn result(&self) -> Option<&FilteredResult> {
        match &self.phase {
            Phase::ResultReady(result) => Some(result),
            _ => None,
        }
    }

    pub fn result_pane(&self) -> ResultPane<'_> {
        match &self.phase {
            Phase::Idle | Phase::FileSelected => ResultPane::Placeholder,
            Phase::Processing { .. } => ResultPane::Generating,
            Phase::ResultReady(result) => ResultPane::Ready(result),
        }
    }

    pub fn generate_enabled(&self) -> bool {
        !self.is_processing()
    }

    pub fn generate_label(&self) -> &'static str {
        if self.is_processing() {
            GENERATING_LABEL
        } else {
            GENERATE_LABEL
        }
    }

    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        let commands = match event {
            Event::FileChosen(candidate) => self.choose_file(candidate),
            Event::FilterClicked(filter) => self.request_filter(filter),
            Event::Generate(filter) => self.request_filter(filter.unwrap_or(self.default_filter)),
            Event::Finished { ticket, outcome } => self.finish(ticket, outcome),
        };
        debug_assert_eq!(
            self.current_file.is_none(),
            self.phase == Phase::Idle,
            "a file is selected exactly when the controller is not idle"
        );
        commands
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.current_file = None;
        self.current_filter = None;
    }

    fn reject_file(&mut self, reason: String) -> Vec<Command> {
        self.reset();
        vec![
            Command::notify(reason, Level::Error),
            Command::ClearInput,
            Command::ShowOriginalPlaceholder,
        ]
    }

    fn choose_file(&mut self, candidate: Candidate) -> Vec<Command> {
        if let Err(err) = validate::validate(&candidate.descriptor()) {
            tracing::info!(name = %candidate.name, %err, "file rejected");
            return self.reject_file(err.to_string());
        }
        let file = match candidate.load() {
            Ok(file) => file,
            Err(err) => {
                let reason = format!("{:#}", err);
                tracing::warn!(%reason, "file could not be read");
                return self.reject_file(reason);
            }
        };

        tracing::info!(name = %file.name, mime = %file.mime, size = file.size(), "file selected");
        if let Phase::Processing { ticket, .. } = &self.phase {
            tracing::debug!(?ticket, "in-flight request superseded by new file");
        }
        self.phase = Phase::FileSelected;
        self.current_filter = None;
        self.current_file = Some(file.clone());
        vec![
            Command::RenderPreview(file),
            Command::notify(UPLOADED, Level::Success),
            Command::ScrollToFilters,
        ]
    }

    fn request_filter(&mut self, filter: FilterId) -> Vec<Command> {
        let file = match (&self.phase, &self.current_file) {
            (Phase::Processing { ticket, .. }, _) => {
                tracing::debug!(?ticket, %filter, "request dropped while processing");
                return Vec::new();
            }
            (Phase::Idle, _) | (_, None) => {
                return vec![Command::notify(UPLOAD_FIRST, Level::Info)];
            }
            (Phase::ResultReady(_), Some(_)) if self.current_filter == Some(filter) => {
                return vec![Command::notify(
                    format!("Filter \"{}\" is already applied", filter.label()),
                    Level::Info,
                )];
            }
            (_, Some(file)) => file,
        };

        let request = SubmitRequest {
            file_name: file.name.clone(),
            mime: file.mime.clone(),
            bytes: file.bytes.clone(),
            filter,
        };
        let ticket = self.last_ticket.next();
        self.last_ticket = ticket;
        self.phase = Phase::Processing { ticket, filter };
        tracing::info!(?ticket, %filter, "processing started");
        vec![Command::Submit { ticket, request }]
    }

    fn finish(
        &mut self,
        ticket: Ticket,
        outcome: Result<FilteredResult, SubmitError>,
    ) -> Vec<Command> {
        let Phase::Processing {
            ticket: live,
            filter,
        } = self.phase
        else {
            tracing::debug!(?ticket, "response arrived with nothing in flight");
            return Vec::new();
        };
        if ticket != live {
            tracing::debug!(?ticket, ?live, "stale response ignored");
            return Vec::new();
        }

        match outcome {
            Ok(result) => {
                tracing::info!(?ticket, filter_name = %result.filter_name, "filter applied");
                self.current_filter = Some(filter);
                self.phase = Phase::ResultReady(result);
                vec![
                    Command::ShowResult,
                    Command::notify(
                        format!("Filter \"{}\" applied!", filter.label()),
                        Level::Success,
                    ),
                ]
            }
            Err(err) => {
                tracing::warn!(?ticket, %err, "filter request failed");
                self.phase = Phase::FileSelected;
                vec![Command::notify(err.user_message(), Level::Error)]
            }
        }
    }
}
