#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::collections::HashMap;
use std::collections::HashSet;

use chrono::Datelike;
use chrono::Local;
use ratatui::prelude::Rect;
use ratatui::text::Line;
use tui_textarea::Input;
use tui_textarea::Key;

use super::transcript;
use super::PersonaBinder;
use super::Scroll;
use super::SessionError;
use super::Sessions;
use super::View;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::ParticipantsBySource;
use crate::domain::models::PendingBinding;
use crate::domain::models::ProcessingReport;
use crate::domain::models::TextArea;

pub const NO_YEARS_NOTICE: &str =
    "Data processing complete, but no available years found. Please check uploaded files.";

/// Everything the chat screen shows. Events from the keyboard and from the
/// background worker are folded in through `handle_event`, which hands back
/// the remote work to schedule.
pub struct AppState<'a> {
    pub sessions: Sessions,
    pub available_years: Vec<i32>,
    pub unprocessed_files: Vec<String>,
    pub notice: Option<String>,
    pub loading_years: bool,
    pub processing: bool,
    pub exit: bool,
    pub year_cursor: usize,
    pub scroll: Scroll,
    pub textarea: tui_textarea::TextArea<'a>,
    pub transcript: Vec<Line<'static>>,
    pub last_known_width: u16,
    pub last_known_height: u16,
    pub tick: usize,
    binders: HashMap<String, (u64, PersonaBinder)>,
    participant_requests: HashSet<(String, u64)>,
}

impl<'a> AppState<'a> {
    pub fn new(max_sessions: usize) -> AppState<'a> {
        return AppState {
            sessions: Sessions::new(max_sessions),
            available_years: vec![],
            unprocessed_files: vec![],
            notice: None,
            loading_years: true,
            processing: false,
            exit: false,
            year_cursor: 0,
            scroll: Scroll::default(),
            textarea: TextArea::default(),
            transcript: vec![],
            last_known_width: 0,
            last_known_height: 0,
            tick: 0,
            binders: HashMap::new(),
            participant_requests: HashSet::new(),
        };
    }

    /// Work to kick off once the UI is up.
    pub fn init(&mut self) -> Vec<Action> {
        self.loading_years = true;
        return vec![Action::LoadAvailableYears()];
    }

    /// Persona picker for the active tab, when it still needs one.
    pub fn active_binder(&self) -> Option<&PersonaBinder> {
        let session = self.sessions.active()?;
        if session.is_bound() {
            return None;
        }

        return self
            .binders
            .get(session.id())
            .filter(|(epoch, _)| return *epoch == session.epoch())
            .map(|(_, binder)| return binder);
    }

    fn active_binder_mut(&mut self) -> Option<&mut PersonaBinder> {
        let session = self.sessions.active()?;
        if session.is_bound() {
            return None;
        }
        let epoch = session.epoch();

        return self
            .binders
            .get_mut(session.id())
            .filter(|(binder_epoch, _)| return *binder_epoch == epoch)
            .map(|(_, binder)| return binder);
    }

    /// The year a new tab opens with: the latest processed year, or the
    /// current calendar year when nothing is processed yet.
    pub fn default_year(&self) -> i32 {
        if let Some(year) = self.available_years.iter().max() {
            return *year;
        }

        return Local::now().year();
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    pub fn handle_event(&mut self, event: Event) -> Vec<Action> {
        // Tabs are hidden behind the processing view.
        if self.processing {
            match &event {
                Event::KeyboardCharInput(_)
                | Event::KeyboardEnter()
                | Event::KeyboardPaste(_)
                | Event::TabClose()
                | Event::TabNew()
                | Event::TabNext()
                | Event::TabPrevious()
                | Event::YearNext()
                | Event::YearPrevious()
                | Event::UIScrollDown()
                | Event::UIScrollUp()
                | Event::UIScrollPageDown()
                | Event::UIScrollPageUp() => return vec![],
                _ => (),
            }
        }

        let actions = match event {
            Event::AvailableYears(years) => {
                self.loading_years = false;
                self.set_years(years);
                vec![]
            }
            Event::Participants(id, epoch, candidates) => {
                self.set_participants(&id, epoch, candidates);
                vec![]
            }
            Event::SessionStarted(turn, failure) => {
                self.sessions.complete_start(&turn, failure);
                vec![]
            }
            Event::ChatReply(turn, reply) => {
                self.sessions.complete_send(&turn, reply);
                vec![]
            }
            Event::IdentitiesBound(pending, refusal) => self.finish_binding(pending, refusal),
            Event::ProcessingFinished(res) => self.finish_processing(res),
            Event::KeyboardCTRLC() => {
                self.exit = true;
                vec![]
            }
            Event::KeyboardEnter() => self.enter(),
            Event::KeyboardEsc() => {
                self.notice = None;
                vec![]
            }
            Event::KeyboardPaste(text) => {
                if self.accepts_text() {
                    self.textarea.insert_str(text);
                }
                vec![]
            }
            Event::KeyboardCharInput(input) => {
                self.char_input(input);
                vec![]
            }
            Event::TabNew() => self.open_tab(self.default_year()),
            Event::TabClose() => self.close_active(),
            Event::TabNext() => self.cycle_tab(1),
            Event::TabPrevious() => self.cycle_tab(-1),
            Event::YearNext() => self.step_year(true),
            Event::YearPrevious() => self.step_year(false),
            Event::ProcessData() => self.process(),
            Event::UIScrollDown() => {
                self.scroll_down();
                vec![]
            }
            Event::UIScrollUp() => {
                self.scroll_up();
                vec![]
            }
            Event::UIScrollPageDown() => {
                self.scroll.down_page();
                vec![]
            }
            Event::UIScrollPageUp() => {
                self.scroll.up_page();
                vec![]
            }
            Event::UITick() => {
                self.tick = self.tick.wrapping_add(1);
                vec![]
            }
        };

        self.sync_dependants();
        return actions;
    }

    fn set_years(&mut self, mut years: Vec<i32>) {
        years.sort();
        years.dedup();
        self.available_years = years;
        self.year_cursor = self
            .year_cursor
            .min(self.available_years.len().saturating_sub(1));
    }

    fn set_participants(&mut self, id: &str, epoch: u64, candidates: ParticipantsBySource) {
        self.participant_requests
            .remove(&(id.to_string(), epoch));

        let session = match self.sessions.get(id) {
            Some(session) => session,
            None => return,
        };
        if session.epoch() != epoch || session.is_bound() {
            tracing::debug!(id = id, "Discarding participants for a superseded year");
            return;
        }

        let binder = PersonaBinder::new(session.year(), candidates);
        self.binders.insert(id.to_string(), (epoch, binder));
    }

    /// Schedules whatever the active tab needs next: its participants while
    /// unbound, or the start request once bound.
    fn sync_active(&mut self) -> Vec<Action> {
        let (id, epoch, year, bound) = match self.sessions.active() {
            Some(session) => (
                session.id().to_string(),
                session.epoch(),
                session.year(),
                session.is_bound(),
            ),
            None => return vec![],
        };

        if bound {
            if let Some(turn) = self.sessions.begin_start(&id) {
                return vec![Action::StartSession(turn)];
            }
            return vec![];
        }

        let loaded = self
            .binders
            .get(&id)
            .map(|(binder_epoch, _)| return *binder_epoch == epoch)
            .unwrap_or(false);
        let key = (id.to_string(), epoch);
        if loaded || self.participant_requests.contains(&key) {
            return vec![];
        }

        self.participant_requests.insert(key);
        return vec![Action::LoadParticipants(id, epoch, year)];
    }

    fn after_switch(&mut self) -> Vec<Action> {
        self.textarea = TextArea::default();
        self.scroll.last();
        return self.sync_active();
    }

    pub fn open_tab(&mut self, year: i32) -> Vec<Action> {
        match self.sessions.create(year) {
            Ok(_) => return self.after_switch(),
            Err(err) => {
                self.notice = Some(err.to_string());
                return vec![];
            }
        }
    }

    pub fn open_year(&mut self, year: i32) -> Vec<Action> {
        match self.sessions.open_year(year) {
            Ok(_) => return self.after_switch(),
            Err(err) => {
                self.notice = Some(err.to_string());
                return vec![];
            }
        }
    }

    pub fn close_active(&mut self) -> Vec<Action> {
        let id = match self.sessions.active_id() {
            Some(id) => id.to_string(),
            None => return vec![],
        };

        match self.sessions.close(&id) {
            Ok(()) => {
                self.binders.remove(&id);
                let mut actions = vec![Action::AbandonSession(id)];
                actions.extend(self.after_switch());
                return actions;
            }
            Err(SessionError::LastSession) => {
                tracing::debug!(id = id, "Ignoring close of the last tab");
                return vec![];
            }
            Err(err) => {
                self.notice = Some(err.to_string());
                return vec![];
            }
        }
    }

    fn cycle_tab(&mut self, offset: isize) -> Vec<Action> {
        if self.sessions.len() < 2 || !self.sessions.cycle(offset) {
            return vec![];
        }

        return self.after_switch();
    }

    /// Moves the active tab to the neighbouring processed year.
    fn step_year(&mut self, forward: bool) -> Vec<Action> {
        let (id, year) = match self.sessions.active() {
            Some(session) => (session.id().to_string(), session.year()),
            None => return vec![],
        };

        let next = if forward {
            self.available_years.iter().find(|candidate| return **candidate > year)
        } else {
            self.available_years
                .iter()
                .rev()
                .find(|candidate| return **candidate < year)
        };
        let next = match next {
            Some(next) => *next,
            None => return vec![],
        };

        return self.change_year(&id, next);
    }

    pub fn change_year(&mut self, id: &str, year: i32) -> Vec<Action> {
        if let Err(err) = self.sessions.change_year(id, year) {
            self.notice = Some(err.to_string());
            return vec![];
        }

        self.binders.remove(id);
        self.textarea = TextArea::default();
        return self.sync_active();
    }

    pub fn confirm_persona(&mut self) -> Vec<Action> {
        let id = match self.sessions.active_id() {
            Some(id) => id.to_string(),
            None => return vec![],
        };
        let binder = match self.active_binder() {
            Some(binder) => binder.clone(),
            None => return vec![],
        };

        match self.sessions.begin_binding(&id, &binder) {
            Ok(pending) => {
                self.notice = None;
                return vec![Action::BindIdentities(pending)];
            }
            Err(err) => {
                self.notice = Some(err.to_string());
                return vec![];
            }
        }
    }

    fn finish_binding(&mut self, pending: PendingBinding, refusal: Option<String>) -> Vec<Action> {
        if let Some(notice) = refusal {
            self.sessions.abort_binding(&pending);
            self.notice = Some(notice);
            return vec![];
        }

        let id = pending.session_id.to_string();
        if let Err(err) = self.sessions.commit_binding(pending) {
            tracing::debug!(id = id, error = ?err, "Binding acknowledged too late");
            return vec![];
        }
        self.binders.remove(&id);

        if let Some(turn) = self.sessions.begin_start(&id) {
            return vec![Action::StartSession(turn)];
        }
        return vec![];
    }

    pub fn submit(&mut self) -> Vec<Action> {
        let id = match self.sessions.active_id() {
            Some(id) => id.to_string(),
            None => return vec![],
        };
        let text = self.textarea.lines().join("\n");

        match self.sessions.begin_send(&id, &text) {
            Ok(turn) => {
                self.textarea = TextArea::default();
                self.scroll.last();
                return vec![Action::SendMessage(turn)];
            }
            Err(SessionError::EmptyMessage) | Err(SessionError::Busy) => {
                return vec![];
            }
            Err(err) => {
                self.notice = Some(err.to_string());
                return vec![];
            }
        }
    }

    /// Starts bulk processing. Open tabs are kept, the latest year is opened
    /// next to them once the service reports back.
    pub fn process(&mut self) -> Vec<Action> {
        if self.processing {
            return vec![];
        }

        self.notice = None;
        self.processing = true;
        return vec![Action::RequestProcessing()];
    }

    fn finish_processing(&mut self, res: Result<ProcessingReport, String>) -> Vec<Action> {
        self.processing = false;

        let report = match res {
            Ok(report) => report,
            Err(err) => {
                self.notice = Some(err);
                return vec![];
            }
        };

        self.set_years(report.available_years.to_vec());
        self.unprocessed_files = report.unprocessed_files.to_vec();

        match report.latest_year() {
            Some(year) => return self.open_year(year),
            None => {
                self.notice = Some(NO_YEARS_NOTICE.to_string());
                return vec![];
            }
        }
    }

    fn enter(&mut self) -> Vec<Action> {
        if self.sessions.view() == View::Default {
            if let Some(year) = self.available_years.get(self.year_cursor) {
                let year = *year;
                return self.open_year(year);
            }
            return self.open_tab(self.default_year());
        }

        if self.active_binder().is_some() {
            return self.confirm_persona();
        }

        return self.submit();
    }

    fn accepts_text(&self) -> bool {
        return self
            .sessions
            .active()
            .map(|session| return session.is_bound() && !session.is_awaiting_response())
            .unwrap_or(false);
    }

    fn char_input(&mut self, input: Input) {
        if let Some(binder) = self.active_binder_mut() {
            match input.key {
                Key::Left => binder.cycle(false),
                Key::Right => binder.cycle(true),
                _ => (),
            }
            return;
        }

        if self.accepts_text() {
            self.textarea.input(input);
        }
    }

    fn scroll_up(&mut self) {
        if self.sessions.view() == View::Default {
            self.year_cursor = self.year_cursor.saturating_sub(1);
            return;
        }
        if let Some(binder) = self.active_binder_mut() {
            binder.cursor_up();
            return;
        }

        self.scroll.up();
    }

    fn scroll_down(&mut self) {
        if self.sessions.view() == View::Default {
            if self.year_cursor + 1 < self.available_years.len() {
                self.year_cursor += 1;
            }
            return;
        }
        if let Some(binder) = self.active_binder_mut() {
            binder.cursor_down();
            return;
        }

        self.scroll.down();
    }

    fn sync_dependants(&mut self) {
        // Room for the scrollbar.
        let width = self.last_known_width.saturating_sub(4) as usize;
        self.transcript = match self.sessions.active() {
            Some(session) => transcript::lines(session, width),
            None => vec![],
        };

        self.scroll
            .set_state(self.transcript.len() as u16, self.last_known_height);
    }
}
