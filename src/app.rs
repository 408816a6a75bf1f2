//! Application state and the transitions driven by user actions.
//!
//! `reduce` is a pure function over `ViewState`; `App` owns the stores and
//! applies the effects a transition asks for.

use crate::catalog::AssignmentCatalog;
use crate::error::{HomeworkError, HomeworkResult};
use crate::gate;
use crate::model::{format_date, HomeworkItem, HomeworkRecord, HomeworkStatus};
use crate::session::EntrySession;
use crate::store::{BlobStore, RecordStore};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewMode {
    Home,
    GroupEntry,
    TeacherLogin,
    TeacherDashboard,
    TeacherHomeworkMgmt,
}

impl ViewMode {
    pub fn is_teacher(self) -> bool {
        matches!(self, ViewMode::TeacherDashboard | ViewMode::TeacherHomeworkMgmt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub view: ViewMode,
    pub session: EntrySession,
    pub current_date: String,
    pub current_homework: String,
    pub pin_input: String,
    pub login_error: bool,
}

impl ViewState {
    pub fn new(today: &str, default_homework: &str) -> Self {
        Self {
            view: ViewMode::Home,
            session: EntrySession::NotStarted,
            current_date: today.to_string(),
            current_homework: default_homework.to_string(),
            pin_input: String::new(),
            login_error: false,
        }
    }

    pub fn selected_group(&self) -> Option<u8> {
        self.session.group()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectGroup(u8),
    SetStatus {
        student_id: i64,
        status: HomeworkStatus,
    },
    SetDate(String),
    SetHomework(String),
    Submit,
    GoHome,
    OpenLogin,
    EnterPin(String),
    SubmitPin,
    Logout,
    OpenHomeworkMgmt,
    BackToDashboard,
}

/// Inputs a transition may need besides the state itself.
#[derive(Debug, Clone, Copy)]
pub struct ReduceCtx<'a> {
    pub now_ms: i64,
    /// Picked when the assignment name is cleared.
    pub default_homework: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Records to append to the record store.
    Commit(Vec<HomeworkRecord>),
    /// The PIN did not match; the error flag is already set in the new state.
    AuthRejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ViewState,
    pub effect: Effect,
}

fn require_view(state: &ViewState, allowed: &[ViewMode], action: &str) -> HomeworkResult<()> {
    if allowed.contains(&state.view) {
        return Ok(());
    }
    Err(HomeworkError::invalid_state(format!(
        "{} is not available from {:?}",
        action, state.view
    )))
}

/// Computes the next state. On error the caller's state is untouched.
pub fn reduce(state: &ViewState, action: Action, ctx: ReduceCtx<'_>) -> HomeworkResult<Transition> {
    let mut next = state.clone();
    let mut effect = Effect::None;

    match action {
        Action::SelectGroup(group) => {
            require_view(state, &[ViewMode::Home, ViewMode::GroupEntry], "group selection")?;
            next.session = EntrySession::start(group)?;
            next.view = ViewMode::GroupEntry;
        }
        Action::SetStatus { student_id, status } => {
            require_view(state, &[ViewMode::GroupEntry], "status entry")?;
            next.session.set_status(student_id, status)?;
        }
        Action::SetDate(date) => {
            next.current_date = date.trim().to_string();
        }
        Action::SetHomework(name) => {
            // Only a cleared field falls back; blank text is kept so submit rejects it.
            next.current_homework = if name.is_empty() {
                ctx.default_homework.to_string()
            } else {
                name
            };
        }
        Action::Submit => {
            require_view(state, &[ViewMode::GroupEntry], "submit")?;
            let records =
                next.session
                    .commit(&state.current_date, &state.current_homework, ctx.now_ms)?;
            next.view = ViewMode::Home;
            effect = Effect::Commit(records);
        }
        Action::GoHome => {
            next.session.abandon();
            next.view = ViewMode::Home;
        }
        Action::OpenLogin => {
            require_view(state, &[ViewMode::Home], "teacher login")?;
            next.view = ViewMode::TeacherLogin;
        }
        Action::EnterPin(pin) => {
            require_view(state, &[ViewMode::TeacherLogin], "PIN entry")?;
            next.pin_input = pin;
        }
        Action::SubmitPin => {
            require_view(state, &[ViewMode::TeacherLogin], "PIN submit")?;
            if gate::authenticate(&state.pin_input) {
                next.view = ViewMode::TeacherDashboard;
                next.login_error = false;
            } else {
                next.login_error = true;
                effect = Effect::AuthRejected;
            }
            next.pin_input.clear();
        }
        Action::Logout => {
            require_view(
                state,
                &[ViewMode::TeacherDashboard, ViewMode::TeacherHomeworkMgmt],
                "logout",
            )?;
            next.view = ViewMode::Home;
        }
        Action::OpenHomeworkMgmt => {
            require_view(state, &[ViewMode::TeacherDashboard], "homework management")?;
            next.view = ViewMode::TeacherHomeworkMgmt;
        }
        Action::BackToDashboard => {
            require_view(state, &[ViewMode::TeacherHomeworkMgmt], "dashboard")?;
            next.view = ViewMode::TeacherDashboard;
        }
    }

    Ok(Transition {
        state: next,
        effect,
    })
}

pub trait Clock {
    fn now_ms(&self) -> i64;
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Default)]
pub struct Dispatched {
    pub committed: usize,
    pub auth_rejected: bool,
    /// Set when the state advanced but the write behind it failed.
    pub storage_warning: Option<HomeworkError>,
}

pub struct App<S> {
    state: ViewState,
    records: RecordStore<S>,
    catalog: AssignmentCatalog<S>,
    store: S,
    clock: Box<dyn Clock>,
    last_stamp: i64,
}

impl<S: BlobStore + Clone> App<S> {
    pub fn open(store: S, clock: Box<dyn Clock>) -> HomeworkResult<Self> {
        let records = RecordStore::open(store.clone())?;
        let catalog = AssignmentCatalog::open(store.clone())?;
        let default_homework = catalog
            .items()
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_default();
        let state = ViewState::new(&format_date(clock.today()), &default_homework);
        let last_stamp = records.latest_updated_at().unwrap_or(0);
        Ok(Self {
            state,
            records,
            catalog,
            store,
            clock,
            last_stamp,
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn records(&self) -> &[HomeworkRecord] {
        self.records.all()
    }

    pub fn catalog(&self) -> &[HomeworkItem] {
        self.catalog.items()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Strictly increasing across calls, and past every persisted stamp.
    fn next_stamp(&self) -> i64 {
        self.clock.now_ms().max(self.last_stamp + 1)
    }

    pub fn dispatch(&mut self, action: Action) -> HomeworkResult<Dispatched> {
        let default_homework = self
            .catalog
            .items()
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_default();
        let ctx = ReduceCtx {
            now_ms: self.next_stamp(),
            default_homework: &default_homework,
        };
        let Transition { state, effect } = reduce(&self.state, action, ctx)?;
        self.state = state;

        let mut out = Dispatched::default();
        match effect {
            Effect::None => {}
            Effect::AuthRejected => {
                warn!("teacher PIN rejected");
                out.auth_rejected = true;
            }
            Effect::Commit(records) => {
                out.committed = records.len();
                if let Some(max) = records.iter().map(|r| r.updated_at).max() {
                    self.last_stamp = max;
                }
                info!(
                    count = records.len(),
                    date = %self.state.current_date,
                    homework = %self.state.current_homework,
                    "committed entry session"
                );
                if let Err(e) = self.records.append(records) {
                    out.storage_warning = Some(e);
                }
            }
        }
        Ok(out)
    }

    pub fn require_teacher(&self) -> HomeworkResult<()> {
        if self.state.view.is_teacher() {
            Ok(())
        } else {
            Err(HomeworkError::AuthRequired)
        }
    }

    pub fn delete_record(&mut self, id: &str) -> HomeworkResult<bool> {
        self.require_teacher()?;
        let removed = self.records.remove(id)?;
        if removed {
            info!(id, "deleted homework record");
        }
        Ok(removed)
    }

    pub fn add_catalog_item(&mut self, name: &str) -> HomeworkResult<HomeworkItem> {
        self.require_teacher()?;
        self.catalog.add(name)
    }

    pub fn remove_catalog_item(&mut self, id: &str) -> HomeworkResult<bool> {
        self.require_teacher()?;
        self.catalog.remove(id)
    }
}
