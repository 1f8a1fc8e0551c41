use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use webbrowser::Browser;

use crate::analyzer::TypingSession;
use crate::cheat::{CheatReason, CheatWarning};
use crate::clipboard::{ClipboardAction, ClipboardGuard, ClipboardSurface};
use crate::clock::Clock;
use crate::config::AnalyzerSettings;
use crate::exercise::{Exercise, LanguagePair};
use crate::history::ResultsDb;
use crate::payload::ExercisePayload;
use crate::scoring::{score_with_rules, ScoreReport, ScoringRules};
use crate::share::{share_text, share_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Exercise,
    Results,
}

/// What the event loop should do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// An accepted attempt and its score.
#[derive(Debug, Clone)]
pub struct ExerciseResult {
    pub payload: ExercisePayload,
    pub score: ScoreReport,
}

/// Terminal host for one exercise: owns the session, the clipboard
/// interception and the screen state.
pub struct App<C: Clock, S: ClipboardSurface + Clone> {
    pair: LanguagePair,
    exercise_number: usize,
    exercise: Exercise,
    session: TypingSession,
    state: AppState,
    warning: Option<CheatWarning>,
    notice: Option<&'static str>,
    result: Option<ExerciseResult>,
    scoring: ScoringRules,
    history: Option<ResultsDb>,
    clock: C,
    surface: S,
    guard: Option<ClipboardGuard<S>>,
}

impl<C: Clock, S: ClipboardSurface + Clone> App<C, S> {
    pub fn new(
        pair: LanguagePair,
        exercise_number: usize,
        exercise: Exercise,
        settings: AnalyzerSettings,
        scoring: ScoringRules,
        clock: C,
        surface: S,
    ) -> Self {
        let session = TypingSession::start(&exercise.text, pair.slug(), clock.now_ms(), settings);
        let mut app = Self {
            pair,
            exercise_number,
            exercise,
            session,
            state: AppState::Exercise,
            warning: None,
            notice: None,
            result: None,
            scoring,
            history: None,
            clock,
            surface,
            guard: None,
        };
        app.acquire_guard();
        app
    }

    /// Persist accepted attempts to `db`.
    pub fn with_history(mut self, db: ResultsDb) -> Self {
        self.history = Some(db);
        self
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn pair(&self) -> LanguagePair {
        self.pair
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn session(&self) -> &TypingSession {
        &self.session
    }

    /// The pending cheat alert, if one is waiting to be dismissed.
    pub fn warning(&self) -> Option<&CheatWarning> {
        self.warning.as_ref()
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn result(&self) -> Option<&ExerciseResult> {
        self.result.as_ref()
    }

    pub fn clipboard_blocked(&self) -> bool {
        self.guard.is_some()
    }

    pub fn history(&self) -> Option<&ResultsDb> {
        self.history.as_ref()
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return Flow::Quit;
        }

        match self.state {
            AppState::Exercise => self.on_exercise_key(key, ctrl),
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.retake(),
                KeyCode::Char('t') => self.share(),
                KeyCode::Char('q') => return Flow::Quit,
                _ => {}
            },
        }
        Flow::Continue
    }

    /// A bracketed paste reached the exercise; the text is discarded.
    pub fn on_paste(&mut self, _text: &str) {
        if self.state == AppState::Exercise {
            self.reject(ClipboardAction::Paste);
        }
    }

    fn on_exercise_key(&mut self, key: KeyEvent, ctrl: bool) {
        // An open alert swallows the key that dismisses it.
        if self.warning.take().is_some() {
            return;
        }

        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('v') if ctrl => self.reject(ClipboardAction::Paste),
            KeyCode::Insert if shift => self.reject(ClipboardAction::Paste),
            KeyCode::Insert if ctrl => self.reject(ClipboardAction::Copy),
            KeyCode::Char('x') if ctrl => self.reject(ClipboardAction::Cut),
            KeyCode::Char('w') | KeyCode::Backspace if ctrl => {
                let mut input = self.session.input().to_string();
                delete_word(&mut input);
                self.edit(input);
            }
            KeyCode::Backspace => {
                let mut input = self.session.input().to_string();
                if input.pop().is_some() {
                    self.edit(input);
                }
            }
            KeyCode::Enter => self.append('\n'),
            KeyCode::Tab => self.complete(),
            KeyCode::Char(c) if !ctrl => self.append(c),
            _ => {}
        }
    }

    fn append(&mut self, c: char) {
        let mut input = self.session.input().to_string();
        input.push(c);
        self.edit(input);
    }

    fn edit(&mut self, input: String) {
        self.notice = None;
        let now = self.clock.now_ms();
        if let Some(w) = self.session.on_input_change(&input, now) {
            self.warning = Some(w);
        }
    }

    fn reject(&mut self, action: ClipboardAction) {
        if let Some(w) = self.session.reject_clipboard(action) {
            self.warning = Some(w);
        } else {
            self.notice = Some(
                CheatWarning {
                    reason: CheatReason::Clipboard,
                }
                .message(),
            );
        }
    }

    /// Try to end the attempt.
    pub fn complete(&mut self) {
        let now = self.clock.now_ms();
        match self.session.complete(self.exercise_number, now) {
            Ok(payload) => {
                let score = score_with_rules(&self.scoring, &payload.metrics);
                if let Some(db) = &self.history {
                    if let Err(e) = db.record(&payload, &score) {
                        log::warn!("failed to store result: {}", e);
                    }
                }
                self.guard = None;
                self.notice = None;
                self.result = Some(ExerciseResult { payload, score });
                self.state = AppState::Results;
            }
            Err(e) if e.requires_restart() => {
                log::info!("discarding attempt: {}", e);
                self.restart_session();
                self.notice = Some(e.user_message());
            }
            Err(e) => {
                self.notice = Some(e.user_message());
            }
        }
    }

    /// Start over on the same exercise from the results screen.
    pub fn retake(&mut self) {
        self.result = None;
        self.restart_session();
        self.state = AppState::Exercise;
    }

    fn restart_session(&mut self) {
        self.guard = None;
        self.session = self.session.restart(self.clock.now_ms());
        self.warning = None;
        self.notice = None;
        self.acquire_guard();
    }

    fn acquire_guard(&mut self) {
        match ClipboardGuard::acquire(self.surface.clone()) {
            Ok(guard) => self.guard = Some(guard),
            Err(e) => log::warn!("clipboard interception unavailable: {}", e),
        }
    }

    fn share(&self) {
        let Some(result) = &self.result else {
            return;
        };
        if !Browser::is_available() {
            return;
        }
        let url = share_url(&share_text(self.pair, &result.score));
        if let Err(e) = webbrowser::open(&url) {
            log::warn!("could not open browser: {}", e);
        }
    }
}

/// Remove trailing whitespace and then the word before it.
fn delete_word(input: &mut String) {
    while input.ends_with(|c: char| c.is_whitespace()) {
        input.pop();
    }
    while input.ends_with(|c: char| !c.is_whitespace()) {
        input.pop();
    }
}
