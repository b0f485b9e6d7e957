//! Session state and lifecycle transitions

use super::message::{Content, Message, Role, SuggestionSet};
use super::store::MessageStore;
use crate::dataset::Dataset;

use serde::Serialize;

/// Warning shown when a spreadsheet cannot be loaded
pub const LOAD_FAILED_WARNING: &str =
    "Could not load the spreadsheet. Check the link and sharing settings.";

/// Warning shown when a question arrives before any dataset is loaded
pub const NO_DATASET_WARNING: &str = "Load a spreadsheet before asking questions.";

/// Lifecycle phase, derived from the session flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No dataset
    Empty,
    /// A link was submitted and the load is in flight
    Loading,
    /// Dataset present, welcome sequence not yet run
    Loaded,
    /// Welcome sequence complete, accepting questions
    Ready,
}

/// Per-user conversational state
///
/// Owns the loaded dataset and the message log. Every successful or failed
/// load starts from a full reset, so nothing from a previous dataset survives
/// into the next one.
#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<Dataset>,
    dataset_loaded: bool,
    is_first_visit_after_load: bool,
    diagram_generated: bool,
    loading: bool,
    last_question: Option<String>,
    pending_selected_question: Option<String>,
    suggestions: Option<SuggestionSet>,
    messages: MessageStore,
    warning: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle phase
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetchat::session::{Session, SessionPhase};
    ///
    /// let mut session = Session::new();
    /// assert_eq!(session.phase(), SessionPhase::Empty);
    /// session.begin_load();
    /// assert_eq!(session.phase(), SessionPhase::Loading);
    /// ```
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if !self.dataset_loaded {
            SessionPhase::Empty
        } else if self.is_first_visit_after_load {
            SessionPhase::Loaded
        } else {
            SessionPhase::Ready
        }
    }

    /// Clear messages, dataset, flags, pending selections and warnings
    pub fn reset(&mut self) {
        self.dataset = None;
        self.dataset_loaded = false;
        self.is_first_visit_after_load = false;
        self.diagram_generated = false;
        self.loading = false;
        self.last_question = None;
        self.pending_selected_question = None;
        self.suggestions = None;
        self.messages.clear();
        self.warning = None;
    }

    /// A new link was submitted: reset and enter `Loading`
    pub fn begin_load(&mut self) {
        self.reset();
        self.loading = true;
    }

    /// The load finished with `dataset`: enter `Loaded`
    pub fn load_succeeded(&mut self, dataset: Dataset) {
        self.loading = false;
        self.dataset = Some(dataset);
        self.dataset_loaded = true;
        self.is_first_visit_after_load = true;
    }

    /// The load failed: back to `Empty` with the fixed warning
    pub fn load_failed(&mut self) {
        self.loading = false;
        self.dataset = None;
        self.dataset_loaded = false;
        self.is_first_visit_after_load = false;
        self.warning = Some(LOAD_FAILED_WARNING.to_string());
    }

    /// The welcome sequence finished: enter `Ready`
    pub fn welcome_complete(&mut self) {
        self.is_first_visit_after_load = false;
        self.diagram_generated = true;
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn dataset_loaded(&self) -> bool {
        self.dataset_loaded
    }

    pub fn is_first_visit_after_load(&self) -> bool {
        self.is_first_visit_after_load
    }

    pub fn diagram_generated(&self) -> bool {
        self.diagram_generated
    }

    pub fn last_question(&self) -> Option<&str> {
        self.last_question.as_deref()
    }

    pub(crate) fn set_last_question(&mut self, question: &str) {
        self.last_question = Some(question.to_string());
    }

    pub fn pending_selected_question(&self) -> Option<&str> {
        self.pending_selected_question.as_deref()
    }

    /// Take the pending selected question, leaving none behind
    pub fn take_pending_question(&mut self) -> Option<String> {
        self.pending_selected_question.take()
    }

    /// Suggested questions that can still be selected
    pub fn suggestions(&self) -> Option<&SuggestionSet> {
        self.suggestions.as_ref()
    }

    pub(crate) fn set_suggestions(&mut self, suggestions: SuggestionSet) {
        self.suggestions = Some(suggestions);
    }

    /// Select a pending suggestion by key
    ///
    /// Records the question as the pending selected question and clears the
    /// whole suggestion set. Returns the question, or `None` if no pending
    /// suggestion has that key.
    pub fn select_suggestion(&mut self, key: &str) -> Option<String> {
        let question = self.suggestions.as_ref()?.get(key)?.to_string();
        self.suggestions = None;
        self.pending_selected_question = Some(question.clone());
        Some(question)
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    /// Append a message to the conversation
    pub fn append(&mut self, role: Role, content: Content) -> &Message {
        self.messages.append(role, content)
    }

    /// Dataset and message log borrowed together
    pub(crate) fn dataset_and_messages(&mut self) -> (Option<&Dataset>, &mut MessageStore) {
        (self.dataset.as_ref(), &mut self.messages)
    }

    /// Transient warning for the user, if any
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub(crate) fn set_warning(&mut self, warning: &str) {
        self.warning = Some(warning.to_string());
    }

    pub fn clear_warning(&mut self) {
        self.warning = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Table;

    fn dataset() -> Dataset {
        Dataset::new(vec![Table::new("t", vec!["a".into()], vec![])])
    }

    fn ready_session() -> Session {
        let mut session = Session::new();
        session.begin_load();
        session.load_succeeded(dataset());
        session.welcome_complete();
        session.append(Role::User, Content::Text("q".into()));
        session.set_last_question("q");
        session.set_suggestions(SuggestionSet::from_questions(vec!["s".into()]));
        session
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.dataset().is_none());
        assert!(!session.dataset_loaded());
        assert!(!session.is_first_visit_after_load());
        assert!(!session.diagram_generated());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_successful_load_enters_loaded_then_ready() {
        let mut session = Session::new();
        session.begin_load();
        session.load_succeeded(dataset());
        assert_eq!(session.phase(), SessionPhase::Loaded);
        assert!(session.dataset_loaded());
        assert!(session.is_first_visit_after_load());

        session.welcome_complete();
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert!(session.diagram_generated());
        assert!(!session.is_first_visit_after_load());
    }

    #[test]
    fn test_begin_load_resets_everything() {
        let mut session = ready_session();
        session.set_warning("old");
        session.begin_load();

        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(session.messages().is_empty());
        assert!(session.dataset().is_none());
        assert!(!session.diagram_generated());
        assert!(session.last_question().is_none());
        assert!(session.suggestions().is_none());
        assert!(session.warning().is_none());
    }

    #[test]
    fn test_load_failure_returns_to_empty_with_warning() {
        let mut session = ready_session();
        session.begin_load();
        session.load_failed();

        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(!session.dataset_loaded());
        assert!(session.dataset().is_none());
        assert_eq!(session.warning(), Some(LOAD_FAILED_WARNING));
    }

    #[test]
    fn test_select_suggestion_clears_set() {
        let mut session = ready_session();
        let key = session.suggestions().unwrap().nth(0).unwrap().key.clone();

        assert_eq!(session.select_suggestion(&key).as_deref(), Some("s"));
        assert_eq!(session.pending_selected_question(), Some("s"));
        assert!(session.suggestions().is_none());

        // the set is gone, so the same key cannot be selected twice
        assert!(session.select_suggestion(&key).is_none());
        assert_eq!(session.take_pending_question().as_deref(), Some("s"));
        assert!(session.pending_selected_question().is_none());
    }

    #[test]
    fn test_select_unknown_key_keeps_set() {
        let mut session = ready_session();
        assert!(session.select_suggestion("nope").is_none());
        assert!(session.suggestions().is_some());
        assert!(session.pending_selected_question().is_none());
    }
}
