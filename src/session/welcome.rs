//! Welcome sequence
//!
//! Runs once after each successful load and introduces the dataset: its size,
//! a relationship diagram, optional field descriptions and optional suggested
//! questions. Service failures only drop the affected message.

use super::message::{Content, Role};
use super::state::{Session, SessionPhase};
use crate::config::WelcomeConfig;
use crate::services::AssistantServices;

/// Announcement preceding the diagram
pub const DIAGRAM_INTENT: &str =
    "Let me draw an entity-relationship diagram to show how these tables relate.";

/// Generates the introductory assistant turns
pub struct WelcomeSequence<'a> {
    services: &'a AssistantServices,
    options: &'a WelcomeConfig,
}

impl<'a> WelcomeSequence<'a> {
    pub fn new(services: &'a AssistantServices, options: &'a WelcomeConfig) -> Self {
        Self { services, options }
    }

    /// Append the welcome messages and mark the session ready
    ///
    /// Does nothing unless the session is in [`SessionPhase::Loaded`].
    /// Returns whether the sequence ran.
    pub async fn run(&self, session: &mut Session) -> bool {
        if session.phase() != SessionPhase::Loaded {
            return false;
        }
        let Some(dataset) = session.dataset().cloned() else {
            return false;
        };

        tracing::info!("Running welcome sequence for {} tables", dataset.len());

        // Nothing touches the session until every await has finished, so a
        // cancelled run leaves it in `Loaded` with no partial welcome.
        let mut turns = vec![
            Content::Text(size_announcement(dataset.len())),
            Content::Text(DIAGRAM_INTENT.to_string()),
        ];

        let summaries = dataset.summaries(self.options.sample_rows);

        match self.services.create_diagram(&summaries).await {
            Ok(image) => turns.push(Content::Image(image)),
            Err(e) => tracing::warn!("Skipping diagram: {:#}", e),
        }

        let mut descriptions = String::new();
        if self.options.describe_fields {
            match self.services.describe_fields(&dataset, &summaries).await {
                Ok(fields) => {
                    descriptions = fields.to_markdown();
                    turns.push(Content::Markdown(format!(
                        "Here is what each field means:\n\n{}",
                        descriptions
                    )));
                }
                Err(e) => tracing::warn!("Skipping field descriptions: {:#}", e),
            }
        }

        let mut suggested = None;
        if self.options.suggest_questions {
            match self
                .services
                .suggest_questions(&summaries, &descriptions, self.options.suggestion_count)
                .await
            {
                Ok(suggestions) => {
                    turns.push(Content::Questions(suggestions.clone()));
                    suggested = Some(suggestions);
                }
                Err(e) => tracing::warn!("Skipping suggested questions: {:#}", e),
            }
        }

        for content in turns {
            session.append(Role::Assistant, content);
        }
        if let Some(suggestions) = suggested {
            session.set_suggestions(suggestions);
        }
        session.welcome_complete();
        true
    }
}

/// Message announcing how many tables were loaded
///
/// # Examples
///
/// ```
/// use sheetchat::session::size_announcement;
///
/// assert_eq!(size_announcement(2), "The dataset contains 2 tables.");
/// assert_eq!(size_announcement(1), "The dataset contains 1 table.");
/// ```
pub fn size_announcement(table_count: usize) -> String {
    let noun = if table_count == 1 { "table" } else { "tables" };
    format!("The dataset contains {} {}.", table_count, noun)
}
