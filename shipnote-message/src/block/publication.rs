use crate::block::{FormatStrategy, MessageBlock};
use crate::error::MessageError;
use crate::message::Message;
use crate::project::ProjectContext;
use chrono::Utc;
use shipnote_types::TextObject;

/// The announcement section for a published artifact.
///
/// Every property falls back to the project context when unset, and the
/// fallbacks are read at format time: the announced version is whatever the
/// project says when the message resolves.
#[derive(Clone)]
pub struct PublicationBlock {
    project: ProjectContext,
    public_name: Option<String>,
    date: Option<String>,
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    classifier: Option<String>,
    repository_name: Option<String>,
    strategy: FormatStrategy,
}

impl PublicationBlock {
    pub fn new(project: ProjectContext) -> Self {
        Self {
            project,
            public_name: None,
            date: None,
            group_id: None,
            artifact_id: None,
            version: None,
            classifier: None,
            repository_name: None,
            strategy: FormatStrategy::Default,
        }
    }

    /// Human-readable name of the artifact. Defaults to the project name.
    pub fn set_public_name(&mut self, name: impl Into<String>) {
        self.public_name = Some(name.into());
    }

    /// Publication date as shown in the message. Defaults to now, in the
    /// HTTP date format.
    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = Some(date.into());
    }

    pub fn set_group_id(&mut self, group_id: impl Into<String>) {
        self.group_id = Some(group_id.into());
    }

    /// Defaults to the lower-cased project name.
    pub fn set_artifact_id(&mut self, artifact_id: impl Into<String>) {
        self.artifact_id = Some(artifact_id.into());
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    pub fn set_classifier(&mut self, classifier: impl Into<String>) {
        self.classifier = Some(classifier.into());
    }

    /// Name of the repository the artifact was published to. Only rendered
    /// when set.
    pub fn set_repository_name(&mut self, repository_name: impl Into<String>) {
        self.repository_name = Some(repository_name.into());
    }
}

impl MessageBlock for PublicationBlock {
    fn strategy(&self) -> &FormatStrategy {
        &self.strategy
    }

    fn strategy_mut(&mut self) -> &mut FormatStrategy {
        &mut self.strategy
    }

    fn default_format(&self, message: &mut Message) -> Result<(), MessageError> {
        let public_name = self
            .public_name
            .clone()
            .unwrap_or_else(|| self.project.name().to_owned());
        let version = self
            .version
            .clone()
            .unwrap_or_else(|| self.project.version().to_owned());
        let group_id = self
            .group_id
            .clone()
            .unwrap_or_else(|| self.project.group().to_owned());
        let artifact_id = self
            .artifact_id
            .clone()
            .unwrap_or_else(|| self.project.name().to_lowercase());
        let date = self
            .date
            .clone()
            .unwrap_or_else(|| Utc::now().format("%a, %-d %b %Y %H:%M:%S GMT").to_string());
        let repository = self
            .repository_name
            .as_ref()
            .map(|name| format!(" on *{name}*"))
            .unwrap_or_default();
        let classifier = self
            .classifier
            .as_ref()
            .map(|classifier| format!(":{classifier}"))
            .unwrap_or_default();

        let text = format!(
            ":tada:  Congrats\n\
             :rocket:  *{public_name} ({version})* successfully published{repository}\n\
             :date:  {date}\n\
             :package:  `{group_id}:{artifact_id}:{version}{classifier}`\n\
             :+1:  Tell your friends!"
        );
        message.section(true, move |section| {
            section.text = Some(TextObject::mrkdwn(text.clone()));
        });
        Ok(())
    }
}
