use crate::block::{FormatStrategy, MessageBlock};
use crate::error::MessageError;
use crate::message::Message;
use crate::project::ProjectContext;
use camino::Utf8PathBuf;
use shipnote_git::RevisionInspector;

/// A section with facts about the project's git repository: branch, author,
/// commit message and SHA-1 of the current head.
///
/// Every query opens the repository anew, so the rendered values reflect the
/// repository as it is at resolution time. The query methods are public for
/// replacement formats that want the raw values.
#[derive(Clone)]
pub struct GitBlock {
    project: ProjectContext,
    root: Option<Utf8PathBuf>,
    strategy: FormatStrategy,
}

impl GitBlock {
    pub fn new(project: ProjectContext) -> Self {
        Self {
            project,
            root: None,
            strategy: FormatStrategy::Default,
        }
    }

    /// Where to start looking for the repository. Relative paths are resolved
    /// against the project directory, which is also the default.
    pub fn set_root(&mut self, root: impl Into<Utf8PathBuf>) {
        self.root = Some(root.into());
    }

    fn resolved_root(&self) -> Utf8PathBuf {
        match &self.root {
            Some(root) => self.project.resolve(root),
            None => self.project.dir().to_owned(),
        }
    }

    fn inspector(&self) -> Result<RevisionInspector, MessageError> {
        Ok(RevisionInspector::open(&self.resolved_root())?)
    }

    pub fn current_branch_name(&self) -> Result<String, MessageError> {
        Ok(self.inspector()?.current_branch_name()?)
    }

    pub fn last_commit_sha1(&self) -> Result<Option<String>, MessageError> {
        Ok(self.inspector()?.last_commit()?.map(|commit| commit.sha1))
    }

    pub fn last_commit_author_email(&self) -> Result<Option<String>, MessageError> {
        Ok(self
            .inspector()?
            .last_commit()?
            .map(|commit| commit.author_email))
    }

    pub fn last_commit_short_message(&self) -> Result<Option<String>, MessageError> {
        Ok(self
            .inspector()?
            .last_commit()?
            .map(|commit| commit.short_message))
    }

    /// The most recent ref reachable from the head, or an abbreviated commit
    /// id when no ref points into the history.
    pub fn describe(&self) -> Result<String, MessageError> {
        Ok(self.inspector()?.describe_all_always()?)
    }
}

impl MessageBlock for GitBlock {
    fn strategy(&self) -> &FormatStrategy {
        &self.strategy
    }

    fn strategy_mut(&mut self) -> &mut FormatStrategy {
        &mut self.strategy
    }

    fn default_format(&self, message: &mut Message) -> Result<(), MessageError> {
        let branch = self.current_branch_name()?;
        let author = self.last_commit_author_email()?;
        let short_message = self.last_commit_short_message()?;
        let sha1 = self.last_commit_sha1()?;

        message.fields(move |fields| {
            fields.field("Git Branch", Some(branch.as_str()));
            let mailto = author.as_ref().map(|email| format!("<mailto:{email}|{email}>"));
            fields.field("Git Author", mailto.as_deref());
            fields.field("Git Commit", short_message.as_deref());
            let code = sha1.as_ref().map(|sha1| format!("`{sha1}`"));
            fields.field("Git SHA-1", code.as_deref());
        });
        Ok(())
    }
}
