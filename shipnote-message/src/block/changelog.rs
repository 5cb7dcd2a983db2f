use crate::block::{FormatStrategy, MessageBlock};
use crate::error::MessageError;
use crate::message::Message;
use crate::project::ProjectContext;
use camino::Utf8PathBuf;
use regex::Regex;
use shipnote_changelog::{self as changelog, ChangelogError};
use shipnote_types::TextObject;

/// A section quoting the changelog entries of the published version.
///
/// The changelog file defaults to the nearest `CHANGELOG.md` found walking
/// from the project directory up through its parent projects. The section is
/// only rendered when the extracted text is non-empty; a version absent from
/// the file is not an error.
#[derive(Clone)]
pub struct ChangelogBlock {
    project: ProjectContext,
    version: Option<String>,
    file: Option<Utf8PathBuf>,
    matchers: Vec<Regex>,
    strategy: FormatStrategy,
}

impl ChangelogBlock {
    pub fn new(project: ProjectContext) -> Self {
        Self {
            project,
            version: None,
            file: None,
            matchers: Vec::new(),
            strategy: FormatStrategy::Default,
        }
    }

    /// Version whose entries are quoted. Defaults to the project version.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    /// Explicit changelog file. Relative paths are resolved against the
    /// project directory; setting this disables upward discovery.
    pub fn set_file(&mut self, file: impl Into<Utf8PathBuf>) {
        self.file = Some(file.into());
    }

    /// Marks lines starting with `prefix` as version headings.
    pub fn version_lines_start_with(&mut self, prefix: &str) {
        self.matchers.push(changelog::starts_with_matcher(prefix));
    }

    /// Marks lines wholly matched by `matcher` as version headings. The
    /// pattern is re-anchored to cover the whole line.
    pub fn version_lines_match(&mut self, matcher: Regex) {
        let anchored = changelog::whole_line_matcher(matcher.as_str())
            .expect("anchored form of a valid pattern is a valid pattern");
        self.matchers.push(anchored);
    }

    /// The changelog file that would be read.
    pub fn file(&self) -> Result<Utf8PathBuf, MessageError> {
        if let Some(file) = &self.file {
            return Ok(self.project.resolve(file));
        }
        let dirs = self.project.ancestors().map(|project| project.dir().to_owned());
        changelog::discover_file(dirs).ok_or_else(|| {
            ChangelogError::NotFound {
                expected: self.project.dir().join(changelog::DEFAULT_FILE_NAME),
            }
            .into()
        })
    }

    /// The extracted, dedented changelog section for the version.
    pub fn changelog(&self) -> Result<String, MessageError> {
        if self.matchers.is_empty() {
            return Err(ChangelogError::NoVersionLinePattern.into());
        }
        let file = self.file()?;
        let version = self
            .version
            .clone()
            .unwrap_or_else(|| self.project.version().to_owned());
        Ok(changelog::read_section(&file, &version, &self.matchers)?)
    }
}

impl MessageBlock for ChangelogBlock {
    fn strategy(&self) -> &FormatStrategy {
        &self.strategy
    }

    fn strategy_mut(&mut self) -> &mut FormatStrategy {
        &mut self.strategy
    }

    fn default_format(&self, message: &mut Message) -> Result<(), MessageError> {
        let log = self.changelog()?;
        if log.is_empty() {
            return Ok(());
        }
        let text = format!("*Changelog*\n{log}");
        message.section(true, move |section| {
            section.text = Some(TextObject::mrkdwn(text.clone()));
        });
        Ok(())
    }
}
