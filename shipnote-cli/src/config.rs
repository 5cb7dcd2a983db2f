//! Message definition loading for shipnote.
//!
//! Discovers and loads `shipnote.toml` from the project directory and turns
//! it into a composed [`Message`]. Every block the library offers can be
//! declared in the file; registration order in the file is rendering order.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use regex::Regex;
use serde::Deserialize;
use shipnote_message::{Message, ProjectContext};
use shipnote_types::TextObject;
use tracing::debug;

/// The definition file name to search for.
pub const CONFIG_FILE_NAME: &str = "shipnote.toml";

/// Top-level definition from shipnote.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShipnoteConfig {
    /// Endpoint the finished payload should be posted to.
    pub webhook: Option<String>,

    /// Project coordinates used by block defaults.
    pub project: ProjectConfig,

    /// Blocks composing the message, in rendering order.
    pub blocks: Vec<BlockConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub group: String,
    pub version: String,
}

/// One block declaration, discriminated by its `type` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockConfig {
    /// A plain markdown section.
    Section {
        text: String,
        #[serde(default = "default_true")]
        divider: bool,
    },
    /// Titled facts, two per row.
    Fields {
        #[serde(default)]
        fields: Vec<FieldConfig>,
        #[serde(default = "default_true")]
        divider: bool,
    },
    /// Small print under the message.
    Context {
        #[serde(default)]
        markdown: Vec<String>,
        #[serde(default)]
        images: Vec<ImageConfig>,
        #[serde(default = "default_true")]
        divider: bool,
    },
    /// Branch, author, commit and SHA-1 of the project repository.
    Git { root: Option<Utf8PathBuf> },
    /// The publication announcement.
    Publication {
        public_name: Option<String>,
        date: Option<String>,
        group_id: Option<String>,
        artifact_id: Option<String>,
        version: Option<String>,
        classifier: Option<String>,
        repository_name: Option<String>,
    },
    /// The changelog entries of the published version.
    Changelog {
        version: Option<String>,
        file: Option<Utf8PathBuf>,
        #[serde(default)]
        version_lines_start_with: Vec<String>,
        #[serde(default)]
        version_lines_match: Vec<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub title: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub url: String,
    pub alt_text: Option<String>,
}

fn default_true() -> bool {
    true
}

pub fn load(path: &Utf8Path) -> anyhow::Result<ShipnoteConfig> {
    debug!("loading message definition from {path}");
    let text = fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    let config = toml::from_str(&text).with_context(|| format!("parse {path}"))?;
    Ok(config)
}

/// Turns a loaded definition into a composed message for the given project.
///
/// Patterns in `version_lines_match` are compiled here so a bad pattern
/// fails at load time, not in the middle of resolution.
pub fn build_message(config: &ShipnoteConfig, project: ProjectContext) -> anyhow::Result<Message> {
    let name = project.name().to_owned();
    let mut message = Message::new(name, project);
    if let Some(url) = &config.webhook {
        message.set_webhook(url.clone());
    }

    for block in config.blocks.iter().cloned() {
        match block {
            BlockConfig::Section { text, divider } => {
                message.section(divider, move |section| {
                    section.text = Some(TextObject::mrkdwn(text.clone()));
                });
            }
            BlockConfig::Fields { fields, divider } => {
                message.fields(move |block| {
                    block.insert_divider(divider);
                    for field in &fields {
                        block.field(&field.title, field.body.as_deref());
                    }
                });
            }
            BlockConfig::Context {
                markdown,
                images,
                divider,
            } => {
                message.context(move |block| {
                    block.insert_divider(divider);
                    for text in &markdown {
                        block.markdown(text.clone());
                    }
                    for image in &images {
                        block.image(image.url.clone(), image.alt_text.as_deref());
                    }
                });
            }
            BlockConfig::Git { root } => {
                message.git(move |git| {
                    if let Some(root) = &root {
                        git.set_root(root.clone());
                    }
                });
            }
            BlockConfig::Publication {
                public_name,
                date,
                group_id,
                artifact_id,
                version,
                classifier,
                repository_name,
            } => {
                message.publication(move |publication| {
                    if let Some(value) = &public_name {
                        publication.set_public_name(value.clone());
                    }
                    if let Some(value) = &date {
                        publication.set_date(value.clone());
                    }
                    if let Some(value) = &group_id {
                        publication.set_group_id(value.clone());
                    }
                    if let Some(value) = &artifact_id {
                        publication.set_artifact_id(value.clone());
                    }
                    if let Some(value) = &version {
                        publication.set_version(value.clone());
                    }
                    if let Some(value) = &classifier {
                        publication.set_classifier(value.clone());
                    }
                    if let Some(value) = &repository_name {
                        publication.set_repository_name(value.clone());
                    }
                });
            }
            BlockConfig::Changelog {
                version,
                file,
                version_lines_start_with,
                version_lines_match,
            } => {
                let matchers = version_lines_match
                    .iter()
                    .map(|pattern| {
                        Regex::new(pattern)
                            .with_context(|| format!("invalid version line pattern {pattern:?}"))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                message.changelog(move |changelog| {
                    if let Some(value) = &version {
                        changelog.set_version(value.clone());
                    }
                    if let Some(value) = &file {
                        changelog.set_file(value.clone());
                    }
                    for prefix in &version_lines_start_with {
                        changelog.version_lines_start_with(prefix);
                    }
                    for matcher in &matchers {
                        changelog.version_lines_match(matcher.clone());
                    }
                });
            }
        }
    }

    Ok(message)
}
