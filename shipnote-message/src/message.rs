use crate::block::changelog::ChangelogBlock;
use crate::block::context::ContextBlock;
use crate::block::fields::FieldsBlock;
use crate::block::git::GitBlock;
use crate::block::publication::PublicationBlock;
use crate::block::MessageBlock;
use crate::error::MessageError;
use crate::project::ProjectContext;
use crate::registry::FragmentRegistry;
use shipnote_types::{LayoutBlock, Payload, SectionBlock};
use tracing::debug;

/// The document under construction plus its delivery side-channel.
///
/// The webhook field is not part of the wire payload; it records which
/// endpoint the finished message should be posted to. Blocks may override it
/// while they format themselves (the last grafted value wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub payload: Payload,
    pub webhook: Option<String>,
}

/// A named notification message: the facade over [`FragmentRegistry`].
///
/// Every registration method defers its work. `resolve` starts from an empty
/// payload and replays all registered fragments in order, so the same message
/// can be resolved repeatedly and always reflects external state at
/// resolution time.
pub struct Message {
    name: String,
    project: ProjectContext,
    webhook: Option<String>,
    registry: FragmentRegistry,
}

impl Message {
    pub fn new(name: impl Into<String>, project: ProjectContext) -> Self {
        Self {
            name: name.into(),
            project,
            webhook: None,
            registry: FragmentRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    /// Endpoint the finished message should be delivered to.
    pub fn set_webhook(&mut self, url: impl Into<String>) {
        self.webhook = Some(url.into());
    }

    pub fn webhook(&self) -> Option<&str> {
        self.webhook.as_deref()
    }

    /// Registers a raw fragment operating directly on the draft.
    pub fn payload(
        &mut self,
        fragment: impl Fn(&mut Draft) -> Result<(), MessageError> + 'static,
    ) {
        self.registry.register(fragment);
    }

    /// Appends a block to the draft, lazily.
    ///
    /// The supplier runs at resolution time. If the draft holds no blocks yet
    /// the item is appended as-is; otherwise a divider is inserted first when
    /// `insert_divider` is true. Whether this is "the first block" is decided
    /// by the draft's actual state when the fragment runs, not by how many
    /// appends were registered: an earlier registration that contributed
    /// nothing does not count.
    pub fn block(
        &mut self,
        insert_divider: bool,
        supply: impl Fn() -> Result<LayoutBlock, MessageError> + 'static,
    ) {
        self.payload(move |draft| {
            match &mut draft.payload.blocks {
                None => {
                    let item = supply()?;
                    draft.payload.blocks = Some(vec![item]);
                }
                Some(blocks) => {
                    if insert_divider && !blocks.is_empty() {
                        blocks.push(LayoutBlock::divider());
                    }
                    let item = supply()?;
                    blocks.push(item);
                }
            }
            Ok(())
        });
    }

    /// Appends a section block, configured at resolution time.
    pub fn section(
        &mut self,
        insert_divider: bool,
        configure: impl Fn(&mut SectionBlock) + 'static,
    ) {
        self.block(insert_divider, move || {
            let mut section = SectionBlock::default();
            configure(&mut section);
            Ok(LayoutBlock::Section(section))
        });
    }

    /// Attaches a block to this message.
    ///
    /// With `lazy_configure = false` the configuration runs right now, so the
    /// values it reads are captured at call time. With `true` it is deferred
    /// to resolution time along with everything else. Formatting is always
    /// lazy: at resolution the block formats itself into a throwaway
    /// sub-message whose fragments are then replayed onto the outer draft.
    /// This lets blocks use the same ordering and divider machinery as
    /// top-level content.
    pub fn attach<B>(&mut self, block: B, lazy_configure: bool, configure: impl Fn(&mut B) + 'static)
    where
        B: MessageBlock + Clone + 'static,
    {
        let mut block = block;
        if !lazy_configure {
            configure(&mut block);
        }

        let name = self.name.clone();
        let project = self.project.clone();
        self.payload(move |draft| {
            let mut block = block.clone();
            if lazy_configure {
                configure(&mut block);
            }

            let mut sub = Message::new(name.clone(), project.clone());
            block.format(&mut sub)?;
            sub.graft_onto(draft)
        });
    }

    /// Adds a section with titled fields. Configuration is deferred to
    /// resolution time, so property ordering does not matter.
    pub fn fields(&mut self, configure: impl Fn(&mut FieldsBlock) + 'static) {
        self.attach(FieldsBlock::new(), true, configure);
    }

    /// Adds a context block (small print under the message). Configuration is
    /// deferred to resolution time.
    pub fn context(&mut self, configure: impl Fn(&mut ContextBlock) + 'static) {
        self.attach(ContextBlock::new(), true, configure);
    }

    /// Adds a section with git facts about the project's repository.
    pub fn git(&mut self, configure: impl Fn(&mut GitBlock) + 'static) {
        let block = GitBlock::new(self.project.clone());
        self.attach(block, false, configure);
    }

    /// Adds the publication announcement section.
    pub fn publication(&mut self, configure: impl Fn(&mut PublicationBlock) + 'static) {
        let block = PublicationBlock::new(self.project.clone());
        self.attach(block, false, configure);
    }

    /// Adds a section with the changelog of the published version.
    pub fn changelog(&mut self, configure: impl Fn(&mut ChangelogBlock) + 'static) {
        let block = ChangelogBlock::new(self.project.clone());
        self.attach(block, false, configure);
    }

    /// Folds every registered fragment into a fresh draft.
    ///
    /// The first failing fragment aborts resolution and its error is
    /// returned unmodified.
    pub fn resolve(&self) -> Result<Draft, MessageError> {
        debug!("resolving message '{}'", self.name);
        self.registry.resolve(Draft {
            payload: Payload::default(),
            webhook: self.webhook.clone(),
        })
    }

    /// Replays this message's fragments onto an outer draft and propagates
    /// the webhook, if one was set here.
    fn graft_onto(&self, draft: &mut Draft) -> Result<(), MessageError> {
        if let Some(url) = &self.webhook {
            draft.webhook = Some(url.clone());
        }
        self.registry.resolve_into(draft)
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("name", &self.name)
            .field("fragments", &self.registry.len())
            .finish()
    }
}
