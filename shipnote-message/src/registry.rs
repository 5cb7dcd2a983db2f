use crate::error::MessageError;
use crate::message::Draft;

/// A deferred mutation of the draft.
pub type Fragment = Box<dyn Fn(&mut Draft) -> Result<(), MessageError>>;

/// An ordered sequence of deferred draft mutations.
///
/// Registration order is significant and preserved; there is no reordering
/// and no deduplication. Resolution replays every fragment from scratch each
/// time, so fragments observe external state as it is *now*, not as it was
/// when they were registered. No memoization, by contract.
#[derive(Default)]
pub struct FragmentRegistry {
    fragments: Vec<Fragment>,
}

impl FragmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one fragment. Never fails.
    pub fn register(&mut self, fragment: impl Fn(&mut Draft) -> Result<(), MessageError> + 'static) {
        self.fragments.push(Box::new(fragment));
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Folds every fragment over `initial`, in registration order.
    ///
    /// The first failure aborts the fold and is returned unmodified; later
    /// fragments do not run and no partial draft is handed back.
    pub fn resolve(&self, initial: Draft) -> Result<Draft, MessageError> {
        let mut draft = initial;
        self.resolve_into(&mut draft)?;
        Ok(draft)
    }

    /// Replays every fragment against an existing draft. Used both by
    /// [`Self::resolve`] and when a sub-message is grafted onto an outer one.
    pub(crate) fn resolve_into(&self, draft: &mut Draft) -> Result<(), MessageError> {
        for fragment in &self.fragments {
            fragment(draft)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for FragmentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentRegistry")
            .field("fragments", &self.fragments.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipnote_types::LayoutBlock;

    fn push_divider(draft: &mut Draft) -> Result<(), MessageError> {
        draft
            .payload
            .blocks
            .get_or_insert_with(Vec::new)
            .push(LayoutBlock::divider());
        Ok(())
    }

    #[test]
    fn fragments_run_in_registration_order() {
        let mut registry = FragmentRegistry::new();
        registry.register(|draft| {
            draft.payload.text = Some("first".to_string());
            Ok(())
        });
        registry.register(|draft| {
            let text = draft.payload.text.get_or_insert_with(String::new);
            text.push_str(" second");
            Ok(())
        });

        let draft = registry.resolve(Draft::default()).unwrap();
        assert_eq!(draft.payload.text.as_deref(), Some("first second"));
    }

    #[test]
    fn resolve_replays_from_scratch_each_time() {
        let mut registry = FragmentRegistry::new();
        registry.register(push_divider);

        let once = registry.resolve(Draft::default()).unwrap();
        let twice = registry.resolve(Draft::default()).unwrap();
        assert_eq!(once.payload.block_count(), 1);
        assert_eq!(twice.payload.block_count(), 1);
    }

    #[test]
    fn first_failure_aborts_and_surfaces_unmodified() {
        #[derive(Debug, thiserror::Error)]
        #[error("boom")]
        struct Boom;

        let mut registry = FragmentRegistry::new();
        registry.register(|_| Err(anyhow::Error::new(Boom).into()));
        registry.register(|draft| {
            draft.payload.text = Some("must not run".to_string());
            Ok(())
        });

        let err = registry.resolve(Draft::default()).unwrap_err();
        match err {
            MessageError::Other(e) => assert!(e.downcast_ref::<Boom>().is_some()),
            other => panic!("expected the original error, got {other:?}"),
        }
    }
}
