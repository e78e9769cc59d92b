use bytes::Bytes;

use crate::Effect;

pub type PreviewId = u64;

/// Which payload the preview currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSource {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewBinding {
    pub id: PreviewId,
    pub source: PreviewSource,
}

/// Ownership record for the single live preview reference.
///
/// Every transition goes through `rebind` or `release`, which hand back the
/// effects the platform must run; at most one binding is live at any time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewSlot {
    live: Option<PreviewBinding>,
    last_issued: PreviewId,
}

impl PreviewSlot {
    pub fn live(&self) -> Option<PreviewBinding> {
        self.live
    }

    /// Releases the current binding (if any) and binds a fresh one to `payload`.
    pub(crate) fn rebind(
        &mut self,
        source: PreviewSource,
        payload: Bytes,
        media_type: Option<String>,
    ) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        effects.extend(self.release());
        self.last_issued += 1;
        let binding = PreviewBinding {
            id: self.last_issued,
            source,
        };
        self.live = Some(binding);
        effects.push(Effect::BindPreview {
            preview: binding.id,
            source,
            payload,
            media_type,
        });
        effects
    }

    pub(crate) fn release(&mut self) -> Option<Effect> {
        self.live
            .take()
            .map(|binding| Effect::ReleasePreview {
                preview: binding.id,
            })
    }
}
