//! Bounded font resolution for one export

use crate::constants::DEFAULT_FONT_FAMILY;
use crate::fields::EffectiveField;
use crate::fonts::{FontKey, FontProvider, ResolvedFace};
use crate::types::ComposeError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Faces for every key the export needs, resolved once up front
#[derive(Debug, Clone, Default)]
pub(crate) struct FaceTable {
    faces: HashMap<FontKey, Option<ResolvedFace>>,
}

impl FaceTable {
    /// Wait for every distinct key in parallel, each for at most `wait`.
    ///
    /// A key that is not ready in time falls back to the provider's default
    /// face with bold and italic synthesized.
    pub(crate) async fn resolve<'a, P: FontProvider>(
        provider: &Arc<P>,
        fields: impl IntoIterator<Item = &'a EffectiveField>,
        wait: Duration,
    ) -> Self {
        let keys: HashSet<FontKey> = fields
            .into_iter()
            .filter(|field| field.is_visible())
            .map(FontKey::for_field)
            .collect();

        let mut set = JoinSet::new();
        for key in keys {
            let provider = provider.clone();
            set.spawn(async move {
                let ready = tokio::time::timeout(wait, provider.ready(&key)).await;
                (key, ready.ok().flatten())
            });
        }

        let mut faces = HashMap::new();
        while let Some(joined) = set.join_next().await {
            let Ok((key, ready)) = joined else {
                log::error!("Font resolution task failed");
                continue;
            };
            let face = match ready {
                Some(face) => Some(face),
                None => {
                    let err = ComposeError::FontUnavailable {
                        family: key.family.clone(),
                    };
                    log::warn!("{}", err);
                    fallback(provider.as_ref(), &key)
                }
            };
            faces.insert(key, face);
        }

        Self { faces }
    }

    /// Face for a field; the default face if its key was never resolved
    pub(crate) fn face_for<P: FontProvider>(
        &self,
        provider: &P,
        field: &EffectiveField,
    ) -> Option<ResolvedFace> {
        let key = FontKey::for_field(field);
        match self.faces.get(&key) {
            Some(face) => face.clone(),
            None => fallback(provider, &key),
        }
    }
}

fn fallback<P: FontProvider>(provider: &P, key: &FontKey) -> Option<ResolvedFace> {
    provider
        .default_face()
        .map(|font| ResolvedFace::substitute(font, key, &FontKey::regular(DEFAULT_FONT_FAMILY)))
}
