//! Study tip rotation.
//!
//! Tips rotate uniformly at random and never repeat the tip currently on
//! screen when there is another one to show. Rotation happens on demand and
//! on a timer (see [`spawn_auto_rotation`]).

use rand::seq::IndexedRandom;
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::backend::Backend;
use crate::domain::{Tip, TipDraft, TipId, TipPatch};
use crate::error::{LoadError, StoreError};
use crate::rotation::{spawn_repeating, RotationHandle};

/// Default period between automatic rotations
pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_secs(300);

/// Uniform draw; None for an empty slice
pub fn get_random_tip<'a, R: Rng + ?Sized>(tips: &'a [Tip], rng: &mut R) -> Option<&'a Tip> {
    tips.choose(rng)
}

/// Uniform draw excluding `current` whenever another tip exists
pub fn get_next_tip<'a, R: Rng + ?Sized>(
    tips: &'a [Tip],
    current: Option<TipId>,
    rng: &mut R,
) -> Option<&'a Tip> {
    if tips.len() <= 1 {
        return tips.first();
    }
    let Some(current) = current else {
        return get_random_tip(tips, rng);
    };
    let others: Vec<&Tip> = tips.iter().filter(|t| t.id != current).collect();
    others.choose(rng).copied()
}

#[derive(Debug, Clone, Default)]
pub struct TipRotator {
    tips: Vec<Tip>,
    current: Option<TipId>,
}

impl TipRotator {
    pub fn new(tips: Vec<Tip>) -> Self {
        Self { tips, current: None }
    }

    pub fn load(backend: &dyn Backend) -> Result<Self, LoadError> {
        let tips = backend.list_tips().map_err(LoadError::Tips)?;
        tracing::info!("Loaded {} tips", tips.len());
        Ok(Self::new(tips))
    }

    /// Pick the first tip to show
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Tip> {
        self.current = get_random_tip(&self.tips, rng).map(|t| t.id);
        self.current()
    }

    /// Replace the current tip with a different one
    pub fn rotate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Tip> {
        self.current = get_next_tip(&self.tips, self.current, rng).map(|t| t.id);
        tracing::debug!("Rotated tip to {:?}", self.current);
        self.current()
    }

    pub fn current(&self) -> Option<&Tip> {
        self.current.and_then(|id| self.tips.iter().find(|t| t.id == id))
    }

    pub fn tips(&self) -> &[Tip] {
        &self.tips
    }

    /// Create a tip; it becomes current if nothing was showing
    pub fn create_tip(&mut self, backend: &dyn Backend, draft: TipDraft) -> Result<Tip, StoreError> {
        let draft = draft.validated()?;
        let tip = backend.insert_tip(&draft)?;
        self.tips.push(tip.clone());
        if self.current.is_none() {
            self.current = Some(tip.id);
        }
        Ok(tip)
    }

    pub fn update_tip(
        &mut self,
        backend: &dyn Backend,
        id: TipId,
        patch: TipPatch,
    ) -> Result<Tip, StoreError> {
        let index = self
            .tips
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let patch = patch.normalized();

        let mut updated = self.tips[index].clone();
        updated.apply(&patch);
        updated.validate()?;

        backend.update_tip(id, &patch)?;
        self.tips[index] = updated.clone();
        Ok(updated)
    }

    /// Delete a tip; if it was showing, a random remaining tip replaces it
    pub fn delete_tip<R: Rng + ?Sized>(
        &mut self,
        backend: &dyn Backend,
        id: TipId,
        rng: &mut R,
    ) -> Result<(), StoreError> {
        let index = self
            .tips
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        backend.delete_tip(id)?;
        self.tips.remove(index);

        if self.current == Some(id) {
            self.current = get_random_tip(&self.tips, rng).map(|t| t.id);
        }
        Ok(())
    }
}

/// Rotate `rotator` every `period` until the handle is cancelled or dropped
pub fn spawn_auto_rotation(rotator: Arc<Mutex<TipRotator>>, period: Duration) -> RotationHandle {
    spawn_repeating(period, move || match rotator.lock() {
        Ok(mut rotator) => {
            rotator.rotate(&mut rand::rng());
        }
        Err(_) => tracing::error!("Tip rotator lock poisoned, skipping rotation"),
    })
}
