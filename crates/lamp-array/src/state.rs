//! Desired color and dirty flag for every lamp.

use crate::error::{LampArrayError, Result};
use hid_lamp_array_protocol::LampColor;

/// Color last written for a lamp and whether the device has seen it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LampState {
    pub color: LampColor,
    pub dirty: bool,
}

/// Flat per-lamp table indexed by lamp id, sized when the device is opened.
///
/// Not synchronized; the owning session is the only writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LampStateTable {
    lamps: Vec<LampState>,
}

impl LampStateTable {
    /// `lamp_count` clean lamps, all off.
    pub fn new(lamp_count: u16) -> Self {
        Self {
            lamps: vec![LampState::default(); usize::from(lamp_count)],
        }
    }

    pub fn lamp_count(&self) -> u16 {
        // Constructed from a u16 count, so this never saturates.
        u16::try_from(self.lamps.len()).unwrap_or(u16::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.lamps.is_empty()
    }

    fn out_of_range(&self, id: u32) -> LampArrayError {
        LampArrayError::IndexOutOfRange {
            id,
            lamp_count: self.lamp_count(),
        }
    }

    fn entry(&self, id: u16) -> Result<&LampState> {
        self.lamps
            .get(usize::from(id))
            .ok_or_else(|| self.out_of_range(u32::from(id)))
    }

    fn entry_mut(&mut self, id: u16) -> Result<&mut LampState> {
        let lamp_count = self.lamp_count();
        self.lamps
            .get_mut(usize::from(id))
            .ok_or(LampArrayError::IndexOutOfRange {
                id: u32::from(id),
                lamp_count,
            })
    }

    /// Store `color` for `id` and mark it dirty.
    pub fn set(&mut self, id: u16, color: LampColor) -> Result<()> {
        *self.entry_mut(id)? = LampState { color, dirty: true };
        Ok(())
    }

    /// Color last written for `id`, transmitted or not.
    pub fn get(&self, id: u16) -> Result<LampColor> {
        self.entry(id).map(|lamp| lamp.color)
    }

    pub fn is_dirty(&self, id: u16) -> Result<bool> {
        self.entry(id).map(|lamp| lamp.dirty)
    }

    /// Ids `[start, start + count)` as slice bounds, if they all exist.
    fn span(&self, start: u16, count: u16) -> Result<std::ops::Range<usize>> {
        let begin = usize::from(start);
        let end = begin.saturating_add(usize::from(count));
        if end > self.lamps.len() || (count == 0 && begin > self.lamps.len()) {
            let last = u32::from(start)
                .saturating_add(u32::from(count))
                .saturating_sub(1)
                .max(u32::from(start));
            return Err(self.out_of_range(last));
        }
        Ok(begin..end)
    }

    /// Check that every id in `[start, start + count)` exists.
    pub fn check_span(&self, start: u16, count: u16) -> Result<()> {
        self.span(start, count).map(|_| ())
    }

    /// [`set`](Self::set) for every id in `[start, start + count)`.
    ///
    /// The whole range is checked before any lamp changes.
    pub fn fill_range(&mut self, start: u16, count: u16, color: LampColor) -> Result<()> {
        let span = self.span(start, count)?;
        for lamp in self.lamps.get_mut(span).into_iter().flatten() {
            *lamp = LampState { color, dirty: true };
        }
        Ok(())
    }

    /// Record that `color` was transmitted for `[start, end]`: store it and clear dirty.
    pub fn commit_range(&mut self, start: u16, end: u16, color: LampColor) -> Result<()> {
        let count = end.saturating_sub(start).saturating_add(1);
        let span = self.span(start, count)?;
        for lamp in self.lamps.get_mut(span).into_iter().flatten() {
            *lamp = LampState {
                color,
                dirty: false,
            };
        }
        Ok(())
    }

    pub fn mark_clean(&mut self, id: u16) -> Result<()> {
        self.entry_mut(id)?.dirty = false;
        Ok(())
    }

    /// Ascending `(id, color)` pairs of every dirty lamp.
    pub fn dirty_lamps(&self) -> Vec<(u16, LampColor)> {
        (0..=u16::MAX)
            .zip(&self.lamps)
            .filter(|(_, lamp)| lamp.dirty)
            .map(|(id, lamp)| (id, lamp.color))
            .collect()
    }

    pub fn dirty_count(&self) -> usize {
        self.lamps.iter().filter(|lamp| lamp.dirty).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LampState> {
        self.lamps.iter()
    }
}
