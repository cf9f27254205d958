//! Turns pending lamp colors into LampArray update transactions.
//!
//! Two paths reach the device:
//!
//! - **Range update**: one [`LampRangeUpdate`] for a contiguous run of lamps
//!   sharing a color, sent straight away with a caller-chosen completion flag.
//! - **Flush**: every dirty lamp, ascending by id, packed into
//!   [`LampMultiUpdate`] chunks of [`MAX_LAMPS_PER_MULTI_UPDATE`]. Only the
//!   last chunk carries `UPDATE_COMPLETE`, so the device latches the whole
//!   frame at once instead of showing a partial update.
//!
//! The show-pending flag remembers that transactions without the completion
//! flag (or deferred changes) are outstanding. A flush with nothing dirty
//! still sends an empty completing multi-update while it is raised.
//!
//! A transport failure mid-flush stops at the failing chunk. Chunks already
//! sent stay clean; the failing chunk and everything after it stay dirty,
//! so the next flush resumes without resending confirmed lamps.

use crate::error::{LampArrayError, Result};
use crate::state::LampStateTable;
use crate::transport::{FeatureReportDevice, send_report};
use hid_lamp_array_protocol::{
    LampColor, LampMultiUpdate, LampRangeUpdate, MAX_LAMPS_PER_MULTI_UPDATE, ProtocolResult,
};
use tracing::{debug, warn};

/// Plan the multi-update transactions for a flush.
///
/// `dirty` must be in ascending id order. Returns no transactions when there
/// is nothing to send, a single empty completing update when only the
/// show-pending flag is raised, and otherwise one update per chunk of at
/// most eight lamps with the completion flag on the last one.
pub fn plan_flush(
    dirty: &[(u16, LampColor)],
    show_pending: bool,
) -> ProtocolResult<Vec<LampMultiUpdate>> {
    if dirty.is_empty() {
        return Ok(if show_pending {
            vec![LampMultiUpdate::complete_only()]
        } else {
            Vec::new()
        });
    }

    let chunk_count = dirty.len().div_ceil(MAX_LAMPS_PER_MULTI_UPDATE);
    dirty
        .chunks(MAX_LAMPS_PER_MULTI_UPDATE)
        .enumerate()
        .map(|(index, chunk)| LampMultiUpdate::new(chunk, index.saturating_add(1) == chunk_count))
        .collect()
}

/// Lamp state plus the show-pending flag, and the logic that transmits them.
#[derive(Debug, Clone, Default)]
pub struct UpdateDispatcher {
    table: LampStateTable,
    show_pending: bool,
}

impl UpdateDispatcher {
    pub fn new(lamp_count: u16) -> Self {
        Self {
            table: LampStateTable::new(lamp_count),
            show_pending: false,
        }
    }

    pub fn table(&self) -> &LampStateTable {
        &self.table
    }

    pub fn lamp_count(&self) -> u16 {
        self.table.lamp_count()
    }

    pub fn show_pending(&self) -> bool {
        self.show_pending
    }

    /// Deferred single-lamp change.
    pub fn set(&mut self, id: u16, color: LampColor) -> Result<()> {
        self.table.set(id, color)?;
        self.show_pending = true;
        Ok(())
    }

    /// Deferred change of `[start, start + count)`.
    pub fn fill_range(&mut self, start: u16, count: u16, color: LampColor) -> Result<()> {
        self.table.fill_range(start, count, color)?;
        if count > 0 {
            self.show_pending = true;
        }
        Ok(())
    }

    pub fn get(&self, id: u16) -> Result<LampColor> {
        self.table.get(id)
    }

    fn check_range(&self, start: u16, end: u16) -> Result<()> {
        let lamp_count = self.table.lamp_count();
        if start > end || end >= lamp_count {
            return Err(LampArrayError::InvalidRange {
                start: u32::from(start),
                end: u32::from(end),
                lamp_count,
            });
        }
        Ok(())
    }

    /// Send one range update for the inclusive range `[start, end]`.
    ///
    /// On success the lamps hold `color` and are clean, and show-pending
    /// becomes `!complete`. If the write fails the lamps still take `color`
    /// but stay dirty and show-pending is raised, so a later flush
    /// retransmits them.
    pub fn range_update<D>(
        &mut self,
        device: &mut D,
        start: u16,
        end: u16,
        color: LampColor,
        complete: bool,
    ) -> Result<()>
    where
        D: FeatureReportDevice + ?Sized,
    {
        self.check_range(start, end)?;
        let update = LampRangeUpdate::new(start, end, color, complete);
        debug!(start, end, ?color, complete, "range update");

        if let Err(err) = send_report(device, &update) {
            let count = end.saturating_sub(start).saturating_add(1);
            self.table.fill_range(start, count, color)?;
            self.show_pending = true;
            return Err(err);
        }
        self.table.commit_range(start, end, color)?;
        self.show_pending = !complete;
        Ok(())
    }

    /// Transmit every dirty lamp. Returns the number of transactions sent.
    pub fn flush<D>(&mut self, device: &mut D) -> Result<usize>
    where
        D: FeatureReportDevice + ?Sized,
    {
        let dirty = self.table.dirty_lamps();
        let plan = plan_flush(&dirty, self.show_pending)?;
        if plan.is_empty() {
            return Ok(0);
        }

        let total = plan.len();
        for (index, update) in plan.iter().enumerate() {
            debug!(
                chunk = index.saturating_add(1),
                of = total,
                lamps = update.lamp_count,
                complete = update.is_complete(),
                "multi update"
            );
            if let Err(err) = send_report(device, update) {
                warn!(
                    "flush aborted at chunk {}/{}: {}; {} lamps left dirty",
                    index.saturating_add(1),
                    total,
                    err,
                    self.table.dirty_count()
                );
                // Earlier chunks went out without the completion flag.
                self.show_pending = true;
                return Err(err);
            }
            for (id, _) in update.entries() {
                self.table.mark_clean(id)?;
            }
        }
        self.show_pending = false;
        Ok(total)
    }
}
