//! The operator's editing session.
//!
//! One session per process. It owns the current plan snapshot, the tour kind, the
//! presentation mode, the page-break negotiator and the quotation. Every mutation
//! replaces the snapshot wholesale; a failed operation never touches it.
//!
//! Long-running collaborator calls are not made while holding the lock. Instead they
//! take a busy guard (`try_begin_generation`, `try_begin_regeneration`) which is
//! released on drop, whatever path the handler takes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::document::edit::EditError;
use crate::document::{Quotation, TourKind, TourPlan};
use crate::errors::AppError;
use crate::layout::PageBreakNegotiator;
use crate::render::RenderMode;

/// Shown when an operation needs a plan and none has been generated or loaded.
pub const NO_PLAN_MESSAGE: &str = "尚未產生行程，請先生成或載入歷史紀錄。";

#[derive(Debug, Default, Serialize)]
pub struct Session {
    pub plan: Option<TourPlan>,
    pub kind: TourKind,
    pub mode: RenderMode,
    pub editing: bool,
    pub negotiator: PageBreakNegotiator,
    pub quotation: Option<Quotation>,
    /// Bumped whenever the plan is replaced wholesale (generation, history load).
    /// Work started against an older plan checks this before writing back.
    #[serde(skip)]
    pub epoch: u64,
}

impl Session {
    pub fn plan(&self) -> Result<&TourPlan, AppError> {
        self.plan
            .as_ref()
            .ok_or_else(|| AppError::NotFound(NO_PLAN_MESSAGE.to_string()))
    }

    /// Installs a new plan and enters edit mode.
    pub fn replace_plan(&mut self, plan: TourPlan, kind: TourKind, quotation: Option<Quotation>) {
        self.plan = Some(plan);
        self.kind = kind;
        self.quotation = quotation;
        self.editing = true;
        self.epoch += 1;
    }

    /// Applies a snapshot edit and commits the result. On error the current snapshot stays.
    pub fn apply(
        &mut self,
        edit: impl FnOnce(&TourPlan) -> Result<TourPlan, EditError>,
    ) -> Result<&TourPlan, AppError> {
        let next = edit(self.plan()?)?;
        let plan: &TourPlan = self.plan.insert(next);
        Ok(plan)
    }

    /// Switches presentation mode. Entering Summary from Full resets the page heights
    /// unless `carry_over` is set.
    pub fn set_mode(&mut self, mode: RenderMode, carry_over: bool) {
        let entering_summary = mode == RenderMode::Summary && self.mode != RenderMode::Summary;
        if entering_summary && !carry_over {
            self.negotiator = PageBreakNegotiator::default();
        }
        self.mode = mode;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared handle
// ────────────────────────────────────────────────────────────────────────────

/// Cloneable handle carried in `AppState`.
#[derive(Clone, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<Session>>,
    generating: Arc<AtomicBool>,
    regenerating: Arc<Mutex<HashSet<usize>>>,
}

impl SharedSession {
    pub async fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().await
    }

    /// Claims the plan-generation flag, or `None` if a generation is in flight.
    pub fn try_begin_generation(&self) -> Option<GenerationGuard> {
        self.generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GenerationGuard {
                flag: self.generating.clone(),
            })
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    /// Claims the regeneration flag for one day, or `None` if that day is already running.
    pub fn try_begin_regeneration(&self, day_index: usize) -> Option<RegenerationGuard> {
        let mut days = self
            .regenerating
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        days.insert(day_index).then(|| RegenerationGuard {
            days: self.regenerating.clone(),
            day_index,
        })
    }
}

/// Releases the generation flag on drop.
pub struct GenerationGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Releases one day's regeneration flag on drop.
pub struct RegenerationGuard {
    days: Arc<Mutex<HashSet<usize>>>,
    day_index: usize,
}

impl Drop for RegenerationGuard {
    fn drop(&mut self) {
        self.days
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.day_index);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::edit::{set_image_count, update_plan_field, PlanField};
    use crate::document::model::tests::make_plan;

    #[test]
    fn test_plan_missing_is_not_found() {
        let session = Session::default();
        assert!(matches!(session.plan(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_replace_plan_enters_edit_mode_and_bumps_epoch() {
        let mut session = Session::default();
        session.replace_plan(make_plan(2), TourKind::International, None);
        assert!(session.editing);
        assert_eq!(session.kind, TourKind::International);
        assert_eq!(session.epoch, 1);
    }

    #[test]
    fn test_failed_edit_keeps_snapshot() {
        let mut session = Session::default();
        session.replace_plan(make_plan(2), TourKind::Domestic, None);
        let before = session.plan.clone();

        let result = session.apply(|p| set_image_count(p, 7, 2));
        assert!(matches!(result, Err(AppError::Edit(_))));
        assert_eq!(session.plan, before);

        session
            .apply(|p| Ok(update_plan_field(p, PlanField::MainTitle("新標題".to_string()))))
            .unwrap();
        assert_eq!(session.plan().unwrap().main_title, "新標題");
    }

    #[test]
    fn test_entering_summary_resets_heights_unless_carried() {
        let mut session = Session::default();
        session.negotiator.set_all_uniform(400.0);

        session.set_mode(RenderMode::Summary, true);
        assert_eq!(session.negotiator.heights().entries()[0], 400);

        session.set_mode(RenderMode::Full, false);
        session.set_mode(RenderMode::Summary, false);
        assert_eq!(session.negotiator.heights().entries(), &[285; 5]);
    }

    #[test]
    fn test_staying_in_summary_keeps_heights() {
        let mut session = Session::default();
        session.set_mode(RenderMode::Summary, false);
        session.negotiator.set_all_uniform(300.0);
        session.set_mode(RenderMode::Summary, false);
        assert_eq!(session.negotiator.heights().entries()[4], 300);
    }

    // ── Busy guards ─────────────────────────────────────────────────────────

    #[test]
    fn test_generation_guard_is_exclusive_and_released_on_drop() {
        let shared = SharedSession::default();
        let guard = shared.try_begin_generation();
        assert!(guard.is_some());
        assert!(shared.try_begin_generation().is_none());
        assert!(shared.is_generating());
        drop(guard);
        assert!(!shared.is_generating());
        assert!(shared.try_begin_generation().is_some());
    }

    #[test]
    fn test_regeneration_guard_is_per_day() {
        let shared = SharedSession::default();
        let first = shared.try_begin_regeneration(0).unwrap();
        assert!(shared.try_begin_regeneration(0).is_none());
        assert!(shared.try_begin_regeneration(1).is_some());
        drop(first);
        assert!(shared.try_begin_regeneration(0).is_some());
    }
}
