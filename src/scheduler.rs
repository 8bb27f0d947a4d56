use crate::dom::NodeId;
use crate::{Error, Result};

const DEFAULT_TIMER_STEP_LIMIT: usize = 10_000;

/// Which throttled handler a throttle window belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThrottleSlot {
    Scroll,
    Resize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TaskKind {
    ReleaseThrottle(ThrottleSlot),
    AnimationFrame,
    DebouncedSearch(String),
    RestoreCopyLabel { button: NodeId },
}

impl TaskKind {
    fn label(&self) -> &'static str {
        match self {
            Self::ReleaseThrottle(ThrottleSlot::Scroll) => "scroll-throttle",
            Self::ReleaseThrottle(ThrottleSlot::Resize) => "resize-throttle",
            Self::AnimationFrame => "animation-frame",
            Self::DebouncedSearch(_) => "search-debounce",
            Self::RestoreCopyLabel { .. } => "copy-feedback",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) kind: TaskKind,
}

/// Snapshot of a queued timer, ordered by `(due_at, order)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub label: &'static str,
}

/// Virtual clock plus timer queue. Nothing here runs a task; the page pops due
/// tasks and dispatches them.
#[derive(Debug)]
pub(crate) struct Scheduler {
    now_ms: i64,
    next_timer_id: i64,
    next_order: i64,
    task_queue: Vec<ScheduledTask>,
    timer_step_limit: usize,
}

impl Scheduler {
    pub(crate) fn new(start_ms: i64) -> Self {
        Self {
            now_ms: start_ms,
            next_timer_id: 1,
            next_order: 0,
            task_queue: Vec::new(),
            timer_step_limit: DEFAULT_TIMER_STEP_LIMIT,
        }
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn schedule(&mut self, delay_ms: i64, kind: TaskKind) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_order;
        self.next_order += 1;
        let due_at = self.now_ms.saturating_add(delay_ms.max(0));
        log::trace!("[timer] schedule id={id} due_at={due_at} kind={}", kind.label());
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            kind,
        });
        id
    }

    pub(crate) fn cancel(&mut self, timer_id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != timer_id);
        before != self.task_queue.len()
    }

    pub(crate) fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                label: task.kind.label(),
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub(crate) fn advance_clock_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::Timer(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        self.now_ms = target_ms;
        Ok(())
    }

    /// Removes the next task due at or before `due_limit` (any task when the
    /// limit is `None`). With `advance_clock` the clock jumps to its due time.
    pub(crate) fn pop_next(
        &mut self,
        due_limit: Option<i64>,
        advance_clock: bool,
    ) -> Option<ScheduledTask> {
        let next_idx = self
            .task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)?;
        let task = self.task_queue.remove(next_idx);
        if advance_clock && task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        Some(task)
    }

    pub(crate) fn check_step_limit(&self, steps: usize) -> Result<()> {
        if steps <= self.timer_step_limit {
            return Ok(());
        }
        Err(Error::Timer(format!(
            "flush exceeded max task steps: limit={}, steps={steps}, now_ms={}, pending_tasks={}",
            self.timer_step_limit,
            self.now_ms,
            self.task_queue.len()
        )))
    }
}

/// At most one accepted call per window. Calls dropped inside the window are
/// remembered so the owner can run one trailing update when it closes.
#[derive(Debug)]
pub(crate) struct Throttle {
    slot: ThrottleSlot,
    interval_ms: i64,
    window: Option<i64>,
    trailing: bool,
}

impl Throttle {
    pub(crate) fn new(slot: ThrottleSlot, interval_ms: i64) -> Self {
        Self {
            slot,
            interval_ms,
            window: None,
            trailing: false,
        }
    }

    /// Returns `true` when the call opens a new window and should run now.
    pub(crate) fn try_acquire(&mut self, scheduler: &mut Scheduler) -> bool {
        if self.window.is_some() {
            self.trailing = true;
            return false;
        }
        self.window = Some(scheduler.schedule(
            self.interval_ms,
            TaskKind::ReleaseThrottle(self.slot),
        ));
        true
    }

    /// Closes the window. When calls were dropped while it was open, the
    /// trailing update they owe starts the next window and `true` is returned.
    pub(crate) fn release(&mut self, scheduler: &mut Scheduler) -> bool {
        self.window = None;
        if !std::mem::take(&mut self.trailing) {
            return false;
        }
        self.try_acquire(scheduler)
    }
}

/// Cancel-and-rearm: only the last call in a burst survives.
#[derive(Debug)]
pub(crate) struct Debounce {
    delay_ms: i64,
    pending: Option<i64>,
}

impl Debounce {
    pub(crate) fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(crate) fn arm(&mut self, scheduler: &mut Scheduler, kind: TaskKind) {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel(previous);
        }
        self.pending = Some(scheduler.schedule(self.delay_ms, kind));
    }

    pub(crate) fn fired(&mut self) {
        self.pending = None;
    }
}
