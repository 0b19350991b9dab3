//! Delayed tasks owned by whoever owns the scheduler.
//!
//! Tasks are plain values rather than closures so the owner decides what
//! "firing" means against its own state. A scheduler dropped or cleared with
//! `cancel_all()` never fires anything again, which ties pending work to the
//! owner's lifetime.

#[derive(Debug)]
struct ScheduledTask<T> {
    due_ms: f64,
    seq: u64,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: f64,
    next_seq: u64,
    pending: Vec<ScheduledTask<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue `task` at an absolute time. A time in the past fires on the next
    /// `advance_to()`.
    pub fn schedule_at(&mut self, due_ms: f64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(ScheduledTask { due_ms, seq, task });
    }

    /// Move the clock forward and return every task that is now due, earliest
    /// first. Ties fire in scheduling order. The clock never runs backwards.
    pub fn advance_to(&mut self, now_ms: f64) -> Vec<T> {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }

        let now = self.now_ms;
        let (mut due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|entry| entry.due_ms <= now);
        self.pending = waiting;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|entry| entry.task).collect()
    }

    /// Drop every pending task. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_fire_once_when_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(1000.0, "reload");
        assert!(scheduler.advance_to(999.0).is_empty());
        assert_eq!(scheduler.advance_to(1000.0), vec!["reload"]);
        assert!(scheduler.advance_to(5000.0).is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn due_tasks_come_out_in_time_then_insertion_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(30.0, 'c');
        scheduler.schedule_at(10.0, 'a');
        scheduler.schedule_at(10.0, 'b');
        assert_eq!(scheduler.advance_to(100.0), vec!['a', 'b', 'c']);
    }

    #[test]
    fn absolute_time_in_the_past_fires_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(300.0);
        scheduler.schedule_at(100.0, "late");
        scheduler.schedule_at(400.0, "later");
        assert_eq!(scheduler.advance_to(300.0), vec!["late"]);
        assert_eq!(scheduler.advance_to(400.0), vec!["later"]);
    }

    #[test]
    fn clock_does_not_run_backwards() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(200.0);
        assert!(scheduler.advance_to(50.0).is_empty());
        scheduler.schedule_at(100.0, "already due");
        assert_eq!(scheduler.advance_to(50.0), vec!["already due"]);
    }

    #[test]
    fn cancel_all_prevents_firing() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(10.0, ());
        scheduler.schedule_at(20.0, ());
        assert_eq!(scheduler.cancel_all(), 2);
        assert!(scheduler.advance_to(100.0).is_empty());
    }
}
