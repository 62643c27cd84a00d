//! Partition of the settlers into jobs (tribal era) or social classes
//! (kingdom era).
//!
//! The workforce never stores the total head count; the caller passes it
//! in. `idle = total - assigned` is therefore always derived, and the
//! invariant `assigned <= total` is restored by [`Workforce::shed`] after
//! any loss of settlers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kindling_types::{Job, SocialClass};

/// Head counts per job and per social class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workforce {
    /// Settlers assigned to each job.
    jobs: BTreeMap<Job, u32>,
    /// Settlers belonging to each social class.
    classes: BTreeMap<SocialClass, u32>,
}

impl Workforce {
    /// Create a workforce with nobody assigned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settlers assigned to `job`.
    pub fn job_count(&self, job: Job) -> u32 {
        self.jobs.get(&job).copied().unwrap_or(0)
    }

    /// Settlers in `class`.
    pub fn class_count(&self, class: SocialClass) -> u32 {
        self.classes.get(&class).copied().unwrap_or(0)
    }

    /// Every job with its head count, including empty ones.
    pub fn jobs(&self) -> BTreeMap<Job, u32> {
        Job::ALL.iter().map(|&job| (job, self.job_count(job))).collect()
    }

    /// Every class with its head count, including empty ones.
    pub fn classes(&self) -> BTreeMap<SocialClass, u32> {
        SocialClass::ALL
            .iter()
            .map(|&class| (class, self.class_count(class)))
            .collect()
    }

    /// Settlers in any job.
    pub fn employed(&self) -> u32 {
        self.jobs.values().fold(0_u32, |sum, n| sum.saturating_add(*n))
    }

    /// Settlers in any class.
    pub fn in_classes(&self) -> u32 {
        self.classes.values().fold(0_u32, |sum, n| sum.saturating_add(*n))
    }

    /// Settlers in any job or class.
    pub fn assigned(&self) -> u32 {
        self.employed().saturating_add(self.in_classes())
    }

    /// Settlers not assigned to anything.
    pub fn idle(&self, total: u32) -> u32 {
        total.saturating_sub(self.assigned())
    }

    /// Move up to `n` idle settlers into `job`. Returns how many moved.
    pub fn assign_job(&mut self, job: Job, n: u32, total: u32) -> u32 {
        let moved = n.min(self.idle(total));
        if moved > 0 {
            let count = self.job_count(job).saturating_add(moved);
            self.jobs.insert(job, count);
        }
        moved
    }

    /// Move up to `n` settlers out of `job` back to idle. Returns how many
    /// moved.
    pub fn remove_job(&mut self, job: Job, n: u32) -> u32 {
        let current = self.job_count(job);
        let moved = n.min(current);
        self.jobs.insert(job, current.saturating_sub(moved));
        moved
    }

    /// Move up to `n` idle settlers into `class`. Returns how many moved.
    pub fn assign_class(&mut self, class: SocialClass, n: u32, total: u32) -> u32 {
        let moved = n.min(self.idle(total));
        if moved > 0 {
            let count = self.class_count(class).saturating_add(moved);
            self.classes.insert(class, count);
        }
        moved
    }

    /// Move up to `n` settlers out of `class` back to idle. Returns how
    /// many moved.
    pub fn remove_class(&mut self, class: SocialClass, n: u32) -> u32 {
        let current = self.class_count(class);
        let moved = n.min(current);
        self.classes.insert(class, current.saturating_sub(moved));
        moved
    }

    /// Release everyone from their jobs.
    pub fn clear_jobs(&mut self) {
        self.jobs.clear();
    }

    /// Trim assignments so that no more than `total` settlers are assigned.
    ///
    /// Idle settlers absorb losses first. Only when they are exhausted are
    /// assigned settlers released, jobs before classes, each in reverse
    /// enum order. Returns how many assignments were dropped.
    pub fn shed(&mut self, total: u32) -> u32 {
        let mut excess = self.assigned().saturating_sub(total);
        let dropped = excess;
        for job in Job::ALL.into_iter().rev() {
            if excess == 0 {
                break;
            }
            excess = excess.saturating_sub(self.remove_job(job, excess));
        }
        for class in SocialClass::ALL.into_iter().rev() {
            if excess == 0 {
                break;
            }
            excess = excess.saturating_sub(self.remove_class(class, excess));
        }
        dropped.saturating_sub(excess)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn assign_clamps_to_idle() {
        let mut workforce = Workforce::new();
        assert_eq!(workforce.assign_job(Job::Gatherer, 3, 5), 3);
        assert_eq!(workforce.assign_job(Job::Woodcutter, 10, 5), 2);
        assert_eq!(workforce.idle(5), 0);
        assert_eq!(workforce.assign_job(Job::Scout, 1, 5), 0);
    }

    #[test]
    fn remove_clamps_to_assigned() {
        let mut workforce = Workforce::new();
        workforce.assign_job(Job::Gatherer, 2, 5);
        assert_eq!(workforce.remove_job(Job::Gatherer, 9), 2);
        assert_eq!(workforce.job_count(Job::Gatherer), 0);
        assert_eq!(workforce.remove_job(Job::Hunter, 1), 0);
    }

    #[test]
    fn classes_share_the_same_idle_pool() {
        let mut workforce = Workforce::new();
        workforce.assign_class(SocialClass::Peasant, 4, 6);
        assert_eq!(workforce.assign_class(SocialClass::Noble, 5, 6), 2);
        assert_eq!(workforce.in_classes(), 6);
        assert_eq!(workforce.remove_class(SocialClass::Peasant, 1), 1);
        assert_eq!(workforce.idle(6), 1);
    }

    #[test]
    fn shed_spares_assignments_while_idle_absorb_losses() {
        let mut workforce = Workforce::new();
        workforce.assign_job(Job::Gatherer, 2, 6);
        workforce.assign_job(Job::Scout, 2, 6);
        assert_eq!(workforce.shed(4), 0);
        assert_eq!(workforce.assigned(), 4);

        assert_eq!(workforce.shed(3), 1);
        assert_eq!(workforce.job_count(Job::Scout), 1);
        assert_eq!(workforce.job_count(Job::Gatherer), 2);

        assert_eq!(workforce.shed(0), 3);
        assert_eq!(workforce.assigned(), 0);
    }

    #[test]
    fn views_list_every_bucket() {
        let workforce = Workforce::new();
        assert_eq!(workforce.jobs().len(), Job::ALL.len());
        assert_eq!(workforce.classes().len(), SocialClass::ALL.len());
    }
}
