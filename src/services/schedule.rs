// src/services/schedule.rs

//! Schedule fetching, normalization and caching.
//!
//! The cache is one map from `"{type}:{name}"` to days. Days before local
//! midnight are pruned whenever the map is read or written, and a target
//! left with no days is removed from the map.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};

use crate::error::{AppError, Result};
use crate::models::{
    Couple, CoupleNumber, RawCouple, RawDay, RawSchedule, ScheduleConfig, ScheduleDay, Target,
};
use crate::services::BackendClient;
use crate::storage::{self, KeyValueStore, keys};
use crate::utils::{day_timestamp, is_current_day, local_midnight};

type ScheduleMap = BTreeMap<String, Vec<ScheduleDay>>;

fn clean(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Normalize one raw couple.
pub fn normalize_couple(raw: RawCouple, rules: &ScheduleConfig) -> Couple {
    let label = raw.couple.map(|l| l.as_text()).unwrap_or_default();
    let cabinet = clean(raw.cabinet);
    let teacher = clean(raw.teacher);
    let combined = raw.combined.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());

    let marked = cabinet == rules.class_hour_marker;
    let tokened = label.trim().to_lowercase() == rules.class_hour_token.to_lowercase();

    let number = if marked || tokened {
        CoupleNumber::ClassHour
    } else {
        CoupleNumber::parse(&label)
    };
    let title = if marked {
        rules.class_hour_label.clone()
    } else {
        clean(raw.lesson)
    };

    Couple {
        number,
        time_start: clean(raw.time_start),
        time_end: clean(raw.time_end),
        title,
        teacher,
        cabinet,
        group: clean(raw.group),
        combined,
    }
}

/// Normalize a raw schedule into days sorted by date. Undated days sort
/// first.
pub fn normalize_schedule(raw: RawSchedule, rules: &ScheduleConfig) -> Vec<ScheduleDay> {
    let mut days: Vec<ScheduleDay> = raw
        .into_iter()
        .map(|(date, day)| {
            let (from_type, corpus, couples) = match day {
                RawDay::Detailed {
                    from_type,
                    corpus,
                    couples,
                } => (from_type.unwrap_or_default(), corpus.unwrap_or_default(), couples),
                RawDay::Couples(couples) => (0, 0, couples),
            };
            ScheduleDay {
                date,
                from_type,
                corpus,
                couples: couples
                    .into_iter()
                    .map(|c| normalize_couple(c, rules))
                    .collect(),
            }
        })
        .collect();

    days.sort_by_key(|d| day_timestamp(&d.date));
    days
}

/// Drop days strictly before local midnight of `now`.
pub fn retain_current(days: Vec<ScheduleDay>, now: DateTime<Local>) -> Vec<ScheduleDay> {
    let midnight = local_midnight(now);
    days.into_iter()
        .filter(|d| is_current_day(&d.date, midnight))
        .collect()
}

/// Fetches schedules and owns the schedule cache map.
#[derive(Clone)]
pub struct ScheduleService {
    backend: BackendClient,
    store: Arc<dyn KeyValueStore>,
    rules: ScheduleConfig,
}

impl ScheduleService {
    pub fn new(backend: BackendClient, store: Arc<dyn KeyValueStore>, rules: ScheduleConfig) -> Self {
        Self {
            backend,
            store,
            rules,
        }
    }

    /// Fetch and normalize, without touching the cache.
    pub async fn fetch(&self, target: &Target) -> Result<Vec<ScheduleDay>> {
        let raw = self.backend.fetch_couples(&target.name).await?;
        Ok(normalize_schedule(raw, &self.rules))
    }

    /// Load the map, prune past days everywhere and write back if anything
    /// was dropped.
    async fn load_map(&self, now: DateTime<Local>) -> ScheduleMap {
        let Some(map) = storage::load_json::<ScheduleMap>(self.store.as_ref(), keys::SCHEDULE).await
        else {
            return ScheduleMap::new();
        };

        let before: usize = map.values().map(Vec::len).sum();
        let pruned: ScheduleMap = map
            .into_iter()
            .map(|(key, days)| (key, retain_current(days, now)))
            .filter(|(_, days)| !days.is_empty())
            .collect();
        let after: usize = pruned.values().map(Vec::len).sum();

        if after != before {
            log::debug!("Pruned {} past schedule day(s)", before - after);
            self.save_map(&pruned).await;
        }
        pruned
    }

    async fn save_map(&self, map: &ScheduleMap) {
        if map.is_empty() {
            storage::remove_key(self.store.as_ref(), keys::SCHEDULE).await;
        } else {
            storage::save_json(self.store.as_ref(), keys::SCHEDULE, map).await;
        }
    }

    /// Cached days for a target as of `now`, if any survive pruning.
    pub async fn cached_at(&self, target: &Target, now: DateTime<Local>) -> Option<Vec<ScheduleDay>> {
        self.load_map(now).await.remove(&target.cache_key())
    }

    pub async fn cached(&self, target: &Target) -> Option<Vec<ScheduleDay>> {
        self.cached_at(target, Local::now()).await
    }

    /// Replace a target's cached days, keeping only current ones. Returns
    /// what was kept.
    pub async fn persist_at(
        &self,
        target: &Target,
        days: Vec<ScheduleDay>,
        now: DateTime<Local>,
    ) -> Vec<ScheduleDay> {
        let kept = retain_current(days, now);
        let mut map = self.load_map(now).await;
        let key = target.cache_key();

        if kept.is_empty() {
            map.remove(&key);
        } else {
            map.insert(key, kept.clone());
        }
        self.save_map(&map).await;
        kept
    }

    pub async fn persist(&self, target: &Target, days: Vec<ScheduleDay>) -> Vec<ScheduleDay> {
        self.persist_at(target, days, Local::now()).await
    }

    /// Fetch, persist and return current days. Falls back to the cache
    /// when the fetch fails; fails only when there is no cache.
    pub async fn get_schedule(&self, target: &Target) -> Result<Vec<ScheduleDay>> {
        match self.fetch(target).await {
            Ok(days) => Ok(self.persist(target, days).await),
            Err(err) => match self.cached(target).await {
                Some(days) => {
                    log::warn!("Schedule for {} unavailable ({}), using cache", target, err);
                    Ok(days)
                }
                None => Err(err),
            },
        }
    }
}

/// Identifies one load in a [`RequestGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Generation counter: only the most recently issued ticket is current.
#[derive(Debug, Default)]
pub struct RequestGuard {
    generation: AtomicU64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}

/// How a schedule load finished.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Fresh data from the backend, now cached
    Fresh(Vec<ScheduleDay>),
    /// Fetch failed; the cached days stand and the error is informational
    Stale {
        days: Vec<ScheduleDay>,
        error: AppError,
    },
    /// A later load started before this one resolved; nothing was written
    Superseded,
}

impl LoadOutcome {
    pub fn days(&self) -> Option<&[ScheduleDay]> {
        match self {
            LoadOutcome::Fresh(days) | LoadOutcome::Stale { days, .. } => Some(days),
            LoadOutcome::Superseded => None,
        }
    }
}

/// Stale-while-revalidate loader with last-request-wins semantics.
#[derive(Clone)]
pub struct ScheduleLoader {
    service: ScheduleService,
    guard: Arc<RequestGuard>,
}

impl ScheduleLoader {
    pub fn new(service: ScheduleService) -> Self {
        Self {
            service,
            guard: Arc::new(RequestGuard::new()),
        }
    }

    /// Share a guard with other loaders so they supersede each other.
    pub fn with_guard(service: ScheduleService, guard: Arc<RequestGuard>) -> Self {
        Self { service, guard }
    }

    pub fn service(&self) -> &ScheduleService {
        &self.service
    }

    /// Hand cached days to `on_cached` right away, then revalidate.
    ///
    /// Fails only when the fetch fails and nothing was cached.
    pub async fn load<F>(&self, target: &Target, on_cached: F) -> Result<LoadOutcome>
    where
        F: FnOnce(&[ScheduleDay]) + Send,
    {
        let ticket = self.guard.begin();

        let cached = self.service.cached(target).await;
        if let Some(days) = &cached
            && self.guard.is_current(ticket)
        {
            on_cached(days.as_slice());
        }

        let fetched = self.service.fetch(target).await;
        if !self.guard.is_current(ticket) {
            log::debug!("Dropping superseded schedule response for {}", target);
            return Ok(LoadOutcome::Superseded);
        }

        match fetched {
            Ok(days) => Ok(LoadOutcome::Fresh(self.service.persist(target, days).await)),
            Err(error) => match cached {
                Some(days) => {
                    log::warn!("Schedule refresh for {} failed: {}", target, error);
                    Ok(LoadOutcome::Stale { days, error })
                }
                None => Err(error),
            },
        }
    }
}
