//! The `Store` port: the only suspension point in the system. Everything
//! else (recurrence, dependency resolution, scheduling) is a plain
//! synchronous function over borrowed snapshots.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PlannerResult;
use crate::models::instance::Instance;
use crate::models::template::Template;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SleepOverride {
    pub wake_time: String,
    pub sleep_time: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub desired_sleep_duration_minutes: u32,
    pub default_wake_time: String,
    pub default_sleep_time: String,
    #[serde(default)]
    pub preferences: HashMap<String, String>,
}

/// Modeled as `async_trait` so real backends (sqlite, network) can suspend
/// naturally, while the planner core stays synchronous and calls this
/// trait only at its boundary, grounded on the same pattern the
/// teacher uses for its swappable AI provider.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_templates(&self, user_id: &str) -> PlannerResult<Vec<Template>>;
    async fn get_instances_for_date(&self, user_id: &str, date: &str) -> PlannerResult<Vec<Instance>>;
    async fn get_daily_schedule(&self, user_id: &str, date: &str) -> PlannerResult<Option<SleepOverride>>;
    async fn get_settings(&self, user_id: &str) -> PlannerResult<Settings>;
    async fn count_occurrences(&self, template_id: &str, up_to: &str) -> PlannerResult<u32>;
}

/// A plain `HashMap`-backed store for tests and for callers who have no
/// persistence layer yet — unlike the teacher's `InstanceCache`, this
/// carries no TTL, since the planner core has no notion of cache
/// staleness.
#[derive(Default)]
pub struct InMemoryStore {
    templates: RwLock<HashMap<String, Vec<Template>>>,
    instances: RwLock<HashMap<(String, String), Vec<Instance>>>,
    settings: RwLock<HashMap<String, Settings>>,
    occurrence_counts: RwLock<HashMap<String, u32>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_templates(&self, user_id: impl Into<String>, templates: Vec<Template>) {
        self.templates.write().unwrap().insert(user_id.into(), templates);
    }

    pub fn put_instances(&self, user_id: impl Into<String>, date: impl Into<String>, instances: Vec<Instance>) {
        self.instances
            .write()
            .unwrap()
            .insert((user_id.into(), date.into()), instances);
    }

    pub fn put_settings(&self, user_id: impl Into<String>, settings: Settings) {
        self.settings.write().unwrap().insert(user_id.into(), settings);
    }

    pub fn put_occurrence_count(&self, template_id: impl Into<String>, count: u32) {
        self.occurrence_counts.write().unwrap().insert(template_id.into(), count);
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_templates(&self, user_id: &str) -> PlannerResult<Vec<Template>> {
        Ok(self.templates.read().unwrap().get(user_id).cloned().unwrap_or_default())
    }

    async fn get_instances_for_date(&self, user_id: &str, date: &str) -> PlannerResult<Vec<Instance>> {
        Ok(self
            .instances
            .read()
            .unwrap()
            .get(&(user_id.to_string(), date.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_daily_schedule(&self, _user_id: &str, _date: &str) -> PlannerResult<Option<SleepOverride>> {
        Ok(None)
    }

    async fn get_settings(&self, user_id: &str) -> PlannerResult<Settings> {
        self.settings
            .read()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| crate::error::PlannerError::invalid_input(format!("no settings for user {user_id}")))
    }

    async fn count_occurrences(&self, template_id: &str, _up_to: &str) -> PlannerResult<u32> {
        Ok(self.occurrence_counts.read().unwrap().get(template_id).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_round_trips_occurrence_counts() {
        let store = InMemoryStore::new();
        store.put_occurrence_count("tpl-1", 4);
        assert_eq!(store.count_occurrences("tpl-1", "2024-06-01").await.unwrap(), 4);
        assert_eq!(store.count_occurrences("tpl-2", "2024-06-01").await.unwrap(), 0);
    }
}
