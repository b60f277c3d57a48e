use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    repo::MealLogStore,
    repo_types::{MealLog, MealLogPatch, NewMealLog},
};

/// Process-local store backing `AppState::fake`.
#[derive(Default)]
pub struct InMemoryMealLogStore {
    // (insertion sequence, record); the sequence breaks created_at ties.
    rows: Mutex<Vec<(u64, MealLog)>>,
    next_seq: AtomicU64,
}

impl InMemoryMealLogStore {
    pub fn count(&self) -> usize {
        self.rows.lock().expect("meal log store poisoned").len()
    }
}

fn apply_patch(log: &mut MealLog, patch: MealLogPatch) {
    if let Some(meal) = patch.meal {
        log.meal = meal;
    }
    if let Some(v) = patch.calories {
        log.calories = v;
    }
    if let Some(v) = patch.protein {
        log.protein = v;
    }
    if let Some(v) = patch.carbs {
        log.carbs = v;
    }
    if let Some(v) = patch.fats {
        log.fats = v;
    }
    if let Some(date) = patch.date {
        log.date = date;
    }
}

#[async_trait]
impl MealLogStore for InMemoryMealLogStore {
    async fn create(&self, log: NewMealLog) -> anyhow::Result<MealLog> {
        let now = OffsetDateTime::now_utc();
        let row = MealLog {
            id: Uuid::new_v4(),
            user_id: log.user_id,
            meal: log.meal,
            calories: log.calories,
            protein: log.protein,
            carbs: log.carbs,
            fats: log.fats,
            date: log.date,
            created_at: now,
            updated_at: now,
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut rows = self.rows.lock().expect("meal log store poisoned");
        rows.push((seq, row.clone()));
        Ok(row)
    }

    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<MealLog>> {
        let rows = self.rows.lock().expect("meal log store poisoned");
        let mut mine: Vec<_> = rows.iter().filter(|(_, r)| r.user_id == owner).collect();
        mine.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
        Ok(mine.into_iter().map(|(_, r)| r.clone()).collect())
    }

    async fn list_by_owner_and_date(
        &self,
        owner: Uuid,
        date: &str,
    ) -> anyhow::Result<Vec<MealLog>> {
        let rows = self.rows.lock().expect("meal log store poisoned");
        Ok(rows
            .iter()
            .filter(|(_, r)| r.user_id == owner && r.date == date)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<MealLog>> {
        let rows = self.rows.lock().expect("meal log store poisoned");
        Ok(rows
            .iter()
            .find(|(_, r)| r.id == id && r.user_id == owner)
            .map(|(_, r)| r.clone()))
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: MealLogPatch,
    ) -> anyhow::Result<Option<MealLog>> {
        let mut rows = self.rows.lock().expect("meal log store poisoned");
        let Some((_, row)) = rows
            .iter_mut()
            .find(|(_, r)| r.id == id && r.user_id == owner)
        else {
            return Ok(None);
        };
        apply_patch(row, patch);
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().expect("meal log store poisoned");
        let before = rows.len();
        rows.retain(|(_, r)| !(r.id == id && r.user_id == owner));
        Ok(rows.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_log(owner: Uuid, meal: &str, date: &str) -> NewMealLog {
        NewMealLog {
            user_id: owner,
            meal: meal.into(),
            calories: 100.0,
            protein: 1.0,
            carbs: 2.0,
            fats: 3.0,
            date: date.into(),
        }
    }

    #[tokio::test]
    async fn list_by_owner_is_newest_first_and_scoped() {
        let store = InMemoryMealLogStore::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.create(new_log(alice, "first", "2024-01-15")).await.unwrap();
        store.create(new_log(bob, "other", "2024-01-15")).await.unwrap();
        store.create(new_log(alice, "second", "2024-01-16")).await.unwrap();

        let meals: Vec<_> = store
            .list_by_owner(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.meal)
            .collect();
        assert_eq!(meals, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn list_by_date_is_exact_match() {
        let store = InMemoryMealLogStore::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.create(new_log(alice, "a", "2024-01-15")).await.unwrap();
        store.create(new_log(alice, "b", "2024-01-16")).await.unwrap();
        store.create(new_log(alice, "c", "2024-01-15T08:00")).await.unwrap();
        store.create(new_log(bob, "d", "2024-01-15")).await.unwrap();

        let day = store.list_by_owner_and_date(alice, "2024-01-15").await.unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].meal, "a");
    }

    #[tokio::test]
    async fn foreign_records_are_invisible() {
        let store = InMemoryMealLogStore::default();
        let alice = Uuid::new_v4();
        let mallory = Uuid::new_v4();
        let log = store.create(new_log(alice, "a", "2024-01-15")).await.unwrap();

        assert!(store.get(mallory, log.id).await.unwrap().is_none());
        let patch = MealLogPatch {
            calories: Some(1.0),
            ..Default::default()
        };
        assert!(store.update(mallory, log.id, patch).await.unwrap().is_none());
        assert!(!store.delete(mallory, log.id).await.unwrap());

        let still = store.get(alice, log.id).await.unwrap().unwrap();
        assert_eq!(still.calories, 100.0);
    }

    #[tokio::test]
    async fn update_touches_only_given_fields() {
        let store = InMemoryMealLogStore::default();
        let alice = Uuid::new_v4();
        let log = store.create(new_log(alice, "a", "2024-01-15")).await.unwrap();
        let patch = MealLogPatch {
            meal: Some("Dinner".into()),
            fats: Some(0.0),
            ..Default::default()
        };
        let updated = store.update(alice, log.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.meal, "Dinner");
        assert_eq!(updated.fats, 0.0);
        assert_eq!(updated.calories, 100.0);
        assert_eq!(updated.date, "2024-01-15");
        assert_eq!(updated.created_at, log.created_at);
        assert!(updated.updated_at >= log.updated_at);
    }

    #[tokio::test]
    async fn delete_is_permanent() {
        let store = InMemoryMealLogStore::default();
        let alice = Uuid::new_v4();
        let log = store.create(new_log(alice, "a", "2024-01-15")).await.unwrap();
        assert!(store.delete(alice, log.id).await.unwrap());
        assert!(store.get(alice, log.id).await.unwrap().is_none());
        assert!(!store.delete(alice, log.id).await.unwrap());
        assert_eq!(store.count(), 0);
    }
}
