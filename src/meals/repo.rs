use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::meals::repo_types::{MealLog, MealLogPatch, NewMealLog};

/// Owner-scoped access to meal logs. Every method takes the owner first so no
/// query can reach across users by omission.
#[async_trait]
pub trait MealLogStore: Send + Sync {
    async fn create(&self, log: NewMealLog) -> anyhow::Result<MealLog>;
    /// Newest `created_at` first.
    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<MealLog>>;
    /// Exact string match on `date`.
    async fn list_by_owner_and_date(&self, owner: Uuid, date: &str)
        -> anyhow::Result<Vec<MealLog>>;
    async fn get(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<MealLog>>;
    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: MealLogPatch,
    ) -> anyhow::Result<Option<MealLog>>;
    /// Returns `false` when nothing owned by `owner` had that id.
    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgMealLogStore {
    db: PgPool,
}

impl PgMealLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const COLUMNS: &str =
    "id, user_id, meal, calories, protein, carbs, fats, log_date AS date, created_at, updated_at";

#[async_trait]
impl MealLogStore for PgMealLogStore {
    async fn create(&self, log: NewMealLog) -> anyhow::Result<MealLog> {
        let row = sqlx::query_as::<_, MealLog>(&format!(
            r#"
            INSERT INTO meal_logs (id, user_id, meal, calories, protein, carbs, fats, log_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(log.user_id)
        .bind(&log.meal)
        .bind(log.calories)
        .bind(log.protein)
        .bind(log.carbs)
        .bind(log.fats)
        .bind(&log.date)
        .fetch_one(&self.db)
        .await
        .context("insert meal log")?;
        Ok(row)
    }

    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<MealLog>> {
        let rows = sqlx::query_as::<_, MealLog>(&format!(
            r#"
            SELECT {COLUMNS}
              FROM meal_logs
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner)
        .fetch_all(&self.db)
        .await
        .context("list meal logs by owner")?;
        Ok(rows)
    }

    async fn list_by_owner_and_date(
        &self,
        owner: Uuid,
        date: &str,
    ) -> anyhow::Result<Vec<MealLog>> {
        let rows = sqlx::query_as::<_, MealLog>(&format!(
            r#"
            SELECT {COLUMNS}
              FROM meal_logs
             WHERE user_id = $1 AND log_date = $2
             ORDER BY created_at ASC
            "#
        ))
        .bind(owner)
        .bind(date)
        .fetch_all(&self.db)
        .await
        .context("list meal logs by date")?;
        Ok(rows)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<MealLog>> {
        let row = sqlx::query_as::<_, MealLog>(&format!(
            r#"
            SELECT {COLUMNS}
              FROM meal_logs
             WHERE id = $1 AND user_id = $2
            "#
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("get meal log")?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: MealLogPatch,
    ) -> anyhow::Result<Option<MealLog>> {
        let row = sqlx::query_as::<_, MealLog>(&format!(
            r#"
            UPDATE meal_logs
               SET meal       = COALESCE($3, meal),
                   calories   = COALESCE($4, calories),
                   protein    = COALESCE($5, protein),
                   carbs      = COALESCE($6, carbs),
                   fats       = COALESCE($7, fats),
                   log_date   = COALESCE($8, log_date),
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .bind(patch.meal)
        .bind(patch.calories)
        .bind(patch.protein)
        .bind(patch.carbs)
        .bind(patch.fats)
        .bind(patch.date)
        .fetch_optional(&self.db)
        .await
        .context("update meal log")?;
        Ok(row)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM meal_logs
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await
        .context("delete meal log")?;
        Ok(res.rows_affected() > 0)
    }
}
