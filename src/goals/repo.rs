use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Per-user calorie goal storage. `None` means the user never set one.
#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn get_goal(&self, user_id: Uuid) -> anyhow::Result<Option<f64>>;
    /// `false` when no such user exists.
    async fn set_goal(&self, user_id: Uuid, goal: Option<f64>) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgGoalStore {
    db: PgPool,
}

impl PgGoalStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GoalStore for PgGoalStore {
    async fn get_goal(&self, user_id: Uuid) -> anyhow::Result<Option<f64>> {
        let goal = sqlx::query_scalar::<_, Option<f64>>(
            r#"SELECT calorie_goal FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get calorie goal")?;
        Ok(goal.flatten())
    }

    async fn set_goal(&self, user_id: Uuid, goal: Option<f64>) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"UPDATE users SET calorie_goal = $2 WHERE id = $1"#)
            .bind(user_id)
            .bind(goal)
            .execute(&self.db)
            .await
            .context("set calorie goal")?;
        Ok(res.rows_affected() == 1)
    }
}
