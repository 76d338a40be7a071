/**
 * Database Operations for Plans
 *
 * `PlanRepository` on PostgreSQL. Queries are checked at runtime
 * (`sqlx::query` + `Row::get`), so the crate builds without a live database.
 * Methods that touch more than one row run inside a transaction.
 *
 * `order` is a reserved word in SQL; the column is `route_order`.
 */

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::backend::plan::error::RepositoryError;
use crate::backend::plan::repository::{NewPlan, PlanInfo, PlanRepository};
use crate::shared::{NewRoute, Plan, Route, RouteBatch, Schedule, Tag, Writer};

/// Plan repository backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgPlanRepository {
    pool: PgPool,
}

impl PgPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn route_from_row(row: &PgRow) -> Route {
    Route {
        route_id: row.get("route_id"),
        plan_id: row.get("plan_id"),
        attraction_id: row.get("attraction_id"),
        day_index: row.get("day_index"),
        order: row.get("route_order"),
        visit_time: row.get::<Option<NaiveTime>, _>("visit_time"),
        memo: row.get::<Option<String>, _>("memo"),
    }
}

/// Find or create a tag by name inside an open transaction
async fn upsert_tag(tx: &mut Transaction<'_, Postgres>, name: &str) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO tags (name) VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING tag_id
        "#
    )
    .bind(name)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.get("tag_id"))
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn get_plan_by_id(&self, plan_id: i64, requester: Option<Uuid>) -> Result<Option<Plan>, RepositoryError> {
        let Some(row) = sqlx::query(
            r#"
            SELECT p.plan_id, p.title, p.description, p.is_public, p.start_date, p.end_date,
                   p.like_count, p.stella,
                   EXISTS (
                       SELECT 1 FROM plan_likes l WHERE l.plan_id = p.plan_id AND l.user_id = $2
                   ) AS liked
            FROM plans p
            WHERE p.plan_id = $1
            "#
        )
        .bind(plan_id)
        .bind(requester)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let tags = sqlx::query(
            r#"
            SELECT t.tag_id, t.name
            FROM plan_tags pt JOIN tags t ON t.tag_id = pt.tag_id
            WHERE pt.plan_id = $1
            ORDER BY t.tag_id
            "#
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| Tag {
            tag_id: row.get("tag_id"),
            name: row.get("name"),
        })
        .collect();

        let writers = sqlx::query(
            r#"
            SELECT u.id, u.username
            FROM plan_writers w JOIN users u ON u.id = w.user_id
            WHERE w.plan_id = $1
            ORDER BY w.created_at
            "#
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| Writer {
            user_id: row.get("id"),
            name: row.get("username"),
        })
        .collect();

        let routes = sqlx::query(
            r#"
            SELECT route_id, plan_id, attraction_id, day_index, route_order, visit_time, memo
            FROM routes
            WHERE plan_id = $1
            ORDER BY day_index, route_order, route_id
            "#
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(route_from_row)
        .collect();

        Ok(Some(Plan {
            plan_id: row.get("plan_id"),
            title: row.get("title"),
            description: row.get("description"),
            is_public: row.get("is_public"),
            start_date: row.get::<NaiveDate, _>("start_date"),
            end_date: row.get::<NaiveDate, _>("end_date"),
            like_count: row.get("like_count"),
            liked: row.get("liked"),
            stella: row.get("stella"),
            tags,
            writers,
            routes,
        }))
    }

    async fn get_route_by_id(&self, route_id: i64) -> Result<Option<Route>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT route_id, plan_id, attraction_id, day_index, route_order, visit_time, memo
            FROM routes
            WHERE route_id = $1
            "#
        )
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(route_from_row))
    }

    async fn insert_plan(&self, plan: NewPlan, creator: Uuid) -> Result<i64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let plan_id: i64 = sqlx::query(
            r#"
            INSERT INTO plans (title, description, is_public, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING plan_id
            "#
        )
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(plan.is_public)
        .bind(plan.schedule.start_date)
        .bind(plan.schedule.end_date)
        .fetch_one(&mut *tx)
        .await?
        .get("plan_id");

        for name in &plan.tags {
            let tag_id = upsert_tag(&mut tx, name).await?;
            sqlx::query("INSERT INTO plan_tags (plan_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(plan_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("INSERT INTO plan_writers (plan_id, user_id) VALUES ($1, $2)")
            .bind(plan_id)
            .bind(creator)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(plan_id)
    }

    async fn update_basic_info(&self, plan_id: i64, info: PlanInfo) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE plans
            SET title = $2, description = $3, is_public = $4, updated_at = now()
            WHERE plan_id = $1
            "#
        )
        .bind(plan_id)
        .bind(&info.title)
        .bind(&info.description)
        .bind(info.is_public)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::missing("plan", plan_id));
        }
        Ok(())
    }

    async fn update_schedule(&self, plan_id: i64, schedule: Schedule) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE plans
            SET start_date = $2, end_date = $3, updated_at = now()
            WHERE plan_id = $1
            "#
        )
        .bind(plan_id)
        .bind(schedule.start_date)
        .bind(schedule.end_date)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::missing("plan", plan_id));
        }

        let deleted = sqlx::query("DELETE FROM routes WHERE plan_id = $1 AND day_index > $2")
            .bind(plan_id)
            .bind(schedule.last_day_index())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted.rows_affected())
    }

    async fn insert_route(&self, route: NewRoute) -> Result<Route, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO routes (plan_id, attraction_id, day_index, route_order, visit_time, memo)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING route_id, plan_id, attraction_id, day_index, route_order, visit_time, memo
            "#
        )
        .bind(route.plan_id)
        .bind(route.attraction_id)
        .bind(route.day_index)
        .bind(route.order)
        .bind(route.visit_time)
        .bind(&route.memo)
        .fetch_one(&self.pool)
        .await?;

        Ok(route_from_row(&row))
    }

    async fn apply_route_batch(&self, plan_id: i64, batch: &RouteBatch) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for placement in &batch.placements {
            sqlx::query(
                r#"
                UPDATE routes
                SET day_index = $3, route_order = $4
                WHERE route_id = $1 AND plan_id = $2
                "#
            )
            .bind(placement.route_id)
            .bind(plan_id)
            .bind(placement.day_index)
            .bind(placement.order)
            .execute(&mut *tx)
            .await?;
        }

        if !batch.deletions.is_empty() {
            sqlx::query("DELETE FROM routes WHERE plan_id = $1 AND route_id = ANY($2)")
                .bind(plan_id)
                .bind(&batch.deletions)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_route_info(
        &self,
        route_id: i64,
        visit_time: Option<NaiveTime>,
        memo: Option<String>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE routes SET visit_time = $2, memo = $3 WHERE route_id = $1")
            .bind(route_id)
            .bind(visit_time)
            .bind(memo)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::missing("route", route_id));
        }
        Ok(())
    }

    async fn insert_plan_writer(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO plan_writers (plan_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(plan_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_plan_writer(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM plan_writers WHERE plan_id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_plan_writers_count(&self, plan_id: i64) -> Result<i64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS writers FROM plan_writers WHERE plan_id = $1")
            .bind(plan_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("writers"))
    }

    async fn delete_plan(&self, plan_id: i64) -> Result<(), RepositoryError> {
        // routes, writers, tags and likes cascade
        sqlx::query("DELETE FROM plans WHERE plan_id = $1")
            .bind(plan_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn like_plan(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO plan_likes (plan_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(plan_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE plans SET like_count = like_count + 1 WHERE plan_id = $1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn unlike_plan(&self, plan_id: i64, user_id: Uuid) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM plan_likes WHERE plan_id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE plans SET like_count = GREATEST(like_count - 1, 0) WHERE plan_id = $1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
