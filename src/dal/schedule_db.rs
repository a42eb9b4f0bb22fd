use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::schedule::{NewSearchSchedule, SearchSchedule};

pub async fn insert_schedule(
    pool: &PgPool,
    client_business_id: Uuid,
    user_id: &str,
    schedule: NewSearchSchedule,
) -> Result<SearchSchedule, sqlx::Error> {
    sqlx::query_as::<_, SearchSchedule>(
        r"
        insert into lead_search_schedule
            (id, client_business_id, user_id, search_types, verify_emails, interval_days,
             next_run_at)
        values
            ($1, $2, $3, $4, $5, $6, $7)
        returning *
        ",
    )
    .bind(Uuid::new_v4())
    .bind(client_business_id)
    .bind(user_id)
    .bind(schedule.search_types)
    .bind(schedule.verify_emails)
    .bind(schedule.interval_days)
    .bind(schedule.first_run_at.unwrap_or_else(Utc::now))
    .fetch_one(pool)
    .await
}

pub async fn get_schedule(pool: &PgPool, id: Uuid) -> Result<Option<SearchSchedule>, sqlx::Error> {
    sqlx::query_as::<_, SearchSchedule>(r"select * from lead_search_schedule where id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_schedules(
    pool: &PgPool,
    client_business_id: Uuid,
) -> Result<Vec<SearchSchedule>, sqlx::Error> {
    sqlx::query_as::<_, SearchSchedule>(
        r"
        select
            *
        from
            lead_search_schedule
        where
            client_business_id = $1
        order by created_at desc
        ",
    )
    .bind(client_business_id)
    .fetch_all(pool)
    .await
}

pub async fn get_due_schedules(
    pool: &PgPool,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<SearchSchedule>, sqlx::Error> {
    sqlx::query_as::<_, SearchSchedule>(
        r"
        select
            *
        from
            lead_search_schedule
        where
            is_active and
            next_run_at <= $1
        order by next_run_at
        limit $2
        ",
    )
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn record_schedule_run(
    pool: &PgPool,
    id: Uuid,
    search_id: Option<Uuid>,
    ran_at: DateTime<Utc>,
    next_run_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        update lead_search_schedule set
            last_run_at = $2,
            last_search_id = coalesce($3, last_search_id),
            next_run_at = $4
        where
            id = $1
        ",
    )
    .bind(id)
    .bind(ran_at)
    .bind(search_id)
    .bind(next_run_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn deactivate_schedule(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("update lead_search_schedule set is_active = false where id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
