use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::domain::{
    lead_business::LeadBusiness,
    lead_search::{LeadSearch, NewLeadSearch},
};

pub async fn insert_lead_search(
    pool: &PgPool,
    search: NewLeadSearch,
) -> Result<LeadSearch, sqlx::Error> {
    sqlx::query_as::<_, LeadSearch>(
        r"
        insert into lead_search
            (id, client_business_id, user_id, keyword, geo, search_types, verify_emails,
             status, triggered_by)
        values
            ($1, $2, $3, $4, $5, $6, $7, 'pending', $8)
        returning *
        ",
    )
    .bind(Uuid::new_v4())
    .bind(search.client_business_id)
    .bind(search.user_id)
    .bind(search.keyword)
    .bind(search.geo)
    .bind(search.search_types)
    .bind(search.verify_emails)
    .bind(search.triggered_by)
    .fetch_one(pool)
    .await
}

pub async fn get_lead_search(pool: &PgPool, id: Uuid) -> Result<Option<LeadSearch>, sqlx::Error> {
    sqlx::query_as::<_, LeadSearch>("select * from lead_search where id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_lead_searches(
    pool: &PgPool,
    client_business_id: Uuid,
) -> Result<Vec<LeadSearch>, sqlx::Error> {
    sqlx::query_as::<_, LeadSearch>(
        r"
        select
            *
        from
            lead_search
        where
            client_business_id = $1
        order by created_at desc
        ",
    )
    .bind(client_business_id)
    .fetch_all(pool)
    .await
}

// Every transition below is guarded on the current status so a terminal row is
// never rewritten. They return whether the row actually moved.

pub async fn mark_running(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r"
        update lead_search set
            status = 'running'
        where
            id = $1 and
            status = 'pending'
        ",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn mark_completed(
    pool: &PgPool,
    id: Uuid,
    results: &[LeadBusiness],
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r"
        update lead_search set
            status = 'completed',
            results = $2,
            total_found = $3,
            completed_at = now()
        where
            id = $1 and
            status = 'running'
        ",
    )
    .bind(id)
    .bind(Json(results))
    .bind(results.len() as i32)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn mark_error(pool: &PgPool, id: Uuid, message: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r"
        update lead_search set
            status = 'error',
            error_message = $2,
            completed_at = now()
        where
            id = $1 and
            status in ('pending', 'running')
        ",
    )
    .bind(id)
    .bind(message)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
