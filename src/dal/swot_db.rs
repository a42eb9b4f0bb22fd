use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::domain::swot::{SwotAnalysis, SwotStatus, SwotUpdate};

pub async fn insert_swot_analysis(
    pool: &PgPool,
    client_business_id: Uuid,
    user_id: &str,
) -> Result<SwotAnalysis, sqlx::Error> {
    sqlx::query_as::<_, SwotAnalysis>(
        r"
        insert into swot_analysis
            (id, client_business_id, user_id, status)
        values
            ($1, $2, $3, 'pending')
        returning *
        ",
    )
    .bind(Uuid::new_v4())
    .bind(client_business_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn get_swot_analysis(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<SwotAnalysis>, sqlx::Error> {
    sqlx::query_as::<_, SwotAnalysis>("select * from swot_analysis where id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_latest_swot_analysis(
    pool: &PgPool,
    client_business_id: Uuid,
) -> Result<Option<SwotAnalysis>, sqlx::Error> {
    sqlx::query_as::<_, SwotAnalysis>(
        r"
        select
            *
        from
            swot_analysis
        where
            client_business_id = $1
        order by created_at desc
        limit 1
        ",
    )
    .bind(client_business_id)
    .fetch_optional(pool)
    .await
}

/// Applies the update only if the stored status may move to the target status.
pub async fn update_swot_analysis(
    pool: &PgPool,
    id: Uuid,
    update: &SwotUpdate,
) -> Result<bool, sqlx::Error> {
    let target = update.target_status();
    let allowed_from: Vec<SwotStatus> = [
        SwotStatus::Pending,
        SwotStatus::Generating,
        SwotStatus::Completed,
        SwotStatus::Error,
    ]
    .into_iter()
    .filter(|s| s.can_transition_to(target))
    .collect();

    let result = match update {
        SwotUpdate::Generating => {
            sqlx::query(
                r"
                update swot_analysis set
                    status = 'generating'
                where
                    id = $1 and
                    status = any($2)
                ",
            )
            .bind(id)
            .bind(&allowed_from)
            .execute(pool)
            .await?
        }
        SwotUpdate::Completed(report) => {
            sqlx::query(
                r"
                update swot_analysis set
                    status = 'completed',
                    strengths = $3,
                    weaknesses = $4,
                    opportunities = $5,
                    threats = $6,
                    summary = $7,
                    model = $8,
                    leads_analyzed = $9,
                    completed_at = now()
                where
                    id = $1 and
                    status = any($2)
                ",
            )
            .bind(id)
            .bind(&allowed_from)
            .bind(Json(&report.strengths))
            .bind(Json(&report.weaknesses))
            .bind(Json(&report.opportunities))
            .bind(Json(&report.threats))
            .bind(&report.summary)
            .bind(&report.model)
            .bind(report.leads_analyzed)
            .execute(pool)
            .await?
        }
        SwotUpdate::Error { message } => {
            sqlx::query(
                r"
                update swot_analysis set
                    status = 'error',
                    error_message = $3,
                    completed_at = now()
                where
                    id = $1 and
                    status = any($2)
                ",
            )
            .bind(id)
            .bind(&allowed_from)
            .bind(message)
            .execute(pool)
            .await?
        }
    };

    Ok(result.rows_affected() == 1)
}
