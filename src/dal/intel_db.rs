use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::domain::intel::{AnalysisType, IntelAnalysis, PartnerBusiness, PartnerCandidate};

/// History is append-only; the newest row per type is the effective analysis.
pub async fn insert_analysis(
    pool: &PgPool,
    client_business_id: Uuid,
    analysis_type: AnalysisType,
    payload: &Value,
    failed_records: i32,
) -> Result<IntelAnalysis, sqlx::Error> {
    sqlx::query_as::<_, IntelAnalysis>(
        r"
        insert into intel_analysis
            (id, client_business_id, analysis_type, payload, failed_records)
        values
            ($1, $2, $3, $4, $5)
        returning *
        ",
    )
    .bind(Uuid::new_v4())
    .bind(client_business_id)
    .bind(analysis_type)
    .bind(Json(payload))
    .bind(failed_records)
    .fetch_one(pool)
    .await
}

pub async fn get_latest_analysis(
    pool: &PgPool,
    client_business_id: Uuid,
    analysis_type: AnalysisType,
) -> Result<Option<IntelAnalysis>, sqlx::Error> {
    sqlx::query_as::<_, IntelAnalysis>(
        r"
        select
            *
        from
            intel_analysis
        where
            client_business_id = $1 and
            analysis_type = $2
        order by created_at desc
        limit 1
        ",
    )
    .bind(client_business_id)
    .bind(analysis_type)
    .fetch_optional(pool)
    .await
}

/// On a place id the client already has, only the score and update time are
/// refreshed.
pub async fn upsert_partner(
    pool: &PgPool,
    client_business_id: Uuid,
    place_id: &str,
    partner: &PartnerCandidate,
) -> Result<PartnerBusiness, sqlx::Error> {
    sqlx::query_as::<_, PartnerBusiness>(
        r"
        insert into partner_business
            (id, client_business_id, place_id, name, address, phone, website, category,
             rating, partnership_score, referral_trigger, suggested_approach, potential_value)
        values
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        on conflict (client_business_id, place_id) do update set
            partnership_score = excluded.partnership_score,
            updated_at = now()
        returning *
        ",
    )
    .bind(Uuid::new_v4())
    .bind(client_business_id)
    .bind(place_id)
    .bind(&partner.name)
    .bind(&partner.address)
    .bind(&partner.phone)
    .bind(&partner.website)
    .bind(&partner.category)
    .bind(partner.rating)
    .bind(partner.partnership_score)
    .bind(&partner.referral_trigger)
    .bind(&partner.suggested_approach)
    .bind(&partner.potential_value)
    .fetch_one(pool)
    .await
}

pub async fn list_partners(
    pool: &PgPool,
    client_business_id: Uuid,
) -> Result<Vec<PartnerBusiness>, sqlx::Error> {
    sqlx::query_as::<_, PartnerBusiness>(
        r"
        select
            *
        from
            partner_business
        where
            client_business_id = $1
        order by partnership_score desc nulls last
        ",
    )
    .bind(client_business_id)
    .fetch_all(pool)
    .await
}
