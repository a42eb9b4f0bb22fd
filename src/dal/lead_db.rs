use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::lead::{Lead, LeadFilter, LeadStatus};

/// Inserts a lead, or refreshes the discovery fields of the lead the same client
/// already has under this place id. The lifecycle status of an existing lead is
/// kept. Leads of other clients are never touched.
pub async fn upsert_lead(pool: &PgPool, lead: &Lead) -> Result<Lead, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r"
        insert into lead
            (id, client_business_id, lead_search_id, user_id, place_id, title, address,
             city, state, zip, phone, website, email, email_status, rating, review_count,
             business_type, industry, category, partnership, status)
        values
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
             $18, $19, $20, $21)
        on conflict (client_business_id, place_id) do update set
            lead_search_id = excluded.lead_search_id,
            title = excluded.title,
            address = excluded.address,
            city = excluded.city,
            state = excluded.state,
            zip = excluded.zip,
            phone = excluded.phone,
            website = excluded.website,
            email = excluded.email,
            email_status = excluded.email_status,
            rating = excluded.rating,
            review_count = excluded.review_count,
            business_type = excluded.business_type,
            industry = excluded.industry,
            category = excluded.category,
            partnership = excluded.partnership,
            updated_at = now()
        returning *
        ",
    )
    .bind(lead.id)
    .bind(lead.client_business_id)
    .bind(lead.lead_search_id)
    .bind(&lead.user_id)
    .bind(&lead.place_id)
    .bind(&lead.title)
    .bind(&lead.address)
    .bind(&lead.city)
    .bind(&lead.state)
    .bind(&lead.zip)
    .bind(&lead.phone)
    .bind(&lead.website)
    .bind(&lead.email)
    .bind(lead.email_status)
    .bind(lead.rating)
    .bind(lead.review_count)
    .bind(lead.business_type)
    .bind(&lead.industry)
    .bind(&lead.category)
    .bind(&lead.partnership)
    .bind(lead.status)
    .fetch_one(pool)
    .await
}

pub async fn get_lead(pool: &PgPool, id: Uuid) -> Result<Option<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>("select * from lead where id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_leads(
    pool: &PgPool,
    client_business_id: Uuid,
    filter: &LeadFilter,
) -> Result<Vec<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r"
        select
            *
        from
            lead
        where
            client_business_id = $1 and
            ($2::uuid is null or lead_search_id = $2) and
            ($3::lead_business_type is null or business_type = $3)
        order by created_at desc
        ",
    )
    .bind(client_business_id)
    .bind(filter.lead_search_id)
    .bind(filter.business_type)
    .fetch_all(pool)
    .await
}

/// `None` when the lead is missing or its current status does not allow the move.
pub async fn update_lead_status(
    pool: &PgPool,
    id: Uuid,
    status: LeadStatus,
) -> Result<Option<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(
        r"
        update lead set
            status = $2,
            updated_at = now()
        where
            id = $1 and
            status = any($3)
        returning *
        ",
    )
    .bind(id)
    .bind(status)
    .bind(status.allowed_from())
    .fetch_optional(pool)
    .await
}
