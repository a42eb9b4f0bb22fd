use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::client_business::{ClientBusiness, NewClientBusiness};

pub async fn insert_client_business(
    pool: &PgPool,
    user_id: &str,
    client: NewClientBusiness,
) -> Result<ClientBusiness, sqlx::Error> {
    sqlx::query_as::<_, ClientBusiness>(
        r"
        insert into client_business
            (id, user_id, name, address, google_business_url, keyword, business_type,
             zip_code, city, state)
        values
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        returning *
        ",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(client.name)
    .bind(client.address)
    .bind(client.google_business_url)
    .bind(client.keyword)
    .bind(client.business_type)
    .bind(client.zip_code)
    .bind(client.city)
    .bind(client.state)
    .fetch_one(pool)
    .await
}

pub async fn get_client_business(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ClientBusiness>, sqlx::Error> {
    sqlx::query_as::<_, ClientBusiness>("select * from client_business where id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_client_businesses(
    pool: &PgPool,
    user_id: &str,
    include_inactive: bool,
) -> Result<Vec<ClientBusiness>, sqlx::Error> {
    sqlx::query_as::<_, ClientBusiness>(
        r"
        select
            *
        from
            client_business
        where
            user_id = $1 and
            (is_active or $2)
        order by created_at desc
        ",
    )
    .bind(user_id)
    .bind(include_inactive)
    .fetch_all(pool)
    .await
}

pub async fn update_client_business(
    pool: &PgPool,
    client: &ClientBusiness,
) -> Result<ClientBusiness, sqlx::Error> {
    sqlx::query_as::<_, ClientBusiness>(
        r"
        update client_business set
            name = $2,
            address = $3,
            google_business_url = $4,
            keyword = $5,
            business_type = $6,
            zip_code = $7,
            city = $8,
            state = $9,
            is_active = $10,
            updated_at = now()
        where
            id = $1
        returning *
        ",
    )
    .bind(client.id)
    .bind(&client.name)
    .bind(&client.address)
    .bind(&client.google_business_url)
    .bind(&client.keyword)
    .bind(client.business_type)
    .bind(&client.zip_code)
    .bind(&client.city)
    .bind(&client.state)
    .bind(client.is_active)
    .fetch_one(pool)
    .await
}
