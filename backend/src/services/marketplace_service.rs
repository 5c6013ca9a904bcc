use axum::extract::{State, Json, Extension, Path};
use uuid::Uuid;
use validator::Validate;
use tracing::info;
use shared::marketplace::*;
use crate::AppState;
use crate::auth::middleware::UserId;
use crate::error::ApiError;
use super::{ApiResponse, fetch_username, record_transaction};

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    seller_id: Uuid,
    seller_username: String,
    tiv_amount: i64,
    price_usd_cents: i64,
    status: String,
    created_at: String,
}

impl From<ListingRow> for TivListing {
    fn from(row: ListingRow) -> Self {
        Self {
            id: row.id.to_string(),
            seller_id: row.seller_id.to_string(),
            seller_username: row.seller_username,
            tiv_amount: row.tiv_amount,
            price_usd_cents: row.price_usd_cents,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

pub async fn get_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<TivListing>>, ApiError> {
    let rows = sqlx::query_as::<_, ListingRow>(
        r#"
        SELECT l.id, l.seller_id, u.username AS seller_username, l.tiv_amount,
               l.price_usd_cents, l.status, l.created_at::text AS created_at
        FROM tiv_listings l
        JOIN users u ON u.id = l.seller_id
        WHERE l.status = 'active'
        ORDER BY l.created_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(rows.into_iter().map(TivListing::from).collect()))
}

pub async fn create_listing(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<CreateListingRequest>,
) -> Result<Json<ApiResponse<TivListing>>, ApiError> {
    payload.validate()?;

    let mut tx = state.pool.begin().await?;

    #[derive(sqlx::FromRow)]
    struct Seller {
        username: String,
        tiv_balance: i64,
    }

    let seller = sqlx::query_as::<_, Seller>(
        "SELECT username, tiv_balance FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id.0)
    .fetch_one(&mut *tx)
    .await?;

    let escrow_total = payload.tiv_amount + LISTING_FEE_TIV;
    if seller.tiv_balance < escrow_total {
        info!("❌ Listing failed: {} has {} TIV, needs {} (amount + {} TIV fee)",
              seller.username, seller.tiv_balance, escrow_total, LISTING_FEE_TIV);
        return Ok(Json(ApiResponse::refused(format!(
            "Insufficient TIV: listing {} TIV requires a {} TIV fee",
            payload.tiv_amount, LISTING_FEE_TIV
        ))));
    }

    // Listed TIV leaves the balance until the listing sells or is cancelled.
    sqlx::query("UPDATE users SET tiv_balance = tiv_balance - $1 WHERE id = $2")
        .bind(escrow_total)
        .bind(user_id.0)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query_as::<_, ListingRow>(
        r#"
        INSERT INTO tiv_listings (seller_id, tiv_amount, price_usd_cents)
        VALUES ($1, $2, $3)
        RETURNING id, seller_id, $4 AS seller_username, tiv_amount,
                  price_usd_cents, status, created_at::text AS created_at
        "#,
    )
    .bind(user_id.0)
    .bind(payload.tiv_amount)
    .bind(payload.price_usd_cents)
    .bind(&seller.username)
    .fetch_one(&mut *tx)
    .await?;

    record_transaction(&mut tx, user_id.0, -payload.tiv_amount, "tiv", "listing_escrow").await?;
    record_transaction(&mut tx, user_id.0, -LISTING_FEE_TIV, "tiv", "listing_fee").await?;

    tx.commit().await?;

    info!("📋 {} listed {} TIV at {} cents", seller.username, payload.tiv_amount, payload.price_usd_cents);

    Ok(Json(ApiResponse::ok(TivListing::from(row))))
}

pub async fn buy_listing(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<BuyListingResponse>, ApiError> {
    let refused = |message: &str| {
        Json(BuyListingResponse {
            success: false,
            tiv_amount: 0,
            new_tiv_balance: 0,
            new_usd_cents: 0,
            message: Some(message.to_string()),
        })
    };

    let mut tx = state.pool.begin().await?;

    #[derive(sqlx::FromRow)]
    struct Lot {
        seller_id: Uuid,
        tiv_amount: i64,
        price_usd_cents: i64,
        status: String,
    }

    let lot = sqlx::query_as::<_, Lot>(
        "SELECT seller_id, tiv_amount, price_usd_cents, status FROM tiv_listings WHERE id = $1 FOR UPDATE",
    )
    .bind(listing_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("Listing not found"))?;

    if lot.status != "active" {
        return Ok(refused("This listing is no longer available"));
    }
    if lot.seller_id == user_id.0 {
        return Ok(refused("You cannot buy your own listing"));
    }

    #[derive(sqlx::FromRow)]
    struct Buyer {
        username: String,
        tiv_balance: i64,
        usd_cents: i64,
    }

    let buyer = sqlx::query_as::<_, Buyer>(
        "SELECT username, tiv_balance, usd_cents FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id.0)
    .fetch_one(&mut *tx)
    .await?;

    if buyer.usd_cents < lot.price_usd_cents {
        return Ok(refused("Insufficient USD balance"));
    }

    let new_tiv_balance = buyer.tiv_balance + lot.tiv_amount;
    let new_usd_cents = buyer.usd_cents - lot.price_usd_cents;

    sqlx::query("UPDATE users SET tiv_balance = $1, usd_cents = $2 WHERE id = $3")
        .bind(new_tiv_balance)
        .bind(new_usd_cents)
        .bind(user_id.0)
        .execute(&mut *tx)
        .await?;

    // Escrowed TIV goes to the buyer; the sale price goes to the seller.
    sqlx::query("UPDATE users SET usd_cents = usd_cents + $1 WHERE id = $2")
        .bind(lot.price_usd_cents)
        .bind(lot.seller_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE tiv_listings SET status = 'sold' WHERE id = $1")
        .bind(listing_id)
        .execute(&mut *tx)
        .await?;

    record_transaction(&mut tx, user_id.0, lot.tiv_amount, "tiv", "marketplace_purchase").await?;
    record_transaction(&mut tx, user_id.0, -lot.price_usd_cents, "usd", "marketplace_purchase").await?;
    record_transaction(&mut tx, lot.seller_id, lot.price_usd_cents, "usd", "marketplace_sale").await?;

    tx.commit().await?;

    let seller_name = fetch_username(&state.pool, lot.seller_id).await.unwrap_or_default();
    info!("💱 {} bought {} TIV from {} for {} cents",
          buyer.username, lot.tiv_amount, seller_name, lot.price_usd_cents);

    Ok(Json(BuyListingResponse {
        success: true,
        tiv_amount: lot.tiv_amount,
        new_tiv_balance,
        new_usd_cents,
        message: Some(format!("Bought {} TIV", lot.tiv_amount)),
    }))
}

pub async fn cancel_listing(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TivListing>>, ApiError> {
    let mut tx = state.pool.begin().await?;

    let row = sqlx::query_as::<_, ListingRow>(
        r#"
        UPDATE tiv_listings l
        SET status = 'cancelled'
        FROM users u
        WHERE l.id = $1 AND l.seller_id = $2 AND l.status = 'active' AND u.id = l.seller_id
        RETURNING l.id, l.seller_id, u.username AS seller_username, l.tiv_amount,
                  l.price_usd_cents, l.status, l.created_at::text AS created_at
        "#,
    )
    .bind(listing_id)
    .bind(user_id.0)
    .fetch_optional(&mut *tx)
    .await?;

    let row = match row {
        Some(row) => row,
        None => return Ok(Json(ApiResponse::refused("Listing not found or not cancellable"))),
    };

    // Escrow returns; the listing fee does not.
    sqlx::query("UPDATE users SET tiv_balance = tiv_balance + $1 WHERE id = $2")
        .bind(row.tiv_amount)
        .bind(user_id.0)
        .execute(&mut *tx)
        .await?;

    record_transaction(&mut tx, user_id.0, row.tiv_amount, "tiv", "listing_refund").await?;

    tx.commit().await?;

    info!("🗑️ {} cancelled listing {} ({} TIV returned)",
          row.seller_username, listing_id, row.tiv_amount);

    Ok(Json(ApiResponse::ok(TivListing::from(row))))
}

pub async fn convert_tiv_to_usd(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    payload.validate()?;

    let mut tx = state.pool.begin().await?;

    #[derive(sqlx::FromRow)]
    struct Account {
        username: String,
        tiv_balance: i64,
        usd_cents: i64,
        verification_status: String,
    }

    let account = sqlx::query_as::<_, Account>(
        "SELECT username, tiv_balance, usd_cents, verification_status FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id.0)
    .fetch_one(&mut *tx)
    .await?;

    if account.verification_status != "approved" {
        return Err(ApiError::Forbidden("Identity verification is required before converting TIV"));
    }

    if account.tiv_balance < payload.tiv_amount {
        return Ok(Json(ConvertResponse {
            success: false,
            usd_credited: 0,
            new_tiv_balance: account.tiv_balance,
            new_usd_cents: account.usd_cents,
            message: Some("Insufficient TIV balance".to_string()),
        }));
    }

    let usd_credited = payload.tiv_amount * TIV_CENT_RATE;
    let new_tiv_balance = account.tiv_balance - payload.tiv_amount;
    let new_usd_cents = account.usd_cents + usd_credited;

    sqlx::query("UPDATE users SET tiv_balance = $1, usd_cents = $2 WHERE id = $3")
        .bind(new_tiv_balance)
        .bind(new_usd_cents)
        .bind(user_id.0)
        .execute(&mut *tx)
        .await?;

    record_transaction(&mut tx, user_id.0, -payload.tiv_amount, "tiv", "conversion").await?;
    record_transaction(&mut tx, user_id.0, usd_credited, "usd", "conversion").await?;

    tx.commit().await?;

    info!("💵 {} converted {} TIV into {} cents", account.username, payload.tiv_amount, usd_credited);

    Ok(Json(ConvertResponse {
        success: true,
        usd_credited,
        new_tiv_balance,
        new_usd_cents,
        message: Some(format!("Converted {} TIV into ${:.2}", payload.tiv_amount, usd_credited as f64 / 100.0)),
    }))
}
