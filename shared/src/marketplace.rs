use serde::{Serialize, Deserialize};
use validator::Validate;

/// Flat fee charged when a listing is created, in TIV.
pub const LISTING_FEE_TIV: i64 = 5;

/// Smallest lot that can be listed.
pub const MIN_LISTING_TIV: i64 = 10;

/// Conversion rate: one TIV buys one US cent.
pub const TIV_CENT_RATE: i64 = 1;

/// Conversions below this are rejected to keep payout batches sane.
pub const MIN_CONVERT_TIV: i64 = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TivListing {
    pub id: String,
    pub seller_id: String,
    pub seller_username: String,
    pub tiv_amount: i64,
    pub price_usd_cents: i64,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(range(min = 10, message = "Listings must be at least 10 TIV"))]
    pub tiv_amount: i64,
    #[validate(range(min = 1, message = "Price must be at least 1 cent"))]
    pub price_usd_cents: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BuyListingResponse {
    pub success: bool,
    pub tiv_amount: i64,
    pub new_tiv_balance: i64,
    pub new_usd_cents: i64,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ConvertRequest {
    #[validate(range(min = 100, message = "Conversions must be at least 100 TIV"))]
    pub tiv_amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub usd_credited: i64,
    pub new_tiv_balance: i64,
    pub new_usd_cents: i64,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_validation_bounds() {
        let ok = CreateListingRequest { tiv_amount: 10, price_usd_cents: 1 };
        assert!(ok.validate().is_ok());

        let dust = CreateListingRequest { tiv_amount: 9, price_usd_cents: 100 };
        assert!(dust.validate().is_err());

        let free = CreateListingRequest { tiv_amount: 50, price_usd_cents: 0 };
        assert!(free.validate().is_err());

        let negative = CreateListingRequest { tiv_amount: -20, price_usd_cents: 10 };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_convert_validation_bounds() {
        assert!(ConvertRequest { tiv_amount: 100 }.validate().is_ok());
        assert!(ConvertRequest { tiv_amount: 99 }.validate().is_err());
    }
}
