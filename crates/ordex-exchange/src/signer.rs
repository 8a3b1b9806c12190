//! Canonical request construction and HMAC-SHA256 signing.
//!
//! Signed endpoints take the request parameters serialized in a fixed field
//! order, with the drift-compensated timestamp and the receive window
//! appended, and an HMAC-SHA256 hex digest of that exact string computed
//! with the API secret. Signing is pure: no I/O, deterministic for
//! identical inputs.

use crate::error::ExchangeError;
use hmac::{Hmac, Mac};
use ordex_core::OrderIntent;
use rust_decimal::Decimal;
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// API credentials. The secret is wiped from memory on drop.
pub struct Credentials {
    api_key: String,
    api_secret: Zeroizing<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Serializes parameters in the given order as `k=v&k=v`.
///
/// The order endpoint mandates the field order; callers build the slice via
/// [`order_params`] or [`position_risk_params`] and must not reorder it.
pub fn canonical_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn decimal_param(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Builds the ordered parameter list for the place-order endpoint.
///
/// Optional fields appear only when the intent carries them, in their fixed
/// positions: `symbol, side, type, quantity, [price], [stopPrice],
/// [timeInForce], newClientOrderId, recvWindow, timestamp`.
pub fn order_params(
    intent: &OrderIntent,
    timestamp_ms: u64,
    recv_window_ms: u64,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", intent.symbol.clone()),
        ("side", intent.side.to_string()),
        ("type", intent.order_type.wire_name().to_string()),
        ("quantity", decimal_param(intent.quantity)),
    ];

    if let Some(price) = intent.price {
        params.push(("price", decimal_param(price)));
    }
    if let Some(stop_price) = intent.stop_price {
        params.push(("stopPrice", decimal_param(stop_price)));
    }
    if let Some(tif) = intent.time_in_force {
        params.push(("timeInForce", tif.to_string()));
    }

    params.push(("newClientOrderId", intent.client_order_id.to_string()));
    params.push(("recvWindow", recv_window_ms.to_string()));
    params.push(("timestamp", timestamp_ms.to_string()));

    params
}

/// Builds the ordered parameter list for the position-risk endpoint.
pub fn position_risk_params(
    symbol: &str,
    timestamp_ms: u64,
    recv_window_ms: u64,
) -> Vec<(&'static str, String)> {
    vec![
        ("symbol", symbol.to_string()),
        ("recvWindow", recv_window_ms.to_string()),
        ("timestamp", timestamp_ms.to_string()),
    ]
}

/// Computes request signatures with the operator's secret.
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Signs the canonical query string.
    ///
    /// # Errors
    /// `ExchangeError::Config` if the secret is empty.
    pub fn sign(&self, query: &str) -> Result<String, ExchangeError> {
        let secret = self.credentials.secret();
        if secret.is_empty() {
            return Err(ExchangeError::Config("API secret is empty".to_string()));
        }

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| ExchangeError::Config(e.to_string()))?;
        mac.update(query.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordex_core::{OrderSide, TimeInForce};
    use rust_decimal_macros::dec;

    fn signer(secret: &str) -> RequestSigner {
        RequestSigner::new(Credentials::new("key", secret))
    }

    /// Signature example published in the exchange's API documentation.
    #[test]
    fn test_documented_signature_vector() {
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = concat!(
            "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1",
            "&recvWindow=5000&timestamp=1499827319559"
        );

        let sig = signer(secret).sign(query).unwrap();
        assert_eq!(
            sig,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let s = signer("secret");
        let query = "symbol=BTCUSDT&side=BUY&type=MARKET&quantity=0.001&timestamp=1700000000000";
        assert_eq!(s.sign(query).unwrap(), s.sign(query).unwrap());
    }

    #[test]
    fn test_any_field_change_changes_signature() {
        let s = signer("secret");
        let base = "symbol=BTCUSDT&side=BUY&quantity=0.001&timestamp=1700000000000";
        let sig = s.sign(base).unwrap();

        for variant in [
            "symbol=ETHUSDT&side=BUY&quantity=0.001&timestamp=1700000000000",
            "symbol=BTCUSDT&side=SELL&quantity=0.001&timestamp=1700000000000",
            "symbol=BTCUSDT&side=BUY&quantity=0.002&timestamp=1700000000000",
            "symbol=BTCUSDT&side=BUY&quantity=0.001&timestamp=1700000000001",
        ] {
            assert_ne!(sig, s.sign(variant).unwrap(), "variant: {variant}");
        }
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let err = signer("").sign("symbol=BTCUSDT").unwrap_err();
        assert!(matches!(err, ExchangeError::Config(_)));
    }

    #[test]
    fn test_order_params_field_order() {
        let intent = OrderIntent::stop_limit(
            "BTCUSDT",
            OrderSide::Buy,
            dec!(0.001),
            dec!(109000),
            dec!(108500),
        );
        let params = order_params(&intent, 1_700_000_000_000, 5000);
        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            [
                "symbol",
                "side",
                "type",
                "quantity",
                "price",
                "stopPrice",
                "timeInForce",
                "newClientOrderId",
                "recvWindow",
                "timestamp",
            ]
        );

        let query = canonical_query(&params);
        assert!(query.starts_with("symbol=BTCUSDT&side=BUY&type=STOP&quantity=0.001"));
        assert!(query.contains("&price=108500&stopPrice=109000&timeInForce=GTC&"));
        assert!(query.ends_with("&recvWindow=5000&timestamp=1700000000000"));
    }

    #[test]
    fn test_market_params_omit_price_fields() {
        let intent = OrderIntent::market("BTCUSDT", OrderSide::Sell, dec!(1));
        let query = canonical_query(&order_params(&intent, 1, 5000));
        assert!(!query.contains("price="));
        assert!(!query.contains("stopPrice="));
        assert!(!query.contains("timeInForce="));
    }

    #[test]
    fn test_decimal_params_drop_trailing_zeros() {
        assert_eq!(decimal_param(dec!(0.5000)), "0.5");
        assert_eq!(decimal_param(dec!(109000)), "109000");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("key", "very-secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
