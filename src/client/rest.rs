/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/1/26
******************************************************************************/

//! REST endpoints: data permissions, price snapshots, historical prices.
//!
//! These are stateless request/response calls sharing the bearer token with
//! the streaming session. Every successful response arrives wrapped in a
//! `{"data": ...}` envelope.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::implementation::SonasClient;
use crate::client::model::{ApiEnvelope, DataPermissions};
use crate::utils::SonasError;

impl SonasClient {
    /// Fetches the products and terms this account may access.
    ///
    /// # Errors
    ///
    /// Returns the classified error for the response status, or
    /// [`SonasError::AuthenticationFailed`] when the lazy login fails.
    pub async fn get_data_permissions(&self) -> Result<DataPermissions, SonasError> {
        let response = self
            .http()
            .get(self.endpoint("data-permissions"))
            .header(AUTHORIZATION, self.credentials().bearer_header().await?)
            .send()
            .await?;
        read_envelope(response).await
    }

    /// Fetches the current price snapshot, optionally filtered by products
    /// and terms.
    ///
    /// Empty slices mean "no filter" for that dimension.
    ///
    /// # Errors
    ///
    /// Returns the classified error for the response status, or
    /// [`SonasError::AuthenticationFailed`] when the lazy login fails.
    pub async fn get_snapshot<P, T>(
        &self,
        products: &[P],
        terms: &[T],
    ) -> Result<Value, SonasError>
    where
        P: AsRef<str>,
        T: AsRef<str>,
    {
        let mut query: Vec<(&str, &str)> = Vec::new();
        for product in products {
            query.push(("products", product.as_ref()));
        }
        for term in terms {
            query.push(("terms", term.as_ref()));
        }

        let response = self
            .http()
            .get(self.endpoint("prices/snapshot"))
            .query(&query)
            .header(AUTHORIZATION, self.credentials().bearer_header().await?)
            .send()
            .await?;
        read_envelope(response).await
    }

    /// Fetches historical prices for one product and term over a time range.
    ///
    /// # Errors
    ///
    /// Returns the classified error for the response status, or
    /// [`SonasError::AuthenticationFailed`] when the lazy login fails.
    pub async fn get_historical(
        &self,
        product: &str,
        term: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Value, SonasError> {
        let start = start.to_rfc3339();
        let end = end.to_rfc3339();
        let response = self
            .http()
            .get(self.endpoint("prices/historical"))
            .query(&[
                ("product", product),
                ("term", term),
                ("start", start.as_str()),
                ("end", end.as_str()),
            ])
            .header(AUTHORIZATION, self.credentials().bearer_header().await?)
            .send()
            .await?;
        read_envelope(response).await
    }

    /// Uploads historical prices for one product and term (admin only).
    ///
    /// # Errors
    ///
    /// Returns the classified error for the response status (403 for
    /// non-admin accounts), or [`SonasError::AuthenticationFailed`] when the
    /// lazy login fails.
    pub async fn put_historical(
        &self,
        product: &str,
        term: &str,
        prices: &Value,
    ) -> Result<Value, SonasError> {
        let body = serde_json::json!({
            "product": product,
            "term": term,
            "prices": prices,
        });

        let response = self
            .http()
            .put(self.endpoint("prices/historical"))
            .header(AUTHORIZATION, self.credentials().bearer_header().await?)
            .json(&body)
            .send()
            .await?;
        read_envelope(response).await
    }
}

/// Reads a REST response, unwrapping the `{"data": ...}` envelope on success
/// and classifying the status on failure.
async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SonasError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(if status == StatusCode::UNAUTHORIZED {
            SonasError::Unauthorized { reason: body }
        } else if status == StatusCode::FORBIDDEN {
            SonasError::Forbidden { reason: body }
        } else {
            SonasError::Api {
                status: status.as_u16(),
                body,
            }
        });
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
    Ok(envelope.data)
}
