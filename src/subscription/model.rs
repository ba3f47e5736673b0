/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 9/1/26
******************************************************************************/

//! Subscription wire types and batching.
//!
//! A streaming session subscribes to the cross-product of a product list and
//! a term list. The protocol caps how many (product, term) pairs fit in one
//! `SUBSCRIBE` message, so the full set is partitioned into ordered batches
//! before anything is sent.

use serde::{Deserialize, Serialize};

use crate::utils::SonasError;

/// Maximum number of (product, term) pairs one `SUBSCRIBE` message may carry.
///
/// Protocol policy constant; [`crate::client::ClientConfig`] uses it as the
/// default batch bound.
pub const MAX_SUBSCRIPTIONS_PER_MESSAGE: usize = 1000;

/// A single (product, term) subscription entry.
///
/// Immutable once constructed; serializes as
/// `{"product": "...", "term": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Product identifier, e.g. `"BS"`.
    pub product: String,
    /// Term identifier, e.g. `"Nov-24"`.
    pub term: String,
}

impl Subscription {
    /// Creates a new subscription entry.
    pub fn new(product: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            term: term.into(),
        }
    }
}

/// Action discriminant carried by outbound stream messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamAction {
    /// Subscribe to the entries carried alongside the action.
    Subscribe,
}

/// One outbound `SUBSCRIBE` message.
///
/// Serializes as
/// `{"action":"SUBSCRIBE","subscriptions":[{"product":...,"term":...},...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeCommand {
    /// Always [`StreamAction::Subscribe`].
    pub action: StreamAction,
    /// The batch of entries this message subscribes to.
    pub subscriptions: Vec<Subscription>,
}

impl SubscribeCommand {
    /// Wraps one batch of subscription entries into a `SUBSCRIBE` message.
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self {
            action: StreamAction::Subscribe,
            subscriptions,
        }
    }
}

/// Builds the ordered subscription batches for a session.
///
/// The full subscription set is the cross-product of `products` and `terms`
/// in product-major order (products outer, terms inner), partitioned into
/// consecutive chunks of at most `max_per_batch` entries. Concatenating the
/// returned batches reproduces the cross-product exactly: no duplicates, no
/// omissions, original relative order.
///
/// An empty `products` or `terms` yields zero batches; callers should treat
/// that as "nothing to subscribe", not as an error.
///
/// # Errors
///
/// Returns [`SonasError::InvalidConfiguration`] if `max_per_batch` is zero.
pub fn build_batches<P, T>(
    products: &[P],
    terms: &[T],
    max_per_batch: usize,
) -> Result<Vec<Vec<Subscription>>, SonasError>
where
    P: AsRef<str>,
    T: AsRef<str>,
{
    if max_per_batch == 0 {
        return Err(SonasError::InvalidConfiguration(
            "max_per_batch must be at least 1".to_string(),
        ));
    }

    let mut pairs = Vec::with_capacity(products.len() * terms.len());
    for product in products {
        for term in terms {
            pairs.push(Subscription::new(product.as_ref(), term.as_ref()));
        }
    }

    Ok(pairs
        .chunks(max_per_batch)
        .map(<[Subscription]>::to_vec)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(product: &str, term: &str) -> Subscription {
        Subscription::new(product, term)
    }

    #[test]
    fn test_single_batch_product_major_order() {
        let batches = build_batches(&["BS"], &["Nov-24", "Dec-24"], 1000).unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0],
            vec![pair("BS", "Nov-24"), pair("BS", "Dec-24")]
        );
    }

    #[test]
    fn test_one_entry_per_batch() {
        let batches = build_batches(&["A", "B"], &["T1"], 1).unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0], vec![pair("A", "T1")]);
        assert_eq!(batches[1], vec![pair("B", "T1")]);
    }

    #[test]
    fn test_batch_count_and_sizes() {
        // 3 products x 5 terms = 15 pairs, chunked by 4 -> ceil(15/4) = 4 batches.
        let products = ["P1", "P2", "P3"];
        let terms = ["T1", "T2", "T3", "T4", "T5"];
        let batches = build_batches(&products, &terms, 4).unwrap();

        assert_eq!(batches.len(), 4);
        for batch in &batches[..3] {
            assert_eq!(batch.len(), 4);
        }
        assert_eq!(batches[3].len(), 3);
    }

    #[test]
    fn test_concatenation_reproduces_cross_product() {
        let products = ["P1", "P2", "P3"];
        let terms = ["T1", "T2", "T3", "T4", "T5"];
        let batches = build_batches(&products, &terms, 4).unwrap();

        let mut expected = Vec::new();
        for product in &products {
            for term in &terms {
                expected.push(pair(product, term));
            }
        }

        let flattened: Vec<Subscription> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_empty_products_yields_no_batches() {
        let batches = build_batches::<&str, _>(&[], &["T1", "T2"], 10).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_empty_terms_yields_no_batches() {
        let batches = build_batches::<_, &str>(&["P1"], &[], 10).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_zero_max_per_batch_is_rejected() {
        let result = build_batches(&["P1"], &["T1"], 0);
        assert!(matches!(
            result,
            Err(SonasError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_subscribe_command_wire_format() {
        let command = SubscribeCommand::new(vec![pair("BS", "Nov-24"), pair("BS", "Dec-24")]);
        let json = serde_json::to_value(&command).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "action": "SUBSCRIBE",
                "subscriptions": [
                    {"product": "BS", "term": "Nov-24"},
                    {"product": "BS", "term": "Dec-24"},
                ],
            })
        );
    }
}
