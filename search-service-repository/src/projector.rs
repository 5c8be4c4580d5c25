//! Shapes parsed search responses into result envelopes.

use std::time::Duration;

use search_service_shared::{Category, ResultEnvelope};

use crate::errors::SearchError;
use crate::response::{AggregationBucket, SearchResponse};

/// Converts engine responses into the uniform [`ResultEnvelope`].
pub struct ResultProjector;

impl ResultProjector {
    /// Project a search response.
    ///
    /// `group_name` selects the aggregation flattened into `categories`. A
    /// blank name leaves `categories` empty even if the response carries
    /// aggregations. Only the selected aggregation is read, so other
    /// aggregations in the response may have any shape.
    ///
    /// # Errors
    ///
    /// * `SearchError::AggregationNotFound` - If `group_name` is not blank and
    ///   the response has no aggregation of that name
    /// * `SearchError::ParseError` - If the selected aggregation has malformed
    ///   buckets
    pub fn project<T>(
        response: SearchResponse<T>,
        group_name: &str,
    ) -> Result<ResultEnvelope<T>, SearchError> {
        let SearchResponse {
            total,
            took_ms,
            documents,
            mut aggregations,
            ..
        } = response;

        let categories = if is_blank(group_name) {
            None
        } else {
            let aggregation = aggregations
                .remove(group_name)
                .ok_or_else(|| SearchError::AggregationNotFound(group_name.to_string()))?;
            Some(
                AggregationBucket::from_aggregation(&aggregation)?
                    .into_iter()
                    .map(|bucket| Category::new(bucket.key, bucket.doc_count))
                    .collect(),
            )
        };

        Ok(ResultEnvelope {
            total_count: total,
            data: if documents.is_empty() {
                None
            } else {
                Some(documents)
            },
            elapsed: Duration::from_millis(took_ms),
            categories,
        })
    }

    /// Collect the option texts of the suggester `suggestion_name`.
    ///
    /// Options are flattened across entries in response order. A response
    /// without any suggestions yields an empty list.
    ///
    /// # Errors
    ///
    /// * `SearchError::SuggesterNotFound` - If the response has suggestions but
    ///   none under `suggestion_name`
    pub fn suggestions<T>(
        response: &SearchResponse<T>,
        suggestion_name: &str,
    ) -> Result<Vec<String>, SearchError> {
        if response.suggestions.is_empty() {
            return Ok(Vec::new());
        }

        let entries = response
            .suggestions
            .get(suggestion_name)
            .ok_or_else(|| SearchError::SuggesterNotFound(suggestion_name.to_string()))?;

        Ok(entries
            .iter()
            .flat_map(|entry| entry.options.iter())
            .map(|option| option.text.clone())
            .collect())
    }
}

fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}
