//! AirNow observation payload decoding

use aqi_core::{FetchError, FetchResult, ObservationRecord};

/// Longest payload prefix kept in a decode diagnostic
const SNIPPET_LIMIT: usize = 256;

/// Decode an AirNow `observation/zipCode/current` response body.
///
/// Unknown fields are ignored; missing or mistyped fields and hours outside
/// 0-23 yield [`FetchError::Decode`]. Source order is preserved.
pub fn decode_observations(body: &[u8]) -> FetchResult<Vec<ObservationRecord>> {
    let records: Vec<ObservationRecord> =
        serde_json::from_slice(body).map_err(|e| decode_error(e.to_string(), body))?;

    if let Some((idx, rec)) = records
        .iter()
        .enumerate()
        .find(|(_, rec)| rec.hour_observed > 23)
    {
        return Err(decode_error(
            format!(
                "record {}: HourObserved {} outside 0-23",
                idx, rec.hour_observed
            ),
            body,
        ));
    }

    Ok(records)
}

/// Encode records in the same shape AirNow serves them.
pub fn encode_observations(records: &[ObservationRecord]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(records)
}

fn decode_error(detail: String, body: &[u8]) -> FetchError {
    FetchError::Decode {
        detail,
        snippet: String::from_utf8_lossy(body)
            .chars()
            .take(SNIPPET_LIMIT)
            .collect(),
    }
}
