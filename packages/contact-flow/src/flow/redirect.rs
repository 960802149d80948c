//! Redirect target assembly for the "contact verified" hand-off.

use url::form_urlencoded;

/// Fixed path the caller navigates the whole document to after verification.
pub const CONTACT_VERIFIED_PATH: &str = "/v1/sso/contact/verified";

/// Build the full redirect target from the route's existing query parameters
/// and the query produced by the verification outcome.
///
/// Merge rules: route parameters keep their position, new keys win on
/// conflict, remaining new keys are appended. Keys with an empty value are
/// omitted entirely. The result is percent-encoded.
pub fn verified_redirect(
    route_query: &[(String, String)],
    new_query: &[(String, String)],
) -> String {
    let mut merged: Vec<(String, String)> = Vec::new();
    for (key, value) in route_query {
        let value = new_query
            .iter()
            .find(|(new_key, _)| new_key == key)
            .map(|(_, new_value)| new_value)
            .unwrap_or(value);
        merged.push((key.clone(), value.clone()));
    }
    for (key, value) in new_query {
        if !merged.iter().any(|(merged_key, _)| merged_key == key) {
            merged.push((key.clone(), value.clone()));
        }
    }
    merged.retain(|(_, value)| !value.is_empty());

    if merged.is_empty() {
        return CONTACT_VERIFIED_PATH.to_string();
    }

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(merged.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();
    format!("{}?{}", CONTACT_VERIFIED_PATH, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn new_keys_win_on_conflict() {
        let url = verified_redirect(&pairs(&[("a", "1")]), &pairs(&[("a", "2"), ("b", "3")]));
        assert_eq!(url, "/v1/sso/contact/verified?a=2&b=3");
    }

    #[test]
    fn route_parameters_are_carried_through() {
        let url = verified_redirect(
            &pairs(&[("sessionId", "abc"), ("client", "portal")]),
            &pairs(&[("userId", "42")]),
        );
        assert_eq!(
            url,
            "/v1/sso/contact/verified?sessionId=abc&client=portal&userId=42"
        );
    }

    #[test]
    fn empty_values_are_dropped_entirely() {
        let url = verified_redirect(
            &pairs(&[("keep", "x"), ("drop", "")]),
            &pairs(&[("value", "")]),
        );
        assert_eq!(url, "/v1/sso/contact/verified?keep=x");
    }

    #[test]
    fn values_are_percent_encoded() {
        let url = verified_redirect(&[], &pairs(&[("value", "user@example.com")]));
        assert_eq!(url, "/v1/sso/contact/verified?value=user%40example.com");
    }

    #[test]
    fn no_query_separator_without_parameters() {
        assert_eq!(verified_redirect(&[], &[]), "/v1/sso/contact/verified");
    }
}
