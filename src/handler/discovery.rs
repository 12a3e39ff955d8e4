use std::collections::HashMap;

use tracing::info;

use crate::{error::Error, provider::HTTP};

pub const REL_HUB: &str = "hub";
pub const REL_SELF: &str = "self";

/// Hub and canonical topic advertised by a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubLinks {
    pub hub: String,
    pub self_url: String,
}

impl HubLinks {
    pub fn from_links(
        resource_url: &str,
        links: &HashMap<String, String>,
    ) -> Result<HubLinks, Error> {
        match (links.get(REL_HUB), links.get(REL_SELF)) {
            (Some(hub), Some(self_url)) => Ok(HubLinks {
                hub: hub.to_owned(),
                self_url: self_url.to_owned(),
            }),
            _ => Err(Error::Discovery(resource_url.to_owned())),
        }
    }
}

pub async fn discover(
    http: &HTTP,
    resource_url: &str,
) -> Result<HubLinks, Error> {
    if resource_url.trim().is_empty() {
        return Err(Error::MissingParams(String::from("resource url")));
    }

    let headers = http.get_link_headers(resource_url).await?;
    if headers.is_empty() {
        return Err(Error::Discovery(resource_url.to_owned()));
    }

    let links = parse_link_headers(headers.as_slice());
    let links = HubLinks::from_links(resource_url, &links)?;
    info!(
        "Discovered hub {} for {} (self {})",
        links.hub, resource_url, links.self_url
    );

    Ok(links)
}

/// Folds `Link` header values into a relation -> URL map. A later entry for
/// the same relation replaces an earlier one.
pub fn parse_link_headers<S: AsRef<str>>(
    values: &[S],
) -> HashMap<String, String> {
    let mut links = HashMap::new();

    for value in values {
        for entry in split_entries(value.as_ref()) {
            if let Some((url, rels)) = parse_entry(entry) {
                for rel in rels {
                    links.insert(rel, url.to_owned());
                }
            }
        }
    }

    links
}

// Commas inside `<...>` or a quoted string do not separate entries.
fn split_entries(value: &str) -> Vec<&str> {
    let mut entries = vec![];
    let mut in_url = false;
    let mut in_quote = false;
    let mut start = 0;

    for (index, c) in value.char_indices() {
        match c {
            '<' if !in_quote => in_url = true,
            '>' if !in_quote => in_url = false,
            '"' if !in_url => in_quote = !in_quote,
            ',' if !in_url && !in_quote => {
                entries.push(&value[start..index]);
                start = index + 1;
            },
            _ => {},
        }
    }
    entries.push(&value[start..]);

    entries
}

fn parse_entry(entry: &str) -> Option<(&str, Vec<String>)> {
    let entry = entry.trim();
    let rest = entry.strip_prefix('<')?;
    let end = rest.find('>')?;
    let url = rest[..end].trim();
    if url.is_empty() {
        return None;
    }

    let rels = rest[end + 1..]
        .split(';')
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
        .map(|(_, value)| {
            value
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .map(str::to_ascii_lowercase)
                .collect::<Vec<String>>()
        })?;

    Some((url, rels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_single_header() {
        let links = parse_link_headers(&[
            r#"<http://a/>; rel="hub", <http://b/>; rel="self""#,
        ]);

        assert_eq!(links.len(), 2);
        assert_eq!(links.get("hub").map(String::as_str), Some("http://a/"));
        assert_eq!(links.get("self").map(String::as_str), Some("http://b/"));
    }

    #[test]
    fn test_parse_multiple_headers_contribute() {
        let links = parse_link_headers(&[
            r#"<http://a/>; rel="hub""#,
            r#"<http://b/>; rel="self", <http://c/>; rel="alternate""#,
        ]);

        assert_eq!(links.get("hub").map(String::as_str), Some("http://a/"));
        assert_eq!(links.get("self").map(String::as_str), Some("http://b/"));
        assert_eq!(
            links.get("alternate").map(String::as_str),
            Some("http://c/")
        );
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let links = parse_link_headers(&[
            r#"<http://first/>; rel="hub""#,
            r#"<http://second/>; rel="hub""#,
        ]);
        assert_eq!(
            links.get("hub").map(String::as_str),
            Some("http://second/")
        );
    }

    #[test]
    fn test_parse_tolerates_params_and_separators() {
        let links = parse_link_headers(&[
            r#"<http://h/x,y>;type="text/html";rel=hub , <http://s/>; title="a, b"; REL="self alternate""#,
        ]);

        assert_eq!(
            links.get("hub").map(String::as_str),
            Some("http://h/x,y")
        );
        assert_eq!(links.get("self").map(String::as_str), Some("http://s/"));
        assert_eq!(
            links.get("alternate").map(String::as_str),
            Some("http://s/")
        );
    }

    #[test]
    fn test_parse_ignores_garbage() {
        let links = parse_link_headers(&["", "garbage", r#"<>; rel="hub""#]);
        assert!(links.is_empty());
    }

    #[test]
    fn test_missing_relation_is_discovery_error() {
        let links = parse_link_headers(&[r#"<http://a/>; rel="hub""#]);
        let result = HubLinks::from_links("http://res/", &links);

        assert!(matches!(result, Err(Error::Discovery(url)) if url == "http://res/"));
    }

    #[tokio::test]
    async fn test_discover_reads_head_response() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("Link", r#"<http://hub/>; rel="hub""#)
                    .append_header(
                        "Link",
                        r#"<http://res/canonical>; rel="self""#,
                    ),
            )
            .mount(&server)
            .await;

        let http = HTTP::new(test_config("http://me/")).unwrap();
        let links = discover(&http, &format!("{}/feed", server.uri()))
            .await
            .unwrap();

        assert_eq!(links.hub, "http://hub/");
        assert_eq!(links.self_url, "http://res/canonical");
    }

    #[tokio::test]
    async fn test_discover_without_link_header_fails() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let http = HTTP::new(test_config("http://me/")).unwrap();
        let result = discover(&http, &format!("{}/plain", server.uri())).await;

        assert!(matches!(result, Err(Error::Discovery(_))));
    }

    #[tokio::test]
    async fn test_discover_rejects_empty_url() {
        let http = HTTP::new(test_config("http://me/")).unwrap();
        let result = discover(&http, "  ").await;

        assert!(matches!(result, Err(Error::MissingParams(_))));
    }
}
