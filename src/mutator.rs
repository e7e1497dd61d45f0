// src/mutator.rs
//! Parameter extraction and request-variant construction.

use crate::types::{HttpMethod, Parameter, ParameterOrigin, ProbeRequest};
use url::Url;

/// How a payload is combined with the parameter's original value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionMode {
    /// original value + payload, so the payload lands in a live query context
    Append,
    /// payload replaces the value outright
    Replace,
}

/// Builds GET and POST probe variants of one target URL.
#[derive(Debug, Clone)]
pub struct ParameterMutator {
    target: Url,
    /// Query parameters grouped by name, in first-appearance order
    groups: Vec<(String, Vec<String>)>,
}

impl ParameterMutator {
    pub fn new(target: &Url) -> Self {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();

        for (name, value) in target.query_pairs() {
            // blank values are not injection points and are not re-emitted
            if value.is_empty() {
                continue;
            }
            match groups.iter().position(|(existing, _)| *existing == name) {
                Some(index) => groups[index].1.push(value.into_owned()),
                None => groups.push((name.into_owned(), vec![value.into_owned()])),
            }
        }

        Self {
            target: target.clone(),
            groups,
        }
    }

    /// Query-string parameters of `url`; empty when there is no query.
    pub fn extract(url: &Url) -> Vec<Parameter> {
        Self::new(url).parameters()
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        self.groups
            .iter()
            .map(|(name, values)| Parameter {
                name: name.clone(),
                // repeated names: only the first value is used
                original_value: values.first().cloned().unwrap_or_default(),
                origin: ParameterOrigin::QueryString,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Re-encode the full query with only `parameter` changed.
    pub fn get_variant(
        &self,
        parameter: &Parameter,
        payload: &str,
        mode: InjectionMode,
        follow_redirects: bool,
    ) -> ProbeRequest {
        let injected = match mode {
            InjectionMode::Append => format!("{}{}", parameter.original_value, payload),
            InjectionMode::Replace => payload.to_string(),
        };

        let mut pairs: Vec<(&str, &str)> = Vec::new();
        for (name, values) in &self.groups {
            if *name == parameter.name {
                pairs.push((name.as_str(), injected.as_str()));
            } else {
                pairs.extend(values.iter().map(|value| (name.as_str(), value.as_str())));
            }
        }

        let mut url = self.target.clone();
        url.query_pairs_mut().clear().extend_pairs(pairs);

        ProbeRequest {
            parameter: parameter.name.clone(),
            payload: payload.to_string(),
            method: HttpMethod::GET,
            url,
            form: None,
            follow_redirects,
        }
    }

    /// Target URL with the query string stripped.
    pub fn submission_endpoint(&self) -> Url {
        let mut endpoint = self.target.clone();
        endpoint.set_query(None);
        endpoint
    }

    /// POST body carrying only `parameter`, set to the raw payload.
    pub fn post_variant(
        &self,
        endpoint: &Url,
        parameter: &Parameter,
        payload: &str,
        follow_redirects: bool,
    ) -> ProbeRequest {
        ProbeRequest {
            parameter: parameter.name.clone(),
            payload: payload.to_string(),
            method: HttpMethod::POST,
            url: endpoint.clone(),
            form: Some(vec![(parameter.name.clone(), payload.to_string())]),
            follow_redirects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutator(url: &str) -> ParameterMutator {
        ParameterMutator::new(&Url::parse(url).unwrap())
    }

    fn param<'a>(params: &'a [Parameter], name: &str) -> &'a Parameter {
        params.iter().find(|p| p.name == name).unwrap()
    }

    #[test]
    fn test_extract_no_query() {
        assert!(ParameterMutator::extract(&Url::parse("http://example.com/page").unwrap()).is_empty());
        assert!(ParameterMutator::extract(&Url::parse("http://example.com/page?").unwrap()).is_empty());
    }

    #[test]
    fn test_extract_order_and_values() {
        let params = mutator("http://example.com/p?id=7&empty=&name=a+b&flag").parameters();
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(param(&params, "name").original_value, "a b");
        assert!(params.iter().all(|p| p.origin == ParameterOrigin::QueryString));
    }

    #[test]
    fn test_blank_only_query_has_no_parameters() {
        let m = mutator("http://example.com/p?debug=&flag");
        assert!(m.is_empty());
        assert!(m.parameters().is_empty());
    }

    #[test]
    fn test_blank_values_dropped_from_variant() {
        let m = mutator("http://example.com/p?id=1&debug=&tag=&tag=b");
        let params = m.parameters();
        assert_eq!(param(&params, "tag").original_value, "b");

        let request = m.get_variant(param(&params, "id"), "'", InjectionMode::Append, true);
        assert_eq!(request.url.as_str(), "http://example.com/p?id=1%27&tag=b");
    }

    #[test]
    fn test_get_variant_append_keeps_original_value() {
        let m = mutator("http://example.com/item.php?id=1&cat=books");
        let params = m.parameters();
        let request = m.get_variant(param(&params, "id"), "'", InjectionMode::Append, true);

        assert_eq!(request.method, HttpMethod::GET);
        assert_eq!(request.url.as_str(), "http://example.com/item.php?id=1%27&cat=books");
        assert_eq!(request.payload, "'");
        assert!(request.follow_redirects);
        assert!(request.form.is_none());
    }

    #[test]
    fn test_get_variant_replace_drops_original_value() {
        let m = mutator("http://example.com/search?q=shoes&page=2");
        let params = m.parameters();
        let request = m.get_variant(param(&params, "q"), "<svg onload=alert('XSS')>", InjectionMode::Replace, false);

        let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "<svg onload=alert('XSS')>".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
        assert!(!request.follow_redirects);
    }

    #[test]
    fn test_multi_valued_parameter_uses_first_value() {
        let m = mutator("http://example.com/?tag=a&x=1&tag=b");
        let params = m.parameters();
        assert_eq!(params.len(), 2);
        assert_eq!(param(&params, "tag").original_value, "a");

        let request = m.get_variant(param(&params, "tag"), "'", InjectionMode::Append, true);
        assert_eq!(request.url.query(), Some("tag=a%27&x=1"));

        let request = m.get_variant(param(&params, "x"), "'", InjectionMode::Append, true);
        assert_eq!(request.url.query(), Some("tag=a&tag=b&x=1%27"));
    }

    #[test]
    fn test_fragment_preserved() {
        let m = mutator("http://example.com/p?id=1#top");
        let params = m.parameters();
        let request = m.get_variant(&params[0], "'", InjectionMode::Append, true);
        assert_eq!(request.url.fragment(), Some("top"));
    }

    #[test]
    fn test_post_variant_single_field() {
        let m = mutator("https://example.com/login.php?user=bob&pass=x");
        let params = m.parameters();
        let endpoint = m.submission_endpoint();
        assert_eq!(endpoint.as_str(), "https://example.com/login.php");

        let request = m.post_variant(&endpoint, param(&params, "pass"), "' OR '1'='1", true);
        assert_eq!(request.method, HttpMethod::POST);
        assert_eq!(request.url, endpoint);
        assert_eq!(
            request.form,
            Some(vec![("pass".to_string(), "' OR '1'='1".to_string())])
        );
        assert_eq!(request.encoded_body().as_deref(), Some("pass=%27+OR+%271%27%3D%271"));
    }
}
