//! The `Query` struct used to parse and store the URL query parameters.
//!
//! ```text
//! URI = scheme ":" ["//" authority] path ["?" query] ["#" fragment]
//! ```
use std::panic::Location;
use std::str::FromStr;

use multimap::MultiMap;
use thiserror::Error;

type ParamName = String;
type ParamValue = String;

/// It represents a URL query component.
///
/// Values are kept percent-encoded exactly as received; binary params like
/// `info_hash` are decoded by the request parsers, not here.
#[derive(Debug)]
pub struct Query {
    params: MultiMap<ParamName, NameValuePair>,
}

impl Query {
    /// It returns `Some(value)` for a URL query param if the param with the
    /// input `name` exists. For example:
    ///
    /// ```rust
    /// use storrent::servers::http::v1::query::Query;
    ///
    /// let query = "param1=value1&param2=value2".parse::<Query>().unwrap();
    ///
    /// assert_eq!(query.get_param("param1").unwrap(), "value1");
    /// assert_eq!(query.get_param("param2").unwrap(), "value2");
    /// ```
    ///
    /// It returns only the first param value even if it has multiple values:
    ///
    /// ```rust
    /// use storrent::servers::http::v1::query::Query;
    ///
    /// let query = "param1=value1&param1=value2".parse::<Query>().unwrap();
    ///
    /// assert_eq!(query.get_param("param1").unwrap(), "value1");
    /// ```
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.params.get(name).map(|pair| pair.value.clone())
    }

    /// Returns all the values of a param as a vector. The scrape request
    /// uses it: clients repeat `info_hash` once per torrent.
    ///
    /// ```rust
    /// use storrent::servers::http::v1::query::Query;
    ///
    /// let query = "param1=value1&param1=value2".parse::<Query>().unwrap();
    ///
    /// assert_eq!(
    ///     query.get_param_vec("param1"),
    ///     Some(vec!["value1".to_string(), "value2".to_string()])
    /// );
    /// ```
    #[must_use]
    pub fn get_param_vec(&self, name: &str) -> Option<Vec<String>> {
        self.params
            .get_vec(name)
            .map(|pairs| pairs.iter().map(|pair| pair.value.clone()).collect())
    }
}

/// This error can be returned when parsing a [`Query`] from a string.
#[derive(Error, Debug)]
pub enum ParseQueryError {
    /// Invalid URL query param. For example: `"name=value=value"`. It
    /// contains an unescaped `=` character.
    #[error("invalid param {raw_param} in {location}")]
    InvalidParam {
        location: &'static Location<'static>,
        raw_param: String,
    },
}

impl FromStr for Query {
    type Err = ParseQueryError;

    fn from_str(raw_query: &str) -> Result<Self, Self::Err> {
        let mut params: MultiMap<ParamName, NameValuePair> = MultiMap::new();

        let raw_params = raw_query.trim().trim_start_matches('?').split('&').collect::<Vec<&str>>();

        for raw_param in raw_params {
            let pair: NameValuePair = raw_param.parse()?;
            let param_name = pair.name.clone();
            params.insert(param_name, pair);
        }

        Ok(Self { params })
    }
}

impl From<Vec<(&str, &str)>> for Query {
    fn from(raw_params: Vec<(&str, &str)>) -> Self {
        let mut params: MultiMap<ParamName, NameValuePair> = MultiMap::new();

        for raw_param in raw_params {
            params.insert(raw_param.0.to_owned(), NameValuePair::new(raw_param.0, raw_param.1));
        }

        Self { params }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let query = self
            .params
            .iter_all()
            .flat_map(|(_, pairs)| pairs.iter().map(ToString::to_string))
            .collect::<Vec<String>>()
            .join("&");

        write!(f, "{query}")
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NameValuePair {
    name: ParamName,
    value: ParamValue,
}

impl NameValuePair {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }
}

impl FromStr for NameValuePair {
    type Err = ParseQueryError;

    fn from_str(raw_param: &str) -> Result<Self, Self::Err> {
        let pair = raw_param.split('=').collect::<Vec<&str>>();

        if pair.len() != 2 {
            return Err(ParseQueryError::InvalidParam {
                location: Location::caller(),
                raw_param: raw_param.to_owned(),
            });
        }

        Ok(Self {
            name: pair[0].to_owned(),
            value: pair[1].to_owned(),
        })
    }
}

impl std::fmt::Display for NameValuePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use crate::servers::http::v1::query::Query;

    #[test]
    fn it_should_parse_a_query_with_multiple_params() {
        let query = "port=17548&downloaded=1".parse::<Query>().unwrap();

        assert_eq!(query.get_param("port").unwrap(), "17548");
        assert_eq!(query.get_param("downloaded").unwrap(), "1");
    }

    #[test]
    fn it_should_ignore_a_leading_question_mark() {
        let query = "?port=17548".parse::<Query>().unwrap();

        assert_eq!(query.get_param("port").unwrap(), "17548");
    }

    #[test]
    fn it_should_keep_all_values_for_a_repeated_param() {
        let query = "info_hash=a&info_hash=b".parse::<Query>().unwrap();

        assert_eq!(
            query.get_param_vec("info_hash"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn it_should_allow_an_empty_param_value() {
        let query = "event=".parse::<Query>().unwrap();

        assert_eq!(query.get_param("event").unwrap(), "");
    }

    #[test]
    fn it_should_fail_parsing_a_param_with_an_unescaped_equals_sign() {
        let query = "name=value=value".parse::<Query>();

        assert!(query.is_err());
    }

    #[test]
    fn it_should_not_have_a_missing_param() {
        let query = "port=17548".parse::<Query>().unwrap();

        assert!(query.get_param("peer_id").is_none());
    }
}
