//! Fingerprint Module
//!
//! Request descriptors and the deterministic cache keys derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

// == Fingerprint ==
/// 32-character lowercase hex MD5 of a request's path and query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derives the fingerprint for `path` and its ordered parameters.
    ///
    /// The hashed text is `path?query`, where the query is the
    /// form-urlencoded parameters in insertion order. The `?` is kept even
    /// when there are no parameters.
    pub fn of<K, V>(path: &str, params: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query = encode_query(params);
        let digest = md5::compute(format!("{}?{}", path, query).as_bytes());
        Self(format!("{:x}", digest))
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encodes pairs as an `application/x-www-form-urlencoded` query.
pub fn encode_query<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    serializer.finish()
}

// == Request Descriptor ==
/// A logical request: endpoint group, path relative to the transport's base
/// URL, and ordered query parameters.
///
/// Built once by the caller and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    group: String,
    path: String,
    params: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Creates a descriptor with no parameters.
    pub fn new(group: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter. Order of calls is the order on the wire and in
    /// the fingerprint.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Endpoint group used for request counting.
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Cache key for this request. The group does not take part.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.path, &self.params)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summoner_fingerprint() {
        let req = RequestDescriptor::new("summoner", "na/v1.4/summoner/by-name/bakasan")
            .param("api_key", "key");
        assert_eq!(
            req.fingerprint().as_str(),
            "9bd8e5b11e0ac9c0a52d5711c9057dd2"
        );
    }

    #[test]
    fn test_champion_free_fingerprint() {
        let req = RequestDescriptor::new("champion", "na/v1.2/champion")
            .param("freeToPlay", "true")
            .param("api_key", "key");
        assert_eq!(
            req.fingerprint().as_str(),
            "4be3fe5c15c888d40a1793190d77166b"
        );
    }

    #[test]
    fn test_champion_by_id_fingerprint() {
        let req =
            RequestDescriptor::new("champion", "na/v1.2/champion/10101").param("api_key", "key");
        assert_eq!(
            req.fingerprint().to_string(),
            "3edf33d12f4be66653c05dd30c42e32c"
        );
    }

    #[test]
    fn test_group_not_part_of_fingerprint() {
        let a = RequestDescriptor::new("a", "x/y").param("k", "v");
        let b = RequestDescriptor::new("b", "x/y").param("k", "v");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_parameter_order_matters() {
        let a = RequestDescriptor::new("g", "p").param("a", "1").param("b", "2");
        let b = RequestDescriptor::new("g", "p").param("b", "2").param("a", "1");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_encode_query() {
        let params = [("name", "baka san"), ("region", "na&eu")];
        assert_eq!(encode_query(&params), "name=baka+san&region=na%26eu");
    }

    #[test]
    fn test_fingerprint_shape() {
        let fp = Fingerprint::of::<&str, &str>("na/v1.2/champion", &[]);
        assert_eq!(fp.as_str().len(), 32);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
