use urlencoding::encode;

/// Query parameters kept in insertion order.
///
/// Inserting an existing name replaces its value without moving it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// `name=value` pairs joined with `&`, each side percent-encoded as UTF-8.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(n, v)| format!("{}={}", encode(n), encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Builds a request URL from a base and ordered query parameters.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    base: String,
    params: QueryParams,
}

impl RequestBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: QueryParams::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name, value);
        self
    }

    pub fn params(mut self, params: &QueryParams) -> Self {
        for (n, v) in params.iter() {
            self.params.insert(n, v);
        }
        self
    }

    /// The final URL. Parameters are joined with `?`, or with `&` when the base
    /// already carries a query string.
    pub fn build(&self) -> String {
        if self.params.is_empty() {
            return self.base.clone();
        }

        let query = self.params.to_query_string();
        let separator = match self.base.find('?') {
            None => "?",
            Some(_) if self.base.ends_with('?') || self.base.ends_with('&') => "",
            Some(_) => "&",
        };
        format!("{}{}{}", self.base, separator, query)
    }
}
