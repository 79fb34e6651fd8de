//! Request parameters and their query-string encoding

/// A single parameter value
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Text value
    Text(String),
    /// Numeric value; zero is a real value and is always sent
    Number(f64),
    /// Flag; `false` is treated as absent
    Flag(bool),
    /// Repeated values, sent as one `key=value` pair per element
    List(Vec<String>),
}

impl ParamValue {
    /// Render as `key=value` pairs, nothing for falsy values
    fn pairs<'a>(&'a self, key: &'a str) -> Box<dyn Iterator<Item = (&'a str, String)> + 'a> {
        match self {
            ParamValue::Text(text) if text.is_empty() => Box::new(std::iter::empty()),
            ParamValue::Text(text) => Box::new(std::iter::once((key, text.clone()))),
            ParamValue::Number(n) => Box::new(std::iter::once((key, format_number(*n)))),
            ParamValue::Flag(false) => Box::new(std::iter::empty()),
            ParamValue::Flag(true) => Box::new(std::iter::once((key, "true".to_string()))),
            ParamValue::List(values) => Box::new(
                values
                    .iter()
                    .filter(|v| !v.is_empty())
                    .map(move |v| (key, v.clone())),
            ),
        }
    }
}

/// Render integral values without a trailing `.0`
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Number(f64::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<&[String]> for ParamValue {
    fn from(value: &[String]) -> Self {
        ParamValue::List(value.to_vec())
    }
}

impl From<&[&str]> for ParamValue {
    fn from(value: &[&str]) -> Self {
        ParamValue::List(value.iter().map(|v| v.to_string()).collect())
    }
}

/// Ordered request parameters
///
/// ```
/// use labbcat::Parameters;
///
/// let params = Parameters::new()
///     .with("id", "AgnesShacklock-01.trs")
///     .with("layerId", vec!["orthography".to_string(), "word".to_string()])
///     .with("expression", "")
///     .with_opt("pageLength", None::<u32>);
/// assert_eq!(
///     params.query_string(),
///     "id=AgnesShacklock-01.trs&layerId=orthography&layerId=word"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, ParamValue)>,
}

impl Parameters {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Add a parameter if it is present
    pub fn with_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Add a parameter in place
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Append every entry of `other`
    pub fn extend(&mut self, other: &Parameters) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Look up the first value for `key`
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// The `id` parameter as text, used to tag outcomes
    pub fn item_id(&self) -> Option<String> {
        match self.get("id")? {
            ParamValue::Text(text) if !text.is_empty() => Some(text.clone()),
            ParamValue::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }

    /// True when no parameter would be sent
    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Key/value pairs that will be sent, in order, with falsy values dropped
    pub fn pairs(&self) -> Vec<(&str, String)> {
        self.entries
            .iter()
            .flat_map(|(key, value)| value.pairs(key))
            .collect()
    }

    /// URL-encoded `key=value&...` string
    pub fn query_string(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(&value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
