use crate::errors::DbError;
use bson::Bson;
use serde_json::Value;

use super::types::CmpOp;

/// Control keys excluded from the filter set before translation.
pub(crate) const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// One filter entry: an equality scalar, or a comparison mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterParam {
    Scalar(Bson),
    Cmp(Vec<(CmpOp, Bson)>),
}

/// The untrusted parameters of a "list records" request.
///
/// Reserved control parameters (`page`, `sort`, `limit`, `fields`) are
/// captured separately at parse time; everything else lands in the ordered
/// filter set. Control values stay raw strings so that the numeric-or-default
/// policy applies at `paginate` time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub page: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub fields: Option<String>,
    filters: Vec<(String, FilterParam)>,
}

impl ListParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds params from HTTP-style key/value pairs. Keys of the form
    /// `field[op]` contribute to the field's comparison mapping; a bracketed
    /// key with an unrecognized operator is dropped silently.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut out = Self::default();
        for (k, v) in pairs {
            out.push_pair(k, v);
        }
        out
    }

    pub fn push_pair(&mut self, key: &str, value: &str) {
        match key {
            "page" => self.page = Some(value.to_string()),
            "sort" => self.sort = Some(value.to_string()),
            "limit" => self.limit = Some(value.to_string()),
            "fields" => self.fields = Some(value.to_string()),
            _ => match split_bracket_key(key) {
                Some((field, Some(op))) => self.push_cmp(field, op, coerce_scalar(value)),
                Some((_, None)) => {}
                None => {
                    self.filters.push((key.to_string(), FilterParam::Scalar(coerce_scalar(value))));
                }
            },
        }
    }

    /// Builds params from the JSON-object form of the same mapping, e.g.
    /// `{"duration": {"gte": 5}, "difficulty": "easy", "page": 2}`.
    ///
    /// # Errors
    /// Returns an error if `value` is not a JSON object.
    pub fn from_json(value: &Value) -> Result<Self, DbError> {
        let Value::Object(map) = value else {
            return Err(DbError::QueryError("list parameters must be a JSON object".into()));
        };
        let mut out = Self::default();
        for (key, val) in map {
            if RESERVED_KEYS.contains(&key.as_str()) {
                let raw = control_string(val);
                match key.as_str() {
                    "page" => out.page = raw,
                    "sort" => out.sort = raw,
                    "limit" => out.limit = raw,
                    "fields" => out.fields = raw,
                    _ => unreachable!(),
                }
                continue;
            }
            match val {
                Value::Object(ops) => {
                    for (op_key, op_val) in ops {
                        if let Some(op) = CmpOp::from_param_key(op_key) {
                            out.push_cmp(key, op, json_to_bson(op_val));
                        }
                    }
                }
                other => out.filters.push((key.clone(), FilterParam::Scalar(json_to_bson(other)))),
            }
        }
        Ok(out)
    }

    fn push_cmp(&mut self, field: &str, op: CmpOp, value: Bson) {
        for (f, p) in &mut self.filters {
            if f.as_str() == field
                && let FilterParam::Cmp(ops) = p
            {
                ops.push((op, value));
                return;
            }
        }
        self.filters.push((field.to_string(), FilterParam::Cmp(vec![(op, value)])));
    }

    /// The filter set, reserved keys already stripped, in request order.
    #[must_use]
    pub fn filters(&self) -> &[(String, FilterParam)] {
        &self.filters
    }
}

/// Splits `field[op]` into its parts. `Some((field, None))` means bracket
/// syntax with an operator the translation does not recognize.
fn split_bracket_key(key: &str) -> Option<(&str, Option<CmpOp>)> {
    let open = key.find('[')?;
    if open == 0 || !key.ends_with(']') {
        return None;
    }
    let op = &key[open + 1..key.len() - 1];
    Some((&key[..open], CmpOp::from_param_key(op)))
}

/// Numeric-looking strings become numbers, `true`/`false` become booleans,
/// everything else stays a string. The storage layer owns type validation.
fn coerce_scalar(raw: &str) -> Bson {
    if let Ok(i) = raw.parse::<i64>() {
        return Bson::Int64(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Bson::Double(f);
    }
    match raw {
        "true" => Bson::Boolean(true),
        "false" => Bson::Boolean(false),
        _ => Bson::String(raw.to_string()),
    }
}

// Structural walk; no serialize/re-parse round trip.
fn json_to_bson(v: &Value) -> Bson {
    match v {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else {
                Bson::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => {
            Bson::Document(map.iter().map(|(k, v)| (k.clone(), json_to_bson(v))).collect())
        }
    }
}

fn control_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_keys_never_enter_the_filter_set() {
        let p = ListParams::from_pairs([
            ("difficulty", "easy"),
            ("page", "2"),
            ("sort", "-price"),
            ("limit", "5"),
            ("fields", "name,price"),
        ]);
        assert_eq!(p.page.as_deref(), Some("2"));
        assert_eq!(p.sort.as_deref(), Some("-price"));
        assert_eq!(p.limit.as_deref(), Some("5"));
        assert_eq!(p.fields.as_deref(), Some("name,price"));
        assert_eq!(p.filters().len(), 1);
        assert_eq!(p.filters()[0].0, "difficulty");
    }

    #[test]
    fn bracket_keys_group_per_field() {
        let p = ListParams::from_pairs([("duration[gte]", "5"), ("duration[lt]", "10")]);
        assert_eq!(p.filters().len(), 1);
        match &p.filters()[0].1 {
            FilterParam::Cmp(ops) => {
                assert_eq!(ops[0], (CmpOp::Gte, Bson::Int64(5)));
                assert_eq!(ops[1], (CmpOp::Lt, Bson::Int64(10)));
            }
            FilterParam::Scalar(_) => panic!("expected comparison mapping"),
        }
    }

    #[test]
    fn unknown_bracket_operator_is_dropped() {
        let p = ListParams::from_pairs([("price[in]", "5,10")]);
        assert!(p.filters().is_empty());
    }

    #[test]
    fn scalar_coercion() {
        assert_eq!(coerce_scalar("5"), Bson::Int64(5));
        assert_eq!(coerce_scalar("4.7"), Bson::Double(4.7));
        assert_eq!(coerce_scalar("true"), Bson::Boolean(true));
        assert_eq!(coerce_scalar("easy"), Bson::String("easy".into()));
    }

    #[test]
    fn json_form_matches_pair_form() {
        let from_json = ListParams::from_json(&serde_json::json!({
            "duration": {"gte": 5},
            "difficulty": "easy",
            "page": 2,
        }))
        .unwrap();
        let from_pairs =
            ListParams::from_pairs([("duration[gte]", "5"), ("difficulty", "easy"), ("page", "2")]);
        assert_eq!(from_json, from_pairs);
    }

    #[test]
    fn json_form_keeps_request_order() {
        let p = ListParams::from_json(&serde_json::json!({
            "difficulty": "easy",
            "cost": 10,
            "buses": 2,
        }))
        .unwrap();
        let fields: Vec<&str> = p.filters().iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["difficulty", "cost", "buses"]);
    }

    #[test]
    fn json_form_rejects_non_objects() {
        assert!(ListParams::from_json(&serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn json_unknown_nested_keys_dropped() {
        let p = ListParams::from_json(&serde_json::json!({"price": {"near": 3}})).unwrap();
        assert!(p.filters().is_empty());
    }
}
