//! Decoding of the JSON filter language.
//!
//! ```json
//! {
//!     "text": "cafe",
//!     "category": "restaurant",
//!     "price_tier": { "$between": [1, 2] },
//!     "rating": { "$geq": 4.0 },
//!     "amenities": ["wifi"]
//! }
//! ```
//!
//! A bare value on a categorical field is an equality check.

use serde_json::Value;

use crate::query::{self, BusinessFilter, IsSupportedOp, Op, OpError, Range, TextQuery};

pub fn business_filter_from_serde_value(value: Value) -> Result<BusinessFilter, query::Error> {
    let Value::Object(fields) = value else {
        return Err(query::Error::Malformed("expected an object".to_owned()));
    };

    let mut filter = BusinessFilter::default();
    for (field, value) in &fields {
        match field.as_str() {
            "text" => {
                let text = value.as_str().ok_or_else(|| bad_field(field))?;
                filter.text = Some(TextQuery::new(text));
            }
            "category" => filter.category = Some(op_from_value(field, value, text)?),
            "region" => filter.region = Some(op_from_value(field, value, text)?),
            "price_tier" => filter.price_tier = Some(op_from_value(field, value, Value::as_i64)?),
            "rating" => filter.rating = Some(op_from_value(field, value, Value::as_f64)?),
            "featured" => filter.featured = Some(value.as_bool().ok_or_else(|| bad_field(field))?),
            "amenities" => {
                let labels = value
                    .as_array()
                    .ok_or_else(|| bad_field(field))?
                    .iter()
                    .map(|v| text(v).ok_or_else(|| bad_field(field)))
                    .collect::<Result<Vec<_>, _>>()?;
                filter.amenities = Some(labels);
            }
            _ => return Err(bad_field(field)),
        }
    }

    Ok(filter)
}

fn bad_field(field: &str) -> query::Error {
    query::Error::BadField {
        field: field.to_owned(),
    }
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn op_from_value<T>(
    field: &str,
    value: &Value,
    scalar: impl Fn(&Value) -> Option<T>,
) -> Result<Op<T>, query::Error>
where
    T: IsSupportedOp + PartialOrd,
{
    let one = |v: &Value| scalar(v).ok_or(OpError::WrongType);

    let op = match value {
        Value::Object(map) => {
            let mut entries = map.iter();
            let (Some((name, arg)), None) = (entries.next(), entries.next()) else {
                return Err(query::Error::Malformed(format!(
                    "`{}` expects exactly one operator",
                    field
                )));
            };

            match name.as_str() {
                "$eq" => Op::Eq(one(arg)?),
                "$neq" => Op::Neq(one(arg)?),
                "$lt" => Op::Lt(one(arg)?),
                "$leq" => Op::Leq(one(arg)?),
                "$gt" => Op::Gt(one(arg)?),
                "$geq" => Op::Geq(one(arg)?),
                "$match" => Op::Match(one(arg)?),
                "$ex" => Op::Ex,
                "$nex" => Op::Nex,
                "$between" => match arg.as_array().map(Vec::as_slice) {
                    Some([min, max]) => Op::Between(Range::try_new(one(min)?, one(max)?)?),
                    _ => return Err(OpError::WrongType.into()),
                },
                "$in" => Op::In(
                    arg.as_array()
                        .ok_or(OpError::WrongType)?
                        .iter()
                        .map(one)
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                _ => {
                    return Err(query::Error::UnsupportedOp {
                        field: field.to_owned(),
                    });
                }
            }
        }
        v => Op::Eq(one(v)?),
    };

    if !op.is_supported_op() {
        return Err(query::Error::UnsupportedOp {
            field: field.to_owned(),
        });
    }
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_filter() {
        let filter = business_filter_from_serde_value(json!({
            "text": "Café",
            "category": "restaurant",
            "region": { "$in": ["Atlántida", "Cortés"] },
            "price_tier": { "$between": [1, 2] },
            "rating": { "$geq": 4 },
            "featured": true,
            "amenities": ["wifi"]
        }))
        .unwrap();

        assert_eq!(filter.text, Some(TextQuery::new("Café")));
        assert_eq!(filter.category, Some(Op::Eq("restaurant".to_owned())));
        assert_eq!(
            filter.region,
            Some(Op::In(vec!["Atlántida".to_owned(), "Cortés".to_owned()]))
        );
        assert_eq!(
            filter.price_tier,
            Some(Op::Between(Range::try_new(1, 2).unwrap()))
        );
        assert_eq!(filter.rating, Some(Op::Geq(4.0)));
        assert_eq!(filter.featured, Some(true));
        assert_eq!(filter.amenities, Some(vec!["wifi".to_owned()]));
    }

    #[test]
    fn existence_operators_ignore_their_argument() {
        let filter = business_filter_from_serde_value(json!({
            "category": { "$ex": true },
            "region": { "$nex": null }
        }))
        .unwrap();

        assert_eq!(filter.category, Some(Op::Ex));
        assert_eq!(filter.region, Some(Op::Nex));
    }

    #[test]
    fn rejections() {
        let err = |v: Value| business_filter_from_serde_value(v).unwrap_err();

        assert!(matches!(err(json!([])), query::Error::Malformed(_)));
        assert!(matches!(err(json!({ "color": "blue" })), query::Error::BadField { .. }));
        assert!(matches!(
            err(json!({ "category": { "$gt": "a" } })),
            query::Error::UnsupportedOp { .. }
        ));
        // equality on floating point values is not supported
        assert!(matches!(
            err(json!({ "rating": 4.5 })),
            query::Error::UnsupportedOp { .. }
        ));
        assert!(matches!(
            err(json!({ "price_tier": { "$between": [3, 1] } })),
            query::Error::OpError(OpError::EmptyRange)
        ));
        assert!(matches!(
            err(json!({ "price_tier": "cheap" })),
            query::Error::OpError(OpError::WrongType)
        ));
        assert!(matches!(
            err(json!({ "region": { "$eq": "a", "$neq": "b" } })),
            query::Error::Malformed(_)
        ));
    }
}
