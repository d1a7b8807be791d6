use serde::{Serialize, de::DeserializeOwned};

use super::{BusinessGetPayload, BusinessListPayload, BusinessPayload, BusinessUpdatePayload, Error};
use crate::types::{BusinessId, BusinessView, UpdateReport};

/// A decoded action, still unvalidated.
#[derive(Debug)]
pub enum ActionRequest {
    BusinessList(BusinessListPayload),
    BusinessGet(BusinessGetPayload),
    BusinessCreate(Box<BusinessPayload>),
    BusinessUpdate(Box<BusinessUpdatePayload>),
}

impl ActionRequest {
    /// Decodes the JSON `body` of the action called `name`.
    pub fn try_new(name: &str, body: &[u8]) -> Result<Self, Error> {
        Ok(match name {
            "business_list" => Self::BusinessList(decode_or_default(body)?),
            "business_get" => Self::BusinessGet(serde_json::from_slice(body)?),
            "business_create" => Self::BusinessCreate(Box::new(serde_json::from_slice(body)?)),
            "business_update" => Self::BusinessUpdate(Box::new(serde_json::from_slice(body)?)),
            _ => return Err(Error::UnknownAction(name.to_owned())),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BusinessList(_) => "business_list",
            Self::BusinessGet(_) => "business_get",
            Self::BusinessCreate(_) => "business_create",
            Self::BusinessUpdate(_) => "business_update",
        }
    }
}

/// An empty body is accepted for payloads where every field is optional
fn decode_or_default<T>(body: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: BusinessId,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActionResponse {
    BusinessList(Vec<BusinessView>),
    BusinessGet(Box<BusinessView>),
    BusinessCreate(CreatedResponse),
    BusinessUpdate(UpdateReport),
}

impl ActionResponse {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_actions() {
        let action = ActionRequest::try_new("business_get", br#"{"id": "x"}"#).unwrap();
        assert_eq!(action.name(), "business_get");

        let action = ActionRequest::try_new("business_list", b"").unwrap();
        match action {
            ActionRequest::BusinessList(payload) => {
                assert!(payload.owner.is_none());
                assert!(payload.filter.is_none());
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_actions() {
        assert!(matches!(
            ActionRequest::try_new("business_delete", b"{}"),
            Err(Error::UnknownAction(name)) if name == "business_delete"
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            ActionRequest::try_new("business_update", b"{ not json"),
            Err(Error::Deserialization(_))
        ));
    }
}
