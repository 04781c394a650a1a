use serde::Deserialize;
use serde_json::Value;

/// Remote payment status, decoded fresh on every poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentState {
    Pending,
    Confirmed { redirect_to: Option<String> },
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
struct StateDocument {
    state: Option<String>,
    #[serde(rename = "redirectTo")]
    redirect_to: Option<Value>,
}

impl PaymentState {
    /// Decodes a response body. Only a body that is not valid JSON is an
    /// error; any parsed document classifies as one of the three variants.
    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        // A document of the wrong shape (array, bare string, non-string
        // `state`) is not a decode failure, it is an unknown state.
        let doc = StateDocument::deserialize(value).unwrap_or_default();
        Ok(Self::classify(doc))
    }

    fn classify(doc: StateDocument) -> Self {
        match doc.state.as_deref() {
            Some("pending") => Self::Pending,
            Some("confirmed") => Self::Confirmed {
                // redirectTo counts only when it actually is a string.
                redirect_to: doc.redirect_to.and_then(|v| match v {
                    Value::String(url) => Some(url),
                    _ => None,
                }),
            },
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pending() {
        let state = PaymentState::decode(r#"{"state": "pending"}"#).unwrap();
        assert_eq!(state, PaymentState::Pending);
    }

    #[test]
    fn decodes_confirmed_with_redirect() {
        let state =
            PaymentState::decode(r#"{"state": "confirmed", "redirectTo": "/order/ABC?paid=yes"}"#)
                .unwrap();
        assert_eq!(
            state,
            PaymentState::Confirmed {
                redirect_to: Some("/order/ABC?paid=yes".to_string())
            }
        );
    }

    #[test]
    fn confirmed_without_redirect_keeps_none() {
        let state = PaymentState::decode(r#"{"state": "confirmed"}"#).unwrap();
        assert_eq!(state, PaymentState::Confirmed { redirect_to: None });
    }

    #[test]
    fn confirmed_with_non_string_redirect_keeps_none() {
        let state = PaymentState::decode(r#"{"state": "confirmed", "redirectTo": 123}"#).unwrap();
        assert_eq!(state, PaymentState::Confirmed { redirect_to: None });
    }

    #[test]
    fn unrecognized_state_is_unknown() {
        let state = PaymentState::decode(r#"{"state": "expired"}"#).unwrap();
        assert_eq!(state, PaymentState::Unknown);
    }

    #[test]
    fn missing_state_field_is_unknown() {
        assert_eq!(PaymentState::decode("{}").unwrap(), PaymentState::Unknown);
        assert_eq!(
            PaymentState::decode(r#"{"redirectTo": "/x"}"#).unwrap(),
            PaymentState::Unknown
        );
    }

    #[test]
    fn non_object_documents_are_unknown() {
        assert_eq!(
            PaymentState::decode("[1, 2, 3]").unwrap(),
            PaymentState::Unknown
        );
        assert_eq!(
            PaymentState::decode(r#""confirmed""#).unwrap(),
            PaymentState::Unknown
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        let state =
            PaymentState::decode(r#"{"state": "pending", "qr_image": "abc", "order": "XYZ"}"#)
                .unwrap();
        assert_eq!(state, PaymentState::Pending);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(PaymentState::decode("<html>502 Bad Gateway</html>").is_err());
        assert!(PaymentState::decode("").is_err());
    }
}
