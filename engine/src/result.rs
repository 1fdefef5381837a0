use serde::Serialize;

/// What an import reports back to the operator.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EtlResult {
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl EtlResult {
    pub fn success<S: AsRef<str>>(message: S) -> Self {
        EtlResult {
            succeeded: true,
            result_message: Some(message.as_ref().to_string()),
            error_message: None,
        }
    }

    pub fn failure<S: AsRef<str>>(message: S) -> Self {
        EtlResult {
            succeeded: false,
            result_message: None,
            error_message: Some(message.as_ref().to_string()),
        }
    }

    /// The message matching the outcome.
    pub fn message(&self) -> &str {
        let message = if self.succeeded {
            &self.result_message
        } else {
            &self.error_message
        };
        message.as_deref().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountResult {
    #[serde(rename = "esIndex")]
    pub index: String,
    pub count: u64,
}
