use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_VALUE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvOperation {
    Get { key: String },
    Set { key: String, value: Vec<u8> },
}

impl Operation for KvOperation {
    type Output = KvResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvOutput {
    /// `None` means the key has never been written (or was cleared by the
    /// platform); callers treat that the same as a read failure.
    Value(Option<Vec<u8>>),
    Written,
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvError {
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("storage error: {message}")]
    Storage { message: String },
}

pub type KvResult = Result<KvOutput, KvError>;

fn validate_key(key: &str) -> Result<(), KvError> {
    if key.trim().is_empty() {
        return Err(KvError::InvalidKey {
            reason: "key cannot be empty".to_string(),
        });
    }
    if key.contains('\0') {
        return Err(KvError::InvalidKey {
            reason: "key cannot contain null bytes".to_string(),
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct KeyValue<Ev> {
    context: CapabilityContext<KvOperation, Ev>,
}

impl<Ev> Capability<Ev> for KeyValue<Ev> {
    type Operation = KvOperation;
    type MappedSelf<MappedEv> = KeyValue<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        KeyValue::new(self.context.map_event(f))
    }
}

impl<Ev> KeyValue<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<KvOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn get<F>(&self, key: impl Into<String>, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + 'static,
    {
        let key = key.into();
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = match validate_key(&key) {
                Ok(()) => context.request_from_shell(KvOperation::Get { key }).await,
                Err(e) => Err(e),
            };
            context.update_app(make_event(result));
        });
    }

    pub fn set<F>(&self, key: impl Into<String>, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + 'static,
    {
        let key = key.into();
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = match validate_set(&key, &value) {
                Ok(()) => {
                    context
                        .request_from_shell(KvOperation::Set { key, value })
                        .await
                }
                Err(e) => Err(e),
            };
            context.update_app(make_event(result));
        });
    }
}

fn validate_set(key: &str, value: &[u8]) -> Result<(), KvError> {
    validate_key(key)?;
    if value.len() > MAX_VALUE_BYTES {
        return Err(KvError::ValueTooLarge {
            size: value.len(),
            max: MAX_VALUE_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            validate_key(""),
            Err(KvError::InvalidKey { .. })
        ));
        assert!(validate_key("   ").is_err());
    }

    #[test]
    fn null_bytes_are_rejected() {
        assert!(validate_key("ci\0ty").is_err());
    }

    #[test]
    fn plain_keys_pass() {
        assert!(validate_key("city").is_ok());
    }

    #[test]
    fn oversized_values_are_rejected() {
        let value = vec![0u8; MAX_VALUE_BYTES + 1];
        assert!(matches!(
            validate_set("city", &value),
            Err(KvError::ValueTooLarge { .. })
        ));
    }
}
