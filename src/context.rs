use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::token::TokenInfo;

/// Attribute key under which a successful validation stores its [`TokenInfo`].
pub const TOKEN_INFO_KEY: &str = "tokenInfo";

type Attribute = Arc<dyn Any + Send + Sync>;

/// Per-request attributes. Cloning is cheap, and adding an attribute produces a new
/// context while the original stays untouched.
#[derive(Clone, Default)]
pub struct RequestContext {
    attrs: Arc<HashMap<String, Attribute>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T>(&self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let mut attrs = (*self.attrs).clone();
        attrs.insert(key.into(), Arc::new(value));
        Self {
            attrs: Arc::new(attrs),
        }
    }

    /// Returns `None` when the key is missing or holds another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.attrs.get(key)?.downcast_ref::<T>()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn token_info(&self) -> Option<&TokenInfo> {
        self.get(TOKEN_INFO_KEY)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.attrs.keys().collect();
        keys.sort();
        f.debug_struct("RequestContext")
            .field("keys", &keys)
            .finish()
    }
}
