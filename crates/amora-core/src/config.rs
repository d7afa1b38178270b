use serde::de::DeserializeOwned;

/// Loads service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field `foo_bar` is read from `FOO_BAR`.
/// Optional settings should be `Option<T>` or carry a `#[serde(default = ...)]`.
pub trait Config: Sized + DeserializeOwned {
    /// # Panics
    ///
    /// Panics if a required env var is missing or cannot be deserialized.
    fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|e| panic!("failed to load config from environment: {e}"))
    }

    fn try_from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Build from explicit key/value pairs (upper-case keys, same as the environment).
    fn from_pairs<I, K, V>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        envy::from_iter(pairs.into_iter().map(|(k, v)| (k.into(), v.into())))
    }
}
