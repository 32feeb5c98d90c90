use compact_str::CompactString;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct GistId {
    value: CompactString,
}

impl GistId {
    pub fn new(id: impl Into<CompactString>) -> Self { Self { value: id.into() } }
}

impl<'de> Deserialize<'de> for GistId {
    fn deserialize<D>(deserializer: D) -> Result<GistId, D::Error>
        where D: Deserializer<'de>,
    {
        let id = CompactString::deserialize(deserializer)?;
        Ok(GistId::new(id))
    }
}

impl std::fmt::Display for GistId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
