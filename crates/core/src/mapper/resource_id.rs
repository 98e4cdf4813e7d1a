use indexmap::IndexMap;

/// Lowercased path segments of a provider id, keyed by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceIdentity {
    segments: IndexMap<usize, String>,
}

const RESOURCE_GROUPS_SEGMENT: &str = "resourcegroups";
const RESOURCE_GROUPS_INDEX: usize = 2;

impl ResourceIdentity {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.values().map(String::as_str)
    }

    /// Resource-group segment of `subscriptions/<s>/resourcegroups/<rg>/...`.
    pub fn resource_group(&self) -> Option<&str> {
        match self.get(RESOURCE_GROUPS_INDEX) {
            Some(RESOURCE_GROUPS_SEGMENT) => self
                .get(RESOURCE_GROUPS_INDEX + 1)
                .filter(|name| !name.is_empty()),
            _ => None,
        }
    }
}

pub fn parse_resource_id(id: &str) -> ResourceIdentity {
    if id.is_empty() {
        return ResourceIdentity::default();
    }
    let trimmed = id.strip_prefix('/').unwrap_or(id);
    let segments = trimmed
        .split('/')
        .map(str::to_lowercase)
        .enumerate()
        .collect();
    ResourceIdentity { segments }
}
