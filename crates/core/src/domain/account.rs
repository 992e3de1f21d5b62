/// Opaque handle for one billing account: the locally configured credential
/// profile the query service resolves on its side. The display alias is looked
/// up lazily per fetch and never cached here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountContext {
    pub profile: String,
}

impl AccountContext {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }
}
