/// LIMIT/OFFSET pagination. Both values are bound as parameters when the
/// statement is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub limit: u64,
    pub offset: u64,
}
