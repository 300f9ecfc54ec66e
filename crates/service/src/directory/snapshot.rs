use models::{filter_schools, School};

/// What presentation layers render: the list plus pending-operation state.
///
/// `error` and `schools` are independent; a failed refresh keeps whatever
/// list was there before.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub schools: Vec<School>,
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreSnapshot {
    pub fn search(&self, query: &str) -> Vec<&School> {
        filter_schools(&self.schools, query)
    }
}
