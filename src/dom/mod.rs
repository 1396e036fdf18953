use std::sync::{Arc, Mutex};

use crate::charts::ChartConfig;
use crate::error::ClientError;

mod memory;

pub use memory::{Element, MemoryDom};

/// Element surface the controller writes to. Elements are addressed by id.
///
/// Every mutating call on an unknown id returns
/// [`ClientError::MissingElement`].
pub trait Dom: Send {
    fn contains(&self, id: &str) -> bool;
    fn parent_of(&self, id: &str) -> Option<String>;
    /// Current value of a form input.
    fn value_of(&self, id: &str) -> Result<String, ClientError>;
    fn set_inner_html(&mut self, id: &str, html: &str) -> Result<(), ClientError>;
    fn set_text(&mut self, id: &str, text: &str) -> Result<(), ClientError>;
    fn add_class(&mut self, id: &str, class: &str) -> Result<(), ClientError>;
    fn remove_class(&mut self, id: &str, class: &str) -> Result<(), ClientError>;
    /// Returns whether the class is present afterwards.
    fn toggle_class(&mut self, id: &str, class: &str) -> Result<bool, ClientError>;
    fn set_style(&mut self, id: &str, property: &str, value: &str) -> Result<(), ClientError>;
    /// Ids of all elements carrying `class`, in document order.
    fn elements_with_class(&self, class: &str) -> Vec<String>;
    fn find_by_attr(&self, name: &str, value: &str) -> Option<String>;
    fn mount_chart(&mut self, id: &str, config: &ChartConfig) -> Result<(), ClientError>;
}

pub type SharedDom = Arc<Mutex<dyn Dom>>;

/// Run `f` with the DOM locked. The lock is never held across an await.
pub fn with_dom<R>(
    dom: &SharedDom,
    f: impl FnOnce(&mut dyn Dom) -> Result<R, ClientError>,
) -> Result<R, ClientError> {
    let mut guard = dom
        .lock()
        .map_err(|_| ClientError::Dom("dom lock poisoned".into()))?;
    f(&mut *guard)
}
