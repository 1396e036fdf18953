use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::charts::{ChartConfig, CHART_MOUNTS};
use crate::dom::Dom;
use crate::error::ClientError;

/// Solution categories rendered as cards, keyed by `data-category`.
pub const SOLUTION_CATEGORIES: [&str; 5] = [
    "immune_system",
    "stress_relief",
    "healing",
    "sleep_improvement",
    "mental_clarity",
];

pub const CASE_STUDIES: [&str; 5] = [
    "hospital_design",
    "mental_health",
    "rehabilitation",
    "pediatric_care",
    "elderly_care",
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct Element {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub inner_html: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub classes: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartConfig>,
}

impl Element {
    pub fn with_class(&mut self, class: &str) -> &mut Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn with_attr(&mut self, name: &str, value: &str) -> &mut Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_value(&mut self, value: &str) -> &mut Self {
        self.value = value.to_string();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }
}

/// In-process DOM used by the CLI and the test suites.
#[derive(Debug, Default)]
pub struct MemoryDom {
    elements: HashMap<String, Element>,
    order: Vec<String>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page as served: query form, result region, vote buttons for
    /// `vote_items` community insights, chart mounts and both card groups.
    pub fn page_layout(vote_items: u32) -> Self {
        let mut dom = Self::new();
        dom.add("health-query", None);
        dom.add("insight-result", None);
        for i in 0..vote_items {
            let button = format!("vote-btn-{}", i);
            dom.add(&button, None).with_class("vote-btn");
            dom.add(&format!("votes-{}", i), Some(&button)).text = "0".to_string();
        }
        for mount in CHART_MOUNTS {
            dom.add(mount, None);
        }
        for category in SOLUTION_CATEGORIES {
            dom.add(&format!("solution-{}", category), None)
                .with_class("solution-card")
                .with_attr("data-category", category);
        }
        for case in CASE_STUDIES {
            dom.add(&format!("case-{}", case), None).with_class("case-card");
        }
        dom
    }

    /// Insert (or replace) an element and return it for further setup.
    pub fn add(&mut self, id: &str, parent: Option<&str>) -> &mut Element {
        if !self.elements.contains_key(id) {
            self.order.push(id.to_string());
        }
        let slot = self.elements.entry(id.to_string()).or_default();
        *slot = Element {
            parent: parent.map(str::to_string),
            ..Element::default()
        };
        slot
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.text.as_str())
    }

    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.inner_html.as_str())
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements.get(id).is_some_and(|e| e.has_class(class))
    }

    pub fn chart(&self, id: &str) -> Option<&ChartConfig> {
        self.elements.get(id).and_then(|e| e.chart.as_ref())
    }

    /// Every element in document order, as JSON.
    pub fn snapshot(&self) -> Value {
        let elements: Vec<Value> = self
            .order
            .iter()
            .filter_map(|id| {
                let el = self.elements.get(id)?;
                let mut value = serde_json::to_value(el).ok()?;
                if let Value::Object(map) = &mut value {
                    map.insert("id".to_string(), Value::String(id.clone()));
                }
                Some(value)
            })
            .collect();
        Value::Array(elements)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Element, ClientError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| ClientError::MissingElement(id.to_string()))
    }
}

impl Dom for MemoryDom {
    fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn parent_of(&self, id: &str) -> Option<String> {
        self.elements.get(id).and_then(|e| e.parent.clone())
    }

    fn value_of(&self, id: &str) -> Result<String, ClientError> {
        self.elements
            .get(id)
            .map(|e| e.value.clone())
            .ok_or_else(|| ClientError::MissingElement(id.to_string()))
    }

    fn set_inner_html(&mut self, id: &str, html: &str) -> Result<(), ClientError> {
        self.get_mut(id)?.inner_html = html.to_string();
        Ok(())
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), ClientError> {
        self.get_mut(id)?.text = text.to_string();
        Ok(())
    }

    fn add_class(&mut self, id: &str, class: &str) -> Result<(), ClientError> {
        self.get_mut(id)?.classes.insert(class.to_string());
        Ok(())
    }

    fn remove_class(&mut self, id: &str, class: &str) -> Result<(), ClientError> {
        self.get_mut(id)?.classes.remove(class);
        Ok(())
    }

    fn toggle_class(&mut self, id: &str, class: &str) -> Result<bool, ClientError> {
        let el = self.get_mut(id)?;
        if el.classes.remove(class) {
            Ok(false)
        } else {
            el.classes.insert(class.to_string());
            Ok(true)
        }
    }

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> Result<(), ClientError> {
        self.get_mut(id)?
            .style
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn elements_with_class(&self, class: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| self.has_class(id, class))
            .cloned()
            .collect()
    }

    fn find_by_attr(&self, name: &str, value: &str) -> Option<String> {
        self.order
            .iter()
            .find(|id| {
                self.elements
                    .get(id.as_str())
                    .and_then(|e| e.attrs.get(name))
                    .is_some_and(|v| v == value)
            })
            .cloned()
    }

    fn mount_chart(&mut self, id: &str, config: &ChartConfig) -> Result<(), ClientError> {
        self.get_mut(id)?.chart = Some(config.clone());
        Ok(())
    }
}
