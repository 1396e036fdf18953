//! One-shot scroll reveal for card groups.
//!
//! The host reports intersection ratios (fraction of an element's area inside
//! the viewport); the animator reveals each observed element the first time
//! its ratio reaches the threshold. Revealed elements stay revealed.

use std::collections::HashMap;

use serde_json::json;

use crate::dom::{with_dom, SharedDom};
use crate::error::ClientError;
use crate::logging::{log, obj, v_str, Domain, Level};

pub const SOLUTION_CARD_CLASS: &str = "solution-card";
pub const CASE_CARD_CLASS: &str = "case-card";
pub const VISIBLE_CLASS: &str = "visible";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed,
}

/// How a revealed element is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEffect {
    /// Inline styles fade and slide the element in.
    InlineStyle,
    /// A stylesheet class takes over the transition.
    Class(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: String,
    pub ratio: f64,
}

impl IntersectionEntry {
    pub fn new(target: &str, ratio: f64) -> Self {
        Self {
            target: target.to_string(),
            ratio,
        }
    }
}

pub struct RevealAnimator {
    group: &'static str,
    threshold: f64,
    effect: RevealEffect,
    transition: Option<&'static str>,
    dom: SharedDom,
    targets: HashMap<String, RevealState>,
}

impl RevealAnimator {
    pub fn new(group: &'static str, threshold: f64, effect: RevealEffect, dom: SharedDom) -> Self {
        Self {
            group,
            threshold,
            effect,
            transition: None,
            dom,
            targets: HashMap::new(),
        }
    }

    /// Solution cards fade in through inline styles with an inline transition.
    pub fn solution_cards(threshold: f64, dom: SharedDom) -> Self {
        let mut animator = Self::new(SOLUTION_CARD_CLASS, threshold, RevealEffect::InlineStyle, dom);
        animator.transition = Some("opacity 0.5s ease, transform 0.5s ease");
        animator
    }

    /// Case-study cards are revealed by the `visible` class.
    pub fn case_cards(threshold: f64, dom: SharedDom) -> Self {
        Self::new(CASE_CARD_CLASS, threshold, RevealEffect::Class(VISIBLE_CLASS), dom)
    }

    pub fn state(&self, id: &str) -> Option<RevealState> {
        self.targets.get(id).copied()
    }

    /// Hide every element of this group found in the DOM and start tracking it.
    pub fn observe_group(&mut self) -> Result<usize, ClientError> {
        let ids = with_dom(&self.dom, |dom| Ok(dom.elements_with_class(self.group)))?;
        self.observe(&ids)?;
        Ok(ids.len())
    }

    /// Put `ids` in the hidden state. Already tracked elements are left alone.
    pub fn observe(&mut self, ids: &[String]) -> Result<(), ClientError> {
        let fresh: Vec<&String> = ids.iter().filter(|id| !self.targets.contains_key(*id)).collect();
        let transition = self.transition;
        with_dom(&self.dom, |dom| {
            for id in &fresh {
                dom.set_style(id, "opacity", "0")?;
                dom.set_style(id, "transform", "translateY(20px)")?;
                if let Some(transition) = transition {
                    dom.set_style(id, "transition", transition)?;
                }
            }
            Ok(())
        })?;
        for id in fresh {
            self.targets.insert(id.clone(), RevealState::Hidden);
        }
        Ok(())
    }

    /// Apply intersection reports. Returns the ids revealed by this call.
    pub fn on_intersection(&mut self, entries: &[IntersectionEntry]) -> Result<Vec<String>, ClientError> {
        let crossing: Vec<String> = entries
            .iter()
            .filter(|e| e.ratio >= self.threshold)
            .filter(|e| self.targets.get(&e.target) == Some(&RevealState::Hidden))
            .map(|e| e.target.clone())
            .collect();
        if crossing.is_empty() {
            return Ok(crossing);
        }

        let effect = self.effect;
        with_dom(&self.dom, |dom| {
            for id in &crossing {
                match effect {
                    RevealEffect::InlineStyle => {
                        dom.set_style(id, "opacity", "1")?;
                        dom.set_style(id, "transform", "translateY(0)")?;
                    }
                    RevealEffect::Class(class) => dom.add_class(id, class)?,
                }
            }
            Ok(())
        })?;
        for id in &crossing {
            self.targets.insert(id.clone(), RevealState::Revealed);
        }
        log(
            Level::Debug,
            Domain::Reveal,
            "revealed",
            obj(&[("group", v_str(self.group)), ("count", json!(crossing.len()))]),
        );
        Ok(crossing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use std::sync::{Arc, Mutex};

    fn dom() -> (Arc<Mutex<MemoryDom>>, SharedDom) {
        let dom = Arc::new(Mutex::new(MemoryDom::page_layout(0)));
        let shared: SharedDom = dom.clone();
        (dom, shared)
    }

    #[test]
    fn observed_cards_start_hidden() {
        let (dom, shared) = dom();
        let mut solutions = RevealAnimator::solution_cards(0.2, shared);
        assert_eq!(solutions.observe_group().unwrap(), 5);

        let dom = dom.lock().unwrap();
        let card = dom.element("solution-healing").unwrap();
        assert_eq!(card.style("opacity"), Some("0"));
        assert_eq!(card.style("transform"), Some("translateY(20px)"));
        assert_eq!(card.style("transition"), Some("opacity 0.5s ease, transform 0.5s ease"));
        assert_eq!(solutions.state("solution-healing"), Some(RevealState::Hidden));
    }

    #[test]
    fn reveal_requires_threshold() {
        let (dom, shared) = dom();
        let mut solutions = RevealAnimator::solution_cards(0.2, shared);
        solutions.observe_group().unwrap();

        let revealed = solutions
            .on_intersection(&[
                IntersectionEntry::new("solution-healing", 0.19),
                IntersectionEntry::new("solution-stress_relief", 0.2),
            ])
            .unwrap();
        assert_eq!(revealed, vec!["solution-stress_relief".to_string()]);

        let dom = dom.lock().unwrap();
        assert_eq!(dom.element("solution-healing").unwrap().style("opacity"), Some("0"));
        let shown = dom.element("solution-stress_relief").unwrap();
        assert_eq!(shown.style("opacity"), Some("1"));
        assert_eq!(shown.style("transform"), Some("translateY(0)"));
    }

    #[test]
    fn reveal_is_monotonic() {
        let (dom, shared) = dom();
        let mut cases = RevealAnimator::case_cards(0.2, shared);
        cases.observe_group().unwrap();

        cases.on_intersection(&[IntersectionEntry::new("case-rehabilitation", 0.5)]).unwrap();
        let again = cases
            .on_intersection(&[IntersectionEntry::new("case-rehabilitation", 0.0)])
            .unwrap();
        assert!(again.is_empty());
        // Re-observing must not hide a revealed card.
        cases.observe(&["case-rehabilitation".to_string()]).unwrap();

        assert_eq!(cases.state("case-rehabilitation"), Some(RevealState::Revealed));
        let dom = dom.lock().unwrap();
        assert!(dom.has_class("case-rehabilitation", VISIBLE_CLASS));
        assert_eq!(dom.element("case-rehabilitation").unwrap().style("transition"), None);
    }

    #[test]
    fn groups_are_independent() {
        let (dom, shared) = dom();
        let mut solutions = RevealAnimator::solution_cards(0.2, shared.clone());
        let mut cases = RevealAnimator::case_cards(0.2, shared);
        solutions.observe_group().unwrap();
        cases.observe_group().unwrap();

        let entries = [IntersectionEntry::new("case-elderly_care", 1.0)];
        assert!(solutions.on_intersection(&entries).unwrap().is_empty());
        assert_eq!(cases.on_intersection(&entries).unwrap().len(), 1);
        assert!(dom.lock().unwrap().has_class("case-elderly_care", VISIBLE_CLASS));
    }
}
