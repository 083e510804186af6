//! Interaction state for the page chrome: navigation menu, resume overlay,
//! back-to-top button, reveal-on-scroll animations and anchor scrolling.
//!
//! Nothing here touches a document. Callers feed in events and apply the
//! returned state to whatever renders the page.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::Datelike;
use log::debug;

use crate::config::PageConfig;

#[derive(Debug, Clone)]
pub struct Page {
    config: PageConfig,
    menu_open: bool,
    resume_visible: bool,
    back_to_top_visible: bool,
}

impl Page {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            menu_open: false,
            resume_visible: false,
            back_to_top_visible: false,
        }
    }

    /// Flip the mobile menu. Returns the new `aria-expanded` value.
    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    /// Following a nav link closes an open menu.
    pub fn nav_link_clicked(&mut self) {
        self.menu_open = false;
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn open_resume(&mut self) {
        self.resume_visible = true;
    }

    pub fn close_resume(&mut self) {
        self.resume_visible = false;
    }

    pub fn key_down(&mut self, key: &str) {
        if key == "Escape" && self.resume_visible {
            self.close_resume();
        }
    }

    /// Clicks inside the overlay content do not close it.
    pub fn overlay_clicked(&mut self, on_backdrop: bool) {
        if on_backdrop {
            self.close_resume();
        }
    }

    pub fn resume_visible(&self) -> bool {
        self.resume_visible
    }

    /// `aria-hidden` for the overlay.
    pub fn resume_aria_hidden(&self) -> bool {
        !self.resume_visible
    }

    /// Body scroll lock while the overlay is up.
    pub fn body_modal_open(&self) -> bool {
        self.resume_visible
    }

    /// Returns whether the back-to-top button should be shown.
    pub fn scrolled(&mut self, offset: f64) -> bool {
        self.back_to_top_visible = offset > self.config.back_to_top_offset;
        self.back_to_top_visible
    }

    pub fn back_to_top_visible(&self) -> bool {
        self.back_to_top_visible
    }

    pub fn reveals<K: Eq + Hash>(&self) -> Reveals<K> {
        Reveals::new(self.config.fade_threshold, self.config.skill_threshold)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(PageConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealKind {
    Fade,
    /// Carries the element's `data-percent` attribute, if any.
    SkillBar(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reveal {
    /// Add the `is-visible` class.
    FadeIn,
    /// Set the inner bar's width, e.g. `"85%"`.
    SkillWidth(String),
}

/// Elements waiting to be revealed. Each reveals once and is dropped.
#[derive(Debug)]
pub struct Reveals<K> {
    fade_threshold: f64,
    skill_threshold: f64,
    pending: HashMap<K, RevealKind>,
}

impl<K: Eq + Hash> Reveals<K> {
    pub fn new(fade_threshold: f64, skill_threshold: f64) -> Self {
        Self {
            fade_threshold,
            skill_threshold,
            pending: HashMap::new(),
        }
    }

    pub fn observe(&mut self, key: K, kind: RevealKind) {
        self.pending.insert(key, kind);
    }

    pub fn is_observed(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Report a visibility ratio for `key`.
    pub fn intersect(&mut self, key: &K, ratio: f64) -> Option<Reveal> {
        let threshold = match self.pending.get(key)? {
            RevealKind::Fade => self.fade_threshold,
            RevealKind::SkillBar(_) => self.skill_threshold,
        };
        // NaN never reaches the threshold
        if !(ratio >= threshold) {
            return None;
        }

        match self.pending.remove(key)? {
            RevealKind::Fade => Some(Reveal::FadeIn),
            RevealKind::SkillBar(percent) => Some(Reveal::SkillWidth(skill_width(percent.as_deref()))),
        }
    }
}

pub fn skill_width(percent: Option<&str>) -> String {
    let percent = match percent {
        Some(p) if !p.is_empty() => p,
        _ => "0",
    };
    format!("{}%", percent)
}

/// Scroll position for an in-page link, clearing the sticky header.
///
/// `element_top` is the target's top relative to the viewport; `None` when
/// nothing matches the href.
pub fn anchor_scroll_target(
    href: &str,
    element_top: Option<f64>,
    page_offset: f64,
    header_height: f64,
) -> Option<f64> {
    if !href.starts_with('#') || href == "#" {
        return None;
    }
    let top = element_top?;
    let target = top + page_offset - header_height;
    debug!("Scrolling to {} at {}", href, target);
    Some(target)
}

pub fn footer_year() -> i32 {
    chrono::Local::now().year()
}
