//! Notes selection chain: notebook -> section -> page.
//!
//! # Invariants
//! - A section is only selected while a notebook is selected.
//! - A page is only open while a section is selected.
//! - Changing or clearing an ancestor clears every descendant.

use super::notes::{Notebook, Page, Section};
use super::EntityId;

/// Which levels a transition cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cleared {
    pub notebook: bool,
    pub section: bool,
    pub page: bool,
}

impl Cleared {
    pub fn any(&self) -> bool {
        self.notebook || self.section || self.page
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChain {
    notebook: Option<Notebook>,
    section: Option<Section>,
    page: Option<Page>,
}

impl SelectionChain {
    pub fn notebook(&self) -> Option<&Notebook> {
        self.notebook.as_ref()
    }

    pub fn section(&self) -> Option<&Section> {
        self.section.as_ref()
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn notebook_id(&self) -> Option<EntityId> {
        self.notebook.as_ref().map(|notebook| notebook.id)
    }

    pub fn section_id(&self) -> Option<EntityId> {
        self.section.as_ref().map(|section| section.id)
    }

    pub fn page_id(&self) -> Option<EntityId> {
        self.page.as_ref().map(|page| page.id)
    }

    /// Selects a notebook; section and page are always cleared.
    pub fn select_notebook(&mut self, notebook: Notebook) {
        self.notebook = Some(notebook);
        self.section = None;
        self.page = None;
    }

    /// Selects a section inside the current notebook; the page is cleared.
    ///
    /// Returns `false` without changes when no notebook is selected.
    pub fn select_section(&mut self, section: Section) -> bool {
        if self.notebook.is_none() {
            return false;
        }
        self.section = Some(section);
        self.page = None;
        true
    }

    /// Opens a page inside the current section.
    ///
    /// Returns `false` without changes when no section is selected.
    pub fn open_page(&mut self, page: Page) -> bool {
        if self.section.is_none() {
            return false;
        }
        self.page = Some(page);
        true
    }

    /// Replaces the open page record when ids match (after a save).
    pub fn refresh_page(&mut self, page: Page) {
        if self.page_id() == Some(page.id) {
            self.page = Some(page);
        }
    }

    pub fn close_page(&mut self) {
        self.page = None;
    }

    pub fn clear(&mut self) -> Cleared {
        Cleared {
            notebook: self.notebook.take().is_some(),
            section: self.section.take().is_some(),
            page: self.page.take().is_some(),
        }
    }

    /// Cascades a notebook deletion; no-op unless it is the selected one.
    pub fn notebook_deleted(&mut self, id: EntityId) -> Cleared {
        if self.notebook_id() != Some(id) {
            return Cleared::default();
        }
        self.clear()
    }

    /// Cascades a section deletion; the notebook stays selected.
    pub fn section_deleted(&mut self, id: EntityId) -> Cleared {
        if self.section_id() != Some(id) {
            return Cleared::default();
        }
        Cleared {
            notebook: false,
            section: self.section.take().is_some(),
            page: self.page.take().is_some(),
        }
    }

    pub fn page_deleted(&mut self, id: EntityId) -> Cleared {
        if self.page_id() != Some(id) {
            return Cleared::default();
        }
        self.page = None;
        Cleared {
            page: true,
            ..Cleared::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionChain;
    use crate::model::notes::{Notebook, Page, Section};

    fn full_chain() -> SelectionChain {
        let mut chain = SelectionChain::default();
        chain.select_notebook(Notebook {
            id: 1,
            title: "Work".to_string(),
        });
        assert!(chain.select_section(Section {
            id: 10,
            title: "Meetings".to_string(),
            notebook_id: Some(1),
        }));
        assert!(chain.open_page(Page {
            id: 100,
            title: "Standup".to_string(),
            content: None,
            section_id: Some(10),
        }));
        chain
    }

    #[test]
    fn selecting_notebook_clears_descendants() {
        let mut chain = full_chain();
        chain.select_notebook(Notebook {
            id: 2,
            title: "Home".to_string(),
        });
        assert_eq!(chain.notebook_id(), Some(2));
        assert_eq!(chain.section_id(), None);
        assert_eq!(chain.page_id(), None);
    }

    #[test]
    fn selecting_section_clears_page_only() {
        let mut chain = full_chain();
        chain.select_section(Section {
            id: 11,
            title: "Plans".to_string(),
            notebook_id: Some(1),
        });
        assert_eq!(chain.notebook_id(), Some(1));
        assert_eq!(chain.section_id(), Some(11));
        assert_eq!(chain.page_id(), None);
    }

    #[test]
    fn section_requires_notebook_and_page_requires_section() {
        let mut chain = SelectionChain::default();
        assert!(!chain.select_section(Section {
            id: 10,
            title: "Orphan".to_string(),
            notebook_id: None,
        }));
        assert!(!chain.open_page(Page {
            id: 100,
            title: "Orphan".to_string(),
            content: None,
            section_id: None,
        }));
        assert_eq!(chain, SelectionChain::default());
    }

    #[test]
    fn deleting_selected_notebook_clears_everything() {
        let mut chain = full_chain();
        let cleared = chain.notebook_deleted(1);
        assert!(cleared.notebook && cleared.section && cleared.page);
        assert_eq!(chain, SelectionChain::default());
    }

    #[test]
    fn deleting_selected_section_keeps_notebook() {
        let mut chain = full_chain();
        let cleared = chain.section_deleted(10);
        assert!(!cleared.notebook && cleared.section && cleared.page);
        assert_eq!(chain.notebook_id(), Some(1));
        assert_eq!(chain.section_id(), None);
        assert_eq!(chain.page_id(), None);
    }

    #[test]
    fn deleting_unselected_ids_changes_nothing() {
        let mut chain = full_chain();
        assert!(!chain.notebook_deleted(99).any());
        assert!(!chain.section_deleted(99).any());
        assert!(!chain.page_deleted(99).any());
        assert_eq!(chain, full_chain());
    }
}
