//! Notebook -> section -> page browsing and editing.
//!
//! # Invariants
//! - The section list always belongs to the selected notebook and the page
//!   list to the selected section; with nothing selected they are empty.
//! - Deleting a selected notebook or section clears its descendants from
//!   both the selection and the dependent lists.

use super::{
    ControllerContext, Creatable, DeleteOutcome, Deletable, Resource, ResourceController,
    Updatable,
};
use crate::model::notes::{Notebook, Page, PageDraft, Section, TitleDraft};
use crate::model::selection::SelectionChain;
use crate::model::EntityId;
use crate::notify::Confirm;
use crate::transport::{ApiError, ApiRequest, ApiResult};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct Notebooks;

impl Resource for Notebooks {
    type Filter = ();
    type Entity = Notebook;

    const NAME: &'static str = "notebooks";
    const LABEL: &'static str = "Notebook";

    fn list_request(_filter: &()) -> Option<ApiRequest> {
        Some(ApiRequest::get("/notebooks/"))
    }
}

impl Creatable for Notebooks {
    type Draft = TitleDraft;

    fn create_request(_filter: &(), draft: &TitleDraft) -> ApiResult<ApiRequest> {
        ApiRequest::post("/notebooks/").with_json(draft)
    }
}

impl Deletable for Notebooks {
    const DELETE_PROMPT: &'static str =
        "Are you sure you want to delete this notebook and all of its sections?";

    fn delete_request(id: EntityId) -> ApiRequest {
        ApiRequest::delete(format!("/notebooks/{id}"))
    }
}

/// Sections of one notebook; filter is the notebook id.
pub struct Sections;

impl Resource for Sections {
    type Filter = Option<EntityId>;
    type Entity = Section;

    const NAME: &'static str = "sections";
    const LABEL: &'static str = "Section";

    fn list_request(notebook_id: &Option<EntityId>) -> Option<ApiRequest> {
        notebook_id.map(|id| ApiRequest::get(format!("/notebooks/{id}/sections/")))
    }
}

impl Creatable for Sections {
    type Draft = TitleDraft;

    fn create_request(notebook_id: &Option<EntityId>, draft: &TitleDraft) -> ApiResult<ApiRequest> {
        let id = notebook_id.ok_or_else(|| ApiError::local("Select a notebook first"))?;
        ApiRequest::post(format!("/notebooks/{id}/sections/")).with_json(draft)
    }
}

impl Deletable for Sections {
    const DELETE_PROMPT: &'static str =
        "Are you sure you want to delete this section and all of its pages?";

    fn delete_request(id: EntityId) -> ApiRequest {
        ApiRequest::delete(format!("/sections/{id}"))
    }
}

/// Pages of one section; filter is the section id.
pub struct Pages;

impl Resource for Pages {
    type Filter = Option<EntityId>;
    type Entity = Page;

    const NAME: &'static str = "pages";
    const LABEL: &'static str = "Page";

    fn list_request(section_id: &Option<EntityId>) -> Option<ApiRequest> {
        section_id.map(|id| ApiRequest::get(format!("/sections/{id}/pages/")))
    }
}

impl Creatable for Pages {
    type Draft = PageDraft;

    fn create_request(section_id: &Option<EntityId>, draft: &PageDraft) -> ApiResult<ApiRequest> {
        let id = section_id.ok_or_else(|| ApiError::local("Select a section first"))?;
        ApiRequest::post(format!("/sections/{id}/pages/")).with_json(draft)
    }
}

impl Updatable for Pages {
    type Patch = PageDraft;

    fn update_request(id: EntityId, patch: &PageDraft) -> ApiResult<ApiRequest> {
        ApiRequest::put(format!("/pages/{id}")).with_json(patch)
    }
}

impl Deletable for Pages {
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this page?";

    fn delete_request(id: EntityId) -> ApiRequest {
        ApiRequest::delete(format!("/pages/{id}"))
    }
}

pub struct NotesController {
    ctx: ControllerContext,
    notebooks: ResourceController<Notebooks>,
    sections: ResourceController<Sections>,
    pages: ResourceController<Pages>,
    selection: Mutex<SelectionChain>,
}

impl NotesController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self {
            notebooks: ResourceController::new(ctx.clone(), ()),
            sections: ResourceController::new(ctx.clone(), None),
            pages: ResourceController::new(ctx.clone(), None),
            selection: Mutex::new(SelectionChain::default()),
            ctx,
        }
    }

    pub fn notebooks(&self) -> &ResourceController<Notebooks> {
        &self.notebooks
    }

    pub fn sections(&self) -> &ResourceController<Sections> {
        &self.sections
    }

    pub fn pages(&self) -> &ResourceController<Pages> {
        &self.pages
    }

    fn chain(&self) -> MutexGuard<'_, SelectionChain> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn selection(&self) -> SelectionChain {
        self.chain().clone()
    }

    pub async fn load_notebooks(&self) -> ApiResult<Vec<Notebook>> {
        self.notebooks.load(()).await
    }

    /// Selects `notebook`, drops section and page, and loads its sections.
    pub async fn select_notebook(&self, notebook: Notebook) -> ApiResult<Vec<Section>> {
        let notebook_id = notebook.id;
        self.chain().select_notebook(notebook);
        self.pages.reset(None);
        self.sections.reset(Some(notebook_id));
        self.sections.load(Some(notebook_id)).await
    }

    /// Selects `section` in the current notebook and loads its pages.
    pub async fn select_section(&self, section: Section) -> ApiResult<Vec<Page>> {
        let section_id = section.id;
        let selected = self.chain().select_section(section);
        if !selected {
            return Err(self.reject("Select a notebook first"));
        }
        self.pages.reset(Some(section_id));
        self.pages.load(Some(section_id)).await
    }

    pub fn open_page(&self, page: Page) -> ApiResult<()> {
        let opened = self.chain().open_page(page);
        if opened {
            Ok(())
        } else {
            Err(self.reject("Select a section first"))
        }
    }

    pub fn close_page(&self) {
        self.chain().close_page();
    }

    pub async fn create_notebook(&self, title: &str) -> ApiResult<Notebook> {
        let draft = self.title_draft(title)?;
        self.notebooks.create(&draft).await
    }

    /// Creates a section in the selected notebook.
    pub async fn create_section(&self, title: &str) -> ApiResult<Section> {
        let draft = self.title_draft(title)?;
        if self.chain().notebook_id().is_none() {
            return Err(self.reject("Select a notebook first"));
        }
        self.sections.create(&draft).await
    }

    /// Creates a page in the selected section and opens it.
    pub async fn create_page(&self, draft: &PageDraft) -> ApiResult<Page> {
        if draft.title.trim().is_empty() {
            return Err(self.reject("title is required"));
        }
        if self.chain().section_id().is_none() {
            return Err(self.reject("Select a section first"));
        }
        let page = self.pages.create(draft).await?;
        self.chain().open_page(page.clone());
        Ok(page)
    }

    /// Saves title and content of a page with `PUT`.
    pub async fn save_page(&self, page_id: EntityId, draft: &PageDraft) -> ApiResult<Page> {
        let page = self.pages.update(page_id, draft).await?;
        self.chain().refresh_page(page.clone());
        Ok(page)
    }

    pub async fn delete_notebook(
        &self,
        notebook_id: EntityId,
        confirm: &dyn Confirm,
    ) -> ApiResult<DeleteOutcome> {
        let outcome = self.notebooks.delete(notebook_id, confirm).await?;
        if outcome == DeleteOutcome::Deleted {
            let cleared = self.chain().notebook_deleted(notebook_id);
            if cleared.notebook {
                self.sections.reset(None);
                self.pages.reset(None);
            }
        }
        Ok(outcome)
    }

    pub async fn delete_section(
        &self,
        section_id: EntityId,
        confirm: &dyn Confirm,
    ) -> ApiResult<DeleteOutcome> {
        let outcome = self.sections.delete(section_id, confirm).await?;
        if outcome == DeleteOutcome::Deleted {
            let cleared = self.chain().section_deleted(section_id);
            if cleared.section {
                self.pages.reset(None);
            }
        }
        Ok(outcome)
    }

    pub async fn delete_page(
        &self,
        page_id: EntityId,
        confirm: &dyn Confirm,
    ) -> ApiResult<DeleteOutcome> {
        let outcome = self.pages.delete(page_id, confirm).await?;
        if outcome == DeleteOutcome::Deleted {
            self.chain().page_deleted(page_id);
        }
        Ok(outcome)
    }

    fn title_draft(&self, title: &str) -> ApiResult<TitleDraft> {
        let title = title.trim();
        if title.is_empty() {
            return Err(self.reject("title is required"));
        }
        Ok(TitleDraft {
            title: title.to_string(),
        })
    }

    fn reject(&self, message: &str) -> ApiError {
        let err = ApiError::local(message);
        self.ctx
            .notify_error("notes", "Could not update notes".to_string(), &err);
        err
    }
}
