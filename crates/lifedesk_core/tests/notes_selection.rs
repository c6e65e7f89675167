mod common;

use common::{accept, signed_in, Harness};
use lifedesk_core::model::notes::{Notebook, PageDraft, Section};
use lifedesk_core::transport::ApiErrorKind;
use lifedesk_core::{DeleteOutcome, NotesController};
use serde_json::{json, Value};

fn script_tree(h: &Harness) {
    h.transport
        .always("GET /notebooks/", json!([{"id": 1, "title": "Work"}, {"id": 2, "title": "Home"}]));
    h.transport.always(
        "GET /notebooks/1/sections/",
        json!([{"id": 10, "title": "Meetings", "notebook_id": 1}]),
    );
    h.transport.always(
        "GET /sections/10/pages/",
        json!([{"id": 100, "title": "Standup", "content": "notes", "section_id": 10}]),
    );
}

async fn open_full_chain(h: &Harness) -> NotesController {
    script_tree(h);
    let notes = NotesController::new(h.ctx.clone());
    let notebooks = notes.load_notebooks().await.unwrap();
    let sections = notes.select_notebook(notebooks[0].clone()).await.unwrap();
    let pages = notes.select_section(sections[0].clone()).await.unwrap();
    notes.open_page(pages[0].clone()).unwrap();
    notes
}

#[tokio::test]
async fn deleting_selected_notebook_clears_section_and_page() {
    let h = signed_in();
    h.transport.reply("DELETE /notebooks/1", Value::Null);
    let notes = open_full_chain(&h).await;
    assert_eq!(notes.selection().page_id(), Some(100));

    let outcome = notes.delete_notebook(1, &accept).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted);
    let selection = notes.selection();
    assert_eq!(selection.notebook_id(), None);
    assert_eq!(selection.section_id(), None);
    assert_eq!(selection.page_id(), None);
    assert!(notes.sections().items().is_empty());
    assert!(notes.pages().items().is_empty());
    assert_eq!(
        notes.notebooks().items().iter().map(|n| n.id).collect::<Vec<_>>(),
        vec![2]
    );
}

#[tokio::test]
async fn deleting_selected_section_keeps_notebook() {
    let h = signed_in();
    h.transport.reply("DELETE /sections/10", Value::Null);
    let notes = open_full_chain(&h).await;

    notes.delete_section(10, &accept).await.unwrap();

    let selection = notes.selection();
    assert_eq!(selection.notebook_id(), Some(1));
    assert_eq!(selection.section_id(), None);
    assert_eq!(selection.page_id(), None);
    assert!(notes.pages().items().is_empty());
}

#[tokio::test]
async fn selecting_another_notebook_resets_pages() {
    let h = signed_in();
    h.transport.always("GET /notebooks/2/sections/", json!([]));
    let notes = open_full_chain(&h).await;

    notes
        .select_notebook(Notebook {
            id: 2,
            title: "Home".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(notes.selection().section_id(), None);
    assert!(notes.pages().items().is_empty());
    assert_eq!(notes.sections().filter(), Some(2));
}

#[tokio::test]
async fn section_requires_selected_notebook() {
    let h = signed_in();
    let notes = NotesController::new(h.ctx.clone());

    let err = notes.create_section("Plans").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Validation);

    let err = notes
        .select_section(Section {
            id: 10,
            title: "Orphan".to_string(),
            notebook_id: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Validation);
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test]
async fn created_page_is_opened_and_saved_with_put() {
    let h = signed_in();
    h.transport.reply(
        "POST /sections/10/pages/",
        json!({"id": 101, "title": "Retro", "content": "", "section_id": 10}),
    );
    h.transport.reply(
        "PUT /pages/101",
        json!({"id": 101, "title": "Retro", "content": "went well", "section_id": 10}),
    );
    let notes = open_full_chain(&h).await;

    let page = notes
        .create_page(&PageDraft {
            title: "Retro".to_string(),
            content: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(notes.selection().page_id(), Some(page.id));

    notes
        .save_page(
            101,
            &PageDraft {
                title: "Retro".to_string(),
                content: "went well".to_string(),
            },
        )
        .await
        .unwrap();

    let open = notes.selection().page().cloned().unwrap();
    assert_eq!(open.content.as_deref(), Some("went well"));
    let put = h
        .transport
        .requests()
        .into_iter()
        .find(|request| request.route_key() == "PUT /pages/101")
        .unwrap();
    assert_eq!(put.token.as_deref(), Some(common::TEST_TOKEN));
}
