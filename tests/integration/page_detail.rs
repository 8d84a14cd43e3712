// tests/integration/page_detail.rs
//! Page enrichment: how deep the block tree is walked and what stops it.

use super::common::*;
use notion_source::*;
use pretty_assertions::assert_eq;

fn options(max_depth: u8) -> PageDetailOptions {
    PageDetailOptions {
        include_blocks: true,
        include_comments: true,
        max_depth,
        page_size: 100,
    }
}

/// page 1 -> 10 -> 11 -> 12
fn chain() -> MockRepository {
    MockRepository::new()
        .with_pages(vec![page(1)], 1)
        .with_children(&id(1), vec![paragraph_with_children(10)])
        .with_children(&id(10), vec![paragraph_with_children(11)])
        .with_children(&id(11), vec![paragraph(12, vec![])])
}

#[tokio::test]
async fn depth_limits_the_levels_fetched() {
    let repo = chain();
    let detail = repo.retrieve_page_detail(&id(1), &options(2)).await.unwrap();

    assert_eq!(repo.children_calls(), vec![id(1), id(10)]);
    assert_eq!(detail.block_count(), 2);
    assert_eq!(detail.blocks[0].children.len(), 1);
    assert!(detail.blocks[0].children[0].children.is_empty());
    assert!(detail.blocks[0].children[0].has_children);
}

#[tokio::test]
async fn zero_depth_means_top_level_only() {
    let repo = chain();
    let detail = repo.retrieve_page_detail(&id(1), &options(0)).await.unwrap();

    assert_eq!(repo.children_calls(), vec![id(1)]);
    assert_eq!(detail.block_count(), 1);
}

#[tokio::test]
async fn oversized_depth_walks_the_whole_tree() {
    let repo = chain();
    let detail = repo.retrieve_page_detail(&id(1), &options(u8::MAX)).await.unwrap();

    assert_eq!(repo.children_calls(), vec![id(1), id(10), id(11)]);
    assert_eq!(detail.block_count(), 3);
}

#[tokio::test]
async fn child_pages_are_not_descended_into() {
    let repo = MockRepository::new()
        .with_pages(vec![page(1)], 1)
        .with_children(&id(1), vec![child_page(5), paragraph_with_children(6)])
        .with_children(&id(5), vec![paragraph(50, vec![])])
        .with_children(&id(6), vec![paragraph(60, vec![])]);

    let detail = repo.retrieve_page_detail(&id(1), &options(5)).await.unwrap();

    assert_eq!(repo.children_calls(), vec![id(1), id(6)]);
    assert!(detail.blocks[0].children.is_empty());
    assert_eq!(detail.blocks[1].children.len(), 1);
}

#[tokio::test]
async fn a_failing_subtree_fails_the_whole_detail() {
    let repo = chain().failing_children(&id(10));

    let result = repo.retrieve_page_detail(&id(1), &options(3)).await;
    assert!(matches!(result, Err(AppError::NotionService { .. })));

    // one level up the failure is never reached
    let shallow = repo.retrieve_page_detail(&id(1), &options(1)).await;
    assert!(shallow.is_ok());
}

#[tokio::test]
async fn nested_kinds_are_fetched_only_when_asked_for() {
    let repo = chain().with_comments(&id(1), vec![comment(20, &id(1))]);
    let only_page = PageDetailOptions {
        include_blocks: false,
        include_comments: false,
        ..options(3)
    };

    let detail = repo.retrieve_page_detail(&id(1), &only_page).await.unwrap();
    assert!(detail.blocks.is_empty());
    assert!(detail.comments.is_empty());
    assert!(repo.children_calls().is_empty());

    let with_comments = repo.retrieve_page_detail(&id(1), &options(1)).await.unwrap();
    assert_eq!(with_comments.comments.len(), 1);
    assert_eq!(with_comments.comments[0].text(), "comment 20");
    assert_eq!(with_comments.page.id.as_str(), id(1).as_str());
}

#[tokio::test]
async fn a_missing_page_fails_before_any_children_call() {
    let repo = chain();
    let result = repo.retrieve_page_detail(&id(99), &options(3)).await;

    assert!(matches!(result, Err(AppError::NotionService { .. })));
    assert!(repo.children_calls().is_empty());
}
