// tests/integration/fixture_parsing.rs
//! Recorded API responses parsed through the client's response parser.

use super::common::*;
use notion_source::api::parser::parse_result_page;
use notion_source::api::ApiResponse;
use notion_source::model::{
    BlockContent, FileObject, Icon, Mention, PropertyConfig, PropertyTypeValue, RichTextContent,
    UserKind,
};
use notion_source::*;
use pretty_assertions::assert_eq;

#[test]
fn search_results_keep_good_pages_and_reject_broken_ones() {
    let page: ResultPage<SearchResult> = fixture_page("search_pages");

    assert_eq!(page.results.len(), 2);
    assert!(page.has_more);
    assert_eq!(
        page.next_cursor.as_deref(),
        Some("0b7e6a2c-8d4f-4c1e-9a3b-5d6e7f8a9b0c")
    );
    assert_eq!(page.rejected.len(), 1);
    assert_eq!(
        page.rejected[0].object_id.as_deref(),
        Some("0b7e6a2c-8d4f-4c1e-9a3b-5d6e7f8a9b0c")
    );
    assert!(page.rejected[0].reason.contains("created_time"));

    let SearchResult::Page(launch) = &page.results[0] else {
        panic!("expected a page, got {:?}", page.results[0]);
    };
    assert_eq!(launch.title(), "Launch plan");
    assert!(!launch.is_removed());
    assert!(launch
        .parent
        .is_database(&NotionId::parse("1abcd4128533800c984cf7a33514bc7d").unwrap()));
    assert_eq!(launch.icon, Some(Icon::Emoji { emoji: "🚀".to_string() }));
    assert_eq!(launch.properties.get_number("Score"), Some(42.0));
    assert_eq!(launch.properties.get_checkbox("Done"), Some(false));
    assert_eq!(launch.properties.get_select("Status"), Some("In progress"));
    assert_eq!(
        launch
            .properties
            .get("Verified")
            .map(|property| &property.value),
        Some(&PropertyTypeValue::Unsupported)
    );

    let SearchResult::Page(old) = &page.results[1] else {
        panic!("expected a page, got {:?}", page.results[1]);
    };
    assert!(old.is_removed());
    assert!(matches!(&old.cover, Some(FileObject::External { .. })));
}

#[test]
fn database_schemas_parse_with_unknown_columns() {
    let page: ResultPage<SearchResult> = fixture_page("search_databases");
    assert!(page.rejected.is_empty());

    let SearchResult::Database(database) = &page.results[0] else {
        panic!("expected a database, got {:?}", page.results[0]);
    };
    assert_eq!(database.title(), "Key Highlights");
    assert!(database.is_inline);
    assert_eq!(database.properties.len(), 5);
    assert!(matches!(
        database.properties.get("Stage").map(|schema| &schema.config),
        Some(PropertyConfig::Select { select }) if select.options.len() == 2
    ));
    assert_eq!(
        database.properties.get("Button").map(|schema| &schema.config),
        Some(&PropertyConfig::Unsupported)
    );
}

#[test]
fn block_children_cover_the_common_block_types() {
    let page: ResultPage<Block> = fixture_page("blocks_children");

    assert_eq!(page.results.len(), 6);
    assert_eq!(page.rejected.len(), 1);
    assert_eq!(
        page.rejected[0].object_id.as_deref(),
        Some("9e8d7c6b-5a49-4382-9170-6f5e4d3c2b1a")
    );

    let types: Vec<_> = page.results.iter().map(Block::block_type).collect();
    assert_eq!(
        types,
        vec!["heading_1", "paragraph", "to_do", "child_database", "image", "unsupported"]
    );

    let paragraph = &page.results[1];
    assert_eq!(paragraph.plain_text(), "Ship it with @Grace");
    assert!(paragraph.should_descend());
    match &paragraph.content {
        BlockContent::Paragraph { paragraph } => {
            assert!(paragraph.rich_text[0].annotations.bold);
            assert!(matches!(
                &paragraph.rich_text[1].content,
                RichTextContent::Mention {
                    mention: Mention::User { .. }
                }
            ));
        }
        other => panic!("expected a paragraph, got {:?}", other),
    }

    let child_database = &page.results[3];
    assert!(child_database.has_children);
    assert!(!child_database.should_descend());

    match &page.results[4].content {
        BlockContent::Image { image } => {
            assert_eq!(image.file.url(), "https://example.com/diagram.png")
        }
        other => panic!("expected an image, got {:?}", other),
    }
}

#[test]
fn users_and_comments_parse() {
    let users: ResultPage<User> = fixture_page("users");
    assert_eq!(users.results.len(), 2);
    assert_eq!(users.results[0].email(), Some("ada@example.com"));
    assert!(matches!(
        &users.results[1].kind,
        UserKind::Bot { bot } if bot.workspace_name.as_deref() == Some("Acme")
    ));

    let comments: ResultPage<Comment> = fixture_page("comments");
    assert_eq!(comments.results.len(), 1);
    assert_eq!(comments.results[0].text(), "Can we move the date?");
    assert_eq!(
        comments.results[0].discussion_id,
        "f1407351-36f5-4c49-a13c-49f8ba11776d"
    );
}

#[test]
fn a_broken_envelope_fails_the_whole_page() {
    let result = parse_result_page::<Block>(ApiResponse {
        data: r#"{"object": "list", "results": "nope"}"#.to_string(),
        status: reqwest::StatusCode::OK,
        url: "https://api.notion.com/v1/blocks/x/children".to_string(),
    });
    assert!(matches!(result, Err(AppError::MalformedResponse(_))));
}

#[test]
fn error_bodies_become_service_errors() {
    let result = parse_result_page::<User>(ApiResponse {
        data: r#"{"object":"error","status":429,"code":"rate_limited","message":"Slow down"}"#
            .to_string(),
        status: reqwest::StatusCode::TOO_MANY_REQUESTS,
        url: "https://api.notion.com/v1/users".to_string(),
    });

    match result {
        Err(error @ AppError::NotionService { .. }) => assert!(error.is_retryable()),
        other => panic!("expected a service error, got {:?}", other),
    }
}
