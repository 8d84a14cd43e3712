// tests/integration/decoder_round_trip.rs
//! Recorded objects through `NotionRecordDecoder` and back.

use super::common::*;
use notion_source::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn recorded_records() -> Vec<Record> {
    let search: ResultPage<SearchResult> = fixture_page("search_pages");
    let databases: ResultPage<SearchResult> = fixture_page("search_databases");
    let blocks: ResultPage<Block> = fixture_page("blocks_children");
    let users: ResultPage<User> = fixture_page("users");
    let comments: ResultPage<Comment> = fixture_page("comments");
    let page_id = NotionId::parse("1abcd412-8533-8084-9d72-c1cd98f9e8ef").unwrap();

    let mut records = Vec::new();
    for hit in search.results.into_iter().chain(databases.results) {
        records.push(match hit {
            SearchResult::Page(page) => Record::Page(page),
            SearchResult::Database(database) => Record::Database(database),
        });
    }
    records.extend(blocks.results.into_iter().map(|block| Record::Block {
        block,
        parent_id: page_id.clone(),
    }));
    records.extend(users.results.into_iter().map(Record::User));
    records.extend(comments.results.into_iter().map(Record::Comment));
    records
}

#[test]
fn every_recorded_object_survives_decode_and_encode() {
    let decoder = NotionRecordDecoder::default();
    let records = recorded_records();
    assert_eq!(records.len(), 12);

    for record in records {
        let item = decoder
            .decode(record.clone())
            .unwrap_or_else(|e| panic!("failed to decode {:?}: {}", record.kind(), e));
        assert_eq!(item.kind, record.kind());
        assert_eq!(item.metadata.source_type, "notion");
        assert_eq!(item.metadata.source_id, item.id);
        assert!(NotionId::parse(&item.id).is_ok());

        let encoded = decoder.encode(&item).unwrap();
        assert_eq!(encoded, record);
    }
}

#[test]
fn decoding_is_deterministic() {
    let decoder = NotionRecordDecoder::default();
    for record in recorded_records() {
        assert_eq!(
            decoder.decode(record.clone()).unwrap(),
            decoder.decode(record).unwrap()
        );
    }
}

#[test]
fn enriched_pages_encode_back_to_page_details() {
    let decoder = NotionRecordDecoder::default();
    let record = Record::PageDetail {
        page: page(7),
        blocks_count: 12,
        comments_count: 0,
    };

    let item = decoder.decode(record.clone()).unwrap();
    assert_eq!(item.kind, ObjectKind::Page);
    assert_eq!(item.property("blocks_count"), Some(&json!(12)));
    assert_eq!(decoder.encode(&item).unwrap(), record);
}

#[test]
fn per_kind_metadata_is_attached() {
    let decoder = NotionRecordDecoder::default();
    let items: Vec<_> = recorded_records()
        .into_iter()
        .map(|record| decoder.decode(record).unwrap())
        .collect();

    let launch = &items[0];
    assert_eq!(launch.property("archived"), Some(&json!(false)));
    assert_eq!(
        launch.property("created_by"),
        Some(&json!("6794760a-1f15-45cd-9c65-0dfe42f5135a"))
    );
    assert_eq!(
        launch.property("edited_by"),
        Some(&json!("92a680bb-6970-4726-952b-4f4c03bff617"))
    );
    assert_eq!(
        launch.metadata.modified_at.map(|at| at.to_rfc3339()),
        Some("2024-03-02T17:42:00+00:00".to_string())
    );

    let archived = &items[1];
    assert_eq!(archived.property("archived"), Some(&json!(true)));
    assert_eq!(archived.property("parent_id"), Some(&serde_json::Value::Null));

    let database = &items[2];
    assert_eq!(database.kind, ObjectKind::Database);
    assert_eq!(database.property("title"), Some(&json!("Key Highlights")));

    let to_do = &items[5];
    assert_eq!(to_do.property("block_type"), Some(&json!("to_do")));
    assert_eq!(to_do.property("has_children"), Some(&json!(false)));

    let bot = &items[10];
    assert_eq!(bot.property("user_type"), Some(&json!("bot")));
    assert_eq!(bot.property("email"), Some(&serde_json::Value::Null));
    assert_eq!(bot.metadata.created_at, None);

    let comment = &items[11];
    assert_eq!(
        comment.property("discussion_id"),
        Some(&json!("f1407351-36f5-4c49-a13c-49f8ba11776d"))
    );
}
