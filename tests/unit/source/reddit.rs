use super::*;

fn source() -> RedditSource {
    RedditSource::new(&SourceConfig {
        base_url: "https://example.test/".to_string(),
        ..SourceConfig::default()
    })
    .unwrap()
}

#[test]
fn page_url_includes_window_only_for_top() {
    let s = source();
    assert_eq!(
        s.page_url("nosleep", SortMode::Top, Some(TimeWindow::Year), 100, None),
        "https://example.test/r/nosleep/top.json?limit=100&raw_json=1&t=year"
    );
    assert_eq!(
        s.page_url("nosleep", SortMode::Hot, Some(TimeWindow::Year), 50, Some("t3_abc")),
        "https://example.test/r/nosleep/hot.json?limit=50&raw_json=1&after=t3_abc"
    );
}

#[test]
fn listing_json_maps_to_candidates() {
    let json = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_next",
            "children": [
                {"kind": "t3", "data": {
                    "id": "abc", "title": "A title", "selftext": "Body text",
                    "score": 321, "num_comments": 12,
                    "permalink": "/r/nosleep/comments/abc/a_title/", "stickied": true,
                    "over_18": false
                }},
                {"kind": "t3", "data": {"id": "def"}}
            ]
        }
    }"#;
    let listing: RedditListing = serde_json::from_str(json).unwrap();
    assert_eq!(listing.data.after.as_deref(), Some("t3_next"));

    let items: Vec<CandidateItem> = listing
        .data
        .children
        .into_iter()
        .map(|c| c.data.into_candidate("nosleep"))
        .collect();
    assert_eq!(items[0].id, "abc");
    assert_eq!(items[0].score, 321);
    assert_eq!(items[0].comment_count, 12);
    assert!(items[0].stickied);
    assert_eq!(items[0].source_group, "nosleep");
    assert_eq!(items[1].body, "");
    assert_eq!(items[1].score, 0);
}
