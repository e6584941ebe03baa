use bson::doc;
use docquery::Store;
use docquery::document::{CREATED_AT_FIELD, ID_FIELD, VERSION_FIELD};
use docquery::query::ListParams;

fn tours_store() -> Store {
    let store = Store::new();
    store.create_collection("tours");
    for i in 0..12i32 {
        store
            .insert_document(
                "tours",
                doc! {
                    "name": format!("Easy Tour {i:02}"),
                    "difficulty": "easy",
                    "price": 1200 - i * 100,
                    "ratingsAverage": 4.0 + f64::from(i % 3) * 0.3,
                    "duration": 3 + i,
                },
            )
            .unwrap();
    }
    for i in 0..4i32 {
        store
            .insert_document(
                "tours",
                doc! {
                    "name": format!("Hard Tour {i}"),
                    "difficulty": "difficult",
                    "price": 2000 + i * 50,
                    "ratingsAverage": 4.8,
                    "duration": 14,
                },
            )
            .unwrap();
    }
    store
}

#[tokio::test]
async fn end_to_end_list_request() {
    let store = tours_store();
    let params = ListParams::from_pairs([
        ("difficulty", "easy"),
        ("sort", "-price,ratingsAverage"),
        ("fields", "name,price"),
        ("page", "2"),
        ("limit", "5"),
    ]);
    let docs = store.find("tours", params).await.unwrap().to_vec();

    // 12 easy tours, prices 1200 down to 100; page 2 of 5 is ranks 6..=10
    assert_eq!(docs.len(), 5);
    assert_eq!(docs[0].data.get_i32("price").unwrap(), 700);
    assert_eq!(docs[4].data.get_i32("price").unwrap(), 300);
    for d in &docs {
        let mut keys: Vec<&str> = d.data.iter().map(|(k, _)| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![ID_FIELD, "name", "price"]);
    }
    // prices strictly descending here, so the order is fully determined
    for w in docs.windows(2) {
        assert!(w[0].data.get_i32("price").unwrap() > w[1].data.get_i32("price").unwrap());
    }
}

#[tokio::test]
async fn gte_is_a_range_and_scalar_is_exact() {
    let store = tours_store();
    let ranged = store
        .find("tours", ListParams::from_pairs([("duration[gte]", "5")]))
        .await
        .unwrap()
        .to_vec();
    assert!(!ranged.is_empty());
    assert!(ranged.iter().all(|d| d.data.get_i32("duration").unwrap() >= 5));

    let exact = store
        .find("tours", ListParams::from_pairs([("duration", "5")]))
        .await
        .unwrap()
        .to_vec();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].data.get_i32("duration").unwrap(), 5);
}

#[tokio::test]
async fn default_sort_is_deterministic_across_runs() {
    let store = Store::new();
    store.create_collection("reviews");
    // Shared timestamps force the identifier tie-break to do the ordering
    for i in 0..20i64 {
        store
            .insert_document(
                "reviews",
                doc! {
                    "rating": i % 5,
                    "createdAt": bson::DateTime::from_millis(1_700_000_000_000 + (i / 4)),
                },
            )
            .unwrap();
    }
    let ids = |docs: Vec<docquery::document::Document>| -> Vec<String> {
        docs.iter().map(|d| d.data.get_str(ID_FIELD).unwrap().to_string()).collect()
    };
    let first = ids(store.find("reviews", ListParams::new()).await.unwrap().to_vec());
    let second = ids(store.find("reviews", ListParams::new()).await.unwrap().to_vec());
    assert_eq!(first, second);
    assert_eq!(first.len(), 20);

    // newest-first, ascending identifier inside each timestamp group
    let docs = store.find("reviews", ListParams::new()).await.unwrap().to_vec();
    for w in docs.windows(2) {
        let t0 = w[0].data.get_datetime(CREATED_AT_FIELD).unwrap();
        let t1 = w[1].data.get_datetime(CREATED_AT_FIELD).unwrap();
        assert!(t0 >= t1);
        if t0 == t1 {
            assert!(
                w[0].data.get_str(ID_FIELD).unwrap() < w[1].data.get_str(ID_FIELD).unwrap()
            );
        }
    }
}

#[tokio::test]
async fn page_beyond_result_count_is_empty_not_an_error() {
    let store = tours_store();
    let docs = store
        .find("tours", ListParams::from_pairs([("page", "99"), ("limit", "10")]))
        .await
        .unwrap()
        .to_vec();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn version_field_hidden_by_default_but_projectable() {
    let store = tours_store();
    let docs = store.find("tours", ListParams::new()).await.unwrap().to_vec();
    assert!(docs.iter().all(|d| d.data.get(VERSION_FIELD).is_none()));
    assert!(docs.iter().all(|d| d.data.get("name").is_some()));

    let projected = store
        .find("tours", ListParams::from_pairs([("fields", format!("{VERSION_FIELD},name").as_str())]))
        .await
        .unwrap()
        .to_vec();
    assert!(projected.iter().all(|d| d.data.get(VERSION_FIELD).is_some()));
}

#[tokio::test]
async fn unknown_filter_fields_match_nothing() {
    let store = tours_store();
    let docs = store
        .find("tours", ListParams::from_pairs([("no_such_field", "x")]))
        .await
        .unwrap()
        .to_vec();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn count_ignores_pagination() {
    let store = tours_store();
    let params = ListParams::from_pairs([("difficulty", "easy"), ("page", "2"), ("limit", "5")]);
    assert_eq!(store.count("tours", params).await.unwrap(), 12);
}
