//! Property-Based Tests for the Store Module
//!
//! Uses proptest to check item-sequence behaviour of the document store.

use proptest::prelude::*;

use crate::config::PoolConfig;
use crate::models::{TodoItem, TodoList};
use crate::store::{MemoryStore, TodoStore};

// == Strategies ==
/// Generates non-empty item texts
fn item_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}".prop_map(|s| s)
}

fn item_texts_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(item_text_strategy(), 1..20)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

fn seeded(texts: &[String]) -> (MemoryStore, TodoList) {
    let store = MemoryStore::new("props", PoolConfig::default()).unwrap();
    let mut list = TodoList::new("props", "user");
    list.items = texts.iter().map(TodoItem::new).collect();
    (store, list)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Toggling any item twice leaves the whole list as it started.
    #[test]
    fn prop_toggle_twice_is_identity(texts in item_texts_strategy(), pick in any::<prop::sample::Index>()) {
        runtime().block_on(async {
            let (store, list) = seeded(&texts);
            store.insert_list(list.clone()).await.unwrap();
            let target = &list.items[pick.index(list.items.len())];

            for _ in 0..2 {
                let current = store.find_list(&list.id).await.unwrap().unwrap();
                let done = current.item(&target.id).unwrap().done;
                store.set_item_done(&list.id, &target.id, !done).await.unwrap();
            }

            let after = store.find_list(&list.id).await.unwrap().unwrap();
            prop_assert_eq!(after, list);
            Ok(())
        })?;
    }

    // Pulling one item keeps every sibling, in the original order.
    #[test]
    fn prop_pull_preserves_sibling_order(texts in item_texts_strategy(), pick in any::<prop::sample::Index>()) {
        runtime().block_on(async {
            let (store, list) = seeded(&texts);
            store.insert_list(list.clone()).await.unwrap();
            let removed = pick.index(list.items.len());

            let result = store.pull_item(&list.id, &list.items[removed].id).await.unwrap();
            prop_assert_eq!(result.modified, 1);

            let mut expected = list.items.clone();
            expected.remove(removed);
            let after = store.find_list(&list.id).await.unwrap().unwrap();
            prop_assert_eq!(after.items, expected);
            Ok(())
        })?;
    }

    // Pushed items come back in insertion order.
    #[test]
    fn prop_push_appends_in_order(texts in item_texts_strategy()) {
        runtime().block_on(async {
            let (store, _) = seeded(&[]);
            let list = TodoList::new("empty", "user");
            store.insert_list(list.clone()).await.unwrap();

            for text in &texts {
                store.push_item(&list.id, TodoItem::new(text.as_str())).await.unwrap();
            }

            let after = store.find_list(&list.id).await.unwrap().unwrap();
            let stored: Vec<String> = after.items.into_iter().map(|i| i.text).collect();
            prop_assert_eq!(stored, texts);
            Ok(())
        })?;
    }
}
