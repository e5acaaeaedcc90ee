//! Property-based tests using proptest
//!
//! These tests exercise the applet lifecycle with randomized field sets
//! against the in-memory service.

mod common;

use appstore_provider::resource::{AppletConfig, ReadOutcome};
use common::InMemoryAppStore;
use proptest::prelude::*;
use serde_json::json;

/// Generate an arbitrary, valid applet definition
fn arb_config() -> impl Strategy<Value = AppletConfig> {
    (
        "[A-Za-z][A-Za-z0-9 ]{0,40}",                       // name
        "[A-Za-z][A-Za-z0-9 .,!?'-]{0,119}",               // description
        "[A-Za-z][A-Za-z0-9 &]{0,30}",                      // author display
        "[a-z]{1,10}(\\.[a-z]{2,5})?/[a-z0-9-]{1,20}\\.png", // image host/path
        "[a-z]{1,10}\\.[a-z]{2,5}(/[a-z0-9-]{0,20})?",      // app host/path
    )
        .prop_map(|(name, description, author_display, image, url)| AppletConfig {
            name,
            description,
            author_display,
            image: format!("https://{}", image),
            url: format!("https://{}", url),
        })
}

proptest! {
    /// create followed by read yields the field set that was sent
    #[test]
    fn create_then_read_round_trips(config in arb_config()) {
        let store = InMemoryAppStore::new();
        let resource = store.resource();

        let (created, read) = tokio_test::block_on(async {
            let created = resource.create(&config).await.unwrap().into_state().unwrap();
            let read = resource.read(&created.id).await.unwrap();
            (created, read)
        });

        prop_assert_eq!(created.config(), config);
        prop_assert_eq!(read, ReadOutcome::Present(created));
    }

    /// update replaces every field; nothing of the old definition survives
    #[test]
    fn update_is_full_replacement(before in arb_config(), after in arb_config()) {
        let store = InMemoryAppStore::new();
        let resource = store.resource();

        let read = tokio_test::block_on(async {
            let created = resource.create(&before).await.unwrap().into_state().unwrap();
            resource.update(&created.id, &after).await.unwrap();
            resource.read(&created.id).await.unwrap()
        });

        let state = read.into_state().unwrap();
        prop_assert_eq!(state.config(), after);
    }

    /// generated definitions pass schema validation unchanged
    #[test]
    fn generated_definitions_validate(config in arb_config()) {
        let definition = json!({
            "name": config.name,
            "description": config.description,
            "author_display": config.author_display,
            "image": config.image,
            "url": config.url,
        });
        let parsed = AppletConfig::from_definition(&definition);
        prop_assert_eq!(parsed, Ok(config));
    }

    /// dropping any one required attribute is caught before a network call
    #[test]
    fn missing_attribute_is_rejected(config in arb_config(), index in 0usize..5) {
        let mut definition = serde_json::to_value(&config).unwrap();
        let field = ["name", "description", "author_display", "image", "url"][index];
        definition.as_object_mut().unwrap().remove(field);

        prop_assert!(AppletConfig::from_definition(&definition).is_err());
    }
}
