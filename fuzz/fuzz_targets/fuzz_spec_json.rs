#![no_main]

//! Arbitrary JSON through `DialogSpec::from_json`, then render and show.
//!
//! Caller text must come back out of the rendered tree unchanged, so markup
//! characters in it never become structure.

use dialogkit_dom::Document;
use dialogkit_widgets::modal::{Dialog, DialogSpec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(spec) = DialogSpec::from_json(json) else {
        return;
    };
    let title = spec.title.clone();
    let message = spec.message.clone();
    let roles: Vec<String> = spec.roles().map(|r| r.as_str().to_owned()).collect();

    let doc = Document::new();
    let dialog = Dialog::create(&doc, spec).expect("create never fails on a fresh document");
    dialog.show().expect("show after create");

    let root = dialog.root().expect("live dialog has a root");
    let title_node = doc
        .find(root, |el| el.has_class("modal-card-title"))
        .expect("root is live")
        .expect("title is rendered");
    assert_eq!(doc.text_content(title_node).expect("title is live"), title);

    for role in &roles {
        assert!(dialog.button(role).is_some(), "missing button for {role:?}");
    }

    let message_node = doc
        .find(root, |el| el.has_class("modal-card-body"))
        .expect("root is live")
        .expect("body is rendered");
    assert_eq!(doc.text_content(message_node).expect("body is live"), message);
    dialog.destroy().expect("no destroy handler");
});
