#![forbid(unsafe_code)]

//! Property tests: dialog invariants over generated specs and input sequences.

use dialogkit_dom::Document;
use dialogkit_harness::strategy::{dialog_spec, role, unique_roles};
use dialogkit_harness::{CallLog, User};
use dialogkit_widgets::modal::{ButtonSpec, Dialog, DialogSpec};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Show,
    Dismiss(String),
    Escape,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Show),
        role().prop_map(Action::Dismiss),
        Just(Action::Escape),
    ]
}

proptest! {
    #[test]
    fn button_lookup_matches_rendered_roles(
        spec in dialog_spec(6),
        probes in proptest::collection::vec(role(), 0..8),
    ) {
        let doc = Document::new();
        let roles: Vec<String> = spec.roles().map(|r| r.as_str().to_owned()).collect();
        let dialog = Dialog::create(&doc, spec).unwrap();

        for role in &roles {
            let button = dialog.button(role);
            prop_assert!(button.is_some());
            prop_assert_eq!(
                doc.attribute(button.unwrap(), "data-role").unwrap(),
                Some(role.clone())
            );
        }
        for probe in probes {
            prop_assert_eq!(dialog.button(&probe).is_some(), roles.contains(&probe));
        }
    }

    #[test]
    fn rendered_text_survives_escaping(spec in dialog_spec(3)) {
        let doc = Document::new();
        let title = spec.title.clone();
        let message = spec.message.clone();
        let dialog = Dialog::create(&doc, spec).unwrap();
        let root = dialog.root().unwrap();

        let title_node = doc.find(root, |el| el.has_class("modal-card-title")).unwrap().unwrap();
        prop_assert_eq!(doc.text_content(title_node).unwrap(), title);
        let body = doc.find(root, |el| el.has_class("modal-card-body")).unwrap().unwrap();
        prop_assert_eq!(doc.text_content(body).unwrap(), message);
    }

    #[test]
    fn handlers_fire_only_on_active_to_inactive(
        roles in unique_roles(4),
        actions in proptest::collection::vec(action(), 0..24),
    ) {
        let spec = roles
            .iter()
            .fold(DialogSpec::builder("t", "m"), |b, r| b.button(ButtonSpec::new(r.as_str(), r.as_str())))
            .build();
        let doc = Document::new();
        let dialog = Dialog::create(&doc, spec).unwrap();
        let log = CallLog::new();
        let user = User::new(&doc);
        dialog.always(log.recorder("always"));

        let mut expected = Vec::new();
        let mut active = false;
        for action in actions {
            match action {
                Action::Show => {
                    dialog.show().unwrap();
                    active = true;
                }
                Action::Dismiss(role) => {
                    match dialog.button(&role) {
                        Some(button) => { user.click(button).unwrap(); }
                        None => { dialog.dismiss(role.as_str()).unwrap(); }
                    }
                    if active {
                        expected.push(format!("always:{role}"));
                    }
                    active = false;
                }
                Action::Escape => {
                    user.press_escape(&dialog).unwrap();
                    if active {
                        expected.push("always:cancel".to_owned());
                    }
                    active = false;
                }
            }
            prop_assert_eq!(dialog.is_active(), active);
        }
        prop_assert_eq!(log.entries(), expected);
        prop_assert!(doc.children(doc.body()).unwrap().len() <= 1);
    }

    #[test]
    fn destroy_handler_runs_exactly_once(
        shows in 0usize..3,
        destroys in 1usize..4,
    ) {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, DialogSpec::alert("t", "m")).unwrap();
        let log = CallLog::new();
        dialog.on("destroy", log.recorder("destroy"));
        for _ in 0..shows {
            dialog.show().unwrap();
        }
        for _ in 0..destroys {
            dialog.destroy().unwrap();
        }
        prop_assert_eq!(log.count("destroy"), 1);
        prop_assert!(doc.children(doc.body()).unwrap().is_empty());
    }
}
