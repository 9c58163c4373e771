#![no_main]

//! Arbitrary show/dismiss/click/key/destroy sequences against one dialog.
//!
//! Checks that handlers fire only on an active → inactive transition, that
//! `destroy` runs its handler at most once, and that the body never holds
//! more than one copy of the dialog.

use std::cell::RefCell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use dialogkit_core::event::{Event, KeyCode};
use dialogkit_dom::Document;
use dialogkit_widgets::modal::{ButtonSpec, Dialog, DialogSpec};
use libfuzzer_sys::fuzz_target;

const ROLES: [&str; 4] = ["yes", "no", "cancel", "destroy"];

#[derive(Debug, Arbitrary)]
enum Op {
    Show,
    Dismiss(u8),
    Click(u8),
    Key { escape: bool },
    Destroy,
}

#[derive(Debug, Arbitrary)]
struct Input {
    buttons: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let count = usize::from(input.buttons % 4);
    let spec = ROLES[..count]
        .iter()
        .fold(DialogSpec::builder("t", "m"), |b, role| {
            b.button(ButtonSpec::new(*role, *role))
        })
        .build();

    let doc = Document::new();
    let dialog = Dialog::create(&doc, spec).expect("create");
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    {
        let log = Rc::clone(&log);
        dialog.always(move |role| {
            log.borrow_mut().push(format!("always:{role}"));
            Ok(())
        });
    }
    {
        let log = Rc::clone(&log);
        dialog.on("destroy", move |role| {
            log.borrow_mut().push(format!("teardown:{role}"));
            Ok(())
        });
    }

    let mut expected = Vec::new();
    let mut active = false;
    let mut destroyed = false;

    for op in input.ops.into_iter().take(64) {
        match op {
            Op::Show => {
                if destroyed {
                    assert!(dialog.show().is_err());
                } else {
                    dialog.show().expect("show");
                    active = true;
                }
            }
            Op::Dismiss(i) => {
                let role = ROLES[usize::from(i) % ROLES.len()];
                dialog.dismiss(role).expect("handlers succeed");
                if active {
                    if role == "destroy" {
                        expected.push("teardown:destroy".to_owned());
                    }
                    expected.push(format!("always:{role}"));
                    active = false;
                }
            }
            Op::Click(i) => {
                let role = ROLES[usize::from(i) % ROLES.len()];
                if let Some(button) = dialog.button(role) {
                    let outcome = doc.dispatch(button, Event::click()).expect("live button");
                    assert!(outcome.is_ok());
                    if active {
                        if role == "destroy" {
                            expected.push("teardown:destroy".to_owned());
                        }
                        expected.push(format!("always:{role}"));
                        active = false;
                    }
                }
            }
            Op::Key { escape } => {
                let Some(root) = dialog.root() else { continue };
                let code = if escape { KeyCode::Escape } else { KeyCode::Enter };
                doc.dispatch(root, Event::key_down(code)).expect("live root");
                if escape && active {
                    expected.push("always:cancel".to_owned());
                    active = false;
                }
            }
            Op::Destroy => {
                dialog.destroy().expect("destroy handler succeeds");
                if !destroyed {
                    expected.push("teardown:destroy".to_owned());
                    destroyed = true;
                    active = false;
                }
            }
        }
        assert_eq!(dialog.is_active(), active);
        assert!(doc.children(doc.body()).expect("body").len() <= 1);
    }

    assert_eq!(*log.borrow(), expected);
});
