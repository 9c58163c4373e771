#![forbid(unsafe_code)]

//! Dialog body markup (Bulma `modal-card` layout).
//!
//! ```text
//! <div class="modal-background"></div>
//! <div class="modal-card" role="dialog" aria-modal="true">
//!   <header class="modal-card-head">
//!     <p class="modal-card-title">{title}</p>
//!     <button class="delete" aria-label="{close_label}" data-role="cancel"></button>
//!   </header>
//!   <section class="modal-card-body"><p>{message}</p></section>
//!   <footer class="modal-card-foot">
//!     <button class="button {style}" data-role="{role}">{title}</button>
//!   </footer>
//! </div>
//! ```

use dialogkit_core::Role;
use dialogkit_dom::Markup;

use super::config::DialogConfig;
use super::spec::{ButtonSpec, DialogSpec};

/// Attribute carrying a control's role.
pub const ROLE_ATTR: &str = "data-role";

/// Render the children of the dialog root. Pure.
#[must_use]
pub fn render(spec: &DialogSpec, config: &DialogConfig) -> Markup {
    let head = Markup::element("header")
        .class("modal-card-head")
        .child(Markup::element("p").class("modal-card-title").text(&spec.title))
        .child(
            Markup::element("button")
                .class("delete")
                .attr("aria-label", &config.close_label)
                .attr(ROLE_ATTR, Role::CANCEL),
        );
    let body = Markup::element("section")
        .class("modal-card-body")
        .child(Markup::element("p").text(&spec.message));
    let foot = Markup::element("footer")
        .class("modal-card-foot")
        .children(spec.buttons.iter().map(render_button));

    Markup::fragment([
        Markup::from(Markup::element("div").class("modal-background")),
        Markup::from(
            Markup::element("div")
                .class("modal-card")
                .attr("role", "dialog")
                .attr("aria-modal", "true")
                .child(head)
                .child(body)
                .child(foot),
        ),
    ])
}

fn render_button(button: &ButtonSpec) -> Markup {
    Markup::element("button")
        .class(button_class(button.style.as_deref()))
        .attr(ROLE_ATTR, button.role.as_str())
        .text(&button.title)
        .into()
}

/// `button`, followed by the style classes when there are any.
#[must_use]
pub fn button_class(style: Option<&str>) -> String {
    match style {
        Some(style) if !style.is_empty() => format!("button {style}"),
        _ => "button".to_owned(),
    }
}
