use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement};

use crate::notify::Notification;
use crate::todos::{Filter, ListView};
use crate::view_mode::ViewMode;

pub struct Dom {
    document: Document,
}

impl Dom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    pub fn input(&self, id: &str) -> Option<HtmlInputElement> {
        self.element(id)?.dyn_into().ok()
    }

    pub fn input_value(&self, id: &str) -> String {
        self.input(id).map(|i| i.value()).unwrap_or_default()
    }

    pub fn set_input_value(&self, id: &str, value: &str) {
        if let Some(input) = self.input(id) {
            input.set_value(value);
        }
    }

    pub fn reset_form(&self, id: &str) {
        if let Some(form) = self.element(id).and_then(|e| e.dyn_into::<HtmlFormElement>().ok()) {
            form.reset();
        }
    }

    fn set_class(&self, id: &str, class: &str, on: bool) {
        if let Some(el) = self.element(id) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    fn for_each(&self, selector: &str, mut f: impl FnMut(Element)) {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return;
        };
        for i in 0..list.length() {
            if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                f(el);
            }
        }
    }

    pub fn switch_auth_tab(&self, tab: &str) {
        self.for_each(".tab-btn", |btn| {
            let active = btn.get_attribute("data-tab").as_deref() == Some(tab);
            let _ = btn.class_list().toggle_with_force("active", active);
        });
        let form_id = format!("{tab}-form");
        self.for_each(".auth-form", |form| {
            let _ = form.class_list().toggle_with_force("active", form.id() == form_id);
        });
    }

    pub fn show_session(&self, username: Option<&str>) {
        let active = username.is_some();
        self.set_class("auth-overlay", "active", !active);
        self.set_class("todo-interface", "active", active);
        if let Some(el) = self.element("current-user") {
            el.set_text_content(username);
        }
    }

    pub fn hide_loading(&self) {
        if let Some(el) = self.element("loading-screen") {
            let _ = el.class_list().add_1("hidden");
        }
    }

    fn make(&self, tag: &str, class: &str) -> Result<Element, JsValue> {
        let el = self.document.create_element(tag)?;
        el.set_class_name(class);
        Ok(el)
    }

    fn button(&self, class: &str, label: &str, action: &str, id: &str) -> Result<Element, JsValue> {
        let btn = self.make("button", &format!("action-btn {class}"))?;
        btn.set_text_content(Some(label));
        btn.set_attribute("data-action", action)?;
        btn.set_attribute("data-id", id)?;
        Ok(btn)
    }

    /// Rebuilds the list, counters, filter buttons and empty-state badge.
    pub fn render_list(&self, view: &ListView) -> Result<(), JsValue> {
        let Some(list) = self.element("todo-list") else {
            return Ok(());
        };
        list.set_inner_html("");
        self.set_class("empty-state", "active", view.is_empty());

        let mut focus = None;
        for item in &view.items {
            let id = item.id.to_string();
            let li = self.make("li", if item.completed { "todo-item completed" } else { "todo-item" })?;
            li.set_attribute("data-id", &id)?;

            let check: HtmlInputElement = self.make("input", "todo-checkbox")?.unchecked_into();
            check.set_type("checkbox");
            check.set_checked(item.completed);
            check.set_attribute("data-action", "toggle")?;
            check.set_attribute("data-id", &id)?;
            li.append_child(&check)?;

            let actions = self.make("div", "todo-actions")?;
            if item.editing {
                let edit: HtmlInputElement = self.make("input", "todo-text editing")?.unchecked_into();
                edit.set_type("text");
                edit.set_value(&item.text);
                edit.set_id(&format!("edit-input-{id}"));
                edit.set_attribute("data-id", &id)?;
                li.append_child(&edit)?;
                actions.append_child(&self.button("save-btn", "SAVE", "save", &id)?)?;
                actions.append_child(&self.button("cancel-btn", "CANCEL", "cancel", &id)?)?;
                focus = Some(edit);
            } else {
                let text = self.make("span", "todo-text")?;
                text.set_text_content(Some(&item.text));
                li.append_child(&text)?;
                actions.append_child(&self.button("edit-btn", "EDIT", "edit", &id)?)?;
                actions.append_child(&self.button("delete-btn", "DELETE", "delete", &id)?)?;
            }
            li.append_child(&actions)?;
            list.append_child(&li)?;
        }

        for (id, value) in [
            ("total-todos", view.stats.total),
            ("completed-todos", view.stats.completed),
            ("remaining-todos", view.stats.remaining),
        ] {
            if let Some(el) = self.element(id) {
                el.set_text_content(Some(&value.to_string()));
            }
        }
        self.mark_filter(view.filter);

        if let Some(edit) = focus {
            let _ = edit.focus();
            edit.select();
        }
        Ok(())
    }

    fn mark_filter(&self, filter: Filter) {
        self.for_each(".filter-btn", |btn| {
            let active = btn.get_attribute("data-filter").as_deref() == Some(filter.as_str());
            let _ = btn.class_list().toggle_with_force("active", active);
        });
    }

    /// Appends popups and schedules their removal.
    pub fn show_notifications(&self, fresh: &[Notification], lifetime_ms: f64) -> Result<(), JsValue> {
        let Some(body) = self.document.body() else {
            return Ok(());
        };
        let window = web_sys::window().ok_or("no window")?;
        for (i, n) in fresh.iter().enumerate() {
            let el: HtmlElement = self
                .make("div", &format!("notification {}", n.severity.class()))?
                .unchecked_into();
            el.set_text_content(Some(&n.message));
            let style = el.style();
            style.set_property("top", &format!("{}px", 20 + 70 * i))?;
            style.set_property("color", n.severity.accent())?;
            style.set_property("border-color", n.severity.accent())?;
            body.append_child(&el)?;

            let remove = Closure::once_into_js(move || el.remove());
            window.set_timeout_with_callback_and_timeout_and_arguments_0(
                remove.unchecked_ref(),
                lifetime_ms as i32,
            )?;
        }
        Ok(())
    }

    pub fn show_view_mode(&self, mode: ViewMode, indicator: bool) -> Result<(), JsValue> {
        if let Some(btn) = self.element("toggle-3d") {
            btn.set_inner_html(match mode {
                ViewMode::Normal => r#"<span class="btn-icon">3D</span><span>3D VIEW</span>"#,
                ViewMode::ParallaxBarrier => r#"<span class="btn-icon">2D</span><span>NORMAL VIEW</span>"#,
            });
        }

        let existing = self.element("parallax-indicator");
        match (indicator, existing) {
            (true, None) => {
                let badge = self.make("div", "parallax-indicator")?;
                badge.set_id("parallax-indicator");
                badge.set_text_content(Some("3D PARALLAX BARRIER ACTIVE"));
                if let Some(body) = self.document.body() {
                    body.append_child(&badge)?;
                }
            }
            (false, Some(badge)) => badge.remove(),
            _ => {}
        }
        Ok(())
    }
}
