//! The closed set of widgets a table can hold.
//!
//! Rendering layers switch exhaustively over [`Widget`] / [`CellWidget`].
//! Adding a variant is a breaking change for every consumer; this is not a
//! plugin point.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::binding::Binding;
use crate::error::{ConfigError, WriteError};
use crate::state::State;

/// Flat discriminant covering every widget variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetTag {
    Text,
    Number,
    Search,
    Submit,
    Label,
    Button,
    Link,
    HeaderLabel,
}

impl WidgetTag {
    pub const ALL: [WidgetTag; 8] = [
        WidgetTag::Text,
        WidgetTag::Number,
        WidgetTag::Search,
        WidgetTag::Submit,
        WidgetTag::Label,
        WidgetTag::Button,
        WidgetTag::Link,
        WidgetTag::HeaderLabel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetTag::Text => "text",
            WidgetTag::Number => "number",
            WidgetTag::Search => "search",
            WidgetTag::Submit => "submit",
            WidgetTag::Label => "label",
            WidgetTag::Button => "button",
            WidgetTag::Link => "link",
            WidgetTag::HeaderLabel => "header-label",
        }
    }
}

impl fmt::Display for WidgetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownTag(s.to_string()))
    }
}

/// The value-bearing tags, i.e. the ones a record field can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    Text,
    Number,
    Search,
}

impl InputKind {
    pub fn tag(&self) -> WidgetTag {
        match self {
            InputKind::Text => WidgetTag::Text,
            InputKind::Number => WidgetTag::Number,
            InputKind::Search => WidgetTag::Search,
        }
    }
}

impl TryFrom<WidgetTag> for InputKind {
    type Error = ConfigError;

    fn try_from(tag: WidgetTag) -> Result<Self, Self::Error> {
        match tag {
            WidgetTag::Text => Ok(InputKind::Text),
            WidgetTag::Number => Ok(InputKind::Number),
            WidgetTag::Search => Ok(InputKind::Search),
            other => Err(ConfigError::NotAnInput(other)),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tag().fmt(f)
    }
}

/// A live two-way value channel.
///
/// Cloning shares the channel; reads always go to the source.
pub struct Value<T> {
    binding: Arc<dyn Binding<T>>,
}

impl<T> Value<T> {
    pub fn new(binding: impl Binding<T> + 'static) -> Self {
        Self {
            binding: Arc::new(binding),
        }
    }

    pub fn read(&self) -> T {
        self.binding.read()
    }

    pub fn write(&self, value: T) -> Result<(), WriteError> {
        self.binding.write(value)
    }
}

impl<T> Value<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// A value backed by its own free-standing state.
    pub fn detached(initial: T) -> Self {
        Self::new(State::new(initial))
    }
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self {
            binding: Arc::clone(&self.binding),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.read()).finish()
    }
}

/// A form-bound input (`text`, `number` or `search`).
#[derive(Debug, Clone)]
pub struct Input<T> {
    pub name: String,
    pub list: Option<String>,
    pub form: Option<String>,
    pub value: Value<T>,
}

impl<T> Input<T> {
    pub fn new(name: impl Into<String>, value: Value<T>) -> Self {
        Self {
            name: name.into(),
            list: None,
            form: None,
            value,
        }
    }

    /// Reference a datalist by name.
    pub fn list(mut self, list: impl Into<String>) -> Self {
        self.list = Some(list.into());
        self
    }

    /// Attach the input to a form by id.
    pub fn form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }
}

/// Submits a form; carries no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub label: String,
    pub form: Option<String>,
}

/// Label text, static or computed on every read.
#[derive(Clone)]
pub enum LabelText {
    Static(String),
    Computed(Arc<dyn Fn() -> String + Send + Sync>),
}

impl LabelText {
    pub fn computed(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        LabelText::Computed(Arc::new(f))
    }

    pub fn text(&self) -> String {
        match self {
            LabelText::Static(text) => text.clone(),
            LabelText::Computed(f) => f(),
        }
    }
}

impl fmt::Debug for LabelText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelText::Static(text) => f.debug_tuple("Static").field(text).finish(),
            LabelText::Computed(_) => f.debug_tuple("Computed").field(&self.text()).finish(),
        }
    }
}

impl From<&str> for LabelText {
    fn from(text: &str) -> Self {
        LabelText::Static(text.to_string())
    }
}

impl From<String> for LabelText {
    fn from(text: String) -> Self {
        LabelText::Static(text)
    }
}

#[derive(Debug, Clone)]
pub struct Label {
    pub label: LabelText,
}

impl Label {
    pub fn text(&self) -> String {
        self.label.text()
    }
}

/// A label with a zero-argument action.
#[derive(Clone)]
pub struct Button {
    pub label: String,
    action: Arc<dyn Fn() + Send + Sync>,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            action: Arc::new(action),
        }
    }

    /// Run the action.
    pub fn press(&self) {
        (self.action)()
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button").field("label", &self.label).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub href: String,
}

/// Column header display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLabel {
    pub label: String,
}

/// Widgets allowed anywhere, including free-form toolbar rows.
#[derive(Debug, Clone)]
pub enum Widget {
    Text(Input<String>),
    Number(Input<f64>),
    Search(Input<String>),
    Submit(Submit),
    Label(Label),
    Button(Button),
    Link(Link),
}

impl Widget {
    pub fn tag(&self) -> WidgetTag {
        match self {
            Widget::Text(_) => WidgetTag::Text,
            Widget::Number(_) => WidgetTag::Number,
            Widget::Search(_) => WidgetTag::Search,
            Widget::Submit(_) => WidgetTag::Submit,
            Widget::Label(_) => WidgetTag::Label,
            Widget::Button(_) => WidgetTag::Button,
            Widget::Link(_) => WidgetTag::Link,
        }
    }

    pub fn submit(label: impl Into<String>, form: impl Into<String>) -> Self {
        Widget::Submit(Submit {
            label: label.into(),
            form: Some(form.into()),
        })
    }

    pub fn label(label: impl Into<LabelText>) -> Self {
        Widget::Label(Label {
            label: label.into(),
        })
    }

    pub fn computed_label(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Widget::Label(Label {
            label: LabelText::computed(f),
        })
    }

    pub fn button(label: impl Into<String>, action: impl Fn() + Send + Sync + 'static) -> Self {
        Widget::Button(Button::new(label, action))
    }

    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Widget::Link(Link {
            label: label.into(),
            href: href.into(),
        })
    }

    /// The widget's `name`, if it is an input.
    pub fn name(&self) -> Option<&str> {
        match self {
            Widget::Text(input) | Widget::Search(input) => Some(&input.name),
            Widget::Number(input) => Some(&input.name),
            _ => None,
        }
    }

    /// The owning form id, for form-bound widgets.
    pub fn form(&self) -> Option<&str> {
        match self {
            Widget::Text(input) | Widget::Search(input) => input.form.as_deref(),
            Widget::Number(input) => input.form.as_deref(),
            Widget::Submit(submit) => submit.form.as_deref(),
            _ => None,
        }
    }

    /// Text shown for the widget: its current value or its label.
    pub fn display(&self) -> String {
        match self {
            Widget::Text(input) | Widget::Search(input) => input.value.read(),
            Widget::Number(input) => input.value.read().to_string(),
            Widget::Submit(submit) => submit.label.clone(),
            Widget::Label(label) => label.text(),
            Widget::Button(button) => button.label.clone(),
            Widget::Link(link) => link.label.clone(),
        }
    }
}

/// Anything that may occupy a cell: a regular widget or a column header.
#[derive(Debug, Clone)]
pub enum CellWidget {
    Widget(Widget),
    HeaderLabel(HeaderLabel),
}

impl CellWidget {
    pub fn tag(&self) -> WidgetTag {
        match self {
            CellWidget::Widget(widget) => widget.tag(),
            CellWidget::HeaderLabel(_) => WidgetTag::HeaderLabel,
        }
    }

    pub fn header(label: impl Into<String>) -> Self {
        CellWidget::HeaderLabel(HeaderLabel {
            label: label.into(),
        })
    }

    pub fn widget(&self) -> Option<&Widget> {
        match self {
            CellWidget::Widget(widget) => Some(widget),
            CellWidget::HeaderLabel(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.widget().and_then(Widget::name)
    }

    pub fn display(&self) -> String {
        match self {
            CellWidget::Widget(widget) => widget.display(),
            CellWidget::HeaderLabel(header) => header.label.clone(),
        }
    }
}

impl From<Widget> for CellWidget {
    fn from(widget: Widget) -> Self {
        CellWidget::Widget(widget)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_tag_strings_round_trip() {
        for tag in WidgetTag::ALL {
            assert_eq!(tag.as_str().parse::<WidgetTag>().unwrap(), tag);
        }
        assert_eq!(WidgetTag::HeaderLabel.to_string(), "header-label");
        assert!("checkbox".parse::<WidgetTag>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&WidgetTag::HeaderLabel).unwrap();
        assert_eq!(json, "\"header-label\"");
        let kind: InputKind = serde_json::from_str("\"number\"").unwrap();
        assert_eq!(kind, InputKind::Number);
    }

    #[test]
    fn test_only_value_tags_are_inputs() {
        assert_eq!(InputKind::try_from(WidgetTag::Search).unwrap(), InputKind::Search);
        assert!(InputKind::try_from(WidgetTag::Link).is_err());
    }

    #[test]
    fn test_computed_label_reads_live() {
        let count = State::new(1);
        let source = count.clone();
        let label = Widget::computed_label(move || format!("{} rows", source.get()));
        assert_eq!(label.display(), "1 rows");
        count.set(5);
        assert_eq!(label.display(), "5 rows");
    }

    #[test]
    fn test_button_press_runs_action() {
        let presses = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&presses);
        let button = Button::new("Update", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        button.press();
        button.clone().press();
        assert_eq!(presses.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_detached_value_is_shared_between_clones() {
        let input = Input::new("a", Value::detached(String::new())).form("filter-form");
        let copy = input.clone();
        copy.value.write("dragon".into()).unwrap();
        assert_eq!(input.value.read(), "dragon");
        assert_eq!(Widget::Search(input).form(), Some("filter-form"));
    }
}
