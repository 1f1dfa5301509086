use serde::{Deserialize, Serialize};
use std::fmt;

/// One way of finding an element. Serialized as-is into the page-side query script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Lookup {
    /// Structural match on ids, tags and attributes.
    Css { selector: String },
    /// At most one element per `container`, taken from the first candidate
    /// selector that yields a visible, enabled node inside it. Containers
    /// lacking `anchor` are ignored.
    InContainer {
        container: String,
        anchor: Option<String>,
        candidates: Vec<String>,
    },
    /// Elements under `scope` whose normalized text equals (or, when
    /// `exact` is false, contains) one of `texts`.
    Text {
        scope: String,
        texts: Vec<String>,
        exact: bool,
    },
}

impl Lookup {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    pub fn text_equals<I, T>(scope: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::Text {
            scope: scope.into(),
            texts: texts.into_iter().map(Into::into).collect(),
            exact: true,
        }
    }

    pub fn text_contains<I, T>(scope: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::Text {
            scope: scope.into(),
            texts: texts.into_iter().map(Into::into).collect(),
            exact: false,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css { selector } => write!(f, "css:{}", selector),
            Self::InContainer {
                container,
                candidates,
                ..
            } => write!(f, "in:{}[{}]", container, candidates.join("|")),
            Self::Text { scope, texts, exact } => write!(
                f,
                "text{}:{}[{}]",
                if *exact { "=" } else { "~" },
                scope,
                texts.join("|")
            ),
        }
    }
}

/// A semantic target: a name for logs plus strategies in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: &'static str,
    pub strategies: Vec<Lookup>,
}

impl Target {
    pub fn new(name: &'static str, strategies: Vec<Lookup>) -> Self {
        Self { name, strategies }
    }

    pub fn css(name: &'static str, selectors: &[&str]) -> Self {
        Self::new(name, selectors.iter().map(|s| Lookup::css(*s)).collect())
    }

    /// Appends a localized text fallback after the structural strategies.
    pub fn or_text(mut self, lookup: Lookup) -> Self {
        self.strategies.push(lookup);
        self
    }
}

/// Opaque token naming one element returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of an element at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub handle: ElementHandle,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub text: String,
}

impl Element {
    pub fn usable(&self) -> bool {
        self.visible && self.enabled
    }
}
