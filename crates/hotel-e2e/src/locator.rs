//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a strategy plus a value. It never holds a DOM node: every
//! query renders the locator to a fresh JavaScript expression so that each
//! poll of a wait sees the page as it is at that moment.

/// Strategy used to find elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    /// `id` attribute
    Id,
    /// `name` attribute
    Name,
    /// CSS selector (e.g., "button.primary")
    Css,
    /// XPath expression
    XPath,
    /// Exact visible text of an `<a>` element
    LinkText,
    /// Tag name (e.g., "h1")
    TagName,
    /// Single class name
    ClassName,
}

impl By {
    /// Human-readable strategy name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Css => "css selector",
            Self::XPath => "xpath",
            Self::LinkText => "link text",
            Self::TagName => "tag name",
            Self::ClassName => "class name",
        }
    }
}

impl std::fmt::Display for By {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strategy + value pair used to find DOM elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    by: By,
    value: String,
}

impl Locator {
    /// Create a locator from a strategy and value
    #[must_use]
    pub fn new(by: By, value: impl Into<String>) -> Self {
        Self {
            by,
            value: value.into(),
        }
    }

    /// Locate by `id`
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(By::Id, value)
    }

    /// Locate by `name`
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(By::Name, value)
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(By::Css, value)
    }

    /// Locate by XPath
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(By::XPath, value)
    }

    /// Locate an anchor by its exact text
    #[must_use]
    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(By::LinkText, value)
    }

    /// Locate by tag name
    #[must_use]
    pub fn tag(value: impl Into<String>) -> Self {
        Self::new(By::TagName, value)
    }

    /// Locate by class name
    #[must_use]
    pub fn class(value: impl Into<String>) -> Self {
        Self::new(By::ClassName, value)
    }

    /// Get the strategy
    #[must_use]
    pub const fn by(&self) -> By {
        self.by
    }

    /// Get the value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// JavaScript expression evaluating to an array of every matching element
    #[must_use]
    pub fn to_query_all(&self) -> String {
        let v = js_string(&self.value);
        match self.by {
            By::Id => format!("(() => {{ const e = document.getElementById({v}); return e ? [e] : []; }})()"),
            By::Name => format!("Array.from(document.getElementsByName({v}))"),
            By::Css => format!("Array.from(document.querySelectorAll({v}))"),
            By::XPath => format!(
                "(() => {{ const r = document.evaluate({v}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 const out = []; for (let i = 0; i < r.snapshotLength; i++) {{ out.push(r.snapshotItem(i)); }} return out; }})()"
            ),
            By::LinkText => format!(
                "Array.from(document.querySelectorAll('a')).filter(a => (a.innerText || a.textContent || '').trim() === {v})"
            ),
            By::TagName => format!("Array.from(document.getElementsByTagName({v}))"),
            By::ClassName => format!("Array.from(document.getElementsByClassName({v}))"),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.by, self.value)
    }
}

/// Quote a Rust string as a JavaScript string literal
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}
