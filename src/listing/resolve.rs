//! Fallback selector resolution.
//!
//! The same logical field shows up under different markup across page
//! templates, so every lookup takes an ordered list of candidate locators
//! and returns the first hit. A miss is a normal outcome: the `first_*`
//! functions return `None`, the `resolve_*` functions an empty string.

use tracing::trace;

use crate::browser::{BrowserSession, Locator};

/// Trimmed text of the first candidate that locates an element.
pub async fn first_text<S: BrowserSession>(
    session: &S,
    candidates: &[Locator],
    scope: Option<&S::Element>,
) -> Option<String> {
    for locator in candidates {
        let element = match session.find(locator, scope).await {
            Ok(el) => el,
            Err(e) => {
                trace!("{} missed: {}", locator, e);
                continue;
            }
        };
        match session.text(&element).await {
            Ok(text) => return Some(text.trim().to_string()),
            Err(e) => trace!("{} text unreadable: {}", locator, e),
        }
    }
    None
}

/// Trimmed `attr` of the first candidate that locates an element carrying it.
/// An element without the attribute counts as a miss.
pub async fn first_attribute<S: BrowserSession>(
    session: &S,
    candidates: &[Locator],
    attr: &str,
    scope: Option<&S::Element>,
) -> Option<String> {
    for locator in candidates {
        let element = match session.find(locator, scope).await {
            Ok(el) => el,
            Err(e) => {
                trace!("{} missed: {}", locator, e);
                continue;
            }
        };
        match session.attribute(&element, attr).await {
            Ok(Some(value)) => return Some(value.trim().to_string()),
            Ok(None) => trace!("{} has no {} attribute", locator, attr),
            Err(e) => trace!("{} attribute {} unreadable: {}", locator, attr, e),
        }
    }
    None
}

pub async fn resolve_text<S: BrowserSession>(
    session: &S,
    candidates: &[Locator],
    scope: Option<&S::Element>,
) -> String {
    first_text(session, candidates, scope)
        .await
        .unwrap_or_default()
}

pub async fn resolve_attribute<S: BrowserSession>(
    session: &S,
    candidates: &[Locator],
    attr: &str,
    scope: Option<&S::Element>,
) -> String {
    first_attribute(session, candidates, attr, scope)
        .await
        .unwrap_or_default()
}

/// Every element matching `locator`; empty on no match or lookup failure.
pub async fn resolve_all<S: BrowserSession>(
    session: &S,
    locator: &Locator,
    scope: Option<&S::Element>,
) -> Vec<S::Element> {
    session
        .find_all(locator, scope)
        .await
        .unwrap_or_else(|e| {
            trace!("{} matched nothing: {}", locator, e);
            Vec::new()
        })
}

/// Elements for the first candidate that matches anything.
pub async fn resolve_all_first<S: BrowserSession>(
    session: &S,
    candidates: &[Locator],
    scope: Option<&S::Element>,
) -> Vec<S::Element> {
    for locator in candidates {
        let found = resolve_all(session, locator, scope).await;
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

/// Text of every element matching `locator`. Unreadable elements are skipped.
pub async fn all_texts<S: BrowserSession>(session: &S, locator: &Locator) -> Vec<String> {
    let mut texts = Vec::new();
    for element in resolve_all(session, locator, None).await {
        if let Ok(text) = session.text(&element).await {
            texts.push(text);
        }
    }
    texts
}

/// `attr` of every element matching `locator` that carries it.
pub async fn all_attributes<S: BrowserSession>(
    session: &S,
    locator: &Locator,
    attr: &str,
) -> Vec<String> {
    let mut values = Vec::new();
    for element in resolve_all(session, locator, None).await {
        if let Ok(Some(value)) = session.attribute(&element, attr).await {
            values.push(value);
        }
    }
    values
}
