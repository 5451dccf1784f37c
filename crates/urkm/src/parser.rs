use ego_tree::{NodeId, NodeRef};
use scraper::{Html, Node};

use crate::types::Headline;

const DAY_DATE_MARKER: &str = "news-listing__day-date";
const ITEM_MARKER: &str = "news-listing__item";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Recorded headline node vanished from the document tree")]
    MissingAnchor,
}

/// True when the node itself is `tag` or sits anywhere under one.
fn in_heading(node: NodeRef<'_, Node>, tag: &str) -> bool {
    std::iter::once(node)
        .chain(node.ancestors())
        .any(|n| n.value().as_element().is_some_and(|e| e.name() == tag))
}

/// Direct text content of a node: its first child, when that child is a
/// text node. Text further down the subtree does not count.
fn direct_text(node: NodeRef<'_, Node>) -> Option<String> {
    node.first_child()
        .and_then(|child| child.value().as_text().map(|t| t.text.to_string()))
}

/// Extract (date label, title) pairs from one listing page.
///
/// Walks the whole document in document order. Elements whose class carries
/// the item marker inside an `<h3>` are recorded as headline anchors;
/// elements whose class carries the day-date marker inside an `<h2>`
/// update the running date label. Anchors are resolved only after the walk,
/// so every headline on the page is labeled with the last date header the
/// walk saw, not the nearest one above it.
pub fn parse_listing(html: &str, fallback_label: &str) -> Result<Vec<Headline>, ParseError> {
    let document = Html::parse_document(html);

    let mut date_label = fallback_label.to_string();
    let mut anchors: Vec<NodeId> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(element) = node.value().as_element() else {
            continue;
        };
        let Some(class) = element.attr("class") else {
            continue;
        };

        if class.contains(ITEM_MARKER) && in_heading(node, "h3") {
            anchors.push(node.id());
        } else if class.contains(DAY_DATE_MARKER) && in_heading(node, "h2") {
            date_label = direct_text(node).unwrap_or_default();
        }
    }

    anchors
        .into_iter()
        .map(|id| {
            let node = document.tree.get(id).ok_or(ParseError::MissingAnchor)?;
            Ok(Headline {
                date_label: date_label.clone(),
                title: direct_text(node).unwrap_or_default(),
            })
        })
        .collect()
}
