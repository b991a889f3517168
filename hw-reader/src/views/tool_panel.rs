//! Matching tool panel: pinned prayer, collected items, enabled actions

use serde::Serialize;

use hw_common::curation::{PinnedPrayer, Proposal};

use super::markdown::{attr, escape, render_markdown};
use crate::route::{code_fragment, prayer_fragment};
use crate::AppState;

/// Panel HTML plus which actions are available
#[derive(Debug, Clone, Serialize)]
pub struct ToolPanel {
    pub html: String,
    pub has_pinned: bool,
    pub has_items: bool,
    pub item_count: usize,
}

/// Render the panel from the current tool state
pub async fn render(state: &AppState) -> ToolPanel {
    let (pinned, proposals): (Option<PinnedPrayer>, Vec<Proposal>) = {
        let tool = state.curation.lock().await;
        (tool.pinned().cloned(), tool.proposals().to_vec())
    };

    let pinned_html = match &pinned {
        Some(pinned) => pinned_section(state, pinned).await,
        None => r#"<p>No prayer pinned. Navigate to a prayer and click "Pin this Prayer" to start.</p>"#.to_string(),
    };

    let items_html = if proposals.is_empty() {
        "<li>No items collected yet.</li>".to_string()
    } else {
        proposals
            .iter()
            .enumerate()
            .map(|(index, proposal)| {
                format!(
                    r#"<li><span class="match-text">{}</span><button class="icon-button" data-action="remove" data-index="{index}" title="Remove this item">&#x2715;</button></li>"#,
                    escape(proposal.description())
                )
            })
            .collect()
    };

    let has_pinned = pinned.is_some();
    let has_items = !proposals.is_empty();
    let disabled = if has_items { "" } else { " disabled" };
    let clear = if has_pinned || has_items {
        r##"<a href="#" class="clear-all" data-action="clear">Clear all</a>"##
    } else {
        ""
    };

    let html = format!(
        r#"<div id="pinned-prayer-section">{pinned_html}</div><h4>Collected items</h4><ol id="collected-items-list">{items_html}</ol><div class="tool-actions"><button data-action="mail"{disabled}>Send by e-mail</button><button data-action="issue"{disabled}>Create DoltHub issue</button><button data-action="query-url"{disabled}>Run on DoltHub</button><button data-action="chat" data-channel="whatsapp"{disabled}>WhatsApp</button><button data-action="chat" data-channel="telegram"{disabled}>Telegram</button>{clear}</div>"#
    );

    ToolPanel {
        html,
        has_pinned,
        has_items,
        item_count: proposals.len(),
    }
}

async fn pinned_section(state: &AppState, pinned: &PinnedPrayer) -> String {
    let mut meta = format!(
        r#"<strong>Pinned Prayer:</strong> {} (Ver: <a href="{}">{}</a>, Lang: {}"#,
        escape(&pinned.name),
        attr(&prayer_fragment(&pinned.version)),
        escape(&pinned.version),
        escape(&pinned.language)
    );
    if let Some(phelps) = &pinned.phelps {
        meta.push_str(&format!(
            r#", Phelps: <a href="{}">{}</a>"#,
            attr(&code_fragment(phelps)),
            escape(phelps)
        ));
    }
    meta.push(')');

    let mut html = format!(
        r#"<p>{meta}<button class="icon-button" data-action="unpin" title="Unpin Prayer (Item list preserved)">&#x2715;</button></p><div id="pinned-prayer-text">{}</div>"#,
        render_markdown(&pinned.text)
    );

    if !pinned.language.is_empty() {
        let back = state.pages.lock().await.language_return_fragment(&pinned.language);
        let language_name = state.language_names.lookup(&pinned.language).await;
        html.push_str(&format!(
            r#"<p class="return-link">To continue finding items for this language, return to <a href="{}">{} Prayers</a>.</p>"#,
            attr(&back),
            escape(&language_name)
        ));
    }
    html
}
