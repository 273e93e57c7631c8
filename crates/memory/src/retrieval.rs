//! Formatting memory hits into transcript context.

use researchbot_common::MemoryHit;

/// Render memory hits as a context block, stopping at `max_context_tokens`.
///
/// Returns `None` when there is nothing to inject.
pub fn format_memory_context(hits: &[MemoryHit], max_context_tokens: usize) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut token_count = 0;

    for hit in hits {
        let part = format!("- {}", hit.content.trim());
        let tokens = estimate_tokens(&part);
        if token_count + tokens > max_context_tokens {
            break;
        }
        if !parts.contains(&part) {
            parts.push(part);
            token_count += tokens;
        }
    }

    if parts.is_empty() {
        return None;
    }

    Some(format!(
        "## Relevant Context from Memory\n\n{}",
        parts.join("\n")
    ))
}

fn estimate_tokens(text: &str) -> usize {
    // ~4 chars per token
    text.len().div_ceil(4)
}
