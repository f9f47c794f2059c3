//! Markdown code fence removal.

const FENCE: &str = "```";

/// Remove an outer markdown code fence from model output.
///
/// The opening line (three backticks plus an optional language tag) is
/// dropped, as is a closing line consisting only of three backticks.
/// Surrounding whitespace is trimmed. Text that doesn't start with a fence
/// is only trimmed.
///
/// A body that is itself fully wrapped (an opening fence line through a
/// closing fence line) is unwrapped again, so nested wrappers collapse to
/// the innermost body. A body that merely opens with a fenced snippet is
/// left alone.
///
/// ```
/// use sysforge::ai::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```python\nprint(1)\n```"), "print(1)");
/// assert_eq!(strip_code_fence("  plain  "), "plain");
/// ```
pub fn strip_code_fence(text: &str) -> String {
    let mut current = text.trim().to_string();
    if !current.starts_with(FENCE) {
        return current;
    }

    current = unwrap_once(&current);
    while is_fully_wrapped(&current) {
        current = unwrap_once(&current);
    }

    current
}

/// Drop the opening line, and the closing fence line when there is one.
fn unwrap_once(text: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').skip(1).collect();
    if lines.last().is_some_and(|last| last.trim() == FENCE) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

fn is_fully_wrapped(text: &str) -> bool {
    text.starts_with(FENCE)
        && text
            .split('\n')
            .next_back()
            .is_some_and(|last| last.trim() == FENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_tagged_fence() {
        assert_eq!(strip_code_fence("```python\nprint(1)\n```"), "print(1)");
        assert_eq!(
            strip_code_fence("\n\n```html\n<html>\n</html>\n```\n"),
            "<html>\n</html>"
        );
    }

    #[test]
    fn test_untagged_fence_and_missing_close() {
        assert_eq!(strip_code_fence("```\nx = 1\n```"), "x = 1");
        assert_eq!(strip_code_fence("```js\nlet a = 1;"), "let a = 1;");
    }

    #[test]
    fn test_unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fence("  def main():\n    pass\n"), "def main():\n    pass");
        // Fences in the middle belong to the content
        let inner = "Intro\n```\ncode\n```";
        assert_eq!(strip_code_fence(inner), inner);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(strip_code_fence(""), "");
        assert_eq!(strip_code_fence("```"), "");
        assert_eq!(strip_code_fence("```\n```\n```"), "");
    }

    #[test]
    fn test_double_wrapped_block_collapses() {
        assert_eq!(
            strip_code_fence("```\n```python\nprint(1)\n```\n```"),
            "print(1)"
        );
    }

    #[test]
    fn test_leading_inner_snippet_is_kept() {
        let answer = "```markdown\n```bash\nnpm i\n```\nThen deploy.\n```";
        assert_eq!(
            strip_code_fence(answer),
            "```bash\nnpm i\n```\nThen deploy."
        );
    }

    proptest! {
        #[test]
        fn prop_idempotent(input in ".{0,200}") {
            let once = strip_code_fence(&input);
            prop_assert_eq!(strip_code_fence(&once), once);
        }

        #[test]
        fn prop_idempotent_on_fenced_bodies(tag in "[a-z]{0,8}", body in "[ -~\n]{0,120}") {
            prop_assume!(!body.trim_start().starts_with(FENCE));
            let fenced = format!("```{}\n{}\n```", tag, body);
            let once = strip_code_fence(&fenced);
            prop_assert_eq!(&once, body.trim());
            prop_assert_eq!(strip_code_fence(&once), once);
        }
    }
}
