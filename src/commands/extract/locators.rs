use anyhow::{Context, Result};
use regex::Regex;

const BLOCK_MAX_CHARS: usize = 800;
pub(crate) const NUMBER_TOKEN: &str = r"[0-9][0-9,]*(?:\.[0-9]+)?";

/// The ways a labeled value can be laid out in linearized page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// `Label: value` on one line.
    Inline,
    /// Label ending its line, value on the next non-blank line.
    NextLine,
    /// First number-shaped token on the label's line or the line after,
    /// trying every occurrence of the label.
    SameOrNextNumeric,
    /// Several lines after the label, up to a blank line or a rule.
    Block,
}

/// A case-insensitive label pattern compiled for one strategy.
#[derive(Debug)]
pub(crate) struct LabelLocator {
    strategy: Strategy,
    pattern: Regex,
    number: Option<Regex>,
}

impl LabelLocator {
    pub(crate) fn new(strategy: Strategy, label: &str) -> Result<Self> {
        let source = match strategy {
            Strategy::Inline => format!(r"(?i){label}[ \t]*[:\-]?[ \t]*([^\n]+)"),
            Strategy::NextLine => format!(r"(?im){label}[ \t]*:?[ \t]*$"),
            Strategy::SameOrNextNumeric | Strategy::Block => format!(r"(?i){label}"),
        };
        let pattern = Regex::new(&source)
            .with_context(|| format!("failed to compile {strategy:?} locator for {label}"))?;
        let number = match strategy {
            Strategy::SameOrNextNumeric => {
                Some(Regex::new(NUMBER_TOKEN).context("failed to compile number token regex")?)
            }
            _ => None,
        };

        Ok(Self {
            strategy,
            pattern,
            number,
        })
    }

    pub(crate) fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Every value the label yields in already normalized text, one per label
    /// occurrence and in text order. Callers keep the first one that survives
    /// their cleaner.
    pub(crate) fn values(&self, text: &str) -> Vec<String> {
        match self.strategy {
            Strategy::Inline => self.inline_values(text),
            Strategy::NextLine => self.next_line_values(text),
            Strategy::SameOrNextNumeric => self.same_or_next_numeric_values(text),
            Strategy::Block => self.block_value(text).into_iter().collect(),
        }
    }

    fn inline_values(&self, text: &str) -> Vec<String> {
        self.pattern
            .captures_iter(text)
            .filter_map(|captures| {
                let value = captures.get(1)?.as_str().trim();
                (!value.is_empty()).then(|| value.to_string())
            })
            .collect()
    }

    /// A label that closes a line of several labels heads the last column,
    /// so only the last token of the value line belongs to it.
    fn next_line_values(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .filter_map(|label| {
                let value_line = first_nonblank_line(&text[label.end()..])?;
                let line_start = text[..label.start()].rfind('\n').map_or(0, |at| at + 1);
                if text[line_start..label.start()].trim().is_empty() {
                    Some(value_line)
                } else {
                    value_line.split_whitespace().last().map(ToOwned::to_owned)
                }
            })
            .collect()
    }

    fn same_or_next_numeric_values(&self, text: &str) -> Vec<String> {
        let Some(number) = self.number.as_ref() else {
            return Vec::new();
        };

        self.pattern
            .find_iter(text)
            .filter_map(|label| {
                let mut lines = text[label.end()..].split('\n');
                let same_line = lines.next().unwrap_or_default();
                let next_line = lines.next().unwrap_or_default();

                number
                    .find(same_line)
                    .or_else(|| number.find(next_line))
                    .map(|token| token.as_str().to_string())
            })
            .collect()
    }

    fn block_value(&self, text: &str) -> Option<String> {
        let label = self.pattern.find(text)?;
        let tail = &text[label.end()..];
        let tail = tail
            .strip_prefix(':')
            .or_else(|| tail.strip_prefix('#'))
            .unwrap_or(tail)
            .trim_start();
        let bounded = tail.chars().take(BLOCK_MAX_CHARS).collect::<String>();

        let mut kept = Vec::<&str>::new();
        for line in bounded.split('\n') {
            let line = line.trim();
            if line.is_empty() || is_rule_line(line) {
                break;
            }
            kept.push(line);
        }

        (!kept.is_empty()).then(|| kept.join("\n"))
    }
}

pub(crate) fn first_nonblank_line(text: &str) -> Option<String> {
    text.split('\n')
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(ToOwned::to_owned)
}

fn is_rule_line(line: &str) -> bool {
    line.chars().count() >= 3 && line.chars().all(|character| matches!(character, '-' | '_'))
}
