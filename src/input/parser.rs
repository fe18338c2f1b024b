//! Telemetry line parser
//!
//! A line is a comma separated list of `name:value` pairs:
//!
//! ```text
//! temp:23.5,humidity:41,fan:1
//! ```
//!
//! Names and values are trimmed of surrounding whitespace, so
//! ` temp : 23.5` is stored as series `temp`.
//!
//! Names that fail the name filter are dropped without trying to parse
//! their value. Values that are not numbers (including an empty value, as
//! in `a:1,,b:2`) are reported to the message log and dropped. A trailing
//! name without a `:` is reported as an invalid string, while a trailing
//! `name:` with nothing after it is ignored. None of these stop the rest of
//! the line from being processed.

use crate::filter::PatternFilter;
use crate::logs::LogSink;
use crate::plot::PlotStore;

/// One `name:value` pair as split from the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPair {
    pub name: String,
    pub value: String,
}

/// Tokenizer output for a whole line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Finalized pairs, in line order
    pub pairs: Vec<RawPair>,
    /// Trailing name that never saw a `:`
    pub dangling_name: Option<String>,
}

/// What happened to a single pair
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// Stored in the named series
    Accepted { name: String, value: f64 },
    /// Rejected by the name filter
    Filtered,
    /// Value is not a number
    InvalidNumber { name: String, value: String },
}

/// Summary of one processed line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineOutcome {
    pub accepted: usize,
    pub filtered: usize,
    pub errors: usize,
}

impl LineOutcome {
    /// Whether at least one sample reached the store
    pub fn changed(&self) -> bool {
        self.accepted > 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Name,
    Value,
}

/// Split a line into pairs with a two-phase name/value accumulator
///
/// `:` switches from name to value, `,` finalizes a pair. A second `:`
/// inside a value is kept as part of the value. Surrounding whitespace is
/// trimmed from names and values. Content after the last `,` becomes a pair
/// only if its value is non-empty.
pub fn tokenize(line: &str) -> Tokens {
    let mut tokens = Tokens::default();
    let mut name = String::new();
    let mut value = String::new();
    let mut phase = Phase::Name;

    for ch in line.chars() {
        match (ch, phase) {
            (':', Phase::Name) => phase = Phase::Value,
            (',', _) => {
                tokens.pairs.push(RawPair {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                });
                name.clear();
                value.clear();
                phase = Phase::Name;
            }
            (_, Phase::Name) => name.push(ch),
            (_, Phase::Value) => value.push(ch),
        }
    }

    match phase {
        Phase::Value => {
            let value = value.trim();
            if !value.is_empty() {
                tokens.pairs.push(RawPair {
                    name: name.trim().to_string(),
                    value: value.to_string(),
                });
            }
        }
        Phase::Name => {
            let name = name.trim();
            if !name.is_empty() {
                tokens.dangling_name = Some(name.to_string());
            }
        }
    }

    tokens
}

/// Parses lines into samples and stores the ones the name filter accepts
#[derive(Debug, Clone, Default)]
pub struct EntryParser {
    name_filter: PatternFilter,
}

impl EntryParser {
    pub fn new(name_filter: PatternFilter) -> Self {
        Self { name_filter }
    }

    pub fn name_filter(&self) -> &PatternFilter {
        &self.name_filter
    }

    pub fn name_filter_mut(&mut self) -> &mut PatternFilter {
        &mut self.name_filter
    }

    /// Decide the fate of a single pair without touching the store
    pub fn classify(&self, pair: RawPair) -> PairOutcome {
        if !self.name_filter.matches(&pair.name) {
            return PairOutcome::Filtered;
        }
        match pair.value.parse::<f64>() {
            Ok(value) => PairOutcome::Accepted {
                name: pair.name,
                value,
            },
            Err(_) => PairOutcome::InvalidNumber {
                name: pair.name,
                value: pair.value,
            },
        }
    }

    /// Parse `line` into `store`, reporting problems to `logs`
    pub fn parse_line(
        &self,
        line: &str,
        store: &mut PlotStore,
        logs: &mut dyn LogSink,
    ) -> LineOutcome {
        let mut outcome = LineOutcome::default();
        if line.is_empty() {
            return outcome;
        }

        let tokens = tokenize(line);
        for pair in tokens.pairs {
            match self.classify(pair) {
                PairOutcome::Accepted { name, value } => {
                    store.append(&name, value);
                    outcome.accepted += 1;
                }
                PairOutcome::Filtered => outcome.filtered += 1,
                PairOutcome::InvalidNumber { name, value } => {
                    logs.add(format_args!(
                        "Error parsing a value for {:?}: {:?}",
                        name, value
                    ));
                    outcome.errors += 1;
                }
            }
        }

        if let Some(name) = tokens.dangling_name {
            tracing::trace!("Dangling name {:?} in line {:?}", name, line);
            logs.add(format_args!("Invalid string: {}", line));
            outcome.errors += 1;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::MessageLog;

    fn parse(parser: &EntryParser, line: &str) -> (PlotStore, MessageLog, LineOutcome) {
        let mut store = PlotStore::new();
        let mut logs = MessageLog::messages();
        let outcome = parser.parse_line(line, &mut store, &mut logs);
        (store, logs, outcome)
    }

    #[test]
    fn test_tokenize_pairs() {
        let tokens = tokenize("a:1,b:2");
        assert_eq!(tokens.pairs.len(), 2);
        assert_eq!(tokens.pairs[1].name, "b");
        assert_eq!(tokens.pairs[1].value, "2");
        assert_eq!(tokens.dangling_name, None);
    }

    #[test]
    fn test_tokenize_trailing_comma_and_dangling_name() {
        let tokens = tokenize("a:1,");
        assert_eq!(tokens.pairs.len(), 1);
        assert_eq!(tokens.dangling_name, None);

        let tokens = tokenize("good:1,bad");
        assert_eq!(tokens.pairs.len(), 1);
        assert_eq!(tokens.dangling_name.as_deref(), Some("bad"));
    }

    #[test]
    fn test_tokenize_keeps_extra_colon_in_value() {
        let tokens = tokenize("t:12:30");
        assert_eq!(tokens.pairs[0].value, "12:30");
    }

    #[test]
    fn test_tokenize_trims_whitespace() {
        let tokens = tokenize(" temp : 23.5 , hum: 40 ");
        assert_eq!(tokens.pairs[0].name, "temp");
        assert_eq!(tokens.pairs[0].value, "23.5");
        assert_eq!(tokens.pairs[1].name, "hum");
        assert_eq!(tokens.pairs[1].value, "40");
    }

    #[test]
    fn test_parse_simple_line() {
        let parser = EntryParser::default();
        let (store, logs, outcome) = parse(&parser, "a:1,b:-2.5e1");
        assert_eq!(outcome.accepted, 2);
        assert!(outcome.changed());
        assert_eq!(store.series("a").unwrap().values(), &[1.0]);
        assert_eq!(store.series("b").unwrap().values(), &[-25.0]);
        assert!(logs.is_empty());
    }

    #[test]
    fn test_filter_rejects_before_parsing() {
        let parser = EntryParser::new(PatternFilter::new("^(temp|foo)$").unwrap());
        let (store, logs, outcome) = parse(&parser, "temp:23.5,humidity:abc,foo:1");

        assert_eq!(store.series("temp").unwrap().values(), &[23.5]);
        assert_eq!(store.series("foo").unwrap().values(), &[1.0]);
        assert!(store.series("humidity").is_none());
        assert_eq!(outcome.filtered, 1);
        assert_eq!(outcome.errors, 0);
        assert!(logs.is_empty());
    }

    #[test]
    fn test_invalid_number_is_logged_and_dropped() {
        let parser = EntryParser::default();
        let (store, logs, outcome) = parse(&parser, "temp:23.5,humidity:abc,foo:1");

        assert_eq!(outcome.accepted, 2);
        assert_eq!(outcome.errors, 1);
        assert!(store.series("humidity").is_none());
        assert_eq!(logs.len(), 1);
        assert!(logs.entries()[0].contains("abc"));
        assert_eq!(store.series_names(), vec!["temp", "foo"]);
    }

    #[test]
    fn test_malformed_trailing_name() {
        let parser = EntryParser::default();
        let (store, logs, outcome) = parse(&parser, "good:1,bad");

        assert_eq!(store.series("good").unwrap().values(), &[1.0]);
        assert_eq!(store.len(), 1);
        assert_eq!(outcome.errors, 1);
        assert_eq!(logs.entries(), &["Invalid string: good:1,bad".to_string()]);
    }

    #[test]
    fn test_empty_line_yields_nothing() {
        let parser = EntryParser::default();
        let (store, logs, outcome) = parse(&parser, "");
        assert_eq!(outcome, LineOutcome::default());
        assert!(store.is_empty());
        assert!(logs.is_empty());
    }

    #[test]
    fn test_empty_pair_is_a_parse_error() {
        let parser = EntryParser::default();
        let (store, logs, outcome) = parse(&parser, "a:1,,b:2,");
        assert_eq!(outcome.accepted, 2);
        assert_eq!(outcome.errors, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(logs.entries(), &["Error parsing a value for \"\": \"\"".to_string()]);
    }

    #[test]
    fn test_empty_pair_rejected_by_filter_is_silent() {
        let parser = EntryParser::new(PatternFilter::new("^(a|b)$").unwrap());
        let (_, logs, outcome) = parse(&parser, "a:1,,b:2");
        assert_eq!(outcome.accepted, 2);
        assert_eq!(outcome.filtered, 1);
        assert!(logs.is_empty());
    }

    #[test]
    fn test_name_without_value_before_comma() {
        let parser = EntryParser::default();
        let (store, logs, outcome) = parse(&parser, "bad,good:2");
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.errors, 1);
        assert_eq!(store.series("good").unwrap().values(), &[2.0]);
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn test_name_without_value_filtered_is_silent() {
        let parser = EntryParser::new(PatternFilter::new("^good$").unwrap());
        let (_, logs, outcome) = parse(&parser, "bad,good:2");
        assert_eq!(outcome.filtered, 1);
        assert!(logs.is_empty());
    }

    #[test]
    fn test_empty_value_at_end_is_ignored() {
        let parser = EntryParser::default();
        let (store, logs, outcome) = parse(&parser, "a:1,b:");
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.errors, 0);
        assert!(store.series("b").is_none());
        assert!(logs.is_empty());

        assert!(tokenize("a: ").pairs.is_empty());
    }

    #[test]
    fn test_empty_value_before_comma_is_an_error() {
        let parser = EntryParser::default();
        let (_, logs, outcome) = parse(&parser, "b:,a:1");
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.errors, 1);
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn test_repeated_lines_append_in_order() {
        let parser = EntryParser::default();
        let mut store = PlotStore::new();
        let mut logs = MessageLog::messages();
        for i in 0..5 {
            parser.parse_line(&format!("x:{}", i), &mut store, &mut logs);
        }
        assert_eq!(store.series("x").unwrap().values(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_parse_never_panics_and_is_bounded(line in "[a-z0-9:,. x-]{0,64}") {
            let parser = EntryParser::default();
            let (store, logs, outcome) = parse(&parser, &line);
            let commas = line.matches(',').count();
            prop_assert!(outcome.accepted <= commas + 1);
            prop_assert_eq!(store.total_samples(), outcome.accepted);
            prop_assert_eq!(logs.len(), outcome.errors);
        }

        #[test]
        fn test_filtered_names_never_log(
            names in prop::collection::vec("[a-z]{1,6}", 1..6),
            values in prop::collection::vec("[a-z0-9.]{0,4}", 1..6)
        ) {
            let parser = EntryParser::new(PatternFilter::new("^keep$").unwrap());
            let line = names
                .iter()
                .zip(values.iter())
                .map(|(n, v)| format!("{}:{}", n, v))
                .collect::<Vec<_>>()
                .join(",");
            let (store, logs, _) = parse(&parser, &line);
            let kept = names.iter().filter(|n| n.as_str() == "keep").count();
            if kept == 0 {
                prop_assert!(logs.is_empty());
                prop_assert!(store.is_empty());
            }
        }
    }
}
