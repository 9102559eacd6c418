//! Rewrites field references of a showon attribute inside a subform

use super::name_map::NameMap;
use crate::showon::{FieldRef, AND_DELIMITER, NEGATION_MARKER, OR_DELIMITER};

/// A piece of showon text and the delimiter that ended it, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment<'a> {
    text: &'a str,
    delimiter: Option<&'static str>,
}

/// Translates declared field names to the synthetic names the host
/// assigned inside a subform.
///
/// By default the rewritten segments are joined without the `[AND]`/`[OR]`
/// delimiters they were split on, which is what the host historically
/// produced. Enable `rejoin_delimiters` to keep them.
#[derive(Debug, Clone, Copy)]
pub struct ShowOnRewriter<'a> {
    names: &'a NameMap,
    rejoin_delimiters: bool,
}

impl<'a> ShowOnRewriter<'a> {
    pub fn new(names: &'a NameMap) -> Self {
        Self {
            names,
            rejoin_delimiters: false,
        }
    }

    pub fn rejoin_delimiters(mut self, rejoin: bool) -> Self {
        self.rejoin_delimiters = rejoin;
        self
    }

    pub fn rewrite(&self, showon: &str) -> String {
        let mut out = String::with_capacity(showon.len());
        for segment in split_segments(showon) {
            out.push_str(&self.rewrite_segment(segment.text));
            if self.rejoin_delimiters {
                if let Some(delimiter) = segment.delimiter {
                    out.push_str(delimiter);
                }
            }
        }
        out
    }

    fn rewrite_segment(&self, segment: &str) -> String {
        let Some((control, value)) = segment.split_once(':') else {
            return segment.to_string();
        };

        let field = FieldRef::new(control);
        let declared = field.name();
        let name = self.names.rewritten_for(declared).unwrap_or(declared);

        if field.is_negated() {
            format!("{name}{NEGATION_MARKER}:{value}")
        } else {
            format!("{name}:{value}")
        }
    }
}

/// Split left to right at whichever delimiter comes first
fn split_segments(showon: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = showon;

    loop {
        let next = [AND_DELIMITER, OR_DELIMITER]
            .into_iter()
            .filter_map(|d| rest.find(d).map(|pos| (pos, d)))
            .min_by_key(|(pos, _)| *pos);

        let Some((pos, delimiter)) = next else {
            break;
        };
        segments.push(Segment {
            text: &rest[..pos],
            delimiter: Some(delimiter),
        });
        rest = &rest[pos + delimiter.len()..];
    }

    if !rest.is_empty() {
        segments.push(Segment {
            text: rest,
            delimiter: None,
        });
    }
    segments
}
